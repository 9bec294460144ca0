//! Top-level scenarios exercising the public surface end to end, one file per spec
//! §8.2 scenario family, the way the teacher splits `lib/tests/*.rs` by feature rather
//! than by internal module.

use std::collections::HashMap;
use std::rc::Rc;

use parsekit::grammar::{self, AstNode, Flags as GrammarFlags};
use parsekit::parser::atoms::{char, range, string};
use parsekit::parser::combinators::{and2, many1, or, predictive};
use parsekit::parser::recursion;
use parsekit::parser::Parser;
use parsekit::regex::{self, Flags as RegexFlags};

/// Turns on `tracing` output (respecting `RUST_LOG`) for whichever test runs first;
/// harmless if another test already initialized it.
fn init_tracing() {
	use tracing_subscriber::util::SubscriberInitExt;
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.finish()
		.try_init();
}

#[test]
fn identifier_regex_advances_cursor_past_the_matched_prefix() {
	init_tracing();
	let ident = regex::re("[a-zA-Z_][a-zA-Z_0-9]*", RegexFlags::empty()).unwrap();
	let matched = parsekit::parse(&ident, "ident", b"foo_123 bar").unwrap();
	assert_eq!(matched, b"foo_123".to_vec());
}

fn declare(names: &[&str]) -> HashMap<String, Parser<AstNode>> {
	names
		.iter()
		.map(|n| (n.to_string(), recursion::new::<AstNode>(*n)))
		.collect()
}

const ARITHMETIC: &str = r#"
	expression : <product> (('+'|'-') <product>)*;
	product : <value> (('*'|'/') <value>)*;
	value : /[0-9]+/ | '(' <expression> ')';
"#;

#[test]
fn arithmetic_grammar_nests_products_under_expression() {
	let refs = declare(&["expression", "product", "value"]);
	let entry = grammar::grammar(GrammarFlags::DEFAULT, ARITHMETIC, &refs).unwrap();
	let ast = entry.run("<arith>", b"2+3*4").unwrap();
	assert_eq!(ast.tag(), "expression");
	// the top-level `+` has two operands: `2` and the nested `product` `3*4`.
	let product = ast
		.children()
		.iter()
		.rev()
		.find(|c| c.has_tag("product") && !c.is_leaf())
		.expect("a nested product child for the right-hand operand");
	let leaves: Vec<_> = product
		.leaves()
		.into_iter()
		.map(|l| String::from_utf8_lossy(l.contents()).into_owned())
		.collect();
	assert_eq!(leaves, vec!["3", "*", "4"]);
	recursion::cleanup(&refs.into_values().collect::<Vec<_>>());
}

#[test]
fn backtrack_and_error_merge_reports_both_alternatives_at_the_failure_point() {
	let p = or(vec![string(*b"abc"), string(*b"abd")]);
	let err = parsekit::parse(&p, "t", b"abe").unwrap_err();
	assert_eq!(
		err.to_string(),
		"t:1:3: error: expected \"abc\" or \"abd\" at 'e'"
	);
}

#[test]
fn predictive_alternative_cuts_off_the_next_branch_once_committed() {
	let p = or(vec![predictive(string(*b"ab")), string(*b"ac")]);
	let err = parsekit::parse(&p, "t", b"ac").unwrap_err();
	// `predictive(string("ab"))` consumed `'a'` then failed on `'b'` vs `'c'`; the
	// second alternative, `string("ac")`, is never attempted.
	assert_eq!(err.to_string(), "t:1:2: error: expected \"ab\" at 'c'");
}

#[test]
fn many_of_a_maybe_terminates_without_consuming_input() {
	use parsekit::parser::combinators::{many, maybe};
	let p = many(Rc::new(|vs: Vec<Option<u8>>| vs), maybe(&char(b'x')));
	let result = parsekit::parse(&p, "t", b"yyy").unwrap();
	assert_eq!(result, vec![None]);
}

#[test]
fn recursive_definition_parses_and_cleans_up_without_a_second_cleanup_panicking() {
	let expr: Parser<i64> = recursion::new("expr");
	let digit = range(b'0', b'9');
	let digits = many1(Rc::new(|ds: Vec<u8>| ds), digit);
	let number = parsekit::parser::combinators::map(&digits, |ds| {
		std::str::from_utf8(&ds).unwrap().parse::<i64>().unwrap()
	});
	let plus_expr = and2(
		&and2(&number, &char(b'+'), |n, _| n),
		&expr,
		|lhs, rhs| lhs + rhs,
	);
	recursion::define(&expr, or(vec![plus_expr, number]));

	assert_eq!(parsekit::parse(&expr, "t", b"1+2+3").unwrap(), 6);

	recursion::cleanup(&[expr.clone()]);
	// A second cleanup of the same already-undefined reference in a fresh batch is a
	// no-op (undefine on an empty body does nothing), matching spec §8.2(6).
	recursion::cleanup(&[expr]);
}

#[test]
#[should_panic(expected = "referenced but never defined")]
fn running_an_undefined_reference_is_a_usage_error() {
	let r: Parser<()> = recursion::new("never-defined");
	let _ = parsekit::parse(&r, "t", b"");
}

#[test]
#[should_panic(expected = "not a retained")]
fn cleanup_on_a_non_retained_parser_panics() {
	let p = char(b'x');
	recursion::cleanup(&[p]);
}

/// A value whose construction/destruction is observable, standing in for spec §3.3's
/// "opaque owned object with a user-supplied destructor" — here just ordinary `Drop`.
struct DropToken(Rc<std::cell::Cell<i32>>);

impl DropToken {
	fn new(alive: &Rc<std::cell::Cell<i32>>) -> Self {
		alive.set(alive.get() + 1);
		DropToken(alive.clone())
	}
}

impl Drop for DropToken {
	fn drop(&mut self) {
		self.0.set(self.0.get() - 1);
	}
}

#[test]
fn and_drops_every_partial_value_exactly_once_when_a_later_child_fails() {
	use parsekit::parser::atoms::{fail, lift};
	use parsekit::parser::combinators::{and_many, erase};

	let alive = Rc::new(std::cell::Cell::new(0));
	let (a, b) = (alive.clone(), alive.clone());
	let first = lift(move || DropToken::new(&a));
	let second = lift(move || DropToken::new(&b));
	let third: Parser<DropToken> = fail("boom");

	let seq = and_many(vec![erase(first), erase(second), erase(third)], |_| ());
	assert!(parsekit::parse(&seq, "t", b"").is_err());
	// The first two children were constructed (and the third's failure didn't stop
	// that); `And`'s early return on the third child's error must still drop the two
	// already-built values exactly once each, never leak or double-free them.
	assert_eq!(alive.get(), 0);
}

#[test]
fn count_drops_every_partial_value_exactly_once_when_an_iteration_falls_short() {
	use parsekit::parser::atoms::lift;
	use parsekit::parser::combinators::{check, count};

	let alive = Rc::new(std::cell::Cell::new(0));
	let iteration = Rc::new(std::cell::Cell::new(0));
	let item = lift({
		let alive = alive.clone();
		move || DropToken::new(&alive)
	});
	// Succeeds for the first two repetitions, fails the third.
	let limited = check(&item, "only two repetitions available", move |_| {
		let n = iteration.get();
		iteration.set(n + 1);
		n < 2
	});

	let seq = count(3, Rc::new(|_vs: Vec<DropToken>| ()), limited);
	assert!(parsekit::parse(&seq, "t", b"").is_err());
	// Two successful iterations were built before the third fell short; all three
	// constructed `DropToken`s (the failing one included) must still be dropped.
	assert_eq!(alive.get(), 0);
}
