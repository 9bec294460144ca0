//! Parses grammar source text into [`RuleDef`]s, again using the combinator core
//! against a small hand-written grammar-for-grammars.

use std::rc::Rc;

use crate::error::ParseError;
use crate::parser::atoms::{char, none_of, one_of, range};
use crate::parser::combinators::{and2, many, many1, map, maybe, or};
use crate::parser::recursion;
use crate::parser::Parser;

/// One factor of a rule body, after grammar-text parsing but before compilation
/// against a caller's rule-name-to-`Ref` table.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
	StringLit(Rc<[u8]>),
	ByteLit(u8),
	Regex(Rc<str>),
	RuleRef(String, crate::error::Position),
	Seq(Vec<Expr>),
	Alt(Vec<Expr>),
	Opt(Box<Expr>),
	Star(Box<Expr>),
	Plus(Box<Expr>),
}

#[derive(Debug, Clone)]
pub(crate) struct RuleDef {
	pub(crate) name: String,
	pub(crate) label: Option<String>,
	pub(crate) body: Expr,
}

fn ws() -> Parser<()> {
	map(
		&many(Rc::new(|_: Vec<u8>| ()), one_of(Rc::from(&b" \t\r\n"[..]))),
		|_| (),
	)
}

fn lexeme<A: 'static>(p: &Parser<A>) -> Parser<A> {
	and2(p, &ws(), |v, _| v)
}

fn ident_start() -> Parser<u8> {
	or(vec![range(b'a', b'z'), range(b'A', b'Z'), char(b'_')])
}

fn ident_cont() -> Parser<u8> {
	or(vec![
		range(b'a', b'z'),
		range(b'A', b'Z'),
		range(b'0', b'9'),
		char(b'_'),
	])
}

fn ident() -> Parser<String> {
	let rest = many(Rc::new(|v: Vec<u8>| v), ident_cont());
	let bytes = map(&and2(&ident_start(), &rest, |f, r| (f, r)), |(f, r)| {
		let mut v = vec![f];
		v.extend(r);
		v
	});
	lexeme(&map(&bytes, |b| {
		String::from_utf8(b).expect("identifier bytes are ASCII")
	}))
}

fn escapable_char(delim: u8) -> Parser<u8> {
	let escaped = {
		let known = crate::parser::atoms::satisfy("escaped character", move |b| {
			b == delim || matches!(b, b'n' | b'r' | b't' | b'\\')
		});
		map(&and2(&char(b'\\'), &known, |_, c| c), |c| match c {
			b'n' => b'\n',
			b'r' => b'\r',
			b't' => b'\t',
			other => other,
		})
	};
	or(vec![escaped, none_of(Rc::from([delim]))])
}

fn string_lit() -> Parser<Rc<[u8]>> {
	let body = many(Rc::new(|v: Vec<u8>| v), escapable_char(b'"'));
	let opened = and2(&char(b'"'), &body, |_, b| b);
	let closed = and2(&opened, &char(b'"'), |b, _| b);
	lexeme(&map(&closed, |b: Vec<u8>| Rc::from(b)))
}

fn byte_lit() -> Parser<u8> {
	let opened = and2(&char(b'\''), &escapable_char(b'\''), |_, c| c);
	let closed = and2(&opened, &char(b'\''), |c, _| c);
	lexeme(&closed)
}

fn regex_lit() -> Parser<Rc<str>> {
	let body = many(Rc::new(|v: Vec<u8>| v), escapable_char(b'/'));
	let opened = and2(&char(b'/'), &body, |_, b| b);
	let closed = and2(&opened, &char(b'/'), |b, _| b);
	lexeme(&map(&closed, |b: Vec<u8>| {
		Rc::from(String::from_utf8(b).expect("regex source bytes are ASCII").as_str())
	}))
}

fn rule_ref() -> Parser<(String, crate::error::Position)> {
	let opened = and2(&char(b'<'), &ident_start_and_cont(), |_, name| name);
	let closed = and2(&opened, &char(b'>'), |name, _| name);
	lexeme(&crate::parser::combinators::with_position(&closed, |name, pos| (name, pos)))
}

fn ident_start_and_cont() -> Parser<String> {
	let rest = many(Rc::new(|v: Vec<u8>| v), ident_cont());
	map(&and2(&ident_start(), &rest, |f, r| (f, r)), |(f, r)| {
		let mut v = vec![f];
		v.extend(r);
		String::from_utf8(v).expect("identifier bytes are ASCII")
	})
}

fn primary(alt_ref: &Parser<Expr>) -> Parser<Expr> {
	let grouped = {
		let opened = and2(&lexeme(&char(b'(')), alt_ref, |_, e| e);
		and2(&opened, &lexeme(&char(b')')), |e, _| e)
	};
	or(vec![
		grouped,
		map(&string_lit(), Expr::StringLit),
		map(&byte_lit(), Expr::ByteLit),
		map(&regex_lit(), Expr::Regex),
		map(&rule_ref(), |(name, pos)| Expr::RuleRef(name, pos)),
	])
}

fn factor(alt_ref: &Parser<Expr>) -> Parser<Expr> {
	let quant = maybe(&lexeme(&one_of(Rc::from(&b"?*+"[..]))));
	map(
		&and2(&primary(alt_ref), &quant, |p, q| (p, q)),
		|(p, q)| match q {
			Some(b'?') => Expr::Opt(Box::new(p)),
			Some(b'*') => Expr::Star(Box::new(p)),
			Some(b'+') => Expr::Plus(Box::new(p)),
			_ => p,
		},
	)
}

fn seq(alt_ref: &Parser<Expr>) -> Parser<Expr> {
	map(&many1(Rc::new(|v: Vec<Expr>| v), factor(alt_ref)), Expr::Seq)
}

fn alt_body(alt_ref: &Parser<Expr>) -> Parser<Expr> {
	let first = seq(alt_ref);
	let rest = many(
		Rc::new(|v: Vec<Expr>| v),
		and2(&lexeme(&char(b'|')), &seq(alt_ref), |_, s| s),
	);
	map(&and2(&first, &rest, |f, r| (f, r)), |(f, r): (Expr, Vec<Expr>)| {
		if r.is_empty() {
			f
		} else {
			let mut all = vec![f];
			all.extend(r);
			Expr::Alt(all)
		}
	})
}

fn rule_def(alt_ref: &Parser<Expr>) -> Parser<RuleDef> {
	let label = maybe(&string_lit());
	let header = and2(&ident(), &label, |name, label| (name, label));
	let colon = lexeme(&char(b':'));
	let body = alt_body(alt_ref);
	let semi = lexeme(&char(b';'));
	map(
		&and2(
			&and2(&header, &colon, |h, _| h),
			&and2(&body, &semi, |b, _| b),
			|(name, label), body| (name, label, body),
		),
		|(name, label, body)| RuleDef {
			name,
			label: label.map(|l: Rc<[u8]>| String::from_utf8_lossy(&l).into_owned()),
			body,
		},
	)
}

/// Parses a whole grammar source file: leading whitespace, then one or more rule
/// definitions, to end of input.
pub(crate) fn parse_grammar(src: &str) -> Result<Vec<RuleDef>, ParseError> {
	let alt_ref: Parser<Expr> = recursion::new("grammar-alternation");
	recursion::define(&alt_ref, alt_body(&alt_ref));
	let rules = many1(Rc::new(|v: Vec<RuleDef>| v), rule_def(&alt_ref));
	let full = and2(&ws(), &and2(&rules, &crate::parser::atoms::eof(), |r, _| r), |_, r| r);
	let result = full.run("<grammar>", src.as_bytes());
	recursion::cleanup(&[alt_ref]);
	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_single_simple_rule() {
		let rules = parse_grammar(r#"digit : /[0-9]/ ;"#).unwrap();
		assert_eq!(rules.len(), 1);
		assert_eq!(rules[0].name, "digit");
		assert!(matches!(rules[0].body, Expr::Regex(_)));
	}

	#[test]
	fn parses_the_arithmetic_grammar_shape() {
		let src = r#"
			expression : <product> (('+'|'-') <product>)*;
			product : <value> (('*'|'/') <value>)*;
			value : /[0-9]+/ | '(' <expression> ')';
		"#;
		let rules = parse_grammar(src).unwrap();
		assert_eq!(rules.len(), 3);
		assert_eq!(rules[1].name, "product");
	}

	#[test]
	fn rejects_a_rule_missing_its_semicolon() {
		assert!(parse_grammar("a : 'x'").is_err());
	}
}
