//! Combinators: parsers built out of other parsers.

use std::rc::Rc;

use crate::error::Position;
use crate::parser::kind::ParserKind;
use crate::parser::value::Value;
use crate::parser::{Parser, RawParser};

/// Zero-width assertion over `(last_char, next)`. `0` stands for "no byte consumed yet"
/// in `last_char` — see [`crate::parser::atoms::start_of_line`].
pub fn anchor(
	label: impl Into<String>,
	pred: impl Fn(u8, Option<u8>) -> bool + 'static,
) -> Parser<()> {
	Parser::from_raw(RawParser::new(ParserKind::Anchor(
		Rc::new(pred),
		label.into(),
	)))
}

/// Transforms a successful result; leaves failure untouched.
pub fn map<A: 'static, B: 'static>(p: &Parser<A>, f: impl Fn(A) -> B + 'static) -> Parser<B> {
	let raw = RawParser::new(ParserKind::Apply(
		p.raw.clone(),
		Rc::new(move |v: Value| Value::new(f(v.downcast()))),
	));
	Parser::from_raw(raw)
}

/// Succeeds iff `p` succeeds and `pred` accepts the result; otherwise fails with
/// `message` (no expectation set — same as [`crate::parser::atoms::fail`]).
pub fn check<A: 'static>(
	p: &Parser<A>,
	message: impl Into<String>,
	pred: impl Fn(&A) -> bool + 'static,
) -> Parser<A> {
	let raw = RawParser::new(ParserKind::Check(
		p.raw.clone(),
		Rc::new(move |v: &Value| pred(v.downcast_ref::<A>())),
		message.into(),
	));
	Parser::from_raw(raw)
}

/// Replaces `p`'s failure expectation set with a single `label`, leaving position and
/// any `fail` message intact.
pub fn expect<A: 'static>(p: &Parser<A>, label: impl Into<String>) -> Parser<A> {
	Parser::from_raw(RawParser::new(ParserKind::Expect(
		p.raw.clone(),
		label.into(),
	)))
}

/// Disables backtracking past `p` once it has consumed at least one byte: a failure
/// after partial consumption becomes a hard `Cut` that skips any remaining `or`
/// alternatives instead of being tried against them.
pub fn predictive<A: 'static>(p: &Parser<A>) -> Parser<A> {
	Parser::from_raw(RawParser::new(ParserKind::Predict(p.raw.clone())))
}

/// Succeeds with `None` (and no consumption) iff `p` fails without consuming input; a
/// `p` that fails *after* consuming propagates that failure; a `p` that succeeds is
/// wrapped in `Some`. The "null" half of the spec's "succeed with null or the lift
/// function's value" rule — see [`maybe_or`] for the lift-function half.
pub fn maybe<A: 'static>(p: &Parser<A>) -> Parser<Option<A>> {
	let inner = map(p, Some);
	Parser::from_raw(RawParser::new(ParserKind::Maybe(
		inner.raw,
		Rc::new(|| Value::new(None::<A>)),
	)))
}

/// Like [`maybe`], but a non-consuming failure of `p` substitutes `default()` directly
/// rather than `None` — the "lift function" half of the spec's Maybe rule.
pub fn maybe_or<A: 'static>(p: &Parser<A>, default: impl Fn() -> A + 'static) -> Parser<A> {
	Parser::from_raw(RawParser::new(ParserKind::Maybe(
		p.raw.clone(),
		Rc::new(move || Value::new(default())),
	)))
}

/// Succeeds with `default()` iff `p` fails (consuming or not — unlike [`maybe`], `not`
/// absorbs every failure kind); fails if `p` succeeds. Never consumes input either way.
pub fn not<A: 'static, B: 'static>(p: &Parser<A>, default: impl Fn() -> B + 'static) -> Parser<B> {
	Parser::from_raw(RawParser::new(ParserKind::Not(
		p.raw.clone(),
		Rc::new(move || Value::new(default())),
	)))
}

/// Zero-or-more repetitions of `p`, folded by `fold`. Stops (without failing) on the
/// first iteration that fails without consuming input, or on a failure after partial
/// consumption in non-predictive context; a failure after a `predictive`-wrapped
/// iteration consumed input propagates as a hard cut instead.
pub fn many<A: 'static, B: 'static>(
	fold: Rc<dyn Fn(Vec<A>) -> B>,
	p: Parser<A>,
) -> Parser<B> {
	Parser::from_raw(RawParser::new(ParserKind::Many(
		p.raw,
		wrap_fold(fold),
	)))
}

/// Like [`many`], but requires at least one successful repetition.
pub fn many1<A: 'static, B: 'static>(
	fold: Rc<dyn Fn(Vec<A>) -> B>,
	p: Parser<A>,
) -> Parser<B> {
	Parser::from_raw(RawParser::new(ParserKind::Many1(
		p.raw,
		wrap_fold(fold),
	)))
}

/// Exactly `n` repetitions of `p`; any failure propagates immediately (no partial
/// rewind — the caller owns that via `maybe`/`or` if partial success should be
/// recoverable).
pub fn count<A: 'static, B: 'static>(
	n: usize,
	fold: Rc<dyn Fn(Vec<A>) -> B>,
	p: Parser<A>,
) -> Parser<B> {
	Parser::from_raw(RawParser::new(ParserKind::Count(
		n,
		p.raw,
		wrap_fold(fold),
	)))
}

fn wrap_fold<A: 'static, B: 'static>(
	fold: Rc<dyn Fn(Vec<A>) -> B>,
) -> Rc<dyn Fn(Vec<Value>) -> Value> {
	Rc::new(move |values: Vec<Value>| {
		let typed = values.into_iter().map(Value::downcast::<A>).collect();
		Value::new(fold(typed))
	})
}

/// First alternative that succeeds, or all of them's errors merged if every one fails.
/// A `predictive`-wrapped alternative that fails after consuming input short-circuits
/// the remaining alternatives instead of letting them be tried.
pub fn or<A: 'static>(alternatives: Vec<Parser<A>>) -> Parser<A> {
	let raws = alternatives.into_iter().map(|p| p.raw).collect();
	Parser::from_raw(RawParser::new(ParserKind::Or(raws)))
}

/// Runs two parsers in sequence and combines their results with `f`.
pub fn and2<A: 'static, B: 'static, C: 'static>(
	a: &Parser<A>,
	b: &Parser<B>,
	f: impl Fn(A, B) -> C + 'static,
) -> Parser<C> {
	let raw = RawParser::new(ParserKind::And(
		vec![a.raw.clone(), b.raw.clone()],
		Rc::new(move |mut values: Vec<Value>| {
			let b = values.pop().expect("and2: 2 children").downcast::<B>();
			let a = values.pop().expect("and2: 2 children").downcast::<A>();
			Value::new(f(a, b))
		}),
	));
	Parser::from_raw(raw)
}

/// Runs a heterogeneous sequence of erased children and folds them with `fold`. This
/// is the primitive `and2`/`and3`/grammar-sequence all reduce to: the spec's `And`
/// explicitly takes differently-typed children, which a single generic tuple type can't
/// express, so sequencing bottoms out in erased `Value`s folded by a closure that knows
/// the real arity and types.
pub fn and_many<B: 'static>(
	children: Vec<Parser<Value>>,
	fold: impl Fn(Vec<Value>) -> B + 'static,
) -> Parser<B> {
	let raws = children.into_iter().map(|p| p.raw).collect();
	Parser::from_raw(RawParser::new(ParserKind::And(
		raws,
		Rc::new(move |values| Value::new(fold(values))),
	)))
}

/// Erases a typed parser so it can be used as one child of [`and_many`].
pub fn erase<A: 'static>(p: Parser<A>) -> Parser<Value> {
	map(&p, Value::new)
}

/// Runs `p` for its consumption alone and returns the exact bytes it matched, in
/// place of `p`'s own result. This is how the regex compiler turns an arbitrary
/// combinator tree into "the matched substring" without inventing a second evaluation
/// rule: it is just `p` plus a remembered start position.
pub fn captured<A: 'static>(p: &Parser<A>) -> Parser<Vec<u8>> {
	Parser::from_raw(RawParser::new(ParserKind::Captured(p.raw.clone())))
}

/// Runs `p`, then passes its value together with the position the match *started* at
/// to `f`. Used by the grammar compiler to stamp each AST node's `state`.
pub fn with_position<A: 'static, B: 'static>(
	p: &Parser<A>,
	f: impl Fn(A, Position) -> B + 'static,
) -> Parser<B> {
	Parser::from_raw(RawParser::new(ParserKind::Positioned(
		p.raw.clone(),
		Rc::new(move |v: Value, pos: Position| Value::new(f(v.downcast(), pos))),
	)))
}
