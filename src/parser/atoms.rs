//! Leaf parsers: the things that actually look at a byte.

use std::rc::Rc;

use crate::parser::kind::ParserKind;
use crate::parser::{Parser, RawParser};

/// Matches exactly `b`, producing it.
pub fn char(b: u8) -> Parser<u8> {
	Parser::from_raw(RawParser::new(ParserKind::Single(b)))
}

/// Matches any byte in the inclusive range `[lo, hi]`.
pub fn range(lo: u8, hi: u8) -> Parser<u8> {
	Parser::from_raw(RawParser::new(ParserKind::Range(lo, hi)))
}

/// Matches any single byte, failing only at end of input.
pub fn any() -> Parser<u8> {
	satisfy("any byte", |_| true)
}

/// Matches any byte that appears in `set`.
pub fn one_of(set: impl Into<Rc<[u8]>>) -> Parser<u8> {
	Parser::from_raw(RawParser::new(ParserKind::OneOf(set.into())))
}

/// Matches any byte that does *not* appear in `set`.
pub fn none_of(set: impl Into<Rc<[u8]>>) -> Parser<u8> {
	Parser::from_raw(RawParser::new(ParserKind::NoneOf(set.into())))
}

/// Matches a single byte satisfying `pred`, reported under `label` on failure.
pub fn satisfy(label: impl Into<String>, pred: impl Fn(u8) -> bool + 'static) -> Parser<u8> {
	Parser::from_raw(RawParser::new(ParserKind::Satisfy(
		Rc::new(pred),
		label.into(),
	)))
}

/// Matches the exact byte sequence `lit`, in order, with no backtracking on a partial
/// match — the enclosing combinator (`maybe`, `or`, ...) owns any rewind.
pub fn string(lit: impl Into<Rc<[u8]>>) -> Parser<Vec<u8>> {
	Parser::from_raw(RawParser::new(ParserKind::StringLit(lit.into())))
}

/// Always fails with `message` and no expectation set.
pub fn fail<T: 'static>(message: impl Into<String>) -> Parser<T> {
	Parser::from_raw(RawParser::new(ParserKind::Fail(message.into())))
}

/// Always succeeds without consuming input, producing `()`.
pub fn pass() -> Parser<()> {
	Parser::from_raw(RawParser::new(ParserKind::Pass))
}

/// Always succeeds without consuming input, producing a fresh `T` from `f` each time.
pub fn lift<T: 'static>(f: impl Fn() -> T + 'static) -> Parser<T> {
	Parser::from_raw(RawParser::new(ParserKind::Lift(Rc::new(move || {
		crate::parser::Value::new(f())
	}))))
}

/// Always succeeds without consuming input, producing a clone of `v` every time it runs.
pub fn lift_val<T: Clone + 'static>(v: T) -> Parser<T> {
	lift(move || v.clone())
}

/// Succeeds with `()` only at end of input.
pub fn eof() -> Parser<()> {
	super::combinators::anchor("end of input", |_last, next| next.is_none())
}

/// Succeeds with `()` only at the start of a line (position 0 or just after `\n`).
pub fn start_of_line() -> Parser<()> {
	super::combinators::anchor("start of line", |last, _next| last == b'\n' || last == 0)
}
