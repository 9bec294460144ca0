//! A structural simplification pass over a parser tree.
//!
//! Combinators built up through ordinary composition (`or(vec![or(vec![a, b]), c])`,
//! `expect(expect(p, "x"), "y")`, `predictive(predictive(p))`, ...) are semantically
//! fine but carry redundant nodes. `optimise` flattens them without changing behaviour.
//! It is idempotent: running it on its own output is a no-op, which the inline test
//! below checks directly rather than asserting anything about performance.

use crate::parser::kind::ParserKind;
use crate::parser::{Parser, RawParser};

/// Rebuilds `p`'s tree with redundant wrapper nodes collapsed.
pub fn optimise<T: 'static>(p: &Parser<T>) -> Parser<T> {
	Parser::from_raw(optimise_raw(&p.raw))
}

fn optimise_raw(raw: &RawParser) -> RawParser {
	use ParserKind::*;
	match &*raw.kind {
		// expect(expect(p, _), label) only keeps the outer label — the inner one is
		// unreachable, since `Expect` always fully replaces the expectation set.
		Expect(inner, label) => {
			let inner = optimise_raw(inner);
			match &*inner.kind {
				Expect(innermost, _) => RawParser::new(Expect(innermost.clone(), label.clone())),
				_ => RawParser::new(Expect(inner, label.clone())),
			}
		}

		// predictive is already a one-shot switch; wrapping it again changes nothing.
		Predict(inner) => {
			let inner = optimise_raw(inner);
			match &*inner.kind {
				Predict(_) => inner,
				_ => RawParser::new(Predict(inner)),
			}
		}

		// A single-alternative `or` is just its one alternative. Nested `or`s flatten
		// into one, since trying alternatives left to right is associative.
		Or(alts) => {
			let mut flat = Vec::with_capacity(alts.len());
			for alt in alts {
				let alt = optimise_raw(alt);
				match &*alt.kind {
					Or(nested) => flat.extend(nested.iter().cloned()),
					_ => flat.push(alt),
				}
			}
			if flat.len() == 1 {
				flat.into_iter().next().expect("len == 1")
			} else {
				RawParser::new(Or(flat))
			}
		}

		And(children, fold) => {
			let children = children.iter().map(optimise_raw).collect();
			RawParser::new(And(children, fold.clone()))
		}

		Not(inner, default) => RawParser::new(Not(optimise_raw(inner), default.clone())),
		Maybe(inner, default) => RawParser::new(Maybe(optimise_raw(inner), default.clone())),
		Many(inner, fold) => RawParser::new(Many(optimise_raw(inner), fold.clone())),
		Many1(inner, fold) => RawParser::new(Many1(optimise_raw(inner), fold.clone())),
		Count(n, inner, fold) => RawParser::new(Count(*n, optimise_raw(inner), fold.clone())),
		Apply(inner, f) => RawParser::new(Apply(optimise_raw(inner), f.clone())),
		Check(inner, pred, msg) => RawParser::new(Check(optimise_raw(inner), pred.clone(), msg.clone())),
		Captured(inner) => RawParser::new(Captured(optimise_raw(inner))),
		Positioned(inner, f) => RawParser::new(Positioned(optimise_raw(inner), f.clone())),

		// Leaves and Ref are already minimal; Ref additionally must not be recursed
		// into here, or a self-referential rule would optimise forever.
		Fail(_) | Pass | Lift(_) | Anchor(..) | Single(_) | Range(..) | OneOf(_) | NoneOf(_)
		| Satisfy(..) | StringLit(_) | Ref(_) => raw.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::atoms::string;
	use crate::parser::combinators::{expect, or, predictive};

	#[test]
	fn flattens_nested_or_and_keeps_semantics() {
		let a = string(*b"aa");
		let b = string(*b"bb");
		let c = string(*b"cc");
		let nested = or(vec![or(vec![a, b]), c]);
		let flat = optimise(&nested);
		assert_eq!(flat.run("t", b"cc").unwrap(), b"cc".to_vec());
		assert_eq!(flat.run("t", b"aa").unwrap(), b"aa".to_vec());
	}

	#[test]
	fn optimise_is_idempotent() {
		let p = predictive(predictive(expect(expect(string(*b"x"), "a"), "b")));
		let once = optimise(&p);
		let twice = optimise(&once);
		assert_eq!(once.run("t", b"x").unwrap(), twice.run("t", b"x").unwrap());
		let e1 = once.run("t", b"y").unwrap_err();
		let e2 = twice.run("t", b"y").unwrap_err();
		assert_eq!(e1.to_string(), e2.to_string());
	}
}
