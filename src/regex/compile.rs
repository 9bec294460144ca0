//! Translates a regex [`Node`] into a tree of the same combinators the rest of the
//! engine uses — no separate matching engine, per the spec's dogfooding requirement.

use std::rc::Rc;

use crate::parser::atoms::{char, pass, satisfy};
use crate::parser::combinators::{anchor, and_many, captured, count, erase, many, map, maybe};
use crate::parser::Parser;

use super::ast::Node;
use super::Flags;

pub(crate) fn compile(node: &Node, flags: Flags) -> Parser<Vec<u8>> {
	captured(&compile_inner(node, flags))
}

fn compile_inner(node: &Node, flags: Flags) -> Parser<()> {
	match node {
		Node::Literal(b) => map(&char(*b), |_| ()),

		Node::Any => {
			let dotall = flags.contains(Flags::DOTALL);
			map(
				&satisfy("any byte", move |b| dotall || b != b'\n'),
				|_| (),
			)
		}

		Node::Class { items, negated } => {
			let items = items.clone();
			let negated = *negated;
			map(
				&satisfy("character class", move |b| {
					items.iter().any(|it| it.matches(b)) != negated
				}),
				|_| (),
			)
		}

		Node::StartAnchor => {
			let multiline = flags.contains(Flags::MULTILINE);
			anchor("start of input", move |last, _next| {
				last == 0 || (multiline && last == b'\n')
			})
		}

		Node::EndAnchor => {
			let multiline = flags.contains(Flags::MULTILINE);
			anchor("end of input", move |_last, next| {
				next.is_none() || (multiline && next == Some(b'\n'))
			})
		}

		Node::Group(inner) => compile_inner(inner, flags),

		Node::Concat(items) => {
			let parts = items.iter().map(|n| compile_inner(n, flags)).collect();
			seq_unit(parts)
		}

		Node::Alt(alts) => {
			let compiled = alts.iter().map(|n| compile_inner(n, flags)).collect();
			crate::parser::combinators::or(compiled)
		}

		Node::Repeat { inner, min, max } => compile_repeat(inner, *min, *max, flags),
	}
}

fn compile_repeat(inner: &Node, min: usize, max: Option<usize>, flags: Flags) -> Parser<()> {
	let inner_parser = compile_inner(inner, flags);

	let mandatory = (min > 0).then(|| {
		count(min, Rc::new(|_: Vec<()>| ()), inner_parser.clone())
	});

	let extra = match max {
		// Unbounded: `Many`'s own "stop at the first non-consuming failure" rule
		// already gives the greedy-until-it-can't behaviour the spec asks for.
		None => Some(many(Rc::new(|_: Vec<()>| ()), inner_parser.clone())),
		Some(max) => {
			let extra_n = max.saturating_sub(min);
			if extra_n == 0 {
				None
			} else {
				// Each extra slot is independently optional: once one fails to match
				// at the current position, every later slot sees the same
				// unconsumed input and fails too, so this sequence naturally stops
				// at the first non-match exactly like an unbounded `Many` would.
				let slots = (0..extra_n)
					.map(|_| map(&maybe(&inner_parser), |_| ()))
					.collect();
				Some(seq_unit(slots))
			}
		}
	};

	seq_unit([mandatory, extra].into_iter().flatten().collect())
}

fn seq_unit(parts: Vec<Parser<()>>) -> Parser<()> {
	if parts.is_empty() {
		return pass();
	}
	let erased = parts.into_iter().map(erase).collect();
	and_many(erased, |_values| ())
}
