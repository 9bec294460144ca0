//! Parses regex syntax into a [`Node`] tree, itself using the combinator core —
//! the cross-check the spec calls out: if the core were wrong, it would struggle to
//! parse its own front-end's grammar.

use std::rc::Rc;

use crate::error::ParseError;
use crate::parser::atoms::{char, eof, none_of, range, satisfy};
use crate::parser::combinators::{and2, many, many1, map, maybe, or};
use crate::parser::recursion;
use crate::parser::Parser;

use super::ast::{ClassItem, Node};

const SPECIAL: &[u8] = b"|()[]^$.\\*+?{";

fn escape_literal() -> Parser<u8> {
	let known = satisfy("escaped character", |b| {
		matches!(
			b,
			b'n' | b'r' | b't' | b'\\' | b'.' | b'*' | b'+' | b'?' | b'|' | b'(' | b')' | b'['
				| b']' | b'^' | b'$'
		)
	});
	map(&and2(&char(b'\\'), &known, |_, c| c), |c| match c {
		b'n' => b'\n',
		b'r' => b'\r',
		b't' => b'\t',
		other => other,
	})
}

fn shorthand_class_item() -> Parser<ClassItem> {
	let which = satisfy("class shorthand", |b| {
		matches!(b, b's' | b'S' | b'd' | b'D' | b'w' | b'W')
	});
	map(&and2(&char(b'\\'), &which, |_, c| c), |c| match c {
		b's' => ClassItem::Space,
		b'S' => ClassItem::NotSpace,
		b'd' => ClassItem::Digit,
		b'D' => ClassItem::NotDigit,
		b'w' => ClassItem::Word,
		b'W' => ClassItem::NotWord,
		_ => unreachable!("filtered by `satisfy` above"),
	})
}

fn class_char() -> Parser<u8> {
	or(vec![escape_literal(), none_of(Rc::from(&b"]"[..]))])
}

fn class_item() -> Parser<ClassItem> {
	let plain_or_range = map(
		&and2(
			&class_char(),
			&maybe(&and2(&char(b'-'), &class_char(), |_, hi| hi)),
			|lo, hi| (lo, hi),
		),
		|(lo, hi)| match hi {
			Some(hi) => ClassItem::Range(lo, hi),
			None => ClassItem::Char(lo),
		},
	);
	or(vec![shorthand_class_item(), plain_or_range])
}

fn class_atom() -> Parser<Node> {
	let negated = maybe(&char(b'^'));
	let items = many1(Rc::new(|v: Vec<ClassItem>| v), class_item());
	let opened = and2(&char(b'['), &negated, |_, n| n);
	let body = and2(&opened, &items, |n, items| (n, items));
	let closed = and2(&body, &char(b']'), |b, _| b);
	map(&closed, |(negated, items)| Node::Class {
		items,
		negated: negated.is_some(),
	})
}

fn number() -> Parser<usize> {
	let digits = many1(Rc::new(|d: Vec<u8>| d), range(b'0', b'9'));
	map(&digits, |ds| {
		std::str::from_utf8(&ds)
			.expect("ASCII digits are valid UTF-8")
			.parse()
			.expect("digit-only string parses as usize")
	})
}

fn bounded_quantifier() -> Parser<(usize, Option<usize>)> {
	let comma_n = maybe(&and2(&char(b','), &maybe(&number()), |_, n| n));
	let opened = and2(&char(b'{'), &number(), |_, m| m);
	let body = and2(&opened, &comma_n, |m, c| (m, c));
	let closed = and2(&body, &char(b'}'), |b, _| b);
	map(&closed, |(m, comma)| match comma {
		None => (m, Some(m)),
		Some(None) => (m, None),
		Some(Some(n)) => (m, Some(n)),
	})
}

fn quantifier() -> Parser<(usize, Option<usize>)> {
	or(vec![
		map(&char(b'?'), |_| (0usize, Some(1usize))),
		map(&char(b'*'), |_| (0usize, None)),
		map(&char(b'+'), |_| (1usize, None)),
		bounded_quantifier(),
	])
}

fn group_atom(alt_ref: &Parser<Node>) -> Parser<Node> {
	let opened = and2(&char(b'('), alt_ref, |_, n| n);
	let closed = and2(&opened, &char(b')'), |n, _| n);
	map(&closed, |n| Node::Group(Box::new(n)))
}

fn atom_parser(alt_ref: &Parser<Node>) -> Parser<Node> {
	or(vec![
		group_atom(alt_ref),
		class_atom(),
		map(&char(b'.'), |_| Node::Any),
		map(&char(b'^'), |_| Node::StartAnchor),
		map(&char(b'$'), |_| Node::EndAnchor),
		map(&shorthand_class_item(), |item| Node::Class {
			items: vec![item],
			negated: false,
		}),
		map(&escape_literal(), Node::Literal),
		map(&none_of(Rc::from(SPECIAL)), Node::Literal),
	])
}

fn repeat_parser(alt_ref: &Parser<Node>) -> Parser<Node> {
	let atom = atom_parser(alt_ref);
	let q = maybe(&quantifier());
	map(&and2(&atom, &q, |a, q| (a, q)), |(a, q)| match q {
		Some((min, max)) => Node::Repeat {
			inner: Box::new(a),
			min,
			max,
		},
		None => a,
	})
}

fn concat_parser(alt_ref: &Parser<Node>) -> Parser<Node> {
	let rep = repeat_parser(alt_ref);
	map(&many(Rc::new(|v: Vec<Node>| v), rep), |mut items| {
		if items.len() == 1 {
			items.pop().expect("len == 1")
		} else {
			Node::Concat(items)
		}
	})
}

fn alt_body(alt_ref: &Parser<Node>) -> Parser<Node> {
	let first = concat_parser(alt_ref);
	let rest = many(
		Rc::new(|v: Vec<Node>| v),
		and2(&char(b'|'), &concat_parser(alt_ref), |_, c| c),
	);
	map(&and2(&first, &rest, |f, r| (f, r)), |(f, r): (Node, Vec<Node>)| {
		if r.is_empty() {
			f
		} else {
			let mut all = vec![f];
			all.extend(r);
			Node::Alt(all)
		}
	})
}

/// Parses a regex pattern text into its AST. The pattern's own recursive structure
/// (parenthesised groups) is expressed with a retained `Ref`, same as any other
/// recursive grammar rule would be — and torn down the same way once parsing is done.
pub(crate) fn parse_pattern(pattern: &str) -> Result<Node, ParseError> {
	let alt_ref: Parser<Node> = recursion::new("regex-alternation");
	recursion::define(&alt_ref, alt_body(&alt_ref));
	let full = and2(&alt_ref, &eof(), |n, _| n);
	let result = full.run("<regex>", pattern.as_bytes());
	recursion::cleanup(&[alt_ref]);
	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_literal_concat() {
		let node = parse_pattern("ab").unwrap();
		assert!(matches!(node, Node::Concat(items) if items.len() == 2));
	}

	#[test]
	fn parses_alternation_and_quantifier() {
		let node = parse_pattern("a|b*").unwrap();
		match node {
			Node::Alt(alts) => assert_eq!(alts.len(), 2),
			other => panic!("expected Alt, got {other:?}"),
		}
	}

	#[test]
	fn rejects_unbalanced_group() {
		assert!(parse_pattern("(a").is_err());
	}
}
