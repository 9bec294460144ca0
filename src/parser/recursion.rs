//! Named, recursive parser definitions.
//!
//! Every other combinator is freed by ordinary `Drop`. A recursive grammar rule needs
//! a node that can refer to itself, so it gets an explicit three-step lifecycle:
//! [`new`] creates an empty, named placeholder; [`define`] gives it a body (which may
//! itself contain [`Parser::clone`]s of the placeholder, forming a cycle through the
//! shared `Rc`); [`undefine`] breaks that cycle so the whole tree can finally be
//! dropped. [`cleanup`] is the bulk form for tearing down a whole grammar's worth of
//! rules at once.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::UsageError;
use crate::parser::kind::{ParserKind, RefNode};
use crate::parser::{Parser, RawParser};

/// Creates a new, as-yet-undefined named recursive reference. Using it (via `run` or
/// as another parser's child) before [`define`] panics with a usage error.
pub fn new<T: 'static>(name: impl Into<String>) -> Parser<T> {
	let node = Rc::new(RefNode {
		name: name.into(),
		body: RefCell::new(None),
	});
	Parser::from_raw(RawParser::new(ParserKind::Ref(node)))
}

/// Binds `body` as the parser `r` runs. Panics if `r` is not a [`new`]-created
/// reference, or if it is already defined (call [`undefine`] first to redefine).
pub fn define<T: 'static>(r: &Parser<T>, body: Parser<T>) {
	let node = ref_node(r, "define");
	let mut slot = node.body.borrow_mut();
	if slot.is_some() {
		UsageError::DoubleDefine(node.name.clone()).abort();
	}
	*slot = Some(body.raw);
}

/// Clears `r`'s body, breaking any reference cycle it participates in. Idempotent: an
/// already-undefined (or never-defined) reference is left untouched.
pub fn undefine<T: 'static>(r: &Parser<T>) {
	if let Some(node) = try_ref_node(r) {
		*node.body.borrow_mut() = None;
	}
}

/// Drops `r`. Provided for symmetry with the spec's explicit "delete" step; in Rust
/// this is just what happens when `r` goes out of scope, so this is a no-op wrapper
/// kept for callers translating an explicit free-list discipline one to one.
pub fn delete<T: 'static>(_r: Parser<T>) {}

/// Tears down every reference in `refs`, panicking if any of them is not itself a
/// retained, named reference (as opposed to an ordinary, non-recursive parser value).
pub fn cleanup<T: 'static>(refs: &[Parser<T>]) {
	for r in refs {
		match try_ref_node(r) {
			Some(node) => *node.body.borrow_mut() = None,
			None => UsageError::FreeUnretained.abort(),
		}
	}
}

/// Deep-copies a parser tree, sharing (by `Rc`) rather than duplicating any `Ref` node
/// it passes through — re-running `copy`'s result never re-triggers another rule's
/// definition, it just follows the same shared recursive structure.
pub fn copy<T: 'static>(p: &Parser<T>) -> Parser<T> {
	Parser::from_raw(copy_raw(&p.raw))
}

fn copy_raw(raw: &RawParser) -> RawParser {
	use ParserKind::*;
	let kind = match &*raw.kind {
		Fail(msg) => Fail(msg.clone()),
		Pass => Pass,
		Lift(f) => Lift(f.clone()),
		Expect(inner, label) => Expect(copy_raw(inner), label.clone()),
		Anchor(pred, label) => Anchor(pred.clone(), label.clone()),
		Single(b) => Single(*b),
		Range(lo, hi) => Range(*lo, *hi),
		OneOf(set) => OneOf(set.clone()),
		NoneOf(set) => NoneOf(set.clone()),
		Satisfy(pred, label) => Satisfy(pred.clone(), label.clone()),
		StringLit(lit) => StringLit(lit.clone()),
		Apply(inner, f) => Apply(copy_raw(inner), f.clone()),
		Check(inner, pred, msg) => Check(copy_raw(inner), pred.clone(), msg.clone()),
		Predict(inner) => Predict(copy_raw(inner)),
		Not(inner, default) => Not(copy_raw(inner), default.clone()),
		Maybe(inner, default) => Maybe(copy_raw(inner), default.clone()),
		Many(inner, fold) => Many(copy_raw(inner), fold.clone()),
		Many1(inner, fold) => Many1(copy_raw(inner), fold.clone()),
		Count(n, inner, fold) => Count(*n, copy_raw(inner), fold.clone()),
		Or(alts) => Or(alts.iter().map(copy_raw).collect()),
		And(children, fold) => And(children.iter().map(copy_raw).collect(), fold.clone()),
		Captured(inner) => Captured(copy_raw(inner)),
		Positioned(inner, f) => Positioned(copy_raw(inner), f.clone()),
		// Ref nodes are the recursion anchor: share the Rc, don't clone the node, so a
		// grammar's rules keep referring to the same definitions after `copy`.
		Ref(node) => Ref(node.clone()),
	};
	RawParser::new(kind)
}

fn try_ref_node<T: 'static>(r: &Parser<T>) -> Option<Rc<RefNode>> {
	match &*r.raw.kind {
		ParserKind::Ref(node) => Some(node.clone()),
		_ => None,
	}
}

fn ref_node<T: 'static>(r: &Parser<T>, _op: &str) -> Rc<RefNode> {
	match try_ref_node(r) {
		Some(node) => node,
		None => UsageError::Undefined("<not a reference>".to_string()).abort(),
	}
}
