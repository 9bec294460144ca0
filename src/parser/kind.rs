//! The tagged parser value. One enum, one payload variant per combinator, so
//! evaluation (`eval.rs`) is a single flat `match` — no virtual dispatch, no
//! function-pointer tables.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ParseError, Position};
use crate::parser::value::Value;

/// An immutable-after-definition parser node. Cloning a `RawParser` clones the `Rc`,
/// not the tree — combinators share structure the way the spec's transfer-of-ownership
/// model shares a retained sub-parser.
#[derive(Clone)]
pub(crate) struct RawParser {
	pub(crate) kind: Rc<ParserKind>,
}

impl RawParser {
	pub(crate) fn new(kind: ParserKind) -> Self {
		RawParser { kind: Rc::new(kind) }
	}
}

/// A named, possibly-retained recursive reference. Only `Ref` nodes need an explicit
/// lifecycle: every other parser is freed by ordinary `Drop` the moment nothing
/// references it. A `Ref`'s body can point back through the tree to the `Ref` itself
/// (that's the whole point of recursion), so the `Rc` cycle it forms would otherwise
/// never reach a refcount of zero — `undefine` breaks the cycle explicitly.
pub(crate) struct RefNode {
	pub(crate) name: String,
	pub(crate) body: RefCell<Option<RawParser>>,
}

pub(crate) enum ParserKind {
	Fail(String),
	Pass,
	Lift(Rc<dyn Fn() -> Value>),
	Expect(RawParser, String),
	/// predicate over (last_char, peek), and the label used when it rejects.
	Anchor(Rc<dyn Fn(u8, Option<u8>) -> bool>, String),
	Single(u8),
	Range(u8, u8),
	OneOf(Rc<[u8]>),
	NoneOf(Rc<[u8]>),
	Satisfy(Rc<dyn Fn(u8) -> bool>, String),
	StringLit(Rc<[u8]>),
	Apply(RawParser, Rc<dyn Fn(Value) -> Value>),
	Check(RawParser, Rc<dyn Fn(&Value) -> bool>, String),
	Predict(RawParser),
	Not(RawParser, Rc<dyn Fn() -> Value>),
	Maybe(RawParser, Rc<dyn Fn() -> Value>),
	Many(RawParser, Rc<dyn Fn(Vec<Value>) -> Value>),
	Many1(RawParser, Rc<dyn Fn(Vec<Value>) -> Value>),
	Count(usize, RawParser, Rc<dyn Fn(Vec<Value>) -> Value>),
	Or(Vec<RawParser>),
	And(Vec<RawParser>, Rc<dyn Fn(Vec<Value>) -> Value>),
	/// Runs `inner` purely for its consumption and discards its value, returning the
	/// exact bytes it consumed instead. Used by the regex compiler to turn a tree of
	/// combinators back into the "matched substring" the spec's `re()` promises,
	/// without adding a new evaluation rule beyond "remember where you started".
	Captured(RawParser),
	/// Runs `inner`, then calls `f` with its value and the position the match
	/// *started* at. Used by the grammar compiler to stamp `AstNode::state` without
	/// the AST-builder code needing direct access to the `Input` cursor.
	Positioned(RawParser, Rc<dyn Fn(Value, Position) -> Value>),
	Ref(Rc<RefNode>),
}

/// Internal control-flow signal threaded through `eval`.
///
/// `Recoverable` is an ordinary failure: the nearest enclosing `Or` rewinds and tries
/// the next alternative. `Cut` means a `Predict`-wrapped parser consumed input and then
/// failed — backtracking is disabled at that boundary, so the failure must propagate
/// past any enclosing `Or` without trying further alternatives. This mirrors the
/// `ErrMode::{Backtrack, Cut}` split some combinator libraries use for the same
/// cut/commit idea.
pub(crate) enum Flow {
	Recoverable(ParseError),
	Cut(ParseError),
}

impl Flow {
	pub(crate) fn into_error(self) -> ParseError {
		match self {
			Flow::Recoverable(e) | Flow::Cut(e) => e,
		}
	}

	pub(crate) fn is_cut(&self) -> bool {
		matches!(self, Flow::Cut(_))
	}
}
