//! The Parser Core layer: a tagged-value combinator engine with a statically-typed
//! public face.
//!
//! [`RawParser`]/[`ParserKind`] (in [`kind`]) are the untyped, type-erased internal
//! representation every combinator builds and [`eval`] walks. [`Parser<T>`] is a thin
//! phantom-typed wrapper around a `RawParser` that downcasts back to `T` only at the
//! two edges a caller actually touches: [`Parser::run`]/[`Parser::run_stream`] on the
//! way out, and the closures passed to [`combinators::map`]/[`combinators::and`]/etc. on
//! the way in. Nothing in between is generic — see DESIGN.md for why that matches the
//! "flat switch over a tag, no per-combinator vtable" requirement.

pub mod atoms;
pub mod combinators;
mod eval;
mod kind;
pub mod optimise;
pub mod recursion;
mod value;

use std::marker::PhantomData;

use crate::error::ParseError;
use crate::input::Input;
use kind::RawParser;

pub(crate) use kind::{Flow, ParserKind, RefNode};
pub(crate) use value::Value;

/// A parser that produces a `T` on success.
///
/// `Parser<T>` is `Clone` (cheap — it clones an `Rc`, not the parse tree) so the same
/// combinator can be reused wherever `Parser<T>: Clone` composition needs it (e.g. as
/// one alternative among several `Or` branches built from a shared sub-parser).
pub struct Parser<T> {
	pub(crate) raw: RawParser,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Parser<T> {
	fn clone(&self) -> Self {
		Parser {
			raw: self.raw.clone(),
			_marker: PhantomData,
		}
	}
}

impl<T: 'static> Parser<T> {
	pub(crate) fn from_raw(raw: RawParser) -> Self {
		Parser {
			raw,
			_marker: PhantomData,
		}
	}

	/// Runs this parser against an in-memory byte buffer. Does not require the whole
	/// input be consumed — wrap with [`combinators::eof`] via `and` if that's wanted.
	#[tracing::instrument(level = "debug", skip(self, bytes), fields(filename = %filename.as_ref()))]
	pub fn run(&self, filename: impl AsRef<str>, bytes: impl AsRef<[u8]>) -> Result<T, ParseError> {
		let mut input = Input::from_bytes(filename.as_ref().to_string(), bytes.as_ref());
		self.run_on(&mut input)
	}

	/// Runs this parser against a forward-only byte stream.
	#[tracing::instrument(level = "debug", skip(self, reader), fields(filename = %filename.as_ref()))]
	pub fn run_stream(
		&self,
		filename: impl AsRef<str>,
		reader: impl std::io::Read + 'static,
	) -> Result<T, ParseError> {
		let mut input = Input::from_reader(filename.as_ref().to_string(), reader);
		self.run_on(&mut input)
	}

	fn run_on(&self, input: &mut Input) -> Result<T, ParseError> {
		eval::eval(&self.raw, input)
			.map(|v| v.downcast())
			.map_err(Flow::into_error)
	}

	/// Runs this parser with no side effect beyond validating that it accepts the
	/// input: the success value is discarded. Used to check a grammar/regex against
	/// sample input without caring about the produced AST.
	pub fn matches(&self, filename: impl AsRef<str>, bytes: impl AsRef<[u8]>) -> bool {
		self.run(filename, bytes).is_ok()
	}
}

impl<T: 'static> std::fmt::Debug for Parser<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Parser<{}>(..)", std::any::type_name::<T>())
	}
}
