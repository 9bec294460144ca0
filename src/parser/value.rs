//! The engine's opaque, destructor-free user value.
//!
//! The spec treats a successful parse result as "a pointer-identified object with a
//! user-supplied destructor". In Rust, an owned value already runs its own `Drop` impl
//! on every path out of scope, so a boxed [`Any`] plays that role with no destructor
//! parameter needed anywhere in the public API — see DESIGN.md for why this
//! simplification is faithful to the spec's own "statically-typed target" guidance.

use std::any::Any;

/// A type-erased, owned parse result. Downcasting back to the wrong type is an
/// internal combinator-wiring bug, not a user error, so it panics rather than
/// returning a `Result`.
pub struct Value(Box<dyn Any>);

impl Value {
	pub fn new<T: 'static>(v: T) -> Self {
		Value(Box::new(v))
	}

	pub fn downcast<T: 'static>(self) -> T {
		match self.0.downcast::<T>() {
			Ok(v) => *v,
			Err(_) => panic!("parsekit: internal value type mismatch (combinator wiring bug)"),
		}
	}

	/// Borrows the boxed value as `T` without consuming it, for combinators (like
	/// `check`) that need to inspect a result before deciding whether to keep it.
	pub fn downcast_ref<T: 'static>(&self) -> &T {
		self.0
			.downcast_ref::<T>()
			.unwrap_or_else(|| panic!("parsekit: internal value type mismatch (combinator wiring bug)"))
	}
}
