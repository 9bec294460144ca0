//! Position-stamped expectation sets that merge and render as one-line diagnostics.

use std::fmt;

/// A byte offset plus its 1-indexed row/column, snapshotted at some point in an [`Input`].
///
/// [`Input`]: crate::input::Input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
	pub offset: usize,
	pub row: usize,
	pub col: usize,
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.row, self.col)
	}
}

/// What was actually found at the position a parser failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
	Byte(u8),
	Eof,
}

impl fmt::Display for Received {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Received::Byte(b) => write!(f, "{}", escape_byte(*b)),
			Received::Eof => write!(f, "end of input"),
		}
	}
}

/// Escapes a byte the way a diagnostic wants to show it: printable ASCII as itself,
/// the common whitespace controls by name, anything else as `\xHH`.
pub fn escape_byte(b: u8) -> String {
	match b {
		b'\n' => "\\n".to_string(),
		b'\r' => "\\r".to_string(),
		b'\t' => "\\t".to_string(),
		0x20..=0x7e => (b as char).to_string(),
		_ => format!("\\x{b:02x}"),
	}
}

/// A position-tracked, mergeable parse error.
///
/// Two errors at the same position merge by unioning their expectation sets and
/// concatenating failure messages; an error at a later position absorbs an earlier one.
/// This one type carries every recoverable diagnostic kind in the engine (`Expect`,
/// `Fail`, `Unexpected`, and `GrammarError` — the regex/grammar front-ends just parse
/// under a different `filename`); the only error kind this type does *not* represent is
/// `UsageError`, which is a programming mistake and panics rather than returning a value
/// (see [`UsageError`]).
#[derive(Debug, Clone)]
pub struct ParseError {
	filename: String,
	position: Position,
	received: Received,
	expected: Vec<String>,
	fail_message: Option<String>,
}

impl ParseError {
	/// A singleton expectation at `position`.
	pub fn new_expect(
		filename: impl Into<String>,
		position: Position,
		received: Received,
		label: impl Into<String>,
	) -> Self {
		ParseError {
			filename: filename.into(),
			position,
			received,
			expected: vec![label.into()],
			fail_message: None,
		}
	}

	/// A singleton failure with a `fail` reason (no expectation set).
	pub fn new_fail(
		filename: impl Into<String>,
		position: Position,
		received: Received,
		message: impl Into<String>,
	) -> Self {
		ParseError {
			filename: filename.into(),
			position,
			received,
			expected: Vec::new(),
			fail_message: Some(message.into()),
		}
	}

	pub fn position(&self) -> Position {
		self.position
	}

	pub fn expected(&self) -> &[String] {
		&self.expected
	}

	pub fn fail_message(&self) -> Option<&str> {
		self.fail_message.as_deref()
	}

	/// Replaces the expectation set with `{label}`, leaving position and failure
	/// messages intact. Used by the `Expect` combinator.
	pub fn relabel(mut self, label: impl Into<String>) -> Self {
		self.expected = vec![label.into()];
		self
	}

	/// Merges two errors: the later position absorbs the earlier one; at equal
	/// positions the expectation sets union (insertion order, deduplicated) and the
	/// failure messages concatenate.
	pub fn merge(self, other: Self) -> Self {
		use std::cmp::Ordering;
		match self.position.offset.cmp(&other.position.offset) {
			Ordering::Greater => self,
			Ordering::Less => other,
			Ordering::Equal => {
				let mut expected = self.expected;
				for label in other.expected {
					if !expected.contains(&label) {
						expected.push(label);
					}
				}
				let fail_message = match (self.fail_message, other.fail_message) {
					(Some(a), Some(b)) => Some(format!("{a}; {b}")),
					(Some(a), None) => Some(a),
					(None, Some(b)) => Some(b),
					(None, None) => None,
				};
				ParseError {
					filename: self.filename,
					position: self.position,
					received: self.received,
					expected,
					fail_message,
				}
			}
		}
	}

	/// Renders the source line the error occurred on with a caret under the column,
	/// beneath the one-line diagnostic. Purely additive to the required `Display`
	/// format; useful for editor-style diagnostics.
	pub fn render_snippet(&self, source: &[u8]) -> String {
		let line = source
			.split(|&b| b == b'\n')
			.nth(self.position.row.saturating_sub(1))
			.unwrap_or(&[]);
		let line = String::from_utf8_lossy(line);
		let caret_col = self.position.col.saturating_sub(1);
		format!(
			"{self}\n{line}\n{:>width$}^",
			"",
			width = caret_col,
			line = line
		)
	}
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}:{}: error: ",
			self.filename, self.position.row, self.position.col
		)?;
		if let Some(msg) = &self.fail_message {
			write!(f, "{msg}")?;
		} else {
			write!(f, "expected ")?;
			match self.expected.len() {
				0 => write!(f, "something else")?,
				1 => write!(f, "{}", self.expected[0])?,
				_ => {
					let (last, rest) = self.expected.split_last().expect("non-empty");
					write!(f, "{}", rest.join(", "))?;
					write!(f, " or {last}")?;
				}
			}
		}
		write!(f, " at '{}'", self.received)
	}
}

impl std::error::Error for ParseError {}

/// Programming-error conditions: referencing an undefined rule, defining a parser
/// twice, or passing a non-retained parser to `cleanup`. These never reach a caller as
/// a recoverable [`ParseError`] — they panic with this type's `Display` text, per the
/// "abort with an explicit report, never silently succeed" rule for usage errors.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum UsageError {
	#[error("parser {0:?} was referenced but never defined")]
	Undefined(String),
	#[error("parser {0:?} was defined twice without an intervening undefine")]
	DoubleDefine(String),
	#[error("cleanup() was given a parser that is not a retained, named reference")]
	FreeUnretained,
}

impl UsageError {
	/// Aborts with this usage error, matching the spec's "never silently succeed" rule.
	pub fn abort(self) -> ! {
		panic!("parsekit usage error: {self}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos(offset: usize, row: usize, col: usize) -> Position {
		Position { offset, row, col }
	}

	#[test]
	fn merge_prefers_later_position() {
		let a = ParseError::new_expect("f", pos(0, 1, 1), Received::Byte(b'x'), "a");
		let b = ParseError::new_expect("f", pos(2, 1, 3), Received::Byte(b'y'), "b");
		let merged = a.merge(b);
		assert_eq!(merged.position().offset, 2);
		assert_eq!(merged.expected(), &["b"]);
	}

	#[test]
	fn merge_unions_same_position() {
		let a = ParseError::new_expect("f", pos(2, 1, 3), Received::Byte(b'e'), "\"abc\"");
		let b = ParseError::new_expect("f", pos(2, 1, 3), Received::Byte(b'e'), "\"abd\"");
		let merged = a.merge(b);
		assert_eq!(merged.expected(), &["\"abc\"", "\"abd\""]);
		assert_eq!(
			merged.to_string(),
			"f:1:3: error: expected \"abc\" or \"abd\" at 'e'"
		);
	}

	#[test]
	fn relabel_keeps_position_and_message() {
		let e = ParseError::new_expect("f", pos(0, 1, 1), Received::Eof, "digit")
			.relabel("identifier");
		assert_eq!(e.expected(), &["identifier"]);
		assert_eq!(e.position(), pos(0, 1, 1));
	}

	#[test]
	fn fail_message_replaces_expected_clause() {
		let e = ParseError::new_fail("f", pos(0, 1, 1), Received::Byte(b'x'), "custom failure");
		assert_eq!(e.to_string(), "f:1:1: error: custom failure at 'x'");
	}
}
