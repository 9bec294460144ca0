//! Compiles a regular expression string to a [`Parser<Vec<u8>>`] over the same
//! combinator core the rest of the crate is built from.

mod ast;
mod compile;
mod parse;

use bitflags::bitflags;

use crate::error::ParseError;
use crate::parser::Parser;

bitflags! {
	/// Regex compile-time options, per spec §6.1.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct Flags: u8 {
		/// `^`/`$` also match immediately after/before an embedded `\n`.
		const MULTILINE = 0b0000_0001;
		/// `.` matches `\n` too (by default it does not).
		const DOTALL    = 0b0000_0010;
	}
}

/// Compiles `pattern` into a parser that matches a prefix of its input and returns the
/// matched bytes. Fails with a [`ParseError`] pointing into `pattern` itself if the
/// regex syntax is malformed.
#[tracing::instrument(level = "debug", skip_all, fields(pattern = %pattern, ?flags))]
pub fn re(pattern: &str, flags: Flags) -> Result<Parser<Vec<u8>>, ParseError> {
	let ast = parse::parse_pattern(pattern)?;
	Ok(compile::compile(&ast, flags))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identifier_regex_matches_expected_prefix() {
		let p = re("[a-zA-Z_][a-zA-Z_0-9]*", Flags::empty()).unwrap();
		let matched = p.run("id", b"foo_123 bar").unwrap();
		assert_eq!(matched, b"foo_123".to_vec());
	}

	#[test]
	fn dotall_controls_newline_matching() {
		let without = re(".", Flags::empty()).unwrap();
		assert!(without.run("t", b"\n").is_err());
		let with = re(".", Flags::DOTALL).unwrap();
		assert_eq!(with.run("t", b"\n").unwrap(), b"\n".to_vec());
	}

	#[test]
	fn alternation_and_star_quantifier() {
		let p = re("ab*|c", Flags::empty()).unwrap();
		assert_eq!(p.run("t", b"abbb").unwrap(), b"abbb".to_vec());
		assert_eq!(p.run("t", b"c").unwrap(), b"c".to_vec());
	}

	#[test]
	fn bounded_quantifier_respects_upper_limit() {
		let p = re("a{2,3}", Flags::empty()).unwrap();
		// Greedy within the bound: stops at 3 even though a 4th 'a' follows.
		let matched = p.run("t", b"aaaa").unwrap();
		assert_eq!(matched, b"aaa".to_vec());
	}

	#[test]
	fn malformed_pattern_reports_an_error() {
		assert!(re("a(b", Flags::empty()).is_err());
	}
}
