//! A parser combinator engine: an [`Input`](input::Input) layer with bounded-lookahead
//! backtracking, a [`ParseError`](error::ParseError) layer with mergeable expectation
//! sets, a tagged-value [`Parser`](parser::Parser) core, and regex and EBNF grammar
//! front-ends compiled down to that same core.
//!
//! ```
//! use parsekit::parser::atoms::{char, range};
//! use parsekit::parser::combinators::{and2, many1};
//!
//! let digit = range(b'0', b'9');
//! let digits = many1(std::rc::Rc::new(|ds: Vec<u8>| ds), digit);
//! let plus = char(b'+');
//! let sum = and2(&digits, &plus, |a, _| a);
//! assert_eq!(sum.run("expr", b"12+").unwrap(), vec![b'1', b'2']);
//! ```

pub mod error;
pub mod grammar;
pub mod input;
pub mod parser;
pub mod regex;

pub use error::{ParseError, Position, Received, UsageError};
pub use input::Input;
pub use parser::Parser;

/// Parses `bytes` in one shot against an in-memory buffer.
///
/// A thin, instrumented wrapper over [`Parser::run`] — the method form is equally
/// usable; this free function exists for callers that want a single top-level entry
/// point to trace regardless of which parser they're running.
#[tracing::instrument(level = "info", skip(parser, bytes), fields(filename = %filename.as_ref()))]
pub fn parse<T: 'static>(
	parser: &Parser<T>,
	filename: impl AsRef<str>,
	bytes: impl AsRef<[u8]>,
) -> Result<T, ParseError> {
	parser.run(filename, bytes)
}

/// Parses a forward-only stream, buffering only as far back as the parser's own
/// backtracking needs.
#[tracing::instrument(level = "info", skip(parser, reader), fields(filename = %filename.as_ref()))]
pub fn parse_stream<T: 'static>(
	parser: &Parser<T>,
	filename: impl AsRef<str>,
	reader: impl std::io::Read + 'static,
) -> Result<T, ParseError> {
	parser.run_stream(filename, reader)
}
