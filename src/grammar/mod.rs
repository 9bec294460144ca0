//! Compiles an EBNF-like grammar source text to a network of parsers yielding a
//! generic [`AstNode`] tree, per spec §4.6. Unlike the regex front-end, a grammar's
//! rules may be mutually recursive, so the caller must pre-declare one retained
//! [`recursion::new`] parser per rule name and hand the whole table in as `refs`;
//! `grammar`/`language` only ever `define` against those targets, never create their
//! own.

mod ast;
mod compile;
mod parse;

use std::collections::HashMap;

use bitflags::bitflags;

use crate::error::ParseError;
use crate::parser::recursion;
use crate::parser::Parser;

pub use ast::AstNode;

bitflags! {
	/// Grammar compile-time options, per spec §4.6/§6.1.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct Flags: u8 {
		const DEFAULT              = 0b0000_0000;
		/// Every `|` alternation in the compiled grammar is wrapped in `Predict`.
		const PREDICTIVE           = 0b0000_0001;
		/// Disables the automatic whitespace skip the compiler otherwise inserts
		/// between the factors of a sequence.
		const WHITESPACE_SENSITIVE = 0b0000_0010;
	}
}

/// Parses and compiles `src`, binding each rule body to the matching entry of `refs`
/// by rule name, and returns the retained parser for the grammar's first rule (the
/// entry point, by the usual EBNF convention that the first production is the start
/// symbol). `refs` must contain one [`recursion::new`]-created, as-yet-undefined
/// [`Parser<AstNode>`] per rule name `src` defines — the caller owns their lifetime
/// and is responsible for eventually [`recursion::cleanup`]-ing them.
#[tracing::instrument(level = "debug", skip_all, fields(?flags, rule_count = refs.len()))]
pub fn grammar(
	flags: Flags,
	src: &str,
	refs: &HashMap<String, Parser<AstNode>>,
) -> Result<Parser<AstNode>, ParseError> {
	let rules = parse::parse_grammar(src)?;
	let entry_name = rules
		.first()
		.map(|r| r.name.clone())
		.ok_or_else(|| compile::grammar_error("grammar source defines no rules"))?;
	let (_bound, result) = compile::compile_and_bind(flags, &rules, refs);
	result?;
	Ok(refs
		.get(&entry_name)
		.expect("entry rule was just bound against refs")
		.clone())
}

/// Dry-runs the same parse-and-compile pipeline as [`grammar`] purely to validate
/// `src` — malformed syntax, a reference to an undeclared rule, or a rule in `refs`
/// with no matching body is reported as an error. Unlike `grammar`, any bindings made
/// against `refs` while validating are undone before returning, so `language` never
/// leaves a caller's retained parsers in a different state than it found them.
#[tracing::instrument(level = "debug", skip_all, fields(?flags, rule_count = refs.len()))]
pub fn language(
	flags: Flags,
	src: &str,
	refs: &HashMap<String, Parser<AstNode>>,
) -> Option<ParseError> {
	let rules = match parse::parse_grammar(src) {
		Ok(rules) => rules,
		Err(e) => return Some(e),
	};
	let (bound, result) = compile::compile_and_bind(flags, &rules, refs);
	for target in &bound {
		recursion::undefine(target);
	}
	result.err()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn declare(names: &[&str]) -> HashMap<String, Parser<AstNode>> {
		names
			.iter()
			.map(|n| (n.to_string(), recursion::new::<AstNode>(*n)))
			.collect()
	}

	const ARITHMETIC: &str = r#"
		expression : <product> (('+'|'-') <product>)*;
		product : <value> (('*'|'/') <value>)*;
		value : /[0-9]+/ | '(' <expression> ')';
	"#;

	#[test]
	fn arithmetic_grammar_produces_expected_leaf_sequence() {
		let refs = declare(&["expression", "product", "value"]);
		let entry = grammar(Flags::DEFAULT, ARITHMETIC, &refs).unwrap();
		let ast = entry.run("<arith>", b"(4*2*11+2)-5").unwrap();
		let leaves: Vec<String> = ast
			.leaves()
			.into_iter()
			.map(|l| String::from_utf8_lossy(l.contents()).into_owned())
			.collect();
		assert_eq!(
			leaves,
			vec!["(", "4", "*", "2", "*", "11", "+", "2", ")", "-", "5"]
		);
		recursion::cleanup(&refs.into_values().collect::<Vec<_>>());
	}

	#[test]
	fn entry_rule_is_tagged_with_its_rule_name() {
		let refs = declare(&["expression", "product", "value"]);
		let entry = grammar(Flags::DEFAULT, ARITHMETIC, &refs).unwrap();
		let ast = entry.run("<arith>", b"1+2").unwrap();
		assert_eq!(ast.tag(), "expression");
		recursion::cleanup(&refs.into_values().collect::<Vec<_>>());
	}

	#[test]
	fn recursive_value_rule_parses_nested_parens_and_cleans_up() {
		let refs = declare(&["expression", "product", "value"]);
		let entry = grammar(Flags::DEFAULT, ARITHMETIC, &refs).unwrap();
		assert!(entry.run("<arith>", b"((1))").is_ok());
		recursion::cleanup(&refs.into_values().collect::<Vec<_>>());
	}

	#[test]
	fn language_validates_without_retaining_bindings() {
		let refs = declare(&["expression", "product", "value"]);
		assert!(language(Flags::DEFAULT, ARITHMETIC, &refs).is_none());
		// Bindings made during validation were undone, so the same refs can be bound
		// again by a real `grammar` call without a double-define panic.
		let entry = grammar(Flags::DEFAULT, ARITHMETIC, &refs).unwrap();
		assert!(entry.run("<arith>", b"7").is_ok());
		recursion::cleanup(&refs.into_values().collect::<Vec<_>>());
	}

	#[test]
	fn language_reports_reference_to_undeclared_rule() {
		let refs = declare(&["expression"]);
		let err = language(Flags::DEFAULT, "expression : <missing>;", &refs);
		assert!(err.is_some());
	}

	#[test]
	fn language_reports_malformed_source() {
		let refs = declare(&["a"]);
		assert!(language(Flags::DEFAULT, "a : 'x'", &refs).is_some());
	}
}
