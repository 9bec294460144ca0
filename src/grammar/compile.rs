//! Binds a parsed grammar's rule bodies to a caller-supplied table of retained `Ref`
//! parsers, compiling each rule body into a network of the same combinators the rest
//! of the crate is built from.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{ParseError, Position, Received};
use crate::parser::atoms::char as char_atom;
use crate::parser::combinators::{
	and_many, erase, many, many1, map, maybe_or, or, predictive, with_position,
};
use crate::parser::recursion;
use crate::parser::Parser;
use crate::regex;

use super::ast::AstNode;
use super::parse::{Expr, RuleDef};
use super::Flags;

/// Compiles `rules` and binds each one's body to the matching entry of `refs`.
/// `refs` must contain exactly the rule names `rules` defines; an unknown reference
/// (either a `<name>` factor with no matching rule, or a rule body with no
/// pre-declared `Ref`) is reported as a malformed-grammar [`ParseError`], not a panic
/// — the grammar *text* is the thing at fault, not the caller's Rust code.
/// Returns the list of rule targets it successfully bound, in rule order — even on
/// error, so [`super::language`] can undo a partial bind and leave `refs` untouched.
pub(crate) fn compile_and_bind(
	flags: Flags,
	rules: &[RuleDef],
	refs: &HashMap<String, Parser<AstNode>>,
) -> (Vec<Parser<AstNode>>, Result<(), ParseError>) {
	let mut bound = Vec::with_capacity(rules.len());
	for rule in rules {
		let target = match refs.get(&rule.name) {
			Some(t) => t,
			None => {
				return (
					bound,
					Err(grammar_error(format!(
						"rule {:?} has a body but no pre-declared parser was supplied for it",
						rule.name
					))),
				)
			}
		};
		let tag = rule.label.clone().unwrap_or_else(|| rule.name.clone());
		let children = match compile_expr(&rule.body, refs, flags) {
			Ok(c) => c,
			Err(e) => return (bound, Err(e)),
		};
		let node = with_position(&children, move |children, pos| {
			AstNode::interior(tag.clone(), pos, children)
		});
		recursion::define(target, node);
		bound.push(target.clone());
	}
	(bound, Ok(()))
}

pub(crate) fn grammar_error(message: impl Into<String>) -> ParseError {
	ParseError::new_fail("<grammar>", Position::default(), Received::Eof, message)
}

fn runtime_ws() -> Parser<Vec<AstNode>> {
	map(
		&many(
			Rc::new(|_: Vec<u8>| ()),
			crate::parser::atoms::one_of(Rc::from(&b" \t\r\n"[..])),
		),
		|_: ()| Vec::new(),
	)
}

fn compile_expr(
	expr: &Expr,
	refs: &HashMap<String, Parser<AstNode>>,
	flags: Flags,
) -> Result<Parser<Vec<AstNode>>, ParseError> {
	match expr {
		Expr::StringLit(bytes) => {
			let bytes = bytes.clone();
			let matcher = crate::parser::atoms::string(bytes.clone());
			Ok(with_position(&matcher, move |_v, pos| {
				vec![AstNode::leaf("string", bytes.to_vec(), pos)]
			}))
		}

		Expr::ByteLit(b) => {
			let b = *b;
			Ok(with_position(&char_atom(b), move |_v, pos| {
				vec![AstNode::leaf("char", vec![b], pos)]
			}))
		}

		Expr::Regex(pattern) => {
			// Grammar-level flags (PREDICTIVE, WHITESPACE_SENSITIVE) have no regex
			// counterpart; embedded regexes always compile under default regex flags.
			let matcher = regex::re(pattern, regex::Flags::empty())
				.map_err(|e| grammar_error(format!("embedded regex /{pattern}/ is invalid: {e}")))?;
			Ok(with_position(&matcher, |bytes, pos| {
				vec![AstNode::leaf("regex", bytes, pos)]
			}))
		}

		Expr::RuleRef(name, pos) => {
			let target = refs.get(name).cloned().ok_or_else(|| {
				ParseError::new_fail(
					"<grammar>",
					*pos,
					Received::Eof,
					format!("reference to undeclared rule <{name}>"),
				)
			})?;
			Ok(map(&target, |node| vec![node]))
		}

		Expr::Seq(parts) => {
			let mut compiled = Vec::with_capacity(parts.len() * 2);
			for (i, part) in parts.iter().enumerate() {
				if i > 0 && !flags.contains(Flags::WHITESPACE_SENSITIVE) {
					compiled.push(erase(runtime_ws()));
				}
				compiled.push(erase(compile_expr(part, refs, flags)?));
			}
			Ok(and_many(compiled, |values| {
				values
					.into_iter()
					.flat_map(crate::parser::Value::downcast::<Vec<AstNode>>)
					.collect()
			}))
		}

		Expr::Alt(branches) => {
			let mut compiled = Vec::with_capacity(branches.len());
			for branch in branches {
				let p = compile_expr(branch, refs, flags)?;
				compiled.push(if flags.contains(Flags::PREDICTIVE) {
					predictive(&p)
				} else {
					p
				});
			}
			Ok(or(compiled))
		}

		Expr::Opt(inner) => {
			let p = compile_expr(inner, refs, flags)?;
			Ok(maybe_or(&p, Vec::new))
		}

		Expr::Star(inner) => {
			let p = compile_expr(inner, refs, flags)?;
			Ok(many(Rc::new(flatten), p))
		}

		Expr::Plus(inner) => {
			let p = compile_expr(inner, refs, flags)?;
			Ok(many1(Rc::new(flatten), p))
		}
	}
}

fn flatten(items: Vec<Vec<AstNode>>) -> Vec<AstNode> {
	items.into_iter().flatten().collect()
}
