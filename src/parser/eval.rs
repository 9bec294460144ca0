//! Evaluation of a tagged parser value against an [`Input`].

use crate::error::escape_byte;
use crate::input::Input;
use crate::parser::kind::{Flow, ParserKind, RawParser};
use crate::parser::value::Value;

pub(crate) fn eval(p: &RawParser, input: &mut Input) -> Result<Value, Flow> {
	match &*p.kind {
		ParserKind::Fail(msg) => Err(Flow::Recoverable(input.error_fail(msg.clone()))),

		ParserKind::Pass => Ok(Value::new(())),

		ParserKind::Lift(f) => Ok(f()),

		ParserKind::Expect(inner, label) => eval(inner, input).map_err(|flow| match flow {
			Flow::Recoverable(e) => Flow::Recoverable(e.relabel(label.clone())),
			Flow::Cut(e) => Flow::Cut(e.relabel(label.clone())),
		}),

		ParserKind::Anchor(pred, label) => {
			let last = input.last_char();
			let next = input.peek();
			if pred(last, next) {
				Ok(Value::new(()))
			} else {
				Err(Flow::Recoverable(input.error_expect(label.clone())))
			}
		}

		ParserKind::Single(byte) => match input.peek() {
			Some(b) if b == *byte => {
				input.next();
				Ok(Value::new(b))
			}
			_ => Err(Flow::Recoverable(
				input.error_expect(format!("'{}'", escape_byte(*byte))),
			)),
		},

		ParserKind::Range(lo, hi) => match input.peek() {
			Some(b) if b >= *lo && b <= *hi => {
				input.next();
				Ok(Value::new(b))
			}
			_ => Err(Flow::Recoverable(input.error_expect(format!(
				"byte in range '{}'-'{}'",
				escape_byte(*lo),
				escape_byte(*hi)
			)))),
		},

		ParserKind::OneOf(set) => match input.peek() {
			Some(b) if set.contains(&b) => {
				input.next();
				Ok(Value::new(b))
			}
			_ => Err(Flow::Recoverable(
				input.error_expect(format!("one of \"{}\"", describe_set(set))),
			)),
		},

		ParserKind::NoneOf(set) => match input.peek() {
			Some(b) if !set.contains(&b) => {
				input.next();
				Ok(Value::new(b))
			}
			_ => Err(Flow::Recoverable(
				input.error_expect(format!("none of \"{}\"", describe_set(set))),
			)),
		},

		ParserKind::Satisfy(pred, label) => match input.peek() {
			Some(b) if pred(b) => {
				input.next();
				Ok(Value::new(b))
			}
			_ => Err(Flow::Recoverable(input.error_expect(label.clone()))),
		},

		ParserKind::StringLit(lit) => {
			for &expected in lit.iter() {
				match input.peek() {
					Some(b) if b == expected => {
						input.next();
					}
					_ => {
						return Err(Flow::Recoverable(
							input.error_expect(format!("\"{}\"", describe_set(lit))),
						));
					}
				}
			}
			Ok(Value::new(lit.to_vec()))
		}

		ParserKind::Apply(inner, f) => eval(inner, input).map(|v| f(v)),

		ParserKind::Check(inner, pred, message) => eval(inner, input).and_then(|v| {
			if pred(&v) {
				Ok(v)
			} else {
				Err(Flow::Recoverable(input.error_fail(message.clone())))
			}
		}),

		ParserKind::Predict(inner) => {
			let mark = input.mark();
			let start = input.position();
			match eval(inner, input) {
				Ok(v) => {
					input.commit(mark);
					Ok(v)
				}
				Err(flow) => {
					let consumed = input.position().offset != start.offset;
					input.commit(mark);
					if consumed {
						Err(Flow::Cut(flow.into_error()))
					} else {
						Err(flow)
					}
				}
			}
		}

		ParserKind::Not(inner, default) => {
			let mark = input.mark();
			let start = input.position();
			match eval(inner, input) {
				Ok(_discarded) => {
					input.rewind(mark);
					Err(Flow::Recoverable(input.error_unexpected_at(start)))
				}
				Err(_) => {
					input.rewind(mark);
					Ok(default())
				}
			}
		}

		ParserKind::Maybe(inner, default) => {
			let mark = input.mark();
			let start = input.position();
			match eval(inner, input) {
				Ok(v) => {
					input.commit(mark);
					Ok(v)
				}
				Err(Flow::Cut(e)) => {
					input.commit(mark);
					Err(Flow::Cut(e))
				}
				Err(Flow::Recoverable(e)) => {
					let consumed = input.position().offset != start.offset;
					input.rewind(mark);
					if consumed {
						Err(Flow::Recoverable(e))
					} else {
						Ok(default())
					}
				}
			}
		}

		ParserKind::Many(inner, fold) => eval_many(inner, fold, input, 0),
		ParserKind::Many1(inner, fold) => eval_many(inner, fold, input, 1),

		ParserKind::Count(n, inner, fold) => {
			let mut values = Vec::with_capacity(*n);
			for _ in 0..*n {
				values.push(eval(inner, input)?);
			}
			Ok(fold(values))
		}

		ParserKind::Or(alts) => eval_or(alts, input),

		ParserKind::And(children, fold) => {
			let mut values = Vec::with_capacity(children.len());
			for child in children {
				values.push(eval(child, input)?);
			}
			Ok(fold(values))
		}

		ParserKind::Captured(inner) => {
			let mark = input.mark();
			let start = input.position().offset;
			match eval(inner, input) {
				Ok(_v) => {
					let bytes = input.slice(start);
					input.commit(mark);
					Ok(Value::new(bytes))
				}
				Err(Flow::Cut(e)) => {
					input.commit(mark);
					Err(Flow::Cut(e))
				}
				Err(Flow::Recoverable(e)) => {
					input.rewind(mark);
					Err(Flow::Recoverable(e))
				}
			}
		}

		ParserKind::Positioned(inner, f) => {
			let start = input.position();
			eval(inner, input).map(|v| f(v, start))
		}

		ParserKind::Ref(node) => match &*node.body.borrow() {
			Some(body) => eval(body, input),
			None => panic!(
				"parsekit usage error: parser {:?} was referenced but never defined",
				node.name
			),
		},
	}
}

fn eval_many(
	inner: &RawParser,
	fold: &std::rc::Rc<dyn Fn(Vec<Value>) -> Value>,
	input: &mut Input,
	min: usize,
) -> Result<Value, Flow> {
	let mut values = Vec::new();
	loop {
		let mark = input.mark();
		let start = input.position();
		match eval(inner, input) {
			Ok(v) => {
				input.commit(mark);
				let zero_consumption = input.position().offset == start.offset;
				values.push(v);
				if zero_consumption {
					// A non-consuming success would loop forever; stop after recording it.
					break;
				}
			}
			Err(Flow::Cut(e)) => {
				input.commit(mark);
				return Err(Flow::Cut(e));
			}
			Err(Flow::Recoverable(_)) => {
				input.rewind(mark);
				break;
			}
		}
	}
	if values.len() < min {
		Err(Flow::Recoverable(
			input.error_expect("at least one repetition"),
		))
	} else {
		Ok(fold(values))
	}
}

fn eval_or(alts: &[RawParser], input: &mut Input) -> Result<Value, Flow> {
	let mut accumulated: Option<crate::error::ParseError> = None;
	for alt in alts {
		let mark = input.mark();
		match eval(alt, input) {
			Ok(v) => {
				input.commit(mark);
				return Ok(v);
			}
			Err(Flow::Cut(e)) => {
				input.commit(mark);
				return Err(Flow::Cut(e));
			}
			Err(Flow::Recoverable(e)) => {
				input.rewind(mark);
				accumulated = Some(match accumulated {
					None => e,
					Some(prev) => prev.merge(e),
				});
			}
		}
	}
	match accumulated {
		Some(e) => Err(Flow::Recoverable(e)),
		None => Err(Flow::Recoverable(input.error_fail("no alternatives"))),
	}
}

fn describe_set(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| escape_byte(b)).collect::<String>()
}

#[cfg(test)]
mod tests {
	use super::eval;
	use crate::parser::combinators::*;
	use crate::parser::recursion::copy;
	use crate::parser::Parser;
	use std::rc::Rc;

	fn run<T: 'static>(p: &Parser<T>, bytes: &[u8]) -> Result<T, crate::error::ParseError> {
		let mut input = crate::input::Input::from_bytes("t", Rc::<[u8]>::from(bytes));
		eval(&p.raw, &mut input)
			.map(|v| v.downcast())
			.map_err(|flow| flow.into_error())
	}

	#[test]
	fn or_absorbs_errors_at_max_position() {
		let p = or(vec![string(*b"abc"), string(*b"abd")]);
		let err = run(&p, b"abe").unwrap_err();
		assert_eq!(
			err.to_string(),
			"t:1:3: error: expected \"abc\" or \"abd\" at 'e'"
		);
	}

	#[test]
	fn predict_cuts_off_later_alternatives() {
		let p = or(vec![predictive(string(*b"ab")), string(*b"ac")]);
		let err = run(&p, b"ac").unwrap_err();
		assert_eq!(err.to_string(), "t:1:2: error: expected \"ab\" at 'c'");
	}

	#[test]
	fn many_stops_on_zero_consumption_success() {
		let p = many(Rc::new(|vs: Vec<_>| vs), maybe(&char(b'x')));
		let result = run(&p, b"yyy").unwrap();
		assert_eq!(result, vec![None]);
	}

	#[test]
	fn copy_produces_an_independently_runnable_parser() {
		let p = string(*b"ok");
		let q = copy(&p);
		assert_eq!(run(&p, b"ok").unwrap(), b"ok".to_vec());
		assert_eq!(run(&q, b"ok").unwrap(), b"ok".to_vec());
	}
}
