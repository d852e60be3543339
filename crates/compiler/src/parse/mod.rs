// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Turns a raw plan, an ordered map from step reference to step text, into a
//! validated [`Plan`].

use indexmap::IndexMap;
use sqr_type::Result;
use tracing::{instrument, trace};

use crate::{
	error::SqrError,
	ontology::Ontology,
	plan::{Argument, Literal, Plan, Step, StepRef},
};

mod token;
mod validate;

pub use token::{Fault, Token, split_step, tokenize};

#[instrument(name = "plan::parse", level = "debug", skip_all, fields(steps = raw.len()))]
pub fn parse(raw: &IndexMap<String, String>) -> Result<Plan> {
	let steps = parse_steps(raw.iter().map(|(k, v)| (k.clone(), v.clone())))?;
	validate::check_references(&steps)?;
	Plan::new(steps)
}

/// Parses a JSON object of step texts, keeping the key order.
pub fn parse_json(text: &str) -> Result<Plan> {
	let raw: IndexMap<String, String> = serde_json::from_str(text)?;
	parse(&raw)
}

pub(crate) fn parse_steps(raw: impl IntoIterator<Item = (String, String)>) -> Result<IndexMap<StepRef, Step>> {
	let mut steps = IndexMap::new();
	for (key, text) in raw {
		let Some(reference) = StepRef::parse(key.trim()) else {
			return Err(SqrError::InvalidStepReference {
				reference: key,
			}
			.into());
		};

		if steps.contains_key(&reference) {
			return Err(SqrError::MalformedStep {
				step: reference.to_string(),
				text,
				message: "step is defined more than once".to_string(),
			}
			.into());
		}

		let step = parse_step(reference.clone(), &text)?;
		trace!(step = %reference, text = %step, "parsed step");
		steps.insert(reference, step);
	}
	Ok(steps)
}

/// Parses and validates a single step.
pub fn parse_step(reference: StepRef, text: &str) -> Result<Step> {
	let (name, tokens) = split_step(text).map_err(|fault| SqrError::MalformedStep {
		step: reference.to_string(),
		text: text.to_string(),
		message: format!("{} at position {}", fault.message, fault.position),
	})?;

	let Some(operation) = Ontology::get().lookup(&name) else {
		return Err(SqrError::UnknownOperation {
			step: Some(reference.to_string()),
			name,
		}
		.into());
	};

	let args = tokens
		.into_iter()
		.filter_map(|token| match token {
			Token::Quoted(s) => Some(Argument::Literal(Literal::Quoted(s))),
			Token::Word(w) => Some(match StepRef::parse(&w) {
				Some(r) => Argument::Reference(r),
				None => Argument::Literal(Literal::Bare(w)),
			}),
			Token::Open | Token::Close => None,
		})
		.collect();

	let step = Step {
		reference,
		operation,
		args,
	};
	validate::check_arity(&step)?;
	validate::check_shape(&step)?;
	Ok(step)
}

#[cfg(test)]
mod tests {
	use sqr_type::ErrorKind;

	use super::*;
	use crate::ontology::Operation;

	fn step(text: &str) -> Result<Step> {
		parse_step(StepRef::parse("|1|").unwrap(), text)
	}

	fn plan(raw: &[(&str, &str)]) -> Result<Plan> {
		parse(&raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
	}

	#[test]
	fn test_parse_arguments() {
		let s = step(r#"(exact |3| "Engineering")"#).unwrap();
		assert_eq!(s.operation, Operation::Exact);
		assert_eq!(s.args, vec![
			Argument::Reference(StepRef::parse("|3|").unwrap()),
			Argument::Literal(Literal::Quoted("Engineering".to_string())),
		]);

		let s = step("(greaterthan |3| 30)").unwrap();
		assert_eq!(s.args[1], Argument::Literal(Literal::Bare("30".to_string())));
	}

	#[test]
	fn test_unknown_operation_names_step() {
		let err = step("(frobnicate |1|)").unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Ontology);
		assert_eq!(err.step.as_deref(), Some("|1|"));
		assert_eq!(err.operation.as_deref(), Some("frobnicate"));
	}

	#[test]
	fn test_malformed_text_is_syntax_error() {
		for text in ["()", "(collect |1|", "collect |1|", "(collect (|1|))", r#"(exact |1| "x)"#] {
			let err = step(text).unwrap_err();
			assert_eq!(err.kind(), ErrorKind::Syntax, "{}", text);
		}
	}

	#[test]
	fn test_invalid_key_is_syntax_error() {
		let err = plan(&[("1", "(retrieve_entity Person)")]).unwrap_err();
		assert_eq!(err.code(), "SYNTAX_001");
	}

	#[test]
	fn test_arity_is_checked_eagerly() {
		let err = step("(sqrt |2| |3|)").unwrap_err();
		assert_eq!(err.code(), "ONTOLOGY_002");
		assert!(err.message.contains("expects 1 argument"));

		let err = step("(add |2|)").unwrap_err();
		assert!(err.message.contains("at least 2"));

		assert!(step("(average |2| |3|)").is_ok());
	}

	#[test]
	fn test_argument_shapes() {
		assert_eq!(step("(sort |2| sideways)").unwrap_err().code(), "ONTOLOGY_003");
		assert_eq!(step("(sort |2| asc |3|)").unwrap_err().code(), "ONTOLOGY_003");
		assert!(step("(sort |2| asc |3| DESC)").is_ok());
		assert_eq!(step("(limit -1)").unwrap_err().code(), "ONTOLOGY_003");
		assert_eq!(step("(limit ten)").unwrap_err().code(), "ONTOLOGY_003");
		assert_eq!(step("(collect |2| age)").unwrap_err().code(), "ONTOLOGY_003");
		assert_eq!(step("(retrieve_entity |2|)").unwrap_err().code(), "ONTOLOGY_003");
	}

	#[test]
	fn test_return_must_read_a_collect() {
		let err = plan(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(return |2|)"),
		])
		.unwrap_err();
		assert_eq!(err.code(), "ONTOLOGY_003");
		assert_eq!(err.step.as_deref(), Some("|3|"));
	}

	#[test]
	fn test_attribute_argument_is_not_an_edge() {
		let plan = plan(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(collect |2|)"),
			("|4|", "(return |3|)"),
			("|5|", "(retrieve_attribute |4| |2|)"),
			("|6|", "(collect |5|)"),
			("|7|", "(return |6|)"),
		])
		.unwrap();
		let parents = plan.graph().parents(&StepRef::parse("|5|").unwrap());
		assert_eq!(parents, &[StepRef::parse("|4|").unwrap()]);
	}

	#[test]
	fn test_parse_json_keeps_order() {
		let plan = parse_json(
			r#"{"|b|": "(retrieve_entity Person)", "|a|": "(retrieve_attribute |b| age)",
			    "|c|": "(collect |a|)", "|d|": "(return |c|)"}"#,
		)
		.unwrap();
		let keys: Vec<String> = plan.steps().keys().map(|k| k.to_string()).collect();
		assert_eq!(keys, vec!["|b|", "|a|", "|c|", "|d|"]);
	}
}
