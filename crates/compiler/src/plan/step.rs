// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use sqr_type::Value;

use crate::ontology::Operation;

/// A step reference, `|identifier|`. The pipes are part of the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepRef(String);

impl StepRef {
	/// Accepts exactly `|[A-Za-z0-9_]+|`.
	pub fn parse(text: &str) -> Option<Self> {
		let inner = text.strip_prefix('|')?.strip_suffix('|')?;
		if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return None;
		}
		Some(StepRef(text.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for StepRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
	/// Written between quotes in the step text.
	Quoted(String),
	Bare(String),
}

impl Literal {
	pub fn text(&self) -> &str {
		match self {
			Literal::Quoted(s) | Literal::Bare(s) => s,
		}
	}

	/// Quoted literals are always text; bare numbers become numeric values.
	pub fn to_value(&self) -> Value {
		match self {
			Literal::Quoted(s) => Value::Text(s.clone()),
			Literal::Bare(s) => Value::from_token(s),
		}
	}
}

impl Display for Literal {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::Bare(s) => f.write_str(s),
			Literal::Quoted(s) => {
				f.write_str("\"")?;
				for c in s.chars() {
					if c == '"' || c == '\\' {
						f.write_str("\\")?;
					}
					write!(f, "{}", c)?;
				}
				f.write_str("\"")
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Argument {
	Reference(StepRef),
	Literal(Literal),
}

impl Argument {
	pub fn as_reference(&self) -> Option<&StepRef> {
		match self {
			Argument::Reference(r) => Some(r),
			Argument::Literal(_) => None,
		}
	}

	pub fn as_literal(&self) -> Option<&Literal> {
		match self {
			Argument::Literal(l) => Some(l),
			Argument::Reference(_) => None,
		}
	}

	pub fn text(&self) -> &str {
		match self {
			Argument::Reference(r) => r.as_str(),
			Argument::Literal(l) => l.text(),
		}
	}
}

impl Display for Argument {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Argument::Reference(r) => Display::fmt(r, f),
			Argument::Literal(l) => Display::fmt(l, f),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
	pub reference: StepRef,
	pub operation: Operation,
	pub args: Vec<Argument>,
}

impl Step {
	/// References that create graph edges. `retrieve_attribute` only depends on
	/// its first argument; its second names an attribute even when it looks
	/// like a reference.
	pub fn structural_parents(&self) -> impl Iterator<Item = &StepRef> {
		let take = match self.operation {
			Operation::RetrieveAttribute => 1,
			_ => self.args.len(),
		};
		self.args.iter().take(take).filter_map(Argument::as_reference)
	}

	pub fn arg(&self, index: usize) -> Option<&Argument> {
		self.args.get(index)
	}

	pub fn reference_args(&self) -> impl Iterator<Item = &StepRef> {
		self.args.iter().filter_map(Argument::as_reference)
	}
}

impl Display for Step {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}", self.operation.name())?;
		for arg in &self.args {
			write!(f, " {}", arg)?;
		}
		f.write_str(")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_step_ref_parse() {
		assert_eq!(StepRef::parse("|3|").map(|r| r.to_string()), Some("|3|".to_string()));
		assert_eq!(StepRef::parse("|emp_1|").map(|r| r.to_string()), Some("|emp_1|".to_string()));
		assert_eq!(StepRef::parse("||"), None);
		assert_eq!(StepRef::parse("|a b|"), None);
		assert_eq!(StepRef::parse("3"), None);
	}

	#[test]
	fn test_retrieve_attribute_second_argument_is_not_structural() {
		let step = Step {
			reference: StepRef::parse("|8|").unwrap(),
			operation: Operation::RetrieveAttribute,
			args: vec![
				Argument::Reference(StepRef::parse("|7|").unwrap()),
				Argument::Reference(StepRef::parse("|5|").unwrap()),
			],
		};
		let parents: Vec<_> = step.structural_parents().map(|r| r.to_string()).collect();
		assert_eq!(parents, vec!["|7|"]);
	}

	#[test]
	fn test_display_requotes_literals() {
		let step = Step {
			reference: StepRef::parse("|4|").unwrap(),
			operation: Operation::Exact,
			args: vec![
				Argument::Reference(StepRef::parse("|3|").unwrap()),
				Argument::Literal(Literal::Quoted("New \"York\"".to_string())),
			],
		};
		assert_eq!(step.to_string(), r#"(exact |3| "New \"York\"")"#);
	}
}
