// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use crate::{ontology::Operation, plan::{Literal, SubplanId}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
	Asc,
	Desc,
}

impl SortDirection {
	pub fn as_str(&self) -> &'static str {
		match self {
			SortDirection::Asc => "asc",
			SortDirection::Desc => "desc",
		}
	}
}

impl FromStr for SortDirection {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"asc" => Ok(SortDirection::Asc),
			"desc" => Ok(SortDirection::Desc),
			_ => Err(()),
		}
	}
}

impl Display for SortDirection {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Logical handle to a column or expression, independent of any SQL dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldHandle {
	/// An attribute read straight off an entity.
	Literal {
		entity: String,
		attribute: String,
	},
	Expression {
		operation: Operation,
		operands: Vec<Operand>,
	},
	/// A column produced by another subplan. `origin` is the handle that
	/// produced it there.
	CrossSubplanRef {
		subplan: SubplanId,
		column: String,
		origin: Box<FieldHandle>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
	Field(FieldHandle),
	Value(Literal),
	Direction(SortDirection),
}

impl Operand {
	pub fn as_field(&self) -> Option<&FieldHandle> {
		match self {
			Operand::Field(field) => Some(field),
			_ => None,
		}
	}

	fn name(&self) -> String {
		match self {
			Operand::Field(field) => field.column_name(),
			Operand::Value(literal) => literal.text().to_string(),
			Operand::Direction(direction) => direction.to_string(),
		}
	}
}

impl FieldHandle {
	pub fn literal(entity: impl Into<String>, attribute: impl Into<String>) -> Self {
		FieldHandle::Literal {
			entity: entity.into(),
			attribute: attribute.into(),
		}
	}

	pub fn expression(operation: Operation, operands: Vec<Operand>) -> Self {
		FieldHandle::Expression {
			operation,
			operands,
		}
	}

	/// The column name identifying this handle in its subplan.
	pub fn column_name(&self) -> String {
		match self {
			FieldHandle::Literal {
				entity,
				attribute,
			} => format!("{}//{}", entity, attribute),
			FieldHandle::Expression {
				operation: Operation::GetOne,
				operands,
			} => operands.first().map(Operand::name).unwrap_or_default(),
			FieldHandle::Expression {
				operation,
				operands,
			} => {
				let names: Vec<String> = operands.iter().map(Operand::name).collect();
				format!("{}({})", operation.name(), names.join(","))
			}
			FieldHandle::CrossSubplanRef {
				subplan,
				column,
				..
			} => format!("{}//{}", subplan, column),
		}
	}

	/// Whether evaluating this handle needs an aggregate in the current
	/// subplan. Connectives look through their predicates; any other
	/// expression is aggregate when one of its operands is an analysis
	/// expression or contains one. Columns of other subplans never are.
	pub fn contains_aggregate(&self) -> bool {
		match self {
			FieldHandle::Expression {
				operation,
				operands,
			} if operation.is_connective() => {
				operands.iter().filter_map(Operand::as_field).any(FieldHandle::contains_aggregate)
			}
			FieldHandle::Expression {
				operands,
				..
			} => operands.iter().filter_map(Operand::as_field).any(|field| match field {
				FieldHandle::Expression {
					operation,
					..
				} => operation.is_analysis() || field.contains_aggregate(),
				_ => false,
			}),
			FieldHandle::Literal {
				..
			}
			| FieldHandle::CrossSubplanRef {
				..
			} => false,
		}
	}

	/// Entity, attribute and whether a count was applied, following the first
	/// field operand of analysis and arithmetic expressions and the origin of
	/// cross-subplan references.
	pub fn base_attribute(&self) -> Option<(&str, &str, bool)> {
		match self {
			FieldHandle::Literal {
				entity,
				attribute,
			} => Some((entity.as_str(), attribute.as_str(), false)),
			FieldHandle::Expression {
				operation,
				operands,
			} if operation.is_analysis() || operation.is_arithmetic() => {
				let (entity, attribute, counted) = operands.iter().find_map(Operand::as_field)?.base_attribute()?;
				Some((entity, attribute, counted || operation.is_count()))
			}
			FieldHandle::Expression {
				..
			} => None,
			FieldHandle::CrossSubplanRef {
				origin,
				..
			} => origin.base_attribute(),
		}
	}
}

impl Display for FieldHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.column_name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn age() -> FieldHandle {
		FieldHandle::literal("Person", "age")
	}

	fn average(field: FieldHandle) -> FieldHandle {
		FieldHandle::expression(Operation::Average, vec![Operand::Field(field)])
	}

	fn greater_than(field: FieldHandle, value: &str) -> FieldHandle {
		FieldHandle::expression(Operation::GreaterThan, vec![
			Operand::Field(field),
			Operand::Value(Literal::Bare(value.to_string())),
		])
	}

	#[test]
	fn test_column_names() {
		assert_eq!(age().column_name(), "Person//age");
		assert_eq!(average(age()).column_name(), "average(Person//age)");
		assert_eq!(greater_than(age(), "30").column_name(), "greaterthan(Person//age,30)");

		let get_one = FieldHandle::expression(Operation::GetOne, vec![Operand::Field(age())]);
		assert_eq!(get_one.column_name(), "Person//age");

		let rownum = FieldHandle::expression(Operation::RowNum, vec![
			Operand::Field(age()),
			Operand::Direction(SortDirection::Desc),
		]);
		assert_eq!(rownum.column_name(), "rownum(Person//age,desc)");

		let cross = FieldHandle::CrossSubplanRef {
			subplan: SubplanId(0),
			column: "average(Person//age)".to_string(),
			origin: Box::new(average(age())),
		};
		assert_eq!(cross.column_name(), "alias_0//average(Person//age)");
	}

	#[test]
	fn test_aggregate_detection() {
		assert!(!greater_than(age(), "30").contains_aggregate());
		assert!(greater_than(average(age()), "30").contains_aggregate());

		let nested = FieldHandle::expression(Operation::And, vec![
			Operand::Field(greater_than(age(), "18")),
			Operand::Field(greater_than(average(age()), "30")),
		]);
		assert!(nested.contains_aggregate());

		let arithmetic = FieldHandle::expression(Operation::Add, vec![
			Operand::Field(average(age())),
			Operand::Value(Literal::Bare("1".to_string())),
		]);
		assert!(greater_than(arithmetic, "30").contains_aggregate());
	}

	#[test]
	fn test_cross_subplan_reference_is_not_aggregate() {
		let cross = FieldHandle::CrossSubplanRef {
			subplan: SubplanId(0),
			column: "average(Person//age)".to_string(),
			origin: Box::new(average(age())),
		};
		assert!(!greater_than(cross, "30").contains_aggregate());
	}

	#[test]
	fn test_base_attribute() {
		let count = FieldHandle::expression(Operation::Count, vec![Operand::Field(FieldHandle::literal(
			"Person", "id",
		))]);
		assert_eq!(count.base_attribute(), Some(("Person", "id", true)));
		assert_eq!(greater_than(age(), "3").base_attribute(), None);
	}
}
