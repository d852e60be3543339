// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Serialize;
use sqr_ring::{NamePair, Schema, SemanticType, split_date_part};
use sqr_type::Value;

use crate::{builder::SubplanArguments, execute::Rows, field::FieldHandle};

/// Labeled result grid with `[singular, plural]` units per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
	pub row_count: usize,
	pub rows: Vec<Vec<Value>>,
	pub column_names: Vec<String>,
	pub units: Vec<NamePair>,
}

impl QueryResult {
	/// Labels `rows` with the select list and units of the outermost subplan.
	pub fn new(rows: Rows, outermost: &SubplanArguments, schema: &dyn Schema) -> Self {
		let units = outermost
			.select
			.iter()
			.map(|column| match outermost.fields.get(column) {
				Some(handle) => units(handle, schema),
				None => empty(),
			})
			.collect();

		Self {
			row_count: rows.rows.len(),
			rows: rows.rows,
			column_names: outermost.select.clone(),
			units,
		}
	}
}

fn empty() -> NamePair {
	[String::new(), String::new()]
}

/// Units of the attribute a handle is based on. Declared units win, then the
/// entity name for counted identifiers, then the attribute's display name.
pub fn units(handle: &FieldHandle, schema: &dyn Schema) -> NamePair {
	let Some((entity_name, attribute_name, counted)) = handle.base_attribute() else {
		return empty();
	};
	let Ok(entity) = schema.get_entity(entity_name) else {
		return empty();
	};

	let (_, part) = split_date_part(attribute_name);
	let Some(attribute) = entity.attribute(attribute_name) else {
		return entity.display_name.clone();
	};

	if let Some(units) = &attribute.units {
		return units.clone();
	}
	if counted && attribute.has_type(SemanticType::Identifier) {
		return entity.display_name.clone();
	}
	match part {
		Some(part) => attribute.display_name.clone().map(|name| format!("{} {}", part.label(), name)),
		None => attribute.display_name.clone(),
	}
}

#[cfg(test)]
mod tests {
	use sqr_testing::ring::company_ring;

	use super::*;
	use crate::{field::Operand, ontology::Operation, plan::SubplanId};

	fn pair(singular: &str, plural: &str) -> NamePair {
		[singular.to_string(), plural.to_string()]
	}

	fn count(handle: FieldHandle) -> FieldHandle {
		FieldHandle::expression(Operation::Count, vec![Operand::Field(handle)])
	}

	#[test]
	fn test_declared_units_win() {
		let ring = company_ring();
		let salary = FieldHandle::literal("Employee", "salary");
		assert_eq!(units(&salary, &ring), pair("dollar", "dollars"));
		let average = FieldHandle::expression(Operation::Average, vec![Operand::Field(salary)]);
		assert_eq!(units(&average, &ring), pair("dollar", "dollars"));
	}

	#[test]
	fn test_counted_identifier_uses_entity_name() {
		let ring = company_ring();
		assert_eq!(units(&count(FieldHandle::literal("Employee", "employee_id")), &ring), pair("employee", "employees"));
		assert_eq!(units(&count(FieldHandle::literal("Person", "id")), &ring), pair("person", "people"));
	}

	#[test]
	fn test_display_name_fallback() {
		let ring = company_ring();
		assert_eq!(units(&FieldHandle::literal("Person", "age"), &ring), pair("age", "ages"));
		assert_eq!(units(&FieldHandle::literal("Employee", "hired:year"), &ring), pair(
			"year of hire date",
			"year of hire dates"
		));
	}

	#[test]
	fn test_unresolvable_handles_have_no_units() {
		let ring = company_ring();
		let predicate = FieldHandle::expression(Operation::GreaterThan, vec![
			Operand::Field(FieldHandle::literal("Person", "age")),
			Operand::Value(crate::plan::Literal::Bare("3".to_string())),
		]);
		assert_eq!(units(&predicate, &ring), empty());
		assert_eq!(units(&FieldHandle::literal("Nobody", "age"), &ring), empty());
	}

	#[test]
	fn test_cross_subplan_reference_follows_origin() {
		let ring = company_ring();
		let inner = FieldHandle::expression(Operation::Average, vec![Operand::Field(FieldHandle::literal(
			"Employee", "salary",
		))]);
		let cross = FieldHandle::CrossSubplanRef {
			subplan: SubplanId(0),
			column: inner.column_name(),
			origin: Box::new(inner),
		};
		assert_eq!(units(&cross, &ring), pair("dollar", "dollars"));
	}
}
