// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeSet, fs, path::Path};

use indexmap::IndexMap;
use sqr_type::{Dialect, Result, Value};
use tracing::{debug, instrument, trace};

use crate::{
	Attribute, ColumnRef, Entity, Join, JoinPathColumn, NamePair, Relationship, RelationshipGraph, RingError,
	Schema, SemanticType,
	attribute::expand_semantic_types,
	config::{AttributeConfig, EntityConfig, JoinConfig, RelationshipConfig, RingConfig},
	split_date_part,
};

/// Read-only schema loaded from a ring document.
#[derive(Debug, Clone)]
pub struct Ring {
	pub name: String,
	pub dialect: Dialect,
	pub connection_string: Option<String>,
	tables: BTreeSet<String>,
	joins: IndexMap<String, Join>,
	entities: IndexMap<String, Entity>,
	relationships: Vec<Relationship>,
	graph: RelationshipGraph,
}

impl Ring {
	pub fn from_json(json: &str) -> Result<Self> {
		let config: RingConfig = serde_json::from_str(json)?;
		Self::from_config(config)
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let json = fs::read_to_string(path).map_err(|err| RingError::Io {
			path: path.display().to_string(),
			reason: err.to_string(),
		})?;
		Self::from_json(&json)
	}

	/// Builds a ring, reporting every problem in the document at once.
	#[instrument(name = "ring::load", level = "debug", skip_all, fields(ring = %config.name))]
	pub fn from_config(config: RingConfig) -> Result<Self> {
		let mut problems = vec![];

		let dialect = match config.data_source.kind.parse::<Dialect>() {
			Ok(dialect) => dialect,
			Err(err) => {
				problems.push(err);
				Dialect::default()
			}
		};

		let tables: BTreeSet<String> = config.data_source.tables.iter().map(|t| t.name.clone()).collect();

		let mut joins: IndexMap<String, Join> = IndexMap::new();
		for join in &config.data_source.joins {
			if joins.contains_key(&join.name) {
				problems.push(format!("join '{}' is declared more than once", join.name));
				continue;
			}
			if let Some(join) = build_join(join, &tables, &mut problems) {
				joins.insert(join.name.clone(), join);
			}
		}

		let mut entities: IndexMap<String, Entity> = IndexMap::new();
		for entity in config.entities() {
			if entities.contains_key(&entity.name) {
				problems.push(format!("entity '{}' is declared more than once", entity.name));
				continue;
			}
			let entity = build_entity(entity, &tables, &joins, &mut problems);
			entities.insert(entity.name.clone(), entity);
		}

		let relationships = build_relationships(config.relationships(), &entities, &joins, &mut problems);

		if !problems.is_empty() {
			return Err(RingError::InvalidConfig {
				ring: config.name,
				problems,
			}
			.into());
		}

		let graph = RelationshipGraph::new(&relationships);

		debug!(
			entities = entities.len(),
			joins = joins.len(),
			relationships = relationships.len(),
			"ring loaded"
		);

		Ok(Self {
			name: config.name,
			dialect,
			connection_string: config.data_source.connection_string,
			tables,
			joins,
			entities,
			relationships,
			graph,
		})
	}

	pub fn entities(&self) -> impl Iterator<Item = &Entity> {
		self.entities.values()
	}

	pub fn relationships(&self) -> &[Relationship] {
		&self.relationships
	}
}

fn name_pair(names: &[String]) -> Option<NamePair> {
	match names {
		[singular] => Some([singular.clone(), singular.clone()]),
		[singular, plural, ..] => Some([singular.clone(), plural.clone()]),
		[] => None,
	}
}

fn check_table(table: &str, tables: &BTreeSet<String>, context: &str, problems: &mut Vec<String>) {
	if !tables.is_empty() && !tables.contains(table) {
		problems.push(format!("{} references undeclared table '{}'", context, table));
	}
}

fn build_join(config: &JoinConfig, tables: &BTreeSet<String>, problems: &mut Vec<String>) -> Option<Join> {
	let context = format!("join '{}'", config.name);
	check_table(&config.from, tables, &context, problems);
	check_table(&config.to, tables, &context, problems);

	if config.path.is_empty() {
		problems.push(format!("{} has an empty path", context));
		return None;
	}

	let mut path = Vec::with_capacity(config.path.len());
	for pair in &config.path {
		let (from, to) = match pair.as_slice() {
			[from, to, ..] => (ColumnRef::parse(from), ColumnRef::parse(to)),
			_ => {
				problems.push(format!("{} has a path entry without two columns", context));
				continue;
			}
		};
		let (Some(from), Some(to)) = (from, to) else {
			problems.push(format!("{} has a path column not in 'table.column' form", context));
			continue;
		};
		if from.table != config.from || to.table != config.to {
			problems.push(format!(
				"{} path '{} = {}' must go from '{}' to '{}'",
				context, from, to, config.from, config.to
			));
			continue;
		}
		path.push(JoinPathColumn {
			from,
			to,
		});
	}

	Some(Join {
		name: config.name.clone(),
		from_table: config.from.clone(),
		to_table: config.to.clone(),
		path,
		bidirectional: config.bidirectional,
	})
}

fn build_entity(
	config: &EntityConfig,
	tables: &BTreeSet<String>,
	joins: &IndexMap<String, Join>,
	problems: &mut Vec<String>,
) -> Entity {
	let context = format!("entity '{}'", config.name);
	check_table(&config.table, tables, &context, problems);

	let display_name = name_pair(&config.nicename).unwrap_or_else(|| {
		problems.push(format!("{} has no nicename", context));
		[config.name.clone(), config.name.clone()]
	});

	if config.id.is_empty() {
		problems.push(format!("{} has no identifier column", context));
	}

	let mut attributes = IndexMap::new();
	for (name, attribute) in &config.attributes {
		let attribute = build_attribute(name, attribute, config, tables, joins, problems);
		attributes.insert(name.clone(), attribute);
	}

	Entity {
		name: config.name.clone(),
		display_name,
		primary_table: config.table.clone(),
		identifiers: config.id.clone(),
		attributes,
	}
}

fn build_attribute(
	name: &str,
	config: &AttributeConfig,
	entity: &EntityConfig,
	tables: &BTreeSet<String>,
	joins: &IndexMap<String, Join>,
	problems: &mut Vec<String>,
) -> Attribute {
	let context = format!("attribute '{}.{}'", entity.name, name);
	check_table(&config.source.table, tables, &context, problems);

	if config.source.columns.is_empty() {
		problems.push(format!("{} has no source column", context));
	}
	for join in &config.source.joins {
		if !joins.contains_key(join) {
			problems.push(format!("{} references unknown join '{}'", context, join));
		}
	}
	if config.source.table != entity.table && config.source.joins.is_empty() {
		problems.push(format!(
			"{} lives on '{}' but declares no joins from '{}'",
			context, config.source.table, entity.table
		));
	}

	let mut declared = vec![];
	for ty in &config.types {
		match ty.parse::<SemanticType>() {
			Ok(ty) => declared.push(ty),
			Err(err) => problems.push(format!("{}: {}", context, err)),
		}
	}

	let null_handling = match config.null_handling.as_deref().map(str::parse::<crate::NullHandling>) {
		None => Default::default(),
		Some(Ok(handling)) => handling,
		Some(Err(err)) => {
			problems.push(format!("{}: {}", context, err));
			Default::default()
		}
	};

	let null_value = config.null_value.as_ref().and_then(|value| {
		let converted = Value::from_json(value);
		if converted.is_none() {
			problems.push(format!("{} has a non-scalar nullValue", context));
		}
		converted
	});

	let rounding = config.rounding.as_ref().and_then(|(enabled, digits)| {
		let enabled = match enabled {
			serde_json::Value::Bool(b) => *b,
			serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
			_ => false,
		};
		enabled.then_some(*digits)
	});

	Attribute {
		name: name.to_string(),
		display_name: name_pair(&config.nicename).unwrap_or_else(|| [name.to_string(), name.to_string()]),
		semantic_types: expand_semantic_types(declared),
		units: config.units.as_deref().and_then(name_pair),
		source_table: config.source.table.clone(),
		source_columns: config.source.columns.clone(),
		joins: config.source.joins.clone(),
		null_handling,
		null_value,
		rounding,
	}
}

fn build_relationships(
	configs: &[RelationshipConfig],
	entities: &IndexMap<String, Entity>,
	joins: &IndexMap<String, Join>,
	problems: &mut Vec<String>,
) -> Vec<Relationship> {
	let mut relationships: Vec<Relationship> = vec![];

	for config in configs {
		let context = format!("relationship '{}'", config.name);
		for endpoint in [&config.from, &config.to] {
			if !entities.contains_key(endpoint) {
				problems.push(format!("{} references unknown entity '{}'", context, endpoint));
			}
		}

		let relationship_joins = if config.derived {
			let mut derived = vec![];
			for part in &config.relationship_list {
				match relationships.iter().find(|r| &r.name == part) {
					Some(r) => derived.extend(r.joins.iter().cloned()),
					None => problems.push(format!(
						"{} is derived from '{}' which is not declared before it",
						context, part
					)),
				}
			}
			derived
		} else {
			for join in &config.join {
				if !joins.contains_key(join) {
					problems.push(format!("{} references unknown join '{}'", context, join));
				}
			}
			config.join.clone()
		};

		if relationship_joins.is_empty() {
			problems.push(format!("{} has no joins", context));
		}

		relationships.push(Relationship {
			name: config.name.clone(),
			from: config.from.clone(),
			to: config.to.clone(),
			joins: relationship_joins,
			relation: config.relation.clone(),
			bidirectional: config.bidirectional,
			derived: config.derived,
		});
	}

	relationships
}

impl Schema for Ring {
	fn dialect(&self) -> Dialect {
		self.dialect
	}

	fn is_entity(&self, name: &str) -> bool {
		self.entities.contains_key(name)
	}

	fn get_entity(&self, name: &str) -> Result<&Entity> {
		self.entities.get(name).ok_or_else(|| {
			RingError::UnknownEntity {
				name: name.to_string(),
			}
			.into()
		})
	}

	fn get_attribute(&self, entity: &str, attribute: &str) -> Result<&Attribute> {
		self.get_entity(entity)?.attribute(attribute).ok_or_else(|| {
			RingError::UnknownAttribute {
				entity: entity.to_string(),
				attribute: attribute.to_string(),
			}
			.into()
		})
	}

	fn get_attribute_joins(&self, entity: &str, attribute: &str) -> Result<BTreeSet<String>> {
		let e = self.get_entity(entity)?;
		let (base, _) = split_date_part(attribute);
		if e.is_identifier(base) {
			return Ok(BTreeSet::new());
		}
		let a = self.get_attribute(entity, base)?;
		if a.source_table == e.primary_table {
			return Ok(BTreeSet::new());
		}
		Ok(a.joins.iter().cloned().collect())
	}

	#[instrument(name = "ring::joins_between", level = "trace", skip(self))]
	fn get_joins_between(&self, entity_a: &str, entity_b: &str) -> Result<BTreeSet<String>> {
		self.get_entity(entity_a)?;
		self.get_entity(entity_b)?;

		let path = self.graph.path(entity_a, entity_b).ok_or_else(|| RingError::NoJoinPath {
			from: entity_a.to_string(),
			to: entity_b.to_string(),
		})?;

		let mut joins = BTreeSet::new();
		for index in path {
			let relationship = &self.relationships[index];
			trace!(relationship = %relationship.name, "following relationship");
			joins.extend(relationship.joins.iter().cloned());
		}
		Ok(joins)
	}

	fn get_join(&self, name: &str) -> Result<&Join> {
		self.joins.get(name).ok_or_else(|| {
			RingError::UnknownJoin {
				name: name.to_string(),
			}
			.into()
		})
	}

	fn get_physical_column(&self, table: &str, column: &str) -> Result<ColumnRef> {
		if !self.tables.is_empty() && !self.tables.contains(table) {
			return Err(RingError::UnknownTable {
				table: table.to_string(),
			}
			.into());
		}
		Ok(ColumnRef::new(table, column))
	}
}

#[cfg(test)]
mod tests {
	use sqr_type::ErrorKind;

	use super::*;

	const RING: &str = r#"{
		"name": "payroll",
		"dataSource": {
			"type": "sqlite",
			"tables": [{"name": "employee"}, {"name": "department"}, {"name": "company"}, {"name": "badge"}],
			"joins": [
				{"name": "employee_department", "from": "employee", "to": "department",
				 "path": [["employee.department_id", "department.id", "int"]]},
				{"name": "department_company", "from": "department", "to": "company",
				 "path": [["department.company_id", "company.id", "int"]]},
				{"name": "employee_badge", "from": "employee", "to": "badge",
				 "path": [["employee.id", "badge.employee_id", "int"]]}
			]
		},
		"entities": [
			{"name": "Employee", "nicename": ["Employee", "Employees"], "table": "employee", "id": ["id"],
			 "attributes": {
				"salary": {"nicename": ["Salary", "Salaries"], "isa": "float", "type": ["metric"],
				           "units": ["dollar", "dollars"], "rounding": ["True", 1], "preaggregated": false,
				           "source": {"table": "employee", "columns": ["salary"]}},
				"badge": {"nicename": ["Badge", "Badges"], "type": ["categorical"],
				          "source": {"table": "badge", "columns": ["code"], "joins": ["employee_badge"]}}
			 }},
			{"name": "Department", "nicename": ["Department", "Departments"], "table": "department", "id": ["id"],
			 "attributes": {}},
			{"name": "Company", "nicename": ["Company", "Companies"], "table": "company", "id": ["id"],
			 "attributes": {}}
		],
		"relationships": [
			{"name": "EmployeeDepartment", "from": "Employee", "to": "Department", "join": ["employee_department"]},
			{"name": "DepartmentCompany", "from": "Department", "to": "Company", "join": ["department_company"]},
			{"name": "EmployeeCompany", "from": "Employee", "to": "Company", "derived": true,
			 "relationshipList": ["EmployeeDepartment", "DepartmentCompany"]}
		]
	}"#;

	#[test]
	fn test_load_and_lookup() {
		let ring = Ring::from_json(RING).unwrap();
		assert_eq!(ring.dialect(), Dialect::Sqlite);

		let salary = ring.get_attribute("Employee", "salary").unwrap();
		assert_eq!(salary.rounding, Some(1));
		assert_eq!(salary.units, Some(["dollar".to_string(), "dollars".to_string()]));
		assert!(salary.has_type(SemanticType::Metric));
		assert!(salary.has_type(SemanticType::Attribute));
	}

	#[test]
	fn test_attribute_joins() {
		let ring = Ring::from_json(RING).unwrap();
		assert!(ring.get_attribute_joins("Employee", "salary").unwrap().is_empty());
		assert!(ring.get_attribute_joins("Employee", "id").unwrap().is_empty());
		assert_eq!(
			ring.get_attribute_joins("Employee", "badge").unwrap(),
			BTreeSet::from(["employee_badge".to_string()])
		);
	}

	#[test]
	fn test_derived_relationship_shortcuts_path() {
		let ring = Ring::from_json(RING).unwrap();
		let joins = ring.get_joins_between("Employee", "Company").unwrap();
		assert_eq!(
			joins,
			BTreeSet::from(["department_company".to_string(), "employee_department".to_string()])
		);
	}

	#[test]
	fn test_unknowns_are_resolution_errors() {
		let ring = Ring::from_json(RING).unwrap();
		assert!(ring.is_entity("Employee"));
		assert!(!ring.is_entity("Planet"));
		assert_eq!(ring.get_entity("Planet").unwrap_err().kind(), ErrorKind::Resolution);
		assert_eq!(ring.get_attribute("Employee", "shoe_size").unwrap_err().code(), "RING_002");
		assert_eq!(ring.get_join("nope").unwrap_err().code(), "RING_003");
		assert_eq!(ring.get_physical_column("office", "id").unwrap_err().code(), "RING_004");
	}

	#[test]
	fn test_invalid_ring_lists_every_problem() {
		let json = r#"{
			"name": "broken",
			"dataSource": {"type": "oracle", "tables": [{"name": "a"}],
				"joins": [{"name": "a_b", "from": "a", "to": "b", "path": [["a.id", "c.id"]]}]},
			"entities": [{"name": "A", "nicename": ["A"], "table": "a", "id": ["id"], "attributes": {}}],
			"relationships": [{"name": "AB", "from": "A", "to": "B", "join": ["a_x"]}]
		}"#;
		let err = Ring::from_json(json).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Configuration);
		assert_eq!(err.code(), "RING_006");
		let notes = err.notes.join("\n");
		assert!(notes.contains("unsupported dialect 'oracle'"));
		assert!(notes.contains("undeclared table 'b'"));
		assert!(notes.contains("must go from 'a' to 'b'"));
		assert!(notes.contains("unknown entity 'B'"));
		assert!(notes.contains("unknown join 'a_x'"));
	}
}
