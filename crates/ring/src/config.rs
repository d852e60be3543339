// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Serde model of a ring document. Field names follow the document's
//! camelCase keys.

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingConfig {
	#[serde(default)]
	pub id: Option<String>,
	pub name: String,
	#[serde(default)]
	pub version: Option<serde_json::Value>,
	#[serde(default)]
	pub schema_version: Option<u32>,
	pub data_source: DataSourceConfig,
	#[serde(default)]
	pub entities: Vec<EntityConfig>,
	#[serde(default)]
	pub relationships: Vec<RelationshipConfig>,
	/// Holds entities and relationships for schema versions above 2.
	#[serde(default)]
	pub ontology: Option<OntologyConfig>,
}

impl RingConfig {
	pub fn entities(&self) -> &[EntityConfig] {
		match (&self.ontology, self.schema_version) {
			(Some(ontology), Some(version)) if version > 2 => &ontology.entities,
			_ => &self.entities,
		}
	}

	pub fn relationships(&self) -> &[RelationshipConfig] {
		match (&self.ontology, self.schema_version) {
			(Some(ontology), Some(version)) if version > 2 => &ontology.relationships,
			_ => &self.relationships,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OntologyConfig {
	#[serde(default)]
	pub entities: Vec<EntityConfig>,
	#[serde(default)]
	pub relationships: Vec<RelationshipConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub connection_string: Option<String>,
	#[serde(default)]
	pub tables: Vec<TableConfig>,
	#[serde(default)]
	pub joins: Vec<JoinConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
	pub name: String,
	#[serde(default)]
	pub primary_key: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinConfig {
	pub name: String,
	pub from: String,
	pub to: String,
	/// `[from "table.column", to "table.column", key type]` triples.
	pub path: Vec<Vec<String>>,
	#[serde(default)]
	pub bidirectional: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityConfig {
	pub name: String,
	pub nicename: Vec<String>,
	pub table: String,
	pub id: Vec<String>,
	#[serde(default)]
	pub id_type: Option<serde_json::Value>,
	#[serde(default)]
	pub attributes: IndexMap<String, AttributeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeConfig {
	pub nicename: Vec<String>,
	#[serde(rename = "type", default)]
	pub types: Vec<String>,
	#[serde(default)]
	pub units: Option<Vec<String>>,
	pub source: SourceConfig,
	#[serde(default)]
	pub null_handling: Option<String>,
	#[serde(default)]
	pub null_value: Option<serde_json::Value>,
	/// `[enabled, digits]`; `enabled` may be a bool or a `"True"`/`"False"` string.
	#[serde(default)]
	pub rounding: Option<(serde_json::Value, u32)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
	pub table: String,
	pub columns: Vec<String>,
	#[serde(default)]
	pub joins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipConfig {
	pub name: String,
	pub from: String,
	pub to: String,
	#[serde(default)]
	pub join: Vec<String>,
	#[serde(default)]
	pub relation: Option<String>,
	#[serde(default)]
	pub bidirectional: bool,
	#[serde(default)]
	pub derived: bool,
	#[serde(default)]
	pub relationship_list: Vec<String>,
}
