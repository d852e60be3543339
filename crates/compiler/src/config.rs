// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use serde::Deserialize;
use sqr_type::{Dialect, Error, Result, error::diagnostic::internal};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
	/// Overrides the dialect declared by the schema.
	pub dialect: Option<Dialect>,
	/// Digits kept by rounded operations such as `average`.
	pub rounding_precision: u32,
	pub nulls_last: bool,
	pub validate_semantic_types: bool,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			dialect: None,
			rounding_precision: 2,
			nulls_last: true,
			validate_semantic_types: true,
		}
	}
}

impl CompilerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|err| Error(internal::io(path.display(), err)))?;
		Self::from_json(&text)
	}

	pub fn dialect(mut self, dialect: Dialect) -> Self {
		self.dialect = Some(dialect);
		self
	}

	pub fn rounding_precision(mut self, digits: u32) -> Self {
		self.rounding_precision = digits;
		self
	}

	pub fn nulls_last(mut self, nulls_last: bool) -> Self {
		self.nulls_last = nulls_last;
		self
	}

	pub fn validate_semantic_types(mut self, validate: bool) -> Self {
		self.validate_semantic_types = validate;
		self
	}

	/// The configured dialect, falling back to the schema's.
	pub fn resolve_dialect(&self, schema: Dialect) -> Dialect {
		self.dialect.unwrap_or(schema)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CompilerConfig::default();
		assert_eq!(config.rounding_precision, 2);
		assert!(config.nulls_last);
		assert!(config.validate_semantic_types);
		assert_eq!(config.resolve_dialect(Dialect::Postgres), Dialect::Postgres);
	}

	#[test]
	fn test_from_json_fills_missing_fields() {
		let config = CompilerConfig::from_json(r#"{"dialect": "postgres", "rounding_precision": 4}"#).unwrap();
		assert_eq!(config, CompilerConfig::new().dialect(Dialect::Postgres).rounding_precision(4));
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let err = CompilerConfig::from_json(r#"{"precision": 4}"#).unwrap_err();
		assert_eq!(err.code(), "SERDE_001");
	}

	#[test]
	fn test_from_path() {
		let fixtures = sqr_testing::Fixtures::new().unwrap();
		let path = fixtures.write("sqr.json", r#"{"nulls_last": false}"#).unwrap();
		assert!(!CompilerConfig::from_path(&path).unwrap().nulls_last);

		let err = CompilerConfig::from_path(fixtures.path("missing.json")).unwrap_err();
		assert_eq!(err.code(), "IO_001");
	}
}
