// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The schema metamodel ("ring") consumed by the plan compiler.
//!
//! [`Schema`] is the seam the compiler resolves names through. [`Ring`] is the
//! read-only implementation backed by a JSON ring document.

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{
	collections::BTreeSet,
	fmt::{Display, Formatter},
};

use sqr_type::{Dialect, Result};

pub mod attribute;
pub mod config;
pub mod entity;
pub mod error;
pub mod join;
pub mod relationship;
pub mod ring;

pub use attribute::{Attribute, DatePart, NullHandling, SemanticType, split_date_part};
pub use entity::Entity;
pub use error::RingError;
pub use join::{Join, JoinPathColumn};
pub use relationship::{Relationship, RelationshipGraph};
pub use ring::Ring;

/// `[singular, plural]` display name or unit.
pub type NamePair = [String; 2];

/// A physical `table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
	pub table: String,
	pub column: String,
}

impl ColumnRef {
	pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			column: column.into(),
		}
	}

	/// Parses the `table.column` notation used by join paths.
	pub fn parse(qualified: &str) -> Option<Self> {
		let (table, column) = qualified.split_once('.')?;
		if table.is_empty() || column.is_empty() {
			return None;
		}
		Some(Self::new(table, column))
	}
}

impl Display for ColumnRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.table, self.column)
	}
}

pub trait Schema {
	fn dialect(&self) -> Dialect;

	fn is_entity(&self, name: &str) -> bool;

	fn get_entity(&self, name: &str) -> Result<&Entity>;

	fn get_attribute(&self, entity: &str, attribute: &str) -> Result<&Attribute>;

	/// Joins needed to reach the attribute's source table from its entity's primary table.
	fn get_attribute_joins(&self, entity: &str, attribute: &str) -> Result<BTreeSet<String>>;

	/// Joins along the shortest relationship path between two entities.
	fn get_joins_between(&self, entity_a: &str, entity_b: &str) -> Result<BTreeSet<String>>;

	fn get_join(&self, name: &str) -> Result<&Join>;

	fn get_physical_column(&self, table: &str, column: &str) -> Result<ColumnRef>;
}
