// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexMap;

use crate::{Attribute, NamePair, split_date_part};

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
	pub name: String,
	pub display_name: NamePair,
	pub primary_table: String,
	/// Identifier columns on the primary table.
	pub identifiers: Vec<String>,
	pub attributes: IndexMap<String, Attribute>,
}

impl Entity {
	/// Looks up an attribute, ignoring any date part suffix.
	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		let (base, _) = split_date_part(name);
		self.attributes.get(base)
	}

	/// `id` names the identifier unless the entity declares an attribute with that name.
	pub fn is_identifier(&self, name: &str) -> bool {
		name == "id" && !self.attributes.contains_key("id")
	}
}
