// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeSet, HashMap},
	fmt::{Display, Formatter},
};

use indexmap::IndexMap;

use crate::{
	field::{FieldHandle, SortDirection},
	plan::{StepRef, SubplanId},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
	Entity(String),
	Subplan(SubplanId),
}

impl Display for Source {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Source::Entity(name) => f.write_str(name),
			Source::Subplan(id) => Display::fmt(id, f),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
	pub column: String,
	pub direction: SortDirection,
}

/// Everything needed to compile one subplan into a SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubplanArguments {
	pub id: SubplanId,
	/// Output columns, in order.
	pub select: Vec<String>,
	/// Every column the subplan evaluates, keyed by column name.
	pub fields: IndexMap<String, FieldHandle>,
	pub group_by: Vec<String>,
	pub filter: Option<FieldHandle>,
	pub having: Option<FieldHandle>,
	pub sort: Vec<SortKey>,
	pub limit: Option<u64>,
	/// Joins the subplan needs, filled in during resolution.
	pub joins: BTreeSet<String>,
	pub sources: Vec<Source>,
	/// Step that produced each expression handle.
	pub origins: HashMap<FieldHandle, StepRef>,
}

impl SubplanArguments {
	pub fn new(id: SubplanId) -> Self {
		Self {
			id,
			select: Vec::new(),
			fields: IndexMap::new(),
			group_by: Vec::new(),
			filter: None,
			having: None,
			sort: Vec::new(),
			limit: None,
			joins: BTreeSet::new(),
			sources: Vec::new(),
			origins: HashMap::new(),
		}
	}

	/// Registers a handle and returns its column name.
	pub fn add_field(&mut self, handle: FieldHandle) -> String {
		let column = handle.column_name();
		self.fields.entry(column.clone()).or_insert(handle);
		column
	}

	pub fn add_select(&mut self, column: String) {
		if !self.select.contains(&column) {
			self.select.push(column);
		}
	}

	pub fn add_group_by(&mut self, column: String) {
		if !self.group_by.contains(&column) {
			self.group_by.push(column);
		}
	}

	pub fn add_source(&mut self, source: Source) {
		if !self.sources.contains(&source) {
			self.sources.push(source);
		}
	}

	pub fn entity_sources(&self) -> impl Iterator<Item = &str> {
		self.sources.iter().filter_map(|s| match s {
			Source::Entity(name) => Some(name.as_str()),
			Source::Subplan(_) => None,
		})
	}

	pub fn subplan_sources(&self) -> impl Iterator<Item = SubplanId> + '_ {
		self.sources.iter().filter_map(|s| match s {
			Source::Subplan(id) => Some(*id),
			Source::Entity(_) => None,
		})
	}

	pub fn is_exposed(&self, column: &str) -> bool {
		self.select.iter().any(|c| c == column)
	}
}
