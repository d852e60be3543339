// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The closed set of plan operations, their categories and arity
//! descriptors, and how each compiles to SQL.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use sqr_type::Result;

use crate::error::SqrError;

mod compile;
mod operation;

pub use compile::{compile_rownum, round};
pub use operation::{ArgGroup, Category, Operation, OperationDescriptor};

static ONTOLOGY: Lazy<Ontology> = Lazy::new(Ontology::build);

/// Name to operation lookup, built once and shared read-only.
#[derive(Debug)]
pub struct Ontology {
	operations: HashMap<&'static str, Operation>,
}

impl Ontology {
	pub fn get() -> &'static Ontology {
		&ONTOLOGY
	}

	fn build() -> Self {
		let operations = Operation::ALL.iter().map(|op| (op.name(), *op)).collect();
		Self {
			operations,
		}
	}

	pub fn resolve(&self, name: &str) -> Result<Operation> {
		self.lookup(name).ok_or_else(|| {
			SqrError::UnknownOperation {
				step: None,
				name: name.to_string(),
			}
			.into()
		})
	}

	pub fn lookup(&self, name: &str) -> Option<Operation> {
		self.operations.get(name).copied()
	}

	pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
		let mut all: Vec<Operation> = self.operations.values().copied().collect();
		all.sort();
		all.into_iter()
	}

	pub fn in_category(&self, category: Category) -> Vec<Operation> {
		self.operations().filter(|op| op.category() == category).collect()
	}
}
