// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::ColumnRef;

/// One column pair of a join condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPathColumn {
	pub from: ColumnRef,
	pub to: ColumnRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
	pub name: String,
	pub from_table: String,
	pub to_table: String,
	/// Column pairs; all of them must hold for two rows to join.
	pub path: Vec<JoinPathColumn>,
	pub bidirectional: bool,
}

impl Join {
	pub fn reverse_name(&self) -> String {
		format!("reverse_{}", self.name)
	}
}
