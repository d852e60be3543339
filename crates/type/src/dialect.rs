// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
	#[default]
	Sqlite,
	Postgres,
}

impl Dialect {
	/// Type name used when a value is cast for floating point arithmetic or rounding.
	pub fn float_type(&self) -> &'static str {
		match self {
			Dialect::Sqlite => "REAL",
			Dialect::Postgres => "NUMERIC",
		}
	}

	/// Placeholder for the 1-based parameter `index`.
	pub fn placeholder(&self, index: usize) -> String {
		match self {
			Dialect::Sqlite => "?".to_string(),
			Dialect::Postgres => format!("${}", index),
		}
	}
}

impl Display for Dialect {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Dialect::Sqlite => f.write_str("sqlite"),
			Dialect::Postgres => f.write_str("postgres"),
		}
	}
}

impl FromStr for Dialect {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"sqlite" => Ok(Dialect::Sqlite),
			"postgres" | "postgresql" => Ok(Dialect::Postgres),
			other => Err(format!("unsupported dialect '{}'", other)),
		}
	}
}
