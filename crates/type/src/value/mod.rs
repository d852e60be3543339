// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single result cell, or a literal bound into a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Boolean(bool),
	Integer(i64),
	Float(f64),
	Text(String),
}

impl Value {
	/// Interprets a bare plan token: integers and floats become numbers,
	/// everything else stays text.
	pub fn from_token(token: &str) -> Self {
		if let Ok(i) = token.parse::<i64>() {
			return Value::Integer(i);
		}
		match token.parse::<f64>() {
			Ok(f) if f.is_finite() => Value::Float(f),
			_ => Value::Text(token.to_string()),
		}
	}

	/// Converts a JSON scalar (as found in schema configuration) into a value.
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Null => Some(Value::Null),
			serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
			serde_json::Value::Number(n) => {
				n.as_i64().map(Value::Integer).or_else(|| n.as_f64().map(Value::Float))
			}
			serde_json::Value::String(s) => Some(Value::Text(s.clone())),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Boolean(b) => write!(f, "{}", b),
			Value::Integer(i) => write!(f, "{}", i),
			Value::Float(v) => write!(f, "{}", v),
			Value::Text(s) => f.write_str(s),
		}
	}
}
