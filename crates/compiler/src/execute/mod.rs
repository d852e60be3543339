// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use rusqlite::{Connection, params_from_iter, types::ValueRef};
use sqr_type::{Result, Value};
use tracing::{debug, instrument};

use crate::{error::SqrError, sql::Statement};

pub mod functions;
mod result;

pub use result::{QueryResult, units};

/// Raw result grid as returned by a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rows {
	pub column_names: Vec<String>,
	pub rows: Vec<Vec<Value>>,
}

/// A database connection able to run one compiled statement.
pub trait Session {
	fn execute(&mut self, statement: &Statement) -> Result<Rows>;
}

impl Session for Connection {
	#[instrument(name = "execute::sqlite", level = "debug", skip_all, fields(params = statement.params.len()))]
	fn execute(&mut self, statement: &Statement) -> Result<Rows> {
		let fail = |err: rusqlite::Error| SqrError::Execution {
			message: err.to_string(),
			sql: statement.sql.clone(),
		};

		functions::register(self).map_err(fail)?;
		let mut prepared = self.prepare(&statement.sql).map_err(fail)?;
		let column_names: Vec<String> = prepared.column_names().into_iter().map(String::from).collect();
		let width = column_names.len();

		let mut cursor = prepared.query(params_from_iter(statement.params.iter().map(to_sqlite))).map_err(fail)?;
		let mut rows = Vec::new();
		while let Some(row) = cursor.next().map_err(fail)? {
			let mut values = Vec::with_capacity(width);
			for index in 0..width {
				values.push(from_sqlite(row.get_ref(index).map_err(fail)?));
			}
			rows.push(values);
		}

		debug!(rows = rows.len(), "statement executed");
		Ok(Rows {
			column_names,
			rows,
		})
	}
}

fn to_sqlite(value: &Value) -> rusqlite::types::Value {
	use rusqlite::types::Value as Sqlite;
	match value {
		Value::Null => Sqlite::Null,
		Value::Boolean(b) => Sqlite::Integer(i64::from(*b)),
		Value::Integer(i) => Sqlite::Integer(*i),
		Value::Float(f) => Sqlite::Real(*f),
		Value::Text(s) => Sqlite::Text(s.clone()),
	}
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
	match value {
		ValueRef::Null => Value::Null,
		ValueRef::Integer(i) => Value::Integer(i),
		ValueRef::Real(f) => Value::Float(f),
		ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
		ValueRef::Blob(bytes) => {
			let mut hex = String::with_capacity(bytes.len() * 2);
			for byte in bytes {
				let _ = write!(hex, "{:02x}", byte);
			}
			Value::Text(hex)
		}
	}
}
