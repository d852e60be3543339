// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Serialize;
use sqr_type::{Dialect, Value};
use tracing::instrument;

use crate::{
	field::SortDirection,
	sql::ast::{Expr, JoinClause, JoinKind, LogicalOp, OrderBy, Select, TableRef},
};

/// SQL text and the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
	pub sql: String,
	pub params: Vec<Value>,
}

#[instrument(name = "sql::emit", level = "debug", skip_all, fields(dialect = %dialect))]
pub fn emit(select: &Select, dialect: Dialect) -> Statement {
	let mut emitter = Emitter {
		dialect,
		params: Vec::new(),
	};
	let sql = emitter.select(select);
	Statement {
		sql,
		params: emitter.params,
	}
}

pub fn quote_identifier(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_string(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}

struct Emitter {
	dialect: Dialect,
	params: Vec<Value>,
}

impl Emitter {
	fn select(&mut self, sel: &Select) -> String {
		let mut parts = Vec::new();

		let columns: Vec<String> = sel
			.columns
			.iter()
			.map(|item| format!("{} AS {}", self.expr(&item.expr), quote_identifier(&item.alias)))
			.collect();
		parts.push(format!("SELECT {}", columns.join(", ")));

		parts.push(format!("FROM {}", self.table(&sel.from)));

		for join in &sel.joins {
			parts.push(self.join(join));
		}

		if let Some(filter) = &sel.filter {
			parts.push(format!("WHERE {}", self.expr(filter)));
		}

		if !sel.group_by.is_empty() {
			let keys: Vec<String> = sel.group_by.iter().map(|e| self.expr(e)).collect();
			parts.push(format!("GROUP BY {}", keys.join(", ")));
		}

		if let Some(having) = &sel.having {
			parts.push(format!("HAVING {}", self.expr(having)));
		}

		if !sel.order_by.is_empty() {
			parts.push(format!("ORDER BY {}", self.order_by(&sel.order_by)));
		}

		if let Some(limit) = sel.limit {
			parts.push(format!("LIMIT {}", limit));
		}

		parts.join(" ")
	}

	fn table(&mut self, table: &TableRef) -> String {
		match table {
			TableRef::Table(name) => quote_identifier(name),
			TableRef::Derived {
				query,
				alias,
			} => format!("({}) AS {}", self.select(query), quote_identifier(alias)),
		}
	}

	fn join(&mut self, join: &JoinClause) -> String {
		let table = self.table(&join.table);
		match (join.kind, &join.on) {
			(JoinKind::LeftOuter, Some(on)) => format!("LEFT OUTER JOIN {} ON {}", table, self.expr(on)),
			(JoinKind::LeftOuter, None) => format!("LEFT OUTER JOIN {} ON 1 = 1", table),
			(JoinKind::Cross, _) => format!("CROSS JOIN {}", table),
		}
	}

	fn order_by(&mut self, keys: &[OrderBy]) -> String {
		let keys: Vec<String> = keys
			.iter()
			.map(|key| {
				let direction = match key.direction {
					SortDirection::Asc => "ASC",
					SortDirection::Desc => "DESC",
				};
				let nulls = if key.nulls_last {
					" NULLS LAST"
				} else {
					""
				};
				format!("{} {}{}", self.expr(&key.expr), direction, nulls)
			})
			.collect();
		keys.join(", ")
	}

	fn value(&mut self, value: &Value) -> String {
		match value {
			Value::Null => "NULL".to_string(),
			Value::Boolean(true) => "TRUE".to_string(),
			Value::Boolean(false) => "FALSE".to_string(),
			Value::Integer(i) => i.to_string(),
			Value::Float(f) => format!("{:?}", f),
			Value::Text(_) => {
				self.params.push(value.clone());
				self.dialect.placeholder(self.params.len())
			}
		}
	}

	fn expr(&mut self, expr: &Expr) -> String {
		match expr {
			Expr::Column {
				table,
				name,
			} => format!("{}.{}", quote_identifier(table), quote_identifier(name)),
			Expr::Value(value) => self.value(value),
			Expr::Constant(value) => quote_string(value),
			Expr::Binary {
				op,
				left,
				right,
			} => format!("({} {} {})", self.expr(left), op.symbol(), self.expr(right)),
			Expr::Logical {
				op,
				operands,
			} => {
				let keyword = match op {
					LogicalOp::And => " AND ",
					LogicalOp::Or => " OR ",
				};
				let operands: Vec<String> = operands.iter().map(|e| self.expr(e)).collect();
				format!("({})", operands.join(keyword))
			}
			Expr::Not(inner) => format!("(NOT {})", self.expr(inner)),
			Expr::Function {
				name,
				args,
				distinct,
			} => {
				let args: Vec<String> = args.iter().map(|e| self.expr(e)).collect();
				let distinct = if *distinct {
					"DISTINCT "
				} else {
					""
				};
				format!("{}({}{})", name, distinct, args.join(", "))
			}
			Expr::Cast {
				expr,
				ty,
			} => format!("CAST({} AS {})", self.expr(expr), ty),
			Expr::WithinGroup {
				name,
				args,
				order_by,
			} => {
				let args: Vec<String> = args.iter().map(|e| self.expr(e)).collect();
				format!("{}({}) WITHIN GROUP (ORDER BY {})", name, args.join(", "), self.expr(order_by))
			}
			Expr::RowNumber {
				order_by,
			} => format!("ROW_NUMBER() OVER (ORDER BY {})", self.order_by(order_by)),
		}
	}
}
