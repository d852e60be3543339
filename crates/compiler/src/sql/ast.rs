// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqr_type::Value;

use crate::field::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Eq,
	Lt,
	LtEq,
	Gt,
	GtEq,
	Add,
	Sub,
	Mul,
	Div,
	Like,
	Concat,
}

impl BinaryOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			BinaryOp::Eq => "=",
			BinaryOp::Lt => "<",
			BinaryOp::LtEq => "<=",
			BinaryOp::Gt => ">",
			BinaryOp::GtEq => ">=",
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Div => "/",
			BinaryOp::Like => "LIKE",
			BinaryOp::Concat => "||",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
	And,
	Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Column {
		table: String,
		name: String,
	},
	Value(Value),
	/// A string constant chosen by the compiler, rendered inline.
	Constant(&'static str),
	Binary {
		op: BinaryOp,
		left: Box<Expr>,
		right: Box<Expr>,
	},
	Logical {
		op: LogicalOp,
		operands: Vec<Expr>,
	},
	Not(Box<Expr>),
	Function {
		name: &'static str,
		args: Vec<Expr>,
		distinct: bool,
	},
	Cast {
		expr: Box<Expr>,
		ty: &'static str,
	},
	/// `name(args) WITHIN GROUP (ORDER BY order_by)`
	WithinGroup {
		name: &'static str,
		args: Vec<Expr>,
		order_by: Box<Expr>,
	},
	RowNumber {
		order_by: Vec<OrderBy>,
	},
}

impl Expr {
	pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
		Expr::Column {
			table: table.into(),
			name: name.into(),
		}
	}

	pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
		Expr::Binary {
			op,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn function(name: &'static str, args: Vec<Expr>) -> Self {
		Expr::Function {
			name,
			args,
			distinct: false,
		}
	}

	pub fn cast(expr: Expr, ty: &'static str) -> Self {
		Expr::Cast {
			expr: Box::new(expr),
			ty,
		}
	}

	pub fn integer(value: i64) -> Self {
		Expr::Value(Value::Integer(value))
	}

	pub fn text(value: impl Into<String>) -> Self {
		Expr::Value(Value::Text(value.into()))
	}

	pub fn constant(value: &'static str) -> Self {
		Expr::Constant(value)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
	pub expr: Expr,
	pub direction: SortDirection,
	pub nulls_last: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
	pub expr: Expr,
	pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
	Table(String),
	Derived {
		query: Box<Select>,
		alias: String,
	},
}

impl TableRef {
	pub fn name(&self) -> &str {
		match self {
			TableRef::Table(name) => name,
			TableRef::Derived {
				alias,
				..
			} => alias,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
	LeftOuter,
	Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
	pub kind: JoinKind,
	pub table: TableRef,
	pub on: Option<Expr>,
	/// Relation the join was applied through: the join name, or `reverse_<name>`.
	pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
	pub columns: Vec<SelectItem>,
	pub from: TableRef,
	pub joins: Vec<JoinClause>,
	pub filter: Option<Expr>,
	pub group_by: Vec<Expr>,
	pub having: Option<Expr>,
	pub order_by: Vec<OrderBy>,
	pub limit: Option<u64>,
}
