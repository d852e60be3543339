// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqr_type::{Dialect, Result, Value, internal_err};

use crate::{
	ontology::Operation,
	sql::ast::{BinaryOp, Expr, LogicalOp, OrderBy},
};

impl Operation {
	/// Builds the SQL expression for this operation over already resolved operands.
	pub fn compile(&self, operands: Vec<Expr>, dialect: Dialect) -> Result<Expr> {
		let float = dialect.float_type();
		match self {
			Operation::Exact => binary(*self, BinaryOp::Eq, operands),
			Operation::LessThan => binary(*self, BinaryOp::Lt, operands),
			Operation::LessThanEq => binary(*self, BinaryOp::LtEq, operands),
			Operation::GreaterThan => binary(*self, BinaryOp::Gt, operands),
			Operation::GreaterThanEq => binary(*self, BinaryOp::GtEq, operands),
			Operation::Contains => {
				let [value, needle] = exactly::<2>(*self, operands)?;
				let pattern = Expr::binary(
					BinaryOp::Concat,
					Expr::binary(BinaryOp::Concat, Expr::constant("%"), needle),
					Expr::constant("%"),
				);
				Ok(Expr::binary(BinaryOp::Like, value, pattern))
			}
			Operation::And => logical(*self, LogicalOp::And, operands),
			Operation::Or => logical(*self, LogicalOp::Or, operands),
			Operation::Not => {
				let [operand] = exactly::<1>(*self, operands)?;
				Ok(Expr::Not(Box::new(operand)))
			}

			Operation::Add => fold(*self, BinaryOp::Add, operands),
			Operation::Subtract => fold(*self, BinaryOp::Sub, operands),
			Operation::Multiply => fold(*self, BinaryOp::Mul, operands),
			Operation::Divide | Operation::Percentage => {
				let mut operands = operands;
				if let Some(first) = operands.first_mut() {
					*first = Expr::cast(first.clone(), float);
				}
				fold(*self, BinaryOp::Div, operands)
			}
			Operation::PercentChange => {
				let [from, to] = exactly::<2>(*self, operands)?;
				let ratio = Expr::binary(BinaryOp::Div, Expr::cast(to, float), from);
				let change = Expr::binary(BinaryOp::Sub, ratio, Expr::integer(1));
				Ok(Expr::binary(BinaryOp::Mul, change, Expr::integer(100)))
			}
			Operation::Sqrt => unary_function(*self, "SQRT", operands),
			Operation::Abs => unary_function(*self, "ABS", operands),
			Operation::Duration => {
				let [start, end] = exactly::<2>(*self, operands)?;
				Ok(match dialect {
					Dialect::Sqlite => Expr::binary(
						BinaryOp::Sub,
						Expr::function("julianday", vec![end]),
						Expr::function("julianday", vec![start]),
					),
					Dialect::Postgres => Expr::binary(
						BinaryOp::Sub,
						Expr::cast(end, "DATE"),
						Expr::cast(start, "DATE"),
					),
				})
			}

			Operation::Average => unary_function(*self, "AVG", operands),
			Operation::Count => unary_function(*self, "COUNT", operands),
			Operation::CountUnique => {
				let [operand] = exactly::<1>(*self, operands)?;
				Ok(Expr::Function {
					name: "COUNT",
					args: vec![operand],
					distinct: true,
				})
			}
			Operation::Max => unary_function(*self, "MAX", operands),
			Operation::Min | Operation::GetOne => unary_function(*self, "MIN", operands),
			Operation::Sum => unary_function(*self, "SUM", operands),
			Operation::Median => match dialect {
				Dialect::Sqlite => unary_function(*self, "median", operands),
				Dialect::Postgres => {
					let [operand] = exactly::<1>(*self, operands)?;
					Ok(Expr::WithinGroup {
						name: "percentile_disc",
						args: vec![Expr::Value(Value::Float(0.5))],
						order_by: Box::new(operand),
					})
				}
			},
			Operation::StdDev => match dialect {
				Dialect::Sqlite => unary_function(*self, "stdev", operands),
				Dialect::Postgres => unary_function(*self, "stddev", operands),
			},
			Operation::StringAgg => {
				let [operand] = exactly::<1>(*self, operands)?;
				Ok(match dialect {
					Dialect::Sqlite => Expr::function("group_concat", vec![operand, Expr::constant(", ")]),
					Dialect::Postgres => {
						Expr::function("string_agg", vec![Expr::cast(operand, "TEXT"), Expr::constant(", ")])
					}
				})
			}
			Operation::Correlation => {
				let [a, b] = exactly::<2>(*self, operands)?;
				Ok(match dialect {
					Dialect::Postgres => Expr::function("corr", vec![a, b]),
					Dialect::Sqlite => correlation_moments(a, b),
				})
			}

			Operation::RetrieveEntity
			| Operation::RetrieveAttribute
			| Operation::Groupby
			| Operation::Sort
			| Operation::Limit
			| Operation::RowNum
			| Operation::Collect
			| Operation::Return => internal_err!("{} does not compile to an expression", self),
		}
	}
}

/// `ROW_NUMBER() OVER (ORDER BY ...)`.
pub fn compile_rownum(order_by: Vec<OrderBy>) -> Expr {
	Expr::RowNumber {
		order_by,
	}
}

/// `ROUND(CAST(expr AS <float>), digits)`.
pub fn round(expr: Expr, digits: u32, dialect: Dialect) -> Expr {
	Expr::function("ROUND", vec![Expr::cast(expr, dialect.float_type()), Expr::integer(i64::from(digits))])
}

fn exactly<const N: usize>(op: Operation, operands: Vec<Expr>) -> Result<[Expr; N]> {
	let found = operands.len();
	match <[Expr; N]>::try_from(operands) {
		Ok(array) => Ok(array),
		Err(_) => internal_err!("{} compiled with {} operand(s), expected {}", op, found, N),
	}
}

fn binary(op: Operation, symbol: BinaryOp, operands: Vec<Expr>) -> Result<Expr> {
	let [left, right] = exactly::<2>(op, operands)?;
	Ok(Expr::binary(symbol, left, right))
}

fn unary_function(op: Operation, name: &'static str, operands: Vec<Expr>) -> Result<Expr> {
	let [operand] = exactly::<1>(op, operands)?;
	Ok(Expr::function(name, vec![operand]))
}

fn logical(op: Operation, symbol: LogicalOp, operands: Vec<Expr>) -> Result<Expr> {
	match operands.len() {
		0 => internal_err!("{} compiled without operands", op),
		1 => Ok(operands.into_iter().next().unwrap_or(Expr::Value(Value::Null))),
		_ => Ok(Expr::Logical {
			op: symbol,
			operands,
		}),
	}
}

fn fold(op: Operation, symbol: BinaryOp, operands: Vec<Expr>) -> Result<Expr> {
	match operands.into_iter().reduce(|left, right| Expr::binary(symbol, left, right)) {
		Some(expr) => Ok(expr),
		None => internal_err!("{} compiled without operands", op),
	}
}

fn correlation_moments(a: Expr, b: Expr) -> Expr {
	let avg = |e: Expr| Expr::function("AVG", vec![e]);
	let mul = |l: Expr, r: Expr| Expr::binary(BinaryOp::Mul, l, r);
	let sub = |l: Expr, r: Expr| Expr::binary(BinaryOp::Sub, l, r);
	let deviation = |x: &Expr| {
		Expr::function(
			"SQRT",
			vec![sub(avg(mul(x.clone(), x.clone())), mul(avg(x.clone()), avg(x.clone())))],
		)
	};

	let covariance = sub(avg(mul(a.clone(), b.clone())), mul(avg(a.clone()), avg(b.clone())));
	Expr::binary(BinaryOp::Div, covariance, mul(deviation(&a), deviation(&b)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn col(name: &str) -> Expr {
		Expr::column("t", name)
	}

	#[test]
	fn test_add_folds_left() {
		let expr = Operation::Add.compile(vec![col("a"), col("b"), col("c")], Dialect::Sqlite).unwrap();
		assert_eq!(
			expr,
			Expr::binary(BinaryOp::Add, Expr::binary(BinaryOp::Add, col("a"), col("b")), col("c"))
		);
	}

	#[test]
	fn test_count_unique_is_distinct() {
		let expr = Operation::CountUnique.compile(vec![col("a")], Dialect::Sqlite).unwrap();
		assert!(matches!(expr, Expr::Function { name: "COUNT", distinct: true, .. }));
	}

	#[test]
	fn test_dialect_specific_functions() {
		let sqlite = Operation::StdDev.compile(vec![col("a")], Dialect::Sqlite).unwrap();
		let postgres = Operation::StdDev.compile(vec![col("a")], Dialect::Postgres).unwrap();
		assert!(matches!(sqlite, Expr::Function { name: "stdev", .. }));
		assert!(matches!(postgres, Expr::Function { name: "stddev", .. }));

		let median = Operation::Median.compile(vec![col("a")], Dialect::Postgres).unwrap();
		assert!(matches!(median, Expr::WithinGroup { name: "percentile_disc", .. }));
	}

	#[test]
	fn test_wrong_operand_count_is_internal() {
		let err = Operation::Sqrt.compile(vec![col("a"), col("b")], Dialect::Sqlite).unwrap_err();
		assert_eq!(err.code(), "INTERNAL_001");
	}

	#[test]
	fn test_non_expression_operations_do_not_compile() {
		assert!(Operation::Collect.compile(vec![col("a")], Dialect::Sqlite).is_err());
	}
}
