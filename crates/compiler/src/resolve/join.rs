// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use sqr_ring::{Join, Schema};
use sqr_type::Result;
use tracing::trace;

use crate::{
	error::SqrError,
	plan::SubplanId,
	sql::ast::{BinaryOp, Expr, JoinClause, JoinKind, LogicalOp, TableRef},
};

/// Turns the named joins into LEFT OUTER JOIN clauses, growing `joined` with
/// every table reached. Joins are taken in name order, each as soon as one of
/// its ends is already joined.
pub fn apply_joins(
	schema: &dyn Schema,
	subplan: SubplanId,
	joins: &BTreeSet<String>,
	joined: &mut BTreeSet<String>,
) -> Result<Vec<JoinClause>> {
	let mut pending: Vec<&Join> = joins.iter().map(|name| schema.get_join(name)).collect::<Result<_>>()?;
	let mut clauses = Vec::with_capacity(pending.len());

	while !pending.is_empty() {
		let Some(index) =
			pending.iter().position(|j| joined.contains(&j.from_table) || joined.contains(&j.to_table))
		else {
			return Err(SqrError::StrandedJoin {
				subplan: subplan.to_string(),
				join: pending[0].name.clone(),
				joined: joined.iter().cloned().collect(),
			}
			.into());
		};

		let join = pending.remove(index);
		let (table, relation) = match (joined.contains(&join.from_table), joined.contains(&join.to_table)) {
			(true, false) => (join.to_table.clone(), join.name.clone()),
			(false, true) => (join.from_table.clone(), join.reverse_name()),
			_ => {
				trace!(join = %join.name, "both tables already joined");
				continue;
			}
		};

		trace!(join = %join.name, relation = %relation, table = %table, "applying join");
		joined.insert(table.clone());
		clauses.push(JoinClause {
			kind: JoinKind::LeftOuter,
			table: TableRef::Table(table),
			on: Some(on_clause(join)),
			relation: Some(relation),
		});
	}

	Ok(clauses)
}

fn on_clause(join: &Join) -> Expr {
	let mut pairs: Vec<Expr> = join
		.path
		.iter()
		.map(|p| {
			Expr::binary(
				BinaryOp::Eq,
				Expr::column(&p.from.table, &p.from.column),
				Expr::column(&p.to.table, &p.to.column),
			)
		})
		.collect();

	match pairs.len() {
		1 => pairs.remove(0),
		_ => Expr::Logical {
			op: LogicalOp::And,
			operands: pairs,
		},
	}
}

#[cfg(test)]
mod tests {
	use sqr_ring::Ring;
	use sqr_testing::ring::company_ring;

	use super::*;

	fn set(names: &[&str]) -> BTreeSet<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	fn relations(clauses: &[JoinClause]) -> Vec<&str> {
		clauses.iter().filter_map(|c| c.relation.as_deref()).collect()
	}

	fn ring() -> Ring {
		company_ring()
	}

	#[test]
	fn test_forward_joins_follow_reachability_not_name_order() {
		let ring = ring();
		let mut joined = set(&["employee"]);
		let clauses = apply_joins(
			&ring,
			SubplanId(0),
			&set(&["department_company", "employee_department"]),
			&mut joined,
		)
		.unwrap();
		assert_eq!(relations(&clauses), vec!["employee_department", "department_company"]);
		assert_eq!(joined, set(&["company", "department", "employee"]));
	}

	#[test]
	fn test_reverse_join_from_target_table() {
		let ring = ring();
		let mut joined = set(&["company"]);
		let clauses = apply_joins(
			&ring,
			SubplanId(0),
			&set(&["department_company", "employee_department"]),
			&mut joined,
		)
		.unwrap();
		assert_eq!(relations(&clauses), vec!["reverse_department_company", "reverse_employee_department"]);
		assert!(matches!(&clauses[0].table, TableRef::Table(t) if t == "department"));
	}

	#[test]
	fn test_join_between_joined_tables_is_skipped() {
		let ring = ring();
		let mut joined = set(&["employee", "department"]);
		let clauses = apply_joins(&ring, SubplanId(0), &set(&["employee_department"]), &mut joined).unwrap();
		assert!(clauses.is_empty());
	}

	#[test]
	fn test_stranded_join_is_named() {
		let ring = ring();
		let mut joined = set(&["person"]);
		let err = apply_joins(&ring, SubplanId(2), &set(&["department_company"]), &mut joined).unwrap_err();
		assert_eq!(err.code(), "RESOLUTION_008");
		assert!(err.message.contains("department_company"));
		assert!(err.message.contains("alias_2"));
	}

	#[test]
	fn test_on_clause_is_equality_of_path_columns() {
		let ring = ring();
		let mut joined = set(&["employee"]);
		let clauses = apply_joins(&ring, SubplanId(0), &set(&["employee_department"]), &mut joined).unwrap();
		assert_eq!(
			clauses[0].on,
			Some(Expr::binary(
				BinaryOp::Eq,
				Expr::column("employee", "department_id"),
				Expr::column("department", "id"),
			))
		);
		assert_eq!(clauses[0].kind, JoinKind::LeftOuter);
	}
}
