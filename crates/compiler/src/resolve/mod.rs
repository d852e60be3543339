// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compiles subplan arguments against a schema: resolves field handles into
//! SQL expressions, finds and applies the joins they need and nests every
//! subplan into the SELECT of its consumers.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use sqr_ring::{RingError, Schema};
use sqr_type::{Dialect, Result, internal_err};
use tracing::{debug, instrument};

use crate::{
	builder::SubplanArguments,
	config::CompilerConfig,
	error::SqrError,
	plan::SubplanId,
	sql::ast::{Expr, JoinClause, JoinKind, OrderBy, Select, SelectItem, TableRef},
};

mod expression;
mod join;

pub use join::apply_joins;

use expression::ExpressionResolver;

/// The outermost SELECT together with the arguments it was compiled from,
/// with their required joins filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
	pub select: Select,
	pub arguments: Vec<SubplanArguments>,
}

pub struct Resolver<'a> {
	schema: &'a dyn Schema,
	config: &'a CompilerConfig,
	dialect: Dialect,
	compiled: IndexMap<SubplanId, Select>,
	exposed: IndexMap<SubplanId, Vec<String>>,
}

impl<'a> Resolver<'a> {
	pub fn new(schema: &'a dyn Schema, config: &'a CompilerConfig) -> Self {
		Self {
			schema,
			config,
			dialect: config.resolve_dialect(schema.dialect()),
			compiled: IndexMap::new(),
			exposed: IndexMap::new(),
		}
	}

	#[instrument(name = "resolve::resolve", level = "debug", skip_all, fields(subplans = arguments.len()))]
	pub fn resolve(mut self, mut arguments: Vec<SubplanArguments>) -> Result<Resolution> {
		for args in &mut arguments {
			let select = self.resolve_subplan(args)?;
			self.exposed.insert(args.id, args.select.clone());
			self.compiled.insert(args.id, select);
		}

		let Some((_, select)) = self.compiled.pop() else {
			return internal_err!("plan compiled to no subplans");
		};
		Ok(Resolution {
			select,
			arguments,
		})
	}

	fn resolve_subplan(&self, args: &mut SubplanArguments) -> Result<Select> {
		if let Some(unknown) = args.entity_sources().find(|e| !self.schema.is_entity(e)) {
			return Err(RingError::UnknownEntity {
				name: unknown.to_string(),
			}
			.into());
		}

		let mut expressions = ExpressionResolver {
			schema: self.schema,
			config: self.config,
			dialect: self.dialect,
			exposed: &self.exposed,
			origins: &args.origins,
			joins: BTreeSet::new(),
		};

		let mut columns: IndexMap<&str, Expr> = IndexMap::with_capacity(args.fields.len());
		for (column, handle) in &args.fields {
			columns.insert(column, expressions.resolve(handle)?);
		}
		let filter = args.filter.as_ref().map(|h| expressions.resolve(h)).transpose()?;
		let having = args.having.as_ref().map(|h| expressions.resolve(h)).transpose()?;

		let mut joins = expressions.joins;
		let entities: Vec<String> = args.entity_sources().map(str::to_string).collect();
		for (i, a) in entities.iter().enumerate() {
			for b in &entities[i + 1..] {
				joins.extend(self.schema.get_joins_between(a, b)?);
			}
		}

		let mut derived = args.subplan_sources();
		let from = match entities.first() {
			Some(entity) => TableRef::Table(self.schema.get_entity(entity)?.primary_table.clone()),
			None => match derived.next() {
				Some(id) => self.derived(id)?,
				None => {
					return Err(SqrError::NoSource {
						subplan: args.id.to_string(),
					}
					.into());
				}
			},
		};

		let mut joined = BTreeSet::from([from.name().to_string()]);
		let mut join_clauses = apply_joins(self.schema, args.id, &joins, &mut joined)?;
		for id in derived {
			join_clauses.push(JoinClause {
				kind: JoinKind::Cross,
				table: self.derived(id)?,
				on: None,
				relation: None,
			});
		}

		let column = |name: &str| -> Result<Expr> {
			match columns.get(name) {
				Some(expr) => Ok(expr.clone()),
				None => internal_err!("column {} of {} was never resolved", name, args.id),
			}
		};

		let select = Select {
			columns: args
				.select
				.iter()
				.map(|name| {
					Ok(SelectItem {
						expr: column(name.as_str())?,
						alias: name.clone(),
					})
				})
				.collect::<Result<_>>()?,
			from,
			joins: join_clauses,
			filter,
			group_by: args.group_by.iter().map(|name| column(name.as_str())).collect::<Result<_>>()?,
			having,
			order_by: args
				.sort
				.iter()
				.map(|key| {
					Ok(OrderBy {
						expr: column(key.column.as_str())?,
						direction: key.direction,
						nulls_last: self.config.nulls_last,
					})
				})
				.collect::<Result<_>>()?,
			limit: args.limit,
		};
		args.joins = joins;

		debug!(
			subplan = %args.id,
			from = %select.from.name(),
			joins = ?args.joins,
			columns = select.columns.len(),
			"resolved subplan"
		);
		Ok(select)
	}

	fn derived(&self, id: SubplanId) -> Result<TableRef> {
		match self.compiled.get(&id) {
			Some(select) => Ok(TableRef::Derived {
				query: Box::new(select.clone()),
				alias: id.to_string(),
			}),
			None => internal_err!("{} is read before it is compiled", id),
		}
	}
}
