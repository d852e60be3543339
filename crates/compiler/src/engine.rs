// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexMap;
use sqr_ring::Schema;
use sqr_type::{Dialect, Result, internal_err};
use tracing::{debug, instrument};

use crate::{
	builder::{QueryBuilder, SubplanArguments},
	config::CompilerConfig,
	execute::{QueryResult, Session},
	parse,
	plan::Plan,
	resolve::Resolver,
	sql::{Select, Statement, emit},
};

/// Everything produced while compiling one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
	pub plan: Plan,
	/// Per subplan, innermost first, with required joins filled in.
	pub arguments: Vec<SubplanArguments>,
	pub select: Select,
	pub statement: Statement,
	pub dialect: Dialect,
}

impl Compiled {
	pub fn outermost(&self) -> Result<&SubplanArguments> {
		match self.arguments.last() {
			Some(arguments) => Ok(arguments),
			None => internal_err!("compiled plan has no subplans"),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
	config: CompilerConfig,
}

impl Engine {
	pub fn new(config: CompilerConfig) -> Self {
		Self {
			config,
		}
	}

	pub fn config(&self) -> &CompilerConfig {
		&self.config
	}

	pub fn parse(&self, raw: &IndexMap<String, String>) -> Result<Plan> {
		parse::parse(raw)
	}

	pub fn compile(&self, raw: &IndexMap<String, String>, schema: &dyn Schema) -> Result<Compiled> {
		let plan = self.parse(raw)?;
		self.compile_plan(plan, schema)
	}

	#[instrument(name = "engine::compile", level = "debug", skip_all, fields(steps = plan.steps().len()))]
	pub fn compile_plan(&self, plan: Plan, schema: &dyn Schema) -> Result<Compiled> {
		let dialect = self.config.resolve_dialect(schema.dialect());
		let arguments = QueryBuilder::new(&plan).build()?;
		let resolution = Resolver::new(schema, &self.config).resolve(arguments)?;
		let statement = emit(&resolution.select, dialect);
		debug!(sql = %statement.sql, params = statement.params.len(), "emitted statement");

		Ok(Compiled {
			plan,
			arguments: resolution.arguments,
			select: resolution.select,
			statement,
			dialect,
		})
	}

	pub fn run(&self, compiled: &Compiled, schema: &dyn Schema, session: &mut dyn Session) -> Result<QueryResult> {
		let rows = session.execute(&compiled.statement)?;
		Ok(QueryResult::new(rows, compiled.outermost()?, schema))
	}

	#[instrument(name = "engine::compile_and_run", level = "debug", skip_all)]
	pub fn compile_and_run(
		&self,
		raw: &IndexMap<String, String>,
		schema: &dyn Schema,
		session: &mut dyn Session,
	) -> Result<QueryResult> {
		let compiled = self.compile(raw, schema)?;
		let result = self.run(&compiled, schema, session)?;
		debug!(rows = result.row_count, "plan executed");
		Ok(result)
	}
}

/// Compiles and runs a plan with the default configuration.
pub fn compile_and_run(
	raw: &IndexMap<String, String>,
	schema: &dyn Schema,
	session: &mut dyn Session,
) -> Result<QueryResult> {
	Engine::default().compile_and_run(raw, schema, session)
}
