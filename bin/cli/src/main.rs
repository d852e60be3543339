// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{
	fs,
	io::{self, Read},
	path::PathBuf,
	process::ExitCode,
};

use clap::Parser;
use rusqlite::Connection;
use sqr_compiler::{CompilerConfig, Engine, explain, parse_json};
use sqr_ring::Ring;
use sqr_type::{DefaultRenderer, Dialect, Error, Result, error::diagnostic::internal, return_error};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "sqr", version, about = "Compile a semantic query plan to SQL and run it")]
struct Arguments {
	/// Ring document describing entities, attributes and joins.
	#[clap(long)]
	ring: PathBuf,

	/// SQLite database to run against. Defaults to the ring's connection string.
	#[clap(long)]
	database: Option<PathBuf>,

	/// Compiler configuration in JSON.
	#[clap(long)]
	config: Option<PathBuf>,

	/// Print the plan, subplans and SQL instead of running the query.
	#[clap(long)]
	explain: bool,

	/// Print the SQL statement and its parameters as JSON without running it.
	#[clap(long, conflicts_with = "explain")]
	sql: bool,

	/// Plan file holding a JSON object of steps, or `-` for stdin.
	plan: String,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();

	let args = Arguments::parse();
	match run(args) {
		Ok(output) => {
			println!("{}", output);
			ExitCode::SUCCESS
		}
		Err(err) => {
			eprint!("{}", DefaultRenderer::render_string(&err));
			ExitCode::FAILURE
		}
	}
}

fn run(args: Arguments) -> Result<String> {
	let ring = Ring::from_path(&args.ring)?;
	let config = match &args.config {
		Some(path) => CompilerConfig::from_path(path)?,
		None => CompilerConfig::default(),
	};
	let plan = parse_json(&read_plan(&args.plan)?)?;

	let engine = Engine::new(config);
	let compiled = engine.compile_plan(plan, &ring)?;

	if args.explain {
		return Ok(explain(&compiled));
	}
	if args.sql {
		return Ok(serde_json::to_string_pretty(&compiled.statement)?);
	}

	if compiled.dialect != Dialect::Sqlite {
		return_error!(internal::unsupported(format!(
			"{} databases cannot be queried from the command line; use --sql to print the statement",
			compiled.dialect
		)));
	}
	let database = match (&args.database, &ring.connection_string) {
		(Some(path), _) => path.display().to_string(),
		(None, Some(connection)) => connection.clone(),
		(None, None) => {
			return_error!(internal::unsupported(format!(
				"ring '{}' has no connection string; pass --database",
				ring.name
			)));
		}
	};
	debug!(database = %database, "opening database");
	let mut conn = Connection::open(&database).map_err(|err| Error(internal::io(&database, err)))?;

	let result = engine.run(&compiled, &ring, &mut conn)?;
	Ok(serde_json::to_string_pretty(&result)?)
}

fn read_plan(source: &str) -> Result<String> {
	if source == "-" {
		let mut text = String::new();
		io::stdin().read_to_string(&mut text).map_err(|err| Error(internal::io("stdin", err)))?;
		return Ok(text);
	}
	fs::read_to_string(source).map_err(|err| Error(internal::io(source, err)))
}
