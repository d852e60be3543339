// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Aggregates the compiler emits for SQLite that SQLite does not ship:
//! `stdev` (sample standard deviation) and `median` (discrete, matching
//! `percentile_disc(0.5)`).

use rusqlite::{
	Connection,
	functions::{Aggregate, Context, FunctionFlags},
	types::ValueRef,
};

/// Registers the aggregates on `conn`. Registering again replaces them.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
	let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
	conn.create_aggregate_function("stdev", 1, flags, StdDev)?;
	conn.create_aggregate_function("median", 1, flags, Median)?;
	Ok(())
}

/// Numeric view of an argument. NULL, blobs and non-numeric text are skipped.
fn numeric(ctx: &Context<'_>) -> Option<f64> {
	match ctx.get_raw(0) {
		ValueRef::Integer(i) => Some(i as f64),
		ValueRef::Real(f) => Some(f),
		ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
		ValueRef::Null | ValueRef::Blob(_) => None,
	}
}

#[derive(Debug, Default, Clone, Copy)]
struct Variance {
	count: i64,
	mean: f64,
	m2: f64,
}

impl Variance {
	fn update(&mut self, input: f64) {
		self.count += 1;
		let delta = input - self.mean;
		self.mean += delta / self.count as f64;
		self.m2 += delta * (input - self.mean);
	}

	fn sample_stddev(&self) -> Option<f64> {
		match self.count {
			0 | 1 => None,
			n => Some((self.m2 / (n - 1) as f64).sqrt()),
		}
	}
}

struct StdDev;

impl Aggregate<Variance, Option<f64>> for StdDev {
	fn init(&self, _: &mut Context<'_>) -> rusqlite::Result<Variance> {
		Ok(Variance::default())
	}

	fn step(&self, ctx: &mut Context<'_>, state: &mut Variance) -> rusqlite::Result<()> {
		if let Some(value) = numeric(ctx) {
			state.update(value);
		}
		Ok(())
	}

	fn finalize(&self, _: &mut Context<'_>, state: Option<Variance>) -> rusqlite::Result<Option<f64>> {
		Ok(state.and_then(|s| s.sample_stddev()))
	}
}

struct Median;

impl Aggregate<Vec<f64>, Option<f64>> for Median {
	fn init(&self, _: &mut Context<'_>) -> rusqlite::Result<Vec<f64>> {
		Ok(Vec::new())
	}

	fn step(&self, ctx: &mut Context<'_>, values: &mut Vec<f64>) -> rusqlite::Result<()> {
		if let Some(value) = numeric(ctx) {
			values.push(value);
		}
		Ok(())
	}

	fn finalize(&self, _: &mut Context<'_>, values: Option<Vec<f64>>) -> rusqlite::Result<Option<f64>> {
		let Some(mut values) = values.filter(|v| !v.is_empty()) else {
			return Ok(None);
		};
		values.sort_by(f64::total_cmp);
		Ok(Some(values[(values.len() + 1) / 2 - 1]))
	}
}
