// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compiles semantic query plans into SQL and runs them.
//!
//! A plan is a map from step references such as `|3|` to step expressions
//! such as `(average |2| |4|)`. [`Engine::compile`] parses the plan, splits it
//! into subplans, resolves every field against a [`sqr_ring::Schema`] and emits
//! one SQL statement in the schema's dialect. [`Engine::run`] executes that
//! statement through a [`Session`] and labels the result with units.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod execute;
pub mod explain;
pub mod field;
pub mod ontology;
pub mod parse;
pub mod plan;
pub mod resolve;
pub mod sql;

pub use config::CompilerConfig;
pub use engine::{Compiled, Engine, compile_and_run};
pub use error::SqrError;
pub use execute::{QueryResult, Rows, Session};
pub use explain::explain;
pub use field::{FieldHandle, Operand, SortDirection};
pub use ontology::{Category, Ontology, Operation};
pub use parse::{parse, parse_json};
pub use plan::{Plan, Step, StepRef, SubplanId};
pub use sql::Statement;
