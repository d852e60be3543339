// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod ast;
mod emit;

pub use ast::{Expr, Select};
pub use emit::{Statement, emit, quote_identifier};
