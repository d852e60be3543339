// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod dialect;
pub mod error;
pub mod value;

pub use dialect::Dialect;
pub use error::{
	Error, Result,
	diagnostic::{Diagnostic, ErrorKind, IntoDiagnostic},
	render::DefaultRenderer,
};
pub use value::Value;
