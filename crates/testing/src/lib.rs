// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fixtures shared by the compiler's unit and integration tests.

pub mod db;
pub mod files;
pub mod ring;

pub use db::company_db;
pub use files::Fixtures;
pub use ring::company_ring;
