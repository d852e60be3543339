// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	env, fs, io,
	path::{Path, PathBuf},
};

use rusqlite::Connection;
use uuid::Uuid;

use crate::{db, ring::COMPANY_RING};

/// Scratch directory for on-disk fixtures: ring documents, configs, plans
/// and SQLite files. Removed when dropped.
pub struct Fixtures {
	root: PathBuf,
}

impl Fixtures {
	pub fn new() -> io::Result<Self> {
		let root = env::temp_dir().join(format!("sqr-fixtures-{}", Uuid::new_v4()));
		fs::create_dir_all(&root)?;
		Ok(Self {
			root,
		})
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn path(&self, name: &str) -> PathBuf {
		self.root.join(name)
	}

	pub fn write(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
		let path = self.path(name);
		fs::write(&path, contents)?;
		Ok(path)
	}

	/// Writes the company ring as `company.json`.
	pub fn company_ring(&self) -> io::Result<PathBuf> {
		self.write("company.json", COMPANY_RING)
	}

	/// Creates `company.db`, seeded like [`crate::company_db`].
	pub fn company_db(&self) -> rusqlite::Result<PathBuf> {
		let path = self.path("company.db");
		let conn = Connection::open(&path)?;
		db::seed(&conn)?;
		Ok(path)
	}
}

impl Drop for Fixtures {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.root);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_files_live_under_root_until_drop() {
		let fixtures = Fixtures::new().unwrap();
		let root = fixtures.root().to_path_buf();

		let ring = fixtures.company_ring().unwrap();
		assert_eq!(fs::read_to_string(&ring).unwrap(), COMPANY_RING);

		let db = fixtures.company_db().unwrap();
		let conn = Connection::open(&db).unwrap();
		let people: i64 = conn.query_row("SELECT COUNT(*) FROM person", [], |row| row.get(0)).unwrap();
		assert_eq!(people, 3);
		drop(conn);

		drop(fixtures);
		assert!(!root.exists());
	}
}
