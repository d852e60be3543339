// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use rusqlite::Connection;

const SEED: &str = "
CREATE TABLE company (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE department (id INTEGER PRIMARY KEY, name TEXT NOT NULL, company_id INTEGER REFERENCES company(id));
CREATE TABLE employee (
	id INTEGER PRIMARY KEY,
	name TEXT NOT NULL,
	salary REAL,
	hired TEXT,
	department_id INTEGER REFERENCES department(id)
);
CREATE TABLE employee_profile (employee_id INTEGER PRIMARY KEY REFERENCES employee(id), bio TEXT);
CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);

INSERT INTO company VALUES (1, 'Acme'), (2, 'Globex');
INSERT INTO department VALUES (1, 'Sales', 1), (2, 'Engineering', 1), (3, 'Research', 2);
INSERT INTO employee VALUES
	(1, 'Ada', 120000, '2019-03-04', 2),
	(2, 'Grace', 135000, '2018-07-19', 2),
	(3, 'Linus', 90000, '2020-01-15', 1),
	(4, 'Ken', 70000, '2021-11-02', 1),
	(5, 'Barbara', 110000, '2017-05-30', 3);
INSERT INTO employee_profile VALUES (1, 'Wrote the first program'), (2, NULL);
INSERT INTO person VALUES (1, 'Alice', 34), (2, 'Bob', 27), (3, 'Carol', 45);
";

/// In-memory database seeded to match [`crate::company_ring`].
///
/// Average salary per department is Engineering 127500, Research 110000 and
/// Sales 80000.
pub fn company_db() -> rusqlite::Result<Connection> {
	let conn = Connection::open_in_memory()?;
	seed(&conn)?;
	Ok(conn)
}

pub(crate) fn seed(conn: &Connection) -> rusqlite::Result<()> {
	conn.execute_batch(SEED)
}
