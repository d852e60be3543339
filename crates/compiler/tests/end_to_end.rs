// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexMap;
use sqr_compiler::{CompilerConfig, Engine, QueryResult, compile_and_run, explain};
use rusqlite::Connection;
use sqr_ring::Ring;
use sqr_testing::{Fixtures, company_db, company_ring};
use sqr_type::{Dialect, ErrorKind, Value};

fn plan(steps: &[(&str, &str)]) -> IndexMap<String, String> {
	steps.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn run(steps: &[(&str, &str)]) -> QueryResult {
	let mut conn = company_db().unwrap();
	compile_and_run(&plan(steps), &company_ring(), &mut conn).unwrap()
}

fn text(s: &str) -> Value {
	Value::Text(s.to_string())
}

fn units(pairs: &[(&str, &str)]) -> Vec<[String; 2]> {
	pairs.iter().map(|(s, p)| [s.to_string(), p.to_string()]).collect()
}

const SALARY_BY_DEPARTMENT: &[(&str, &str)] = &[
	("|1|", "(retrieve_entity Employee)"),
	("|2|", "(retrieve_attribute |1| salary)"),
	("|3|", "(retrieve_attribute |1| department)"),
	("|4|", "(groupby |3|)"),
	("|5|", "(average |2| |4|)"),
	("|6|", "(collect |3| |5|)"),
	("|7|", "(return |6|)"),
	("|8|", "(retrieve_attribute |7| |5|)"),
	("|9|", "(retrieve_attribute |7| |3|)"),
	("|10|", "(sort |8| desc)"),
	("|11|", "(limit 5)"),
	("|12|", "(collect |9| |8|)"),
	("|13|", "(return |12| |10| |11|)"),
];

#[test]
fn test_single_attribute() {
	let steps = [
		("|1|", "(retrieve_entity Person)"),
		("|2|", "(retrieve_attribute |1| age)"),
		("|3|", "(collect |2|)"),
		("|4|", "(return |3|)"),
	];
	let compiled = Engine::default().compile(&plan(&steps), &company_ring()).unwrap();
	assert_eq!(compiled.statement.sql, r#"SELECT "person"."age" AS "Person//age" FROM "person""#);
	assert!(compiled.select.joins.is_empty());

	let result = run(&steps);
	assert_eq!(result.column_names, vec!["Person//age"]);
	assert_eq!(result.row_count, 3);
	assert_eq!(result.rows, vec![vec![Value::Integer(34)], vec![Value::Integer(27)], vec![Value::Integer(45)]]);
	assert_eq!(result.units, units(&[("age", "ages")]));
}

#[test]
fn test_average_salary_by_department() {
	let result = run(SALARY_BY_DEPARTMENT);
	assert_eq!(result.column_names, vec!["alias_0//Employee//department", "alias_0//average(Employee//salary)"]);
	assert_eq!(result.rows, vec![
		vec![text("Engineering"), Value::Float(127500.0)],
		vec![text("Research"), Value::Float(110000.0)],
		vec![text("Sales"), Value::Float(80000.0)],
	]);
	assert_eq!(result.units, units(&[("department", "departments"), ("dollar", "dollars")]));
}

#[test]
fn test_two_entities_join_through_department() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_entity Company)"),
		("|3|", "(retrieve_attribute |1| name)"),
		("|4|", "(retrieve_attribute |2| name)"),
		("|5|", "(exact |4| \"Globex\")"),
		("|6|", "(collect |3| |4|)"),
		("|7|", "(return |6| |5|)"),
	]);
	assert_eq!(result.column_names, vec!["Employee//name", "Company//name"]);
	assert_eq!(result.rows, vec![vec![text("Barbara"), text("Globex")]]);
}

#[test]
fn test_count_per_company() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_entity Company)"),
		("|3|", "(retrieve_attribute |1| employee_id)"),
		("|4|", "(retrieve_attribute |2| name)"),
		("|5|", "(groupby |4|)"),
		("|6|", "(count |3| |5|)"),
		("|7|", "(sort |6| desc)"),
		("|8|", "(collect |4| |6|)"),
		("|9|", "(return |8| |7|)"),
	]);
	assert_eq!(result.rows, vec![vec![text("Acme"), Value::Integer(4)], vec![text("Globex"), Value::Integer(1)]]);
	assert_eq!(result.units, units(&[("name", "names"), ("employee", "employees")]));
}

#[test]
fn test_null_values_are_cast() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_attribute |1| name)"),
		("|3|", "(retrieve_attribute |1| bio)"),
		("|4|", "(sort |2| asc)"),
		("|5|", "(limit 3)"),
		("|6|", "(collect |2| |3|)"),
		("|7|", "(return |6| |4| |5|)"),
	]);
	assert_eq!(result.rows, vec![
		vec![text("Ada"), text("Wrote the first program")],
		vec![text("Barbara"), text("")],
		vec![text("Grace"), text("")],
	]);
}

#[test]
fn test_date_part_filter() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_attribute |1| name)"),
		("|3|", "(retrieve_attribute |1| hired:year)"),
		("|4|", "(exact |3| \"2018\")"),
		("|5|", "(collect |2| |3|)"),
		("|6|", "(return |5| |4|)"),
	]);
	assert_eq!(result.rows, vec![vec![text("Grace"), text("2018")]]);
	assert_eq!(result.units[1], ["year of hire date".to_string(), "year of hire dates".to_string()]);
}

#[test]
fn test_standard_deviation_and_median_run_on_sqlite() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_attribute |1| salary)"),
		("|3|", "(stddev |2|)"),
		("|4|", "(median |2|)"),
		("|5|", "(collect |3| |4|)"),
		("|6|", "(return |5|)"),
	]);
	assert_eq!(result.column_names, vec!["stddev(Employee//salary)", "median(Employee//salary)"]);
	let [Value::Float(stddev), median] = result.rows[0].as_slice() else {
		panic!("unexpected row {:?}", result.rows[0]);
	};
	assert!((stddev - 25495.1).abs() < 1e-6);
	assert_eq!(median, &Value::Float(110000.0));
}

#[test]
fn test_median_per_department() {
	let result = run(&[
		("|1|", "(retrieve_entity Employee)"),
		("|2|", "(retrieve_attribute |1| salary)"),
		("|3|", "(retrieve_attribute |1| department)"),
		("|4|", "(groupby |3|)"),
		("|5|", "(median |2| |4|)"),
		("|6|", "(sort |3| asc)"),
		("|7|", "(collect |3| |5|)"),
		("|8|", "(return |7| |6|)"),
	]);
	assert_eq!(result.rows, vec![
		vec![text("Engineering"), Value::Float(120000.0)],
		vec![text("Research"), Value::Float(110000.0)],
		vec![text("Sales"), Value::Float(70000.0)],
	]);
}

#[test]
fn test_ring_and_database_from_disk() {
	let fixtures = Fixtures::new().unwrap();
	let ring = Ring::from_path(fixtures.company_ring().unwrap()).unwrap();
	let mut conn = Connection::open(fixtures.company_db().unwrap()).unwrap();

	let result = compile_and_run(
		&plan(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| name)"),
			("|3|", "(retrieve_attribute |1| age)"),
			("|4|", "(greaterthan |3| 30)"),
			("|5|", "(collect |2|)"),
			("|6|", "(return |5| |4|)"),
		]),
		&ring,
		&mut conn,
	)
	.unwrap();
	assert_eq!(result.rows, vec![vec![text("Alice")], vec![text("Carol")]]);
}

#[test]
fn test_unknown_operation() {
	let mut conn = company_db().unwrap();
	let err = compile_and_run(
		&plan(&[("|1|", "(frobnicate Person)"), ("|2|", "(collect |1|)"), ("|3|", "(return |2|)")]),
		&company_ring(),
		&mut conn,
	)
	.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Ontology);
	assert_eq!(err.code(), "ONTOLOGY_001");
	assert_eq!(err.step.as_deref(), Some("|1|"));
}

#[test]
fn test_postgres_dialect_override() {
	let engine = Engine::new(CompilerConfig::default().dialect(Dialect::Postgres));
	let compiled = engine
		.compile(
			&plan(&[
				("|1|", "(retrieve_entity Person)"),
				("|2|", "(retrieve_attribute |1| name)"),
				("|3|", "(exact |2| \"Bob\")"),
				("|4|", "(collect |2|)"),
				("|5|", "(return |4| |3|)"),
			]),
			&company_ring(),
		)
		.unwrap();
	assert_eq!(compiled.dialect, Dialect::Postgres);
	assert!(compiled.statement.sql.ends_with(r#"WHERE ("person"."name" = $1)"#));
	assert_eq!(compiled.statement.params, vec![text("Bob")]);
}

#[test]
fn test_explain_shows_every_stage() {
	let compiled = Engine::default().compile(&plan(SALARY_BY_DEPARTMENT), &company_ring()).unwrap();
	let text = explain(&compiled);
	assert!(text.contains("alias_1 (return |13|)"));
	assert!(text.contains("average of salary of Employee grouped by department of Employee"));
	assert!(text.contains("joins:    employee_department"));
	assert!(text.contains("-- sqlite statement"));
	assert!(text.contains(&compiled.statement.sql));
}
