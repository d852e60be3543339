// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqr_ring::Ring;

/// Ring over the tables created by [`crate::company_db`].
pub const COMPANY_RING: &str = r#"{
	"name": "company",
	"schemaVersion": 2,
	"dataSource": {
		"type": "sqlite",
		"connectionString": ":memory:",
		"tables": [
			{"name": "person", "primaryKey": "id"},
			{"name": "employee", "primaryKey": "id"},
			{"name": "department", "primaryKey": "id"},
			{"name": "company", "primaryKey": "id"},
			{"name": "employee_profile", "primaryKey": "employee_id"}
		],
		"joins": [
			{"name": "employee_department", "from": "employee", "to": "department",
			 "path": [["employee.department_id", "department.id", "int"]]},
			{"name": "department_company", "from": "department", "to": "company",
			 "path": [["department.company_id", "company.id", "int"]]},
			{"name": "employee_profile", "from": "employee", "to": "employee_profile",
			 "path": [["employee.id", "employee_profile.employee_id", "int"]]}
		]
	},
	"entities": [
		{"name": "Person", "nicename": ["person", "people"], "table": "person", "id": ["id"],
		 "attributes": {
			"age": {"nicename": ["age", "ages"], "isa": "int", "type": ["metric"],
			        "source": {"table": "person", "columns": ["age"]}},
			"name": {"nicename": ["name", "names"], "type": ["string"],
			         "source": {"table": "person", "columns": ["name"]}}
		 }},
		{"name": "Employee", "nicename": ["employee", "employees"], "table": "employee", "id": ["id"],
		 "attributes": {
			"employee_id": {"nicename": ["employee id", "employee ids"], "type": ["identifier"],
			                "source": {"table": "employee", "columns": ["id"]}},
			"name": {"nicename": ["name", "names"], "type": ["string"],
			         "source": {"table": "employee", "columns": ["name"]}},
			"salary": {"nicename": ["salary", "salaries"], "isa": "float", "type": ["metric"],
			           "units": ["dollar", "dollars"],
			           "source": {"table": "employee", "columns": ["salary"]}},
			"hired": {"nicename": ["hire date", "hire dates"], "type": ["datetime", "startdate"],
			          "source": {"table": "employee", "columns": ["hired"]}},
			"department": {"nicename": ["department", "departments"], "type": ["categorical"],
			               "source": {"table": "department", "columns": ["name"], "joins": ["employee_department"]}},
			"bio": {"nicename": ["bio", "bios"], "type": ["document", "string"],
			        "nullHandling": "cast", "nullValue": "",
			        "source": {"table": "employee_profile", "columns": ["bio"], "joins": ["employee_profile"]}}
		 }},
		{"name": "Department", "nicename": ["department", "departments"], "table": "department", "id": ["id"],
		 "attributes": {
			"name": {"nicename": ["name", "names"], "type": ["categorical"],
			         "source": {"table": "department", "columns": ["name"]}}
		 }},
		{"name": "Company", "nicename": ["company", "companies"], "table": "company", "id": ["id"],
		 "attributes": {
			"name": {"nicename": ["name", "names"], "type": ["categorical"],
			         "source": {"table": "company", "columns": ["name"]}}
		 }}
	],
	"relationships": [
		{"name": "EmployeeDepartment", "from": "Employee", "to": "Department", "join": ["employee_department"]},
		{"name": "DepartmentCompany", "from": "Department", "to": "Company", "join": ["department_company"]},
		{"name": "EmployeeCompany", "from": "Employee", "to": "Company", "derived": true,
		 "relationshipList": ["EmployeeDepartment", "DepartmentCompany"]}
	]
}"#;

pub fn company_ring() -> Ring {
	Ring::from_json(COMPANY_RING).expect("company ring is valid")
}
