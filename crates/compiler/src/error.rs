// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqr_type::{Diagnostic, Error, ErrorKind, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SqrError {
	#[error("'{reference}' is not a step reference")]
	InvalidStepReference {
		reference: String,
	},

	#[error("malformed step {step}: {message}")]
	MalformedStep {
		step: String,
		text: String,
		message: String,
	},

	#[error("unknown operation '{name}'")]
	UnknownOperation {
		step: Option<String>,
		name: String,
	},

	#[error("{operation} expects {expected} argument(s), found {found}")]
	ArityMismatch {
		step: String,
		operation: String,
		expected: String,
		found: usize,
	},

	#[error("invalid argument {position} to {operation}: {message}")]
	InvalidArgument {
		step: String,
		operation: String,
		position: usize,
		message: String,
	},

	#[error("{operation} cannot take '{operand}' of type {found}; expected one of {expected}")]
	SemanticTypeMismatch {
		step: Option<String>,
		operation: String,
		operand: String,
		expected: String,
		found: String,
	},

	#[error("return cannot take {argument}, a {category} step")]
	UnsupportedReturnArgument {
		step: String,
		argument: String,
		category: String,
	},

	#[error("return takes at most one {clause} predicate")]
	DuplicateReturnClause {
		step: String,
		clause: String,
	},

	#[error("plan has no steps")]
	EmptyPlan,

	#[error("plan has no terminal step")]
	NoTerminal,

	#[error("plan has {} terminal steps: {}", .steps.len(), .steps.join(", "))]
	MultipleTerminals {
		steps: Vec<String>,
	},

	#[error("terminal step {step} is a {operation}, not a return")]
	TerminalNotReturn {
		step: String,
		operation: String,
	},

	#[error("plan contains a cycle through {}", .steps.join(", "))]
	Cycle {
		steps: Vec<String>,
	},

	#[error("step {step} cannot be placed in any subplan")]
	UnplacedStep {
		step: String,
	},

	#[error("step {step} belongs to more than one subplan ({})", .subplans.join(", "))]
	SharedStep {
		step: String,
		subplans: Vec<String>,
	},

	#[error("step {step} references undefined step {reference}")]
	UndefinedReference {
		step: String,
		operation: String,
		reference: String,
	},

	#[error("no subplan contains {reference}, referenced by {step}")]
	MissingParentSubplan {
		step: String,
		reference: String,
	},

	#[error("ambiguous parent plan for {reference}: found in {}", .candidates.join(", "))]
	AmbiguousParentSubplan {
		step: String,
		reference: String,
		candidates: Vec<String>,
	},

	#[error("{reference} lies in another subplan but is not its return step")]
	NotAReturn {
		step: String,
		reference: String,
	},

	#[error("{reference} must be a retrieve_entity step")]
	NotAnEntity {
		step: String,
		reference: String,
	},

	#[error("{reference} does not produce a field")]
	UnresolvedField {
		step: String,
		operation: String,
		reference: String,
	},

	#[error("column '{column}' is not returned by {subplan}")]
	ColumnNotExposed {
		step: Option<String>,
		subplan: String,
		column: String,
	},

	#[error("column '{column}' matches several columns of {subplan}: {}", .candidates.join(", "))]
	AmbiguousColumn {
		step: String,
		subplan: String,
		column: String,
		candidates: Vec<String>,
	},

	#[error("join '{join}' in {subplan} does not connect to any joined table")]
	StrandedJoin {
		subplan: String,
		join: String,
		joined: Vec<String>,
	},

	#[error("{subplan} has no data source")]
	NoSource {
		subplan: String,
	},

	#[error("query execution failed: {message}")]
	Execution {
		message: String,
		sql: String,
	},
}

impl IntoDiagnostic for SqrError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			SqrError::InvalidStepReference {
				..
			} => Diagnostic::new("SYNTAX_001", ErrorKind::Syntax, message)
				.with_help("step references are written as |identifier|"),

			SqrError::MalformedStep {
				step,
				text,
				..
			} => Diagnostic::new("SYNTAX_002", ErrorKind::Syntax, message)
				.with_step(step)
				.with_label(text)
				.with_help("a step is written as (operation arg0 arg1 ...)"),

			SqrError::UnknownOperation {
				step,
				name,
			} => {
				let mut d = Diagnostic::new("ONTOLOGY_001", ErrorKind::Ontology, message)
					.with_operation(name)
					.with_help("use one of the registered operations");
				d.step = step;
				d
			}

			SqrError::ArityMismatch {
				step,
				operation,
				..
			} => Diagnostic::new("ONTOLOGY_002", ErrorKind::Ontology, message)
				.with_step(step)
				.with_operation(operation),

			SqrError::InvalidArgument {
				step,
				operation,
				..
			} => Diagnostic::new("ONTOLOGY_003", ErrorKind::Ontology, message)
				.with_step(step)
				.with_operation(operation),

			SqrError::SemanticTypeMismatch {
				step,
				operation,
				..
			} => {
				let mut d = Diagnostic::new("ONTOLOGY_004", ErrorKind::Ontology, message).with_operation(operation);
				d.step = step;
				d
			}

			SqrError::UnsupportedReturnArgument {
				step,
				..
			} => Diagnostic::new("ONTOLOGY_005", ErrorKind::Ontology, message)
				.with_step(step)
				.with_operation("return")
				.with_help("return accepts a collect step followed by filter, sort and limit steps"),

			SqrError::DuplicateReturnClause {
				step,
				..
			} => Diagnostic::new("ONTOLOGY_006", ErrorKind::Ontology, message)
				.with_step(step)
				.with_operation("return")
				.with_help("combine the predicates with 'and'"),

			SqrError::EmptyPlan => Diagnostic::new("GRAPH_001", ErrorKind::Graph, message),

			SqrError::NoTerminal => Diagnostic::new("GRAPH_002", ErrorKind::Graph, message)
				.with_help("every plan ends in exactly one return step"),

			SqrError::MultipleTerminals {
				..
			} => Diagnostic::new("GRAPH_003", ErrorKind::Graph, message)
				.with_help("every plan ends in exactly one return step; remove unused steps"),

			SqrError::TerminalNotReturn {
				step,
				operation,
			} => Diagnostic::new("GRAPH_004", ErrorKind::Graph, message).with_step(step).with_operation(operation),

			SqrError::Cycle {
				..
			} => Diagnostic::new("GRAPH_005", ErrorKind::Graph, message),

			SqrError::UnplacedStep {
				step,
			} => Diagnostic::new("GRAPH_006", ErrorKind::Graph, message).with_step(step),

			SqrError::SharedStep {
				step,
				..
			} => Diagnostic::new("GRAPH_007", ErrorKind::Graph, message)
				.with_step(step)
				.with_help("give each subplan its own steps"),

			SqrError::UndefinedReference {
				step,
				operation,
				..
			} => Diagnostic::new("RESOLUTION_001", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation(operation),

			SqrError::MissingParentSubplan {
				step,
				..
			} => Diagnostic::new("RESOLUTION_002", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation("retrieve_attribute"),

			SqrError::AmbiguousParentSubplan {
				step,
				..
			} => Diagnostic::new("RESOLUTION_003", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation("retrieve_attribute"),

			SqrError::NotAReturn {
				step,
				..
			} => Diagnostic::new("RESOLUTION_004", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation("retrieve_attribute")
				.with_help("read values of another subplan through its return step"),

			SqrError::NotAnEntity {
				step,
				..
			} => Diagnostic::new("RESOLUTION_005", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation("retrieve_attribute"),

			SqrError::UnresolvedField {
				step,
				operation,
				..
			} => Diagnostic::new("RESOLUTION_006", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation(operation),

			SqrError::ColumnNotExposed {
				step,
				..
			} => {
				let mut d = Diagnostic::new("RESOLUTION_007", ErrorKind::Resolution, message)
					.with_help("collect the column in the subplan's return step");
				d.step = step;
				d
			}

			SqrError::AmbiguousColumn {
				step,
				..
			} => Diagnostic::new("RESOLUTION_010", ErrorKind::Resolution, message)
				.with_step(step)
				.with_operation("retrieve_attribute")
				.with_help("name the column in full, as in Entity//attribute"),

			SqrError::StrandedJoin {
				joined,
				..
			} => Diagnostic::new("RESOLUTION_008", ErrorKind::Resolution, message)
				.with_note(format!("joined tables: {}", joined.join(", "))),

			SqrError::NoSource {
				..
			} => Diagnostic::new("RESOLUTION_009", ErrorKind::Resolution, message),

			SqrError::Execution {
				sql,
				..
			} => Diagnostic::new("EXECUTE_001", ErrorKind::Execution, message).with_note(sql),
		}
	}
}

impl From<SqrError> for Error {
	fn from(err: SqrError) -> Self {
		Error(err.into_diagnostic())
	}
}
