// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod internal;

/// The error taxonomy. Every failure belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	Syntax,
	Ontology,
	Graph,
	Resolution,
	Execution,
	Configuration,
	Internal,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			ErrorKind::Syntax => "SyntaxError",
			ErrorKind::Ontology => "OntologyError",
			ErrorKind::Graph => "GraphError",
			ErrorKind::Resolution => "ResolutionError",
			ErrorKind::Execution => "ExecutionError",
			ErrorKind::Configuration => "ConfigurationError",
			ErrorKind::Internal => "InternalError",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub kind: ErrorKind,
	pub message: String,
	/// Step reference (`|3|`) the failure was raised for.
	pub step: Option<String>,
	/// Operation name of that step.
	pub operation: Option<String>,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
	pub fn new(code: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			kind,
			message: message.into(),
			step: None,
			operation: None,
			label: None,
			help: None,
			notes: vec![],
			cause: None,
		}
	}

	pub fn with_step(mut self, step: impl Into<String>) -> Self {
		self.step = Some(step.into());
		self
	}

	pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
		self.operation = Some(operation.into());
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help(mut self, help: impl Into<String>) -> Self {
		self.help = Some(help.into());
		self
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.notes.push(note.into());
		self
	}

	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}
}

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}
