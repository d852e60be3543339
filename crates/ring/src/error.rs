// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqr_type::{Diagnostic, Error, ErrorKind, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RingError {
	#[error("unknown entity '{name}'")]
	UnknownEntity {
		name: String,
	},

	#[error("entity '{entity}' has no attribute '{attribute}'")]
	UnknownAttribute {
		entity: String,
		attribute: String,
	},

	#[error("unknown join '{name}'")]
	UnknownJoin {
		name: String,
	},

	#[error("unknown table '{table}'")]
	UnknownTable {
		table: String,
	},

	#[error("no relationship path between '{from}' and '{to}'")]
	NoJoinPath {
		from: String,
		to: String,
	},

	#[error("ring '{ring}' is invalid")]
	InvalidConfig {
		ring: String,
		problems: Vec<String>,
	},

	#[error("cannot read ring from '{path}': {reason}")]
	Io {
		path: String,
		reason: String,
	},
}

impl IntoDiagnostic for RingError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			RingError::UnknownEntity {
				..
			} => Diagnostic::new("RING_001", ErrorKind::Resolution, message)
				.with_label("entity is not part of the ring")
				.with_help("check the entity name in the retrieve_entity step"),
			RingError::UnknownAttribute {
				entity,
				..
			} => Diagnostic::new("RING_002", ErrorKind::Resolution, message)
				.with_label("attribute is not declared on the entity")
				.with_help(format!("declare the attribute on '{}' or fix its name in the plan", entity)),
			RingError::UnknownJoin {
				..
			} => Diagnostic::new("RING_003", ErrorKind::Resolution, message)
				.with_label("join is not declared in the data source"),
			RingError::UnknownTable {
				..
			} => Diagnostic::new("RING_004", ErrorKind::Resolution, message)
				.with_label("table is not declared in the data source"),
			RingError::NoJoinPath {
				..
			} => Diagnostic::new("RING_005", ErrorKind::Resolution, message)
				.with_label("entities are not connected by any relationship")
				.with_help("declare a relationship connecting the two entities"),
			RingError::InvalidConfig {
				problems,
				..
			} => {
				let mut diagnostic = Diagnostic::new("RING_006", ErrorKind::Configuration, message)
					.with_label(format!("{} problem(s) found", problems.len()));
				for problem in problems {
					diagnostic = diagnostic.with_note(problem);
				}
				diagnostic
			}
			RingError::Io {
				..
			} => Diagnostic::new("RING_007", ErrorKind::Configuration, message),
		}
	}
}

impl From<RingError> for Error {
	fn from(err: RingError) -> Self {
		Error(err.into_diagnostic())
	}
}
