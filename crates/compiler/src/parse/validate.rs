// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexMap;
use sqr_type::{Result, Value};

use crate::{
	error::SqrError,
	field::SortDirection,
	ontology::Operation,
	plan::{Argument, Step, StepRef},
};

fn invalid(step: &Step, position: usize, message: impl Into<String>) -> sqr_type::Error {
	SqrError::InvalidArgument {
		step: step.reference.to_string(),
		operation: step.operation.name().to_string(),
		position,
		message: message.into(),
	}
	.into()
}

pub(crate) fn check_arity(step: &Step) -> Result<()> {
	let descriptor = step.operation.descriptor();
	let found = step.args.len();
	let too_few = found < descriptor.min_args();
	let too_many = descriptor.max_args().is_some_and(|max| found > max);
	if too_few || too_many {
		return Err(SqrError::ArityMismatch {
			step: step.reference.to_string(),
			operation: step.operation.name().to_string(),
			expected: descriptor.arity(),
			found,
		}
		.into());
	}
	Ok(())
}

/// Argument shapes that can be checked from the step alone.
pub(crate) fn check_shape(step: &Step) -> Result<()> {
	match step.operation {
		Operation::RetrieveEntity => {
			if step.args[0].as_literal().is_none() {
				return Err(invalid(step, 0, "expected an entity name"));
			}
		}
		Operation::RetrieveAttribute => {
			if step.args[0].as_reference().is_none() {
				return Err(invalid(step, 0, "expected a reference to an entity or return step"));
			}
		}
		Operation::Collect | Operation::Groupby | Operation::Return | Operation::RowNum => {
			references_only(step)?;
		}
		Operation::Sort => {
			if step.args.len() % 2 != 0 {
				return Err(invalid(step, step.args.len(), "expected (reference, asc|desc) pairs"));
			}
			for (position, arg) in step.args.iter().enumerate() {
				if position % 2 == 0 {
					if arg.as_reference().is_none() {
						return Err(invalid(step, position, "expected a reference to the sort key"));
					}
				} else if arg.as_literal().and_then(|l| l.text().parse::<SortDirection>().ok()).is_none() {
					return Err(invalid(step, position, format!("expected asc or desc, found '{}'", arg.text())));
				}
			}
		}
		Operation::Limit => {
			let valid = match step.args[0].as_literal().map(|l| l.to_value()) {
				Some(Value::Integer(n)) => n >= 0,
				_ => false,
			};
			if !valid {
				return Err(invalid(step, 0, "expected a non-negative integer"));
			}
		}
		_ => {}
	}
	Ok(())
}

fn references_only(step: &Step) -> Result<()> {
	match step.args.iter().position(|a| a.as_reference().is_none()) {
		Some(position) => Err(invalid(step, position, "expected a step reference")),
		None => Ok(()),
	}
}

/// Checks that need the referenced steps. References to missing steps are
/// left for graph construction to report.
pub(crate) fn check_references(steps: &IndexMap<StepRef, Step>) -> Result<()> {
	for step in steps.values() {
		let expected = match step.operation {
			Operation::Return => Operation::Collect,
			Operation::RowNum => Operation::Sort,
			_ => continue,
		};

		let Some(Argument::Reference(target)) = step.arg(0) else {
			continue;
		};
		if let Some(found) = steps.get(target) {
			if found.operation != expected {
				return Err(invalid(
					step,
					0,
					format!("expected a {} step, {} is a {}", expected, target, found.operation),
				));
			}
		}
	}
	Ok(())
}
