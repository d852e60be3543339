// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use crate::error::diagnostic::Diagnostic;

pub trait DiagnosticRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String;
}

pub struct DefaultRenderer;

impl DiagnosticRenderer for DefaultRenderer {
	fn render(&self, d: &Diagnostic) -> String {
		let mut output = String::new();
		render_into(&mut output, d, 0);
		output
	}
}

fn render_into(output: &mut String, d: &Diagnostic, depth: usize) {
	let indent = "  ".repeat(depth);

	let _ = writeln!(output, "{}error[{}]: {}", indent, d.code, d.message);

	match (&d.step, &d.operation) {
		(Some(step), Some(operation)) => {
			let _ = writeln!(output, "{}  --> step {} ({})", indent, step, operation);
		}
		(Some(step), None) => {
			let _ = writeln!(output, "{}  --> step {}", indent, step);
		}
		(None, Some(operation)) => {
			let _ = writeln!(output, "{}  --> operation {}", indent, operation);
		}
		(None, None) => {}
	}

	if let Some(label) = &d.label {
		let _ = writeln!(output, "{}   = {}", indent, label);
	}

	if let Some(help) = &d.help {
		let _ = writeln!(output, "\n{}help: {}", indent, help);
	}

	for note in &d.notes {
		let _ = writeln!(output, "\n{}note: {}", indent, note);
	}

	if let Some(cause) = &d.cause {
		let _ = writeln!(output, "\n{}caused by:", indent);
		render_into(output, cause, depth + 1);
	}
}

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		DefaultRenderer.render(diagnostic)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::diagnostic::ErrorKind;

	#[test]
	fn test_render_step_and_operation() {
		let d = Diagnostic::new("ONTOLOGY_001", ErrorKind::Ontology, "unknown operation 'frobnicate'")
			.with_step("|3|")
			.with_operation("frobnicate")
			.with_help("use one of the registered operations");

		let out = DefaultRenderer::render_string(&d);
		assert_eq!(
			out,
			"error[ONTOLOGY_001]: unknown operation 'frobnicate'\n  --> step |3| (frobnicate)\n\nhelp: use one of the registered operations\n"
		);
	}

	#[test]
	fn test_render_nested_cause() {
		let cause = Diagnostic::new("EXECUTE_001", ErrorKind::Execution, "no such table: person");
		let d = Diagnostic::new("EXECUTE_002", ErrorKind::Execution, "query failed").with_cause(cause);

		let out = DefaultRenderer::render_string(&d);
		assert!(out.contains("caused by:\n  error[EXECUTE_001]: no such table: person"));
	}
}
