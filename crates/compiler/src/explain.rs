// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Human readable dumps of a plan and of what it compiles to.

use std::fmt::Write;

use crate::{
	builder::SubplanArguments,
	engine::Compiled,
	ontology::Operation,
	plan::{Argument, Plan, Step},
	sql::Statement,
};

/// Steps grouped by subplan, each followed by a description of what it computes.
pub fn explain_plan(plan: &Plan) -> String {
	let mut out = String::new();
	for subplan in plan.subplans().values() {
		let _ = writeln!(out, "{} (return {})", subplan.id, subplan.root);
		for reference in plan.topological_order().iter().filter(|r| subplan.contains(*r)) {
			if let Some(step) = plan.step(reference) {
				let _ = writeln!(out, "  {} {}", reference, step);
				let _ = writeln!(out, "      -- {}", describe_step(plan, step));
			}
		}
	}
	out
}

pub fn explain_arguments(arguments: &[SubplanArguments]) -> String {
	let mut out = String::new();
	for args in arguments {
		let _ = writeln!(out, "{}", args.id);
		let sources: Vec<String> = args.sources.iter().map(|s| s.to_string()).collect();
		let _ = writeln!(out, "  sources:  {}", sources.join(", "));
		let _ = writeln!(out, "  select:   {}", args.select.join(", "));
		if !args.group_by.is_empty() {
			let _ = writeln!(out, "  group by: {}", args.group_by.join(", "));
		}
		if let Some(filter) = &args.filter {
			let _ = writeln!(out, "  filter:   {}", filter);
		}
		if let Some(having) = &args.having {
			let _ = writeln!(out, "  having:   {}", having);
		}
		if !args.sort.is_empty() {
			let keys: Vec<String> = args.sort.iter().map(|k| format!("{} {}", k.column, k.direction)).collect();
			let _ = writeln!(out, "  sort:     {}", keys.join(", "));
		}
		if let Some(limit) = args.limit {
			let _ = writeln!(out, "  limit:    {}", limit);
		}
		if !args.joins.is_empty() {
			let joins: Vec<&str> = args.joins.iter().map(String::as_str).collect();
			let _ = writeln!(out, "  joins:    {}", joins.join(", "));
		}
	}
	out
}

pub fn explain_statement(statement: &Statement) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", statement.sql);
	for (index, param) in statement.params.iter().enumerate() {
		let _ = writeln!(out, "  ${} = {}", index + 1, param);
	}
	out
}

pub fn explain(compiled: &Compiled) -> String {
	format!(
		"-- plan\n{}\n-- subplans\n{}\n-- {} statement\n{}",
		explain_plan(&compiled.plan),
		explain_arguments(&compiled.arguments),
		compiled.dialect,
		explain_statement(&compiled.statement)
	)
}

/// Describes a step by filling its operation's template with descriptions
/// of its arguments.
pub fn describe_step(plan: &Plan, step: &Step) -> String {
	let describe = |arg: &Argument| describe_argument(plan, arg);
	let op = step.operation;

	match op {
		Operation::Sort => {
			let keys: Vec<String> = step
				.args
				.chunks(2)
				.map(|pair| match pair {
					[key, direction] => format!("{} ({})", describe(key), direction.text().to_ascii_lowercase()),
					_ => pair.iter().map(describe).collect::<Vec<_>>().join(" "),
				})
				.collect();
			return fill(op.descriptor().template, &[keys.join(", ")]);
		}
		Operation::Return => {
			let parts: Vec<String> = step.args.iter().map(describe).collect();
			return parts.join("; ");
		}
		_ => {}
	}

	let template = op.descriptor().template;
	if op.is_analysis() {
		let (grouping, values): (Vec<&Argument>, Vec<&Argument>) = step.args.iter().partition(|arg| {
			arg.as_reference().and_then(|r| plan.step(r)).is_some_and(|s| s.operation.is_aggregation())
		});
		let target = values.first().map(|a| describe(*a)).unwrap_or_default();
		let mut described = fill(&template.replace("{target}", &target), &values.iter().map(|a| describe(*a)).collect::<Vec<_>>());
		for group in grouping {
			described.push(' ');
			described.push_str(&describe(group));
		}
		return described;
	}

	let args: Vec<String> = step.args.iter().map(describe).collect();
	let variadic = op.descriptor().max_args().is_none();
	if variadic {
		return match template.split_once("{0}").map(|(head, tail)| (head, tail.split_once("{1}"))) {
			Some((head, Some((connector, tail)))) => format!("{}{}{}", head, args.join(connector), tail),
			_ => fill(template, &[args.join(", ")]),
		};
	}
	fill(template, &args)
}

fn describe_argument(plan: &Plan, arg: &Argument) -> String {
	match arg {
		Argument::Literal(literal) => literal.text().to_string(),
		Argument::Reference(reference) => match plan.step(reference) {
			Some(step) => match step.operation {
				Operation::Return | Operation::Collect => {
					step.args.first().map(|a| describe_argument(plan, a)).unwrap_or_default()
				}
				_ => describe_step(plan, step),
			},
			None => reference.to_string(),
		},
	}
}

fn fill(template: &str, args: &[String]) -> String {
	let mut out = template.to_string();
	for (index, arg) in args.iter().enumerate() {
		out = out.replace(&format!("{{{}}}", index), arg);
	}
	out
}
