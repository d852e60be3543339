// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The parsed form of a plan: its steps, the dependency graph between them
//! and the subplans it decomposes into.

use indexmap::IndexMap;
use sqr_type::Result;

use crate::error::SqrError;

mod graph;
mod step;
mod subplan;

pub use graph::PlanGraph;
pub use step::{Argument, Literal, Step, StepRef};
pub use subplan::{Subplan, SubplanId};

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
	steps: IndexMap<StepRef, Step>,
	graph: PlanGraph,
	order: Vec<StepRef>,
	subplans: IndexMap<SubplanId, Subplan>,
	terminal: StepRef,
	outermost: SubplanId,
}

impl Plan {
	/// Builds the graph, orders it and decomposes it into subplans.
	pub fn new(steps: IndexMap<StepRef, Step>) -> Result<Self> {
		if steps.is_empty() {
			return Err(SqrError::EmptyPlan.into());
		}

		let graph = PlanGraph::build(&steps)?;
		let order = graph.topological_order()?;
		let terminal = terminal(&graph, &steps)?;
		let subplans = subplan::decompose(&graph, &steps, &terminal)?;
		let Some(outermost) = subplans.values().find(|s| s.root == terminal).map(|s| s.id) else {
			return sqr_type::internal_err!("no subplan is rooted at terminal {}", terminal);
		};

		Ok(Self {
			steps,
			graph,
			order,
			subplans,
			terminal,
			outermost,
		})
	}

	pub fn steps(&self) -> &IndexMap<StepRef, Step> {
		&self.steps
	}

	pub fn step(&self, reference: &StepRef) -> Option<&Step> {
		self.steps.get(reference)
	}

	pub fn graph(&self) -> &PlanGraph {
		&self.graph
	}

	pub fn topological_order(&self) -> &[StepRef] {
		&self.order
	}

	pub fn subplans(&self) -> &IndexMap<SubplanId, Subplan> {
		&self.subplans
	}

	pub fn subplan(&self, id: SubplanId) -> Option<&Subplan> {
		self.subplans.get(&id)
	}

	/// Subplans, other than `except`, that contain `step`.
	pub fn subplans_containing(&self, step: &StepRef, except: SubplanId) -> Vec<&Subplan> {
		self.subplans.values().filter(|s| s.id != except && s.contains(step)).collect()
	}

	pub fn terminal(&self) -> &StepRef {
		&self.terminal
	}

	/// The subplan rooted at the terminal return.
	pub fn outermost(&self) -> &Subplan {
		&self.subplans[&self.outermost]
	}

	/// Canonical step text keyed by reference, in plan order.
	pub fn to_json(&self) -> IndexMap<String, String> {
		self.steps.iter().map(|(reference, step)| (reference.to_string(), step.to_string())).collect()
	}
}

fn terminal(graph: &PlanGraph, steps: &IndexMap<StepRef, Step>) -> Result<StepRef> {
	let sinks = graph.sinks();
	let sink = match sinks.as_slice() {
		[] => return Err(SqrError::NoTerminal.into()),
		[sink] => *sink,
		many => {
			return Err(SqrError::MultipleTerminals {
				steps: many.iter().map(|s| s.to_string()).collect(),
			}
			.into());
		}
	};

	match steps.get(sink) {
		Some(step) if step.operation.is_return() => Ok(sink.clone()),
		Some(step) => Err(SqrError::TerminalNotReturn {
			step: sink.to_string(),
			operation: step.operation.name().to_string(),
		}
		.into()),
		None => sqr_type::internal_err!("sink {} is not a plan step", sink),
	}
}

#[cfg(test)]
mod tests {
	use crate::parse::{parse, parse_json};

	const NESTED: &str = r#"{
		"|1|": "(retrieve_entity Person)",
		"|2|": "(retrieve_attribute |1| name)",
		"|3|": "(exact |2| \"Ann \\\"Jr\\\" Lee\")",
		"|4|": "(collect |2|)",
		"|5|": "(return |4| |3|)"
	}"#;

	#[test]
	fn test_to_json_reparses_to_same_plan() {
		let plan = parse_json(NESTED).unwrap();
		let json = plan.to_json();
		assert_eq!(json["|3|"], r#"(exact |2| "Ann \"Jr\" Lee")"#);
		assert_eq!(parse(&json).unwrap(), plan);
	}

	#[test]
	fn test_terminal_and_order() {
		let plan = parse_json(NESTED).unwrap();
		assert_eq!(plan.terminal().to_string(), "|5|");
		let order: Vec<String> = plan.topological_order().iter().map(|s| s.to_string()).collect();
		assert_eq!(order, vec!["|1|", "|2|", "|3|", "|4|", "|5|"]);
	}

	#[test]
	fn test_empty_plan() {
		let err = parse_json("{}").unwrap_err();
		assert_eq!(err.code(), "GRAPH_001");
	}
}
