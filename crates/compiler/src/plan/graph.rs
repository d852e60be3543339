// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use sqr_type::Result;

use crate::{
	error::SqrError,
	plan::{Step, StepRef},
};

/// Dependency graph of a plan. An edge runs from a step to every step that
/// consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanGraph {
	nodes: Vec<StepRef>,
	parents: HashMap<StepRef, Vec<StepRef>>,
	children: HashMap<StepRef, Vec<StepRef>>,
}

impl PlanGraph {
	pub fn build(steps: &IndexMap<StepRef, Step>) -> Result<Self> {
		let mut parents: HashMap<StepRef, Vec<StepRef>> = HashMap::new();
		let mut children: HashMap<StepRef, Vec<StepRef>> = HashMap::new();

		for step in steps.values() {
			for parent in step.structural_parents() {
				if !steps.contains_key(parent) {
					return Err(SqrError::UndefinedReference {
						step: step.reference.to_string(),
						operation: step.operation.name().to_string(),
						reference: parent.to_string(),
					}
					.into());
				}

				let step_parents = parents.entry(step.reference.clone()).or_default();
				if !step_parents.contains(parent) {
					step_parents.push(parent.clone());
					children.entry(parent.clone()).or_default().push(step.reference.clone());
				}
			}
		}

		Ok(Self {
			nodes: steps.keys().cloned().collect(),
			parents,
			children,
		})
	}

	pub fn nodes(&self) -> &[StepRef] {
		&self.nodes
	}

	/// Steps this step reads from, in argument order.
	pub fn parents(&self, step: &StepRef) -> &[StepRef] {
		self.parents.get(step).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn children(&self, step: &StepRef) -> &[StepRef] {
		self.children.get(step).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn edges(&self) -> impl Iterator<Item = (&StepRef, &StepRef)> {
		self.nodes.iter().flat_map(move |child| self.parents(child).iter().map(move |parent| (parent, child)))
	}

	/// Steps nothing else consumes.
	pub fn sinks(&self) -> Vec<&StepRef> {
		self.nodes.iter().filter(|n| self.children(n).is_empty()).collect()
	}

	/// Kahn's algorithm, seeded and expanded in plan order.
	pub fn topological_order(&self) -> Result<Vec<StepRef>> {
		let mut in_degree: HashMap<&StepRef, usize> =
			self.nodes.iter().map(|n| (n, self.parents(n).len())).collect();

		let mut queue: VecDeque<&StepRef> = self.nodes.iter().filter(|n| in_degree[n] == 0).collect();
		let mut order = Vec::with_capacity(self.nodes.len());

		while let Some(node) = queue.pop_front() {
			order.push(node.clone());
			for child in self.children(node) {
				if let Some(degree) = in_degree.get_mut(child) {
					*degree -= 1;
					if *degree == 0 {
						queue.push_back(child);
					}
				}
			}
		}

		if order.len() != self.nodes.len() {
			let steps = self
				.nodes
				.iter()
				.filter(|n| !order.contains(n))
				.map(|n| n.to_string())
				.collect();
			return Err(SqrError::Cycle {
				steps,
			}
			.into());
		}

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use sqr_type::ErrorKind;

	use super::*;
	use crate::parse::parse_steps;

	fn graph(raw: &[(&str, &str)]) -> Result<PlanGraph> {
		let steps = parse_steps(raw.iter().map(|(k, v)| (k.to_string(), v.to_string())))?;
		PlanGraph::build(&steps)
	}

	#[test]
	fn test_edges_follow_reference_arguments() {
		let g = graph(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(collect |2|)"),
			("|4|", "(return |3|)"),
		])
		.unwrap();

		let edges: Vec<String> = g.edges().map(|(p, c)| format!("{}->{}", p, c)).collect();
		assert_eq!(edges, vec!["|1|->|2|", "|2|->|3|", "|3|->|4|"]);
		assert_eq!(g.sinks().iter().map(|s| s.to_string()).collect::<Vec<_>>(), vec!["|4|"]);
	}

	#[test]
	fn test_topological_order_is_deterministic() {
		let g = graph(&[
			("|4|", "(add |2| |3|)"),
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(retrieve_attribute |1| height)"),
		])
		.unwrap();
		let order: Vec<String> = g.topological_order().unwrap().iter().map(|s| s.to_string()).collect();
		assert_eq!(order, vec!["|1|", "|2|", "|3|", "|4|"]);
	}

	#[test]
	fn test_duplicate_reference_makes_one_edge() {
		let g = graph(&[
			("|1|", "(retrieve_entity Person)"),
			("|2|", "(retrieve_attribute |1| age)"),
			("|3|", "(add |2| |2|)"),
		])
		.unwrap();
		assert_eq!(g.parents(&StepRef::parse("|3|").unwrap()).len(), 1);
		assert_eq!(g.topological_order().unwrap().len(), 3);
	}

	#[test]
	fn test_cycle_is_graph_error() {
		let err = graph(&[("|1|", "(add |2| 1)"), ("|2|", "(add |1| 1)")])
			.and_then(|g| g.topological_order())
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Graph);
		assert_eq!(err.code(), "GRAPH_005");
	}

	#[test]
	fn test_undefined_reference_is_resolution_error() {
		let err = graph(&[("|1|", "(retrieve_entity Person)"), ("|2|", "(retrieve_attribute |9| age)")])
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Resolution);
		assert_eq!(err.step.as_deref(), Some("|2|"));
	}
}
