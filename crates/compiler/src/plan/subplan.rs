// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeSet, HashSet},
	fmt::{Display, Formatter},
};

use indexmap::IndexMap;
use sqr_type::Result;
use tracing::{debug, instrument};

use crate::{
	error::SqrError,
	plan::{PlanGraph, Step, StepRef},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubplanId(pub usize);

impl Display for SubplanId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "alias_{}", self.0)
	}
}

/// The steps compiled into one SELECT, rooted at a `return`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subplan {
	pub id: SubplanId,
	pub root: StepRef,
	pub steps: BTreeSet<StepRef>,
}

impl Subplan {
	pub fn contains(&self, step: &StepRef) -> bool {
		self.steps.contains(step)
	}
}

/// Splits the plan into subplans at every `return`, innermost first.
#[instrument(name = "plan::decompose", level = "debug", skip_all, fields(terminal = %terminal))]
pub(crate) fn decompose(
	graph: &PlanGraph,
	steps: &IndexMap<StepRef, Step>,
	terminal: &StepRef,
) -> Result<IndexMap<SubplanId, Subplan>> {
	let mut walker = Walker {
		graph,
		steps,
		discovered: Vec::new(),
	};
	walker.walk(terminal);

	let mut subplans: IndexMap<SubplanId, Subplan> = IndexMap::new();
	for subplan in walker.discovered {
		if subplans.values().any(|existing| existing.steps == subplan.steps) {
			continue;
		}
		debug!(subplan = %subplan.id, root = %subplan.root, steps = subplan.steps.len(), "discovered subplan");
		subplans.insert(subplan.id, subplan);
	}

	check_partition(steps, &subplans)?;
	Ok(subplans)
}

struct Walker<'a> {
	graph: &'a PlanGraph,
	steps: &'a IndexMap<StepRef, Step>,
	discovered: Vec<Subplan>,
}

impl Walker<'_> {
	fn walk(&mut self, root: &StepRef) {
		let mut members = BTreeSet::from([root.clone()]);
		let mut explored = HashSet::from([root.clone()]);
		let mut stack: Vec<StepRef> = self.graph.parents(root).to_vec();

		while let Some(current) = stack.pop() {
			if !explored.insert(current.clone()) {
				continue;
			}

			let is_return = self.steps.get(&current).is_some_and(|s| s.operation.is_return());
			if is_return {
				self.walk(&current);
				continue;
			}

			members.insert(current.clone());
			stack.extend(self.graph.parents(&current).iter().cloned());
		}

		let id = SubplanId(self.discovered.len());
		self.discovered.push(Subplan {
			id,
			root: root.clone(),
			steps: members,
		});
	}
}

fn check_partition(steps: &IndexMap<StepRef, Step>, subplans: &IndexMap<SubplanId, Subplan>) -> Result<()> {
	for (reference, step) in steps {
		let owners: Vec<&Subplan> = subplans.values().filter(|s| s.contains(reference)).collect();

		if owners.is_empty() {
			return Err(SqrError::UnplacedStep {
				step: reference.to_string(),
			}
			.into());
		}

		if owners.len() > 1 && !step.operation.is_return() {
			return Err(SqrError::SharedStep {
				step: reference.to_string(),
				subplans: owners.iter().map(|s| s.id.to_string()).collect(),
			}
			.into());
		}
	}
	Ok(())
}
