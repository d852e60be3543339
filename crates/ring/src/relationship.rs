// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
	pub name: String,
	pub from: String,
	pub to: String,
	/// Joins in traversal order from `from` to `to`.
	pub joins: Vec<String>,
	pub relation: Option<String>,
	pub bidirectional: bool,
	pub derived: bool,
}

/// Undirected graph over entity names, one edge per relationship.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
	adjacency: IndexMap<String, Vec<(String, usize)>>,
}

impl RelationshipGraph {
	pub fn new(relationships: &[Relationship]) -> Self {
		let mut graph = Self::default();
		for (index, relationship) in relationships.iter().enumerate() {
			graph.connect(&relationship.from, &relationship.to, index);
			graph.connect(&relationship.to, &relationship.from, index);
		}
		graph
	}

	// A later relationship between the same pair replaces the earlier edge.
	fn connect(&mut self, a: &str, b: &str, index: usize) {
		let neighbours = self.adjacency.entry(a.to_string()).or_default();
		match neighbours.iter_mut().find(|(n, _)| n == b) {
			Some(edge) => edge.1 = index,
			None => neighbours.push((b.to_string(), index)),
		}
	}

	/// Relationship indices along a shortest path, found breadth-first in
	/// declaration order. `Some(vec![])` when `a == b`.
	pub fn path(&self, a: &str, b: &str) -> Option<Vec<usize>> {
		if a == b {
			return Some(vec![]);
		}

		let mut previous: HashMap<&str, (&str, usize)> = HashMap::new();
		let mut queue = VecDeque::from([a]);
		let mut visited = vec![a];

		while let Some(node) = queue.pop_front() {
			let Some(neighbours) = self.adjacency.get(node) else {
				continue;
			};
			for (neighbour, index) in neighbours {
				let neighbour = neighbour.as_str();
				if visited.contains(&neighbour) {
					continue;
				}
				visited.push(neighbour);
				previous.insert(neighbour, (node, *index));
				if neighbour == b {
					let mut path = vec![];
					let mut current = b;
					while let Some((parent, index)) = previous.get(current) {
						path.push(*index);
						current = *parent;
					}
					path.reverse();
					return Some(path);
				}
				queue.push_back(neighbour);
			}
		}
		None
	}
}
