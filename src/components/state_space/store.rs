use std::collections::{BTreeSet, HashMap};

use super::types::{GraphDoc, State, Transition};

/// A subset of the graph's elements: node identifiers plus transition
/// indices into the store's transition list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementSet {
	pub nodes: BTreeSet<String>,
	pub edges: BTreeSet<usize>,
}

impl ElementSet {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.contains(id)
	}
}

/// Owns the loaded state-transition graph and answers read queries over it.
///
/// The graph is immutable after load; selection and highlighting only ever
/// touch display state, which lives in the scene, not here.
pub struct GraphStore {
	states: Vec<State>,
	by_id: HashMap<String, usize>,
	transitions: Vec<Transition>,
}

impl GraphStore {
	/// Build the store from a graph document. Input is trusted: edge
	/// endpoints are assumed to exist among the loaded states.
	pub fn load(doc: GraphDoc) -> Self {
		let (states, transitions) = doc.into_parts();
		let by_id = states
			.iter()
			.enumerate()
			.map(|(i, s)| (s.id.clone(), i))
			.collect();
		Self {
			states,
			by_id,
			transitions,
		}
	}

	pub fn get(&self, id: &str) -> Option<&State> {
		self.by_id.get(id).map(|&i| &self.states[i])
	}

	/// All states, in insertion order.
	pub fn all_nodes(&self) -> &[State] {
		&self.states
	}

	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	pub fn node_count(&self) -> usize {
		self.states.len()
	}

	/// The focal node plus every node one incident edge away, plus those
	/// edges. An unknown identifier yields the empty set.
	pub fn closed_neighborhood(&self, id: &str) -> ElementSet {
		let mut set = ElementSet::default();
		if !self.by_id.contains_key(id) {
			return set;
		}
		set.nodes.insert(id.to_string());
		for (i, t) in self.transitions.iter().enumerate() {
			if t.source == id {
				set.nodes.insert(t.target.clone());
				set.edges.insert(i);
			} else if t.target == id {
				set.nodes.insert(t.source.clone());
				set.edges.insert(i);
			}
		}
		set
	}

	/// Every element of the graph not in the given set.
	pub fn complement(&self, set: &ElementSet) -> ElementSet {
		ElementSet {
			nodes: self
				.states
				.iter()
				.filter(|s| !set.nodes.contains(&s.id))
				.map(|s| s.id.clone())
				.collect(),
			edges: (0..self.transitions.len())
				.filter(|i| !set.edges.contains(i))
				.collect(),
		}
	}

	/// The full element set of the graph.
	pub fn full_set(&self) -> ElementSet {
		ElementSet {
			nodes: self.states.iter().map(|s| s.id.clone()).collect(),
			edges: (0..self.transitions.len()).collect(),
		}
	}
}
