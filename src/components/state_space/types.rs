use std::collections::BTreeMap;

use serde::Deserialize;

/// A single configuration in the verification run's explored state space.
///
/// Identity is the `id` assigned by the run; ordering anywhere results are
/// sorted is plain lexicographic ordering on `id`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct State {
	pub id: String,
	/// Kind of program/automaton state, e.g. `initial`, `final`, `error`.
	/// Kept open-ended: the run's vocabulary is not fixed.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Program statement pending execution at this state, may be empty.
	#[serde(default)]
	pub statement: String,
	/// Atomic propositions holding at this state, in run order.
	#[serde(default)]
	pub propositions: Vec<String>,
}

/// A step relating two states, by endpoint identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Transition {
	pub source: String,
	pub target: String,
}

/// An on-screen position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct NodeEntry {
	data: State,
}

#[derive(Clone, Debug, Deserialize)]
struct EdgeEntry {
	data: Transition,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct GraphElements {
	#[serde(default)]
	nodes: Vec<NodeEntry>,
	#[serde(default)]
	edges: Vec<EdgeEntry>,
}

/// Graph document as exported by the verification run:
/// `{ elements: { nodes: [{ data }], edges: [{ data }] } }`.
///
/// Used both for the state space itself and for per-state heap
/// configurations, which share the shape.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphDoc {
	#[serde(default)]
	elements: GraphElements,
}

impl GraphDoc {
	/// Consume the document into its states and transitions.
	pub fn into_parts(self) -> (Vec<State>, Vec<Transition>) {
		(
			self.elements.nodes.into_iter().map(|n| n.data).collect(),
			self.elements.edges.into_iter().map(|e| e.data).collect(),
		)
	}

	pub fn node_count(&self) -> usize {
		self.elements.nodes.len()
	}
}

/// One verified LTL formula and its outcome.
#[derive(Clone, Debug, Deserialize)]
pub struct VerificationResult {
	#[serde(default)]
	pub formula: String,
	#[serde(default)]
	pub status: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VerificationEntry {
	pub result: VerificationResult,
}

/// Runtime of one analysis phase, in seconds.
#[derive(Clone, Debug, Deserialize)]
pub struct PhaseRuntime {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub time: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeEntry {
	pub phase: PhaseRuntime,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OverviewElements {
	#[serde(default)]
	pub verification: BTreeMap<String, VerificationEntry>,
	#[serde(default)]
	pub runtimes: BTreeMap<String, RuntimeEntry>,
	#[serde(rename = "verificationTime", default)]
	pub verification_time: f64,
	#[serde(rename = "totalTime", default)]
	pub total_time: f64,
}

/// Overview summary document rendered by the overview page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OverviewDoc {
	#[serde(default)]
	pub elements: OverviewElements,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_exported_graph_shape() {
		let doc: GraphDoc = serde_json::from_str(
			r#"{
				"elements": {
					"nodes": [
						{ "data": { "id": "s0", "type": "initial" } },
						{ "data": { "id": "s1", "type": "error", "statement": "x:=1", "propositions": ["p"] } }
					],
					"edges": [
						{ "data": { "source": "s0", "target": "s1" } }
					]
				}
			}"#,
		)
		.unwrap();

		assert_eq!(doc.node_count(), 2);
		let (states, transitions) = doc.into_parts();
		assert_eq!(states[0].id, "s0");
		assert_eq!(states[0].statement, "");
		assert!(states[0].propositions.is_empty());
		assert_eq!(states[1].kind, "error");
		assert_eq!(states[1].propositions, vec!["p".to_string()]);
		assert_eq!(transitions[0].source, "s0");
		assert_eq!(transitions[0].target, "s1");
	}

	#[test]
	fn parses_overview_shape() {
		let doc: OverviewDoc = serde_json::from_str(
			r#"{
				"elements": {
					"verification": {
						"0": { "result": { "formula": "G (x -> F y)", "status": "valid" } }
					},
					"runtimes": {
						"0": { "phase": { "name": "parsing", "time": 0.12 } }
					},
					"verificationTime": 1.5,
					"totalTime": 2.75
				}
			}"#,
		)
		.unwrap();

		assert_eq!(doc.elements.verification["0"].result.status, "valid");
		assert_eq!(doc.elements.runtimes["0"].phase.name, "parsing");
		assert_eq!(doc.elements.total_time, 2.75);
	}

	#[test]
	fn empty_document_parses_to_empty_graph() {
		let doc: GraphDoc = serde_json::from_str("{}").unwrap();
		assert_eq!(doc.node_count(), 0);
	}
}
