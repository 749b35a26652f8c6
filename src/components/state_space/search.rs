use std::rc::Rc;

use super::store::GraphStore;
use super::types::State;

/// Free-text search over the store's node attributes.
///
/// The index is a projection, never a copy: every query walks the store's
/// nodes afresh, so it can never drift from the loaded graph.
pub struct SearchIndex {
	store: Rc<GraphStore>,
}

impl SearchIndex {
	pub fn new(store: Rc<GraphStore>) -> Self {
		Self { store }
	}

	/// All states matching `text` case-insensitively in at least one of
	/// type, id, statement or propositions, ascending by `id`.
	///
	/// The empty query matches every node.
	pub fn query(&self, text: &str) -> Vec<State> {
		let needle = text.to_lowercase();
		let mut hits: Vec<State> = self
			.store
			.all_nodes()
			.iter()
			.filter(|s| any_field_matches(s, &needle))
			.cloned()
			.collect();
		hits.sort_by(|a, b| a.id.cmp(&b.id));
		hits
	}

	/// The concrete state behind a picked suggestion, if it still exists.
	pub fn resolve(&self, id: &str) -> Option<State> {
		self.store.get(id).cloned()
	}
}

fn any_field_matches(state: &State, needle: &str) -> bool {
	state.kind.to_lowercase().contains(needle)
		|| state.id.to_lowercase().contains(needle)
		|| state.statement.to_lowercase().contains(needle)
		|| state
			.propositions
			.join(" ")
			.to_lowercase()
			.contains(needle)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::state_space::types::GraphDoc;

	fn index() -> SearchIndex {
		let doc: GraphDoc = serde_json::from_str(
			r#"{
				"elements": {
					"nodes": [
						{ "data": { "id": "s2", "type": "final", "statement": "return x" } },
						{ "data": { "id": "s0", "type": "initial" } },
						{ "data": { "id": "s1", "type": "error", "statement": "x:=1", "propositions": ["deadlock"] } }
					],
					"edges": []
				}
			}"#,
		)
		.unwrap();
		SearchIndex::new(Rc::new(GraphStore::load(doc)))
	}

	#[test]
	fn results_are_sorted_by_id_and_each_matches() {
		let index = index();
		let hits = index.query("S");
		let ids: Vec<_> = hits.iter().map(|s| s.id.as_str()).collect();
		assert_eq!(ids, ["s0", "s1", "s2"]);
	}

	#[test]
	fn matches_any_of_the_fixed_fields() {
		let index = index();
		assert_eq!(index.query("ERROR")[0].id, "s1");
		assert_eq!(index.query("return")[0].id, "s2");
		assert_eq!(index.query("deadlock")[0].id, "s1");
		assert!(index.query("no such thing").is_empty());
	}

	#[test]
	fn empty_query_returns_every_node() {
		let index = index();
		assert_eq!(index.query("").len(), 3);
	}

	#[test]
	fn resolve_is_lenient_about_unknown_ids() {
		let index = index();
		assert_eq!(index.resolve("s1").unwrap().kind, "error");
		assert!(index.resolve("s9").is_none());
	}
}
