use std::rc::Rc;

use log::debug;

use super::heap_config::HeapConfigPanel;
use super::highlight::{NeighborhoodHighlighter, Phase, Stage};
use super::scene::Scene;
use super::search::SearchIndex;
use super::store::GraphStore;
use super::types::State;

/// Quiescence window for coalescing rapid reselection, milliseconds.
pub const SELECTION_DEBOUNCE_MS: u32 = 100;

/// A selection change reported by the canvas or the search box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
	Selected(String),
	Deselected,
}

/// What the caller has to carry out after a selection was processed.
#[derive(Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
	/// Publish the detail panel and fetch the state's heap configuration.
	Selected { info: State, heap_request: String },
	/// The selection was removed; reset the dependent panels.
	Cleared,
	/// Stale selection of a node that is no longer there; leave
	/// everything as it stands.
	Ignored,
}

/// Owns the graph, the search index and the highlighter, and funnels all
/// selection events through one coalescing queue.
///
/// Events are submitted as they happen; each submission returns a token
/// and only the flush carrying the latest token does any work, so a burst
/// of reselections collapses to its final stable selection.
pub struct ViewController {
	store: Rc<GraphStore>,
	search: SearchIndex,
	highlighter: NeighborhoodHighlighter,
	focus_enabled: bool,
	pending: Option<SelectionEvent>,
	token: u64,
}

impl ViewController {
	pub fn new(store: Rc<GraphStore>) -> Self {
		let search = SearchIndex::new(store.clone());
		Self {
			store,
			search,
			highlighter: NeighborhoodHighlighter::new(),
			focus_enabled: false,
			pending: None,
			token: 0,
		}
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn search(&self) -> &SearchIndex {
		&self.search
	}

	pub fn highlighter(&self) -> &NeighborhoodHighlighter {
		&self.highlighter
	}

	pub fn highlighter_mut(&mut self) -> &mut NeighborhoodHighlighter {
		&mut self.highlighter
	}

	pub fn focus_enabled(&self) -> bool {
		self.focus_enabled
	}

	/// Flip the neighborhood-focus toggle. Turning it off while a session
	/// is active runs the animated restore.
	pub fn set_focus_enabled(&mut self, enabled: bool, stage: &mut dyn Stage) {
		self.focus_enabled = enabled;
		if !enabled
			&& matches!(
				self.highlighter.phase(),
				Phase::Isolating(_) | Phase::Isolated
			) {
			self.highlighter.clear(stage);
		}
	}

	/// Queue a selection event, replacing whatever was pending. Returns
	/// the token a quiescence timer must present to [`flush`](Self::flush).
	pub fn submit(&mut self, event: SelectionEvent) -> u64 {
		self.token += 1;
		self.pending = Some(event);
		self.token
	}

	/// Process the pending event if `token` is still the latest; stale
	/// tokens belong to superseded submissions and do nothing.
	pub fn flush(&mut self, token: u64, stage: &mut dyn Stage) -> Option<SelectionOutcome> {
		if token != self.token {
			return None;
		}
		let event = self.pending.take()?;
		Some(self.apply(event, stage))
	}

	fn apply(&mut self, event: SelectionEvent, stage: &mut dyn Stage) -> SelectionOutcome {
		match event {
			SelectionEvent::Selected(id) => {
				let Some(info) = self.store.get(&id).cloned() else {
					debug!("selection of unknown state {id} ignored");
					return SelectionOutcome::Ignored;
				};
				if self.focus_enabled {
					self.highlighter.highlight(&self.store, stage, &id);
				}
				SelectionOutcome::Selected {
					heap_request: info.id.clone(),
					info,
				}
			}
			SelectionEvent::Deselected => {
				self.highlighter.deselect_all(stage);
				SelectionOutcome::Cleared
			}
		}
	}
}

/// Everything one viewer page owns, constructed once per page load and
/// handed to the event handlers explicitly.
pub struct ViewerCore {
	pub controller: ViewController,
	pub scene: Scene,
	pub heap: HeapConfigPanel,
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::components::state_space::highlight::test_stage::FakeStage;
	use crate::components::state_space::types::{GraphDoc, Point};

	fn controller() -> ViewController {
		let doc: GraphDoc = serde_json::from_str(
			r#"{
				"elements": {
					"nodes": [
						{ "data": { "id": "s0", "type": "initial" } },
						{ "data": { "id": "s1", "type": "error" } }
					],
					"edges": [{ "data": { "source": "s0", "target": "s1" } }]
				}
			}"#,
		)
		.unwrap();
		ViewController::new(Rc::new(GraphStore::load(doc)))
	}

	fn stage() -> FakeStage {
		FakeStage::with_positions(HashMap::from([
			("s0".into(), Point { x: 0.0, y: 0.0 }),
			("s1".into(), Point { x: 0.0, y: 110.0 }),
		]))
	}

	#[test]
	fn a_burst_of_events_collapses_to_the_last_one() {
		let mut ctl = controller();
		let mut stage = stage();

		let stale = ctl.submit(SelectionEvent::Selected("s0".into()));
		let latest = ctl.submit(SelectionEvent::Selected("s1".into()));

		assert!(ctl.flush(stale, &mut stage).is_none());
		match ctl.flush(latest, &mut stage).unwrap() {
			SelectionOutcome::Selected { info, heap_request } => {
				assert_eq!(info.id, "s1");
				assert_eq!(heap_request, "s1");
			}
			other => panic!("unexpected outcome {other:?}"),
		}

		// nothing left pending
		assert!(ctl.flush(latest, &mut stage).is_none());
	}

	#[test]
	fn selection_highlights_only_when_focus_is_enabled() {
		let mut ctl = controller();
		let mut stage = stage();

		let token = ctl.submit(SelectionEvent::Selected("s1".into()));
		ctl.flush(token, &mut stage);
		assert_eq!(ctl.highlighter().phase(), Phase::Idle);

		ctl.set_focus_enabled(true, &mut stage);
		let token = ctl.submit(SelectionEvent::Selected("s1".into()));
		ctl.flush(token, &mut stage);
		assert!(matches!(ctl.highlighter().phase(), Phase::Isolating(_)));
	}

	#[test]
	fn deselection_resets_and_reports_no_info() {
		let mut ctl = controller();
		let mut stage = stage();
		ctl.set_focus_enabled(true, &mut stage);

		let token = ctl.submit(SelectionEvent::Selected("s1".into()));
		ctl.flush(token, &mut stage);

		let token = ctl.submit(SelectionEvent::Deselected);
		let outcome = ctl.flush(token, &mut stage).unwrap();
		assert_eq!(outcome, SelectionOutcome::Cleared);
		assert_eq!(ctl.highlighter().phase(), Phase::Idle);
		assert!(stage.is_clean());
		assert_eq!(stage.preset_layouts, 1);
	}

	#[test]
	fn unknown_selection_is_lenient() {
		let mut ctl = controller();
		let mut stage = stage();
		ctl.set_focus_enabled(true, &mut stage);

		let token = ctl.submit(SelectionEvent::Selected("gone".into()));
		let outcome = ctl.flush(token, &mut stage).unwrap();
		assert_eq!(outcome, SelectionOutcome::Ignored);
		assert_eq!(ctl.highlighter().phase(), Phase::Idle);
	}

	#[test]
	fn disabling_focus_mid_session_runs_the_restore() {
		let mut ctl = controller();
		let mut stage = stage();
		ctl.set_focus_enabled(true, &mut stage);

		let token = ctl.submit(SelectionEvent::Selected("s1".into()));
		ctl.flush(token, &mut stage);
		assert!(matches!(ctl.highlighter().phase(), Phase::Isolating(_)));

		ctl.set_focus_enabled(false, &mut stage);
		assert!(matches!(ctl.highlighter().phase(), Phase::Restoring(_)));
	}
}
