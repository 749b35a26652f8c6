use std::collections::HashMap;

use log::debug;

use super::store::{ElementSet, GraphStore};
use super::types::Point;

/// Duration of each animated phase, milliseconds.
pub const ANIM_DURATION_MS: u32 = 500;
/// Camera padding around an isolated neighborhood.
pub const LAYOUT_PADDING: f64 = 150.0;
/// Short pause between the unmark and reveal steps of a restore.
pub const CLEAR_STEP_MS: u32 = 125;

/// Semantic operations the highlighter needs from the rendering layer.
///
/// Every operation is idempotent on display state; overlapping sessions
/// rely on that instead of on cancelling in-flight animations.
pub trait Stage {
	/// Current on-screen positions of the given nodes.
	fn node_positions(&self, set: &ElementSet) -> HashMap<String, Point>;
	/// Put nodes back where they were, without animation.
	fn restore_positions(&mut self, positions: &HashMap<String, Point>);
	fn hide(&mut self, set: &ElementSet);
	/// Strip hidden and faded styling from every element.
	fn reveal_all(&mut self);
	/// Strip highlighted and faded styling from every element.
	fn clear_marks(&mut self);
	fn mark_highlighted(&mut self, set: &ElementSet);
	fn unmark(&mut self, set: &ElementSet);
	/// Animated layered re-layout of the visible nodes in the set.
	fn run_neighborhood_layout(&mut self, set: &ElementSet);
	/// Snap every node back to the preset baseline, no animation.
	fn run_preset_layout(&mut self);
	/// Animate the camera to frame the visible subset of the set.
	fn fit(&mut self, set: &ElementSet, padding: f64);
	/// Animate the camera to a neutral framing of the whole graph.
	fn fit_all(&mut self, padding: f64);
}

/// Which isolation step is currently settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IsolateStep {
	/// Neutral camera fit issued because the previous session left the
	/// camera dirty.
	Reset,
	Layout,
	Fit,
}

/// Which restore step is currently settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreStep {
	Unmark,
	Reveal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Isolating(IsolateStep),
	Isolated,
	Restoring(RestoreStep),
}

/// Claim ticket for advancing the sequence once the current phase has had
/// its settle delay. A ticket is only honored while both its epoch and its
/// phase still match, so duplicate or stale timers can never double-step
/// the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleTicket {
	pub epoch: u64,
	pub phase: Phase,
	pub delay_ms: u32,
}

/// One neighborhood-isolation session.
#[derive(Clone, Debug)]
pub struct Session {
	pub focal: String,
	pub neighborhood: ElementSet,
	pub complement: ElementSet,
	/// Positions of the neighborhood nodes immediately before the
	/// session's re-layout, restored when the session ends.
	saved_positions: HashMap<String, Point>,
}

/// Drives the isolate/restore animation sequence for one focal node at a
/// time.
///
/// Phase settling is external: the caller schedules a delay after each
/// transition and then calls [`on_settled`](Self::on_settled) with the
/// [`SettleTicket`] it captured. Every `highlight`, `clear` and
/// `deselect_all` bumps the epoch, so settle callbacks belonging to an
/// overwritten session are simply ignored; most recent wins, nothing is
/// cancelled.
pub struct NeighborhoodHighlighter {
	phase: Phase,
	session: Option<Session>,
	dirty: bool,
	epoch: u64,
}

impl Default for NeighborhoodHighlighter {
	fn default() -> Self {
		Self::new()
	}
}

impl NeighborhoodHighlighter {
	pub fn new() -> Self {
		Self {
			phase: Phase::Idle,
			session: None,
			dirty: false,
			epoch: 0,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn session(&self) -> Option<&Session> {
		self.session.as_ref()
	}

	/// Whether the camera framing differs from the graph's preset framing.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// The ticket for the phase currently in flight, if any.
	pub fn settle_ticket(&self) -> Option<SettleTicket> {
		let delay_ms = match self.phase {
			Phase::Isolating(_) => ANIM_DURATION_MS,
			Phase::Restoring(RestoreStep::Unmark) => 2 * CLEAR_STEP_MS,
			Phase::Restoring(RestoreStep::Reveal) => ANIM_DURATION_MS,
			Phase::Idle | Phase::Isolated => return None,
		};
		Some(SettleTicket {
			epoch: self.epoch,
			phase: self.phase,
			delay_ms,
		})
	}

	/// Begin isolating `focal`'s closed neighborhood. Replaces any active
	/// session, tearing its visual side effects down first. An unknown
	/// focal leaves the prior state untouched.
	pub fn highlight(&mut self, store: &GraphStore, stage: &mut dyn Stage, focal: &str) {
		let neighborhood = store.closed_neighborhood(focal);
		if neighborhood.is_empty() {
			return;
		}
		self.epoch += 1;
		debug!("isolating neighborhood of {focal}");

		// A replaced session never gets its own restore; put its nodes
		// back now so the baseline stays intact.
		if let Some(prev) = self.session.take() {
			stage.restore_positions(&prev.saved_positions);
		}

		let complement = store.complement(&neighborhood);
		let saved_positions = stage.node_positions(&neighborhood);

		stage.reveal_all();
		stage.clear_marks();
		stage.hide(&complement);
		stage.mark_highlighted(&neighborhood);

		self.session = Some(Session {
			focal: focal.to_string(),
			neighborhood: neighborhood.clone(),
			complement,
			saved_positions,
		});

		if self.dirty {
			stage.fit_all(LAYOUT_PADDING);
			self.phase = Phase::Isolating(IsolateStep::Reset);
		} else {
			stage.run_neighborhood_layout(&neighborhood);
			self.phase = Phase::Isolating(IsolateStep::Layout);
		}
	}

	/// Animated restore of the full graph. No-op unless a session is
	/// active.
	pub fn clear(&mut self, stage: &mut dyn Stage) {
		if !matches!(self.phase, Phase::Isolating(_) | Phase::Isolated) {
			return;
		}
		let Some(session) = self.session.as_ref() else {
			return;
		};
		let neighborhood = session.neighborhood.clone();
		self.epoch += 1;
		stage.unmark(&neighborhood);
		self.phase = Phase::Restoring(RestoreStep::Unmark);
	}

	/// Snap straight back to the full graph, bypassing animation. Safe
	/// from any phase; used when the selection is removed entirely.
	pub fn deselect_all(&mut self, stage: &mut dyn Stage) {
		self.epoch += 1;
		stage.reveal_all();
		stage.clear_marks();
		if let Some(session) = self.session.take() {
			stage.restore_positions(&session.saved_positions);
		}
		stage.run_preset_layout();
		self.dirty = false;
		self.phase = Phase::Idle;
	}

	/// Advance the sequence after the current phase's settle delay. A
	/// ticket whose epoch or phase no longer matches belongs to an
	/// overwritten or already-advanced phase and is ignored.
	pub fn on_settled(&mut self, ticket: SettleTicket, stage: &mut dyn Stage) {
		if ticket.epoch != self.epoch || ticket.phase != self.phase {
			return;
		}
		match self.phase {
			Phase::Isolating(IsolateStep::Reset) => {
				if let Some(session) = &self.session {
					stage.run_neighborhood_layout(&session.neighborhood);
				}
				self.phase = Phase::Isolating(IsolateStep::Layout);
			}
			Phase::Isolating(IsolateStep::Layout) => {
				if let Some(session) = &self.session {
					stage.fit(&session.neighborhood, LAYOUT_PADDING);
				}
				self.dirty = true;
				self.phase = Phase::Isolating(IsolateStep::Fit);
			}
			Phase::Isolating(IsolateStep::Fit) => {
				self.phase = Phase::Isolated;
			}
			Phase::Restoring(RestoreStep::Unmark) => {
				stage.reveal_all();
				self.phase = Phase::Restoring(RestoreStep::Reveal);
			}
			Phase::Restoring(RestoreStep::Reveal) => {
				if let Some(session) = self.session.take() {
					stage.restore_positions(&session.saved_positions);
				}
				self.dirty = false;
				self.phase = Phase::Idle;
			}
			Phase::Idle | Phase::Isolated => {}
		}
	}
}

#[cfg(test)]
pub(crate) mod test_stage {
	use std::collections::{HashMap, HashSet};

	use super::Stage;
	use crate::components::state_space::store::ElementSet;
	use crate::components::state_space::types::Point;

	/// Element key for a stage fake's style bookkeeping.
	#[derive(Clone, Debug, Hash, PartialEq, Eq)]
	pub enum Elem {
		Node(String),
		Edge(usize),
	}

	fn elems(set: &ElementSet) -> Vec<Elem> {
		set.nodes
			.iter()
			.cloned()
			.map(Elem::Node)
			.chain(set.edges.iter().copied().map(Elem::Edge))
			.collect()
	}

	/// Records every semantic operation and models the resulting display
	/// state, so tests can assert on the outcome instead of pixels.
	#[derive(Default)]
	pub struct FakeStage {
		pub hidden: HashSet<Elem>,
		pub highlighted: HashSet<Elem>,
		pub faded: HashSet<Elem>,
		pub positions: HashMap<String, Point>,
		pub preset: HashMap<String, Point>,
		pub fits: Vec<(ElementSet, f64)>,
		pub full_fits: usize,
		pub layouts: usize,
		pub preset_layouts: usize,
	}

	impl FakeStage {
		pub fn with_positions(positions: HashMap<String, Point>) -> Self {
			Self {
				preset: positions.clone(),
				positions,
				..Self::default()
			}
		}

		pub fn is_clean(&self) -> bool {
			self.hidden.is_empty() && self.highlighted.is_empty() && self.faded.is_empty()
		}
	}

	impl Stage for FakeStage {
		fn node_positions(&self, set: &ElementSet) -> HashMap<String, Point> {
			set.nodes
				.iter()
				.filter_map(|id| self.positions.get(id).map(|p| (id.clone(), *p)))
				.collect()
		}

		fn restore_positions(&mut self, positions: &HashMap<String, Point>) {
			for (id, p) in positions {
				self.positions.insert(id.clone(), *p);
			}
		}

		fn hide(&mut self, set: &ElementSet) {
			self.hidden.extend(elems(set));
		}

		fn reveal_all(&mut self) {
			self.hidden.clear();
			self.faded.clear();
		}

		fn clear_marks(&mut self) {
			self.highlighted.clear();
			self.faded.clear();
		}

		fn mark_highlighted(&mut self, set: &ElementSet) {
			self.highlighted.extend(elems(set));
		}

		fn unmark(&mut self, set: &ElementSet) {
			for e in elems(set) {
				self.highlighted.remove(&e);
			}
		}

		fn run_neighborhood_layout(&mut self, set: &ElementSet) {
			self.layouts += 1;
			// Shove the re-laid-out nodes somewhere else so a restore is
			// observable.
			for id in &set.nodes {
				if let Some(p) = self.positions.get_mut(id) {
					p.x += 10.0;
					p.y += 10.0;
				}
			}
		}

		fn run_preset_layout(&mut self) {
			self.preset_layouts += 1;
			let preset = self.preset.clone();
			self.positions.extend(preset);
		}

		fn fit(&mut self, set: &ElementSet, padding: f64) {
			self.fits.push((set.clone(), padding));
		}

		fn fit_all(&mut self, _padding: f64) {
			self.full_fits += 1;
		}
	}
}
