use std::collections::HashMap;

use super::highlight::Stage;
use super::layout::{self, LayoutKind};
use super::store::ElementSet;
use super::types::{Point, State, Transition};

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;

/// Seconds every animated transition (layout move, camera fit) takes.
const ANIM_SECS: f64 = 0.5;

/// Pan/zoom transform from graph space to screen space.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Copy, Debug)]
struct CameraAnim {
	from: Camera,
	target: Camera,
	t: f64,
}

/// Display-only styling of one element. Never touches the logical graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct StyleFlags {
	pub hidden: bool,
	pub highlighted: bool,
	pub faded: bool,
}

pub struct SceneNode {
	pub state: State,
	pub pos: Point,
	pub style: StyleFlags,
	from: Point,
	target: Point,
}

pub struct SceneEdge {
	pub source: usize,
	pub target: usize,
	pub style: StyleFlags,
}

/// On-screen representation of a loaded graph: positions, styling flags,
/// camera and the animations between their states. Implements the
/// [`Stage`] operations the highlighter sequences.
pub struct Scene {
	nodes: Vec<SceneNode>,
	by_id: HashMap<String, usize>,
	edges: Vec<SceneEdge>,
	/// Baseline chosen at load time; preset re-layouts snap back to it.
	preset: Vec<Point>,
	pub camera: Camera,
	camera_anim: Option<CameraAnim>,
	layout_t: Option<f64>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl Scene {
	/// Lay out and frame a freshly loaded graph. The layout algorithm is
	/// picked by node count; the resulting positions freeze into the
	/// preset baseline.
	pub fn new(
		states: Vec<State>,
		transitions: Vec<Transition>,
		width: f64,
		height: f64,
		padding: f64,
	) -> Self {
		let by_id: HashMap<String, usize> = states
			.iter()
			.enumerate()
			.map(|(i, s)| (s.id.clone(), i))
			.collect();
		let edge_ix: Vec<(usize, usize)> = transitions
			.iter()
			.filter_map(|t| Some((*by_id.get(&t.source)?, *by_id.get(&t.target)?)))
			.collect();

		let kind = layout::choose(states.len());
		let positions = layout::compute(kind, states.len(), &edge_ix);

		let nodes: Vec<SceneNode> = states
			.into_iter()
			.zip(positions.iter())
			.map(|(state, &pos)| SceneNode {
				state,
				pos,
				style: StyleFlags::default(),
				from: pos,
				target: pos,
			})
			.collect();
		let edges = edge_ix
			.into_iter()
			.map(|(source, target)| SceneEdge {
				source,
				target,
				style: StyleFlags::default(),
			})
			.collect();

		let mut scene = Scene {
			nodes,
			by_id,
			edges,
			preset: positions,
			camera: Camera {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			camera_anim: None,
			layout_t: None,
			width,
			height,
			flow_time: 0.0,
		};
		if let Some(camera) = scene.framing_of(scene.all_node_indices(), padding) {
			scene.camera = camera;
		}
		scene
	}

	pub fn nodes(&self) -> &[SceneNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[SceneEdge] {
		&self.edges
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Whether any highlight marks are active; render dims everything
	/// else while they are.
	pub fn has_marks(&self) -> bool {
		self.nodes.iter().any(|n| n.style.highlighted)
			|| self.edges.iter().any(|e| e.style.highlighted)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.camera.x) / self.camera.k,
			(sy - self.camera.y) / self.camera.k,
		)
	}

	/// Topmost visible node under a screen position.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<&str> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		for node in &self.nodes {
			if node.style.hidden {
				continue;
			}
			let (dx, dy) = (node.pos.x - gx, node.pos.y - gy);
			// HIT_RADIUS is in graph space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.state.id.as_str());
			}
		}
		found
	}

	/// Manual pan/zoom takes over the camera, dropping any animated fit.
	pub fn camera_mut(&mut self) -> &mut Camera {
		self.camera_anim = None;
		&mut self.camera
	}

	/// Advance animations by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;

		if let Some(t) = &mut self.layout_t {
			*t = (*t + dt / ANIM_SECS).min(1.0);
			let progress = ease_out_cubic(*t);
			let done = *t >= 1.0;
			for node in &mut self.nodes {
				node.pos = lerp_point(node.from, node.target, progress);
			}
			if done {
				self.layout_t = None;
			}
		}

		if let Some(anim) = &mut self.camera_anim {
			anim.t = (anim.t + dt / ANIM_SECS).min(1.0);
			let progress = ease_out_cubic(anim.t);
			self.camera = Camera {
				x: anim.from.x + (anim.target.x - anim.from.x) * progress,
				y: anim.from.y + (anim.target.y - anim.from.y) * progress,
				k: anim.from.k + (anim.target.k - anim.from.k) * progress,
			};
			if anim.t >= 1.0 {
				self.camera_anim = None;
			}
		}
	}

	fn all_node_indices(&self) -> Vec<usize> {
		(0..self.nodes.len()).collect()
	}

	/// Camera that frames the given nodes with padding, or `None` when
	/// nothing is there to frame.
	fn framing_of(&self, indices: Vec<usize>, padding: f64) -> Option<Camera> {
		let points: Vec<Point> = indices.iter().map(|&i| self.nodes[i].pos).collect();
		self.framing_of_points(&points, padding)
	}

	fn animate_camera_to(&mut self, target: Camera) {
		self.camera_anim = Some(CameraAnim {
			from: self.camera,
			target,
			t: 0.0,
		});
	}

	fn visible_indices_in(&self, set: &ElementSet) -> Vec<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| !n.style.hidden && set.nodes.contains(&n.state.id))
			.map(|(i, _)| i)
			.collect()
	}

	fn framing_of_points(&self, points: &[Point], padding: f64) -> Option<Camera> {
		let first = *points.first()?;
		let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
		for p in points {
			min_x = min_x.min(p.x);
			max_x = max_x.max(p.x);
			min_y = min_y.min(p.y);
			max_y = max_y.max(p.y);
		}
		let k = (self.width / (max_x - min_x + 2.0 * padding))
			.min(self.height / (max_y - min_y + 2.0 * padding))
			.clamp(0.1, 10.0);
		Some(Camera {
			x: self.width / 2.0 - k * (min_x + max_x) / 2.0,
			y: self.height / 2.0 - k * (min_y + max_y) / 2.0,
			k,
		})
	}

	fn for_each_in_set(&mut self, set: &ElementSet, f: impl Fn(&mut StyleFlags)) {
		for node in &mut self.nodes {
			if set.nodes.contains(&node.state.id) {
				f(&mut node.style);
			}
		}
		for (i, edge) in self.edges.iter_mut().enumerate() {
			if set.edges.contains(&i) {
				f(&mut edge.style);
			}
		}
	}
}

impl Stage for Scene {
	fn node_positions(&self, set: &ElementSet) -> HashMap<String, Point> {
		set.nodes
			.iter()
			.filter_map(|id| self.by_id.get(id).map(|&i| (id.clone(), self.nodes[i].pos)))
			.collect()
	}

	fn restore_positions(&mut self, positions: &HashMap<String, Point>) {
		for (id, &p) in positions {
			if let Some(&i) = self.by_id.get(id) {
				let node = &mut self.nodes[i];
				node.pos = p;
				node.from = p;
				node.target = p;
			}
		}
	}

	fn hide(&mut self, set: &ElementSet) {
		self.for_each_in_set(set, |style| style.hidden = true);
	}

	fn reveal_all(&mut self) {
		for node in &mut self.nodes {
			node.style.hidden = false;
			node.style.faded = false;
		}
		for edge in &mut self.edges {
			edge.style.hidden = false;
			edge.style.faded = false;
		}
	}

	fn clear_marks(&mut self) {
		for node in &mut self.nodes {
			node.style.highlighted = false;
			node.style.faded = false;
		}
		for edge in &mut self.edges {
			edge.style.highlighted = false;
			edge.style.faded = false;
		}
	}

	fn mark_highlighted(&mut self, set: &ElementSet) {
		self.for_each_in_set(set, |style| style.highlighted = true);
	}

	fn unmark(&mut self, set: &ElementSet) {
		self.for_each_in_set(set, |style| style.highlighted = false);
	}

	fn run_neighborhood_layout(&mut self, set: &ElementSet) {
		let indices = self.visible_indices_in(set);
		if indices.is_empty() {
			return;
		}
		// Induced subgraph, re-ranked on its own.
		let local: HashMap<usize, usize> = indices
			.iter()
			.enumerate()
			.map(|(local, &global)| (global, local))
			.collect();
		let sub_edges: Vec<(usize, usize)> = self
			.edges
			.iter()
			.filter_map(|e| Some((*local.get(&e.source)?, *local.get(&e.target)?)))
			.collect();
		let positions = layout::compute(LayoutKind::Layered, indices.len(), &sub_edges);

		// Keep the neighborhood roughly where it was: recentre the fresh
		// layout on the focal cluster's current midpoint.
		let (mut cx, mut cy) = (0.0, 0.0);
		for &i in &indices {
			cx += self.nodes[i].pos.x;
			cy += self.nodes[i].pos.y;
		}
		cx /= indices.len() as f64;
		cy /= indices.len() as f64;
		let (mut lx, mut ly) = (0.0, 0.0);
		for p in &positions {
			lx += p.x;
			ly += p.y;
		}
		lx /= positions.len() as f64;
		ly /= positions.len() as f64;

		for (local, &global) in indices.iter().enumerate() {
			let node = &mut self.nodes[global];
			node.from = node.pos;
			node.target = Point {
				x: positions[local].x - lx + cx,
				y: positions[local].y - ly + cy,
			};
		}
		self.layout_t = Some(0.0);
	}

	fn run_preset_layout(&mut self) {
		self.layout_t = None;
		let preset = self.preset.clone();
		for (node, &p) in self.nodes.iter_mut().zip(preset.iter()) {
			node.pos = p;
			node.from = p;
			node.target = p;
		}
	}

	fn fit(&mut self, set: &ElementSet, padding: f64) {
		// Frame where the animated layout is headed, not where nodes
		// happen to be mid-flight.
		let indices = self.visible_indices_in(set);
		if indices.is_empty() {
			return;
		}
		let snapshot: Vec<Point> = indices.iter().map(|&i| self.nodes[i].target).collect();
		if let Some(camera) = self.framing_of_points(&snapshot, padding) {
			self.animate_camera_to(camera);
		}
	}

	fn fit_all(&mut self, padding: f64) {
		let visible: Vec<usize> = self
			.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| !n.style.hidden)
			.map(|(i, _)| i)
			.collect();
		if let Some(camera) = self.framing_of(visible, padding) {
			self.animate_camera_to(camera);
		}
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn lerp_point(from: Point, to: Point, t: f64) -> Point {
	Point {
		x: from.x + (to.x - from.x) * t,
		y: from.y + (to.y - from.y) * t,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::state_space::store::GraphStore;
	use crate::components::state_space::types::GraphDoc;

	fn scene() -> Scene {
		let doc: GraphDoc = serde_json::from_str(
			r#"{
				"elements": {
					"nodes": [
						{ "data": { "id": "s0" } },
						{ "data": { "id": "s1" } },
						{ "data": { "id": "s2" } }
					],
					"edges": [
						{ "data": { "source": "s0", "target": "s1" } },
						{ "data": { "source": "s1", "target": "s2" } }
					]
				}
			}"#,
		)
		.unwrap();
		let (states, transitions) = doc.into_parts();
		Scene::new(states, transitions, 800.0, 600.0, 150.0)
	}

	fn store() -> GraphStore {
		let doc: GraphDoc = serde_json::from_str(
			r#"{
				"elements": {
					"nodes": [
						{ "data": { "id": "s0" } },
						{ "data": { "id": "s1" } },
						{ "data": { "id": "s2" } }
					],
					"edges": [
						{ "data": { "source": "s0", "target": "s1" } },
						{ "data": { "source": "s1", "target": "s2" } }
					]
				}
			}"#,
		)
		.unwrap();
		GraphStore::load(doc)
	}

	#[test]
	fn hide_and_reveal_round_trip() {
		let mut scene = scene();
		let set = store().closed_neighborhood("s0");
		let complement = store().complement(&set);

		scene.hide(&complement);
		assert!(scene.nodes()[2].style.hidden);
		assert!(!scene.nodes()[0].style.hidden);
		assert!(scene.edges()[1].style.hidden);

		scene.reveal_all();
		assert!(scene.nodes().iter().all(|n| !n.style.hidden));
		assert!(scene.edges().iter().all(|e| !e.style.hidden));
	}

	#[test]
	fn preset_layout_snaps_back_after_a_neighborhood_layout() {
		let mut scene = scene();
		let baseline: Vec<Point> = scene.nodes().iter().map(|n| n.pos).collect();

		scene.run_neighborhood_layout(&store().full_set());
		scene.tick(1.0);
		scene.run_preset_layout();

		let after: Vec<Point> = scene.nodes().iter().map(|n| n.pos).collect();
		assert_eq!(baseline, after);
	}

	#[test]
	fn layout_animation_reaches_its_target() {
		let mut scene = scene();
		scene.run_neighborhood_layout(&store().full_set());
		for _ in 0..40 {
			scene.tick(0.016);
		}
		for node in scene.nodes() {
			assert!((node.pos.x - node.target.x).abs() < 1e-9);
			assert!((node.pos.y - node.target.y).abs() < 1e-9);
		}
	}

	#[test]
	fn fit_ignores_hidden_nodes() {
		let mut scene = scene();
		let mut hidden = ElementSet::default();
		hidden.nodes.insert("s2".to_string());
		scene.hide(&hidden);

		scene.fit(&store().full_set(), 150.0);
		assert!(scene.camera_anim.is_some());
		scene.tick(1.0);
		// s2 is below the framed pair; with it excluded the frame centers
		// on s0/s1 only.
		let framed = scene.framing_of(vec![0, 1], 150.0).unwrap();
		assert!((scene.camera.y - framed.y).abs() < 1e-6);
	}

	#[test]
	fn node_hit_testing_respects_visibility() {
		let mut scene = scene();
		let p = scene.nodes()[0].pos;
		let (sx, sy) = (
			p.x * scene.camera.k + scene.camera.x,
			p.y * scene.camera.k + scene.camera.y,
		);
		assert_eq!(scene.node_at(sx, sy), Some("s0"));

		let mut hidden = ElementSet::default();
		hidden.nodes.insert("s0".to_string());
		scene.hide(&hidden);
		assert_ne!(scene.node_at(sx, sy), Some("s0"));
	}
}
