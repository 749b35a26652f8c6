use log::debug;

use super::scene::Scene;
use super::types::GraphDoc;
use crate::resources::ResourceNamespace;

/// Camera padding for the heap-configuration canvas.
pub const HC_LAYOUT_PADDING: f64 = 50.0;

/// Holds the heap configuration of the most recently selected state.
///
/// At most one secondary graph is resident; a new selection discards the
/// previous one entirely before its replacement is fetched. Fetches are
/// never cancelled, so with overlapping selections the last load to
/// *resolve* is the one that stays visible.
pub struct HeapConfigPanel {
	namespace: ResourceNamespace,
	scene: Option<Scene>,
	width: f64,
	height: f64,
}

impl HeapConfigPanel {
	pub fn new(namespace: ResourceNamespace, width: f64, height: f64) -> Self {
		Self {
			namespace,
			scene: None,
			width,
			height,
		}
	}

	/// Where the heap configuration for a state lives.
	pub fn url_for(&self, id: &str) -> String {
		self.namespace.heap_config_url(id)
	}

	pub fn scene(&self) -> Option<&Scene> {
		self.scene.as_ref()
	}

	pub fn scene_mut(&mut self) -> Option<&mut Scene> {
		self.scene.as_mut()
	}

	/// Drop the resident heap configuration.
	pub fn clear(&mut self) {
		self.scene = None;
	}

	/// Replace the resident heap configuration with a freshly fetched
	/// one, laid out and framed from scratch.
	pub fn install(&mut self, doc: GraphDoc) {
		debug!("installing heap configuration with {} nodes", doc.node_count());
		let (states, transitions) = doc.into_parts();
		self.scene = Some(Scene::new(
			states,
			transitions,
			self.width,
			self.height,
			HC_LAYOUT_PADDING,
		));
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if let Some(scene) = &mut self.scene {
			scene.resize(width, height);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn panel() -> HeapConfigPanel {
		HeapConfigPanel::new(ResourceNamespace::from_query(Some("3")), 400.0, 300.0)
	}

	fn doc(id: &str) -> GraphDoc {
		serde_json::from_str(&format!(
			r#"{{ "elements": {{ "nodes": [{{ "data": {{ "id": "{id}" }} }}], "edges": [] }} }}"#
		))
		.unwrap()
	}

	#[test]
	fn urls_are_namespace_scoped() {
		assert_eq!(panel().url_for("s1"), "cex_3/hc_s1.json");
	}

	#[test]
	fn install_replaces_the_previous_configuration_entirely() {
		let mut panel = panel();
		panel.install(doc("a"));
		assert_eq!(panel.scene().unwrap().nodes()[0].state.id, "a");

		panel.install(doc("b"));
		let scene = panel.scene().unwrap();
		assert_eq!(scene.nodes().len(), 1);
		assert_eq!(scene.nodes()[0].state.id, "b");
	}

	#[test]
	fn clear_drops_the_resident_configuration() {
		let mut panel = panel();
		panel.install(doc("a"));
		panel.clear();
		assert!(panel.scene().is_none());
	}
}
