use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use log::warn;
use wasm_bindgen_futures::spawn_local;

use crate::components::state_space::{GraphDoc, StateSpaceViewer};
use crate::resources::{self, ResourceNamespace};

/// The state-space viewer page. Resolves the resource namespace from the
/// page query once, fetches the graph and hands it to the viewer; a load
/// failure leaves the loading indicator up for good.
#[component]
pub fn StateSpace() -> impl IntoView {
	let query = use_query_map();
	let namespace = ResourceNamespace::from_query(query.get_untracked().get("cex").as_deref());

	let (doc, set_doc) = signal(None::<GraphDoc>);

	let url = namespace.graph_url();
	spawn_local(async move {
		match resources::fetch_json::<GraphDoc>(&url).await {
			Ok(graph) => set_doc.set(Some(graph)),
			Err(err) => warn!("{err}"),
		}
	});

	view! {
		<div class="state-space-page">
			<div id="loading" class:loaded=move || doc.get().is_some()>
				<span>"Loading state space..."</span>
			</div>
			<StateSpaceViewer doc=doc namespace=namespace />
		</div>
	}
}
