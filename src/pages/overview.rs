use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;

use crate::components::state_space::OverviewDoc;
use crate::resources::{self, OVERVIEW_URL};

/// Static summary of the verification run: checked LTL formulas with
/// their outcomes and the per-phase runtimes.
#[component]
pub fn Overview() -> impl IntoView {
	let (doc, set_doc) = signal(None::<OverviewDoc>);

	spawn_local(async move {
		match resources::fetch_json::<OverviewDoc>(OVERVIEW_URL).await {
			Ok(overview) => set_doc.set(Some(overview)),
			Err(err) => warn!("{err}"),
		}
	});

	view! {
		<div class="overview-page">
			<h1>"Verification overview"</h1>
			{move || match doc.get() {
				None => view! { <p>"Loading overview..."</p> }.into_any(),
				Some(doc) => {
					let elements = doc.elements;
					view! {
						<h2>"LTL formulas"</h2>
						<table class="verification">
							<thead>
								<tr>
									<th>"Formula"</th>
									<th>"Status"</th>
								</tr>
							</thead>
							<tbody>
								{elements
									.verification
									.values()
									.map(|entry| {
										let status = entry.result.status.clone();
										view! {
											<tr>
												<td class="formula">{entry.result.formula.clone()}</td>
												<td class=format!("status status-{status}")>{status.clone()}</td>
											</tr>
										}
									})
									.collect_view()}
							</tbody>
						</table>
						<h2>"Runtimes"</h2>
						<table class="runtimes">
							<tbody>
								{elements
									.runtimes
									.values()
									.map(|entry| {
										view! {
											<tr>
												<td>{entry.phase.name.clone()}</td>
												<td>{format!("{:.3} s", entry.phase.time)}</td>
											</tr>
										}
									})
									.collect_view()}
								<tr class="total">
									<td>"Verification"</td>
									<td>{format!("{:.3} s", elements.verification_time)}</td>
								</tr>
								<tr class="total">
									<td>"Total"</td>
									<td>{format!("{:.3} s", elements.total_time)}</td>
								</tr>
							</tbody>
						</table>
					}
						.into_any()
				}
			}}
		</div>
	}
}
