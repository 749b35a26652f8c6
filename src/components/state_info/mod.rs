use leptos::prelude::*;

use crate::components::state_space::State;

/// Detail panel for the currently selected state: id, type, pending
/// statement and the atomic propositions holding there.
#[component]
pub fn StateInfo(#[prop(into)] selected: Signal<Option<State>>) -> impl IntoView {
	view! {
		<div class="selected-state">
			{move || match selected.get() {
				Some(state) => {
					view! {
						<span class="label label-primary" title="state ID">{state.id}</span>
						<span class="label label-success" title="type of state">{state.kind}</span>
						<span class="label label-warning" title="program statement to execute">
							{state.statement}
						</span>
						{state
							.propositions
							.into_iter()
							.map(|p| {
								view! {
									<span class="label label-danger" title="assigned atomic proposition">
										{p}
									</span>
								}
							})
							.collect_view()}
					}
						.into_any()
				}
				None => view! { <span>"No state has been selected."</span> }.into_any(),
			}}
		</div>
	}
}
