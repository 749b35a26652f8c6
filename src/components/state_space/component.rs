use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::controller::{
	SELECTION_DEBOUNCE_MS, SelectionEvent, SelectionOutcome, ViewController, ViewerCore,
};
use super::heap_config::HeapConfigPanel;
use super::render;
use super::scene::Scene;
use super::store::GraphStore;
use super::types::{GraphDoc, State};
use crate::components::state_info::StateInfo;
use crate::resources::{self, ResourceNamespace};

type SharedCore = Rc<RefCell<Option<ViewerCore>>>;

/// Movement below this many pixels between press and release counts as a
/// click rather than a pan.
const CLICK_SLOP: f64 = 4.0;

const FRAME_DT: f64 = 0.016;

/// The interactive state-space view: main canvas, heap-configuration
/// canvas, search box, neighborhood-focus toggle and the selected-state
/// panel, wired to one [`ViewerCore`].
#[component]
pub fn StateSpaceViewer(
	#[prop(into)] doc: Signal<Option<GraphDoc>>,
	namespace: ResourceNamespace,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let hc_canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let core: SharedCore = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let (selected, set_selected) = signal(None::<State>);
	let (suggestions, set_suggestions) = signal(Vec::<State>::new());
	let (picked, set_picked) = signal(None::<String>);

	let (core_init, animate_init) = (core.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(hc_canvas) = hc_canvas_ref.get() else {
			return;
		};
		let Some(doc) = doc.get() else {
			return;
		};
		if core_init.borrow().is_some() {
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let hc_canvas: HtmlCanvasElement = hc_canvas.into();
		let (w, h) = (
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|&w| w > 0.0)
				.unwrap_or(800.0),
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.filter(|&h| h > 0.0)
				.unwrap_or(600.0),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let (hc_w, hc_h) = (
			hc_canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|&w| w > 0.0)
				.unwrap_or(400.0),
			300.0,
		);
		hc_canvas.set_width(hc_w as u32);
		hc_canvas.set_height(hc_h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let hc_ctx: CanvasRenderingContext2d = hc_canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let store = Rc::new(GraphStore::load(doc.clone()));
		info!(
			"state space loaded: {} states, {} transitions",
			store.node_count(),
			store.transitions().len()
		);
		let (states, transitions) = doc.into_parts();
		let scene = Scene::new(states, transitions, w, h, super::highlight::LAYOUT_PADDING);
		*core_init.borrow_mut() = Some(ViewerCore {
			controller: ViewController::new(store),
			scene,
			heap: HeapConfigPanel::new(namespace.clone(), hc_w, hc_h),
		});

		let (core_anim, animate_inner) = (core_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(vc) = core_anim.borrow_mut().as_mut() {
				vc.scene.tick(FRAME_DT);
				render::render(&vc.scene, &ctx);
				match vc.heap.scene_mut() {
					Some(hc_scene) => {
						hc_scene.tick(FRAME_DT);
						render::render(hc_scene, &hc_ctx);
					}
					None => {
						hc_ctx.set_fill_style_str("#1a1a2e");
						hc_ctx.fill_rect(0.0, 0.0, hc_w, hc_h);
					}
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// A picked search suggestion funnels into the same selection pipeline
	// as a canvas click.
	let core_pick = core.clone();
	Effect::new(move |_| {
		let Some(id) = picked.get() else {
			return;
		};
		set_suggestions.set(Vec::new());
		submit_selection(&core_pick, SelectionEvent::Selected(id), set_selected);
	});

	// Press/release bookkeeping for click-vs-pan, in screen coordinates.
	let press: Rc<RefCell<Option<(f64, f64, f64, f64)>>> = Rc::new(RefCell::new(None));

	let (core_md, press_md) = (core.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(vc) = core_md.borrow().as_ref() {
			let camera = vc.scene.camera;
			*press_md.borrow_mut() = Some((x, y, camera.x, camera.y));
		}
	};

	let (core_mm, press_mm) = (core.clone(), press.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((sx, sy, cam_x, cam_y)) = *press_mm.borrow() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(vc) = core_mm.borrow_mut().as_mut() {
			let camera = vc.scene.camera_mut();
			camera.x = cam_x + (x - sx);
			camera.y = cam_y + (y - sy);
		}
	};

	let (core_mu, press_mu) = (core.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((sx, sy, _, _)) = press_mu.borrow_mut().take() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if (x - sx).hypot(y - sy) >= CLICK_SLOP {
			return;
		}
		let event = {
			let guard = core_mu.borrow();
			let Some(vc) = guard.as_ref() else { return };
			match vc.scene.node_at(x, y) {
				Some(id) => SelectionEvent::Selected(id.to_string()),
				None => SelectionEvent::Deselected,
			}
		};
		submit_selection(&core_mu, event, set_selected);
	};

	let press_ml = press.clone();
	let on_mouseleave = move |_: MouseEvent| {
		*press_ml.borrow_mut() = None;
	};

	let core_wh = core.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(vc) = core_wh.borrow_mut().as_mut() {
			let camera = vc.scene.camera_mut();
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (camera.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / camera.k;
			camera.x = x - (x - camera.x) * ratio;
			camera.y = y - (y - camera.y) * ratio;
			camera.k = new_k;
		}
	};

	let core_search = core.clone();
	let on_search = move |ev| {
		let text = event_target_value(&ev);
		if text.is_empty() {
			set_suggestions.set(Vec::new());
			return;
		}
		let hits = core_search
			.borrow()
			.as_ref()
			.map(|vc| vc.controller.search().query(&text))
			.unwrap_or_default();
		set_suggestions.set(hits);
	};

	let core_focus = core.clone();
	let on_focus_toggle = move |ev| {
		let enabled = event_target_checked(&ev);
		if let Some(vc) = core_focus.borrow_mut().as_mut() {
			let ViewerCore {
				controller, scene, ..
			} = vc;
			controller.set_focus_enabled(enabled, scene);
		}
		drive_settles(&core_focus);
	};

	view! {
		<div class="viewer">
			<div class="viewer-main">
				<canvas
					node_ref=canvas_ref
					class="state-space-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style="display: block; cursor: grab;"
				/>
			</div>
			<div class="viewer-side">
				<div class="search">
					<input
						type="text"
						placeholder="Search states..."
						on:input=on_search
					/>
					<ul class="suggestions">
						{move || {
							suggestions
								.get()
								.into_iter()
								.map(|s| {
									let id = s.id.clone();
									view! {
										<li on:click=move |_| set_picked.set(Some(id.clone()))>
											<span class="suggestion-id">{s.id.clone()}</span>
											<span class="suggestion-type">{s.kind.clone()}</span>
											<span class="suggestion-statement">{s.statement.clone()}</span>
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
				<label class="focus-toggle">
					<input type="checkbox" on:change=on_focus_toggle />
					"Focus selected state's neighborhood"
				</label>
				<StateInfo selected=selected />
				<div class="heap-config">
					<h3>"Heap configuration"</h3>
					<canvas node_ref=hc_canvas_ref style="display: block;" />
				</div>
			</div>
		</div>
	}
}

/// Queue a selection event and arm the quiescence timer; only the timer
/// holding the latest token ends up doing any work.
fn submit_selection(core: &SharedCore, event: SelectionEvent, set_selected: WriteSignal<Option<State>>) {
	let token = {
		let mut guard = core.borrow_mut();
		let Some(vc) = guard.as_mut() else { return };
		vc.controller.submit(event)
	};
	let core = core.clone();
	Timeout::new(SELECTION_DEBOUNCE_MS, move || {
		let outcome = {
			let mut guard = core.borrow_mut();
			let Some(vc) = guard.as_mut() else { return };
			let ViewerCore {
				controller, scene, ..
			} = vc;
			controller.flush(token, scene)
		};
		match outcome {
			Some(SelectionOutcome::Selected { info, heap_request }) => {
				set_selected.set(Some(info));
				load_heap(&core, heap_request);
			}
			Some(SelectionOutcome::Cleared) => {
				set_selected.set(None);
				if let Some(vc) = core.borrow_mut().as_mut() {
					vc.heap.clear();
				}
			}
			Some(SelectionOutcome::Ignored) | None => return,
		}
		drive_settles(&core);
	})
	.forget();
}

/// Fetch a state's heap configuration and install it once resolved. Never
/// cancelled; with overlapping selections the last load to resolve wins.
fn load_heap(core: &SharedCore, id: String) {
	let url = {
		let mut guard = core.borrow_mut();
		let Some(vc) = guard.as_mut() else { return };
		vc.heap.clear();
		vc.heap.url_for(&id)
	};
	let core = core.clone();
	spawn_local(async move {
		match resources::fetch_json::<GraphDoc>(&url).await {
			Ok(doc) => {
				if let Some(vc) = core.borrow_mut().as_mut() {
					vc.heap.install(doc);
				}
			}
			Err(err) => warn!("{err}"),
		}
	});
}

/// Keep the highlighter's phase sequence moving: wait out the current
/// phase's settle delay, advance, repeat until it parks in Idle or
/// Isolated. Stale tickets are ignored by the highlighter itself.
fn drive_settles(core: &SharedCore) {
	let ticket = core
		.borrow()
		.as_ref()
		.and_then(|vc| vc.controller.highlighter().settle_ticket());
	let Some(ticket) = ticket else {
		return;
	};
	let core = core.clone();
	Timeout::new(ticket.delay_ms, move || {
		if let Some(vc) = core.borrow_mut().as_mut() {
			let ViewerCore {
				controller, scene, ..
			} = vc;
			controller.highlighter_mut().on_settled(ticket, scene);
		}
		drive_settles(&core);
	})
	.forget();
}
