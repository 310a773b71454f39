use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement,
	MouseEvent, Url, WheelEvent, Window,
};

use super::details::{DetailsPanel, ElementDetails, HoverPopover, Popover};
use super::error::RenderError;
use super::export::vega_spec;
use super::render;
use super::state::{ClickAction, FishboneState, FrameLoop, ViewTransform};
use super::types::IssueTree;

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// How the canvas picks its pixel size.
#[derive(Clone, Copy, Debug)]
struct Sizing {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Sizing {
	fn measure(&self, window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
		let inner = |v: Result<JsValue, JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		if self.fullscreen {
			return (
				inner(window.inner_width(), 800.0),
				inner(window.inner_height(), 600.0),
			);
		}
		(
			self.width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}
}

#[derive(Clone, Default)]
struct Handles {
	state: Rc<RefCell<Option<FishboneState>>>,
	animate: Callback,
	resize_cb: Callback,
	frames: Rc<RefCell<FrameLoop>>,
}

impl Handles {
	/// Stop the frame loop, detach the resize listener and drop both closures.
	fn teardown(&self) {
		let pending = self.frames.borrow_mut().stop();
		let window = web_sys::window();
		if let (Some(id), Some(win)) = (pending, &window) {
			if let Err(e) = win.cancel_animation_frame(id) {
				warn!("Could not cancel animation frame {}: {:?}", id, e);
			}
		}
		if let (Some(cb), Some(win)) = (self.resize_cb.borrow_mut().take(), &window) {
			detach_resize(win, &cb);
		}
		self.animate.borrow_mut().take();
		debug!("Fishbone canvas torn down");
	}
}

fn detach_resize(window: &Window, cb: &Closure<dyn FnMut()>) {
	if let Err(e) = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
	{
		warn!("Could not detach resize listener: {:?}", e);
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
	canvas
		.get_context("2d")
		.map_err(|e| RenderError::Context(format!("{:?}", e)))?
		.ok_or_else(|| RenderError::Context("not supported by this browser".into()))?
		.dyn_into()
		.map_err(|_| RenderError::Context("unexpected context type".into()))
}

/// Bring the canvas up for `tree`: size it, (re)build the state, swap the
/// resize listener and start the frame loop if it is not running yet.
fn start(
	handles: &Handles,
	canvas: HtmlCanvasElement,
	tree: IssueTree,
	sizing: Sizing,
) -> Result<(), RenderError> {
	let window = web_sys::window().ok_or(RenderError::NoWindow)?;
	let ctx = context_2d(&canvas)?;
	let (w, h) = sizing.measure(&window, &canvas);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);

	{
		let mut slot = handles.state.borrow_mut();
		match slot.as_mut() {
			Some(s) => {
				s.set_tree(tree);
				if (s.width, s.height) != (w, h) {
					s.resize(w, h);
				}
			}
			None => *slot = Some(FishboneState::new(tree, w, h)),
		}
	}

	if let Some(old) = handles.resize_cb.borrow_mut().take() {
		detach_resize(&window, &old);
	}
	let (state_resize, canvas_resize) = (handles.state.clone(), canvas.clone());
	let resize_cb = Closure::<dyn FnMut()>::new(move || {
		let Some(win) = web_sys::window() else {
			return;
		};
		let (nw, nh) = sizing.measure(&win, &canvas_resize);
		if let Some(ref mut s) = *state_resize.borrow_mut() {
			s.request_resize(nw, nh, js_sys::Date::now());
		}
	});
	window
		.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
		.map_err(|e| RenderError::Browser(format!("resize listener: {:?}", e)))?;
	*handles.resize_cb.borrow_mut() = Some(resize_cb);

	if handles.animate.borrow().is_some() || !handles.frames.borrow().is_running() {
		return Ok(());
	}
	let (state_anim, animate_inner, frames_anim) = (
		handles.state.clone(),
		handles.animate.clone(),
		handles.frames.clone(),
	);
	*handles.animate.borrow_mut() = Some(Closure::new(move || {
		frames_anim.borrow_mut().fired();
		if !frames_anim.borrow().is_running() {
			return;
		}
		if let Some(ref mut s) = *state_anim.borrow_mut() {
			if s.apply_pending_resize(js_sys::Date::now()) {
				canvas.set_width(s.width as u32);
				canvas.set_height(s.height as u32);
			}
			if s.dirty {
				render::render(s, &ctx);
				s.dirty = false;
			}
		}
		if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
			match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => frames_anim.borrow_mut().scheduled(id),
				Err(e) => warn!("Animation frame request failed: {:?}", e),
			}
		}
	}));
	if let Some(ref cb) = *handles.animate.borrow() {
		let id = window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.map_err(|e| RenderError::Browser(format!("animation frame: {:?}", e)))?;
		handles.frames.borrow_mut().scheduled(id);
	}
	debug!("Fishbone canvas started at {}x{}", w, h);
	Ok(())
}

fn download_json(filename: &str, json: &str) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let parts = js_sys::Array::of1(&JsValue::from_str(json));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	Url::revoke_object_url(&url)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive fishbone diagram: pan by dragging, zoom with the wheel, click a
/// category to collapse it, click the issue or a cause for details.
#[component]
pub fn FishboneCanvas(
	#[prop(into)] data: Signal<IssueTree>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handles = Handles::default();
	let popover = RwSignal::new(None::<Popover>);
	let selected = RwSignal::new(None::<ElementDetails>);
	let notice = RwSignal::new(None::<String>);
	let sizing = Sizing {
		fullscreen,
		width,
		height,
	};

	let handles_cleanup = SendWrapper::new(handles.clone());
	on_cleanup(move || handles_cleanup.teardown());

	let handles_init = handles.clone();
	Effect::new(move |_| {
		let tree = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		match start(&handles_init, canvas.into(), tree, sizing) {
			Ok(()) => notice.set(None),
			Err(e) => {
				error!("Fishbone canvas failed to start: {}", e);
				notice.set(Some(e.to_string()));
			}
		}
	});

	let state_md = handles.state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some((px, py)) = s.minimap_hit(x, y) {
				s.center_on(px, py);
				return;
			}
			s.start_pan(x, y);
		}
	};

	let state_mm = handles.state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pan.active {
				s.pan_to(x, y);
				if s.pan.moved {
					popover.set(None);
				}
				return;
			}
			let hovered = s.element_at_position(x, y);
			if s.set_hover(hovered) {
				popover.set(
					hovered
						.and_then(|element| ElementDetails::from_element(&s.tree, element))
						.map(|details| Popover { x, y, details }),
				);
			}
		}
	};

	let state_mu = handles.state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if !s.end_pan() {
				return;
			}
			let Some(element) = s.element_at_position(x, y) else {
				return;
			};
			match s.click_action(element) {
				ClickAction::ToggleCollapse(name) => {
					let collapsed = s.toggle_collapse(&name);
					info!(
						"Category '{}' {}",
						name,
						if collapsed { "collapsed" } else { "expanded" }
					);
					popover.set(None);
				}
				ClickAction::ShowDetails(element) => {
					selected.set(ElementDetails::from_element(&s.tree, element));
				}
			}
		}
	};

	let state_ml = handles.state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_pan();
			s.set_hover(None);
		}
		popover.set(None);
	};

	let state_wh = handles.state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	let state_reset = handles.state.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.transform = ViewTransform::default();
			s.dirty = true;
		}
	};

	let state_ex = handles.state.clone();
	let on_export = move |_: MouseEvent| {
		let guard = state_ex.borrow();
		let Some(s) = guard.as_ref() else {
			return;
		};
		let result = serde_json::to_string_pretty(&vega_spec(&s.scene, &s.scale))
			.map_err(|e| JsValue::from_str(&e.to_string()))
			.and_then(|json| download_json("fishbone.vg.json", &json));
		if let Err(e) = result {
			warn!("Vega export failed: {:?}", e);
		}
	};

	view! {
		<div class="fishbone-container">
			<canvas
				node_ref=canvas_ref
				class="fishbone-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="fishbone-toolbar">
				<button on:click=on_reset>"Reset view"</button>
				<button on:click=on_export>"Export Vega spec"</button>
			</div>
			<HoverPopover popover=popover />
			<DetailsPanel selected=selected />
			{move || {
				notice
					.get()
					.map(|msg| {
						view! { <div class="fishbone-notice">"Diagram unavailable: " {msg}</div> }
					})
			}}
		</div>
	}
}
