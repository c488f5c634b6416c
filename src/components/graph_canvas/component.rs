use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use crate::engine::{ForceGraphEngine, LayoutEngine};
use crate::viewer::{FrameClock, GraphViewer, ViewStatus};

/// Shared handle to the page's viewer; every event handler borrows it briefly.
pub type ViewerHandle = Rc<RefCell<GraphViewer<ForceGraphEngine>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Publishes the viewer's status if it changed.
pub fn sync_status(viewer: &ViewerHandle, status: RwSignal<ViewStatus>) {
	let snapshot = viewer.borrow().status();
	if status.with_untracked(|current| *current != snapshot) {
		status.set(snapshot);
	}
}

#[component]
pub fn GraphCanvas(
	viewer: ViewerHandle,
	status: RwSignal<ViewStatus>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (viewer_init, animate_init, resize_cb_init) =
		(viewer.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("No window; graph canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		viewer_init.borrow_mut().engine_mut().resize(w, h);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("Canvas 2d context unavailable");
			return;
		};

		if fullscreen {
			let (viewer_resize, canvas_resize) = (viewer_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				viewer_resize.borrow_mut().engine_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (viewer_anim, animate_inner) = (viewer_init.clone(), animate_init.clone());
		let mut clock = FrameClock::default();
		*animate_init.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			{
				let mut viewer = viewer_anim.borrow_mut();
				viewer.advance(clock.tick(timestamp));
				render::render(viewer.engine(), &ctx);
			}
			sync_status(&viewer_anim, status);
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let viewer_md = viewer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			viewer_md.borrow_mut().engine_mut().begin_drag(x, y);
		}
	};

	let viewer_mm = viewer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			viewer_mm.borrow_mut().engine_mut().drag_to(x, y);
		}
	};

	let viewer_mu = viewer.clone();
	let on_mouseup = move |_: MouseEvent| {
		viewer_mu.borrow_mut().engine_mut().end_drag();
	};

	let viewer_ml = viewer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		viewer_ml.borrow_mut().engine_mut().clear_hover();
	};

	let viewer_dc = viewer.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut viewer = viewer_dc.borrow_mut();
		let target = viewer.engine().node_id_at(x, y);
		viewer.on_double_click(target.as_ref());
	};

	let viewer_wh = viewer.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut viewer = viewer_wh.borrow_mut();
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let requested = viewer.engine().scale() * factor;
		viewer.on_zoom(requested, x, y);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
