use std::collections::HashSet;

use log::debug;

use super::layout::{Align, Element, Scene, layout, min_layout_height, min_layout_width};
use super::scale::OrdinalScale;
use super::types::IssueTree;

pub const FONT_SIZE: f64 = 12.0;
/// Rough advance of one glyph at `FONT_SIZE`, used for hit boxes.
pub const CHAR_WIDTH: f64 = FONT_SIZE * 0.6;
pub const BADGE_RADIUS: f64 = 8.0;
pub const MINIMAP_WIDTH: f64 = 180.0;
pub const MINIMAP_HEIGHT: f64 = 100.0;
pub const MINIMAP_MARGIN: f64 = 12.0;
pub const RESIZE_DEBOUNCE_MS: f64 = 120.0;
/// Pointer travel below which a press/release counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingResize {
	pub width: f64,
	pub height: f64,
	pub at_ms: f64,
}

/// Screen-space placement of the minimap and its scene-to-minimap factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapFrame {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub scale: f64,
}

/// What a click on a scene element should do.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickAction {
	ToggleCollapse(String),
	ShowDetails(Element),
}

pub struct FishboneState {
	pub tree: IssueTree,
	pub scale: OrdinalScale,
	pub collapsed: HashSet<String>,
	pub scene: Scene,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub hover: Option<Element>,
	pub width: f64,
	pub height: f64,
	pub dirty: bool,
	pending_resize: Option<PendingResize>,
}

impl FishboneState {
	pub fn new(tree: IssueTree, width: f64, height: f64) -> Self {
		let scale = OrdinalScale::new(tree.category_names());
		let mut state = Self {
			tree,
			scale,
			collapsed: HashSet::new(),
			scene: Scene::default(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
			dirty: true,
			pending_resize: None,
		};
		state.relayout();
		state
	}

	/// Replace the scene wholesale from the current tree, size and collapse set.
	pub fn relayout(&mut self) {
		let w = self.width.max(min_layout_width(self.tree.categories.len()));
		let h = self.height.max(min_layout_height(&self.tree));
		self.scene = layout(&self.tree, w, h, &self.collapsed);
		if let Some(element) = self.hover {
			if !self.scene.labels.iter().any(|l| l.element == element) {
				self.hover = None;
			}
		}
		self.dirty = true;
		debug!(
			"Layout {}x{}: {} lines, {} labels, {} badges",
			w,
			h,
			self.scene.lines.len(),
			self.scene.labels.len(),
			self.scene.badges.len()
		);
	}

	pub fn set_tree(&mut self, tree: IssueTree) {
		self.scale = OrdinalScale::new(tree.category_names());
		self.collapsed.retain(|name| tree.categories.iter().any(|c| &c.name == name));
		self.tree = tree;
		self.relayout();
	}

	/// Flip a category between collapsed and expanded. Returns the new state.
	pub fn toggle_collapse(&mut self, name: &str) -> bool {
		let collapsed = if self.collapsed.remove(name) {
			false
		} else {
			self.collapsed.insert(name.to_string());
			true
		};
		self.relayout();
		collapsed
	}

	pub fn is_collapsed(&self, name: &str) -> bool {
		self.collapsed.contains(name)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.pending_resize = None;
		self.relayout();
	}

	/// Record a resize; it is applied once no newer one arrives for
	/// `RESIZE_DEBOUNCE_MS`.
	pub fn request_resize(&mut self, width: f64, height: f64, now_ms: f64) {
		self.pending_resize = Some(PendingResize {
			width,
			height,
			at_ms: now_ms,
		});
	}

	pub fn apply_pending_resize(&mut self, now_ms: f64) -> bool {
		match self.pending_resize {
			Some(p) if now_ms - p.at_ms >= RESIZE_DEBOUNCE_MS => {
				self.resize(p.width, p.height);
				true
			}
			_ => false,
		}
	}

	pub fn screen_to_scene(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost element under a screen position. Labels draw over badges.
	pub fn element_at_position(&self, sx: f64, sy: f64) -> Option<Element> {
		let (x, y) = self.screen_to_scene(sx, sy);
		let half = FONT_SIZE / 2.0;
		let label = self.scene.labels.iter().rev().find(|label| {
			let w = label.text.chars().count() as f64 * CHAR_WIDTH;
			let (left, right) = match label.align {
				Align::Left => (label.x, label.x + w),
				Align::Right => (label.x - w, label.x),
			};
			x >= left && x <= right && (y - label.y).abs() <= half
		});
		if let Some(label) = label {
			return Some(label.element);
		}
		self.scene
			.badges
			.iter()
			.rev()
			.find(|b| {
				let (dx, dy) = (b.x - x, b.y - y);
				(dx * dx + dy * dy).sqrt() <= BADGE_RADIUS
			})
			.map(|b| b.element)
	}

	pub fn set_hover(&mut self, element: Option<Element>) -> bool {
		if self.hover == element {
			return false;
		}
		self.hover = element;
		self.dirty = true;
		true
	}

	pub fn click_action(&self, element: Element) -> ClickAction {
		match element {
			Element::Category { category } => {
				ClickAction::ToggleCollapse(self.tree.categories[category].name.clone())
			}
			Element::Root | Element::Cause { .. } => ClickAction::ShowDetails(element),
		}
	}

	pub fn start_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pan.moved = true;
		}
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
		self.dirty = true;
	}

	/// Finish a pan gesture. True when the pointer barely moved, i.e. a click.
	pub fn end_pan(&mut self) -> bool {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan.active = false;
		self.pan.moved = false;
		was_click
	}

	/// Zoom by one wheel notch around a screen point.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.2, 5.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.dirty = true;
	}

	pub fn minimap_frame(&self) -> MinimapFrame {
		let scale = (MINIMAP_WIDTH / self.scene.width).min(MINIMAP_HEIGHT / self.scene.height);
		MinimapFrame {
			x: self.width - MINIMAP_WIDTH - MINIMAP_MARGIN,
			y: self.height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
			width: MINIMAP_WIDTH,
			height: MINIMAP_HEIGHT,
			scale,
		}
	}

	/// Scene point under a screen position inside the minimap, if any.
	pub fn minimap_hit(&self, sx: f64, sy: f64) -> Option<(f64, f64)> {
		let frame = self.minimap_frame();
		let inside = sx >= frame.x
			&& sx <= frame.x + frame.width
			&& sy >= frame.y
			&& sy <= frame.y + frame.height;
		if !inside {
			return None;
		}
		let (px, py) = ((sx - frame.x) / frame.scale, (sy - frame.y) / frame.scale);
		(px <= self.scene.width && py <= self.scene.height).then_some((px, py))
	}

	/// Visible part of the scene as `(x, y, width, height)`.
	pub fn viewport(&self) -> (f64, f64, f64, f64) {
		let (x, y) = self.screen_to_scene(0.0, 0.0);
		(x, y, self.width / self.transform.k, self.height / self.transform.k)
	}

	/// Pan so the scene point lands in the middle of the canvas.
	pub fn center_on(&mut self, px: f64, py: f64) {
		self.transform.x = self.width / 2.0 - px * self.transform.k;
		self.transform.y = self.height / 2.0 - py * self.transform.k;
		self.dirty = true;
	}
}

/// Lifetime of the canvas frame loop: the pending frame request and whether
/// the owning component is gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameLoop {
	stopped: bool,
	pending: Option<i32>,
}

impl FrameLoop {
	pub fn is_running(&self) -> bool {
		!self.stopped
	}

	/// Remember a frame request. Ignored once stopped.
	pub fn scheduled(&mut self, id: i32) {
		if !self.stopped {
			self.pending = Some(id);
		}
	}

	/// The requested frame has fired.
	pub fn fired(&mut self) {
		self.pending = None;
	}

	/// Stop the loop. Returns the frame request still to be cancelled, once.
	pub fn stop(&mut self) -> Option<i32> {
		self.stopped = true;
		self.pending.take()
	}
}
