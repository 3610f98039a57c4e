use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::layout;
use crate::graph::{Layout, NodeShape, Palette, StyledEdge, StyledGraph};

/// Graph-space pixels per unit of styled node size.
pub const NODE_SCALE: f64 = 0.4;
pub const MIN_HIT_RADIUS: f64 = 12.0;
/// Ticks after which the layout is considered settled and auto-fitted.
pub const SETTLE_TICKS: u32 = 250;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub label: String,
	pub tooltip: String,
	pub radius: f64,
	pub palette: Palette,
	pub shape: NodeShape,
	pub font_size: f64,
	pub bold: bool,
}

/// Edge between two simulation nodes with its drawing style.
#[derive(Clone, Debug)]
pub struct EdgeLink {
	pub src: DefaultNodeIdx,
	pub tgt: DefaultNodeIdx,
	pub style: StyledEdge,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeLink>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	ticks: u32,
}

impl ForceGraphState {
	pub fn new(data: &StyledGraph, layout: Layout, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(layout::parameters(layout));
		let mut id_to_idx = HashMap::new();
		let positions = layout::initial_positions(layout, &data.nodes);
		let pinned = layout::pins_nodes(layout);

		for (node, &(x, y)) in data.nodes.iter().zip(&positions) {
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: pinned,
				user_data: NodeInfo {
					label: node.label.clone(),
					tooltip: node.tooltip.clone(),
					radius: node.size * NODE_SCALE,
					palette: node.palette,
					shape: node.shape,
					font_size: node.font_size,
					bold: node.bold,
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		for edge in &data.edges {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(edge.source.as_str()),
				id_to_idx.get(edge.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push(EdgeLink {
					src,
					tgt,
					style: edge.clone(),
				});
			}
		}

		let mut state = Self {
			graph,
			edges,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			ticks: 0,
		};
		state.reset_zoom();
		state
	}

	/// Current position and radius of every node.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(
				node.index(),
				(
					node.x() as f64,
					node.y() as f64,
					node.data.user_data.radius,
				),
			);
		});
		out
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = node.data.user_data.radius.max(MIN_HIT_RADIUS);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for link in &self.edges {
				if link.src == idx {
					self.hover.neighbors.insert(link.tgt);
				} else if link.tgt == idx {
					self.hover.neighbors.insert(link.src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Tooltip for the hovered node, if any.
	pub fn tooltip(&self) -> Option<(String, f64, f64)> {
		let idx = self.hover.node?;
		let mut out = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				out = Some((
					node.data.user_data.tooltip.clone(),
					node.x() as f64,
					node.y() as f64,
				));
			}
		});
		out
	}

	/// Pointer went down at a screen position: grab the node under it, or
	/// start panning.
	pub fn press(&mut self, x: f64, y: f64) {
		match self.node_at_position(x, y) {
			Some(idx) => {
				self.drag = DragState {
					active: true,
					node_idx: Some(idx),
					start_x: x,
					start_y: y,
					..DragState::default()
				};
				let drag = &mut self.drag;
				self.graph.visit_nodes(|node| {
					if node.index() == idx {
						drag.node_start_x = node.x();
						drag.node_start_y = node.y();
					}
				});
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	/// Pointer moved. Drags pin the node they move. Returns whether a node is
	/// under the pointer.
	pub fn pointer_moved(&mut self, x: f64, y: f64) -> bool {
		if let (true, Some(idx)) = (self.drag.active, self.drag.node_idx) {
			let (nx, ny) = (
				self.drag.node_start_x + ((x - self.drag.start_x) / self.transform.k) as f32,
				self.drag.node_start_y + ((y - self.drag.start_y) / self.transform.k) as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
			return true;
		}

		let hovered = self.node_at_position(x, y);
		self.set_hover(hovered);
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
		hovered.is_some()
	}

	pub fn release(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// Zoom by one wheel notch, keeping the point under the cursor fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = k;
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		if self.ticks < SETTLE_TICKS {
			self.ticks += 1;
			if self.ticks == SETTLE_TICKS {
				self.fit();
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Scale 1, graph origin in the middle of the canvas.
	pub fn reset_zoom(&mut self) {
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k: 1.0,
		};
	}

	/// Frame every node with a small margin.
	pub fn fit(&mut self) {
		let positions = self.positions();
		if positions.is_empty() {
			return;
		}
		let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
		let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
		for (x, y, r) in positions.values() {
			min_x = min_x.min(x - r);
			min_y = min_y.min(y - r);
			max_x = max_x.max(x + r);
			max_y = max_y.max(y + r);
		}
		let (bw, bh) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let k = ((self.width / bw).min(self.height / bh) * 0.9).clamp(MIN_ZOOM, 2.0);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphView;
	use crate::types::{RawEdge, RawGraph, RawNode};

	fn graph() -> StyledGraph {
		let node = |id: &str, kind: &str| RawNode {
			id: id.into(),
			kind: kind.into(),
			label: Some(id.to_uppercase()),
			title: None,
			name: None,
		};
		let raw = RawGraph {
			nodes: Some(vec![node("u1", "user"), node("b1", "book"), node("b2", "book")]),
			edges: Some(vec![
				RawEdge {
					source: "u1".into(),
					target: "b1".into(),
					kind: Some("rated".into()),
					weight: Some(1.0),
				},
				RawEdge {
					source: "u1".into(),
					target: "missing".into(),
					kind: None,
					weight: None,
				},
			]),
		};
		GraphView::build(raw).unwrap().styled().clone()
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let state = ForceGraphState::new(&graph(), Layout::Force, 800.0, 600.0);
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.positions().len(), 3);
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut state = ForceGraphState::new(&graph(), Layout::Circular, 800.0, 600.0);
		let link = state.edges[0].clone();
		state.set_hover(Some(link.src));
		assert!(state.hover.neighbors.contains(&link.tgt));
		assert!(state.is_highlighted(link.tgt));
		assert!(state.tooltip().unwrap().0.contains("Connections: 2"));

		state.set_hover(None);
		assert!(state.is_hovered(link.src));
		assert!(state.tooltip().is_none());
	}

	#[test]
	fn fit_keeps_nodes_on_screen() {
		let mut state = ForceGraphState::new(&graph(), Layout::Hierarchical, 800.0, 600.0);
		state.fit();
		for (x, y, _) in state.positions().values() {
			let sx = x * state.transform.k + state.transform.x;
			let sy = y * state.transform.k + state.transform.y;
			assert!((0.0..=800.0).contains(&sx));
			assert!((0.0..=600.0).contains(&sy));
		}
		state.reset_zoom();
		assert_eq!(state.transform.k, 1.0);
		assert_eq!(state.transform.x, 400.0);
	}

	#[test]
	fn dragging_pins_the_node() {
		let mut state = ForceGraphState::new(&graph(), Layout::Force, 800.0, 600.0);
		let (idx, (x, y, _)) = state
			.positions()
			.into_iter()
			.next()
			.expect("graph has nodes");
		let (sx, sy) = (x + state.transform.x, y + state.transform.y);

		state.press(sx, sy);
		assert!(state.drag.active);
		assert!(state.pointer_moved(sx + 30.0, sy));
		state.release();
		assert!(!state.drag.active);

		let mut moved = None;
		state.graph.visit_nodes(|node| {
			if node.index() == idx {
				moved = Some((node.x() as f64, node.data.is_anchor));
			}
		});
		let (nx, anchored) = moved.expect("node still present");
		assert!((nx - (x + 30.0)).abs() < 1e-3);
		assert!(anchored);
	}

	#[test]
	fn background_drag_pans_and_wheel_zooms_about_cursor() {
		let mut state = ForceGraphState::new(&graph(), Layout::Force, 800.0, 600.0);
		state.press(5.0, 5.0);
		assert!(state.pan.active);
		state.pointer_moved(25.0, 15.0);
		assert_eq!((state.transform.x, state.transform.y), (420.0, 310.0));
		state.release();

		let before = state.screen_to_graph(100.0, 100.0);
		state.zoom_at(100.0, 100.0, -1.0);
		let after = state.screen_to_graph(100.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		for _ in 0..100 {
			state.zoom_at(0.0, 0.0, 1.0);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
	}
}
