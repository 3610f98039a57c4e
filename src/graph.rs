//! Styling and filtering of the user/book interaction graph.
//!
//! A [`GraphView`] keeps the snapshot it was built from together with the
//! styled projection of it. Filters are always evaluated against that styled
//! projection, so applying them in any order never compounds.

use std::collections::{HashMap, HashSet};

use crate::types::{RawEdge, RawGraph, RawNode};

pub const USER_BASE_SIZE: f64 = 25.0;
pub const BOOK_BASE_SIZE: f64 = 20.0;
pub const MAX_NODE_SIZE: f64 = 50.0;
pub const MIN_EDGE_WIDTH: f64 = 1.0;
pub const MAX_EDGE_WIDTH: f64 = 5.0;

const LABEL_MAX_CHARS: usize = 30;
const ID_LABEL_CHARS: usize = 20;
const SIMILAR_EDGE: &str = "similar";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	User,
	Book,
}

impl NodeKind {
	/// Anything that is not a user is drawn as a book.
	pub fn parse(kind: &str) -> Self {
		if kind == "user" { NodeKind::User } else { NodeKind::Book }
	}

	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::User => "user",
			NodeKind::Book => "book",
		}
	}

	pub fn base_size(self) -> f64 {
		match self {
			NodeKind::User => USER_BASE_SIZE,
			NodeKind::Book => BOOK_BASE_SIZE,
		}
	}

	pub fn cap(self) -> f64 {
		MAX_NODE_SIZE
	}

	pub fn palette(self) -> Palette {
		match self {
			NodeKind::User => Palette {
				fill: "#6366f1",
				border: "#4f46e5",
				hover: "#818cf8",
			},
			NodeKind::Book => Palette {
				fill: "#ec4899",
				border: "#be185d",
				hover: "#f472b6",
			},
		}
	}

	pub fn shape(self) -> NodeShape {
		match self {
			NodeKind::User => NodeShape::Dot,
			NodeKind::Book => NodeShape::Box,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
	pub fill: &'static str,
	pub border: &'static str,
	pub hover: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	Dot,
	Box,
}

/// Rendered size for a node of `kind` with `degree` edges.
pub fn node_size(kind: NodeKind, degree: usize) -> f64 {
	(kind.base_size() + degree as f64 * 2.0).min(kind.cap())
}

/// Stroke width for an edge weight. Missing or zero weights count as 1.
pub fn edge_width(weight: Option<f64>) -> f64 {
	let weight = weight.filter(|w| w.is_finite() && *w != 0.0).unwrap_or(1.0);
	(weight * 2.0).clamp(MIN_EDGE_WIDTH, MAX_EDGE_WIDTH)
}

/// Cut labels longer than 30 characters down to 27 plus an ellipsis.
pub fn truncate_label(label: &str) -> String {
	if label.chars().count() > LABEL_MAX_CHARS {
		let kept: String = label.chars().take(LABEL_MAX_CHARS - 3).collect();
		format!("{}...", kept)
	} else {
		label.to_string()
	}
}

/// Number of edges touching each node id. A self-loop counts once.
pub fn degrees(edges: &[RawEdge]) -> HashMap<&str, usize> {
	let mut degrees: HashMap<&str, usize> = HashMap::new();
	for edge in edges {
		*degrees.entry(edge.source.as_str()).or_default() += 1;
		if edge.target != edge.source {
			*degrees.entry(edge.target.as_str()).or_default() += 1;
		}
	}
	degrees
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyledNode {
	pub id: String,
	pub kind: NodeKind,
	/// Possibly truncated display label.
	pub label: String,
	/// Hover text with the untruncated title.
	pub tooltip: String,
	pub degree: usize,
	pub size: f64,
	pub palette: Palette,
	pub shape: NodeShape,
	pub font_size: f64,
	pub bold: bool,
}

impl StyledNode {
	fn from_raw(node: &RawNode, degree: usize) -> Self {
		let kind = NodeKind::parse(&node.kind);
		let full = [&node.label, &node.title, &node.name]
			.into_iter()
			.flatten()
			.find(|s| !s.is_empty())
			.cloned()
			.unwrap_or_else(|| node.id.chars().take(ID_LABEL_CHARS).collect());
		let title = node
			.title
			.clone()
			.filter(|t| !t.is_empty())
			.unwrap_or_else(|| full.clone());

		Self {
			id: node.id.clone(),
			kind,
			label: truncate_label(&full),
			tooltip: format!("{}\nType: {}\nConnections: {}", title, node.kind, degree),
			degree,
			size: node_size(kind, degree),
			palette: kind.palette(),
			shape: kind.shape(),
			font_size: if kind == NodeKind::User { 14.0 } else { 12.0 },
			bold: kind == NodeKind::User,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyledEdge {
	pub source: String,
	pub target: String,
	pub label: String,
	pub color: &'static str,
	pub highlight: &'static str,
	pub width: f64,
	pub dashed: bool,
	pub arrow: bool,
}

impl StyledEdge {
	fn from_raw(edge: &RawEdge) -> Self {
		let label = edge.kind.clone().unwrap_or_default();
		let similar = label == SIMILAR_EDGE;
		Self {
			source: edge.source.clone(),
			target: edge.target.clone(),
			color: if similar { "#10b981" } else { "#6b7280" },
			highlight: if similar { "#059669" } else { "#374151" },
			width: edge_width(edge.weight),
			dashed: similar,
			arrow: !similar,
			label,
		}
	}
}

/// Node and edge lists ready for the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledGraph {
	pub nodes: Vec<StyledNode>,
	pub edges: Vec<StyledEdge>,
}

impl StyledGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Node subset to display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeFilter {
	#[default]
	All,
	Users,
	Books,
}

impl NodeFilter {
	pub fn parse(value: &str) -> Self {
		match value {
			"users" => NodeFilter::Users,
			"books" => NodeFilter::Books,
			_ => NodeFilter::All,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			NodeFilter::All => "all",
			NodeFilter::Users => "users",
			NodeFilter::Books => "books",
		}
	}

	fn admits(self, kind: NodeKind) -> bool {
		match self {
			NodeFilter::All => true,
			NodeFilter::Users => kind == NodeKind::User,
			NodeFilter::Books => kind == NodeKind::Book,
		}
	}
}

/// Layout the renderer arranges nodes with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
	#[default]
	Force,
	Hierarchical,
	Circular,
}

impl Layout {
	pub fn parse(value: &str) -> Self {
		match value {
			"hierarchical" => Layout::Hierarchical,
			"circular" => Layout::Circular,
			_ => Layout::Force,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Layout::Force => "force",
			Layout::Hierarchical => "hierarchical",
			Layout::Circular => "circular",
		}
	}
}

/// A fetched snapshot plus its styled projection.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphView {
	nodes: Vec<RawNode>,
	edges: Vec<RawEdge>,
	styled: StyledGraph,
}

impl GraphView {
	/// Style a snapshot. `None` when either list is missing or there are no
	/// nodes to draw.
	pub fn build(raw: RawGraph) -> Option<Self> {
		let (Some(nodes), Some(edges)) = (raw.nodes, raw.edges) else {
			return None;
		};
		if nodes.is_empty() {
			return None;
		}
		let styled = style(&nodes, &edges);
		Some(Self {
			nodes,
			edges,
			styled,
		})
	}

	pub fn styled(&self) -> &StyledGraph {
		&self.styled
	}

	pub fn raw_counts(&self) -> (usize, usize) {
		(self.nodes.len(), self.edges.len())
	}

	/// The subset admitted by `filter`. Edges survive only when both ends do.
	pub fn filtered(&self, filter: NodeFilter) -> StyledGraph {
		if filter == NodeFilter::All {
			return self.styled.clone();
		}
		let nodes: Vec<StyledNode> = self
			.styled
			.nodes
			.iter()
			.filter(|n| filter.admits(n.kind))
			.cloned()
			.collect();
		let keep: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let edges = self
			.styled
			.edges
			.iter()
			.filter(|e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()))
			.cloned()
			.collect();
		StyledGraph { nodes, edges }
	}
}

/// Pure projection from snapshot lists to styled lists.
pub fn style(nodes: &[RawNode], edges: &[RawEdge]) -> StyledGraph {
	let degrees = degrees(edges);
	StyledGraph {
		nodes: nodes
			.iter()
			.map(|n| StyledNode::from_raw(n, degrees.get(n.id.as_str()).copied().unwrap_or(0)))
			.collect(),
		edges: edges.iter().map(StyledEdge::from_raw).collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, kind: &str) -> RawNode {
		RawNode {
			id: id.into(),
			kind: kind.into(),
			label: None,
			title: None,
			name: None,
		}
	}

	fn edge(source: &str, target: &str, kind: &str, weight: Option<f64>) -> RawEdge {
		RawEdge {
			source: source.into(),
			target: target.into(),
			kind: Some(kind.into()),
			weight,
		}
	}

	fn sample() -> RawGraph {
		RawGraph {
			nodes: Some(vec![
				node("u1", "user"),
				node("u2", "user"),
				node("b1", "book"),
				node("b2", "book"),
				node("b3", "book"),
			]),
			edges: Some(vec![
				edge("u1", "b1", "rated", Some(0.9)),
				edge("u1", "b2", "liked", None),
				edge("u2", "b1", "viewed", Some(0.2)),
				edge("b1", "b2", "similar", Some(3.7)),
				edge("u1", "u2", "similar", Some(1.0)),
			]),
		}
	}

	#[test]
	fn degree_counts_edges_touching_node() {
		let raw = sample();
		let edges = raw.edges.clone().unwrap();
		let view = GraphView::build(raw).unwrap();
		for n in &view.styled().nodes {
			let expected = edges
				.iter()
				.filter(|e| e.source == n.id || e.target == n.id)
				.count();
			assert_eq!(n.degree, expected, "degree of {}", n.id);
		}
		let b3 = view.styled().nodes.iter().find(|n| n.id == "b3").unwrap();
		assert_eq!(b3.degree, 0);
	}

	#[test]
	fn size_is_monotonic_and_capped() {
		for kind in [NodeKind::User, NodeKind::Book] {
			let mut prev = 0.0;
			for degree in 0..100 {
				let size = node_size(kind, degree);
				assert!(size >= prev);
				assert!(size <= kind.cap());
				prev = size;
			}
			assert_eq!(node_size(kind, 0), kind.base_size());
			assert_eq!(node_size(kind, 1_000), MAX_NODE_SIZE);
		}
		assert_eq!(node_size(NodeKind::User, 3), 31.0);
		assert_eq!(node_size(NodeKind::Book, 3), 26.0);
	}

	#[test]
	fn edgeless_overview_uses_base_sizes() {
		let raw = RawGraph {
			nodes: Some(vec![node("u1", "user"), node("b1", "book")]),
			edges: Some(vec![]),
		};
		let view = GraphView::build(raw).unwrap();
		for n in &view.styled().nodes {
			assert_eq!(n.degree, 0);
			assert_eq!(n.size, n.kind.base_size());
		}
	}

	#[test]
	fn malformed_or_empty_snapshots_are_rejected() {
		assert!(GraphView::build(RawGraph::default()).is_none());
		assert!(
			GraphView::build(RawGraph {
				nodes: Some(vec![node("u1", "user")]),
				edges: None,
			})
			.is_none()
		);
		assert!(
			GraphView::build(RawGraph {
				nodes: Some(vec![]),
				edges: Some(vec![]),
			})
			.is_none()
		);
	}

	#[test]
	fn filter_round_trip_restores_original() {
		let view = GraphView::build(sample()).unwrap();
		let users = view.filtered(NodeFilter::Users);
		assert_eq!(users.nodes.len(), 2);
		assert_eq!(users.edges.len(), 1);
		assert!(users.nodes.iter().all(|n| n.kind == NodeKind::User));

		let all = view.filtered(NodeFilter::All);
		assert_eq!(&all, view.styled());

		// order does not matter
		let books_after_users = {
			view.filtered(NodeFilter::Users);
			view.filtered(NodeFilter::Books)
		};
		assert_eq!(books_after_users, view.filtered(NodeFilter::Books));
		assert_eq!(books_after_users.edges.len(), 1);
		assert_eq!(books_after_users.nodes.len(), 3);
	}

	#[test]
	fn filtering_keeps_computed_degree() {
		let view = GraphView::build(sample()).unwrap();
		let u1 = view
			.filtered(NodeFilter::Users)
			.nodes
			.into_iter()
			.find(|n| n.id == "u1")
			.unwrap();
		assert_eq!(u1.degree, 3);
	}

	#[test]
	fn edge_styles() {
		let view = GraphView::build(sample()).unwrap();
		let edges = &view.styled().edges;
		assert!(!edges[0].dashed && edges[0].arrow);
		assert_eq!(edges[0].width, 1.8);
		assert_eq!(edges[1].width, 2.0);
		assert_eq!(edges[2].width, MIN_EDGE_WIDTH);
		assert!(edges[3].dashed && !edges[3].arrow);
		assert_eq!(edges[3].width, MAX_EDGE_WIDTH);
		assert_eq!(edges[3].label, "similar");
		assert_eq!(edge_width(Some(0.0)), 2.0);
	}

	#[test]
	fn labels_fall_back_and_truncate() {
		let long = RawNode {
			title: Some("The Hitchhiker's Guide to the Galaxy, Deluxe".into()),
			..node("b9", "book")
		};
		let styled = StyledNode::from_raw(&long, 2);
		assert_eq!(styled.label.chars().count(), 30);
		assert!(styled.label.ends_with("..."));
		assert!(styled.tooltip.starts_with("The Hitchhiker's Guide to the Galaxy, Deluxe\n"));
		assert!(styled.tooltip.ends_with("Type: book\nConnections: 2"));

		let bare = StyledNode::from_raw(&node("0123456789abcdefghijklmnop", "user"), 0);
		assert_eq!(bare.label, "0123456789abcdefghij");
		assert_eq!(truncate_label("short"), "short");
		assert_eq!(truncate_label(&"é".repeat(31)).chars().count(), 30);
	}

	#[test]
	fn unknown_types_draw_as_books() {
		assert_eq!(NodeKind::parse("author"), NodeKind::Book);
		assert_eq!(NodeKind::User.shape(), NodeShape::Dot);
		assert_eq!(NodeFilter::parse("users"), NodeFilter::Users);
		assert_eq!(Layout::parse("circular"), Layout::Circular);
		assert_eq!(Layout::parse("nonsense"), Layout::Force);
	}
}
