use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info};

use super::report_failure;
use crate::components::force_graph::{ForceGraphCanvas, ViewAction, ViewCommand};
use crate::graph::{GraphView, Layout, NodeFilter};
use crate::sequence::RequestSeq;
use crate::state::use_app_state;
use crate::types::{AnalyticsUser, RawGraph};

const EMPTY_GRAPH: &str = "No graph data available";

#[derive(Clone, Debug, PartialEq)]
enum GraphPanel {
	Idle,
	Loading(&'static str),
	Placeholder(String),
	Ready(GraphView),
}

impl GraphPanel {
	fn from_snapshot(raw: RawGraph) -> Self {
		match GraphView::build(raw) {
			Some(view) => GraphPanel::Ready(view),
			None => GraphPanel::Placeholder(EMPTY_GRAPH.to_string()),
		}
	}

	fn view(&self) -> Option<&GraphView> {
		match self {
			GraphPanel::Ready(view) => Some(view),
			_ => None,
		}
	}
}

#[derive(Clone, Debug)]
enum GraphSource {
	Overview,
	User(String),
}

/// Interaction graph explorer on the admin page.
#[component]
pub fn GraphExplorer(#[prop(into)] users: Signal<Vec<AnalyticsUser>>) -> impl IntoView {
	let app = use_app_state();
	let panel = RwSignal::new(GraphPanel::Idle);
	let filter = RwSignal::new(NodeFilter::All);
	let layout = RwSignal::new(Layout::Force);
	let command = RwSignal::new(None::<ViewCommand>);
	let selected = RwSignal::new(String::new());
	let seq = RequestSeq::new();

	let displayed = Memo::new(move |_| {
		let filter = filter.get();
		panel.with(|p| p.view().map(|v| v.filtered(filter)).unwrap_or_default())
	});
	let data = Signal::derive(move || displayed.get());

	let load = move |source: GraphSource| {
		let ticket = seq.issue();
		let seq = seq.clone();
		let config = app.config();
		panel.set(GraphPanel::Loading(match source {
			GraphSource::Overview => "Loading graph...",
			GraphSource::User(_) => "Loading user graph...",
		}));
		spawn_local(async move {
			let api = app.api();
			let result = match &source {
				GraphSource::Overview => {
					api.graph_overview(config.overview_max_users, config.overview_max_books)
						.await
				}
				GraphSource::User(id) => api.graph_user(id, config.user_graph_max_books).await,
			};
			let result = app.settle(result);
			if !seq.is_current(ticket) {
				debug!("Dropping stale {:?} graph", source);
				return;
			}
			match result {
				Ok(raw) => {
					let next = GraphPanel::from_snapshot(raw);
					if let Some(view) = next.view() {
						let (nodes, edges) = view.raw_counts();
						info!("Loaded {:?} graph: {} nodes, {} edges", source, nodes, edges);
					}
					filter.set(NodeFilter::All);
					panel.set(next);
				}
				Err(err) => {
					panel.set(GraphPanel::Placeholder("Error loading graph".to_string()));
					report_failure(app, &err, "Error loading graph");
				}
			}
		});
	};

	let load_overview = {
		let load = load.clone();
		move |_: MouseEvent| load(GraphSource::Overview)
	};
	let load_user = move |_: MouseEvent| {
		let id = selected.get_untracked();
		if id.is_empty() {
			app.notify_error("Please select a user");
			return;
		}
		load(GraphSource::User(id));
	};
	let send = move |action: ViewAction| command.update(|c| *c = Some(ViewCommand::next(*c, action)));

	let canvas_or_placeholder = move || match panel.with(|p| match p {
		GraphPanel::Idle => Some("Load a graph to explore interactions".to_string()),
		GraphPanel::Loading(message) => Some(message.to_string()),
		GraphPanel::Placeholder(message) => Some(message.clone()),
		GraphPanel::Ready(_) => None,
	}) {
		Some(message) => view! { <p class="loading">{message}</p> }.into_any(),
		None => view! { <ForceGraphCanvas data=data layout=layout command=command /> }.into_any(),
	};

	view! {
		<div class="graph-section">
			<div class="graph-controls">
				<select
					prop:value=move || selected.get()
					on:change=move |ev| selected.set(event_target_value(&ev))
				>
					<option value="">"Select a user"</option>
					{move || {
						users
							.get()
							.into_iter()
							.map(|u| {
								let label = format!("{} ({} interactions)", u.email, u.interaction_count);
								view! { <option value=u.id>{label}</option> }
							})
							.collect_view()
					}}
				</select>
				<button class="btn-primary" on:click=load_user>
					"Load User Graph"
				</button>
				<button class="btn-secondary" on:click=load_overview>
					"Load Overview"
				</button>
				<select
					prop:value=move || filter.get().as_str()
					on:change=move |ev| filter.set(NodeFilter::parse(&event_target_value(&ev)))
				>
					<option value="all">"All nodes"</option>
					<option value="users">"Users only"</option>
					<option value="books">"Books only"</option>
				</select>
				<select
					prop:value=move || layout.get().as_str()
					on:change=move |ev| layout.set(Layout::parse(&event_target_value(&ev)))
				>
					<option value="force">"Force-directed"</option>
					<option value="hierarchical">"Hierarchical"</option>
					<option value="circular">"Circular"</option>
				</select>
				<button class="btn-secondary" on:click=move |_| send(ViewAction::ResetZoom)>
					"Reset Zoom"
				</button>
				<button class="btn-secondary" on:click=move |_| send(ViewAction::Fit)>
					"Fit"
				</button>
			</div>
			<div class="graph-stats">
				<span>{move || format!("{} nodes", displayed.with(|g| g.nodes.len()))}</span>
				<span>{move || format!("{} edges", displayed.with(|g| g.edges.len()))}</span>
			</div>
			<div class="graph-container">{canvas_or_placeholder}</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{RawEdge, RawNode};

	fn node(id: &str, kind: &str) -> RawNode {
		RawNode {
			id: id.into(),
			kind: kind.into(),
			label: None,
			title: None,
			name: None,
		}
	}

	#[test]
	fn malformed_or_empty_snapshot_is_a_placeholder() {
		let empty = GraphPanel::Placeholder(EMPTY_GRAPH.into());
		assert_eq!(GraphPanel::from_snapshot(RawGraph::default()), empty);
		assert_eq!(
			GraphPanel::from_snapshot(RawGraph {
				nodes: Some(vec![node("u1", "user")]),
				edges: None,
			}),
			empty
		);
		assert_eq!(
			GraphPanel::from_snapshot(RawGraph {
				nodes: Some(vec![]),
				edges: Some(vec![]),
			}),
			empty
		);
	}

	#[test]
	fn zero_edge_snapshot_still_renders() {
		let panel = GraphPanel::from_snapshot(RawGraph {
			nodes: Some(vec![node("u1", "user"), node("b1", "book")]),
			edges: Some(Vec::<RawEdge>::new()),
		});
		let view = panel.view().expect("graph should render");
		assert_eq!(view.raw_counts(), (2, 0));
		assert!(view.styled().edges.is_empty());
	}
}
