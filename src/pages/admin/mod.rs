//! Admin panel: evaluation metrics, the user table and the graph explorer.

mod graph;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};

use crate::api::HttpError;
use crate::router::Page;
use crate::sequence::RequestSeq;
use crate::state::{AppState, use_app_state};
use crate::types::{AnalyticsUser, AtK, MetricsReport, RmseRow};
use graph::GraphExplorer;

/// Cutoffs shown for the ranking metrics.
const CUTOFFS: [&str; 4] = ["5", "10", "20", "50"];

/// What an admin call failure means for the page.
#[derive(Debug, PartialEq)]
pub(crate) enum Fallout {
	/// Not an admin: leave the page.
	Denied,
	/// Token rejected; the session rule already handled it.
	SessionEnded,
	/// Anything else: report and stay.
	Report(String),
}

pub(crate) fn fallout(err: &HttpError, generic: &str) -> Fallout {
	match err {
		HttpError::Forbidden { .. } => Fallout::Denied,
		HttpError::AuthExpired => Fallout::SessionEnded,
		other => Fallout::Report(other.user_message(generic)),
	}
}

/// Notify about a failed admin call and redirect away on a 403.
pub(crate) fn report_failure(app: AppState, err: &HttpError, generic: &str) {
	error!("{}: {} (status {:?})", generic, err, err.status());
	match fallout(err, generic) {
		Fallout::Denied => {
			app.notify_error(err.to_string());
			app.show_page(Page::Books);
		}
		Fallout::SessionEnded => {}
		Fallout::Report(message) => app.notify_error(message),
	}
}

pub(crate) fn fmt_metric(value: Option<f64>) -> String {
	value.map_or_else(|| "N/A".to_string(), |v| format!("{:.4}", v))
}

pub(crate) fn fmt_at_k(values: &AtK, k: &str) -> String {
	fmt_metric(values.get(k).copied().flatten())
}

pub(crate) fn fmt_coverage(value: Option<f64>) -> String {
	value.map_or_else(|| "N/A".to_string(), |v| format!("{}%", v))
}

/// Display cells of one RMSE sample row.
#[derive(Debug, PartialEq)]
pub(crate) struct RmseCells {
	pub user: String,
	pub book: String,
	pub actual: String,
	pub predicted: String,
	pub error: String,
	/// Prediction missed by more than a whole rating point.
	pub large: bool,
}

impl RmseCells {
	pub fn from_row(row: &RmseRow) -> Self {
		let user: String = row.user_id.chars().take(8).collect();
		Self {
			user: format!("{}...", user),
			book: row.book_id.clone(),
			actual: format!("{:.3}", row.actual),
			predicted: format!("{:.3}", row.predicted),
			error: format!("{}{:.3}", if row.error > 0.0 { "+" } else { "" }, row.error),
			large: row.error.abs() > 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Load<T> {
	Loading,
	Ready(T),
	Failed(String),
}

fn precision(r: &MetricsReport) -> &AtK {
	&r.metrics.precision_at_k
}

fn recall(r: &MetricsReport) -> &AtK {
	&r.metrics.recall_at_k
}

fn ndcg(r: &MetricsReport) -> &AtK {
	&r.metrics.ndcg_at_k
}

fn check(flag: bool) -> &'static str {
	if flag { "✓" } else { "✗" }
}

#[component]
fn MetricCard(label: String, #[prop(into)] value: Signal<String>) -> impl IntoView {
	view! {
		<div class="metric-card">
			<div class="metric-label">{label}</div>
			<div class="metric-value">{move || value.get()}</div>
		</div>
	}
}

#[component]
fn MetricsSection(report: Signal<Load<MetricsReport>>) -> impl IntoView {
	let read = move |f: fn(&MetricsReport) -> String| {
		Signal::derive(move || match report.get() {
			Load::Ready(r) => f(&r),
			Load::Loading => "...".to_string(),
			Load::Failed(_) => "N/A".to_string(),
		})
	};

	let at_k = move |name: &'static str, pick: fn(&MetricsReport) -> &AtK| {
		CUTOFFS
			.into_iter()
			.map(|k| {
				let value = Signal::derive(move || match report.get() {
					Load::Ready(r) => fmt_at_k(pick(&r), k),
					Load::Loading => "...".to_string(),
					Load::Failed(_) => "N/A".to_string(),
				});
				view! { <MetricCard label=format!("{}@{}", name, k) value=value /> }
			})
			.collect_view()
	};

	let rmse_rows = move || match report.get() {
		Load::Ready(r) if !r.metrics.rmse_table.is_empty() => r
			.metrics
			.rmse_table
			.iter()
			.map(RmseCells::from_row)
			.map(|cells| {
				view! {
					<tr>
						<td>{cells.user}</td>
						<td>{cells.book}</td>
						<td class="num">{cells.actual}</td>
						<td class="num">{cells.predicted}</td>
						<td class="num" class:error-high=cells.large>
							{cells.error}
						</td>
					</tr>
				}
			})
			.collect_view()
			.into_any(),
		Load::Loading => view! {
			<tr>
				<td colspan="5" class="loading">"Loading..."</td>
			</tr>
		}
		.into_any(),
		_ => view! {
			<tr>
				<td colspan="5" class="loading">"No RMSE data available"</td>
			</tr>
		}
		.into_any(),
	};

	view! {
		<section class="metrics">
			<h3>"Rating prediction"</h3>
			<div class="metrics-grid">
				<MetricCard label="RMSE".to_string() value=read(|r| fmt_metric(r.metrics.rmse)) />
				<MetricCard label="MAE".to_string() value=read(|r| fmt_metric(r.metrics.mae)) />
			</div>
			<h3>"Ranking"</h3>
			<div class="metrics-grid">{at_k("Precision", precision)}</div>
			<div class="metrics-grid">{at_k("Recall", recall)}</div>
			<div class="metrics-grid">{at_k("nDCG", ndcg)}</div>
			<h3>"Catalogue"</h3>
			<div class="metrics-grid">
				<MetricCard label="Users".to_string() value=read(|r| r.counts.users.to_string()) />
				<MetricCard label="Books".to_string() value=read(|r| r.counts.books.to_string()) />
				<MetricCard
					label="Interactions".to_string()
					value=read(|r| r.counts.interactions.to_string())
				/>
				<MetricCard
					label="Content coverage".to_string()
					value=read(|r| fmt_coverage(r.coverage.content_embeddings))
				/>
				<MetricCard
					label="CF coverage".to_string()
					value=read(|r| fmt_coverage(r.coverage.cf_embeddings))
				/>
				<MetricCard
					label="GNN coverage".to_string()
					value=read(|r| fmt_coverage(r.coverage.gnn_vectors))
				/>
			</div>
			<h3>"RMSE sample"</h3>
			<table class="data-table">
				<thead>
					<tr>
						<th>"User"</th>
						<th>"Book"</th>
						<th>"Actual"</th>
						<th>"Predicted"</th>
						<th>"Error"</th>
					</tr>
				</thead>
				<tbody>{rmse_rows}</tbody>
			</table>
		</section>
	}
}

#[component]
fn UsersTable(users: Signal<Load<Vec<AnalyticsUser>>>) -> impl IntoView {
	let rows = move || match users.get() {
		Load::Loading => view! {
			<tr>
				<td colspan="5" class="loading">"Loading users..."</td>
			</tr>
		}
		.into_any(),
		Load::Failed(message) => view! {
			<tr>
				<td colspan="5" class="loading">{message}</td>
			</tr>
		}
		.into_any(),
		Load::Ready(users) => users
			.into_iter()
			.map(|u| {
				let name = crate::types::full_name(u.first_name.as_deref(), u.last_name.as_deref());
				let name = if name.is_empty() { "-".to_string() } else { name };
				view! {
					<tr>
						<td>{u.email}</td>
						<td>{name}</td>
						<td class="num">{u.interaction_count}</td>
						<td>{check(u.has_cf_vector)}</td>
						<td>{check(u.has_kyc_embedding)}</td>
					</tr>
				}
			})
			.collect_view()
			.into_any(),
	};

	view! {
		<section class="users">
			<h3>"Users"</h3>
			<table class="data-table">
				<thead>
					<tr>
						<th>"Email"</th>
						<th>"Name"</th>
						<th>"Interactions"</th>
						<th>"CF Vector"</th>
						<th>"KYC Embedding"</th>
					</tr>
				</thead>
				<tbody>{rows}</tbody>
			</table>
		</section>
	}
}

/// Admin panel. Loads metrics, then users, each time it is shown.
#[component]
pub fn AdminPage() -> impl IntoView {
	let app = use_app_state();
	let report = RwSignal::new(Load::<MetricsReport>::Loading);
	let users = RwSignal::new(Load::<Vec<AnalyticsUser>>::Loading);
	let seq = RequestSeq::new();

	let refresh = move || {
		let ticket = seq.issue();
		let seq = seq.clone();
		let config = app.config();
		report.set(Load::Loading);
		users.set(Load::Loading);

		spawn_local(async move {
			let metrics = app.settle(
				app.api()
					.metrics(config.metrics_k, config.metrics_min_interactions)
					.await,
			);
			if !seq.is_current(ticket) {
				debug!("Dropping stale metrics");
				return;
			}
			match metrics {
				Ok(r) => report.set(Load::Ready(r)),
				Err(err) => {
					report.set(Load::Failed(err.user_message("Error loading metrics")));
					report_failure(app, &err, "Error loading metrics");
					if !matches!(fallout(&err, ""), Fallout::Report(_)) {
						return;
					}
				}
			}

			let listed = app.settle(app.api().analytics_users(config.users_limit).await);
			if !seq.is_current(ticket) {
				debug!("Dropping stale user list");
				return;
			}
			match listed {
				Ok(r) => users.set(Load::Ready(r.users)),
				Err(err) => {
					users.set(Load::Failed("Error loading users".to_string()));
					report_failure(app, &err, "Error loading users");
				}
			}
		});
	};

	let on_show = refresh.clone();
	Effect::new(move |_| {
		if app.page.get() == Page::Admin && app.is_admin.get() {
			on_show();
		}
	});

	let user_list = Signal::derive(move || match users.get() {
		Load::Ready(list) => list,
		_ => Vec::new(),
	});

	view! {
		<div class="admin-page">
			<div class="section-header">
				<h2>"Admin Dashboard"</h2>
				<button class="btn-secondary" on:click=move |_| refresh()>
					"Refresh Metrics"
				</button>
			</div>
			<MetricsSection report=report.into() />
			<UsersTable users=users.into() />
			<h3>"Interaction Graph"</h3>
			<GraphExplorer users=user_list />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forbidden_redirects_without_ending_session() {
		let forbidden = HttpError::Forbidden {
			detail: "Not an admin".into(),
		};
		assert_eq!(fallout(&forbidden, "Error loading metrics"), Fallout::Denied);
		assert!(!forbidden.clears_session());
		assert_eq!(forbidden.to_string(), "Admin access required");
		assert_eq!(
			fallout(&HttpError::AuthExpired, "Error loading metrics"),
			Fallout::SessionEnded
		);
		assert_eq!(
			fallout(&HttpError::Network("offline".into()), "Error loading metrics"),
			Fallout::Report("Error loading metrics".into())
		);
	}

	#[test]
	fn forbidden_admin_call_sends_user_to_books() {
		let (_owner, store, app) = crate::state::test_state(Some("tok"));
		app.show_page(Page::Admin);
		let forbidden = HttpError::Forbidden {
			detail: "Not an admin".into(),
		};
		report_failure(app, &forbidden, "Error loading metrics");

		assert_eq!(app.page.get_untracked(), Page::Books);
		assert_eq!(
			app.notice.get_untracked().map(|n| n.message).as_deref(),
			Some("Admin access required")
		);
		assert!(app.is_authenticated());
		assert_eq!(store.load().as_deref(), Some("tok"));
	}

	#[test]
	fn other_admin_failures_stay_on_the_page() {
		let (_owner, _store, app) = crate::state::test_state(Some("tok"));
		app.show_page(Page::Admin);
		report_failure(
			app,
			&HttpError::Network("offline".into()),
			"Error loading users",
		);
		assert_eq!(app.page.get_untracked(), Page::Admin);
		assert_eq!(
			app.notice.get_untracked().map(|n| n.message).as_deref(),
			Some("Error loading users")
		);
	}

	#[test]
	fn metrics_format_to_four_places_or_na() {
		assert_eq!(fmt_metric(Some(0.912345)), "0.9123");
		assert_eq!(fmt_metric(None), "N/A");

		let mut at_k = AtK::new();
		at_k.insert("5".into(), Some(0.25));
		at_k.insert("10".into(), None);
		assert_eq!(fmt_at_k(&at_k, "5"), "0.2500");
		assert_eq!(fmt_at_k(&at_k, "10"), "N/A");
		assert_eq!(fmt_at_k(&at_k, "50"), "N/A");

		assert_eq!(fmt_coverage(Some(85.5)), "85.5%");
		assert_eq!(fmt_coverage(Some(100.0)), "100%");
		assert_eq!(fmt_coverage(None), "N/A");
	}

	#[test]
	fn rmse_row_cells() {
		let cells = RmseCells::from_row(&RmseRow {
			user_id: "3f2a9c1e-aaaa-bbbb".into(),
			book_id: "42".into(),
			actual: 4.0,
			predicted: 2.75,
			error: 1.25,
		});
		assert_eq!(cells.user, "3f2a9c1e...");
		assert_eq!(cells.actual, "4.000");
		assert_eq!(cells.predicted, "2.750");
		assert_eq!(cells.error, "+1.250");
		assert!(cells.large);

		let small = RmseCells::from_row(&RmseRow {
			user_id: "u".into(),
			book_id: "7".into(),
			actual: 3.0,
			predicted: 3.5,
			error: -0.5,
		});
		assert_eq!(small.error, "-0.500");
		assert!(!small.large);
	}
}
