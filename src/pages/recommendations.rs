use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};

use crate::api::HttpError;
use crate::components::book_grid::{BookGrid, BookList};
use crate::config::RECOMMENDATION_LIMIT;
use crate::notify::NoticeKind;
use crate::router::Page;
use crate::sequence::RequestSeq;
use crate::state::{AuthMode, use_app_state};
use crate::types::Book;

const NOTHING_YET: &str = "No recommendations available. Try interacting with some books first!";
const LOAD_FAILED: &str = "Error loading recommendations";

/// Grid content and toast for a finished recommendations request.
#[derive(Debug, PartialEq)]
struct Outcome {
	list: BookList,
	notice: Option<(String, NoticeKind)>,
}

fn outcome(result: Result<Vec<Book>, HttpError>) -> Outcome {
	match result {
		Ok(books) if books.is_empty() => Outcome {
			list: BookList::Placeholder(NOTHING_YET.to_string()),
			notice: Some((NOTHING_YET.to_string(), NoticeKind::Success)),
		},
		Ok(books) => Outcome {
			notice: Some((
				format!("Found {} recommendations!", books.len()),
				NoticeKind::Success,
			)),
			list: BookList::Ready(books),
		},
		// Already announced by the session rule.
		Err(HttpError::AuthExpired) => Outcome {
			list: BookList::Placeholder("Please login to see recommendations".to_string()),
			notice: None,
		},
		Err(err) => {
			let message = match &err {
				HttpError::Network(_) => {
					"Error loading recommendations. Please check if the backend is running."
						.to_string()
				}
				// Server detail, unless it is only the status fallback.
				HttpError::RequestFailed { status, detail } if *detail != format!("Error {}", status) => {
					detail.clone()
				}
				other => other.user_message(LOAD_FAILED),
			};
			Outcome {
				list: BookList::Placeholder(message.clone()),
				notice: Some((message, NoticeKind::Error)),
			}
		}
	}
}

/// Personal recommendations, refreshed whenever the page is shown.
#[component]
pub fn RecommendationsPage() -> impl IntoView {
	let app = use_app_state();
	let list = RwSignal::new(BookList::loading("Loading recommendations..."));
	let seq = RequestSeq::new();

	let load = move || {
		if !app.is_authenticated() {
			app.notify_error("Please login to see recommendations");
			app.open_auth(AuthMode::Login);
			return;
		}
		let ticket = seq.issue();
		let seq = seq.clone();
		list.set(BookList::loading("Loading recommendations..."));

		spawn_local(async move {
			let result = app
				.settle(app.api().recommend(RECOMMENDATION_LIMIT).await)
				.map(|r| r.recommendations);
			if !seq.is_current(ticket) {
				debug!("Dropping stale recommendations");
				return;
			}
			if let Err(err) = &result {
				error!("Recommendations failed: {}", err);
			}
			let Outcome { list: next, notice } = outcome(result);
			list.set(next);
			if let Some((message, kind)) = notice {
				app.notify(message, kind);
			}
		});
	};

	let on_show = load.clone();
	Effect::new(move |_| {
		if app.page.get() == Page::Recommendations {
			on_show();
		}
	});

	view! {
		<div class="recommendations-page">
			<div class="section-header">
				<h2>"Recommended for you"</h2>
				<button class="btn-secondary" on:click=move |_| load()>
					"Refresh"
				</button>
			</div>
			<BookGrid list=list class="books-grid recommendations-grid" />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_result_shows_placeholder_and_notifies() {
		let out = outcome(Ok(vec![]));
		assert_eq!(out.list, BookList::Placeholder(NOTHING_YET.into()));
		assert_eq!(out.notice, Some((NOTHING_YET.into(), NoticeKind::Success)));
	}

	#[test]
	fn results_render_and_are_counted() {
		let books = vec![
			Book {
				id: 1,
				title: "Dune".into(),
				..Default::default()
			},
			Book {
				id: 2,
				title: "Emma".into(),
				..Default::default()
			},
		];
		let out = outcome(Ok(books.clone()));
		assert_eq!(out.list, BookList::Ready(books));
		assert_eq!(
			out.notice,
			Some(("Found 2 recommendations!".into(), NoticeKind::Success))
		);
	}

	#[test]
	fn failures_keep_the_grid_explained() {
		let out = outcome(Err(HttpError::ValidationFailed {
			status: 400,
			detail: "User has no embedding".into(),
		}));
		assert_eq!(out.list, BookList::Placeholder("User has no embedding".into()));
		assert_eq!(
			out.notice,
			Some(("User has no embedding".into(), NoticeKind::Error))
		);

		let out = outcome(Err(HttpError::RequestFailed {
			status: 500,
			detail: "Model not trained".into(),
		}));
		assert_eq!(out.list, BookList::Placeholder("Model not trained".into()));
		assert_ne!(out.list, outcome(Ok(vec![])).list);

		let out = outcome(Err(HttpError::RequestFailed {
			status: 502,
			detail: "Error 502".into(),
		}));
		assert_eq!(out.list, BookList::Placeholder(LOAD_FAILED.into()));
		assert_eq!(out.notice, Some((LOAD_FAILED.into(), NoticeKind::Error)));

		let out = outcome(Err(HttpError::Decode("expected value".into())));
		assert_eq!(out.list, BookList::Placeholder(LOAD_FAILED.into()));

		let out = outcome(Err(HttpError::AuthExpired));
		assert_eq!(out.notice, None);
	}
}
