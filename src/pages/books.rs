use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, warn};

use crate::api::{BookQuery, HttpError};
use crate::components::book_grid::{BookGrid, BookList};
use crate::router::{Cursor, Page};
use crate::sequence::RequestSeq;
use crate::state::use_app_state;
use crate::types::Book;

/// Grid content and error toast for a finished catalogue request.
fn listing(result: Result<Vec<Book>, HttpError>) -> (BookList, Option<String>) {
	match result {
		Ok(books) => (BookList::from_books(books, "No books found"), None),
		Err(err) => {
			let message = err.user_message("Error loading books");
			(BookList::Placeholder(message.clone()), Some(message))
		}
	}
}

/// Catalogue browser with filters and paging.
#[component]
pub fn BooksPage() -> impl IntoView {
	let app = use_app_state();
	let search = RwSignal::new(String::new());
	let author = RwSignal::new(String::new());
	let genre = RwSignal::new(String::new());
	let cursor = RwSignal::new(Cursor::default());
	let genres = RwSignal::new(Vec::<String>::new());
	let list = RwSignal::new(BookList::loading("Loading books..."));
	let seq = RequestSeq::new();

	let load = move || {
		let query = BookQuery {
			search: search.get_untracked(),
			author: author.get_untracked(),
			genre: genre.get_untracked(),
			cursor: cursor.get_untracked(),
		};
		let ticket = seq.issue();
		let seq = seq.clone();
		list.set(BookList::loading("Loading books..."));

		spawn_local(async move {
			// Public endpoint: a failure here never ends the session.
			let result = app.api().books(&query).await;
			if !seq.is_current(ticket) {
				debug!("Dropping stale page {}", query.cursor.page());
				return;
			}
			match &result {
				Ok(books) => debug!("Page {}: {} books", query.cursor.page(), books.len()),
				Err(err) => error!("Loading books failed: {}", err),
			}
			let (next, failure) = listing(result);
			list.set(next);
			if let Some(message) = failure {
				app.notify_error(message);
			}
		});
	};

	spawn_local(async move {
		match app.api().genres().await {
			Ok(names) => genres.set(names),
			Err(err) => warn!("Could not load genres: {}", err),
		}
	});

	let on_show = load.clone();
	Effect::new(move |_| {
		if app.page.get() == Page::Books {
			on_show();
		}
	});

	let on_search = {
		let load = load.clone();
		move |ev: SubmitEvent| {
			ev.prevent_default();
			cursor.update(Cursor::reset);
			load();
		}
	};
	let on_prev = {
		let load = load.clone();
		move |_: MouseEvent| {
			let mut moved = false;
			cursor.update(|c| moved = c.prev());
			if moved {
				load();
			}
		}
	};
	let on_next = move |_: MouseEvent| {
		cursor.update(Cursor::next);
		load();
	};

	view! {
		<div class="books-page">
			<form class="search-bar" on:submit=on_search>
				<input
					type="text"
					placeholder="Search books..."
					prop:value=move || search.get()
					on:input=move |ev| search.set(event_target_value(&ev))
				/>
				<input
					type="text"
					placeholder="Author"
					prop:value=move || author.get()
					on:input=move |ev| author.set(event_target_value(&ev))
				/>
				<select
					prop:value=move || genre.get()
					on:change=move |ev| genre.set(event_target_value(&ev))
				>
					<option value="">"All genres"</option>
					{move || {
						genres
							.get()
							.into_iter()
							.map(|g| {
								let value = g.clone();
								view! { <option value=value>{g}</option> }
							})
							.collect_view()
					}}
				</select>
				<button type="submit" class="btn-primary">
					"Search"
				</button>
			</form>
			<BookGrid list=list class="books-grid" />
			<div class="pagination">
				<button
					class="btn-secondary"
					prop:disabled=move || !cursor.get().has_prev()
					on:click=on_prev
				>
					"Previous"
				</button>
				<span class="page-info">{move || format!("Page {}", cursor.get().page())}</span>
				<button class="btn-secondary" on:click=on_next>
					"Next"
				</button>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_page_is_not_an_error() {
		let (list, failure) = listing(Ok(vec![]));
		assert_eq!(list, BookList::Placeholder("No books found".into()));
		assert_eq!(failure, None);
	}

	#[test]
	fn catalogue_failures_are_always_reported() {
		let (list, failure) = listing(Err(HttpError::AuthExpired));
		assert_eq!(
			failure.as_deref(),
			Some("Session expired, please log in again")
		);
		assert_eq!(
			list,
			BookList::Placeholder("Session expired, please log in again".into())
		);

		let (_, failure) = listing(Err(HttpError::Network("refused".into())));
		assert_eq!(failure.as_deref(), Some("Error loading books"));
	}
}
