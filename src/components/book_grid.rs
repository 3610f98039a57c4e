use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use crate::api::HttpError;
use crate::notify::NoticeKind;
use crate::state::{AppState, AuthMode, use_app_state};
use crate::types::{Book, InteractionKind};

/// What a book grid currently shows.
#[derive(Clone, Debug, PartialEq)]
pub enum BookList {
	Loading(String),
	Ready(Vec<Book>),
	/// Empty result or failure, explained in words.
	Placeholder(String),
}

impl BookList {
	pub fn loading(message: &str) -> Self {
		BookList::Loading(message.to_string())
	}

	/// Never an empty `Ready`; an empty result becomes `empty_message`.
	pub fn from_books(books: Vec<Book>, empty_message: &str) -> Self {
		if books.is_empty() {
			BookList::Placeholder(empty_message.to_string())
		} else {
			BookList::Ready(books)
		}
	}
}

/// Toast for a finished interaction request. Views stay quiet either way,
/// and a rejected token is announced by the session rule instead.
fn interaction_notice(
	kind: InteractionKind,
	result: &Result<(), HttpError>,
) -> Option<(String, NoticeKind)> {
	match (kind, result) {
		(InteractionKind::View, _) | (_, Err(HttpError::AuthExpired)) => None,
		(InteractionKind::Like, Ok(())) => Some(("Book liked!".to_string(), NoticeKind::Success)),
		(InteractionKind::Rate, Ok(())) => Some(("Rating saved!".to_string(), NoticeKind::Success)),
		(_, Err(err)) => Some((
			err.user_message("Could not save your interaction"),
			NoticeKind::Error,
		)),
	}
}

/// Record an interaction in the background.
///
/// Likes and ratings from a guest open the login form; views from guests are
/// dropped.
pub fn record_interaction(app: AppState, book_id: i64, kind: InteractionKind, rating: Option<u8>) {
	if !app.is_authenticated() {
		if kind != InteractionKind::View {
			app.open_auth(AuthMode::Login);
		}
		return;
	}
	spawn_local(async move {
		let result = app
			.settle(app.api().interact(book_id, kind, rating).await)
			.map(|_| ());
		match &result {
			Ok(()) => debug!("Recorded {:?} for book {}", kind, book_id),
			Err(err) => warn!("Failed to record {:?} for book {}: {}", kind, book_id, err),
		}
		if let Some((message, tone)) = interaction_notice(kind, &result) {
			app.notify(message, tone);
		}
	});
}

#[component]
fn BookCard(book: Book) -> impl IntoView {
	let app = use_app_state();
	let id = book.id;
	let author = book
		.author
		.clone()
		.filter(|a| !a.is_empty())
		.unwrap_or_else(|| "Unknown Author".to_string());
	let description = book.description_text();

	let on_rate = move |ev: leptos::ev::Event| {
		if let Ok(rating) = event_target_value(&ev).parse::<u8>() {
			record_interaction(app, id, InteractionKind::Rate, Some(rating));
		}
	};

	view! {
		<div class="book-card">
			<h3>{book.title}</h3>
			<p class="author">"by " {author}</p>
			{book
				.published_date
				.map(|date| view! { <p class="published-date">"Published: " {date}</p> })}
			<p class="description">{description}</p>
			{(!book.genres.is_empty())
				.then(|| {
					view! {
						<div class="genres">
							{book
								.genres
								.into_iter()
								.map(|g| view! { <span class="genre-tag">{g}</span> })
								.collect_view()}
						</div>
					}
				})}
			<div class="book-actions">
				<button class="btn-view" on:click=move |_| app.open_book(id)>
					"View Details"
				</button>
				<button
					class="btn-like"
					on:click=move |_| record_interaction(app, id, InteractionKind::Like, None)
				>
					"Like"
				</button>
				<select class="btn-rate" on:change=on_rate>
					<option value="">"Rate"</option>
					{(1..=5u8)
						.map(|r| view! { <option value=r.to_string()>{"★".repeat(r as usize)}</option> })
						.collect_view()}
				</select>
			</div>
			{book
				.info_link
				.map(|href| {
					view! {
						<a href=href target="_blank" rel="noopener" class="read-more-link">
							"Read More →"
						</a>
					}
				})}
		</div>
	}
}

/// Grid of book cards, or the placeholder standing in for them.
#[component]
pub fn BookGrid(#[prop(into)] list: Signal<BookList>, #[prop(into)] class: String) -> impl IntoView {
	view! {
		<div class=class>
			{move || match list.get() {
				BookList::Loading(message) | BookList::Placeholder(message) => {
					view! { <p class="loading">{message}</p> }.into_any()
				}
				BookList::Ready(books) => {
					books
						.into_iter()
						.map(|book| view! { <BookCard book=book /> })
						.collect_view()
						.into_any()
				}
			}}
		</div>
	}
}
