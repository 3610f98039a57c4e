use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};

use super::book_grid::record_interaction;
use crate::api::HttpError;
use crate::sequence::RequestSeq;
use crate::state::use_app_state;
use crate::types::{Book, InteractionKind};

#[derive(Clone, Debug, PartialEq)]
enum Detail {
	Loading,
	Ready(Box<Book>),
}

/// Modal with everything known about the book in `AppState::book_detail`.
#[component]
pub fn BookDetailsModal() -> impl IntoView {
	let app = use_app_state();
	let detail = RwSignal::new(Detail::Loading);
	let seq = RequestSeq::new();

	let close_seq = seq.clone();
	let close = move || {
		close_seq.invalidate();
		app.book_detail.set(None);
	};

	Effect::new(move |_| {
		let Some(id) = app.book_detail.get() else {
			return;
		};
		detail.set(Detail::Loading);
		record_interaction(app, id, InteractionKind::View, None);

		let ticket = seq.issue();
		let seq = seq.clone();
		spawn_local(async move {
			let result = app.settle(app.api().book(id).await);
			if !seq.is_current(ticket) {
				debug!("Dropping stale details for book {}", id);
				return;
			}
			match result {
				Ok(book) => detail.set(Detail::Ready(Box::new(book))),
				Err(HttpError::NotFound { .. }) => {
					app.book_detail.set(None);
					app.notify_error("Book not found");
				}
				Err(err) => {
					error!("Loading book {} failed: {}", id, err);
					app.book_detail.set(None);
					app.notify_error("Error loading book details");
				}
			}
		});
	});

	let body = move || match detail.get() {
		Detail::Loading => view! { <p class="loading">"Loading book details..."</p> }.into_any(),
		Detail::Ready(book) => {
			let book = *book;
			let author = book.author_line();
			let description = book.description_text();
			let alt = book.title.clone();
			let metadata = [
				("Published", book.published_date.clone()),
				("Publisher", book.publisher.clone()),
				("Ratings", book.ratings_count.map(|n| n.to_string())),
			];
			view! {
				<div class="book-details">
					{book
						.image
						.map(|src| {
							view! { <img class="book-cover" src=src alt=alt /> }
						})}
					<h2>{book.title}</h2>
					<p class="author">"by " {author}</p>
					<div class="book-meta">
						{metadata
							.into_iter()
							.filter_map(|(name, value)| value.map(|v| (name, v)))
							.map(|(name, value)| {
								view! {
									<p>
										<strong>{name} ": "</strong>
										{value}
									</p>
								}
							})
							.collect_view()}
					</div>
					<div class="genres">
						{book
							.genres
							.into_iter()
							.map(|g| view! { <span class="genre-tag">{g}</span> })
							.collect_view()}
					</div>
					<p class="description">{description}</p>
					<div class="book-links">
						{book
							.info_link
							.map(|href| {
								view! {
									<a href=href target="_blank" rel="noopener" class="btn-primary">
										"Read More"
									</a>
								}
							})}
						{book
							.preview_link
							.map(|href| {
								view! {
									<a href=href target="_blank" rel="noopener" class="btn-secondary">
										"Preview"
									</a>
								}
							})}
					</div>
				</div>
			}
			.into_any()
		}
	};

	let close_overlay = close.clone();
	view! {
		<Show when=move || app.book_detail.get().is_some()>
			<div class="modal" on:click={
				let close = close_overlay.clone();
				move |_| close()
			}>
				<div class="modal-content modal-wide" on:click=|ev| ev.stop_propagation()>
					<span class="close" on:click={
						let close = close.clone();
						move |_| close()
					}>"×"</span>
					{body}
				</div>
			</div>
		</Show>
	}
}
