use leptos::prelude::*;

use crate::state::use_app_state;

/// The single transient message at the top of the page.
#[component]
pub fn Toast() -> impl IntoView {
	let app = use_app_state();

	move || {
		app.notice.get().map(|notice| {
			view! { <div class=notice.kind.class() role="status">{notice.message}</div> }
		})
	}
}
