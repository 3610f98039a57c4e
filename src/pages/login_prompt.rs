use leptos::prelude::*;

use crate::state::{AuthMode, use_app_state};

/// Landing panel for guests.
#[component]
pub fn LoginPrompt() -> impl IntoView {
	let app = use_app_state();

	view! {
		<div class="login-prompt">
			<h2>"Welcome to Shelfwise"</h2>
			<p>"Sign in to browse the catalogue and get personal book recommendations."</p>
			<div class="auth-buttons">
				<button class="btn-primary" on:click=move |_| app.open_auth(AuthMode::Login)>
					"Login"
				</button>
				<button class="btn-secondary" on:click=move |_| app.open_auth(AuthMode::Signup)>
					"Sign Up"
				</button>
			</div>
		</div>
	}
}
