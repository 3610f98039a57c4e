use leptos::ev::MouseEvent;
use leptos::prelude::*;

use crate::components::auth_modal::AuthModal;
use crate::components::book_details::BookDetailsModal;
use crate::components::notification::Toast;
use crate::pages::admin::AdminPage;
use crate::pages::books::BooksPage;
use crate::pages::login_prompt::LoginPrompt;
use crate::pages::profile::ProfilePage;
use crate::pages::recommendations::RecommendationsPage;
use crate::router::Page;
use crate::state::{AuthMode, use_app_state};

#[component]
fn NavButton(page: Page) -> impl IntoView {
	let app = use_app_state();

	view! {
		<button
			class="nav-btn"
			class:active=move || app.page.get() == page
			on:click=move |_| app.show_page(page)
		>
			{page.title()}
		</button>
	}
}

/// The single-screen shell: header, the active panel and the modals.
#[component]
pub fn Home() -> impl IntoView {
	let app = use_app_state();
	let shown = move |page: Page| move || if app.page.get() == page { "block" } else { "none" };

	let on_logout = move |_: MouseEvent| {
		app.logout();
		app.notify_success("Logged out successfully");
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<header class="app-header">
				<h1 class="logo">"Shelfwise"</h1>
				<nav>
					<Show when=move || app.is_authenticated.get()>
						<NavButton page=Page::Books />
						<NavButton page=Page::Recommendations />
						<NavButton page=Page::Profile />
						<Show when=move || app.is_admin.get()>
							<NavButton page=Page::Admin />
						</Show>
					</Show>
				</nav>
				<div class="auth-section">
					<Show
						when=move || app.is_authenticated.get()
						fallback=move || {
							view! {
								<button class="btn-primary" on:click=move |_| app.open_auth(AuthMode::Login)>
									"Login"
								</button>
								<button
									class="btn-secondary"
									on:click=move |_| app.open_auth(AuthMode::Signup)
								>
									"Sign Up"
								</button>
							}
						}
					>
						<span class="user-name">
							{move || {
								app.session
									.with(|s| {
										s.user().map(|u| {
											let name = u.display_name();
											if name.is_empty() { u.email.clone() } else { name }
										})
									})
									.unwrap_or_default()
							}}
						</span>
						<button class="btn-secondary" on:click=on_logout>
							"Logout"
						</button>
					</Show>
				</div>
			</header>

			<Toast />

			<main class="container">
				<section style:display=shown(Page::LoginPrompt)>
					<LoginPrompt />
				</section>
				<section style:display=shown(Page::Books)>
					<BooksPage />
				</section>
				<section style:display=shown(Page::Recommendations)>
					<RecommendationsPage />
				</section>
				<section style:display=shown(Page::Profile)>
					<ProfilePage />
				</section>
				<section style:display=shown(Page::Admin)>
					<AdminPage />
				</section>
			</main>

			<AuthModal />
			<BookDetailsModal />
		</ErrorBoundary>
	}
}
