//! Browser client for the Shelfwise book recommendation service.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info, warn};

// Modules
pub mod api;
mod components;
pub mod config;
pub mod graph;
pub mod notify;
mod pages;
pub mod router;
pub mod sequence;
pub mod session;
pub mod state;
pub mod types;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Root component: provides config and state, then routes to the shell.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = config::Config::from_document();
	info!("Using backend at {}", config.api_url);
	let app = state::provide_app_state(config);

	if app.is_authenticated() {
		spawn_local(async move {
			if let Err(err) = app.refresh_current_user().await {
				warn!("Could not restore profile: {}", err);
			}
		});
	}

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Shelfwise" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
