//! Runtime configuration for the client.
//!
//! Only the API base URL is configurable; it is read from the `data-api-url`
//! attribute on the document root.

use log::debug;

/// Backend used when the page does not configure one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Books per page in the catalogue grid.
pub const PAGE_LIMIT: u32 = 12;

/// Number of recommendations requested per refresh.
pub const RECOMMENDATION_LIMIT: u32 = 20;

/// How long a notification stays on screen.
pub const NOTIFICATION_MS: u64 = 5_000;

/// `localStorage` key holding the bearer token.
pub const TOKEN_STORAGE_KEY: &str = "authToken";

/// Client configuration, provided as context at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	/// Base URL of the backend, without a trailing slash.
	pub api_url: String,
	/// `k` passed to the metrics endpoint.
	pub metrics_k: u32,
	/// Minimum interactions for a user to count towards metrics.
	pub metrics_min_interactions: u32,
	/// Users listed in the admin table.
	pub users_limit: u32,
	/// User cap for the overview graph.
	pub overview_max_users: u32,
	/// Book cap for the overview graph.
	pub overview_max_books: u32,
	/// Book cap for a single user's neighbourhood graph.
	pub user_graph_max_books: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self::with_api_url(DEFAULT_API_URL)
	}
}

impl Config {
	/// Build a config with the default limits and the given backend.
	pub fn with_api_url(url: &str) -> Self {
		Self {
			api_url: url.trim_end_matches('/').to_string(),
			metrics_k: 10,
			metrics_min_interactions: 5,
			users_limit: 100,
			overview_max_users: 50,
			overview_max_books: 100,
			user_graph_max_books: 20,
		}
	}

	/// Read the config from the current document.
	pub fn from_document() -> Self {
		let url = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.document_element())
			.and_then(|root| root.get_attribute("data-api-url"))
			.filter(|url| !url.trim().is_empty());

		match url {
			Some(url) => {
				debug!("Using API base URL from document: {}", url);
				Self::with_api_url(&url)
			}
			None => Self::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trailing_slash_is_stripped() {
		let config = Config::with_api_url("https://books.example.com/");
		assert_eq!(config.api_url, "https://books.example.com");
	}

	#[test]
	fn default_points_at_local_backend() {
		let config = Config::default();
		assert_eq!(config.api_url, DEFAULT_API_URL);
		assert_eq!(config.metrics_k, 10);
		assert_eq!(config.overview_max_books, 100);
	}
}
