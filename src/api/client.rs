use gloo_net::http::{Method, RequestBuilder};
use log::{debug, error};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{HttpError, classify};
use crate::config::{Config, PAGE_LIMIT};
use crate::router::Cursor;
use crate::types::{
	Book, InteractionKind, InteractionRequest, LoginRequest, MetricsReport, PreferencesUpdate,
	RawGraph, RecommendRequest, RecommendationsResponse, SignupRequest, TokenResponse, User,
	UsersResponse,
};

/// Query parameters, in the order they are appended to the URL.
pub type Query = Vec<(&'static str, String)>;

/// Filters for the catalogue listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookQuery {
	pub search: String,
	pub author: String,
	pub genre: String,
	pub cursor: Cursor,
}

impl BookQuery {
	/// Query string parameters; blank filters are omitted.
	pub fn params(&self) -> Query {
		let mut params = vec![
			("limit", PAGE_LIMIT.to_string()),
			("offset", self.cursor.offset().to_string()),
		];
		for (key, value) in [
			("search", &self.search),
			("author", &self.author),
			("genre", &self.genre),
		] {
			let value = value.trim();
			if !value.is_empty() {
				params.push((key, value.to_string()));
			}
		}
		params
	}
}

/// Thin client over the recommendation backend.
///
/// Each call states whether it is authenticated; the bearer header is only
/// attached when it is and a token is held.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
	token: Option<String>,
}

impl ApiClient {
	pub fn new(config: &Config, token: Option<String>) -> Self {
		Self {
			base_url: config.api_url.clone(),
			token,
		}
	}

	fn builder(&self, method: Method, path: &str, query: &Query, authenticated: bool) -> RequestBuilder {
		let url = format!("{}{}", self.base_url, path);
		debug!("{} {}", method, url);
		let mut req = RequestBuilder::new(&url).method(method);
		if !query.is_empty() {
			req = req.query(query.iter().map(|(k, v)| (*k, v.as_str())));
		}
		if authenticated {
			if let Some(token) = &self.token {
				req = req.header("Authorization", &format!("Bearer {}", token));
			}
		}
		req
	}

	async fn dispatch<T: DeserializeOwned>(
		&self,
		method: Method,
		path: &str,
		query: Query,
		body: Option<String>,
		authenticated: bool,
	) -> Result<T, HttpError> {
		let req = self.builder(method, path, &query, authenticated);
		let req = match body {
			Some(body) => req
				.header("Content-Type", "application/json")
				.body(body)?,
			None => req.build()?,
		};

		let response = req.send().await.map_err(|e| {
			error!("Request to {} failed: {}", path, e);
			HttpError::Network(e.to_string())
		})?;
		let status = response.status();
		let text = response.text().await.unwrap_or_default();

		if let Err(err) = classify(status, &text) {
			error!("{} returned {}: {}", path, status, err);
			return Err(err);
		}

		let text = if text.trim().is_empty() { "null" } else { text.as_str() };
		serde_json::from_str(text).map_err(|e| HttpError::Decode(e.to_string()))
	}

	async fn get<T: DeserializeOwned>(&self, path: &str, query: Query, authenticated: bool) -> Result<T, HttpError> {
		self.dispatch(Method::GET, path, query, None, authenticated).await
	}

	async fn send<T: DeserializeOwned, B: Serialize>(
		&self,
		method: Method,
		path: &str,
		body: &B,
		authenticated: bool,
	) -> Result<T, HttpError> {
		let body = serde_json::to_string(body).map_err(|e| HttpError::Decode(e.to_string()))?;
		self.dispatch(method, path, Vec::new(), Some(body), authenticated)
			.await
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, HttpError> {
		let body = LoginRequest {
			email: email.to_string(),
			password: password.to_string(),
		};
		self.send(Method::POST, "/auth/login", &body, false).await
	}

	pub async fn signup(&self, body: &SignupRequest) -> Result<TokenResponse, HttpError> {
		self.send(Method::POST, "/auth/signup", body, false).await
	}

	pub async fn me(&self) -> Result<User, HttpError> {
		self.get("/users/me", Vec::new(), true).await
	}

	pub async fn update_preferences(&self, update: &PreferencesUpdate) -> Result<serde_json::Value, HttpError> {
		self.send(Method::PUT, "/users/me/preferences", update, true)
			.await
	}

	pub async fn books(&self, query: &BookQuery) -> Result<Vec<Book>, HttpError> {
		self.get("/books/", query.params(), false).await
	}

	pub async fn book(&self, id: i64) -> Result<Book, HttpError> {
		self.get(&format!("/books/{}", id), Vec::new(), false).await
	}

	pub async fn genres(&self) -> Result<Vec<String>, HttpError> {
		self.get("/books/genres", Vec::new(), false).await
	}

	pub async fn recommend(&self, limit: u32) -> Result<RecommendationsResponse, HttpError> {
		self.send(Method::POST, "/recommend/", &RecommendRequest { limit }, true)
			.await
	}

	pub async fn interact(
		&self,
		book_id: i64,
		kind: InteractionKind,
		rating: Option<u8>,
	) -> Result<serde_json::Value, HttpError> {
		let body = InteractionRequest {
			book_id,
			interaction_type: kind,
			rating,
		};
		self.send(Method::POST, "/interactions/", &body, true).await
	}

	pub async fn metrics(&self, k: u32, min_interactions: u32) -> Result<MetricsReport, HttpError> {
		let query = vec![
			("k", k.to_string()),
			("min_interactions", min_interactions.to_string()),
		];
		self.get("/analytics/metrics", query, true).await
	}

	pub async fn analytics_users(&self, limit: u32) -> Result<UsersResponse, HttpError> {
		self.get("/analytics/users", vec![("limit", limit.to_string())], true)
			.await
	}

	pub async fn graph_overview(&self, max_users: u32, max_books: u32) -> Result<RawGraph, HttpError> {
		let query = vec![
			("max_users", max_users.to_string()),
			("max_books", max_books.to_string()),
		];
		self.get("/analytics/graph/overview", query, true).await
	}

	pub async fn graph_user(&self, user_id: &str, max_books: u32) -> Result<RawGraph, HttpError> {
		self.get(
			&format!("/analytics/graph/user/{}", user_id),
			vec![("max_books", max_books.to_string())],
			true,
		)
		.await
	}
}
