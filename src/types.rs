//! Wire types exchanged with the recommendation backend.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Accept an identifier sent either as a JSON string or a number.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match serde_json::Value::deserialize(deserializer)? {
		serde_json::Value::String(s) => Ok(s),
		serde_json::Value::Null => Ok(String::new()),
		other => Ok(other.to_string()),
	}
}

/// Token returned by login and signup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
	pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
	pub email: String,
	pub password: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

/// Preference values arrive either as a list or as free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TextList {
	List(Vec<String>),
	Text(String),
}

impl TextList {
	/// Comma-joined form used to pre-fill the preference inputs.
	pub fn joined(&self) -> String {
		match self {
			TextList::List(items) => items.join(", "),
			TextList::Text(text) => text.clone(),
		}
	}
}

/// Stored reading preferences of a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
	#[serde(default)]
	pub genres: Option<TextList>,
	#[serde(default)]
	pub authors: Option<TextList>,
	#[serde(default)]
	pub reading_preferences: Option<String>,
	/// The backend stores reading preferences under this name.
	#[serde(default)]
	pub description: Option<String>,
}

impl Preferences {
	pub fn reading_text(&self) -> Option<&str> {
		self.reading_preferences
			.as_deref()
			.filter(|s| !s.is_empty())
			.or(self.description.as_deref())
	}
}

/// Body of `PUT /users/me/preferences`. Empty fields are left out.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PreferencesUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub genres: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authors: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reading_preferences: Option<String>,
}

impl PreferencesUpdate {
	/// Build an update from the raw form inputs.
	pub fn from_form(genres: &str, authors: &str, reading: &str) -> Self {
		fn split(raw: &str) -> Option<Vec<String>> {
			let items: Vec<String> = raw
				.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(String::from)
				.collect();
			(!items.is_empty()).then_some(items)
		}
		let reading = reading.trim();
		Self {
			genres: split(genres),
			authors: split(authors),
			reading_preferences: (!reading.is_empty()).then(|| reading.to_string()),
		}
	}
}

/// The signed-in user, as returned by `GET /users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
	#[serde(deserialize_with = "id_string")]
	pub id: String,
	pub email: String,
	#[serde(default)]
	pub first_name: Option<String>,
	#[serde(default)]
	pub last_name: Option<String>,
	#[serde(default)]
	pub is_admin: Option<bool>,
	#[serde(default)]
	pub kyc_preferences: Option<Preferences>,
}

impl User {
	pub fn display_name(&self) -> String {
		full_name(self.first_name.as_deref(), self.last_name.as_deref())
	}
}

pub(crate) fn full_name(first: Option<&str>, last: Option<&str>) -> String {
	format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
		.trim()
		.to_string()
}

/// A book as served by the catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Book {
	pub id: i64,
	pub title: String,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub all_authors: Option<Vec<String>>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub genres: Vec<String>,
	#[serde(default)]
	pub published_date: Option<String>,
	#[serde(default)]
	pub publisher: Option<String>,
	#[serde(default)]
	pub ratings_count: Option<u64>,
	#[serde(default)]
	pub image: Option<String>,
	#[serde(default)]
	pub info_link: Option<String>,
	#[serde(default)]
	pub preview_link: Option<String>,
}

impl Book {
	pub fn author_line(&self) -> String {
		match &self.all_authors {
			Some(authors) if !authors.is_empty() => authors.join(", "),
			_ => self
				.author
				.clone()
				.filter(|a| !a.is_empty())
				.unwrap_or_else(|| "Unknown Author".to_string()),
		}
	}

	pub fn description_text(&self) -> String {
		self.description
			.clone()
			.filter(|d| !d.is_empty())
			.unwrap_or_else(|| "No description available".to_string())
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RecommendationsResponse {
	#[serde(default)]
	pub recommendations: Vec<Book>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest {
	pub limit: u32,
}

/// Kind of interaction recorded against a book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
	View,
	Like,
	Rate,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionRequest {
	pub book_id: i64,
	pub interaction_type: InteractionKind,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rating: Option<u8>,
}

/// Metric values keyed by cutoff (`"5"`, `"10"`, ...).
pub type AtK = HashMap<String, Option<f64>>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Metrics {
	#[serde(default)]
	pub rmse: Option<f64>,
	#[serde(default)]
	pub mae: Option<f64>,
	#[serde(default)]
	pub precision_at_k: AtK,
	#[serde(default)]
	pub recall_at_k: AtK,
	#[serde(default)]
	pub ndcg_at_k: AtK,
	#[serde(default)]
	pub rmse_table: Vec<RmseRow>,
}

/// One sampled prediction used to illustrate RMSE.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RmseRow {
	#[serde(deserialize_with = "id_string")]
	pub user_id: String,
	#[serde(deserialize_with = "id_string")]
	pub book_id: String,
	pub actual: f64,
	pub predicted: f64,
	pub error: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Counts {
	#[serde(default)]
	pub users: u64,
	#[serde(default)]
	pub books: u64,
	#[serde(default)]
	pub interactions: u64,
}

/// Embedding coverage, in percent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Coverage {
	#[serde(default)]
	pub content_embeddings: Option<f64>,
	#[serde(default)]
	pub cf_embeddings: Option<f64>,
	#[serde(default)]
	pub gnn_vectors: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsReport {
	#[serde(default)]
	pub metrics: Metrics,
	#[serde(default)]
	pub counts: Counts,
	#[serde(default)]
	pub coverage: Coverage,
}

/// A row of the admin user table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyticsUser {
	#[serde(deserialize_with = "id_string")]
	pub id: String,
	pub email: String,
	#[serde(default)]
	pub first_name: Option<String>,
	#[serde(default)]
	pub last_name: Option<String>,
	#[serde(default)]
	pub interaction_count: u64,
	#[serde(default)]
	pub has_cf_vector: bool,
	#[serde(default)]
	pub has_kyc_embedding: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UsersResponse {
	#[serde(default)]
	pub users: Vec<AnalyticsUser>,
}

/// Graph node as sent by the analytics endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawNode {
	#[serde(deserialize_with = "id_string")]
	pub id: String,
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawEdge {
	#[serde(deserialize_with = "id_string")]
	pub source: String,
	#[serde(deserialize_with = "id_string")]
	pub target: String,
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
	#[serde(default)]
	pub weight: Option<f64>,
}

/// Graph payload. Either list may be missing on a malformed response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawGraph {
	#[serde(default)]
	pub nodes: Option<Vec<RawNode>>,
	#[serde(default)]
	pub edges: Option<Vec<RawEdge>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_and_string_ids_normalise() {
		let graph: RawGraph = serde_json::from_str(
			r#"{"nodes":[{"id":7,"type":"book","title":"Dune"},{"id":"u-1","type":"user"}],
			    "edges":[{"source":"u-1","target":7,"type":"rated","weight":0.8}]}"#,
		)
		.unwrap();
		let nodes = graph.nodes.unwrap();
		assert_eq!(nodes[0].id, "7");
		assert_eq!(nodes[1].id, "u-1");
		assert_eq!(graph.edges.unwrap()[0].target, "7");
	}

	#[test]
	fn preferences_accept_lists_or_text() {
		let prefs: Preferences = serde_json::from_str(
			r#"{"genres":["Fantasy","Horror"],"authors":"Le Guin","description":"slow burns"}"#,
		)
		.unwrap();
		assert_eq!(prefs.genres.as_ref().unwrap().joined(), "Fantasy, Horror");
		assert_eq!(prefs.authors.as_ref().unwrap().joined(), "Le Guin");
		assert_eq!(prefs.reading_text(), Some("slow burns"));
	}

	#[test]
	fn preference_update_drops_empty_fields() {
		let update = PreferencesUpdate::from_form(" Sci-Fi, ,Mystery ", "", "  ");
		assert_eq!(
			update.genres,
			Some(vec!["Sci-Fi".to_string(), "Mystery".to_string()])
		);
		let json = serde_json::to_value(&update).unwrap();
		assert_eq!(json, serde_json::json!({"genres": ["Sci-Fi", "Mystery"]}));
	}

	#[test]
	fn book_defaults() {
		let book: Book = serde_json::from_str(r#"{"id":3,"title":"Untitled"}"#).unwrap();
		assert_eq!(book.author_line(), "Unknown Author");
		assert_eq!(book.description_text(), "No description available");
		assert!(book.genres.is_empty());

		let book = Book {
			author: Some("A".into()),
			all_authors: Some(vec!["A".into(), "B".into()]),
			..book
		};
		assert_eq!(book.author_line(), "A, B");
	}

	#[test]
	fn interaction_body_shape() {
		let body = InteractionRequest {
			book_id: 12,
			interaction_type: InteractionKind::Like,
			rating: None,
		};
		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			serde_json::json!({"book_id": 12, "interaction_type": "like"})
		);
	}
}
