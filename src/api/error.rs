use serde::Deserialize;
use thiserror::Error;

/// Failure of a backend call, classified by what the caller must do about it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
	/// 401. The token is no longer valid and the session must be dropped.
	#[error("Session expired, please log in again")]
	AuthExpired,

	/// 403.
	#[error("Admin access required")]
	Forbidden { detail: String },

	/// 404.
	#[error("{detail}")]
	NotFound { detail: String },

	/// Any other 4xx; the detail is the server's own message.
	#[error("{detail}")]
	ValidationFailed { status: u16, detail: String },

	/// 5xx.
	#[error("Server error ({status}): {detail}")]
	RequestFailed { status: u16, detail: String },

	/// No response at all.
	#[error("Network error: {0}")]
	Network(String),

	/// A 2xx whose body did not match the expected shape.
	#[error("Unexpected response: {0}")]
	Decode(String),
}

impl HttpError {
	/// Whether this error must tear down the session.
	pub fn clears_session(&self) -> bool {
		matches!(self, HttpError::AuthExpired)
	}

	/// HTTP status behind the error, if a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			HttpError::AuthExpired => Some(401),
			HttpError::Forbidden { .. } => Some(403),
			HttpError::NotFound { .. } => Some(404),
			HttpError::ValidationFailed { status, .. } | HttpError::RequestFailed { status, .. } => {
				Some(*status)
			}
			HttpError::Network(_) | HttpError::Decode(_) => None,
		}
	}

	/// Message suitable for a notification, falling back to `generic` for
	/// failures whose text means nothing to a reader.
	pub fn user_message(&self, generic: &str) -> String {
		match self {
			HttpError::ValidationFailed { detail, .. } | HttpError::NotFound { detail } => {
				detail.clone()
			}
			HttpError::AuthExpired | HttpError::Forbidden { .. } => self.to_string(),
			_ => generic.to_string(),
		}
	}
}

impl From<gloo_net::Error> for HttpError {
	fn from(err: gloo_net::Error) -> Self {
		match err {
			gloo_net::Error::SerdeError(e) => HttpError::Decode(e.to_string()),
			other => HttpError::Network(other.to_string()),
		}
	}
}

#[derive(Deserialize, Default)]
struct ErrorBody {
	#[serde(default)]
	detail: Option<serde_json::Value>,
	#[serde(default)]
	message: Option<String>,
}

/// Extract a readable message from an error body.
pub(crate) fn error_detail(status: u16, body: &str) -> String {
	let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
	let detail = match parsed.detail {
		Some(serde_json::Value::String(s)) => Some(s),
		Some(serde_json::Value::Null) | None => None,
		Some(other) => Some(other.to_string()),
	};
	detail
		.or(parsed.message)
		.filter(|d| !d.trim().is_empty())
		.unwrap_or_else(|| format!("Error {}", status))
}

/// Classify a response status. `body` is only read for non-2xx statuses.
pub fn classify(status: u16, body: &str) -> Result<(), HttpError> {
	match status {
		200..=299 => Ok(()),
		401 => Err(HttpError::AuthExpired),
		403 => Err(HttpError::Forbidden {
			detail: error_detail(status, body),
		}),
		404 => Err(HttpError::NotFound {
			detail: error_detail(status, body),
		}),
		400..=499 => Err(HttpError::ValidationFailed {
			status,
			detail: error_detail(status, body),
		}),
		_ => Err(HttpError::RequestFailed {
			status,
			detail: error_detail(status, body),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_statuses_pass() {
		assert_eq!(classify(200, ""), Ok(()));
		assert_eq!(classify(204, ""), Ok(()));
	}

	#[test]
	fn only_unauthorized_clears_session() {
		for status in [400, 403, 404, 409, 422, 500, 502, 503] {
			let err = classify(status, "{}").unwrap_err();
			assert!(!err.clears_session(), "status {} cleared session", status);
		}
		assert!(classify(401, "").unwrap_err().clears_session());
		assert!(!HttpError::Network("offline".into()).clears_session());
		assert!(!HttpError::Decode("bad json".into()).clears_session());
	}

	#[test]
	fn server_detail_is_surfaced() {
		let err = classify(400, r#"{"detail":"Email already registered"}"#).unwrap_err();
		assert_eq!(
			err,
			HttpError::ValidationFailed {
				status: 400,
				detail: "Email already registered".into()
			}
		);
		assert_eq!(err.user_message("Authentication failed"), "Email already registered");
	}

	#[test]
	fn structured_detail_falls_back_to_json_text() {
		let err = classify(422, r#"{"detail":[{"msg":"field required"}]}"#).unwrap_err();
		match err {
			HttpError::ValidationFailed { detail, .. } => assert!(detail.contains("field required")),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn message_field_and_empty_body() {
		assert_eq!(error_detail(400, r#"{"message":"nope"}"#), "nope");
		assert_eq!(error_detail(502, "<html>bad gateway</html>"), "Error 502");
		assert_eq!(error_detail(500, r#"{"detail":null}"#), "Error 500");
	}

	#[test]
	fn server_errors_use_generic_message() {
		let err = classify(503, "").unwrap_err();
		assert_eq!(err.status(), Some(503));
		assert_eq!(err.user_message("Error loading books"), "Error loading books");
		assert_eq!(
			classify(403, "").unwrap_err().user_message("x"),
			"Admin access required"
		);
	}
}
