//! Authentication state and its persistence.

use std::sync::{Arc, Mutex, PoisonError};

use log::warn;
use web_sys::Storage;

use crate::api::HttpError;
use crate::config::TOKEN_STORAGE_KEY;
use crate::types::User;

/// Token plus the last fetched profile.
///
/// Holding a token is what makes the UI authenticated; the user record is
/// only a cache and may lag behind it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
	token: Option<String>,
	user: Option<User>,
}

impl Session {
	pub fn with_token(token: Option<String>) -> Self {
		Self {
			token: token.filter(|t| !t.is_empty()),
			user: None,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.token.is_some()
	}

	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn user(&self) -> Option<&User> {
		self.user.as_ref()
	}

	/// Start a new session; any cached user belongs to the old one.
	pub fn begin(&mut self, token: String) {
		self.token = Some(token);
		self.user = None;
	}

	pub fn set_user(&mut self, user: User) {
		self.user = Some(user);
	}

	pub fn clear(&mut self) {
		self.token = None;
		self.user = None;
	}

	/// Apply the session rule for a failed call. Returns true if the session
	/// was dropped.
	pub fn absorb(&mut self, err: &HttpError) -> bool {
		if err.clears_session() && self.is_authenticated() {
			self.clear();
			true
		} else {
			false
		}
	}

	pub fn is_admin(&self) -> bool {
		self.user.as_ref().is_some_and(is_admin)
	}
}

/// Admin capability of a user record.
///
/// The explicit `is_admin` flag wins. When the backend omits it, an email
/// containing "admin" is accepted; that rule is unconfirmed and only kept for
/// older backends.
pub fn is_admin(user: &User) -> bool {
	match user.is_admin {
		Some(flag) => flag,
		None => {
			let guess = user.email.to_lowercase().contains("admin");
			if guess {
				warn!("No is_admin flag for {}; granting admin from email", user.email);
			}
			guess
		}
	}
}

fn storage() -> Option<Storage> {
	web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Where the session token survives a reload.
#[derive(Clone, Debug, Default)]
pub enum TokenStore {
	/// Browser `localStorage`.
	#[default]
	Local,
	/// Process memory; nothing outlives the app.
	Memory(Arc<Mutex<Option<String>>>),
}

impl TokenStore {
	pub fn memory(token: Option<&str>) -> Self {
		TokenStore::Memory(Arc::new(Mutex::new(token.map(str::to_string))))
	}

	/// Token persisted by a previous visit.
	pub fn load(&self) -> Option<String> {
		let token = match self {
			TokenStore::Local => storage().and_then(|s| s.get_item(TOKEN_STORAGE_KEY).ok().flatten()),
			TokenStore::Memory(slot) => slot.lock().unwrap_or_else(PoisonError::into_inner).clone(),
		};
		token.filter(|t| !t.is_empty())
	}

	/// Mirror the session token into the store.
	pub fn save(&self, token: Option<&str>) {
		match self {
			TokenStore::Local => {
				let Some(storage) = storage() else {
					warn!("localStorage unavailable; session will not survive reload");
					return;
				};
				let result = match token {
					Some(token) => storage.set_item(TOKEN_STORAGE_KEY, token),
					None => storage.remove_item(TOKEN_STORAGE_KEY),
				};
				if result.is_err() {
					warn!("Failed to update stored token");
				}
			}
			TokenStore::Memory(slot) => {
				*slot.lock().unwrap_or_else(PoisonError::into_inner) = token.map(str::to_string);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn user(email: &str, is_admin: Option<bool>) -> User {
		User {
			id: "u1".into(),
			email: email.into(),
			first_name: None,
			last_name: None,
			is_admin,
			kyc_preferences: None,
		}
	}

	#[test]
	fn unauthorized_clears_everything() {
		let mut session = Session::with_token(Some("abc".into()));
		session.set_user(user("a@b.c", None));
		assert!(session.absorb(&HttpError::AuthExpired));
		assert_eq!(session, Session::default());
	}

	#[test]
	fn other_failures_keep_session() {
		let errors = [
			HttpError::Network("offline".into()),
			HttpError::RequestFailed {
				status: 500,
				detail: "boom".into(),
			},
			HttpError::Forbidden {
				detail: "no".into(),
			},
			HttpError::ValidationFailed {
				status: 422,
				detail: "bad".into(),
			},
			HttpError::Decode("eof".into()),
		];
		for err in errors {
			let mut session = Session::with_token(Some("abc".into()));
			assert!(!session.absorb(&err));
			assert_eq!(session.token(), Some("abc"));
		}
	}

	#[test]
	fn empty_stored_token_is_guest() {
		assert!(!Session::with_token(Some(String::new())).is_authenticated());
		assert!(!Session::with_token(None).is_authenticated());
	}

	#[test]
	fn begin_drops_stale_user() {
		let mut session = Session::with_token(Some("old".into()));
		session.set_user(user("old@x.io", Some(true)));
		session.begin("new".into());
		assert!(session.user().is_none());
		assert!(!session.is_admin());
	}

	#[test]
	fn admin_flag_beats_email() {
		assert!(is_admin(&user("reader@x.io", Some(true))));
		assert!(!is_admin(&user("admin@x.io", Some(false))));
		assert!(is_admin(&user("Admin@x.io", None)));
		assert!(!is_admin(&user("reader@x.io", None)));
	}

	#[test]
	fn memory_store_round_trips_and_clears() {
		let store = TokenStore::memory(Some("abc"));
		assert_eq!(store.load().as_deref(), Some("abc"));
		store.save(None);
		assert_eq!(store.load(), None);
		store.save(Some(""));
		assert_eq!(store.load(), None);
	}
}
