//! Application state shared by every view.
//!
//! All mutable client state lives here as signals. Session changes go through
//! [`AppState::reconcile`], which keeps the visible page and the stored token
//! consistent with the session.

#[cfg(target_arch = "wasm32")]
use std::time::Duration;

use leptos::prelude::*;
use log::{info, warn};

use crate::api::{ApiClient, HttpError};
use crate::config::Config;
#[cfg(target_arch = "wasm32")]
use crate::config::NOTIFICATION_MS;
#[cfg(target_arch = "wasm32")]
use crate::notify::dismiss;
use crate::notify::{Notice, NoticeKind};
use crate::router::Page;
use crate::session::{Session, TokenStore};
use crate::types::{SignupRequest, User};

/// Which form the auth modal shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
	Login,
	Signup,
}

impl AuthMode {
	pub fn toggled(self) -> Self {
		match self {
			AuthMode::Login => AuthMode::Signup,
			AuthMode::Signup => AuthMode::Login,
		}
	}
}

/// Signals shared across the app, provided as context.
#[derive(Clone, Copy)]
pub struct AppState {
	config: StoredValue<Config>,
	store: StoredValue<TokenStore>,
	pub session: RwSignal<Session>,
	pub page: RwSignal<Page>,
	pub notice: RwSignal<Option<Notice>>,
	pub auth_modal: RwSignal<Option<AuthMode>>,
	/// Book whose details modal is open.
	pub book_detail: RwSignal<Option<i64>>,
	pub is_authenticated: Memo<bool>,
	pub is_admin: Memo<bool>,
	notice_seq: StoredValue<u64>,
}

impl AppState {
	pub fn new(config: Config, store: TokenStore) -> Self {
		let session = RwSignal::new(Session::with_token(store.load()));
		let authenticated = session.get_untracked().is_authenticated();
		let is_authenticated = Memo::new(move |_| session.with(Session::is_authenticated));
		let is_admin = Memo::new(move |_| session.with(Session::is_admin));

		Self {
			config: StoredValue::new(config),
			store: StoredValue::new(store),
			session,
			page: RwSignal::new(Page::initial(authenticated)),
			notice: RwSignal::new(None),
			auth_modal: RwSignal::new(None),
			book_detail: RwSignal::new(None),
			is_authenticated,
			is_admin,
			notice_seq: StoredValue::new(0),
		}
	}

	pub fn config(&self) -> Config {
		self.config.get_value()
	}

	/// Client carrying the current token.
	pub fn api(&self) -> ApiClient {
		let token = self
			.session
			.with_untracked(|s| s.token().map(str::to_string));
		self.config.with_value(|c| ApiClient::new(c, token))
	}

	/// Bring derived state back in line with the session. Runs after every
	/// session mutation.
	pub fn reconcile(&self) {
		let (token, authenticated, user_known, admin) = self.session.with_untracked(|s| {
			(
				s.token().map(str::to_string),
				s.is_authenticated(),
				s.user().is_some(),
				s.is_admin(),
			)
		});
		self.store.with_value(|store| store.save(token.as_deref()));

		let page = self.page.get_untracked();
		let resolved = page.resolve(authenticated);
		if resolved != page {
			self.page.set(resolved);
		} else if page == Page::Admin && user_known && !admin {
			self.page.set(Page::Books);
		}
		if authenticated && self.auth_modal.get_untracked().is_some() {
			self.auth_modal.set(None);
		}
	}

	/// Switch panels. Guests asking for a protected page get the login
	/// prompt and the login form instead.
	pub fn show_page(&self, page: Page) {
		let authenticated = self.is_authenticated.get_untracked();
		let resolved = page.resolve(authenticated);
		if resolved != page {
			self.open_auth(AuthMode::Login);
		}
		info!("Showing {:?}", resolved);
		self.page.set(resolved);
	}

	pub fn open_auth(&self, mode: AuthMode) {
		self.auth_modal.set(Some(mode));
	}

	pub fn open_book(&self, id: i64) {
		self.book_detail.set(Some(id));
	}

	/// Show a toast, replacing any current one.
	pub fn notify(&self, message: impl Into<String>, kind: NoticeKind) {
		self.notice_seq.update_value(|n| *n += 1);
		let id = self.notice_seq.get_value();
		self.notice.set(Some(Notice {
			id,
			message: message.into(),
			kind,
		}));

		#[cfg(target_arch = "wasm32")]
		{
			let notice = self.notice;
			set_timeout(
				move || notice.update(|slot| dismiss(slot, id)),
				Duration::from_millis(NOTIFICATION_MS),
			);
		}
	}

	pub fn notify_success(&self, message: impl Into<String>) {
		self.notify(message, NoticeKind::Success);
	}

	pub fn notify_error(&self, message: impl Into<String>) {
		self.notify(message, NoticeKind::Error);
	}

	/// Apply the session rule to a call result: a 401 ends the session,
	/// anything else is handed back untouched.
	pub fn settle<T>(&self, result: Result<T, HttpError>) -> Result<T, HttpError> {
		if let Err(err) = &result {
			let mut cleared = false;
			self.session.update(|s| cleared = s.absorb(err));
			if cleared {
				info!("Token rejected, ending session");
				self.reconcile();
				self.notify_error(err.to_string());
			}
		}
		result
	}

	pub async fn login(self, email: String, password: String) -> Result<(), HttpError> {
		let email = email.trim().to_string();
		validate_credentials(&email, &password)?;
		let token = self.api().login(&email, &password).await?;
		self.begin_session(token.access_token);
		self.load_profile().await;
		Ok(())
	}

	pub async fn signup(self, request: SignupRequest) -> Result<(), HttpError> {
		let request = SignupRequest {
			email: request.email.trim().to_string(),
			..request
		};
		validate_credentials(&request.email, &request.password)?;
		let token = self.api().signup(&request).await?;
		self.begin_session(token.access_token);
		self.load_profile().await;
		Ok(())
	}

	/// Adopt a freshly issued token.
	pub fn begin_session(&self, token: String) {
		info!("Session started");
		self.session.update(|s| s.begin(token));
		self.reconcile();
	}

	async fn load_profile(self) {
		if let Err(err) = self.refresh_current_user().await {
			warn!("Signed in but profile fetch failed: {}", err);
		}
	}

	/// Drop the session locally. Never touches the network.
	pub fn logout(&self) {
		info!("Logging out");
		self.session.update(Session::clear);
		self.reconcile();
		self.page.set(Page::LoginPrompt);
	}

	/// Refetch the signed-in user. A 401 ends the session; other failures
	/// leave it in place.
	pub async fn refresh_current_user(self) -> Result<(), HttpError> {
		if !self.is_authenticated.get_untracked() {
			return Ok(());
		}
		let user = self.settle(self.api().me().await)?;
		self.adopt_user(user);
		Ok(())
	}

	/// Store a freshly fetched profile for the current session.
	pub fn adopt_user(&self, user: User) {
		self.session.update(|s| s.set_user(user));
		self.reconcile();
	}

	pub fn is_authenticated(&self) -> bool {
		self.is_authenticated.get_untracked()
	}
}

fn validate_credentials(email: &str, password: &str) -> Result<(), HttpError> {
	if email.is_empty() || password.is_empty() {
		return Err(HttpError::ValidationFailed {
			status: 400,
			detail: "Please fill in email and password".to_string(),
		});
	}
	Ok(())
}

/// Build the state from config and stored session, and provide it.
pub fn provide_app_state(config: Config) -> AppState {
	let state = AppState::new(config, TokenStore::Local);
	provide_context(state);
	state
}

/// App state from context.
pub fn use_app_state() -> AppState {
	expect_context::<AppState>()
}

/// State backed by an in-memory token store, under a fresh reactive owner.
/// Keep the owner alive for as long as the state is used.
#[cfg(test)]
pub(crate) fn test_state(token: Option<&str>) -> (Owner, TokenStore, AppState) {
	let owner = Owner::new();
	owner.set();
	let store = TokenStore::memory(token);
	let state = AppState::new(Config::with_api_url("http://api.test"), store.clone());
	(owner, store, state)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn notice_text(app: &AppState) -> Option<String> {
		app.notice.get_untracked().map(|n| n.message)
	}

	#[test]
	fn blank_credentials_rejected_locally() {
		assert!(validate_credentials("", "pw").is_err());
		assert!(validate_credentials("a@b.c", "").is_err());
		assert!(validate_credentials("a@b.c", "pw").is_ok());
		let err = validate_credentials("", "").unwrap_err();
		assert_eq!(err.user_message("x"), "Please fill in email and password");
		assert!(!err.clears_session());
	}

	#[test]
	fn auth_mode_toggles() {
		assert_eq!(AuthMode::Login.toggled(), AuthMode::Signup);
		assert_eq!(AuthMode::Signup.toggled(), AuthMode::Login);
	}

	#[test]
	fn rejected_token_ends_session_everywhere() {
		let (_owner, store, app) = test_state(Some("stale"));
		app.show_page(Page::Profile);
		assert_eq!(app.page.get_untracked(), Page::Profile);

		let result: Result<(), _> = app.settle(Err(HttpError::AuthExpired));
		assert!(result.is_err());
		assert!(!app.is_authenticated());
		assert_eq!(store.load(), None);
		assert_eq!(app.page.get_untracked(), Page::LoginPrompt);
		assert_eq!(
			notice_text(&app).as_deref(),
			Some("Session expired, please log in again")
		);
	}

	#[test]
	fn other_failures_leave_session_alone() {
		let (_owner, store, app) = test_state(Some("tok"));
		app.show_page(Page::Books);
		let _ = app.settle::<()>(Err(HttpError::RequestFailed {
			status: 500,
			detail: "boom".into(),
		}));
		assert!(app.is_authenticated());
		assert_eq!(store.load().as_deref(), Some("tok"));
		assert_eq!(app.page.get_untracked(), Page::Books);
		assert_eq!(notice_text(&app), None);
	}

	#[test]
	fn new_session_is_stored_and_closes_the_form() {
		let (_owner, store, app) = test_state(None);
		assert_eq!(app.page.get_untracked(), Page::LoginPrompt);
		app.show_page(Page::Books);
		assert_eq!(app.auth_modal.get_untracked(), Some(AuthMode::Login));

		app.begin_session("fresh".into());
		app.show_page(Page::Books);
		assert!(app.is_authenticated());
		assert_eq!(store.load().as_deref(), Some("fresh"));
		assert_eq!(app.auth_modal.get_untracked(), None);
		assert_eq!(app.page.get_untracked(), Page::Books);
	}

	#[test]
	fn logout_forgets_the_token() {
		let (_owner, store, app) = test_state(Some("tok"));
		app.logout();
		assert_eq!(store.load(), None);
		assert_eq!(app.page.get_untracked(), Page::LoginPrompt);
	}

	#[test]
	fn non_admin_profile_leaves_admin_page() {
		let (_owner, _store, app) = test_state(Some("tok"));
		app.show_page(Page::Admin);
		app.adopt_user(User {
			id: "u1".into(),
			email: "reader@x.io".into(),
			first_name: None,
			last_name: None,
			is_admin: Some(false),
			kyc_preferences: None,
		});
		assert_eq!(app.page.get_untracked(), Page::Books);
	}
}
