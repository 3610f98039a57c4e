use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::HttpError;
use crate::router::Page;
use crate::state::{AuthMode, use_app_state};
use crate::types::SignupRequest;

fn non_empty(value: String) -> Option<String> {
	let value = value.trim().to_string();
	(!value.is_empty()).then_some(value)
}

/// How a finished login or signup ends.
#[derive(Debug, PartialEq)]
enum Finish {
	SignedIn(&'static str),
	Failed(String),
}

impl Finish {
	/// `authenticated` is read after the call: the profile fetch that follows
	/// a new token can still end the session.
	fn of(mode: AuthMode, result: &Result<(), HttpError>, authenticated: bool) -> Self {
		match result {
			Ok(()) if authenticated => Finish::SignedIn(match mode {
				AuthMode::Login => "Successfully logged in!",
				AuthMode::Signup => "Successfully signed up!",
			}),
			Ok(()) | Err(HttpError::AuthExpired) => Finish::Failed("Authentication failed".to_string()),
			Err(HttpError::Network(_)) => {
				Finish::Failed("Network error. Please check if the backend is running.".to_string())
			}
			Err(err) => Finish::Failed(err.user_message("Authentication failed")),
		}
	}
}

/// Login and signup form.
#[component]
pub fn AuthModal() -> impl IntoView {
	let app = use_app_state();
	let email = RwSignal::new(String::new());
	let password = RwSignal::new(String::new());
	let first_name = RwSignal::new(String::new());
	let last_name = RwSignal::new(String::new());
	let busy = RwSignal::new(false);

	let reset = move || {
		for field in [email, password, first_name, last_name] {
			field.set(String::new());
		}
	};
	let close = move || {
		reset();
		app.auth_modal.set(None);
	};
	let toggle = move |ev: leptos::ev::MouseEvent| {
		ev.prevent_default();
		reset();
		app.auth_modal.update(|mode| *mode = mode.map(AuthMode::toggled));
	};

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let Some(mode) = app.auth_modal.get_untracked() else {
			return;
		};
		if busy.get_untracked() {
			return;
		}
		busy.set(true);
		let (email, password) = (email.get_untracked(), password.get_untracked());
		let (first, last) = (first_name.get_untracked(), last_name.get_untracked());

		spawn_local(async move {
			let result = match mode {
				AuthMode::Login => app.login(email, password).await,
				AuthMode::Signup => {
					app.signup(SignupRequest {
						email,
						password,
						first_name: non_empty(first),
						last_name: non_empty(last),
					})
					.await
				}
			};
			busy.set(false);

			if let Err(err) = &result {
				log::error!("Auth request failed: {}", err);
			}
			match Finish::of(mode, &result, app.is_authenticated()) {
				Finish::SignedIn(message) => {
					close();
					app.notify_success(message);
					app.show_page(Page::Books);
				}
				Finish::Failed(message) => app.notify_error(message),
			}
		});
	};

	let is_signup = move || app.auth_modal.get() == Some(AuthMode::Signup);

	view! {
		<Show when=move || app.auth_modal.get().is_some()>
			<div class="modal" on:click=move |_| close()>
				<div class="modal-content" on:click=|ev| ev.stop_propagation()>
					<span class="close" on:click=move |_| close()>
						"×"
					</span>
					<h2>{move || if is_signup() { "Sign Up" } else { "Login" }}</h2>
					<form on:submit=on_submit>
						<Show when=is_signup>
							<input
								type="text"
								placeholder="First name"
								prop:value=move || first_name.get()
								on:input=move |ev| first_name.set(event_target_value(&ev))
							/>
							<input
								type="text"
								placeholder="Last name"
								prop:value=move || last_name.get()
								on:input=move |ev| last_name.set(event_target_value(&ev))
							/>
						</Show>
						<input
							type="email"
							placeholder="Email"
							required
							prop:value=move || email.get()
							on:input=move |ev| email.set(event_target_value(&ev))
						/>
						<input
							type="password"
							placeholder="Password"
							required
							prop:value=move || password.get()
							on:input=move |ev| password.set(event_target_value(&ev))
						/>
						<button type="submit" class="btn-primary" prop:disabled=move || busy.get()>
							{move || if is_signup() { "Sign Up" } else { "Login" }}
						</button>
					</form>
					<p class="auth-switch">
						{move || {
							if is_signup() { "Already have an account? " } else { "Don't have an account? " }
						}}
						<a href="#" on:click=toggle>
							{move || if is_signup() { "Login" } else { "Sign up" }}
						</a>
					</p>
				</div>
			</div>
		</Show>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_requires_a_live_session() {
		assert_eq!(
			Finish::of(AuthMode::Login, &Ok(()), true),
			Finish::SignedIn("Successfully logged in!")
		);
		assert_eq!(
			Finish::of(AuthMode::Signup, &Ok(()), true),
			Finish::SignedIn("Successfully signed up!")
		);
		// Token issued, then the profile fetch came back 401.
		assert_eq!(
			Finish::of(AuthMode::Login, &Ok(()), false),
			Finish::Failed("Authentication failed".into())
		);
	}

	#[test]
	fn failures_explain_themselves() {
		assert_eq!(
			Finish::of(AuthMode::Login, &Err(HttpError::AuthExpired), false),
			Finish::Failed("Authentication failed".into())
		);
		assert_eq!(
			Finish::of(AuthMode::Login, &Err(HttpError::Network("refused".into())), false),
			Finish::Failed("Network error. Please check if the backend is running.".into())
		);
		let taken = HttpError::ValidationFailed {
			status: 400,
			detail: "Email already registered".into(),
		};
		assert_eq!(
			Finish::of(AuthMode::Signup, &Err(taken), false),
			Finish::Failed("Email already registered".into())
		);
		assert_eq!(
			Finish::of(
				AuthMode::Login,
				&Err(HttpError::RequestFailed {
					status: 500,
					detail: "boom".into()
				}),
				false
			),
			Finish::Failed("Authentication failed".into())
		);
	}
}
