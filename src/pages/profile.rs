use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info};

use crate::router::Page;
use crate::sequence::{RequestSeq, Ticket};
use crate::state::{AppState, use_app_state};
use crate::types::{Preferences, PreferencesUpdate, User};

/// Preference form contents derived from a stored profile.
#[derive(Debug, Default, PartialEq)]
struct PreferenceForm {
	genres: String,
	authors: String,
	reading: String,
}

impl PreferenceForm {
	fn from_preferences(prefs: Option<&Preferences>) -> Self {
		let Some(prefs) = prefs else {
			return Self::default();
		};
		Self {
			genres: prefs.genres.as_ref().map(|g| g.joined()).unwrap_or_default(),
			authors: prefs.authors.as_ref().map(|a| a.joined()).unwrap_or_default(),
			reading: prefs.reading_text().unwrap_or_default().to_string(),
		}
	}
}

/// Form contents for a profile response, or `None` once a newer request
/// has been issued.
fn fresh_form(seq: &RequestSeq, ticket: Ticket, user: &User) -> Option<PreferenceForm> {
	seq.is_current(ticket)
		.then(|| PreferenceForm::from_preferences(user.kyc_preferences.as_ref()))
}

#[derive(Clone)]
struct ProfileForm {
	seq: RequestSeq,
	genres: RwSignal<String>,
	authors: RwSignal<String>,
	reading: RwSignal<String>,
}

impl ProfileForm {
	fn fill(&self, form: PreferenceForm) {
		self.genres.set(form.genres);
		self.authors.set(form.authors);
		self.reading.set(form.reading);
	}

	/// Fetch the profile and pre-fill the form. Only the newest request
	/// touches the form.
	fn reload(&self, app: AppState) {
		let ticket = self.seq.issue();
		let this = self.clone();
		spawn_local(async move {
			let result = app.settle(app.api().me().await);
			let user = match result {
				Ok(user) => user,
				Err(err) => {
					error!("Loading profile failed: {}", err);
					if this.seq.is_current(ticket) && !err.clears_session() {
						app.notify_error("Error loading profile");
					}
					return;
				}
			};
			let Some(form) = fresh_form(&this.seq, ticket, &user) else {
				debug!("Dropping stale profile");
				return;
			};
			app.adopt_user(user);
			this.fill(form);
		});
	}

	fn save(&self, app: AppState, saving: RwSignal<bool>) {
		let update = PreferencesUpdate::from_form(
			&self.genres.get_untracked(),
			&self.authors.get_untracked(),
			&self.reading.get_untracked(),
		);
		let ticket = self.seq.issue();
		let this = self.clone();
		saving.set(true);
		spawn_local(async move {
			let result = app.settle(app.api().update_preferences(&update).await);
			saving.set(false);
			match result {
				Ok(_) => {
					info!("Preferences saved");
					app.notify_success("Preferences updated successfully!");
					if this.seq.is_current(ticket) {
						this.reload(app);
					}
				}
				Err(err) if err.clears_session() => {}
				Err(err) => {
					error!("Saving preferences failed: {}", err);
					app.notify_error(err.user_message("Error updating preferences"));
				}
			}
		});
	}
}

/// Account details and reading preferences.
#[component]
pub fn ProfilePage() -> impl IntoView {
	let app = use_app_state();
	let form = ProfileForm {
		seq: RequestSeq::new(),
		genres: RwSignal::new(String::new()),
		authors: RwSignal::new(String::new()),
		reading: RwSignal::new(String::new()),
	};
	let ProfileForm {
		genres,
		authors,
		reading,
		..
	} = form.clone();
	let saving = RwSignal::new(false);

	let on_show = form.clone();
	Effect::new(move |_| {
		if app.page.get() == Page::Profile {
			on_show.reload(app);
		}
	});

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		form.save(app, saving);
	};

	let user = move || app.session.with(|s| s.user().cloned());

	view! {
		<div class="profile-page">
			<div class="profile-info">
				{move || {
					user()
						.map(|u: User| {
							view! {
								<h3>{u.display_name()}</h3>
								<p>
									<strong>"Email: "</strong>
									{u.email}
								</p>
							}
						})
				}}
			</div>
			<form class="preferences-form" on:submit=on_submit>
				<h3>"Reading Preferences"</h3>
				<label>"Favourite genres (comma separated)"</label>
				<input
					type="text"
					prop:value=move || genres.get()
					on:input=move |ev| genres.set(event_target_value(&ev))
				/>
				<label>"Favourite authors (comma separated)"</label>
				<input
					type="text"
					prop:value=move || authors.get()
					on:input=move |ev| authors.set(event_target_value(&ev))
				/>
				<label>"What do you like to read?"</label>
				<textarea
					rows="4"
					prop:value=move || reading.get()
					on:input=move |ev| reading.set(event_target_value(&ev))
				></textarea>
				<button type="submit" class="btn-primary" prop:disabled=move || saving.get()>
					"Save Preferences"
				</button>
			</form>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::TextList;

	#[test]
	fn form_prefills_from_either_shape() {
		let prefs = Preferences {
			genres: Some(TextList::List(vec!["Fantasy".into(), "Horror".into()])),
			authors: Some(TextList::Text("Le Guin".into())),
			reading_preferences: None,
			description: Some("Slow, thoughtful books".into()),
		};
		assert_eq!(
			PreferenceForm::from_preferences(Some(&prefs)),
			PreferenceForm {
				genres: "Fantasy, Horror".into(),
				authors: "Le Guin".into(),
				reading: "Slow, thoughtful books".into(),
			}
		);
		assert_eq!(PreferenceForm::from_preferences(None), PreferenceForm::default());
	}

	#[test]
	fn superseded_profile_response_is_dropped() {
		let seq = RequestSeq::new();
		let user = User {
			id: "u1".into(),
			email: "reader@x.io".into(),
			first_name: None,
			last_name: None,
			is_admin: None,
			kyc_preferences: Some(Preferences {
				genres: Some(TextList::Text("Horror".into())),
				..Default::default()
			}),
		};

		let opened = seq.issue();
		let saved = seq.issue();
		assert_eq!(fresh_form(&seq, opened, &user), None);
		assert_eq!(
			fresh_form(&seq, saved, &user).map(|f| f.genres),
			Some("Horror".to_string())
		);
	}
}
