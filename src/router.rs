//! Page switching and catalogue pagination.
//!
//! The app is a single screen of panels; exactly one is visible at a time and
//! nothing is reflected in the URL.

use crate::config::PAGE_LIMIT;

/// A top-level panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Page {
	#[default]
	LoginPrompt,
	Books,
	Recommendations,
	Profile,
	Admin,
}

impl Page {
	pub fn requires_auth(self) -> bool {
		!matches!(self, Page::LoginPrompt)
	}

	/// Page actually shown when `self` is requested.
	pub fn resolve(self, authenticated: bool) -> Page {
		if self.requires_auth() && !authenticated {
			Page::LoginPrompt
		} else {
			self
		}
	}

	/// Landing page for a fresh load.
	pub fn initial(authenticated: bool) -> Page {
		Page::Books.resolve(authenticated)
	}

	pub fn title(self) -> &'static str {
		match self {
			Page::LoginPrompt => "Welcome",
			Page::Books => "Browse Books",
			Page::Recommendations => "Recommendations",
			Page::Profile => "Profile",
			Page::Admin => "Admin",
		}
	}
}

/// Position in the paginated catalogue.
///
/// Only the page is stored so the offset can never drift from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
	page: u32,
}

impl Default for Cursor {
	fn default() -> Self {
		Self { page: 1 }
	}
}

impl Cursor {
	pub fn page(&self) -> u32 {
		self.page
	}

	pub fn offset(&self) -> u32 {
		(self.page - 1) * PAGE_LIMIT
	}

	pub fn has_prev(&self) -> bool {
		self.page > 1
	}

	/// There is no total count, so there is always a next page to ask for.
	pub fn next(&mut self) {
		self.page += 1;
	}

	/// Returns false (and does nothing) on the first page.
	pub fn prev(&mut self) -> bool {
		if self.has_prev() {
			self.page -= 1;
			true
		} else {
			false
		}
	}

	pub fn reset(&mut self) {
		self.page = 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn guests_are_sent_to_login_prompt() {
		for page in [Page::Books, Page::Recommendations, Page::Profile, Page::Admin] {
			assert_eq!(page.resolve(false), Page::LoginPrompt);
			assert_eq!(page.resolve(true), page);
		}
		assert_eq!(Page::LoginPrompt.resolve(false), Page::LoginPrompt);
		assert_eq!(Page::initial(true), Page::Books);
		assert_eq!(Page::initial(false), Page::LoginPrompt);
	}

	#[test]
	fn prev_is_noop_on_first_page() {
		let mut cursor = Cursor::default();
		assert!(!cursor.has_prev());
		assert!(!cursor.prev());
		assert_eq!(cursor.page(), 1);
		assert_eq!(cursor.offset(), 0);
	}

	#[test]
	fn offset_follows_page_for_any_sequence() {
		// deterministic mix of next/prev steps
		let steps = [1, 1, 0, 0, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0, 1];
		let mut cursor = Cursor::default();
		for step in steps {
			if step == 1 {
				cursor.next();
			} else {
				cursor.prev();
			}
			assert!(cursor.page() >= 1);
			assert_eq!(cursor.offset(), (cursor.page() - 1) * 12);
			assert_eq!(cursor.offset() % PAGE_LIMIT, 0);
		}
	}

	#[test]
	fn reset_returns_to_first_page() {
		let mut cursor = Cursor::default();
		cursor.next();
		cursor.next();
		assert_eq!(cursor.offset(), 24);
		cursor.reset();
		assert_eq!(cursor, Cursor::default());
	}
}
