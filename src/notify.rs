/// Tone of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
	Success,
	Error,
}

impl NoticeKind {
	pub fn class(self) -> &'static str {
		match self {
			NoticeKind::Success => "message success",
			NoticeKind::Error => "message error",
		}
	}
}

/// The single toast currently on screen.
///
/// `id` lets a dismiss timer check that the toast it was started for is still
/// the one showing.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	pub id: u64,
	pub message: String,
	pub kind: NoticeKind,
}

/// Clear `slot` only if it still holds toast `id`.
pub fn dismiss(slot: &mut Option<Notice>, id: u64) {
	if slot.as_ref().is_some_and(|n| n.id == id) {
		*slot = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn notice(id: u64) -> Notice {
		Notice {
			id,
			message: format!("n{}", id),
			kind: NoticeKind::Success,
		}
	}

	#[test]
	fn expired_timer_does_not_remove_successor() {
		let mut slot = Some(notice(2));
		dismiss(&mut slot, 1);
		assert_eq!(slot, Some(notice(2)));
		dismiss(&mut slot, 2);
		assert_eq!(slot, None);
	}
}
