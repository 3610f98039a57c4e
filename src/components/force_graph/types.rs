/// Camera operation requested from outside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewAction {
	/// Back to scale 1 centred on the origin.
	ResetZoom,
	/// Zoom to the bounding box of all nodes.
	Fit,
}

/// A [`ViewAction`] tagged with a sequence number so repeating the same
/// action still changes the signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewCommand {
	pub seq: u64,
	pub action: ViewAction,
}

impl ViewCommand {
	pub fn next(prev: Option<ViewCommand>, action: ViewAction) -> Self {
		Self {
			seq: prev.map_or(0, |c| c.seq + 1),
			action,
		}
	}
}
