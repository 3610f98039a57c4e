mod component;
mod layout;
mod render;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use types::{ViewAction, ViewCommand};
