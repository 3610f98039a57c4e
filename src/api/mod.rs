//! HTTP access to the recommendation backend.

mod client;
mod error;

pub use client::{ApiClient, BookQuery};
pub use error::{HttpError, classify};
