pub mod admin;
pub mod books;
pub mod home;
pub mod login_prompt;
pub mod not_found;
pub mod profile;
pub mod recommendations;
