pub mod auth_modal;
pub mod book_details;
pub mod book_grid;
pub mod force_graph;
pub mod notification;
