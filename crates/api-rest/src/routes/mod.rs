pub mod auth;
pub mod compose;
pub mod library;
