//! HTTP request handlers.

pub mod bug_handler;
pub mod user_handler;

pub use bug_handler::bug_routes;
pub use user_handler::{user_public_routes, user_routes};
