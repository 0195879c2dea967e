//! Bugtrail - Bug tracking API
//!
//! An issue-tracking service: authenticated users create, inspect,
//! update, and delete bug records, with mutations gated by
//! ownership-or-admin authorization and a dashboard endpoint that
//! summarizes bug counts.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities, validation, and the
//!   authorization policy
//! - **services**: Application use cases (identity, users, bugs)
//! - **infra**: Infrastructure concerns (database, repositories)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Bug, Password, Principal, User, UserRole};
pub use errors::{AppError, AppResult};
