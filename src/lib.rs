//! OpenShelf Library Lending Management System
//!
//! A Rust server for managing a lending library: catalog of books, member
//! accounts, and the lending engine that keeps book stock, member balances,
//! and loan records mutually consistent under concurrent access.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: sqlx::PgPool,
    pub services: Arc<services::Services>,
}
