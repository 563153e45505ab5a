pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod utils;

use config::Policy;
use database::Database;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub policy: Policy,
}
