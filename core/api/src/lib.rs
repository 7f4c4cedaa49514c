pub mod config;
pub mod database;
pub mod routes;

pub use config::Config;
pub use database::Database;
pub use routes::{router, AppState};
