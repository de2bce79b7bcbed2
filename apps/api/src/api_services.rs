mod database;
mod sessions;
mod state_builder;

pub use database::{connect, run_migrations};
pub use sessions::build_postgres_session_layer;
pub use state_builder::{build_app_state, ensure_bootstrap_admin};
