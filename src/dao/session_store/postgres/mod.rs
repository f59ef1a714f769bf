mod config;
mod schema;
mod store;

pub use config::PgConfig;
pub use store::PgSessionStore;
