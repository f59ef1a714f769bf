mod config;
mod schema;
mod store;

pub use config::SqliteConfig;
pub use store::SqliteSessionStore;
