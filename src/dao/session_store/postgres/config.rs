/// Runtime configuration describing how to connect to PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgConfig {
    /// `postgres://` connection URL.
    pub url: String,
    /// Upper bound of the pool; at least one.
    pub max_connections: u32,
}

impl PgConfig {
    /// Construct a configuration for a `postgres://` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }

    /// Override the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}
