/// Runtime configuration describing how to open the SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// `sqlite:` connection URL.
    pub url: String,
    /// Upper bound of the pool; at least one.
    pub max_connections: u32,
}

impl SqliteConfig {
    /// Construct a configuration for the given `sqlite:` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }

    /// Private in-memory database, mostly useful for tests.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    /// Override the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Every pooled connection to `:memory:` opens its own empty database, so
    /// such URLs are pinned to a single connection that never expires.
    pub(super) fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}
