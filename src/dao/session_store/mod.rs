/// PostgreSQL backend.
#[cfg(feature = "postgres-store")]
pub mod postgres;
/// SQLite backend.
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dao::{
    models::{NewPlayerEntity, NewSessionEntity, PlayerEntity, SessionChanges, SessionEntity, SessionId},
    storage::{StorageError, StorageResult},
};

/// Abstraction over the relational store holding sessions and their players.
///
/// Inserts report uniqueness violations as [`StorageError::Conflict`] so callers
/// can re-read the winning row instead of failing.
pub trait SessionStore: Send + Sync {
    /// Insert a session with default state; a taken code is a `Conflict`.
    fn insert_session(&self, session: NewSessionEntity) -> BoxFuture<'static, StorageResult<SessionEntity>>;
    /// Load a session by code.
    fn find_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Whether a session with this code exists.
    fn session_exists(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>>;
    /// Apply a partial update and return the updated row.
    fn update_session(
        &self,
        id: SessionId,
        changes: SessionChanges,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Persist slide IDs only if the session has none yet and still links
    /// `presentation_id`. Returns whether the row changed.
    fn cache_slide_ids(
        &self,
        id: SessionId,
        presentation_id: String,
        slide_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Empty the slide ID cache and rewind to the first slide.
    fn reset_slide_cache(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Move to `index` only while the stored slide list still covers it.
    /// Returns `None` when the session is missing or the index is out of range.
    fn set_slide_index(
        &self,
        id: SessionId,
        index: usize,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Delete a session and, through the foreign key, its players.
    fn delete_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>>;
    /// Insert a player; a taken name within the session is a `Conflict`.
    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    /// Load a player of the session by name.
    fn find_player_by_name(
        &self,
        session_id: SessionId,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Set the answer of a player belonging to `session_id`.
    fn update_player_answer(
        &self,
        player_id: i64,
        session_id: SessionId,
        answer: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Null every answer in the session and return its players.
    fn clear_answers(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Players of a session ordered by join order.
    fn list_players(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Round-trip a trivial query.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Failure while opening a store from a database URL.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// No enabled backend handles the URL scheme.
    #[error("unsupported database url `{url}` (expected sqlite: or postgres://)")]
    UnsupportedScheme {
        /// The rejected URL.
        url: String,
    },
    /// The backend failed to open or bootstrap.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Open the backend matching the URL scheme and make sure the schema exists.
pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<dyn SessionStore>, ConnectError> {
    #[cfg(feature = "sqlite-store")]
    {
        if url.starts_with("sqlite:") {
            let config = sqlite::SqliteConfig::new(url).with_max_connections(max_connections);
            let store = sqlite::SqliteSessionStore::connect(config).await?;
            return Ok(Arc::new(store));
        }
    }

    #[cfg(feature = "postgres-store")]
    {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let config = postgres::PgConfig::new(url).with_max_connections(max_connections);
            let store = postgres::PgSessionStore::connect(config).await?;
            return Ok(Arc::new(store));
        }
    }

    let _ = max_connections;
    Err(ConnectError::UnsupportedScheme {
        url: url.to_owned(),
    })
}

/// Decode the JSON array stored in `sessions.slide_ids`.
pub(crate) fn decode_slide_ids(raw: &str) -> StorageResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| StorageError::Corrupt {
        message: format!("slide_ids is not a JSON string array: {err}"),
    })
}

pub(crate) fn encode_slide_ids(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".into())
}

pub(crate) fn decode_session_id(raw: String) -> StorageResult<SessionId> {
    raw.parse().map_err(|_| StorageError::Corrupt {
        message: format!("session id `{raw}` is not a 4 digit code"),
    })
}

pub(crate) fn decode_slide_index(raw: i64) -> StorageResult<usize> {
    usize::try_from(raw).map_err(|_| StorageError::Corrupt {
        message: format!("negative slide index {raw}"),
    })
}

pub(crate) fn encode_slide_index(index: usize) -> StorageResult<i64> {
    i64::try_from(index).map_err(|_| StorageError::Corrupt {
        message: format!("slide index {index} overflows"),
    })
}
