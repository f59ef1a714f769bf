use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use tracing::debug;

use crate::dao::{
    models::{NewPlayerEntity, NewSessionEntity, PlayerEntity, SessionChanges, SessionEntity, SessionId},
    session_store::{
        SessionStore, decode_session_id, decode_slide_ids, decode_slide_index, encode_slide_ids,
        encode_slide_index,
    },
    storage::{StorageResult, from_sqlx},
};

use super::{config::PgConfig, schema::ensure_schema};

const SESSION_COLUMNS: &str =
    "id, host_name, session_name, live, presentation_id, slide_index, slide_ids";
const PLAYER_COLUMNS: &str = "id, session_id, name, answer";

/// [`SessionStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Open the pool and create the schema.
    pub async fn connect(config: PgConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await
            .map_err(|err| from_sqlx("failed to connect to postgres", err))?;

        ensure_schema(&pool)
            .await
            .map_err(|err| from_sqlx("failed to create postgres schema", err))?;
        debug!("postgres session store ready");

        Ok(Self { pool })
    }
}

fn session_from_row(row: &PgRow) -> StorageResult<SessionEntity> {
    let read = |err| from_sqlx("failed to read session row", err);
    Ok(SessionEntity {
        id: decode_session_id(row.try_get("id").map_err(read)?)?,
        host_name: row.try_get("host_name").map_err(read)?,
        session_name: row.try_get("session_name").map_err(read)?,
        live: row.try_get("live").map_err(read)?,
        presentation_id: row.try_get("presentation_id").map_err(read)?,
        slide_index: decode_slide_index(row.try_get("slide_index").map_err(read)?)?,
        slide_ids: decode_slide_ids(&row.try_get::<String, _>("slide_ids").map_err(read)?)?,
    })
}

fn player_from_row(row: &PgRow) -> StorageResult<PlayerEntity> {
    let read = |err| from_sqlx("failed to read player row", err);
    Ok(PlayerEntity {
        id: row.try_get("id").map_err(read)?,
        session_id: decode_session_id(row.try_get("session_id").map_err(read)?)?,
        name: row.try_get("name").map_err(read)?,
        answer: row.try_get("answer").map_err(read)?,
    })
}

fn players_from_rows(rows: &[PgRow]) -> StorageResult<Vec<PlayerEntity>> {
    let mut players = rows
        .iter()
        .map(player_from_row)
        .collect::<StorageResult<Vec<_>>>()?;
    players.sort_by_key(|player| player.id);
    Ok(players)
}

impl SessionStore for PgSessionStore {
    fn insert_session(&self, session: NewSessionEntity) -> BoxFuture<'static, StorageResult<SessionEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO sessions (id, host_name, session_name, presentation_id) \
                 VALUES ($1, $2, $3, $4) RETURNING {SESSION_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(session.id.as_str())
                .bind(&session.host_name)
                .bind(&session.session_name)
                .bind(&session.presentation_id)
                .fetch_one(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to insert session `{}`", session.id), err))?;
            session_from_row(&row)
        })
    }

    fn find_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");
            let row = sqlx::query(&sql)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to load session `{id}`"), err))?;
            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn session_exists(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query("SELECT 1 FROM sessions WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to probe session `{id}`"), err))?;
            Ok(row.is_some())
        })
    }

    fn update_session(
        &self,
        id: SessionId,
        changes: SessionChanges,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let relink = changes.presentation_id.is_some();
            let sql = format!(
                "UPDATE sessions SET \
                    live = COALESCE($2, live), \
                    presentation_id = CASE WHEN $3 THEN $4 ELSE presentation_id END, \
                    slide_ids = CASE WHEN $3 THEN '[]' ELSE slide_ids END, \
                    slide_index = CASE WHEN $3 THEN 0 ELSE slide_index END \
                 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(id.as_str())
                .bind(changes.live)
                .bind(relink)
                .bind(changes.presentation_id.flatten())
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to update session `{id}`"), err))?;
            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn cache_slide_ids(
        &self,
        id: SessionId,
        presentation_id: String,
        slide_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count = encode_slide_index(slide_ids.len())?;
            let result = sqlx::query(
                "UPDATE sessions SET \
                    slide_ids = $2, \
                    slide_index = CASE WHEN slide_index < $3 THEN slide_index ELSE 0 END \
                 WHERE id = $1 AND presentation_id = $4 AND slide_ids = '[]'",
            )
            .bind(id.as_str())
            .bind(encode_slide_ids(&slide_ids))
            .bind(count)
            .bind(&presentation_id)
            .execute(&pool)
            .await
            .map_err(|err| from_sqlx(format!("failed to cache slide ids for `{id}`"), err))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn reset_slide_cache(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "UPDATE sessions SET slide_ids = '[]', slide_index = 0 \
                 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to reset slide cache for `{id}`"), err))?;
            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn set_slide_index(
        &self,
        id: SessionId,
        index: usize,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "UPDATE sessions SET slide_index = $2 \
                 WHERE id = $1 AND json_array_length(slide_ids::json) > $2 \
                 RETURNING {SESSION_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(id.as_str())
                .bind(encode_slide_index(index)?)
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to move slide for `{id}`"), err))?;
            row.as_ref().map(session_from_row).transpose()
        })
    }

    fn delete_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
                .bind(id.as_str())
                .execute(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to delete session `{id}`"), err))?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO players (session_id, name, answer) VALUES ($1, $2, $3) \
                 RETURNING {PLAYER_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(player.session_id.as_str())
                .bind(&player.name)
                .bind(&player.answer)
                .fetch_one(&pool)
                .await
                .map_err(|err| {
                    from_sqlx(
                        format!("failed to insert player `{}` in `{}`", player.name, player.session_id),
                        err,
                    )
                })?;
            player_from_row(&row)
        })
    }

    fn find_player_by_name(
        &self,
        session_id: SessionId,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = $1 AND name = $2"
            );
            let row = sqlx::query(&sql)
                .bind(session_id.as_str())
                .bind(&name)
                .fetch_optional(&pool)
                .await
                .map_err(|err| {
                    from_sqlx(format!("failed to load player `{name}` in `{session_id}`"), err)
                })?;
            row.as_ref().map(player_from_row).transpose()
        })
    }

    fn update_player_answer(
        &self,
        player_id: i64,
        session_id: SessionId,
        answer: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "UPDATE players SET answer = $3 WHERE id = $1 AND session_id = $2 \
                 RETURNING {PLAYER_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(player_id)
                .bind(session_id.as_str())
                .bind(&answer)
                .fetch_optional(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to update player {player_id}"), err))?;
            row.as_ref().map(player_from_row).transpose()
        })
    }

    fn clear_answers(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "UPDATE players SET answer = NULL WHERE session_id = $1 RETURNING {PLAYER_COLUMNS}"
            );
            let rows = sqlx::query(&sql)
                .bind(session_id.as_str())
                .fetch_all(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to clear answers in `{session_id}`"), err))?;
            players_from_rows(&rows)
        })
    }

    fn list_players(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE session_id = $1 ORDER BY id"
            );
            let rows = sqlx::query(&sql)
                .bind(session_id.as_str())
                .fetch_all(&pool)
                .await
                .map_err(|err| from_sqlx(format!("failed to list players in `{session_id}`"), err))?;
            players_from_rows(&rows)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(|err| from_sqlx("postgres health check failed", err))?;
            Ok(())
        })
    }
}
