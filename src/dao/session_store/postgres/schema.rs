use sqlx::PgPool;

const CREATE_SESSIONS: &str = r"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        host_name TEXT NOT NULL,
        session_name TEXT NOT NULL,
        live BOOLEAN NOT NULL DEFAULT FALSE,
        presentation_id TEXT,
        slide_index BIGINT NOT NULL DEFAULT 0 CHECK (slide_index >= 0),
        slide_ids TEXT NOT NULL DEFAULT '[]'
    )
";

const CREATE_PLAYERS: &str = r"
    CREATE TABLE IF NOT EXISTS players (
        id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        answer TEXT,
        UNIQUE (session_id, name)
    )
";

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(CREATE_SESSIONS).execute(&mut *tx).await?;
    sqlx::query(CREATE_PLAYERS).execute(&mut *tx).await?;
    tx.commit().await
}
