/// SQLite pool creation and schema initialization for the roster
///
/// Four tables: collaborators, skills, and the two join tables
/// (collaborator_skills, collaborator_projects). Both joins cascade on
/// collaborator removal; skills are never garbage-collected.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if missing) the roster database and make sure the schema exists
pub async fn open_pool(path: &str) -> Result<SqlitePool> {
    let pool = if path == IN_MEMORY {
        // One long-lived connection: the database disappears with its last connection
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?
    } else {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create database directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        tracing::info!("🗄️ Opening roster database: {}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?
    };

    init_schema(&pool).await?;

    tracing::info!("✅ Roster database ready: {}", path);

    Ok(pool)
}

/// Create tables and indexes. Safe to call multiple times (uses IF NOT EXISTS).
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaborators (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            nome TEXT NOT NULL,
            cargo TEXT NOT NULL,
            level TEXT NOT NULL CHECK(level IN ('beginner', 'intermediate', 'advanced'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaborator_skills (
            collaborator_id INTEGER NOT NULL,
            skill_id INTEGER NOT NULL,
            nivel TEXT NOT NULL CHECK(nivel IN ('beginner', 'intermediate', 'advanced')),
            PRIMARY KEY (collaborator_id, skill_id),
            FOREIGN KEY (collaborator_id) REFERENCES collaborators(id) ON DELETE CASCADE,
            FOREIGN KEY (skill_id) REFERENCES skills(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaborator_projects (
            collaborator_id INTEGER NOT NULL,
            project_id INTEGER NOT NULL,
            PRIMARY KEY (collaborator_id, project_id),
            FOREIGN KEY (collaborator_id) REFERENCES collaborators(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_collaborator_projects_project ON collaborator_projects(project_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
