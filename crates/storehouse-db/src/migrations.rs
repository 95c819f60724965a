//! Embedded schema migrations.
//!
//! Files live in `migrations/sqlite/` at the workspace root and are compiled
//! into the binary by `sqlx::migrate!`. sqlx records a checksum per applied
//! file, so a released migration is never edited; changes go in a new
//! `NNN_*.sql` file.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Counts of embedded and applied migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every migration not yet recorded in `_sqlx_migrations`, each in
/// its own transaction and in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    let status = migration_status(pool).await?;
    debug!(
        embedded = status.embedded,
        applied = status.applied,
        "Schema up to date"
    );
    Ok(())
}

pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
