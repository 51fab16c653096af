use anyhow::{bail, Context, Result};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

/// Applied in order; a migration's `version` is the `user_version` the
/// database reports once it has run.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "accounts and persisted sign-in state",
    sql: include_str!("schemas/schema_v1.sql"),
}];

const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")
}

/// Brings the schema up to [`CURRENT_SCHEMA_VERSION`] in one transaction.
/// A database written by a newer build is refused rather than touched.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let found = schema_version(conn)?;
    if found > CURRENT_SCHEMA_VERSION {
        bail!(
            "database schema v{found} is newer than supported schema v{CURRENT_SCHEMA_VERSION}"
        );
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction().context("failed to begin schema upgrade")?;
    for migration in pending {
        tx.execute_batch(migration.sql).with_context(|| {
            format!("schema v{} ({}) failed", migration.version, migration.description)
        })?;
        info!("Applied schema v{}: {}", migration.version, migration.description);
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to record schema version")?;
    tx.commit().context("failed to commit schema upgrade")?;

    Ok(())
}
