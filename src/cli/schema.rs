use std::fs;

use crate::forum::migrate_schema;
use crate::store::SqliteStore;

use super::Context;

pub fn run_migrate_schema(ctx: &Context) -> anyhow::Result<()> {
    let db_path = ctx.db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::with_busy_timeout(&db_path, ctx.config.busy_timeout())?;
    let applied = migrate_schema(&store)?;

    for version in &applied {
        println!("Applied schema version {version}");
    }
    if let Some(latest) = applied.last() {
        println!("Database at {} is at version {latest}", db_path.display());
    }

    Ok(())
}
