use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 1;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plants (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            author       TEXT NOT NULL DEFAULT '',
            cover_url    TEXT,
            total_pages  INTEGER NOT NULL,
            current_page INTEGER NOT NULL DEFAULT 0,
            status       TEXT NOT NULL DEFAULT 'growing',
            planted_at   TEXT NOT NULL,
            harvested_at TEXT
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_plants_status       ON plants(status);
        CREATE INDEX IF NOT EXISTS idx_plants_harvested_at ON plants(harvested_at);
        ",
    )?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}
