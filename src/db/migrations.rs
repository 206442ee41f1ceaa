use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS prayer_times_cache (
            date     TEXT PRIMARY KEY,
            fajr     TEXT NOT NULL,
            sunrise  TEXT NOT NULL,
            dhuhr    TEXT NOT NULL,
            asr      TEXT NOT NULL,
            maghrib  TEXT NOT NULL,
            isha     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key        TEXT PRIMARY KEY,
            value      TEXT,
            updated_at TEXT DEFAULT (datetime('now'))
        );
    ")?;
    Ok(())
}
