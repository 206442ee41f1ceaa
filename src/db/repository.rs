use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::PrayerName;
use crate::prayer_times::PrayerTimeTable;

// ─── Cached prayer times ────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    pub fn get_times_for_date(conn: &Connection, date: &str) -> Result<Option<PrayerTimeTable>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha
                 FROM prayer_times_cache WHERE date = ?1",
                params![date],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((fajr, sunrise, dhuhr, asr, maghrib, isha)) => {
                let table = PrayerTimeTable::new(&fajr, &sunrise, &dhuhr, &asr, &maghrib, &isha)
                    .with_context(|| format!("Cached times for {}", date))?;
                Ok(Some(table))
            }
        }
    }

    pub fn clear_all(conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM prayer_times_cache", [])?;
        Ok(())
    }

    pub fn store_times(conn: &Connection, date: &str, table: &PrayerTimeTable) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO prayer_times_cache (date, fajr, sunrise, dhuhr, asr, maghrib, isha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                date,
                table.get(PrayerName::Fajr),
                table.get(PrayerName::Sunrise),
                table.get(PrayerName::Dhuhr),
                table.get(PrayerName::Asr),
                table.get(PrayerName::Maghrib),
                table.get(PrayerName::Isha),
            ],
        )?;
        Ok(())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn cache_round_trip_and_clear() {
        let conn = conn();
        let table =
            PrayerTimeTable::new("04:30", "06:15", "12:15", "15:45", "18:30", "20:00").unwrap();
        assert!(CacheRepo::get_times_for_date(&conn, "2026-10-18").unwrap().is_none());

        CacheRepo::store_times(&conn, "2026-10-18", &table).unwrap();
        assert_eq!(
            CacheRepo::get_times_for_date(&conn, "2026-10-18").unwrap(),
            Some(table)
        );

        CacheRepo::clear_all(&conn).unwrap();
        assert!(CacheRepo::get_times_for_date(&conn, "2026-10-18").unwrap().is_none());
    }

    #[test]
    fn corrupt_cache_row_is_an_error() {
        let conn = conn();
        conn.execute(
            "INSERT INTO prayer_times_cache VALUES ('2026-10-18', '4:30', '06:15', '12:15', '15:45', '18:30', '20:00')",
            [],
        )
        .unwrap();
        assert!(CacheRepo::get_times_for_date(&conn, "2026-10-18").is_err());
    }

    #[test]
    fn meta_upserts() {
        let conn = conn();
        assert_eq!(MetaRepo::get(&conn, "k").unwrap(), None);
        MetaRepo::set(&conn, "k", "1").unwrap();
        MetaRepo::set(&conn, "k", "2").unwrap();
        assert_eq!(MetaRepo::get(&conn, "k").unwrap().as_deref(), Some("2"));
    }
}
