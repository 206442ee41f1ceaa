//! Whole-record persistence for completion and missed-prayer state.
//!
//! Records are written in full on every change and read once at startup; a
//! missing key reads as an empty record.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::HashMap;

use crate::db::repository::MetaRepo;
use crate::models::{CompletionRecord, MissedRecord};

const COMPLETED_KEY: &str = "completed_prayers";
const MISSED_KEY: &str = "missed_prayers";

pub trait RecordStore {
    fn load_completed(&self) -> Result<CompletionRecord>;
    fn load_missed(&self) -> Result<MissedRecord>;
    fn save_completed(&mut self, record: &CompletionRecord) -> Result<()>;
    fn save_missed(&mut self, record: &MissedRecord) -> Result<()>;
}

/// JSON values in the `app_meta` key-value table.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn load<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match MetaRepo::get(self.conn, key)? {
            None => Ok(T::default()),
            Some(json) => {
                serde_json::from_str(&json).with_context(|| format!("Parsing stored {}", key))
            }
        }
    }

    fn save<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).with_context(|| format!("Serializing {}", key))?;
        MetaRepo::set(self.conn, key, &json)?;
        log::debug!("Saved {} ({} bytes)", key, json.len());
        Ok(())
    }
}

impl RecordStore for SqliteStore<'_> {
    fn load_completed(&self) -> Result<CompletionRecord> {
        self.load(COMPLETED_KEY)
    }

    fn load_missed(&self) -> Result<MissedRecord> {
        self.load(MISSED_KEY)
    }

    fn save_completed(&mut self, record: &CompletionRecord) -> Result<()> {
        self.save(COMPLETED_KEY, record)
    }

    fn save_missed(&mut self, record: &MissedRecord) -> Result<()> {
        self.save(MISSED_KEY, record)
    }
}

/// In-process store, serialized the same way as the SQLite one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<&'static str, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn load<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.values.get(key) {
            None => Ok(T::default()),
            Some(json) => Ok(serde_json::from_str(json)?),
        }
    }
}

impl RecordStore for MemoryStore {
    fn load_completed(&self) -> Result<CompletionRecord> {
        self.load(COMPLETED_KEY)
    }

    fn load_missed(&self) -> Result<MissedRecord> {
        self.load(MISSED_KEY)
    }

    fn save_completed(&mut self, record: &CompletionRecord) -> Result<()> {
        self.values
            .insert(COMPLETED_KEY, serde_json::to_string(record)?);
        Ok(())
    }

    fn save_missed(&mut self, record: &MissedRecord) -> Result<()> {
        self.values.insert(MISSED_KEY, serde_json::to_string(record)?);
        Ok(())
    }
}
