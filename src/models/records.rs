use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, CoreResult};
use crate::models::PrayerName;

const DAY_KEY_FORMAT: &str = "%d-%m-%Y";

/// Calendar-day bucket, stored as `DD-MM-YYYY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        DayKey(date.format(DAY_KEY_FORMAT).to_string())
    }

    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        Self::from_date(ts.date())
    }

    pub fn parse(&self) -> CoreResult<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, DAY_KEY_FORMAT)
            .map_err(|_| CoreError::InvalidDayKey(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DayKey {
    fn from(s: &str) -> Self {
        DayKey(s.to_string())
    }
}

/// A prayer whose window closed without a completion mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedEntry {
    pub date: DayKey,
    /// Scheduled start time, "HH:MM".
    pub time: String,
}

/// Prayers marked complete, per day. Empty days are removed.
pub type CompletionRecord = BTreeMap<DayKey, BTreeSet<PrayerName>>;

/// Prayers detected as missed, per day. Empty days are removed.
pub type MissedRecord = BTreeMap<DayKey, BTreeMap<PrayerName, MissedEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_round_trips_through_a_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let key = DayKey::from_date(date);
        assert_eq!(key.as_str(), "07-03-2026");
        assert_eq!(key.parse().unwrap(), date);
    }

    #[test]
    fn day_key_from_timestamp_ignores_the_time() {
        let ts = NaiveDate::from_ymd_opt(2026, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(DayKey::from_timestamp(ts).as_str(), "31-12-2026");
    }

    #[test]
    fn garbage_day_key_does_not_parse() {
        let key = DayKey::from("someday");
        assert_eq!(
            key.parse(),
            Err(CoreError::InvalidDayKey("someday".to_string()))
        );
    }
}
