use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PrayerName;

/// The daily total never changes, Jummah simply takes Dhuhr's place.
pub const DAILY_PRAYERS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayStats {
    pub completed: u8,
    pub total: u8,
}

impl TodayStats {
    pub fn new(completed: u8) -> Self {
        Self {
            completed: completed.min(DAILY_PRAYERS),
            total: DAILY_PRAYERS,
        }
    }

    pub fn remaining(&self) -> u8 {
        self.total.saturating_sub(self.completed)
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Missed totals across every retained day, grouped by prayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedSummary {
    pub by_prayer: BTreeMap<PrayerName, u32>,
}

impl MissedSummary {
    pub fn total(&self) -> u32 {
        self.by_prayer.values().sum()
    }

    pub fn get(&self, prayer: PrayerName) -> u32 {
        self.by_prayer.get(&prayer).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Counts for the five daily slots, Jummah folded into Dhuhr.
    pub fn by_daily_prayer(&self) -> [(PrayerName, u32); 5] {
        PrayerName::canonical(false).map(|prayer| {
            let count = match prayer {
                PrayerName::Dhuhr => self.get(PrayerName::Dhuhr) + self.get(PrayerName::Jummah),
                other => self.get(other),
            };
            (prayer, count)
        })
    }
}
