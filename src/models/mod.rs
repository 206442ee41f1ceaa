pub mod prayer;
pub mod records;
pub mod stats;

pub use prayer::{PrayerName, PrayerStatus};
pub use records::{CompletionRecord, DayKey, MissedEntry, MissedRecord};
pub use stats::{MissedSummary, TodayStats};
