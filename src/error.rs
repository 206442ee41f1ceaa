use thiserror::Error;

use crate::models::PrayerName;

/// Validation failures raised by the time and tracking core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("{later} ({later_time}) is scheduled before {earlier} ({earlier_time})")]
    OutOfOrder {
        earlier: PrayerName,
        earlier_time: String,
        later: PrayerName,
        later_time: String,
    },

    #[error("unknown prayer '{0}'")]
    UnknownPrayer(String),

    #[error("invalid day key '{0}', expected DD-MM-YYYY")]
    InvalidDayKey(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
