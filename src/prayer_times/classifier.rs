//! Classifies a moment of the day against a prayer-time table.

use serde::Serialize;

use crate::error::CoreResult;
use crate::models::PrayerName;
use crate::prayer_times::table::PrayerTimeTable;
use crate::utils::time_math::{
    add_minutes, is_time_in_range, subtract_minutes, time_difference, to_minutes, END_OF_DAY,
};

/// Minutes after Fajr at which the pre-sunrise disliked window opens.
const AFTER_FAJR_MINUTES: i32 = 90;
/// Minutes before Dhuhr covering the zenith.
const BEFORE_DHUHR_MINUTES: i32 = 10;
/// Minutes before Maghrib covering sunset.
const BEFORE_MAGHRIB_MINUTES: i32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextPrayer {
    pub prayer: PrayerName,
    pub start: String,
    /// Countdown such as "2h 5m"; only set for prayers later today.
    pub countdown: Option<String>,
    pub tomorrow: bool,
}

pub struct WindowClassifier<'a> {
    table: &'a PrayerTimeTable,
    is_friday: bool,
}

impl<'a> WindowClassifier<'a> {
    pub fn new(table: &'a PrayerTimeTable, is_friday: bool) -> Self {
        Self { table, is_friday }
    }

    pub fn canonical_prayers(&self) -> [PrayerName; 5] {
        PrayerName::canonical(self.is_friday)
    }

    pub fn start_time_of(&self, prayer: PrayerName) -> &str {
        self.table.get(prayer)
    }

    /// Closing boundary of a prayer's window.
    pub fn end_time_of(&self, prayer: PrayerName) -> &str {
        match prayer.slot() {
            PrayerName::Fajr => self.table.get(PrayerName::Sunrise),
            PrayerName::Sunrise => self.table.get(PrayerName::Dhuhr),
            PrayerName::Dhuhr | PrayerName::Jummah => self.table.get(PrayerName::Asr),
            PrayerName::Asr => self.table.get(PrayerName::Maghrib),
            PrayerName::Maghrib => self.table.get(PrayerName::Isha),
            PrayerName::Isha => END_OF_DAY,
        }
    }

    /// True inside [Fajr+90m, Sunrise), [Dhuhr-10m, Dhuhr) or
    /// [Maghrib-15m, Maghrib].
    pub fn is_forbidden_window(&self, now: &str) -> CoreResult<bool> {
        let now_min = to_minutes(now)?;
        let fajr = self.table.get(PrayerName::Fajr);
        let sunrise = self.table.get(PrayerName::Sunrise);
        let dhuhr = self.table.get(PrayerName::Dhuhr);
        let maghrib = self.table.get(PrayerName::Maghrib);

        // Offsets are applied to raw minutes, never wrapped across midnight.
        let after_fajr = to_minutes(fajr)? + AFTER_FAJR_MINUTES;
        if after_fajr <= now_min && now_min < to_minutes(sunrise)? {
            return Ok(true);
        }

        let dhuhr_min = to_minutes(dhuhr)?;
        if dhuhr_min - BEFORE_DHUHR_MINUTES <= now_min && now_min < dhuhr_min {
            return Ok(true);
        }

        let maghrib_min = to_minutes(maghrib)?;
        Ok(maghrib_min - BEFORE_MAGHRIB_MINUTES <= now_min && now_min <= maghrib_min)
    }

    /// The three disliked windows as display ranges, in day order.
    pub fn forbidden_windows(&self) -> CoreResult<[(String, String); 3]> {
        let sunrise = self.table.get(PrayerName::Sunrise);
        let dhuhr = self.table.get(PrayerName::Dhuhr);
        let maghrib = self.table.get(PrayerName::Maghrib);
        Ok([
            (
                add_minutes(self.table.get(PrayerName::Fajr), AFTER_FAJR_MINUTES)?,
                sunrise.to_string(),
            ),
            (subtract_minutes(dhuhr, BEFORE_DHUHR_MINUTES)?, dhuhr.to_string()),
            (subtract_minutes(maghrib, BEFORE_MAGHRIB_MINUTES)?, maghrib.to_string()),
        ])
    }

    /// Whether `now` lies inside the prayer's [start, end] window, ignoring
    /// forbidden windows.
    pub fn is_within_window(&self, prayer: PrayerName, now: &str) -> CoreResult<bool> {
        is_time_in_range(now, self.start_time_of(prayer), self.end_time_of(prayer))
    }

    /// The prayer whose window contains `now`, unless `now` is forbidden.
    pub fn active_prayer(&self, now: &str) -> CoreResult<Option<PrayerName>> {
        if self.is_forbidden_window(now)? {
            return Ok(None);
        }
        for prayer in self.canonical_prayers() {
            if self.is_within_window(prayer, now)? {
                return Ok(Some(prayer));
            }
        }
        Ok(None)
    }

    /// Whether the prayer's window has closed as of `now`.
    pub fn has_ended(&self, prayer: PrayerName, now: &str) -> CoreResult<bool> {
        Ok(to_minutes(now)? > to_minutes(self.end_time_of(prayer))?)
    }

    /// First prayer starting strictly after `now`, or tomorrow's Fajr.
    ///
    /// Tomorrow's Fajr is read from today's table; the caller swaps in the
    /// next day's schedule at rollover.
    pub fn next_prayer(&self, now: &str) -> CoreResult<NextPrayer> {
        let now_min = to_minutes(now)?;
        for prayer in self.canonical_prayers() {
            let start = self.start_time_of(prayer);
            if to_minutes(start)? > now_min {
                return Ok(NextPrayer {
                    prayer,
                    start: start.to_string(),
                    countdown: Some(time_difference(now, start)?),
                    tomorrow: false,
                });
            }
        }
        Ok(NextPrayer {
            prayer: PrayerName::Fajr,
            start: self.table.get(PrayerName::Fajr).to_string(),
            countdown: None,
            tomorrow: true,
        })
    }
}
