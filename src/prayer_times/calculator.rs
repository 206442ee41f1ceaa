use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use rusqlite::Connection;
use salah::prelude::*;

use crate::db::repository::CacheRepo;
use crate::prayer_times::table::PrayerTimeTable;
use crate::utils::format::format_time;

/// Everything the core needs to know about one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub table: PrayerTimeTable,
    pub is_friday: bool,
    /// Hijri date as supplied by the source, if it has one.
    pub hijri: Option<String>,
    /// Times came from the fallback table rather than a real source.
    pub fallback: bool,
}

impl DaySchedule {
    pub fn new(date: NaiveDate, table: PrayerTimeTable) -> Self {
        Self {
            date,
            table,
            is_friday: date.weekday() == Weekday::Fri,
            hijri: None,
            fallback: false,
        }
    }

    fn from_fallback(date: NaiveDate, table: PrayerTimeTable) -> Self {
        Self {
            fallback: true,
            ..Self::new(date, table)
        }
    }
}

/// Source of daily prayer timings.
pub trait ScheduleProvider {
    fn name(&self) -> &'static str;
    fn schedule_for(&self, date: NaiveDate) -> Result<DaySchedule>;
}

/// A single known-good table reused for every date.
#[derive(Debug, Clone)]
pub struct FixedSchedule {
    pub table: PrayerTimeTable,
}

impl FixedSchedule {
    pub fn new(table: PrayerTimeTable) -> Self {
        Self { table }
    }
}

impl ScheduleProvider for FixedSchedule {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn schedule_for(&self, date: NaiveDate) -> Result<DaySchedule> {
        Ok(DaySchedule::from_fallback(date, self.table.clone()))
    }
}

/// Try `provider`, dropping to `fallback` if it fails or returns a bad table.
pub fn schedule_or_fallback(
    provider: &dyn ScheduleProvider,
    fallback: &FixedSchedule,
    date: NaiveDate,
) -> DaySchedule {
    match provider.schedule_for(date) {
        Ok(schedule) => {
            log::debug!("Loaded {} schedule for {}", provider.name(), date);
            schedule
        }
        Err(e) => {
            log::warn!(
                "{} schedule unavailable for {} ({:#}), using fallback times",
                provider.name(),
                date,
                e
            );
            DaySchedule::from_fallback(date, fallback.table.clone())
        }
    }
}

/// Offline astronomical calculation, cached per date in SQLite.
pub struct SalahProvider<'c> {
    conn: &'c Connection,
    calc: PrayerCalculator,
}

impl<'c> SalahProvider<'c> {
    pub fn new(conn: &'c Connection, calc: PrayerCalculator) -> Self {
        Self { conn, calc }
    }
}

impl ScheduleProvider for SalahProvider<'_> {
    fn name(&self) -> &'static str {
        "salah"
    }

    fn schedule_for(&self, date: NaiveDate) -> Result<DaySchedule> {
        let table = self.calc.get_cached_or_compute(self.conn, date)?;
        Ok(DaySchedule::new(date, table))
    }
}

pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub tz_offset_minutes: i32,
}

impl PrayerCalculator {
    pub fn new(
        lat: f64,
        lng: f64,
        method: &str,
        madhab: &str,
        tz_offset_minutes: i32,
    ) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz_offset_minutes,
        })
    }

    fn compute_times(&self, date: NaiveDate) -> Result<PrayerTimeTable> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", self.tz_offset_minutes))?;

        let local = |prayer: Prayer| -> String {
            format_time(times.time(prayer).with_timezone(&offset).time())
        };

        PrayerTimeTable::new(
            &local(Prayer::Fajr),
            &local(Prayer::Sunrise),
            &local(Prayer::Dhuhr),
            &local(Prayer::Asr),
            &local(Prayer::Maghrib),
            &local(Prayer::Isha),
        )
        .with_context(|| format!("Calculated times for {} are not usable", date))
    }

    /// Pre-compute `from` and the following `days_ahead` days into the cache.
    pub fn ensure_cached(&self, conn: &Connection, from: NaiveDate, days_ahead: u32) -> Result<()> {
        for i in 0..=i64::from(days_ahead) {
            let date = from + Duration::days(i);
            self.get_cached_or_compute(conn, date)?;
        }
        Ok(())
    }

    /// Get times from cache (or compute if missing) for a specific date.
    pub fn get_cached_or_compute(
        &self,
        conn: &Connection,
        date: NaiveDate,
    ) -> Result<PrayerTimeTable> {
        let date_str = date.format("%Y-%m-%d").to_string();

        match CacheRepo::get_times_for_date(conn, &date_str) {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring bad cache row for {}: {:#}", date_str, e),
        }

        let table = self.compute_times(date)?;
        CacheRepo::store_times(conn, &date_str, &table)?;
        Ok(table)
    }
}

fn parse_method(s: &str) -> Result<Method> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(anyhow!(
            "Unknown calculation method: '{}' (one of: {})",
            s,
            CALC_METHODS.join(", ")
        )),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

pub const CALC_METHODS: &[&str] = &[
    "MuslimWorldLeague",
    "Egyptian",
    "Karachi",
    "UmmAlQura",
    "Dubai",
    "MoonsightingCommittee",
    "NorthAmerica",
    "Kuwait",
    "Qatar",
    "Singapore",
    "Tehran",
    "Turkey",
    "Other",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::PrayerName;

    fn fallback() -> FixedSchedule {
        FixedSchedule::new(
            PrayerTimeTable::new("05:00", "06:30", "12:30", "16:00", "18:45", "20:15").unwrap(),
        )
    }

    struct Broken;

    impl ScheduleProvider for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn schedule_for(&self, _date: NaiveDate) -> Result<DaySchedule> {
            Err(anyhow!("network down"))
        }
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(PrayerCalculator::new(33.7, 73.0, "Lunar", "Hanafi", 300).is_err());
        assert!(PrayerCalculator::new(33.7, 73.0, "Karachi", "Maliki", 300).is_err());
    }

    #[test]
    fn fixed_schedule_flags_fridays() {
        let friday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(fallback().schedule_for(friday).unwrap().is_friday);
        assert!(!fallback().schedule_for(saturday).unwrap().is_friday);
    }

    #[test]
    fn failing_provider_falls_back() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let schedule = schedule_or_fallback(&Broken, &fallback(), date);
        assert_eq!(schedule.table.get(PrayerName::Fajr), "05:00");
        assert_eq!(schedule.date, date);
        assert!(schedule.fallback);
    }

    #[test]
    fn salah_times_are_ordered_and_cached() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let calc = PrayerCalculator::new(33.6938, 73.0651, "Karachi", "Hanafi", 300).unwrap();
        let provider = SalahProvider::new(&conn, calc);
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

        let first = provider.schedule_for(date).unwrap();
        assert!(!first.fallback);
        assert!(CacheRepo::get_times_for_date(&conn, "2026-06-01")
            .unwrap()
            .is_some());
        let second = provider.schedule_for(date).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_cached_fills_the_week() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let calc = PrayerCalculator::new(21.4225, 39.8262, "UmmAlQura", "Shafi", 180).unwrap();
        let from = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        calc.ensure_cached(&conn, from, 7).unwrap();
        for day in ["2026-10-18", "2026-10-21", "2026-10-25"] {
            assert!(CacheRepo::get_times_for_date(&conn, day).unwrap().is_some());
        }
        assert!(CacheRepo::get_times_for_date(&conn, "2026-10-26")
            .unwrap()
            .is_none());
    }
}
