//! The board owns all mutable tracker state: today's schedule, the
//! completion/missed records and the store they are written through to.
//! Views are plain values projected from that state; the only inbound user
//! actions are `mark_complete` and `mark_incomplete`.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::store::{RecordStore, SqliteStore};
use crate::models::{DayKey, MissedSummary, PrayerName, PrayerStatus, TodayStats};
use crate::prayer_times::{
    schedule_or_fallback, DaySchedule, FixedSchedule, NextPrayer, PrayerCalculator,
    SalahProvider, ScheduleProvider, WindowClassifier,
};
use crate::tracker::{Changes, CompletionTracker};
use crate::utils::format::format_duration_minutes;
use crate::utils::hijri::display_hijri;
use crate::utils::time_math::minutes_until;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerRow {
    pub prayer: PrayerName,
    pub label: &'static str,
    pub arabic: &'static str,
    pub start: String,
    pub end: String,
    pub is_active: bool,
    pub is_forbidden: bool,
    pub is_completed: bool,
    pub status: PrayerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub date: NaiveDate,
    pub now: String,
    pub hijri: String,
    pub fallback_times: bool,
    pub sunrise: String,
    pub rows: Vec<PrayerRow>,
    pub stats: TodayStats,
    pub completed_count: u8,
    pub remaining_count: u8,
    pub missed: MissedSummary,
    pub next: NextPrayer,
    pub next_label: String,
    pub in_forbidden_window: bool,
}

pub struct BoardSettings {
    pub retention_days: i64,
    pub hijri_offset: i32,
}

pub struct Board<'a> {
    provider: Box<dyn ScheduleProvider + 'a>,
    fallback: FixedSchedule,
    store: Box<dyn RecordStore + 'a>,
    tracker: CompletionTracker,
    schedule: DaySchedule,
    settings: BoardSettings,
}

/// Wire the board to the SQLite store and the configured calculator.
pub fn open_board<'c>(
    conn: &'c Connection,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<Board<'c>> {
    let fallback = config.fallback.schedule()?;
    let provider: Box<dyn ScheduleProvider + 'c> = match PrayerCalculator::new(
        config.salah.latitude,
        config.salah.longitude,
        &config.salah.calc_method,
        &config.salah.madhab,
        config.salah.timezone_offset,
    ) {
        Ok(calc) => Box::new(SalahProvider::new(conn, calc)),
        Err(e) => {
            log::warn!("{:#}; showing fallback times", e);
            Box::new(fallback.clone())
        }
    };
    Board::open(
        provider,
        fallback,
        Box::new(SqliteStore::new(conn)),
        BoardSettings {
            retention_days: config.tracker.retention_days,
            hijri_offset: config.salah.hijri_offset,
        },
        now,
    )
}

fn clock(now: NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}

impl<'a> Board<'a> {
    /// Load both records, fetch today's schedule, sweep old days and catch up
    /// on anything missed while the app was closed.
    pub fn open(
        provider: Box<dyn ScheduleProvider + 'a>,
        fallback: FixedSchedule,
        store: Box<dyn RecordStore + 'a>,
        settings: BoardSettings,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let completed = store.load_completed().context("Loading completed prayers")?;
        let missed = store.load_missed().context("Loading missed prayers")?;
        log::debug!(
            "Loaded {} completion day(s), {} missed day(s)",
            completed.len(),
            missed.len()
        );

        let schedule = schedule_or_fallback(provider.as_ref(), &fallback, now.date());
        let mut board = Self {
            provider,
            fallback,
            store,
            tracker: CompletionTracker::new(completed, missed),
            schedule,
            settings,
        };

        let swept = board
            .tracker
            .purge_older_than(now.date(), board.settings.retention_days);
        board.persist(swept)?;
        board.refresh(now)?;
        Ok(board)
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn today(&self) -> DayKey {
        DayKey::from_date(self.schedule.date)
    }

    fn classifier(&self) -> WindowClassifier<'_> {
        WindowClassifier::new(&self.schedule.table, self.schedule.is_friday)
    }

    /// Status tick: roll over to a new day if needed, then flag prayers whose
    /// window has closed. Returns whether any record changed.
    pub fn refresh(&mut self, now: NaiveDateTime) -> Result<bool> {
        let mut changes = self.roll_over(now)?;
        let today = self.today();
        let classifier = WindowClassifier::new(&self.schedule.table, self.schedule.is_friday);
        let detected = self
            .tracker
            .detect_missed(&today, &classifier, &clock(now))?;
        changes.completed |= detected.completed;
        changes.missed |= detected.missed;
        self.persist(changes)?;
        Ok(changes.any())
    }

    fn roll_over(&mut self, now: NaiveDateTime) -> Result<Changes> {
        if now.date() == self.schedule.date {
            return Ok(Changes::default());
        }
        log::info!("Day changed {} -> {}", self.schedule.date, now.date());
        self.schedule = schedule_or_fallback(self.provider.as_ref(), &self.fallback, now.date());
        Ok(self
            .tracker
            .purge_older_than(now.date(), self.settings.retention_days))
    }

    /// Map a user-supplied name onto today's canonical list: Dhuhr and Jummah
    /// are interchangeable depending on the weekday, Sunrise is not prayed.
    fn resolve(&self, prayer: PrayerName) -> Result<PrayerName> {
        if prayer == PrayerName::Sunrise {
            bail!("Sunrise is not a prayer and cannot be marked");
        }
        let resolved = if prayer.slot() == PrayerName::Dhuhr {
            self.classifier().canonical_prayers()[1]
        } else {
            prayer
        };
        Ok(resolved)
    }

    pub fn mark_complete(&mut self, prayer: PrayerName, now: NaiveDateTime) -> Result<PrayerStatus> {
        self.refresh(now)?;
        let prayer = self.resolve(prayer)?;
        let today = self.today();
        let changes = self.tracker.mark_complete(&today, prayer);
        self.persist(changes)?;
        Ok(self.tracker.status(&today, prayer))
    }

    pub fn mark_incomplete(
        &mut self,
        prayer: PrayerName,
        now: NaiveDateTime,
    ) -> Result<PrayerStatus> {
        self.refresh(now)?;
        let prayer = self.resolve(prayer)?;
        let today = self.today();
        let classifier = WindowClassifier::new(&self.schedule.table, self.schedule.is_friday);
        let changes = self
            .tracker
            .mark_incomplete(&today, prayer, &classifier, &clock(now))?;
        self.persist(changes)?;
        Ok(self.tracker.status(&today, prayer))
    }

    /// Checkbox behaviour: complete if not completed, otherwise unmark.
    pub fn toggle(&mut self, prayer: PrayerName, now: NaiveDateTime) -> Result<PrayerStatus> {
        let resolved = self.resolve(prayer)?;
        if self.tracker.is_completed(&DayKey::from_timestamp(now), resolved) {
            self.mark_incomplete(prayer, now)
        } else {
            self.mark_complete(prayer, now)
        }
    }

    pub fn view(&self, now: NaiveDateTime) -> Result<BoardView> {
        let now_str = clock(now);
        let today = self.today();
        let classifier = self.classifier();
        let forbidden_now = classifier.is_forbidden_window(&now_str)?;
        let active = classifier.active_prayer(&now_str)?;

        let mut rows = Vec::with_capacity(5);
        for prayer in classifier.canonical_prayers() {
            let in_window = classifier.is_within_window(prayer, &now_str)?;
            rows.push(PrayerRow {
                prayer,
                label: prayer.display_name(),
                arabic: prayer.arabic_name(),
                start: classifier.start_time_of(prayer).to_string(),
                end: classifier.end_time_of(prayer).to_string(),
                is_active: active == Some(prayer),
                is_forbidden: in_window && forbidden_now,
                is_completed: self.tracker.is_completed(&today, prayer),
                status: self.tracker.status(&today, prayer),
            });
        }

        let next = classifier.next_prayer(&now_str)?;
        let next_label = match &next.countdown {
            Some(countdown) => format!("{} in {}", next.prayer, countdown),
            None => format!(
                "{} tomorrow at {} (in {})",
                next.prayer,
                next.start,
                format_duration_minutes(minutes_until(&now_str, &next.start)?)
            ),
        };

        let stats = self.tracker.today_stats(&today);
        Ok(BoardView {
            date: self.schedule.date,
            now: now_str,
            hijri: display_hijri(
                self.schedule.date,
                self.settings.hijri_offset,
                self.schedule.hijri.as_deref(),
            ),
            fallback_times: self.schedule.fallback,
            sunrise: self.schedule.table.get(PrayerName::Sunrise).to_string(),
            rows,
            stats,
            completed_count: stats.completed,
            remaining_count: stats.remaining(),
            missed: self.tracker.missed_counts_by_prayer(),
            next,
            next_label,
            in_forbidden_window: forbidden_now,
        })
    }

    fn persist(&mut self, changes: Changes) -> Result<()> {
        if changes.completed {
            self.store
                .save_completed(self.tracker.completed())
                .context("Saving completed prayers")?;
        }
        if changes.missed {
            self.store
                .save_missed(self.tracker.missed())
                .context("Saving missed prayers")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use crate::prayer_times::PrayerTimeTable;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn table() -> PrayerTimeTable {
        PrayerTimeTable::new("04:30", "06:15", "12:15", "15:45", "18:30", "20:00").unwrap()
    }

    fn fallback() -> FixedSchedule {
        FixedSchedule::new(
            PrayerTimeTable::new("05:00", "06:30", "12:30", "16:00", "18:45", "20:15").unwrap(),
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn settings() -> BoardSettings {
        BoardSettings {
            retention_days: 30,
            hijri_offset: 0,
        }
    }

    /// Store handle the test can keep inspecting after the board takes it.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl RecordStore for SharedStore {
        fn load_completed(&self) -> Result<crate::models::CompletionRecord> {
            self.0.borrow().load_completed()
        }
        fn load_missed(&self) -> Result<crate::models::MissedRecord> {
            self.0.borrow().load_missed()
        }
        fn save_completed(&mut self, record: &crate::models::CompletionRecord) -> Result<()> {
            self.0.borrow_mut().save_completed(record)
        }
        fn save_missed(&mut self, record: &crate::models::MissedRecord) -> Result<()> {
            self.0.borrow_mut().save_missed(record)
        }
    }

    struct Offline;

    impl ScheduleProvider for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }
        fn schedule_for(&self, _date: NaiveDate) -> Result<DaySchedule> {
            Err(anyhow!("no network"))
        }
    }

    fn board(store: SharedStore, now: NaiveDateTime) -> Board<'static> {
        Board::open(
            Box::new(FixedSchedule::new(table())),
            fallback(),
            Box::new(store),
            settings(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn view_projects_the_schedule() {
        let board = board(SharedStore::default(), at(2026, 10, 18, 5, 0));
        let view = board.view(at(2026, 10, 18, 5, 0)).unwrap();

        assert_eq!(view.rows.len(), 5);
        assert_eq!(view.rows[0].prayer, PrayerName::Fajr);
        assert!(view.rows[0].is_active);
        assert!(!view.rows[0].is_forbidden);
        assert_eq!(view.rows[0].end, "06:15");
        assert_eq!(view.rows[4].end, "23:59");
        assert_eq!(view.sunrise, "06:15");
        assert_eq!(view.completed_count, 0);
        assert_eq!(view.remaining_count, 5);
        assert_eq!(view.next.prayer, PrayerName::Dhuhr);
        assert_eq!(view.next_label, "Dhuhr in 7h 15m");
    }

    #[test]
    fn forbidden_window_suppresses_active_but_flags_row() {
        let board = board(SharedStore::default(), at(2026, 10, 18, 6, 5));
        let view = board.view(at(2026, 10, 18, 6, 5)).unwrap();
        assert!(view.in_forbidden_window);
        assert!(!view.rows[0].is_active);
        assert!(view.rows[0].is_forbidden);
        assert!(view.rows.iter().skip(1).all(|r| !r.is_forbidden));
    }

    #[test]
    fn friday_shows_jummah_and_accepts_dhuhr() {
        // 16 Oct 2026 is a Friday.
        let now = at(2026, 10, 16, 13, 0);
        let mut board = board(SharedStore::default(), now);
        assert!(board.schedule().is_friday);
        let status = board.mark_complete(PrayerName::Dhuhr, now).unwrap();
        assert_eq!(status, PrayerStatus::Completed);

        let view = board.view(now).unwrap();
        assert_eq!(view.rows[1].prayer, PrayerName::Jummah);
        assert!(view.rows[1].is_completed);
        assert_eq!(view.completed_count, 1);
        assert_eq!(view.stats.total, 5);
    }

    #[test]
    fn sunrise_cannot_be_marked() {
        let now = at(2026, 10, 18, 7, 0);
        let mut board = board(SharedStore::default(), now);
        assert!(board.mark_complete(PrayerName::Sunrise, now).is_err());
    }

    #[test]
    fn opening_catches_up_on_missed_prayers_and_persists() {
        let store = SharedStore::default();
        let board = board(store.clone(), at(2026, 10, 18, 16, 0));
        let view = board.view(at(2026, 10, 18, 16, 0)).unwrap();
        assert_eq!(view.rows[0].status, PrayerStatus::Missed);
        assert_eq!(view.rows[1].status, PrayerStatus::Missed);
        assert_eq!(view.rows[2].status, PrayerStatus::Pending);
        assert_eq!(view.missed.total(), 2);

        let saved = store.0.borrow().load_missed().unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn unmark_after_window_goes_to_missed_and_survives_restart() {
        let store = SharedStore::default();
        let mut board = board(store.clone(), at(2026, 10, 18, 17, 0));
        board
            .mark_complete(PrayerName::Asr, at(2026, 10, 18, 20, 0))
            .unwrap();
        let status = board
            .mark_incomplete(PrayerName::Asr, at(2026, 10, 18, 20, 5))
            .unwrap();
        assert_eq!(status, PrayerStatus::Missed);
        drop(board);

        let reopened = self::board(store, at(2026, 10, 18, 20, 10));
        let today = reopened.today();
        assert_eq!(
            reopened.tracker().status(&today, PrayerName::Asr),
            PrayerStatus::Missed
        );
    }

    #[test]
    fn toggle_flips_completion() {
        let now = at(2026, 10, 18, 13, 0);
        let mut board = board(SharedStore::default(), now);
        assert_eq!(
            board.toggle(PrayerName::Dhuhr, now).unwrap(),
            PrayerStatus::Completed
        );
        assert_eq!(
            board.toggle(PrayerName::Dhuhr, now).unwrap(),
            PrayerStatus::Pending
        );
    }

    #[test]
    fn rollover_fetches_new_day_and_sweeps() {
        let store = SharedStore::default();
        let old_day = DayKey::from_date(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        {
            let mut completed = crate::models::CompletionRecord::new();
            completed.entry(old_day.clone()).or_default().insert(PrayerName::Fajr);
            store.0.borrow_mut().save_completed(&completed).unwrap();
        }

        // 30 Sep: 1 Sep is 29 days back and survives opening.
        let mut board = board(store.clone(), at(2026, 9, 30, 23, 0));
        assert!(board.tracker().completed().contains_key(&old_day));

        // 2 Oct: 31 days back, swept at rollover.
        assert!(board.refresh(at(2026, 10, 2, 0, 5)).unwrap());
        assert_eq!(board.schedule().date, NaiveDate::from_ymd_opt(2026, 10, 2).unwrap());
        assert!(!board.tracker().completed().contains_key(&old_day));
        assert!(store.0.borrow().load_completed().unwrap().is_empty());
    }

    #[test]
    fn failing_provider_uses_fallback_table() {
        let now = at(2026, 10, 18, 9, 0);
        let board = Board::open(
            Box::new(Offline),
            fallback(),
            Box::new(SharedStore::default()),
            settings(),
            now,
        )
        .unwrap();
        let view = board.view(now).unwrap();
        assert!(view.fallback_times);
        assert_eq!(view.rows[0].start, "05:00");
    }

    #[test]
    fn after_isha_next_is_tomorrows_fajr() {
        let now = at(2026, 10, 18, 22, 0);
        let board = board(SharedStore::default(), now);
        let view = board.view(now).unwrap();
        assert!(view.next.tomorrow);
        assert_eq!(view.next_label, "Fajr tomorrow at 04:30 (in 6h 30m)");
    }
}
