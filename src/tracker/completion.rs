//! Per-day completion and missed-prayer bookkeeping.
//!
//! A (day, prayer) pair is `pending` until the user marks it complete or its
//! window closes unmarked, at which point it becomes `missed`. Marking a
//! missed prayer complete clears the missed entry; unmarking a completed
//! prayer after its window closed makes it missed straight away.

use chrono::{Duration, NaiveDate};
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::error::CoreResult;
use crate::models::{
    CompletionRecord, DayKey, MissedEntry, MissedRecord, MissedSummary, PrayerName,
    PrayerStatus, TodayStats,
};
use crate::prayer_times::WindowClassifier;

/// Which records an operation touched, so callers persist only those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub completed: bool,
    pub missed: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.completed || self.missed
    }

    fn merge(self, other: Changes) -> Changes {
        Changes {
            completed: self.completed || other.completed,
            missed: self.missed || other.missed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    completed: CompletionRecord,
    missed: MissedRecord,
}

impl CompletionTracker {
    pub fn new(completed: CompletionRecord, missed: MissedRecord) -> Self {
        Self { completed, missed }
    }

    pub fn completed(&self) -> &CompletionRecord {
        &self.completed
    }

    pub fn missed(&self) -> &MissedRecord {
        &self.missed
    }

    pub fn is_completed(&self, day: &DayKey, prayer: PrayerName) -> bool {
        self.completed
            .get(day)
            .is_some_and(|set| set.contains(&prayer))
    }

    pub fn is_missed(&self, day: &DayKey, prayer: PrayerName) -> bool {
        self.missed
            .get(day)
            .is_some_and(|m| m.contains_key(&prayer))
    }

    pub fn status(&self, day: &DayKey, prayer: PrayerName) -> PrayerStatus {
        if self.is_completed(day, prayer) {
            PrayerStatus::Completed
        } else if self.is_missed(day, prayer) {
            PrayerStatus::Missed
        } else {
            PrayerStatus::Pending
        }
    }

    /// Mark a prayer complete, clearing a missed entry if one exists.
    pub fn mark_complete(&mut self, day: &DayKey, prayer: PrayerName) -> Changes {
        let completed = self
            .completed
            .entry(day.clone())
            .or_default()
            .insert(prayer);
        let missed = self.clear_missed(day, prayer);
        if missed {
            log::info!("{} on {} made up, no longer missed", prayer, day);
        }
        Changes { completed, missed }
    }

    /// Remove a completion mark. If the window has already closed the prayer
    /// goes straight to missed.
    pub fn mark_incomplete(
        &mut self,
        day: &DayKey,
        prayer: PrayerName,
        classifier: &WindowClassifier<'_>,
        now: &str,
    ) -> CoreResult<Changes> {
        let ended = classifier.has_ended(prayer, now)?;
        let mut changes = Changes::default();

        if let Some(set) = self.completed.get_mut(day) {
            changes.completed = set.remove(&prayer);
            if set.is_empty() {
                self.completed.remove(day);
            }
        }

        if changes.completed && ended {
            changes.missed = self.record_missed(day, prayer, classifier);
        }
        Ok(changes)
    }

    /// Flag every canonical prayer of `day` whose window closed before `now`
    /// without a completion mark. Already-missed prayers are left alone.
    pub fn detect_missed(
        &mut self,
        day: &DayKey,
        classifier: &WindowClassifier<'_>,
        now: &str,
    ) -> CoreResult<Changes> {
        let mut changes = Changes::default();
        for prayer in classifier.canonical_prayers() {
            if self.is_completed(day, prayer) || self.is_missed(day, prayer) {
                continue;
            }
            if classifier.has_ended(prayer, now)? {
                log::info!(
                    "{} on {} missed (window closed at {})",
                    prayer,
                    day,
                    classifier.end_time_of(prayer)
                );
                changes = changes.merge(Changes {
                    completed: false,
                    missed: self.record_missed(day, prayer, classifier),
                });
            }
        }
        Ok(changes)
    }

    /// Missed totals across all retained days.
    pub fn missed_counts_by_prayer(&self) -> MissedSummary {
        let mut by_prayer = BTreeMap::new();
        for prayer in self.missed.values().flat_map(|day| day.keys()) {
            *by_prayer.entry(*prayer).or_insert(0) += 1;
        }
        MissedSummary { by_prayer }
    }

    /// Missed buckets ordered by calendar date, most recent first. Keys that
    /// do not parse sort last.
    pub fn missed_days_newest_first(&self) -> Vec<(&DayKey, &BTreeMap<PrayerName, MissedEntry>)> {
        let mut days: Vec<_> = self.missed.iter().collect();
        days.sort_by_key(|(key, _)| Reverse(key.parse().ok()));
        days
    }

    /// Completed prayers for `day` out of the fixed daily five.
    pub fn today_stats(&self, day: &DayKey) -> TodayStats {
        let done = self
            .completed
            .get(day)
            .map(|set| set.iter().filter(|p| **p != PrayerName::Sunrise).count())
            .unwrap_or(0);
        TodayStats::new(done.min(u8::MAX as usize) as u8)
    }

    /// Drop day buckets dated before `today - days` from both records.
    /// Keys that do not parse as dates are kept.
    /// A negative `days` is treated as zero so today's bucket always survives;
    /// a window reaching past the calendar range purges nothing.
    pub fn purge_older_than(&mut self, today: NaiveDate, days: i64) -> Changes {
        let Some(cutoff) =
            Duration::try_days(days.max(0)).and_then(|span| today.checked_sub_signed(span))
        else {
            log::warn!("Retention of {} days is out of range, nothing purged", days);
            return Changes::default();
        };
        let completed = purge(&mut self.completed, cutoff);
        let missed = purge(&mut self.missed, cutoff);
        if completed + missed > 0 {
            log::info!(
                "Retention sweep removed {} completion and {} missed day(s) before {}",
                completed,
                missed,
                cutoff
            );
        }
        Changes {
            completed: completed > 0,
            missed: missed > 0,
        }
    }

    fn record_missed(
        &mut self,
        day: &DayKey,
        prayer: PrayerName,
        classifier: &WindowClassifier<'_>,
    ) -> bool {
        let bucket = self.missed.entry(day.clone()).or_default();
        if bucket.contains_key(&prayer) {
            return false;
        }
        bucket.insert(
            prayer,
            MissedEntry {
                date: day.clone(),
                time: classifier.start_time_of(prayer).to_string(),
            },
        );
        true
    }

    fn clear_missed(&mut self, day: &DayKey, prayer: PrayerName) -> bool {
        let Some(bucket) = self.missed.get_mut(day) else {
            return false;
        };
        let removed = bucket.remove(&prayer).is_some();
        if bucket.is_empty() {
            self.missed.remove(day);
        }
        removed
    }
}

fn purge<V>(record: &mut BTreeMap<DayKey, V>, cutoff: NaiveDate) -> usize {
    let before = record.len();
    record.retain(|key, _| match key.parse() {
        Ok(date) => date >= cutoff,
        Err(e) => {
            log::warn!("Skipping retention check: {}", e);
            true
        }
    });
    before - record.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::PrayerTimeTable;

    fn table() -> PrayerTimeTable {
        PrayerTimeTable::new("04:30", "06:15", "12:15", "15:45", "18:30", "20:00").unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn mark_then_unmark_before_window_closes_is_pending() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();

        let changes = tracker.mark_complete(&today, PrayerName::Asr);
        assert!(changes.completed && !changes.missed);
        assert_eq!(tracker.status(&today, PrayerName::Asr), PrayerStatus::Completed);

        tracker
            .mark_incomplete(&today, PrayerName::Asr, &c, "16:00")
            .unwrap();
        assert_eq!(tracker.status(&today, PrayerName::Asr), PrayerStatus::Pending);
        assert!(tracker.completed().is_empty());
    }

    #[test]
    fn unmark_after_window_closes_counts_as_missed() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();

        tracker.mark_complete(&today, PrayerName::Asr);
        assert!(!tracker.detect_missed(&today, &c, "20:00").unwrap().completed);
        assert_eq!(tracker.status(&today, PrayerName::Asr), PrayerStatus::Completed);

        let changes = tracker
            .mark_incomplete(&today, PrayerName::Asr, &c, "20:05")
            .unwrap();
        assert!(changes.completed && changes.missed);
        assert_eq!(tracker.status(&today, PrayerName::Asr), PrayerStatus::Missed);
        let entry = &tracker.missed()[&today][&PrayerName::Asr];
        assert_eq!(entry.time, "15:45");
        assert_eq!(entry.date, today);
    }

    #[test]
    fn unmarking_something_never_marked_changes_nothing() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();
        let changes = tracker
            .mark_incomplete(&today, PrayerName::Fajr, &c, "22:00")
            .unwrap();
        assert!(!changes.any());
        assert_eq!(tracker.status(&today, PrayerName::Fajr), PrayerStatus::Pending);
    }

    #[test]
    fn detection_is_idempotent_and_respects_completion() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();
        tracker.mark_complete(&today, PrayerName::Fajr);

        let changes = tracker.detect_missed(&today, &c, "16:00").unwrap();
        assert!(changes.missed);
        assert_eq!(tracker.status(&today, PrayerName::Fajr), PrayerStatus::Completed);
        assert_eq!(tracker.status(&today, PrayerName::Dhuhr), PrayerStatus::Missed);
        assert_eq!(tracker.status(&today, PrayerName::Asr), PrayerStatus::Pending);

        let again = tracker.detect_missed(&today, &c, "16:00").unwrap();
        assert!(!again.any());
        assert_eq!(tracker.missed_counts_by_prayer().total(), 1);
    }

    #[test]
    fn isha_is_never_missed_the_same_day() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();
        tracker.detect_missed(&today, &c, "23:59").unwrap();
        assert_eq!(tracker.status(&today, PrayerName::Isha), PrayerStatus::Pending);
        assert_eq!(tracker.status(&today, PrayerName::Maghrib), PrayerStatus::Missed);
    }

    #[test]
    fn late_completion_clears_the_missed_entry() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let today = day(2026, 10, 18);
        let mut tracker = CompletionTracker::default();
        tracker.detect_missed(&today, &c, "07:00").unwrap();
        assert_eq!(tracker.status(&today, PrayerName::Fajr), PrayerStatus::Missed);

        let changes = tracker.mark_complete(&today, PrayerName::Fajr);
        assert!(changes.completed && changes.missed);
        assert_eq!(tracker.status(&today, PrayerName::Fajr), PrayerStatus::Completed);
        assert!(tracker.missed().is_empty());
    }

    #[test]
    fn missed_counts_group_across_days() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let mut tracker = CompletionTracker::default();
        tracker
            .detect_missed(&day(2026, 10, 16), &c, "07:00")
            .unwrap();
        tracker
            .detect_missed(&day(2026, 10, 17), &c, "07:00")
            .unwrap();

        let summary = tracker.missed_counts_by_prayer();
        assert_eq!(summary.by_prayer.len(), 1);
        assert_eq!(summary.get(PrayerName::Fajr), 2);
    }

    #[test]
    fn purge_keeps_the_trailing_window() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let old = DayKey::from_date(today - Duration::days(31));
        let recent = DayKey::from_date(today - Duration::days(29));
        let garbage = DayKey::from("not-a-day");

        let t = table();
        let c = WindowClassifier::new(&t, false);
        let mut tracker = CompletionTracker::default();
        for key in [&old, &recent, &garbage] {
            tracker.mark_complete(key, PrayerName::Fajr);
            tracker.detect_missed(key, &c, "16:00").unwrap();
        }

        let changes = tracker.purge_older_than(today, 30);
        assert!(changes.completed && changes.missed);
        assert!(!tracker.completed().contains_key(&old));
        assert!(!tracker.missed().contains_key(&old));
        assert!(tracker.completed().contains_key(&recent));
        assert!(tracker.missed().contains_key(&recent));
        assert!(tracker.completed().contains_key(&garbage));
        assert!(tracker.missed().contains_key(&garbage));

        assert!(!tracker.purge_older_than(today, 30).any());
    }

    #[test]
    fn out_of_range_retention_never_drops_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let key = DayKey::from_date(today);
        let mut tracker = CompletionTracker::default();
        tracker.mark_complete(&key, PrayerName::Fajr);

        assert!(!tracker.purge_older_than(today, -1).any());
        assert!(!tracker.purge_older_than(today, 0).any());
        assert!(!tracker.purge_older_than(today, 200_000_000).any());
        assert!(!tracker.purge_older_than(today, i64::MAX).any());
        assert!(tracker.is_completed(&key, PrayerName::Fajr));
    }

    #[test]
    fn missed_days_list_newest_date_first() {
        let t = table();
        let c = WindowClassifier::new(&t, false);
        let mut tracker = CompletionTracker::default();
        for key in [day(2026, 9, 30), day(2026, 10, 1), day(2026, 9, 2)] {
            tracker.detect_missed(&key, &c, "07:00").unwrap();
        }
        let order: Vec<&str> = tracker
            .missed_days_newest_first()
            .into_iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(order, ["01-10-2026", "30-09-2026", "02-09-2026"]);
    }

    #[test]
    fn friday_stats_still_count_out_of_five() {
        let t = table();
        let c = WindowClassifier::new(&t, true);
        let friday = day(2026, 10, 16);
        let mut tracker = CompletionTracker::default();
        for prayer in c.canonical_prayers() {
            tracker.mark_complete(&friday, prayer);
        }
        assert!(tracker.is_completed(&friday, PrayerName::Jummah));
        let stats = tracker.today_stats(&friday);
        assert_eq!(stats.completed, 5);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.remaining(), 0);

        let empty = tracker.today_stats(&day(2026, 10, 17));
        assert_eq!((empty.completed, empty.total, empty.remaining()), (0, 5, 5));
    }
}
