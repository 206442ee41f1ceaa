use crate::error::{CoreError, CoreResult};
use crate::models::PrayerName;
use crate::utils::time_math::to_minutes;

/// One day's timings as zero-padded "HH:MM" strings.
///
/// Construction validates every value and the Fajr ≤ Sunrise ≤ Dhuhr ≤ Asr ≤
/// Maghrib ≤ Isha ordering, so lookups on a table never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerTimeTable {
    times: [String; 6],
}

impl PrayerTimeTable {
    pub fn new(
        fajr: &str,
        sunrise: &str,
        dhuhr: &str,
        asr: &str,
        maghrib: &str,
        isha: &str,
    ) -> CoreResult<Self> {
        let times = [fajr, sunrise, dhuhr, asr, maghrib, isha].map(str::to_string);
        let minutes = times
            .iter()
            .map(|t| to_minutes(t))
            .collect::<CoreResult<Vec<_>>>()?;

        for i in 1..minutes.len() {
            if minutes[i] < minutes[i - 1] {
                return Err(CoreError::OutOfOrder {
                    earlier: PrayerName::TABLE_ORDER[i - 1],
                    earlier_time: times[i - 1].clone(),
                    later: PrayerName::TABLE_ORDER[i],
                    later_time: times[i].clone(),
                });
            }
        }
        Ok(Self { times })
    }

    /// Start time for a prayer; Jummah reads Dhuhr's slot.
    pub fn get(&self, prayer: PrayerName) -> &str {
        let idx = match prayer.slot() {
            PrayerName::Fajr => 0,
            PrayerName::Sunrise => 1,
            PrayerName::Dhuhr | PrayerName::Jummah => 2,
            PrayerName::Asr => 3,
            PrayerName::Maghrib => 4,
            PrayerName::Isha => 5,
        };
        &self.times[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrayerTimeTable {
        PrayerTimeTable::new("04:30", "05:55", "12:15", "15:45", "18:30", "20:00").unwrap()
    }

    #[test]
    fn jummah_reads_dhuhr() {
        let t = table();
        assert_eq!(t.get(PrayerName::Jummah), "12:15");
        assert_eq!(t.get(PrayerName::Dhuhr), "12:15");
        assert_eq!(t.get(PrayerName::Isha), "20:00");
    }

    #[test]
    fn rejects_out_of_order_times() {
        let err = PrayerTimeTable::new("04:30", "05:55", "16:00", "15:45", "18:30", "20:00")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfOrder {
                earlier: PrayerName::Dhuhr,
                later: PrayerName::Asr,
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_times() {
        let err = PrayerTimeTable::new("4:30", "05:55", "12:15", "15:45", "18:30", "20:00")
            .unwrap_err();
        assert_eq!(err, CoreError::InvalidTime("4:30".to_string()));
    }
}
