use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

/// Shown when neither the schedule nor the converter can supply a date.
pub const HIJRI_UNAVAILABLE: &str = "Hijri date unavailable";

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

/// Hijri date for `date`, shifted by `offset_days` for local moon sighting
/// (e.g. -1 where the month starts a day after Saudi Arabia).
pub fn hijri_string(date: NaiveDate, offset_days: i32) -> Option<String> {
    let Some(adjusted) = date.checked_add_signed(Duration::days(i64::from(offset_days))) else {
        log::warn!("Hijri offset {} days from {} is out of range", offset_days, date);
        return None;
    };
    match HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    ) {
        Ok(hd) => Some(format!(
            "{} {} {}",
            hd.day(),
            hijri_month_name(hd.month()),
            hd.year()
        )),
        Err(e) => {
            log::warn!("Hijri conversion failed for {}: {}", adjusted, e);
            None
        }
    }
}

/// Header text: the schedule's own Hijri date when it has one, otherwise
/// the computed one, otherwise a fixed placeholder.
pub fn display_hijri(date: NaiveDate, offset_days: i32, from_schedule: Option<&str>) -> String {
    from_schedule
        .map(str::to_string)
        .or_else(|| hijri_string(date, offset_days))
        .unwrap_or_else(|| HIJRI_UNAVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let first = hijri_string(date, 0).unwrap();
        assert_eq!(first, hijri_string(date, 0).unwrap());
        assert!(first.contains("Ramadan"), "{first}");
        assert!(first.ends_with("1445"), "{first}");
    }

    #[test]
    fn schedule_value_wins() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(display_hijri(date, 0, Some("10 Ramadan 1445")), "10 Ramadan 1445");
    }

    #[test]
    fn overflowing_offset_uses_the_placeholder() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(display_hijri(date, i32::MAX, None), HIJRI_UNAVAILABLE);
        assert_eq!(display_hijri(date, i32::MIN, None), HIJRI_UNAVAILABLE);
        assert_ne!(display_hijri(date, -1, None), HIJRI_UNAVAILABLE);
    }

    #[test]
    fn out_of_range_dates_use_the_placeholder() {
        let date = NaiveDate::from_ymd_opt(1700, 1, 1).unwrap();
        assert_eq!(display_hijri(date, 0, None), HIJRI_UNAVAILABLE);
    }
}
