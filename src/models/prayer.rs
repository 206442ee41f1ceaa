use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Every named time in a day's schedule. `Sunrise` bounds Fajr but is not
/// prayed; `Jummah` is Friday's name for the Dhuhr slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Jummah,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// Schedule order of the six table entries.
    pub const TABLE_ORDER: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// The five daily prayers, with Jummah in the Dhuhr slot on Fridays.
    pub fn canonical(is_friday: bool) -> [PrayerName; 5] {
        let noon = if is_friday {
            PrayerName::Jummah
        } else {
            PrayerName::Dhuhr
        };
        [
            PrayerName::Fajr,
            noon,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    /// Jummah shares every time lookup with Dhuhr.
    pub fn slot(self) -> PrayerName {
        match self {
            PrayerName::Jummah => PrayerName::Dhuhr,
            other => other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Jummah => "Jummah",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "الفجر",
            PrayerName::Sunrise => "الشروق",
            PrayerName::Dhuhr => "الظهر",
            PrayerName::Jummah => "الجمعة",
            PrayerName::Asr => "العصر",
            PrayerName::Maghrib => "المغرب",
            PrayerName::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "sunrise" | "shuruq" => Ok(PrayerName::Sunrise),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "jummah" | "jumuah" | "jumah" => Ok(PrayerName::Jummah),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(CoreError::UnknownPrayer(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerStatus {
    Pending,
    Completed,
    Missed,
}

impl PrayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::Pending => "pending",
            PrayerStatus::Completed => "completed",
            PrayerStatus::Missed => "missed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friday_puts_jummah_in_the_noon_slot() {
        let weekday = PrayerName::canonical(false);
        let friday = PrayerName::canonical(true);
        assert_eq!(weekday[1], PrayerName::Dhuhr);
        assert_eq!(friday[1], PrayerName::Jummah);
        assert_eq!(friday.len(), 5);
        assert_eq!(PrayerName::Jummah.slot(), PrayerName::Dhuhr);
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("Zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!("jumuah".parse::<PrayerName>().unwrap(), PrayerName::Jummah);
        assert_eq!(" ISHA ".parse::<PrayerName>().unwrap(), PrayerName::Isha);
        assert!(matches!(
            "tahajjud".parse::<PrayerName>(),
            Err(CoreError::UnknownPrayer(_))
        ));
    }
}
