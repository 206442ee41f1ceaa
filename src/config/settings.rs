use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prayer_times::{FixedSchedule, PrayerTimeTable};

/// Longest history kept, in days.
pub const MAX_RETENTION_DAYS: i64 = 3650;
/// Largest Hijri shift either way; local sighting differs by a day or two.
pub const MAX_HIJRI_OFFSET: i32 = 3;

fn default_latitude() -> f64 {
    33.6938
}
fn default_longitude() -> f64 {
    73.0651
}
fn default_location_name() -> String {
    "Islamabad".to_string()
}
fn default_calc_method() -> String {
    "MuslimWorldLeague".to_string()
}
fn default_madhab() -> String {
    "Hanafi".to_string()
}
fn default_timezone_offset() -> i32 {
    300
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_retention_days() -> i64 {
    30
}
fn default_status_tick_secs() -> u64 {
    60
}
fn default_clock_tick_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalahConfig {
    #[serde(default = "default_location_name")]
    pub location_name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
    /// Days to add/subtract from Hijri date for local moon sighting.
    /// 0 = default (Saudi), -1 = one day behind (e.g. some Indian regions), +1 = one day ahead
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for SalahConfig {
    fn default() -> Self {
        Self {
            location_name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone_offset: default_timezone_offset(),
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Days of completion and missed history to keep.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// How often prayer status and missed detection are re-evaluated.
    #[serde(default = "default_status_tick_secs")]
    pub status_tick_secs: u64,
    /// Header clock refresh.
    #[serde(default = "default_clock_tick_ms")]
    pub clock_tick_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            status_tick_secs: default_status_tick_secs(),
            clock_tick_ms: default_clock_tick_ms(),
        }
    }
}

/// Times used whenever calculation fails or yields an unusable table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            fajr: "05:00".to_string(),
            sunrise: "06:30".to_string(),
            dhuhr: "12:30".to_string(),
            asr: "16:00".to_string(),
            maghrib: "18:45".to_string(),
            isha: "20:15".to_string(),
        }
    }
}

impl FallbackConfig {
    pub fn schedule(&self) -> Result<FixedSchedule> {
        let table = PrayerTimeTable::new(
            &self.fajr,
            &self.sunrise,
            &self.dhuhr,
            &self.asr,
            &self.maghrib,
            &self.isha,
        )
        .context("Invalid [fallback] times in config.toml")?;
        Ok(FixedSchedule::new(table))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub salah: SalahConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "waqt")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("waqt.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        config
            .validate()
            .with_context(|| format!("Invalid settings in {:?}", path))?;
        Ok(config)
    }

    /// Reject values the tracker cannot work with.
    pub fn validate(&self) -> Result<()> {
        let retention = self.tracker.retention_days;
        if !(1..=MAX_RETENTION_DAYS).contains(&retention) {
            bail!(
                "retention_days must be between 1 and {}, got {}",
                MAX_RETENTION_DAYS,
                retention
            );
        }
        let offset = self.salah.hijri_offset;
        if !(-MAX_HIJRI_OFFSET..=MAX_HIJRI_OFFSET).contains(&offset) {
            bail!(
                "hijri_offset must be between -{} and {} days, got {}",
                MAX_HIJRI_OFFSET,
                MAX_HIJRI_OFFSET,
                offset
            );
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
