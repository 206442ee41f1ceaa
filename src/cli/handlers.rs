use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use std::str::FromStr;

use crate::board::{open_board, BoardView};
use crate::config::AppConfig;
use crate::db::repository::CacheRepo;
use crate::models::{PrayerName, PrayerStatus};
use crate::prayer_times::{PrayerCalculator, WindowClassifier};
use crate::utils::format::{pad_display, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_prayer(s: &str) -> Result<PrayerName> {
    PrayerName::from_str(s).map_err(|_| {
        anyhow!(
            "Unknown prayer '{}'. Use: fajr, dhuhr (jummah), asr, maghrib, isha",
            s
        )
    })
}

// ─── Setup ───────────────────────────────────────────────────────────────────

pub struct SetupArgs {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub method: Option<String>,
    pub madhab: Option<String>,
    pub tz: Option<String>,
    pub hijri_offset: Option<i32>,
}

pub fn handle_setup(conn: &Connection, config: &mut AppConfig, args: SetupArgs) -> Result<()> {
    let salah = &mut config.salah;
    if let Some(name) = args.name {
        salah.location_name = name;
    }
    if let Some(lat) = args.lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(anyhow!("Latitude must be between -90 and 90"));
        }
        salah.latitude = lat;
    }
    if let Some(lng) = args.lng {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(anyhow!("Longitude must be between -180 and 180"));
        }
        salah.longitude = lng;
    }
    if let Some(method) = args.method {
        salah.calc_method = method;
    }
    if let Some(madhab) = args.madhab {
        salah.madhab = madhab;
    }
    if let Some(tz) = args.tz {
        salah.timezone_offset = parse_tz_offset(&tz)?;
    }
    if let Some(offset) = args.hijri_offset {
        salah.hijri_offset = offset;
    }

    // Reject bad values before anything is written
    config.validate()?;
    let salah = &config.salah;
    PrayerCalculator::new(
        salah.latitude,
        salah.longitude,
        &salah.calc_method,
        &salah.madhab,
        salah.timezone_offset,
    )?;

    config.save()?;
    CacheRepo::clear_all(conn)?;

    println!();
    println_colored!(GOLD, "  Saved configuration");
    println!();
    println!(
        "  Location:  {} ({:.4}, {:.4})",
        config.salah.location_name, config.salah.latitude, config.salah.longitude
    );
    println!("  Method:    {} / {}", config.salah.calc_method, config.salah.madhab);
    println!("  Timezone:  UTC{}", format_tz_offset(config.salah.timezone_offset));
    println!();
    Ok(())
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig) -> Result<()> {
    let now = now();
    let board = open_board(conn, config, now)?;
    let view = board.view(now)?;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        config.salah.location_name,
        view.date.format("%Y-%m-%d")
    );
    println_colored!(DIM, "  {}", view.hijri);
    if view.fallback_times {
        println_colored!(RED, "  Using fallback times, calculation unavailable");
    }
    println!();

    for row in &view.rows {
        let line = format!(
            "  {}  {}  {} – {}",
            pad_display(row.label, 8),
            pad_display(row.arabic, 8),
            row.start,
            row.end
        );
        if row.is_active {
            println_colored!(GREEN, "{}  ◀ now", line);
        } else if row.is_forbidden {
            println_colored!(RED, "{}  ⚠ disliked time", line);
        } else if row.end.as_str() < view.now.as_str() {
            println_colored!(DIM, "{}", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
        if row.prayer == PrayerName::Fajr {
            println_colored!(
                DIM,
                "  {}  {}  {}",
                pad_display(PrayerName::Sunrise.display_name(), 8),
                pad_display(PrayerName::Sunrise.arabic_name(), 8),
                view.sunrise
            );
        }
    }

    let schedule = board.schedule();
    let windows = WindowClassifier::new(&schedule.table, schedule.is_friday).forbidden_windows()?;
    let windows: Vec<String> = windows
        .iter()
        .map(|(from, to)| format!("{}–{}", from, to))
        .collect();

    println!();
    println_colored!(DIM, "  Disliked: {}", windows.join(", "));
    println_colored!(AMBER, "  Next: {}", view.next_label);
    println!();
    Ok(())
}

// ─── Mark / unmark ───────────────────────────────────────────────────────────

pub fn handle_mark(conn: &Connection, config: &AppConfig, prayer_str: &str) -> Result<()> {
    let prayer = parse_prayer(prayer_str)?;
    let now = now();
    let mut board = open_board(conn, config, now)?;
    board.mark_complete(prayer, now)?;
    println_colored!(GREEN, "  ✓ {} marked as prayed", prayer);
    Ok(())
}

pub fn handle_unmark(conn: &Connection, config: &AppConfig, prayer_str: &str) -> Result<()> {
    let prayer = parse_prayer(prayer_str)?;
    let now = now();
    let mut board = open_board(conn, config, now)?;
    match board.mark_incomplete(prayer, now)? {
        PrayerStatus::Missed => {
            println_colored!(RED, "  ✗ {} unmarked — its time has passed, counted as missed", prayer)
        }
        _ => println_colored!(DIM, "  ○ {} unmarked", prayer),
    }
    Ok(())
}

// ─── Status ──────────────────────────────────────────────────────────────────

fn status_icon(status: PrayerStatus) -> (&'static str, &'static str) {
    match status {
        PrayerStatus::Completed => ("●", GREEN),
        PrayerStatus::Missed => ("✗", RED),
        PrayerStatus::Pending => ("○", DIM),
    }
}

pub fn handle_status(conn: &Connection, config: &AppConfig, json: bool) -> Result<()> {
    let now = now();
    let board = open_board(conn, config, now)?;
    let view = board.view(now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_status(&view);
    Ok(())
}

fn print_status(view: &BoardView) {
    println!();
    println_colored!(GOLD, "  Today — {}", view.date.format("%A, %b %d"));
    println!();
    for row in &view.rows {
        let (icon, color) = status_icon(row.status);
        println_colored!(
            color,
            "  {} {}  {}",
            icon,
            pad_display(row.label, 8),
            row.status.as_str()
        );
    }
    println!();
    println_colored!(
        BOLD,
        "  {}  {}/{} prayed ({:.0}%), {} remaining",
        progress_bar(view.completed_count as u32, view.stats.total as u32, 10),
        view.completed_count,
        view.stats.total,
        view.stats.completion_ratio() * 100.0,
        view.remaining_count
    );
    println!();
}

// ─── Missed ──────────────────────────────────────────────────────────────────

pub fn handle_missed(conn: &Connection, config: &AppConfig) -> Result<()> {
    let now = now();
    let board = open_board(conn, config, now)?;
    let summary = board.tracker().missed_counts_by_prayer();

    println!();
    if summary.is_empty() {
        println_colored!(
            GREEN,
            "  ✓ No missed prayers in the last {} days",
            config.tracker.retention_days
        );
        println!();
        return Ok(());
    }

    println_colored!(
        AMBER,
        "  Missed prayers — last {} days ({} total)",
        config.tracker.retention_days,
        summary.total()
    );
    println!();
    for (prayer, count) in summary.by_daily_prayer() {
        println!("  {}  {}", pad_display(prayer.display_name(), 8), count);
    }
    println!();
    for (day, prayers) in board.tracker().missed_days_newest_first() {
        let names: Vec<String> = prayers
            .iter()
            .map(|(p, entry)| format!("{} {}", p, entry.time))
            .collect();
        println_colored!(DIM, "  {}  {}", day, names.join(", "));
    }
    println!();
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Parse a UTC offset string into total minutes.
/// Accepts: "5:30", "+5:30", "-5:30", "5", "+5", "5.5"
fn parse_tz_offset(s: &str) -> Result<i32> {
    let s = s.trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if s.contains(':') {
        let mut parts = s.splitn(2, ':');
        let hours: i32 = parts.next().unwrap_or("0").parse()?;
        let mins: i32 = parts.next().unwrap_or("0").parse()?;
        hours * 60 + mins
    } else if s.contains('.') {
        let hours: f64 = s.parse()?;
        (hours * 60.0).round() as i32
    } else {
        let hours: i32 = s.parse()?;
        hours * 60
    };

    if minutes > 14 * 60 {
        return Err(anyhow!("UTC offset out of range: {}", s));
    }
    Ok(sign * minutes)
}

/// Format total minutes as "+H:MM" string
fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}
