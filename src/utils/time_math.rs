//! Minute-of-day arithmetic over zero-padded "HH:MM" strings.
//!
//! All comparisons go through integer minutes so that a caller passing
//! "9:05" gets an error instead of a lexically wrong answer.

use crate::error::{CoreError, CoreResult};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Last minute of the day, used as Isha's closing boundary.
pub const END_OF_DAY: &str = "23:59";

/// Parse "HH:MM" into minutes since midnight.
pub fn to_minutes(time: &str) -> CoreResult<i32> {
    let invalid = || CoreError::InvalidTime(time.to_string());
    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let hours: i32 = time[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = time[3..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as "HH:MM", wrapping into a single day.
pub fn from_minutes(minutes: i32) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// `start <= current <= end`.
pub fn is_time_in_range(current: &str, start: &str, end: &str) -> CoreResult<bool> {
    let current = to_minutes(current)?;
    Ok(to_minutes(start)? <= current && current <= to_minutes(end)?)
}

pub fn add_minutes(time: &str, delta: i32) -> CoreResult<String> {
    Ok(from_minutes(to_minutes(time)? + delta))
}

pub fn subtract_minutes(time: &str, delta: i32) -> CoreResult<String> {
    add_minutes(time, -delta)
}

/// Minutes from `from` until `to`, treating an earlier `to` as tomorrow.
pub fn minutes_until(from: &str, to: &str) -> CoreResult<i32> {
    let diff = to_minutes(to)? - to_minutes(from)?;
    Ok(if diff < 0 { diff + MINUTES_PER_DAY } else { diff })
}

/// Countdown from `from` until `to`, as "Xh Ym" or "Ym".
pub fn time_difference(from: &str, to: &str) -> CoreResult<String> {
    let diff = minutes_until(from, to)?;
    let (hours, minutes) = (diff / 60, diff % 60);
    if hours > 0 {
        Ok(format!("{}h {}m", hours, minutes))
    } else {
        Ok(format!("{}m", minutes))
    }
}
