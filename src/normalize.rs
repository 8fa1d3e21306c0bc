/// Cell normalization rules
///
/// Each rule is total: it never fails, a cell it cannot make sense of comes
/// back as missing (`RawCell::Empty` or `None`). A bad cell therefore costs a
/// value, never a sheet.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::cells::RawCell;

/// Tokens that stand for "no value" in the source workbooks
pub const MISSING_SENTINELS: [&str; 7] = ["", " ", "-", "--", "NaN", "NULL", "None"];

/// Glyphs used as decoration around values (direction arrows, bearings, units)
pub const DECORATION_GLYPHS: [char; 7] = ['↑', '↓', '(', ')', '[', ']', '°'];

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}:\d{2}(?::\d{2})?\b").expect("time pattern is a valid regex")
});

// Leading sign applies to the whole value; U+2212 shows up in pasted web tables
static SIGNED_DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+\-\x{2212}]?)\s*(\d+):([0-5]\d)(?::([0-5]\d))?\s*$")
        .expect("signed duration pattern is a valid regex")
});

const CLOCK_FORMATS: [&str; 5] = [
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M%p",
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d %B %Y"];

/// Find the first `H:MM` / `HH:MM:SS` token in a string
pub fn find_time(text: &str) -> Option<&str> {
    TIME_PATTERN.find(text).map(|m| m.as_str())
}

/// Reduce a text cell to the first clock-time token it contains
///
/// Text without a time becomes missing. Non-text cells are returned unchanged
/// so typed values (numbers, Excel times) survive for the typed coercions.
///
/// ```
/// use daylight_ingest::cells::RawCell;
/// use daylight_ingest::normalize::extract_time;
///
/// assert_eq!(extract_time(&RawCell::text("07:15 am approx")), RawCell::text("07:15"));
/// assert_eq!(extract_time(&RawCell::text("no time here")), RawCell::Empty);
/// assert_eq!(extract_time(&RawCell::Number(42.0)), RawCell::Number(42.0));
/// ```
pub fn extract_time(cell: &RawCell) -> RawCell {
    match cell {
        RawCell::Text(s) => find_time(s)
            .map(|t| RawCell::Text(t.to_string()))
            .unwrap_or(RawCell::Empty),
        other => other.clone(),
    }
}

/// Coerce a cell into a time of day
pub fn to_clock_time(cell: &RawCell) -> Option<NaiveTime> {
    match cell {
        RawCell::Time(t) => Some(*t),
        RawCell::DateTime(dt) => Some(dt.time()),
        // Unformatted Excel times are fractions of a day
        RawCell::Number(f) if (0.0..1.0).contains(f) => {
            let seconds = ((f * 86_400.0).round() as u32).min(86_399);
            NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        }
        RawCell::Text(s) => parse_clock_text(s),
        _ => None,
    }
}

fn parse_clock_text(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in CLOCK_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Some(t);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.time());
        }
    }

    // Last resort: a time buried in surrounding text ("08:44 (134°)")
    let token = find_time(trimmed)?;
    CLOCK_FORMATS[..2]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(token, fmt).ok())
}

fn duration_parts(text: &str) -> Option<(i64, i64, i64, i64)> {
    let caps: Captures = SIGNED_DURATION_PATTERN.captures(text)?;
    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") | Some("\u{2212}") => -1,
        _ => 1,
    };
    let hours = caps.get(2)?.as_str().parse::<i64>().ok()?;
    let minutes = caps.get(3)?.as_str().parse::<i64>().ok()?;
    let seconds = match caps.get(4) {
        Some(m) => m.as_str().parse::<i64>().ok()?,
        None => 0,
    };
    Some((sign, hours, minutes, seconds))
}

/// Convert a signed duration cell into whole signed minutes
///
/// `"+1:25"` → 85, `"-0:42"` → -42, `"07:33"` → 453. Seconds in a
/// `H:MM:SS` string are ignored; duration values are floor-divided.
pub fn signed_duration_to_minutes(cell: &RawCell) -> Option<i64> {
    match cell {
        RawCell::Text(s) => {
            let (sign, hours, minutes, _) = duration_parts(s)?;
            hours
                .checked_mul(60)
                .and_then(|h| h.checked_add(minutes))
                .map(|total| sign * total)
        }
        RawCell::Duration(d) => Some(d.num_seconds().div_euclid(60)),
        RawCell::Time(t) => Some(i64::from(t.hour()) * 60 + i64::from(t.minute())),
        _ => None,
    }
}

/// Convert a signed duration cell into a duration keeping seconds precision
pub fn signed_duration_to_hms(cell: &RawCell) -> Option<TimeDelta> {
    match cell {
        RawCell::Text(s) => {
            let (sign, hours, minutes, seconds) = duration_parts(s)?;
            let total = hours
                .checked_mul(3600)?
                .checked_add(minutes * 60 + seconds)?;
            TimeDelta::try_seconds(sign * total)
        }
        RawCell::Duration(d) => Some(*d),
        RawCell::Time(t) => TimeDelta::try_seconds(i64::from(t.num_seconds_from_midnight())),
        _ => None,
    }
}

/// Render signed minutes back into `±H:MM`
pub fn format_signed_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("{sign}{}:{:02}", abs / 60, abs % 60)
}

/// Render a duration as `±H:MM:SS`
pub fn format_signed_hms(duration: &TimeDelta) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        abs / 3600,
        (abs / 60) % 60,
        abs % 60
    )
}

/// Remove decoration glyphs, leaving every other character as is
pub fn strip_decoration(text: &str) -> String {
    text.chars()
        .filter(|c| !DECORATION_GLYPHS.contains(c))
        .collect()
}

/// Map sentinel tokens (and NaN numbers) to missing
pub fn normalize_sentinel(cell: RawCell) -> RawCell {
    let missing = match &cell {
        RawCell::Text(s) => s.trim().is_empty() || MISSING_SENTINELS.contains(&s.trim()),
        RawCell::Number(f) => f.is_nan(),
        _ => false,
    };
    if missing {
        RawCell::Empty
    } else {
        cell
    }
}

/// Decoration stripping followed by sentinel mapping, applied to every data cell
pub fn clean_cell(cell: RawCell) -> RawCell {
    match cell {
        RawCell::Text(s) => {
            normalize_sentinel(RawCell::Text(strip_decoration(&s).trim().to_string()))
        }
        other => normalize_sentinel(other),
    }
}

/// Numeric coercion; anything non-numeric is missing
pub fn to_float(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(f) => *f,
        RawCell::Text(s) => strip_decoration(s).trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Integer coercion; fractional values are missing rather than rounded
pub fn to_integer(cell: &RawCell) -> Option<i64> {
    let value = to_float(cell)?;
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

/// Coerce a cell into a calendar date
pub fn to_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::DateTime(dt) => Some(dt.date()),
        RawCell::Number(f) if *f >= 1.0 => excel_serial_to_date(*f),
        RawCell::Text(s) => {
            let trimmed = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
        _ => None,
    }
}

/// Read a day-of-month column value, truncating fractional days
pub fn parse_day_of_month(cell: &RawCell) -> Option<u32> {
    let value = match cell {
        RawCell::Number(f) => *f,
        RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() {
        return None;
    }
    let day = value.trunc();
    (1.0..=31.0).contains(&day).then_some(day as u32)
}

/// Convert Excel date serial to NaiveDate
///
/// Excel epoch: 1899-12-30 (adjusted for Excel's 1900 leap-year bug)
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(serial as i64)?)
}
