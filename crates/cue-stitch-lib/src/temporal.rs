/*
cue-stitch/crates/cue-stitch-lib/src/temporal.rs

Temporal utilities for stitching: the free-text time-gap parser, the session
timestamp codec and the `StitchConfig` that carries the temporal defaults.

Design notes:
- Session times are `chrono::NaiveDateTime`; the source data has no zone.
- Time gaps use calendar-approximate units: week = 7, month = 30, year = 365 days.
- Unrecognised time gaps are not errors. They surface as `TimeGap::Unrecognized`
  and count as zero days.
- Date arithmetic saturates at the calendar bounds instead of panicking.
*/

use chrono::{NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Days between the last real session and the trigger query.
pub const DEFAULT_QUERY_OFFSET_DAYS: i64 = 7;

pub const DAYS_PER_WEEK: i64 = 7;
pub const DAYS_PER_MONTH: i64 = 30;
pub const DAYS_PER_YEAR: i64 = 365;

/// Input format of `session_<i>_date_time`, e.g. `3:00 pm on 15 March, 2023`.
pub const SESSION_TIME_FORMAT: &str = "%I:%M %p on %d %B, %Y";
/// Output format of `cue_time` / `query_time`, e.g. `2023-03-15 15:00`.
pub const OUTPUT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

static APPROX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:a|an|about|around|approximately|approx\.?)\b")
        .expect("approximation marker regex is valid")
});

static GAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([0-9]+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|a|an)\b\s*(weeks?|months?|years?)\b",
    )
    .expect("time gap regex is valid")
});

static SESSION_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{1,2}:[0-9]{1,2} (?i:am|pm) on [0-9]{1,2} (?i:january|february|march|april|may|june|july|august|september|october|november|december), [0-9]{4}$",
    )
    .expect("session time regex is valid")
});

/// Why a session date string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionTimeError {
    #[error("expected `h:mm AM/PM on D Month, YYYY`")]
    Layout,
    #[error(transparent)]
    Value(#[from] chrono::ParseError),
}

/// Configuration for stitching.
///
/// Serializable so the effective settings can be echoed next to the output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StitchConfig {
    /// Offset from the last session to the trigger query. Default: DEFAULT_QUERY_OFFSET_DAYS.
    pub query_offset_days: i64,
    /// Reject conversations whose session timestamps decrease with index. Default: true.
    pub require_monotonic_sessions: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        StitchConfig {
            query_offset_days: DEFAULT_QUERY_OFFSET_DAYS,
            require_monotonic_sessions: true,
        }
    }
}

/// Calendar unit named in a time-gap phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapUnit {
    Week,
    Month,
    Year,
}

impl GapUnit {
    pub fn days(self) -> i64 {
        match self {
            GapUnit::Week => DAYS_PER_WEEK,
            GapUnit::Month => DAYS_PER_MONTH,
            GapUnit::Year => DAYS_PER_YEAR,
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        if word.starts_with("week") {
            Some(GapUnit::Week)
        } else if word.starts_with("month") {
            Some(GapUnit::Month)
        } else if word.starts_with("year") {
            Some(GapUnit::Year)
        } else {
            None
        }
    }
}

/// Result of parsing a time-gap phrase.
///
/// `approximate` records whether a hedge word ("about", "around", "a", ...)
/// appeared anywhere in the phrase. It never changes the day count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimeGap {
    Span {
        count: i64,
        unit: GapUnit,
        approximate: bool,
    },
    Unrecognized {
        approximate: bool,
    },
}

impl TimeGap {
    /// Gap in days; `Unrecognized` counts as zero.
    pub fn days(&self) -> i64 {
        match *self {
            TimeGap::Span { count, unit, .. } => count.saturating_mul(unit.days()),
            TimeGap::Unrecognized { .. } => 0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, TimeGap::Span { .. })
    }

    pub fn is_approximate(&self) -> bool {
        match *self {
            TimeGap::Span { approximate, .. } | TimeGap::Unrecognized { approximate } => {
                approximate
            }
        }
    }
}

fn quantity_from_word(word: &str) -> Option<i64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // Only overflow can fail here; saturate rather than drop the match.
            digits.parse::<i64>().unwrap_or(i64::MAX)
        }
    };
    Some(n)
}

/// Parse a natural-language time gap such as "about two weeks later".
///
/// The first quantity-unit pair in the phrase wins. Direction words ("later",
/// "ago", "after") are ignored.
pub fn parse_time_gap(text: &str) -> TimeGap {
    let s = text.trim().to_lowercase();
    let approximate = APPROX_RE.is_match(&s);

    let Some(caps) = GAP_RE.captures(&s) else {
        return TimeGap::Unrecognized { approximate };
    };

    let count = caps.get(1).and_then(|m| quantity_from_word(m.as_str()));
    let unit = caps.get(2).and_then(|m| GapUnit::from_word(m.as_str()));
    match (count, unit) {
        (Some(count), Some(unit)) => TimeGap::Span {
            count,
            unit,
            approximate,
        },
        _ => TimeGap::Unrecognized { approximate },
    }
}

/// Convenience wrapper returning the gap in days (0 when unrecognised).
pub fn parse_time_gap_days(text: &str) -> i64 {
    parse_time_gap(text).days()
}

/// Parse a session date such as `1:56 pm on 8 May, 2023`.
///
/// The layout is checked strictly first: full month names only, single
/// spaces, no surrounding whitespace.
pub fn parse_session_time(value: &str) -> Result<NaiveDateTime, SessionTimeError> {
    if !SESSION_TIME_RE.is_match(value) {
        return Err(SessionTimeError::Layout);
    }
    Ok(NaiveDateTime::parse_from_str(value, SESSION_TIME_FORMAT)?)
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_output_time(t: &NaiveDateTime) -> String {
    t.format(OUTPUT_TIME_FORMAT).to_string()
}

/// Shift `t` by `days`, saturating at the representable calendar bounds.
pub fn shift_days(t: NaiveDateTime, days: i64) -> NaiveDateTime {
    let shifted = TimeDelta::try_days(days).and_then(|d| t.checked_add_signed(d));
    match shifted {
        Some(v) => v,
        None if days >= 0 => NaiveDateTime::MAX,
        None => NaiveDateTime::MIN,
    }
}

/// Serde adapter for timestamps written as `YYYY-MM-DD HH:MM`.
pub mod output_time {
    use super::{format_output_time, OUTPUT_TIME_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_output_time(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, OUTPUT_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
