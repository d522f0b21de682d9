//! Where do the synthetic cue and trigger land on the real timeline?
//!
//! The trigger query is placed a fixed offset after the last real session and
//! the cue is placed `time_gap_days` before the query. The cue anchor is the
//! latest real session dated at or before the cue.
//!
//! Precondition: `timestamps` are non-decreasing. The anchor scan stops at the
//! first session after the cue and is only correct for sorted input; timeline
//! extraction validates this by default.

use chrono::NaiveDateTime;

use crate::error::{Result, StitchError};
use crate::temporal::{shift_days, DEFAULT_QUERY_OFFSET_DAYS};

/// Computed placement of the synthetic events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insertion {
    /// 0-based index of the anchor session; `None` when the cue predates all sessions.
    pub cue_session_idx: Option<usize>,
    pub cue_time: NaiveDateTime,
    pub query_time: NaiveDateTime,
}

/// Resolve placement with the default 7-day query offset.
pub fn resolve_insertion(timestamps: &[NaiveDateTime], time_gap_days: i64) -> Result<Insertion> {
    resolve_insertion_with_offset(timestamps, time_gap_days, DEFAULT_QUERY_OFFSET_DAYS)
}

/// Resolve placement with an explicit offset between the last session and the query.
///
/// # Errors
///
/// `EmptyTimeline` when there are no sessions to anchor the query to.
pub fn resolve_insertion_with_offset(
    timestamps: &[NaiveDateTime],
    time_gap_days: i64,
    query_offset_days: i64,
) -> Result<Insertion> {
    let last = timestamps.last().ok_or(StitchError::EmptyTimeline)?;
    let query_time = shift_days(*last, query_offset_days);
    let cue_time = shift_days(query_time, time_gap_days.saturating_neg());

    let cue_session_idx = timestamps
        .iter()
        .take_while(|t| **t <= cue_time)
        .count()
        .checked_sub(1);

    Ok(Insertion {
        cue_session_idx,
        cue_time,
        query_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn day(n: i64) -> NaiveDateTime {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        base + TimeDelta::try_days(n).unwrap()
    }

    #[test]
    fn test_anchor_is_latest_session_before_cue() {
        let ts = [day(0), day(10), day(20)];
        let ins = resolve_insertion(&ts, 5).unwrap();
        assert_eq!(ins.query_time, day(27));
        assert_eq!(ins.cue_time, day(22));
        assert_eq!(ins.cue_session_idx, Some(2));
    }

    #[test]
    fn test_anchor_in_the_middle() {
        let ts = [day(0), day(10), day(20)];
        let ins = resolve_insertion(&ts, 20).unwrap();
        assert_eq!(ins.cue_time, day(7));
        assert_eq!(ins.cue_session_idx, Some(0));

        let ins = resolve_insertion(&ts, 17).unwrap();
        assert_eq!(ins.cue_time, day(10));
        // Equal timestamp counts as "at or before".
        assert_eq!(ins.cue_session_idx, Some(1));
    }

    #[test]
    fn test_cue_before_all_sessions() {
        let ins = resolve_insertion(&[day(50)], 1000).unwrap();
        assert!(ins.cue_time < day(50));
        assert_eq!(ins.cue_session_idx, None);
    }

    #[test]
    fn test_zero_gap_places_cue_at_query_time() {
        let ts = [day(0), day(3)];
        let ins = resolve_insertion(&ts, 0).unwrap();
        assert_eq!(ins.cue_time, ins.query_time);
        assert_eq!(ins.cue_session_idx, Some(1));
    }

    #[test]
    fn test_custom_offset() {
        let ins = resolve_insertion_with_offset(&[day(0)], 0, 30).unwrap();
        assert_eq!(ins.query_time, day(30));
    }

    #[test]
    fn test_empty_timeline() {
        assert_eq!(resolve_insertion(&[], 7), Err(StitchError::EmptyTimeline));
    }

    #[test]
    fn test_absurd_gap_saturates() {
        let ins = resolve_insertion(&[day(0)], i64::MAX).unwrap();
        assert_eq!(ins.cue_time, NaiveDateTime::MIN);
        assert_eq!(ins.cue_session_idx, None);
    }
}
