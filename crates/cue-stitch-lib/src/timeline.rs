//! Session timeline extraction from a LoCoMo-style conversation record.
//!
//! A record is a JSON object with `speaker_a`, `speaker_b` and contiguous
//! `session_<i>` / `session_<i>_date_time` pairs starting at 1. Enumeration
//! stops at the first missing `session_<i>`, even when higher indices exist.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, StitchError};
use crate::model::session::{Conversation, Session};
use crate::model::turn::Turn;
use crate::temporal::{format_output_time, parse_session_time, StitchConfig};

fn session_key(index: usize) -> String {
    format!("session_{}", index)
}

fn session_date_key(index: usize) -> String {
    format!("session_{}_date_time", index)
}

fn required_str<'a>(record: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| StitchError::MissingField(key.to_string()))
}

/// Extract the conversation using the default configuration.
pub fn extract_timeline(record: &Map<String, Value>) -> Result<Conversation> {
    extract_timeline_with_config(record, &StitchConfig::default())
}

/// Extract speakers and sessions in index order.
///
/// # Errors
///
/// - `MissingField` when a speaker or a session's companion date field is absent.
/// - `Format` when a session date does not match the fixed format.
/// - `InvalidSession` when a session body is not a list of turns.
/// - `NonMonotonic` when `cfg.require_monotonic_sessions` is set and a session
///   is dated before its predecessor.
pub fn extract_timeline_with_config(
    record: &Map<String, Value>,
    cfg: &StitchConfig,
) -> Result<Conversation> {
    let speaker_a = required_str(record, "speaker_a")?.to_string();
    let speaker_b = required_str(record, "speaker_b")?.to_string();

    let mut sessions: Vec<Session> = Vec::new();
    let mut index = 1usize;
    while let Some(body) = record.get(&session_key(index)) {
        let date_key = session_date_key(index);
        let date_time = required_str(record, &date_key)?.to_string();
        let timestamp = parse_session_time(&date_time).map_err(|e| StitchError::Format {
            session: index,
            value: date_time.clone(),
            reason: e.to_string(),
        })?;
        let turns: Vec<Turn> =
            serde_json::from_value(body.clone()).map_err(|e| StitchError::InvalidSession {
                session: index,
                reason: e.to_string(),
            })?;

        sessions.push(Session {
            index,
            date_time,
            timestamp,
            turns,
        });
        index += 1;
    }

    if cfg.require_monotonic_sessions {
        check_monotonic(&sessions)?;
    }

    debug!(
        speaker_a = %speaker_a,
        speaker_b = %speaker_b,
        sessions = sessions.len(),
        "extracted conversation timeline"
    );

    Ok(Conversation {
        speaker_a,
        speaker_b,
        sessions,
    })
}

/// Fail on the first session dated strictly before its predecessor.
pub fn check_monotonic(sessions: &[Session]) -> Result<()> {
    for pair in sessions.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.timestamp < prev.timestamp {
            return Err(StitchError::NonMonotonic {
                session: cur.index,
                previous_session: prev.index,
                current: format_output_time(&cur.timestamp),
                previous: format_output_time(&prev.timestamp),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_extracts_sessions_in_index_order() {
        let rec = record(json!({
            "speaker_a": "Maya",
            "speaker_b": "Lee",
            "session_1_date_time": "10:00 AM on 1 January, 2023",
            "session_1": [{"speaker": "Maya", "text": "hi"}],
            "session_2_date_time": "10:00 AM on 8 January, 2023",
            "session_2": [{"speaker": "Lee", "text": "hello"}, {"speaker": "Maya", "text": "hey"}]
        }));
        let conv = extract_timeline(&rec).unwrap();
        assert_eq!(conv.speaker_a, "Maya");
        assert_eq!(conv.speaker_b, "Lee");
        assert_eq!(conv.sessions.len(), 2);
        assert_eq!(conv.sessions[0].index, 1);
        assert_eq!(conv.sessions[1].turns.len(), 2);
        assert_eq!(conv.turn_count(), 3);
        assert_eq!(conv.sessions[1].date_time, "10:00 AM on 8 January, 2023");
    }

    #[test]
    fn test_stops_at_first_gap() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "1:00 pm on 1 May, 2023",
            "session_1": [],
            "session_3_date_time": "1:00 pm on 3 May, 2023",
            "session_3": [{"speaker": "A1", "text": "unreachable"}]
        }));
        let conv = extract_timeline(&rec).unwrap();
        assert_eq!(conv.sessions.len(), 1);
    }

    #[test]
    fn test_malformed_date_is_format_error() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "2023-05-01 13:00",
            "session_1": []
        }));
        match extract_timeline(&rec) {
            Err(StitchError::Format { session, value, .. }) => {
                assert_eq!(session, 1);
                assert_eq!(value, "2023-05-01 13:00");
            }
            other => panic!("expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_abbreviated_month_is_format_error() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "3:00 pm on 15 March, 2023",
            "session_1": [],
            "session_2_date_time": "3:00 PM on 15 Apr, 2023",
            "session_2": []
        }));
        assert!(matches!(
            extract_timeline(&rec),
            Err(StitchError::Format { session: 2, .. })
        ));
    }

    #[test]
    fn test_missing_fields() {
        let rec = record(json!({"speaker_b": "B1"}));
        assert_eq!(
            extract_timeline(&rec),
            Err(StitchError::MissingField("speaker_a".into()))
        );

        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1": []
        }));
        assert_eq!(
            extract_timeline(&rec),
            Err(StitchError::MissingField("session_1_date_time".into()))
        );
    }

    #[test]
    fn test_invalid_session_body() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "1:00 pm on 1 May, 2023",
            "session_1": "not a list"
        }));
        assert!(matches!(
            extract_timeline(&rec),
            Err(StitchError::InvalidSession { session: 1, .. })
        ));
    }

    #[test]
    fn test_decreasing_timestamps_rejected_unless_relaxed() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "1:00 pm on 9 May, 2023",
            "session_1": [],
            "session_2_date_time": "1:00 pm on 2 May, 2023",
            "session_2": []
        }));
        assert!(matches!(
            extract_timeline(&rec),
            Err(StitchError::NonMonotonic {
                session: 2,
                previous_session: 1,
                ..
            })
        ));

        let relaxed = StitchConfig {
            require_monotonic_sessions: false,
            ..StitchConfig::default()
        };
        let conv = extract_timeline_with_config(&rec, &relaxed).unwrap();
        // Order is kept as recorded, not re-sorted.
        assert!(conv.sessions[0].timestamp > conv.sessions[1].timestamp);
    }

    #[test]
    fn test_equal_timestamps_are_monotonic() {
        let rec = record(json!({
            "speaker_a": "A1",
            "speaker_b": "B1",
            "session_1_date_time": "1:00 pm on 2 May, 2023",
            "session_1": [],
            "session_2_date_time": "1:00 pm on 2 May, 2023",
            "session_2": []
        }));
        assert!(extract_timeline(&rec).is_ok());
    }
}
