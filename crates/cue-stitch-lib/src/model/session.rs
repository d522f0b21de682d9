use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::turn::Turn;

/// One recorded conversation occasion.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// 1-based session number from the source record (`session_<index>`).
    pub index: usize,
    /// Date string exactly as it appeared in the record.
    pub date_time: String,
    pub timestamp: NaiveDateTime,
    pub turns: Vec<Turn>,
}

/// Real background conversation between two speakers.
///
/// Sessions are contiguous from 1 and, unless validation was explicitly
/// disabled at extraction, non-decreasing in `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub speaker_a: String,
    pub speaker_b: String,
    pub sessions: Vec<Session>,
}

impl Conversation {
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.sessions.iter().map(|s| s.timestamp).collect()
    }

    /// Total number of real turns across all sessions.
    pub fn turn_count(&self) -> usize {
        self.sessions.iter().map(|s| s.turns.len()).sum()
    }
}

/// Synthetic cue/trigger unit produced by the generation pipeline.
///
/// Both dialogue fields use the scripted `A: ...` / `B: ...` line convention.
/// Additional generation metadata in the source file is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticPair {
    pub cue_dialogue: String,
    pub trigger_query: String,
    pub time_gap: String,
}
