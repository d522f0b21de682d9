use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::turn::Turn;
use crate::temporal::output_time;

/// Final merged transcript for one (conversation, synthetic pair) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchedContext {
    pub speaker_a: String,
    pub speaker_b: String,
    pub time_gap: String,
    /// 0-based index of the latest real session at or before `cue_time`.
    /// `None` when the cue predates every real session.
    pub cue_session_idx: Option<usize>,
    #[serde(with = "output_time")]
    pub cue_time: NaiveDateTime,
    #[serde(with = "output_time")]
    pub query_time: NaiveDateTime,
    pub cue_turns: Vec<Turn>,
    pub query_turns: Vec<Turn>,
    pub dialogue: Vec<Turn>,
}

impl StitchedContext {
    /// Render the dialogue as `Speaker said, "text"` lines.
    pub fn transcript(&self) -> String {
        self.dialogue
            .iter()
            .map(|t| format!("{} said, \"{}\"", t.speaker, t.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
