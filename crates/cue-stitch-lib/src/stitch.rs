//! Stitching: merge real sessions and the synthetic cue/trigger turns into one
//! chronologically ordered transcript, plus a parallel batch driver.

use chrono::NaiveDateTime;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dataset::LocomoItem;
use crate::dialogue::parse_and_remap;
use crate::error::Result;
use crate::insertion::resolve_insertion_with_offset;
use crate::model::session::{Conversation, SyntheticPair};
use crate::model::stitched_context::StitchedContext;
use crate::model::turn::Turn;
use crate::temporal::{format_output_time, parse_time_gap, StitchConfig};
use crate::timeline::extract_timeline_with_config;

/// Build the stitched context with the default configuration.
pub fn build_stitched_context(
    conversation: &Conversation,
    pair: &SyntheticPair,
) -> Result<StitchedContext> {
    build_stitched_context_with_config(conversation, pair, &StitchConfig::default())
}

/// Build the stitched context for one conversation and one synthetic pair.
///
/// Events are laid out as sessions in index order, then the cue, then the
/// trigger, and stably sorted by timestamp. Ties therefore keep that order:
/// a cue dated exactly at a session lands after that session's turns.
///
/// `cue_session_idx` is the anchor among real sessions from insertion, not
/// the cue's position after sorting.
///
/// # Errors
///
/// `EmptyTimeline` when the conversation has no sessions. Empty cue or
/// trigger dialogue is not an error; the block simply contributes no turns.
pub fn build_stitched_context_with_config(
    conversation: &Conversation,
    pair: &SyntheticPair,
    cfg: &StitchConfig,
) -> Result<StitchedContext> {
    let gap = parse_time_gap(&pair.time_gap);
    if !gap.is_recognized() {
        debug!(time_gap = %pair.time_gap, "unrecognised time gap, using 0 days");
    }

    let insertion = resolve_insertion_with_offset(
        &conversation.timestamps(),
        gap.days(),
        cfg.query_offset_days,
    )?;

    let speaker_a = conversation.speaker_a.as_str();
    let speaker_b = conversation.speaker_b.as_str();
    let cue_turns = parse_and_remap(&pair.cue_dialogue, speaker_a, speaker_b);
    let query_turns = parse_and_remap(&pair.trigger_query, speaker_a, speaker_b);

    let mut events: Vec<(NaiveDateTime, &[Turn])> =
        Vec::with_capacity(conversation.sessions.len() + 2);
    for session in &conversation.sessions {
        events.push((session.timestamp, session.turns.as_slice()));
    }
    events.push((insertion.cue_time, cue_turns.as_slice()));
    events.push((insertion.query_time, query_turns.as_slice()));

    // `sort_by_key` is stable.
    events.sort_by_key(|(t, _)| *t);

    let dialogue: Vec<Turn> = events
        .iter()
        .flat_map(|(_, turns)| turns.iter().cloned())
        .collect();

    debug!(
        cue_session_idx = ?insertion.cue_session_idx,
        cue_time = %format_output_time(&insertion.cue_time),
        query_time = %format_output_time(&insertion.query_time),
        turns = dialogue.len(),
        "stitched context"
    );

    Ok(StitchedContext {
        speaker_a: conversation.speaker_a.clone(),
        speaker_b: conversation.speaker_b.clone(),
        time_gap: pair.time_gap.clone(),
        cue_session_idx: insertion.cue_session_idx,
        cue_time: insertion.cue_time,
        query_time: insertion.query_time,
        cue_turns,
        query_turns,
        dialogue,
    })
}

/// How synthetic pairs are matched with background conversations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Pairing {
    /// Pair `i` uses conversation `i % n`.
    Cyclic,
    /// Each pair draws a conversation uniformly from a seeded RNG.
    Random { seed: u64 },
}

impl Pairing {
    /// Conversation index for each of `pairs` pairs. Empty when there are no conversations.
    pub fn assign(&self, pairs: usize, conversations: usize) -> Vec<usize> {
        if conversations == 0 {
            return Vec::new();
        }
        match *self {
            Pairing::Cyclic => (0..pairs).map(|i| i % conversations).collect(),
            Pairing::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..pairs).map(|_| rng.gen_range(0..conversations)).collect()
            }
        }
    }
}

/// Result of stitching one synthetic pair inside a batch.
#[derive(Debug, Clone)]
pub struct StitchOutcome {
    pub pair_index: usize,
    pub conversation_index: usize,
    pub result: Result<StitchedContext>,
}

/// Stitch every synthetic pair against its assigned conversation in parallel.
///
/// Each conversation is extracted once. A conversation that fails extraction
/// fails every pair assigned to it; other pairs are unaffected. Outcomes are
/// returned in pair order. With no conversations the result is empty.
pub fn stitch_batch(
    items: &[LocomoItem],
    pairs: &[SyntheticPair],
    pairing: Pairing,
    cfg: &StitchConfig,
) -> Vec<StitchOutcome> {
    if items.is_empty() {
        warn!(pairs = pairs.len(), "no conversations to stitch into");
        return Vec::new();
    }

    let conversations: Vec<Result<Conversation>> = items
        .par_iter()
        .map(|item| extract_timeline_with_config(&item.conversation, cfg))
        .collect();
    for (i, conv) in conversations.iter().enumerate() {
        if let Err(e) = conv {
            warn!(conversation = i, error = %e, "conversation rejected");
        }
    }

    let assignment = pairing.assign(pairs.len(), conversations.len());
    let outcomes: Vec<StitchOutcome> = pairs
        .par_iter()
        .zip(assignment.par_iter())
        .enumerate()
        .map(|(pair_index, (pair, &conversation_index))| {
            let result = match &conversations[conversation_index] {
                Ok(conv) => build_stitched_context_with_config(conv, pair, cfg),
                Err(e) => Err(e.clone()),
            };
            StitchOutcome {
                pair_index,
                conversation_index,
                result,
            }
        })
        .collect();

    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(
        pairs = pairs.len(),
        conversations = items.len(),
        stitched = ok,
        failed = outcomes.len() - ok,
        "batch stitching finished"
    );
    outcomes
}
