//! Library entry point for cue/trigger stitching.
//!
//! The core takes a multi-session background conversation and a synthetic
//! cue/trigger pair tagged with a free-text time gap, works out where the
//! synthetic turns belong on the session timeline, remaps their placeholder
//! speakers and produces one chronologically ordered transcript.
//!
//! This file re-exports the core types and provides helpers to persist and
//! restore stitched contexts as JSON.
//
// Public modules
pub mod dataset;
pub mod dialogue;
pub mod error;
pub mod insertion;
pub mod model;
pub mod stitch;
pub mod temporal;
pub mod timeline;
pub mod unified;
pub mod utils;

// Re-export primary types for ergonomic use.
pub use error::StitchError;
pub use model::{
    session::{Conversation, Session, SyntheticPair},
    stitched_context::StitchedContext,
    turn::{Slot, Speaker, Turn},
};
pub use stitch::{build_stitched_context, stitch_batch, Pairing, StitchOutcome};
pub use temporal::{parse_time_gap, StitchConfig, TimeGap};
pub use timeline::extract_timeline;

use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Save stitched contexts to a pretty-printed JSON array.
///
/// # Arguments
///
/// * `contexts` - contexts to persist, in output order
/// * `path` - filesystem path to write JSON to
///
/// # Returns
///
/// `Ok(())` on success, or an `anyhow::Error` on failure.
pub fn save_stitched_json(contexts: &[StitchedContext], path: &Path) -> Result<()> {
    dataset::save_json_pretty(contexts, path)
}

/// Load stitched contexts previously written with `save_stitched_json`.
///
/// Timestamps are read back from their `YYYY-MM-DD HH:MM` form and speakers
/// come back as named speakers.
pub fn load_stitched_json(path: &Path) -> Result<Vec<StitchedContext>> {
    let file = BufReader::new(File::open(path)?);
    let contexts: Vec<StitchedContext> = serde_json::from_reader(file)?;
    Ok(contexts)
}
