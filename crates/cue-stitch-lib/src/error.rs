//! Error taxonomy for the stitching core.
//!
//! Only structural problems with a conversation record are errors. Noisy
//! generated text (unrecognised time gaps, malformed dialogue lines) is handled
//! by permissive fallbacks in `temporal` and `dialogue` instead.

use thiserror::Error;

/// Fatal errors raised while building a timeline or a stitched context.
///
/// Each variant aborts the single stitching operation it was raised from; the
/// batch driver reports it per item and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StitchError {
    /// A session date string does not match `h:mm AM/PM on D Month, YYYY`.
    #[error("session {session}: malformed date/time '{value}': {reason}")]
    Format {
        session: usize,
        value: String,
        reason: String,
    },

    /// Session timestamps decrease with index.
    #[error("session {session} ({current}) is earlier than session {previous_session} ({previous})")]
    NonMonotonic {
        session: usize,
        previous_session: usize,
        current: String,
        previous: String,
    },

    /// A required key is absent or not a string.
    #[error("conversation record is missing required field '{0}'")]
    MissingField(String),

    /// A session body could not be read as a list of turns.
    #[error("session {session}: invalid turn list: {reason}")]
    InvalidSession { session: usize, reason: String },

    /// The conversation holds no sessions, so there is nothing to anchor the query time to.
    #[error("conversation has no sessions")]
    EmptyTimeline,
}

pub type Result<T> = std::result::Result<T, StitchError>;
