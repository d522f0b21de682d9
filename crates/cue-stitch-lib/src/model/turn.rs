// Speakers are typed so a placeholder slot can never be confused with a real
// participant whose name happens to be "A" or "B".
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder slot used by scripted two-speaker dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::A => "A",
            Slot::B => "B",
        }
    }
}

/// Who said a turn.
///
/// `Placeholder` only comes out of the scripted dialogue parser. Everything read
/// from a conversation file, and everything produced by remapping, is `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Speaker {
    Placeholder(Slot),
    Named(String),
}

impl Speaker {
    pub fn named(name: impl Into<String>) -> Self {
        Speaker::Named(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Speaker::Placeholder(slot) => slot.as_str(),
            Speaker::Named(name) => name,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Speaker::Placeholder(_))
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// On the wire a speaker is a plain string.
impl Serialize for Speaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Speaker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Speaker::Named)
    }
}

/// A single utterance in a conversation.
///
/// Attributes beyond `speaker` and `text` (LoCoMo turns carry `dia_id`,
/// `img_url`, `blip_caption`, ...) are kept in `extra` and written back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Turn {
            speaker,
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Turn spoken by a real, named participant.
    pub fn named(name: impl Into<String>, text: impl Into<String>) -> Self {
        Turn::new(Speaker::named(name), text)
    }

    /// Turn spoken by a scripted placeholder slot.
    pub fn placeholder(slot: Slot, text: impl Into<String>) -> Self {
        Turn::new(Speaker::Placeholder(slot), text)
    }

    /// Caption of an image shared with this turn, if any.
    pub fn blip_caption(&self) -> Option<&str> {
        self.extra.get("blip_caption").and_then(Value::as_str)
    }
}
