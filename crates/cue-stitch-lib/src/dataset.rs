//! Dataset files: LoCoMo conversations, synthetic cue/trigger pairs and the
//! JSON artefacts this crate writes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::model::session::SyntheticPair;

/// One entry of a LoCoMo file. Fields other than `conversation` and `qa` are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocomoItem {
    pub conversation: Map<String, Value>,
    #[serde(default)]
    pub qa: Vec<QaItem>,
}

/// A LoCoMo question with its evidence pointers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QaItem {
    #[serde(default)]
    pub question: String,
    /// Answers are strings or numbers in the source data; adversarial items have none.
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub evidence: Evidence,
    #[serde(default)]
    pub category: Option<i64>,
}

/// Evidence is stored either as a single string or a list of strings; each
/// string may hold several `Dn:k` tokens separated by `;`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    One(String),
    Many(Vec<String>),
}

impl Default for Evidence {
    fn default() -> Self {
        Evidence::Many(Vec::new())
    }
}

impl Evidence {
    /// Flatten into individual, trimmed, non-empty tokens.
    pub fn tokens(&self) -> Vec<String> {
        let raw: &[String] = match self {
            Evidence::One(s) => std::slice::from_ref(s),
            Evidence::Many(v) => v,
        };
        raw.iter()
            .flat_map(|s| s.split(';'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

fn load_json_list<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file = BufReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    );
    let items: Vec<T> = serde_json::from_reader(file)
        .with_context(|| format!("parsing {} as a JSON list", path.display()))?;
    Ok(items)
}

/// Load a LoCoMo file (a JSON array of conversation items).
pub fn load_locomo_json(path: &Path) -> Result<Vec<LocomoItem>> {
    load_json_list(path)
}

/// Load a synthetic pair file (a JSON array of `{cue_dialogue, trigger_query, time_gap}`).
pub fn load_synthetic_pairs_json(path: &Path) -> Result<Vec<SyntheticPair>> {
    load_json_list(path)
}

/// Write `value` as pretty-printed JSON.
pub fn save_json_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
