//! Unified benchmark input.
//!
//! Merges the five LoCoMo QA categories (conversation shown as-is, followed by
//! the question) with the Cognitive category, whose prompt is the stitched
//! dialogue and whose evidence is the remapped cue.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::dataset::{LocomoItem, QaItem};
use crate::dialogue::parse_and_remap;
use crate::model::session::SyntheticPair;
use crate::stitch::build_stitched_context_with_config;
use crate::temporal::StitchConfig;
use crate::timeline::extract_timeline_with_config;

/// Separator between speaker and text in evidence lines.
pub const EVIDENCE_SEPARATOR: &str = "：";

pub const CONV_START_PROMPT: &str = "Below is a conversation between two people: {a} and {b}. \
The conversation takes place over multiple days, \
and the date of each conversation is written at the beginning of the conversation.\n\n";

pub const INSTRUCTION_QA: &str =
    "Answer the following question based on the conversation above.\n\n";

pub const INSTRUCTION_COGNITIVE: &str = "Your task: This is a memory-aware dialogue setting. \
You are continuing or reflecting on a prior conversation. \
Show that you are aware of the relevant memory or context from the evidence when you respond; \
your answer should naturally connect to or acknowledge that context.\n\n";

/// Benchmark category of a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    MultiHop,
    Temporal,
    CommonSense,
    SingleHop,
    Adversarial,
    /// LoCoMo category id without a known name.
    Other(i64),
    /// QA item with no category id.
    Unlabelled,
    /// Memory-aware cue/trigger samples.
    Cognitive,
}

impl Category {
    pub fn from_locomo_id(id: Option<i64>) -> Self {
        match id {
            Some(1) => Category::MultiHop,
            Some(2) => Category::Temporal,
            Some(3) => Category::CommonSense,
            Some(4) => Category::SingleHop,
            Some(5) => Category::Adversarial,
            Some(n) => Category::Other(n),
            None => Category::Unlabelled,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Category::MultiHop => "multi-hop".into(),
            Category::Temporal => "temporal".into(),
            Category::CommonSense => "common-sense".into(),
            Category::SingleHop => "single-hop".into(),
            Category::Adversarial => "adversarial".into(),
            Category::Unlabelled => "category_None".into(),
            Category::Other(n) => format!("category_{}", n),
            Category::Cognitive => "Cognitive".into(),
        }
    }

    fn parse_label(label: &str) -> Self {
        match label {
            "multi-hop" => Category::MultiHop,
            "temporal" => Category::Temporal,
            "common-sense" => Category::CommonSense,
            "single-hop" => Category::SingleHop,
            "adversarial" => Category::Adversarial,
            "Cognitive" => Category::Cognitive,
            other => other
                .strip_prefix("category_")
                .and_then(|n| n.parse().ok())
                .map(Category::Other)
                .unwrap_or(Category::Unlabelled),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Category::parse_label(&s))
    }
}

/// One ready-to-evaluate sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSample {
    pub input_prompt: String,
    pub trigger: String,
    pub evidence: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_gap: Option<String>,
}

/// Numbered `session_<n>` keys of a record, sorted by `n`.
fn numbered_sessions(conversation: &Map<String, Value>) -> Vec<(usize, &str)> {
    let mut keys: Vec<(usize, &str)> = conversation
        .keys()
        .filter_map(|k| {
            let n = k.strip_prefix("session_")?.parse::<usize>().ok()?;
            Some((n, k.as_str()))
        })
        .collect();
    keys.sort_unstable_by_key(|(n, _)| *n);
    keys
}

fn turn_field<'a>(turn: &'a Value, key: &str) -> Option<&'a str> {
    turn.get(key).and_then(Value::as_str)
}

/// Render a raw conversation as `DATE:` / `CONVERSATION:` blocks.
///
/// Works on the raw record so every numbered session is shown, including ones
/// after a gap in numbering and ones with unparsed dates.
pub fn render_conversation_context(conversation: &Map<String, Value>) -> String {
    let mut out = String::new();
    for (n, key) in numbered_sessions(conversation) {
        let date = conversation
            .get(&format!("session_{}_date_time", n))
            .and_then(Value::as_str)
            .unwrap_or("");
        out.push_str(&format!("DATE: {}\nCONVERSATION:\n", date));
        let turns = conversation
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for turn in turns {
            let speaker = turn_field(turn, "speaker").unwrap_or("?");
            let text = turn_field(turn, "text").unwrap_or("").trim();
            match turn.get("blip_caption") {
                Some(caption) => {
                    let caption = caption_text(caption);
                    out.push_str(&format!(
                        "{} said, \"{}\" and shared {}.\n",
                        speaker, text, caption
                    ));
                }
                None => out.push_str(&format!("{} said, \"{}\"\n", speaker, text)),
            }
        }
        out.push('\n');
    }
    out
}

/// Caption text for rendered prompts. Null and booleans are spelled
/// `None`/`True`/`False` to match existing prompt files.
fn caption_text(caption: &Value) -> String {
    match caption {
        Value::String(s) => s.clone(),
        Value::Null => "None".into(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        other => other.to_string(),
    }
}

/// Resolve `Dn:k` tokens to `Speaker：text` lines.
pub fn evidence_to_text(conversation: &Map<String, Value>, tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| evidence_line(conversation, token))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_evidence_token(token: &str) -> Option<(i64, i64)> {
    let (session, turn) = token.split_once(':')?;
    if turn.contains(':') {
        return None;
    }
    let session = session.replace('D', "").trim().parse::<i64>().ok()?;
    let turn = turn.trim().parse::<i64>().ok()?;
    Some((session, turn))
}

fn evidence_line(conversation: &Map<String, Value>, token: &str) -> String {
    let Some((session, turn)) = parse_evidence_token(token) else {
        return format!("[{}] [Parse error]", token);
    };
    let turns = conversation
        .get(&format!("session_{}", session))
        .and_then(Value::as_array);
    let found = turns.and_then(|turns| {
        let idx = usize::try_from(turn.checked_sub(1)?).ok()?;
        turns.get(idx)
    });
    match found {
        Some(t) => format!(
            "{}{}{}",
            turn_field(t, "speaker").unwrap_or("Unknown"),
            EVIDENCE_SEPARATOR,
            turn_field(t, "text").unwrap_or("")
        ),
        None => format!("[{}] [Missing turn]", token),
    }
}

fn qa_sample(conversation: &Map<String, Value>, context: &str, qa: &QaItem) -> UnifiedSample {
    let evidence = evidence_to_text(conversation, &qa.evidence.tokens());
    UnifiedSample {
        input_prompt: format!("{}\n\nQuestion: {}", context.trim_end(), qa.question),
        trigger: qa.question.clone(),
        evidence,
        category: Category::from_locomo_id(qa.category),
        answer: qa.answer.clone().filter(|a| !a.is_null()),
        time_gap: None,
    }
}

/// Samples for the five LoCoMo QA categories; no insertion.
pub fn locomo_samples(items: &[LocomoItem]) -> Vec<UnifiedSample> {
    items
        .iter()
        .flat_map(|item| {
            let context = render_conversation_context(&item.conversation);
            item.qa
                .iter()
                .map(|qa| qa_sample(&item.conversation, &context, qa))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn speaker_or<'a>(conversation: &'a Map<String, Value>, key: &str, fallback: &'a str) -> &'a str {
    conversation
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
}

/// Remapped cue dialogue as `Speaker：text` lines, skipping empty turns.
pub fn cue_evidence(pair: &SyntheticPair, conversation: &Map<String, Value>) -> String {
    let speaker_a = speaker_or(conversation, "speaker_a", "A");
    let speaker_b = speaker_or(conversation, "speaker_b", "B");
    parse_and_remap(&pair.cue_dialogue, speaker_a, speaker_b)
        .iter()
        .filter(|t| !t.text.is_empty())
        .map(|t| format!("{}{}{}", t.speaker, EVIDENCE_SEPARATOR, t.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cognitive samples: pair `i` is stitched into conversation `i % n`.
///
/// A pair whose stitching fails keeps an empty `input_prompt` and is logged.
pub fn cognitive_samples(
    items: &[LocomoItem],
    pairs: &[SyntheticPair],
    limit: Option<usize>,
    cfg: &StitchConfig,
) -> Vec<UnifiedSample> {
    if items.is_empty() {
        warn!("no conversations available for cognitive samples");
        return Vec::new();
    }
    let take = limit.unwrap_or(pairs.len()).min(pairs.len());
    pairs[..take]
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let conversation = &items[i % items.len()].conversation;
            let input_prompt = match extract_timeline_with_config(conversation, cfg)
                .and_then(|conv| build_stitched_context_with_config(&conv, pair, cfg))
            {
                Ok(ctx) => ctx.transcript(),
                Err(e) => {
                    warn!(pair = i, error = %e, "stitching failed, leaving prompt empty");
                    String::new()
                }
            };
            UnifiedSample {
                input_prompt,
                trigger: pair.trigger_query.clone(),
                evidence: cue_evidence(pair, conversation),
                category: Category::Cognitive,
                answer: None,
                time_gap: Some(pair.time_gap.clone()),
            }
        })
        .collect()
}

/// All samples: LoCoMo QA first, then Cognitive.
pub fn build_unified_samples(
    items: &[LocomoItem],
    pairs: &[SyntheticPair],
    plus_limit: Option<usize>,
    cfg: &StitchConfig,
) -> Vec<UnifiedSample> {
    let mut samples = locomo_samples(items);
    let qa_count = samples.len();
    samples.extend(cognitive_samples(items, pairs, plus_limit, cfg));
    info!(
        qa = qa_count,
        cognitive = samples.len() - qa_count,
        "built unified samples"
    );
    samples
}

/// Frame a prompt for the model under evaluation: conversation preamble, task
/// instruction for the category, then the trimmed prompt.
pub fn build_model_input(
    input_prompt: &str,
    category: Category,
    speaker_a: &str,
    speaker_b: &str,
) -> String {
    let preamble = CONV_START_PROMPT
        .replace("{a}", speaker_a)
        .replace("{b}", speaker_b);
    let instruction = match category {
        Category::Cognitive => INSTRUCTION_COGNITIVE,
        _ => INSTRUCTION_QA,
    };
    format!("{}{}{}", preamble, instruction, input_prompt.trim())
}
