use anyhow::Result;
use cue_stitch::dataset::LocomoItem;
use cue_stitch::temporal::format_output_time;
use cue_stitch::{
    build_stitched_context, extract_timeline, stitch_batch, Pairing, StitchConfig, StitchError,
    SyntheticPair, Turn,
};
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(m) => m,
        other => panic!("expected object, got {}", other),
    }
}

fn maya_and_lee() -> Map<String, Value> {
    object(json!({
        "speaker_a": "Maya",
        "speaker_b": "Lee",
        "session_1_date_time": "10:00 AM on 1 January, 2023",
        "session_1": [{"speaker": "Maya", "dia_id": "D1:1", "text": "hi"}],
        "session_2_date_time": "10:00 AM on 8 January, 2023",
        "session_2": [{"speaker": "Lee", "dia_id": "D2:1", "text": "hello"}]
    }))
}

fn pair(cue: &str, trigger: &str, gap: &str) -> SyntheticPair {
    SyntheticPair {
        cue_dialogue: cue.into(),
        trigger_query: trigger.into(),
        time_gap: gap.into(),
    }
}

fn speakers_and_texts(turns: &[Turn]) -> Vec<(String, String)> {
    turns
        .iter()
        .map(|t| (t.speaker.to_string(), t.text.clone()))
        .collect()
}

/// Record in, stitched JSON out, for the two-session Maya/Lee conversation.
#[test]
fn end_to_end_from_raw_record() -> Result<()> {
    let conv = extract_timeline(&maya_and_lee())?;
    let ctx = build_stitched_context(
        &conv,
        &pair(
            "A: I'm anxious.\nB: You'll be fine.",
            "A: I got the job!",
            "two weeks later",
        ),
    )?;

    assert_eq!(format_output_time(&ctx.query_time), "2023-01-15 10:00");
    assert_eq!(format_output_time(&ctx.cue_time), "2023-01-01 10:00");
    assert_eq!(ctx.cue_session_idx, Some(0));
    assert_eq!(
        speakers_and_texts(&ctx.dialogue),
        vec![
            ("Maya".to_string(), "hi".to_string()),
            ("Maya".to_string(), "I'm anxious.".to_string()),
            ("Lee".to_string(), "You'll be fine.".to_string()),
            ("Lee".to_string(), "hello".to_string()),
            ("Maya".to_string(), "I got the job!".to_string()),
        ]
    );

    let out = serde_json::to_value(&ctx)?;
    assert_eq!(out["cue_time"], "2023-01-01 10:00");
    assert_eq!(out["query_time"], "2023-01-15 10:00");
    assert_eq!(out["cue_session_idx"], 0);
    assert_eq!(out["time_gap"], "two weeks later");
    // Real turns keep their original attributes.
    assert_eq!(out["dialogue"][0]["dia_id"], "D1:1");
    assert_eq!(out["query_turns"], json!([{"speaker": "Maya", "text": "I got the job!"}]));
    Ok(())
}

/// A cue that predates every session serialises its anchor as null.
#[test]
fn cue_before_history_has_null_anchor() -> Result<()> {
    let conv = extract_timeline(&maya_and_lee())?;
    let ctx = build_stitched_context(&conv, &pair("A: early", "B: late", "3 years later"))?;
    assert_eq!(ctx.cue_session_idx, None);
    assert_eq!(serde_json::to_value(&ctx)?["cue_session_idx"], Value::Null);
    assert_eq!(ctx.dialogue.first().map(|t| t.text.as_str()), Some("early"));
    Ok(())
}

#[test]
fn turn_count_is_conserved_across_gaps() -> Result<()> {
    let conv = extract_timeline(&maya_and_lee())?;
    let real = conv.turn_count();
    for gap in ["", "a week", "about 2 weeks", "six months", "a year", "12 years"] {
        let ctx = build_stitched_context(&conv, &pair("A: a\nB: b", "A: c", gap))?;
        assert_eq!(ctx.dialogue.len(), real + ctx.cue_turns.len() + ctx.query_turns.len());
    }
    Ok(())
}

#[test]
fn malformed_dates_abort_only_their_own_pairs() {
    let good = LocomoItem {
        conversation: maya_and_lee(),
        qa: Vec::new(),
    };
    let mut broken_record = maya_and_lee();
    broken_record.insert("session_2_date_time".into(), json!("next Tuesday"));
    let broken = LocomoItem {
        conversation: broken_record,
        qa: Vec::new(),
    };

    let pairs: Vec<SyntheticPair> = (0..4)
        .map(|i| pair(&format!("A: cue {}", i), "A: trigger", "one week later"))
        .collect();
    let outcomes = stitch_batch(
        &[good, broken],
        &pairs,
        Pairing::Cyclic,
        &StitchConfig::default(),
    );

    assert_eq!(outcomes.len(), 4);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.pair_index, i);
        assert_eq!(outcome.conversation_index, i % 2);
        if i % 2 == 0 {
            let ctx = outcome.result.as_ref().expect("good conversation stitches");
            assert!(ctx.cue_turns[0].text.ends_with(&i.to_string()));
        } else {
            assert!(matches!(
                outcome.result,
                Err(StitchError::Format { session: 2, .. })
            ));
        }
    }
}

#[test]
fn random_pairing_is_reproducible() {
    let items: Vec<LocomoItem> = (0..3)
        .map(|_| LocomoItem {
            conversation: maya_and_lee(),
            qa: Vec::new(),
        })
        .collect();
    let pairs: Vec<SyntheticPair> = (0..10).map(|_| pair("A: x", "A: y", "a month")).collect();
    let cfg = StitchConfig::default();

    let first: Vec<usize> = stitch_batch(&items, &pairs, Pairing::Random { seed: 7 }, &cfg)
        .iter()
        .map(|o| o.conversation_index)
        .collect();
    let second: Vec<usize> = stitch_batch(&items, &pairs, Pairing::Random { seed: 7 }, &cfg)
        .iter()
        .map(|o| o.conversation_index)
        .collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|&i| i < 3));
}

#[test]
fn empty_conversation_list_yields_no_outcomes() {
    let outcomes = stitch_batch(
        &[],
        &[pair("A: x", "A: y", "a week")],
        Pairing::Cyclic,
        &StitchConfig::default(),
    );
    assert!(outcomes.is_empty());
}
