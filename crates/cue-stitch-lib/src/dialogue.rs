//! Scripted two-speaker dialogue: parsing `A:`/`B:` lines and mapping the
//! placeholder slots onto a conversation's real speakers.

use crate::model::turn::{Slot, Speaker, Turn};

/// Parse a scripted dialogue block into placeholder turns.
///
/// Each line is trimmed; lines starting with `A:` or `B:` become a turn for
/// that slot with the trimmed remainder as text. Every other line is dropped.
pub fn parse_dialogue(text: &str) -> Vec<Turn> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("A:") {
                Some(Turn::placeholder(Slot::A, rest.trim()))
            } else {
                line.strip_prefix("B:")
                    .map(|rest| Turn::placeholder(Slot::B, rest.trim()))
            }
        })
        .collect()
}

/// Replace placeholder speakers with real names.
///
/// Returns fresh turns; the input is left untouched. Turns that already carry a
/// named speaker are copied as-is, so applying this twice is harmless.
pub fn remap_speakers(turns: &[Turn], speaker_a: &str, speaker_b: &str) -> Vec<Turn> {
    turns
        .iter()
        .map(|turn| {
            let mut out = turn.clone();
            if let Speaker::Placeholder(slot) = turn.speaker {
                out.speaker = Speaker::named(match slot {
                    Slot::A => speaker_a,
                    Slot::B => speaker_b,
                });
            }
            out
        })
        .collect()
}

/// Parse and remap in one step.
pub fn parse_and_remap(text: &str, speaker_a: &str, speaker_b: &str) -> Vec<Turn> {
    remap_speakers(&parse_dialogue(text), speaker_a, speaker_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_drops_unprefixed_lines() {
        let turns = parse_dialogue("A: hi\nrandom\nB: bye");
        assert_eq!(
            turns,
            vec![
                Turn::placeholder(Slot::A, "hi"),
                Turn::placeholder(Slot::B, "bye")
            ]
        );
    }

    #[test]
    fn test_parse_trims_and_handles_crlf() {
        let turns = parse_dialogue("   A:   spaced out   \r\n\r\n B:x\r\n");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "spaced out");
        assert_eq!(turns[1].text, "x");
    }

    #[test]
    fn test_parse_is_case_and_prefix_strict() {
        let turns = parse_dialogue("a: lower\nC: third\nA - dash\nAB: joined\nA:");
        // Only the bare "A:" line qualifies; it yields an empty turn.
        assert_eq!(turns, vec![Turn::placeholder(Slot::A, "")]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_dialogue("").is_empty());
        assert!(parse_dialogue("no speakers here").is_empty());
    }

    #[test]
    fn test_remap_substitutes_slots() {
        let turns = parse_dialogue("A: I'm anxious.\nB: You'll be fine.");
        let mapped = remap_speakers(&turns, "Maya", "Lee");
        assert_eq!(mapped[0], Turn::named("Maya", "I'm anxious."));
        assert_eq!(mapped[1], Turn::named("Lee", "You'll be fine."));
        // Input untouched.
        assert!(turns.iter().all(|t| t.speaker.is_placeholder()));
    }

    #[test]
    fn test_remap_is_idempotent_even_for_single_letter_names() {
        let turns = parse_dialogue("A: first\nB: second");
        // Real names that collide with the slot letters, swapped.
        let once = remap_speakers(&turns, "B", "A");
        let twice = remap_speakers(&once, "X", "Y");
        assert_eq!(once, twice);
        assert_eq!(twice[0].speaker.as_str(), "B");
        assert_eq!(twice[1].speaker.as_str(), "A");
    }

    #[test]
    fn test_remap_leaves_named_turns_alone() {
        let turns = vec![Turn::named("Caroline", "hello")];
        assert_eq!(remap_speakers(&turns, "Maya", "Lee"), turns);
    }
}
