//! Codec properties: full round trip, idempotent re-encode, and strict-tag
//! degradation.

use focal_core::{Paused, Prolonged, TextFeatures, Trigger};
use proptest::prelude::*;

fn bare_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("[A-Za-z]{1,8}", 0..6).prop_map(|words| words.join(" "))
}

fn trigger() -> impl Strategy<Value = Trigger> {
    prop_oneof![
        (0..10_000i64, 1..100_000i64).prop_map(|(activity_id, timer_seconds)| {
            Trigger::StartTimer {
                activity_id,
                timer_seconds,
            }
        }),
        (0..10_000i64).prop_map(|checklist_id| Trigger::OpenChecklist { checklist_id }),
        (0..10_000i64).prop_map(|activity_id| Trigger::OpenActivity { activity_id }),
        (0..10_000i64).prop_map(|link_id| Trigger::OpenLink { link_id }),
        (0..10_000i64).prop_map(|repeating_id| Trigger::SetRepeating { repeating_id }),
    ]
}

prop_compose! {
    fn features()(
        bare_text in bare_text(),
        activity_id in proptest::option::of(0..100_000i64),
        timer_seconds in proptest::option::of(1..1_000_000i64),
        triggers in proptest::collection::vec(trigger(), 0..4),
        paused in proptest::option::of((0..100_000i64, 1..1_000_000i64)),
        prolonged in proptest::option::of(1..1_000_000i64),
        is_important in any::<bool>(),
        from_repeating_id in proptest::option::of(0..100_000i64),
    ) -> TextFeatures {
        TextFeatures {
            bare_text,
            activity_id,
            timer_seconds,
            triggers,
            paused: paused.map(|(task_id, timer_seconds)| Paused { task_id, timer_seconds }),
            prolonged: prolonged.map(|original_timer_seconds| Prolonged { original_timer_seconds }),
            is_important,
            from_repeating_id,
        }
    }
}

proptest! {
    /// Every reachable features value survives an encode/decode cycle
    /// field for field.
    #[test]
    fn decode_encode_round_trips(f in features()) {
        prop_assert_eq!(TextFeatures::parse(&f.encode()), f);
    }

    /// One decode/encode pass canonicalizes; a second changes nothing.
    /// Inputs include `#` junk, half-formed annotations and stray spaces.
    #[test]
    fn encode_decode_is_idempotent(raw in "[ -~]{0,60}") {
        let once = TextFeatures::parse(&raw).encode();
        let twice = TextFeatures::parse(&once).encode();
        prop_assert_eq!(once, twice);
    }

    /// A malformed timer annotation degrades to absent without disturbing
    /// the rest of the string.
    #[test]
    fn malformed_timer_never_poisons_the_parse(payload in "[a-z!.]{1,6}") {
        let raw = format!("Read #t:{payload} book #a:3 #important");
        let f = TextFeatures::parse(&raw);
        prop_assert_eq!(f.timer_seconds, None);
        prop_assert_eq!(f.activity_id, Some(3));
        prop_assert!(f.is_important);
        prop_assert_eq!(f.bare_text.as_str(), "Read book");
    }
}

#[test]
fn out_of_range_timer_is_dropped_field_only() {
    let f = TextFeatures::parse("warmup #t:0 #c:2 stretch");
    assert_eq!(f.timer_seconds, None);
    assert_eq!(f.triggers, vec![Trigger::OpenChecklist { checklist_id: 2 }]);
    assert_eq!(f.bare_text, "warmup stretch");
}

#[test]
fn last_timer_annotation_wins_then_encodes_canonically() {
    let f = TextFeatures::parse("#t:300 plan week #t:900");
    assert_eq!(f.timer_seconds, Some(900));
    assert_eq!(f.encode(), "plan week #t:900");
}

#[test]
fn unknown_annotations_ride_along_in_bare_text() {
    let raw = "ship release #v2:7 #t:600";
    let f = TextFeatures::parse(raw);
    assert_eq!(f.bare_text, "ship release #v2:7");
    assert_eq!(f.timer_seconds, Some(600));
    // Still stable across another cycle.
    assert_eq!(TextFeatures::parse(&f.encode()), f);
}

#[test]
fn full_feature_string_round_trips_by_example() {
    let f = TextFeatures {
        bare_text: "Morning pages".to_string(),
        activity_id: Some(2),
        timer_seconds: Some(1200),
        triggers: vec![
            Trigger::OpenChecklist { checklist_id: 4 },
            Trigger::StartTimer {
                activity_id: 2,
                timer_seconds: 600,
            },
            Trigger::OpenChecklist { checklist_id: 4 },
        ],
        paused: Some(Paused {
            task_id: 31,
            timer_seconds: 1200,
        }),
        prolonged: Some(Prolonged {
            original_timer_seconds: 900,
        }),
        is_important: true,
        from_repeating_id: Some(8),
    };
    let encoded = f.encode();
    assert_eq!(
        encoded,
        "Morning pages #a:2 #t:1200 #c:4 #st:2/600 #c:4 #pause:31/1200 #prolonged:900 #important #r:8"
    );
    assert_eq!(TextFeatures::parse(&encoded), f);
}
