use serde::{Deserialize, Serialize};

use super::token::{tokenize, Annotation, Token};
use super::trigger::Trigger;

/// Pause state carried in an interval note: the task to resume and the
/// timer it should resume with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paused {
    pub task_id: i64,
    pub timer_seconds: i64,
}

/// Pre-prolong target duration, kept for display and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prolonged {
    pub original_timer_seconds: i64,
}

/// The structured value embedded in a text string.
///
/// `parse` extracts every recognized annotation wherever it appears; the
/// remaining words, joined by single spaces, become `bare_text`. For the
/// scalar annotations (activity, timer, pause, prolonged, repeating) the last
/// occurrence wins; triggers keep duplicates in appearance order. `encode`
/// emits the canonical order -- bare text, activity, timer, triggers, pause,
/// prolonged, important, repeating -- so parsing an encoded value yields it
/// back field for field, and a second parse/encode pass changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextFeatures {
    pub bare_text: String,
    pub activity_id: Option<i64>,
    pub timer_seconds: Option<i64>,
    pub triggers: Vec<Trigger>,
    pub paused: Option<Paused>,
    pub prolonged: Option<Prolonged>,
    pub is_important: bool,
    pub from_repeating_id: Option<i64>,
}

impl TextFeatures {
    /// Decode `raw`. Never fails: unrecognized `#` tokens stay in the bare
    /// text, and a known tag with an unparseable payload is dropped without
    /// touching anything else.
    pub fn parse(raw: &str) -> Self {
        let mut features = TextFeatures::default();
        let mut words: Vec<&str> = Vec::new();
        for token in tokenize(raw) {
            match token {
                Token::Word(word) => words.push(word),
                Token::Malformed(_) => {}
                Token::Annotation(annotation) => match annotation {
                    Annotation::Activity(id) => features.activity_id = Some(id),
                    Annotation::Timer(seconds) => features.timer_seconds = Some(seconds),
                    Annotation::Trigger(trigger) => features.triggers.push(trigger),
                    Annotation::Pause {
                        task_id,
                        timer_seconds,
                    } => {
                        features.paused = Some(Paused {
                            task_id,
                            timer_seconds,
                        })
                    }
                    Annotation::Prolonged {
                        original_timer_seconds,
                    } => {
                        features.prolonged = Some(Prolonged {
                            original_timer_seconds,
                        })
                    }
                    Annotation::Important => features.is_important = true,
                    Annotation::FromRepeating(id) => features.from_repeating_id = Some(id),
                },
            }
        }
        features.bare_text = words.join(" ");
        features
    }

    /// Encode back to text in canonical form: one space between pieces,
    /// annotations after the bare text in fixed kind order.
    pub fn encode(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.bare_text.is_empty() {
            parts.push(self.bare_text.clone());
        }
        if let Some(id) = self.activity_id {
            parts.push(format!("#a:{id}"));
        }
        if let Some(seconds) = self.timer_seconds {
            parts.push(format!("#t:{seconds}"));
        }
        for trigger in &self.triggers {
            parts.push(trigger.encode());
        }
        if let Some(paused) = &self.paused {
            parts.push(format!("#pause:{}/{}", paused.task_id, paused.timer_seconds));
        }
        if let Some(prolonged) = &self.prolonged {
            parts.push(format!("#prolonged:{}", prolonged.original_timer_seconds));
        }
        if self.is_important {
            parts.push("#important".to_string());
        }
        if let Some(id) = self.from_repeating_id {
            parts.push(format!("#r:{id}"));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_annotations_anywhere() {
        let features = TextFeatures::parse("#t:1500 Read the #important paper #a:3");
        assert_eq!(features.bare_text, "Read the paper");
        assert_eq!(features.activity_id, Some(3));
        assert_eq!(features.timer_seconds, Some(1500));
        assert!(features.is_important);
    }

    #[test]
    fn parse_collapses_whitespace_left_by_removal() {
        let features = TextFeatures::parse("  Read   #t:60   the paper  ");
        assert_eq!(features.bare_text, "Read the paper");
    }

    #[test]
    fn unknown_annotation_stays_in_bare_text() {
        let features = TextFeatures::parse("call mom #xyz:42");
        assert_eq!(features.bare_text, "call mom #xyz:42");
        assert_eq!(features, TextFeatures::parse(&features.encode()));
    }

    #[test]
    fn malformed_timer_is_dropped_silently() {
        let features = TextFeatures::parse("Read #t:12x book #a:3");
        assert_eq!(features.timer_seconds, None);
        assert_eq!(features.activity_id, Some(3));
        assert_eq!(features.bare_text, "Read book");
    }

    #[test]
    fn last_scalar_occurrence_wins() {
        let features = TextFeatures::parse("#t:60 between #t:120 #a:1 #a:2");
        assert_eq!(features.timer_seconds, Some(120));
        assert_eq!(features.activity_id, Some(2));
    }

    #[test]
    fn duplicate_triggers_are_kept_in_order() {
        let features = TextFeatures::parse("#c:1 words #l:9 #c:1");
        assert_eq!(
            features.triggers,
            vec![
                Trigger::OpenChecklist { checklist_id: 1 },
                Trigger::OpenLink { link_id: 9 },
                Trigger::OpenChecklist { checklist_id: 1 },
            ]
        );
    }

    #[test]
    fn encode_uses_canonical_order() {
        let features = TextFeatures {
            bare_text: "Deep work".to_string(),
            activity_id: Some(4),
            timer_seconds: Some(3600),
            triggers: vec![Trigger::OpenChecklist { checklist_id: 2 }],
            paused: None,
            prolonged: Some(Prolonged {
                original_timer_seconds: 1800,
            }),
            is_important: true,
            from_repeating_id: Some(11),
        };
        assert_eq!(
            features.encode(),
            "Deep work #a:4 #t:3600 #c:2 #prolonged:1800 #important #r:11"
        );
    }

    #[test]
    fn encode_without_bare_text_has_no_leading_space() {
        let features = TextFeatures {
            paused: Some(Paused {
                task_id: 5,
                timer_seconds: 900,
            }),
            ..Default::default()
        };
        assert_eq!(features.encode(), "#pause:5/900");
    }
}
