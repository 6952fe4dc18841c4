//! Tokenizer and recognizer for the annotation grammar.
//!
//! An annotation is a whitespace-delimited token: the `#` marker, a short
//! tag, `:` and a payload (`#important` has no payload). The tag set is
//! closed; adding an annotation kind means one [`Annotation`] variant and one
//! recognizer arm. A `#` token with an unknown tag is ordinary text -- that
//! is what keeps old decoders tolerant of annotations they don't know.

use super::trigger::Trigger;

/// One recognized annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Annotation {
    Activity(i64),
    Timer(i64),
    Trigger(Trigger),
    Pause { task_id: i64, timer_seconds: i64 },
    Prolonged { original_timer_seconds: i64 },
    Important,
    FromRepeating(i64),
}

/// One token of the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token<'a> {
    Word(&'a str),
    Annotation(Annotation),
    /// A known tag whose payload fails the strict numeric rules. Consumed
    /// without producing a field; the rest of the text is unaffected.
    Malformed(&'a str),
}

pub(super) fn tokenize(raw: &str) -> impl Iterator<Item = Token<'_>> {
    raw.split_whitespace().map(classify)
}

fn classify(token: &str) -> Token<'_> {
    let Some(rest) = token.strip_prefix('#') else {
        return Token::Word(token);
    };
    if rest == "important" {
        return Token::Annotation(Annotation::Important);
    }
    let Some((tag, payload)) = rest.split_once(':') else {
        return Token::Word(token);
    };
    let annotation = match tag {
        "a" => id(payload).map(Annotation::Activity),
        "t" => positive(payload).map(Annotation::Timer),
        "c" => id(payload).map(|checklist_id| {
            Annotation::Trigger(Trigger::OpenChecklist { checklist_id })
        }),
        "o" => id(payload).map(|activity_id| {
            Annotation::Trigger(Trigger::OpenActivity { activity_id })
        }),
        "l" => id(payload).map(|link_id| Annotation::Trigger(Trigger::OpenLink { link_id })),
        "rp" => id(payload).map(|repeating_id| {
            Annotation::Trigger(Trigger::SetRepeating { repeating_id })
        }),
        "st" => pair(payload).map(|(activity_id, timer_seconds)| {
            Annotation::Trigger(Trigger::StartTimer {
                activity_id,
                timer_seconds,
            })
        }),
        "pause" => pair(payload).map(|(task_id, timer_seconds)| Annotation::Pause {
            task_id,
            timer_seconds,
        }),
        "prolonged" => positive(payload).map(|original_timer_seconds| Annotation::Prolonged {
            original_timer_seconds,
        }),
        "r" => id(payload).map(Annotation::FromRepeating),
        _ => return Token::Word(token),
    };
    match annotation {
        Some(annotation) => Token::Annotation(annotation),
        None => Token::Malformed(token),
    }
}

/// Strict non-negative integer: ascii digits only, so signs, floats and
/// empty payloads are rejected.
fn id(payload: &str) -> Option<i64> {
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    payload.parse().ok()
}

fn positive(payload: &str) -> Option<i64> {
    id(payload).filter(|value| *value > 0)
}

/// `<id>/<positive>` payload, used by pause and start-timer annotations.
fn pair(payload: &str) -> Option<(i64, i64)> {
    let (left, right) = payload.split_once('/')?;
    Some((id(left)?, positive(right)?))
}
