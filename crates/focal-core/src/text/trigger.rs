use serde::{Deserialize, Serialize};

use crate::color::ColorRgba;

/// A one-tap shortcut decoded from text, rendered as a small tappable
/// element. Triggers are display+action only: they have no persisted
/// identity beyond the text that carries them, and duplicates are kept in
/// appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    StartTimer { activity_id: i64, timer_seconds: i64 },
    OpenChecklist { checklist_id: i64 },
    OpenActivity { activity_id: i64 },
    OpenLink { link_id: i64 },
    SetRepeating { repeating_id: i64 },
}

impl Trigger {
    /// Stable list-rendering key derived from kind and payload.
    pub fn id(&self) -> String {
        match self {
            Trigger::StartTimer {
                activity_id,
                timer_seconds,
            } => format!("start_timer_{activity_id}_{timer_seconds}"),
            Trigger::OpenChecklist { checklist_id } => format!("checklist_{checklist_id}"),
            Trigger::OpenActivity { activity_id } => format!("activity_{activity_id}"),
            Trigger::OpenLink { link_id } => format!("link_{link_id}"),
            Trigger::SetRepeating { repeating_id } => format!("repeating_{repeating_id}"),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Trigger::StartTimer { timer_seconds, .. } => {
                format!("Timer {}m", timer_seconds / 60)
            }
            Trigger::OpenChecklist { checklist_id } => format!("Checklist #{checklist_id}"),
            Trigger::OpenActivity { activity_id } => format!("Activity #{activity_id}"),
            Trigger::OpenLink { link_id } => format!("Link #{link_id}"),
            Trigger::SetRepeating { repeating_id } => format!("Repeating #{repeating_id}"),
        }
    }

    pub fn color(&self) -> ColorRgba {
        match self {
            Trigger::StartTimer { .. } => ColorRgba::GREEN,
            Trigger::OpenChecklist { .. } => ColorRgba::BLUE,
            Trigger::OpenActivity { .. } => ColorRgba::PURPLE,
            Trigger::OpenLink { .. } => ColorRgba::ORANGE,
            Trigger::SetRepeating { .. } => ColorRgba::RED,
        }
    }

    /// Canonical annotation token, the exact form decode recognizes.
    pub(crate) fn encode(&self) -> String {
        match self {
            Trigger::StartTimer {
                activity_id,
                timer_seconds,
            } => format!("#st:{activity_id}/{timer_seconds}"),
            Trigger::OpenChecklist { checklist_id } => format!("#c:{checklist_id}"),
            Trigger::OpenActivity { activity_id } => format!("#o:{activity_id}"),
            Trigger::OpenLink { link_id } => format!("#l:{link_id}"),
            Trigger::SetRepeating { repeating_id } => format!("#rp:{repeating_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_per_payload() {
        let a = Trigger::OpenChecklist { checklist_id: 7 };
        let b = Trigger::OpenChecklist { checklist_id: 7 };
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id(), "checklist_7");
    }

    #[test]
    fn encode_matches_grammar() {
        let trigger = Trigger::StartTimer {
            activity_id: 3,
            timer_seconds: 1500,
        };
        assert_eq!(trigger.encode(), "#st:3/1500");
    }
}
