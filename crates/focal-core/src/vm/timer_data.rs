//! Derived display state for the current interval.
//!
//! A pure function of the interval, its activity, today's tasks and the
//! clock; rebuilt in full on every snapshot.

use serde::Serialize;

use super::seconds_to_text;
use crate::color::ColorRgba;
use crate::records::{Activity, Interval, Task};
use crate::text::TextFeatures;
use crate::timer::Phase;

/// The paused task resolved from the interval note. Present only when every
/// reference holds: the task exists in today's list and its text carries an
/// activity link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PausedTask {
    pub task_id: i64,
    pub activity_id: i64,
    pub timer_seconds: i64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlIcon {
    Pause,
    Play,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerData {
    pub phase: Phase,
    pub timer_text: String,
    pub timer_color: ColorRgba,
    pub note_text: String,
    pub note_color: ColorRgba,
    pub control_icon: ControlIcon,
    /// 0.0 ..= 1.0 of the target window elapsed.
    pub progress_ratio: f64,
    pub paused_task: Option<PausedTask>,
}

impl TimerData {
    pub fn build(
        interval: &Interval,
        activity: Option<&Activity>,
        today_tasks: &[Task],
        now: i64,
    ) -> Self {
        let phase = Phase::of(interval, now);
        let features = TextFeatures::parse(interval.note.as_deref().unwrap_or(""));

        let paused_task = features.paused.and_then(|paused| {
            let task = today_tasks.iter().find(|task| task.id == paused.task_id)?;
            let task_features = TextFeatures::parse(&task.text);
            Some(PausedTask {
                task_id: task.id,
                activity_id: task_features.activity_id?,
                timer_seconds: task_features.timer_seconds.unwrap_or(paused.timer_seconds),
                title: task_features.bare_text,
            })
        });

        let seconds_to_end = interval.seconds_to_end(now);
        let is_paused = matches!(phase, Phase::Paused { .. });
        let timer_color = if is_paused {
            ColorRgba::GREEN
        } else if seconds_to_end < 0 {
            ColorRgba::RED
        } else {
            ColorRgba::WHITE
        };
        let note_color = if is_paused { ColorRgba::GREEN } else { timer_color };

        let note_text = if features.bare_text.is_empty() {
            activity.map(|activity| activity.name.clone()).unwrap_or_default()
        } else {
            features.bare_text.clone()
        };

        let progress_ratio = if interval.timer_seconds > 0 {
            ((now - interval.start_time) as f64 / interval.timer_seconds as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            phase,
            timer_text: seconds_to_text(seconds_to_end),
            timer_color,
            note_text,
            note_color,
            control_icon: if is_paused {
                ControlIcon::Play
            } else {
                ControlIcon::Pause
            },
            progress_ratio,
            paused_task,
        }
    }
}
