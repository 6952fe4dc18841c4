use std::sync::Arc;

use clap::Subcommand;
use focal_core::storage::Config;
use focal_core::{Database, IntervalMachine, Phase};

use super::CmdResult;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current interval and phase as JSON
    Status,
    /// Start a fresh interval for an activity
    Start {
        activity_id: i64,
        /// Target duration in seconds; defaults to the configured value
        #[arg(long)]
        seconds: Option<i64>,
    },
    /// Pause the running interval
    Pause,
    /// Resume the paused task (defaults to the one the pause recorded)
    Resume {
        #[arg(long)]
        task_id: Option<i64>,
    },
    /// Extend the current interval
    Prolong { extra_seconds: i64 },
    /// Restart the current interval from now, discarding progress
    Restart,
}

pub fn run(action: TimerAction) -> CmdResult {
    let db = Arc::new(Database::open()?);
    let machine = IntervalMachine::new(db.clone());
    match action {
        TimerAction::Status => {
            let status = serde_json::json!({
                "phase": machine.phase()?,
                "interval": db.last_interval()?,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        TimerAction::Start {
            activity_id,
            seconds,
        } => {
            let Some(activity) = db.activity(activity_id)? else {
                return Err(format!("no activity with id {activity_id}").into());
            };
            let timer_seconds = match seconds {
                Some(seconds) => seconds,
                None => Config::load()?.default_timer_seconds,
            };
            let interval = machine.start(&activity, timer_seconds, None)?;
            println!("Started at {}", interval.start_time);
        }
        TimerAction::Pause => match machine.pause()? {
            Some(interval) => println!("Paused (start time {})", interval.start_time),
            None => println!("Nothing to pause"),
        },
        TimerAction::Resume { task_id } => {
            let task_id = match task_id {
                Some(id) => Some(id),
                None => match machine.phase()? {
                    Phase::Paused { task_id, .. } => Some(task_id),
                    _ => None,
                },
            };
            let resumed = match task_id {
                Some(id) => machine.resume(id)?,
                None => None,
            };
            match resumed {
                Some(interval) => println!("Resumed at {}", interval.start_time),
                None => println!("Nothing to resume"),
            }
        }
        TimerAction::Prolong { extra_seconds } => match machine.prolong(extra_seconds)? {
            Some(interval) => println!("Prolonged to {}s", interval.timer_seconds),
            None => println!("Nothing to prolong"),
        },
        TimerAction::Restart => match machine.restart()? {
            Some(interval) => println!("Restarted at {}", interval.start_time),
            None => println!("Nothing to restart"),
        },
    }
    Ok(())
}
