use clap::Subcommand;
use focal_core::{Database, IntervalMachine, TextFeatures, FOLDER_TODAY};

use super::CmdResult;

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks in a folder as JSON, newest first
    List {
        #[arg(long, default_value_t = FOLDER_TODAY)]
        folder: i64,
    },
    /// Add a task; annotations like `#a:<id>` and `#t:<secs>` are parsed
    /// straight out of the text
    Add {
        text: String,
        #[arg(long, default_value_t = FOLDER_TODAY)]
        folder: i64,
    },
    /// Start the timer a task's annotations describe
    Start { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

pub fn run(action: TaskAction) -> CmdResult {
    let db = std::sync::Arc::new(Database::open()?);
    match action {
        TaskAction::List { folder } => {
            let mut tasks = db.tasks_in_folder(folder)?;
            tasks.reverse();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Add { text, folder } => {
            let id = db.insert_task(folder, &text)?;
            let features = TextFeatures::parse(&text);
            println!("Task created: {id} ({})", features.bare_text);
        }
        TaskAction::Start { id } => {
            let Some(task) = db.task(id)? else {
                return Err(format!("no task with id {id}").into());
            };
            let features = TextFeatures::parse(&task.text);
            let (Some(activity_id), Some(timer_seconds)) =
                (features.activity_id, features.timer_seconds)
            else {
                return Err("task text needs #a:<activity> and #t:<seconds> to start".into());
            };
            let Some(activity) = db.activity(activity_id)? else {
                return Err(format!("no activity with id {activity_id}").into());
            };
            let machine = IntervalMachine::new(db.clone());
            let interval = machine.start(&activity, timer_seconds, Some(&task))?;
            println!("Started at {}", interval.start_time);
        }
        TaskAction::Delete { id } => {
            db.delete_task(id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
