use clap::Subcommand;
use focal_core::{ActivityKind, Database};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// List activities as JSON
    List,
    /// Add an activity
    Add {
        name: String,
        /// Emoji shown next to the activity
        #[arg(long, default_value = "")]
        emoji: String,
    },
}

pub fn run(action: ActivityAction) -> CmdResult {
    let db = Database::open()?;
    match action {
        ActivityAction::List => {
            let activities = db.activities()?;
            println!("{}", serde_json::to_string_pretty(&activities)?);
        }
        ActivityAction::Add { name, emoji } => {
            let id = db.insert_activity(&name, &emoji, ActivityKind::Normal)?;
            println!("Activity created: {id}");
        }
    }
    Ok(())
}
