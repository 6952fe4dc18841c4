use chrono::NaiveDate;
use clap::Subcommand;
use focal_core::Database;

use super::CmdResult;

#[derive(Subcommand)]
pub enum RepeatingAction {
    /// List repeating tasks as JSON
    List,
    /// Add a repeating task
    Add {
        text: String,
        /// Human description of the period, e.g. "Every day"
        #[arg(long)]
        period: String,
        /// Next occurrence as YYYY-MM-DD
        #[arg(long)]
        next: String,
    },
    /// Delete a repeating task
    Delete { id: i64 },
}

pub fn run(action: RepeatingAction) -> CmdResult {
    let db = Database::open()?;
    match action {
        RepeatingAction::List => {
            let repeatings = db.repeatings()?;
            println!("{}", serde_json::to_string_pretty(&repeatings)?);
        }
        RepeatingAction::Add { text, period, next } => {
            let date = NaiveDate::parse_from_str(&next, "%Y-%m-%d")?;
            let next_day = date.signed_duration_since(NaiveDate::default()).num_days();
            let id = db.insert_repeating(&text, &period, next_day)?;
            println!("Repeating created: {id}");
        }
        RepeatingAction::Delete { id } => {
            db.delete_repeating(id)?;
            println!("Repeating deleted: {id}");
        }
    }
    Ok(())
}
