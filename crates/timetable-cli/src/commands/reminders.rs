//! Reminder commands for CLI.

use chrono::NaiveDateTime;
use clap::Subcommand;
use timetable_core::reminder::plan_reminders;
use timetable_core::TaskStore;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Show the reminder batch a sync would produce, without delivering it
    Plan,
    /// Replace pending reminders with a fresh batch
    Sync,
    /// Show reminders currently waiting in the outbox
    Pending,
}

pub fn run(action: RemindersAction, now: NaiveDateTime) -> CliResult {
    let mut app = open_app()?;

    match action {
        RemindersAction::Plan => {
            let entries = app.store().list()?;
            let plan = plan_reminders(&entries, now, app.scheduler().settings());
            print_json(&plan)?;
        }
        RemindersAction::Sync => {
            let pass = app.sync_reminders(now)?;
            print_json(pass)?;
            if !pass.is_ok() {
                return Err(format!("reminder sync failed: {:?}", pass.outcome).into());
            }
        }
        RemindersAction::Pending => {
            let pending = app.scheduler().sink().read_pending()?;
            print_json(&pending)?;
        }
    }
    Ok(())
}
