//! Agenda commands for CLI.

use chrono::NaiveDateTime;
use clap::Subcommand;
use serde::Serialize;
use timetable_core::agenda;
use timetable_core::EntryStatus;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum AgendaAction {
    /// Open entries scheduled for today
    Today,
    /// The next entry starting today, with a countdown
    Next,
    /// Completion totals across all entries
    Summary,
    /// Entries per weekday, Monday first
    Week,
}

#[derive(Serialize)]
struct NextUp<'a> {
    #[serde(flatten)]
    status: &'a EntryStatus,
    starts: String,
}

pub fn run(action: AgendaAction, now: NaiveDateTime) -> CliResult {
    let app = open_app()?;
    let statuses = app.entries(now)?;

    match action {
        AgendaAction::Today => print_json(&agenda::today(&statuses, now))?,
        AgendaAction::Next => match agenda::next_up(&statuses, now) {
            Some(status) => print_json(&NextUp {
                status,
                starts: agenda::time_until(&status.entry, now),
            })?,
            None => println!("Nothing else scheduled today"),
        },
        AgendaAction::Summary => print_json(&agenda::summary(&statuses))?,
        AgendaAction::Week => print_json(&agenda::weekly_breakdown(&statuses))?,
    }
    Ok(())
}
