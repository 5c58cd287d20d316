//! Timetable entry commands for CLI.

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use clap::Subcommand;
use timetable_core::agenda;
use timetable_core::{CoreError, EntryDraft, EntryPatch, Priority, Recurrence};

use super::{open_app, parse_clock, parse_day, print_json, report_pass, CliResult};

#[derive(Subcommand)]
pub enum EntryAction {
    /// Add an entry
    Add {
        /// What the entry is about
        subject: String,
        /// Weekday (e.g. "Monday", "wed")
        #[arg(long, value_parser = parse_day)]
        day: Weekday,
        /// Start time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        start: NaiveTime,
        /// End time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        end: NaiveTime,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Low, Medium or High (default: Medium)
        #[arg(long, default_value = "Medium")]
        priority: Priority,
        /// None, Daily or Weekly (default: None)
        #[arg(long, default_value = "None")]
        repeat: Recurrence,
        /// Minutes before the start to remind; 0 disables the reminder
        #[arg(long, default_value_t = 0)]
        alert: u32,
    },
    /// List entries with their current status
    List {
        /// Only entries on this weekday
        #[arg(long, value_parser = parse_day)]
        day: Option<Weekday>,
        /// Case-insensitive text to find in subject or location
        #[arg(long)]
        search: Option<String>,
    },
    /// Get entry details
    Get {
        /// Entry ID
        id: String,
    },
    /// Update an entry
    Update {
        /// Entry ID
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, value_parser = parse_day)]
        day: Option<Weekday>,
        #[arg(long, value_parser = parse_clock)]
        start: Option<NaiveTime>,
        #[arg(long, value_parser = parse_clock)]
        end: Option<NaiveTime>,
        /// New location (empty string clears it)
        #[arg(long)]
        location: Option<String>,
        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        repeat: Option<Recurrence>,
        #[arg(long)]
        alert: Option<u32>,
        /// Set completed status for the current cycle
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },
    /// Mark an entry done for the current cycle
    Done {
        /// Entry ID
        id: String,
    },
    /// Mark an entry not done for the current cycle
    Undo {
        /// Entry ID
        id: String,
    },
}

pub fn run(action: EntryAction, now: NaiveDateTime) -> CliResult {
    let mut app = open_app()?;

    match action {
        EntryAction::Add {
            subject,
            day,
            start,
            end,
            location,
            notes,
            priority,
            repeat,
            alert,
        } => {
            let mut draft = EntryDraft::new(subject, day, start, end);
            draft.location = location;
            draft.notes = notes;
            draft.priority = priority;
            draft.recurrence = repeat;
            draft.alert_offset_minutes = alert;
            let entry = app.add(draft, now)?;
            eprintln!("Entry created: {}", entry.id);
            print_json(&entry)?;
        }
        EntryAction::List { day, search } => {
            let statuses = app.entries(now)?;
            print_json(&agenda::filter(&statuses, day, search.as_deref()))?;
        }
        EntryAction::Get { id } => {
            print_json(&app.status(&id, now)?)?;
        }
        EntryAction::Update {
            id,
            subject,
            day,
            start,
            end,
            location,
            notes,
            priority,
            repeat,
            alert,
            completed,
        } => {
            let patch = EntryPatch {
                subject,
                location,
                notes,
                day,
                start_time: start,
                end_time: end,
                priority,
                recurrence: repeat,
                alert_offset_minutes: alert,
                completed,
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            print_json(&app.edit(&id, patch, now)?)?;
        }
        EntryAction::Delete { id } => {
            app.remove(&id, now)?;
            println!("Entry deleted: {id}");
        }
        EntryAction::Done { id } => toggle(&mut app, &id, true, now)?,
        EntryAction::Undo { id } => toggle(&mut app, &id, false, now)?,
    }

    report_pass(app.last_pass());
    Ok(())
}

fn toggle(app: &mut super::App, id: &str, done: bool, now: NaiveDateTime) -> CliResult {
    match app.set_completion(id, done, now) {
        Ok(status) => print_json(&status),
        Err(CoreError::Validation(e)) => Err(format!("cannot update {id}: {e}").into()),
        Err(e) => Err(e.into()),
    }
}
