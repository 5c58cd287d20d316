pub mod agenda;
pub mod config;
pub mod entry;
pub mod reminders;

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use timetable_core::entry::wire;
use timetable_core::storage::data_dir;
use timetable_core::{Config, OutboxSink, SchedulePass, Timetable, TimetableDb};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// The service the CLI operates on: the on-disk database plus the
/// reminder outbox next to it.
pub type App = Timetable<TimetableDb, OutboxSink>;

pub fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = TimetableDb::open()?;
    let outbox = OutboxSink::new(data_dir()?.join("reminders.json"));
    Ok(Timetable::new(db, outbox, config.reminder_settings()))
}

pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn parse_now(raw: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("'{raw}' is not a local date-time like 2024-05-06T08:50"))
}

pub fn parse_day(raw: &str) -> Result<Weekday, String> {
    wire::parse_weekday(raw).map_err(|e| e.to_string())
}

pub fn parse_clock(raw: &str) -> Result<NaiveTime, String> {
    wire::parse_time(raw).map_err(|e| e.to_string())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Reminder failures never fail a command; they are reported on stderr.
pub fn report_pass(pass: Option<&SchedulePass>) {
    if let Some(pass) = pass {
        if !pass.is_ok() {
            eprintln!("warning: reminders were not updated ({:?})", pass.outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_now_accepts_minute_precision() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(8, 50, 0)
            .unwrap();
        assert_eq!(parse_now("2024-05-06T08:50").unwrap(), expected);
        assert_eq!(parse_now("2024-05-06 08:50").unwrap(), expected);
        assert!(parse_now("monday").is_err());
    }

    #[test]
    fn parse_day_and_clock() {
        assert_eq!(parse_day("wed").unwrap(), Weekday::Wed);
        assert_eq!(parse_clock("14:00").unwrap(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(parse_clock("25:00").is_err());
    }
}
