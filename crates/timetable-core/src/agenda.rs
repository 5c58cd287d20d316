//! Dashboard queries over entry statuses: today's agenda, what's next, and totals.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

use crate::entry::{Entry, Recurrence};
use crate::planner::EntryStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Rounded percentage; 0 when there are no entries.
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    #[serde(with = "crate::entry::wire::weekday_name")]
    pub day: Weekday,
    pub total: usize,
    pub completed: usize,
}

fn scheduled_on(entry: &Entry, day: Weekday) -> bool {
    entry.recurrence == Recurrence::Daily || entry.day == day
}

/// Entries on today's schedule that are still open, earliest first.
pub fn today(statuses: &[EntryStatus], now: NaiveDateTime) -> Vec<&EntryStatus> {
    let weekday = now.date().weekday();
    let mut open: Vec<&EntryStatus> = statuses
        .iter()
        .filter(|s| !s.done && scheduled_on(&s.entry, weekday))
        .collect();
    open.sort_by_key(|s| s.entry.start_time);
    open
}

/// The first open entry of today that has not started yet.
pub fn next_up(statuses: &[EntryStatus], now: NaiveDateTime) -> Option<&EntryStatus> {
    let minute = minute_of_day(now);
    today(statuses, now)
        .into_iter()
        .find(|s| minute_of_day_time(s.entry.start_time) > minute)
}

pub fn summary(statuses: &[EntryStatus]) -> Summary {
    let total = statuses.len();
    let completed = statuses.iter().filter(|s| s.done).count();
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    Summary {
        total,
        completed,
        pending: total - completed,
        completion_rate,
    }
}

/// Entries matching a weekday and a search text, in their original order.
///
/// The day must match the entry's own `day` exactly (daily entries are not
/// widened to every day). The query is a case-insensitive substring of the
/// subject or the location; a blank query matches everything.
pub fn filter<'a>(
    statuses: &'a [EntryStatus],
    day: Option<Weekday>,
    query: Option<&str>,
) -> Vec<&'a EntryStatus> {
    let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
    statuses
        .iter()
        .filter(|s| day.map_or(true, |d| s.entry.day == d))
        .filter(|s| needle.is_empty() || matches_text(&s.entry, &needle))
        .collect()
}

fn matches_text(entry: &Entry, needle: &str) -> bool {
    entry.subject.to_lowercase().contains(needle)
        || entry
            .location
            .as_deref()
            .is_some_and(|location| location.to_lowercase().contains(needle))
}

/// Per-weekday load, Monday first. Daily entries count towards every day.
pub fn weekly_breakdown(statuses: &[EntryStatus]) -> Vec<DayLoad> {
    let mut day = Weekday::Mon;
    let mut loads = Vec::with_capacity(7);
    for _ in 0..7 {
        let on_day = statuses.iter().filter(|s| scheduled_on(&s.entry, day));
        let (total, completed) =
            on_day.fold((0, 0), |(t, c), s| (t + 1, c + usize::from(s.done)));
        loads.push(DayLoad { day, total, completed });
        day = day.succ();
    }
    loads
}

/// Countdown text to the entry's start time today, at minute resolution.
pub fn time_until(entry: &Entry, now: NaiveDateTime) -> String {
    let diff = i64::from(minute_of_day_time(entry.start_time)) - i64::from(minute_of_day(now));
    if diff > 60 {
        format!("In {}h {}m", diff / 60, diff % 60)
    } else if diff > 0 {
        format!("In {diff} minutes")
    } else {
        "Happening now".to_string()
    }
}

fn minute_of_day(now: NaiveDateTime) -> u32 {
    minute_of_day_time(now.time())
}

fn minute_of_day_time<T: Timelike>(t: T) -> u32 {
    t.hour() * 60 + t.minute()
}
