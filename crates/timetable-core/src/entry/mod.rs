//! Entry types: scheduled, optionally recurring timetable items.
//!
//! An [`Entry`] is what the task store persists. Recurrence is a closed
//! variant validated once at the read boundary (see [`wire`]) so no other
//! module has to re-parse it.

pub mod wire;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MalformedRecurrenceError, ValidationError};

/// Opaque entry identifier assigned by the task store.
pub type EntryId = String;

/// How often an entry repeats.
///
/// Serialized as `{ "type": "None" | "Daily" | "Weekly" }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(tag = "type", from = "wire::RawRecurrence")]
pub enum Recurrence {
    /// One-time entry; completion is the entry's own permanent flag.
    #[default]
    None,
    /// Happens every day; completion resets at local midnight.
    Daily,
    /// Happens once a week on the entry's weekday.
    Weekly,
}

impl Recurrence {
    /// Resolve a stored tag. Case-insensitive.
    pub fn from_tag(tag: &str) -> Result<Self, MalformedRecurrenceError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            _ => Err(MalformedRecurrenceError {
                tag: tag.to_string(),
            }),
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Recurrence::None => "None",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Recurrence {
    type Err = MalformedRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::from_tag(s)
    }
}

/// Display priority. The core never branches on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("'{s}' is not one of Low, Medium, High"),
            }),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// A scheduled timetable entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier, immutable after creation
    pub id: EntryId,
    /// What the entry is about (shown in reminders)
    pub subject: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Weekday of the occurrence; ignored for daily entries
    #[serde(with = "wire::weekday_name")]
    pub day: Weekday,
    #[serde(with = "wire::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "wire::hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, alias = "repeat_config")]
    pub recurrence: Recurrence,
    /// Minutes before the start that a reminder fires; 0 disables it
    #[serde(default, rename = "alert_offset", alias = "alert_offset_minutes")]
    pub alert_offset_minutes: u32,
    /// Permanent completion flag. Only authoritative for one-time entries.
    #[serde(default, alias = "is_completed")]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }
}

/// Fields supplied when creating an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryDraft {
    pub subject: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "wire::weekday_name")]
    pub day: Weekday,
    #[serde(with = "wire::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "wire::hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, alias = "repeat_config")]
    pub recurrence: Recurrence,
    #[serde(default, rename = "alert_offset", alias = "alert_offset_minutes")]
    pub alert_offset_minutes: u32,
}

impl EntryDraft {
    /// Minimal draft; the remaining fields take their defaults.
    pub fn new(
        subject: impl Into<String>,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            subject: subject.into(),
            location: None,
            notes: None,
            day,
            start_time,
            end_time,
            priority: Priority::default(),
            recurrence: Recurrence::default(),
            alert_offset_minutes: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "subject".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Turn the draft into a stored entry. Validation is the caller's job.
    pub fn into_entry(self, id: EntryId, created_at: DateTime<Utc>) -> Entry {
        Entry {
            id,
            subject: self.subject.trim().to_string(),
            location: non_blank(self.location),
            notes: non_blank(self.notes),
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            priority: self.priority,
            recurrence: self.recurrence,
            alert_offset_minutes: self.alert_offset_minutes,
            completed: false,
            created_at,
        }
    }
}

/// Partial update. Absent fields are left untouched; a blank
/// `location`/`notes` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire::weekday_name_opt")]
    pub day: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire::hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire::hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "alert_offset")]
    pub alert_offset_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl EntryPatch {
    /// Patch carrying only a one-time completion flag.
    pub fn completed(done: bool) -> Self {
        Self {
            completed: Some(done),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(subject) = &self.subject {
            if subject.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "subject".into(),
                    message: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    pub fn apply(self, entry: &mut Entry) {
        if let Some(subject) = self.subject {
            entry.subject = subject.trim().to_string();
        }
        if let Some(location) = self.location {
            entry.location = non_blank(Some(location));
        }
        if let Some(notes) = self.notes {
            entry.notes = non_blank(Some(notes));
        }
        if let Some(day) = self.day {
            entry.day = day;
        }
        if let Some(start) = self.start_time {
            entry.start_time = start;
        }
        if let Some(end) = self.end_time {
            entry.end_time = end;
        }
        if let Some(priority) = self.priority {
            entry.priority = priority;
        }
        if let Some(recurrence) = self.recurrence {
            entry.recurrence = recurrence;
        }
        if let Some(offset) = self.alert_offset_minutes {
            entry.alert_offset_minutes = offset;
        }
        if let Some(done) = self.completed {
            entry.completed = done;
        }
    }
}

/// Weekday index with Sunday = 0 ... Saturday = 6.
pub fn weekday_index(day: Weekday) -> i64 {
    i64::from(day.num_days_from_sunday())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn draft_rejects_blank_subject() {
        let draft = EntryDraft::new("   ", Weekday::Mon, hm(9, 0), hm(10, 0));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn into_entry_trims_and_drops_blank_optionals() {
        let mut draft = EntryDraft::new(" DSA ", Weekday::Tue, hm(14, 0), hm(15, 0));
        draft.location = Some("  ".into());
        draft.notes = Some(" bring laptop ".into());
        let entry = draft.into_entry("e1".into(), Utc::now());
        assert_eq!(entry.subject, "DSA");
        assert_eq!(entry.location, None);
        assert_eq!(entry.notes.as_deref(), Some("bring laptop"));
        assert!(!entry.completed);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut entry = EntryDraft::new("Physics", Weekday::Wed, hm(9, 0), hm(10, 0))
            .into_entry("e1".into(), Utc::now());
        let patch = EntryPatch {
            recurrence: Some(Recurrence::Weekly),
            alert_offset_minutes: Some(15),
            ..EntryPatch::default()
        };
        patch.apply(&mut entry);
        assert_eq!(entry.subject, "Physics");
        assert_eq!(entry.recurrence, Recurrence::Weekly);
        assert_eq!(entry.alert_offset_minutes, 15);
        assert_eq!(entry.start_time, hm(9, 0));
    }

    #[test]
    fn recurrence_tags_are_case_insensitive() {
        assert_eq!(Recurrence::from_tag("daily"), Ok(Recurrence::Daily));
        assert_eq!(Recurrence::from_tag(" WEEKLY "), Ok(Recurrence::Weekly));
        assert!(Recurrence::from_tag("Monthly").is_err());
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(Weekday::Sun), 0);
        assert_eq!(weekday_index(Weekday::Wed), 3);
        assert_eq!(weekday_index(Weekday::Sat), 6);
    }

    #[test]
    fn priority_parses_any_case() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }
}
