//! Wire/storage encodings for entry fields.
//!
//! - times are `"HH:MM"` (24h); a trailing `:SS` is truncated on read
//! - weekdays are full English names, parsed case-insensitively
//! - recurrence is `{ "type": ... }`, also accepted as a JSON-encoded string

use chrono::{NaiveTime, Timelike, Weekday};
use serde::Deserialize;

use super::Recurrence;
use crate::error::ValidationError;

/// Parse `"HH:MM"` or `"HH:MM:SS"`; seconds are dropped.
pub fn parse_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    let invalid = || ValidationError::InvalidTime(raw.to_string());
    let mut parts = raw.trim().split(':');
    let hour: u32 = parts
        .next()
        .and_then(|h| h.parse().ok())
        .ok_or_else(invalid)?;
    let minute: u32 = parts
        .next()
        .and_then(|m| m.parse().ok())
        .ok_or_else(invalid)?;
    // Seconds may be present; they must still be numeric.
    if let Some(sec) = parts.next() {
        let sec = sec.split('.').next().unwrap_or_default();
        sec.parse::<u32>().map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

pub fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parse a weekday from its full or three-letter English name.
pub fn parse_weekday(raw: &str) -> Result<Weekday, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "sunday" | "sun" => Ok(Weekday::Sun),
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        _ => Err(ValidationError::InvalidWeekday(raw.to_string())),
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Resolve a stored recurrence tag, logging and falling back to
/// [`Recurrence::None`] when the tag is unknown.
pub fn recurrence_or_none(tag: &str) -> Recurrence {
    match Recurrence::from_tag(tag) {
        Ok(recurrence) => recurrence,
        Err(err) => {
            tracing::warn!(tag = %err.tag, "malformed recurrence tag, treating entry as one-time");
            Recurrence::None
        }
    }
}

#[derive(Deserialize)]
struct TaggedRecurrence {
    #[serde(rename = "type")]
    kind: String,
}

/// Every shape a stored recurrence has been seen in.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawRecurrence {
    Tagged {
        #[serde(rename = "type")]
        kind: String,
    },
    /// A JSON document encoded as a string, or a bare tag.
    Encoded(String),
    Missing(()),
}

impl From<RawRecurrence> for Recurrence {
    fn from(raw: RawRecurrence) -> Self {
        match raw {
            RawRecurrence::Tagged { kind } => recurrence_or_none(&kind),
            RawRecurrence::Encoded(text) => match serde_json::from_str::<TaggedRecurrence>(&text) {
                Ok(tagged) => recurrence_or_none(&tagged.kind),
                Err(_) => recurrence_or_none(&text),
            },
            RawRecurrence::Missing(()) => Recurrence::None,
        }
    }
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::format_time(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_weekday(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod weekday_name_opt {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        day: &Option<Weekday>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match day {
            Some(d) => serializer.serialize_some(super::weekday_name(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Weekday>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_weekday(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
