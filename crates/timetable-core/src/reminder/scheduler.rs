//! Full-replace reminder scheduler.
//!
//! Each pass cancels everything the sink holds and resubmits the complete
//! plan. Sink failures are logged and reported in the [`SchedulePass`];
//! they never propagate as errors because reminder delivery must not block
//! task data.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::sink::NotificationSink;
use super::{plan_with_limit, ReminderEvent, ReminderSettings};
use crate::entry::{Entry, EntryId};

/// How a scheduling pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    /// The sink accepted `count` reminders.
    Scheduled { count: usize },
    /// Reminders are switched off; previous ones were cancelled.
    Disabled,
    /// The sink rejected the pass. Task data is untouched.
    Failed { reason: String },
}

/// Report for one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulePass {
    /// Monotonic pass number; only the latest is authoritative.
    pub generation: u64,
    pub outcome: PassOutcome,
    pub events: Vec<ReminderEvent>,
    /// Entries cut by the batch cap.
    pub dropped: Vec<EntryId>,
}

impl SchedulePass {
    pub fn is_ok(&self) -> bool {
        !matches!(self.outcome, PassOutcome::Failed { .. })
    }
}

pub struct ReminderScheduler<N: NotificationSink> {
    sink: N,
    settings: ReminderSettings,
    generation: u64,
}

impl<N: NotificationSink> ReminderScheduler<N> {
    pub fn new(sink: N, settings: ReminderSettings) -> Self {
        Self {
            sink,
            settings,
            generation: 0,
        }
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ReminderSettings) {
        self.settings = settings;
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    pub fn into_sink(self) -> N {
        self.sink
    }

    /// Generation of the most recent pass (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a pass report is still the authoritative one.
    pub fn is_current(&self, pass: &SchedulePass) -> bool {
        pass.generation == self.generation
    }

    /// Replace the sink's reminders with a fresh plan for `entries`.
    pub fn rebuild(&mut self, entries: &[Entry], now: NaiveDateTime) -> SchedulePass {
        self.generation += 1;
        let generation = self.generation;

        if let Err(err) = self.sink.cancel_all() {
            tracing::warn!(generation, error = %err, "failed to cancel pending reminders");
            return SchedulePass {
                generation,
                outcome: PassOutcome::Failed {
                    reason: err.to_string(),
                },
                events: Vec::new(),
                dropped: Vec::new(),
            };
        }

        if !self.settings.enabled {
            tracing::info!(generation, "reminders disabled, pending reminders cleared");
            return SchedulePass {
                generation,
                outcome: PassOutcome::Disabled,
                events: Vec::new(),
                dropped: Vec::new(),
            };
        }

        let limit = self.settings.max_batch.min(self.sink.max_batch());
        let plan = plan_with_limit(entries, now, &self.settings, limit);
        if !plan.dropped.is_empty() {
            tracing::debug!(
                generation,
                limit,
                dropped = plan.dropped.len(),
                "reminder batch capped, furthest reminders dropped"
            );
        }

        if !plan.events.is_empty() {
            if let Err(err) = self.sink.schedule_batch(&plan.events) {
                tracing::warn!(
                    generation,
                    count = plan.events.len(),
                    error = %err,
                    "notification sink rejected reminder batch"
                );
                return SchedulePass {
                    generation,
                    outcome: PassOutcome::Failed {
                        reason: err.to_string(),
                    },
                    events: plan.events,
                    dropped: plan.dropped,
                };
            }
        }

        for event in &plan.events {
            tracing::debug!(
                generation,
                id = event.id,
                entry_id = %event.entry_id,
                fire_at = %event.fire_at,
                "reminder scheduled"
            );
        }
        tracing::info!(generation, count = plan.events.len(), "reminder pass complete");

        SchedulePass {
            generation,
            outcome: PassOutcome::Scheduled {
                count: plan.events.len(),
            },
            events: plan.events,
            dropped: plan.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryDraft, Recurrence};
    use crate::error::SinkError;
    use crate::reminder::MemorySink;
    use chrono::{NaiveDate, NaiveTime, Utc, Weekday};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(8, 50, 0)
            .unwrap()
    }

    fn entries(n: usize) -> Vec<Entry> {
        (0..n)
            .map(|i| {
                let mut draft = EntryDraft::new(
                    format!("Class {i}"),
                    Weekday::Mon,
                    NaiveTime::from_hms_opt(10 + i as u32, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(10 + i as u32, 45, 0).unwrap(),
                );
                draft.recurrence = Recurrence::Weekly;
                draft.alert_offset_minutes = 10;
                draft.into_entry(format!("e{i}"), Utc::now())
            })
            .collect()
    }

    #[test]
    fn rebuild_replaces_previous_batch() {
        let mut scheduler = ReminderScheduler::new(MemorySink::new(), ReminderSettings::default());
        scheduler.rebuild(&entries(3), now());
        let pass = scheduler.rebuild(&entries(1), now());
        assert_eq!(pass.outcome, PassOutcome::Scheduled { count: 1 });
        assert_eq!(scheduler.sink().pending().len(), 1);
        assert_eq!(pass.generation, 2);
    }

    #[test]
    fn sink_failure_is_reported_not_raised() {
        let mut scheduler = ReminderScheduler::new(MemorySink::new(), ReminderSettings::default());
        scheduler.sink_mut().fail_next(SinkError::PermissionDenied);
        let pass = scheduler.rebuild(&entries(2), now());
        assert!(!pass.is_ok());
        assert!(scheduler.sink().pending().is_empty());

        let retry = scheduler.rebuild(&entries(2), now());
        assert_eq!(retry.outcome, PassOutcome::Scheduled { count: 2 });
    }

    #[test]
    fn sink_limit_caps_batch() {
        let mut scheduler =
            ReminderScheduler::new(MemorySink::with_limit(2), ReminderSettings::default());
        let pass = scheduler.rebuild(&entries(4), now());
        assert_eq!(pass.outcome, PassOutcome::Scheduled { count: 2 });
        assert_eq!(pass.dropped, vec!["e2".to_string(), "e3".to_string()]);
    }

    #[test]
    fn disabled_reminders_still_clear_sink() {
        let mut scheduler = ReminderScheduler::new(MemorySink::new(), ReminderSettings::default());
        scheduler.rebuild(&entries(2), now());
        scheduler.set_settings(ReminderSettings {
            enabled: false,
            ..ReminderSettings::default()
        });
        let pass = scheduler.rebuild(&entries(2), now());
        assert_eq!(pass.outcome, PassOutcome::Disabled);
        assert!(scheduler.sink().pending().is_empty());
    }

    #[test]
    fn only_latest_pass_is_current() {
        let mut scheduler = ReminderScheduler::new(MemorySink::new(), ReminderSettings::default());
        let first = scheduler.rebuild(&entries(1), now());
        let second = scheduler.rebuild(&entries(1), now());
        assert!(!scheduler.is_current(&first));
        assert!(scheduler.is_current(&second));
    }
}
