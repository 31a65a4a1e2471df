//! Entries: one-shot tasks and recurring habits.

use crate::state::SyncState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a habit recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
}

/// The schedule shape of an entry.
///
/// An entry is exactly one of a one-shot task or a recurring habit; the
/// shape never changes for a given identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// A one-shot task with an optional due date.
    Task {
        /// When the task is due, if scheduled.
        due_at: Option<DateTime<Utc>>,
    },
    /// A recurring habit.
    Habit {
        /// How often the habit recurs.
        recurrence: Recurrence,
        /// The first day the habit applies.
        starts_on: NaiveDate,
    },
}

impl Schedule {
    /// Returns true for the task shape.
    pub fn is_task(&self) -> bool {
        matches!(self, Schedule::Task { .. })
    }

    /// Returns true for the habit shape.
    pub fn is_habit(&self) -> bool {
        matches!(self, Schedule::Habit { .. })
    }
}

/// A logical tracker record: a task or a habit.
///
/// Identifiers are client-generated, stable, and never reused. The sync
/// engine mutates only `sync_state` (state transitions) or replaces the
/// whole record (conflict resolution); field edits come from the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable client-generated identifier.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether the entry as a whole is completed (tasks only; habit
    /// occurrences are tracked through `DoneEntry`).
    pub completed: bool,
    /// Task or habit schedule.
    pub schedule: Schedule,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last local modification instant; `None` until first edited.
    pub updated_at: Option<DateTime<Utc>>,
    /// Synchronization state.
    pub sync_state: SyncState,
}

impl Entry {
    /// Creates a new one-shot task with a generated identifier.
    pub fn task(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            schedule: Schedule::Task { due_at: None },
            created_at: Utc::now(),
            updated_at: None,
            sync_state: SyncState::Pending,
        }
    }

    /// Creates a new recurring habit with a generated identifier.
    pub fn habit(title: impl Into<String>, recurrence: Recurrence, starts_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            schedule: Schedule::Habit {
                recurrence,
                starts_on,
            },
            created_at: Utc::now(),
            updated_at: None,
            sync_state: SyncState::Pending,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date (task shape only; a no-op for habits).
    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        if let Schedule::Task { due_at: slot } = &mut self.schedule {
            *slot = Some(due_at);
        }
        self
    }

    /// Records a local modification at `now` and marks the entry pending.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
        self.sync_state = SyncState::Pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_has_task_shape() {
        let entry = Entry::task("water the plants");
        assert!(entry.schedule.is_task());
        assert!(!entry.schedule.is_habit());
        assert_eq!(entry.sync_state, SyncState::Pending);
        assert!(entry.updated_at.is_none());
    }

    #[test]
    fn habit_has_habit_shape() {
        let starts = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entry = Entry::habit("morning run", Recurrence::Daily, starts);
        assert!(entry.schedule.is_habit());
        match entry.schedule {
            Schedule::Habit {
                recurrence,
                starts_on,
            } => {
                assert_eq!(recurrence, Recurrence::Daily);
                assert_eq!(starts_on, starts);
            }
            Schedule::Task { .. } => panic!("expected habit shape"),
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Entry::task("a");
        let b = Entry::task("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn touch_bumps_updated_at_and_marks_pending() {
        let mut entry = Entry::task("write report");
        entry.sync_state = SyncState::Synced;

        let now = Utc::now();
        entry.touch(now);

        assert_eq!(entry.updated_at, Some(now));
        assert_eq!(entry.sync_state, SyncState::Pending);
    }

    #[test]
    fn serialized_schedule_keeps_its_shape() {
        let starts = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let habit = Entry::habit("read", Recurrence::Monthly, starts);

        let json = serde_json::to_value(&habit).unwrap();
        // The one-of-{Task, Habit} invariant must survive serialization:
        // the schedule is tagged, not flattened into ambiguous fields.
        assert!(json["schedule"]["Habit"].is_object());
        assert!(json["schedule"].get("Task").is_none());

        let back: Entry = serde_json::from_value(json).unwrap();
        assert!(back.schedule.is_habit());
    }

    #[test]
    fn with_due_at_ignores_habits() {
        let starts = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let entry = Entry::habit("stretch", Recurrence::Weekly, starts).with_due_at(Utc::now());
        assert!(entry.schedule.is_habit());
    }
}
