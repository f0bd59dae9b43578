//! Task - one row of the `todos` table.
//!
//! Only the columns the notifier reads are modelled. Missing booleans
//! decode as `false`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::OwnerId;

/// A to-do item as read from the `todos` table.
///
/// Tasks are read-only snapshots for the duration of one run. Field names
/// follow the store columns, so `owner_id` maps to `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,

    pub content: String,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub planned_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_completed: bool,

    /// Absent on rows that predate soft deletion; treated as not deleted.
    #[serde(default)]
    pub is_deleted: bool,
}

impl Task {
    pub fn new(owner_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            content: content.into(),
            due_date: None,
            planned_date: None,
            is_completed: false,
            is_deleted: false,
        }
    }

    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_planned_date(mut self, date: NaiveDate) -> Self {
        self.planned_date = Some(date);
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }
}
