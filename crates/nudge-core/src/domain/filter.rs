//! Typed task filter.
//!
//! A small expression tree handed to `TaskStore::query_tasks`. Stores either
//! evaluate it in memory (`matches`) or translate it into their own query
//! language; nobody builds query strings by hand.

use chrono::NaiveDate;

use super::{OwnerId, Task};

/// Filterable task columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OwnerId,
    DueDate,
    PlannedDate,
    IsCompleted,
    IsDeleted,
}

impl Field {
    /// Column name in the `todos` table.
    pub fn column(&self) -> &'static str {
        match self {
            Field::OwnerId => "user_id",
            Field::DueDate => "due_date",
            Field::PlannedDate => "planned_date",
            Field::IsCompleted => "is_completed",
            Field::IsDeleted => "is_deleted",
        }
    }

    fn value_of(&self, task: &Task) -> Option<Value> {
        match self {
            Field::OwnerId => Some(Value::Text(task.owner_id.as_str().to_string())),
            Field::DueDate => task.due_date.map(Value::Date),
            Field::PlannedDate => task.planned_date.map(Value::Date),
            Field::IsCompleted => Some(Value::Bool(task.is_completed)),
            Field::IsDeleted => Some(Value::Bool(task.is_deleted)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Date(NaiveDate),
    Bool(bool),
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&OwnerId> for Value {
    fn from(owner: &OwnerId) -> Self {
        Value::Text(owner.as_str().to_string())
    }
}

/// Predicate over tasks.
///
/// - `And([])` matches everything.
/// - `Or([])` matches nothing.
/// - `Eq` on a null column never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    Eq(Field, Value),
    And(Vec<TaskFilter>),
    Or(Vec<TaskFilter>),
}

impl TaskFilter {
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        TaskFilter::Eq(field, value.into())
    }

    pub fn and(filters: impl IntoIterator<Item = TaskFilter>) -> Self {
        TaskFilter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = TaskFilter>) -> Self {
        TaskFilter::Or(filters.into_iter().collect())
    }

    /// Open tasks due on `date` (reminder job).
    pub fn due_on(date: NaiveDate) -> Self {
        Self::and([
            Self::eq(Field::DueDate, date),
            Self::eq(Field::IsCompleted, false),
        ])
    }

    /// Pending tasks of `owner` that are due or planned on `date` (digest job).
    pub fn digest_for(owner: &OwnerId, date: NaiveDate) -> Self {
        Self::and([
            Self::eq(Field::OwnerId, owner),
            Self::eq(Field::IsCompleted, false),
            Self::eq(Field::IsDeleted, false),
            Self::or([
                Self::eq(Field::PlannedDate, date),
                Self::eq(Field::DueDate, date),
            ]),
        ])
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::Eq(field, value) => field.value_of(task).as_ref() == Some(value),
            TaskFilter::And(filters) => filters.iter().all(|f| f.matches(task)),
            TaskFilter::Or(filters) => filters.iter().any(|f| f.matches(task)),
        }
    }
}
