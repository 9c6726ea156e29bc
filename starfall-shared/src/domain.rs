//! Row shapes for the `users` and `task_lists` tables.
//!
//! Each table comes in three variants: the full row, the insert payload
//! (server-generated fields optional) and the update payload (everything
//! optional). Insert and update payloads reject unknown fields.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Loosely typed JSON value, as stored in `task_lists.tasks`.
pub type Json = serde_json::Value;

/// Current UTC time at the precision the database keeps.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("stars has {stars} entries but tasks has {tasks}")]
    StarsLengthMismatch { tasks: usize, stars: usize },
    #[error("task {index} is invalid: {reason}")]
    InvalidTask { index: usize, reason: &'static str },
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("star index {index} out of range for {len} tasks")]
    StarIndexOutOfRange { index: usize, len: usize },
}

// Users

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. `id` comes from the auth provider and is always required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NewUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("id", &self.id)
    }

    pub fn into_row(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.created_at.is_none() && self.updated_at.is_none()
    }

    pub fn apply(self, row: &mut User) {
        if let Some(id) = self.id {
            row.id = id;
        }
        if let Some(created_at) = self.created_at {
            row.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            row.updated_at = updated_at;
        }
    }
}

// Task lists

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub template_id: String,
    pub child_name: String,
    pub tasks: Vec<Json>,
    pub notes: Option<String>,
    pub stars: Vec<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One task paired with its star.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub index: usize,
    pub title: String,
    pub done: bool,
}

impl TaskList {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_contents(
            &self.template_id,
            &self.child_name,
            &self.tasks,
            &self.stars,
        )
    }

    /// Typed view over the `tasks`/`stars` pair.
    pub fn items(&self) -> Result<Vec<TaskItem>, ValidationError> {
        check_stars_len(&self.tasks, &self.stars)?;
        self.tasks
            .iter()
            .zip(&self.stars)
            .enumerate()
            .map(|(index, (task, &done))| {
                let title = task_title(task)
                    .map_err(|reason| ValidationError::InvalidTask { index, reason })?;
                Ok(TaskItem {
                    index,
                    title: title.to_string(),
                    done,
                })
            })
            .collect()
    }

    pub fn stars_earned(&self) -> usize {
        self.stars.iter().filter(|s| **s).count()
    }

    pub fn set_star(&mut self, index: usize, starred: bool) -> Result<(), ValidationError> {
        let len = self.stars.len();
        let slot = self
            .stars
            .get_mut(index)
            .ok_or(ValidationError::StarIndexOutOfRange { index, len })?;
        *slot = starred;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTaskList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub template_id: String,
    pub child_name: String,
    pub tasks: Vec<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub stars: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NewTaskList {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(id) = &self.id {
            non_empty("id", id)?;
        }
        non_empty("user_id", &self.user_id)?;
        check_contents(
            &self.template_id,
            &self.child_name,
            &self.tasks,
            &self.stars,
        )
    }

    /// Fills server-generated fields. `new_id` is only called when no id was supplied.
    pub fn into_row(self, now: DateTime<Utc>, new_id: impl FnOnce() -> String) -> TaskList {
        TaskList {
            id: self.id.unwrap_or_else(new_id),
            user_id: self.user_id,
            week_start: self.week_start,
            template_id: trimmed(self.template_id),
            child_name: trimmed(self.child_name),
            tasks: self.tasks,
            notes: self.notes,
            stars: self.stars,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Json>>,
    /// `None` leaves the note alone, `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskListPatch {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.user_id.is_none()
            && self.week_start.is_none()
            && self.template_id.is_none()
            && self.child_name.is_none()
            && self.tasks.is_none()
            && self.notes.is_none()
            && self.stars.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
    }

    pub fn apply(self, row: &mut TaskList) {
        if let Some(v) = self.id {
            row.id = v;
        }
        if let Some(v) = self.user_id {
            row.user_id = v;
        }
        if let Some(v) = self.week_start {
            row.week_start = v;
        }
        if let Some(v) = self.template_id {
            row.template_id = trimmed(v);
        }
        if let Some(v) = self.child_name {
            row.child_name = trimmed(v);
        }
        if let Some(v) = self.tasks {
            row.tasks = v;
        }
        if let Some(v) = self.notes {
            row.notes = v;
        }
        if let Some(v) = self.stars {
            row.stars = v;
        }
        if let Some(v) = self.created_at {
            row.created_at = v;
        }
        if let Some(v) = self.updated_at {
            row.updated_at = v;
        }
    }
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Names take part in the per-week uniqueness key, so padding is dropped.
fn trimmed(value: String) -> String {
    let t = value.trim();
    if t.len() == value.len() {
        value
    } else {
        t.to_string()
    }
}

fn check_stars_len(tasks: &[Json], stars: &[bool]) -> Result<(), ValidationError> {
    if tasks.len() != stars.len() {
        return Err(ValidationError::StarsLengthMismatch {
            tasks: tasks.len(),
            stars: stars.len(),
        });
    }
    Ok(())
}

fn check_contents(
    template_id: &str,
    child_name: &str,
    tasks: &[Json],
    stars: &[bool],
) -> Result<(), ValidationError> {
    non_empty("template_id", template_id)?;
    non_empty("child_name", child_name)?;
    check_stars_len(tasks, stars)?;
    for (index, task) in tasks.iter().enumerate() {
        task_title(task).map_err(|reason| ValidationError::InvalidTask { index, reason })?;
    }
    Ok(())
}

/// A task is either a bare title string or an object carrying a `title`.
fn task_title(task: &Json) -> Result<&str, &'static str> {
    let title = match task {
        Json::String(s) => s.as_str(),
        Json::Object(map) => match map.get("title") {
            Some(Json::String(s)) => s.as_str(),
            Some(_) => return Err("title must be a string"),
            None => return Err("object task needs a title"),
        },
        _ => return Err("expected a title string or an object with a title"),
    };
    if title.trim().is_empty() {
        return Err("title must not be empty");
    }
    Ok(title)
}
