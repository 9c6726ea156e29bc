use crate::storage::schema::{task_lists, users};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use starfall_shared::domain::{TaskList, User};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        }
    }
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        NewUserRow {
            id: &user.id,
            created_at: user.created_at.naive_utc(),
            updated_at: user.updated_at.naive_utc(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_lists)]
pub struct TaskListRow {
    pub id: String,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub template_id: String,
    pub child_name: String,
    pub tasks: String,
    pub notes: Option<String>,
    pub stars: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TaskListRow> for TaskList {
    type Error = serde_json::Error;

    fn try_from(row: TaskListRow) -> Result<Self, Self::Error> {
        Ok(TaskList {
            tasks: serde_json::from_str(&row.tasks)?,
            stars: serde_json::from_str(&row.stars)?,
            id: row.id,
            user_id: row.user_id,
            week_start: row.week_start,
            template_id: row.template_id,
            child_name: row.child_name,
            notes: row.notes,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }
}

/// JSON columns encoded ahead of insert/update.
pub struct EncodedLists {
    pub tasks: String,
    pub stars: String,
}

impl EncodedLists {
    pub fn encode(list: &TaskList) -> Result<Self, serde_json::Error> {
        Ok(EncodedLists {
            tasks: serde_json::to_string(&list.tasks)?,
            stars: serde_json::to_string(&list.stars)?,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = task_lists)]
pub struct NewTaskListRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub week_start: NaiveDate,
    pub template_id: &'a str,
    pub child_name: &'a str,
    pub tasks: &'a str,
    pub notes: Option<&'a str>,
    pub stars: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewTaskListRow<'a> {
    pub fn new(list: &'a TaskList, encoded: &'a EncodedLists) -> Self {
        NewTaskListRow {
            id: &list.id,
            user_id: &list.user_id,
            week_start: list.week_start,
            template_id: &list.template_id,
            child_name: &list.child_name,
            tasks: &encoded.tasks,
            notes: list.notes.as_deref(),
            stars: &encoded.stars,
            created_at: list.created_at.naive_utc(),
            updated_at: list.updated_at.naive_utc(),
        }
    }
}

/// Full replacement of every mutable column. `notes` is written even when `None`.
#[derive(AsChangeset)]
#[diesel(table_name = task_lists)]
#[diesel(treat_none_as_null = true)]
pub struct TaskListChanges<'a> {
    pub user_id: &'a str,
    pub week_start: NaiveDate,
    pub template_id: &'a str,
    pub child_name: &'a str,
    pub tasks: &'a str,
    pub notes: Option<&'a str>,
    pub stars: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> TaskListChanges<'a> {
    pub fn new(list: &'a TaskList, encoded: &'a EncodedLists) -> Self {
        TaskListChanges {
            user_id: &list.user_id,
            week_start: list.week_start,
            template_id: &list.template_id,
            child_name: &list.child_name,
            tasks: &encoded.tasks,
            notes: list.notes.as_deref(),
            stars: &encoded.stars,
            created_at: list.created_at.naive_utc(),
            updated_at: list.updated_at.naive_utc(),
        }
    }
}

fn utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
