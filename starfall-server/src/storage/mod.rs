pub mod models;
pub mod schema;

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{
    EncodedLists, NewTaskListRow, NewUserRow, TaskListChanges, TaskListRow, UserChanges, UserRow,
};
use starfall_shared::domain::{
    NewTaskList, NewUser, TaskList, TaskListPatch, User, UserPatch, ValidationError, now_utc,
};
use tracing::{debug, trace};

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error not covered by a more specific variant.
    #[error("database error: {0}")]
    Database(diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// The caller supplied invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A JSON column could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<diesel::result::Error> for StorageError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match e {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StorageError::Conflict(info.message().to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StorageError::InvalidInput(info.message().to_string())
            }
            other => StorageError::Database(other),
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(e: ValidationError) -> Self {
        StorageError::InvalidInput(e.to_string())
    }
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder().max_size(8).build(manager)?;

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                let applied = conn
                    .run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                debug!(count = applied.len(), "migrations applied");
                Ok(())
            })
            .await??;
        }

        Ok(Store { pool })
    }

    // Users

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        use schema::users;
        new_user.validate()?;
        let row = new_user.into_row(now_utc());
        let pool = self.pool.clone();
        trace!(user_id = %row.id, "create_user starting");
        tokio::task::spawn_blocking(move || -> Result<User, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let existing: i64 = users::table
                .find(&row.id)
                .count()
                .get_result(&mut conn)?;
            if existing > 0 {
                return Err(StorageError::Conflict(format!(
                    "user already exists: {}",
                    row.id
                )));
            }
            diesel::insert_into(users::table)
                .values(NewUserRow::from(&row))
                .execute(&mut conn)?;
            Ok(users::table
                .find(&row.id)
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)?
                .into())
        })
        .await?
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        use schema::users::dsl::*;
        let pool = self.pool.clone();
        let uid = user_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<User>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            Ok(users
                .filter(id.eq(&uid))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .optional()?
                .map(User::from))
        })
        .await?
    }

    /// Applies a patch to a user. Ids are owned by the auth provider and cannot change.
    /// An empty patch is a plain read and leaves `updated_at` alone.
    pub async fn update_user(
        &self,
        user_id: &str,
        patch: UserPatch,
    ) -> Result<Option<User>, StorageError> {
        use schema::users;
        reject_id_change(user_id, patch.id.as_deref())?;
        if patch.is_empty() {
            return self.get_user(user_id).await;
        }
        let pool = self.pool.clone();
        let uid = user_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<User>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            conn.immediate_transaction(|conn| -> Result<Option<User>, StorageError> {
                let Some(row) = users::table
                    .find(&uid)
                    .select(UserRow::as_select())
                    .first::<UserRow>(conn)
                    .optional()?
                else {
                    return Ok(None);
                };
                let mut user = User::from(row);
                let touch = patch.updated_at.is_none();
                patch.apply(&mut user);
                if touch {
                    user.updated_at = now_utc();
                }
                diesel::update(users::table.find(&uid))
                    .set(UserChanges {
                        created_at: user.created_at.naive_utc(),
                        updated_at: user.updated_at.naive_utc(),
                    })
                    .execute(conn)?;
                Ok(Some(user))
            })
        })
        .await?
    }

    /// Deletes a user together with all of their task lists.
    pub async fn delete_user(&self, user_id: &str) -> Result<bool, StorageError> {
        use schema::users::dsl::*;
        let pool = self.pool.clone();
        let uid = user_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<bool, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let deleted = diesel::delete(users.filter(id.eq(&uid))).execute(&mut conn)?;
            Ok(deleted > 0)
        })
        .await?
    }

    // Task lists

    pub async fn create_task_list(&self, new_list: NewTaskList) -> Result<TaskList, StorageError> {
        use schema::task_lists;
        new_list.validate()?;
        let list = new_list.into_row(now_utc(), || uuid::Uuid::new_v4().to_string());
        let encoded = EncodedLists::encode(&list)?;
        let pool = self.pool.clone();
        trace!(
            list_id = %list.id,
            user_id = %list.user_id,
            week_start = %list.week_start,
            "create_task_list starting"
        );
        tokio::task::spawn_blocking(move || -> Result<TaskList, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            conn.immediate_transaction(|conn| -> Result<TaskList, StorageError> {
                ensure_user_exists(conn, &list.user_id)?;
                diesel::insert_into(task_lists::table)
                    .values(NewTaskListRow::new(&list, &encoded))
                    .execute(conn)?;
                load_task_list(conn, &list.id)?.ok_or_else(|| {
                    StorageError::Database(diesel::result::Error::NotFound)
                })
            })
        })
        .await?
    }

    pub async fn get_task_list(&self, list_id: &str) -> Result<Option<TaskList>, StorageError> {
        let pool = self.pool.clone();
        let lid = list_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<TaskList>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            load_task_list(&mut conn, &lid)
        })
        .await?
    }

    /// Lists a user's task lists, newest week first, optionally for a single week.
    pub async fn list_task_lists(
        &self,
        owner: &str,
        week: Option<NaiveDate>,
    ) -> Result<Vec<TaskList>, StorageError> {
        use schema::task_lists::dsl::*;
        let pool = self.pool.clone();
        let owner = owner.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<TaskList>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let mut query = task_lists
                .filter(user_id.eq(&owner))
                .select(TaskListRow::as_select())
                .into_boxed();
            if let Some(week) = week {
                query = query.filter(week_start.eq(week));
            }
            let rows = query
                .order((week_start.desc(), child_name.asc()))
                .load::<TaskListRow>(&mut conn)?;
            Ok(rows
                .into_iter()
                .map(TaskList::try_from)
                .collect::<Result<Vec<_>, _>>()?)
        })
        .await?
    }

    /// Loads, patches, re-validates and writes back a task list in one transaction.
    pub async fn update_task_list(
        &self,
        list_id: &str,
        patch: TaskListPatch,
    ) -> Result<Option<TaskList>, StorageError> {
        use schema::task_lists;
        reject_id_change(list_id, patch.id.as_deref())?;
        if patch.is_empty() {
            return self.get_task_list(list_id).await;
        }
        let pool = self.pool.clone();
        let lid = list_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<TaskList>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            conn.immediate_transaction(|conn| -> Result<Option<TaskList>, StorageError> {
                let Some(mut list) = load_task_list(conn, &lid)? else {
                    return Ok(None);
                };
                let previous_owner = list.user_id.clone();
                let touch = patch.updated_at.is_none();
                patch.apply(&mut list);
                if touch {
                    list.updated_at = now_utc();
                }
                list.validate()?;
                if list.user_id != previous_owner {
                    ensure_user_exists(conn, &list.user_id)?;
                }
                let encoded = EncodedLists::encode(&list)?;
                diesel::update(task_lists::table.find(&lid))
                    .set(TaskListChanges::new(&list, &encoded))
                    .execute(conn)?;
                Ok(Some(list))
            })
        })
        .await?
    }

    /// Sets the star at `index`, leaving the task entries untouched.
    pub async fn set_star(
        &self,
        list_id: &str,
        index: usize,
        starred: bool,
    ) -> Result<Option<TaskList>, StorageError> {
        use schema::task_lists;
        let pool = self.pool.clone();
        let lid = list_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<TaskList>, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            conn.immediate_transaction(|conn| -> Result<Option<TaskList>, StorageError> {
                let Some(mut list) = load_task_list(conn, &lid)? else {
                    return Ok(None);
                };
                list.set_star(index, starred)?;
                list.updated_at = now_utc();
                diesel::update(task_lists::table.find(&lid))
                    .set((
                        task_lists::stars.eq(serde_json::to_string(&list.stars)?),
                        task_lists::updated_at.eq(list.updated_at.naive_utc()),
                    ))
                    .execute(conn)?;
                Ok(Some(list))
            })
        })
        .await?
    }

    pub async fn delete_task_list(&self, list_id: &str) -> Result<bool, StorageError> {
        use schema::task_lists::dsl::*;
        let pool = self.pool.clone();
        let lid = list_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<bool, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            let deleted = diesel::delete(task_lists.filter(id.eq(&lid))).execute(&mut conn)?;
            Ok(deleted > 0)
        })
        .await?
    }
}

fn reject_id_change(current: &str, requested: Option<&str>) -> Result<(), StorageError> {
    match requested {
        Some(requested) if requested != current => Err(StorageError::InvalidInput(format!(
            "id cannot be changed (from {} to {})",
            current, requested
        ))),
        _ => Ok(()),
    }
}

fn ensure_user_exists(conn: &mut SqliteConnection, owner: &str) -> Result<(), StorageError> {
    use schema::users::dsl::*;
    let count: i64 = users.filter(id.eq(owner)).count().get_result(conn)?;
    if count == 0 {
        return Err(StorageError::InvalidInput(format!(
            "unknown user_id: {}",
            owner
        )));
    }
    Ok(())
}

fn load_task_list(
    conn: &mut SqliteConnection,
    list_id: &str,
) -> Result<Option<TaskList>, StorageError> {
    use schema::task_lists::dsl::*;
    let row = task_lists
        .filter(id.eq(list_id))
        .select(TaskListRow::as_select())
        .first::<TaskListRow>(conn)
        .optional()?;
    Ok(row.map(TaskList::try_from).transpose()?)
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    // Enable WAL for better read/write concurrency and set a busy timeout
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    // Needed for ON DELETE CASCADE from users to task_lists
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    Ok(())
}
