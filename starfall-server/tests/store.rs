use chrono::NaiveDate;
use serde_json::json;
use starfall_server::storage::{StorageError, Store};
use starfall_shared::domain::{NewTaskList, NewUser, TaskListPatch, UserPatch};

async fn open_store(dir: &tempfile::TempDir) -> Store {
    let path = dir.path().join("store.db");
    Store::connect_sqlite(path.to_str().unwrap()).await.unwrap()
}

fn week(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

fn new_list(user_id: &str, child: &str, week_start: NaiveDate) -> NewTaskList {
    NewTaskList {
        id: None,
        user_id: user_id.into(),
        week_start,
        template_id: "garden".into(),
        child_name: child.into(),
        tasks: vec![json!("Set the table"), json!({"title": "Walk the dog"})],
        notes: None,
        stars: vec![false, false],
        created_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn task_list_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    store.create_user(NewUser::new("u1")).await.unwrap();

    let list = store
        .create_task_list(new_list("u1", "Noa", week(6)))
        .await
        .unwrap();
    assert_eq!(list.id.len(), 36, "uuid expected, got {}", list.id);
    assert_eq!(list.created_at, list.updated_at);

    let fetched = store.get_task_list(&list.id).await.unwrap().unwrap();
    assert_eq!(fetched, list);

    let starred = store.set_star(&list.id, 1, true).await.unwrap().unwrap();
    assert_eq!(starred.stars, vec![false, true]);
    assert_eq!(starred.stars_earned(), 1);
    assert!(starred.updated_at >= list.updated_at);

    let patched = store
        .update_task_list(
            &list.id,
            TaskListPatch {
                notes: Some(Some("half term".into())),
                week_start: Some(week(13)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.notes.as_deref(), Some("half term"));
    assert_eq!(patched.week_start, week(13));
    assert_eq!(patched.stars, vec![false, true]);
    assert_eq!(
        store.get_task_list(&list.id).await.unwrap().unwrap(),
        patched
    );

    assert!(store.delete_task_list(&list.id).await.unwrap());
    assert!(!store.delete_task_list(&list.id).await.unwrap());
    assert!(store.get_task_list(&list.id).await.unwrap().is_none());
}

#[tokio::test]
async fn invariants_are_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    store.create_user(NewUser::new("u1")).await.unwrap();

    let mut drifted = new_list("u1", "Noa", week(6));
    drifted.stars.pop();
    assert!(matches!(
        store.create_task_list(drifted).await,
        Err(StorageError::InvalidInput(_))
    ));

    assert!(matches!(
        store.create_task_list(new_list("ghost", "Noa", week(6))).await,
        Err(StorageError::InvalidInput(_))
    ));

    let list = store
        .create_task_list(new_list("u1", "Noa", week(6)))
        .await
        .unwrap();
    assert!(matches!(
        store.create_task_list(new_list("u1", "Noa", week(6))).await,
        Err(StorageError::Conflict(_))
    ));

    // Padding does not make a second slot for the same child
    assert!(matches!(
        store.create_task_list(new_list("u1", "Noa ", week(6))).await,
        Err(StorageError::Conflict(_))
    ));

    let untouched = store
        .update_task_list(&list.id, TaskListPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched, list);

    // Same child on another week, or another child on the same week, is fine
    store
        .create_task_list(new_list("u1", "Noa", week(13)))
        .await
        .unwrap();
    let other = store
        .create_task_list(new_list("u1", "Eli", week(6)))
        .await
        .unwrap();

    // Renaming into an occupied slot conflicts
    let rename = TaskListPatch {
        child_name: Some("Noa".into()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_task_list(&other.id, rename).await,
        Err(StorageError::Conflict(_))
    ));

    assert!(matches!(
        store.set_star(&list.id, 2, true).await,
        Err(StorageError::InvalidInput(_))
    ));
    assert!(store.set_star("missing", 0, true).await.unwrap().is_none());

    let move_owner = TaskListPatch {
        user_id: Some("ghost".into()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_task_list(&list.id, move_owner).await,
        Err(StorageError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn listing_filters_and_orders() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    store.create_user(NewUser::new("u1")).await.unwrap();
    store.create_user(NewUser::new("u2")).await.unwrap();

    for (child, day) in [("Noa", 6), ("Eli", 6), ("Noa", 13)] {
        store
            .create_task_list(new_list("u1", child, week(day)))
            .await
            .unwrap();
    }
    store
        .create_task_list(new_list("u2", "Kai", week(6)))
        .await
        .unwrap();

    let all = store.list_task_lists("u1", None).await.unwrap();
    let keys: Vec<_> = all
        .iter()
        .map(|l| (l.week_start, l.child_name.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![(week(13), "Noa"), (week(6), "Eli"), (week(6), "Noa")]
    );

    let first_week = store.list_task_lists("u1", Some(week(6))).await.unwrap();
    assert_eq!(first_week.len(), 2);
    assert!(store.list_task_lists("nobody", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn users_cascade_and_keep_their_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    let user = store.create_user(NewUser::new("u1")).await.unwrap();
    assert!(matches!(
        store.create_user(NewUser::new("u1")).await,
        Err(StorageError::Conflict(_))
    ));
    assert!(matches!(
        store.create_user(NewUser::new("  ")).await,
        Err(StorageError::InvalidInput(_))
    ));

    let touched = store
        .update_user("u1", UserPatch::default())
        .await
        .unwrap()
        .unwrap();
    // An empty patch reads the row back without touching it
    assert_eq!(touched, user);

    let stamp = chrono::DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let stamped = store
        .update_user(
            "u1",
            UserPatch {
                updated_at: Some(stamp),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stamped.updated_at, stamp);

    assert!(matches!(
        store
            .update_user(
                "u1",
                UserPatch {
                    id: Some("u2".into()),
                    ..Default::default()
                }
            )
            .await,
        Err(StorageError::InvalidInput(_))
    ));
    assert!(
        store
            .update_user("missing", UserPatch::default())
            .await
            .unwrap()
            .is_none()
    );

    let list = store
        .create_task_list(new_list("u1", "Noa", week(6)))
        .await
        .unwrap();
    assert!(store.delete_user("u1").await.unwrap());
    assert!(store.get_user("u1").await.unwrap().is_none());
    assert!(store.get_task_list(&list.id).await.unwrap().is_none());
    assert!(!store.delete_user("u1").await.unwrap());
}
