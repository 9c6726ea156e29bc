use chrono::NaiveDate;
use serde_json::json;
use starfall_shared::api::endpoints;
use starfall_shared::domain::{
    NewTaskList, NewUser, TaskList, TaskListPatch, UserPatch, ValidationError, now_utc,
};

fn sample_insert() -> serde_json::Value {
    json!({
        "user_id": "user-1",
        "week_start": "2025-01-06",
        "template_id": "space",
        "child_name": "Mia",
        "tasks": ["Make bed", {"title": "Feed the cat", "emoji": "cat"}],
        "stars": [false, true]
    })
}

fn sample_row() -> TaskList {
    let insert: NewTaskList = serde_json::from_value(sample_insert()).unwrap();
    insert.into_row(now_utc(), || "list-1".to_string())
}

#[test]
fn insert_accepts_payload_without_generated_fields() {
    let insert: NewTaskList = serde_json::from_value(sample_insert()).unwrap();
    assert!(insert.id.is_none());
    assert!(insert.created_at.is_none());
    assert!(insert.updated_at.is_none());
    assert!(insert.notes.is_none());
    insert.validate().unwrap();
}

#[test]
fn insert_rejects_missing_required_fields() {
    for field in [
        "user_id",
        "week_start",
        "template_id",
        "child_name",
        "tasks",
        "stars",
    ] {
        let mut payload = sample_insert();
        payload.as_object_mut().unwrap().remove(field);
        let err = serde_json::from_value::<NewTaskList>(payload).unwrap_err();
        assert!(
            err.to_string().contains(field),
            "missing {field} should be named in: {err}"
        );
    }
}

#[test]
fn insert_rejects_unknown_fields() {
    let mut payload = sample_insert();
    payload["star"] = json!([true]);
    assert!(serde_json::from_value::<NewTaskList>(payload).is_err());
}

#[test]
fn user_insert_requires_id() {
    assert!(serde_json::from_value::<NewUser>(json!({})).is_err());
    let user: NewUser = serde_json::from_value(json!({"id": "abc"})).unwrap();
    let now = now_utc();
    let row = user.into_row(now);
    assert_eq!(row.id, "abc");
    assert_eq!(row.created_at, now);
    assert_eq!(row.updated_at, now);
}

#[test]
fn update_accepts_empty_and_partial_payloads() {
    let empty: TaskListPatch = serde_json::from_value(json!({})).unwrap();
    assert!(empty.is_empty());

    let partial: TaskListPatch =
        serde_json::from_value(json!({"child_name": "Leo", "week_start": "2025-01-13"})).unwrap();
    assert!(!partial.is_empty());
    assert_eq!(partial.child_name.as_deref(), Some("Leo"));
    assert!(partial.notes.is_none());

    let clear_notes: TaskListPatch = serde_json::from_value(json!({"notes": null})).unwrap();
    assert!(!clear_notes.is_empty());

    let user: UserPatch = serde_json::from_value(json!({})).unwrap();
    assert!(user.is_empty());
    let user: UserPatch =
        serde_json::from_value(json!({"updated_at": "2025-01-06T08:00:00Z"})).unwrap();
    assert!(!user.is_empty());
}

#[test]
fn update_distinguishes_absent_and_null_notes() {
    let mut row = sample_row();
    row.notes = Some("be kind".into());

    let untouched: TaskListPatch = serde_json::from_value(json!({"template_id": "ocean"})).unwrap();
    untouched.apply(&mut row);
    assert_eq!(row.notes.as_deref(), Some("be kind"));
    assert_eq!(row.template_id, "ocean");

    let cleared: TaskListPatch = serde_json::from_value(json!({"notes": null})).unwrap();
    assert_eq!(cleared.notes, Some(None));
    cleared.apply(&mut row);
    assert_eq!(row.notes, None);

    let serialized = serde_json::to_value(TaskListPatch {
        notes: Some(None),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(serialized, json!({"notes": null}));
}

#[test]
fn validation_catches_parallel_array_drift() {
    let mut payload = sample_insert();
    payload["stars"] = json!([true]);
    let insert: NewTaskList = serde_json::from_value(payload).unwrap();
    assert_eq!(
        insert.validate(),
        Err(ValidationError::StarsLengthMismatch { tasks: 2, stars: 1 })
    );
}

#[test]
fn validation_requires_task_titles() {
    let mut row = sample_row();
    row.tasks[1] = json!({"emoji": "cat"});
    assert!(matches!(
        row.validate(),
        Err(ValidationError::InvalidTask { index: 1, .. })
    ));

    row.tasks[1] = json!(42);
    assert!(row.validate().is_err());

    row.tasks[1] = json!("   ");
    assert!(row.validate().is_err());
}

#[test]
fn validation_requires_names() {
    let mut row = sample_row();
    row.child_name = "  ".into();
    assert_eq!(
        row.validate(),
        Err(ValidationError::EmptyField("child_name"))
    );
}

#[test]
fn names_are_stored_trimmed() {
    let mut payload = sample_insert();
    payload["child_name"] = json!(" Mia  ");
    payload["template_id"] = json!("space ");
    let insert: NewTaskList = serde_json::from_value(payload).unwrap();
    let mut row = insert.into_row(now_utc(), || "list-1".to_string());
    assert_eq!(row.child_name, "Mia");
    assert_eq!(row.template_id, "space");

    let rename: TaskListPatch = serde_json::from_value(json!({"child_name": "\tLeo "})).unwrap();
    rename.apply(&mut row);
    assert_eq!(row.child_name, "Leo");
}

#[test]
fn items_pair_tasks_with_stars() {
    let mut row = sample_row();
    let items = row.items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Make bed");
    assert!(!items[0].done);
    assert_eq!(items[1].title, "Feed the cat");
    assert!(items[1].done);
    assert_eq!(row.stars_earned(), 1);

    row.set_star(0, true).unwrap();
    assert_eq!(row.stars_earned(), 2);
    assert_eq!(
        row.set_star(5, true),
        Err(ValidationError::StarIndexOutOfRange { index: 5, len: 2 })
    );
}

#[test]
fn row_round_trips_with_null_notes() {
    let row = sample_row();
    let value = serde_json::to_value(&row).unwrap();
    assert_eq!(value["notes"], json!(null));
    assert_eq!(value["week_start"], json!("2025-01-06"));
    let back: TaskList = serde_json::from_value(value).unwrap();
    assert_eq!(back, row);
}

#[test]
fn endpoints_encode_path_segments() {
    let base = "http://localhost:5252/";
    assert_eq!(endpoints::users(base), "http://localhost:5252/api/users");
    assert_eq!(
        endpoints::user(base, "a b"),
        "http://localhost:5252/api/users/a%20b"
    );
    assert_eq!(
        endpoints::user_task_lists(base, "u1", NaiveDate::from_ymd_opt(2025, 1, 6)),
        "http://localhost:5252/api/users/u1/task-lists?week_start=2025-01-06"
    );
    assert_eq!(
        endpoints::task_list_star(base, "l-1", 3),
        "http://localhost:5252/api/task-lists/l%2D1/stars/3"
    );
}
