use chrono::NaiveDate;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use super::API_PREFIX;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

fn enc(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

pub fn users(base: &str) -> String {
    base_join(base, &format!("{}/users", API_PREFIX))
}
pub fn user(base: &str, user_id: &str) -> String {
    base_join(base, &format!("{}/users/{}", API_PREFIX, enc(user_id)))
}
pub fn user_task_lists(base: &str, user_id: &str, week_start: Option<NaiveDate>) -> String {
    let url = base_join(
        base,
        &format!("{}/users/{}/task-lists", API_PREFIX, enc(user_id)),
    );
    match week_start {
        Some(week) => format!("{}?week_start={}", url, week.format("%Y-%m-%d")),
        None => url,
    }
}
pub fn task_lists(base: &str) -> String {
    base_join(base, &format!("{}/task-lists", API_PREFIX))
}
pub fn task_list(base: &str, list_id: &str) -> String {
    base_join(base, &format!("{}/task-lists/{}", API_PREFIX, enc(list_id)))
}
pub fn task_list_items(base: &str, list_id: &str) -> String {
    base_join(
        base,
        &format!("{}/task-lists/{}/items", API_PREFIX, enc(list_id)),
    )
}
pub fn task_list_star(base: &str, list_id: &str, index: usize) -> String {
    base_join(
        base,
        &format!("{}/task-lists/{}/stars/{}", API_PREFIX, enc(list_id), index),
    )
}
