use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod endpoints;

pub const API_PREFIX: &str = "/api";

// Stars
#[derive(Debug, Serialize, Deserialize)]
pub struct StarReq {
    pub starred: bool,
}

// Listing filter for a user's task lists
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskListQuery {
    pub week_start: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
