use super::{MessageResponse, Paging};
use crate::macros::setter;
use crate::request::{Request, RequestData};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const TASKS_ENDPOINT: &str = "/api/users/tasks";

// Common

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Newest first, ties broken by id.
impl Ord for Task {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Path of a single task; the id is percent-encoded as one segment.
fn task_path(task_id: &str) -> String {
    format!("{}/{}", TASKS_ENDPOINT, urlencoding::encode(task_id))
}

// Requests

#[derive(Default, Debug, Clone)]
pub struct ListTasks;

impl ListTasks {
    pub fn new() -> Self {
        Self
    }
}

impl Request for ListTasks {
    type Data = ();
    type Response = Vec<Task>;

    fn endpoint(&self) -> Cow<'_, str> {
        TASKS_ENDPOINT.into()
    }
}

#[derive(Debug, Clone)]
pub struct GetTask {
    task_id: String,
}

impl GetTask {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

impl Request for GetTask {
    type Data = ();
    type Response = Task;

    fn endpoint(&self) -> Cow<'_, str> {
        task_path(&self.task_id).into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTask {
    title: String,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    setter!(opt description: String);
}

impl Request for CreateTask {
    type Data = Self;
    type Response = Task;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        TASKS_ENDPOINT.into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateTask {
    #[serde(skip)]
    task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl UpdateTask {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: None,
            description: None,
            completed: None,
        }
    }

    setter!(opt title: String);
    setter!(opt description: String);
    setter!(opt completed: bool);
}

impl Request for UpdateTask {
    type Data = Self;
    type Response = Task;
    const METHOD: Method = Method::PATCH;

    fn endpoint(&self) -> Cow<'_, str> {
        task_path(&self.task_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTask {
    task_id: String,
}

impl DeleteTask {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

impl Request for DeleteTask {
    type Data = ();
    type Response = MessageResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        task_path(&self.task_id).into()
    }
}

/// Server-side search. Unset fields are left out of the query string.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTasks {
    created_at: Option<String>,
    page: Option<u32>,
    size: Option<u32>,
    title: Option<String>,
    updated_at: Option<String>,
}

impl SearchTasks {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt title: String);
    setter!(opt created_at: String);
    setter!(opt updated_at: String);
    setter!(opt page: u32);
    setter!(opt size: u32);
}

impl Request for SearchTasks {
    type Data = Self;
    type Response = SearchTasksResponse;
    const ENVELOPED: bool = false;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("{}/search", TASKS_ENDPOINT).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

// Responses

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchTasksResponse {
    #[serde(default)]
    pub data: Vec<Task>,
    #[serde(default)]
    pub paging: Paging,
}
