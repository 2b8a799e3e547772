//! Scripted transport for exercising the gateway without a network.

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

type Route = (Method, String);

enum Reply {
    Response(HttpResponse),
    Failure(TransportError),
}

/// Replies are queued per method and path and consumed in order.
/// Every request is recorded for later assertions.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<Route, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    rejected_tokens: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.push(method, path, Reply::Response(response));
        self
    }

    /// Queue a `{ "data": value }` envelope with status 200.
    pub fn reply_data(&self, method: Method, path: &str, value: Value) -> &Self {
        self.reply(method, path, json_response(200, json!({ "data": value })))
    }

    pub fn reply_status(&self, method: Method, path: &str, status: u16) -> &Self {
        self.reply(method, path, empty_response(status))
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::Failure(TransportError::new(message)));
        self
    }

    /// Answer 401 to any request bearing `token`, without consuming queued replies.
    pub fn reject_token(&self, token: &str) -> &Self {
        lock(&self.rejected_tokens).push(format!("Bearer {}", token));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        lock(&self.requests)
            .iter()
            .filter(|request| request.method == method && path_of(&request.url) == path)
            .cloned()
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// Bearer tokens sent to a route, in order (`None` for unauthenticated calls).
    pub fn bearer_tokens(&self, method: Method, path: &str) -> Vec<Option<String>> {
        self.requests_to(method, path)
            .iter()
            .map(|request| {
                request
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
            })
            .collect()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        lock(&self.replies)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        // Let concurrent callers interleave the way real I/O would.
        tokio::task::yield_now().await;

        let route = (request.method.clone(), path_of(&request.url));
        let rejected = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|bearer| lock(&self.rejected_tokens).iter().any(|t| t == bearer));
        lock(&self.requests).push(request);

        if rejected {
            return Ok(json_response(401, json!({ "errors": "Token expired" })));
        }

        let reply = lock(&self.replies)
            .get_mut(&route)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(err)) => Err(err),
            None => Err(TransportError::new(format!(
                "no mock reply for {} {}",
                route.0, route.1
            ))),
        }
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(
        status_code(status),
        Some("application/json; charset=utf-8".to_string()),
        body.to_string().into_bytes(),
    )
}

pub fn empty_response(status: u16) -> HttpResponse {
    HttpResponse::new(status_code(status), None, Vec::new())
}

/// A complete user record as the API returns it.
pub fn user_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "avatarUrl": null,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z",
    })
}

/// A complete task record as the API returns it.
pub fn task_json(id: &str, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "desc": null,
        "completed": completed,
        "createdAt": "2024-03-01T09:00:00Z",
        "updatedAt": "2024-03-01T09:00:00Z",
    })
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn path_of(url: &str) -> String {
    Url::parse(url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
