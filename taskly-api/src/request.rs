use crate::error::ApiError;
use crate::transport::{Body, FormPayload, HttpRequest};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use url::Url;

pub enum RequestData<T> {
    Empty,
    Json(T),
    Query(T),
    Form(FormPayload),
}

/// A typed API operation.
pub trait Request {
    type Data: Serialize;
    /// Returned as `Default::default()` when a 2xx response carries no JSON body.
    type Response: DeserializeOwned + Default;

    const METHOD: Method = Method::GET;
    /// Whether the payload sits in the `data` field of the response envelope.
    const ENVELOPED: bool = true;
    /// Whether the call carries the session's bearer token and may trigger a refresh.
    const AUTHORIZED: bool = true;

    fn endpoint(&self) -> Cow<'_, str>;

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Empty
    }
}

/// Everything needed to (re)issue one call. Built once, sent at most twice.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    authorized: bool,
    enveloped: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            authorized: true,
            enveloped: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn from_request<R: Request>(request: &R) -> Result<Self, ApiError> {
        let pending = Self::new(R::METHOD, request.endpoint());
        let pending = match request.data() {
            RequestData::Empty => pending,
            RequestData::Json(data) => pending.json(data)?,
            RequestData::Query(data) => pending.query(data)?,
            RequestData::Form(form) => pending.form(form),
        };

        Ok(Self {
            authorized: R::AUTHORIZED,
            enveloped: R::ENVELOPED,
            ..pending
        })
    }

    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, ApiError> {
        self.query.extend(encode_query(params)?);
        Ok(self)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn form(mut self, form: FormPayload) -> Self {
        self.body = Body::Form(form);
        self
    }

    /// Send without credentials; a 401 is then reported as-is instead of refreshing.
    pub fn without_auth(mut self) -> Self {
        self.authorized = false;
        self
    }

    /// Return the whole JSON body instead of its `data` field.
    pub fn unwrapped(mut self) -> Self {
        self.enveloped = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn is_enveloped(&self) -> bool {
        self.enveloped
    }

    pub fn url(&self, base_url: &str) -> Result<String, ApiError> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid URL '{}': {}", raw, e)))?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url.into())
    }

    pub(crate) fn build(
        &self,
        base_url: &str,
        access_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = access_token.filter(|_| self.authorized) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("access token is not a valid header value".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // Multipart bodies get their boundary from the transport.
        if matches!(self.body, Body::Json(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(HttpRequest {
            method: self.method.clone(),
            url: self.url(base_url)?,
            headers,
            body: self.body.clone(),
        })
    }
}

/// Flatten a serializable map into query pairs. Nulls are dropped, scalars stringified.
pub fn encode_query<T: Serialize + ?Sized>(params: &T) -> Result<Vec<(String, String)>, ApiError> {
    let map = match serde_json::to_value(params)? {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ApiError::InvalidRequest(
                "query parameters must be a key/value map".into(),
            ));
        }
    };

    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some(Ok((key, text))),
            Value::Bool(flag) => Some(Ok((key, flag.to_string()))),
            Value::Number(number) => Some(Ok((key, number.to_string()))),
            Value::Array(_) | Value::Object(_) => Some(Err(ApiError::InvalidRequest(format!(
                "query parameter '{}' must be a scalar",
                key
            )))),
        })
        .collect()
}
