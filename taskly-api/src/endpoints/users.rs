use super::{MessageResponse, serialize_secret_opt};
use crate::macros::setter;
use crate::request::{Request, RequestData};
use crate::transport::FormPayload;
use chrono::{DateTime, Utc};
use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const AVATAR_FIELD: &str = "avatar";

// Common

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updateAt")]
    pub updated_at: DateTime<Utc>,
}

// Requests

#[derive(Default, Debug, Clone)]
pub struct GetCurrentUser;

impl GetCurrentUser {
    pub fn new() -> Self {
        Self
    }
}

impl Request for GetCurrentUser {
    type Data = ();
    type Response = User;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/current".into()
    }
}

#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCurrentUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret_opt"
    )]
    password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
}

impl UpdateCurrentUser {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt name: String);
    setter!(opt email: String);
    setter!(opt password: SecretString);
    setter!(opt avatar_url: String);
}

impl Request for UpdateCurrentUser {
    type Data = Self;
    type Response = User;
    const METHOD: Method = Method::PATCH;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/current".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct UploadAvatar {
    form: FormPayload,
}

impl UploadAvatar {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            form: FormPayload::new().file(AVATAR_FIELD, file_name, content_type, bytes),
        }
    }
}

impl Request for UploadAvatar {
    type Data = ();
    type Response = User;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/avatar".into()
    }

    fn data(&self) -> RequestData<&()> {
        RequestData::Form(self.form.clone())
    }
}

#[derive(Default, Debug, Clone)]
pub struct DeleteAvatar;

impl DeleteAvatar {
    pub fn new() -> Self {
        Self
    }
}

impl Request for DeleteAvatar {
    type Data = ();
    type Response = MessageResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/avatar".into()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Logout {
    refresh_token: String,
}

impl Logout {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
        }
    }
}

impl Request for Logout {
    type Data = Self;
    type Response = MessageResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/logout".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}
