use super::serialize_secret;
use super::users::User;
use crate::request::{Request, RequestData};
use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const REFRESH_TOKEN_ENDPOINT: &str = "/api/refresh-token";

// Common

/// A user record as returned by login/registration, with the issued tokens.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct Register {
    name: String,
    email: String,
    #[serde(serialize_with = "serialize_secret")]
    password: SecretString,
}

impl Register {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Request for Register {
    type Data = Self;
    type Response = AuthResponse;
    const METHOD: Method = Method::POST;
    const AUTHORIZED: bool = false;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/register".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Login {
    email: String,
    #[serde(serialize_with = "serialize_secret")]
    password: SecretString,
}

impl Login {
    pub fn new(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Request for Login {
    type Data = Self;
    type Response = AuthResponse;
    const METHOD: Method = Method::POST;
    const AUTHORIZED: bool = false;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/login".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAccessToken {
    refresh_token: String,
}

impl RefreshAccessToken {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
        }
    }
}

impl Request for RefreshAccessToken {
    type Data = Self;
    type Response = RefreshTokenResponse;
    const METHOD: Method = Method::POST;
    const AUTHORIZED: bool = false;

    fn endpoint(&self) -> Cow<'_, str> {
        REFRESH_TOKEN_ENDPOINT.into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

// Responses

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub token: String,
    /// Absent when the server does not rotate refresh tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
}
