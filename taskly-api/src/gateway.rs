use crate::endpoints::auth::{RefreshAccessToken, RefreshTokenResponse};
use crate::error::ApiError;
use crate::request::PendingRequest;
use crate::session::SessionStore;
use crate::transport::{HttpResponse, Transport};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Successful outcome of a call, before it is decoded into a typed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Empty,
}

/// Issues every request, attaches credentials and runs the 401 recovery.
pub struct Gateway {
    base_url: String,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    refresh_lock: Mutex<()>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            session,
            transport,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send `request`, refreshing the session and replaying it at most once on a 401.
    pub async fn execute(&self, request: &PendingRequest) -> Result<Payload, ApiError> {
        let mut recovered = false;

        loop {
            let access_token = if request.is_authorized() {
                self.session.access_token()
            } else {
                None
            };

            let response = self.dispatch(request, access_token.as_deref()).await?;

            if response.status == StatusCode::UNAUTHORIZED && request.is_authorized() && !recovered
            {
                tracing::debug!(path = request.path(), "Access token rejected, recovering");
                self.recover(access_token.as_deref()).await?;
                recovered = true;
                continue;
            }

            return classify(response, request.is_enveloped());
        }
    }

    /// Exchange the stored refresh token for a new pair. Does not clear the session on failure.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(ApiError::SessionExpired)?;
        self.refresh_with(&refresh_token).await
    }

    async fn recover(&self, rejected_token: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while this one waited for the lock.
        if let Some(current) = self.session.access_token() {
            if rejected_token != Some(current.as_str()) {
                tracing::debug!("Access token already replaced, skipping refresh");
                return Ok(());
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            tracing::warn!("No refresh token available, clearing session");
            self.session.clear();
            return Err(ApiError::SessionExpired);
        };

        match self.refresh_with(&refresh_token).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Token refresh failed, clearing session: {}", e);
                self.session.clear();
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn refresh_with(&self, refresh_token: &str) -> Result<(), ApiError> {
        let request = PendingRequest::from_request(&RefreshAccessToken::new(refresh_token))?;
        let response = self.dispatch(&request, None).await?;

        let tokens: RefreshTokenResponse = match classify(response, true)? {
            Payload::Json(value) => serde_json::from_value(value)?,
            Payload::Empty => {
                return Err(ApiError::UnexpectedResponse(
                    "refresh response carried no tokens".into(),
                ));
            }
        };

        let refresh_token = tokens
            .refresh_token
            .unwrap_or_else(|| refresh_token.to_string());
        self.session.set_credentials(tokens.token, refresh_token);
        tracing::info!("Access token refreshed");

        Ok(())
    }

    async fn dispatch(
        &self,
        request: &PendingRequest,
        access_token: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        let http_request = request.build(&self.base_url, access_token)?;
        tracing::debug!(method = %http_request.method, url = %http_request.url, "Sending request");

        let response = self.transport.execute(http_request).await.map_err(|e| {
            tracing::error!(path = request.path(), "Request failed: {}", e);
            ApiError::from(e)
        })?;
        tracing::debug!(status = %response.status, path = request.path(), "Received response");

        Ok(response)
    }
}

/// Map a raw response to its payload or an error carrying the server's message.
pub fn classify(response: HttpResponse, enveloped: bool) -> Result<Payload, ApiError> {
    if !response.status.is_success() {
        return Err(ApiError::from_response(&response));
    }

    if !response.is_json() || response.body.is_empty() {
        return Ok(Payload::Empty);
    }

    let value: Value = serde_json::from_slice(&response.body)?;
    if !enveloped {
        return Ok(Payload::Json(value));
    }

    Ok(match value {
        Value::Object(mut envelope) => match envelope.remove("data") {
            None | Some(Value::Null) => Payload::Empty,
            Some(data) => Payload::Json(data),
        },
        _ => Payload::Empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_response(status: u16, body: Value) -> HttpResponse {
        HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            Some("application/json".to_string()),
            body.to_string().into_bytes(),
        )
    }

    #[test]
    fn test_classify_returns_data_field() {
        let payload = classify(json_response(200, json!({ "data": { "id": "t1" } })), true).unwrap();
        assert_eq!(payload, Payload::Json(json!({ "id": "t1" })));
    }

    #[test]
    fn test_classify_unwrapped_returns_whole_body() {
        let body = json!({ "data": [], "paging": { "current_page": 1, "total_page": 1, "size": 10 } });
        let payload = classify(json_response(200, body.clone()), false).unwrap();
        assert_eq!(payload, Payload::Json(body));
    }

    #[test]
    fn test_classify_non_json_success_is_empty() {
        let response = HttpResponse::new(StatusCode::NO_CONTENT, None, Vec::new());
        assert_eq!(classify(response, true).unwrap(), Payload::Empty);

        let response = HttpResponse::new(
            StatusCode::OK,
            Some("text/plain".to_string()),
            b"deleted".to_vec(),
        );
        assert_eq!(classify(response, true).unwrap(), Payload::Empty);
    }

    #[test]
    fn test_classify_error_status() {
        let err = classify(json_response(400, json!({ "errors": "Title is required" })), true)
            .unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }
}
