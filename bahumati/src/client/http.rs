//! The shared API client.
//!
//! Every backend response is a JSON envelope with a `success` discriminator:
//! non-2xx statuses carry a `message` (sometimes `error`) field, and a 2xx
//! body with `success: false` is treated the same as a failure. The payload
//! is deserialized strictly from the full body — a shape mismatch is a
//! [`ServiceError::Malformed`], never a silently-defaulted field.

use super::errors::{ServiceError, ServiceResult};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a request authenticates.
#[derive(Debug, Clone)]
pub enum Auth {
    /// No Authorization header (login, OTP dispatch/verify).
    None,
    /// The operator's session bearer token.
    Operator,
    /// A one-shot token scoped to a single end user (enrollment wizard).
    UserToken(String),
}

/// Error body shape the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Shared HTTP client: base URL, connection pool, and the operator's
/// bearer token once a session exists. Cloning is cheap; the underlying
/// `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Attach the operator bearer token used by [`Auth::Operator`] requests.
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn builder(&self, method: Method, path: &str, auth: &Auth) -> RequestBuilder {
        let rb = self.http.request(method, self.url(path));
        match auth {
            Auth::None => rb,
            Auth::Operator => match &self.token {
                Some(token) => rb.bearer_auth(token),
                None => rb,
            },
            Auth::UserToken(token) => rb.bearer_auth(token),
        }
    }

    /// Issue a request and strictly parse the enveloped payload.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        auth: Auth,
    ) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut rb = self.builder(method, path, &auth);
        if !query.is_empty() {
            rb = rb.query(query);
        }
        if let Some(body) = body {
            rb = rb.json(body);
        }

        let response = rb.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: extract_error_message(status, &text),
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ServiceError::Malformed(format!("invalid JSON body: {e}")))?;

        // A 2xx with `success: false` is a rejection, not a payload.
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request rejected by backend")
                .to_string();
            return Err(ServiceError::Rejected(message));
        }

        serde_json::from_value(value).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        self.request::<T, ()>(Method::GET, path, &[], None, Auth::Operator)
            .await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<T> {
        self.request::<T, ()>(Method::GET, path, query, None, Auth::Operator)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> ServiceResult<T> {
        self.request(Method::POST, path, &[], Some(body), auth).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> ServiceResult<T> {
        self.request(Method::PUT, path, &[], Some(body), auth).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        self.request(Method::PATCH, path, &[], Some(body), Auth::Operator)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        self.request::<T, ()>(Method::DELETE, path, &[], None, Auth::Operator)
            .await
    }
}

/// Pull a readable message out of a non-2xx body, falling back to the
/// status line when the body is not the documented error shape.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return message;
    }
    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("error")
    )
}

/// Acknowledgement body for mutations whose payload the console ignores.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    #[allow(dead_code)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        let msg = extract_error_message(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Invalid OTP"}"#,
        );
        assert_eq!(msg, "Invalid OTP");
    }

    #[test]
    fn error_message_falls_back_to_error_field() {
        let msg = extract_error_message(StatusCode::CONFLICT, r#"{"error":"username taken"}"#);
        assert_eq!(msg, "username taken");
    }

    #[test]
    fn error_message_falls_back_to_status_line() {
        let msg = extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>");
        assert_eq!(msg, "HTTP 500 Internal Server Error");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:5000/api/v1/".to_string());
        assert_eq!(api.base_url(), "http://localhost:5000/api/v1");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:19999".to_string());
        let result: ServiceResult<Ack> = api.get("/admin/agents").await;
        assert!(matches!(result, Err(ServiceError::Transport(_))));
    }
}
