//! Authenticated request dispatch.
//!
//! Every authorized call goes through [`Dispatcher::request`], which is the
//! only place that attaches the bearer token and the only place that reacts
//! to expired or rejected tokens.

use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::auth::{EndReason, Session};
use crate::errors::{ClientError, ClientResult};
use reqwest::{Method, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Description of an API call relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    /// Create a request for the given path segments; each segment is
    /// percent-encoded when the URL is built
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, segments)
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Append a query parameter
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ClientResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidArgument(format!("Unserializable body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as it appears in logs, e.g. `/products/7`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Builds and sends API requests, handling session expiry uniformly
#[derive(Clone)]
pub struct Dispatcher {
    base_url: String,
    session: Arc<Session>,
    transport: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<Session>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send an authorized request and return the JSON body
    ///
    /// # Errors
    ///
    /// * `ClientError::SessionExpired` - No valid token (nothing was sent), or the
    ///   server answered 401; in both cases the session has been ended
    /// * `ClientError::RequestFailed` - Any other non-success status
    /// * `ClientError::Network` - The exchange could not be completed
    /// * `ClientError::InvalidResponse` - Success status with a non-JSON body
    pub async fn request(&self, request: ApiRequest) -> ClientResult<Value> {
        let token = self.session.valid_token()?;
        let path = request.path();
        let method = request.method.clone();
        let http = self.build(request, Some(&token))?;

        let response = self.send(&method, &path, http).await?;

        if response.status == 401 {
            tracing::warn!(http_method = %method, http_path = %path, "Token rejected by server");
            self.session.end(EndReason::Rejected);
            return Err(ClientError::SessionExpired);
        }

        into_json(response)
    }

    /// Send an authorized request and deserialize the body into `T`
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let value = self.request(request).await?;
        serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Send a request without credentials
    ///
    /// Used for the auth endpoints. The session is never touched, and a 401
    /// is reported like any other failure status.
    pub async fn send_public(&self, request: ApiRequest) -> ClientResult<Value> {
        let path = request.path();
        let method = request.method.clone();
        let http = self.build(request, None)?;
        let response = self.send(&method, &path, http).await?;
        into_json(response)
    }

    fn build(&self, request: ApiRequest, token: Option<&str>) -> ClientResult<HttpRequest> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidArgument(format!("Invalid base URL {}: {e}", self.base_url))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidArgument(format!("Base URL {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        Ok(HttpRequest {
            method: request.method,
            url: url.to_string(),
            headers,
            body: request.body,
        })
    }

    async fn send(&self, method: &Method, path: &str, http: HttpRequest) -> ClientResult<HttpResponse> {
        let started = Instant::now();
        let result = self.transport.send(http).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::debug!(
                http_method = %method,
                http_path = path,
                http_status = response.status,
                duration_ms,
                "API request completed"
            ),
            Err(e) => tracing::debug!(
                http_method = %method,
                http_path = path,
                duration_ms,
                error = %e,
                "API request failed"
            ),
        }

        result
    }
}

/// Turn a response into its JSON body or a `RequestFailed` error
fn into_json(response: HttpResponse) -> ClientResult<Value> {
    if !response.is_success() {
        return Err(ClientError::RequestFailed {
            status: response.status,
            message: error_message(&response),
        });
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&response.body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pick the server's explanation out of an error body
///
/// Looks at `error`, then `message`, then falls back to a generic text.
pub fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["error", "message"].iter().find_map(|field| {
                body.get(*field)
                    .and_then(Value::as_str)
                    .filter(|msg| !msg.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {}", response.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_error_field() {
        let response = HttpResponse::json(400, &json!({"error": "Title is required", "message": "x"}));
        assert_eq!(error_message(&response), "Title is required");
    }

    #[test]
    fn test_error_message_falls_back_to_message() {
        let response = HttpResponse::json(404, &json!({"message": "Product not found"}));
        assert_eq!(error_message(&response), "Product not found");
    }

    #[test]
    fn test_error_message_generic() {
        assert_eq!(
            error_message(&HttpResponse::new(502, "<html>Bad Gateway</html>")),
            "Request failed with status 502"
        );
        assert_eq!(
            error_message(&HttpResponse::json(500, &json!({"error": ""}))),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_into_json_empty_body_is_null() {
        assert_eq!(into_json(HttpResponse::new(204, "")).unwrap(), Value::Null);
    }

    #[test]
    fn test_into_json_rejects_non_json_success() {
        assert!(matches!(
            into_json(HttpResponse::new(200, "OK")),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_api_request_path() {
        let request = ApiRequest::get(["products", "search"]).query("q", "red shoes");
        assert_eq!(request.path(), "/products/search");
        assert_eq!(request.method(), &Method::GET);
    }
}
