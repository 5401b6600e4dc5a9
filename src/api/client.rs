use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::session::Session;

/// Method, body, query string and extra headers for one call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// JSON-over-HTTP client for the site's admin API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3001/api`
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("estate-data/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Perform one call and return the parsed JSON body (`Null` when empty).
    ///
    /// A 401 on a call that carried a bearer token clears the session (unless
    /// a newer login replaced that token meanwhile) and yields
    /// [`ApiError::AuthExpired`]. Nothing is retried.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        debug!("{} {}", options.method, url);

        let mut req = self
            .http
            .request(options.method.clone(), &url)
            .header("Accept", "application/json");

        let token = self.session.token();
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Invalid(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Invalid(format!("value of header {name}: {e}")))?;
            req = req.header(name, value);
        }
        if let Some(body) = &options.body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("failed to reach {url}: {e}")))?;

        self.handle_response(resp, token.as_deref()).await
    }

    async fn handle_response(
        &self,
        resp: reqwest::Response,
        sent_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = sent_token {
                if self.session.expire(token) {
                    warn!("Server rejected the session token, logging out");
                } else {
                    debug!("Rejected token was already replaced, keeping the session");
                }
                return Err(ApiError::AuthExpired);
            }
        }

        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let value = self.request(endpoint, RequestOptions::get()).await?;
        decode(value)
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let options = query
            .iter()
            .fold(RequestOptions::get(), |opts, (k, v)| opts.query(*k, *v));
        let value = self.request(endpoint, options).await?;
        decode(value)
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, endpoint, body).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request(endpoint, RequestOptions::delete()).await?;
        Ok(())
    }

    async fn send_json<T, B>(&self, method: Method, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self
            .request(endpoint, RequestOptions::with_body(method, body))
            .await?;
        decode(value)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Server-provided message from an Express-style `{ "error": ".." }` body
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|field| json.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
}
