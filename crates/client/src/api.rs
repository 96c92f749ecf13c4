//! Request layer: one JSON round trip per call against the carpool API.
//!
//! No retries, no timeout, no caching. Every call is at most one attempt;
//! failures come back as [`ApiError`] carrying the server's message.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, error_message};

/// Collection paths of the remote API (relative to the base address).
pub mod endpoints {
    pub const USERS: &str = "/users";
    pub const RIDES: &str = "/rides";
    pub const BOOKINGS: &str = "/bookings";
    pub const SIGNUP: &str = "/users/signup";
    pub const LOGIN: &str = "/users/login";
    pub const CREATE_RIDE: &str = "/rides/create";
    pub const SUMMARY: &str = "/summary";
}

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Key/value filters for list requests, passed through unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Thin client over the remote REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str, query: Option<&Query>) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| ApiError::Transport(format!("invalid URL for {endpoint}: {e}")))?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// Perform one request and return the parsed JSON body.
    ///
    /// - 2xx → parsed body.
    /// - 204 → an empty object; the body is not read.
    /// - anything else → [`ApiError::Status`] with the message from `detail`
    ///   or `error`, or the serialized body.
    pub async fn fetch(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.send(method, endpoint, None, body)
            .await
            .inspect_err(|err| tracing::error!(endpoint, error = %err, "API fetch error"))
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(endpoint, query)?;
        tracing::debug!(%method, %url, "api request");

        let mut req = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|e| ApiError::Decode(format!("failed to encode request body: {e}")))?;
            req = req.body(bytes);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }

        let bytes = resp.bytes().await?;
        let parsed = serde_json::from_slice::<Value>(&bytes);

        if status.is_success() {
            return parsed.map_err(|e| {
                ApiError::Decode(format!("invalid JSON in response from {endpoint}: {e}"))
            });
        }

        let message = match parsed {
            Ok(body) => error_message(&body),
            Err(_) => {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            }
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET {endpoint}/?{query}`
    pub async fn get_data(&self, endpoint: &str, query: &Query) -> Result<Value, ApiError> {
        let path = format!("{endpoint}/");
        self.send(Method::GET, &path, Some(query), None)
            .await
            .inspect_err(|err| tracing::error!(endpoint = %path, error = %err, "API fetch error"))
    }

    /// `GET {endpoint}/{id}/`
    pub async fn get_item(&self, endpoint: &str, id: impl core::fmt::Display) -> Result<Value, ApiError> {
        self.fetch(Method::GET, &format!("{endpoint}/{id}/"), None).await
    }

    /// `POST {endpoint}/`
    pub async fn save_data<B>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.fetch(Method::POST, &format!("{endpoint}/"), Some(body)).await
    }

    /// `PATCH {endpoint}/{id}/`
    pub async fn update_data<B>(
        &self,
        endpoint: &str,
        id: impl core::fmt::Display,
        body: &B,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.fetch(Method::PATCH, &format!("{endpoint}/{id}/"), Some(body))
            .await
    }

    /// `PATCH {endpoint}/{id}/{action}/`
    pub async fn update_action<B>(
        &self,
        endpoint: &str,
        id: impl core::fmt::Display,
        action: &str,
        body: &B,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.fetch(Method::PATCH, &format!("{endpoint}/{id}/{action}/"), Some(body))
            .await
    }

    /// `DELETE {endpoint}/{id}/delete/`
    pub async fn delete_data(&self, endpoint: &str, id: impl core::fmt::Display) -> Result<Value, ApiError> {
        self.fetch(Method::DELETE, &format!("{endpoint}/{id}/delete/"), None)
            .await
    }

    /// Typed [`get_data`](Self::get_data) for list endpoints.
    pub async fn list<T>(&self, endpoint: &str, query: &Query) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        decode(endpoint, self.get_data(endpoint, query).await?)
    }

    /// Typed [`get_item`](Self::get_item).
    pub async fn item<T>(&self, endpoint: &str, id: impl core::fmt::Display) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        decode(endpoint, self.get_item(endpoint, id).await?)
    }

    /// Typed [`save_data`](Self::save_data).
    pub async fn create<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(endpoint, self.save_data(endpoint, body).await?)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Decode(format!("failed to encode request body: {e}")))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("unexpected response from {endpoint}: {e}")))
}
