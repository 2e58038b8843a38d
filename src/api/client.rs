use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use super::envelope::{DataEnvelope, RemoteResponse};
use crate::app::ApiConfig;
use crate::auth::Authorizer;
use crate::utils::{CampusError, Result};

/// JSON API client
///
/// Every request carries the bearer credential from the [`Authorizer`] and a
/// finite timeout. Calls never return `Err`; the outcome is classified into a
/// [`RemoteResponse`] for the caches to normalize.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    authorizer: Authorizer,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ApiConfig, authorizer: Authorizer) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CampusError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorizer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RemoteResponse<T> {
        self.send(self.http.get(self.url(path))).await
    }

    /// POST a JSON body to `path`
    pub async fn post<T, B>(&self, path: &str, body: &B) -> RemoteResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    /// PUT a JSON body to `path`
    pub async fn put<T, B>(&self, path: &str, body: &B) -> RemoteResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    /// DELETE `path`
    pub async fn delete(&self, path: &str) -> RemoteResponse<serde_json::Value> {
        self.send(self.http.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResponse<T> {
        let request = request.header(AUTHORIZATION, self.authorizer.authorization_header());

        match request.send().await {
            Ok(response) => Self::classify(response).await,
            Err(e) => {
                debug!(error = %e, "API request failed before a response arrived");
                RemoteResponse::TransportError(e.to_string())
            }
        }
    }

    async fn classify<T: DeserializeOwned>(response: Response) -> RemoteResponse<T> {
        let status = response.status();
        let url = response.url().clone();

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return RemoteResponse::TransportError(e.to_string()),
        };

        trace!(%url, status = status.as_u16(), bytes = text.len(), "API response");

        if !status.is_success() {
            return RemoteResponse::HttpError {
                status: status.as_u16(),
                body: (!text.is_empty()).then_some(text),
            };
        }

        if text.trim().is_empty() {
            return RemoteResponse::Success(None);
        }

        match serde_json::from_str::<DataEnvelope<T>>(&text) {
            Ok(envelope) => RemoteResponse::Success(envelope.data),
            Err(e) => RemoteResponse::TransportError(format!("failed to decode response: {}", e)),
        }
    }
}
