use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiQueryParams, ApiResponse};
use super::error::ApiError;

pub const DEFAULT_ENDPOINT: &str = "https://api.telnyx.com/v2";

/// Telnyx v2 REST client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl Client {
    /// Create a new API client. `endpoint` must be an absolute URL.
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: not an absolute URL",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                auth_header: format!("Bearer {}", api_key),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Execute a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.http_client.get(self.url(path));
        self.execute("GET", path, request).await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Execute a POST request
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.http_client.post(self.url(path)).json(body);
        self.execute("POST", path, request).await
    }

    /// Execute a PATCH request
    pub async fn patch<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.http_client.patch(self.url(path)).json(body);
        self.execute("PATCH", path, request).await
    }

    /// Execute a DELETE request; any response body is discarded
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.inner.http_client.delete(self.url(path));
        let response = self.send("DELETE", path, request).await?;
        if response.status().is_success() {
            return Ok(());
        }
        self.handle_error_response(response).await
    }

    /// Billing API operations
    pub fn billing(&self) -> crate::api::billing::BillingApi<'_> {
        crate::api::billing::BillingApi::new(self)
    }

    /// Messaging API operations
    pub fn messaging(&self) -> crate::api::messaging::MessagingApi<'_> {
        crate::api::messaging::MessagingApi::new(self)
    }

    /// Voice API operations
    pub fn voice(&self) -> crate::api::voice::VoiceApi<'_> {
        crate::api::voice::VoiceApi::new(self)
    }

    /// Numbers API operations
    pub fn numbers(&self) -> crate::api::numbers::NumbersApi<'_> {
        crate::api::numbers::NumbersApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("{} request to: {}{}", method, self.inner.base_url, path);

        let response = request
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        tracing::debug!("{} {} returned {}", method, path, response.status());
        Ok(response)
    }

    async fn execute<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, request).await?;
        if response.status().is_success() {
            return self.parse_success_response(response).await;
        }
        self.handle_error_response(response).await
    }

    /// Parse successful response
    async fn parse_success_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(wrapper) => Ok(wrapper.data),
            Err(_) => match serde_json::from_str::<T>(&text) {
                Ok(data) => Ok(data),
                Err(e) => {
                    tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
                    Err(ApiError::ParseError(format!(
                        "Failed to parse response: {}",
                        e
                    )))
                }
            },
        }
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::debug!("API error response (HTTP {}): {}", status, text);

        let details = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .filter(|resp| !resp.errors.is_empty())
            .map(|resp| {
                Box::new(ApiErrorDetails {
                    errors: resp.errors,
                })
            });

        Err(ApiError::ApiError {
            status,
            message: text,
            details,
        })
    }
}
