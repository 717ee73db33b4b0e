//! Messaging profiles

use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_failover_url: Option<String>,
    #[serde(default)]
    pub webhook_api_version: Option<String>,
    #[serde(default)]
    pub whitelisted_destinations: Option<Vec<String>>,
    #[serde(default)]
    pub v1_secret: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Request body for create and update
#[derive(Debug, Clone, Serialize)]
pub struct MessagingProfileRequest {
    pub name: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_failover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_api_version: Option<String>,
    pub whitelisted_destinations: Vec<String>,
}

pub struct MessagingProfilesApi<'a> {
    client: &'a Client,
}

impl<'a> MessagingProfilesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /messaging_profiles
    pub async fn list(&self) -> Result<Vec<MessagingProfile>, ApiError> {
        self.client.get("/messaging_profiles").await
    }

    /// GET /messaging_profiles/{id}
    pub async fn get(&self, id: &str) -> Result<MessagingProfile, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /messaging_profiles
    pub async fn create(
        &self,
        request: &MessagingProfileRequest,
    ) -> Result<MessagingProfile, ApiError> {
        self.client.post("/messaging_profiles", request).await
    }

    /// PATCH /messaging_profiles/{id}
    pub async fn update(
        &self,
        id: &str,
        request: &MessagingProfileRequest,
    ) -> Result<MessagingProfile, ApiError> {
        self.client.patch(&Self::path(id), request).await
    }

    /// DELETE /messaging_profiles/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/messaging_profiles/{}", urlencoding::encode(id))
    }
}
