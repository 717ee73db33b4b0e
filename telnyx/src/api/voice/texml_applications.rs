//! TeXML applications

use super::settings::{InboundSettings, OutboundSettings};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TexmlApplication {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub friendly_name: String,
    pub voice_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchorsite_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtmf_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_command_timeout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_command_timeout_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_fallback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_callback_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<InboundSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<OutboundSettings>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct TexmlApplicationsApi<'a> {
    client: &'a Client,
}

impl<'a> TexmlApplicationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /texml_applications
    pub async fn list(&self) -> Result<Vec<TexmlApplication>, ApiError> {
        self.client.get("/texml_applications").await
    }

    /// GET /texml_applications/{id}
    pub async fn get(&self, id: &str) -> Result<TexmlApplication, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /texml_applications
    pub async fn create(
        &self,
        application: &TexmlApplication,
    ) -> Result<TexmlApplication, ApiError> {
        self.client.post("/texml_applications", application).await
    }

    /// PATCH /texml_applications/{id}
    pub async fn update(
        &self,
        id: &str,
        application: &TexmlApplication,
    ) -> Result<TexmlApplication, ApiError> {
        self.client.patch(&Self::path(id), application).await
    }

    /// DELETE /texml_applications/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/texml_applications/{}", urlencoding::encode(id))
    }
}
