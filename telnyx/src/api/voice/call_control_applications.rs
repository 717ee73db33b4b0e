//! Call control applications

use super::settings::{InboundSettings, OutboundSettings};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallControlApplication {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub application_name: String,
    pub webhook_event_url: String,
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
    pub webhook_api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_failover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_timeout_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<InboundSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<OutboundSettings>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct CallControlApplicationsApi<'a> {
    client: &'a Client,
}

impl<'a> CallControlApplicationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /call_control_applications
    pub async fn list(&self) -> Result<Vec<CallControlApplication>, ApiError> {
        self.client.get("/call_control_applications").await
    }

    /// GET /call_control_applications/{id}
    pub async fn get(&self, id: &str) -> Result<CallControlApplication, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /call_control_applications
    pub async fn create(
        &self,
        application: &CallControlApplication,
    ) -> Result<CallControlApplication, ApiError> {
        self.client
            .post("/call_control_applications", application)
            .await
    }

    /// PATCH /call_control_applications/{id}
    pub async fn update(
        &self,
        id: &str,
        application: &CallControlApplication,
    ) -> Result<CallControlApplication, ApiError> {
        self.client.patch(&Self::path(id), application).await
    }

    /// DELETE /call_control_applications/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/call_control_applications/{}", urlencoding::encode(id))
    }
}
