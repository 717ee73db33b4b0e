//! Credential connections

use super::settings::{InboundSettings, OutboundSettings, RtcpSettings};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialConnection {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchorsite_override: Option<String>,
    pub connection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_on_hold_comfort_noise_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtmf_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode_contact_header_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onnet_t38_passthrough_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft_teams_sbc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_failover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_timeout_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtcp_settings: Option<RtcpSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<InboundSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<OutboundSettings>,
    #[serde(rename = "user_name", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_uri_calling_preference: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct CredentialConnectionsApi<'a> {
    client: &'a Client,
}

impl<'a> CredentialConnectionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /credential_connections
    pub async fn list(&self) -> Result<Vec<CredentialConnection>, ApiError> {
        self.client.get("/credential_connections").await
    }

    /// GET /credential_connections/{id}
    pub async fn get(&self, id: &str) -> Result<CredentialConnection, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /credential_connections
    pub async fn create(
        &self,
        connection: &CredentialConnection,
    ) -> Result<CredentialConnection, ApiError> {
        self.client.post("/credential_connections", connection).await
    }

    /// PATCH /credential_connections/{id}
    pub async fn update(
        &self,
        id: &str,
        connection: &CredentialConnection,
    ) -> Result<CredentialConnection, ApiError> {
        self.client.patch(&Self::path(id), connection).await
    }

    /// DELETE /credential_connections/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/credential_connections/{}", urlencoding::encode(id))
    }
}
