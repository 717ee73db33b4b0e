//! FQDN connections

use super::settings::{InboundSettings, OutboundSettings, RtcpSettings};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FqdnConnection {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchorsite_override: Option<String>,
    pub connection_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_on_hold_comfort_noise_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtmf_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode_contact_header_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onnet_t38_passthrough_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_push_credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_push_credential_id: Option<String>,
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
    /// Write-only; the API never returns it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_uri_calling_preference: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct FqdnConnectionsApi<'a> {
    client: &'a Client,
}

impl<'a> FqdnConnectionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /fqdn_connections
    pub async fn list(&self) -> Result<Vec<FqdnConnection>, ApiError> {
        self.client.get("/fqdn_connections").await
    }

    /// GET /fqdn_connections/{id}
    pub async fn get(&self, id: &str) -> Result<FqdnConnection, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /fqdn_connections
    pub async fn create(&self, connection: &FqdnConnection) -> Result<FqdnConnection, ApiError> {
        self.client.post("/fqdn_connections", connection).await
    }

    /// PATCH /fqdn_connections/{id}
    pub async fn update(
        &self,
        id: &str,
        connection: &FqdnConnection,
    ) -> Result<FqdnConnection, ApiError> {
        self.client.patch(&Self::path(id), connection).await
    }

    /// DELETE /fqdn_connections/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/fqdn_connections/{}", urlencoding::encode(id))
    }
}
