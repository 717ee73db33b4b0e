//! Outbound voice profiles

use super::settings::CallRecording;
use crate::api::common::{number_or_string, string_or_number};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Outbound voice profile; read-only fields are never sent back
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundVoiceProfile {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number::deserialize"
    )]
    pub billing_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_call_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelisted_destinations: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number_or_string::deserialize"
    )]
    pub max_destination_rate: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number::deserialize"
    )]
    pub daily_spend_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_spend_limit_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_recording: Option<CallRecording>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct OutboundVoiceProfilesApi<'a> {
    client: &'a Client,
}

impl<'a> OutboundVoiceProfilesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /outbound_voice_profiles
    pub async fn list(&self) -> Result<Vec<OutboundVoiceProfile>, ApiError> {
        self.client.get("/outbound_voice_profiles").await
    }

    /// GET /outbound_voice_profiles/{id}
    pub async fn get(&self, id: &str) -> Result<OutboundVoiceProfile, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /outbound_voice_profiles
    pub async fn create(
        &self,
        profile: &OutboundVoiceProfile,
    ) -> Result<OutboundVoiceProfile, ApiError> {
        self.client.post("/outbound_voice_profiles", profile).await
    }

    /// PATCH /outbound_voice_profiles/{id}
    pub async fn update(
        &self,
        id: &str,
        profile: &OutboundVoiceProfile,
    ) -> Result<OutboundVoiceProfile, ApiError> {
        self.client.patch(&Self::path(id), profile).await
    }

    /// DELETE /outbound_voice_profiles/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/outbound_voice_profiles/{}", urlencoding::encode(id))
    }
}
