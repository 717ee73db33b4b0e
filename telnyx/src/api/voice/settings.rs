//! Settings groups shared by connections, applications and outbound profiles
//!
//! Every field is optional on the wire. Applications only send the subset of
//! inbound and outbound fields they manage; unset fields are left out of the
//! request body.

use crate::api::common::string_or_number;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtcpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_frequency_secs: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ani_number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnis_number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_routing_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_ringback_tone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isup_headers_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prack_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_zone_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_compact_headers_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_subdomain_receive_settings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_1xx_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_2xx_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shaken_stir_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ani_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ani_override_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_parking_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_ringback_tone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_ringback_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_authentication_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_authentication_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number::deserialize"
    )]
    pub outbound_voice_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t38_reinvite_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecording {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_recording_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_recording_caller_phone_numbers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_recording_channels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_recording_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let inbound = InboundSettings {
            channel_limit: Some(10),
            sip_subdomain: Some(String::new()),
            ..Default::default()
        };

        let json = serde_json::to_value(&inbound).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"channel_limit": 10, "sip_subdomain": ""})
        );
    }

    #[test]
    fn null_and_missing_fields_deserialize_to_none() {
        let outbound: OutboundSettings = serde_json::from_str(
            r#"{"ani_override":"","channel_limit":null,"outbound_voice_profile_id":1293384261075731461}"#,
        )
        .unwrap();

        assert_eq!(outbound.ani_override.as_deref(), Some(""));
        assert!(outbound.channel_limit.is_none());
        assert!(outbound.localization.is_none());
        assert_eq!(
            outbound.outbound_voice_profile_id.as_deref(),
            Some("1293384261075731461")
        );
    }
}
