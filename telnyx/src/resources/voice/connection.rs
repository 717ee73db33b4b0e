//! Attributes shared by FQDN and credential connections

use crate::api::voice::{InboundSettings, OutboundSettings, RtcpSettings};
use crate::defaults::connection as defaults;
use crate::resources::settings::{
    connection_inbound_attribute, connection_inbound_from_state, connection_inbound_to_state,
    connection_outbound_attribute, connection_outbound_from_state, connection_outbound_to_state,
    rtcp_from_state, rtcp_settings_attribute, rtcp_to_state, INBOUND, OUTBOUND, RTCP_SETTINGS,
};
use crate::resources::state::{
    bool_or, i64_or, object_string, read_bool, read_i64, read_object, read_string, string_or,
    timestamp, Object,
};
use crate::resources::{id_attribute, timestamp_attributes};
use tfplug::defaults::StaticDefault;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::WholeNumber;

fn string_attr(name: &str, description: &str, default: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .default(StaticDefault::string(default))
        .build()
}

fn bool_attr(name: &str, description: &str, default: bool) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Bool)
        .description(description)
        .default(StaticDefault::bool(default))
        .build()
}

fn required(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .required()
        .build()
}

/// Credential connections require `active` and have no IP authentication
pub(crate) fn connection_attributes(
    active_required: bool,
    include_ip_auth: bool,
) -> Vec<Attribute> {
    let active = if active_required {
        AttributeBuilder::new("active", AttributeType::Bool)
            .description("Whether the connection accepts calls")
            .required()
            .build()
    } else {
        bool_attr(
            "active",
            "Whether the connection accepts calls",
            defaults::ACTIVE,
        )
    };

    let mut attributes = vec![
        id_attribute("Connection identifier"),
        required("connection_name", "Name of the connection"),
        required("username", "SIP username"),
        AttributeBuilder::new("password", AttributeType::String)
            .description("SIP password")
            .required()
            .sensitive()
            .build(),
        active,
        string_attr(
            "anchorsite_override",
            "Preferred media anchor site, or Latency",
            defaults::ANCHORSITE_OVERRIDE,
        ),
        bool_attr(
            "default_on_hold_comfort_noise_enabled",
            "Play comfort noise while a call is on hold",
            defaults::DEFAULT_ON_HOLD_COMFORT_NOISE_ENABLED,
        ),
        string_attr(
            "dtmf_type",
            "DTMF mode: RFC 2833, Inband or SIP INFO",
            defaults::DTMF_TYPE,
        ),
        bool_attr(
            "encode_contact_header_enabled",
            "Encode the SIP Contact header",
            defaults::ENCODE_CONTACT_HEADER_ENABLED,
        ),
        bool_attr(
            "onnet_t38_passthrough_enabled",
            "Pass T.38 through for on-net calls",
            defaults::ONNET_T38_PASSTHROUGH_ENABLED,
        ),
        bool_attr(
            "microsoft_teams_sbc",
            "Connection is a Microsoft Teams SBC",
            defaults::MICROSOFT_TEAMS_SBC,
        ),
        string_attr(
            "webhook_event_url",
            "URL that receives call webhooks",
            defaults::WEBHOOK_EVENT_URL,
        ),
        string_attr(
            "webhook_event_failover_url",
            "Failover URL for call webhooks",
            defaults::WEBHOOK_EVENT_FAILOVER_URL,
        ),
        string_attr(
            "webhook_api_version",
            "Webhook payload version",
            defaults::WEBHOOK_API_VERSION,
        ),
        AttributeBuilder::new("webhook_timeout_secs", AttributeType::Number)
            .description("Seconds to wait for a webhook response")
            .default(StaticDefault::number(defaults::WEBHOOK_TIMEOUT_SECS as f64))
            .validator(WholeNumber::create())
            .build(),
        string_attr(
            "sip_uri_calling_preference",
            "Who may call this connection by SIP URI",
            defaults::SIP_URI_CALLING_PREFERENCE,
        ),
        rtcp_settings_attribute(),
        connection_inbound_attribute(),
        connection_outbound_attribute(include_ip_auth),
    ];
    attributes.extend(timestamp_attributes());
    attributes
}

/// Flat and nested settings common to both connection kinds
#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectionFields {
    pub id: String,
    pub active: Option<bool>,
    pub anchorsite_override: Option<String>,
    pub connection_name: String,
    pub default_on_hold_comfort_noise_enabled: Option<bool>,
    pub dtmf_type: Option<String>,
    pub encode_contact_header_enabled: Option<bool>,
    pub onnet_t38_passthrough_enabled: Option<bool>,
    pub microsoft_teams_sbc: Option<bool>,
    pub webhook_event_url: Option<String>,
    pub webhook_event_failover_url: Option<String>,
    pub webhook_api_version: Option<String>,
    pub webhook_timeout_secs: Option<i64>,
    pub rtcp_settings: Option<RtcpSettings>,
    pub inbound: Option<InboundSettings>,
    pub outbound: Option<OutboundSettings>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sip_uri_calling_preference: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ConnectionFields {
    pub fn from_state(state: &DynamicValue, include_ip_auth: bool) -> Result<Self, Diagnostic> {
        let connection_name = read_string(state, "connection_name").ok_or_else(|| {
            Diagnostic::error(
                "Missing connection_name",
                "The 'connection_name' attribute is required",
            )
            .with_attribute(AttributePath::new("connection_name"))
        })?;

        Ok(Self {
            id: String::new(),
            active: read_bool(state, "active"),
            anchorsite_override: read_string(state, "anchorsite_override"),
            connection_name,
            default_on_hold_comfort_noise_enabled: read_bool(
                state,
                "default_on_hold_comfort_noise_enabled",
            ),
            dtmf_type: read_string(state, "dtmf_type"),
            encode_contact_header_enabled: read_bool(state, "encode_contact_header_enabled"),
            onnet_t38_passthrough_enabled: read_bool(state, "onnet_t38_passthrough_enabled"),
            microsoft_teams_sbc: read_bool(state, "microsoft_teams_sbc"),
            webhook_event_url: read_string(state, "webhook_event_url"),
            webhook_event_failover_url: read_string(state, "webhook_event_failover_url"),
            webhook_api_version: read_string(state, "webhook_api_version"),
            webhook_timeout_secs: read_i64(state, "webhook_timeout_secs"),
            rtcp_settings: Some(rtcp_from_state(state)),
            inbound: Some(connection_inbound_from_state(state)),
            outbound: Some(connection_outbound_from_state(state, include_ip_auth)),
            username: read_string(state, "username"),
            password: read_string(state, "password"),
            sip_uri_calling_preference: read_string(state, "sip_uri_calling_preference"),
            created_at: None,
            updated_at: None,
        })
    }

    /// `known` is the plan or prior state, consulted for the password and
    /// the IP authentication token which the API does not echo
    pub fn to_state(&self, include_ip_auth: bool, known: &DynamicValue) -> Object {
        let known_token = object_string(&read_object(known, OUTBOUND), "ip_authentication_token");
        let password = self
            .password
            .clone()
            .or_else(|| read_string(known, "password"));

        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(self.id.as_str()));
        state.insert(
            "connection_name".into(),
            Dynamic::from(self.connection_name.as_str()),
        );
        state.insert("username".into(), Dynamic::from(self.username.clone()));
        state.insert("password".into(), Dynamic::from(password));
        state.insert("active".into(), bool_or(self.active, defaults::ACTIVE));
        state.insert(
            "anchorsite_override".into(),
            string_or(
                self.anchorsite_override.as_deref(),
                defaults::ANCHORSITE_OVERRIDE,
            ),
        );
        state.insert(
            "default_on_hold_comfort_noise_enabled".into(),
            bool_or(
                self.default_on_hold_comfort_noise_enabled,
                defaults::DEFAULT_ON_HOLD_COMFORT_NOISE_ENABLED,
            ),
        );
        state.insert(
            "dtmf_type".into(),
            string_or(self.dtmf_type.as_deref(), defaults::DTMF_TYPE),
        );
        state.insert(
            "encode_contact_header_enabled".into(),
            bool_or(
                self.encode_contact_header_enabled,
                defaults::ENCODE_CONTACT_HEADER_ENABLED,
            ),
        );
        state.insert(
            "onnet_t38_passthrough_enabled".into(),
            bool_or(
                self.onnet_t38_passthrough_enabled,
                defaults::ONNET_T38_PASSTHROUGH_ENABLED,
            ),
        );
        state.insert(
            "microsoft_teams_sbc".into(),
            bool_or(self.microsoft_teams_sbc, defaults::MICROSOFT_TEAMS_SBC),
        );
        state.insert(
            "webhook_event_url".into(),
            string_or(
                self.webhook_event_url.as_deref(),
                defaults::WEBHOOK_EVENT_URL,
            ),
        );
        state.insert(
            "webhook_event_failover_url".into(),
            string_or(
                self.webhook_event_failover_url.as_deref(),
                defaults::WEBHOOK_EVENT_FAILOVER_URL,
            ),
        );
        state.insert(
            "webhook_api_version".into(),
            string_or(
                self.webhook_api_version.as_deref(),
                defaults::WEBHOOK_API_VERSION,
            ),
        );
        state.insert(
            "webhook_timeout_secs".into(),
            i64_or(self.webhook_timeout_secs, defaults::WEBHOOK_TIMEOUT_SECS),
        );
        state.insert(
            "sip_uri_calling_preference".into(),
            string_or(
                self.sip_uri_calling_preference.as_deref(),
                defaults::SIP_URI_CALLING_PREFERENCE,
            ),
        );
        state.insert(
            RTCP_SETTINGS.into(),
            rtcp_to_state(self.rtcp_settings.as_ref()),
        );
        state.insert(
            INBOUND.into(),
            connection_inbound_to_state(self.inbound.as_ref()),
        );
        state.insert(
            OUTBOUND.into(),
            connection_outbound_to_state(self.outbound.as_ref(), include_ip_auth, known_token),
        );
        state.insert("created_at".into(), timestamp(self.created_at.as_deref()));
        state.insert("updated_at".into(), timestamp(self.updated_at.as_deref()));
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::state::into_state;

    #[test]
    fn credential_schema_requires_active() {
        let attributes = connection_attributes(true, false);
        let active = attributes.iter().find(|a| a.name == "active").unwrap();
        assert!(active.required);
        assert!(active.default.is_none());

        let attributes = connection_attributes(false, true);
        let active = attributes.iter().find(|a| a.name == "active").unwrap();
        assert!(!active.required && active.default.is_some());
        let password = attributes.iter().find(|a| a.name == "password").unwrap();
        assert!(password.required && password.sensitive);
    }

    #[test]
    fn secrets_are_kept_from_known_state() {
        let mut outbound = Object::new();
        outbound.insert("ip_authentication_token".into(), Dynamic::from("tok"));
        let mut known = Object::new();
        known.insert("password".into(), Dynamic::from("hunter2"));
        known.insert("outbound".into(), Dynamic::Map(outbound));
        let known = into_state(known);

        let returned = ConnectionFields {
            id: "1".to_string(),
            connection_name: "trunk".to_string(),
            username: Some("user".to_string()),
            ..Default::default()
        };
        let state = into_state(returned.to_state(true, &known));

        assert_eq!(
            state.get_string(&AttributePath::new("password")).unwrap(),
            "hunter2"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("outbound").attribute("ip_authentication_token"))
                .unwrap(),
            "tok"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("anchorsite_override"))
                .unwrap(),
            "Latency"
        );
    }
}
