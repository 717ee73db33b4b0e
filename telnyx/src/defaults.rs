//! Default values for optional attributes
//!
//! Schemas declare these as attribute defaults and the state conversion falls
//! back to them when the API omits a field, so both sides always agree.

pub const WEBHOOK_API_VERSION: &str = "2";
pub const ANCHORSITE_LATENCY: &str = "Latency";
pub const DTMF_RFC2833: &str = "RFC 2833";

pub mod messaging_profile {
    pub const WEBHOOK_FAILOVER_URL: &str = "";
    pub const WEBHOOK_API_VERSION: &str = super::WEBHOOK_API_VERSION;
    pub const WEBHOOK_API_VERSIONS: &[&str] = &["1", "2", "2010-04-01"];
    pub const WHITELISTED_DESTINATIONS: &[&str] = &["US"];
}

pub mod outbound_voice_profile {
    pub const TRAFFIC_TYPE: &str = "conversational";
    pub const SERVICE_PLAN: &str = "global";
    pub const CONCURRENT_CALL_LIMIT: i64 = 10;
    pub const ENABLED: bool = true;
    pub const TAGS: &[&str] = &[];
    pub const USAGE_PAYMENT_METHOD: &str = "rate-deck";
    pub const WHITELISTED_DESTINATIONS: &[&str] = &["US", "CA"];
    pub const MAX_DESTINATION_RATE: f64 = 10.0;
    pub const DAILY_SPEND_LIMIT: &str = "100.00";
    pub const DAILY_SPEND_LIMIT_ENABLED: bool = true;
}

pub mod call_recording {
    pub const TYPE: &str = "all";
    pub const CALLER_PHONE_NUMBERS: &[&str] = &[];
    pub const CHANNELS: &str = "single";
    pub const FORMAT: &str = "wav";
}

/// Shared by FQDN and credential connections
pub mod connection {
    pub const ACTIVE: bool = true;
    pub const ANCHORSITE_OVERRIDE: &str = super::ANCHORSITE_LATENCY;
    pub const TRANSPORT_PROTOCOL: &str = "UDP";
    pub const TRANSPORT_PROTOCOLS: &[&str] = &["UDP", "TCP", "TLS"];
    pub const DEFAULT_ON_HOLD_COMFORT_NOISE_ENABLED: bool = true;
    pub const DTMF_TYPE: &str = super::DTMF_RFC2833;
    pub const ENCODE_CONTACT_HEADER_ENABLED: bool = false;
    pub const ENCRYPTED_MEDIA: &str = "SRTP";
    pub const ONNET_T38_PASSTHROUGH_ENABLED: bool = false;
    pub const MICROSOFT_TEAMS_SBC: bool = false;
    pub const WEBHOOK_EVENT_URL: &str = "";
    pub const WEBHOOK_EVENT_FAILOVER_URL: &str = "";
    pub const WEBHOOK_API_VERSION: &str = super::WEBHOOK_API_VERSION;
    pub const WEBHOOK_TIMEOUT_SECS: i64 = 25;
    pub const SIP_URI_CALLING_PREFERENCE: &str = "";

    pub mod rtcp {
        pub const PORT: &str = "rtp+1";
        pub const CAPTURE_ENABLED: bool = false;
        pub const REPORT_FREQUENCY_SECS: i64 = 5;
    }

    pub mod inbound {
        pub const ANI_NUMBER_FORMAT: &str = "E.164-national";
        pub const DNIS_NUMBER_FORMAT: &str = "e164";
        pub const CODECS: &[&str] = &["G722", "G711U", "G711A", "G729", "OPUS", "H.264"];
        pub const DEFAULT_ROUTING_METHOD: &str = "sequential";
        pub const SIP_REGION: &str = "US";
        pub const SIP_SUBDOMAIN: &str = "";
        pub const SIP_SUBDOMAIN_RECEIVE_SETTINGS: &str = "only_my_connections";
    }

    pub mod outbound {
        pub const ANI_OVERRIDE: &str = "";
        pub const ANI_OVERRIDE_TYPE: &str = "always";
        pub const CALL_PARKING_ENABLED: bool = false;
        pub const IP_AUTHENTICATION_METHOD: &str = "token";
        pub const LOCALIZATION: &str = "US";
        pub const T38_REINVITE_SOURCE: &str = "customer";
    }
}

pub mod number_order {
    pub const MESSAGING_PROFILE_ID: &str = "";
}

pub mod call_control_application {
    pub const ACTIVE: bool = true;
    pub const ANCHORSITE_OVERRIDE: &str = super::ANCHORSITE_LATENCY;
    pub const DTMF_TYPE: &str = super::DTMF_RFC2833;
    pub const FIRST_COMMAND_TIMEOUT: bool = true;
    pub const FIRST_COMMAND_TIMEOUT_SECS: i64 = 10;
}

pub mod texml_application {
    pub const ACTIVE: bool = true;
    pub const ANCHORSITE_OVERRIDE: &str = "Amsterdam, Netherlands";
    pub const DTMF_TYPE: &str = "Inband";
    pub const FIRST_COMMAND_TIMEOUT: bool = true;
    pub const FIRST_COMMAND_TIMEOUT_SECS: i64 = 10;
    pub const VOICE_FALLBACK_URL: &str = "https://example.com/failover";
    pub const VOICE_METHOD: &str = "post";
    pub const STATUS_CALLBACK: &str = "https://example.com/status";
    pub const STATUS_CALLBACK_METHOD: &str = "post";
}

/// Inbound/outbound defaults for the application resources
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplicationSettingsDefaults {
    pub inbound_channel_limit: Option<i64>,
    pub inbound_shaken_stir_enabled: Option<bool>,
    pub inbound_sip_subdomain: &'static str,
    pub inbound_sip_subdomain_receive_settings: &'static str,
    pub outbound_channel_limit: Option<i64>,
    pub outbound_voice_profile_id: Option<&'static str>,
}

pub const CALL_CONTROL_SETTINGS: ApplicationSettingsDefaults = ApplicationSettingsDefaults {
    inbound_channel_limit: None,
    inbound_shaken_stir_enabled: None,
    inbound_sip_subdomain: "",
    inbound_sip_subdomain_receive_settings: "",
    outbound_channel_limit: None,
    outbound_voice_profile_id: Some(""),
};

pub const TEXML_SETTINGS: ApplicationSettingsDefaults = ApplicationSettingsDefaults {
    inbound_channel_limit: Some(10),
    inbound_shaken_stir_enabled: Some(true),
    inbound_sip_subdomain: "",
    inbound_sip_subdomain_receive_settings: "from_anyone",
    outbound_channel_limit: Some(10),
    outbound_voice_profile_id: None,
};
