//! Nested settings groups: schema, state -> request, response -> state
//!
//! Connections (FQDN and credential) carry the full inbound/outbound groups
//! plus RTCP settings. Call control and TeXML applications only manage a
//! small subset of inbound/outbound fields, with per-resource defaults.
//! Outbound voice profiles carry the call recording group.
//!
//! Every `*_to_state` function writes every attribute of its group, falling
//! back to the schema default when the API omits a field.

use super::state::{
    bool_or, i64_or, object_bool, object_i64, object_string, object_strings, optional_bool,
    optional_i64, optional_string, read_object, string_or, strings_or, Object,
};
use crate::api::voice::{CallRecording, InboundSettings, OutboundSettings, RtcpSettings};
use crate::defaults::{self, ApplicationSettingsDefaults};
use std::collections::HashMap;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{Dynamic, DynamicValue};
use tfplug::validator::WholeNumber;

pub const RTCP_SETTINGS: &str = "rtcp_settings";
pub const INBOUND: &str = "inbound";
pub const OUTBOUND: &str = "outbound";
pub const CALL_RECORDING: &str = "call_recording";

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

fn number_attr(name: &str, description: &str, default: i64) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Number)
        .description(description)
        .default(StaticDefault::number(default as f64))
        .validator(WholeNumber::create())
        .build()
}

/// Optional with no default; computed so the API value sticks
fn optional_attr(name: &str, type_: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, type_)
        .description(description)
        .optional()
        .computed()
        .build()
}

fn optional_number_attr(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Number)
        .description(description)
        .optional()
        .computed()
        .validator(WholeNumber::create())
        .build()
}

fn group(name: &str, description: &str, attributes: Vec<Attribute>) -> Attribute {
    AttributeBuilder::single_nested(name, attributes)
        .description(description)
        .default(StaticDefault::object(HashMap::new()))
        .build()
}

// RTCP

pub fn rtcp_settings_attribute() -> Attribute {
    use defaults::connection::rtcp;
    group(
        RTCP_SETTINGS,
        "RTCP settings",
        vec![
            string_attr("port", "RTCP port: rtcp-mux, rtp+1 or rtp-1", rtcp::PORT),
            bool_attr(
                "capture_enabled",
                "Whether RTCP capture is enabled",
                rtcp::CAPTURE_ENABLED,
            ),
            number_attr(
                "report_frequency_secs",
                "RTCP report frequency in seconds",
                rtcp::REPORT_FREQUENCY_SECS,
            ),
        ],
    )
}

pub fn rtcp_from_state(state: &DynamicValue) -> RtcpSettings {
    let object = read_object(state, RTCP_SETTINGS);
    RtcpSettings {
        port: object_string(&object, "port"),
        capture_enabled: object_bool(&object, "capture_enabled"),
        report_frequency_secs: object_i64(&object, "report_frequency_secs"),
    }
}

pub fn rtcp_to_state(settings: Option<&RtcpSettings>) -> Dynamic {
    use defaults::connection::rtcp;
    let default = RtcpSettings::default();
    let s = settings.unwrap_or(&default);

    let mut object = Object::new();
    object.insert("port".into(), string_or(s.port.as_deref(), rtcp::PORT));
    object.insert(
        "capture_enabled".into(),
        bool_or(s.capture_enabled, rtcp::CAPTURE_ENABLED),
    );
    object.insert(
        "report_frequency_secs".into(),
        i64_or(s.report_frequency_secs, rtcp::REPORT_FREQUENCY_SECS),
    );
    Dynamic::Map(object)
}

// Connection inbound

const CONNECTION_INBOUND_OPTIONAL_BOOLS: &[&str] = &[
    "generate_ringback_tone",
    "isup_headers_enabled",
    "prack_enabled",
    "privacy_zone_enabled",
    "sip_compact_headers_enabled",
    "shaken_stir_enabled",
];

pub fn connection_inbound_attribute() -> Attribute {
    use defaults::connection::inbound;
    let mut attributes = vec![
        string_attr(
            "ani_number_format",
            "ANI number format",
            inbound::ANI_NUMBER_FORMAT,
        ),
        string_attr(
            "dnis_number_format",
            "DNIS number format",
            inbound::DNIS_NUMBER_FORMAT,
        ),
        AttributeBuilder::new("codecs", AttributeType::List(Box::new(AttributeType::String)))
            .description("Codecs offered on inbound calls, in preference order")
            .default(StaticDefault::string_list(inbound::CODECS))
            .build(),
        string_attr(
            "default_routing_method",
            "Default routing method: sequential or round-robin",
            inbound::DEFAULT_ROUTING_METHOD,
        ),
        string_attr("sip_region", "SIP region", inbound::SIP_REGION),
        string_attr("sip_subdomain", "SIP subdomain", inbound::SIP_SUBDOMAIN),
        string_attr(
            "sip_subdomain_receive_settings",
            "Who may call the SIP subdomain",
            inbound::SIP_SUBDOMAIN_RECEIVE_SETTINGS,
        ),
        optional_number_attr("channel_limit", "Maximum concurrent inbound calls"),
        optional_number_attr("timeout_1xx_secs", "Seconds to wait for a 1xx response"),
        optional_number_attr("timeout_2xx_secs", "Seconds to wait for a 2xx response"),
    ];
    attributes.extend(
        CONNECTION_INBOUND_OPTIONAL_BOOLS
            .iter()
            .map(|name| optional_attr(name, AttributeType::Bool, name)),
    );

    group(INBOUND, "Inbound call settings", attributes)
}

pub fn connection_inbound_from_state(state: &DynamicValue) -> InboundSettings {
    let object = read_object(state, INBOUND);
    InboundSettings {
        ani_number_format: object_string(&object, "ani_number_format"),
        dnis_number_format: object_string(&object, "dnis_number_format"),
        codecs: object_strings(&object, "codecs"),
        default_routing_method: object_string(&object, "default_routing_method"),
        channel_limit: object_i64(&object, "channel_limit"),
        generate_ringback_tone: object_bool(&object, "generate_ringback_tone"),
        isup_headers_enabled: object_bool(&object, "isup_headers_enabled"),
        prack_enabled: object_bool(&object, "prack_enabled"),
        privacy_zone_enabled: object_bool(&object, "privacy_zone_enabled"),
        sip_compact_headers_enabled: object_bool(&object, "sip_compact_headers_enabled"),
        sip_region: object_string(&object, "sip_region"),
        sip_subdomain: object_string(&object, "sip_subdomain"),
        sip_subdomain_receive_settings: object_string(&object, "sip_subdomain_receive_settings"),
        timeout_1xx_secs: object_i64(&object, "timeout_1xx_secs"),
        timeout_2xx_secs: object_i64(&object, "timeout_2xx_secs"),
        shaken_stir_enabled: object_bool(&object, "shaken_stir_enabled"),
    }
}

pub fn connection_inbound_to_state(settings: Option<&InboundSettings>) -> Dynamic {
    use defaults::connection::inbound;
    let default = InboundSettings::default();
    let s = settings.unwrap_or(&default);

    let mut object = Object::new();
    object.insert(
        "ani_number_format".into(),
        string_or(s.ani_number_format.as_deref(), inbound::ANI_NUMBER_FORMAT),
    );
    object.insert(
        "dnis_number_format".into(),
        string_or(s.dnis_number_format.as_deref(), inbound::DNIS_NUMBER_FORMAT),
    );
    object.insert(
        "codecs".into(),
        strings_or(s.codecs.as_deref(), inbound::CODECS),
    );
    object.insert(
        "default_routing_method".into(),
        string_or(
            s.default_routing_method.as_deref(),
            inbound::DEFAULT_ROUTING_METHOD,
        ),
    );
    object.insert(
        "sip_region".into(),
        string_or(s.sip_region.as_deref(), inbound::SIP_REGION),
    );
    object.insert(
        "sip_subdomain".into(),
        string_or(s.sip_subdomain.as_deref(), inbound::SIP_SUBDOMAIN),
    );
    object.insert(
        "sip_subdomain_receive_settings".into(),
        string_or(
            s.sip_subdomain_receive_settings.as_deref(),
            inbound::SIP_SUBDOMAIN_RECEIVE_SETTINGS,
        ),
    );
    object.insert("channel_limit".into(), optional_i64(s.channel_limit));
    object.insert("timeout_1xx_secs".into(), optional_i64(s.timeout_1xx_secs));
    object.insert("timeout_2xx_secs".into(), optional_i64(s.timeout_2xx_secs));
    object.insert(
        "generate_ringback_tone".into(),
        Dynamic::from(s.generate_ringback_tone),
    );
    object.insert(
        "isup_headers_enabled".into(),
        Dynamic::from(s.isup_headers_enabled),
    );
    object.insert("prack_enabled".into(), Dynamic::from(s.prack_enabled));
    object.insert(
        "privacy_zone_enabled".into(),
        Dynamic::from(s.privacy_zone_enabled),
    );
    object.insert(
        "sip_compact_headers_enabled".into(),
        Dynamic::from(s.sip_compact_headers_enabled),
    );
    object.insert(
        "shaken_stir_enabled".into(),
        Dynamic::from(s.shaken_stir_enabled),
    );
    Dynamic::Map(object)
}

// Connection outbound

/// `include_ip_auth` is false for credential connections, which
/// authenticate with username/password only
pub fn connection_outbound_attribute(include_ip_auth: bool) -> Attribute {
    use defaults::connection::outbound;
    let mut attributes = vec![
        string_attr("ani_override", "ANI override", outbound::ANI_OVERRIDE),
        string_attr(
            "ani_override_type",
            "When to apply the ANI override",
            outbound::ANI_OVERRIDE_TYPE,
        ),
        bool_attr(
            "call_parking_enabled",
            "Whether call parking is enabled",
            outbound::CALL_PARKING_ENABLED,
        ),
        string_attr("localization", "Number localization", outbound::LOCALIZATION),
        string_attr(
            "t38_reinvite_source",
            "Which side sends T.38 re-INVITEs",
            outbound::T38_REINVITE_SOURCE,
        ),
        optional_number_attr("channel_limit", "Maximum concurrent outbound calls"),
        optional_attr(
            "generate_ringback_tone",
            AttributeType::Bool,
            "Generate ringback tone",
        ),
        optional_attr(
            "instant_ringback_enabled",
            AttributeType::Bool,
            "Play ringback immediately",
        ),
        optional_attr(
            "outbound_voice_profile_id",
            AttributeType::String,
            "Outbound voice profile used for outbound calls",
        ),
    ];

    if include_ip_auth {
        attributes.push(string_attr(
            "ip_authentication_method",
            "IP authentication method",
            outbound::IP_AUTHENTICATION_METHOD,
        ));
        attributes.push(
            AttributeBuilder::new("ip_authentication_token", AttributeType::String)
                .description("Token for token-based IP authentication")
                .optional()
                .computed()
                .sensitive()
                .build(),
        );
    }

    group(OUTBOUND, "Outbound call settings", attributes)
}

pub fn connection_outbound_from_state(
    state: &DynamicValue,
    include_ip_auth: bool,
) -> OutboundSettings {
    let object = read_object(state, OUTBOUND);
    let mut settings = OutboundSettings {
        ani_override: object_string(&object, "ani_override"),
        ani_override_type: object_string(&object, "ani_override_type"),
        call_parking_enabled: object_bool(&object, "call_parking_enabled"),
        channel_limit: object_i64(&object, "channel_limit"),
        generate_ringback_tone: object_bool(&object, "generate_ringback_tone"),
        instant_ringback_enabled: object_bool(&object, "instant_ringback_enabled"),
        localization: object_string(&object, "localization"),
        outbound_voice_profile_id: object_string(&object, "outbound_voice_profile_id"),
        t38_reinvite_source: object_string(&object, "t38_reinvite_source"),
        ..Default::default()
    };

    if include_ip_auth {
        settings.ip_authentication_method = object_string(&object, "ip_authentication_method");
        settings.ip_authentication_token = object_string(&object, "ip_authentication_token");
    }

    settings
}

/// `known_token` is the token from plan or prior state, kept when the API
/// does not echo it
pub fn connection_outbound_to_state(
    settings: Option<&OutboundSettings>,
    include_ip_auth: bool,
    known_token: Option<String>,
) -> Dynamic {
    use defaults::connection::outbound;
    let default = OutboundSettings::default();
    let s = settings.unwrap_or(&default);

    let mut object = Object::new();
    object.insert(
        "ani_override".into(),
        string_or(s.ani_override.as_deref(), outbound::ANI_OVERRIDE),
    );
    object.insert(
        "ani_override_type".into(),
        string_or(s.ani_override_type.as_deref(), outbound::ANI_OVERRIDE_TYPE),
    );
    object.insert(
        "call_parking_enabled".into(),
        bool_or(s.call_parking_enabled, outbound::CALL_PARKING_ENABLED),
    );
    object.insert(
        "localization".into(),
        string_or(s.localization.as_deref(), outbound::LOCALIZATION),
    );
    object.insert(
        "t38_reinvite_source".into(),
        string_or(
            s.t38_reinvite_source.as_deref(),
            outbound::T38_REINVITE_SOURCE,
        ),
    );
    object.insert("channel_limit".into(), optional_i64(s.channel_limit));
    object.insert(
        "generate_ringback_tone".into(),
        Dynamic::from(s.generate_ringback_tone),
    );
    object.insert(
        "instant_ringback_enabled".into(),
        Dynamic::from(s.instant_ringback_enabled),
    );
    object.insert(
        "outbound_voice_profile_id".into(),
        optional_string(s.outbound_voice_profile_id.as_deref()),
    );

    if include_ip_auth {
        object.insert(
            "ip_authentication_method".into(),
            string_or(
                s.ip_authentication_method.as_deref(),
                outbound::IP_AUTHENTICATION_METHOD,
            ),
        );
        object.insert(
            "ip_authentication_token".into(),
            Dynamic::from(s.ip_authentication_token.clone().or(known_token)),
        );
    }

    Dynamic::Map(object)
}

// Application inbound/outbound

fn string_attr_opt(name: &str, description: &str, default: Option<&str>) -> Attribute {
    match default {
        Some(value) => string_attr(name, description, value),
        None => optional_attr(name, AttributeType::String, description),
    }
}

fn bool_attr_opt(name: &str, description: &str, default: Option<bool>) -> Attribute {
    match default {
        Some(value) => bool_attr(name, description, value),
        None => optional_attr(name, AttributeType::Bool, description),
    }
}

fn number_attr_opt(name: &str, description: &str, default: Option<i64>) -> Attribute {
    match default {
        Some(value) => number_attr(name, description, value),
        None => optional_number_attr(name, description),
    }
}

pub fn application_inbound_attribute(defaults: &ApplicationSettingsDefaults) -> Attribute {
    group(
        INBOUND,
        "Inbound call settings",
        vec![
            number_attr_opt(
                "channel_limit",
                "Maximum concurrent inbound calls",
                defaults.inbound_channel_limit,
            ),
            bool_attr_opt(
                "shaken_stir_enabled",
                "Whether SHAKEN/STIR headers are added to inbound calls",
                defaults.inbound_shaken_stir_enabled,
            ),
            string_attr("sip_subdomain", "SIP subdomain", defaults.inbound_sip_subdomain),
            string_attr(
                "sip_subdomain_receive_settings",
                "Who may call the SIP subdomain",
                defaults.inbound_sip_subdomain_receive_settings,
            ),
        ],
    )
}

pub fn application_inbound_from_state(state: &DynamicValue) -> InboundSettings {
    let object = read_object(state, INBOUND);
    InboundSettings {
        channel_limit: object_i64(&object, "channel_limit"),
        shaken_stir_enabled: object_bool(&object, "shaken_stir_enabled"),
        sip_subdomain: object_string(&object, "sip_subdomain"),
        sip_subdomain_receive_settings: object_string(&object, "sip_subdomain_receive_settings"),
        ..Default::default()
    }
}

pub fn application_inbound_to_state(
    settings: Option<&InboundSettings>,
    defaults: &ApplicationSettingsDefaults,
) -> Dynamic {
    let default = InboundSettings::default();
    let s = settings.unwrap_or(&default);

    let mut object = Object::new();
    object.insert(
        "channel_limit".into(),
        optional_i64(s.channel_limit.or(defaults.inbound_channel_limit)),
    );
    object.insert(
        "shaken_stir_enabled".into(),
        optional_bool(s.shaken_stir_enabled.or(defaults.inbound_shaken_stir_enabled)),
    );
    object.insert(
        "sip_subdomain".into(),
        string_or(s.sip_subdomain.as_deref(), defaults.inbound_sip_subdomain),
    );
    object.insert(
        "sip_subdomain_receive_settings".into(),
        string_or(
            s.sip_subdomain_receive_settings.as_deref(),
            defaults.inbound_sip_subdomain_receive_settings,
        ),
    );
    Dynamic::Map(object)
}

pub fn application_outbound_attribute(defaults: &ApplicationSettingsDefaults) -> Attribute {
    group(
        OUTBOUND,
        "Outbound call settings",
        vec![
            number_attr_opt(
                "channel_limit",
                "Maximum concurrent outbound calls",
                defaults.outbound_channel_limit,
            ),
            string_attr_opt(
                "outbound_voice_profile_id",
                "Outbound voice profile used for outbound calls",
                defaults.outbound_voice_profile_id,
            ),
        ],
    )
}

pub fn application_outbound_from_state(state: &DynamicValue) -> OutboundSettings {
    let object = read_object(state, OUTBOUND);
    OutboundSettings {
        channel_limit: object_i64(&object, "channel_limit"),
        outbound_voice_profile_id: object_string(&object, "outbound_voice_profile_id"),
        ..Default::default()
    }
}

pub fn application_outbound_to_state(
    settings: Option<&OutboundSettings>,
    defaults: &ApplicationSettingsDefaults,
) -> Dynamic {
    let default = OutboundSettings::default();
    let s = settings.unwrap_or(&default);

    let mut object = Object::new();
    object.insert(
        "channel_limit".into(),
        optional_i64(s.channel_limit.or(defaults.outbound_channel_limit)),
    );
    object.insert(
        "outbound_voice_profile_id".into(),
        optional_string(
            s.outbound_voice_profile_id
                .as_deref()
                .or(defaults.outbound_voice_profile_id),
        ),
    );
    Dynamic::Map(object)
}

// Call recording

pub fn call_recording_attribute() -> Attribute {
    use defaults::call_recording;
    group(
        CALL_RECORDING,
        "Call recording settings",
        vec![
            string_attr(
                "call_recording_type",
                "Which calls to record: all, none or by_caller_phone_number",
                call_recording::TYPE,
            ),
            AttributeBuilder::new(
                "call_recording_caller_phone_numbers",
                AttributeType::List(Box::new(AttributeType::String)),
            )
            .description("Caller numbers to record when recording by caller")
            .default(StaticDefault::string_list(
                call_recording::CALLER_PHONE_NUMBERS,
            ))
            .build(),
            string_attr(
                "call_recording_channels",
                "single or dual channel recordings",
                call_recording::CHANNELS,
            ),
            string_attr(
                "call_recording_format",
                "Recording file format: wav or mp3",
                call_recording::FORMAT,
            ),
        ],
    )
}

pub fn call_recording_from_state(state: &DynamicValue) -> CallRecording {
    let object = read_object(state, CALL_RECORDING);
    CallRecording {
        call_recording_type: object_string(&object, "call_recording_type"),
        call_recording_caller_phone_numbers: object_strings(
            &object,
            "call_recording_caller_phone_numbers",
        ),
        call_recording_channels: object_string(&object, "call_recording_channels"),
        call_recording_format: object_string(&object, "call_recording_format"),
    }
}

pub fn call_recording_to_state(recording: Option<&CallRecording>) -> Dynamic {
    use defaults::call_recording;
    let default = CallRecording::default();
    let r = recording.unwrap_or(&default);

    let mut object = Object::new();
    object.insert(
        "call_recording_type".into(),
        string_or(r.call_recording_type.as_deref(), call_recording::TYPE),
    );
    object.insert(
        "call_recording_caller_phone_numbers".into(),
        strings_or(
            r.call_recording_caller_phone_numbers.as_deref(),
            call_recording::CALLER_PHONE_NUMBERS,
        ),
    );
    object.insert(
        "call_recording_channels".into(),
        string_or(r.call_recording_channels.as_deref(), call_recording::CHANNELS),
    );
    object.insert(
        "call_recording_format".into(),
        string_or(r.call_recording_format.as_deref(), call_recording::FORMAT),
    );
    Dynamic::Map(object)
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
