//! Resource implementations

pub mod billing;
pub mod messaging;
pub mod numbers;
pub mod settings;
pub mod state;
pub mod voice;

pub use billing::BillingGroupResource;
pub use messaging::MessagingProfileResource;
pub use numbers::NumberOrderResource;
pub use voice::{
    CallControlApplicationResource, CredentialConnectionResource, FqdnConnectionResource,
    FqdnResource, OutboundVoiceProfileResource, TexmlApplicationResource,
};

use crate::api::ApiError;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

pub(crate) fn api_error(summary: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

pub(crate) fn missing_id(type_name: &str) -> Diagnostic {
    Diagnostic::error(
        "Missing resource ID",
        format!("{} state has no id", type_name),
    )
    .with_attribute(AttributePath::new("id"))
}

pub(crate) fn resource_id(state: &DynamicValue) -> Option<String> {
    state
        .get_string(&AttributePath::new("id"))
        .ok()
        .filter(|id| !id.is_empty())
}

/// Server-assigned ID, stable across plans
pub(crate) fn id_attribute(description: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

pub(crate) fn computed_string(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .computed()
        .build()
}

pub(crate) fn timestamp_attributes() -> [Attribute; 2] {
    [
        computed_string("created_at", "ISO 8601 creation timestamp"),
        computed_string("updated_at", "ISO 8601 last update timestamp"),
    ]
}
