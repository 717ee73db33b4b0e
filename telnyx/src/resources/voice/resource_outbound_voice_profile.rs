//! Outbound voice profile resource implementation

use crate::api::voice::outbound_voice_profiles::OutboundVoiceProfile;
use crate::defaults::outbound_voice_profile as defaults;
use crate::resources::settings::{
    call_recording_attribute, call_recording_from_state, call_recording_to_state,
    CALL_RECORDING,
};
use crate::resources::state::{
    bool_or, i64_or, into_state, read_bool, read_i64, read_number, read_string, read_strings,
    string_or, strings_or, timestamp, Object,
};
use crate::resources::{
    api_error, id_attribute, missing_id, not_configured, resource_id, timestamp_attributes,
};
use crate::TelnyxProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::WholeNumber;

#[derive(Default)]
pub struct OutboundVoiceProfileResource {
    provider_data: Option<TelnyxProviderData>,
}

impl OutboundVoiceProfileResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

#[async_trait]
impl Resource for OutboundVoiceProfileResource {
    fn type_name(&self) -> &str {
        "telnyx_outbound_voice_profile"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a Telnyx outbound voice profile")
            .attribute(id_attribute("Outbound voice profile identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the outbound voice profile")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("billing_group_id", AttributeType::String)
                    .description("Billing group charged for calls on this profile")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("traffic_type", AttributeType::String)
                    .description("Traffic type: conversational or short_duration")
                    .default(StaticDefault::string(defaults::TRAFFIC_TYPE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("service_plan", AttributeType::String)
                    .description("Service plan: global, us or international")
                    .default(StaticDefault::string(defaults::SERVICE_PLAN))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("concurrent_call_limit", AttributeType::Number)
                    .description("Maximum concurrent outbound calls")
                    .default(StaticDefault::number(
                        defaults::CONCURRENT_CALL_LIMIT as f64,
                    ))
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the profile can place calls")
                    .default(StaticDefault::bool(defaults::ENABLED))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tags", string_list())
                    .description("Tags attached to the profile")
                    .default(StaticDefault::string_list(defaults::TAGS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("usage_payment_method", AttributeType::String)
                    .description("How usage is billed: rate-deck or tariff")
                    .default(StaticDefault::string(defaults::USAGE_PAYMENT_METHOD))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("whitelisted_destinations", string_list())
                    .description("ISO country codes that may be dialled")
                    .default(StaticDefault::string_list(
                        defaults::WHITELISTED_DESTINATIONS,
                    ))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_destination_rate", AttributeType::Number)
                    .description("Maximum per-minute rate for a destination")
                    .default(StaticDefault::number(defaults::MAX_DESTINATION_RATE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("daily_spend_limit", AttributeType::String)
                    .description("Daily spend limit in USD, as a decimal string")
                    .default(StaticDefault::string(defaults::DAILY_SPEND_LIMIT))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("daily_spend_limit_enabled", AttributeType::Bool)
                    .description("Whether the daily spend limit is enforced")
                    .default(StaticDefault::bool(defaults::DAILY_SPEND_LIMIT_ENABLED))
                    .build(),
            )
            .attribute(call_recording_attribute())
            .attributes(timestamp_attributes())
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(limit) = read_string(&request.config, "daily_spend_limit") {
            if limit.parse::<f64>().is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid daily spend limit",
                        format!("'{}' is not a decimal amount", limit),
                    )
                    .with_attribute(AttributePath::new("daily_spend_limit")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        };

        let profile = match self.extract_profile(&request.planned_state) {
            Ok(profile) => profile,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        match provider_data
            .client
            .voice()
            .outbound_voice_profiles()
            .create(&profile)
            .await
        {
            Ok(created) => {
                tracing::info!("Created outbound voice profile {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_profile(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create outbound voice profile", &e));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(id) = resource_id(&request.current_state) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
            };
        };

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            };
        };

        match provider_data
            .client
            .voice()
            .outbound_voice_profiles()
            .get(&id)
            .await
        {
            Ok(profile) => ReadResourceResponse {
                new_state: Some(Self::state_from_profile(&profile)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Outbound voice profile {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read outbound voice profile", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let Some(id) = resource_id(&request.prior_state) else {
            diagnostics.push(missing_id(self.type_name()));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        };

        let profile = match self.extract_profile(&request.planned_state) {
            Ok(profile) => profile,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        match provider_data
            .client
            .voice()
            .outbound_voice_profiles()
            .update(&id, &profile)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_profile(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update outbound voice profile", &e));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let Some(id) = resource_id(&request.prior_state) else {
            return DeleteResourceResponse { diagnostics };
        };

        match provider_data
            .client
            .voice()
            .outbound_voice_profiles()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Outbound voice profile {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete outbound voice profile", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl OutboundVoiceProfileResource {
    fn extract_profile(&self, state: &DynamicValue) -> Result<OutboundVoiceProfile, Diagnostic> {
        let name = read_string(state, "name").ok_or_else(|| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
                .with_attribute(AttributePath::new("name"))
        })?;

        Ok(OutboundVoiceProfile {
            name,
            billing_group_id: read_string(state, "billing_group_id"),
            traffic_type: read_string(state, "traffic_type"),
            service_plan: read_string(state, "service_plan"),
            concurrent_call_limit: read_i64(state, "concurrent_call_limit"),
            enabled: read_bool(state, "enabled"),
            tags: read_strings(state, "tags"),
            usage_payment_method: read_string(state, "usage_payment_method"),
            whitelisted_destinations: read_strings(state, "whitelisted_destinations"),
            max_destination_rate: read_number(state, "max_destination_rate"),
            daily_spend_limit: read_string(state, "daily_spend_limit"),
            daily_spend_limit_enabled: read_bool(state, "daily_spend_limit_enabled"),
            call_recording: Some(call_recording_from_state(state)),
            ..Default::default()
        })
    }

    fn state_from_profile(profile: &OutboundVoiceProfile) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(profile.id.as_str()));
        state.insert("name".into(), Dynamic::from(profile.name.as_str()));
        state.insert(
            "billing_group_id".into(),
            Dynamic::from(profile.billing_group_id.clone()),
        );
        state.insert(
            "traffic_type".into(),
            string_or(profile.traffic_type.as_deref(), defaults::TRAFFIC_TYPE),
        );
        state.insert(
            "service_plan".into(),
            string_or(profile.service_plan.as_deref(), defaults::SERVICE_PLAN),
        );
        state.insert(
            "concurrent_call_limit".into(),
            i64_or(profile.concurrent_call_limit, defaults::CONCURRENT_CALL_LIMIT),
        );
        state.insert("enabled".into(), bool_or(profile.enabled, defaults::ENABLED));
        state.insert(
            "tags".into(),
            strings_or(profile.tags.as_deref(), defaults::TAGS),
        );
        state.insert(
            "usage_payment_method".into(),
            string_or(
                profile.usage_payment_method.as_deref(),
                defaults::USAGE_PAYMENT_METHOD,
            ),
        );
        state.insert(
            "whitelisted_destinations".into(),
            strings_or(
                profile.whitelisted_destinations.as_deref(),
                defaults::WHITELISTED_DESTINATIONS,
            ),
        );
        state.insert(
            "max_destination_rate".into(),
            Dynamic::Number(
                profile
                    .max_destination_rate
                    .unwrap_or(defaults::MAX_DESTINATION_RATE),
            ),
        );
        state.insert(
            "daily_spend_limit".into(),
            string_or(
                profile.daily_spend_limit.as_deref(),
                defaults::DAILY_SPEND_LIMIT,
            ),
        );
        state.insert(
            "daily_spend_limit_enabled".into(),
            bool_or(
                profile.daily_spend_limit_enabled,
                defaults::DAILY_SPEND_LIMIT_ENABLED,
            ),
        );
        state.insert(
            CALL_RECORDING.into(),
            call_recording_to_state(profile.call_recording.as_ref()),
        );
        state.insert("created_at".into(), timestamp(profile.created_at.as_deref()));
        state.insert("updated_at".into(), timestamp(profile.updated_at.as_deref()));
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for OutboundVoiceProfileResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match TelnyxProviderData::from_any(request.provider_data) {
            Ok(provider_data) => self.provider_data = Some(provider_data),
            Err(diag) => diagnostics.push(diag),
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for OutboundVoiceProfileResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::state::strs_to_list;

    #[test]
    fn state_applies_documented_defaults() {
        let profile = OutboundVoiceProfile {
            id: "1293384261075731499".to_string(),
            name: "office".to_string(),
            billing_group_id: Some("6a09cdc3-8948-47f0-aa62-74ac943d6c58".to_string()),
            max_destination_rate: Some(10.0),
            daily_spend_limit: Some("100.00".to_string()),
            ..Default::default()
        };

        let state = OutboundVoiceProfileResource::state_from_profile(&profile);
        assert_eq!(
            state.get_string(&AttributePath::new("traffic_type")).unwrap(),
            "conversational"
        );
        assert_eq!(
            state.get(&AttributePath::new("whitelisted_destinations")),
            Some(&strs_to_list(&["US", "CA"]))
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("daily_spend_limit"))
                .unwrap(),
            "100.00"
        );
        assert_eq!(
            state
                .get_string(
                    &AttributePath::new("call_recording").attribute("call_recording_format")
                )
                .unwrap(),
            "wav"
        );
    }

    #[test]
    fn extract_sends_call_recording_group() {
        let mut plan = Object::new();
        plan.insert("name".into(), Dynamic::from("office"));
        plan.insert("billing_group_id".into(), Dynamic::from("bg-1"));
        plan.insert("tags".into(), strs_to_list(&["b", "a"]));
        let mut recording = Object::new();
        recording.insert("call_recording_type".into(), Dynamic::from("none"));
        plan.insert("call_recording".into(), Dynamic::Map(recording));

        let profile = OutboundVoiceProfileResource::new()
            .extract_profile(&into_state(plan))
            .unwrap();
        let body = serde_json::to_value(&profile).unwrap();
        assert_eq!(body["tags"], serde_json::json!(["b", "a"]));
        assert_eq!(body["call_recording"]["call_recording_type"], "none");
        assert!(body.get("id").is_none());
    }

    #[tokio::test]
    async fn validate_rejects_non_decimal_spend_limit() {
        let mut config = Object::new();
        config.insert("daily_spend_limit".into(), Dynamic::from("lots"));
        let response = OutboundVoiceProfileResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "telnyx_outbound_voice_profile".to_string(),
                    config: into_state(config),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid daily spend limit");
    }
}
