//! Messaging profile resource implementation

use crate::api::messaging::messaging_profiles::{MessagingProfile, MessagingProfileRequest};
use crate::defaults::messaging_profile as defaults;
use crate::resources::state::{
    bool_or, into_state, optional_string, read_bool, read_string, read_strings, string_or,
    strings_or, timestamp, Object,
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
use tfplug::validator::StringOneOf;

#[derive(Default)]
pub struct MessagingProfileResource {
    provider_data: Option<TelnyxProviderData>,
}

impl MessagingProfileResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for MessagingProfileResource {
    fn type_name(&self) -> &str {
        "telnyx_messaging_profile"
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
            .description("Manages a Telnyx messaging profile")
            .attribute(id_attribute("Messaging profile identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the messaging profile")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether messages can be sent with this profile")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_url", AttributeType::String)
                    .description("URL that receives message webhooks")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_failover_url", AttributeType::String)
                    .description("Failover URL used when the webhook URL does not answer")
                    .default(StaticDefault::string(defaults::WEBHOOK_FAILOVER_URL))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_api_version", AttributeType::String)
                    .description("Webhook payload format: 1, 2 or 2010-04-01")
                    .default(StaticDefault::string(defaults::WEBHOOK_API_VERSION))
                    .validator(StringOneOf::create(defaults::WEBHOOK_API_VERSIONS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "whitelisted_destinations",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .description("ISO 3166-1 alpha-2 country codes messages may be sent to")
                .default(StaticDefault::string_list(
                    defaults::WHITELISTED_DESTINATIONS,
                ))
                .build(),
            )
            .attribute(
                AttributeBuilder::new("v1_secret", AttributeType::String)
                    .description("Secret used to authenticate v1 API requests")
                    .computed()
                    .sensitive()
                    .build(),
            )
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
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
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

        let profile = match self.extract_messaging_profile(&request.planned_state) {
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
            .messaging()
            .messaging_profiles()
            .create(&profile)
            .await
        {
            Ok(created) => {
                tracing::info!("Created messaging profile {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_messaging_profile(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create messaging profile", &e));
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
            .messaging()
            .messaging_profiles()
            .get(&id)
            .await
        {
            Ok(profile) => ReadResourceResponse {
                new_state: Some(Self::state_from_messaging_profile(&profile)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Messaging profile {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read messaging profile", &e));
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

        let profile = match self.extract_messaging_profile(&request.planned_state) {
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
            .messaging()
            .messaging_profiles()
            .update(&id, &profile)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_messaging_profile(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update messaging profile", &e));
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
            .messaging()
            .messaging_profiles()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Messaging profile {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete messaging profile", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl MessagingProfileResource {
    fn extract_messaging_profile(
        &self,
        state: &DynamicValue,
    ) -> Result<MessagingProfileRequest, Diagnostic> {
        let name = read_string(state, "name").ok_or_else(|| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
                .with_attribute(AttributePath::new("name"))
        })?;
        let enabled = read_bool(state, "enabled").ok_or_else(|| {
            Diagnostic::error("Missing enabled", "The 'enabled' attribute is required")
                .with_attribute(AttributePath::new("enabled"))
        })?;

        Ok(MessagingProfileRequest {
            name,
            enabled,
            webhook_url: read_string(state, "webhook_url"),
            webhook_failover_url: read_string(state, "webhook_failover_url"),
            webhook_api_version: read_string(state, "webhook_api_version"),
            whitelisted_destinations: read_strings(state, "whitelisted_destinations")
                .unwrap_or_else(|| {
                    defaults::WHITELISTED_DESTINATIONS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
        })
    }

    fn state_from_messaging_profile(profile: &MessagingProfile) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(profile.id.as_str()));
        state.insert("name".into(), Dynamic::from(profile.name.as_str()));
        state.insert("enabled".into(), bool_or(profile.enabled, false));
        state.insert(
            "webhook_url".into(),
            optional_string(profile.webhook_url.as_deref()),
        );
        state.insert(
            "webhook_failover_url".into(),
            string_or(
                profile.webhook_failover_url.as_deref(),
                defaults::WEBHOOK_FAILOVER_URL,
            ),
        );
        state.insert(
            "webhook_api_version".into(),
            string_or(
                profile.webhook_api_version.as_deref(),
                defaults::WEBHOOK_API_VERSION,
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
            "v1_secret".into(),
            optional_string(profile.v1_secret.as_deref()),
        );
        state.insert("created_at".into(), timestamp(profile.created_at.as_deref()));
        state.insert("updated_at".into(), timestamp(profile.updated_at.as_deref()));
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for MessagingProfileResource {
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
impl ResourceWithImportState for MessagingProfileResource {
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
