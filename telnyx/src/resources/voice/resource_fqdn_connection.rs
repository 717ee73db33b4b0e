//! FQDN connection resource implementation

use super::connection::{connection_attributes, ConnectionFields};
use crate::api::voice::fqdn_connections::FqdnConnection;
use crate::defaults::connection as defaults;
use crate::resources::state::{into_state, optional_string, read_string, string_or};
use crate::resources::{api_error, missing_id, not_configured, resource_id};
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
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;

/// Connections authenticate by FQDN and may use IP authentication outbound
const INCLUDE_IP_AUTH: bool = true;

#[derive(Default)]
pub struct FqdnConnectionResource {
    provider_data: Option<TelnyxProviderData>,
}

impl FqdnConnectionResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for FqdnConnectionResource {
    fn type_name(&self) -> &str {
        "telnyx_fqdn_connection"
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
            .description("Manages a Telnyx FQDN connection")
            .attributes(connection_attributes(false, INCLUDE_IP_AUTH))
            .attribute(
                AttributeBuilder::new("transport_protocol", AttributeType::String)
                    .description("SIP transport: UDP, TCP or TLS")
                    .default(StaticDefault::string(defaults::TRANSPORT_PROTOCOL))
                    .validator(StringOneOf::create(defaults::TRANSPORT_PROTOCOLS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("encrypted_media", AttributeType::String)
                    .description("Media encryption, SRTP when enabled")
                    .default(StaticDefault::string(defaults::ENCRYPTED_MEDIA))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ios_push_credential_id", AttributeType::String)
                    .description("iOS push credential used for WebRTC clients")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("android_push_credential_id", AttributeType::String)
                    .description("Android push credential used for WebRTC clients")
                    .optional()
                    .computed()
                    .build(),
            )
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

        let connection = match self.extract_connection(&request.planned_state) {
            Ok(connection) => connection,
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
            .fqdn_connections()
            .create(&connection)
            .await
        {
            Ok(created) => {
                tracing::info!("Created FQDN connection {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_connection(&created, &request.planned_state),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create FQDN connection", &e));
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

        match provider_data.client.voice().fqdn_connections().get(&id).await {
            Ok(connection) => ReadResourceResponse {
                new_state: Some(Self::state_from_connection(
                    &connection,
                    &request.current_state,
                )),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("FQDN connection {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read FQDN connection", &e));
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

        let connection = match self.extract_connection(&request.planned_state) {
            Ok(connection) => connection,
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
            .fqdn_connections()
            .update(&id, &connection)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_connection(&updated, &request.planned_state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update FQDN connection", &e));
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
            .fqdn_connections()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("FQDN connection {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete FQDN connection", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl FqdnConnectionResource {
    fn extract_connection(&self, state: &DynamicValue) -> Result<FqdnConnection, Diagnostic> {
        let fields = ConnectionFields::from_state(state, INCLUDE_IP_AUTH)?;

        Ok(FqdnConnection {
            id: fields.id,
            active: fields.active,
            anchorsite_override: fields.anchorsite_override,
            connection_name: fields.connection_name,
            transport_protocol: read_string(state, "transport_protocol"),
            default_on_hold_comfort_noise_enabled: fields.default_on_hold_comfort_noise_enabled,
            dtmf_type: fields.dtmf_type,
            encode_contact_header_enabled: fields.encode_contact_header_enabled,
            encrypted_media: read_string(state, "encrypted_media"),
            onnet_t38_passthrough_enabled: fields.onnet_t38_passthrough_enabled,
            ios_push_credential_id: read_string(state, "ios_push_credential_id"),
            android_push_credential_id: read_string(state, "android_push_credential_id"),
            microsoft_teams_sbc: fields.microsoft_teams_sbc,
            webhook_event_url: fields.webhook_event_url,
            webhook_event_failover_url: fields.webhook_event_failover_url,
            webhook_api_version: fields.webhook_api_version,
            webhook_timeout_secs: fields.webhook_timeout_secs,
            rtcp_settings: fields.rtcp_settings,
            inbound: fields.inbound,
            outbound: fields.outbound,
            username: fields.username,
            password: fields.password,
            sip_uri_calling_preference: fields.sip_uri_calling_preference,
            created_at: None,
            updated_at: None,
        })
    }

    fn state_from_connection(connection: &FqdnConnection, known: &DynamicValue) -> DynamicValue {
        let fields = ConnectionFields {
            id: connection.id.clone(),
            active: connection.active,
            anchorsite_override: connection.anchorsite_override.clone(),
            connection_name: connection.connection_name.clone(),
            default_on_hold_comfort_noise_enabled: connection
                .default_on_hold_comfort_noise_enabled,
            dtmf_type: connection.dtmf_type.clone(),
            encode_contact_header_enabled: connection.encode_contact_header_enabled,
            onnet_t38_passthrough_enabled: connection.onnet_t38_passthrough_enabled,
            microsoft_teams_sbc: connection.microsoft_teams_sbc,
            webhook_event_url: connection.webhook_event_url.clone(),
            webhook_event_failover_url: connection.webhook_event_failover_url.clone(),
            webhook_api_version: connection.webhook_api_version.clone(),
            webhook_timeout_secs: connection.webhook_timeout_secs,
            rtcp_settings: connection.rtcp_settings.clone(),
            inbound: connection.inbound.clone(),
            outbound: connection.outbound.clone(),
            username: connection.username.clone(),
            password: connection.password.clone(),
            sip_uri_calling_preference: connection.sip_uri_calling_preference.clone(),
            created_at: connection.created_at.clone(),
            updated_at: connection.updated_at.clone(),
        };

        let mut state = fields.to_state(INCLUDE_IP_AUTH, known);
        state.insert(
            "transport_protocol".into(),
            string_or(
                connection.transport_protocol.as_deref(),
                defaults::TRANSPORT_PROTOCOL,
            ),
        );
        state.insert(
            "encrypted_media".into(),
            string_or(
                connection.encrypted_media.as_deref(),
                defaults::ENCRYPTED_MEDIA,
            ),
        );
        state.insert(
            "ios_push_credential_id".into(),
            optional_string(connection.ios_push_credential_id.as_deref()),
        );
        state.insert(
            "android_push_credential_id".into(),
            optional_string(connection.android_push_credential_id.as_deref()),
        );
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for FqdnConnectionResource {
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
impl ResourceWithImportState for FqdnConnectionResource {
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
#[path = "resource_fqdn_connection_test.rs"]
mod resource_fqdn_connection_test;
