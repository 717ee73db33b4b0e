//! Credential connection resource implementation

use super::connection::{connection_attributes, ConnectionFields};
use crate::api::voice::credential_connections::CredentialConnection;
use crate::resources::state::into_state;
use crate::resources::{api_error, missing_id, not_configured, resource_id};
use crate::TelnyxProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
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
use tfplug::schema::SchemaBuilder;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

/// Credential connections authenticate with username and password only
const INCLUDE_IP_AUTH: bool = false;

#[derive(Default)]
pub struct CredentialConnectionResource {
    provider_data: Option<TelnyxProviderData>,
}

impl CredentialConnectionResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for CredentialConnectionResource {
    fn type_name(&self) -> &str {
        "telnyx_credential_connection"
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
            .description("Manages a Telnyx credential (SIP registration) connection")
            .attributes(connection_attributes(true, INCLUDE_IP_AUTH))
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
            .credential_connections()
            .create(&connection)
            .await
        {
            Ok(created) => {
                tracing::info!("Created credential connection {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_connection(&created, &request.planned_state),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create credential connection", &e));
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

        match provider_data.client.voice().credential_connections().get(&id).await {
            Ok(connection) => ReadResourceResponse {
                new_state: Some(Self::state_from_connection(
                    &connection,
                    &request.current_state,
                )),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("credential connection {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read credential connection", &e));
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
            .credential_connections()
            .update(&id, &connection)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_connection(&updated, &request.planned_state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update credential connection", &e));
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
            .credential_connections()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("credential connection {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete credential connection", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl CredentialConnectionResource {
    fn extract_connection(&self, state: &DynamicValue) -> Result<CredentialConnection, Diagnostic> {
        let fields = ConnectionFields::from_state(state, INCLUDE_IP_AUTH)?;

        Ok(CredentialConnection {
            id: fields.id,
            active: fields.active,
            anchorsite_override: fields.anchorsite_override,
            connection_name: fields.connection_name,
            default_on_hold_comfort_noise_enabled: fields.default_on_hold_comfort_noise_enabled,
            dtmf_type: fields.dtmf_type,
            encode_contact_header_enabled: fields.encode_contact_header_enabled,
            onnet_t38_passthrough_enabled: fields.onnet_t38_passthrough_enabled,
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

    fn state_from_connection(
        connection: &CredentialConnection,
        known: &DynamicValue,
    ) -> DynamicValue {
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

        into_state(fields.to_state(INCLUDE_IP_AUTH, known))
    }
}

#[async_trait]
impl ResourceWithConfigure for CredentialConnectionResource {
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
impl ResourceWithImportState for CredentialConnectionResource {
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
#[path = "resource_credential_connection_test.rs"]
mod resource_credential_connection_test;
