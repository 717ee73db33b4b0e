//! Billing group resource implementation

use crate::api::billing::billing_groups::{BillingGroup, BillingGroupRequest};
use crate::resources::state::{into_state, read_string, timestamp, Object};
use crate::resources::{
    api_error, id_attribute, missing_id, not_configured, resource_id, timestamp_attributes,
};
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
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

#[derive(Default)]
pub struct BillingGroupResource {
    provider_data: Option<TelnyxProviderData>,
}

impl BillingGroupResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for BillingGroupResource {
    fn type_name(&self) -> &str {
        "telnyx_billing_group"
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
            .description("Manages a Telnyx billing group")
            .attribute(id_attribute("Billing group identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the billing group")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("organization_id", AttributeType::String)
                    .description("Organization that owns the billing group")
                    .computed()
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
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(name) = read_string(&request.config, "name") {
            if name.trim().is_empty() {
                diagnostics.push(
                    Diagnostic::error("Invalid name", "Billing group name must not be blank")
                        .with_attribute(AttributePath::new("name")),
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

        let billing_group = match self.extract_billing_group(&request.planned_state) {
            Ok(billing_group) => billing_group,
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
            .billing()
            .billing_groups()
            .create(&billing_group)
            .await
        {
            Ok(created) => {
                tracing::info!("Created billing group {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_billing_group(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create billing group", &e));
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

        match provider_data.client.billing().billing_groups().get(&id).await {
            Ok(billing_group) => ReadResourceResponse {
                new_state: Some(Self::state_from_billing_group(&billing_group)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Billing group {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read billing group", &e));
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

        let billing_group = match self.extract_billing_group(&request.planned_state) {
            Ok(billing_group) => billing_group,
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
            .billing()
            .billing_groups()
            .update(&id, &billing_group)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_billing_group(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update billing group", &e));
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
            .billing()
            .billing_groups()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Billing group {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete billing group", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl BillingGroupResource {
    fn extract_billing_group(&self, state: &DynamicValue) -> Result<BillingGroupRequest, Diagnostic> {
        let name = read_string(state, "name").ok_or_else(|| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
                .with_attribute(AttributePath::new("name"))
        })?;

        Ok(BillingGroupRequest { name })
    }

    fn state_from_billing_group(billing_group: &BillingGroup) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(billing_group.id.as_str()));
        state.insert("name".into(), Dynamic::from(billing_group.name.as_str()));
        state.insert(
            "organization_id".into(),
            Dynamic::from(billing_group.organization_id.clone()),
        );
        state.insert(
            "created_at".into(),
            timestamp(billing_group.created_at.as_deref()),
        );
        state.insert(
            "updated_at".into(),
            timestamp(billing_group.updated_at.as_deref()),
        );
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for BillingGroupResource {
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
impl ResourceWithImportState for BillingGroupResource {
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
#[path = "resource_billing_group_test.rs"]
mod resource_billing_group_test;
