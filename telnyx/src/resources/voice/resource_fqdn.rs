//! FQDN resource implementation: one host name attached to an FQDN connection

use crate::api::voice::fqdns::Fqdn;
use crate::resources::state::{into_state, optional_i64, read_i64, read_string, timestamp, Object};
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
use tfplug::validator::{StringOneOf, WholeNumber};

const DNS_RECORD_TYPES: &[&str] = &["a", "srv"];

#[derive(Default)]
pub struct FqdnResource {
    provider_data: Option<TelnyxProviderData>,
}

impl FqdnResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for FqdnResource {
    fn type_name(&self) -> &str {
        "telnyx_fqdn"
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
            .description("Manages a Telnyx FQDN")
            .attribute(id_attribute("FQDN identifier"))
            .attribute(
                AttributeBuilder::new("connection_id", AttributeType::String)
                    .description("FQDN connection the host belongs to")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("fqdn", AttributeType::String)
                    .description("Fully qualified domain name or IP address")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("port", AttributeType::Number)
                    .description("Port used to reach the host")
                    .required()
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dns_record_type", AttributeType::String)
                    .description("DNS record used to resolve the host: a or srv")
                    .required()
                    .validator(StringOneOf::create(DNS_RECORD_TYPES))
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

        if let Some(port) = read_i64(&request.config, "port") {
            if !(1..=65535).contains(&port) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid port",
                        format!("Port {} is outside 1-65535", port),
                    )
                    .with_attribute(AttributePath::new("port")),
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

        let fqdn = match self.extract_fqdn(&request.planned_state) {
            Ok(fqdn) => fqdn,
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
            .fqdns()
            .create(&fqdn)
            .await
        {
            Ok(created) => {
                tracing::info!("Created FQDN {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_fqdn(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create FQDN", &e));
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

        match provider_data.client.voice().fqdns().get(&id).await {
            Ok(fqdn) => ReadResourceResponse {
                new_state: Some(Self::state_from_fqdn(&fqdn)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("FQDN {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read FQDN", &e));
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

        let fqdn = match self.extract_fqdn(&request.planned_state) {
            Ok(fqdn) => fqdn,
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
            .fqdns()
            .update(&id, &fqdn)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_fqdn(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update FQDN", &e));
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
            .fqdns()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("FQDN {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete FQDN", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl FqdnResource {
    fn extract_fqdn(&self, state: &DynamicValue) -> Result<Fqdn, Diagnostic> {
        let fqdn = read_string(state, "fqdn").ok_or_else(|| {
            Diagnostic::error("Missing fqdn", "The 'fqdn' attribute is required")
                .with_attribute(AttributePath::new("fqdn"))
        })?;

        Ok(Fqdn {
            connection_id: read_string(state, "connection_id"),
            fqdn,
            port: read_i64(state, "port"),
            dns_record_type: read_string(state, "dns_record_type"),
            ..Default::default()
        })
    }

    fn state_from_fqdn(fqdn: &Fqdn) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(fqdn.id.as_str()));
        state.insert(
            "connection_id".into(),
            Dynamic::from(fqdn.connection_id.clone()),
        );
        state.insert("fqdn".into(), Dynamic::from(fqdn.fqdn.as_str()));
        state.insert("port".into(), optional_i64(fqdn.port));
        state.insert(
            "dns_record_type".into(),
            Dynamic::from(fqdn.dns_record_type.clone()),
        );
        state.insert("created_at".into(), timestamp(fqdn.created_at.as_deref()));
        state.insert("updated_at".into(), timestamp(fqdn.updated_at.as_deref()));
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for FqdnResource {
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
impl ResourceWithImportState for FqdnResource {
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
    use crate::api::Client;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::any::Any;
    use std::sync::Arc;

    async fn configured(server_url: &str) -> FqdnResource {
        let client = Client::new(server_url, "test-key").unwrap();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(TelnyxProviderData::new(client));
        let mut resource = FqdnResource::new();
        resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(data),
                },
            )
            .await;
        resource
    }

    #[tokio::test]
    async fn create_normalises_numeric_connection_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/fqdns")
            .match_body(Matcher::Json(json!({
                "connection_id": "1516447646313612565",
                "fqdn": "sip.example.com",
                "port": 5060,
                "dns_record_type": "a"
            })))
            .with_body(
                r#"{"data":{"id":"1293384261075731499","record_type":"fqdn",
                "connection_id":1516447646313612565,"fqdn":"sip.example.com",
                "port":5060,"dns_record_type":"a"}}"#,
            )
            .create_async()
            .await;

        let mut plan = Object::new();
        plan.insert("id".into(), Dynamic::Unknown);
        plan.insert("connection_id".into(), Dynamic::from("1516447646313612565"));
        plan.insert("fqdn".into(), Dynamic::from("sip.example.com"));
        plan.insert("port".into(), Dynamic::Number(5060.0));
        plan.insert("dns_record_type".into(), Dynamic::from("a"));
        let plan = into_state(plan);

        let resource = configured(&server.url()).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "telnyx_fqdn".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("connection_id"))
                .unwrap(),
            "1516447646313612565"
        );
        assert_eq!(
            response
                .new_state
                .get_number(&AttributePath::new("port"))
                .unwrap(),
            5060.0
        );
    }

    #[tokio::test]
    async fn validate_rejects_port_out_of_range() {
        let mut config = Object::new();
        config.insert("port".into(), Dynamic::Number(70000.0));
        let response = FqdnResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "telnyx_fqdn".to_string(),
                    config: into_state(config),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid port");
    }
}
