//! Call control application resource implementation

use crate::api::voice::call_control_applications::CallControlApplication;
use crate::defaults::{self, call_control_application as app_defaults, CALL_CONTROL_SETTINGS};
use crate::resources::settings::{
    application_inbound_attribute, application_inbound_from_state, application_inbound_to_state,
    application_outbound_attribute, application_outbound_from_state,
    application_outbound_to_state, INBOUND, OUTBOUND,
};
use crate::resources::state::{
    bool_or, i64_or, into_state, optional_i64, optional_string, read_bool, read_i64, read_string,
    string_or, timestamp, Object,
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
pub struct CallControlApplicationResource {
    provider_data: Option<TelnyxProviderData>,
}

impl CallControlApplicationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for CallControlApplicationResource {
    fn type_name(&self) -> &str {
        "telnyx_call_control_application"
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
            .description("Manages a Telnyx call control application")
            .attribute(id_attribute("Call control application identifier"))
            .attribute(
                AttributeBuilder::new("application_name", AttributeType::String)
                    .description("Name of the application")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_event_url", AttributeType::String)
                    .description("URL that receives call control webhooks")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("active", AttributeType::Bool)
                    .description("Whether the application accepts calls")
                    .default(StaticDefault::bool(app_defaults::ACTIVE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("anchorsite_override", AttributeType::String)
                    .description("Preferred media anchor site, or Latency")
                    .default(StaticDefault::string(app_defaults::ANCHORSITE_OVERRIDE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dtmf_type", AttributeType::String)
                    .description("DTMF mode: RFC 2833, Inband or SIP INFO")
                    .default(StaticDefault::string(app_defaults::DTMF_TYPE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("first_command_timeout", AttributeType::Bool)
                    .description("Hang up when no command arrives in time")
                    .default(StaticDefault::bool(app_defaults::FIRST_COMMAND_TIMEOUT))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("first_command_timeout_secs", AttributeType::Number)
                    .description("Seconds to wait for the first command")
                    .default(StaticDefault::number(
                        app_defaults::FIRST_COMMAND_TIMEOUT_SECS as f64,
                    ))
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_api_version", AttributeType::String)
                    .description("Webhook payload version")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_event_failover_url", AttributeType::String)
                    .description("Failover URL for call control webhooks")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("webhook_timeout_secs", AttributeType::Number)
                    .description("Seconds to wait for a webhook response")
                    .optional()
                    .computed()
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(application_inbound_attribute(&CALL_CONTROL_SETTINGS))
            .attribute(application_outbound_attribute(&CALL_CONTROL_SETTINGS))
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

        if let Some(webhook) = read_string(&request.config, "webhook_event_url") {
            if url::Url::parse(&webhook).is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid webhook URL",
                        format!("'{}' is not an absolute URL", webhook),
                    )
                    .with_attribute(AttributePath::new("webhook_event_url")),
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

        let application = match self.extract_application(&request.planned_state) {
            Ok(application) => application,
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
            .call_control_applications()
            .create(&application)
            .await
        {
            Ok(created) => {
                tracing::info!("Created call control application {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_application(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create call control application", &e));
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

        match provider_data.client.voice().call_control_applications().get(&id).await {
            Ok(application) => ReadResourceResponse {
                new_state: Some(Self::state_from_application(&application)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Call control application {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read call control application", &e));
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

        let application = match self.extract_application(&request.planned_state) {
            Ok(application) => application,
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
            .call_control_applications()
            .update(&id, &application)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_application(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update call control application", &e));
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
            .call_control_applications()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Call control application {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete call control application", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl CallControlApplicationResource {
    fn extract_application(
        &self,
        state: &DynamicValue,
    ) -> Result<CallControlApplication, Diagnostic> {
        let application_name = read_string(state, "application_name").ok_or_else(|| {
            Diagnostic::error(
                "Missing application_name",
                "The 'application_name' attribute is required",
            )
            .with_attribute(AttributePath::new("application_name"))
        })?;
        let webhook_event_url = read_string(state, "webhook_event_url").ok_or_else(|| {
            Diagnostic::error(
                "Missing webhook_event_url",
                "The 'webhook_event_url' attribute is required",
            )
            .with_attribute(AttributePath::new("webhook_event_url"))
        })?;

        Ok(CallControlApplication {
            application_name,
            webhook_event_url,
            active: read_bool(state, "active"),
            anchorsite_override: read_string(state, "anchorsite_override"),
            dtmf_type: read_string(state, "dtmf_type"),
            first_command_timeout: read_bool(state, "first_command_timeout"),
            first_command_timeout_secs: read_i64(state, "first_command_timeout_secs"),
            webhook_api_version: read_string(state, "webhook_api_version"),
            webhook_event_failover_url: read_string(state, "webhook_event_failover_url"),
            webhook_timeout_secs: read_i64(state, "webhook_timeout_secs"),
            inbound: Some(application_inbound_from_state(state)),
            outbound: Some(application_outbound_from_state(state)),
            ..Default::default()
        })
    }

    fn state_from_application(application: &CallControlApplication) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(application.id.as_str()));
        state.insert(
            "application_name".into(),
            Dynamic::from(application.application_name.as_str()),
        );
        state.insert(
            "webhook_event_url".into(),
            Dynamic::from(application.webhook_event_url.as_str()),
        );
        state.insert(
            "active".into(),
            bool_or(application.active, app_defaults::ACTIVE),
        );
        state.insert(
            "anchorsite_override".into(),
            string_or(
                application.anchorsite_override.as_deref(),
                app_defaults::ANCHORSITE_OVERRIDE,
            ),
        );
        state.insert(
            "dtmf_type".into(),
            string_or(application.dtmf_type.as_deref(), app_defaults::DTMF_TYPE),
        );
        state.insert(
            "first_command_timeout".into(),
            bool_or(
                application.first_command_timeout,
                app_defaults::FIRST_COMMAND_TIMEOUT,
            ),
        );
        state.insert(
            "first_command_timeout_secs".into(),
            i64_or(
                application.first_command_timeout_secs,
                app_defaults::FIRST_COMMAND_TIMEOUT_SECS,
            ),
        );
        state.insert(
            "webhook_api_version".into(),
            string_or(
                application.webhook_api_version.as_deref(),
                defaults::WEBHOOK_API_VERSION,
            ),
        );
        state.insert(
            "webhook_event_failover_url".into(),
            optional_string(application.webhook_event_failover_url.as_deref()),
        );
        state.insert(
            "webhook_timeout_secs".into(),
            optional_i64(application.webhook_timeout_secs),
        );
        state.insert(
            INBOUND.into(),
            application_inbound_to_state(application.inbound.as_ref(), &CALL_CONTROL_SETTINGS),
        );
        state.insert(
            OUTBOUND.into(),
            application_outbound_to_state(application.outbound.as_ref(), &CALL_CONTROL_SETTINGS),
        );
        state.insert(
            "created_at".into(),
            timestamp(application.created_at.as_deref()),
        );
        state.insert(
            "updated_at".into(),
            timestamp(application.updated_at.as_deref()),
        );
        into_state(state)
    }
}

#[async_trait]
impl ResourceWithConfigure for CallControlApplicationResource {
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
impl ResourceWithImportState for CallControlApplicationResource {
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

    async fn configured(server_url: &str) -> CallControlApplicationResource {
        let client = Client::new(server_url, "test-key").unwrap();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(TelnyxProviderData::new(client));
        let mut resource = CallControlApplicationResource::new();
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
    async fn create_sends_only_managed_group_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/call_control_applications")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "application_name": "call-router",
                "webhook_event_url": "https://example.com/webhooks",
                "anchorsite_override": "Latency",
                "inbound": {"sip_subdomain": "", "sip_subdomain_receive_settings": ""},
                "outbound": {"outbound_voice_profile_id": ""}
            })))
            .with_body(
                r#"{"data":{"id":"1293384261075731499","record_type":"call_control_application",
                "application_name":"call-router","webhook_event_url":"https://example.com/webhooks",
                "active":true,"webhook_api_version":"2","webhook_timeout_secs":null,
                "inbound":{"channel_limit":null,"sip_subdomain":null,"sip_subdomain_receive_settings":"from_anyone"},
                "outbound":{"channel_limit":null,"outbound_voice_profile_id":null}}}"#,
            )
            .create_async()
            .await;

        let mut inbound = Object::new();
        inbound.insert("sip_subdomain".into(), Dynamic::from(""));
        inbound.insert("sip_subdomain_receive_settings".into(), Dynamic::from(""));
        inbound.insert("channel_limit".into(), Dynamic::Unknown);
        let mut outbound = Object::new();
        outbound.insert("outbound_voice_profile_id".into(), Dynamic::from(""));

        let mut plan = Object::new();
        plan.insert("id".into(), Dynamic::Unknown);
        plan.insert("application_name".into(), Dynamic::from("call-router"));
        plan.insert(
            "webhook_event_url".into(),
            Dynamic::from("https://example.com/webhooks"),
        );
        plan.insert("anchorsite_override".into(), Dynamic::from("Latency"));
        plan.insert("webhook_timeout_secs".into(), Dynamic::Unknown);
        plan.insert("inbound".into(), Dynamic::Map(inbound));
        plan.insert("outbound".into(), Dynamic::Map(outbound));
        let plan = into_state(plan);

        let resource = configured(&server.url()).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "telnyx_call_control_application".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(
            state
                .get_string(&AttributePath::new("anchorsite_override"))
                .unwrap(),
            "Latency"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("inbound").attribute("sip_subdomain_receive_settings"))
                .unwrap(),
            "from_anyone"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("outbound").attribute("outbound_voice_profile_id"))
                .unwrap(),
            ""
        );
        assert_eq!(
            state.get(&AttributePath::new("webhook_timeout_secs")),
            Some(&Dynamic::Null)
        );
    }

    #[tokio::test]
    async fn validate_rejects_relative_webhook() {
        let mut config = Object::new();
        config.insert("webhook_event_url".into(), Dynamic::from("/hooks"));
        let response = CallControlApplicationResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "telnyx_call_control_application".to_string(),
                    config: into_state(config),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid webhook URL");
    }
}
