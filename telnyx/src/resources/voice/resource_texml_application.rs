//! TeXML application resource implementation

use crate::api::voice::texml_applications::TexmlApplication;
use crate::defaults::{texml_application as app_defaults, TEXML_SETTINGS};
use crate::resources::settings::{
    application_inbound_attribute, application_inbound_from_state, application_inbound_to_state,
    application_outbound_attribute, application_outbound_from_state,
    application_outbound_to_state, INBOUND, OUTBOUND,
};
use crate::resources::state::{
    bool_or, i64_or, into_state, read_bool, read_i64, read_string, string_or, timestamp, Object,
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
use tfplug::validator::{StringOneOf, WholeNumber};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

const HTTP_METHODS: &[&str] = &["get", "post"];

#[derive(Default)]
pub struct TexmlApplicationResource {
    provider_data: Option<TelnyxProviderData>,
}

impl TexmlApplicationResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for TexmlApplicationResource {
    fn type_name(&self) -> &str {
        "telnyx_texml_application"
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
            .description("Manages a Telnyx TeXML application")
            .attribute(id_attribute("TeXML application identifier"))
            .attribute(
                AttributeBuilder::new("friendly_name", AttributeType::String)
                    .description("Name of the application")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("voice_url", AttributeType::String)
                    .description("URL that serves TeXML instructions for inbound calls")
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
                    .description("Preferred media anchor site")
                    .default(StaticDefault::string(app_defaults::ANCHORSITE_OVERRIDE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dtmf_type", AttributeType::String)
                    .description("DTMF mode")
                    .default(StaticDefault::string(app_defaults::DTMF_TYPE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("first_command_timeout", AttributeType::Bool)
                    .default(StaticDefault::bool(app_defaults::FIRST_COMMAND_TIMEOUT))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("first_command_timeout_secs", AttributeType::Number)
                    .default(StaticDefault::number(
                        app_defaults::FIRST_COMMAND_TIMEOUT_SECS as f64,
                    ))
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("voice_fallback_url", AttributeType::String)
                    .description("URL used when voice_url fails")
                    .default(StaticDefault::string(app_defaults::VOICE_FALLBACK_URL))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("voice_method", AttributeType::String)
                    .description("HTTP method used to request voice_url")
                    .default(StaticDefault::string(app_defaults::VOICE_METHOD))
                    .validator(StringOneOf::create(HTTP_METHODS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status_callback", AttributeType::String)
                    .description("URL that receives call status events")
                    .default(StaticDefault::string(app_defaults::STATUS_CALLBACK))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status_callback_method", AttributeType::String)
                    .default(StaticDefault::string(app_defaults::STATUS_CALLBACK_METHOD))
                    .validator(StringOneOf::create(HTTP_METHODS))
                    .build(),
            )
            .attribute(application_inbound_attribute(&TEXML_SETTINGS))
            .attribute(application_outbound_attribute(&TEXML_SETTINGS))
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

        for name in ["voice_url", "voice_fallback_url", "status_callback"] {
            let Some(value) = read_string(&request.config, name) else {
                continue;
            };
            if url::Url::parse(&value).is_err() {
                diagnostics.push(
                    Diagnostic::error("Invalid URL", format!("'{}' is not an absolute URL", value))
                        .with_attribute(AttributePath::new(name)),
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
            .texml_applications()
            .create(&application)
            .await
        {
            Ok(created) => {
                tracing::info!("Created TeXML application {}", created.id);
                CreateResourceResponse {
                    new_state: Self::state_from_application(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create TeXML application", &e));
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

        match provider_data.client.voice().texml_applications().get(&id).await {
            Ok(application) => ReadResourceResponse {
                new_state: Some(Self::state_from_application(&application)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("TeXML application {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read TeXML application", &e));
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
            .texml_applications()
            .update(&id, &application)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_application(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update TeXML application", &e));
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
            .texml_applications()
            .delete(&id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("TeXML application {} already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete TeXML application", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

impl TexmlApplicationResource {
    fn extract_application(&self, state: &DynamicValue) -> Result<TexmlApplication, Diagnostic> {
        let friendly_name = read_string(state, "friendly_name").ok_or_else(|| {
            Diagnostic::error(
                "Missing friendly_name",
                "The 'friendly_name' attribute is required",
            )
            .with_attribute(AttributePath::new("friendly_name"))
        })?;
        let voice_url = read_string(state, "voice_url").ok_or_else(|| {
            Diagnostic::error("Missing voice_url", "The 'voice_url' attribute is required")
                .with_attribute(AttributePath::new("voice_url"))
        })?;

        Ok(TexmlApplication {
            friendly_name,
            voice_url,
            active: read_bool(state, "active"),
            anchorsite_override: read_string(state, "anchorsite_override"),
            dtmf_type: read_string(state, "dtmf_type"),
            first_command_timeout: read_bool(state, "first_command_timeout"),
            first_command_timeout_secs: read_i64(state, "first_command_timeout_secs"),
            voice_fallback_url: read_string(state, "voice_fallback_url"),
            voice_method: read_string(state, "voice_method"),
            status_callback: read_string(state, "status_callback"),
            status_callback_method: read_string(state, "status_callback_method"),
            inbound: Some(application_inbound_from_state(state)),
            outbound: Some(application_outbound_from_state(state)),
            ..Default::default()
        })
    }

    fn state_from_application(application: &TexmlApplication) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(application.id.as_str()));
        state.insert(
            "friendly_name".into(),
            Dynamic::from(application.friendly_name.as_str()),
        );
        state.insert(
            "voice_url".into(),
            Dynamic::from(application.voice_url.as_str()),
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
        for (name, value, default) in [
            (
                "voice_fallback_url",
                &application.voice_fallback_url,
                app_defaults::VOICE_FALLBACK_URL,
            ),
            ("voice_method", &application.voice_method, app_defaults::VOICE_METHOD),
            (
                "status_callback",
                &application.status_callback,
                app_defaults::STATUS_CALLBACK,
            ),
            (
                "status_callback_method",
                &application.status_callback_method,
                app_defaults::STATUS_CALLBACK_METHOD,
            ),
        ] {
            state.insert(name.into(), string_or(value.as_deref(), default));
        }
        state.insert(
            INBOUND.into(),
            application_inbound_to_state(application.inbound.as_ref(), &TEXML_SETTINGS),
        );
        state.insert(
            OUTBOUND.into(),
            application_outbound_to_state(application.outbound.as_ref(), &TEXML_SETTINGS),
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
impl ResourceWithConfigure for TexmlApplicationResource {
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
impl ResourceWithImportState for TexmlApplicationResource {
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

    async fn configured(server_url: &str) -> TexmlApplicationResource {
        let client = Client::new(server_url, "test-key").unwrap();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(TelnyxProviderData::new(client));
        let mut resource = TexmlApplicationResource::new();
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

    fn plan() -> DynamicValue {
        let mut plan = Object::new();
        plan.insert("id".into(), Dynamic::Unknown);
        plan.insert("friendly_name".into(), Dynamic::from("ivr"));
        plan.insert("voice_url".into(), Dynamic::from("https://example.com/texml"));
        plan.insert("voice_method".into(), Dynamic::from("get"));
        into_state(plan)
    }

    #[tokio::test]
    async fn create_fills_texml_defaults() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/texml_applications")
            .match_body(Matcher::PartialJson(json!({
                "friendly_name": "ivr",
                "voice_url": "https://example.com/texml",
                "voice_method": "get"
            })))
            .with_body(
                r#"{"data":{"id":"1293384261075731499","friendly_name":"ivr",
                "voice_url":"https://example.com/texml","voice_method":"get",
                "created_at":"2020-02-02T22:25:27.521+01:00"}}"#,
            )
            .create_async()
            .await;

        let resource = configured(&server.url()).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "telnyx_texml_application".to_string(),
                    planned_state: plan(),
                    config: plan(),
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty());
        let state = response.new_state;
        assert_eq!(
            state.get_string(&AttributePath::new("dtmf_type")).unwrap(),
            "Inband"
        );
        assert_eq!(
            state
                .get_string(&AttributePath::new("status_callback_method"))
                .unwrap(),
            "post"
        );
        assert_eq!(
            state
                .get_number(&AttributePath::new("inbound").attribute("channel_limit"))
                .unwrap(),
            10.0
        );
        assert!(state
            .get_bool(&AttributePath::new("inbound").attribute("shaken_stir_enabled"))
            .unwrap());
        assert_eq!(
            state.get_string(&AttributePath::new("created_at")).unwrap(),
            "2020-02-02T21:25:27.521Z"
        );
    }

    #[tokio::test]
    async fn delete_treats_missing_application_as_gone() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/texml_applications/1293384261075731499")
            .with_status(404)
            .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
            .create_async()
            .await;

        let mut prior = Object::new();
        prior.insert("id".into(), Dynamic::from("1293384261075731499"));

        let resource = configured(&server.url()).await;
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "telnyx_texml_application".to_string(),
                    prior_state: into_state(prior),
                },
            )
            .await;

        mock.assert_async().await;
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn validate_checks_every_url() {
        let mut config = Object::new();
        config.insert("voice_url".into(), Dynamic::from("https://example.com/texml"));
        config.insert("status_callback".into(), Dynamic::from("status"));
        let response = TexmlApplicationResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "telnyx_texml_application".to_string(),
                    config: into_state(config),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("status_callback"))
        );
    }
}
