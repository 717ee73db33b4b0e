//! Terraform provider for the Telnyx REST API
//!
//! Resources and data sources are registered as factories with
//! [`tfplug::server::ProviderServer`]; each one receives a clone of
//! [`TelnyxProviderData`] once the provider block is configured.

pub mod api;
pub mod data_sources;
pub mod defaults;
pub mod logging;
pub mod provider_data;
pub mod resources;

pub use provider_data::TelnyxProviderData;

use api::client::DEFAULT_ENDPOINT;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, StopProviderRequest, StopProviderResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub const ENDPOINT_ENV: &str = "TELNYX_ENDPOINT";
pub const API_KEY_ENV: &str = "TELNYX_API_KEY";

#[derive(Default)]
pub struct TelnyxProvider;

impl TelnyxProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Config value first, then the environment; empty strings count as unset
fn config_or_env(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .or_else(|| std::env::var(env).ok())
        .filter(|value| !value.is_empty())
}

fn resource_factory<R>(build: fn() -> R) -> ResourceFactory
where
    R: ResourceWithConfigure + 'static,
{
    Box::new(move || Box::new(build()) as Box<dyn ResourceWithConfigure>)
}

#[async_trait]
impl Provider for TelnyxProvider {
    fn type_name(&self) -> &str {
        "telnyx"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Telnyx provider")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Telnyx API base URL. Can also be set via TELNYX_ENDPOINT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description("Telnyx API key. Can also be set via TELNYX_API_KEY")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let endpoint = config_or_env(&request.config, "endpoint", ENDPOINT_ENV)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let Some(api_key) = config_or_env(&request.config, "api_key", API_KEY_ENV) else {
            diagnostics.push(
                Diagnostic::error(
                    "Missing API key",
                    "api_key is required (set in provider config or TELNYX_API_KEY env var)",
                )
                .with_attribute(AttributePath::new("api_key")),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        match api::Client::new(&endpoint, &api_key) {
            Ok(client) => {
                tracing::info!("Configured Telnyx client for {}", client.base_url());
                let provider_data = TelnyxProviderData::new(client);
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(provider_data) as Arc<dyn Any + Send + Sync>),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        if let Ok(endpoint) = request.config.get_string(&AttributePath::new("endpoint")) {
            if url::Url::parse(&endpoint).is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid endpoint",
                        format!("'{}' is not an absolute URL", endpoint),
                    )
                    .with_attribute(AttributePath::new("endpoint")),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        tracing::debug!("Stopping Telnyx provider");
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        use resources::{
            BillingGroupResource, CallControlApplicationResource, CredentialConnectionResource,
            FqdnConnectionResource, FqdnResource, MessagingProfileResource, NumberOrderResource,
            OutboundVoiceProfileResource, TexmlApplicationResource,
        };

        let mut factories = HashMap::new();
        factories.insert(
            "telnyx_billing_group".to_string(),
            resource_factory(BillingGroupResource::new),
        );
        factories.insert(
            "telnyx_messaging_profile".to_string(),
            resource_factory(MessagingProfileResource::new),
        );
        factories.insert(
            "telnyx_outbound_voice_profile".to_string(),
            resource_factory(OutboundVoiceProfileResource::new),
        );
        factories.insert(
            "telnyx_credential_connection".to_string(),
            resource_factory(CredentialConnectionResource::new),
        );
        factories.insert(
            "telnyx_fqdn_connection".to_string(),
            resource_factory(FqdnConnectionResource::new),
        );
        factories.insert(
            "telnyx_fqdn".to_string(),
            resource_factory(FqdnResource::new),
        );
        factories.insert(
            "telnyx_number_order".to_string(),
            resource_factory(NumberOrderResource::new),
        );
        factories.insert(
            "telnyx_call_control_application".to_string(),
            resource_factory(CallControlApplicationResource::new),
        );
        factories.insert(
            "telnyx_texml_application".to_string(),
            resource_factory(TexmlApplicationResource::new),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "telnyx_phone_number_lookup".to_string(),
            Box::new(|| {
                Box::new(data_sources::PhoneNumberLookupDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::types::Dynamic;

    fn config(values: &[(&str, &str)]) -> DynamicValue {
        let map: HashMap<String, Dynamic> = values
            .iter()
            .map(|(k, v)| (k.to_string(), Dynamic::from(*v)))
            .collect();
        DynamicValue::new(Dynamic::Map(map))
    }

    async fn configure(
        provider: &mut TelnyxProvider,
        config: DynamicValue,
    ) -> ConfigureProviderResponse {
        provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config,
                },
            )
            .await
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        std::env::set_var(API_KEY_ENV, "KEY0123456789");
        std::env::set_var(ENDPOINT_ENV, "https://api.example.com/v2/");

        let mut provider = TelnyxProvider::new();
        let response = configure(&mut provider, DynamicValue::object()).await;

        assert!(response.diagnostics.is_empty());
        let data = TelnyxProviderData::from_any(response.provider_data).unwrap();
        assert_eq!(data.client.base_url(), "https://api.example.com/v2");

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(ENDPOINT_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_wins_over_env() {
        std::env::set_var(API_KEY_ENV, "from-env");
        std::env::set_var(ENDPOINT_ENV, "https://env.example.com");

        let mut provider = TelnyxProvider::new();
        let response = configure(
            &mut provider,
            config(&[
                ("endpoint", "https://config.example.com/v2"),
                ("api_key", "from-config"),
            ]),
        )
        .await;

        assert!(response.diagnostics.is_empty());
        let data = TelnyxProviderData::from_any(response.provider_data).unwrap();
        assert_eq!(data.client.base_url(), "https://config.example.com/v2");

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(ENDPOINT_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_defaults_endpoint() {
        std::env::remove_var(ENDPOINT_ENV);
        std::env::set_var(API_KEY_ENV, "KEY0123456789");

        let mut provider = TelnyxProvider::new();
        let response = configure(&mut provider, DynamicValue::object()).await;

        let data = TelnyxProviderData::from_any(response.provider_data).unwrap();
        assert_eq!(data.client.base_url(), DEFAULT_ENDPOINT);

        std::env::remove_var(API_KEY_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_api_key() {
        std::env::remove_var(API_KEY_ENV);

        let mut provider = TelnyxProvider::new();
        let response = configure(&mut provider, config(&[("api_key", "")])).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .detail
            .contains("api_key is required"));
        assert!(response.provider_data.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn provider_reports_invalid_endpoint() {
        std::env::set_var(API_KEY_ENV, "KEY0123456789");

        let mut provider = TelnyxProvider::new();
        let response = configure(&mut provider, config(&[("endpoint", "not a url")])).await;

        assert_eq!(response.diagnostics[0].summary, "Failed to create API client");

        let validated = provider
            .validate(
                Context::new(),
                ValidateProviderConfigRequest {
                    config: config(&[("endpoint", "not a url")]),
                },
            )
            .await;
        assert_eq!(validated.diagnostics[0].summary, "Invalid endpoint");

        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn provider_schema_marks_api_key_sensitive() {
        let provider = TelnyxProvider::new();
        let response = tokio_test::block_on(provider.schema(Context::new(), ProviderSchemaRequest));

        let attributes = &response.schema.block.attributes;
        let api_key = attributes.iter().find(|a| a.name == "api_key").unwrap();
        assert!(api_key.optional && api_key.sensitive);
        let endpoint = attributes.iter().find(|a| a.name == "endpoint").unwrap();
        assert!(endpoint.optional && !endpoint.sensitive);
    }

    #[test]
    fn provider_registers_every_type() {
        let provider = TelnyxProvider::new();

        let resources = provider.resources();
        assert_eq!(resources.len(), 9);
        for (name, factory) in &resources {
            assert_eq!(factory().type_name(), name);
        }

        let data_sources = provider.data_sources();
        assert_eq!(
            data_sources["telnyx_phone_number_lookup"]().type_name(),
            "telnyx_phone_number_lookup"
        );
    }
}
