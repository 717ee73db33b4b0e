//! gRPC service for the Terraform plugin protocol v6
//!
//! [`GrpcProvider`] adapts a [`ProviderServer`] to the generated tfplugin6
//! service. It converts values to and from msgpack, schemas to cty type
//! JSON and diagnostics to their wire form. Lifecycle logic stays in the
//! server.

use crate::codec::{conform, decode_msgpack, encode_msgpack};
use crate::context::Context;
use crate::proto;
use crate::provider::Provider;
use crate::schema::{Attribute, AttributeType, ObjectNestingMode, Schema};
use crate::server::{ProviderSchemas, ProviderServer};
use crate::types::{AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, DynamicValue};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tonic::{Request, Response, Status};

type RpcResult<T> = std::result::Result<Response<T>, Status>;

pub struct GrpcProvider<P: Provider> {
    server: Arc<ProviderServer<P>>,
    schemas: OnceCell<Arc<ProviderSchemas>>,
    /// Shared by every request; StopProvider cancels it
    stop: Context,
}

impl<P: Provider + 'static> GrpcProvider<P> {
    pub fn new(provider: P) -> Self {
        Self::from_server(Arc::new(ProviderServer::new(provider)))
    }

    pub fn from_server(server: Arc<ProviderServer<P>>) -> Self {
        Self {
            server,
            schemas: OnceCell::new(),
            stop: Context::new(),
        }
    }

    async fn schemas(&self) -> Arc<ProviderSchemas> {
        self.schemas
            .get_or_init(|| async {
                Arc::new(self.server.get_provider_schema(Context::new()).await)
            })
            .await
            .clone()
    }

    #[allow(clippy::result_large_err)]
    async fn resource_schema(&self, type_name: &str) -> std::result::Result<Schema, Status> {
        self.schemas()
            .await
            .resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("Unknown resource type: {}", type_name)))
    }

    #[allow(clippy::result_large_err)]
    async fn data_source_schema(&self, type_name: &str) -> std::result::Result<Schema, Status> {
        self.schemas()
            .await
            .data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("Unknown data source type: {}", type_name)))
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::ProviderService for GrpcProvider<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> RpcResult<proto::get_metadata::Response> {
        let schemas = self.schemas().await;

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: diagnostics_to_proto(&schemas.diagnostics),
            data_sources: schemas
                .data_sources
                .keys()
                .map(|name| proto::get_metadata::DataSourceMetadata {
                    type_name: name.clone(),
                })
                .collect(),
            resources: schemas
                .resources
                .keys()
                .map(|name| proto::get_metadata::ResourceMetadata {
                    type_name: name.clone(),
                })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> RpcResult<proto::get_provider_schema::Response> {
        let schemas = self.schemas().await;

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&schemas.provider)),
            resource_schemas: schemas
                .resources
                .iter()
                .map(|(name, schema)| (name.clone(), schema_to_proto(schema)))
                .collect(),
            data_source_schemas: schemas
                .data_sources
                .iter()
                .map(|(name, schema)| (name.clone(), schema_to_proto(schema)))
                .collect(),
            diagnostics: diagnostics_to_proto(&schemas.diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> RpcResult<proto::validate_provider_config::Response> {
        let req = request.into_inner();
        let config = decode_value(&req.config)?;

        let diagnostics = self
            .server
            .validate_provider_config(self.stop.clone(), config)
            .await;

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(&diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> RpcResult<proto::validate_resource_config::Response> {
        let req = request.into_inner();
        let config = decode_value(&req.config)?;

        let diagnostics = self
            .server
            .validate_resource_config(self.stop.clone(), &req.type_name, config)
            .await;

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(&diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> RpcResult<proto::validate_data_resource_config::Response> {
        let req = request.into_inner();
        let config = decode_value(&req.config)?;

        let diagnostics = self
            .server
            .validate_data_source_config(self.stop.clone(), &req.type_name, config)
            .await;

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(&diagnostics),
        }))
    }

    /// Stored state is re-shaped to the current schema. All schemas are at
    /// version 0 so no migrations run.
    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> RpcResult<proto::upgrade_resource_state::Response> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;

        let json = req.raw_state.map(|raw| raw.json).unwrap_or_default();
        if json.is_empty() {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(&[Diagnostic::error(
                    "Unsupported state format",
                    format!(
                        "{} state has no JSON form; flatmap state is not supported",
                        req.type_name
                    ),
                )]),
            }));
        }

        let state = DynamicValue::decode_json(&json)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        tracing::debug!(
            "Upgrading {} state from schema version {}",
            req.type_name,
            req.version
        );

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_value(&schema.block.attributes, &state)?),
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> RpcResult<proto::configure_provider::Response> {
        let req = request.into_inner();
        let config = decode_value(&req.config)?;

        let diagnostics = self
            .server
            .configure_provider_with_version(self.stop.clone(), &req.terraform_version, config)
            .await;

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(&diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> RpcResult<proto::read_resource::Response> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;
        let current_state = decode_value(&req.current_state)?;

        let response = self
            .server
            .read_resource(self.stop.clone(), &req.type_name, current_state)
            .await;
        let new_state = response.new_state.unwrap_or_else(DynamicValue::null);

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_value(&schema.block.attributes, &new_state)?),
            diagnostics: diagnostics_to_proto(&response.diagnostics),
            private: req.private,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> RpcResult<proto::plan_resource_change::Response> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;
        let prior_state = decode_value(&req.prior_state)?;
        let proposed_new_state = decode_value(&req.proposed_new_state)?;
        let config = decode_value(&req.config)?;

        let response = self
            .server
            .plan_resource_change(
                self.stop.clone(),
                &req.type_name,
                prior_state,
                proposed_new_state,
                config,
            )
            .await;

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_value(
                &schema.block.attributes,
                &response.planned_state,
            )?),
            requires_replace: response.requires_replace.iter().map(path_to_proto).collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(&response.diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> RpcResult<proto::apply_resource_change::Response> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;
        let prior_state = decode_value(&req.prior_state)?;
        let planned_state = decode_value(&req.planned_state)?;
        let config = decode_value(&req.config)?;

        let response = self
            .server
            .apply_resource_change(
                self.stop.clone(),
                &req.type_name,
                prior_state,
                planned_state,
                config,
            )
            .await;

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_value(&schema.block.attributes, &response.new_state)?),
            private: req.planned_private,
            diagnostics: diagnostics_to_proto(&response.diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> RpcResult<proto::import_resource_state::Response> {
        let req = request.into_inner();
        let schema = self.resource_schema(&req.type_name).await?;

        let response = self
            .server
            .import_resource_state(self.stop.clone(), &req.type_name, &req.id)
            .await;

        let imported_resources = response
            .imported_resources
            .iter()
            .map(|imported| {
                Ok(proto::import_resource_state::ImportedResource {
                    type_name: imported.type_name.clone(),
                    state: Some(encode_value(&schema.block.attributes, &imported.state)?),
                    private: vec![],
                })
            })
            .collect::<std::result::Result<Vec<_>, Status>>()?;

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(&response.diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> RpcResult<proto::read_data_source::Response> {
        let req = request.into_inner();
        let schema = self.data_source_schema(&req.type_name).await?;
        let config = decode_value(&req.config)?;

        let response = self
            .server
            .read_data_source(self.stop.clone(), &req.type_name, config)
            .await;

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_value(&schema.block.attributes, &response.state)?),
            diagnostics: diagnostics_to_proto(&response.diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> RpcResult<proto::stop_provider::Response> {
        tracing::info!("Terraform requested provider stop");
        self.stop.cancel();

        let error = self.server.stop_provider(Context::new()).await;
        Ok(Response::new(proto::stop_provider::Response {
            error: error.unwrap_or_default(),
        }))
    }
}

fn server_capabilities() -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: false,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

/// Msgpack is preferred; JSON is accepted for callers that only send it
#[allow(clippy::result_large_err)]
fn decode_value(value: &Option<proto::DynamicValue>) -> std::result::Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    let decoded = if !value.msgpack.is_empty() {
        decode_msgpack(&value.msgpack).map(DynamicValue::new)
    } else {
        DynamicValue::decode_json(&value.json)
    };
    decoded.map_err(|e| Status::invalid_argument(e.to_string()))
}

#[allow(clippy::result_large_err)]
fn encode_value(
    attributes: &[Attribute],
    value: &DynamicValue,
) -> std::result::Result<proto::DynamicValue, Status> {
    let msgpack = encode_msgpack(&conform(attributes, &value.value))
        .map_err(|e| Status::internal(e.to_string()))?;

    Ok(proto::DynamicValue {
        msgpack,
        json: vec![],
    })
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: proto::StringKind::Plain as i32,
            deprecated: schema.block.deprecated,
        }),
    }
}

fn attribute_to_proto(attr: &Attribute) -> proto::schema::Attribute {
    let nested_type = attr.nested_type.as_ref().map(|nested| proto::schema::Object {
        attributes: nested.attributes.iter().map(attribute_to_proto).collect(),
        nesting: match nested.nesting {
            ObjectNestingMode::Single => proto::schema::object::NestingMode::Single,
            ObjectNestingMode::List => proto::schema::object::NestingMode::List,
        } as i32,
    });

    // Nested attributes describe their type through nested_type only
    let r#type = if nested_type.is_some() {
        vec![]
    } else {
        type_json(&attr.r#type)
    };

    proto::schema::Attribute {
        name: attr.name.clone(),
        r#type,
        nested_type,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: proto::StringKind::Plain as i32,
        deprecated: attr.deprecated,
    }
}

/// cty type constraint in its JSON form, e.g. `["list","string"]`
fn type_json(type_: &AttributeType) -> Vec<u8> {
    serde_json::to_vec(&type_value(type_)).unwrap_or_default()
}

fn type_value(type_: &AttributeType) -> serde_json::Value {
    use serde_json::json;

    match type_ {
        AttributeType::String => json!("string"),
        AttributeType::Number => json!("number"),
        AttributeType::Bool => json!("bool"),
        AttributeType::List(elem) => json!(["list", type_value(elem)]),
        AttributeType::Set(elem) => json!(["set", type_value(elem)]),
        AttributeType::Map(elem) => json!(["map", type_value(elem)]),
        AttributeType::Object(fields) => {
            let fields: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(name, field)| (name.clone(), type_value(field)))
                .collect();
            json!(["object", fields])
        }
    }
}

fn diagnostics_to_proto(diagnostics: &[Diagnostic]) -> Vec<proto::Diagnostic> {
    diagnostics
        .iter()
        .map(|diag| proto::Diagnostic {
            severity: match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            } as i32,
            summary: diag.summary.clone(),
            detail: diag.detail.clone(),
            attribute: diag.attribute.as_ref().map(path_to_proto),
        })
        .collect()
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "grpc_test.rs"]
mod grpc_test;
