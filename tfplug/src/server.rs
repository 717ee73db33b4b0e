//! In-process lifecycle server
//!
//! [`ProviderServer`] drives a [`Provider`] through the same sequence of calls
//! Terraform makes: schema discovery, provider configuration, validation,
//! planning, apply, refresh and import. The framework work lives here.
//! Defaults are applied, computed attributes are marked unknown, plan
//! modifiers run and replacement paths are collected, so providers only
//! implement the remote CRUD.

use crate::context::Context;
use crate::error::TfplugError;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
};
use crate::provider::{
    ConfigureProviderRequest, Provider, ProviderSchemaRequest, StopProviderRequest,
    ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, ResourceSchemaRequest, ResourceWithConfigure,
    UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{
    value_conforms, Attribute, DefaultRequest, ObjectNestingMode, PlanModifierRequest, Schema,
    ValidatorRequest,
};
use crate::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

static NULL: Dynamic = Dynamic::Null;

/// Schemas for the provider block and everything it registers
pub struct ProviderSchemas {
    pub provider: Schema,
    pub resources: HashMap<String, Schema>,
    pub data_sources: HashMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PlanResourceChangeResponse {
    /// Null when the plan destroys the resource
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ApplyResourceChangeResponse {
    /// Null after a destroy
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ProviderServer<P: Provider> {
    provider: RwLock<P>,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
}

impl<P: Provider> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: RwLock::new(provider),
            provider_data: RwLock::new(None),
        }
    }

    pub async fn get_provider_schema(&self, ctx: Context) -> ProviderSchemas {
        let provider = self.provider.read().await;
        let mut diagnostics = vec![];

        let provider_schema = provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await;
        diagnostics.extend(provider_schema.diagnostics);

        let mut resources = HashMap::new();
        for (name, factory) in provider.resources() {
            let response = factory().schema(ctx.clone(), ResourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            resources.insert(name, response.schema);
        }

        let mut data_sources = HashMap::new();
        for (name, factory) in provider.data_sources() {
            let response = factory()
                .schema(ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            data_sources.insert(name, response.schema);
        }

        ProviderSchemas {
            provider: provider_schema.schema,
            resources,
            data_sources,
            diagnostics,
        }
    }

    /// Validates the provider block, then configures the provider and keeps
    /// its `provider_data` for later resource and data source instances
    pub async fn configure_provider(&self, ctx: Context, config: DynamicValue) -> Vec<Diagnostic> {
        self.configure_provider_with_version(ctx, "", config).await
    }

    /// [`configure_provider`](Self::configure_provider) with the calling
    /// Terraform version passed through to the provider
    pub async fn configure_provider_with_version(
        &self,
        ctx: Context,
        terraform_version: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        if let Some(diag) = cancelled(&ctx) {
            return vec![diag];
        }

        let mut provider = self.provider.write().await;
        let mut diagnostics = validate_provider(&*provider, ctx.clone(), &config).await;
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = provider
            .configure(
                ctx,
                ConfigureProviderRequest {
                    terraform_version: terraform_version.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        if !has_errors(&diagnostics) {
            *self.provider_data.write().await = response.provider_data;
            tracing::info!("Provider {} configured", provider.type_name());
        }

        diagnostics
    }

    /// Schema and provider validation of the provider block, without
    /// configuring anything
    pub async fn validate_provider_config(
        &self,
        ctx: Context,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        if let Some(diag) = cancelled(&ctx) {
            return vec![diag];
        }

        let provider = self.provider.read().await;
        validate_provider(&*provider, ctx, &config).await
    }

    pub async fn validate_resource_config(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        if let Some(diag) = cancelled(&ctx) {
            return vec![diag];
        }

        let resource = match self.new_resource(type_name).await {
            Ok(resource) => resource,
            Err(diag) => return vec![diag],
        };
        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;

        let mut diagnostics = vec![];
        validate_object(
            &schema.block.attributes,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = resource
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn validate_data_source_config(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        if let Some(diag) = cancelled(&ctx) {
            return vec![diag];
        }

        let data_source = match self.new_data_source(type_name).await {
            Ok(data_source) => data_source,
            Err(diag) => return vec![diag],
        };
        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema;

        let mut diagnostics = vec![];
        validate_object(
            &schema.block.attributes,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = data_source
            .validate(
                ctx,
                ValidateDataSourceConfigRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    /// Plans a change from `prior_state` (null on create) towards `config`
    /// (null on destroy).
    ///
    /// `proposed_new_state` is Terraform's merge of config over prior state.
    /// Computed attributes the config leaves unset keep their proposed value.
    /// Defaults, unknown markers and plan modifiers are layered on top.
    pub async fn plan_resource_change(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
        proposed_new_state: DynamicValue,
        config: DynamicValue,
    ) -> PlanResourceChangeResponse {
        let mut response = PlanResourceChangeResponse {
            planned_state: DynamicValue::null(),
            requires_replace: vec![],
            diagnostics: vec![],
        };

        if let Some(diag) = cancelled(&ctx) {
            response.diagnostics.push(diag);
            return response;
        }

        if config.is_null() {
            tracing::debug!("Planning destroy of {}", type_name);
            return response;
        }

        let resource = match self.new_resource(type_name).await {
            Ok(resource) => resource,
            Err(diag) => {
                response.diagnostics.push(diag);
                return response;
            }
        };
        let schema = resource.schema(ctx, ResourceSchemaRequest).await.schema;
        let attributes = &schema.block.attributes;

        let creating = prior_state.is_null();
        let prior = &prior_state.value;
        let mut planned = plan_object(
            attributes,
            &config.value,
            &proposed_new_state.value,
            prior,
            &AttributePath::root(),
        );

        if !creating && !planned.semantically_equal(prior) {
            mark_computed_unknown(attributes, &config.value, &mut planned);
        }

        for attr in attributes.iter().filter(|a| !a.plan_modifiers.is_empty()) {
            let path = AttributePath::new(&attr.name);
            let mut plan_value = DynamicValue::new(field(&planned, &attr.name).clone());

            for modifier in &attr.plan_modifiers {
                let modified = modifier.modify(PlanModifierRequest {
                    config_value: DynamicValue::new(field(&config.value, &attr.name).clone()),
                    state_value: DynamicValue::new(field(prior, &attr.name).clone()),
                    plan_value,
                    path: path.clone(),
                });
                plan_value = modified.plan_value;
                response.diagnostics.extend(modified.diagnostics);
                if modified.requires_replace && !creating {
                    response.requires_replace.push(path.clone());
                }
            }

            if let Dynamic::Map(entries) = &mut planned {
                entries.insert(attr.name.clone(), plan_value.value);
            }
        }

        tracing::debug!(
            "Planned {} for {} ({} replacement paths)",
            if creating { "create" } else { "update" },
            type_name,
            response.requires_replace.len()
        );

        response.planned_state = DynamicValue::new(planned);
        response
    }

    /// Applies a planned change: create when `prior_state` is null, delete
    /// when `planned_state` is null, update otherwise
    pub async fn apply_resource_change(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
        planned_state: DynamicValue,
        config: DynamicValue,
    ) -> ApplyResourceChangeResponse {
        if let Some(diag) = cancelled(&ctx) {
            return ApplyResourceChangeResponse {
                new_state: prior_state,
                diagnostics: vec![diag],
            };
        }

        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ApplyResourceChangeResponse {
                    new_state: prior_state,
                    diagnostics,
                }
            }
        };

        if planned_state.is_null() {
            tracing::info!("Deleting {}", type_name);
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: type_name.to_string(),
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                prior_state
            } else {
                DynamicValue::null()
            };
            return ApplyResourceChangeResponse {
                new_state,
                diagnostics: response.diagnostics,
            };
        }

        let (new_state, mut diagnostics) = if prior_state.is_null() {
            tracing::info!("Creating {}", type_name);
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: type_name.to_string(),
                        planned_state,
                        config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        } else {
            tracing::info!("Updating {}", type_name);
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name: type_name.to_string(),
                        prior_state,
                        planned_state,
                        config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        };

        if !has_errors(&diagnostics) && contains_unknown(&new_state.value) {
            diagnostics.push(Diagnostic::error(
                "Provider returned invalid result object after apply",
                format!(
                    "{} left unknown values in its new state; all values must be known after apply",
                    type_name
                ),
            ));
        }

        ApplyResourceChangeResponse {
            new_state,
            diagnostics,
        }
    }

    /// Refreshes state; `new_state: None` means the object is gone remotely
    pub async fn read_resource(
        &self,
        ctx: Context,
        type_name: &str,
        current_state: DynamicValue,
    ) -> ReadResourceResponse {
        if let Some(diag) = cancelled(&ctx) {
            return ReadResourceResponse {
                new_state: Some(current_state),
                diagnostics: vec![diag],
            };
        }

        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: Some(current_state),
                    diagnostics,
                }
            }
        };

        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: type_name.to_string(),
                    current_state,
                },
            )
            .await;

        if response.new_state.is_none() {
            tracing::warn!("{} no longer exists, removing from state", type_name);
        }
        response
    }

    /// Imports by ID and immediately reads each imported object
    pub async fn import_resource_state(
        &self,
        ctx: Context,
        type_name: &str,
        id: &str,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        if let Some(diag) = cancelled(&ctx) {
            response.diagnostics.push(diag);
            return response;
        }

        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                response.diagnostics = diagnostics;
                return response;
            }
        };

        let Some(importer) = resource.as_import_state() else {
            response.diagnostics.push(Diagnostic::error(
                "Resource Import Not Implemented",
                format!("{} does not support import", type_name),
            ));
            return response;
        };

        let imported = importer
            .import_state(
                ctx.clone(),
                ImportResourceStateRequest {
                    type_name: type_name.to_string(),
                    id: id.to_string(),
                },
            )
            .await;
        response.diagnostics.extend(imported.diagnostics);
        if has_errors(&response.diagnostics) {
            return response;
        }

        for partial in imported.imported_resources {
            let read = resource
                .read(
                    ctx.clone(),
                    ReadResourceRequest {
                        type_name: partial.type_name.clone(),
                        current_state: partial.state,
                    },
                )
                .await;
            response.diagnostics.extend(read.diagnostics);

            match read.new_state {
                Some(state) => response.imported_resources.push(ImportedResource {
                    type_name: partial.type_name,
                    state,
                }),
                None => response.diagnostics.push(Diagnostic::error(
                    "Cannot import non-existent remote object",
                    format!("No {} exists with ID \"{}\"", type_name, id),
                )),
            }
        }

        response
    }

    pub async fn read_data_source(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> ReadDataSourceResponse {
        if let Some(diag) = cancelled(&ctx) {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diag],
            };
        }

        let mut data_source = match self.new_data_source(type_name).await {
            Ok(data_source) => data_source,
            Err(diag) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![diag],
                }
            }
        };

        let provider_data = self.provider_data.read().await.clone();
        let configured = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        if has_errors(&configured.diagnostics) {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: configured.diagnostics,
            };
        }

        let mut response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;

        let mut diagnostics = configured.diagnostics;
        diagnostics.append(&mut response.diagnostics);
        response.diagnostics = diagnostics;
        response
    }

    pub async fn stop_provider(&self, ctx: Context) -> Option<String> {
        let provider = self.provider.read().await;
        provider.stop(ctx, StopProviderRequest).await.error
    }

    async fn new_resource(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, Diagnostic> {
        let provider = self.provider.read().await;
        provider
            .resources()
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| {
                Diagnostic::error(
                    "Unknown resource type",
                    TfplugError::ResourceNotFound(type_name.to_string()).to_string(),
                )
            })
    }

    async fn new_data_source(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, Diagnostic> {
        let provider = self.provider.read().await;
        provider
            .data_sources()
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| {
                Diagnostic::error(
                    "Unknown data source type",
                    TfplugError::DataSourceNotFound(type_name.to_string()).to_string(),
                )
            })
    }

    async fn configured_resource(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let mut resource = self.new_resource(type_name).await.map_err(|d| vec![d])?;
        let provider_data = self.provider_data.read().await.clone();

        let response = resource
            .configure(ctx, ConfigureResourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }
}

async fn validate_provider<P: Provider>(
    provider: &P,
    ctx: Context,
    config: &DynamicValue,
) -> Vec<Diagnostic> {
    let schema = provider
        .schema(ctx.clone(), ProviderSchemaRequest)
        .await
        .schema;

    let mut diagnostics = vec![];
    validate_object(
        &schema.block.attributes,
        &config.value,
        &AttributePath::root(),
        &mut diagnostics,
    );
    if has_errors(&diagnostics) {
        return diagnostics;
    }

    let validated = provider
        .validate(
            ctx,
            ValidateProviderConfigRequest {
                config: config.clone(),
            },
        )
        .await;
    diagnostics.extend(validated.diagnostics);
    diagnostics
}

fn cancelled(ctx: &Context) -> Option<Diagnostic> {
    ctx.is_cancelled().then(|| {
        Diagnostic::error("Operation cancelled", TfplugError::Cancelled.to_string())
    })
}

fn field<'a>(object: &'a Dynamic, name: &str) -> &'a Dynamic {
    match object {
        Dynamic::Map(entries) => entries.get(name).unwrap_or(&NULL),
        _ => &NULL,
    }
}

fn contains_unknown(value: &Dynamic) -> bool {
    match value {
        Dynamic::Unknown => true,
        Dynamic::List(items) => items.iter().any(contains_unknown),
        Dynamic::Map(entries) => entries.values().any(contains_unknown),
        _ => false,
    }
}

/// Builds the planned object for one level of attributes.
///
/// Configured values win. Absent values take the attribute default. Failing
/// that, computed attributes take the proposed value, then the prior value,
/// and are unknown when there is no prior object.
fn plan_object(
    attributes: &[Attribute],
    config: &Dynamic,
    proposed: &Dynamic,
    prior: &Dynamic,
    path: &AttributePath,
) -> Dynamic {
    let prior_exists = matches!(prior, Dynamic::Map(_));
    let mut planned = HashMap::new();

    for attr in attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let config_value = field(config, &attr.name);
        let proposed_value = field(proposed, &attr.name);
        let prior_value = field(prior, &attr.name);

        let value = if !config_value.is_null() {
            plan_nested(attr, config_value, proposed_value, prior_value, &attr_path)
        } else if let Some(default) = &attr.default {
            let default_value = default
                .default_value(DefaultRequest {
                    path: attr_path.clone(),
                })
                .value
                .value;
            plan_nested(attr, &default_value, &NULL, prior_value, &attr_path)
        } else if attr.computed {
            if !proposed_value.is_null() {
                proposed_value.clone()
            } else if prior_exists {
                prior_value.clone()
            } else {
                Dynamic::Unknown
            }
        } else {
            Dynamic::Null
        };

        planned.insert(attr.name.clone(), value);
    }

    Dynamic::Map(planned)
}

fn plan_nested(
    attr: &Attribute,
    value: &Dynamic,
    proposed: &Dynamic,
    prior: &Dynamic,
    path: &AttributePath,
) -> Dynamic {
    let Some(nested) = &attr.nested_type else {
        return value.clone();
    };

    match (nested.nesting, value) {
        (ObjectNestingMode::Single, Dynamic::Map(_)) => {
            plan_object(&nested.attributes, value, proposed, prior, path)
        }
        (ObjectNestingMode::List, Dynamic::List(items)) => {
            let proposed_items: &[Dynamic] = match proposed {
                Dynamic::List(p) => p,
                _ => &[],
            };
            let prior_items: &[Dynamic] = match prior {
                Dynamic::List(p) => p,
                _ => &[],
            };
            Dynamic::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        plan_object(
                            &nested.attributes,
                            item,
                            proposed_items.get(i).unwrap_or(&NULL),
                            prior_items.get(i).unwrap_or(&NULL),
                            &path.clone().index(i as i64),
                        )
                    })
                    .collect(),
            )
        }
        _ => value.clone(),
    }
}

/// On update, top-level computed attributes the user did not set become
/// unknown so the provider can refresh them; plan modifiers run afterwards
fn mark_computed_unknown(attributes: &[Attribute], config: &Dynamic, planned: &mut Dynamic) {
    let Dynamic::Map(entries) = planned else {
        return;
    };

    for attr in attributes {
        if attr.computed && attr.default.is_none() && field(config, &attr.name).is_null() {
            entries.insert(attr.name.clone(), Dynamic::Unknown);
        }
    }
}

/// Checks presence, types, read-only attributes and validators for one level
/// of attributes, recursing into nested objects
fn validate_object(
    attributes: &[Attribute],
    config: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Dynamic::Map(entries) = config {
        for key in entries.keys() {
            if !attributes.iter().any(|a| &a.name == key) {
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here", key),
                    )
                    .with_attribute(path.clone().attribute(key)),
                );
            }
        }
    }

    for attr in attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let value = field(config, &attr.name);

        if value.is_null() {
            if attr.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", attr_path),
                    )
                    .with_attribute(attr_path),
                );
            }
            continue;
        }

        if attr.computed && !attr.optional && !attr.required {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid configuration for read-only attribute",
                    format!("\"{}\" is computed and cannot be set", attr_path),
                )
                .with_attribute(attr_path),
            );
            continue;
        }

        if value.is_unknown() {
            continue;
        }

        if let Some(nested) = &attr.nested_type {
            match (nested.nesting, value) {
                (ObjectNestingMode::Single, Dynamic::Map(_)) => {
                    validate_object(&nested.attributes, value, &attr_path, diagnostics);
                }
                (ObjectNestingMode::List, Dynamic::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        validate_object(
                            &nested.attributes,
                            item,
                            &attr_path.clone().index(i as i64),
                            diagnostics,
                        );
                    }
                }
                _ => diagnostics.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("\"{}\" has the wrong shape", attr_path),
                    )
                    .with_attribute(attr_path.clone()),
                ),
            }
        } else if !value_conforms(value, &attr.r#type) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!(
                        "\"{}\" expects {:?}, got {}",
                        attr_path,
                        attr.r#type,
                        value.type_name()
                    ),
                )
                .with_attribute(attr_path),
            );
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                path: attr_path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
pub(crate) mod server_test;
