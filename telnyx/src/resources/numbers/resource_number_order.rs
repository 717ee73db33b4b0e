//! Number order resource implementation
//!
//! Orders are immutable apart from `customer_reference`; changing the ordered
//! numbers, their routing or their messaging profile forces a new order.
//! Destroying an order cancels every open sub-order, one per country and
//! number type.

use crate::api::numbers::number_orders::{
    CreateNumberOrderRequest, NumberOrder, OrderedPhoneNumber, PhoneNumberRequest,
    RegulatoryRequirement, UpdateNumberOrderRequest,
};
use crate::api::Client;
use crate::defaults::number_order as order_defaults;
use crate::resources::state::{
    into_state, object_string, optional_string, read_string, read_strings, string_or,
    strings_to_list, timestamp, Object,
};
use crate::resources::{
    api_error, computed_string, id_attribute, missing_id, not_configured, resource_id,
    timestamp_attributes,
};
use crate::TelnyxProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::RequiresReplaceIfChanged;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringMatchesPattern;

const E164_PATTERN: &str = r"^\+[1-9]\d{1,14}$";

#[derive(Default)]
pub struct NumberOrderResource {
    provider_data: Option<TelnyxProviderData>,
}

impl NumberOrderResource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn phone_number_attribute() -> Attribute {
    let builder = AttributeBuilder::new("phone_number", AttributeType::String)
        .description("Phone number in E.164 format")
        .required();

    match StringMatchesPattern::create(E164_PATTERN, "must be an E.164 phone number") {
        Ok(validator) => builder.validator(validator).build(),
        Err(e) => {
            tracing::error!("Invalid phone number pattern: {}", e);
            builder.build()
        }
    }
}

fn regulatory_requirements_attribute() -> Attribute {
    AttributeBuilder::list_nested(
        "regulatory_requirements",
        vec![
            computed_string("requirement_id", "Requirement identifier"),
            computed_string("field_value", "Value supplied for the requirement"),
            computed_string("field_type", "Kind of value expected"),
        ],
    )
    .description("Regulatory requirements attached to the number")
    .computed()
    .build()
}

#[async_trait]
impl Resource for NumberOrderResource {
    fn type_name(&self) -> &str {
        "telnyx_number_order"
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
            .description("Orders Telnyx phone numbers")
            .attribute(id_attribute("Number order identifier"))
            .attribute(
                AttributeBuilder::new("connection_id", AttributeType::String)
                    .description("Connection the numbers are assigned to")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("billing_group_id", AttributeType::String)
                    .description("Billing group charged for the numbers")
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("messaging_profile_id", AttributeType::String)
                    .description("Messaging profile the numbers are assigned to")
                    .default(StaticDefault::string(order_defaults::MESSAGING_PROFILE_ID))
                    .plan_modifier(RequiresReplaceIfChanged::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("customer_reference", AttributeType::String)
                    .description("Free-form reference for the order")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::list_nested(
                    "phone_numbers",
                    vec![
                        phone_number_attribute(),
                        computed_string("id", "Ordered number identifier"),
                        computed_string("status", "Status of the ordered number"),
                        regulatory_requirements_attribute(),
                    ],
                )
                .description("Numbers to order")
                .required()
                .plan_modifier(RequiresReplaceIfChanged::create())
                .build(),
            )
            .attribute(computed_string("status", "Order status"))
            .attribute(
                AttributeBuilder::new(
                    "sub_number_orders_ids",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .description("Sub-orders created for this order")
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

        if let Ok(numbers) = request
            .config
            .get_list(&AttributePath::new("phone_numbers"))
        {
            if numbers.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid phone_numbers",
                        "A number order needs at least one phone number",
                    )
                    .with_attribute(AttributePath::new("phone_numbers")),
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

        let order = match self.extract_order(&request.planned_state) {
            Ok(order) => order,
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
            .numbers()
            .number_orders()
            .create(&order)
            .await
        {
            Ok(created) => {
                tracing::info!(
                    "Created number order {} for {} numbers",
                    created.id,
                    order.phone_numbers.len()
                );
                CreateResourceResponse {
                    new_state: Self::state_from_order(&created),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to create number order", &e));
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

        match provider_data.client.numbers().number_orders().get(&id).await {
            Ok(order) => ReadResourceResponse {
                new_state: Some(Self::state_from_order(&order)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("Number order {} not found, removing from state", id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read number order", &e));
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

        let update = UpdateNumberOrderRequest {
            customer_reference: read_string(&request.planned_state, "customer_reference"),
            regulatory_requirements: vec![],
        };

        match provider_data
            .client
            .numbers()
            .number_orders()
            .update(&id, &update)
            .await
        {
            Ok(updated) => UpdateResourceResponse {
                new_state: Self::state_from_order(&updated),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(api_error("Failed to update number order", &e));
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

        let sub_order_ids = match read_strings(&request.prior_state, "sub_number_orders_ids") {
            Some(ids) if !ids.is_empty() => ids,
            _ => match provider_data.client.numbers().number_orders().get(&id).await {
                Ok(order) => order.sub_number_orders_ids,
                Err(e) if e.is_not_found() => {
                    tracing::warn!("Number order {} already gone", id);
                    return DeleteResourceResponse { diagnostics };
                }
                Err(e) => {
                    diagnostics.push(api_error("Failed to read number order", &e));
                    return DeleteResourceResponse { diagnostics };
                }
            },
        };

        if let Err(diag) = cancel_sub_orders(&provider_data.client, &sub_order_ids).await {
            diagnostics.push(diag);
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

/// Cancels each open sub-order in turn, stopping at the first failure
async fn cancel_sub_orders(client: &Client, ids: &[String]) -> Result<(), Diagnostic> {
    let sub_orders = client.numbers().sub_number_orders();

    for id in ids {
        let sub_order = match sub_orders.get(id).await {
            Ok(sub_order) => sub_order,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Sub number order {} not found, skipping", id);
                continue;
            }
            Err(e) => {
                return Err(api_error(
                    &format!("Failed to read sub number order {}", id),
                    &e,
                ))
            }
        };

        if sub_order.is_closed() {
            tracing::debug!(
                "Sub number order {} is {}, skipping",
                id,
                sub_order.status.as_deref().unwrap_or_default()
            );
            continue;
        }

        sub_orders.cancel(id).await.map_err(|e| {
            api_error(&format!("Failed to cancel sub number order {}", id), &e)
        })?;
        tracing::info!("Cancelled sub number order {}", id);
    }

    Ok(())
}

impl NumberOrderResource {
    fn extract_order(&self, state: &DynamicValue) -> Result<CreateNumberOrderRequest, Diagnostic> {
        let required = |name: &str| {
            read_string(state, name).ok_or_else(|| {
                Diagnostic::error(
                    format!("Missing {}", name),
                    format!("The '{}' attribute is required", name),
                )
                .with_attribute(AttributePath::new(name))
            })
        };

        let connection_id = required("connection_id")?;
        let billing_group_id = required("billing_group_id")?;

        let entries = state
            .get_list(&AttributePath::new("phone_numbers"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing phone_numbers",
                    "The 'phone_numbers' attribute is required",
                )
                .with_attribute(AttributePath::new("phone_numbers"))
            })?;

        let mut phone_numbers = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let number = match entry {
                Dynamic::Map(object) => object_string(object, "phone_number"),
                _ => None,
            };
            let Some(phone_number) = number else {
                return Err(Diagnostic::error(
                    "Missing phone_number",
                    "Every phone_numbers entry needs a phone_number",
                )
                .with_attribute(
                    AttributePath::new("phone_numbers")
                        .index(index as i64)
                        .attribute("phone_number"),
                ));
            };
            phone_numbers.push(PhoneNumberRequest { phone_number });
        }

        Ok(CreateNumberOrderRequest {
            phone_numbers,
            connection_id,
            messaging_profile_id: read_string(state, "messaging_profile_id")
                .unwrap_or_else(|| order_defaults::MESSAGING_PROFILE_ID.to_string()),
            billing_group_id,
            customer_reference: read_string(state, "customer_reference"),
        })
    }

    fn state_from_order(order: &NumberOrder) -> DynamicValue {
        let mut state = Object::new();
        state.insert("id".into(), Dynamic::from(order.id.as_str()));
        state.insert(
            "connection_id".into(),
            string_or(order.connection_id.as_deref(), ""),
        );
        state.insert(
            "billing_group_id".into(),
            string_or(order.billing_group_id.as_deref(), ""),
        );
        state.insert(
            "messaging_profile_id".into(),
            string_or(
                order.messaging_profile_id.as_deref(),
                order_defaults::MESSAGING_PROFILE_ID,
            ),
        );
        state.insert(
            "customer_reference".into(),
            optional_string(order.customer_reference.as_deref()),
        );
        state.insert(
            "phone_numbers".into(),
            Dynamic::List(order.phone_numbers.iter().map(ordered_number).collect()),
        );
        state.insert("status".into(), optional_string(order.status.as_deref()));
        state.insert(
            "sub_number_orders_ids".into(),
            strings_to_list(&order.sub_number_orders_ids),
        );
        state.insert("created_at".into(), timestamp(order.created_at.as_deref()));
        state.insert("updated_at".into(), timestamp(order.updated_at.as_deref()));
        into_state(state)
    }
}

fn ordered_number(number: &OrderedPhoneNumber) -> Dynamic {
    let mut object = Object::new();
    object.insert(
        "phone_number".into(),
        Dynamic::from(number.phone_number.as_str()),
    );
    object.insert("id".into(), optional_string(number.id.as_deref()));
    object.insert("status".into(), optional_string(number.status.as_deref()));
    object.insert(
        "regulatory_requirements".into(),
        Dynamic::List(
            number
                .regulatory_requirements
                .iter()
                .map(requirement)
                .collect(),
        ),
    );
    Dynamic::Map(object)
}

fn requirement(requirement: &RegulatoryRequirement) -> Dynamic {
    let mut object = Object::new();
    object.insert(
        "requirement_id".into(),
        Dynamic::from(requirement.requirement_id.as_str()),
    );
    object.insert(
        "field_value".into(),
        Dynamic::from(requirement.field_value.as_str()),
    );
    object.insert(
        "field_type".into(),
        Dynamic::from(requirement.field_type.as_str()),
    );
    Dynamic::Map(object)
}

#[async_trait]
impl ResourceWithConfigure for NumberOrderResource {
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
impl ResourceWithImportState for NumberOrderResource {
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
#[path = "resource_number_order_test.rs"]
mod resource_number_order_test;
