//! Phone number lookup data source implementation

use crate::api::numbers::available_phone_numbers::{
    AvailablePhoneNumber, AvailablePhoneNumbersFilter,
};
use crate::resources::state::{
    into_state, optional_string, read_bool, read_i64, read_string, read_strings, strings_to_list,
    Object,
};
use crate::TelnyxProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::WholeNumber;

const STRING_FILTERS: &[(&str, &str)] = &[
    ("starts_with", "Numbers starting with these digits"),
    ("ends_with", "Numbers ending with these digits"),
    ("contains", "Numbers containing these digits"),
    ("locality", "City or locality"),
    ("administrative_area", "State or province"),
    ("country_code", "ISO 3166-1 alpha-2 country code"),
    ("national_destination_code", "Area code"),
    ("rate_center", "Rate center"),
    ("phone_number_type", "local, toll_free, mobile, national or shared_cost"),
];

const BOOL_FILTERS: &[(&str, &str)] = &[
    ("best_effort", "Include numbers close to the requested pattern"),
    ("quickship", "Only numbers that can be activated immediately"),
    ("reservable", "Only numbers that can be reserved"),
    ("exclude_held_numbers", "Leave out numbers held by other customers"),
];

#[derive(Default)]
pub struct PhoneNumberLookupDataSource {
    provider_data: Option<TelnyxProviderData>,
}

impl PhoneNumberLookupDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn filter_attribute(name: &str, type_: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, type_)
        .description(description)
        .optional()
        .build()
}

fn computed(name: &str, type_: AttributeType) -> Attribute {
    AttributeBuilder::new(name, type_).computed().build()
}

#[async_trait]
impl DataSource for PhoneNumberLookupDataSource {
    fn type_name(&self) -> &str {
        "telnyx_phone_number_lookup"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let string_list = || AttributeType::List(Box::new(AttributeType::String));

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Searches phone numbers available for ordering")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The data source ID")
                    .computed()
                    .build(),
            )
            .attributes(
                STRING_FILTERS
                    .iter()
                    .map(|(name, desc)| filter_attribute(name, AttributeType::String, desc)),
            )
            .attributes(
                BOOL_FILTERS
                    .iter()
                    .map(|(name, desc)| filter_attribute(name, AttributeType::Bool, desc)),
            )
            .attribute(filter_attribute(
                "features",
                string_list(),
                "Required features, e.g. sms or voice",
            ))
            .attribute(
                AttributeBuilder::new("limit", AttributeType::Number)
                    .description("Maximum number of results")
                    .optional()
                    .validator(WholeNumber::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::list_nested(
                    "phone_numbers",
                    vec![
                        computed("phone_number", AttributeType::String),
                        computed("reservable", AttributeType::Bool),
                        computed("upfront_cost", AttributeType::String),
                        computed("monthly_cost", AttributeType::String),
                        computed("features", string_list()),
                    ],
                )
                .description("Matching numbers")
                .computed()
                .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(limit) = read_i64(&request.config, "limit") {
            if limit < 1 {
                diagnostics.push(
                    Diagnostic::error("Invalid limit", "limit must be at least 1")
                        .with_attribute(AttributePath::new("limit")),
                );
            }
        }

        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            ));
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        };

        let filter = filter_from_config(&request.config);
        let query = filter.to_query_params().to_query_string();
        tracing::debug!("Looking up available phone numbers {}", query);

        match provider_data
            .client
            .numbers()
            .available_phone_numbers()
            .list(&filter)
            .await
        {
            Ok(numbers) => {
                tracing::info!("Found {} available phone numbers", numbers.len());
                ReadDataSourceResponse {
                    state: state_from_numbers(&request.config, &query, &numbers),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to look up phone numbers",
                    format!("API error: {}", e),
                ));
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }
}

fn filter_from_config(config: &DynamicValue) -> AvailablePhoneNumbersFilter {
    AvailablePhoneNumbersFilter {
        starts_with: read_string(config, "starts_with"),
        ends_with: read_string(config, "ends_with"),
        contains: read_string(config, "contains"),
        locality: read_string(config, "locality"),
        administrative_area: read_string(config, "administrative_area"),
        country_code: read_string(config, "country_code"),
        national_destination_code: read_string(config, "national_destination_code"),
        rate_center: read_string(config, "rate_center"),
        phone_number_type: read_string(config, "phone_number_type"),
        features: read_strings(config, "features").unwrap_or_default(),
        limit: read_i64(config, "limit"),
        best_effort: read_bool(config, "best_effort"),
        quickship: read_bool(config, "quickship"),
        reservable: read_bool(config, "reservable"),
        exclude_held_numbers: read_bool(config, "exclude_held_numbers"),
    }
}

/// Filters are echoed back as configured; unset ones are null
fn state_from_numbers(
    config: &DynamicValue,
    query: &str,
    numbers: &[AvailablePhoneNumber],
) -> DynamicValue {
    let mut state = Object::new();

    let filter_names = STRING_FILTERS
        .iter()
        .chain(BOOL_FILTERS)
        .map(|(name, _)| *name)
        .chain(["features", "limit"]);
    for name in filter_names {
        let value = config
            .get(&AttributePath::new(name))
            .cloned()
            .unwrap_or(Dynamic::Null);
        state.insert(name.into(), value);
    }

    let query = query.trim_start_matches('?');
    let id = if query.is_empty() { "all" } else { query };
    state.insert("id".into(), Dynamic::from(id));
    state.insert(
        "phone_numbers".into(),
        Dynamic::List(numbers.iter().map(available_number).collect()),
    );
    into_state(state)
}

fn available_number(number: &AvailablePhoneNumber) -> Dynamic {
    let cost = number.cost_information.as_ref();
    let features: Vec<String> = number.features.iter().map(|f| f.name.clone()).collect();

    let mut object = Object::new();
    object.insert(
        "phone_number".into(),
        Dynamic::from(number.phone_number.as_str()),
    );
    object.insert("reservable".into(), Dynamic::from(number.reservable));
    object.insert(
        "upfront_cost".into(),
        optional_string(cost.and_then(|c| c.upfront_cost.as_deref())),
    );
    object.insert(
        "monthly_cost".into(),
        optional_string(cost.and_then(|c| c.monthly_cost.as_deref())),
    );
    object.insert("features".into(), strings_to_list(&features));
    Dynamic::Map(object)
}

#[async_trait]
impl DataSourceWithConfigure for PhoneNumberLookupDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        match TelnyxProviderData::from_any(request.provider_data) {
            Ok(provider_data) => self.provider_data = Some(provider_data),
            Err(diag) => {
                tracing::error!("Failed to configure phone number lookup: {}", diag.detail);
                diagnostics.push(diag);
            }
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
