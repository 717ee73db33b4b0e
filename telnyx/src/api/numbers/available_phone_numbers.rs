//! Available phone number search

use crate::api::{ApiError, ApiQueryParams, Client};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AvailablePhoneNumber {
    pub phone_number: String,
    #[serde(default)]
    pub vanity_format: Option<String>,
    #[serde(default)]
    pub best_effort: Option<bool>,
    #[serde(default)]
    pub quickship: Option<bool>,
    #[serde(default)]
    pub reservable: Option<bool>,
    #[serde(default)]
    pub region_information: Vec<RegionInformation>,
    #[serde(default)]
    pub cost_information: Option<CostInformation>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionInformation {
    #[serde(default)]
    pub region_type: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostInformation {
    #[serde(default)]
    pub upfront_cost: Option<String>,
    #[serde(default)]
    pub monthly_cost: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub name: String,
}

/// Search filters; unset filters are omitted from the query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailablePhoneNumbersFilter {
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub contains: Option<String>,
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub country_code: Option<String>,
    pub national_destination_code: Option<String>,
    pub rate_center: Option<String>,
    pub phone_number_type: Option<String>,
    pub features: Vec<String>,
    pub limit: Option<i64>,
    pub best_effort: Option<bool>,
    pub quickship: Option<bool>,
    pub reservable: Option<bool>,
    pub exclude_held_numbers: Option<bool>,
}

impl AvailablePhoneNumbersFilter {
    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional(
                "filter[phone_number][starts_with]",
                self.starts_with.as_deref(),
            )
            .add_optional("filter[phone_number][ends_with]", self.ends_with.as_deref())
            .add_optional("filter[phone_number][contains]", self.contains.as_deref())
            .add_optional("filter[locality]", self.locality.as_deref())
            .add_optional(
                "filter[administrative_area]",
                self.administrative_area.as_deref(),
            )
            .add_optional("filter[country_code]", self.country_code.as_deref())
            .add_optional(
                "filter[national_destination_code]",
                self.national_destination_code.as_deref(),
            )
            .add_optional("filter[rate_center]", self.rate_center.as_deref())
            .add_optional("filter[phone_number_type]", self.phone_number_type.as_deref())
            .add_all("filter[features]", &self.features)
            .add_optional("filter[limit]", self.limit)
            .add_optional("filter[best_effort]", self.best_effort)
            .add_optional("filter[quickship]", self.quickship)
            .add_optional("filter[reservable]", self.reservable)
            .add_optional("filter[exclude_held_numbers]", self.exclude_held_numbers)
    }
}

pub struct AvailablePhoneNumbersApi<'a> {
    client: &'a Client,
}

impl<'a> AvailablePhoneNumbersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /available_phone_numbers?filter[...]
    pub async fn list(
        &self,
        filter: &AvailablePhoneNumbersFilter,
    ) -> Result<Vec<AvailablePhoneNumber>, ApiError> {
        self.client
            .get_with_params("/available_phone_numbers", &filter.to_query_params())
            .await
    }
}
