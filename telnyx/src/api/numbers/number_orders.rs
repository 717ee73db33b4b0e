//! Number orders

use crate::api::common::string_or_number;
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct NumberOrder {
    pub id: String,
    #[serde(default)]
    pub phone_numbers: Vec<OrderedPhoneNumber>,
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub messaging_profile_id: Option<String>,
    #[serde(default)]
    pub billing_group_id: Option<String>,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub sub_number_orders_ids: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub requirements_met: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderedPhoneNumber {
    #[serde(default)]
    pub id: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub regulatory_requirements: Vec<RegulatoryRequirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryRequirement {
    #[serde(default)]
    pub requirement_id: String,
    #[serde(default)]
    pub field_value: String,
    #[serde(default)]
    pub field_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneNumberRequest {
    pub phone_number: String,
}

/// POST /number_orders body
#[derive(Debug, Clone, Serialize)]
pub struct CreateNumberOrderRequest {
    pub phone_numbers: Vec<PhoneNumberRequest>,
    pub connection_id: String,
    pub messaging_profile_id: String,
    pub billing_group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
}

/// PATCH /number_orders/{id} body; only these two fields are mutable
#[derive(Debug, Clone, Serialize)]
pub struct UpdateNumberOrderRequest {
    pub customer_reference: Option<String>,
    pub regulatory_requirements: Vec<RegulatoryRequirement>,
}

pub struct NumberOrdersApi<'a> {
    client: &'a Client,
}

impl<'a> NumberOrdersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /number_orders
    pub async fn list(&self) -> Result<Vec<NumberOrder>, ApiError> {
        self.client.get("/number_orders").await
    }

    /// GET /number_orders/{id}
    pub async fn get(&self, id: &str) -> Result<NumberOrder, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /number_orders
    pub async fn create(&self, request: &CreateNumberOrderRequest) -> Result<NumberOrder, ApiError> {
        self.client.post("/number_orders", request).await
    }

    /// PATCH /number_orders/{id}
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateNumberOrderRequest,
    ) -> Result<NumberOrder, ApiError> {
        self.client.patch(&Self::path(id), request).await
    }

    fn path(id: &str) -> String {
        format!("/number_orders/{}", urlencoding::encode(id))
    }
}
