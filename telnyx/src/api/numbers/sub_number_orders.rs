//! Sub number orders, one per country and number type within an order

use crate::api::{ApiError, Client};
use serde::Deserialize;

pub const STATUS_DELETED: &str = "deleted";
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Deserialize)]
pub struct SubNumberOrder {
    pub id: String,
    #[serde(default)]
    pub order_request_id: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone_number_type: Option<String>,
    #[serde(default)]
    pub phone_numbers_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub requirements_met: Option<bool>,
}

impl SubNumberOrder {
    /// Deleted and cancelled sub-orders cannot be cancelled again
    pub fn is_closed(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some(STATUS_DELETED) | Some(STATUS_CANCELLED)
        )
    }
}

pub struct SubNumberOrdersApi<'a> {
    client: &'a Client,
}

impl<'a> SubNumberOrdersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /sub_number_orders/{id}
    pub async fn get(&self, id: &str) -> Result<SubNumberOrder, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// PATCH /sub_number_orders/{id}/cancel
    pub async fn cancel(&self, id: &str) -> Result<SubNumberOrder, ApiError> {
        let path = format!("{}/cancel", Self::path(id));
        self.client.patch(&path, &serde_json::json!({})).await
    }

    fn path(id: &str) -> String {
        format!("/sub_number_orders/{}", urlencoding::encode(id))
    }
}
