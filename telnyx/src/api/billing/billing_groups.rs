//! Billing groups

use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct BillingGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Request body for create and update
#[derive(Debug, Clone, Serialize)]
pub struct BillingGroupRequest {
    pub name: String,
}

pub struct BillingGroupsApi<'a> {
    client: &'a Client,
}

impl<'a> BillingGroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /billing_groups
    pub async fn list(&self) -> Result<Vec<BillingGroup>, ApiError> {
        self.client.get("/billing_groups").await
    }

    /// GET /billing_groups/{id}
    pub async fn get(&self, id: &str) -> Result<BillingGroup, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /billing_groups
    pub async fn create(&self, request: &BillingGroupRequest) -> Result<BillingGroup, ApiError> {
        self.client.post("/billing_groups", request).await
    }

    /// PATCH /billing_groups/{id}
    pub async fn update(
        &self,
        id: &str,
        request: &BillingGroupRequest,
    ) -> Result<BillingGroup, ApiError> {
        self.client.patch(&Self::path(id), request).await
    }

    /// DELETE /billing_groups/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/billing_groups/{}", urlencoding::encode(id))
    }
}
