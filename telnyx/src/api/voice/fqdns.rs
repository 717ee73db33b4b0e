//! FQDNs attached to FQDN connections

use crate::api::common::string_or_number;
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fqdn {
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Sent as a string; older responses carry it as a number
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number::deserialize"
    )]
    pub connection_id: Option<String>,
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_record_type: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

pub struct FqdnsApi<'a> {
    client: &'a Client,
}

impl<'a> FqdnsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /fqdns
    pub async fn list(&self) -> Result<Vec<Fqdn>, ApiError> {
        self.client.get("/fqdns").await
    }

    /// GET /fqdns/{id}
    pub async fn get(&self, id: &str) -> Result<Fqdn, ApiError> {
        self.client.get(&Self::path(id)).await
    }

    /// POST /fqdns
    pub async fn create(&self, fqdn: &Fqdn) -> Result<Fqdn, ApiError> {
        self.client.post("/fqdns", fqdn).await
    }

    /// PATCH /fqdns/{id}
    pub async fn update(&self, id: &str, fqdn: &Fqdn) -> Result<Fqdn, ApiError> {
        self.client.patch(&Self::path(id), fqdn).await
    }

    /// DELETE /fqdns/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&Self::path(id)).await
    }

    fn path(id: &str) -> String {
        format!("/fqdns/{}", urlencoding::encode(id))
    }
}
