pub mod billing_groups;

use crate::api::Client;

/// Billing API
pub struct BillingApi<'a> {
    client: &'a Client,
}

impl<'a> BillingApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Billing group operations
    pub fn billing_groups(&self) -> billing_groups::BillingGroupsApi<'a> {
        billing_groups::BillingGroupsApi::new(self.client)
    }
}
