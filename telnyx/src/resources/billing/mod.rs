//! Billing resources

pub mod resource_billing_group;

pub use resource_billing_group::BillingGroupResource;
