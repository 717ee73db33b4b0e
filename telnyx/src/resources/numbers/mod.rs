//! Number ordering resources

pub mod resource_number_order;

pub use resource_number_order::NumberOrderResource;
