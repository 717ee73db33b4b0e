//! Data source implementations

pub mod data_source_phone_number_lookup;

pub use data_source_phone_number_lookup::PhoneNumberLookupDataSource;
