//! Messaging resources

pub mod resource_messaging_profile;

pub use resource_messaging_profile::MessagingProfileResource;
