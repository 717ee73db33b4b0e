//! Voice resources: outbound profiles, SIP connections and applications

mod connection;
pub mod resource_call_control_application;
pub mod resource_credential_connection;
pub mod resource_fqdn;
pub mod resource_fqdn_connection;
pub mod resource_outbound_voice_profile;
pub mod resource_texml_application;

pub use resource_call_control_application::CallControlApplicationResource;
pub use resource_credential_connection::CredentialConnectionResource;
pub use resource_fqdn::FqdnResource;
pub use resource_fqdn_connection::FqdnConnectionResource;
pub use resource_outbound_voice_profile::OutboundVoiceProfileResource;
pub use resource_texml_application::TexmlApplicationResource;
