pub mod call_control_applications;
pub mod credential_connections;
pub mod fqdn_connections;
pub mod fqdns;
pub mod outbound_voice_profiles;
pub mod settings;
pub mod texml_applications;

use crate::api::Client;

pub use settings::{CallRecording, InboundSettings, OutboundSettings, RtcpSettings};

/// Voice API: connections, FQDNs, outbound profiles and applications
pub struct VoiceApi<'a> {
    client: &'a Client,
}

impl<'a> VoiceApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn outbound_voice_profiles(
        &self,
    ) -> outbound_voice_profiles::OutboundVoiceProfilesApi<'a> {
        outbound_voice_profiles::OutboundVoiceProfilesApi::new(self.client)
    }

    pub fn credential_connections(&self) -> credential_connections::CredentialConnectionsApi<'a> {
        credential_connections::CredentialConnectionsApi::new(self.client)
    }

    pub fn fqdn_connections(&self) -> fqdn_connections::FqdnConnectionsApi<'a> {
        fqdn_connections::FqdnConnectionsApi::new(self.client)
    }

    pub fn fqdns(&self) -> fqdns::FqdnsApi<'a> {
        fqdns::FqdnsApi::new(self.client)
    }

    pub fn call_control_applications(
        &self,
    ) -> call_control_applications::CallControlApplicationsApi<'a> {
        call_control_applications::CallControlApplicationsApi::new(self.client)
    }

    pub fn texml_applications(&self) -> texml_applications::TexmlApplicationsApi<'a> {
        texml_applications::TexmlApplicationsApi::new(self.client)
    }
}
