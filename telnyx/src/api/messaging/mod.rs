pub mod messaging_profiles;

use crate::api::Client;

/// Messaging API
pub struct MessagingApi<'a> {
    client: &'a Client,
}

impl<'a> MessagingApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn messaging_profiles(&self) -> messaging_profiles::MessagingProfilesApi<'a> {
        messaging_profiles::MessagingProfilesApi::new(self.client)
    }
}
