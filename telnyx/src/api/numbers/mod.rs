pub mod available_phone_numbers;
pub mod number_orders;
pub mod sub_number_orders;

use crate::api::Client;

/// Numbers API: ordering and search
pub struct NumbersApi<'a> {
    client: &'a Client,
}

impl<'a> NumbersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn number_orders(&self) -> number_orders::NumberOrdersApi<'a> {
        number_orders::NumberOrdersApi::new(self.client)
    }

    pub fn sub_number_orders(&self) -> sub_number_orders::SubNumberOrdersApi<'a> {
        sub_number_orders::SubNumberOrdersApi::new(self.client)
    }

    pub fn available_phone_numbers(
        &self,
    ) -> available_phone_numbers::AvailablePhoneNumbersApi<'a> {
        available_phone_numbers::AvailablePhoneNumbersApi::new(self.client)
    }
}
