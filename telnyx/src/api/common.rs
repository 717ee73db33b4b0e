//! Common types and utilities for the Telnyx API

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Error body: `{"errors":[{"code":"10015","title":"...","detail":"..."}]}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub errors: Vec<TelnyxError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelnyxError {
    #[serde(default, deserialize_with = "string_or_number::deserialize")]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: {errors:?}")]
pub struct ApiErrorDetails {
    pub errors: Vec<TelnyxError>,
}

/// Query parameters for list endpoints
#[derive(Debug, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn add_optional<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.add(key, v),
            None => self,
        }
    }

    /// Adds the key once per value, keeping order
    pub fn add_all<T: ToString>(mut self, key: &str, values: &[T]) -> Self {
        for value in values {
            self = self.add(key, value.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }

        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("?{}", query)
    }
}

/// IDs that arrive either as JSON strings or as bare numbers
pub mod string_or_number {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Int(i64),
            Float(f64),
        }

        Ok(
            match Option::<StringOrNumber>::deserialize(deserializer)? {
                Some(StringOrNumber::String(s)) => Some(s),
                Some(StringOrNumber::Int(n)) => Some(n.to_string()),
                Some(StringOrNumber::Float(n)) => Some(n.to_string()),
                None => None,
            },
        )
    }
}

/// Numbers the API sometimes quotes, e.g. `"max_destination_rate": "10.0"`
pub mod number_or_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(f64),
            String(String),
        }

        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", s))),
            None => Ok(None),
        }
    }
}
