//! Built-in attribute validators

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};
use regex::Regex;

/// Accepts only strings from a fixed set of values
pub struct StringOneOf {
    values: Vec<String>,
}

impl StringOneOf {
    pub fn create(values: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.values.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(value) = &request.config_value.value {
            if !self.values.iter().any(|v| v == value) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid attribute value",
                        format!(
                            "{} must be one of [{}], got \"{}\"",
                            request.path,
                            self.values.join(", "),
                            value
                        ),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Requires strings to match a regular expression
pub struct StringMatchesPattern {
    pattern: Regex,
    message: String,
}

impl StringMatchesPattern {
    /// Fails with the regex error if `pattern` does not compile
    pub fn create(pattern: &str, message: &str) -> Result<Box<dyn Validator>, regex::Error> {
        Ok(Box::new(Self {
            pattern: Regex::new(pattern)?,
            message: message.to_string(),
        }))
    }
}

impl Validator for StringMatchesPattern {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(value) = &request.config_value.value {
            if !self.pattern.is_match(value) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid attribute value",
                        format!("{} {}, got \"{}\"", request.path, self.message, value),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Inclusive numeric range check
pub struct NumberBetween {
    min: f64,
    max: f64,
}

impl NumberBetween {
    pub fn create(min: f64, max: f64) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for NumberBetween {
    fn description(&self) -> String {
        format!("value must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::Number(n) = request.config_value.value {
            if n < self.min || n > self.max {
                diagnostics.push(
                    Diagnostic::error(
                        "Value out of range",
                        format!(
                            "{} must be between {} and {}, got {}",
                            request.path, self.min, self.max, n
                        ),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Rejects numbers with a fractional part
pub struct WholeNumber;

impl WholeNumber {
    pub fn create() -> Box<dyn Validator> {
        Box::new(Self)
    }
}

impl Validator for WholeNumber {
    fn description(&self) -> String {
        "value must be a whole number".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::Number(n) = request.config_value.value {
            if n.fract() != 0.0 {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid attribute value",
                        format!("{} must be a whole number, got {}", request.path, n),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, DynamicValue};

    fn request(value: Dynamic) -> ValidatorRequest {
        ValidatorRequest {
            config_value: DynamicValue::new(value),
            path: AttributePath::new("transport_protocol"),
        }
    }

    #[test]
    fn one_of_accepts_listed_value() {
        let validator = StringOneOf::create(&["UDP", "TCP", "TLS"]);
        let response = validator.validate(request(Dynamic::from("TCP")));
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn one_of_rejects_unlisted_value() {
        let validator = StringOneOf::create(&["UDP", "TCP", "TLS"]);
        let response = validator.validate(request(Dynamic::from("SCTP")));

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("SCTP"));
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("transport_protocol"))
        );
    }

    #[test]
    fn validators_skip_unknown_and_null() {
        let validator = StringOneOf::create(&["a"]);
        assert!(validator
            .validate(request(Dynamic::Unknown))
            .diagnostics
            .is_empty());
        assert!(validator
            .validate(request(Dynamic::Null))
            .diagnostics
            .is_empty());
    }

    #[test]
    fn pattern_validator_checks_e164() {
        let validator =
            StringMatchesPattern::create(r"^\+[1-9]\d{1,14}$", "must be in E.164 format").unwrap();

        assert!(validator
            .validate(request(Dynamic::from("+15551234567")))
            .diagnostics
            .is_empty());
        assert_eq!(
            validator
                .validate(request(Dynamic::from("5551234567")))
                .diagnostics
                .len(),
            1
        );
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(StringMatchesPattern::create("(", "broken").is_err());
    }

    #[test]
    fn number_between_bounds_are_inclusive() {
        let validator = NumberBetween::create(1.0, 65535.0);
        assert!(validator
            .validate(request(Dynamic::Number(65535.0)))
            .diagnostics
            .is_empty());
        assert_eq!(
            validator
                .validate(request(Dynamic::Number(0.0)))
                .diagnostics
                .len(),
            1
        );
    }

    #[test]
    fn whole_number_rejects_fractions() {
        let validator = WholeNumber::create();
        assert!(validator
            .validate(request(Dynamic::Number(5060.0)))
            .diagnostics
            .is_empty());

        let response = validator.validate(request(Dynamic::Number(5060.5)));
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("5060.5"));
    }
}
