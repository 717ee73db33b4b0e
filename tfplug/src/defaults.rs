//! Default value providers for attributes
//!
//! Defaults run during planning when an attribute is absent from
//! configuration. Attaching one through [`AttributeBuilder::default`] makes the
//! attribute optional and computed.
//!
//! [`AttributeBuilder::default`]: crate::schema::AttributeBuilder::default

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};
use std::collections::HashMap;

/// StaticDefault always yields the same value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }

    pub fn list(values: Vec<Dynamic>) -> Box<dyn Default> {
        Self::create(Dynamic::List(values))
    }

    pub fn string_list(values: &[&str]) -> Box<dyn Default> {
        Self::list(values.iter().map(|v| Dynamic::from(*v)).collect())
    }

    pub fn object(values: HashMap<String, Dynamic>) -> Box<dyn Default> {
        Self::create(Dynamic::Map(values))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn request() -> DefaultRequest {
        DefaultRequest {
            path: AttributePath::new("test"),
        }
    }

    #[test]
    fn static_string_default() {
        let default = StaticDefault::string("Latency");
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::from("Latency")
        );
    }

    #[test]
    fn static_string_list_default() {
        let default = StaticDefault::string_list(&["US", "CA"]);
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::List(vec![Dynamic::from("US"), Dynamic::from("CA")])
        );
    }

    #[test]
    fn static_object_default() {
        let default = StaticDefault::object(HashMap::from([(
            "port".to_string(),
            Dynamic::from("rtp+1"),
        )]));
        let value = default.default_value(request()).value;
        assert_eq!(
            value.get_string(&AttributePath::new("port")).unwrap(),
            "rtp+1"
        );
    }
}
