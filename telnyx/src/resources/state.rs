//! Conversions between Terraform values and plain Rust values
//!
//! Readers return `None` for null, unknown and mistyped values so that
//! unset attributes simply drop out of request bodies. Writers fall back to
//! the given default when the API leaves a field out.

use std::collections::HashMap;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

pub type Object = HashMap<String, Dynamic>;

pub fn read_string(value: &DynamicValue, name: &str) -> Option<String> {
    value.get_string(&AttributePath::new(name)).ok()
}

pub fn read_bool(value: &DynamicValue, name: &str) -> Option<bool> {
    value.get_bool(&AttributePath::new(name)).ok()
}

pub fn read_number(value: &DynamicValue, name: &str) -> Option<f64> {
    value.get_number(&AttributePath::new(name)).ok()
}

/// `None` for fractional numbers as well
pub fn read_i64(value: &DynamicValue, name: &str) -> Option<i64> {
    read_number(value, name).and_then(whole)
}

pub fn read_strings(value: &DynamicValue, name: &str) -> Option<Vec<String>> {
    value
        .get(&AttributePath::new(name))
        .and_then(list_to_strings)
}

/// A nested single object; empty when null or unknown
pub fn read_object(value: &DynamicValue, name: &str) -> Object {
    value.get_map(&AttributePath::new(name)).unwrap_or_default()
}

pub fn object_string(object: &Object, key: &str) -> Option<String> {
    object.get(key).and_then(Dynamic::as_str).map(str::to_string)
}

pub fn object_bool(object: &Object, key: &str) -> Option<bool> {
    object.get(key).and_then(Dynamic::as_bool)
}

pub fn object_i64(object: &Object, key: &str) -> Option<i64> {
    object.get(key).and_then(Dynamic::as_number).and_then(whole)
}

fn whole(n: f64) -> Option<i64> {
    (n.fract() == 0.0).then_some(n as i64)
}

pub fn object_strings(object: &Object, key: &str) -> Option<Vec<String>> {
    object.get(key).and_then(list_to_strings)
}

/// List of strings in order; `None` unless the value is a known list
pub fn list_to_strings(value: &Dynamic) -> Option<Vec<String>> {
    match value {
        Dynamic::List(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

pub fn strings_to_list(values: &[String]) -> Dynamic {
    Dynamic::List(values.iter().map(|s| Dynamic::String(s.clone())).collect())
}

pub fn strs_to_list(values: &[&str]) -> Dynamic {
    Dynamic::List(values.iter().map(|s| Dynamic::from(*s)).collect())
}

pub fn string_or(value: Option<&str>, default: &str) -> Dynamic {
    Dynamic::String(value.unwrap_or(default).to_string())
}

pub fn bool_or(value: Option<bool>, default: bool) -> Dynamic {
    Dynamic::Bool(value.unwrap_or(default))
}

pub fn i64_or(value: Option<i64>, default: i64) -> Dynamic {
    Dynamic::Number(value.unwrap_or(default) as f64)
}

pub fn optional_bool(value: Option<bool>) -> Dynamic {
    value.map(Dynamic::Bool).unwrap_or(Dynamic::Null)
}

pub fn optional_i64(value: Option<i64>) -> Dynamic {
    value.map(|n| Dynamic::Number(n as f64)).unwrap_or(Dynamic::Null)
}

pub fn optional_string(value: Option<&str>) -> Dynamic {
    value.map(Dynamic::from).unwrap_or(Dynamic::Null)
}

pub fn strings_or(value: Option<&[String]>, default: &[&str]) -> Dynamic {
    match value {
        Some(values) => strings_to_list(values),
        None => strs_to_list(default),
    }
}

/// RFC 3339 timestamps normalised to UTC; unparseable values pass through
pub fn timestamp(value: Option<&str>) -> Dynamic {
    match value {
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => Dynamic::String(
                parsed
                    .with_timezone(&chrono::Utc)
                    .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            ),
            Err(_) => Dynamic::String(raw.to_string()),
        },
        None => Dynamic::Null,
    }
}

pub fn into_state(object: Object) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(object))
}
