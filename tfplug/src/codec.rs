//! Wire encoding for values
//!
//! Terraform sends configuration, plans and state as msgpack typed by the
//! schema. Unknown values travel as msgpack extension type 0. Object values
//! must carry exactly the attributes of their schema, so outgoing values are
//! passed through [`conform`] first.

use crate::error::{Result, TfplugError};
use crate::schema::{Attribute, AttributeType, ObjectNestingMode};
use crate::types::Dynamic;
use serde::ser::{SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};

static NULL: Dynamic = Dynamic::Null;

const UNKNOWN_EXT_TYPE: i8 = 0;

/// Integers above this lose precision as f64 and are sent as floats
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn encode_msgpack(value: &Dynamic) -> Result<Vec<u8>> {
    rmp_serde::to_vec(&Msgpack(value))
        .map_err(|e| TfplugError::EncodingError(format!("msgpack encoding failed: {}", e)))
}

pub fn decode_msgpack(data: &[u8]) -> Result<Dynamic> {
    if data.is_empty() {
        return Ok(Dynamic::Null);
    }
    rmp_serde::from_slice(data)
        .map_err(|e| TfplugError::DecodingError(format!("msgpack decoding failed: {}", e)))
}

/// Shapes `value` to `attributes`: missing attributes become null and
/// attributes the schema does not declare are dropped, at every level
pub fn conform(attributes: &[Attribute], value: &Dynamic) -> Dynamic {
    let Dynamic::Map(entries) = value else {
        return value.clone();
    };

    Dynamic::Map(
        attributes
            .iter()
            .map(|attr| {
                let field = entries.get(&attr.name).unwrap_or(&NULL);
                (attr.name.clone(), conform_attribute(attr, field))
            })
            .collect(),
    )
}

fn conform_attribute(attr: &Attribute, value: &Dynamic) -> Dynamic {
    let Some(nested) = &attr.nested_type else {
        return conform_type(&attr.r#type, value);
    };

    match (nested.nesting, value) {
        (ObjectNestingMode::Single, Dynamic::Map(_)) => conform(&nested.attributes, value),
        (ObjectNestingMode::List, Dynamic::List(items)) => Dynamic::List(
            items
                .iter()
                .map(|item| conform(&nested.attributes, item))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn conform_type(type_: &AttributeType, value: &Dynamic) -> Dynamic {
    match (type_, value) {
        (AttributeType::Object(fields), Dynamic::Map(entries)) => Dynamic::Map(
            fields
                .iter()
                .map(|(name, field_type)| {
                    let field = entries.get(name).unwrap_or(&NULL);
                    (name.clone(), conform_type(field_type, field))
                })
                .collect(),
        ),
        (AttributeType::List(elem) | AttributeType::Set(elem), Dynamic::List(items)) => {
            Dynamic::List(items.iter().map(|item| conform_type(elem, item)).collect())
        }
        (AttributeType::Map(elem), Dynamic::Map(entries)) => Dynamic::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), conform_type(elem, item)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

struct Msgpack<'a>(&'a Dynamic);

impl Serialize for Msgpack<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Msgpack(item))?;
                }
                seq.end()
            }
            Dynamic::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, &Msgpack(item))?;
                }
                map.end()
            }
            Dynamic::Unknown => {
                serializer.serialize_newtype_struct(rmp_serde::MSGPACK_EXT_STRUCT_NAME, &UnknownExt)
            }
        }
    }
}

/// `(type, payload)` pair rmp-serde writes as an extension value
struct UnknownExt;

impl Serialize for UnknownExt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&UNKNOWN_EXT_TYPE)?;
        tuple.serialize_element(&ExtPayload)?;
        tuple.end()
    }
}

struct ExtPayload;

impl Serialize for ExtPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&[0])
    }
}
