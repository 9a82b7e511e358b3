//! Typed access to configuration and state
//!
//! Handlers describe their configuration as plain serde structs and move
//! between those and [`DynamicValue`] with [`DynamicValue::decode`] and
//! [`DynamicValue::encode`]. Conversion goes through `serde_json::Value`:
//! whole numbers become integers so that `i64`/`u64` fields deserialize, and
//! unknown values become `null`.

use crate::error::{Result, TfplugError};
use crate::types::{Dynamic, DynamicValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub fn to_json(value: &Dynamic) -> Value {
    match value {
        Dynamic::Null | Dynamic::Unknown => Value::Null,
        Dynamic::Bool(b) => Value::Bool(*b),
        Dynamic::Number(n) => {
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Value::from(*n as i64)
            } else {
                serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Dynamic::String(s) => Value::String(s.clone()),
        Dynamic::List(items) => Value::Array(items.iter().map(to_json).collect()),
        Dynamic::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

pub fn from_json(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::Null,
        Value::Bool(b) => Dynamic::Bool(*b),
        Value::Number(n) => Dynamic::Number(n.as_f64().unwrap_or_default()),
        Value::String(s) => Dynamic::String(s.clone()),
        Value::Array(items) => Dynamic::List(items.iter().map(from_json).collect()),
        Value::Object(map) => Dynamic::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

impl DynamicValue {
    /// Deserializes the value into a typed struct.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(to_json(&self.value))
            .map_err(|e| TfplugError::Decoding(e.to_string()))
    }

    /// Serializes a typed struct into a value.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| TfplugError::Encoding(e.to_string()))?;
        Ok(Self::new(from_json(&json)))
    }
}

/// Deserializes `null` as the type's default, for collections that may be absent.
pub fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Maps a nested block limited to one element onto `Option<T>`.
///
/// Terraform always carries such blocks as a list. Use with
/// `#[serde(default, with = "tfplug::value::single_block")]`.
pub mod single_block {
    use serde::de::{self, Deserializer};
    use serde::ser::{SerializeSeq, Serializer};
    use serde::{Deserialize, Serialize};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        let len = usize::from(value.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        if let Some(v) = value {
            seq.serialize_element(v)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let items = Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default();
        if items.len() > 1 {
            return Err(de::Error::invalid_length(
                items.len(),
                &"a block with at most one element",
            ));
        }
        Ok(items.into_iter().next())
    }
}
