//! Lenient decoding for nullable columns.
//!
//! The note service serializes nullable columns either as a plain value/`null`
//! or as `{"Int64": 5, "Valid": true}` / `{"String": "x", "Valid": false}`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Nullable<T> {
    Plain(Option<T>),
    Int64 {
        #[serde(rename = "Int64")]
        value: T,
        #[serde(rename = "Valid")]
        valid: bool,
    },
    String {
        #[serde(rename = "String")]
        value: T,
        #[serde(rename = "Valid")]
        valid: bool,
    },
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Nullable::deserialize(deserializer)? {
        Nullable::Plain(value) => value,
        Nullable::Int64 { value, valid } | Nullable::String { value, valid } => {
            valid.then_some(value)
        }
    })
}
