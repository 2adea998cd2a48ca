//! Typed parse of custom-resource properties.
//!
//! CloudFormation delivers every scalar in `ResourceProperties` as a string.
//! Fields that are booleans or numbers accept either their native JSON form or
//! the stringified one; nothing else is guessed.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::TableError;
use crate::model::DesiredTableSpec;

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolInput {
    Native(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberInput {
    Native(i64),
    Text(String),
}

fn bool_from_input<E: de::Error>(input: BoolInput) -> Result<bool, E> {
    match input {
        BoolInput::Native(value) => Ok(value),
        BoolInput::Text(text) => match text.trim() {
            "true" | "True" | "TRUE" => Ok(true),
            "false" | "False" | "FALSE" => Ok(false),
            other => Err(E::custom(format!("expected a boolean, got '{}'", other))),
        },
    }
}

pub(crate) fn coerce_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    bool_from_input(BoolInput::deserialize(deserializer)?)
}

pub(crate) fn coerce_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BoolInput>::deserialize(deserializer)?
        .map(bool_from_input)
        .transpose()
}

pub(crate) fn coerce_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberInput::deserialize(deserializer)? {
        NumberInput::Native(value) => Ok(value),
        NumberInput::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got '{}'", text))),
    }
}

/// Parse the `ResourceProperties` bag into a desired table spec.
///
/// Unknown keys (e.g. `ServiceToken`) are ignored. Unset optional fields stay
/// `None` so they are never sent to DynamoDB.
pub fn parse_desired_spec(properties: &Value) -> Result<DesiredTableSpec, TableError> {
    DesiredTableSpec::deserialize(properties)
        .map_err(|e| TableError::InvalidProperties(e.to_string()))
}
