//! Built-in leaf types every registry may provide.

use crate::{
    Error,
    error::CoercionError,
    model::CustomType,
    registry::{Provided, Registry},
    value::Value,
};
use serde_json::Value as JsonValue;
use strata_schema::node::{DATE_TYPE, ID_TYPE};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Field name a reference stub carries its id under.
pub const ID_FIELD: &str = "_id";

pub const EMAIL_TYPE: &str = "Email";
pub const UUID_TYPE: &str = "UUID";

/// Provide `ID`, `Date`, `Email` and `UUID`.
pub fn install(registry: &Registry) -> Result<(), Error> {
    let types = [
        CustomType::new(ID_TYPE),
        CustomType::new(DATE_TYPE)
            .modelize_with(|raw, _| parse_date(raw))
            .to_object_with(|value, _| match value {
                Value::Date(_) => format_date(value).map_or(JsonValue::Null, JsonValue::String),
                Value::Text(s) => JsonValue::String(s.clone()),
                _ => JsonValue::Null,
            }),
        CustomType::new(EMAIL_TYPE),
        CustomType::new(UUID_TYPE),
    ];

    for custom in types {
        registry.provide(Provided::Custom(custom), None, None)?;
    }

    Ok(())
}

/// Coerce RFC 3339 text or epoch milliseconds into a date.
pub fn parse_date(raw: Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Null | Value::Date(_) => Ok(raw),
        Value::Text(text) => OffsetDateTime::parse(&text, &Rfc3339)
            .map(Value::Date)
            .map_err(|err| CoercionError::InvalidDate(format!("'{text}': {err}"))),
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .ok_or_else(|| CoercionError::InvalidDate(format!("{n} is not an integer")))?;

            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .map(Value::Date)
                .map_err(|err| CoercionError::InvalidDate(format!("{millis}: {err}")))
        }
        other => Err(CoercionError::InvalidDate(format!(
            "cannot read a date from {}",
            other.kind_name()
        ))),
    }
}

/// Render a date value as RFC 3339.
pub fn format_date(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::Date(dt) => dt
            .format(&Rfc3339)
            .map_err(|err| CoercionError::InvalidDate(err.to_string())),
        other => Err(CoercionError::InvalidDate(format!(
            "{} is not a date",
            other.kind_name()
        ))),
    }
}

///
/// TESTS
///
