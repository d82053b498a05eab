//! One coercion function per [`ArgType`] variant.

use serde_json::{Number, Value};

use crate::error::{DecodeFieldError, json_kind};
use crate::types::{ArgType, BooleanCoercion};

/// Coerces raw text to `ty`.
///
/// `raw` is `None` when the pair had no `=` at all.
pub(crate) fn coerce(
    ty: ArgType,
    raw: Option<&str>,
    boolean: BooleanCoercion,
) -> Result<Value, DecodeFieldError> {
    match ty {
        ArgType::Boolean => Ok(coerce_boolean(raw, boolean)),
        ArgType::Number => coerce_number(required(raw)?),
        ArgType::Array => coerce_structured(required(raw)?, "array", Value::is_array),
        ArgType::Object => coerce_structured(required(raw)?, "object", Value::is_object),
        ArgType::String => Ok(Value::String(required(raw)?.to_owned())),
        ArgType::Unknown => Ok(sniff(required(raw)?)),
    }
}

fn required(raw: Option<&str>) -> Result<&str, DecodeFieldError> {
    raw.ok_or(DecodeFieldError::MissingValue)
}

fn coerce_boolean(raw: Option<&str>, boolean: BooleanCoercion) -> Value {
    Value::Bool(raw.is_some_and(|raw| boolean.coerce(raw)))
}

fn coerce_number(raw: &str) -> Result<Value, DecodeFieldError> {
    let text = raw.trim();
    let invalid = || DecodeFieldError::InvalidNumber {
        raw: raw.to_owned(),
    };

    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Ok(Value::from(n));
    }
    // `f64::from_str` accepts "inf" and "NaN"; from_f64 rejects both.
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(invalid)
}

fn coerce_structured(
    raw: &str,
    expected: &'static str,
    is_expected: fn(&Value) -> bool,
) -> Result<Value, DecodeFieldError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| DecodeFieldError::InvalidJson {
            message: err.to_string(),
        })?;
    if is_expected(&value) {
        Ok(value)
    } else {
        Err(DecodeFieldError::UnexpectedKind {
            expected,
            found: json_kind(&value),
        })
    }
}

fn sniff(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
