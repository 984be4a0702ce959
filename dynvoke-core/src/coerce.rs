//! # Parameter Coercer
//!
//! Converts each positional JSON value into the exact argument the method
//! declares at that position, branching on the [`ParamSpec`] category that
//! was resolved at registration.
//!
//! Two behaviors are deliberate and load-bearing:
//!
//! * Several mismatched shapes do **not** fail here. An out-of-range enum
//!   ordinal, a non-object input for a struct parameter, and an
//!   `Unsupported` category all leave the slot unset and let the invocation
//!   itself surface the problem. Callers that depend on the historical wire
//!   behavior rely on this.
//! * Scalar conversion is best-effort over the value's numeric or textual
//!   representation, so `"42"` satisfies an integer parameter and `7`
//!   satisfies a string parameter.
use crate::descriptor::{ArgSlot, Args, EnumBinder, ParamSpec, ScalarKind};
use crate::error::Fault;
use serde_json::Value;
use std::any::Any;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Coerces the whole input array against the declared parameter list.
///
/// The arity precondition runs first: a method with parameters requires a
/// present input array of exactly the declared length, otherwise the call
/// aborts before any per-position work. A method without parameters ignores
/// whatever was supplied.
pub fn coerce_arguments(params: &[ParamSpec], input: Option<&[Value]>) -> Result<Args, Fault> {
    if params.is_empty() {
        return Ok(Args::new(Vec::new()));
    }

    let supplied = input.map_or(0, <[Value]>::len);
    let Some(values) = input.filter(|values| values.len() == params.len()) else {
        return Err(Fault::ArityMismatch {
            expected: params.len(),
            supplied,
        });
    };

    let mut slots = Vec::with_capacity(params.len());
    for (position, (spec, value)) in params.iter().zip(values).enumerate() {
        slots.push(coerce_one(position, spec, value)?);
    }
    Ok(Args::new(slots))
}

fn coerce_one(position: usize, spec: &ParamSpec, value: &Value) -> Result<ArgSlot, Fault> {
    match spec {
        ParamSpec::Scalar(kind) => match value {
            Value::Null => Ok(None),
            value => convert_scalar(value, *kind)
                .map(Some)
                .map_err(|reason| Fault::Coercion { position, reason }),
        },
        ParamSpec::Enum(binder) => coerce_enum(position, binder, value),
        ParamSpec::Struct(binder) => match value {
            Value::Object(_) => binder
                .bind(value.clone())
                .map(Some)
                .map_err(|err| Fault::Coercion {
                    position,
                    reason: err.to_string(),
                }),
            _ => Ok(None),
        },
        ParamSpec::Unsupported => Ok(None),
    }
}

fn coerce_enum(position: usize, binder: &EnumBinder, value: &Value) -> Result<ArgSlot, Fault> {
    match value {
        Value::String(name) if name.is_empty() => Ok(None),
        Value::String(name) => binder
            .by_name(name)
            .map(Some)
            .ok_or_else(|| Fault::Coercion {
                position,
                reason: format!("no enum member named '{name}'"),
            }),
        // Numeric input selects by zero-based ordinal. An ordinal with no
        // member leaves the slot unset rather than failing.
        Value::Number(number) => {
            let ordinal = number
                .as_i64()
                .or_else(|| number.as_f64().map(|float| float as i64));
            Ok(ordinal
                .and_then(|ordinal| usize::try_from(ordinal).ok())
                .and_then(|ordinal| binder.by_ordinal(ordinal)))
        }
        _ => Ok(None),
    }
}

/// Best-effort conversion of one non-null value into the requested scalar.
pub(crate) fn convert_scalar(value: &Value, kind: ScalarKind) -> Result<Box<dyn Any + Send>, String> {
    match kind {
        ScalarKind::Bool => Ok(Box::new(to_bool(value)?)),
        ScalarKind::I8 => Ok(Box::new(to_int::<i8>(value)?)),
        ScalarKind::I16 => Ok(Box::new(to_int::<i16>(value)?)),
        ScalarKind::I32 => Ok(Box::new(to_int::<i32>(value)?)),
        ScalarKind::I64 => Ok(Box::new(to_i64(value)?)),
        ScalarKind::U8 => Ok(Box::new(to_uint::<u8>(value)?)),
        ScalarKind::U16 => Ok(Box::new(to_uint::<u16>(value)?)),
        ScalarKind::U32 => Ok(Box::new(to_uint::<u32>(value)?)),
        ScalarKind::U64 => Ok(Box::new(to_u64(value)?)),
        ScalarKind::F32 => Ok(Box::new(to_f64(value)? as f32)),
        ScalarKind::F64 => Ok(Box::new(to_f64(value)?)),
        ScalarKind::Char => Ok(Box::new(to_char(value)?)),
        ScalarKind::String => Ok(Box::new(to_text(value))),
        ScalarKind::DateTime => Ok(Box::new(to_datetime(value)?)),
    }
}

fn to_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "no" | "n" | "off" | "0" => Ok(false),
            _ => Err(format!("cannot parse '{text}' as a boolean")),
        },
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("number {number} is not a boolean")),
        },
        other => Err(mismatch(other, "a boolean")),
    }
}

fn to_i64(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .ok_or_else(|| format!("number {number} is out of integer range")),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("cannot parse '{text}' as an integer: {err}")),
        other => Err(mismatch(other, "an integer")),
    }
}

fn to_int<T: TryFrom<i64> + 'static>(value: &Value) -> Result<T, String> {
    let wide = to_i64(value)?;
    T::try_from(wide)
        .map_err(|_| format!("value {wide} is out of range for {}", std::any::type_name::<T>()))
}

fn to_u64(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|float| *float >= 0.0).map(|float| float as u64))
            .ok_or_else(|| format!("number {number} is out of unsigned range")),
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|err| format!("cannot parse '{text}' as an unsigned integer: {err}")),
        other => Err(mismatch(other, "an unsigned integer")),
    }
}

fn to_uint<T: TryFrom<u64> + 'static>(value: &Value) -> Result<T, String> {
    let wide = to_u64(value)?;
    T::try_from(wide)
        .map_err(|_| format!("value {wide} is out of range for {}", std::any::type_name::<T>()))
}

fn to_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| format!("number {number} is not representable as a float")),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("cannot parse '{text}' as a float: {err}")),
        other => Err(mismatch(other, "a float")),
    }
}

fn to_char(value: &Value) -> Result<char, String> {
    to_text(value)
        .chars()
        .next()
        .ok_or_else(|| "an empty string cannot convert to a char".to_owned())
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        // serde_json's Display renders scalars bare and containers as
        // compact JSON, matching the stringify-anything fallback of the
        // historical converter.
        other => other.to_string(),
    }
}

fn to_datetime(value: &Value) -> Result<OffsetDateTime, String> {
    match value {
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .ok_or_else(|| format!("number {number} is not a millisecond timestamp"))?;
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .map_err(|err| format!("timestamp {millis} is out of range: {err}"))
        }
        Value::String(text) => OffsetDateTime::parse(text, &Rfc3339)
            .map_err(|err| format!("cannot parse '{text}' as an RFC 3339 timestamp: {err}")),
        other => Err(mismatch(other, "a timestamp")),
    }
}

fn mismatch(value: &Value, wanted: &str) -> String {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("cannot convert {found} to {wanted}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EnumArg;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    impl EnumArg for Color {
        const MEMBERS: &'static [&'static str] = &["RED", "GREEN", "BLUE"];

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Color::Red),
                1 => Some(Color::Green),
                2 => Some(Color::Blue),
                _ => None,
            }
        }
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn single(spec: ParamSpec, value: Value) -> Result<Args, Fault> {
        coerce_arguments(&[spec], Some(std::slice::from_ref(&value)))
    }

    #[test]
    fn arity_mismatch_aborts_before_coercion() {
        let params = [
            ParamSpec::scalar(ScalarKind::I32),
            ParamSpec::scalar(ScalarKind::I32),
        ];
        let short = [json!(1)];
        assert!(matches!(
            coerce_arguments(&params, Some(&short)),
            Err(Fault::ArityMismatch {
                expected: 2,
                supplied: 1
            })
        ));
        assert!(matches!(
            coerce_arguments(&params, None),
            Err(Fault::ArityMismatch {
                expected: 2,
                supplied: 0
            })
        ));
    }

    #[test]
    fn zero_parameter_methods_ignore_the_input_array() {
        let extra = [json!(1), json!(2)];
        let args = coerce_arguments(&[], Some(&extra)).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn scalars_convert_from_numbers_and_text() {
        let mut args = single(ParamSpec::scalar(ScalarKind::I32), json!("42")).unwrap();
        assert_eq!(args.take::<i32>(0).unwrap(), 42);

        let mut args = single(ParamSpec::scalar(ScalarKind::F64), json!(2.5)).unwrap();
        assert_eq!(args.take::<f64>(0).unwrap(), 2.5);

        let mut args = single(ParamSpec::scalar(ScalarKind::String), json!(7)).unwrap();
        assert_eq!(args.take::<String>(0).unwrap(), "7");

        let mut args = single(ParamSpec::scalar(ScalarKind::Bool), json!("on")).unwrap();
        assert!(args.take::<bool>(0).unwrap());

        let mut args = single(ParamSpec::scalar(ScalarKind::Char), json!("north")).unwrap();
        assert_eq!(args.take::<char>(0).unwrap(), 'n');
    }

    #[test]
    fn scalar_null_leaves_the_slot_unset() {
        let mut args = single(ParamSpec::scalar(ScalarKind::I32), Value::Null).unwrap();
        assert_eq!(args.take_opt::<i32>(0).unwrap(), None);
    }

    #[test]
    fn scalar_conversion_failure_is_a_coercion_fault() {
        let fault = single(ParamSpec::scalar(ScalarKind::I32), json!("forty")).unwrap_err();
        assert!(matches!(fault, Fault::Coercion { position: 0, .. }));

        let fault = single(ParamSpec::scalar(ScalarKind::I8), json!(4000)).unwrap_err();
        assert!(matches!(fault, Fault::Coercion { position: 0, .. }));
    }

    #[test]
    fn datetime_converts_from_millis_and_rfc3339() {
        let mut args = single(ParamSpec::scalar(ScalarKind::DateTime), json!(1_000)).unwrap();
        let stamp = args.take::<OffsetDateTime>(0).unwrap();
        assert_eq!(stamp.unix_timestamp(), 1);

        let mut args = single(
            ParamSpec::scalar(ScalarKind::DateTime),
            json!("1970-01-01T00:00:02Z"),
        )
        .unwrap();
        let stamp = args.take::<OffsetDateTime>(0).unwrap();
        assert_eq!(stamp.unix_timestamp(), 2);
    }

    #[test]
    fn enum_coerces_by_name() {
        let mut args = single(ParamSpec::enumeration::<Color>(), json!("GREEN")).unwrap();
        assert_eq!(args.take::<Color>(0).unwrap(), Color::Green);
    }

    #[test]
    fn enum_name_lookup_is_case_sensitive() {
        let fault = single(ParamSpec::enumeration::<Color>(), json!("green")).unwrap_err();
        assert!(matches!(fault, Fault::Coercion { position: 0, .. }));
    }

    #[test]
    fn enum_empty_string_leaves_the_slot_unset() {
        let mut args = single(ParamSpec::enumeration::<Color>(), json!("")).unwrap();
        assert_eq!(args.take_opt::<Color>(0).unwrap(), None);
    }

    #[test]
    fn enum_coerces_by_ordinal() {
        let mut args = single(ParamSpec::enumeration::<Color>(), json!(2)).unwrap();
        assert_eq!(args.take::<Color>(0).unwrap(), Color::Blue);
    }

    #[test]
    fn enum_out_of_range_ordinal_is_silent() {
        let mut args = single(ParamSpec::enumeration::<Color>(), json!(9)).unwrap();
        assert_eq!(args.take_opt::<Color>(0).unwrap(), None);

        let mut args = single(ParamSpec::enumeration::<Color>(), json!(-1)).unwrap();
        assert_eq!(args.take_opt::<Color>(0).unwrap(), None);
    }

    #[test]
    fn enum_foreign_shape_is_silent() {
        let mut args = single(ParamSpec::enumeration::<Color>(), json!(true)).unwrap();
        assert_eq!(args.take_opt::<Color>(0).unwrap(), None);
    }

    #[test]
    fn struct_binds_with_defaults_and_ignores_unknown_keys() {
        let mut args = single(
            ParamSpec::structure::<Point>(),
            json!({"x": 3, "label": "origin"}),
        )
        .unwrap();
        assert_eq!(args.take::<Point>(0).unwrap(), Point { x: 3, y: 0 });
    }

    #[test]
    fn struct_binding_error_is_a_coercion_fault() {
        let fault = single(ParamSpec::structure::<Point>(), json!({"x": "not a number"}))
            .unwrap_err();
        assert!(matches!(fault, Fault::Coercion { position: 0, .. }));
    }

    #[test]
    fn struct_non_object_input_is_silent() {
        let mut args = single(ParamSpec::structure::<Point>(), json!("(3, 4)")).unwrap();
        assert_eq!(args.take_opt::<Point>(0).unwrap(), None);
    }

    #[test]
    fn unsupported_category_is_silent() {
        let mut args = single(ParamSpec::Unsupported, json!([1, 2, 3])).unwrap();
        assert_eq!(args.take_opt::<i32>(0).unwrap(), None);
    }
}
