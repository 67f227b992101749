//! Tagged-union primitive value type shared by every entry in the store.
//!
//! A [`Primitive`] is one of `{bool, i32, u32, f32, String}`. The JSON
//! encoding follows the spec exactly: `u32` is written as a `0x`-prefixed
//! hex string (so it round-trips without colliding with a plain `i32`),
//! `NaN` floats are written as the literal string `"NaN"`, and every other
//! variant uses its native JSON representation (bool, number, string).
//!
//! Because a bare JSON number can't tell an `i32` from an `f32` apart, and a
//! bare JSON string can't tell a `String` apart from a stringified `u32` or
//! `NaN`, decoding is **kind-directed**: the caller (ordinarily the
//! component registry, which already knows every path's declared type)
//! supplies the expected [`PrimitiveKind`]. `from_json(to_json(v), v.kind())
//! == v` holds for all `v`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which variant of [`Primitive`] a value is, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `i32`
    Int,
    /// `u32`
    UInt,
    /// `f32`
    Float,
    /// `String`
    String,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "i32",
            PrimitiveKind::UInt => "u32",
            PrimitiveKind::Float => "f32",
            PrimitiveKind::String => "string",
        };
        write!(f, "{name}")
    }
}

/// A tagged union over the five primitive value types the store can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    /// A boolean flag.
    Bool(bool),
    /// A signed 32-bit integer.
    Int(i32),
    /// An unsigned 32-bit integer, e.g. a packed color.
    UInt(u32),
    /// A 32-bit float.
    Float(f32),
    /// A UTF-8 string.
    String(String),
}

impl Primitive {
    /// The kind tag for this value.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::UInt(_) => PrimitiveKind::UInt,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::String(_) => PrimitiveKind::String,
        }
    }

    /// Encodes this value to its wire `JSON` representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Primitive::Bool(b) => serde_json::Value::Bool(*b),
            Primitive::Int(i) => serde_json::Value::Number((*i).into()),
            Primitive::UInt(u) => serde_json::Value::String(format!("{u:#x}")),
            Primitive::Float(f) => encode_float(*f),
            Primitive::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Decodes a `JSON` value into a primitive of the given `kind`.
    pub fn from_json(value: &serde_json::Value, kind: PrimitiveKind) -> Result<Primitive, PrimitiveJsonError> {
        match kind {
            PrimitiveKind::Bool => value
                .as_bool()
                .map(Primitive::Bool)
                .ok_or_else(|| PrimitiveJsonError::mismatch(kind, value)),
            PrimitiveKind::Int => value
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Primitive::Int)
                .ok_or_else(|| PrimitiveJsonError::mismatch(kind, value)),
            PrimitiveKind::UInt => value
                .as_str()
                .and_then(|s| s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .map(Primitive::UInt)
                .ok_or_else(|| PrimitiveJsonError::mismatch(kind, value)),
            PrimitiveKind::Float => decode_float(value).ok_or_else(|| PrimitiveJsonError::mismatch(kind, value)),
            PrimitiveKind::String => value
                .as_str()
                .map(|s| Primitive::String(s.to_string()))
                .ok_or_else(|| PrimitiveJsonError::mismatch(kind, value)),
        }
    }

    /// Returns the default value for a given kind: `false`, `0`, `0`, `0.0`,
    /// `""`.
    pub fn default_for(kind: PrimitiveKind) -> Primitive {
        match kind {
            PrimitiveKind::Bool => Primitive::Bool(false),
            PrimitiveKind::Int => Primitive::Int(0),
            PrimitiveKind::UInt => Primitive::UInt(0),
            PrimitiveKind::Float => Primitive::Float(0.0),
            PrimitiveKind::String => Primitive::String(String::new()),
        }
    }
}

fn encode_float(f: f32) -> serde_json::Value {
    if f.is_nan() {
        return serde_json::Value::String("NaN".to_string());
    }
    if f.is_infinite() {
        return serde_json::Value::String(if f > 0.0 { "inf" } else { "-inf" }.to_string());
    }
    serde_json::Number::from_f64(f64::from(f))
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn decode_float(value: &serde_json::Value) -> Option<Primitive> {
    if let Some(s) = value.as_str() {
        return match s {
            "NaN" => Some(Primitive::Float(f32::NAN)),
            "inf" => Some(Primitive::Float(f32::INFINITY)),
            "-inf" => Some(Primitive::Float(f32::NEG_INFINITY)),
            _ => None,
        };
    }
    value.as_f64().map(|f| Primitive::Float(f as f32))
}

/// Error decoding a JSON value as a primitive of a given kind.
#[derive(Debug, thiserror::Error)]
#[error("expected a {kind} value, got {value}")]
pub struct PrimitiveJsonError {
    kind: PrimitiveKind,
    value: serde_json::Value,
}

impl PrimitiveJsonError {
    fn mismatch(kind: PrimitiveKind, value: &serde_json::Value) -> Self {
        Self { kind, value: value.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Primitive) {
        let kind = v.kind();
        let json = v.to_json();
        let back = Primitive::from_json(&json, kind).unwrap();
        match (&v, &back) {
            (Primitive::Float(a), Primitive::Float(b)) if a.is_nan() => assert!(b.is_nan()),
            _ => assert_eq!(v, back),
        }
    }

    #[test]
    fn roundtrips_every_kind() {
        roundtrip(Primitive::Bool(true));
        roundtrip(Primitive::Bool(false));
        roundtrip(Primitive::Int(-42));
        roundtrip(Primitive::UInt(0xDEAD_BEEF));
        roundtrip(Primitive::Float(1.5));
        roundtrip(Primitive::Float(f32::NAN));
        roundtrip(Primitive::Float(f32::INFINITY));
        roundtrip(Primitive::Float(f32::NEG_INFINITY));
        roundtrip(Primitive::String("hello".to_string()));
        roundtrip(Primitive::String("NaN".to_string()));
    }

    #[test]
    fn uint_encodes_as_hex_string() {
        let json = Primitive::UInt(255).to_json();
        assert_eq!(json, serde_json::Value::String("0xff".to_string()));
    }

    #[test]
    fn nan_encodes_as_literal_string() {
        let json = Primitive::Float(f32::NAN).to_json();
        assert_eq!(json, serde_json::Value::String("NaN".to_string()));
    }

    #[test]
    fn int_and_float_use_native_json_numbers() {
        assert_eq!(Primitive::Int(7).to_json(), serde_json::json!(7));
        assert_eq!(Primitive::Float(2.0).to_json(), serde_json::json!(2.0));
    }

    #[test]
    fn default_values() {
        assert_eq!(Primitive::default_for(PrimitiveKind::Bool), Primitive::Bool(false));
        assert_eq!(Primitive::default_for(PrimitiveKind::String), Primitive::String(String::new()));
    }

    #[test]
    fn mismatched_kind_is_an_error() {
        let json = Primitive::Bool(true).to_json();
        assert!(Primitive::from_json(&json, PrimitiveKind::Int).is_err());
    }
}
