//! # Canonical Serialization
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in digest computation and Ed25519 signing across ZKPIP.
//!
//! ## Security Invariant
//!
//! `CanonicalBytes` has a private inner field. The only way to construct it is
//! through [`CanonicalBytes::new()`] (or [`CanonicalBytes::from_value()`] for
//! an already-parsed JSON tree), which applies the canonical rules:
//!
//! 1. Object keys sorted by Unicode code point, recursively.
//! 2. Arrays keep their order.
//! 3. No insignificant whitespace.
//! 4. Strings escaped exactly as `JSON.stringify` escapes them.
//! 5. Numbers use the ECMAScript Number-to-String rule (`2.0` → `2`,
//!    `1e21` → `1e+21`). Integers within ±2^53 are written verbatim, which
//!    is the same text; larger ones are rounded to the nearest `f64` first.
//! 6. Non-finite numbers become `null` under [`NumberPolicy::Lenient`] and
//!    are rejected under [`NumberPolicy::Strict`].
//!
//! Values with no canonical JSON form (byte strings, 128-bit integers that do
//! not fit 64 bits, composite map keys, duplicate keys) are rejected with a
//! [`CanonicalizationError`] naming the structural position, never coerced.

use serde::ser::{self, Impossible, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::CanonicalizationError;

/// How non-finite numbers (`NaN`, `±Infinity`) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberPolicy {
    /// Write non-finite numbers as `null`, the `JSON.stringify` convention.
    #[default]
    Lenient,
    /// Reject non-finite numbers with [`CanonicalizationError::NonFiniteNumber`].
    Strict,
}

/// Bytes produced exclusively by canonical JSON serialization.
///
/// # Invariants
///
/// - The only constructors are `new()`, `with_policy()` and `from_value()`.
/// - The content is valid UTF-8 JSON with sorted keys and compact separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Canonicalize any serializable value under the lenient number policy.
    ///
    /// # Errors
    ///
    /// Returns a positional [`CanonicalizationError`] if the value contains
    /// anything without a canonical JSON representation.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        Self::with_policy(obj, NumberPolicy::Lenient)
    }

    /// Canonicalize any serializable value under an explicit number policy.
    pub fn with_policy(
        obj: &impl Serialize,
        policy: NumberPolicy,
    ) -> Result<Self, CanonicalizationError> {
        let value = obj.serialize(ValueSerializer::root(policy))?;
        Ok(Self::from_value(&value))
    }

    /// Canonicalize a parsed JSON tree. Infallible: a `serde_json::Value`
    /// cannot hold a non-canonicalizable value.
    pub fn from_value(value: &Value) -> Self {
        Self(canonicalize(value))
    }

    /// Access the canonical bytes for digest computation and signing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Access the canonical form as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize a JSON tree in canonical form.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sort explicitly: `Map` iteration order depends on serde_json features.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, member);
            }
            out.push('}');
        }
    }
}

/// Largest magnitude every `f64` consumer reproduces exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_EXACT_INTEGER {
            out.push_str(&i.to_string());
        } else {
            out.push_str(&format_float(i as f64));
        }
    } else if let Some(u) = n.as_u64() {
        if u <= MAX_EXACT_INTEGER {
            out.push_str(&u.to_string());
        } else {
            out.push_str(&format_float(u as f64));
        }
    } else if let Some(f) = n.as_f64() {
        out.push_str(&format_float(f));
    } else {
        out.push_str("null");
    }
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "null".to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    serde_jcs::to_string(&f).unwrap_or_else(|_| "null".to_string())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

// ---------------------------------------------------------------------------
// Position-tracking value serializer
// ---------------------------------------------------------------------------

fn member_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

struct ValueSerializer {
    path: String,
    policy: NumberPolicy,
}

impl ValueSerializer {
    fn root(policy: NumberPolicy) -> Self {
        Self {
            path: "$".to_string(),
            policy,
        }
    }

    fn child(&self, path: String) -> Self {
        Self {
            path,
            policy: self.policy,
        }
    }

    fn unsupported(&self, kind: &'static str) -> CanonicalizationError {
        CanonicalizationError::UnsupportedType {
            path: self.path.clone(),
            kind,
        }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = TupleVariantSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = StructVariantSerializer;

    fn serialize_bool(self, v: bool) -> Result<Value, Self::Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Self::Error> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Self::Error> {
        if let Ok(small) = i64::try_from(v) {
            self.serialize_i64(small)
        } else if let Ok(unsigned) = u64::try_from(v) {
            self.serialize_u64(unsigned)
        } else {
            Err(self.unsupported("128-bit integer outside the 64-bit range"))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Self::Error> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Self::Error> {
        match u64::try_from(v) {
            Ok(small) => self.serialize_u64(small),
            Err(_) => Err(self.unsupported("128-bit integer outside the 64-bit range")),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Self::Error> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Self::Error> {
        if let Some(n) = Number::from_f64(v) {
            return Ok(Value::Number(n));
        }
        match self.policy {
            NumberPolicy::Lenient => Ok(Value::Null),
            NumberPolicy::Strict => Err(CanonicalizationError::NonFiniteNumber { path: self.path }),
        }
    }

    fn serialize_char(self, v: char) -> Result<Value, Self::Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Self::Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, Self::Error> {
        Err(self.unsupported("byte string"))
    }

    fn serialize_none(self) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Self::Error> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Self::Error> {
        let path = member_path(&self.path, variant);
        let inner = value
            .serialize(self.child(path.clone()))
            .map_err(|e| e.at(&path))?;
        let mut map = Map::new();
        map.insert(variant.to_string(), inner);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer, Self::Error> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
            inner: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqSerializer, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantSerializer, Self::Error> {
        let path = member_path(&self.path, variant);
        Ok(TupleVariantSerializer {
            variant,
            seq: self.child(path).serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer, Self::Error> {
        Ok(MapSerializer {
            inner: self,
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapSerializer, Self::Error> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructVariantSerializer, Self::Error> {
        let path = member_path(&self.path, variant);
        Ok(StructVariantSerializer {
            variant,
            map: self.child(path).serialize_map(Some(len))?,
        })
    }
}

struct SeqSerializer {
    inner: ValueSerializer,
    items: Vec<Value>,
}

impl SeqSerializer {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CanonicalizationError> {
        let path = index_path(&self.inner.path, self.items.len());
        let item = value
            .serialize(self.inner.child(path.clone()))
            .map_err(|e| e.at(&path))?;
        self.items.push(item);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Array(self.items))
    }
}

struct TupleVariantSerializer {
    variant: &'static str,
    seq: SeqSerializer,
}

impl ser::SerializeTupleVariant for TupleVariantSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.seq.push(value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        let mut map = Map::new();
        map.insert(self.variant.to_string(), Value::Array(self.seq.items));
        Ok(Value::Object(map))
    }
}

struct MapSerializer {
    inner: ValueSerializer,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl MapSerializer {
    fn insert<T: ?Sized + Serialize>(
        &mut self,
        key: String,
        value: &T,
    ) -> Result<(), CanonicalizationError> {
        let path = member_path(&self.inner.path, &key);
        if self.map.contains_key(&key) {
            return Err(CanonicalizationError::DuplicateKey { path });
        }
        let member = value
            .serialize(self.inner.child(path.clone()))
            .map_err(|e| e.at(&path))?;
        self.map.insert(key, member);
        Ok(())
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key = key.serialize(KeySerializer {
            path: &self.inner.path,
        })?;
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| CanonicalizationError::Custom {
                path: self.inner.path.clone(),
                message: "map value emitted without a key".to_string(),
            })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Object(self.map))
    }
}

struct StructVariantSerializer {
    variant: &'static str,
    map: MapSerializer,
}

impl ser::SerializeStructVariant for StructVariantSerializer {
    type Ok = Value;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.map.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        let mut outer = Map::new();
        outer.insert(self.variant.to_string(), Value::Object(self.map.map));
        Ok(Value::Object(outer))
    }
}

/// Serializes map keys. Strings pass through; chars, bools and integers
/// stringify the way `serde_json` does; anything else has no key form.
struct KeySerializer<'a> {
    path: &'a str,
}

impl KeySerializer<'_> {
    fn reject(&self, kind: &'static str) -> CanonicalizationError {
        CanonicalizationError::UnsupportedKey {
            path: self.path.to_string(),
            kind,
        }
    }
}

impl ser::Serializer for KeySerializer<'_> {
    type Ok = String;
    type Error = CanonicalizationError;

    type SerializeSeq = Impossible<String, CanonicalizationError>;
    type SerializeTuple = Impossible<String, CanonicalizationError>;
    type SerializeTupleStruct = Impossible<String, CanonicalizationError>;
    type SerializeTupleVariant = Impossible<String, CanonicalizationError>;
    type SerializeMap = Impossible<String, CanonicalizationError>;
    type SerializeStruct = Impossible<String, CanonicalizationError>;
    type SerializeStructVariant = Impossible<String, CanonicalizationError>;

    fn serialize_bool(self, v: bool) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, Self::Error> {
        Err(self.reject("float key"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, Self::Error> {
        Err(self.reject("float key"))
    }

    fn serialize_char(self, v: char) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, Self::Error> {
        Err(self.reject("byte string key"))
    }

    fn serialize_none(self) -> Result<String, Self::Error> {
        Err(self.reject("null key"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, Self::Error> {
        Err(self.reject("unit key"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, Self::Error> {
        Err(self.reject("unit key"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, Self::Error> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, Self::Error> {
        Err(self.reject("enum variant key"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(self.reject("sequence key"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(self.reject("tuple key"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(self.reject("tuple key"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(self.reject("enum variant key"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(self.reject("map key"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(self.reject("struct key"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(self.reject("enum variant key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn canon(value: &Value) -> String {
        CanonicalBytes::new(value)
            .expect("should canonicalize")
            .into_string()
    }

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = json!({"b": 2, "a": 1, "c": "hello"});
        assert_eq!(canon(&data), r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        assert_eq!(canon(&data), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_key_order_independent_scenario() {
        let left: Value = serde_json::from_str(r#"{"b":1,"a":{"d":2,"c":3}}"#).unwrap();
        let right: Value = serde_json::from_str(r#"{"a":{"c":3,"d":2},"b":1}"#).unwrap();
        assert_eq!(canon(&left), canon(&right));
        assert_eq!(canon(&left), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn test_keys_sorted_by_code_point() {
        let data = json!({"é": 1, "z": 2, "Z": 3, "a": 4, "\u{1F600}": 5, "\u{FF21}": 6});
        assert_eq!(
            canon(&data),
            "{\"Z\":3,\"a\":4,\"z\":2,\"é\":1,\"\u{FF21}\":6,\"\u{1F600}\":5}"
        );
    }

    #[test]
    fn test_floats_use_ecmascript_form() {
        assert_eq!(canon(&json!({"v": 1.5})), r#"{"v":1.5}"#);
        assert_eq!(canon(&json!({"v": 2.0})), r#"{"v":2}"#);
        assert_eq!(canon(&json!({"v": -0.0})), r#"{"v":0}"#);
        assert_eq!(canon(&json!({"v": 1e21})), r#"{"v":1e+21}"#);
        assert_eq!(canon(&json!({"v": 0.1 + 0.2})), r#"{"v":0.30000000000000004}"#);
    }

    #[test]
    fn test_safe_integers_verbatim() {
        assert_eq!(canon(&json!({"val": -42})), r#"{"val":-42}"#);
        assert_eq!(canon(&json!({"val": 9999999999i64})), r#"{"val":9999999999}"#);
        assert_eq!(canon(&json!({"val": 9007199254740992u64})), r#"{"val":9007199254740992}"#);
        assert_eq!(canon(&json!({"val": -9007199254740992i64})), r#"{"val":-9007199254740992}"#);
    }

    #[test]
    fn test_large_integers_round_like_f64() {
        assert_eq!(canon(&json!({"n": 9007199254740993u64})), r#"{"n":9007199254740992}"#);
        assert_eq!(canon(&json!({"n": -9007199254740993i64})), r#"{"n":-9007199254740992}"#);
        assert_eq!(canon(&json!({"val": u64::MAX})), r#"{"val":18446744073709552000}"#);
        assert_eq!(
            canon(&json!({"n": 9007199254740993u64})),
            canon(&json!({"n": 9007199254740992.0}))
        );
    }

    #[test]
    fn test_non_finite_lenient_becomes_null() {
        let data = vec![1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), "[1,null,null,null]");
    }

    #[test]
    fn test_non_finite_strict_names_position() {
        let mut data = BTreeMap::new();
        data.insert("scores", vec![0.5, f64::NAN]);
        let err = CanonicalBytes::with_policy(&data, NumberPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            CanonicalizationError::NonFiniteNumber {
                path: "$.scores[1]".to_string()
            }
        );
    }

    #[test]
    fn test_byte_string_rejected_with_path() {
        struct Raw;
        impl Serialize for Raw {
            fn serialize<S: ser::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_bytes(&[1, 2, 3])
            }
        }
        let mut data = BTreeMap::new();
        data.insert("items", vec![None, Some(Raw)]);
        let err = CanonicalBytes::new(&data).unwrap_err();
        assert_eq!(err.path(), "$.items[1]");
        assert!(matches!(err, CanonicalizationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_composite_key_rejected() {
        let mut data = BTreeMap::new();
        data.insert((1u8, 2u8), "pair");
        let err = CanonicalBytes::new(&data).unwrap_err();
        assert!(matches!(err, CanonicalizationError::UnsupportedKey { ref path, .. } if path == "$"));
    }

    #[test]
    fn test_integer_keys_stringified() {
        let mut data = BTreeMap::new();
        data.insert(10u32, "ten");
        data.insert(2u32, "two");
        // Keys compare as strings once stringified.
        assert_eq!(CanonicalBytes::new(&data).unwrap().as_str(), r#"{"10":"ten","2":"two"}"#);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        struct Twice;
        impl Serialize for Twice {
            fn serialize<S: ser::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                use ser::SerializeMap;
                let mut map = s.serialize_map(Some(2))?;
                map.serialize_entry("k", &1)?;
                map.serialize_entry("k", &2)?;
                map.end()
            }
        }
        let err = CanonicalBytes::new(&Twice).unwrap_err();
        assert_eq!(
            err,
            CanonicalizationError::DuplicateKey {
                path: "$.k".to_string()
            }
        );
    }

    #[test]
    fn test_custom_error_gets_position() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: ser::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(ser::Error::custom("refused"))
            }
        }
        let err = CanonicalBytes::new(&vec![vec![Broken]]).unwrap_err();
        assert_eq!(err.path(), "$[0][0]");
    }

    #[test]
    fn test_huge_i128_rejected() {
        let err = CanonicalBytes::new(&vec![i128::MAX]).unwrap_err();
        assert_eq!(err.path(), "$[0]");
    }

    #[test]
    fn test_string_escaping_matches_json_stringify() {
        let data = json!({"s": "quote\" back\\ nl\n tab\t ctl\u{1f} del\u{7f}"});
        assert_eq!(
            canon(&data),
            r#"{"s":"quote\" back\\ nl\n tab\t ctl\u001f del"#.to_string() + "\u{7f}\"}"
        );
    }

    #[test]
    fn test_enum_shapes() {
        #[derive(serde::Serialize)]
        enum Shape {
            Unit,
            Wrap(u8),
            Pair(u8, u8),
            Named { b: u8, a: u8 },
        }
        let data = vec![Shape::Unit, Shape::Wrap(1), Shape::Pair(1, 2), Shape::Named { b: 2, a: 1 }];
        assert_eq!(
            CanonicalBytes::new(&data).unwrap().as_str(),
            r#"["Unit",{"Wrap":1},{"Pair":[1,2]},{"Named":{"a":1,"b":2}}]"#
        );
    }

    #[test]
    fn test_from_value_matches_new() {
        let data = json!({"z": [1, {"y": null, "x": true}], "a": "s"});
        assert_eq!(CanonicalBytes::from_value(&data), CanonicalBytes::new(&data).unwrap());
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(canon(&json!({})), "{}");
        assert_eq!(canon(&json!([])), "[]");
        assert!(!CanonicalBytes::from_value(&json!({})).is_empty());
    }
}
