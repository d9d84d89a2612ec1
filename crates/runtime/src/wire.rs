//! Serde adapters for integers the API sends as JSON strings
//! (`int64`, `uint64`, `int32`, `uint32` formats).
//!
//! [`StringEncoded`] covers the integer types and any nesting of `Vec` and
//! `Option` around them, so `Option<Vec<Vec<i64>>>` reads `[["1","2"]]`.
//! Record fields use `#[serde(default, with = "runtime::wire::string")]`;
//! whole request and response bodies go through [`Encoded`] and
//! [`Decoded`].

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A value whose integers are carried as JSON strings.
pub trait StringEncoded: Sized {
    /// Write `self` with every integer as a string.
    fn serialize_wire<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;

    /// Read a value whose integers may be strings or numbers.
    fn deserialize_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

fn parse_value<T, E>(value: Value) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: serde::de::Error,
{
    match value {
        Value::String(s) => s.parse().map_err(E::custom),
        Value::Number(n) => n.to_string().parse().map_err(E::custom),
        other => Err(E::custom(format!(
            "expected a number or numeric string, found {other}"
        ))),
    }
}

macro_rules! string_encoded_int {
    ($($ty:ty),*) => {$(
        impl StringEncoded for $ty {
            fn serialize_wire<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }

            fn deserialize_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                parse_value(Value::deserialize(deserializer)?)
            }
        }
    )*};
}

string_encoded_int!(i64, u64, i32, u32);

impl<T: StringEncoded> StringEncoded for Vec<T> {
    fn serialize_wire<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Encoded))
    }

    fn deserialize_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<Decoded<T>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.0).collect())
    }
}

impl<T: StringEncoded> StringEncoded for Option<T> {
    fn serialize_wire<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Some(v) => serializer.serialize_some(&Encoded(v)),
            None => serializer.serialize_none(),
        }
    }

    fn deserialize_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Decoded<T>>::deserialize(deserializer)?.map(|v| v.0))
    }
}

/// Serializes the borrowed value with its integers as strings.
#[derive(Debug, Clone, Copy)]
pub struct Encoded<'a, T>(pub &'a T);

impl<T: StringEncoded> Serialize for Encoded<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize_wire(serializer)
    }
}

/// Deserializes a value whose integers may arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T>(pub T);

impl<'de, T: StringEncoded> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize_wire(deserializer).map(Decoded)
    }
}

/// Field adapter: `#[serde(default, with = "runtime::wire::string")]`.
pub mod string {
    use serde::{Deserializer, Serializer};

    use super::StringEncoded;

    /// Serialize `value` with its integers as strings.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: StringEncoded,
        S: Serializer,
    {
        value.serialize_wire(serializer)
    }

    /// Deserialize a value whose integers may be strings or numbers.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: StringEncoded,
        D: Deserializer<'de>,
    {
        T::deserialize_wire(deserializer)
    }
}
