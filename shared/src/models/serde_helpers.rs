//! Common serde helpers for flexible wire formats
//!
//! Browser clients send money and weight fields inconsistently: sometimes as
//! JSON numbers (`1.5`), sometimes as strings (`"1.5"`, `"50.00"`). These
//! helpers accept both on the way in and always emit plain numbers on the
//! way out.

use serde::{Deserialize, Deserializer, Serializer};

/// Deserialize bool that treats null as false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

/// 内部辅助：同时支持数字和字符串两种格式
#[derive(Debug, Clone, Copy)]
struct FlexibleF64(f64);

impl<'de> Deserialize<'de> for FlexibleF64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct FlexibleVisitor;

        impl Visitor<'_> for FlexibleVisitor {
            type Value = FlexibleF64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a numeric string")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleF64(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleF64(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleF64(value as f64))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .trim()
                    .parse::<f64>()
                    .map(FlexibleF64)
                    .map_err(|_| de::Error::custom(format!("invalid number: {}", value)))
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// f64 field that accepts `1.5` and `"1.5"`, missing/null reads as 0
pub mod flexible_f64 {
    use super::*;

    pub fn serialize<S>(value: &f64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_f64(*value)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleF64>::deserialize(d).map(|opt| opt.map(|f| f.0).unwrap_or(0.0))
    }
}

/// Option<f64> field that accepts `1.5` and `"1.5"`
pub mod option_flexible_f64 {
    use super::*;

    pub fn serialize<S>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => s.serialize_some(v),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleF64>::deserialize(d).map(|opt| opt.map(|f| f.0))
    }
}
