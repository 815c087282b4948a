// Copyright 2024 OpenStack SDK Rust developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Protocol helpers shared by all services.

#![allow(dead_code)] // various things are unused with --no-default-features
#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// A link to a resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// A reference to a resource by its ID.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Ref {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// A reference to a resource by its ID and name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IdAndName {
    pub id: String,
    pub name: String,
}

/// Deserialize a value where an empty string or null means "absent".
pub fn empty_as_none<'de, D, T>(des: D) -> ::std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = serde_json::Value::deserialize(des)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(ref s) if s.is_empty() => Ok(None),
        other => T::deserialize(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Deserialize a value from its string representation.
pub fn from_str<'de, D, T>(des: D) -> ::std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = String::deserialize(des)?;
    T::from_str(&value).map_err(serde::de::Error::custom)
}

/// Deserialize a value where an empty string or null means the default.
pub fn empty_as_default<'de, D, T>(des: D) -> ::std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    empty_as_none(des).map(Option::unwrap_or_default)
}

/// Deserialize a map where null means an empty map.
pub fn null_as_empty_map<'de, D, V>(des: D) -> ::std::result::Result<HashMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let value: Option<HashMap<String, V>> = Deserialize::deserialize(des)?;
    Ok(value.unwrap_or_default())
}

/// Deserialize a list where null means an empty list.
pub fn null_as_empty_vec<'de, D, V>(des: D) -> ::std::result::Result<Vec<V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let value: Option<Vec<V>> = Deserialize::deserialize(des)?;
    Ok(value.unwrap_or_default())
}

/// Deserialize an ID that may be either a string or an integer.
pub fn string_or_number<'de, D>(des: D) -> ::std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(des)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Deserialize an optional ID that may be either a string or an integer.
pub fn opt_string_or_number<'de, D>(des: D) -> ::std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(des)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

#[inline]
pub fn some_truth() -> bool {
    true
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "empty_as_none")]
        description: Option<String>,
        #[serde(default, deserialize_with = "empty_as_default")]
        swap: u64,
        #[serde(default, deserialize_with = "null_as_empty_map")]
        metadata: HashMap<String, String>,
        #[serde(default, deserialize_with = "null_as_empty_vec")]
        tags: Vec<String>,
    }

    #[test]
    fn test_empty_values() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "description": "",
            "swap": "",
            "metadata": null,
            "tags": null,
        }))
        .unwrap();
        assert!(sample.description.is_none());
        assert_eq!(sample.swap, 0);
        assert!(sample.metadata.is_empty());
        assert!(sample.tags.is_empty());
    }

    #[test]
    fn test_present_values() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "description": "desc",
            "swap": 512,
            "metadata": {"a": "b"},
            "tags": ["x"],
        }))
        .unwrap();
        assert_eq!(sample.description.as_deref(), Some("desc"));
        assert_eq!(sample.swap, 512);
        assert_eq!(sample.metadata.get("a").map(String::as_str), Some("b"));
        assert_eq!(sample.tags, vec!["x".to_string()]);
    }

    #[test]
    fn test_missing_values() {
        let sample: Sample = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(sample.description.is_none());
        assert_eq!(sample.swap, 0);
    }

    #[derive(Debug, Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        parent: Option<String>,
    }

    #[test]
    fn test_string_or_number() {
        let item: WithId = serde_json::from_value(serde_json::json!({"id": 42})).unwrap();
        assert_eq!(item.id, "42");
        assert!(item.parent.is_none());
        let item: WithId =
            serde_json::from_value(serde_json::json!({"id": "abc", "parent": 7})).unwrap();
        assert_eq!(item.id, "abc");
        assert_eq!(item.parent.as_deref(), Some("7"));
        assert!(serde_json::from_value::<WithId>(serde_json::json!({"id": []})).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct WithAddress {
        #[serde(deserialize_with = "from_str")]
        address: std::net::Ipv4Addr,
    }

    #[test]
    fn test_from_str() {
        let item: WithAddress =
            serde_json::from_value(serde_json::json!({"address": "10.0.0.1"})).unwrap();
        assert_eq!(item.address, std::net::Ipv4Addr::new(10, 0, 0, 1));
        assert!(serde_json::from_value::<WithAddress>(serde_json::json!({"address": "x"})).is_err());
        assert!(serde_json::from_value::<WithAddress>(serde_json::json!({"address": 1})).is_err());
    }
}
