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

//! Filtering helpers of the cloud layer.

use std::future::Future;

use glob::Pattern;
use serde::Serialize;
use serde_json::{Map, Value};

pub use super::super::utils::is_uuid_like;
use super::super::utils::{invalid_input, invalid_response};
use super::super::{Error, ErrorKind, Result};

/// Client-side filters applied to a list of records.
#[derive(Debug, Clone, PartialEq)]
pub enum Filters {
    /// Every key must match, nested objects are matched recursively.
    Map(Map<String, Value>),
    /// A JMESPath expression evaluated over the whole list.
    Jmespath(String),
}

impl Filters {
    /// Build map filters from a JSON object.
    ///
    /// Fails with `InvalidInput` if the value is not an object.
    pub fn map(value: Value) -> Result<Filters> {
        match value {
            Value::Object(map) => Ok(Filters::Map(map)),
            other => Err(invalid_input(format!(
                "Filters must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Build a JMESPath filter.
    pub fn jmespath<S: Into<String>>(expression: S) -> Filters {
        Filters::Jmespath(expression.into())
    }
}

impl From<Map<String, Value>> for Filters {
    fn from(value: Map<String, Value>) -> Filters {
        Filters::Map(value)
    }
}

fn is_glob(value: &str) -> bool {
    value.contains(['*', '?', '['])
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        _ => None,
    }
}

fn matches_filter(item: &Value, filter: &Value) -> bool {
    match filter {
        Value::Object(filter) => filter.iter().all(|(key, expected)| match item.get(key) {
            Some(actual) => matches_filter(actual, expected),
            None => expected.is_null(),
        }),
        Value::Null => item.is_null(),
        Value::Array(_) => item == filter,
        _ => match (scalar_to_string(item), scalar_to_string(filter)) {
            (Some(actual), Some(expected)) => actual == expected,
            _ => false,
        },
    }
}

fn matches_name_or_id(item: &Value, name_or_id: &str, pattern: Option<&Pattern>) -> bool {
    let id = item.get("id").and_then(Value::as_str);
    let name = item.get("name").and_then(Value::as_str);
    if id == Some(name_or_id) || name == Some(name_or_id) {
        return true;
    }
    match pattern {
        Some(pattern) => id.into_iter().chain(name).any(|v| pattern.matches(v)),
        None => false,
    }
}

fn jmespath_filter(values: &[Value], expression: &str) -> Result<Vec<Value>> {
    let expr = jmespath::compile(expression).map_err(|e| {
        invalid_input(format!("Invalid JMESPath expression {}: {}", expression, e))
    })?;
    let found = expr
        .search(Value::Array(values.to_vec()))
        .map_err(|e| invalid_input(format!("Cannot evaluate {}: {}", expression, e)))?;
    match serde_json::to_value(&*found).map_err(invalid_response)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// Filter a list of records by name or ID and by filters.
///
/// `name_or_id` matches the `id` or the `name` field exactly. When it
/// contains glob characters (`*`, `?` or `[`), it is also used as a pattern.
pub fn filter_list<T: Serialize>(
    items: Vec<T>,
    name_or_id: Option<&str>,
    filters: Option<&Filters>,
) -> Result<Vec<T>> {
    let pattern = name_or_id
        .filter(|value| is_glob(value))
        .and_then(|value| Pattern::new(value).ok());

    let mut selected = Vec::with_capacity(items.len());
    for item in items {
        let value = serde_json::to_value(&item).map_err(invalid_response)?;
        if let Some(name_or_id) = name_or_id {
            if !matches_name_or_id(&value, name_or_id, pattern.as_ref()) {
                continue;
            }
        }
        selected.push((value, item));
    }

    match filters {
        None => Ok(selected.into_iter().map(|(_, item)| item).collect()),
        Some(Filters::Map(filters)) => {
            let filters = Value::Object(filters.clone());
            Ok(selected
                .into_iter()
                .filter(|(value, _)| matches_filter(value, &filters))
                .map(|(_, item)| item)
                .collect())
        }
        Some(Filters::Jmespath(expression)) => {
            let values = selected.iter().map(|(v, _)| v.clone()).collect::<Vec<_>>();
            let found = jmespath_filter(&values, expression)?;
            Ok(selected
                .into_iter()
                .filter(|(value, _)| found.contains(value))
                .map(|(_, item)| item)
                .collect())
        }
    }
}

/// Pick a single entity from search results.
fn single_entity<T>(name_or_id: &str, mut found: Vec<T>) -> Result<Option<T>> {
    if found.len() > 1 {
        return Err(Error::new(
            ErrorKind::TooManyItems,
            format!("Multiple matches found for {}", name_or_id),
        ));
    }
    Ok(found.pop())
}

/// Get an entity by searching, or directly by its ID.
///
/// `direct` is only awaited when `use_direct_get` is set, no filters are
/// given and `name_or_id` looks like an ID. Otherwise `search` is awaited and
/// must yield at most one result.
pub async fn get_entity<T, D, S>(
    use_direct_get: bool,
    name_or_id: &str,
    filters: Option<&Filters>,
    direct: D,
    search: S,
) -> Result<Option<T>>
where
    D: Future<Output = Result<Option<T>>>,
    S: Future<Output = Result<Vec<T>>>,
{
    if use_direct_get && filters.is_none() && is_uuid_like(name_or_id) {
        trace!("Fetching {} directly", name_or_id);
        return direct.await;
    }
    single_entity(name_or_id, search.await?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

fn parse_range(expression: &str) -> Option<(RangeOp, i64)> {
    let (op, number) = if let Some(rest) = expression.strip_prefix("<=") {
        (RangeOp::Le, rest)
    } else if let Some(rest) = expression.strip_prefix(">=") {
        (RangeOp::Ge, rest)
    } else if let Some(rest) = expression.strip_prefix('<') {
        (RangeOp::Lt, rest)
    } else if let Some(rest) = expression.strip_prefix('>') {
        (RangeOp::Gt, rest)
    } else {
        (RangeOp::Eq, expression)
    };
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    number.parse().ok().map(|n| (op, n))
}

fn numeric_field(value: &Value, key: &str) -> Result<i64> {
    let field = value
        .get(key)
        .ok_or_else(|| invalid_input(format!("Field {} is missing", key)))?;
    match field {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid_input(format!("Field {} is not an integer: {}", key, field)))
}

/// Filter records by a numeric field.
///
/// The expression is `min`, `max`, an exact number `N` or a comparison
/// `<N`, `>N`, `<=N`, `>=N`.
pub fn range_filter<T: Serialize>(items: Vec<T>, key: &str, expression: &str) -> Result<Vec<T>> {
    let expression = expression.trim().to_uppercase();
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let value = serde_json::to_value(&item).map_err(invalid_response)?;
        values.push((numeric_field(&value, key)?, item));
    }

    let (op, bound) = match expression.as_str() {
        "MIN" | "MAX" => {
            let numbers = values.iter().map(|(n, _)| *n);
            let extreme = if expression == "MIN" {
                numbers.min()
            } else {
                numbers.max()
            };
            match extreme {
                Some(extreme) => (RangeOp::Eq, extreme),
                None => return Ok(Vec::new()),
            }
        }
        other => parse_range(other)
            .ok_or_else(|| invalid_input(format!("Invalid range value: {}", other)))?,
    };

    Ok(values
        .into_iter()
        .filter(|(n, _)| match op {
            RangeOp::Eq => *n == bound,
            RangeOp::Lt => *n < bound,
            RangeOp::Gt => *n > bound,
            RangeOp::Le => *n <= bound,
            RangeOp::Ge => *n >= bound,
        })
        .map(|(_, item)| item)
        .collect())
}

#[cfg(test)]
mod test {
    use std::future::Future;

    use serde_json::{json, Value};

    use super::super::super::{ErrorKind, Result};
    use super::{filter_list, get_entity, is_uuid_like, range_filter, Filters};

    fn records() -> Vec<Value> {
        vec![
            json!({"id": "1", "name": "web-1", "status": "ACTIVE", "ram": 1024,
                   "extra": {"zone": "a", "size": 1}}),
            json!({"id": "2", "name": "web-2", "status": "BUILD", "ram": 2048,
                   "extra": {"zone": "b", "size": 2}}),
            json!({"id": "3", "name": "db", "status": "ACTIVE", "ram": "4096",
                   "extra": {"zone": "a", "size": 3}}),
        ]
    }

    fn ids(items: &[Value]) -> Vec<&str> {
        items.iter().map(|i| i["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_filter_by_name_or_id() {
        assert_eq!(ids(&filter_list(records(), Some("db"), None).unwrap()), vec!["3"]);
        assert_eq!(ids(&filter_list(records(), Some("2"), None).unwrap()), vec!["2"]);
        assert!(filter_list(records(), Some("web"), None).unwrap().is_empty());
        assert_eq!(ids(&filter_list(records(), None, None).unwrap()).len(), 3);
    }

    #[test]
    fn test_filter_glob() {
        assert_eq!(
            ids(&filter_list(records(), Some("web-*"), None).unwrap()),
            vec!["1", "2"]
        );
        assert_eq!(
            ids(&filter_list(records(), Some("web-[2]"), None).unwrap()),
            vec!["2"]
        );
        assert_eq!(ids(&filter_list(records(), Some("d?"), None).unwrap()), vec!["3"]);
    }

    #[test]
    fn test_filter_map() {
        let filters = Filters::map(json!({"status": "ACTIVE"})).unwrap();
        assert_eq!(
            ids(&filter_list(records(), None, Some(&filters)).unwrap()),
            vec!["1", "3"]
        );

        let filters = Filters::map(json!({"status": "ACTIVE", "extra": {"zone": "a", "size": "3"}}))
            .unwrap();
        assert_eq!(
            ids(&filter_list(records(), None, Some(&filters)).unwrap()),
            vec!["3"]
        );

        let filters = Filters::map(json!({"ram": 2048})).unwrap();
        assert_eq!(
            ids(&filter_list(records(), Some("web-*"), Some(&filters)).unwrap()),
            vec!["2"]
        );
    }

    #[test]
    fn test_filter_map_missing_key() {
        let filters = Filters::map(json!({"missing": "value"})).unwrap();
        assert!(filter_list(records(), None, Some(&filters)).unwrap().is_empty());
    }

    #[test]
    fn test_filters_must_be_object() {
        assert_eq!(
            Filters::map(json!(["status"])).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_filter_jmespath() {
        let filters = Filters::jmespath("[?extra.zone=='a']");
        assert_eq!(
            ids(&filter_list(records(), None, Some(&filters)).unwrap()),
            vec!["1", "3"]
        );
        let filters = Filters::jmespath("[?status=='BUILD']");
        assert_eq!(
            ids(&filter_list(records(), Some("web-*"), Some(&filters)).unwrap()),
            vec!["2"]
        );
    }

    #[test]
    fn test_filter_jmespath_invalid() {
        let filters = Filters::jmespath("[?status==");
        assert_eq!(
            filter_list(records(), None, Some(&filters))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_uuid_like() {
        assert!(is_uuid_like("0a7c6a4e-5f2a-4d2b-9d4e-3f7c2b1a0e9d"));
        assert!(is_uuid_like("0a7c6a4e5f2a4d2b9d4e3f7c2b1a0e9d"));
        assert!(!is_uuid_like("0a7c6a4e-5f2a4d2b-9d4e-3f7c2b1a0e9d"));
        assert!(!is_uuid_like("my-server"));
        assert!(!is_uuid_like("0a7c6a4e-5f2a-4d2b-9d4e-3f7c2b1a0e9z"));
    }

    #[test]
    fn test_range_filter() {
        let by = |expr: &str| ids(&range_filter(records(), "ram", expr).unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(by("min"), vec!["1"]);
        assert_eq!(by("MAX"), vec!["3"]);
        assert_eq!(by("2048"), vec!["2"]);
        assert_eq!(by("<2048"), vec!["1"]);
        assert_eq!(by("<=2048"), vec!["1", "2"]);
        assert_eq!(by(">2048"), vec!["3"]);
        assert_eq!(by(">=1024"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_range_filter_invalid() {
        for expr in &["=1024", "<", "big", "<<1"] {
            assert_eq!(
                range_filter(records(), "ram", expr).unwrap_err().kind(),
                ErrorKind::InvalidInput
            );
        }
        assert_eq!(
            range_filter(records(), "disk", "min").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_range_filter_empty() {
        assert!(range_filter(Vec::<Value>::new(), "ram", "min")
            .unwrap()
            .is_empty());
    }

    fn direct(value: Option<Value>) -> impl Future<Output = Result<Option<Value>>> {
        async move { Ok(value) }
    }

    fn search(name_or_id: &str) -> impl Future<Output = Result<Vec<Value>>> + '_ {
        async move { filter_list(records(), Some(name_or_id), None) }
    }

    fn never_direct() -> impl Future<Output = Result<Option<Value>>> {
        async { panic!("direct get must not be used") }
    }

    fn never_search() -> impl Future<Output = Result<Vec<Value>>> {
        async { panic!("search must not be used") }
    }

    #[tokio::test]
    async fn test_get_entity_search() {
        let found = get_entity(true, "web-1", None, never_direct(), search("web-1"))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["id"], "1");

        let missing = get_entity(false, "nope", None, direct(None), search("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_entity_too_many() {
        let err = get_entity(false, "web-*", None, direct(None), search("web-*"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyItems);
        assert!(err.to_string().contains("Multiple matches found for web-*"));
    }

    #[tokio::test]
    async fn test_get_entity_direct() {
        let id = "0a7c6a4e-5f2a-4d2b-9d4e-3f7c2b1a0e9d";
        let found = get_entity(true, id, None, direct(Some(json!({"id": id}))), never_search())
            .await
            .unwrap();
        assert_eq!(found.unwrap()["id"], id);

        let filters = Filters::map(json!({"status": "ACTIVE"})).unwrap();
        let found = get_entity(true, id, Some(&filters), never_direct(), search(id))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
