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

//! Various utilities.

use std::fmt::Display;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::{Error, ErrorKind, Result};

/// Query parameters of a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query(pub Vec<(String, String)>);

impl Query {
    /// Empty query.
    pub fn new() -> Query {
        Query(Vec::new())
    }

    /// Add an item to the query.
    pub fn push<K, V>(&mut self, param: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.0.push((param.into(), value.to_string()))
    }

    /// Add a string item to the query.
    pub fn push_str<K, V>(&mut self, param: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push((param.into(), value.into()))
    }

    /// Whether the query contains the given parameter.
    pub fn contains(&self, param: &str) -> bool {
        self.0.iter().any(|(key, _)| key == param)
    }

    /// Whether the query is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this query with a marker and a limit.
    pub fn with_marker_and_limit(&self, limit: Option<usize>, marker: Option<String>) -> Query {
        let mut result = self.clone();
        if let Some(limit) = limit {
            result.push("limit", limit);
        }
        if let Some(marker) = marker {
            result.push_str("marker", marker);
        }
        result
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for item in &self.0 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

protocol_enum! {
    #[doc = "Sorting direction."]
    enum SortDir {
        #[doc = "Ascending."]
        Asc = "asc",
        #[doc = "Descending."]
        Desc = "desc"
    }
}

/// Sorting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort<T: Into<String>> {
    /// Sorting by given field in ascendant order.
    Asc(T),
    /// Sorting by given field in descendant order.
    Desc(T),
}

impl<T: Into<String>> From<Sort<T>> for (String, SortDir) {
    fn from(value: Sort<T>) -> (String, SortDir) {
        match value {
            Sort::Asc(val) => (val.into(), SortDir::Asc),
            Sort::Desc(val) => (val.into(), SortDir::Desc),
        }
    }
}

/// Extensions for Result objects.
pub trait ResultExt<T> {
    /// Convert a `ResourceNotFound` error into `None`.
    fn if_not_found_then_none(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn if_not_found_then_none(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::ResourceNotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Get one and only one item from the list.
pub fn one<T, I, S1, S2>(collection: I, not_found_msg: S1, too_many_msg: S2) -> Result<T>
where
    I: IntoIterator<Item = T>,
    S1: Into<String>,
    S2: Into<String>,
{
    let mut iter = collection.into_iter();
    match iter.next() {
        Some(result) => {
            if iter.next().is_some() {
                Err(Error::new(ErrorKind::TooManyItems, too_many_msg))
            } else {
                Ok(result)
            }
        }
        None => Err(Error::new(ErrorKind::ResourceNotFound, not_found_msg)),
    }
}

/// Whether the value looks like a UUID (with or without dashes).
pub fn is_uuid_like(value: &str) -> bool {
    let hex = value.replace('-', "");
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    if hex.len() == value.len() {
        return true;
    }
    let groups = value.split('-').map(str::len).collect::<Vec<_>>();
    groups == [8, 4, 4, 4, 12]
}

/// Error for a payload that cannot be processed.
pub fn invalid_response<D: Display>(error: D) -> Error {
    Error::new(
        ErrorKind::InvalidResponse,
        format!("Cannot process the server response: {}", error),
    )
}

/// Error for an input that cannot be processed.
pub fn invalid_input<D: Display>(message: D) -> Error {
    Error::new(ErrorKind::InvalidInput, message.to_string())
}

#[cfg(test)]
mod test {
    use super::super::{Error, ErrorKind};
    use super::{one, Query, ResultExt, Sort, SortDir};

    #[test]
    fn test_query_serialization() {
        let mut query = Query::new();
        query.push_str("name", "foo");
        query.push("limit", 42);
        let result = serde_json::to_value(&query).unwrap();
        assert_eq!(result, serde_json::json!([["name", "foo"], ["limit", "42"]]));
    }

    #[test]
    fn test_query_marker_and_limit() {
        let mut query = Query::new();
        query.push_str("status", "ACTIVE");
        let paged = query.with_marker_and_limit(Some(10), Some("abcd".into()));
        assert!(paged.contains("limit"));
        assert!(paged.contains("marker"));
        assert!(!query.contains("marker"));
        assert_eq!(paged.0.len(), 3);
    }

    #[test]
    fn test_sort() {
        let (field, dir): (String, SortDir) = Sort::Desc("created_at").into();
        assert_eq!(field, "created_at");
        assert_eq!(dir.to_string(), "desc");
    }

    #[test]
    fn test_one() {
        assert_eq!(one(vec![1], "none", "many").unwrap(), 1);
        assert_eq!(
            one(Vec::<u8>::new(), "none", "many").unwrap_err().kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            one(vec![1, 2], "none", "many").unwrap_err().kind(),
            ErrorKind::TooManyItems
        );
    }

    #[test]
    fn test_if_not_found_then_none() {
        let res: super::super::Result<u8> =
            Err(Error::new(ErrorKind::ResourceNotFound, "missing"));
        assert_eq!(res.if_not_found_then_none().unwrap(), None);
        let res: super::super::Result<u8> = Err(Error::new(ErrorKind::Conflict, "conflict"));
        assert!(res.if_not_found_then_none().is_err());
        let res: super::super::Result<u8> = Ok(1);
        assert_eq!(res.if_not_found_then_none().unwrap(), Some(1));
    }
}
