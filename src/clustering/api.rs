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

//! Foundation bits exposing the Clustering API.
//!
//! Most modifying calls are asynchronous on the server side: they return an
//! action, either in the `Location` header or in the body.

use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, Response};
use serde::Serialize;
use serde_json::Value;

use super::super::resource::{extract_one, wrap_body, Resource};
use super::super::utils;
use super::super::{Error, ErrorKind, Result, Session};
use super::protocol::*;

/// Extract an action ID from the `Location` header.
fn action_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(From::from)
}

/// Extract an action ID from a response body like `{"action": "<id>"}`.
fn action_from_body(body: &Value) -> Option<String> {
    body.get("action")
        .and_then(Value::as_str)
        .map(From::from)
}

async fn into_json_and_action(response: Response) -> Result<(Value, Option<String>)> {
    let action = action_from_headers(response.headers());
    let body: Value = if response.content_length() == Some(0) {
        Value::Null
    } else {
        response.json().await?
    };
    let action = action.or_else(|| action_from_body(&body));
    trace!("Received {:?} with action {:?}", body, action);
    Ok((body, action))
}

/// Create a resource, returning it with the action doing the job (if any).
pub async fn create<R, B>(session: &Session, request: &B) -> Result<(R, Option<String>)>
where
    R: Resource,
    B: Serialize + std::fmt::Debug,
{
    debug!("Creating a new {} with {:?}", R::RESOURCE_KEY, request);
    let body = wrap_body::<R, _>(request)?;
    let response = session
        .post(CLUSTERING, &[R::BASE_PATH])
        .json(&body)
        .send()
        .await?;
    let (root, action) = into_json_and_action(response).await?;
    let result = extract_one::<R>(root)?;
    debug!("Created {} {}", R::RESOURCE_KEY, result.id());
    Ok((result, action))
}

/// Update a resource, returning it with the action doing the job (if any).
pub async fn update<R, B>(session: &Session, id: &str, update: &B) -> Result<(R, Option<String>)>
where
    R: Resource,
    B: Serialize + std::fmt::Debug,
{
    debug!("Updating {} {} with {:?}", R::RESOURCE_KEY, id, update);
    let body = wrap_body::<R, _>(update)?;
    let response = session
        .request(CLUSTERING, Method::PATCH, &[R::BASE_PATH, id])
        .json(&body)
        .send()
        .await?;
    let (root, action) = into_json_and_action(response).await?;
    let result = extract_one::<R>(root)?;
    Ok((result, action))
}

/// Delete a resource, returning the action doing the job (if any).
///
/// Returns `None` as the outer value if the resource was already gone and
/// `ignore_missing` is set.
pub async fn delete<R: Resource>(
    session: &Session,
    id: &str,
    ignore_missing: bool,
) -> Result<Option<Option<String>>> {
    debug!("Deleting {} {}", R::RESOURCE_KEY, id);
    match session.delete(CLUSTERING, &[R::BASE_PATH, id]).send().await {
        Ok(response) => {
            let action = action_from_headers(response.headers());
            debug!("Requested deletion of {} {}, action {:?}", R::RESOURCE_KEY, id, action);
            Ok(Some(action))
        }
        Err(err) if ignore_missing && err.kind() == ErrorKind::ResourceNotFound => {
            debug!("{} {} is already gone", R::RESOURCE_KEY, id);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Run an action on a cluster, returning the action ID.
pub async fn cluster_action<S: AsRef<str>>(
    session: &Session,
    cluster_id: S,
    action: &str,
    args: Value,
) -> Result<String> {
    let cluster_id = cluster_id.as_ref();
    debug!("Running {} on cluster {} with {:?}", action, cluster_id, args);
    let mut body = serde_json::Map::new();
    let _ = body.insert(action.to_string(), args);
    let response = session
        .post(CLUSTERING, &["clusters", cluster_id, "actions"])
        .json(&body)
        .send()
        .await?;
    let (_, action_id) = into_json_and_action(response).await?;
    action_id.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("No action returned for {} on cluster {}", action, cluster_id),
        )
    })
}

/// List policies attached to a cluster.
pub async fn list_cluster_policies<S: AsRef<str>>(
    session: &Session,
    cluster_id: S,
) -> Result<Vec<ClusterPolicy>> {
    let cluster_id = cluster_id.as_ref();
    trace!("Listing policies of cluster {}", cluster_id);
    let root: ClusterPoliciesRoot = session
        .get(CLUSTERING, &["clusters", cluster_id, "policies"])
        .fetch()
        .await?;
    trace!("Received cluster policies {:?}", root.cluster_policies);
    Ok(root.cluster_policies)
}

/// Build the arguments of a policy attach/update action.
pub fn policy_args(policy_id: &str, enabled: Option<bool>) -> Result<Value> {
    let mut args = serde_json::Map::new();
    let _ = args.insert("policy_id".into(), Value::String(policy_id.into()));
    if let Some(enabled) = enabled {
        let _ = args.insert("enabled".into(), Value::Bool(enabled));
    }
    serde_json::to_value(args).map_err(utils::invalid_input)
}

#[cfg(test)]
mod test {
    use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
    use serde_json::json;

    use super::{action_from_body, action_from_headers, policy_args};

    #[test]
    fn test_action_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(action_from_headers(&headers).is_none());
        let _ = headers.insert(
            LOCATION,
            HeaderValue::from_static("https://example.com/v1/actions/a1b2"),
        );
        assert_eq!(action_from_headers(&headers).as_deref(), Some("a1b2"));
    }

    #[test]
    fn test_action_from_body() {
        assert_eq!(
            action_from_body(&json!({"action": "a1"})).as_deref(),
            Some("a1")
        );
        assert!(action_from_body(&json!({"cluster": {}})).is_none());
        assert!(action_from_body(&json!(null)).is_none());
    }

    #[test]
    fn test_policy_args() {
        assert_eq!(
            policy_args("p1", Some(false)).unwrap(),
            json!({"policy_id": "p1", "enabled": false})
        );
        assert_eq!(policy_args("p1", None).unwrap(), json!({"policy_id": "p1"}));
    }
}
