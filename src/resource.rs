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

//! Generic resource primitives.
//!
//! Every REST entity is described by the [Resource](trait.Resource.html)
//! trait: where it lives, how it is wrapped in JSON and which operations the
//! service allows on it. The functions of this module implement the generic
//! create/get/find/update/delete/list requests on top of it; service proxies
//! delegate to them.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use osauth::services::ServiceType;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::common::{ResourceIterator, ResourceQuery};
use super::utils::{self, Query};
use super::{Error, ErrorKind, Result, Session};

/// HTTP method used to save changes to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMethod {
    /// Full or partial replacement with PUT.
    Put,
    /// Partial update with PATCH.
    Patch,
}

/// Description of a REST resource.
pub trait Resource: DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Service type of the resource.
    type Service: ServiceType + Debug + Clone + Send + Sync + 'static;

    /// Service the resource belongs to.
    const SERVICE: Self::Service;

    /// JSON key wrapping a single resource.
    const RESOURCE_KEY: &'static str;

    /// JSON key wrapping a list of resources.
    const RESOURCES_KEY: &'static str;

    /// First path component of the resource URL.
    const BASE_PATH: &'static str;

    /// Whether the resource can be created.
    const ALLOW_CREATE: bool = true;

    /// Whether the resource can be fetched by ID.
    const ALLOW_FETCH: bool = true;

    /// Whether the resource can be updated.
    const ALLOW_COMMIT: bool = true;

    /// Whether the resource can be deleted.
    const ALLOW_DELETE: bool = true;

    /// Whether the resources can be listed.
    const ALLOW_LIST: bool = true;

    /// HTTP method for updates.
    const COMMIT_METHOD: CommitMethod = CommitMethod::Put;

    /// Unique ID of the resource.
    fn id(&self) -> &str;

    /// Name of the resource (if any).
    fn name(&self) -> Option<&str> {
        None
    }
}

fn check_allowed<R: Resource>(allowed: bool, operation: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!("{} is not supported for {}", operation, R::RESOURCES_KEY),
        ))
    }
}

/// Extract a single resource from a response.
///
/// The resource may or may not be wrapped into its resource key.
pub fn extract_one<R: Resource>(mut root: Value) -> Result<R> {
    let value = match root.get_mut(R::RESOURCE_KEY) {
        Some(inner) if inner.is_object() => inner.take(),
        _ => root,
    };
    serde_json::from_value(value).map_err(utils::invalid_response)
}

/// Extract a list of resources from a response.
///
/// The list may or may not be wrapped into its resources key.
pub fn extract_many<R: Resource>(mut root: Value) -> Result<Vec<R>> {
    let wrapped = root.get_mut(R::RESOURCES_KEY).map(Value::take);
    let value = match wrapped {
        Some(inner) => inner,
        None if root.is_array() => root,
        None => {
            return Err(utils::invalid_response(format!(
                "missing key {} in the response",
                R::RESOURCES_KEY
            )))
        }
    };
    serde_json::from_value(value).map_err(utils::invalid_response)
}

/// Wrap a request body into the resource key.
pub fn wrap_body<R: Resource, B: Serialize>(body: &B) -> Result<Value> {
    let value = serde_json::to_value(body).map_err(utils::invalid_input)?;
    let mut root = serde_json::Map::new();
    let _ = root.insert(R::RESOURCE_KEY.to_string(), value);
    Ok(Value::Object(root))
}

/// Create a resource, sending the body as it is.
pub async fn create<R, B>(session: &Session, body: &B) -> Result<R>
where
    R: Resource,
    B: Serialize + Debug + Sync + ?Sized,
{
    check_allowed::<R>(R::ALLOW_CREATE, "Creation")?;
    debug!("Creating a new {} with {:?}", R::RESOURCE_KEY, body);
    let root: Value = session
        .post(R::SERVICE, &[R::BASE_PATH])
        .json(body)
        .fetch()
        .await?;
    let result = extract_one::<R>(root)?;
    debug!("Created {} {}", R::RESOURCE_KEY, result.id());
    Ok(result)
}

/// Fetch a resource by its ID.
pub async fn get<R: Resource>(session: &Session, id: &str) -> Result<R> {
    check_allowed::<R>(R::ALLOW_FETCH, "Fetching")?;
    trace!("Fetching {} {}", R::RESOURCE_KEY, id);
    let root: Value = session.get(R::SERVICE, &[R::BASE_PATH, id]).fetch().await?;
    let result = extract_one::<R>(root)?;
    trace!("Received {:?}", result);
    Ok(result)
}

/// List resources matching the query.
pub async fn list<R, Q>(session: &Session, query: &Q) -> Result<Vec<R>>
where
    R: Resource,
    Q: Serialize + Debug + Sync + ?Sized,
{
    list_at::<R, Q>(session, &[R::BASE_PATH], query).await
}

/// List resources at a non-standard location (e.g. `servers/detail`).
pub async fn list_at<R, Q>(session: &Session, path: &[&str], query: &Q) -> Result<Vec<R>>
where
    R: Resource,
    Q: Serialize + Debug + Sync + ?Sized,
{
    check_allowed::<R>(R::ALLOW_LIST, "Listing")?;
    trace!("Listing {} with {:?}", R::RESOURCES_KEY, query);
    let root: Value = session.get(R::SERVICE, path).query(query).fetch().await?;
    let result = extract_many::<R>(root)?;
    trace!("Received {} {}", result.len(), R::RESOURCES_KEY);
    Ok(result)
}

/// A listing of resources that follows marker and limit pagination.
#[derive(Debug, Clone)]
pub struct ListQuery<R> {
    session: Session,
    path: &'static [&'static str],
    query: Query,
    can_paginate: bool,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ListQuery<R> {
    /// Start a listing at the base path of the resource.
    pub fn new(session: &Session, query: Query) -> ListQuery<R> {
        ListQuery {
            session: session.clone(),
            path: &[],
            query,
            can_paginate: true,
            resource: PhantomData,
        }
    }

    /// List at a non-standard location (e.g. `servers/detail`).
    pub fn at(mut self, path: &'static [&'static str]) -> ListQuery<R> {
        self.path = path;
        self
    }

    /// Request everything in one call.
    pub fn without_pagination(mut self) -> ListQuery<R> {
        self.can_paginate = false;
        self
    }

    /// Fetch all pages.
    pub async fn all(self) -> Result<Vec<R>> {
        ResourceIterator::new(self).into_stream().try_collect().await
    }

    fn chunk_query(&self, limit: Option<usize>, marker: Option<String>) -> Query {
        self.query.with_marker_and_limit(limit, marker)
    }
}

#[async_trait]
impl<R: Resource> ResourceQuery for ListQuery<R> {
    type Item = R;

    const DEFAULT_LIMIT: usize = 100;

    async fn can_paginate(&self) -> Result<bool> {
        Ok(self.can_paginate)
    }

    fn extract_marker(&self, resource: &Self::Item) -> String {
        resource.id().to_string()
    }

    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>> {
        let query = self.chunk_query(limit, marker);
        if self.path.is_empty() {
            list::<R, _>(&self.session, &query).await
        } else {
            list_at::<R, _>(&self.session, self.path, &query).await
        }
    }
}

/// Find a resource by its ID or name.
///
/// The ID is tried first. Fails with `ResourceNotFound` if nothing matches
/// and with `TooManyItems` if the name is ambiguous.
pub async fn find<R: Resource>(session: &Session, id_or_name: &str) -> Result<R> {
    if R::ALLOW_FETCH {
        match get::<R>(session, id_or_name).await {
            Ok(value) => return Ok(value),
            // Some services reject names that do not look like IDs.
            Err(err)
                if err.kind() == ErrorKind::ResourceNotFound
                    || err.kind() == ErrorKind::InvalidInput => {}
            Err(err) => return Err(err),
        }
    }

    trace!("Looking up {} by name {}", R::RESOURCE_KEY, id_or_name);
    let mut query = Query::new();
    query.push_str("name", id_or_name);
    let items = list::<R, _>(session, &query).await?;
    find_in(items, id_or_name)
}

/// Pick exactly one resource with the given ID or name.
pub fn find_in<R: Resource>(items: Vec<R>, id_or_name: &str) -> Result<R> {
    let matching = items
        .into_iter()
        .filter(|item| item.id() == id_or_name || item.name() == Some(id_or_name));
    utils::one(
        matching,
        format!("No {} found for {}", R::RESOURCE_KEY, id_or_name),
        format!("More than one {} exists with the name {}", R::RESOURCE_KEY, id_or_name),
    )
}

/// Update a resource, sending the body as it is.
pub async fn update<R, B>(session: &Session, id: &str, body: &B) -> Result<R>
where
    R: Resource,
    B: Serialize + Debug + Sync + ?Sized,
{
    check_allowed::<R>(R::ALLOW_COMMIT, "Updating")?;
    debug!("Updating {} {} with {:?}", R::RESOURCE_KEY, id, body);
    let builder = match R::COMMIT_METHOD {
        CommitMethod::Put => session.put(R::SERVICE, &[R::BASE_PATH, id]),
        CommitMethod::Patch => session.request(R::SERVICE, Method::PATCH, &[R::BASE_PATH, id]),
    };
    let root: Value = builder.json(body).fetch().await?;
    let result = extract_one::<R>(root)?;
    debug!("Updated {} {}", R::RESOURCE_KEY, id);
    Ok(result)
}

/// Delete a resource.
///
/// Returns `false` if the resource did not exist and `ignore_missing` is
/// set, fails with `ResourceNotFound` otherwise.
pub async fn delete<R: Resource>(session: &Session, id: &str, ignore_missing: bool) -> Result<bool> {
    check_allowed::<R>(R::ALLOW_DELETE, "Deletion")?;
    debug!("Deleting {} {}", R::RESOURCE_KEY, id);
    match session.delete(R::SERVICE, &[R::BASE_PATH, id]).send().await {
        Ok(..) => {
            debug!("Successfully requested deletion of {} {}", R::RESOURCE_KEY, id);
            Ok(true)
        }
        Err(err) if ignore_missing && err.kind() == ErrorKind::ResourceNotFound => {
            debug!("{} {} is already gone", R::RESOURCE_KEY, id);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use osauth::services::GenericService;
    use osauth::services::VersionSelector;
    use serde_json::json;

    use super::super::ErrorKind;
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Widget {
        pub id: String,
        #[serde(default)]
        pub name: Option<String>,
    }

    impl Resource for Widget {
        type Service = GenericService;
        const SERVICE: GenericService = GenericService::new("widget", VersionSelector::Any);
        const RESOURCE_KEY: &'static str = "widget";
        const RESOURCES_KEY: &'static str = "widgets";
        const BASE_PATH: &'static str = "widgets";
        const ALLOW_COMMIT: bool = false;

        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> Option<&str> {
            self.name.as_deref()
        }
    }

    fn widget(id: &str, name: &str) -> Widget {
        Widget {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    #[test]
    fn test_extract_one_wrapped() {
        let w: Widget = extract_one(json!({"widget": {"id": "1", "name": "w"}})).unwrap();
        assert_eq!(w.id, "1");
    }

    #[test]
    fn test_extract_one_bare() {
        let w: Widget = extract_one(json!({"id": "1", "name": "w"})).unwrap();
        assert_eq!(w.name.as_deref(), Some("w"));
    }

    #[test]
    fn test_extract_one_invalid() {
        let err = extract_one::<Widget>(json!({"name": "w"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_extract_many() {
        let ws: Vec<Widget> =
            extract_many(json!({"widgets": [{"id": "1"}, {"id": "2"}]})).unwrap();
        assert_eq!(ws.len(), 2);
        let ws: Vec<Widget> = extract_many(json!([{"id": "1"}])).unwrap();
        assert_eq!(ws.len(), 1);
        let err = extract_many::<Widget>(json!({"things": []})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_wrap_body() {
        let body = wrap_body::<Widget, _>(&json!({"name": "w"})).unwrap();
        assert_eq!(body, json!({"widget": {"name": "w"}}));
    }

    #[test]
    fn test_find_in() {
        let items = vec![widget("1", "a"), widget("2", "b"), widget("3", "b")];
        assert_eq!(find_in(items.clone(), "a").unwrap().id, "1");
        assert_eq!(find_in(items.clone(), "3").unwrap().id, "3");
        assert_eq!(
            find_in(items.clone(), "b").unwrap_err().kind(),
            ErrorKind::TooManyItems
        );
        assert_eq!(
            find_in(items, "c").unwrap_err().kind(),
            ErrorKind::ResourceNotFound
        );
    }

    async fn fake_session() -> Session {
        let auth = osauth::NoAuth::new("http://127.0.0.1:5000/").unwrap();
        Session::new(auth).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_query_pages() {
        let session = fake_session().await;
        let query = ListQuery::<Widget>::new(&session, Query::new()).at(&["widgets", "detail"]);
        assert!(query.can_paginate().await.unwrap());
        assert_eq!(query.extract_marker(&widget("42", "w")), "42");
        let chunk = query.chunk_query(Some(100), Some("42".into()));
        assert_eq!(
            chunk.0,
            vec![
                ("limit".to_string(), "100".to_string()),
                ("marker".to_string(), "42".to_string())
            ]
        );
        assert!(query.chunk_query(None, None).0.is_empty());
    }

    #[tokio::test]
    async fn test_list_query_without_pagination() {
        let session = fake_session().await;
        let query = ListQuery::<Widget>::new(&session, Query::new()).without_pagination();
        assert!(!query.can_paginate().await.unwrap());
    }

    #[test]
    fn test_capabilities() {
        assert!(check_allowed::<Widget>(Widget::ALLOW_CREATE, "Creation").is_ok());
        let err = check_allowed::<Widget>(Widget::ALLOW_COMMIT, "Updating").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
