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

//! Cluster management via Clustering API.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::stream::{Stream, TryStreamExt};
use serde_json::{json, Value};

use super::super::common::{PolicyRef, ProfileRef, Refresh, ResourceIterator, ResourceQuery};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session, Sort};
use super::actions::ActionWaiter;
use super::{api, protocol};

/// A query to cluster list.
#[derive(Clone, Debug)]
pub struct ClusterQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
}

/// Structure representing a cluster.
#[derive(Clone, Debug)]
pub struct Cluster {
    session: Session,
    inner: protocol::Cluster,
    dirty: HashSet<&'static str>,
}

/// A request to create a cluster.
#[derive(Clone, Debug)]
pub struct NewCluster {
    session: Session,
    profile: ProfileRef,
    inner: protocol::ClusterCreate,
}

pub(super) fn waiter(session: &Session, action: Option<String>) -> Option<ActionWaiter> {
    action.map(|id| ActionWaiter::new(session.clone(), id))
}

impl Cluster {
    pub(crate) fn new(session: Session, inner: protocol::Cluster) -> Cluster {
        Cluster {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    /// Load a Cluster object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Cluster> {
        let inner = resource::find::<protocol::Cluster>(&session, id.as_ref()).await?;
        Ok(Cluster::new(session, inner))
    }

    /// Raw cluster representation.
    pub(crate) fn inner(&self) -> &protocol::Cluster {
        &self.inner
    }

    transparent_property! {
        #[doc = "Creation data and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Desired number of nodes."]
        desired_capacity: u32
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Maximum number of nodes (-1 means unlimited)."]
        max_size: i32
    }

    transparent_property! {
        #[doc = "Cluster metadata."]
        metadata: ref HashMap<String, Value>
    }

    update_field! {
        #[doc = "Replace the metadata."]
        set_metadata, with_metadata -> metadata: HashMap<String, Value>
    }

    transparent_property! {
        #[doc = "Minimum number of nodes."]
        min_size: u32
    }

    transparent_property! {
        #[doc = "Cluster name."]
        name: ref String
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: String
    }

    transparent_property! {
        #[doc = "IDs of the nodes."]
        nodes: ref Vec<String>
    }

    transparent_property! {
        #[doc = "ID of the profile used for new nodes."]
        profile_id: ref String
    }

    update_field! {
        #[doc = "Switch the cluster to another profile (ID)."]
        set_profile_id, with_profile_id -> profile_id: String
    }

    transparent_property! {
        #[doc = "Cluster status."]
        status: protocol::ClusterStatus
    }

    transparent_property! {
        #[doc = "Reason of the current status."]
        status_reason: ref Option<String>
    }

    transparent_property! {
        #[doc = "Default timeout of cluster operations (seconds)."]
        timeout: Option<u32>
    }

    update_field! {
        #[doc = "Update the default timeout."]
        set_timeout, with_timeout -> timeout: optional u32
    }

    /// Whether the cluster is modified.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the cluster.
    ///
    /// Returns a waiter for the update action if the server started one.
    pub async fn save(&mut self) -> Result<Option<ActionWaiter>> {
        let mut update = protocol::ClusterUpdate::default();
        save_fields! {
            self -> update: metadata name profile_id
        };
        save_option_fields! {
            self -> update: timeout
        };
        if update.is_empty() {
            return Ok(None);
        }
        let (inner, action) =
            api::update::<protocol::Cluster, _>(&self.session, &self.inner.id, &update).await?;
        self.inner = inner;
        self.dirty.clear();
        Ok(waiter(&self.session, action))
    }

    async fn action(&self, action: &str, args: Value) -> Result<ActionWaiter> {
        let id = api::cluster_action(&self.session, &self.inner.id, action, args).await?;
        Ok(ActionWaiter::new(self.session.clone(), id))
    }

    /// Remove nodes from the cluster.
    ///
    /// Without a count the cluster's scaling policies decide.
    pub async fn scale_in(&self, count: Option<u32>) -> Result<ActionWaiter> {
        let args = match count {
            Some(count) => json!({ "count": count }),
            None => json!({}),
        };
        self.action("scale_in", args).await
    }

    /// Add nodes to the cluster.
    ///
    /// Without a count the cluster's scaling policies decide.
    pub async fn scale_out(&self, count: Option<u32>) -> Result<ActionWaiter> {
        let args = match count {
            Some(count) => json!({ "count": count }),
            None => json!({}),
        };
        self.action("scale_out", args).await
    }

    /// Resize the cluster.
    pub async fn resize(&self, request: protocol::ResizeRequest) -> Result<ActionWaiter> {
        let args = serde_json::to_value(request).map_err(super::super::utils::invalid_input)?;
        self.action("resize", args).await
    }

    /// Attach a policy (by ID) to the cluster.
    pub async fn attach_policy<P: Into<PolicyRef>>(
        &self,
        policy: P,
        enabled: bool,
    ) -> Result<ActionWaiter> {
        let policy = policy.into();
        let args = api::policy_args(policy.as_ref(), Some(enabled))?;
        self.action("policy_attach", args).await
    }

    /// Detach a policy (by ID) from the cluster.
    pub async fn detach_policy<P: Into<PolicyRef>>(&self, policy: P) -> Result<ActionWaiter> {
        let policy = policy.into();
        let args = api::policy_args(policy.as_ref(), None)?;
        self.action("policy_detach", args).await
    }

    /// Enable or disable an attached policy (by ID).
    pub async fn update_policy<P: Into<PolicyRef>>(
        &self,
        policy: P,
        enabled: bool,
    ) -> Result<ActionWaiter> {
        let policy = policy.into();
        let args = api::policy_args(policy.as_ref(), Some(enabled))?;
        self.action("policy_update", args).await
    }

    /// Policies attached to the cluster.
    pub async fn policies(&self) -> Result<Vec<protocol::ClusterPolicy>> {
        api::list_cluster_policies(&self.session, &self.inner.id).await
    }

    /// Delete the cluster.
    ///
    /// Returns a waiter for the deletion action if the server started one.
    pub async fn delete(self) -> Result<Option<ActionWaiter>> {
        let action =
            api::delete::<protocol::Cluster>(&self.session, &self.inner.id, false).await?;
        Ok(waiter(&self.session, action.flatten()))
    }
}

#[async_trait]
impl Refresh for Cluster {
    /// Refresh the cluster.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = resource::get(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl ClusterQuery {
    pub(crate) fn new(session: Session) -> ClusterQuery {
        ClusterQuery {
            session,
            query: Query::new(),
            can_paginate: true,
        }
    }

    /// Add marker to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_marker<T: Into<String>>(mut self, marker: T) -> Self {
        self.can_paginate = false;
        self.query.push_str("marker", marker);
        self
    }

    /// Add limit to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.can_paginate = false;
        self.query.push("limit", limit);
        self
    }

    /// Add sorting to the request (`key:dir` syntax of the service).
    pub fn sort_by<T: Into<String>>(mut self, sort: Sort<T>) -> Self {
        let (field, direction) = sort.into();
        self.query.push_str("sort", format!("{}:{}", field, direction));
        self
    }

    query_filter! {
        #[doc = "Filter by cluster name."]
        set_name, with_name -> name
    }

    query_filter! {
        #[doc = "Filter by status."]
        set_status, with_status -> status: protocol::ClusterStatus
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Cluster>> {
        debug!("Fetching clusters with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results.
    pub async fn all(self) -> Result<Vec<Cluster>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Cluster> {
        debug!("Fetching one cluster with {:?}", self.query);
        if self.can_paginate {
            self.query.push("limit", 2);
        }
        ResourceIterator::new(self).one().await
    }
}

#[async_trait]
impl ResourceQuery for ClusterQuery {
    type Item = Cluster;

    const DEFAULT_LIMIT: usize = 50;

    async fn can_paginate(&self) -> Result<bool> {
        Ok(self.can_paginate)
    }

    fn extract_marker(&self, resource: &Self::Item) -> String {
        resource.id().clone()
    }

    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>> {
        let query = self.query.with_marker_and_limit(limit, marker);
        Ok(resource::list::<protocol::Cluster, _>(&self.session, &query)
            .await?
            .into_iter()
            .map(|item| Cluster::new(self.session.clone(), item))
            .collect())
    }
}

impl NewCluster {
    pub(crate) fn new(session: Session, name: String, profile: ProfileRef) -> NewCluster {
        NewCluster {
            session,
            profile,
            inner: protocol::ClusterCreate {
                desired_capacity: None,
                max_size: None,
                metadata: HashMap::new(),
                min_size: None,
                name,
                profile_id: String::new(),
                timeout: None,
            },
        }
    }

    /// Request creation of the cluster.
    ///
    /// Returns the cluster as accepted by the server together with a waiter
    /// for the creation action.
    pub async fn create(mut self) -> Result<(Cluster, Option<ActionWaiter>)> {
        let profile =
            resource::find::<protocol::Profile>(&self.session, self.profile.as_ref()).await?;
        self.inner.profile_id = profile.id;
        let (inner, action) =
            api::create::<protocol::Cluster, _>(&self.session, &self.inner).await?;
        let waiter = waiter(&self.session, action);
        Ok((Cluster::new(self.session, inner), waiter))
    }

    creation_inner_field! {
        #[doc = "Set the desired number of nodes."]
        set_desired_capacity, with_desired_capacity -> desired_capacity: optional u32
    }

    creation_inner_field! {
        #[doc = "Set the maximum number of nodes (-1 for unlimited)."]
        set_max_size, with_max_size -> max_size: optional i32
    }

    /// Metadata to set on the cluster.
    #[inline]
    pub fn metadata(&mut self) -> &mut HashMap<String, Value> {
        &mut self.inner.metadata
    }

    creation_inner_field! {
        #[doc = "Set the minimum number of nodes."]
        set_min_size, with_min_size -> min_size: optional u32
    }

    creation_inner_field! {
        #[doc = "Set the default timeout of operations (seconds)."]
        set_timeout, with_timeout -> timeout: optional u32
    }
}
