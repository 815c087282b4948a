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

//! Clustering API (Senlin) implementation bits.
//!
//! Modifying operations run asynchronously on the server. They return an
//! [ActionWaiter](struct.ActionWaiter.html) when the service reports an
//! action for them.

mod actions;
pub(crate) mod api;
mod clusters;
pub(crate) mod protocol;

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use super::common::{ClusterRef, PolicyRef, ProfileRef};
use super::resource;
use super::utils::Query;
use super::{Result, Session};

pub use self::actions::{wait_for_action, ActionWaiter, DEFAULT_ACTION_TIMEOUT};
use self::clusters::waiter;
pub use self::clusters::{Cluster, ClusterQuery, NewCluster};
pub use self::protocol::Cluster as ClusterRecord;
pub use self::protocol::{
    Action, ActionStatus, AdjustmentType, ClusterPolicy, ClusterStatus, Node, NodeStatus, Policy,
    Profile, ResizeRequest, CLUSTERING,
};

/// Proxy for the Clustering service.
#[derive(Debug, Clone)]
pub struct Proxy {
    session: Session,
}

impl Proxy {
    /// Create a proxy using the given session.
    pub fn new(session: Session) -> Proxy {
        Proxy { session }
    }

    /// List profiles.
    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        resource::list(&self.session, &Query::new()).await
    }

    /// Find a profile by its ID or name.
    pub async fn find_profile<Id: Into<ProfileRef>>(&self, id_or_name: Id) -> Result<Profile> {
        let id_or_name = id_or_name.into();
        resource::find(&self.session, id_or_name.as_ref()).await
    }

    /// Create a profile from a spec.
    pub async fn create_profile<S: Into<String>>(
        &self,
        name: S,
        spec: Value,
        metadata: HashMap<String, Value>,
    ) -> Result<Profile> {
        let request = protocol::ProfileCreate {
            metadata,
            name: name.into(),
            spec,
        };
        let (profile, _) = api::create::<Profile, _>(&self.session, &request).await?;
        Ok(profile)
    }

    /// Update the name and/or the metadata of a profile.
    pub async fn update_profile<Id: Into<ProfileRef>>(
        &self,
        id_or_name: Id,
        name: Option<String>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Profile> {
        let profile = self.find_profile(id_or_name).await?;
        let update = protocol::ProfileUpdate { metadata, name };
        let (profile, _) = api::update::<Profile, _>(&self.session, &profile.id, &update).await?;
        Ok(profile)
    }

    /// Delete a profile by its ID.
    pub async fn delete_profile<Id: AsRef<str>>(&self, id: Id, ignore_missing: bool) -> Result<bool> {
        Ok(api::delete::<Profile>(&self.session, id.as_ref(), ignore_missing)
            .await?
            .is_some())
    }

    /// Build a query against cluster list.
    pub fn clusters(&self) -> ClusterQuery {
        ClusterQuery::new(self.session.clone())
    }

    /// Find a cluster by its ID or name.
    pub async fn find_cluster<Id: Into<ClusterRef>>(&self, id_or_name: Id) -> Result<Cluster> {
        let id_or_name: ClusterRef = id_or_name.into();
        Cluster::load(self.session.clone(), id_or_name).await
    }

    /// Prepare a new cluster using the given profile (ID or name).
    pub fn new_cluster<S, P>(&self, name: S, profile: P) -> NewCluster
    where
        S: Into<String>,
        P: Into<ProfileRef>,
    {
        NewCluster::new(self.session.clone(), name.into(), profile.into())
    }

    /// Delete a cluster by its ID.
    ///
    /// The outer `None` means that the cluster did not exist.
    pub async fn delete_cluster<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<Option<Option<ActionWaiter>>> {
        let result =
            api::delete::<protocol::Cluster>(&self.session, id.as_ref(), ignore_missing).await?;
        Ok(result.map(|action| waiter(&self.session, action)))
    }

    /// List nodes, optionally of one cluster and/or with a status.
    pub async fn nodes(
        &self,
        cluster_id: Option<&str>,
        status: Option<NodeStatus>,
    ) -> Result<Vec<Node>> {
        let mut query = Query::new();
        if let Some(cluster_id) = cluster_id {
            query.push_str("cluster_id", cluster_id);
        }
        if let Some(status) = status {
            query.push("status", status);
        }
        resource::list(&self.session, &query).await
    }

    /// Find a node by its ID or name.
    pub async fn find_node<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Node> {
        resource::find(&self.session, id_or_name.as_ref()).await
    }

    /// Create a node from a profile (ID or name), optionally in a cluster.
    pub async fn create_node<S, P>(
        &self,
        name: S,
        profile: P,
        cluster_id: Option<String>,
        role: Option<String>,
    ) -> Result<(Node, Option<ActionWaiter>)>
    where
        S: Into<String>,
        P: Into<ProfileRef>,
    {
        let profile = self.find_profile(profile).await?;
        let request = protocol::NodeCreate {
            cluster_id,
            metadata: HashMap::new(),
            name: name.into(),
            profile_id: profile.id,
            role,
        };
        let (node, action) = api::create::<Node, _>(&self.session, &request).await?;
        Ok((node, waiter(&self.session, action)))
    }

    /// Delete a node by its ID.
    ///
    /// The outer `None` means that the node did not exist.
    pub async fn delete_node<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<Option<Option<ActionWaiter>>> {
        let result = api::delete::<Node>(&self.session, id.as_ref(), ignore_missing).await?;
        Ok(result.map(|action| waiter(&self.session, action)))
    }

    /// List policies.
    pub async fn policies(&self) -> Result<Vec<Policy>> {
        resource::list(&self.session, &Query::new()).await
    }

    /// Find a policy by its ID or name.
    pub async fn find_policy<Id: Into<PolicyRef>>(&self, id_or_name: Id) -> Result<Policy> {
        let id_or_name = id_or_name.into();
        resource::find(&self.session, id_or_name.as_ref()).await
    }

    /// Create a policy from a spec.
    pub async fn create_policy<S: Into<String>>(&self, name: S, spec: Value) -> Result<Policy> {
        let request = protocol::PolicyCreate {
            name: name.into(),
            spec,
        };
        let (policy, _) = api::create::<Policy, _>(&self.session, &request).await?;
        Ok(policy)
    }

    /// Rename a policy.
    pub async fn update_policy<Id, S>(&self, id_or_name: Id, name: S) -> Result<Policy>
    where
        Id: Into<PolicyRef>,
        S: Into<String>,
    {
        let policy = self.find_policy(id_or_name).await?;
        let update = protocol::PolicyUpdate { name: name.into() };
        let (policy, _) = api::update::<Policy, _>(&self.session, &policy.id, &update).await?;
        Ok(policy)
    }

    /// Delete a policy by its ID.
    pub async fn delete_policy<Id: AsRef<str>>(&self, id: Id, ignore_missing: bool) -> Result<bool> {
        Ok(api::delete::<Policy>(&self.session, id.as_ref(), ignore_missing)
            .await?
            .is_some())
    }

    /// Get an action by its ID.
    pub async fn get_action<Id: AsRef<str>>(&self, id: Id) -> Result<Action> {
        resource::get(&self.session, id.as_ref()).await
    }

    /// Wait for an action to succeed.
    pub async fn wait_for_action<Id: AsRef<str>>(
        &self,
        id: Id,
        timeout: Option<Duration>,
        wait: Duration,
    ) -> Result<Action> {
        wait_for_action(&self.session, id.as_ref(), timeout, wait).await
    }
}
