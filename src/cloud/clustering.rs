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

//! Clusters, profiles and policies in the cloud layer.
//!
//! Operations that start an action on the server return the action ID and
//! optionally wait for it.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use super::super::clustering::{
    ActionWaiter, Cluster, ClusterPolicy, ClusterRecord, Policy, Profile, ResizeRequest,
    DEFAULT_ACTION_TIMEOUT,
};
use super::super::{Error, ErrorKind, Result, ResultExt};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

/// Parameters of a new cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSpec {
    /// Desired number of nodes.
    pub desired_capacity: Option<u32>,
    /// Minimum number of nodes.
    pub min_size: Option<u32>,
    /// Maximum number of nodes, -1 for unlimited.
    pub max_size: Option<i32>,
    /// Cluster metadata.
    pub metadata: HashMap<String, Value>,
    /// Default timeout of cluster operations in seconds.
    pub timeout: Option<u32>,
    /// Wait for the cluster to become active.
    pub wait: bool,
    /// How long to wait.
    pub wait_timeout: Duration,
}

impl Default for ClusterSpec {
    fn default() -> ClusterSpec {
        ClusterSpec {
            desired_capacity: None,
            min_size: None,
            max_size: None,
            metadata: HashMap::new(),
            timeout: None,
            wait: false,
            wait_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }
}

fn not_found(kind: &str, name_or_id: &str) -> Error {
    Error::new(
        ErrorKind::ResourceNotFound,
        format!("{} {} not found", kind, name_or_id),
    )
}

async fn finish(
    waiter: Option<ActionWaiter>,
    wait: bool,
    timeout: Duration,
) -> Result<Option<String>> {
    match waiter {
        Some(waiter) => {
            let action_id = waiter.action_id().clone();
            if wait {
                let _ = waiter.wait_for(timeout).await?;
            }
            Ok(Some(action_id))
        }
        None => Ok(None),
    }
}

impl Cloud {
    /// List clusters.
    pub async fn list_clusters(&self, filters: Option<&Filters>) -> Result<Vec<ClusterRecord>> {
        let clusters = self
            .clustering()
            .clusters()
            .all()
            .await?
            .into_iter()
            .map(|c| c.inner().clone())
            .collect();
        filter_list(clusters, None, filters)
    }

    /// Search clusters by name or ID.
    pub async fn search_clusters(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<ClusterRecord>> {
        filter_list(self.list_clusters(None).await?, Some(name_or_id), filters)
    }

    /// Get a cluster by name or ID.
    pub async fn get_cluster(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<ClusterRecord>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_cluster_by_id(name_or_id),
            self.search_clusters(name_or_id, filters),
        )
        .await
    }

    async fn get_cluster_by_id(&self, id: &str) -> Result<Option<ClusterRecord>> {
        super::super::resource::get::<ClusterRecord>(&self.session, id)
            .await
            .if_not_found_then_none()
    }

    async fn cluster_wrapper(&self, name_or_id: &str) -> Result<Cluster> {
        let found = self
            .get_cluster(name_or_id, None)
            .await?
            .ok_or_else(|| not_found("Cluster", name_or_id))?;
        self.clustering().find_cluster(found.id).await
    }

    /// Create a cluster from a profile (name or ID).
    pub async fn create_cluster(
        &self,
        name: &str,
        profile: &str,
        spec: ClusterSpec,
    ) -> Result<ClusterRecord> {
        let mut new_cluster = self.clustering().new_cluster(name, profile);
        if let Some(value) = spec.desired_capacity {
            new_cluster.set_desired_capacity(value);
        }
        if let Some(value) = spec.min_size {
            new_cluster.set_min_size(value);
        }
        if let Some(value) = spec.max_size {
            new_cluster.set_max_size(value);
        }
        if let Some(value) = spec.timeout {
            new_cluster.set_timeout(value);
        }
        new_cluster.metadata().extend(spec.metadata);

        let (cluster, waiter) = new_cluster.create().await?;
        info!("Requested cluster {} with ID {}", name, cluster.id());
        let _ = finish(waiter, spec.wait, spec.wait_timeout).await?;
        if spec.wait {
            Ok(self
                .get_cluster_by_id(cluster.id())
                .await?
                .unwrap_or_else(|| cluster.inner().clone()))
        } else {
            Ok(cluster.inner().clone())
        }
    }

    /// Update a cluster.
    ///
    /// `profile` is a profile name or ID to switch new nodes to.
    pub async fn update_cluster(
        &self,
        name_or_id: &str,
        name: Option<&str>,
        profile: Option<&str>,
        metadata: Option<HashMap<String, Value>>,
        timeout: Option<u32>,
    ) -> Result<ClusterRecord> {
        let mut cluster = self.cluster_wrapper(name_or_id).await?;
        if let Some(name) = name {
            cluster.set_name(name);
        }
        if let Some(profile) = profile {
            let profile = self
                .get_cluster_profile(profile, None)
                .await?
                .ok_or_else(|| not_found("Profile", profile))?;
            cluster.set_profile_id(profile.id);
        }
        if let Some(metadata) = metadata {
            cluster.set_metadata(metadata);
        }
        if let Some(timeout) = timeout {
            cluster.set_timeout(timeout);
        }
        let _ = cluster.save().await?;
        Ok(cluster.inner().clone())
    }

    /// Delete a cluster, detaching its policies first.
    pub async fn delete_cluster(
        &self,
        name_or_id: &str,
        wait: bool,
        timeout: Duration,
    ) -> Result<bool> {
        let cluster = match self.get_cluster(name_or_id, None).await? {
            Some(cluster) => cluster,
            None => {
                debug!("Cluster {} not found for deleting", name_or_id);
                return Ok(false);
            }
        };

        let wrapper = self.clustering().find_cluster(&cluster.id).await?;
        for policy in wrapper.policies().await? {
            debug!(
                "Detaching policy {} from cluster {} before deletion",
                policy.policy_id, cluster.id
            );
            let _ = wrapper
                .detach_policy(policy.policy_id)
                .await?
                .wait_for(timeout)
                .await?;
        }

        match self
            .clustering()
            .delete_cluster(&cluster.id, true)
            .await?
        {
            Some(waiter) => {
                info!("Deleting cluster {}", cluster.id);
                let _ = finish(waiter, wait, timeout).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attach a policy (name or ID) to a cluster.
    pub async fn attach_policy_to_cluster(
        &self,
        cluster: &str,
        policy: &str,
        enabled: bool,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        let wrapper = self.cluster_wrapper(cluster).await?;
        let policy = self
            .get_cluster_policy(policy, None)
            .await?
            .ok_or_else(|| not_found("Policy", policy))?;
        let waiter = wrapper.attach_policy(policy.id, enabled).await?;
        Ok(finish(Some(waiter), wait, timeout).await?.unwrap_or_default())
    }

    /// Detach a policy (name or ID) from a cluster.
    ///
    /// Returns `false` if the policy is not attached.
    pub async fn detach_policy_from_cluster(
        &self,
        cluster: &str,
        policy: &str,
        wait: bool,
        timeout: Duration,
    ) -> Result<bool> {
        let wrapper = self.cluster_wrapper(cluster).await?;
        let attached = wrapper.policies().await?;
        let found = attached.iter().find(|p| {
            p.policy_id == policy || p.policy_name.as_deref() == Some(policy)
        });
        match found {
            Some(found) => {
                let waiter = wrapper.detach_policy(&found.policy_id).await?;
                let _ = finish(Some(waiter), wait, timeout).await?;
                Ok(true)
            }
            None => {
                debug!("Policy {} is not attached to cluster {}", policy, cluster);
                Ok(false)
            }
        }
    }

    /// Enable or disable a policy attached to a cluster.
    pub async fn update_policy_on_cluster(
        &self,
        cluster: &str,
        policy: &str,
        enabled: bool,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        let wrapper = self.cluster_wrapper(cluster).await?;
        let policy = self
            .get_cluster_policy(policy, None)
            .await?
            .ok_or_else(|| not_found("Policy", policy))?;
        let waiter = wrapper.update_policy(policy.id, enabled).await?;
        Ok(finish(Some(waiter), wait, timeout).await?.unwrap_or_default())
    }

    /// List policies attached to a cluster.
    pub async fn list_policies_on_cluster(
        &self,
        cluster: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<ClusterPolicy>> {
        let wrapper = self.cluster_wrapper(cluster).await?;
        filter_list(wrapper.policies().await?, None, filters)
    }

    /// Remove nodes from a cluster.
    pub async fn scale_in_cluster(
        &self,
        name_or_id: &str,
        count: Option<u32>,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        let waiter = self.cluster_wrapper(name_or_id).await?.scale_in(count).await?;
        Ok(finish(Some(waiter), wait, timeout).await?.unwrap_or_default())
    }

    /// Add nodes to a cluster.
    pub async fn scale_out_cluster(
        &self,
        name_or_id: &str,
        count: Option<u32>,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        let waiter = self
            .cluster_wrapper(name_or_id)
            .await?
            .scale_out(count)
            .await?;
        Ok(finish(Some(waiter), wait, timeout).await?.unwrap_or_default())
    }

    /// Resize a cluster.
    pub async fn resize_cluster(
        &self,
        name_or_id: &str,
        request: ResizeRequest,
        wait: bool,
        timeout: Duration,
    ) -> Result<String> {
        let waiter = self
            .cluster_wrapper(name_or_id)
            .await?
            .resize(request)
            .await?;
        Ok(finish(Some(waiter), wait, timeout).await?.unwrap_or_default())
    }

    /// List profiles.
    pub async fn list_cluster_profiles(&self, filters: Option<&Filters>) -> Result<Vec<Profile>> {
        filter_list(self.clustering().profiles().await?, None, filters)
    }

    /// Search profiles by name or ID.
    pub async fn search_cluster_profiles(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<Profile>> {
        filter_list(
            self.list_cluster_profiles(None).await?,
            Some(name_or_id),
            filters,
        )
    }

    /// Get a profile by name or ID.
    pub async fn get_cluster_profile(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<Profile>> {
        get_entity(
            false,
            name_or_id,
            filters,
            futures::future::ready(Ok(None)),
            self.search_cluster_profiles(name_or_id, filters),
        )
        .await
    }

    /// Create a profile.
    pub async fn create_cluster_profile(
        &self,
        name: &str,
        spec: Value,
        metadata: HashMap<String, Value>,
    ) -> Result<Profile> {
        let profile = self
            .clustering()
            .create_profile(name, spec, metadata)
            .await?;
        info!("Created profile {} with ID {}", profile.name, profile.id);
        Ok(profile)
    }

    /// Update the name and/or the metadata of a profile.
    pub async fn update_cluster_profile(
        &self,
        name_or_id: &str,
        name: Option<&str>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Profile> {
        let profile = self
            .get_cluster_profile(name_or_id, None)
            .await?
            .ok_or_else(|| not_found("Profile", name_or_id))?;
        self.clustering()
            .update_profile(profile.id, name.map(From::from), metadata)
            .await
    }

    /// Delete a profile by name or ID.
    pub async fn delete_cluster_profile(&self, name_or_id: &str) -> Result<bool> {
        match self.get_cluster_profile(name_or_id, None).await? {
            Some(profile) => self.clustering().delete_profile(&profile.id, true).await,
            None => {
                debug!("Profile {} not found for deleting", name_or_id);
                Ok(false)
            }
        }
    }

    /// List policies.
    pub async fn list_cluster_policies(&self, filters: Option<&Filters>) -> Result<Vec<Policy>> {
        filter_list(self.clustering().policies().await?, None, filters)
    }

    /// Search policies by name or ID.
    pub async fn search_cluster_policies(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<Policy>> {
        filter_list(
            self.list_cluster_policies(None).await?,
            Some(name_or_id),
            filters,
        )
    }

    /// Get a policy by name or ID.
    pub async fn get_cluster_policy(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<Policy>> {
        get_entity(
            false,
            name_or_id,
            filters,
            futures::future::ready(Ok(None)),
            self.search_cluster_policies(name_or_id, filters),
        )
        .await
    }

    /// Create a policy.
    pub async fn create_cluster_policy(&self, name: &str, spec: Value) -> Result<Policy> {
        let policy = self.clustering().create_policy(name, spec).await?;
        info!("Created policy {} with ID {}", policy.name, policy.id);
        Ok(policy)
    }

    /// Rename a policy.
    pub async fn update_cluster_policy(&self, name_or_id: &str, name: &str) -> Result<Policy> {
        let policy = self
            .get_cluster_policy(name_or_id, None)
            .await?
            .ok_or_else(|| not_found("Policy", name_or_id))?;
        self.clustering().update_policy(policy.id, name).await
    }

    /// Delete a policy by name or ID.
    pub async fn delete_cluster_policy(&self, name_or_id: &str) -> Result<bool> {
        match self.get_cluster_policy(name_or_id, None).await? {
            Some(policy) => self.clustering().delete_policy(&policy.id, true).await,
            None => {
                debug!("Policy {} not found for deleting", name_or_id);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::super::clustering::DEFAULT_ACTION_TIMEOUT;
    use super::super::super::ErrorKind;
    use super::{finish, not_found, ClusterSpec};

    #[test]
    fn test_cluster_spec_defaults() {
        let spec = ClusterSpec::default();
        assert!(!spec.wait);
        assert_eq!(spec.wait_timeout, DEFAULT_ACTION_TIMEOUT);
        assert!(spec.metadata.is_empty());
    }

    #[test]
    fn test_not_found() {
        let err = not_found("Cluster", "c1");
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert!(err.to_string().contains("Cluster c1 not found"));
    }

    #[tokio::test]
    async fn test_finish_without_action() {
        let result = finish(None, true, DEFAULT_ACTION_TIMEOUT).await.unwrap();
        assert!(result.is_none());
    }
}
