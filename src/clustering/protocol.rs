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

//! JSON structures and protocol bits for the Clustering API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use osauth::services::{GenericService, VersionSelector};
use serde_json::Value;

use super::super::common::protocol::{empty_as_none, null_as_empty_map, null_as_empty_vec};
use super::super::resource::{CommitMethod, Resource};

/// The Clustering service.
pub const CLUSTERING: GenericService = GenericService::new("clustering", VersionSelector::Major(1));

protocol_enum! {
    #[doc = "Possible cluster statuses."]
    enum ClusterStatus = Unknown {
        Init = "INIT",
        Active = "ACTIVE",
        Creating = "CREATING",
        Updating = "UPDATING",
        Resizing = "RESIZING",
        Deleting = "DELETING",
        Checking = "CHECKING",
        Recovering = "RECOVERING",
        Critical = "CRITICAL",
        Error = "ERROR",
        Warning = "WARNING",
        Operating = "OPERATING",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Possible node statuses."]
    enum NodeStatus = Unknown {
        Init = "INIT",
        Active = "ACTIVE",
        Creating = "CREATING",
        Updating = "UPDATING",
        Deleting = "DELETING",
        Recovering = "RECOVERING",
        Error = "ERROR",
        Warning = "WARNING",
        Operating = "OPERATING",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Possible action statuses."]
    enum ActionStatus = Unknown {
        Init = "INIT",
        Waiting = "WAITING",
        Ready = "READY",
        Running = "RUNNING",
        Suspended = "SUSPENDED",
        Succeeded = "SUCCEEDED",
        Failed = "FAILED",
        Cancelled = "CANCELLED",
        WaitingLifecycleCompletion = "WAITING_LIFECYCLE_COMPLETION",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "How the number in a resize request is interpreted."]
    enum AdjustmentType {
        #[doc = "The number is the new desired capacity."]
        ExactCapacity = "EXACT_CAPACITY",
        #[doc = "The number is added to the current capacity."]
        ChangeInCapacity = "CHANGE_IN_CAPACITY",
        #[doc = "The number is a percentage of the current capacity."]
        ChangeInPercentage = "CHANGE_IN_PERCENTAGE"
    }
}

macro_rules! senlin_resource {
    ($name:ident, $key:expr, $keys:expr, $path:expr) => {
        impl Resource for $name {
            type Service = GenericService;
            const SERVICE: GenericService = CLUSTERING;
            const RESOURCE_KEY: &'static str = $key;
            const RESOURCES_KEY: &'static str = $keys;
            const BASE_PATH: &'static str = $path;
            const COMMIT_METHOD: CommitMethod = CommitMethod::Patch;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> Option<&str> {
                Some(&self.name)
            }
        }
    };
}

/// A profile: the template used to create nodes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub metadata: HashMap<String, Value>,
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub spec: Value,
    #[serde(rename = "type", default)]
    pub profile_type: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

senlin_resource!(Profile, "profile", "profiles", "profiles");

#[derive(Debug, Clone, Serialize)]
pub struct ProfileCreate {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    pub name: String,
    pub spec: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A cluster of nodes created from the same profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Cluster {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub desired_capacity: u32,
    pub id: String,
    #[serde(default)]
    pub max_size: i32,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub min_size: u32,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub nodes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub policies: Vec<String>,
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub status: ClusterStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

senlin_resource!(Cluster, "cluster", "clusters", "clusters");

#[derive(Debug, Clone, Serialize)]
pub struct ClusterCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    pub name: String,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

impl ClusterUpdate {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none()
            && self.name.is_none()
            && self.profile_id.is_none()
            && self.timeout.is_none()
    }
}

/// Parameters of a cluster resize.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResizeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_type: Option<AdjustmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// A policy attached to a cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterPolicy {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub id: Option<String>,
    pub policy_id: String,
    #[serde(default)]
    pub policy_name: Option<String>,
    #[serde(default)]
    pub policy_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterPoliciesRoot {
    pub cluster_policies: Vec<ClusterPolicy>,
}

/// A single member of a cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Node {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub id: String,
    #[serde(default)]
    pub index: i32,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub metadata: HashMap<String, Value>,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub physical_id: Option<String>,
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

senlin_resource!(Node, "node", "nodes", "nodes");

#[derive(Debug, Clone, Serialize)]
pub struct NodeCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    pub name: String,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A policy: rules applied to cluster operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Policy {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub spec: Value,
    #[serde(rename = "type", default)]
    pub policy_type: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

senlin_resource!(Policy, "policy", "policies", "policies");

#[derive(Debug, Clone, Serialize)]
pub struct PolicyCreate {
    pub name: String,
    pub spec: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyUpdate {
    pub name: String,
}

/// An asynchronous operation of the clustering engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Action {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub id: String,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub outputs: Value,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Resource for Action {
    type Service = GenericService;
    const SERVICE: GenericService = CLUSTERING;
    const RESOURCE_KEY: &'static str = "action";
    const RESOURCES_KEY: &'static str = "actions";
    const BASE_PATH: &'static str = "actions";
    const ALLOW_CREATE: bool = false;
    const ALLOW_COMMIT: bool = false;
    const ALLOW_DELETE: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cluster() {
        let cluster: Cluster = serde_json::from_value(json!({
            "id": "c1",
            "name": "web",
            "profile_id": "p1",
            "desired_capacity": 2,
            "min_size": 1,
            "max_size": -1,
            "metadata": null,
            "nodes": ["n1", "n2"],
            "status": "ACTIVE",
            "status_reason": ""
        }))
        .unwrap();
        assert_eq!(cluster.status, ClusterStatus::Active);
        assert_eq!(cluster.max_size, -1);
        assert!(cluster.metadata.is_empty());
        assert!(cluster.status_reason.is_none());
        assert_eq!(cluster.nodes.len(), 2);
    }

    #[test]
    fn test_action_status() {
        let action: Action = serde_json::from_value(json!({
            "id": "a1",
            "action": "CLUSTER_SCALE_OUT",
            "status": "SUCCEEDED"
        }))
        .unwrap();
        assert_eq!(action.status, ActionStatus::Succeeded);
    }

    #[test]
    fn test_resize_request() {
        let request = ResizeRequest {
            adjustment_type: Some(AdjustmentType::ChangeInCapacity),
            number: Some(2.0),
            strict: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"adjustment_type": "CHANGE_IN_CAPACITY", "number": 2.0, "strict": true})
        );
    }

    #[test]
    fn test_cluster_create_skips_empty() {
        let request = ClusterCreate {
            desired_capacity: Some(1),
            max_size: None,
            metadata: HashMap::new(),
            min_size: None,
            name: "web".into(),
            profile_id: "p1".into(),
            timeout: None,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"desired_capacity": 1, "name": "web", "profile_id": "p1"})
        );
    }
}
