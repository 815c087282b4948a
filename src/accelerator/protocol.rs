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

//! JSON structures and protocol bits for the Accelerator API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use osauth::services::{GenericService, VersionSelector};
use serde_json::Value;

use super::super::common::protocol::empty_as_none;
use super::super::resource::Resource;

/// The Accelerator service.
pub const ACCELERATOR: GenericService = GenericService::new("accelerator", VersionSelector::Major(2));

protocol_enum! {
    #[doc = "State of an accelerator request."]
    enum ArqState = Unknown {
        Initial = "Initial",
        BindStarted = "BindStarted",
        Bound = "Bound",
        BindFailed = "BindFailed",
        Unbound = "Unbound",
        Deleting = "Deleting",
        Unknown = "Unknown"
    }
}

/// A deployable: a programmable unit of an accelerator device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Deployable {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub num_accelerators: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub root_id: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub uuid: String,
}

impl Resource for Deployable {
    type Service = GenericService;
    const SERVICE: GenericService = ACCELERATOR;
    const RESOURCE_KEY: &'static str = "deployable";
    const RESOURCES_KEY: &'static str = "deployables";
    const BASE_PATH: &'static str = "deployables";
    const ALLOW_CREATE: bool = false;
    const ALLOW_COMMIT: bool = false;
    const ALLOW_DELETE: bool = false;

    fn id(&self) -> &str {
        &self.uuid
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// One JSON patch operation of the program request.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramOperation {
    pub path: &'static str,
    pub value: String,
    pub op: &'static str,
}

impl ProgramOperation {
    pub fn bitstream(image_id: String) -> ProgramOperation {
        ProgramOperation {
            path: "/bitstream_id",
            value: image_id,
            op: "replace",
        }
    }
}

/// An accelerator device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub std_board_info: Option<String>,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub uuid: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vendor_board_info: Option<String>,
}

impl Resource for Device {
    type Service = GenericService;
    const SERVICE: GenericService = ACCELERATOR;
    const RESOURCE_KEY: &'static str = "device";
    const RESOURCES_KEY: &'static str = "devices";
    const BASE_PATH: &'static str = "devices";
    const ALLOW_CREATE: bool = false;
    const ALLOW_COMMIT: bool = false;
    const ALLOW_DELETE: bool = false;

    fn id(&self) -> &str {
        &self.uuid
    }
}

/// A device profile: a named set of resource groups to request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Vec<HashMap<String, String>>,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub uuid: String,
}

impl Resource for DeviceProfile {
    type Service = GenericService;
    const SERVICE: GenericService = ACCELERATOR;
    const RESOURCE_KEY: &'static str = "device_profile";
    const RESOURCES_KEY: &'static str = "device_profiles";
    const BASE_PATH: &'static str = "device_profiles";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.uuid
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceProfileCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub groups: Vec<HashMap<String, String>>,
    pub name: String,
}

/// An accelerator request (ARQ).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcceleratorRequest {
    #[serde(default)]
    pub attach_handle_info: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub attach_handle_type: Option<String>,
    pub device_profile_name: String,
    #[serde(default)]
    pub device_profile_group_id: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub device_rp_uuid: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub instance_uuid: Option<String>,
    #[serde(default)]
    pub state: ArqState,
    pub uuid: String,
}

impl Resource for AcceleratorRequest {
    type Service = GenericService;
    const SERVICE: GenericService = ACCELERATOR;
    const RESOURCE_KEY: &'static str = "arq";
    const RESOURCES_KEY: &'static str = "arqs";
    const BASE_PATH: &'static str = "accelerator_requests";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.uuid
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceleratorRequestCreate {
    pub device_profile_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_profile_group_id: Option<u32>,
}

/// Binding of an accelerator request to a host and an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArqBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_rp_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_uuid: Option<String>,
}

impl ArqBinding {
    pub fn new<S1, S2, S3>(hostname: S1, device_rp_uuid: S2, instance_uuid: S3) -> ArqBinding
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        ArqBinding {
            hostname: Some(hostname.into()),
            device_rp_uuid: Some(device_rp_uuid.into()),
            instance_uuid: Some(instance_uuid.into()),
        }
    }
}

impl From<&AcceleratorRequest> for ArqBinding {
    fn from(value: &AcceleratorRequest) -> ArqBinding {
        ArqBinding {
            hostname: value.hostname.clone(),
            device_rp_uuid: value.device_rp_uuid.clone(),
            instance_uuid: value.instance_uuid.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_device_type_rename() {
        let device: Device = serde_json::from_value(json!({
            "uuid": "d1",
            "type": "FPGA",
            "vendor": "0x8086",
            "hostname": "compute-1",
            "std_board_info": ""
        }))
        .unwrap();
        assert_eq!(device.device_type, "FPGA");
        assert!(device.std_board_info.is_none());
    }

    #[test]
    fn test_arq_unbound() {
        let arq: AcceleratorRequest = serde_json::from_value(json!({
            "uuid": "a1",
            "device_profile_name": "fpga-dp",
            "device_profile_group_id": 0,
            "hostname": null,
            "instance_uuid": "",
            "state": "Initial"
        }))
        .unwrap();
        assert_eq!(arq.state, ArqState::Initial);
        assert_eq!(ArqBinding::from(&arq), ArqBinding::default());
    }

    #[test]
    fn test_arq_unknown_state() {
        let arq: AcceleratorRequest = serde_json::from_value(json!({
            "uuid": "a1",
            "device_profile_name": "fpga-dp",
            "state": "SomethingNew"
        }))
        .unwrap();
        assert_eq!(arq.state, ArqState::Unknown);
    }

    #[test]
    fn test_program_operation() {
        let op = ProgramOperation::bitstream("img1".into());
        assert_eq!(
            serde_json::to_value(vec![op]).unwrap(),
            json!([{"path": "/bitstream_id", "value": "img1", "op": "replace"}])
        );
    }
}
