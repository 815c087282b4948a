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

//! Accelerator API (Cyborg) implementation bits.
//!
//! Accelerator resources are plain records: the service has almost no
//! mutable state apart from device profile creation and ARQ binding.

pub(crate) mod api;
pub(crate) mod protocol;

use std::collections::HashMap;

use super::common::DeviceProfileRef;
use super::resource;
use super::utils::Query;
use super::{Result, Session};

pub use self::protocol::{
    AcceleratorRequest, ArqBinding, ArqState, Deployable, Device, DeviceProfile, ACCELERATOR,
};

/// Filters for listing devices.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceFilters {
    /// Device type, e.g. `GPU` or `FPGA`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Vendor ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Host the device is installed on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// Proxy for the Accelerator service.
#[derive(Debug, Clone)]
pub struct Proxy {
    session: Session,
}

impl Proxy {
    /// Create a proxy using the given session.
    pub fn new(session: Session) -> Proxy {
        Proxy { session }
    }

    /// List deployables.
    pub async fn deployables(&self) -> Result<Vec<Deployable>> {
        resource::list(&self.session, &Query::new()).await
    }

    /// Get a deployable by its UUID.
    pub async fn get_deployable<Id: AsRef<str>>(&self, id: Id) -> Result<Deployable> {
        resource::get(&self.session, id.as_ref()).await
    }

    /// Program a deployable with the bitstream from the given image.
    pub async fn program_deployable<Id, S>(&self, id: Id, image_id: S) -> Result<Deployable>
    where
        Id: AsRef<str>,
        S: Into<String>,
    {
        api::program_deployable(&self.session, id, image_id.into()).await
    }

    /// List devices.
    pub async fn devices(&self, filters: &DeviceFilters) -> Result<Vec<Device>> {
        resource::list(&self.session, filters).await
    }

    /// Get a device by its UUID.
    pub async fn get_device<Id: AsRef<str>>(&self, id: Id) -> Result<Device> {
        resource::get(&self.session, id.as_ref()).await
    }

    /// List device profiles.
    pub async fn device_profiles(&self) -> Result<Vec<DeviceProfile>> {
        resource::list(&self.session, &Query::new()).await
    }

    /// Get a device profile by its UUID.
    pub async fn get_device_profile<Id: AsRef<str>>(&self, id: Id) -> Result<DeviceProfile> {
        resource::get(&self.session, id.as_ref()).await
    }

    /// Find a device profile by its UUID or name.
    pub async fn find_device_profile<Id: Into<DeviceProfileRef>>(
        &self,
        id_or_name: Id,
    ) -> Result<DeviceProfile> {
        let id_or_name = id_or_name.into();
        let all = resource::list::<DeviceProfile, _>(&self.session, &Query::new()).await?;
        resource::find_in(all, id_or_name.as_ref())
    }

    /// Create a device profile.
    pub async fn create_device_profile<S: Into<String>>(
        &self,
        name: S,
        groups: Vec<HashMap<String, String>>,
        description: Option<String>,
    ) -> Result<DeviceProfile> {
        let request = protocol::DeviceProfileCreate {
            description,
            groups,
            name: name.into(),
        };
        api::create_device_profile(&self.session, request).await
    }

    /// Delete a device profile by its UUID.
    pub async fn delete_device_profile<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<DeviceProfile>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// List accelerator requests, optionally only those of an instance.
    pub async fn accelerator_requests(
        &self,
        instance_uuid: Option<&str>,
    ) -> Result<Vec<AcceleratorRequest>> {
        api::list_accelerator_requests(&self.session, instance_uuid).await
    }

    /// Get an accelerator request by its UUID.
    pub async fn get_accelerator_request<Id: AsRef<str>>(
        &self,
        id: Id,
    ) -> Result<AcceleratorRequest> {
        resource::get(&self.session, id.as_ref()).await
    }

    /// Create accelerator requests for a device profile.
    pub async fn create_accelerator_requests<S: Into<String>>(
        &self,
        device_profile_name: S,
        device_profile_group_id: Option<u32>,
    ) -> Result<Vec<AcceleratorRequest>> {
        let request = protocol::AcceleratorRequestCreate {
            device_profile_name: device_profile_name.into(),
            device_profile_group_id,
        };
        api::create_accelerator_requests(&self.session, request).await
    }

    /// Bind an accelerator request to a host, a resource provider and an instance.
    pub async fn bind_accelerator_request(
        &self,
        arq: &AcceleratorRequest,
        binding: &ArqBinding,
    ) -> Result<()> {
        api::patch_accelerator_request_binding(&self.session, arq, binding).await
    }

    /// Unbind an accelerator request.
    pub async fn unbind_accelerator_request(&self, arq: &AcceleratorRequest) -> Result<()> {
        api::patch_accelerator_request_binding(&self.session, arq, &ArqBinding::default()).await
    }

    /// Delete an accelerator request by its UUID.
    pub async fn delete_accelerator_request<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<AcceleratorRequest>(&self.session, id.as_ref(), ignore_missing).await
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::DeviceFilters;

    #[test]
    fn test_device_filters() {
        let filters = DeviceFilters {
            device_type: Some("GPU".into()),
            hostname: Some("compute-1".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(filters).unwrap(),
            json!({"type": "GPU", "hostname": "compute-1"})
        );
    }
}
