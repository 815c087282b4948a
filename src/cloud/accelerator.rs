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

//! Accelerators in the cloud layer.

use std::collections::HashMap;

use super::super::accelerator::{
    AcceleratorRequest, ArqBinding, Deployable, Device, DeviceFilters, DeviceProfile,
};
use super::super::{Result, ResultExt};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

fn by_name_or_uuid(profiles: Vec<DeviceProfile>, name_or_id: &str) -> Vec<DeviceProfile> {
    profiles
        .into_iter()
        .filter(|p| p.uuid == name_or_id || p.name == name_or_id)
        .collect()
}

impl Cloud {
    /// List deployables.
    pub async fn list_deployables(&self, filters: Option<&Filters>) -> Result<Vec<Deployable>> {
        filter_list(self.accelerator().deployables().await?, None, filters)
    }

    /// List devices.
    pub async fn list_devices(&self, filters: Option<&Filters>) -> Result<Vec<Device>> {
        let devices = self
            .accelerator()
            .devices(&DeviceFilters::default())
            .await?;
        filter_list(devices, None, filters)
    }

    /// List device profiles.
    pub async fn list_device_profiles(
        &self,
        filters: Option<&Filters>,
    ) -> Result<Vec<DeviceProfile>> {
        filter_list(self.accelerator().device_profiles().await?, None, filters)
    }

    async fn search_device_profiles(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<DeviceProfile>> {
        let found = by_name_or_uuid(self.accelerator().device_profiles().await?, name_or_id);
        filter_list(found, None, filters)
    }

    async fn get_device_profile_by_id(&self, id: &str) -> Result<Option<DeviceProfile>> {
        self.accelerator()
            .get_device_profile(id)
            .await
            .if_not_found_then_none()
    }

    /// Get a device profile by name or UUID.
    pub async fn get_device_profile(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<DeviceProfile>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_device_profile_by_id(name_or_id),
            self.search_device_profiles(name_or_id, filters),
        )
        .await
    }

    /// Create a device profile.
    pub async fn create_device_profile(
        &self,
        name: &str,
        groups: Vec<HashMap<String, String>>,
        description: Option<&str>,
    ) -> Result<DeviceProfile> {
        let profile = self
            .accelerator()
            .create_device_profile(name, groups, description.map(From::from))
            .await?;
        info!("Created device profile {} with UUID {}", profile.name, profile.uuid);
        Ok(profile)
    }

    /// Delete a device profile by name or UUID.
    pub async fn delete_device_profile(&self, name_or_id: &str) -> Result<bool> {
        match self.get_device_profile(name_or_id, None).await? {
            Some(profile) => {
                self.accelerator()
                    .delete_device_profile(&profile.uuid, true)
                    .await
            }
            None => {
                debug!("Device profile {} not found for deleting", name_or_id);
                Ok(false)
            }
        }
    }

    /// List accelerator requests.
    pub async fn list_accelerator_requests(
        &self,
        filters: Option<&Filters>,
    ) -> Result<Vec<AcceleratorRequest>> {
        let requests = self.accelerator().accelerator_requests(None).await?;
        filter_list(requests, None, filters)
    }

    /// Get an accelerator request by UUID.
    pub async fn get_accelerator_request(
        &self,
        id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<AcceleratorRequest>> {
        let found = self
            .accelerator()
            .get_accelerator_request(id)
            .await
            .if_not_found_then_none()?;
        Ok(filter_list(found.into_iter().collect(), None, filters)?
            .into_iter()
            .next())
    }

    /// Create accelerator requests for a device profile.
    pub async fn create_accelerator_request(
        &self,
        device_profile_name: &str,
        device_profile_group_id: Option<u32>,
    ) -> Result<Vec<AcceleratorRequest>> {
        let created = self
            .accelerator()
            .create_accelerator_requests(device_profile_name, device_profile_group_id)
            .await?;
        info!(
            "Created {} accelerator request(s) for device profile {}",
            created.len(),
            device_profile_name
        );
        Ok(created)
    }

    /// Delete an accelerator request by UUID.
    pub async fn delete_accelerator_request(&self, id: &str) -> Result<bool> {
        let deleted = self
            .accelerator()
            .delete_accelerator_request(id, true)
            .await?;
        if !deleted {
            debug!("Accelerator request {} not found for deleting", id);
        }
        Ok(deleted)
    }

    /// Bind an accelerator request.
    ///
    /// Returns `false` if the request does not exist.
    pub async fn bind_accelerator_request(&self, id: &str, binding: &ArqBinding) -> Result<bool> {
        let proxy = self.accelerator();
        match proxy.get_accelerator_request(id).await.if_not_found_then_none()? {
            Some(arq) => {
                proxy.bind_accelerator_request(&arq, binding).await?;
                info!("Bound accelerator request {}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unbind an accelerator request.
    ///
    /// Returns `false` if the request does not exist.
    pub async fn unbind_accelerator_request(&self, id: &str) -> Result<bool> {
        let proxy = self.accelerator();
        match proxy.get_accelerator_request(id).await.if_not_found_then_none()? {
            Some(arq) => {
                proxy.unbind_accelerator_request(&arq).await?;
                info!("Unbound accelerator request {}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::super::super::accelerator::DeviceProfile;
    use super::by_name_or_uuid;

    #[test]
    fn test_by_name_or_uuid() {
        let profiles: Vec<DeviceProfile> = serde_json::from_value(json!([
            {"uuid": "u1", "name": "fpga", "groups": []},
            {"uuid": "u2", "name": "gpu", "groups": [{"resources:CUSTOM_GPU": "1"}]}
        ]))
        .unwrap();
        let found = by_name_or_uuid(profiles.clone(), "gpu");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid, "u2");
        assert_eq!(by_name_or_uuid(profiles.clone(), "u1")[0].name, "fpga");
        assert!(by_name_or_uuid(profiles, "nope").is_empty());
    }
}
