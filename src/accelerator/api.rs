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

//! Foundation bits exposing the Accelerator API.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use super::super::resource::{self, extract_many, extract_one, Resource};
use super::super::utils::{self, Query};
use super::super::{Result, Session};
use super::protocol::*;

/// Trigger programming of a deployable with the given bitstream image.
pub async fn program_deployable<S: AsRef<str>>(
    session: &Session,
    id: S,
    image_id: String,
) -> Result<Deployable> {
    let id = id.as_ref();
    debug!("Programming deployable {} with image {}", id, image_id);
    let body = vec![ProgramOperation::bitstream(image_id)];
    let root: Value = session
        .request(ACCELERATOR, Method::PATCH, &[Deployable::BASE_PATH, id, "program"])
        .json(&body)
        .fetch()
        .await?;
    let result = extract_one::<Deployable>(root)?;
    trace!("Deployable {} after programming: {:?}", id, result);
    Ok(result)
}

/// Create a device profile.
///
/// The API accepts a list of profiles, only one is created at a time.
pub async fn create_device_profile(
    session: &Session,
    request: DeviceProfileCreate,
) -> Result<DeviceProfile> {
    let body = vec![request];
    resource::create(session, &body).await
}

/// List accelerator requests, optionally bound to an instance.
pub async fn list_accelerator_requests(
    session: &Session,
    instance_uuid: Option<&str>,
) -> Result<Vec<AcceleratorRequest>> {
    let mut query = Query::new();
    if let Some(instance_uuid) = instance_uuid {
        query.push_str("instance", instance_uuid);
    }
    resource::list(session, &query).await
}

/// Create accelerator requests for a device profile.
///
/// One request is created per accelerator in the profile group(s).
pub async fn create_accelerator_requests(
    session: &Session,
    request: AcceleratorRequestCreate,
) -> Result<Vec<AcceleratorRequest>> {
    debug!("Creating accelerator requests with {:?}", request);
    let root: Value = session
        .post(ACCELERATOR, &[AcceleratorRequest::BASE_PATH])
        .json(&request)
        .fetch()
        .await?;
    let result = extract_many::<AcceleratorRequest>(root)?;
    debug!(
        "Created accelerator requests {:?}",
        result.iter().map(|arq| &arq.uuid).collect::<Vec<_>>()
    );
    Ok(result)
}

/// Change the binding of an accelerator request.
///
/// The JSON patch is computed from the current binding to the desired one,
/// so binding yields `add` operations and unbinding `remove` ones.
pub async fn patch_accelerator_request_binding(
    session: &Session,
    current: &AcceleratorRequest,
    desired: &ArqBinding,
) -> Result<()> {
    let patch = binding_patch(&ArqBinding::from(current), desired)?;
    let mut body = HashMap::new();
    let _ = body.insert(current.uuid.clone(), patch);
    debug!("Updating binding of accelerator request {}", current.uuid);
    trace!("Binding patch: {:?}", body);
    let _ = session
        .request(ACCELERATOR, Method::PATCH, &[AcceleratorRequest::BASE_PATH])
        .json(&body)
        .send()
        .await?;
    Ok(())
}

fn binding_patch(current: &ArqBinding, desired: &ArqBinding) -> Result<json_patch::Patch> {
    let current = serde_json::to_value(current).map_err(utils::invalid_input)?;
    let desired = serde_json::to_value(desired).map_err(utils::invalid_input)?;
    Ok(json_patch::diff(&current, &desired))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::super::protocol::ArqBinding;
    use super::binding_patch;

    #[test]
    fn test_bind_patch_adds_fields() {
        let patch = binding_patch(
            &ArqBinding::default(),
            &ArqBinding::new("compute-1", "rp1", "inst1"),
        )
        .unwrap();
        let mut ops = serde_json::to_value(patch).unwrap();
        let ops = ops.as_array_mut().unwrap();
        ops.sort_by_key(|op| op["path"].as_str().unwrap().to_string());
        assert_eq!(
            *ops,
            vec![
                json!({"op": "add", "path": "/device_rp_uuid", "value": "rp1"}),
                json!({"op": "add", "path": "/hostname", "value": "compute-1"}),
                json!({"op": "add", "path": "/instance_uuid", "value": "inst1"}),
            ]
        );
    }

    #[test]
    fn test_unbind_patch_removes_fields() {
        let patch = binding_patch(
            &ArqBinding::new("compute-1", "rp1", "inst1"),
            &ArqBinding::default(),
        )
        .unwrap();
        let ops = serde_json::to_value(patch).unwrap();
        let ops = ops.as_array().unwrap();
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| op["op"] == "remove"));
    }

    #[test]
    fn test_no_change_empty_patch() {
        let binding = ArqBinding::new("compute-1", "rp1", "inst1");
        let patch = binding_patch(&binding, &binding).unwrap();
        assert_eq!(serde_json::to_value(patch).unwrap(), json!([]));
    }
}
