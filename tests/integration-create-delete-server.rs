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

use std::env;
use std::sync::Once;

use openstacksdk::cloud::{Cloud, ServerSpec, DEFAULT_SERVER_TIMEOUT};
use openstacksdk::compute::ServerStatus;

static INIT: Once = Once::new();

struct Params {
    flavor: String,
    image: String,
    network: Option<String>,
}

async fn set_up() -> Option<(Cloud, Params)> {
    if env::var_os("OS_CLOUD").is_none() && env::var_os("OS_AUTH_URL").is_none() {
        return None;
    }
    let params = Params {
        flavor: env::var("RUST_OPENSTACK_FLAVOR").ok()?,
        image: env::var("RUST_OPENSTACK_IMAGE").ok()?,
        network: env::var("RUST_OPENSTACK_NETWORK").ok(),
    };

    INIT.call_once(|| {
        env_logger::init();
    });

    let cloud = Cloud::from_env()
        .await
        .expect("Failed to create a cloud from the environment");
    Some((cloud, params))
}

#[tokio::test]
async fn test_server_create_delete() {
    let Some((cloud, params)) = set_up().await else { return };

    let spec = ServerSpec {
        image: Some(params.image),
        networks: params.network.into_iter().collect(),
        auto_ip: false,
        wait: true,
        ..ServerSpec::default()
    };
    let server = cloud
        .create_server("rust-openstack-integration", &params.flavor, spec)
        .await
        .expect("Cannot create a server");
    assert_eq!(server.status, ServerStatus::Active);
    assert_eq!(server.name, "rust-openstack-integration");
    assert!(server.interface_ip.is_some());

    let found = cloud
        .get_server(&server.id, None)
        .await
        .expect("Cannot get server")
        .expect("Server not found");
    assert_eq!(found.id, server.id);

    assert!(cloud
        .delete_server(&server.id, true, DEFAULT_SERVER_TIMEOUT, false, 1)
        .await
        .expect("Cannot delete server"));
    assert!(cloud
        .get_server_by_id(&server.id)
        .await
        .expect("Cannot get server")
        .is_none());
}
