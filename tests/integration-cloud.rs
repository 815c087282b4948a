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

use openstacksdk::cloud::{Cloud, Filters, NetworkSpec, SecGroupSource, SecurityGroupRuleSpec};
use serde_json::json;

static INIT: Once = Once::new();

async fn set_up() -> Option<Cloud> {
    if env::var_os("OS_CLOUD").is_none() && env::var_os("OS_AUTH_URL").is_none() {
        return None;
    }

    INIT.call_once(|| {
        env_logger::init();
    });

    Some(
        Cloud::from_env()
            .await
            .expect("Failed to create a cloud from the environment"),
    )
}

#[tokio::test]
async fn test_list_and_filter() {
    let Some(cloud) = set_up().await else { return };

    let flavors = cloud
        .list_flavors(true, None)
        .await
        .expect("Cannot list flavors");
    assert!(!flavors.is_empty());

    let first = &flavors[0];
    let filters = Filters::map(json!({"name": first.name})).unwrap();
    let found = cloud
        .list_flavors(false, Some(&filters))
        .await
        .expect("Cannot filter flavors");
    assert!(found.iter().all(|f| f.name == first.name));

    let by_id = cloud
        .get_flavor(&first.id, None)
        .await
        .expect("Cannot get flavor")
        .expect("Flavor not found");
    assert_eq!(by_id.id, first.id);

    let _ = cloud.list_servers(None).await.expect("Cannot list servers");
    let _ = cloud.list_keypairs(None).await.expect("Cannot list key pairs");
    let _ = cloud.list_ports(None).await.expect("Cannot list ports");
}

#[tokio::test]
async fn test_missing_entities() {
    let Some(cloud) = set_up().await else { return };

    assert!(cloud
        .get_server("rust-openstack-integration-missing", None)
        .await
        .expect("Cannot search servers")
        .is_none());
    assert!(!cloud
        .delete_keypair("rust-openstack-integration-missing")
        .await
        .expect("Cannot delete key pair"));
}

#[tokio::test]
async fn test_network_create_delete() {
    let Some(cloud) = set_up().await else { return };

    let network = cloud
        .create_network(
            "rust-openstack-integration-net",
            NetworkSpec {
                description: Some("Network for testing".into()),
                ..NetworkSpec::default()
            },
        )
        .await
        .expect("Cannot create network");
    assert!(network.admin_state_up);
    assert!(!network.external);

    let found = cloud
        .get_network("rust-openstack-integration-net", None)
        .await
        .expect("Cannot get network")
        .expect("Network not found");
    assert_eq!(found.id, network.id);

    assert!(cloud
        .delete_network(&network.id)
        .await
        .expect("Cannot delete network"));
    assert!(!cloud
        .delete_network(&network.id)
        .await
        .expect("Cannot delete network"));
}

#[tokio::test]
async fn test_security_group_lifecycle() {
    let Some(cloud) = set_up().await else { return };
    if cloud.options().secgroup_source == SecGroupSource::Disabled {
        return;
    }

    let group = cloud
        .create_security_group("rust-openstack-integration-sg", "For testing", None, None)
        .await
        .expect("Cannot create security group");
    assert_eq!(group.name, "rust-openstack-integration-sg");

    let rule = cloud
        .create_security_group_rule(
            &group.id,
            SecurityGroupRuleSpec {
                protocol: Some("tcp".into()),
                port_range_min: Some(22),
                port_range_max: Some(22),
                remote_ip_prefix: Some("0.0.0.0/0".into()),
                ..SecurityGroupRuleSpec::default()
            },
        )
        .await
        .expect("Cannot create rule");
    assert_eq!(rule.port_range_min, Some(22));

    let updated = cloud
        .update_security_group(&group.id, None, Some("Updated"), None)
        .await
        .expect("Cannot update security group");
    assert_eq!(updated.description, "Updated");

    assert!(cloud
        .delete_security_group_rule(&rule.id)
        .await
        .expect("Cannot delete rule"));
    assert!(cloud
        .delete_security_group(&group.id)
        .await
        .expect("Cannot delete security group"));
}

#[tokio::test]
async fn test_keypair_create_delete() {
    let Some(cloud) = set_up().await else { return };

    let keypair = cloud
        .create_keypair("rust-openstack-integration-key", None)
        .await
        .expect("Cannot create key pair");
    assert!(keypair.private_key.is_some());

    let found = cloud
        .get_keypair("rust-openstack-integration-key", None)
        .await
        .expect("Cannot get key pair")
        .expect("Key pair not found");
    assert_eq!(found.fingerprint, keypair.fingerprint);

    assert!(cloud
        .delete_keypair("rust-openstack-integration-key")
        .await
        .expect("Cannot delete key pair"));
}
