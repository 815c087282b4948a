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

//! JSON structures and protocol bits for the Compute API.

#![allow(non_snake_case)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, FixedOffset};
use osauth::services::{ComputeService, COMPUTE};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::super::common::protocol::{
    empty_as_default, empty_as_none, null_as_empty_map, null_as_empty_vec, opt_string_or_number,
    string_or_number, Ref,
};
use super::super::resource::Resource;

protocol_enum! {
    #[doc = "Available sort keys."]
    enum ServerSortKey {
        AccessIpv4 = "access_ip_v4",
        AccessIpv6 = "access_ip_v6",
        AvailabilityZone = "availability_zone",
        CreatedAt = "created_at",
        DisplayName = "display_name",
        Host = "host",
        HostName = "hostname",
        ImageRef = "image_ref",
        KeyName = "key_name",
        LaunchedAt = "launched_at",
        PowerState = "power_state",
        ProjectId = "project_id",
        TaskState = "task_state",
        UpdatedAt = "updated_at",
        UserId = "user_id",
        Uuid = "uuid",
        VmState = "vm_state"
    }
}

protocol_enum! {
    #[doc = "Possible server statuses."]
    enum ServerStatus = Unknown {
        Active = "ACTIVE",
        Building = "BUILD",
        Deleted = "DELETED",
        Error = "ERROR",
        HardRebooting = "HARD_REBOOT",
        Migrating = "MIGRATING",
        Paused = "PAUSED",
        Rebooting = "REBOOT",
        Resizing = "RESIZE",
        RevertingResize = "REVERT_RESIZE",
        ShutOff = "SHUTOFF",
        Suspended = "SUSPENDED",
        Rescuing = "RESCUE",
        Shelved = "SHELVED",
        ShelvedOffloaded = "SHELVED_OFFLOADED",
        SoftDeleted = "SOFT_DELETED",
        Unknown = "UNKNOWN",
        UpdatingPassword = "PASSWORD",
        VerifyingResize = "VERIFY_RESIZE"
    }
}

protocol_enum! {
    #[doc = "Possible power states."]
    enum ServerPowerState: u8 {
        NoState = 0,
        Running = 1,
        Paused = 3,
        Shutdown = 4,
        Crashed = 6,
        Suspended = 7
    }
}

impl Default for ServerPowerState {
    fn default() -> ServerPowerState {
        ServerPowerState::NoState
    }
}

protocol_enum! {
    #[doc = "Reboot type."]
    enum RebootType {
        Hard = "HARD",
        Soft = "SOFT"
    }
}

protocol_enum! {
    #[doc = "Type of a server address."]
    enum AddressType {
        Fixed = "fixed",
        Floating = "floating"
    }
}

protocol_enum! {
    #[doc = "Type of a key pair."]
    enum KeyPairType {
        SSH = "ssh",
        X509 = "x509"
    }
}

/// Address of a server.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerAddress {
    /// IP (v4 of v6) address.
    pub addr: IpAddr,
    /// MAC address (if available).
    #[serde(rename = "OS-EXT-IPS-MAC:mac_addr", default)]
    pub mac_addr: Option<String>,
    /// Address type (if known).
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub addr_type: Option<AddressType>,
}

/// Flavor information embedded into a server.
///
/// Older API versions only return a reference, newer ones return a copy of
/// the flavor without its ID.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerFlavor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub ram: Option<u64>,
    #[serde(default)]
    pub vcpus: Option<u32>,
    #[serde(default)]
    pub disk: Option<u64>,
    #[serde(default)]
    pub ephemeral: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub swap: u64,
    #[serde(default)]
    pub extra_specs: Option<HashMap<String, String>>,
}

/// A security group as referenced by a server.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SecurityGroupName {
    pub name: String,
}

/// A volume attached to a server.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AttachedVolume {
    pub id: String,
    #[serde(default)]
    pub delete_on_termination: bool,
}

fn bool_from_config_drive<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(value) => Ok(value),
        serde_json::Value::Null => Ok(false),
        serde_json::Value::String(s) => match s.as_str() {
            "True" | "true" => Ok(true),
            "" | "False" | "false" => Ok(false),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"True or empty",
            )),
        },
        other => Err(de::Error::custom(format!(
            "unexpected config_drive value {}",
            other
        ))),
    }
}

fn config_drive_string_to_bool<S>(has_config_drive: &Option<bool>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    has_config_drive
        .map(|b| if b { "True" } else { "" })
        .serialize(s)
}

#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    #[serde(deserialize_with = "empty_as_default", default, rename = "accessIPv4")]
    pub access_ipv4: Option<Ipv4Addr>,
    #[serde(deserialize_with = "empty_as_default", default, rename = "accessIPv6")]
    pub access_ipv6: Option<Ipv6Addr>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    #[serde(rename = "OS-EXT-AZ:availability_zone", default)]
    pub availability_zone: Option<String>,
    #[serde(rename = "created", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flavor: ServerFlavor,
    #[serde(
        deserialize_with = "bool_from_config_drive",
        rename = "config_drive",
        default
    )]
    pub has_config_drive: bool,
    #[serde(rename = "OS-EXT-SRV-ATTR:host", default)]
    pub host: Option<String>,
    #[serde(rename = "hostId", deserialize_with = "empty_as_none", default)]
    pub host_id: Option<String>,
    pub id: String,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub image: Option<Ref>,
    #[serde(rename = "OS-EXT-SRV-ATTR:instance_name", default)]
    pub instance_name: Option<String>,
    #[serde(rename = "key_name", deserialize_with = "empty_as_none", default)]
    pub key_pair_name: Option<String>,
    #[serde(rename = "OS-SRV-USG:launched_at", default)]
    pub launched_at: Option<String>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "OS-EXT-STS:power_state", default)]
    pub power_state: ServerPowerState,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub security_groups: Vec<SecurityGroupName>,
    #[serde(default)]
    pub status: ServerStatus,
    #[serde(rename = "OS-EXT-STS:task_state", default)]
    pub task_state: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(rename = "OS-SRV-USG:terminated_at", default)]
    pub terminated_at: Option<String>,
    #[serde(rename = "updated", default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "OS-EXT-STS:vm_state", default)]
    pub vm_state: Option<String>,
    #[serde(
        rename = "os-extended-volumes:volumes_attached",
        default,
        deserialize_with = "null_as_empty_vec"
    )]
    pub volumes_attached: Vec<AttachedVolume>,
}

impl Resource for Server {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "server";
    const RESOURCES_KEY: &'static str = "servers";
    const BASE_PATH: &'static str = "servers";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Network attachment of a new server.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ServerNetwork {
    Network {
        uuid: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixed_ip: Option<IpAddr>,
    },
    Port {
        port: String,
    },
}

/// Block device mapping of a new server.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct BlockDevice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub source_type: String,
    pub destination_type: String,
    pub boot_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<u32>,
    pub delete_on_termination: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(
        rename = "block_device_mapping_v2",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub block_devices: Vec<BlockDevice>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "config_drive_string_to_bool"
    )]
    pub config_drive: Option<bool>,
    pub flavorRef: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imageRef: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    pub name: String,
    pub networks: Vec<ServerNetwork>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<SecurityGroupName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

impl ServerCreate {
    pub fn new(name: String, flavor: String) -> ServerCreate {
        ServerCreate {
            availability_zone: None,
            block_devices: Vec::new(),
            config_drive: None,
            flavorRef: flavor,
            imageRef: None,
            key_name: None,
            metadata: HashMap::new(),
            name,
            networks: Vec::new(),
            security_groups: Vec::new(),
            user_data: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerCreateRoot {
    pub server: ServerCreate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedServerRoot {
    pub server: Ref,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ServerUpdate {
    #[serde(rename = "accessIPv4", skip_serializing_if = "Option::is_none")]
    pub access_ipv4: Option<Ipv4Addr>,
    #[serde(rename = "accessIPv6", skip_serializing_if = "Option::is_none")]
    pub access_ipv6: Option<Ipv6Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ServerUpdate {
    pub fn is_empty(&self) -> bool {
        self.access_ipv4.is_none()
            && self.access_ipv6.is_none()
            && self.description.is_none()
            && self.name.is_none()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerUpdateRoot {
    pub server: ServerUpdate,
}

/// An image as exposed by the Compute image proxy.
#[derive(Clone, Debug, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "minDisk", default)]
    pub min_disk: u64,
    #[serde(rename = "minRam", default)]
    pub min_ram: u64,
}

impl Resource for Image {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "image";
    const RESOURCES_KEY: &'static str = "images";
    const BASE_PATH: &'static str = "images";
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

#[derive(Clone, Debug, Deserialize)]
pub struct Flavor {
    #[serde(rename = "OS-FLV-EXT-DATA:ephemeral", default)]
    pub ephemeral: u64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub extra_specs: Option<HashMap<String, String>>,
    pub id: String,
    #[serde(rename = "OS-FLV-DISABLED:disabled", default)]
    pub is_disabled: bool,
    #[serde(
        rename = "os-flavor-access:is_public",
        default = "default_flavor_is_public"
    )]
    pub is_public: bool,
    pub name: String,
    #[serde(default)]
    pub ram: u64,
    #[serde(default = "default_rxtx_factor")]
    pub rxtx_factor: f32,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub swap: u64,
    #[serde(default)]
    pub vcpus: u32,
}

impl Resource for Flavor {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "flavor";
    const RESOURCES_KEY: &'static str = "flavors";
    const BASE_PATH: &'static str = "flavors";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExtraSpecsRoot {
    pub extra_specs: HashMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeyPair {
    #[serde(default)]
    pub fingerprint: String,
    #[serde(rename = "type", default)]
    pub key_type: Option<KeyPairType>,
    pub name: String,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Resource for KeyPair {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "keypair";
    const RESOURCES_KEY: &'static str = "keypairs";
    const BASE_PATH: &'static str = "os-keypairs";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct KeyPairCreate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyPairType>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl KeyPairCreate {
    pub fn new(name: String) -> KeyPairCreate {
        KeyPairCreate {
            key_type: None,
            name,
            public_key: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct KeyPairCreateRoot {
    pub keypair: KeyPairCreate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeyPairRoot {
    pub keypair: KeyPair,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeyPairsRoot {
    pub keypairs: Vec<KeyPairRoot>,
}

/// A floating IP managed by Nova-network.
#[derive(Clone, Debug, Deserialize)]
pub struct NovaFloatingIp {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fixed_ip: Option<IpAddr>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub instance_id: Option<String>,
    pub ip: IpAddr,
    #[serde(default)]
    pub pool: Option<String>,
}

impl Resource for NovaFloatingIp {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "floating_ip";
    const RESOURCES_KEY: &'static str = "floating_ips";
    const BASE_PATH: &'static str = "os-floating-ips";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NovaFloatingIpCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AddFloatingIp {
    pub address: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_address: Option<IpAddr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RemoveFloatingIp {
    pub address: IpAddr,
}

/// IP range of a Nova-network security group rule.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NovaIpRange {
    #[serde(default)]
    pub cidr: Option<String>,
}

/// Remote group of a Nova-network security group rule.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NovaRuleGroup {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// A security group rule managed by Nova-network.
#[derive(Clone, Debug, Deserialize)]
pub struct NovaSecurityGroupRule {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub ip_protocol: Option<String>,
    #[serde(default)]
    pub from_port: Option<i32>,
    #[serde(default)]
    pub to_port: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub ip_range: NovaIpRange,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub group: NovaRuleGroup,
}

impl Resource for NovaSecurityGroupRule {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "security_group_rule";
    const RESOURCES_KEY: &'static str = "security_group_rules";
    const BASE_PATH: &'static str = "os-security-group-rules";
    const ALLOW_FETCH: bool = false;
    const ALLOW_COMMIT: bool = false;
    const ALLOW_LIST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A security group managed by Nova-network.
#[derive(Clone, Debug, Deserialize)]
pub struct NovaSecurityGroup {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub rules: Vec<NovaSecurityGroupRule>,
}

impl Resource for NovaSecurityGroup {
    type Service = ComputeService;
    const SERVICE: ComputeService = COMPUTE;
    const RESOURCE_KEY: &'static str = "security_group";
    const RESOURCES_KEY: &'static str = "security_groups";
    const BASE_PATH: &'static str = "os-security-groups";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NovaSecurityGroupUpdate {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NovaSecurityGroupRuleCreate {
    pub parent_group_id: String,
    pub ip_protocol: Option<String>,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[inline]
fn default_flavor_is_public() -> bool {
    true
}

#[inline]
fn default_rxtx_factor() -> f32 {
    1.0
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_image() {
        let images: Vec<Image> = super::super::super::resource::extract_many(json!({"images": [
            {"id": "img1", "name": "cirros", "status": "ACTIVE", "minDisk": 1, "minRam": 64},
            {"id": "img2"}
        ]}))
        .unwrap();
        assert_eq!(images[0].name, "cirros");
        assert_eq!(images[0].min_ram, 64);
        assert_eq!(images[1].name, "");
        assert!(!Image::ALLOW_CREATE);
    }

    #[test]
    fn test_server_minimal() {
        let server: Server = serde_json::from_value(json!({
            "id": "abcd",
            "name": "test",
            "status": "ACTIVE",
            "flavor": {"id": "1", "links": []},
            "image": "",
            "config_drive": "",
            "accessIPv4": "",
            "addresses": {
                "private": [
                    {"addr": "10.0.0.3", "version": 4, "OS-EXT-IPS:type": "fixed"},
                    {"addr": "172.24.4.2", "version": 4, "OS-EXT-IPS:type": "floating"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(server.status, ServerStatus::Active);
        assert!(server.image.is_none());
        assert!(!server.has_config_drive);
        assert!(server.access_ipv4.is_none());
        assert_eq!(server.flavor.id.as_deref(), Some("1"));
        assert_eq!(server.addresses["private"].len(), 2);
        assert_eq!(
            server.addresses["private"][1].addr_type,
            Some(AddressType::Floating)
        );
    }

    #[test]
    fn test_server_extended() {
        let server: Server = serde_json::from_value(json!({
            "id": "abcd",
            "name": "test",
            "status": "SOMETHING_NEW",
            "flavor": {"original_name": "m1.small", "ram": 2048, "vcpus": 1, "disk": 20},
            "config_drive": "True",
            "OS-EXT-STS:power_state": 1,
            "OS-EXT-STS:vm_state": "active",
            "OS-EXT-AZ:availability_zone": "nova",
            "security_groups": [{"name": "default"}],
            "os-extended-volumes:volumes_attached": [{"id": "vol1"}],
            "metadata": null,
            "created": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(server.status, ServerStatus::Unknown);
        assert!(server.has_config_drive);
        assert_eq!(server.power_state, ServerPowerState::Running);
        assert_eq!(server.flavor.original_name.as_deref(), Some("m1.small"));
        assert_eq!(server.security_groups[0].name, "default");
        assert_eq!(server.volumes_attached[0].id, "vol1");
        assert!(server.metadata.is_empty());
        assert!(server.created_at.is_some());
    }

    #[test]
    fn test_server_create_body() {
        let mut create = ServerCreate::new("test".into(), "1".into());
        create.imageRef = Some("img".into());
        create.config_drive = Some(true);
        create.networks.push(ServerNetwork::Network {
            uuid: "net".into(),
            fixed_ip: None,
        });
        create.networks.push(ServerNetwork::Port {
            port: "port".into(),
        });
        let body = serde_json::to_value(ServerCreateRoot { server: create }).unwrap();
        assert_eq!(
            body,
            json!({"server": {
                "config_drive": "True",
                "flavorRef": "1",
                "imageRef": "img",
                "name": "test",
                "networks": [{"uuid": "net"}, {"port": "port"}]
            }})
        );
    }

    #[test]
    fn test_flavor_defaults() {
        let flavor: Flavor = serde_json::from_value(json!({
            "id": "1",
            "name": "m1.tiny",
            "ram": 512,
            "vcpus": 1,
            "disk": 1,
            "swap": ""
        }))
        .unwrap();
        assert!(flavor.is_public);
        assert_eq!(flavor.swap, 0);
        assert_eq!(flavor.rxtx_factor, 1.0);
    }

    #[test]
    fn test_nova_network_ids() {
        let fip: NovaFloatingIp = serde_json::from_value(json!({
            "id": 1,
            "ip": "172.24.4.10",
            "fixed_ip": null,
            "instance_id": null,
            "pool": "public"
        }))
        .unwrap();
        assert_eq!(fip.id, "1");
        assert!(fip.fixed_ip.is_none());

        let group: NovaSecurityGroup = serde_json::from_value(json!({
            "id": 2,
            "name": "default",
            "description": "default",
            "rules": [{
                "id": 3,
                "parent_group_id": 2,
                "ip_protocol": "tcp",
                "from_port": 22,
                "to_port": 22,
                "ip_range": {"cidr": "0.0.0.0/0"},
                "group": {}
            }]
        }))
        .unwrap();
        assert_eq!(group.rules[0].parent_group_id.as_deref(), Some("2"));
        assert_eq!(group.rules[0].ip_range.cidr.as_deref(), Some("0.0.0.0/0"));
    }
}
