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

//! JSON structures and protocol bits for the Network API.

#![allow(missing_docs)]

use std::net::IpAddr;

use chrono::{DateTime, FixedOffset};
use ipnet::IpNet;
use macaddr::MacAddr6;
use osauth::services::{NetworkService, NETWORK};

use super::super::common::protocol::{empty_as_none, from_str, null_as_empty_vec, some_truth};
use super::super::resource::Resource;

protocol_enum! {
    #[doc = "IP protocol version."]
    enum IpVersion: u8 {
        V4 = 4,
        V6 = 6
    }
}

protocol_enum! {
    #[doc = "Possible network statuses."]
    enum NetworkStatus = Unknown {
        Active = "ACTIVE",
        Down = "DOWN",
        Building = "BUILD",
        Error = "ERROR",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Possible floating IP statuses."]
    enum FloatingIpStatus = Unknown {
        Active = "ACTIVE",
        Down = "DOWN",
        Error = "ERROR",
        Unknown = "UNKNOWN"
    }
}

protocol_enum! {
    #[doc = "Direction of a security group rule."]
    enum RuleDirection {
        Ingress = "ingress",
        Egress = "egress"
    }
}

protocol_enum! {
    #[doc = "Ethernet type of a security group rule."]
    enum EtherType {
        IPv4 = "IPv4",
        IPv6 = "IPv6"
    }
}

protocol_enum! {
    #[doc = "Available sort keys."]
    enum NetworkSortKey {
        CreatedAt = "created_at",
        Id = "id",
        Name = "name",
        UpdatedAt = "updated_at"
    }
}

/// A network.
#[derive(Debug, Clone, Deserialize)]
pub struct Network {
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default)]
    pub availability_zones: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    #[serde(rename = "router:external", default)]
    pub external: Option<bool>,
    pub id: String,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(rename = "provider:network_type", default)]
    pub provider_network_type: Option<String>,
    #[serde(rename = "provider:physical_network", default)]
    pub provider_physical_network: Option<String>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub status: NetworkStatus,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub subnets: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Resource for Network {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "network";
    const RESOURCES_KEY: &'static str = "networks";
    const BASE_PATH: &'static str = "networks";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "router:external", skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(rename = "provider:network_type", skip_serializing_if = "Option::is_none")]
    pub provider_network_type: Option<String>,
    #[serde(rename = "provider:physical_network", skip_serializing_if = "Option::is_none")]
    pub provider_physical_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "router:external", skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

/// A subnet (only the bits needed to find routable networks).
#[derive(Debug, Clone, Deserialize)]
pub struct Subnet {
    pub cidr: IpNet,
    #[serde(default = "some_truth")]
    pub enable_dhcp: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub gateway_ip: Option<IpAddr>,
    pub id: String,
    pub ip_version: IpVersion,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
}

impl Resource for Subnet {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "subnet";
    const RESOURCES_KEY: &'static str = "subnets";
    const BASE_PATH: &'static str = "subnets";
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

/// A fixed IP address of a port.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PortIpAddress {
    pub ip_address: IpAddr,
    pub subnet_id: String,
}

/// A port.
#[derive(Debug, Clone, Deserialize)]
pub struct Port {
    #[serde(default = "some_truth")]
    pub admin_state_up: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub device_id: Option<String>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub device_owner: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub fixed_ips: Vec<PortIpAddress>,
    pub id: String,
    #[serde(deserialize_with = "from_str")]
    pub mac_address: MacAddr6,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub security_groups: Vec<String>,
    #[serde(default)]
    pub status: NetworkStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Resource for Port {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "port";
    const RESOURCES_KEY: &'static str = "ports";
    const BASE_PATH: &'static str = "ports";
    const ALLOW_CREATE: bool = false;
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// A floating IP.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fixed_ip_address: Option<IpAddr>,
    pub floating_ip_address: IpAddr,
    pub floating_network_id: String,
    pub id: String,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub status: FloatingIpStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Resource for FloatingIp {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "floatingip";
    const RESOURCES_KEY: &'static str = "floatingips";
    const BASE_PATH: &'static str = "floatingips";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FloatingIpCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_ip_address: Option<IpAddr>,
    pub floating_network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

/// Floating IP update: port association is nullable on the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FloatingIpUpdate {
    pub port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<IpAddr>,
}

/// A security group rule.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupRule {
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    pub direction: RuleDirection,
    pub ethertype: EtherType,
    pub id: String,
    #[serde(default)]
    pub port_range_max: Option<u16>,
    #[serde(default)]
    pub port_range_min: Option<u16>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub remote_group_id: Option<String>,
    #[serde(default)]
    pub remote_ip_prefix: Option<String>,
    pub security_group_id: String,
}

impl Resource for SecurityGroupRule {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "security_group_rule";
    const RESOURCES_KEY: &'static str = "security_group_rules";
    const BASE_PATH: &'static str = "security-group-rules";
    const ALLOW_COMMIT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupRuleCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub direction: RuleDirection,
    pub ethertype: EtherType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_max: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_min: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ip_prefix: Option<String>,
    pub security_group_id: String,
}

impl SecurityGroupRuleCreate {
    pub fn new(security_group_id: String, direction: RuleDirection) -> SecurityGroupRuleCreate {
        SecurityGroupRuleCreate {
            description: None,
            direction,
            ethertype: EtherType::IPv4,
            port_range_max: None,
            port_range_min: None,
            project_id: None,
            protocol: None,
            remote_group_id: None,
            remote_ip_prefix: None,
            security_group_id,
        }
    }
}

/// A security group.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroup {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "empty_as_none", default)]
    pub description: Option<String>,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub security_group_rules: Vec<SecurityGroupRule>,
    #[serde(default)]
    pub stateful: Option<bool>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Resource for SecurityGroup {
    type Service = NetworkService;
    const SERVICE: NetworkService = NETWORK;
    const RESOURCE_KEY: &'static str = "security_group";
    const RESOURCES_KEY: &'static str = "security_groups";
    const BASE_PATH: &'static str = "security-groups";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityGroupCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
}

impl SecurityGroupUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.name.is_none() && self.stateful.is_none()
    }
}

impl NetworkUpdate {
    pub fn is_empty(&self) -> bool {
        self.admin_state_up.is_none()
            && self.description.is_none()
            && self.external.is_none()
            && self.mtu.is_none()
            && self.name.is_none()
            && self.shared.is_none()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_network() {
        let net: Network = serde_json::from_value(json!({
            "id": "net1",
            "name": "public",
            "router:external": true,
            "provider:physical_network": "datacentre",
            "status": "ACTIVE",
            "subnets": ["sub1"],
            "description": ""
        }))
        .unwrap();
        assert_eq!(net.external, Some(true));
        assert!(net.admin_state_up);
        assert_eq!(net.status, NetworkStatus::Active);
        assert!(net.description.is_none());
        assert_eq!(net.provider_physical_network.as_deref(), Some("datacentre"));
    }

    #[test]
    fn test_port() {
        let port: Port = serde_json::from_value(json!({
            "id": "port1",
            "network_id": "net1",
            "mac_address": "fa:16:3e:11:22:33",
            "device_id": "",
            "fixed_ips": [{"ip_address": "10.0.0.5", "subnet_id": "sub1"}],
            "status": "DOWN"
        }))
        .unwrap();
        assert!(port.device_id.is_none());
        assert_eq!(port.fixed_ips[0].ip_address.to_string(), "10.0.0.5");
        assert_eq!(
            port.mac_address,
            MacAddr6::new(0xfa, 0x16, 0x3e, 0x11, 0x22, 0x33)
        );
    }

    #[test]
    fn test_port_invalid_mac() {
        let result = serde_json::from_str::<Port>(
            r#"{"id":"p1","network_id":"n1","mac_address":"fa:16:3e","fixed_ips":[]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_floating_ip_update_serializes_null_port() {
        let update = FloatingIpUpdate::default();
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"port_id": null}));
    }

    #[test]
    fn test_security_group_rule_create() {
        let mut rule = SecurityGroupRuleCreate::new("sg1".into(), RuleDirection::Ingress);
        rule.protocol = Some("tcp".into());
        rule.port_range_min = Some(22);
        rule.port_range_max = Some(22);
        assert_eq!(
            serde_json::to_value(rule).unwrap(),
            json!({
                "direction": "ingress",
                "ethertype": "IPv4",
                "port_range_max": 22,
                "port_range_min": 22,
                "protocol": "tcp",
                "security_group_id": "sg1"
            })
        );
    }

    #[test]
    fn test_subnet() {
        let subnet: Subnet = serde_json::from_value(json!({
            "id": "sub1",
            "network_id": "net1",
            "cidr": "10.0.0.0/24",
            "gateway_ip": null,
            "ip_version": 4
        }))
        .unwrap();
        assert!(subnet.gateway_ip.is_none());
        assert_eq!(subnet.ip_version, IpVersion::V4);
    }
}
