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

//! Records returned by the cloud layer.
//!
//! Every record has the same shape regardless of the service that produced
//! it, and serializes to JSON so that it can be filtered.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, FixedOffset};

use super::super::compute::protocol as compute;
use super::super::network::protocol as network;
use super::config::CloudOptions;

pub use super::super::compute::{KeyPairType, ServerAddress, ServerPowerState, ServerStatus};
pub use super::super::network::protocol::{EtherType, NetworkStatus, RuleDirection};

/// Flavor as embedded into a server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedServerFlavor {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ram: Option<u64>,
    pub vcpus: Option<u32>,
    pub disk: Option<u64>,
    pub ephemeral: Option<u64>,
    pub swap: u64,
    pub extra_specs: HashMap<String, String>,
}

/// A server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedServer {
    pub id: String,
    pub name: String,
    pub status: ServerStatus,
    pub power_state: ServerPowerState,
    pub task_state: Option<String>,
    pub vm_state: Option<String>,
    pub flavor: NormalizedServerFlavor,
    /// Image ID, `None` for servers booted from volume.
    pub image: Option<String>,
    pub key_name: Option<String>,
    pub metadata: HashMap<String, String>,
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    pub access_ipv4: Option<Ipv4Addr>,
    pub access_ipv6: Option<Ipv6Addr>,
    pub public_v4: Option<Ipv4Addr>,
    pub public_v6: Option<Ipv6Addr>,
    pub private_v4: Option<Ipv4Addr>,
    /// Address to use when connecting to the server.
    pub interface_ip: Option<IpAddr>,
    pub availability_zone: Option<String>,
    pub host: Option<String>,
    pub host_id: Option<String>,
    pub has_config_drive: bool,
    pub locked: Option<bool>,
    pub progress: Option<u32>,
    pub description: Option<String>,
    pub security_groups: Vec<String>,
    /// IDs of attached volumes.
    pub volumes: Vec<String>,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub launched_at: Option<String>,
    pub terminated_at: Option<String>,
}

impl NormalizedServer {
    /// Whether the server has a floating IP.
    pub fn has_floating_ip(&self) -> bool {
        self.floating_ip().is_some()
    }

    /// First floating IP of the server.
    pub fn floating_ip(&self) -> Option<IpAddr> {
        floating_addresses(&self.addresses).next()
    }

    /// All floating IPs of the server.
    pub fn floating_ips(&self) -> Vec<IpAddr> {
        floating_addresses(&self.addresses).collect()
    }

    /// Whether the address is assigned to the server.
    pub fn has_address(&self, address: IpAddr) -> bool {
        self.addresses.values().flatten().any(|a| a.addr == address)
    }
}

/// A flavor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFlavor {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub ram: u64,
    pub vcpus: u32,
    pub disk: u64,
    pub ephemeral: u64,
    pub swap: u64,
    pub rxtx_factor: f32,
    pub is_public: bool,
    pub is_disabled: bool,
    pub extra_specs: HashMap<String, String>,
}

/// A key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedKeyPair {
    /// Same as the name.
    pub id: String,
    pub name: String,
    pub fingerprint: String,
    pub public_key: String,
    /// Only available right after generating a key pair.
    pub private_key: Option<String>,
    #[serde(rename = "type")]
    pub key_type: Option<KeyPairType>,
    pub user_id: Option<String>,
}

/// A floating IP from either networking backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFloatingIp {
    pub id: String,
    /// Whether the IP is attached to a port or a server.
    pub attached: bool,
    pub fixed_ip_address: Option<IpAddr>,
    pub floating_ip_address: IpAddr,
    /// Floating network ID (Neutron) or pool name (Nova).
    pub network: Option<String>,
    /// Port ID (Neutron) or server ID (Nova).
    pub port: Option<String>,
    pub router: Option<String>,
    pub status: String,
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// A security group rule from either backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSecurityGroupRule {
    pub id: String,
    pub direction: RuleDirection,
    pub ethertype: EtherType,
    pub port_range_min: Option<u16>,
    pub port_range_max: Option<u16>,
    pub protocol: Option<String>,
    pub remote_ip_prefix: Option<String>,
    pub remote_group_id: Option<String>,
    pub security_group_id: Option<String>,
    pub project_id: Option<String>,
    pub description: Option<String>,
}

/// A security group from either backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSecurityGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub project_id: Option<String>,
    pub stateful: Option<bool>,
    pub security_group_rules: Vec<NormalizedSecurityGroupRule>,
}

/// A network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedNetwork {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: NetworkStatus,
    pub admin_state_up: bool,
    pub shared: bool,
    #[serde(rename = "router:external")]
    pub external: bool,
    pub is_default: Option<bool>,
    pub mtu: Option<u32>,
    pub project_id: Option<String>,
    pub subnets: Vec<String>,
    pub availability_zones: Vec<String>,
    #[serde(rename = "provider:network_type")]
    pub provider_network_type: Option<String>,
    #[serde(rename = "provider:physical_network")]
    pub provider_physical_network: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// A fixed IP of a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFixedIp {
    pub ip_address: IpAddr,
    pub subnet_id: String,
}

/// A port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPort {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub network_id: String,
    pub device_id: Option<String>,
    pub device_owner: Option<String>,
    pub mac_address: String,
    pub fixed_ips: Vec<NormalizedFixedIp>,
    pub status: NetworkStatus,
    pub admin_state_up: bool,
    pub security_groups: Vec<String>,
    pub project_id: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// Names and IDs of networks used to classify server addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressNetworks {
    /// Networks routing outside of the cloud.
    pub external: Vec<String>,
    /// Networks preferred for private addresses.
    pub internal: Vec<String>,
}

fn floating_addresses(
    addresses: &HashMap<String, Vec<ServerAddress>>,
) -> impl Iterator<Item = IpAddr> + '_ {
    addresses
        .values()
        .flatten()
        .filter(|a| a.addr_type == Some(compute::AddressType::Floating))
        .map(|a| a.addr)
}

fn sorted_addresses(
    addresses: &HashMap<String, Vec<ServerAddress>>,
) -> Vec<(&String, &ServerAddress)> {
    let mut result = addresses
        .iter()
        .flat_map(|(net, list)| list.iter().map(move |a| (net, a)))
        .collect::<Vec<_>>();
    // HashMap order is random, keep the choice stable.
    result.sort_by(|(n1, _), (n2, _)| n1.cmp(n2));
    result
}

fn is_global_v6(addr: &Ipv6Addr) -> bool {
    let first = addr.segments()[0];
    !addr.is_loopback() && (first & 0xffc0) != 0xfe80 && (first & 0xfe00) != 0xfc00
}

fn public_v4(server: &compute::Server, networks: &AddressNetworks) -> Option<Ipv4Addr> {
    if server.access_ipv4.is_some() {
        return server.access_ipv4;
    }
    let addresses = sorted_addresses(&server.addresses);
    let v4 = |a: &ServerAddress| match a.addr {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    };
    addresses
        .iter()
        .filter(|(_, a)| a.addr_type == Some(compute::AddressType::Floating))
        .find_map(|(_, a)| v4(a))
        .or_else(|| {
            addresses
                .iter()
                .filter(|(net, _)| networks.external.contains(net))
                .find_map(|(_, a)| v4(a))
        })
}

fn public_v6(server: &compute::Server) -> Option<Ipv6Addr> {
    if server.access_ipv6.is_some() {
        return server.access_ipv6;
    }
    sorted_addresses(&server.addresses)
        .into_iter()
        .find_map(|(_, a)| match a.addr {
            IpAddr::V6(ip) if is_global_v6(&ip) => Some(ip),
            _ => None,
        })
}

fn private_v4(server: &compute::Server, networks: &AddressNetworks) -> Option<Ipv4Addr> {
    let candidates = sorted_addresses(&server.addresses)
        .into_iter()
        .filter(|(net, a)| {
            a.addr_type != Some(compute::AddressType::Floating)
                && !networks.external.contains(net)
        })
        .filter_map(|(net, a)| match a.addr {
            IpAddr::V4(ip) => Some((net, ip)),
            IpAddr::V6(_) => None,
        })
        .collect::<Vec<_>>();
    candidates
        .iter()
        .find(|(net, _)| networks.internal.contains(net))
        .or_else(|| candidates.first())
        .map(|(_, ip)| *ip)
}

/// Normalize a server, splitting its addresses.
pub fn normalize_server(
    server: compute::Server,
    networks: &AddressNetworks,
    options: &CloudOptions,
) -> NormalizedServer {
    let public_v4 = public_v4(&server, networks);
    let public_v6 = public_v6(&server);
    let private_v4 = private_v4(&server, networks);
    let interface_ip = if options.private {
        private_v4.map(IpAddr::V4)
    } else {
        public_v4
            .map(IpAddr::V4)
            .or_else(|| {
                public_v6
                    .filter(|_| !options.force_ipv4)
                    .map(IpAddr::V6)
            })
            .or_else(|| private_v4.map(IpAddr::V4))
    };

    NormalizedServer {
        flavor: NormalizedServerFlavor {
            id: server.flavor.id,
            name: server.flavor.original_name,
            ram: server.flavor.ram,
            vcpus: server.flavor.vcpus,
            disk: server.flavor.disk,
            ephemeral: server.flavor.ephemeral,
            swap: server.flavor.swap,
            extra_specs: server.flavor.extra_specs.unwrap_or_default(),
        },
        image: server.image.map(|r| r.id),
        security_groups: server
            .security_groups
            .into_iter()
            .map(|g| g.name)
            .collect(),
        volumes: server
            .volumes_attached
            .into_iter()
            .map(|v| v.id)
            .collect(),
        public_v4,
        public_v6,
        private_v4,
        interface_ip,
        id: server.id,
        name: server.name,
        status: server.status,
        power_state: server.power_state,
        task_state: server.task_state,
        vm_state: server.vm_state,
        key_name: server.key_pair_name,
        metadata: server.metadata,
        addresses: server.addresses,
        access_ipv4: server.access_ipv4,
        access_ipv6: server.access_ipv6,
        availability_zone: server.availability_zone,
        host: server.host,
        host_id: server.host_id,
        has_config_drive: server.has_config_drive,
        locked: server.locked,
        progress: server.progress,
        description: server.description,
        project_id: server.tenant_id,
        user_id: server.user_id,
        created_at: server.created_at,
        updated_at: server.updated_at,
        launched_at: server.launched_at,
        terminated_at: server.terminated_at,
    }
}

/// Normalize a flavor (with extra specs already fetched if needed).
pub fn normalize_flavor(flavor: compute::Flavor) -> NormalizedFlavor {
    NormalizedFlavor {
        id: flavor.id,
        name: flavor.name,
        description: flavor.description,
        ram: flavor.ram,
        vcpus: flavor.vcpus,
        disk: flavor.disk,
        ephemeral: flavor.ephemeral,
        swap: flavor.swap,
        rxtx_factor: flavor.rxtx_factor,
        is_public: flavor.is_public,
        is_disabled: flavor.is_disabled,
        extra_specs: flavor.extra_specs.unwrap_or_default(),
    }
}

/// Normalize a key pair.
pub fn normalize_keypair(keypair: compute::KeyPair) -> NormalizedKeyPair {
    NormalizedKeyPair {
        id: keypair.name.clone(),
        name: keypair.name,
        fingerprint: keypair.fingerprint,
        public_key: keypair.public_key,
        private_key: keypair.private_key,
        key_type: keypair.key_type,
        user_id: keypair.user_id,
    }
}

/// Normalize a Neutron floating IP.
pub fn normalize_neutron_floating_ip(ip: network::FloatingIp) -> NormalizedFloatingIp {
    NormalizedFloatingIp {
        id: ip.id,
        attached: ip.port_id.is_some(),
        fixed_ip_address: ip.fixed_ip_address,
        floating_ip_address: ip.floating_ip_address,
        network: Some(ip.floating_network_id),
        port: ip.port_id,
        router: ip.router_id,
        status: ip.status.to_string(),
        project_id: ip.project_id,
        description: ip.description,
        created_at: ip.created_at,
    }
}

/// Normalize a Nova-network floating IP.
///
/// The server ID takes the place of the port, the status is always `ACTIVE`.
pub fn normalize_nova_floating_ip(ip: compute::NovaFloatingIp) -> NormalizedFloatingIp {
    NormalizedFloatingIp {
        id: ip.id,
        attached: ip.instance_id.is_some(),
        fixed_ip_address: ip.fixed_ip,
        floating_ip_address: ip.ip,
        network: ip.pool,
        port: ip.instance_id,
        router: None,
        status: "ACTIVE".into(),
        project_id: None,
        description: None,
        created_at: None,
    }
}

/// Normalize a Neutron security group rule.
pub fn normalize_neutron_rule(rule: network::SecurityGroupRule) -> NormalizedSecurityGroupRule {
    NormalizedSecurityGroupRule {
        id: rule.id,
        direction: rule.direction,
        ethertype: rule.ethertype,
        port_range_min: rule.port_range_min,
        port_range_max: rule.port_range_max,
        protocol: rule.protocol,
        remote_ip_prefix: rule.remote_ip_prefix,
        remote_group_id: rule.remote_group_id,
        security_group_id: Some(rule.security_group_id),
        project_id: rule.project_id,
        description: rule.description,
    }
}

/// Normalize a Neutron security group.
pub fn normalize_neutron_security_group(group: network::SecurityGroup) -> NormalizedSecurityGroup {
    NormalizedSecurityGroup {
        id: group.id,
        name: group.name,
        description: group.description.unwrap_or_default(),
        project_id: group.project_id,
        stateful: group.stateful,
        security_group_rules: group
            .security_group_rules
            .into_iter()
            .map(normalize_neutron_rule)
            .collect(),
    }
}

fn nova_port(value: Option<i32>) -> Option<u16> {
    value.and_then(|port| u16::try_from(port).ok())
}

/// Normalize a Nova-network security group rule.
///
/// Nova only knows ingress IPv4 rules. Remote groups are referenced by name,
/// `group_ids` maps names to IDs.
pub fn normalize_nova_rule(
    rule: compute::NovaSecurityGroupRule,
    group_ids: &HashMap<String, String>,
    project_id: Option<&String>,
) -> NormalizedSecurityGroupRule {
    let remote_group_id = rule
        .group
        .name
        .as_ref()
        .and_then(|name| group_ids.get(name))
        .cloned();
    NormalizedSecurityGroupRule {
        id: rule.id,
        direction: RuleDirection::Ingress,
        ethertype: EtherType::IPv4,
        port_range_min: nova_port(rule.from_port),
        port_range_max: nova_port(rule.to_port),
        protocol: rule.ip_protocol,
        remote_ip_prefix: rule.ip_range.cidr,
        remote_group_id,
        security_group_id: rule.parent_group_id,
        project_id: rule.group.tenant_id.or_else(|| project_id.cloned()),
        description: None,
    }
}

/// Normalize a list of Nova-network security groups.
pub fn normalize_nova_security_groups(
    groups: Vec<compute::NovaSecurityGroup>,
) -> Vec<NormalizedSecurityGroup> {
    let group_ids = groups
        .iter()
        .map(|g| (g.name.clone(), g.id.clone()))
        .collect::<HashMap<_, _>>();
    groups
        .into_iter()
        .map(|g| normalize_nova_security_group(g, &group_ids))
        .collect()
}

/// Normalize one Nova-network security group.
pub fn normalize_nova_security_group(
    group: compute::NovaSecurityGroup,
    group_ids: &HashMap<String, String>,
) -> NormalizedSecurityGroup {
    let rules = group
        .rules
        .into_iter()
        .map(|r| normalize_nova_rule(r, group_ids, group.tenant_id.as_ref()))
        .collect();
    NormalizedSecurityGroup {
        id: group.id,
        name: group.name,
        description: group.description.unwrap_or_default(),
        project_id: group.tenant_id,
        stateful: None,
        security_group_rules: rules,
    }
}

/// Normalize a network.
pub fn normalize_network(net: network::Network) -> NormalizedNetwork {
    NormalizedNetwork {
        id: net.id,
        name: net.name,
        description: net.description,
        status: net.status,
        admin_state_up: net.admin_state_up,
        shared: net.shared,
        external: net.external.unwrap_or(false),
        is_default: net.is_default,
        mtu: net.mtu,
        project_id: net.project_id,
        subnets: net.subnets,
        availability_zones: net.availability_zones,
        provider_network_type: net.provider_network_type,
        provider_physical_network: net.provider_physical_network,
        created_at: net.created_at,
        updated_at: net.updated_at,
    }
}

/// Normalize a port.
pub fn normalize_port(port: network::Port) -> NormalizedPort {
    NormalizedPort {
        id: port.id,
        name: port.name,
        description: port.description,
        network_id: port.network_id,
        device_id: port.device_id,
        device_owner: port.device_owner,
        mac_address: port.mac_address.to_string(),
        fixed_ips: port
            .fixed_ips
            .into_iter()
            .map(|ip| NormalizedFixedIp {
                ip_address: ip.ip_address,
                subnet_id: ip.subnet_id,
            })
            .collect(),
        status: port.status,
        admin_state_up: port.admin_state_up,
        security_groups: port.security_groups,
        project_id: port.project_id,
        created_at: port.created_at,
    }
}

#[cfg(test)]
mod test {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use serde_json::json;

    use super::super::super::compute::protocol as compute;
    use super::super::super::network::protocol as network;
    use super::super::config::CloudOptions;
    use super::*;

    fn server() -> compute::Server {
        serde_json::from_value(json!({
            "id": "s1",
            "name": "web",
            "status": "ACTIVE",
            "OS-EXT-STS:power_state": 1,
            "OS-EXT-STS:vm_state": "active",
            "flavor": {"original_name": "m1.small", "ram": 2048, "vcpus": 1,
                       "disk": 20, "ephemeral": 0, "swap": 0},
            "image": {"id": "img1", "links": []},
            "key_name": "default",
            "metadata": {"role": "web"},
            "addresses": {
                "private": [
                    {"addr": "10.0.0.5", "version": 4, "OS-EXT-IPS:type": "fixed",
                     "OS-EXT-IPS-MAC:mac_addr": "fa:16:3e:00:00:01"},
                    {"addr": "172.24.4.10", "version": 4, "OS-EXT-IPS:type": "floating",
                     "OS-EXT-IPS-MAC:mac_addr": "fa:16:3e:00:00:01"},
                    {"addr": "fe80::f816:3eff:fe00:1", "version": 6,
                     "OS-EXT-IPS:type": "fixed"},
                    {"addr": "2001:db8::5", "version": 6, "OS-EXT-IPS:type": "fixed"}
                ]
            },
            "security_groups": [{"name": "default"}],
            "os-extended-volumes:volumes_attached": [{"id": "v1"}],
            "tenant_id": "p1",
            "user_id": "u1"
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_server() {
        let result = normalize_server(server(), &AddressNetworks::default(), &CloudOptions::default());
        assert_eq!(result.id, "s1");
        assert_eq!(result.status, ServerStatus::Active);
        assert_eq!(result.power_state, ServerPowerState::Running);
        assert_eq!(result.flavor.name.as_deref(), Some("m1.small"));
        assert_eq!(result.image.as_deref(), Some("img1"));
        assert_eq!(result.key_name.as_deref(), Some("default"));
        assert_eq!(result.public_v4, Some(Ipv4Addr::new(172, 24, 4, 10)));
        assert_eq!(result.private_v4, Some(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(result.public_v6, Some("2001:db8::5".parse::<Ipv6Addr>().unwrap()));
        assert_eq!(result.interface_ip, Some(IpAddr::V4(Ipv4Addr::new(172, 24, 4, 10))));
        assert_eq!(result.security_groups, vec!["default".to_string()]);
        assert_eq!(result.volumes, vec!["v1".to_string()]);
        assert_eq!(result.project_id.as_deref(), Some("p1"));
        assert!(result.has_floating_ip());
    }

    #[test]
    fn test_normalize_server_private() {
        let options = CloudOptions {
            private: true,
            ..CloudOptions::default()
        };
        let result = normalize_server(server(), &AddressNetworks::default(), &options);
        assert_eq!(result.interface_ip, Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))));
    }

    #[test]
    fn test_normalize_server_external_network() {
        let server: compute::Server = serde_json::from_value(json!({
            "id": "s2",
            "name": "direct",
            "status": "ACTIVE",
            "flavor": {"original_name": "m1.tiny"},
            "addresses": {
                "internal": [{"addr": "10.1.0.4", "version": 4}],
                "public": [{"addr": "203.0.113.7", "version": 4}]
            }
        }))
        .unwrap();
        let networks = AddressNetworks {
            external: vec!["public".into()],
            internal: Vec::new(),
        };
        let options = CloudOptions {
            force_ipv4: true,
            ..CloudOptions::default()
        };
        let result = normalize_server(server, &networks, &options);
        assert_eq!(result.public_v4, Some(Ipv4Addr::new(203, 0, 113, 7)));
        assert_eq!(result.private_v4, Some(Ipv4Addr::new(10, 1, 0, 4)));
        assert_eq!(result.public_v6, None);
        assert!(!result.has_floating_ip());
        assert!(result.image.is_none());
    }

    #[test]
    fn test_normalize_floating_ips() {
        let neutron: network::FloatingIp = serde_json::from_value(json!({
            "id": "f1",
            "floating_ip_address": "172.24.4.10",
            "fixed_ip_address": "10.0.0.5",
            "floating_network_id": "n1",
            "port_id": "port1",
            "router_id": "r1",
            "status": "ACTIVE",
            "project_id": "p1"
        }))
        .unwrap();
        let result = normalize_neutron_floating_ip(neutron);
        assert!(result.attached);
        assert_eq!(result.network.as_deref(), Some("n1"));
        assert_eq!(result.port.as_deref(), Some("port1"));
        assert_eq!(result.router.as_deref(), Some("r1"));
        assert_eq!(result.status, "ACTIVE");

        let nova: compute::NovaFloatingIp = serde_json::from_value(json!({
            "id": 1,
            "ip": "172.24.4.11",
            "fixed_ip": null,
            "instance_id": null,
            "pool": "public"
        }))
        .unwrap();
        let result = normalize_nova_floating_ip(nova);
        assert_eq!(result.id, "1");
        assert!(!result.attached);
        assert_eq!(result.network.as_deref(), Some("public"));
        assert!(result.port.is_none());
        assert_eq!(result.status, "ACTIVE");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["floating_ip_address"], "172.24.4.11");
        assert_eq!(value["attached"], false);
    }

    #[test]
    fn test_normalize_nova_security_groups() {
        let groups: Vec<compute::NovaSecurityGroup> = serde_json::from_value(json!([
            {
                "id": 1,
                "name": "default",
                "description": "Default",
                "tenant_id": "p1",
                "rules": [
                    {"id": 10, "parent_group_id": 1, "ip_protocol": "icmp",
                     "from_port": -1, "to_port": -1,
                     "ip_range": {"cidr": "0.0.0.0/0"}, "group": {}},
                    {"id": 11, "parent_group_id": 1, "ip_protocol": "tcp",
                     "from_port": 22, "to_port": 22,
                     "ip_range": {}, "group": {"name": "web", "tenant_id": "p1"}}
                ]
            },
            {"id": 2, "name": "web", "description": null, "tenant_id": "p1", "rules": []}
        ]))
        .unwrap();
        let result = normalize_nova_security_groups(groups);
        assert_eq!(result.len(), 2);
        let default = &result[0];
        assert_eq!(default.id, "1");
        assert_eq!(default.description, "Default");
        assert_eq!(default.security_group_rules.len(), 2);

        let icmp = &default.security_group_rules[0];
        assert_eq!(icmp.direction, RuleDirection::Ingress);
        assert_eq!(icmp.ethertype, EtherType::IPv4);
        assert_eq!(icmp.port_range_min, None);
        assert_eq!(icmp.port_range_max, None);
        assert_eq!(icmp.protocol.as_deref(), Some("icmp"));
        assert_eq!(icmp.remote_ip_prefix.as_deref(), Some("0.0.0.0/0"));
        assert_eq!(icmp.security_group_id.as_deref(), Some("1"));

        let ssh = &default.security_group_rules[1];
        assert_eq!(ssh.port_range_min, Some(22));
        assert_eq!(ssh.port_range_max, Some(22));
        assert_eq!(ssh.remote_group_id.as_deref(), Some("2"));
        assert!(ssh.remote_ip_prefix.is_none());

        assert_eq!(result[1].description, "");
    }

    #[test]
    fn test_normalize_neutron_security_group() {
        let group: network::SecurityGroup = serde_json::from_value(json!({
            "id": "g1",
            "name": "default",
            "description": "",
            "project_id": "p1",
            "stateful": true,
            "security_group_rules": [{
                "id": "r1",
                "direction": "egress",
                "ethertype": "IPv6",
                "port_range_min": null,
                "port_range_max": null,
                "protocol": null,
                "remote_group_id": null,
                "remote_ip_prefix": null,
                "security_group_id": "g1",
                "project_id": "p1"
            }]
        }))
        .unwrap();
        let result = normalize_neutron_security_group(group);
        assert_eq!(result.stateful, Some(true));
        let rule = &result.security_group_rules[0];
        assert_eq!(rule.direction, RuleDirection::Egress);
        assert_eq!(rule.ethertype, EtherType::IPv6);
        assert_eq!(rule.security_group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_normalize_network() {
        let net: network::Network = serde_json::from_value(json!({
            "id": "n1",
            "name": "public",
            "status": "ACTIVE",
            "admin_state_up": true,
            "shared": false,
            "router:external": true,
            "subnets": ["sub1"]
        }))
        .unwrap();
        let result = normalize_network(net);
        assert!(result.external);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["router:external"], true);
        assert_eq!(value["status"], "ACTIVE");
    }

    #[test]
    fn test_normalize_keypair() {
        let keypair: compute::KeyPair = serde_json::from_value(json!({
            "name": "default",
            "fingerprint": "aa:bb",
            "public_key": "ssh-rsa AAAA",
            "type": "ssh"
        }))
        .unwrap();
        let result = normalize_keypair(keypair);
        assert_eq!(result.id, "default");
        assert_eq!(result.key_type, Some(KeyPairType::SSH));
    }
}
