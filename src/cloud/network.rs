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

//! Networks and ports in the cloud layer.

use std::collections::HashSet;
use std::sync::Arc;

use super::super::network::{api, protocol};
use super::super::resource::{self, ListQuery};
use super::super::utils::Query;
use super::super::{Error, ErrorKind, Result, ResultExt};
use super::config::CloudOptions;
use super::normalize::{
    normalize_network, normalize_port, AddressNetworks, NormalizedNetwork, NormalizedPort,
};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

/// Networks with a special role in this cloud.
///
/// Discovered from the `networks` configuration and the networks visible to
/// the project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestingNetworks {
    /// Networks routing IPv4 outside of the cloud.
    pub external_ipv4: Vec<NormalizedNetwork>,
    /// Networks floating IPv4 addresses are allocated from.
    pub external_ipv4_floating: Vec<NormalizedNetwork>,
    /// Networks not routing IPv4 outside of the cloud.
    pub internal_ipv4: Vec<NormalizedNetwork>,
    /// Networks routing IPv6 outside of the cloud.
    pub external_ipv6: Vec<NormalizedNetwork>,
    /// Networks not routing IPv6 outside of the cloud.
    pub internal_ipv6: Vec<NormalizedNetwork>,
    /// Network floating IPs are attached to.
    pub nat_destination: Option<NormalizedNetwork>,
    /// Network floating IPs are allocated from.
    pub nat_source: Option<NormalizedNetwork>,
    /// Network new servers are plugged into.
    pub default_network: Option<NormalizedNetwork>,
}

/// Parameters of a new network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpec {
    /// Network description.
    pub description: Option<String>,
    /// Whether the network is shared between projects.
    pub shared: bool,
    /// Administrative state.
    pub admin_state_up: bool,
    /// Whether the network is external.
    pub external: bool,
    /// Project to create the network in (admin only).
    pub project_id: Option<String>,
    /// MTU of the network.
    pub mtu: Option<u32>,
    /// Provider network type, e.g. `vlan`.
    pub provider_network_type: Option<String>,
    /// Provider physical network.
    pub provider_physical_network: Option<String>,
}

impl Default for NetworkSpec {
    fn default() -> NetworkSpec {
        NetworkSpec {
            description: None,
            shared: false,
            admin_state_up: true,
            external: false,
            project_id: None,
            mtu: None,
            provider_network_type: None,
            provider_physical_network: None,
        }
    }
}

#[derive(Debug, Default)]
struct ConfiguredNames {
    external_ipv4: Vec<String>,
    internal_ipv4: Vec<String>,
    external_ipv6: Vec<String>,
    internal_ipv6: Vec<String>,
    nat_destination: Option<String>,
    nat_source: Option<String>,
    default_network: Option<String>,
}

impl ConfiguredNames {
    fn new(options: &CloudOptions) -> ConfiguredNames {
        let mut result = ConfiguredNames::default();
        for net in options.all_networks() {
            if net.routes_ipv4() {
                result.external_ipv4.push(net.name.clone());
            } else {
                result.internal_ipv4.push(net.name.clone());
            }
            if net.routes_ipv6() {
                result.external_ipv6.push(net.name.clone());
            } else {
                result.internal_ipv6.push(net.name.clone());
            }
            if net.nat_destination && result.nat_destination.is_none() {
                result.nat_destination = Some(net.name.clone());
            }
            if net.nat_source && result.nat_source.is_none() {
                result.nat_source = Some(net.name.clone());
            }
            if net.default_interface && result.default_network.is_none() {
                result.default_network = Some(net.name.clone());
            }
        }
        result
    }
}

fn listed(names: &[String], net: &NormalizedNetwork) -> bool {
    names.iter().any(|n| n == &net.name || n == &net.id)
}

fn is(name: &Option<String>, net: &NormalizedNetwork) -> bool {
    name.as_ref()
        .map(|n| n == &net.name || n == &net.id)
        .unwrap_or(false)
}

fn set_unique(
    target: &mut Option<NormalizedNetwork>,
    net: &NormalizedNetwork,
    role: &str,
) -> Result<()> {
    if target.is_some() {
        return Err(Error::new(
            ErrorKind::InvalidConfig,
            format!(
                "Multiple networks were found matching {} which is the network configured \
                 to be the {}. Configure this network by ID rather than by name.",
                net.name, role
            ),
        ));
    }
    *target = Some(net.clone());
    Ok(())
}

fn check_found(names: &[String], found: &[NormalizedNetwork], purpose: &str) -> Result<()> {
    for name in names {
        if !found.iter().any(|n| &n.name == name || &n.id == name) {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!(
                    "Network {} was provided for {} but it could not be found",
                    name, purpose
                ),
            ));
        }
    }
    Ok(())
}

fn check_configured(
    name: &Option<String>,
    found: &Option<NormalizedNetwork>,
    purpose: &str,
) -> Result<()> {
    match (name, found) {
        (Some(name), None) => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!(
                "Network {} was configured to be the {} but it could not be found",
                name, purpose
            ),
        )),
        _ => Ok(()),
    }
}

impl InterestingNetworks {
    /// Classify networks according to the options.
    ///
    /// `gateway_networks` contains IDs of networks with a subnet that has a
    /// gateway. When no NAT destination is configured, the first internal
    /// network among them becomes the NAT destination.
    ///
    /// Fails with `InvalidConfig` when a configured network is missing or
    /// ambiguous.
    pub fn discover(
        options: &CloudOptions,
        networks: &[NormalizedNetwork],
        gateway_networks: &HashSet<String>,
    ) -> Result<InterestingNetworks> {
        let names = ConfiguredNames::new(options);
        let mut result = InterestingNetworks::default();

        for net in networks {
            let physical = net.provider_physical_network.is_some();

            if listed(&names.external_ipv4, net)
                || ((net.external || physical) && !listed(&names.internal_ipv4, net))
            {
                result.external_ipv4.push(net.clone());
            }
            if listed(&names.internal_ipv4, net)
                || (!net.external && !physical && !listed(&names.external_ipv4, net))
            {
                result.internal_ipv4.push(net.clone());
            }

            if listed(&names.external_ipv6, net)
                || (net.external && !listed(&names.internal_ipv6, net))
            {
                result.external_ipv6.push(net.clone());
            }
            if listed(&names.internal_ipv6, net)
                || (!net.external && !listed(&names.external_ipv6, net))
            {
                result.internal_ipv6.push(net.clone());
            }

            if is(&names.nat_source, net) {
                set_unique(&mut result.nat_source, net, "NAT source")?;
                result.external_ipv4_floating.push(net.clone());
            } else if names.nat_source.is_none() && net.external {
                result.external_ipv4_floating.push(net.clone());
                if result.nat_source.is_none() {
                    result.nat_source = Some(net.clone());
                }
            }

            if is(&names.nat_destination, net) {
                set_unique(&mut result.nat_destination, net, "NAT destination")?;
            }

            if is(&names.default_network, net) {
                set_unique(&mut result.default_network, net, "default network interface")?;
            }
        }

        if names.nat_destination.is_none() {
            result.nat_destination = result
                .internal_ipv4
                .iter()
                .find(|net| gateway_networks.contains(&net.id))
                .cloned();
        }

        check_found(&names.external_ipv4, &result.external_ipv4, "external IPv4 access")?;
        check_found(&names.internal_ipv4, &result.internal_ipv4, "internal IPv4 access")?;
        check_found(&names.external_ipv6, &result.external_ipv6, "external IPv6 access")?;
        check_found(&names.internal_ipv6, &result.internal_ipv6, "internal IPv6 access")?;
        check_configured(
            &names.nat_destination,
            &result.nat_destination,
            "destination for inbound NAT",
        )?;
        check_configured(&names.nat_source, &result.nat_source, "source for inbound NAT")?;
        check_configured(
            &names.default_network,
            &result.default_network,
            "default network interface",
        )?;

        Ok(result)
    }

    /// Networks used to classify server addresses.
    pub fn address_networks(&self) -> AddressNetworks {
        let names = |nets: &[&NormalizedNetwork]| {
            nets.iter()
                .flat_map(|n| vec![n.name.clone(), n.id.clone()])
                .collect::<Vec<_>>()
        };
        let external = self
            .external_ipv4
            .iter()
            .chain(self.external_ipv6.iter())
            .collect::<Vec<_>>();
        let internal = self
            .nat_destination
            .iter()
            .chain(self.internal_ipv4.iter())
            .collect::<Vec<_>>();
        AddressNetworks {
            external: names(&external),
            internal: names(&internal),
        }
    }
}

impl Cloud {
    /// List networks.
    pub async fn list_networks(&self, filters: Option<&Filters>) -> Result<Vec<NormalizedNetwork>> {
        let networks = ListQuery::<protocol::Network>::new(&self.session, Query::new())
            .all()
            .await?
            .into_iter()
            .map(normalize_network)
            .collect();
        filter_list(networks, None, filters)
    }

    /// Search networks by name or ID.
    pub async fn search_networks(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedNetwork>> {
        filter_list(self.list_networks(None).await?, Some(name_or_id), filters)
    }

    /// Get a network by name or ID.
    pub async fn get_network(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedNetwork>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_network_by_id(name_or_id),
            self.search_networks(name_or_id, filters),
        )
        .await
    }

    /// Get a network by its ID.
    pub async fn get_network_by_id(&self, id: &str) -> Result<Option<NormalizedNetwork>> {
        Ok(resource::get::<protocol::Network>(&self.session, id)
            .await
            .if_not_found_then_none()?
            .map(normalize_network))
    }

    /// Create a network.
    pub async fn create_network(&self, name: &str, spec: NetworkSpec) -> Result<NormalizedNetwork> {
        let request = protocol::NetworkCreate {
            admin_state_up: Some(spec.admin_state_up),
            description: spec.description,
            external: if spec.external { Some(true) } else { None },
            mtu: spec.mtu,
            name: Some(name.into()),
            project_id: spec.project_id,
            provider_network_type: spec.provider_network_type,
            provider_physical_network: spec.provider_physical_network,
            shared: Some(spec.shared),
        };
        let network = api::create_network(&self.session, request).await?;
        self.reset_network_cache().await;
        Ok(normalize_network(network))
    }

    /// Delete a network by name or ID.
    pub async fn delete_network(&self, name_or_id: &str) -> Result<bool> {
        let network = match self.get_network(name_or_id, None).await? {
            Some(network) => network,
            None => {
                debug!("Network {} not found for deleting", name_or_id);
                return Ok(false);
            }
        };
        let deleted =
            resource::delete::<protocol::Network>(&self.session, &network.id, true).await?;
        self.reset_network_cache().await;
        Ok(deleted)
    }

    /// List ports.
    pub async fn list_ports(&self, filters: Option<&Filters>) -> Result<Vec<NormalizedPort>> {
        let ports = ListQuery::<protocol::Port>::new(&self.session, Query::new())
            .all()
            .await?
            .into_iter()
            .map(normalize_port)
            .collect();
        filter_list(ports, None, filters)
    }

    /// Search ports by name or ID.
    pub async fn search_ports(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedPort>> {
        filter_list(self.list_ports(None).await?, Some(name_or_id), filters)
    }

    /// Ports of a server (or any other device).
    pub(crate) async fn device_ports(&self, device_id: &str) -> Result<Vec<NormalizedPort>> {
        let mut query = Query::new();
        query.push_str("device_id", device_id);
        Ok(ListQuery::<protocol::Port>::new(&self.session, query)
            .all()
            .await?
            .into_iter()
            .map(normalize_port)
            .collect())
    }

    /// Networks with a special role, discovered once and cached.
    pub async fn interesting_networks(&self) -> Result<Arc<InterestingNetworks>> {
        self.networks
            .get_or_fetch(None, || self.discover_networks())
            .await
    }

    async fn discover_networks(&self) -> Result<Arc<InterestingNetworks>> {
        let networks = self.list_networks(None).await?;
        let configured = ConfiguredNames::new(&self.options);
        let gateway_networks = if configured.nat_destination.is_none() {
            let subnets = ListQuery::<protocol::Subnet>::new(&self.session, Query::new())
                .all()
                .await;
            match subnets {
                Ok(subnets) => subnets
                    .into_iter()
                    .filter(|s| s.gateway_ip.is_some())
                    .map(|s| s.network_id)
                    .collect(),
                Err(err) => {
                    warn!("Cannot list subnets to find a NAT destination: {}", err);
                    HashSet::new()
                }
            }
        } else {
            HashSet::new()
        };

        let result = InterestingNetworks::discover(&self.options, &networks, &gateway_networks)?;
        debug!(
            "Discovered networks: external IPv4 {:?}, internal IPv4 {:?}, NAT destination {:?}",
            result.external_ipv4.iter().map(|n| &n.name).collect::<Vec<_>>(),
            result.internal_ipv4.iter().map(|n| &n.name).collect::<Vec<_>>(),
            result.nat_destination.as_ref().map(|n| &n.name)
        );
        Ok(Arc::new(result))
    }

    /// Networks used to classify server addresses.
    ///
    /// Clouds without a usable Networking service get empty lists.
    pub(crate) async fn address_networks(&self) -> AddressNetworks {
        match self.interesting_networks().await {
            Ok(networks) => networks.address_networks(),
            Err(err) => {
                warn!("Cannot discover networks, addresses may be misclassified: {}", err);
                AddressNetworks::default()
            }
        }
    }

    pub(crate) async fn reset_network_cache(&self) {
        self.networks.reset().await;
    }

    /// Networks routing IPv4 or IPv6 outside of the cloud.
    pub async fn get_external_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        let networks = self.interesting_networks().await?;
        let mut result = networks.external_ipv4.clone();
        for net in &networks.external_ipv6 {
            if !result.iter().any(|n| n.id == net.id) {
                result.push(net.clone());
            }
        }
        Ok(result)
    }

    /// Networks not routing outside of the cloud.
    pub async fn get_internal_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        let networks = self.interesting_networks().await?;
        let mut result = networks.internal_ipv4.clone();
        for net in &networks.internal_ipv6 {
            if !result.iter().any(|n| n.id == net.id) {
                result.push(net.clone());
            }
        }
        Ok(result)
    }

    /// Networks routing IPv4 outside of the cloud.
    pub async fn get_external_ipv4_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.external_ipv4.clone())
    }

    /// Networks floating IPv4 addresses come from.
    pub async fn get_external_ipv4_floating_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        Ok(self
            .interesting_networks()
            .await?
            .external_ipv4_floating
            .clone())
    }

    /// Networks not routing IPv4 outside of the cloud.
    pub async fn get_internal_ipv4_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.internal_ipv4.clone())
    }

    /// Networks routing IPv6 outside of the cloud.
    pub async fn get_external_ipv6_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.external_ipv6.clone())
    }

    /// Networks not routing IPv6 outside of the cloud.
    pub async fn get_internal_ipv6_networks(&self) -> Result<Vec<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.internal_ipv6.clone())
    }

    /// Network floating IPs are attached to.
    pub async fn get_nat_destination(&self) -> Result<Option<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.nat_destination.clone())
    }

    /// Network floating IPs are allocated from.
    pub async fn get_nat_source(&self) -> Result<Option<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.nat_source.clone())
    }

    /// Network new servers are plugged into by default.
    pub async fn get_default_network(&self) -> Result<Option<NormalizedNetwork>> {
        Ok(self.interesting_networks().await?.default_network.clone())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use serde_json::json;

    use super::super::super::ErrorKind;
    use super::super::config::{CloudOptions, NetworkConfig};
    use super::super::normalize::{normalize_network, NormalizedNetwork};
    use super::InterestingNetworks;

    fn networks() -> Vec<NormalizedNetwork> {
        let raw = json!([
            {"id": "n-pub", "name": "public", "router:external": true},
            {"id": "n-priv", "name": "private", "router:external": false},
            {"id": "n-other", "name": "other"},
            {"id": "n-prov", "name": "provider", "provider:physical_network": "physnet1"}
        ]);
        serde_json::from_value::<Vec<_>>(raw)
            .unwrap()
            .into_iter()
            .map(normalize_network)
            .collect()
    }

    fn names(nets: &[NormalizedNetwork]) -> Vec<&str> {
        nets.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_discover_defaults() {
        let gateways = ["n-priv".to_string()].into_iter().collect::<HashSet<_>>();
        let result =
            InterestingNetworks::discover(&CloudOptions::default(), &networks(), &gateways)
                .unwrap();
        assert_eq!(names(&result.external_ipv4), vec!["public", "provider"]);
        assert_eq!(names(&result.internal_ipv4), vec!["private", "other"]);
        assert_eq!(names(&result.external_ipv6), vec!["public"]);
        assert_eq!(
            names(&result.internal_ipv6),
            vec!["private", "other", "provider"]
        );
        assert_eq!(names(&result.external_ipv4_floating), vec!["public"]);
        assert_eq!(result.nat_source.unwrap().name, "public");
        assert_eq!(result.nat_destination.unwrap().name, "private");
        assert!(result.default_network.is_none());
    }

    #[test]
    fn test_discover_configured() {
        let options = CloudOptions {
            networks: vec![
                NetworkConfig::external("other"),
                NetworkConfig {
                    default_interface: true,
                    ..NetworkConfig::internal("n-priv")
                },
            ],
            ..CloudOptions::default()
        };
        let result = InterestingNetworks::discover(&options, &networks(), &HashSet::new())
            .unwrap();
        assert_eq!(
            names(&result.external_ipv4),
            vec!["public", "other", "provider"]
        );
        assert_eq!(names(&result.internal_ipv4), vec!["private"]);
        assert_eq!(result.nat_destination.as_ref().unwrap().id, "n-priv");
        assert_eq!(result.default_network.as_ref().unwrap().id, "n-priv");

        let addresses = result.address_networks();
        assert!(addresses.external.contains(&"other".to_string()));
        assert_eq!(addresses.internal[0], "private");
    }

    #[test]
    fn test_discover_missing_network() {
        let options = CloudOptions {
            external_network: Some("nope".into()),
            ..CloudOptions::default()
        };
        let err =
            InterestingNetworks::discover(&options, &networks(), &HashSet::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_discover_ambiguous_nat_destination() {
        let mut nets = networks();
        let mut duplicate = nets[1].clone();
        duplicate.id = "n-priv-2".into();
        nets.push(duplicate);
        let options = CloudOptions {
            internal_network: Some("private".into()),
            ..CloudOptions::default()
        };
        let err = InterestingNetworks::discover(&options, &nets, &HashSet::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
