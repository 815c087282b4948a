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

//! Floating IPs in the cloud layer.
//!
//! Neutron and Nova-network are both supported, the list is cached for
//! `floating_ip_cache_ttl` seconds.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use super::super::common::iterate_timeout;
use super::super::compute::NovaFloatingIp;
use super::super::network::{api, protocol};
use super::super::resource::{self, ListQuery};
use super::super::utils::Query;
use super::super::{Error, ErrorKind, Result, ResultExt};
use super::compute::ServerSpec;
use super::config::{CloudOptions, FloatingIpSource};
use super::normalize::{
    normalize_neutron_floating_ip, normalize_nova_floating_ip, NormalizedFloatingIp,
    NormalizedPort, NormalizedServer,
};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

const DEFAULT_FLOATING_IP_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Parameters of a new floating IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingIpSpec {
    /// Network (Neutron) or pool (Nova) to allocate from.
    ///
    /// Defaults to the NAT source or the first floating network.
    pub network: Option<String>,
    /// Server (name or ID) to attach the IP to.
    pub server: Option<String>,
    /// Fixed address of the server to attach the IP to.
    pub fixed_address: Option<IpAddr>,
    /// Network whose port gets the IP.
    pub nat_destination: Option<String>,
    /// Port to attach the IP to (Neutron only).
    pub port: Option<String>,
    /// Wait for the IP to be attached.
    pub wait: bool,
    /// How long to wait.
    pub timeout: Duration,
}

impl Default for FloatingIpSpec {
    fn default() -> FloatingIpSpec {
        FloatingIpSpec {
            network: None,
            server: None,
            fixed_address: None,
            nat_destination: None,
            port: None,
            wait: false,
            timeout: DEFAULT_FLOATING_IP_TIMEOUT,
        }
    }
}

/// Whether the server has a private address but no public one.
fn wants_floating_ip(server: &NormalizedServer, options: &CloudOptions) -> bool {
    options.floating_ip_source != FloatingIpSource::Disabled
        && !options.private
        && server.public_v4.is_none()
        && server.private_v4.is_some()
}

/// Find the port and the fixed address to attach a floating IP to.
fn select_nat_port(
    server_id: &str,
    ports: &[NormalizedPort],
    nat_network: Option<&str>,
    fixed_address: Option<IpAddr>,
) -> Result<Option<(String, IpAddr)>> {
    let candidates = ports
        .iter()
        .filter(|p| nat_network.map(|n| p.network_id == n).unwrap_or(true))
        .collect::<Vec<_>>();

    if let Some(address) = fixed_address {
        return Ok(candidates
            .iter()
            .find(|p| p.fixed_ips.iter().any(|ip| ip.ip_address == address))
            .map(|p| (p.id.clone(), address)));
    }

    if nat_network.is_none() && candidates.len() > 1 {
        return Err(Error::new(
            ErrorKind::InvalidConfig,
            format!(
                "Multiple ports were found for server {} but none of the networks \
                 is a valid NAT destination. Configure nat_destination for one of \
                 the networks in clouds.yaml.",
                server_id
            ),
        ));
    }

    Ok(candidates.iter().find_map(|p| {
        p.fixed_ips
            .iter()
            .find(|ip| ip.ip_address.is_ipv4())
            .map(|ip| (p.id.clone(), ip.ip_address))
    }))
}

/// Delete a floating IP and verify that it is gone, repeating `retry` times.
///
/// Returns `false` if the first deletion finds nothing to delete.
async fn delete_until_gone<D, DF, E, EF>(
    id: &str,
    retry: u32,
    mut delete: D,
    mut exists: E,
) -> Result<bool>
where
    D: FnMut() -> DF,
    DF: Future<Output = Result<bool>>,
    E: FnMut() -> EF,
    EF: Future<Output = Result<bool>>,
{
    for attempt in 0..=retry {
        let deleted = delete().await?;
        if !deleted && attempt == 0 {
            debug!("Floating IP {} not found for deleting", id);
            return Ok(false);
        }
        if !exists().await? {
            info!("Deleted floating IP {}", id);
            return Ok(true);
        }
        warn!("Floating IP {} still exists after deletion, retrying", id);
    }
    Err(Error::new(
        ErrorKind::OperationFailed,
        format!(
            "Attempted to delete floating IP {} {} times but it still exists",
            id,
            retry + 1
        ),
    ))
}

impl Cloud {
    fn floating_ip_source(&self) -> Result<FloatingIpSource> {
        match self.options.floating_ip_source {
            FloatingIpSource::Disabled => Err(Error::new(
                ErrorKind::InvalidInput,
                "Floating IPs are disabled for this cloud",
            )),
            other => Ok(other),
        }
    }

    async fn fetch_floating_ips(&self) -> Result<Vec<NormalizedFloatingIp>> {
        Ok(match self.floating_ip_source()? {
            FloatingIpSource::Nova => self
                .compute()
                .nova_floating_ips()
                .await?
                .into_iter()
                .map(normalize_nova_floating_ip)
                .collect(),
            _ => ListQuery::<protocol::FloatingIp>::new(&self.session, Query::new())
                .all()
                .await?
                .into_iter()
                .map(normalize_neutron_floating_ip)
                .collect(),
        })
    }

    /// List floating IPs.
    ///
    /// Results are cached for `floating_ip_cache_ttl` seconds.
    pub async fn list_floating_ips(
        &self,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedFloatingIp>> {
        let ttl = self.options.floating_ip_cache_ttl();
        let items = self
            .floating_ips
            .get_or_fetch(Some(ttl), || self.fetch_floating_ips())
            .await?;
        filter_list(items, None, filters)
    }

    /// Search floating IPs by ID.
    pub async fn search_floating_ips(
        &self,
        id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedFloatingIp>> {
        filter_list(self.list_floating_ips(None).await?, Some(id), filters)
    }

    /// Get a floating IP by ID.
    pub async fn get_floating_ip(
        &self,
        id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedFloatingIp>> {
        get_entity(
            self.options.use_direct_get,
            id,
            filters,
            self.get_floating_ip_by_id(id),
            self.search_floating_ips(id, filters),
        )
        .await
    }

    /// Get a floating IP by ID, bypassing the cache.
    pub async fn get_floating_ip_by_id(&self, id: &str) -> Result<Option<NormalizedFloatingIp>> {
        Ok(match self.floating_ip_source()? {
            FloatingIpSource::Nova => resource::get::<NovaFloatingIp>(&self.session, id)
                .await
                .if_not_found_then_none()?
                .map(normalize_nova_floating_ip),
            _ => api::get_floating_ip(&self.session, id)
                .await
                .if_not_found_then_none()?
                .map(normalize_neutron_floating_ip),
        })
    }

    pub(crate) async fn reset_floating_ip_cache(&self) {
        self.floating_ips.reset().await;
    }

    async fn floating_network_id(&self, network: Option<&str>) -> Result<String> {
        if let Some(name) = network {
            return self
                .get_network(name, None)
                .await?
                .map(|n| n.id)
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::ResourceNotFound,
                        format!("Network {} not found", name),
                    )
                });
        }

        let networks = self.interesting_networks().await?;
        networks
            .nat_source
            .as_ref()
            .or_else(|| networks.external_ipv4_floating.first())
            .map(|n| n.id.clone())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ResourceNotFound,
                    "Unable to find an external network in this cloud \
                     which makes getting a floating IP impossible",
                )
            })
    }

    async fn nat_port(
        &self,
        server_id: &str,
        nat_destination: Option<&str>,
        fixed_address: Option<IpAddr>,
    ) -> Result<Option<(String, IpAddr)>> {
        let nat_network = match nat_destination {
            Some(name) => Some(
                self.get_network(name, None)
                    .await?
                    .ok_or_else(|| {
                        Error::new(
                            ErrorKind::ResourceNotFound,
                            format!("NAT destination network {} not found", name),
                        )
                    })?
                    .id,
            ),
            None => self.get_nat_destination().await?.map(|n| n.id),
        };
        let ports = self.device_ports(server_id).await?;
        select_nat_port(server_id, &ports, nat_network.as_deref(), fixed_address)
    }

    async fn required_server(&self, name_or_id: &str) -> Result<NormalizedServer> {
        self.get_server(name_or_id, None).await?.ok_or_else(|| {
            Error::new(
                ErrorKind::ResourceNotFound,
                format!("Server {} not found", name_or_id),
            )
        })
    }

    /// Find an unattached floating IP or allocate a new one.
    pub async fn available_floating_ip(
        &self,
        network: Option<&str>,
    ) -> Result<NormalizedFloatingIp> {
        let wanted_network = match self.floating_ip_source()? {
            FloatingIpSource::Nova => network.map(From::from),
            _ => Some(self.floating_network_id(network).await?),
        };

        let existing = self.list_floating_ips(None).await?.into_iter().find(|ip| {
            !ip.attached
                && (wanted_network.is_none() || ip.network.as_ref() == wanted_network.as_ref())
        });
        if let Some(ip) = existing {
            debug!("Reusing floating IP {}", ip.floating_ip_address);
            return Ok(ip);
        }

        self.create_floating_ip(FloatingIpSpec {
            network: wanted_network,
            ..FloatingIpSpec::default()
        })
        .await
    }

    /// Allocate a floating IP, optionally attaching it.
    pub async fn create_floating_ip(&self, spec: FloatingIpSpec) -> Result<NormalizedFloatingIp> {
        let server = match spec.server {
            Some(ref name) => Some(self.required_server(name).await?),
            None => None,
        };

        let created = match self.floating_ip_source()? {
            FloatingIpSource::Nova => {
                let ip = self
                    .compute()
                    .create_nova_floating_ip(spec.network.clone())
                    .await?;
                if let Some(ref server) = server {
                    self.compute()
                        .add_floating_ip_to_server(&server.id, ip.ip, spec.fixed_address)
                        .await?;
                }
                normalize_nova_floating_ip(ip)
            }
            _ => {
                let mut request = protocol::FloatingIpCreate {
                    floating_network_id: self
                        .floating_network_id(spec.network.as_deref())
                        .await?,
                    ..protocol::FloatingIpCreate::default()
                };
                if let Some(ref port) = spec.port {
                    request.port_id = Some(port.clone());
                    request.fixed_ip_address = spec.fixed_address;
                } else if let Some(ref server) = server {
                    let (port, fixed) = self
                        .nat_port(
                            &server.id,
                            spec.nat_destination.as_deref(),
                            spec.fixed_address,
                        )
                        .await?
                        .ok_or_else(|| {
                            Error::new(
                                ErrorKind::InvalidInput,
                                format!(
                                    "Unable to find a port for server {} to attach \
                                     a floating IP to",
                                    server.id
                                ),
                            )
                        })?;
                    request.port_id = Some(port);
                    request.fixed_ip_address = Some(fixed);
                }
                normalize_neutron_floating_ip(
                    api::create_floating_ip(&self.session, request).await?,
                )
            }
        };
        info!(
            "Allocated floating IP {} with ID {}",
            created.floating_ip_address, created.id
        );
        self.reset_floating_ip_cache().await;

        if spec.wait && (server.is_some() || spec.port.is_some()) {
            self.wait_for_floating_ip(&created.id, spec.timeout).await?;
            if let Some(ref server) = server {
                let _ = self
                    .wait_for_address(&server.id, created.floating_ip_address, spec.timeout)
                    .await?;
            }
        }

        Ok(created)
    }

    async fn wait_for_floating_ip(&self, id: &str, timeout: Duration) -> Result<()> {
        let mut iter = iterate_timeout(
            Some(timeout),
            format!("Timeout waiting for floating IP {} to become active", id),
            POLL_INTERVAL,
        );
        loop {
            let _ = iter.next().await?;
            match self.get_floating_ip_by_id(id).await? {
                Some(ip) if ip.status == "ACTIVE" => return Ok(()),
                Some(ip) => trace!("Floating IP {} is still {}", id, ip.status),
                None => {
                    return Err(Error::new(
                        ErrorKind::ResourceNotFound,
                        format!("Floating IP {} disappeared while waiting", id),
                    ))
                }
            }
        }
    }

    async fn wait_for_address(
        &self,
        server_id: &str,
        address: IpAddr,
        timeout: Duration,
    ) -> Result<NormalizedServer> {
        let mut iter = iterate_timeout(
            Some(timeout),
            format!(
                "Timeout waiting for floating IP {} to appear on server {}",
                address, server_id
            ),
            POLL_INTERVAL,
        );
        loop {
            let _ = iter.next().await?;
            let server = self.required_server(server_id).await?;
            if server.has_address(address) {
                return Ok(server);
            }
        }
    }

    /// Release a floating IP, retrying until it is gone.
    ///
    /// Returns `false` if the IP did not exist in the first place.
    pub async fn delete_floating_ip(&self, id: &str, retry: u32) -> Result<bool> {
        let source = self.floating_ip_source()?;
        delete_until_gone(
            id,
            retry,
            || async move {
                let deleted = match source {
                    FloatingIpSource::Nova => {
                        resource::delete::<NovaFloatingIp>(&self.session, id, true).await?
                    }
                    _ => resource::delete::<protocol::FloatingIp>(&self.session, id, true).await?,
                };
                self.reset_floating_ip_cache().await;
                Ok::<bool, Error>(deleted)
            },
            || async move {
                let found = self.get_floating_ip_by_id(id).await?;
                Ok::<bool, Error>(found.is_some())
            },
        )
        .await
    }

    /// Attach an existing floating IP to a server.
    pub async fn attach_ip_to_server(
        &self,
        server: &NormalizedServer,
        floating_ip: &NormalizedFloatingIp,
        fixed_address: Option<IpAddr>,
        nat_destination: Option<&str>,
        wait: bool,
        timeout: Duration,
    ) -> Result<NormalizedServer> {
        let address = floating_ip.floating_ip_address;
        if server.has_address(address) {
            debug!("Floating IP {} is already on server {}", address, server.id);
            return Ok(server.clone());
        }

        match self.floating_ip_source()? {
            FloatingIpSource::Nova => {
                self.compute()
                    .add_floating_ip_to_server(&server.id, address, fixed_address)
                    .await?
            }
            _ => {
                let (port, fixed) = self
                    .nat_port(&server.id, nat_destination, fixed_address)
                    .await?
                    .ok_or_else(|| {
                        Error::new(
                            ErrorKind::InvalidInput,
                            format!(
                                "Unable to find a port for server {} to attach floating IP {} to",
                                server.id, address
                            ),
                        )
                    })?;
                let update = protocol::FloatingIpUpdate {
                    port_id: Some(port),
                    fixed_ip_address: Some(fixed),
                };
                let _ = api::update_floating_ip(&self.session, &floating_ip.id, update).await?;
            }
        }
        info!("Attached floating IP {} to server {}", address, server.id);
        self.reset_floating_ip_cache().await;

        if wait {
            self.wait_for_address(&server.id, address, timeout).await
        } else {
            Ok(self
                .get_server_by_id(&server.id)
                .await?
                .unwrap_or_else(|| server.clone()))
        }
    }

    /// Detach a floating IP from a server.
    ///
    /// Returns `false` if the IP does not exist or is not attached.
    pub async fn detach_ip_from_server(&self, server_id: &str, floating_ip_id: &str) -> Result<bool> {
        let ip = match self.get_floating_ip_by_id(floating_ip_id).await? {
            Some(ip) if ip.attached => ip,
            _ => {
                debug!("Floating IP {} is not attached", floating_ip_id);
                return Ok(false);
            }
        };

        match self.floating_ip_source()? {
            FloatingIpSource::Nova => {
                if ip.port.as_deref() != Some(server_id) {
                    return Ok(false);
                }
                self.compute()
                    .remove_floating_ip_from_server(server_id, ip.floating_ip_address)
                    .await?
            }
            _ => {
                let _ = api::update_floating_ip(
                    &self.session,
                    floating_ip_id,
                    protocol::FloatingIpUpdate::default(),
                )
                .await?;
            }
        }
        info!(
            "Detached floating IP {} from server {}",
            ip.floating_ip_address, server_id
        );
        self.reset_floating_ip_cache().await;
        Ok(true)
    }

    /// Attach existing floating IPs (by address) to a server.
    pub async fn add_ip_list(
        &self,
        server: NormalizedServer,
        ips: &[IpAddr],
        fixed_address: Option<IpAddr>,
        wait: bool,
        timeout: Duration,
    ) -> Result<NormalizedServer> {
        let mut server = server;
        for address in ips {
            let floating_ip = self
                .list_floating_ips(None)
                .await?
                .into_iter()
                .find(|ip| &ip.floating_ip_address == address)
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::ResourceNotFound,
                        format!("Floating IP {} not found", address),
                    )
                })?;
            server = self
                .attach_ip_to_server(&server, &floating_ip, fixed_address, None, wait, timeout)
                .await?;
        }
        Ok(server)
    }

    /// Attach a floating IP from the default network to a server.
    ///
    /// With `reuse` an unattached IP is taken if there is one.
    pub async fn add_auto_ip(
        &self,
        server: NormalizedServer,
        wait: bool,
        timeout: Duration,
        reuse: bool,
    ) -> Result<NormalizedServer> {
        self.add_ip_from_pool(server, None, reuse, None, None, wait, timeout)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn add_ip_from_pool(
        &self,
        server: NormalizedServer,
        network: Option<&str>,
        reuse: bool,
        fixed_address: Option<IpAddr>,
        nat_destination: Option<&str>,
        wait: bool,
        timeout: Duration,
    ) -> Result<NormalizedServer> {
        if reuse {
            let floating_ip = self.available_floating_ip(network).await?;
            return self
                .attach_ip_to_server(
                    &server,
                    &floating_ip,
                    fixed_address,
                    nat_destination,
                    wait,
                    timeout,
                )
                .await;
        }

        let created = self
            .create_floating_ip(FloatingIpSpec {
                network: network.map(From::from),
                server: Some(server.id.clone()),
                fixed_address,
                nat_destination: nat_destination.map(From::from),
                port: None,
                wait,
                timeout,
            })
            .await?;
        debug!(
            "Floating IP {} created for server {}",
            created.floating_ip_address, server.id
        );
        Ok(self.get_server_by_id(&server.id).await?.unwrap_or(server))
    }

    /// Attach floating IPs to a server according to the server parameters.
    ///
    /// `ip_pool` takes precedence over `ips`, which take precedence over
    /// `auto_ip`.
    pub async fn add_ips_to_server(
        &self,
        server: NormalizedServer,
        spec: &ServerSpec,
    ) -> Result<NormalizedServer> {
        if let Some(ref pool) = spec.ip_pool {
            self.add_ip_from_pool(
                server,
                Some(pool),
                spec.reuse_ips,
                spec.fixed_address,
                spec.nat_destination.as_deref(),
                spec.wait,
                spec.timeout,
            )
            .await
        } else if !spec.ips.is_empty() {
            self.add_ip_list(server, &spec.ips, spec.fixed_address, spec.wait, spec.timeout)
                .await
        } else if spec.auto_ip
            && self
                .needs_floating_ip(&server, spec.nat_destination.as_deref())
                .await?
        {
            self.add_auto_ip(server, spec.wait, spec.timeout, spec.reuse_ips)
                .await
        } else {
            Ok(server)
        }
    }

    async fn needs_floating_ip(
        &self,
        server: &NormalizedServer,
        nat_destination: Option<&str>,
    ) -> Result<bool> {
        if !wants_floating_ip(server, &self.options) {
            return Ok(false);
        }
        if self.options.floating_ip_source == FloatingIpSource::Nova {
            return Ok(true);
        }
        if self
            .get_external_ipv4_floating_networks()
            .await?
            .is_empty()
        {
            debug!("No floating networks, server {} gets no floating IP", server.id);
            return Ok(false);
        }
        Ok(self
            .nat_port(&server.id, nat_destination, None)
            .await?
            .is_some())
    }

    /// Release all floating IPs that are not attached to anything.
    ///
    /// Returns the number of released IPs.
    pub async fn delete_unattached_floating_ips(&self, retry: u32) -> Result<usize> {
        self.reset_floating_ip_cache().await;
        let mut count = 0;
        for ip in self.list_floating_ips(None).await? {
            if !ip.attached && self.delete_floating_ip(&ip.id, retry).await? {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future;
    use serde_json::json;

    use super::super::super::{Error, ErrorKind};
    use super::super::config::{CloudOptions, FloatingIpSource};
    use super::super::normalize::{normalize_port, NormalizedPort, NormalizedServer};
    use super::{delete_until_gone, select_nat_port, wants_floating_ip};

    fn ports() -> Vec<NormalizedPort> {
        let raw = json!([
            {
                "id": "port-1",
                "network_id": "net-private",
                "mac_address": "fa:16:3e:00:00:01",
                "fixed_ips": [
                    {"ip_address": "fd00::5", "subnet_id": "sub-v6"},
                    {"ip_address": "10.0.0.5", "subnet_id": "sub-v4"}
                ]
            },
            {
                "id": "port-2",
                "network_id": "net-storage",
                "mac_address": "fa:16:3e:00:00:02",
                "fixed_ips": [
                    {"ip_address": "192.168.1.5", "subnet_id": "sub-storage"}
                ]
            }
        ]);
        serde_json::from_value::<Vec<_>>(raw)
            .unwrap()
            .into_iter()
            .map(normalize_port)
            .collect()
    }

    fn ip(value: &str) -> IpAddr {
        value.parse().unwrap()
    }

    #[test]
    fn test_select_nat_port_by_network() {
        let result = select_nat_port("srv", &ports(), Some("net-private"), None).unwrap();
        assert_eq!(result, Some(("port-1".to_string(), ip("10.0.0.5"))));
    }

    #[test]
    fn test_select_nat_port_by_fixed_address() {
        let result = select_nat_port("srv", &ports(), None, Some(ip("192.168.1.5"))).unwrap();
        assert_eq!(result, Some(("port-2".to_string(), ip("192.168.1.5"))));
        let result = select_nat_port("srv", &ports(), None, Some(ip("10.9.9.9"))).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_select_nat_port_ambiguous() {
        let err = select_nat_port("srv", &ports(), None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let single = ports().into_iter().take(1).collect::<Vec<_>>();
        let result = select_nat_port("srv", &single, None, None).unwrap();
        assert_eq!(result, Some(("port-1".to_string(), ip("10.0.0.5"))));
    }

    #[test]
    fn test_select_nat_port_unknown_network() {
        let result = select_nat_port("srv", &ports(), Some("net-other"), None).unwrap();
        assert!(result.is_none());
    }

    fn server(public: Option<&str>, private: Option<&str>) -> NormalizedServer {
        let raw = json!({
            "id": "srv",
            "name": "srv",
            "status": "ACTIVE",
            "flavor": {"original_name": "m1.tiny"},
            "addresses": {}
        });
        let mut server = super::super::normalize::normalize_server(
            serde_json::from_value(raw).unwrap(),
            &Default::default(),
            &CloudOptions::default(),
        );
        server.public_v4 = public.map(|x| x.parse().unwrap());
        server.private_v4 = private.map(|x| x.parse().unwrap());
        server
    }

    #[test]
    fn test_wants_floating_ip() {
        let options = CloudOptions::default();
        assert!(wants_floating_ip(&server(None, Some("10.0.0.5")), &options));
        assert!(!wants_floating_ip(
            &server(Some("203.0.113.5"), Some("10.0.0.5")),
            &options
        ));
        assert!(!wants_floating_ip(&server(None, None), &options));

        let private = CloudOptions {
            private: true,
            ..CloudOptions::default()
        };
        assert!(!wants_floating_ip(&server(None, Some("10.0.0.5")), &private));

        let disabled = CloudOptions {
            floating_ip_source: FloatingIpSource::Disabled,
            ..CloudOptions::default()
        };
        assert!(!wants_floating_ip(&server(None, Some("10.0.0.5")), &disabled));
    }

    #[tokio::test]
    async fn test_delete_until_gone_first_try() {
        let deletes = AtomicUsize::new(0);
        let result = delete_until_gone(
            "fip",
            3,
            || async {
                let _ = deletes.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, Error>(true)
            },
            || future::ready(Ok(false)),
        )
        .await
        .unwrap();
        assert!(result);
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_until_gone_missing() {
        let checks = AtomicUsize::new(0);
        let result = delete_until_gone(
            "fip",
            3,
            || future::ready(Ok(false)),
            || async {
                let _ = checks.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, Error>(true)
            },
        )
        .await
        .unwrap();
        assert!(!result);
        assert_eq!(checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_until_gone_retries() {
        let deletes = AtomicUsize::new(0);
        let checks = AtomicUsize::new(0);
        let result = delete_until_gone(
            "fip",
            3,
            || async {
                let _ = deletes.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, Error>(true)
            },
            || async { Ok::<bool, Error>(checks.fetch_add(1, Ordering::SeqCst) < 2) },
        )
        .await
        .unwrap();
        assert!(result);
        assert_eq!(deletes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_until_gone_gives_up() {
        let deletes = AtomicUsize::new(0);
        let err = delete_until_gone(
            "fip",
            2,
            || async {
                let _ = deletes.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, Error>(true)
            },
            || future::ready(Ok(true)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationFailed);
        assert_eq!(deletes.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("3 times"));
    }
}
