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

//! Servers, flavors and key pairs in the cloud layer.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use futures::future;

use super::super::common::iterate_timeout;
use super::super::compute::{api, protocol, ServerStatus};
use super::super::resource::{self, ListQuery};
use super::super::utils::Query;
use super::super::{Error, ErrorKind, Result, ResultExt};
use super::normalize::{
    normalize_flavor, normalize_keypair, normalize_server, NormalizedFlavor, NormalizedKeyPair,
    NormalizedServer,
};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

/// Default time to wait for servers.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(180);

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Parameters of a new server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    /// Image name or ID.
    pub image: Option<String>,
    /// Key pair to inject.
    pub key_name: Option<String>,
    /// Networks (names or IDs) to plug the server into.
    pub networks: Vec<String>,
    /// Existing ports to plug the server into.
    pub ports: Vec<String>,
    /// Security groups (names or IDs).
    pub security_groups: Vec<String>,
    /// Server metadata.
    pub metadata: HashMap<String, String>,
    /// User data, encoded automatically.
    pub user_data: Option<String>,
    /// Availability zone.
    pub availability_zone: Option<String>,
    /// Whether to use a config drive.
    pub config_drive: Option<bool>,
    /// Boot from a new volume created from the image.
    pub boot_from_volume: bool,
    /// Size of the boot volume in GiB.
    pub volume_size: u32,
    /// Delete the boot volume with the server.
    pub terminate_volume: bool,
    /// Attach a floating IP if the server has no public address.
    pub auto_ip: bool,
    /// Existing floating IPs to attach.
    pub ips: Vec<IpAddr>,
    /// Network to allocate a floating IP from.
    pub ip_pool: Option<String>,
    /// Reuse unattached floating IPs instead of allocating new ones.
    pub reuse_ips: bool,
    /// Fixed address to attach floating IPs to.
    pub fixed_address: Option<IpAddr>,
    /// Network whose port gets the floating IP.
    pub nat_destination: Option<String>,
    /// Wait for the server to become active.
    pub wait: bool,
    /// How long to wait.
    pub timeout: Duration,
}

impl Default for ServerSpec {
    fn default() -> ServerSpec {
        ServerSpec {
            image: None,
            key_name: None,
            networks: Vec::new(),
            ports: Vec::new(),
            security_groups: Vec::new(),
            metadata: HashMap::new(),
            user_data: None,
            availability_zone: None,
            config_drive: None,
            boot_from_volume: false,
            volume_size: 50,
            terminate_volume: false,
            auto_ip: true,
            ips: Vec::new(),
            ip_pool: None,
            reuse_ips: true,
            fixed_address: None,
            nat_destination: None,
            wait: false,
            timeout: DEFAULT_SERVER_TIMEOUT,
        }
    }
}

/// Pick the smallest flavor with at least `ram` MiB.
///
/// Flavors must be sorted by RAM.
fn flavor_by_ram<'f>(
    flavors: &'f [NormalizedFlavor],
    ram: u64,
    include: Option<&str>,
) -> Option<&'f NormalizedFlavor> {
    flavors.iter().find(|f| {
        f.ram >= ram && include.map(|inc| f.name.contains(inc)).unwrap_or(true)
    })
}

impl Cloud {
    pub(crate) async fn normalize_servers(
        &self,
        servers: Vec<protocol::Server>,
    ) -> Vec<NormalizedServer> {
        let networks = self.address_networks().await;
        servers
            .into_iter()
            .map(|s| normalize_server(s, &networks, &self.options))
            .collect()
    }

    /// List servers.
    pub async fn list_servers(&self, filters: Option<&Filters>) -> Result<Vec<NormalizedServer>> {
        let servers = ListQuery::<protocol::Server>::new(&self.session, Query::new())
            .at(&["servers", "detail"])
            .all()
            .await?;
        filter_list(self.normalize_servers(servers).await, None, filters)
    }

    /// Search servers by name or ID.
    pub async fn search_servers(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedServer>> {
        filter_list(self.list_servers(None).await?, Some(name_or_id), filters)
    }

    /// Get a server by name or ID.
    pub async fn get_server(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedServer>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_server_by_id(name_or_id),
            self.search_servers(name_or_id, filters),
        )
        .await
    }

    /// Get a server by its ID.
    pub async fn get_server_by_id(&self, id: &str) -> Result<Option<NormalizedServer>> {
        match api::get_server_by_id(&self.session, id)
            .await
            .if_not_found_then_none()?
        {
            Some(server) => {
                let networks = self.address_networks().await;
                Ok(Some(normalize_server(server, &networks, &self.options)))
            }
            None => Ok(None),
        }
    }

    /// Create a server.
    ///
    /// Without explicit networks or ports the server is plugged into the
    /// default network, if one is configured. When `spec.wait` is set, this
    /// call waits for the server to become active and attaches floating IPs.
    pub async fn create_server(
        &self,
        name: &str,
        flavor: &str,
        spec: ServerSpec,
    ) -> Result<NormalizedServer> {
        let mut new_server = self.compute().new_server(name, flavor);
        if let Some(ref image) = spec.image {
            if spec.boot_from_volume {
                new_server.set_boot_volume_from_image(spec.volume_size, spec.terminate_volume);
            }
            new_server.set_image(image);
        } else if spec.boot_from_volume {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "An image is required to boot from volume",
            ));
        }
        if let Some(ref key_name) = spec.key_name {
            new_server.set_keypair(key_name);
        }
        for network in &spec.networks {
            new_server.add_network(network);
        }
        for port in &spec.ports {
            new_server.add_port(port);
        }
        if spec.networks.is_empty() && spec.ports.is_empty() {
            match self.get_default_network().await {
                Ok(Some(network)) => new_server.add_network(network.id),
                Ok(None) => (),
                Err(err) => warn!("Cannot find the default network: {}", err),
            }
        }
        for group in &spec.security_groups {
            new_server.add_security_group(group);
        }
        for (key, value) in &spec.metadata {
            let _ = new_server.metadata().insert(key.clone(), value.clone());
        }
        if let Some(ref user_data) = spec.user_data {
            new_server.set_user_data(user_data);
        }
        if let Some(ref zone) = spec.availability_zone {
            new_server.set_availability_zone(zone.clone());
        }
        if let Some(config_drive) = spec.config_drive {
            new_server.set_config_drive(config_drive);
        }

        let waiter = new_server.create().await?;
        let server_id = waiter.current_state().id().clone();
        info!("Requested server {} with ID {}", name, server_id);
        if !spec.wait {
            let networks = self.address_networks().await;
            return Ok(normalize_server(
                waiter.current_state().inner().clone(),
                &networks,
                &self.options,
            ));
        }

        let server = waiter.wait_for(spec.timeout).await?;
        let networks = self.address_networks().await;
        let normalized = normalize_server(server.inner().clone(), &networks, &self.options);
        self.add_ips_to_server(normalized, &spec).await
    }

    /// Wait for a server to become active and attach floating IPs to it.
    pub async fn wait_for_server(
        &self,
        server: NormalizedServer,
        spec: &ServerSpec,
    ) -> Result<NormalizedServer> {
        let mut iter = iterate_timeout(
            Some(spec.timeout),
            format!("Timeout waiting for server {} to become active", server.id),
            POLL_INTERVAL,
        );
        loop {
            let _ = iter.next().await?;
            let current = match self.get_server_by_id(&server.id).await? {
                Some(current) => current,
                None => {
                    return Err(Error::new(
                        ErrorKind::ResourceNotFound,
                        format!("Server {} disappeared while waiting", server.id),
                    ))
                }
            };
            match current.status {
                ServerStatus::Active => {
                    debug!("Server {} is active", current.id);
                    return self.add_ips_to_server(current, spec).await;
                }
                ServerStatus::Error => {
                    return Err(Error::new(
                        ErrorKind::OperationFailed,
                        format!("Server {} reached ERROR state", current.id),
                    ))
                }
                other => trace!("Server {} is still {}", current.id, other),
            }
        }
    }

    /// Delete a server by name or ID.
    ///
    /// With `delete_ips` its floating IPs are released. With `wait` this call
    /// returns after the server disappears.
    pub async fn delete_server(
        &self,
        name_or_id: &str,
        wait: bool,
        timeout: Duration,
        delete_ips: bool,
        delete_ip_retry: u32,
    ) -> Result<bool> {
        let server = match self.get_server(name_or_id, None).await? {
            Some(server) => server,
            None => {
                debug!("Server {} not found for deleting", name_or_id);
                return Ok(false);
            }
        };

        if delete_ips && server.has_floating_ip() {
            for address in server.floating_ips() {
                let found = self
                    .list_floating_ips(None)
                    .await?
                    .into_iter()
                    .find(|ip| ip.floating_ip_address == address);
                if let Some(ip) = found {
                    if !self.delete_floating_ip(&ip.id, delete_ip_retry).await? {
                        warn!("Floating IP {} of server {} vanished", address, server.id);
                    }
                }
            }
        }

        if !resource::delete::<protocol::Server>(&self.session, &server.id, true).await? {
            return Ok(false);
        }
        info!("Deleting server {}", server.id);

        if wait {
            let mut iter = iterate_timeout(
                Some(timeout),
                format!("Timeout waiting for server {} to be deleted", server.id),
                POLL_INTERVAL,
            );
            loop {
                let _ = iter.next().await?;
                if self.get_server_by_id(&server.id).await?.is_none() {
                    break;
                }
            }
        }

        if server.has_floating_ip() {
            self.reset_floating_ip_cache().await;
        }
        Ok(true)
    }

    /// List flavors, optionally fetching their extra specs.
    pub async fn list_flavors(
        &self,
        get_extra: bool,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedFlavor>> {
        let mut flavors = ListQuery::<protocol::Flavor>::new(&self.session, Query::new())
            .at(&["flavors", "detail"])
            .all()
            .await?;
        if get_extra {
            let missing = flavors
                .iter()
                .filter(|f| f.extra_specs.is_none())
                .map(|f| api::get_extra_specs_by_flavor_id(&self.session, &f.id))
                .collect::<Vec<_>>();
            let specs = future::join_all(missing).await;
            let mut specs = specs.into_iter();
            for flavor in flavors.iter_mut().filter(|f| f.extra_specs.is_none()) {
                match specs.next() {
                    Some(Ok(value)) => flavor.extra_specs = Some(value),
                    Some(Err(err)) => {
                        debug!("Cannot fetch extra specs of flavor {}: {}", flavor.id, err)
                    }
                    None => break,
                }
            }
        }
        filter_list(
            flavors.into_iter().map(normalize_flavor).collect(),
            None,
            filters,
        )
    }

    /// Search flavors by name or ID.
    pub async fn search_flavors(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedFlavor>> {
        filter_list(
            self.list_flavors(false, None).await?,
            Some(name_or_id),
            filters,
        )
    }

    /// Get a flavor by name or ID.
    pub async fn get_flavor(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedFlavor>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_flavor_by_id(name_or_id),
            self.search_flavors(name_or_id, filters),
        )
        .await
    }

    async fn get_flavor_by_id(&self, id: &str) -> Result<Option<NormalizedFlavor>> {
        Ok(resource::get::<protocol::Flavor>(&self.session, id)
            .await
            .if_not_found_then_none()?
            .map(normalize_flavor))
    }

    /// Smallest flavor with at least `ram` MiB whose name contains `include`.
    pub async fn get_flavor_by_ram(
        &self,
        ram: u64,
        include: Option<&str>,
    ) -> Result<NormalizedFlavor> {
        let mut flavors = self.list_flavors(false, None).await?;
        flavors.sort_by_key(|f| f.ram);
        flavor_by_ram(&flavors, ram, include)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ResourceNotFound,
                    format!(
                        "Could not find a flavor with {} and '{}'",
                        ram,
                        include.unwrap_or_default()
                    ),
                )
            })
    }

    /// List key pairs.
    pub async fn list_keypairs(&self, filters: Option<&Filters>) -> Result<Vec<NormalizedKeyPair>> {
        let keypairs = api::list_keypairs(&self.session, &Query::new()).await?;
        filter_list(
            keypairs.into_iter().map(normalize_keypair).collect(),
            None,
            filters,
        )
    }

    /// Search key pairs by name.
    pub async fn search_keypairs(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedKeyPair>> {
        filter_list(self.list_keypairs(None).await?, Some(name_or_id), filters)
    }

    /// Get a key pair by name.
    pub async fn get_keypair(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedKeyPair>> {
        get_entity(
            false,
            name_or_id,
            filters,
            future::ready(Ok(None)),
            self.search_keypairs(name_or_id, filters),
        )
        .await
    }

    /// Create a key pair.
    ///
    /// Without a public key a new pair is generated and the private key is
    /// returned in the result.
    pub async fn create_keypair(
        &self,
        name: &str,
        public_key: Option<&str>,
    ) -> Result<NormalizedKeyPair> {
        let mut request = protocol::KeyPairCreate::new(name.into());
        request.public_key = public_key.map(From::from);
        let keypair = api::create_keypair(&self.session, request).await?;
        Ok(normalize_keypair(keypair))
    }

    /// Delete a key pair by name.
    pub async fn delete_keypair(&self, name: &str) -> Result<bool> {
        let deleted = resource::delete::<protocol::KeyPair>(&self.session, name, true).await?;
        if !deleted {
            debug!("Key pair {} not found for deleting", name);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::super::normalize::NormalizedFlavor;
    use super::{flavor_by_ram, ServerSpec, DEFAULT_SERVER_TIMEOUT};

    fn flavor(name: &str, ram: u64) -> NormalizedFlavor {
        NormalizedFlavor {
            id: format!("id-{}", name),
            name: name.into(),
            description: None,
            ram,
            vcpus: 1,
            disk: 10,
            ephemeral: 0,
            swap: 0,
            rxtx_factor: 1.0,
            is_public: true,
            is_disabled: false,
            extra_specs: HashMap::new(),
        }
    }

    #[test]
    fn test_flavor_by_ram() {
        let flavors = vec![
            flavor("m1.tiny", 512),
            flavor("m1.small", 2048),
            flavor("perf.small", 2048),
            flavor("m1.large", 8192),
        ];
        assert_eq!(
            flavor_by_ram(&flavors, 1024, None).unwrap().name,
            "m1.small"
        );
        assert_eq!(
            flavor_by_ram(&flavors, 1024, Some("perf")).unwrap().name,
            "perf.small"
        );
        assert_eq!(flavor_by_ram(&flavors, 512, None).unwrap().name, "m1.tiny");
        assert!(flavor_by_ram(&flavors, 16384, None).is_none());
        assert!(flavor_by_ram(&flavors, 512, Some("gpu")).is_none());
    }

    #[test]
    fn test_server_spec_defaults() {
        let spec = ServerSpec::default();
        assert!(spec.auto_ip);
        assert!(spec.reuse_ips);
        assert!(!spec.wait);
        assert_eq!(spec.timeout, DEFAULT_SERVER_TIMEOUT);
        assert!(spec.networks.is_empty());
    }
}
