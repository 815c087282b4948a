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

//! Server management via Compute API.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use futures::stream::{Stream, TryStreamExt};

use super::super::common::{
    iterate_timeout, DeletionWaiter, FlavorRef, ImageRef, KeyPairRef, NetworkRef, PortRef,
    Refresh, ResourceIterator, ResourceQuery, SecurityGroupRef,
};
use super::super::utils::Query;
use super::super::{Error, ErrorKind, Result, Session, Sort};
use super::{api, protocol};

/// Default time to wait for a server to reach a status.
const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(180);

/// Delay between status checks.
const SERVER_POLL_DELAY: Duration = Duration::from_secs(2);

/// A query to server list.
#[derive(Clone, Debug)]
pub struct ServerQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
    sort: Vec<String>,
}

/// Structure representing a single server.
#[derive(Clone, Debug)]
pub struct Server {
    session: Session,
    inner: protocol::Server,
    dirty: HashSet<&'static str>,
}

/// A virtual NIC of a new server.
#[derive(Clone, Debug)]
pub enum ServerNIC {
    /// A NIC from the given network.
    FromNetwork(NetworkRef),
    /// A NIC with the given port.
    WithPort(PortRef),
    /// A NIC with the given fixed IP from the given network.
    WithFixedIp {
        /// Network to create the port on.
        network: NetworkRef,
        /// Requested IP address.
        ip: IpAddr,
    },
}

/// A request to create a server.
#[derive(Clone, Debug)]
pub struct NewServer {
    session: Session,
    flavor: FlavorRef,
    image: Option<ImageRef>,
    keypair: Option<KeyPairRef>,
    nics: Vec<ServerNIC>,
    security_groups: Vec<SecurityGroupRef>,
    user_data: Option<String>,
    inner: protocol::ServerCreate,
}

/// Waiter for server status to change.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless you call wait()"]
pub struct ServerStatusWaiter<'server> {
    server: &'server mut Server,
    target: protocol::ServerStatus,
}

/// Waiter for a server to be created.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless you call wait()"]
pub struct ServerCreationWaiter {
    server: Server,
}

impl Display for Server {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.inner.name, self.inner.id)
    }
}

impl Server {
    /// Create a Server object from its ID or name.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Server> {
        let inner = api::get_server(&session, id).await?;
        Ok(Server::new(session, inner))
    }

    pub(crate) fn new(session: Session, inner: protocol::Server) -> Server {
        Server {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    /// Raw server representation.
    pub(crate) fn inner(&self) -> &protocol::Server {
        &self.inner
    }

    transparent_property! {
        #[doc = "IPv4 address to access the server (if provided)."]
        access_ipv4: Option<Ipv4Addr>
    }

    update_field! {
        #[doc = "Update the IPv4 address to access the server."]
        set_access_ipv4, with_access_ipv4 -> access_ipv4: optional Ipv4Addr
    }

    transparent_property! {
        #[doc = "IPv6 address to access the server (if provided)."]
        access_ipv6: Option<Ipv6Addr>
    }

    update_field! {
        #[doc = "Update the IPv6 address to access the server."]
        set_access_ipv6, with_access_ipv6 -> access_ipv6: optional Ipv6Addr
    }

    transparent_property! {
        #[doc = "Addresses of the server, grouped by network name."]
        addresses: ref HashMap<String, Vec<protocol::ServerAddress>>
    }

    transparent_property! {
        #[doc = "Availability zone."]
        availability_zone: ref Option<String>
    }

    transparent_property! {
        #[doc = "Creation date and time."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Server description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Flavor information used to create this server."]
        flavor: ref protocol::ServerFlavor
    }

    transparent_property! {
        #[doc = "Whether the server was created with a config drive."]
        has_config_drive: bool
    }

    transparent_property! {
        #[doc = "Server unique ID."]
        id: ref String
    }

    /// Find a floating IP, if it exists.
    ///
    /// If multiple floating IPs exist, the first is returned.
    pub fn floating_ip(&self) -> Option<IpAddr> {
        self.inner
            .addresses
            .values()
            .flat_map(|l| l.iter())
            .filter(|a| a.addr_type == Some(protocol::AddressType::Floating))
            .map(|a| a.addr)
            .next()
    }

    /// ID of the image used to create this server (if any).
    pub fn image_id(&self) -> Option<&String> {
        self.inner.image.as_ref().map(|r| &r.id)
    }

    transparent_property! {
        #[doc = "Name of a key pair used with this server (if any)."]
        key_pair_name: ref Option<String>
    }

    transparent_property! {
        #[doc = "Server name."]
        name: ref String
    }

    update_field! {
        #[doc = "Update the server name."]
        set_name, with_name -> name: String
    }

    transparent_property! {
        #[doc = "Metadata associated with the server."]
        metadata: ref HashMap<String, String>
    }

    transparent_property! {
        #[doc = "Server power state."]
        power_state: protocol::ServerPowerState
    }

    transparent_property! {
        #[doc = "Server status."]
        status: protocol::ServerStatus
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Names of security groups of the server.
    pub fn security_groups(&self) -> Vec<&str> {
        self.inner
            .security_groups
            .iter()
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Add a security group to the server.
    pub async fn add_security_group<G: Into<SecurityGroupRef>>(&mut self, group: G) -> Result<()> {
        let group = group.into();
        api::add_security_group(&self.session, &self.inner.id, &group).await?;
        self.refresh().await
    }

    /// Remove a security group from the server.
    pub async fn remove_security_group<G: Into<SecurityGroupRef>>(
        &mut self,
        group: G,
    ) -> Result<()> {
        let group = group.into();
        api::remove_security_group(&self.session, &self.inner.id, &group).await?;
        self.refresh().await
    }

    /// Delete the server.
    pub async fn delete(self) -> Result<DeletionWaiter<Server>> {
        api::delete_server(&self.session, &self.inner.id).await?;
        Ok(DeletionWaiter::new(
            self,
            DEFAULT_SERVER_TIMEOUT,
            SERVER_POLL_DELAY,
        ))
    }

    /// Reboot the server.
    pub async fn reboot(
        &mut self,
        reboot_type: protocol::RebootType,
    ) -> Result<ServerStatusWaiter<'_>> {
        api::reboot_server(&self.session, &self.inner.id, reboot_type).await?;
        Ok(ServerStatusWaiter {
            server: self,
            target: protocol::ServerStatus::Active,
        })
    }

    /// Start the server, optionally wait for it to be active.
    pub async fn start(&mut self) -> Result<ServerStatusWaiter<'_>> {
        api::server_simple_action(&self.session, &self.inner.id, "os-start").await?;
        Ok(ServerStatusWaiter {
            server: self,
            target: protocol::ServerStatus::Active,
        })
    }

    /// Stop the server, optionally wait for it to be powered off.
    pub async fn stop(&mut self) -> Result<ServerStatusWaiter<'_>> {
        api::server_simple_action(&self.session, &self.inner.id, "os-stop").await?;
        Ok(ServerStatusWaiter {
            server: self,
            target: protocol::ServerStatus::ShutOff,
        })
    }

    /// Wait for the server to reach the given status.
    pub fn wait_for_status(&mut self, target: protocol::ServerStatus) -> ServerStatusWaiter<'_> {
        ServerStatusWaiter {
            server: self,
            target,
        }
    }

    /// Whether the server is modified.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the server.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::ServerUpdate::default();
        save_fields! {
            self -> update: name
        };
        save_option_fields! {
            self -> update: access_ipv4 access_ipv6 description
        };
        if update.is_empty() {
            return Ok(());
        }
        self.inner = api::update_server(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }
}

#[async_trait]
impl Refresh for Server {
    /// Refresh the server.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_server_by_id(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl<'server> ServerStatusWaiter<'server> {
    /// Current state of the server.
    pub fn current_state(&self) -> &Server {
        self.server
    }

    /// Wait for the default amount of time.
    pub async fn wait(self) -> Result<()> {
        self.wait_for(DEFAULT_SERVER_TIMEOUT).await
    }

    /// Wait for the given amount of time.
    ///
    /// Fails with `OperationFailed` if the server goes into the ERROR state.
    pub async fn wait_for(self, timeout: Duration) -> Result<()> {
        let target = self.target;
        let server = self.server;
        let mut attempts = iterate_timeout(
            Some(timeout),
            format!(
                "Timeout waiting for server {} to reach state {}",
                server.inner.id, target
            ),
            SERVER_POLL_DELAY,
        );
        loop {
            let _ = attempts.next().await?;
            server.refresh().await?;
            check_server_status(server, target)?;
            if server.inner.status == target {
                debug!("Server {} reached state {}", server.inner.id, target);
                return Ok(());
            }
            trace!(
                "Still waiting for server {} to get to state {}, current is {}",
                server.inner.id,
                target,
                server.inner.status
            );
        }
    }
}

fn check_server_status(server: &Server, target: protocol::ServerStatus) -> Result<()> {
    if server.inner.status == protocol::ServerStatus::Error
        && target != protocol::ServerStatus::Error
    {
        debug!("Server {} got into ERROR state", server.inner.id);
        Err(Error::new(
            ErrorKind::OperationFailed,
            format!("Server {} got into ERROR state", server.inner.id),
        ))
    } else {
        Ok(())
    }
}

impl ServerCreationWaiter {
    /// Current state of the server.
    pub fn current_state(&self) -> &Server {
        &self.server
    }

    /// Wait for the default amount of time.
    pub async fn wait(self) -> Result<Server> {
        self.wait_for(DEFAULT_SERVER_TIMEOUT).await
    }

    /// Wait for the given amount of time.
    pub async fn wait_for(mut self, timeout: Duration) -> Result<Server> {
        self.server
            .wait_for_status(protocol::ServerStatus::Active)
            .wait_for(timeout)
            .await?;
        Ok(self.server)
    }

    /// Do not wait for the server to become active.
    pub fn into_server(self) -> Server {
        self.server
    }
}

impl ServerQuery {
    pub(crate) fn new(session: Session) -> ServerQuery {
        ServerQuery {
            session,
            query: Query::new(),
            can_paginate: true,
            sort: Vec::new(),
        }
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<protocol::ServerSortKey>) -> Self {
        let (field, direction) = sort.into();
        self.query.push_str("sort_key", field);
        self.sort.push(direction.to_string());
        self
    }

    /// Add marker to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_marker<T: Into<String>>(mut self, marker: T) -> Self {
        self.can_paginate = false;
        self.query.push_str("marker", marker);
        self
    }

    /// Add limit to the request.
    ///
    /// Using this disables automatic pagination.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.can_paginate = false;
        self.query.push("limit", limit);
        self
    }

    /// Filter by flavor.
    pub fn with_flavor<T: Into<FlavorRef>>(mut self, value: T) -> Self {
        let value: FlavorRef = value.into();
        self.query.push_str("flavor", value);
        self
    }

    /// Filter by image.
    pub fn with_image<T: Into<ImageRef>>(mut self, value: T) -> Self {
        let value: ImageRef = value.into();
        self.query.push_str("image", value);
        self
    }

    /// List servers of all projects (requires admin rights).
    pub fn with_all_projects(mut self) -> Self {
        self.query.push("all_tenants", true);
        self
    }

    query_filter! {
        #[doc = "Filter by IPv4 address that should be used to access the server."]
        set_access_ip_v4, with_access_ipv4 -> access_ip_v4: Ipv4Addr
    }

    query_filter! {
        #[doc = "Filter by availability zone."]
        set_availability_zone, with_availability_zone -> availability_zone
    }

    query_filter! {
        #[doc = "Filter by host name (requires admin rights)."]
        set_host, with_host -> host
    }

    query_filter! {
        #[doc = "Filter by server name (a database regular expression)."]
        set_name, with_name -> name
    }

    query_filter! {
        #[doc = "Filter by project ID."]
        set_project_id, with_project_id -> project_id
    }

    query_filter! {
        #[doc = "Filter by server status."]
        set_status, with_status -> status: protocol::ServerStatus
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Returns a `TryStream`, which is a stream with each `next`
    /// call returning a `Result`.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Server>> {
        if !self.sort.is_empty() {
            self.query.push_str("sort_dir", self.sort.join(","));
        }
        debug!("Fetching servers with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    pub async fn all(self) -> Result<Vec<Server>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Server> {
        debug!("Fetching one server with {:?}", self.query);
        if self.can_paginate {
            // We need only one result. We fetch maximum two to be able
            // to check if the query yields more than one result.
            self.query.push("limit", 2);
        }

        ResourceIterator::new(self).one().await
    }
}

#[async_trait]
impl ResourceQuery for ServerQuery {
    type Item = Server;

    const DEFAULT_LIMIT: usize = 100;

    async fn can_paginate(&self) -> Result<bool> {
        Ok(self.can_paginate)
    }

    fn extract_marker(&self, resource: &Self::Item) -> String {
        resource.id().clone()
    }

    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>> {
        let query = self.query.with_marker_and_limit(limit, marker);
        Ok(api::list_servers(&self.session, &query)
            .await?
            .into_iter()
            .map(|item| Server::new(self.session.clone(), item))
            .collect())
    }
}

impl NewServer {
    /// Start creating a server.
    pub(crate) fn new(session: Session, name: String, flavor: FlavorRef) -> NewServer {
        NewServer {
            session,
            flavor,
            image: None,
            keypair: None,
            nics: Vec::new(),
            security_groups: Vec::new(),
            user_data: None,
            inner: protocol::ServerCreate::new(name, String::new()),
        }
    }

    /// Build the request body, resolving names into IDs.
    pub(crate) async fn into_request(self) -> Result<(Session, protocol::ServerCreate)> {
        let mut request = self.inner;
        request.flavorRef = api::get_flavor(&self.session, &self.flavor).await?.id;
        if let Some(image) = self.image {
            request.imageRef = Some(api::resolve_image(&self.session, image).await?);
        }
        for device in request.block_devices.iter_mut() {
            if device.source_type == "image" && device.uuid.is_none() {
                device.uuid = request.imageRef.take();
            }
        }
        if let Some(keypair) = self.keypair {
            request.key_name = Some(keypair.into());
        }
        if let Some(user_data) = self.user_data {
            request.user_data =
                Some(base64::engine::general_purpose::STANDARD.encode(user_data.as_bytes()));
        }
        request.security_groups = self
            .security_groups
            .into_iter()
            .map(|g| protocol::SecurityGroupName { name: g.into() })
            .collect();

        for nic in self.nics {
            let item = match nic {
                ServerNIC::FromNetwork(network) => protocol::ServerNetwork::Network {
                    uuid: resolve_network(&self.session, network).await?,
                    fixed_ip: None,
                },
                ServerNIC::WithPort(port) => protocol::ServerNetwork::Port { port: port.into() },
                ServerNIC::WithFixedIp { network, ip } => protocol::ServerNetwork::Network {
                    uuid: resolve_network(&self.session, network).await?,
                    fixed_ip: Some(ip),
                },
            };
            request.networks.push(item);
        }

        Ok((self.session, request))
    }

    /// Request creation of the server.
    pub async fn create(self) -> Result<ServerCreationWaiter> {
        let (session, request) = self.into_request().await?;
        let server_id = api::create_server(&session, request).await?;
        let inner = api::get_server_by_id(&session, server_id).await?;
        Ok(ServerCreationWaiter {
            server: Server::new(session, inner),
        })
    }

    /// Add a virtual NIC with given fixed IP to the new server.
    #[inline]
    pub fn add_fixed_ip<N: Into<NetworkRef>>(&mut self, network: N, fixed_ip: IpAddr) {
        self.nics.push(ServerNIC::WithFixedIp {
            network: network.into(),
            ip: fixed_ip,
        });
    }

    /// Add a virtual NIC from this network to the new server.
    #[inline]
    pub fn add_network<N: Into<NetworkRef>>(&mut self, network: N) {
        self.nics.push(ServerNIC::FromNetwork(network.into()));
    }

    /// Add a virtual NIC with this port to the new server.
    #[inline]
    pub fn add_port<P: Into<PortRef>>(&mut self, port: P) {
        self.nics.push(ServerNIC::WithPort(port.into()));
    }

    /// Add a security group to the new server.
    #[inline]
    pub fn add_security_group<G: Into<SecurityGroupRef>>(&mut self, group: G) {
        self.security_groups.push(group.into());
    }

    /// Boot the server from an existing volume.
    pub fn set_boot_volume<S: Into<String>>(&mut self, volume_id: S) {
        self.inner.block_devices.push(protocol::BlockDevice {
            uuid: Some(volume_id.into()),
            source_type: "volume".into(),
            destination_type: "volume".into(),
            boot_index: 0,
            volume_size: None,
            delete_on_termination: false,
        });
    }

    /// Boot the server from a new volume created from its image.
    pub fn set_boot_volume_from_image(&mut self, size_gib: u32, delete_on_termination: bool) {
        self.inner.block_devices.push(protocol::BlockDevice {
            uuid: None,
            source_type: "image".into(),
            destination_type: "volume".into(),
            boot_index: 0,
            volume_size: Some(size_gib),
            delete_on_termination,
        });
    }

    /// Metadata assigned to this server.
    #[inline]
    pub fn metadata(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.metadata
    }

    /// NICs to attach to this server.
    #[inline]
    pub fn nics(&mut self) -> &mut Vec<ServerNIC> {
        &mut self.nics
    }

    /// Use this image as a source for the new server.
    pub fn set_image<I: Into<ImageRef>>(&mut self, image: I) {
        self.image = Some(image.into());
    }

    /// Use this key pair for the new server.
    pub fn set_keypair<K: Into<KeyPairRef>>(&mut self, keypair: K) {
        self.keypair = Some(keypair.into());
    }

    /// Use this user data for the new server (encoded automatically).
    pub fn set_user_data<U: Into<String>>(&mut self, user_data: U) {
        self.user_data = Some(user_data.into());
    }

    creation_inner_field! {
        #[doc = "Set the availability zone."]
        set_availability_zone, with_availability_zone -> availability_zone: optional String
    }

    creation_inner_field! {
        #[doc = "Whether to use a config drive."]
        set_config_drive, with_config_drive -> config_drive: optional bool
    }

    /// Add a virtual NIC with given fixed IP to the new server.
    #[inline]
    pub fn with_fixed_ip<N: Into<NetworkRef>>(mut self, network: N, fixed_ip: IpAddr) -> Self {
        self.add_fixed_ip(network, fixed_ip);
        self
    }

    /// Use this image as a source for the new server.
    #[inline]
    pub fn with_image<I: Into<ImageRef>>(mut self, image: I) -> Self {
        self.set_image(image);
        self
    }

    /// Use this key pair for the new server.
    #[inline]
    pub fn with_keypair<K: Into<KeyPairRef>>(mut self, keypair: K) -> Self {
        self.set_keypair(keypair);
        self
    }

    /// Add an arbitrary key/value metadata pair.
    pub fn with_metadata<S1, S2>(mut self, key: S1, value: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let _ = self.metadata().insert(key.into(), value.into());
        self
    }

    /// Add a virtual NIC from this network to the new server.
    #[inline]
    pub fn with_network<N: Into<NetworkRef>>(mut self, network: N) -> Self {
        self.add_network(network);
        self
    }

    /// Add a virtual NIC with this port to the new server.
    #[inline]
    pub fn with_port<P: Into<PortRef>>(mut self, port: P) -> Self {
        self.add_port(port);
        self
    }

    /// Add a security group to the new server.
    #[inline]
    pub fn with_security_group<G: Into<SecurityGroupRef>>(mut self, group: G) -> Self {
        self.add_security_group(group);
        self
    }

    /// Use this user data for the new server.
    #[inline]
    pub fn with_user_data<U: Into<String>>(mut self, user_data: U) -> Self {
        self.set_user_data(user_data);
        self
    }
}

#[cfg(feature = "network")]
async fn resolve_network(session: &Session, network: NetworkRef) -> Result<String> {
    Ok(super::super::network::api::get_network(session, &network)
        .await?
        .id)
}

#[cfg(not(feature = "network"))]
async fn resolve_network(_session: &Session, network: NetworkRef) -> Result<String> {
    Ok(network.into())
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::super::protocol;

    fn server(status: &str) -> protocol::Server {
        serde_json::from_value(json!({
            "id": "abcd",
            "name": "test",
            "status": status,
            "addresses": {
                "private": [
                    {"addr": "10.0.0.3", "OS-EXT-IPS:type": "fixed"},
                    {"addr": "172.24.4.2", "OS-EXT-IPS:type": "floating"}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_floating_ip_lookup() {
        let inner = server("ACTIVE");
        let floating = inner
            .addresses
            .values()
            .flat_map(|l| l.iter())
            .find(|a| a.addr_type == Some(protocol::AddressType::Floating))
            .map(|a| a.addr.to_string());
        assert_eq!(floating.as_deref(), Some("172.24.4.2"));
    }

    #[test]
    fn test_error_status_detected() {
        let inner = server("ERROR");
        assert_eq!(inner.status, protocol::ServerStatus::Error);
    }
}
