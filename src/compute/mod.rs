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

//! Compute API implementation bits.
//!
//! Besides servers, flavors and key pairs, the proxy exposes the legacy
//! Nova-network floating IP and security group APIs used by clouds without
//! Neutron.

pub(crate) mod api;
mod flavors;
mod keypairs;
pub(crate) mod protocol;
mod servers;

use std::net::IpAddr;

use super::common::{FlavorRef, ServerRef};
use super::resource;
use super::utils::Query;
use super::{Result, Session};

pub use self::flavors::{Flavor, FlavorQuery};
pub use self::keypairs::{KeyPair, NewKeyPair};
pub use self::protocol::{
    AddressType, KeyPairType, NovaFloatingIp, NovaSecurityGroup, NovaSecurityGroupRule,
    NovaSecurityGroupRuleCreate, RebootType, ServerAddress, ServerFlavor, ServerPowerState,
    ServerSortKey, ServerStatus,
};
pub use self::servers::{
    NewServer, Server, ServerCreationWaiter, ServerNIC, ServerQuery, ServerStatusWaiter,
};

/// Proxy for the Compute service.
#[derive(Debug, Clone)]
pub struct Proxy {
    session: Session,
}

impl Proxy {
    /// Create a proxy using the given session.
    pub fn new(session: Session) -> Proxy {
        Proxy { session }
    }

    /// Build a query against server list.
    pub fn servers(&self) -> ServerQuery {
        ServerQuery::new(self.session.clone())
    }

    /// Get a server by its ID.
    pub async fn get_server<Id: AsRef<str>>(&self, id: Id) -> Result<Server> {
        let inner = api::get_server_by_id(&self.session, id).await?;
        Ok(Server::new(self.session.clone(), inner))
    }

    /// Find a server by its ID or name.
    pub async fn find_server<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Server> {
        Server::load(self.session.clone(), id_or_name).await
    }

    /// Prepare a new server.
    pub fn new_server<S, F>(&self, name: S, flavor: F) -> NewServer
    where
        S: Into<String>,
        F: Into<FlavorRef>,
    {
        NewServer::new(self.session.clone(), name.into(), flavor.into())
    }

    /// Delete a server by its ID.
    ///
    /// Returns `false` if it did not exist and `ignore_missing` is true.
    pub async fn delete_server<Id: Into<ServerRef>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        let id = id.into();
        resource::delete::<protocol::Server>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// Build a query against flavor list.
    pub fn flavors(&self) -> FlavorQuery {
        FlavorQuery::new(self.session.clone())
    }

    /// Find a flavor by its ID or name.
    pub async fn find_flavor<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Flavor> {
        Flavor::load(self.session.clone(), id_or_name).await
    }

    /// List key pairs.
    pub async fn keypairs(&self) -> Result<Vec<KeyPair>> {
        Ok(api::list_keypairs(&self.session, &Query::new())
            .await?
            .into_iter()
            .map(|item| KeyPair::new(self.session.clone(), item))
            .collect())
    }

    /// Get a key pair by its name.
    pub async fn get_keypair<Id: AsRef<str>>(&self, name: Id) -> Result<KeyPair> {
        KeyPair::load(self.session.clone(), name).await
    }

    /// Prepare a new key pair.
    pub fn new_keypair<S: Into<String>>(&self, name: S) -> NewKeyPair {
        NewKeyPair::new(self.session.clone(), name.into())
    }

    /// Delete a key pair by its name.
    pub async fn delete_keypair<Id: AsRef<str>>(&self, name: Id, ignore_missing: bool) -> Result<bool> {
        resource::delete::<protocol::KeyPair>(&self.session, name.as_ref(), ignore_missing).await
    }

    /// List Nova-network floating IPs.
    pub async fn nova_floating_ips(&self) -> Result<Vec<NovaFloatingIp>> {
        resource::list::<NovaFloatingIp, _>(&self.session, &Query::new()).await
    }

    /// Get a Nova-network floating IP.
    pub async fn get_nova_floating_ip<Id: AsRef<str>>(&self, id: Id) -> Result<NovaFloatingIp> {
        resource::get::<NovaFloatingIp>(&self.session, id.as_ref()).await
    }

    /// Allocate a Nova-network floating IP from the pool.
    pub async fn create_nova_floating_ip(&self, pool: Option<String>) -> Result<NovaFloatingIp> {
        api::create_nova_floating_ip(&self.session, pool).await
    }

    /// Release a Nova-network floating IP.
    pub async fn delete_nova_floating_ip<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<NovaFloatingIp>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// Attach a Nova-network floating IP to a server.
    pub async fn add_floating_ip_to_server<Id: AsRef<str>>(
        &self,
        server_id: Id,
        address: IpAddr,
        fixed_address: Option<IpAddr>,
    ) -> Result<()> {
        api::add_floating_ip(&self.session, server_id, address, fixed_address).await
    }

    /// Detach a Nova-network floating IP from a server.
    pub async fn remove_floating_ip_from_server<Id: AsRef<str>>(
        &self,
        server_id: Id,
        address: IpAddr,
    ) -> Result<()> {
        api::remove_floating_ip(&self.session, server_id, address).await
    }

    /// List Nova-network security groups.
    pub async fn nova_security_groups(&self) -> Result<Vec<NovaSecurityGroup>> {
        resource::list::<NovaSecurityGroup, _>(&self.session, &Query::new()).await
    }

    /// Get a Nova-network security group.
    pub async fn get_nova_security_group<Id: AsRef<str>>(&self, id: Id) -> Result<NovaSecurityGroup> {
        resource::get::<NovaSecurityGroup>(&self.session, id.as_ref()).await
    }

    /// Create a Nova-network security group.
    pub async fn create_nova_security_group<S1, S2>(
        &self,
        name: S1,
        description: S2,
    ) -> Result<NovaSecurityGroup>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let body = resource::wrap_body::<NovaSecurityGroup, _>(&protocol::NovaSecurityGroupUpdate {
            name: name.into(),
            description: description.into(),
        })?;
        resource::create::<NovaSecurityGroup, _>(&self.session, &body).await
    }

    /// Update name and description of a Nova-network security group.
    pub async fn update_nova_security_group<Id, S1, S2>(
        &self,
        id: Id,
        name: S1,
        description: S2,
    ) -> Result<NovaSecurityGroup>
    where
        Id: AsRef<str>,
        S1: Into<String>,
        S2: Into<String>,
    {
        let update = protocol::NovaSecurityGroupUpdate {
            name: name.into(),
            description: description.into(),
        };
        api::update_nova_security_group(&self.session, id, update).await
    }

    /// Delete a Nova-network security group.
    pub async fn delete_nova_security_group<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<NovaSecurityGroup>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// Create a Nova-network security group rule.
    pub async fn create_nova_security_group_rule(
        &self,
        request: NovaSecurityGroupRuleCreate,
    ) -> Result<NovaSecurityGroupRule> {
        api::create_nova_security_group_rule(&self.session, request).await
    }

    /// Delete a Nova-network security group rule.
    pub async fn delete_nova_security_group_rule<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<NovaSecurityGroupRule>(&self.session, id.as_ref(), ignore_missing).await
    }
}
