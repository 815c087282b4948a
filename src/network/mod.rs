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

//! Network API implementation bits.

pub(crate) mod api;
mod floatingips;
mod networks;
mod ports;
pub(crate) mod protocol;
mod security_groups;

use super::common::{NetworkRef, SecurityGroupRef};
use super::resource;
use super::utils::Query;
use super::{Result, Session};

pub use self::floatingips::{FloatingIp, FloatingIpQuery, NewFloatingIp};
pub use self::networks::{Network, NetworkQuery, NewNetwork};
pub use self::ports::{Port, PortQuery};
pub use self::protocol::{
    EtherType, FloatingIpStatus, IpVersion, NetworkSortKey, NetworkStatus, PortIpAddress,
    RuleDirection, SecurityGroupRule,
};
pub use self::security_groups::{NewSecurityGroup, NewSecurityGroupRule, SecurityGroup};

/// Proxy for the Network service.
#[derive(Debug, Clone)]
pub struct Proxy {
    session: Session,
}

impl Proxy {
    /// Create a proxy using the given session.
    pub fn new(session: Session) -> Proxy {
        Proxy { session }
    }

    /// Build a query against network list.
    pub fn networks(&self) -> NetworkQuery {
        NetworkQuery::new(self.session.clone())
    }

    /// Find a network by its ID or name.
    pub async fn find_network<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Network> {
        Network::load(self.session.clone(), id_or_name).await
    }

    /// Prepare a new network.
    pub fn new_network(&self) -> NewNetwork {
        NewNetwork::new(self.session.clone())
    }

    /// Delete a network by its ID.
    pub async fn delete_network<Id: Into<NetworkRef>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        let id = id.into();
        resource::delete::<protocol::Network>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// Build a query against port list.
    pub fn ports(&self) -> PortQuery {
        PortQuery::new(self.session.clone())
    }

    /// Find a port by its ID or name.
    pub async fn find_port<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<Port> {
        Port::load(self.session.clone(), id_or_name).await
    }

    /// Build a query against floating IP list.
    pub fn floating_ips(&self) -> FloatingIpQuery {
        FloatingIpQuery::new(self.session.clone())
    }

    /// Get a floating IP by its ID.
    pub async fn get_floating_ip<Id: AsRef<str>>(&self, id: Id) -> Result<FloatingIp> {
        FloatingIp::load(self.session.clone(), id).await
    }

    /// Prepare a new floating IP on the given network.
    pub fn new_floating_ip<N: Into<NetworkRef>>(&self, floating_network: N) -> NewFloatingIp {
        NewFloatingIp::new(self.session.clone(), floating_network.into())
    }

    /// Delete a floating IP by its ID.
    pub async fn delete_floating_ip<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<protocol::FloatingIp>(&self.session, id.as_ref(), ignore_missing).await
    }

    /// List security groups, optionally filtered by name.
    pub async fn security_groups(&self, name: Option<&str>) -> Result<Vec<SecurityGroup>> {
        let mut query = Query::new();
        if let Some(name) = name {
            query.push_str("name", name);
        }
        security_groups::list_security_groups(&self.session, &query).await
    }

    /// Find a security group by its ID or name.
    pub async fn find_security_group<Id: AsRef<str>>(&self, id_or_name: Id) -> Result<SecurityGroup> {
        SecurityGroup::load(self.session.clone(), id_or_name).await
    }

    /// Prepare a new security group.
    pub fn new_security_group<S: Into<String>>(&self, name: S) -> NewSecurityGroup {
        NewSecurityGroup::new(self.session.clone(), name.into())
    }

    /// Delete a security group by its ID.
    pub async fn delete_security_group<Id: Into<SecurityGroupRef>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        let id = id.into();
        resource::delete::<protocol::SecurityGroup>(&self.session, id.as_ref(), ignore_missing)
            .await
    }

    /// List rules of a security group.
    pub async fn security_group_rules<Id: AsRef<str>>(
        &self,
        group_id: Id,
    ) -> Result<Vec<SecurityGroupRule>> {
        let mut query = Query::new();
        query.push_str("security_group_id", group_id.as_ref());
        api::list_security_group_rules(&self.session, &query).await
    }

    /// Get a security group rule by its ID.
    pub async fn get_security_group_rule<Id: AsRef<str>>(&self, id: Id) -> Result<SecurityGroupRule> {
        resource::get::<SecurityGroupRule>(&self.session, id.as_ref()).await
    }

    /// Prepare a new rule for the given security group.
    pub fn new_security_group_rule<G: Into<SecurityGroupRef>>(
        &self,
        group: G,
        direction: RuleDirection,
    ) -> NewSecurityGroupRule {
        NewSecurityGroupRule::new(self.session.clone(), group.into(), direction)
    }

    /// Delete a security group rule by its ID.
    pub async fn delete_security_group_rule<Id: AsRef<str>>(
        &self,
        id: Id,
        ignore_missing: bool,
    ) -> Result<bool> {
        resource::delete::<SecurityGroupRule>(&self.session, id.as_ref(), ignore_missing).await
    }
}
