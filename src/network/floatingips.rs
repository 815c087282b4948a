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

//! Floating IP support.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};

use super::super::common::{
    DeletionWaiter, NetworkRef, PortRef, Refresh, ResourceIterator, ResourceQuery,
};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session};
use super::{api, protocol, Network, Port};

/// Structure representing a single floating IP.
#[derive(Clone, Debug)]
pub struct FloatingIp {
    session: Session,
    inner: protocol::FloatingIp,
}

/// A query to floating IP list.
#[derive(Clone, Debug)]
pub struct FloatingIpQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
}

/// A request to create a floating IP.
#[derive(Clone, Debug)]
pub struct NewFloatingIp {
    session: Session,
    inner: protocol::FloatingIpCreate,
    floating_network: NetworkRef,
}

impl FloatingIp {
    pub(crate) fn new(session: Session, inner: protocol::FloatingIp) -> FloatingIp {
        FloatingIp { session, inner }
    }

    /// Load a FloatingIp object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<FloatingIp> {
        let inner = api::get_floating_ip(&session, id).await?;
        Ok(FloatingIp::new(session, inner))
    }

    /// Raw floating IP representation.
    pub(crate) fn inner(&self) -> &protocol::FloatingIp {
        &self.inner
    }

    transparent_property! {
        #[doc = "Description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Fixed IP address this floating IP is mapped to (if any)."]
        fixed_ip_address: Option<IpAddr>
    }

    transparent_property! {
        #[doc = "Floating IP address."]
        floating_ip_address: IpAddr
    }

    transparent_property! {
        #[doc = "ID of the network this floating IP belongs to."]
        floating_network_id: ref String
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "ID of the port this floating IP is attached to (if any)."]
        port_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "ID of the router of this floating IP (if any)."]
        router_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Status of the floating IP."]
        status: protocol::FloatingIpStatus
    }

    /// Whether the floating IP is associated with a port.
    #[inline]
    pub fn is_associated(&self) -> bool {
        self.inner.port_id.is_some()
    }

    /// Network this floating IP belongs to.
    pub async fn floating_network(&self) -> Result<Network> {
        Network::load(self.session.clone(), &self.inner.floating_network_id).await
    }

    /// Port this floating IP is attached to (if any).
    pub async fn port(&self) -> Result<Option<Port>> {
        match self.inner.port_id {
            Some(ref port_id) => Ok(Some(Port::load(self.session.clone(), port_id).await?)),
            None => Ok(None),
        }
    }

    /// Associate this floating IP with a port.
    ///
    /// The fixed IP is only required if the port has several of them.
    pub async fn associate<P: Into<PortRef>>(
        &mut self,
        port: P,
        fixed_ip_address: Option<IpAddr>,
    ) -> Result<()> {
        let port = port.into();
        let update = protocol::FloatingIpUpdate {
            port_id: Some(port.into()),
            fixed_ip_address,
        };
        self.inner = api::update_floating_ip(&self.session, &self.inner.id, update).await?;
        Ok(())
    }

    /// Dissociate this floating IP from its port.
    pub async fn dissociate(&mut self) -> Result<()> {
        let update = protocol::FloatingIpUpdate::default();
        self.inner = api::update_floating_ip(&self.session, &self.inner.id, update).await?;
        Ok(())
    }

    /// Delete the floating IP.
    pub async fn delete(self) -> Result<DeletionWaiter<FloatingIp>> {
        let _ =
            resource::delete::<protocol::FloatingIp>(&self.session, &self.inner.id, false).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }
}

#[async_trait]
impl Refresh for FloatingIp {
    /// Refresh the floating IP.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = api::get_floating_ip(&self.session, &self.inner.id).await?;
        Ok(())
    }
}

impl FloatingIpQuery {
    pub(crate) fn new(session: Session) -> FloatingIpQuery {
        FloatingIpQuery {
            session,
            query: Query::new(),
            can_paginate: true,
        }
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

    query_filter! {
        #[doc = "Filter by fixed IP address."]
        set_fixed_ip_address, with_fixed_ip_address -> fixed_ip_address: IpAddr
    }

    query_filter! {
        #[doc = "Filter by floating IP address."]
        set_floating_ip_address, with_floating_ip_address -> floating_ip_address: IpAddr
    }

    query_filter! {
        #[doc = "Filter by floating network ID."]
        set_floating_network_id, with_floating_network_id -> floating_network_id
    }

    query_filter! {
        #[doc = "Filter by port ID."]
        set_port_id, with_port_id -> port_id
    }

    query_filter! {
        #[doc = "Filter by router ID."]
        set_router_id, with_router_id -> router_id
    }

    query_filter! {
        #[doc = "Filter by status."]
        set_status, with_status -> status: protocol::FloatingIpStatus
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<FloatingIp>> {
        debug!("Fetching floating IPs with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results.
    pub async fn all(self) -> Result<Vec<FloatingIp>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<FloatingIp> {
        debug!("Fetching one floating IP with {:?}", self.query);
        if self.can_paginate {
            self.query.push("limit", 2);
        }
        ResourceIterator::new(self).one().await
    }
}

#[async_trait]
impl ResourceQuery for FloatingIpQuery {
    type Item = FloatingIp;

    const DEFAULT_LIMIT: usize = 50;

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
        Ok(api::list_floating_ips(&self.session, &query)
            .await?
            .into_iter()
            .map(|item| FloatingIp::new(self.session.clone(), item))
            .collect())
    }
}

impl NewFloatingIp {
    /// Start creating a floating IP.
    pub(crate) fn new(session: Session, floating_network: NetworkRef) -> NewFloatingIp {
        NewFloatingIp {
            session,
            inner: protocol::FloatingIpCreate::default(),
            floating_network,
        }
    }

    /// Request creation of the floating IP.
    pub async fn create(mut self) -> Result<FloatingIp> {
        let network = api::get_network(&self.session, &self.floating_network).await?;
        self.inner.floating_network_id = network.id;
        let inner = api::create_floating_ip(&self.session, self.inner).await?;
        Ok(FloatingIp::new(self.session, inner))
    }

    creation_inner_field! {
        #[doc = "Set a description."]
        set_description, with_description -> description: optional String
    }

    creation_inner_field! {
        #[doc = "Set the fixed IP address to map to."]
        set_fixed_ip_address, with_fixed_ip_address -> fixed_ip_address: optional IpAddr
    }

    creation_inner_field! {
        #[doc = "Request a specific floating IP address."]
        set_floating_ip_address, with_floating_ip_address -> floating_ip_address: optional IpAddr
    }

    /// Attach the floating IP to this port right away.
    pub fn with_port<P: Into<PortRef>>(mut self, port: P) -> Self {
        let port = port.into();
        self.inner.port_id = Some(port.into());
        self
    }

    creation_inner_field! {
        #[doc = "Allocate from a specific subnet of the floating network."]
        set_subnet_id, with_subnet_id -> subnet_id: optional String
    }
}
