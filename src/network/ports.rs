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

//! Port lookup via Network API.

use std::net::IpAddr;

use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};
use macaddr::MacAddr6;

use super::super::common::{NetworkRef, Refresh, ResourceIterator, ResourceQuery};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session};
use super::{api, protocol};

/// A query to port list.
#[derive(Clone, Debug)]
pub struct PortQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
    network: Option<NetworkRef>,
}

/// Structure representing a port.
#[derive(Clone, Debug)]
pub struct Port {
    session: Session,
    inner: protocol::Port,
}

impl Port {
    pub(crate) fn new(session: Session, inner: protocol::Port) -> Port {
        Port { session, inner }
    }

    /// Load a Port object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Port> {
        let inner = api::get_port(&session, id).await?;
        Ok(Port::new(session, inner))
    }

    /// Raw port representation.
    pub(crate) fn inner(&self) -> &protocol::Port {
        &self.inner
    }

    transparent_property! {
        #[doc = "ID of the device the port is attached to."]
        device_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Kind of the device the port is attached to."]
        device_owner: ref Option<String>
    }

    transparent_property! {
        #[doc = "Fixed IP addresses of the port."]
        fixed_ips: ref Vec<protocol::PortIpAddress>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "MAC address of the port."]
        mac_address: MacAddr6
    }

    transparent_property! {
        #[doc = "Port name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "ID of the network of the port."]
        network_id: ref String
    }

    transparent_property! {
        #[doc = "Port status."]
        status: protocol::NetworkStatus
    }
}

#[async_trait]
impl Refresh for Port {
    /// Refresh the port.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = resource::get(&self.session, &self.inner.id).await?;
        Ok(())
    }
}

impl PortQuery {
    pub(crate) fn new(session: Session) -> PortQuery {
        PortQuery {
            session,
            query: Query::new(),
            can_paginate: true,
            network: None,
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
        #[doc = "Filter by device ID."]
        set_device_id, with_device_id -> device_id
    }

    query_filter! {
        #[doc = "Filter by device owner."]
        set_device_owner, with_device_owner -> device_owner
    }

    /// Filter by fixed IP address.
    pub fn with_fixed_ip(mut self, value: IpAddr) -> Self {
        self.query.push_str("fixed_ips", format!("ip_address={}", value));
        self
    }

    query_filter! {
        #[doc = "Filter by port name."]
        set_name, with_name -> name
    }

    /// Filter by network (ID or name).
    pub fn with_network<N: Into<NetworkRef>>(mut self, value: N) -> Self {
        self.network = Some(value.into());
        self
    }

    query_filter! {
        #[doc = "Filter by status."]
        set_status, with_status -> status: protocol::NetworkStatus
    }

    async fn resolve(mut self) -> Result<PortQuery> {
        if let Some(network) = self.network.take() {
            let network = api::get_network(&self.session, &network).await?;
            self.query.push_str("network_id", network.id);
        }
        Ok(self)
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Port>> {
        // Names are resolved lazily by `all` and `one`, IDs work directly.
        if let Some(network) = self.network.take() {
            self.query.push_str("network_id", network);
        }
        debug!("Fetching ports with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results.
    pub async fn all(self) -> Result<Vec<Port>> {
        self.resolve().await?.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(self) -> Result<Port> {
        let mut query = self.resolve().await?;
        debug!("Fetching one port with {:?}", query.query);
        if query.can_paginate {
            query.query.push("limit", 2);
        }
        ResourceIterator::new(query).one().await
    }
}

#[async_trait]
impl ResourceQuery for PortQuery {
    type Item = Port;

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
        Ok(api::list_ports(&self.session, &query)
            .await?
            .into_iter()
            .map(|item| Port::new(self.session.clone(), item))
            .collect())
    }
}
