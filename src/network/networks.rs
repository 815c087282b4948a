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

//! Network management via Network API.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::stream::{Stream, TryStreamExt};

use super::super::common::{DeletionWaiter, Refresh, ResourceIterator, ResourceQuery};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session, Sort};
use super::{api, protocol};

/// A query to network list.
#[derive(Clone, Debug)]
pub struct NetworkQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
}

/// Structure representing a single network.
#[derive(Clone, Debug)]
pub struct Network {
    session: Session,
    inner: protocol::Network,
    dirty: HashSet<&'static str>,
}

/// A request to create a network.
#[derive(Clone, Debug)]
pub struct NewNetwork {
    session: Session,
    inner: protocol::NetworkCreate,
}

impl Network {
    pub(crate) fn new(session: Session, inner: protocol::Network) -> Network {
        Network {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    /// Load a Network object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Network> {
        let inner = api::get_network(&session, id).await?;
        Ok(Network::new(session, inner))
    }

    /// Raw network representation.
    pub(crate) fn inner(&self) -> &protocol::Network {
        &self.inner
    }

    transparent_property! {
        #[doc = "The administrative state of the network."]
        admin_state_up: bool
    }

    update_field! {
        #[doc = "Set the administrative state of the network."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: bool
    }

    transparent_property! {
        #[doc = "Creation data and time (if available)."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Network description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Whether the network is external."]
        external: Option<bool>
    }

    update_field! {
        #[doc = "Configure whether the network is external."]
        set_external, with_external -> external: optional bool
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Whether the network is the default pool."]
        is_default: Option<bool>
    }

    transparent_property! {
        #[doc = "Network MTU."]
        mtu: Option<u32>
    }

    update_field! {
        #[doc = "Set the network MTU."]
        set_mtu, with_mtu -> mtu: optional u32
    }

    transparent_property! {
        #[doc = "Network name."]
        name: ref String
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: String
    }

    transparent_property! {
        #[doc = "Physical network backing this network (admin only)."]
        provider_physical_network: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether the network is shared."]
        shared: bool
    }

    update_field! {
        #[doc = "Set whether the network is shared."]
        set_shared, with_shared -> shared: bool
    }

    transparent_property! {
        #[doc = "Network status."]
        status: protocol::NetworkStatus
    }

    transparent_property! {
        #[doc = "IDs of subnets of the network."]
        subnets: ref Vec<String>
    }

    transparent_property! {
        #[doc = "Last update data and time (if available)."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Delete the network.
    pub async fn delete(self) -> Result<DeletionWaiter<Network>> {
        let _ = resource::delete::<protocol::Network>(&self.session, &self.inner.id, false).await?;
        Ok(DeletionWaiter::new(
            self,
            Duration::new(60, 0),
            Duration::new(1, 0),
        ))
    }

    /// Whether the network is modified.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the network.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::NetworkUpdate::default();
        save_fields! {
            self -> update: admin_state_up name shared
        };
        save_option_fields! {
            self -> update: description external mtu
        };
        if update.is_empty() {
            return Ok(());
        }
        self.inner = api::update_network(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }
}

#[async_trait]
impl Refresh for Network {
    /// Refresh the network.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = resource::get(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl NetworkQuery {
    pub(crate) fn new(session: Session) -> NetworkQuery {
        NetworkQuery {
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

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<protocol::NetworkSortKey>) -> Self {
        let (field, direction) = sort.into();
        self.query.push_str("sort_key", field);
        self.query.push("sort_dir", direction);
        self
    }

    query_filter! {
        #[doc = "Filter by network name."]
        set_name, with_name -> name
    }

    /// Filter by external flag.
    pub fn set_external(&mut self, value: bool) {
        self.query.push("router:external", value);
    }

    /// Filter by external flag.
    #[inline]
    pub fn with_external(mut self, value: bool) -> Self {
        self.set_external(value);
        self
    }

    query_filter! {
        #[doc = "Filter by shared flag."]
        set_shared, with_shared -> shared: bool
    }

    query_filter! {
        #[doc = "Filter by status."]
        set_status, with_status -> status: protocol::NetworkStatus
    }

    query_filter! {
        #[doc = "Filter by project ID."]
        set_project_id, with_project_id -> project_id
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<Network>> {
        debug!("Fetching networks with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results.
    pub async fn all(self) -> Result<Vec<Network>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Network> {
        debug!("Fetching one network with {:?}", self.query);
        if self.can_paginate {
            // We need only one result. We fetch maximum two to be able
            // to check if the query yields more than one result.
            self.query.push("limit", 2);
        }

        ResourceIterator::new(self).one().await
    }
}

#[async_trait]
impl ResourceQuery for NetworkQuery {
    type Item = Network;

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
        Ok(api::list_networks(&self.session, &query)
            .await?
            .into_iter()
            .map(|item| Network::new(self.session.clone(), item))
            .collect())
    }
}

impl NewNetwork {
    /// Start creating a network.
    pub(crate) fn new(session: Session) -> NewNetwork {
        NewNetwork {
            session,
            inner: protocol::NetworkCreate::default(),
        }
    }

    /// Request creation of the network.
    pub async fn create(self) -> Result<Network> {
        let inner = api::create_network(&self.session, self.inner).await?;
        Ok(Network::new(self.session, inner))
    }

    creation_inner_field! {
        #[doc = "Set administrative status for the network."]
        set_admin_state_up, with_admin_state_up -> admin_state_up: optional bool
    }

    creation_inner_field! {
        #[doc = "Set description of the network."]
        set_description, with_description -> description: optional String
    }

    creation_inner_field! {
        #[doc = "Configure whether the network is external."]
        set_external, with_external -> external: optional bool
    }

    creation_inner_field! {
        #[doc = "Set MTU for the network."]
        set_mtu, with_mtu -> mtu: optional u32
    }

    creation_inner_field! {
        #[doc = "Set a name for the network."]
        set_name, with_name -> name: optional String
    }

    creation_inner_field! {
        #[doc = "Create the network in another project (admin only)."]
        set_project_id, with_project_id -> project_id: optional String
    }

    creation_inner_field! {
        #[doc = "Set the provider network type (admin only)."]
        set_provider_network_type, with_provider_network_type -> provider_network_type: optional String
    }

    creation_inner_field! {
        #[doc = "Set the physical network (admin only)."]
        set_provider_physical_network, with_provider_physical_network -> provider_physical_network: optional String
    }

    creation_inner_field! {
        #[doc = "Configure whether the network is shared."]
        set_shared, with_shared -> shared: optional bool
    }
}
