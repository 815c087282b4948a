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

//! Flavor management via Compute API.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};

use super::super::common::{Refresh, ResourceIterator, ResourceQuery};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session};
use super::{api, protocol};

/// Structure representing a flavor.
#[derive(Clone, Debug)]
pub struct Flavor {
    session: Session,
    inner: protocol::Flavor,
    extra_specs: HashMap<String, String>,
}

/// A query to flavor list.
#[derive(Clone, Debug)]
pub struct FlavorQuery {
    session: Session,
    query: Query,
    can_paginate: bool,
}

impl Flavor {
    /// Load a Flavor object by its ID or name, including extra specs.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<Flavor> {
        let inner = api::get_flavor(&session, id).await?;
        Flavor::with_extra_specs(session, inner).await
    }

    pub(crate) async fn with_extra_specs(session: Session, mut inner: protocol::Flavor) -> Result<Flavor> {
        let extra_specs = match inner.extra_specs.take() {
            Some(es) => es,
            None => api::get_extra_specs_by_flavor_id(&session, &inner.id).await?,
        };
        Ok(Flavor {
            session,
            inner,
            extra_specs,
        })
    }

    /// Raw flavor representation.
    pub(crate) fn inner(&self) -> &protocol::Flavor {
        &self.inner
    }

    transparent_property! {
        #[doc = "Flavor description."]
        description: ref Option<String>
    }

    /// Extra specs of the flavor.
    #[inline]
    pub fn extra_specs(&self) -> &HashMap<String, String> {
        &self.extra_specs
    }

    transparent_property! {
        #[doc = "Ephemeral disk size in GiB."]
        ephemeral: u64
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Whether the flavor is public."]
        is_public: bool
    }

    transparent_property! {
        #[doc = "Flavor name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "RAM size in MiB."]
        ram: u64
    }

    transparent_property! {
        #[doc = "Root disk size in GiB."]
        disk: u64
    }

    transparent_property! {
        #[doc = "Swap disk size in MiB."]
        swap: u64
    }

    transparent_property! {
        #[doc = "VCPU count."]
        vcpus: u32
    }
}

#[async_trait]
impl Refresh for Flavor {
    /// Refresh the flavor.
    async fn refresh(&mut self) -> Result<()> {
        let inner = resource::get::<protocol::Flavor>(&self.session, &self.inner.id).await?;
        let refreshed = Flavor::with_extra_specs(self.session.clone(), inner).await?;
        *self = refreshed;
        Ok(())
    }
}

impl FlavorQuery {
    pub(crate) fn new(session: Session) -> FlavorQuery {
        FlavorQuery {
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
        #[doc = "Filter by minimum disk size in GiB."]
        set_min_disk, with_min_disk -> minDisk: u64
    }

    query_filter! {
        #[doc = "Filter by minimum RAM size in MiB."]
        set_min_ram, with_min_ram -> minRam: u64
    }

    /// Include private flavors (admin only) or only list them.
    pub fn with_is_public(mut self, value: Option<bool>) -> Self {
        let value = match value {
            Some(true) => "true",
            Some(false) => "false",
            None => "none",
        };
        self.query.push_str("is_public", value);
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<protocol::Flavor>> {
        debug!("Fetching flavors with {:?}", self.query);
        ResourceIterator::new(self).into_stream()
    }

    /// Execute this request and return all results with extra specs loaded.
    pub async fn all(self) -> Result<Vec<Flavor>> {
        let session = self.session.clone();
        let items: Vec<protocol::Flavor> = self.into_stream().try_collect().await?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(Flavor::with_extra_specs(session.clone(), item).await?);
        }
        Ok(result)
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<Flavor> {
        debug!("Fetching one flavor with {:?}", self.query);
        if self.can_paginate {
            self.query.push("limit", 2);
        }
        let session = self.session.clone();
        let inner = ResourceIterator::new(self).one().await?;
        Flavor::with_extra_specs(session, inner).await
    }
}

#[async_trait]
impl ResourceQuery for FlavorQuery {
    type Item = protocol::Flavor;

    const DEFAULT_LIMIT: usize = 50;

    async fn can_paginate(&self) -> Result<bool> {
        Ok(self.can_paginate)
    }

    fn extract_marker(&self, resource: &Self::Item) -> String {
        resource.id.clone()
    }

    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>> {
        let query = self.query.with_marker_and_limit(limit, marker);
        api::list_flavors(&self.session, &query).await
    }
}
