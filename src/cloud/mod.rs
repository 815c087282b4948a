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

//! Verb-oriented cloud layer.
//!
//! [Cloud](struct.Cloud.html) wraps the service proxies into operations that
//! return normalized records:
//!
//! * `list_*` returns all records, optionally filtered by [Filters](enum.Filters.html);
//! * `search_*` also matches a name or an ID (glob patterns are accepted);
//! * `get_*` returns `None` when nothing matches and fails on several matches;
//! * `delete_*` returns `false` when there was nothing to delete.
//!
//! Both Neutron and legacy Nova-network deployments are supported for
//! floating IPs and security groups, see [CloudOptions](struct.CloudOptions.html).
//!
//! ```rust,no_run
//! # async fn example() -> openstacksdk::Result<()> {
//! let cloud = openstacksdk::cloud::Cloud::from_env().await?;
//! for server in cloud.search_servers("web-*", None).await? {
//!     println!("{} {:?}", server.name, server.interface_ip);
//! }
//! # Ok(()) }
//! ```

#[cfg(feature = "accelerator")]
mod accelerator;
mod cache;
#[cfg(feature = "clustering")]
mod clustering;
mod compute;
mod config;
mod floating_ip;
mod network;
mod normalize;
mod security_group;
mod utils;

use std::sync::Arc;

use osauth::{AuthType, Session};
use static_assertions::assert_impl_all;

use self::cache::Cached;
use super::Result;

#[cfg(feature = "clustering")]
pub use self::clustering::ClusterSpec;
pub use self::compute::{ServerSpec, DEFAULT_SERVER_TIMEOUT};
pub use self::config::{CloudOptions, FloatingIpSource, NetworkConfig, SecGroupSource};
pub use self::floating_ip::FloatingIpSpec;
pub use self::network::{InterestingNetworks, NetworkSpec};
pub use self::normalize::{
    AddressNetworks, NormalizedFixedIp, NormalizedFlavor, NormalizedFloatingIp,
    NormalizedKeyPair, NormalizedNetwork, NormalizedPort, NormalizedSecurityGroup,
    NormalizedSecurityGroupRule, NormalizedServer, NormalizedServerFlavor,
};
pub use self::security_group::SecurityGroupRuleSpec;
pub use self::utils::{filter_list, get_entity, is_uuid_like, range_filter, Filters};

/// Connection to a cloud with verb-oriented operations.
///
/// Cloning is cheap, clones share the session and the caches.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
    options: Arc<CloudOptions>,
    networks: Arc<Cached<Arc<InterestingNetworks>>>,
    floating_ips: Arc<Cached<Vec<NormalizedFloatingIp>>>,
}

assert_impl_all!(Cloud: Send, Sync);

impl Cloud {
    /// Create a cloud with the given authentication and options.
    pub async fn new<Auth: AuthType + 'static>(
        auth_type: Auth,
        options: CloudOptions,
    ) -> Result<Cloud> {
        let session = Session::new(auth_type).await?;
        Ok(Cloud::from_session(session, options))
    }

    /// Create a cloud from a `clouds.yaml` entry.
    ///
    /// Options are read from the same entry.
    pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Cloud> {
        let cloud_name = cloud_name.as_ref();
        let options = CloudOptions::from_config(cloud_name)?;
        let session = Session::from_config(cloud_name).await?;
        Ok(Cloud::from_session(session, options))
    }

    /// Create a cloud from environment variables.
    ///
    /// If `OS_CLOUD` is set, options are read from its `clouds.yaml` entry.
    pub async fn from_env() -> Result<Cloud> {
        let options = CloudOptions::from_env()?;
        let session = Session::from_env().await?;
        Ok(Cloud::from_session(session, options))
    }

    /// Create a cloud from an existing session.
    pub fn from_session(session: Session, options: CloudOptions) -> Cloud {
        Cloud {
            session,
            options: Arc::new(options),
            networks: Arc::new(Cached::new()),
            floating_ips: Arc::new(Cached::new()),
        }
    }

    /// Session used by this cloud.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Options of this cloud.
    #[inline]
    pub fn options(&self) -> &CloudOptions {
        &self.options
    }

    /// Compute service proxy.
    pub fn compute(&self) -> super::compute::Proxy {
        super::compute::Proxy::new(self.session.clone())
    }

    /// Network service proxy.
    pub fn network(&self) -> super::network::Proxy {
        super::network::Proxy::new(self.session.clone())
    }

    /// Accelerator service proxy.
    #[cfg(feature = "accelerator")]
    pub fn accelerator(&self) -> super::accelerator::Proxy {
        super::accelerator::Proxy::new(self.session.clone())
    }

    /// Clustering service proxy.
    #[cfg(feature = "clustering")]
    pub fn clustering(&self) -> super::clustering::Proxy {
        super::clustering::Proxy::new(self.session.clone())
    }

    /// Drop all cached data.
    pub async fn invalidate_caches(&self) {
        self.reset_network_cache().await;
        self.reset_floating_ip_cache().await;
    }
}

impl From<super::Connection> for Cloud {
    fn from(value: super::Connection) -> Cloud {
        Cloud::from_session(value.session().clone(), CloudOptions::default())
    }
}
