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

//! Options of the cloud layer.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{DeserializeOwned, Deserializer, Error as DeError};

use super::super::{Error, ErrorKind, Result};

protocol_enum! {
    #[doc = "Service providing security groups."]
    enum SecGroupSource {
        #[doc = "Networking service."]
        Neutron = "neutron",
        #[doc = "Legacy Compute networking."]
        Nova = "nova",
        #[doc = "Security groups are disabled."]
        Disabled = "none"
    }
}

protocol_enum! {
    #[doc = "Service providing floating IPs."]
    enum FloatingIpSource {
        #[doc = "Networking service."]
        Neutron = "neutron",
        #[doc = "Legacy Compute networking."]
        Nova = "nova",
        #[doc = "Floating IPs are disabled."]
        Disabled = "none"
    }
}

impl Default for SecGroupSource {
    fn default() -> SecGroupSource {
        SecGroupSource::Neutron
    }
}

impl Default for FloatingIpSource {
    fn default() -> FloatingIpSource {
        FloatingIpSource::Neutron
    }
}

/// Description of a network in the `networks` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Network name or ID.
    pub name: String,
    /// Whether the network routes outside of the cloud.
    #[serde(default)]
    pub routes_externally: bool,
    /// Override of `routes_externally` for IPv4.
    #[serde(default)]
    pub routes_ipv4_externally: Option<bool>,
    /// Override of `routes_externally` for IPv6.
    #[serde(default)]
    pub routes_ipv6_externally: Option<bool>,
    /// Whether floating IPs attach to ports on this network.
    #[serde(default)]
    pub nat_destination: bool,
    /// Whether floating IPs are allocated from this network.
    #[serde(default)]
    pub nat_source: bool,
    /// Whether servers are created on this network by default.
    #[serde(default)]
    pub default_interface: bool,
}

impl NetworkConfig {
    /// Network routing outside of the cloud, also used for new servers.
    pub fn external<S: Into<String>>(name: S) -> NetworkConfig {
        NetworkConfig {
            name: name.into(),
            routes_externally: true,
            default_interface: true,
            ..NetworkConfig::default()
        }
    }

    /// Internal network used as a NAT destination.
    pub fn internal<S: Into<String>>(name: S) -> NetworkConfig {
        NetworkConfig {
            name: name.into(),
            nat_destination: true,
            ..NetworkConfig::default()
        }
    }

    /// Whether IPv4 traffic routes externally.
    #[inline]
    pub fn routes_ipv4(&self) -> bool {
        self.routes_ipv4_externally
            .unwrap_or(self.routes_externally)
    }

    /// Whether IPv6 traffic routes externally.
    #[inline]
    pub fn routes_ipv6(&self) -> bool {
        self.routes_ipv6_externally
            .unwrap_or(self.routes_externally)
    }
}

const DEFAULT_FLOATING_IP_CACHE_TTL: u64 = 5;

/// Source that treats `null` and any spelling of `none` as disabled.
fn source_or_disabled<'de, D, T>(des: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = <Option<String> as serde::Deserialize>::deserialize(des)?
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "none".into());
    serde_yaml::from_value(serde_yaml::Value::String(value)).map_err(D::Error::custom)
}

fn default_floating_ip_cache_ttl() -> u64 {
    DEFAULT_FLOATING_IP_CACHE_TTL
}

/// Behaviour of the [Cloud](struct.Cloud.html) layer.
///
/// Loaded from the same `clouds.yaml` entry as the session, unknown keys
/// are ignored:
///
/// ```yaml
/// clouds:
///   mycloud:
///     auth: ...
///     secgroup_source: nova
///     floating_ip_source: neutron
///     use_direct_get: true
///     networks:
///       - name: public
///         routes_externally: true
///       - name: private
///         nat_destination: true
///         default_interface: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudOptions {
    /// Where security groups come from.
    #[serde(default, deserialize_with = "source_or_disabled")]
    pub secgroup_source: SecGroupSource,
    /// Where floating IPs come from.
    #[serde(default, deserialize_with = "source_or_disabled")]
    pub floating_ip_source: FloatingIpSource,
    /// Fetch entities directly when given something that looks like an ID.
    #[serde(default)]
    pub use_direct_get: bool,
    /// For how long (in seconds) the floating IP list is cached.
    #[serde(default = "default_floating_ip_cache_ttl")]
    pub floating_ip_cache_ttl: u64,
    /// Networks with special meaning.
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
    /// Legacy shortcut for an external network.
    #[serde(default)]
    pub external_network: Option<String>,
    /// Legacy shortcut for an internal network.
    #[serde(default)]
    pub internal_network: Option<String>,
    /// Use private addresses to reach servers.
    #[serde(default)]
    pub private: bool,
    /// Never use IPv6 addresses to reach servers.
    #[serde(default)]
    pub force_ipv4: bool,
}

impl Default for CloudOptions {
    fn default() -> CloudOptions {
        CloudOptions {
            secgroup_source: SecGroupSource::default(),
            floating_ip_source: FloatingIpSource::default(),
            use_direct_get: false,
            floating_ip_cache_ttl: DEFAULT_FLOATING_IP_CACHE_TTL,
            networks: Vec::new(),
            external_network: None,
            internal_network: None,
            private: false,
            force_ipv4: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Root {
    clouds: serde_yaml::Mapping,
}

fn find_config(filename: &str) -> Option<PathBuf> {
    if let Ok(path) = env::var("OS_CLIENT_CONFIG_FILE") {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        warn!("OS_CLIENT_CONFIG_FILE points to a missing file {:?}", path);
    }

    let current = Path::new(filename);
    if current.is_file() {
        return Some(current.to_path_buf());
    }

    if let Some(mut home) = dirs::home_dir() {
        home.push(".config/openstack");
        home.push(filename);
        if home.is_file() {
            return Some(home);
        }
    }

    let abs = Path::new("/etc/openstack").join(filename);
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

impl CloudOptions {
    /// Options with direct getting by ID enabled.
    pub fn with_direct_get(mut self, value: bool) -> CloudOptions {
        self.use_direct_get = value;
        self
    }

    /// Time for which floating IPs are cached.
    #[inline]
    pub fn floating_ip_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.floating_ip_cache_ttl)
    }

    /// All configured networks, including the legacy shortcuts.
    pub fn all_networks(&self) -> Vec<NetworkConfig> {
        let mut result = self.networks.clone();
        if let Some(ref name) = self.external_network {
            if !result.iter().any(|n| &n.name == name) {
                result.push(NetworkConfig::external(name.clone()));
            }
        }
        if let Some(ref name) = self.internal_network {
            if !result.iter().any(|n| &n.name == name) {
                result.push(NetworkConfig::internal(name.clone()));
            }
        }
        result
    }

    /// Parse options of one cloud from a `clouds.yaml` document.
    ///
    /// Fails with `InvalidConfig` if the cloud is not defined.
    pub fn from_yaml_str<S: AsRef<str>>(content: &str, cloud_name: S) -> Result<CloudOptions> {
        let root: Root = serde_yaml::from_str(content).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse clouds.yaml: {}", e),
            )
        })?;
        CloudOptions::from_clouds(root, cloud_name.as_ref())
    }

    fn from_clouds(root: Root, cloud_name: &str) -> Result<CloudOptions> {
        let cloud = root
            .clouds
            .get(&serde_yaml::Value::from(cloud_name))
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    format!("No such cloud: {}", cloud_name),
                )
            })?;
        serde_yaml::from_value(cloud).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid options of cloud {}: {}", cloud_name, e),
            )
        })
    }

    /// Load options of one cloud from `clouds.yaml`.
    ///
    /// The file is searched in `OS_CLIENT_CONFIG_FILE`, the current
    /// directory, `~/.config/openstack` and `/etc/openstack`. A missing file
    /// results in the default options.
    pub fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<CloudOptions> {
        let cloud_name = cloud_name.as_ref();
        let path = match find_config("clouds.yaml") {
            Some(path) => path,
            None => {
                debug!("No clouds.yaml found, using default options");
                return Ok(CloudOptions::default());
            }
        };

        let file = File::open(&path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {:?}: {}", path, e),
            )
        })?;
        let root: Root = serde_yaml::from_reader(file).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse {:?}: {}", path, e),
            )
        })?;
        let result = CloudOptions::from_clouds(root, cloud_name)?;
        debug!("Loaded options of cloud {} from {:?}", cloud_name, path);
        Ok(result)
    }

    /// Load options of the cloud named by `OS_CLOUD`, if any.
    pub fn from_env() -> Result<CloudOptions> {
        match env::var("OS_CLOUD") {
            Ok(name) if !name.is_empty() => CloudOptions::from_config(name),
            _ => Ok(CloudOptions::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::super::ErrorKind;
    use super::{CloudOptions, FloatingIpSource, NetworkConfig, SecGroupSource};

    const CLOUDS: &str = r#"
clouds:
  minimal:
    auth:
      auth_url: https://example.com/identity
  full:
    auth:
      auth_url: https://example.com/identity
    region_name: RegionOne
    secgroup_source: nova
    floating_ip_source: none
    use_direct_get: true
    floating_ip_cache_ttl: 30
    external_network: ext-legacy
    networks:
      - name: public
        routes_externally: true
        routes_ipv6_externally: false
      - name: private
        nat_destination: true
        default_interface: true
"#;

    #[test]
    fn test_defaults() {
        let options = CloudOptions::from_yaml_str(CLOUDS, "minimal").unwrap();
        assert_eq!(options, CloudOptions::default());
        assert_eq!(options.secgroup_source, SecGroupSource::Neutron);
        assert_eq!(options.floating_ip_source, FloatingIpSource::Neutron);
        assert_eq!(options.floating_ip_cache_ttl, 5);
        assert!(!options.use_direct_get);
    }

    #[test]
    fn test_full() {
        let options = CloudOptions::from_yaml_str(CLOUDS, "full").unwrap();
        assert_eq!(options.secgroup_source, SecGroupSource::Nova);
        assert_eq!(options.floating_ip_source, FloatingIpSource::Disabled);
        assert!(options.use_direct_get);
        assert_eq!(options.floating_ip_cache_ttl().as_secs(), 30);
        assert_eq!(options.networks.len(), 2);
        let public = &options.networks[0];
        assert!(public.routes_ipv4());
        assert!(!public.routes_ipv6());
        let private = &options.networks[1];
        assert!(!private.routes_ipv4());
        assert!(private.nat_destination);
        assert!(private.default_interface);
    }

    #[test]
    fn test_legacy_networks() {
        let mut options = CloudOptions::from_yaml_str(CLOUDS, "full").unwrap();
        options.internal_network = Some("int-legacy".into());
        let all = options.all_networks();
        assert_eq!(all.len(), 4);
        assert_eq!(all[2], NetworkConfig::external("ext-legacy"));
        assert_eq!(all[3], NetworkConfig::internal("int-legacy"));
    }

    #[test]
    fn test_missing_cloud() {
        let err = CloudOptions::from_yaml_str(CLOUDS, "nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_disabled_sources() {
        let content = "clouds:\n  off:\n    secgroup_source: null\n    floating_ip_source: None\n";
        let options = CloudOptions::from_yaml_str(content, "off").unwrap();
        assert_eq!(options.secgroup_source, SecGroupSource::Disabled);
        assert_eq!(options.floating_ip_source, FloatingIpSource::Disabled);

        let content = "clouds:\n  off:\n    secgroup_source:\n    floating_ip_source: NEUTRON\n";
        let options = CloudOptions::from_yaml_str(content, "off").unwrap();
        assert_eq!(options.secgroup_source, SecGroupSource::Disabled);
        assert_eq!(options.floating_ip_source, FloatingIpSource::Neutron);
    }

    #[test]
    fn test_external_shortcut() {
        let ext = NetworkConfig::external("ext");
        assert!(ext.routes_ipv4());
        assert!(ext.default_interface);
        assert!(!ext.nat_destination);
        let int = NetworkConfig::internal("int");
        assert!(int.nat_destination);
        assert!(!int.default_interface);
        assert!(!int.routes_ipv4());
    }

    #[test]
    fn test_invalid_source() {
        let content = "clouds:\n  bad:\n    secgroup_source: magic\n";
        let err = CloudOptions::from_yaml_str(content, "bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
