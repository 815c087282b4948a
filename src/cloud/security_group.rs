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

//! Security groups in the cloud layer.

use std::collections::HashMap;

use super::super::compute::{NovaSecurityGroup, NovaSecurityGroupRule, NovaSecurityGroupRuleCreate};
use super::super::network::{api, protocol, EtherType, RuleDirection};
use super::super::resource::{self, ListQuery};
use super::super::utils::Query;
use super::super::{Error, ErrorKind, Result, ResultExt};
use super::config::SecGroupSource;
use super::normalize::{
    normalize_neutron_rule, normalize_neutron_security_group, normalize_nova_rule,
    normalize_nova_security_group, normalize_nova_security_groups, NormalizedSecurityGroup,
    NormalizedSecurityGroupRule,
};
use super::utils::{filter_list, get_entity, Filters};
use super::Cloud;

/// Parameters of a new security group rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRuleSpec {
    /// Rule direction, Nova only supports ingress.
    pub direction: RuleDirection,
    /// Ethernet type, Nova only supports IPv4.
    pub ethertype: EtherType,
    /// IP protocol, e.g. `tcp`.
    pub protocol: Option<String>,
    /// First port of the range.
    pub port_range_min: Option<u16>,
    /// Last port of the range.
    pub port_range_max: Option<u16>,
    /// Remote CIDR.
    pub remote_ip_prefix: Option<String>,
    /// Remote security group ID.
    pub remote_group_id: Option<String>,
    /// Project to create the rule in (admin only).
    pub project_id: Option<String>,
    /// Rule description.
    pub description: Option<String>,
}

impl Default for SecurityGroupRuleSpec {
    fn default() -> SecurityGroupRuleSpec {
        SecurityGroupRuleSpec {
            direction: RuleDirection::Ingress,
            ethertype: EtherType::IPv4,
            protocol: None,
            port_range_min: None,
            port_range_max: None,
            remote_ip_prefix: None,
            remote_group_id: None,
            project_id: None,
            description: None,
        }
    }
}

/// Convert a rule into a Nova-network request.
///
/// Nova requires a protocol and a port range: TCP and UDP default to all
/// ports, ICMP to `-1`.
fn nova_rule_request(
    group_id: &str,
    spec: &SecurityGroupRuleSpec,
) -> Result<NovaSecurityGroupRuleCreate> {
    if spec.direction != RuleDirection::Ingress {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "No support for egress rules",
        ));
    }
    let protocol = spec.protocol.as_deref().ok_or_else(|| {
        Error::new(ErrorKind::InvalidInput, "Protocol must be specified")
    })?;

    let (from_port, to_port) = match (spec.port_range_min, spec.port_range_max) {
        (None, None) => match protocol {
            "tcp" | "udp" => (1, 65535),
            "icmp" => (-1, -1),
            other => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("A port range is required for protocol {}", other),
                ))
            }
        },
        (min, max) => {
            let min = min.or(max).map(i32::from).unwrap_or(-1);
            let max = max.map(i32::from).unwrap_or(min);
            (min, max)
        }
    };

    Ok(NovaSecurityGroupRuleCreate {
        parent_group_id: group_id.into(),
        ip_protocol: Some(protocol.into()),
        from_port: Some(from_port),
        to_port: Some(to_port),
        cidr: spec.remote_ip_prefix.clone(),
        group_id: spec.remote_group_id.clone(),
    })
}

impl Cloud {
    fn secgroup_source(&self) -> Result<SecGroupSource> {
        match self.options.secgroup_source {
            SecGroupSource::Disabled => Err(Error::new(
                ErrorKind::InvalidInput,
                "Unavailable feature: security groups",
            )),
            other => Ok(other),
        }
    }

    /// List security groups.
    pub async fn list_security_groups(
        &self,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedSecurityGroup>> {
        let groups = match self.secgroup_source()? {
            SecGroupSource::Nova => {
                normalize_nova_security_groups(self.compute().nova_security_groups().await?)
            }
            _ => ListQuery::<protocol::SecurityGroup>::new(&self.session, Query::new())
                .all()
                .await?
                .into_iter()
                .map(normalize_neutron_security_group)
                .collect(),
        };
        filter_list(groups, None, filters)
    }

    /// Search security groups by name or ID.
    pub async fn search_security_groups(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Vec<NormalizedSecurityGroup>> {
        filter_list(
            self.list_security_groups(None).await?,
            Some(name_or_id),
            filters,
        )
    }

    /// Get a security group by name or ID.
    pub async fn get_security_group(
        &self,
        name_or_id: &str,
        filters: Option<&Filters>,
    ) -> Result<Option<NormalizedSecurityGroup>> {
        get_entity(
            self.options.use_direct_get,
            name_or_id,
            filters,
            self.get_security_group_by_id(name_or_id),
            self.search_security_groups(name_or_id, filters),
        )
        .await
    }

    /// Get a security group by its ID.
    pub async fn get_security_group_by_id(
        &self,
        id: &str,
    ) -> Result<Option<NormalizedSecurityGroup>> {
        Ok(match self.secgroup_source()? {
            SecGroupSource::Nova => resource::get::<NovaSecurityGroup>(&self.session, id)
                .await
                .if_not_found_then_none()?
                .map(|g| normalize_nova_security_group(g, &HashMap::new())),
            _ => resource::get::<protocol::SecurityGroup>(&self.session, id)
                .await
                .if_not_found_then_none()?
                .map(normalize_neutron_security_group),
        })
    }

    async fn required_security_group(&self, name_or_id: &str) -> Result<NormalizedSecurityGroup> {
        self.get_security_group(name_or_id, None)
            .await?
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ResourceNotFound,
                    format!("Security group {} not found", name_or_id),
                )
            })
    }

    /// Create a security group.
    pub async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        project_id: Option<&str>,
        stateful: Option<bool>,
    ) -> Result<NormalizedSecurityGroup> {
        let group = match self.secgroup_source()? {
            SecGroupSource::Nova => {
                let group = self
                    .compute()
                    .create_nova_security_group(name, description)
                    .await?;
                normalize_nova_security_group(group, &HashMap::new())
            }
            _ => {
                let request = protocol::SecurityGroupCreate {
                    description: Some(description.into()),
                    name: name.into(),
                    project_id: project_id.map(From::from),
                    stateful,
                };
                normalize_neutron_security_group(
                    api::create_security_group(&self.session, request).await?,
                )
            }
        };
        info!("Created security group {} with ID {}", group.name, group.id);
        Ok(group)
    }

    /// Update a security group.
    pub async fn update_security_group(
        &self,
        name_or_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        stateful: Option<bool>,
    ) -> Result<NormalizedSecurityGroup> {
        let group = self.required_security_group(name_or_id).await?;
        match self.secgroup_source()? {
            SecGroupSource::Nova => {
                let updated = self
                    .compute()
                    .update_nova_security_group(
                        &group.id,
                        name.unwrap_or(&group.name),
                        description.unwrap_or(&group.description),
                    )
                    .await?;
                Ok(normalize_nova_security_group(updated, &HashMap::new()))
            }
            _ => {
                let update = protocol::SecurityGroupUpdate {
                    description: description.map(From::from),
                    name: name.map(From::from),
                    stateful,
                };
                if update.is_empty() {
                    return Ok(group);
                }
                Ok(normalize_neutron_security_group(
                    api::update_security_group(&self.session, &group.id, update).await?,
                ))
            }
        }
    }

    /// Delete a security group by name or ID.
    pub async fn delete_security_group(&self, name_or_id: &str) -> Result<bool> {
        let source = self.secgroup_source()?;
        let group = match self.get_security_group(name_or_id, None).await? {
            Some(group) => group,
            None => {
                debug!("Security group {} not found for deleting", name_or_id);
                return Ok(false);
            }
        };
        match source {
            SecGroupSource::Nova => {
                resource::delete::<NovaSecurityGroup>(&self.session, &group.id, true).await
            }
            _ => resource::delete::<protocol::SecurityGroup>(&self.session, &group.id, true).await,
        }
    }

    /// Add a rule to a security group.
    pub async fn create_security_group_rule(
        &self,
        group_name_or_id: &str,
        spec: SecurityGroupRuleSpec,
    ) -> Result<NormalizedSecurityGroupRule> {
        let source = self.secgroup_source()?;
        let group = self.required_security_group(group_name_or_id).await?;
        let rule = match source {
            SecGroupSource::Nova => {
                let request = nova_rule_request(&group.id, &spec)?;
                let rule = self
                    .compute()
                    .create_nova_security_group_rule(request)
                    .await?;
                let mut result = normalize_nova_rule(rule, &HashMap::new(), group.project_id.as_ref());
                if result.remote_group_id.is_none() {
                    result.remote_group_id = spec.remote_group_id;
                }
                result
            }
            _ => {
                let request = protocol::SecurityGroupRuleCreate {
                    description: spec.description,
                    direction: spec.direction,
                    ethertype: spec.ethertype,
                    port_range_max: spec.port_range_max,
                    port_range_min: spec.port_range_min,
                    project_id: spec.project_id,
                    protocol: spec.protocol,
                    remote_group_id: spec.remote_group_id,
                    remote_ip_prefix: spec.remote_ip_prefix,
                    security_group_id: group.id.clone(),
                };
                normalize_neutron_rule(api::create_security_group_rule(&self.session, request).await?)
            }
        };
        info!("Created rule {} in security group {}", rule.id, group.id);
        Ok(rule)
    }

    /// Delete a security group rule by ID.
    pub async fn delete_security_group_rule(&self, id: &str) -> Result<bool> {
        let deleted = match self.secgroup_source()? {
            SecGroupSource::Nova => {
                resource::delete::<NovaSecurityGroupRule>(&self.session, id, true).await?
            }
            _ => {
                resource::delete::<protocol::SecurityGroupRule>(&self.session, id, true).await?
            }
        };
        if !deleted {
            debug!("Security group rule {} not found for deleting", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod test {
    use super::super::super::network::{EtherType, RuleDirection};
    use super::super::super::ErrorKind;
    use super::{nova_rule_request, SecurityGroupRuleSpec};

    fn spec(protocol: Option<&str>) -> SecurityGroupRuleSpec {
        SecurityGroupRuleSpec {
            protocol: protocol.map(From::from),
            ..SecurityGroupRuleSpec::default()
        }
    }

    #[test]
    fn test_nova_rule_default_ports() {
        let request = nova_rule_request("g1", &spec(Some("tcp"))).unwrap();
        assert_eq!(request.parent_group_id, "g1");
        assert_eq!(request.from_port, Some(1));
        assert_eq!(request.to_port, Some(65535));

        let request = nova_rule_request("g1", &spec(Some("icmp"))).unwrap();
        assert_eq!(request.from_port, Some(-1));
        assert_eq!(request.to_port, Some(-1));
    }

    #[test]
    fn test_nova_rule_explicit_ports() {
        let rule = SecurityGroupRuleSpec {
            port_range_min: Some(22),
            port_range_max: Some(22),
            remote_ip_prefix: Some("0.0.0.0/0".into()),
            ..spec(Some("tcp"))
        };
        let request = nova_rule_request("g1", &rule).unwrap();
        assert_eq!(request.from_port, Some(22));
        assert_eq!(request.to_port, Some(22));
        assert_eq!(request.cidr.as_deref(), Some("0.0.0.0/0"));
        assert_eq!(request.ip_protocol.as_deref(), Some("tcp"));
    }

    #[test]
    fn test_nova_rule_errors() {
        let egress = SecurityGroupRuleSpec {
            direction: RuleDirection::Egress,
            ..spec(Some("tcp"))
        };
        let err = nova_rule_request("g1", &egress).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("No support for egress rules"));

        let err = nova_rule_request("g1", &spec(None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = nova_rule_request("g1", &spec(Some("gre"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rule_spec_defaults() {
        let rule = SecurityGroupRuleSpec::default();
        assert_eq!(rule.direction, RuleDirection::Ingress);
        assert_eq!(rule.ethertype, EtherType::IPv4);
    }
}
