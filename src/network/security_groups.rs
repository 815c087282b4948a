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

//! Security groups and their rules via Network API.

use std::collections::HashSet;

use async_trait::async_trait;

use super::super::common::{Refresh, SecurityGroupRef};
use super::super::resource;
use super::super::utils::Query;
use super::super::{Result, Session};
use super::{api, protocol};

/// Structure representing a security group.
#[derive(Clone, Debug)]
pub struct SecurityGroup {
    session: Session,
    inner: protocol::SecurityGroup,
    dirty: HashSet<&'static str>,
}

/// A request to create a security group.
#[derive(Clone, Debug)]
pub struct NewSecurityGroup {
    session: Session,
    inner: protocol::SecurityGroupCreate,
}

/// A request to create a security group rule.
#[derive(Clone, Debug)]
pub struct NewSecurityGroupRule {
    session: Session,
    group: SecurityGroupRef,
    inner: protocol::SecurityGroupRuleCreate,
}

impl SecurityGroup {
    pub(crate) fn new(session: Session, inner: protocol::SecurityGroup) -> SecurityGroup {
        SecurityGroup {
            session,
            inner,
            dirty: HashSet::new(),
        }
    }

    /// Load a SecurityGroup object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<SecurityGroup> {
        let inner = api::get_security_group(&session, id).await?;
        Ok(SecurityGroup::new(session, inner))
    }

    /// Raw security group representation.
    pub(crate) fn inner(&self) -> &protocol::SecurityGroup {
        &self.inner
    }

    transparent_property! {
        #[doc = "Description."]
        description: ref Option<String>
    }

    update_field! {
        #[doc = "Update the description."]
        set_description, with_description -> description: optional String
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Security group name."]
        name: ref String
    }

    update_field! {
        #[doc = "Update the name."]
        set_name, with_name -> name: String
    }

    transparent_property! {
        #[doc = "Project ID."]
        project_id: ref Option<String>
    }

    transparent_property! {
        #[doc = "Rules of the security group."]
        security_group_rules: ref Vec<protocol::SecurityGroupRule>
    }

    transparent_property! {
        #[doc = "Whether the security group is stateful."]
        stateful: Option<bool>
    }

    update_field! {
        #[doc = "Update whether the security group is stateful."]
        set_stateful, with_stateful -> stateful: optional bool
    }

    /// Whether the security group is modified.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Save the changes to the security group.
    pub async fn save(&mut self) -> Result<()> {
        let mut update = protocol::SecurityGroupUpdate::default();
        save_fields! {
            self -> update: name
        };
        save_option_fields! {
            self -> update: description stateful
        };
        if update.is_empty() {
            return Ok(());
        }
        self.inner = api::update_security_group(&self.session, &self.inner.id, update).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Delete the security group.
    pub async fn delete(self) -> Result<()> {
        let _ = resource::delete::<protocol::SecurityGroup>(&self.session, &self.inner.id, false)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Refresh for SecurityGroup {
    /// Refresh the security group.
    async fn refresh(&mut self) -> Result<()> {
        self.inner = resource::get(&self.session, &self.inner.id).await?;
        self.dirty.clear();
        Ok(())
    }
}

impl NewSecurityGroup {
    pub(crate) fn new(session: Session, name: String) -> NewSecurityGroup {
        NewSecurityGroup {
            session,
            inner: protocol::SecurityGroupCreate {
                name,
                ..Default::default()
            },
        }
    }

    /// Request creation of the security group.
    pub async fn create(self) -> Result<SecurityGroup> {
        let inner = api::create_security_group(&self.session, self.inner).await?;
        Ok(SecurityGroup::new(self.session, inner))
    }

    creation_inner_field! {
        #[doc = "Set a description."]
        set_description, with_description -> description: optional String
    }

    creation_inner_field! {
        #[doc = "Create the group in another project (admin only)."]
        set_project_id, with_project_id -> project_id: optional String
    }

    creation_inner_field! {
        #[doc = "Set whether the group is stateful."]
        set_stateful, with_stateful -> stateful: optional bool
    }
}

impl NewSecurityGroupRule {
    pub(crate) fn new(
        session: Session,
        group: SecurityGroupRef,
        direction: protocol::RuleDirection,
    ) -> NewSecurityGroupRule {
        NewSecurityGroupRule {
            session,
            group,
            inner: protocol::SecurityGroupRuleCreate::new(String::new(), direction),
        }
    }

    /// Request creation of the rule.
    pub async fn create(mut self) -> Result<protocol::SecurityGroupRule> {
        let group = api::get_security_group(&self.session, &self.group).await?;
        self.inner.security_group_id = group.id;
        api::create_security_group_rule(&self.session, self.inner).await
    }

    creation_inner_field! {
        #[doc = "Set a description."]
        set_description, with_description -> description: optional String
    }

    creation_inner_field! {
        #[doc = "Set the ethernet type (IPv4 by default)."]
        set_ethertype, with_ethertype -> ethertype: protocol::EtherType
    }

    /// Set the port range (both ends inclusive).
    pub fn with_port_range(mut self, min: u16, max: u16) -> Self {
        self.inner.port_range_min = Some(min);
        self.inner.port_range_max = Some(max);
        self
    }

    creation_inner_field! {
        #[doc = "Set the IP protocol (e.g. `tcp`)."]
        set_protocol, with_protocol -> protocol: optional String
    }

    creation_inner_field! {
        #[doc = "Allow traffic from the given security group."]
        set_remote_group_id, with_remote_group_id -> remote_group_id: optional String
    }

    creation_inner_field! {
        #[doc = "Allow traffic from the given CIDR."]
        set_remote_ip_prefix, with_remote_ip_prefix -> remote_ip_prefix: optional String
    }
}

/// List security groups matching the query.
pub(crate) async fn list_security_groups(
    session: &Session,
    query: &Query,
) -> Result<Vec<SecurityGroup>> {
    Ok(api::list_security_groups(session, query)
        .await?
        .into_iter()
        .map(|item| SecurityGroup::new(session.clone(), item))
        .collect())
}
