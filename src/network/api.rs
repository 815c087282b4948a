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

//! Foundation bits exposing the Network API.

use std::fmt::Debug;

use serde::Serialize;

use super::super::resource::{self, wrap_body, Resource};
use super::super::{ErrorKind, Result, Session};
use super::protocol::*;

/// Get a resource by its ID, falling back to a unique name.
async fn get_by_id_or_name<R: Resource>(session: &Session, id_or_name: &str) -> Result<R> {
    match resource::get::<R>(session, id_or_name).await {
        Ok(value) => Ok(value),
        Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
            trace!("Get {} by name {}", R::RESOURCE_KEY, id_or_name);
            let items = resource::list::<R, _>(session, &[("name", id_or_name)]).await?;
            resource::find_in(items, id_or_name)
        }
        Err(err) => Err(err),
    }
}

/// Get a network by its ID or name.
pub async fn get_network<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Network> {
    get_by_id_or_name(session, id_or_name.as_ref()).await
}

/// List networks.
pub async fn list_networks<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Network>> {
    resource::list(session, query).await
}

/// Create a network.
pub async fn create_network(session: &Session, request: NetworkCreate) -> Result<Network> {
    let body = wrap_body::<Network, _>(&request)?;
    resource::create(session, &body).await
}

/// Update a network.
pub async fn update_network<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: NetworkUpdate,
) -> Result<Network> {
    let body = wrap_body::<Network, _>(&update)?;
    resource::update(session, id.as_ref(), &body).await
}

/// Get a port by its ID or name.
pub async fn get_port<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Port> {
    get_by_id_or_name(session, id_or_name.as_ref()).await
}

/// List ports.
pub async fn list_ports<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Port>> {
    resource::list(session, query).await
}

/// Get a floating IP by its ID.
pub async fn get_floating_ip<S: AsRef<str>>(session: &Session, id: S) -> Result<FloatingIp> {
    resource::get(session, id.as_ref()).await
}

/// List floating IPs.
pub async fn list_floating_ips<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<FloatingIp>> {
    resource::list(session, query).await
}

/// Create a floating IP.
pub async fn create_floating_ip(session: &Session, request: FloatingIpCreate) -> Result<FloatingIp> {
    let body = wrap_body::<FloatingIp, _>(&request)?;
    resource::create(session, &body).await
}

/// Update a floating IP (associate with or dissociate from a port).
pub async fn update_floating_ip<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: FloatingIpUpdate,
) -> Result<FloatingIp> {
    let body = wrap_body::<FloatingIp, _>(&update)?;
    resource::update(session, id.as_ref(), &body).await
}

/// Get a security group by its ID or name.
pub async fn get_security_group<S: AsRef<str>>(
    session: &Session,
    id_or_name: S,
) -> Result<SecurityGroup> {
    get_by_id_or_name(session, id_or_name.as_ref()).await
}

/// List security groups.
pub async fn list_security_groups<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<SecurityGroup>> {
    resource::list(session, query).await
}

/// Create a security group.
pub async fn create_security_group(
    session: &Session,
    request: SecurityGroupCreate,
) -> Result<SecurityGroup> {
    let body = wrap_body::<SecurityGroup, _>(&request)?;
    resource::create(session, &body).await
}

/// Update a security group.
pub async fn update_security_group<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: SecurityGroupUpdate,
) -> Result<SecurityGroup> {
    let body = wrap_body::<SecurityGroup, _>(&update)?;
    resource::update(session, id.as_ref(), &body).await
}

/// List security group rules.
pub async fn list_security_group_rules<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<SecurityGroupRule>> {
    resource::list(session, query).await
}

/// Create a security group rule.
pub async fn create_security_group_rule(
    session: &Session,
    request: SecurityGroupRuleCreate,
) -> Result<SecurityGroupRule> {
    let body = wrap_body::<SecurityGroupRule, _>(&request)?;
    resource::create(session, &body).await
}
