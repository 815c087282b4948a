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

//! Foundation bits exposing the Compute API.

use std::collections::HashMap;
use std::fmt::Debug;
use std::net::IpAddr;

use osauth::services::COMPUTE;
use serde::Serialize;
use serde_json::{json, Value};

use super::super::resource::{self, wrap_body};
use super::super::utils::{self, Query};
use super::super::{ApiVersion, ErrorKind, Result, Session};
use super::protocol::*;

/// Microversion that allows updating server descriptions.
const API_VERSION_SERVER_DESCRIPTION: ApiVersion = ApiVersion(2, 19);

/// Get a server by its ID.
pub async fn get_server_by_id<S: AsRef<str>>(session: &Session, id: S) -> Result<Server> {
    resource::get::<Server>(session, id.as_ref()).await
}

/// Get a server by its ID or name.
pub async fn get_server<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Server> {
    let s = id_or_name.as_ref();
    match get_server_by_id(session, s).await {
        Ok(value) => Ok(value),
        Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
            get_server_by_name(session, s).await
        }
        Err(err) => Err(err),
    }
}

/// Get a server by its name.
///
/// Nova treats the name filter as a regular expression, so the results are
/// matched exactly on the client side.
pub async fn get_server_by_name<S: AsRef<str>>(session: &Session, name: S) -> Result<Server> {
    trace!("Get server by name {}", name.as_ref());
    let mut query = Query::new();
    query.push_str("name", name.as_ref());
    let servers = list_servers(session, &query).await?;
    resource::find_in(servers, name.as_ref())
}

/// List servers with details.
pub async fn list_servers<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Server>> {
    resource::list_at::<Server, Q>(session, &["servers", "detail"], query).await
}

/// Create a server and return its ID.
pub async fn create_server(session: &Session, request: ServerCreate) -> Result<String> {
    debug!("Creating a server with {:?}", request);
    let body = ServerCreateRoot { server: request };
    let root: CreatedServerRoot = session
        .post(COMPUTE, &["servers"])
        .json(&body)
        .fetch()
        .await?;
    trace!("Requested creation of server {:?}", root.server);
    Ok(root.server.id)
}

/// Update a server.
pub async fn update_server<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: ServerUpdate,
) -> Result<Server> {
    debug!("Updating server {} with {:?}", id.as_ref(), update);
    let needs_description = update.description.is_some();
    let body = ServerUpdateRoot { server: update };
    let mut builder = session.put(COMPUTE, &["servers", id.as_ref()]);
    if needs_description {
        builder = builder.api_version(API_VERSION_SERVER_DESCRIPTION);
    }
    let root: Value = builder.json(&body).fetch().await?;
    let server = resource::extract_one::<Server>(root)?;
    debug!("Updated server {}", server.id);
    Ok(server)
}

/// Delete a server.
pub async fn delete_server<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    let _ = resource::delete::<Server>(session, id.as_ref(), false).await?;
    Ok(())
}

/// Run an action on a server.
pub async fn server_action_with_args<S, Q>(
    session: &Session,
    id: S,
    action: &str,
    args: Q,
) -> Result<()>
where
    S: AsRef<str>,
    Q: Serialize + Send + Debug,
{
    trace!("Running {} on server {} with args {:?}", action, id.as_ref(), args);
    let mut body = HashMap::new();
    let _ = body.insert(action, args);
    let _ = session
        .post(COMPUTE, &["servers", id.as_ref(), "action"])
        .json(&body)
        .send()
        .await?;
    debug!("Successfully ran {} on server {}", action, id.as_ref());
    Ok(())
}

/// Run an action on a server without arguments.
pub async fn server_simple_action<S: AsRef<str>>(session: &Session, id: S, action: &str) -> Result<()> {
    server_action_with_args(session, id, action, Value::Null).await
}

/// Reboot a server.
pub async fn reboot_server<S: AsRef<str>>(
    session: &Session,
    id: S,
    reboot_type: RebootType,
) -> Result<()> {
    server_action_with_args(session, id, "reboot", json!({ "type": reboot_type })).await
}

/// Add a security group to a server.
pub async fn add_security_group<S1, S2>(session: &Session, id: S1, group: S2) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    server_action_with_args(
        session,
        id,
        "addSecurityGroup",
        json!({ "name": group.as_ref() }),
    )
    .await
}

/// Remove a security group from a server.
pub async fn remove_security_group<S1, S2>(session: &Session, id: S1, group: S2) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    server_action_with_args(
        session,
        id,
        "removeSecurityGroup",
        json!({ "name": group.as_ref() }),
    )
    .await
}

/// Attach a Nova-network floating IP to a server.
pub async fn add_floating_ip<S: AsRef<str>>(
    session: &Session,
    id: S,
    address: IpAddr,
    fixed_address: Option<IpAddr>,
) -> Result<()> {
    let args = AddFloatingIp {
        address,
        fixed_address,
    };
    server_action_with_args(session, id, "addFloatingIp", args).await
}

/// Detach a Nova-network floating IP from a server.
pub async fn remove_floating_ip<S: AsRef<str>>(session: &Session, id: S, address: IpAddr) -> Result<()> {
    server_action_with_args(session, id, "removeFloatingIp", RemoveFloatingIp { address }).await
}

/// List flavors with details.
pub async fn list_flavors<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<Flavor>> {
    resource::list_at::<Flavor, Q>(session, &["flavors", "detail"], query).await
}

/// Get a flavor by its ID or name.
pub async fn get_flavor<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Flavor> {
    let s = id_or_name.as_ref();
    match resource::get::<Flavor>(session, s).await {
        Ok(value) => Ok(value),
        Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
            // Flavors do not support filtering by name.
            let flavors = list_flavors(session, &Query::new()).await?;
            resource::find_in(flavors, s)
        }
        Err(err) => Err(err),
    }
}

/// Get an image by its ID or name.
pub async fn get_image<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<Image> {
    resource::find::<Image>(session, id_or_name.as_ref()).await
}

/// Resolve an image reference into an image ID.
///
/// Values that look like UUIDs are used as they are.
pub async fn resolve_image<S: AsRef<str>>(session: &Session, id_or_name: S) -> Result<String> {
    let s = id_or_name.as_ref();
    if utils::is_uuid_like(s) {
        return Ok(s.to_string());
    }
    let image = get_image(session, s).await?;
    debug!("Resolved image {} into {}", s, image.id);
    Ok(image.id)
}

/// Get extra specs of a flavor.
pub async fn get_extra_specs_by_flavor_id<S: AsRef<str>>(
    session: &Session,
    id: S,
) -> Result<HashMap<String, String>> {
    trace!("Get compute extra specs by ID {}", id.as_ref());
    let root: ExtraSpecsRoot = session
        .get(COMPUTE, &["flavors", id.as_ref(), "os-extra_specs"])
        .fetch()
        .await?;
    trace!("Received {:?}", root.extra_specs);
    Ok(root.extra_specs)
}

/// List key pairs.
pub async fn list_keypairs<Q: Serialize + Sync + Debug>(
    session: &Session,
    query: &Q,
) -> Result<Vec<KeyPair>> {
    trace!("Listing key pairs with {:?}", query);
    let root: KeyPairsRoot = session
        .get(COMPUTE, &["os-keypairs"])
        .query(query)
        .fetch()
        .await?;
    let result: Vec<KeyPair> = root.keypairs.into_iter().map(|x| x.keypair).collect();
    trace!("Received key pairs: {:?}", result);
    Ok(result)
}

/// Create a key pair.
///
/// If no public key is provided, the private key of the generated pair is
/// returned in the result.
pub async fn create_keypair(session: &Session, request: KeyPairCreate) -> Result<KeyPair> {
    debug!("Creating a key pair {}", request.name);
    let body = KeyPairCreateRoot { keypair: request };
    let root: KeyPairRoot = session
        .post(COMPUTE, &["os-keypairs"])
        .json(&body)
        .fetch()
        .await?;
    debug!("Created key pair {}", root.keypair.name);
    Ok(root.keypair)
}

/// Create a Nova-network floating IP.
pub async fn create_nova_floating_ip(session: &Session, pool: Option<String>) -> Result<NovaFloatingIp> {
    let body = NovaFloatingIpCreate { pool };
    resource::create::<NovaFloatingIp, _>(session, &body).await
}

/// Update a Nova-network security group.
pub async fn update_nova_security_group<S: AsRef<str>>(
    session: &Session,
    id: S,
    update: NovaSecurityGroupUpdate,
) -> Result<NovaSecurityGroup> {
    let body = wrap_body::<NovaSecurityGroup, _>(&update)?;
    resource::update::<NovaSecurityGroup, _>(session, id.as_ref(), &body).await
}

/// Create a Nova-network security group rule.
pub async fn create_nova_security_group_rule(
    session: &Session,
    request: NovaSecurityGroupRuleCreate,
) -> Result<NovaSecurityGroupRule> {
    let body = wrap_body::<NovaSecurityGroupRule, _>(&request)?;
    resource::create::<NovaSecurityGroupRule, _>(session, &body).await
}

#[cfg(test)]
mod test {
    use osauth::NoAuth;

    use super::*;

    async fn unreachable_session() -> Session {
        let auth = NoAuth::new("http://127.0.0.1:9/").unwrap();
        Session::new(auth).await.unwrap()
    }

    #[tokio::test]
    async fn test_resolve_image_by_id() {
        let session = unreachable_session().await;
        let id = "0a7c6a4e-5f2a-4d2b-9d4e-3f7c2b1a0e9d";
        assert_eq!(resolve_image(&session, id).await.unwrap(), id);
    }
}
