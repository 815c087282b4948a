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

use std::env;
use std::sync::Once;

use futures::TryStreamExt;

static INIT: Once = Once::new();

async fn set_up() -> Option<openstacksdk::Connection> {
    if env::var_os("OS_CLOUD").is_none() && env::var_os("OS_AUTH_URL").is_none() {
        return None;
    }

    INIT.call_once(|| {
        env_logger::init();
    });

    Some(
        openstacksdk::Connection::from_env()
            .await
            .expect("Failed to create a connection from the environment"),
    )
}

#[tokio::test]
async fn test_list_flavors() {
    let Some(conn) = set_up().await else { return };
    let items = conn
        .compute()
        .flavors()
        .all()
        .await
        .expect("Cannot list flavors");
    assert!(!items.is_empty());
}

#[tokio::test]
async fn test_list_keypairs() {
    let Some(conn) = set_up().await else { return };
    let _ = conn.compute().keypairs().await.expect("Cannot list key pairs");
}

#[tokio::test]
async fn test_list_servers() {
    let Some(conn) = set_up().await else { return };
    let _: Vec<_> = conn
        .compute()
        .servers()
        .with_limit(5)
        .into_stream()
        .try_collect()
        .await
        .expect("Cannot list servers");
}

#[tokio::test]
async fn test_list_networks() {
    let Some(conn) = set_up().await else { return };
    let items = conn
        .network()
        .networks()
        .all()
        .await
        .expect("Cannot list networks");
    assert!(!items.is_empty());
}

#[tokio::test]
async fn test_list_ports() {
    let Some(conn) = set_up().await else { return };
    let _ = conn.network().ports().all().await.expect("Cannot list ports");
}

#[tokio::test]
async fn test_list_security_groups() {
    let Some(conn) = set_up().await else { return };
    let items = conn
        .network()
        .security_groups(None)
        .await
        .expect("Cannot list security groups");
    assert!(items.iter().any(|g| g.name() == "default"));
}
