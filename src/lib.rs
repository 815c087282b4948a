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

//! OpenStack SDK in Rust.
//!
//! The crate has two layers:
//!
//! * [Connection](struct.Connection.html) gives access to per-service
//!   proxies (compute, network, accelerator, clustering) that map closely to
//!   the REST resources of each service.
//! * [Cloud](cloud/struct.Cloud.html) is a higher level layer with
//!   verb-oriented operations returning normalized records, filtering helpers
//!   and the logic to deal with both Neutron and Nova-network deployments.
//!
//! # Usage
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//!
//! # async fn example() -> openstacksdk::Result<()> {
//! let conn = openstacksdk::Connection::from_env().await?;
//! let servers: Vec<_> = conn
//!     .compute()
//!     .servers()
//!     .with_status(openstacksdk::compute::ServerStatus::Active)
//!     .into_stream()
//!     .try_collect()
//!     .await?;
//! for server in servers {
//!     println!("{}: {}", server.id(), server.name());
//! }
//! # Ok(()) }
//! ```
//!
//! # Features
//!
//! Each service is behind a cargo feature of the same name: `compute`,
//! `network`, `accelerator`, `clustering`. The `cloud` feature enables the
//! compatibility layer and requires `compute` and `network`.

#![crate_name = "openstacksdk"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
#![deny(
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unsafe_code,
    while_true
)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_results
)]
#![allow(unused_macros)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

#[cfg(feature = "accelerator")]
pub mod accelerator;
#[cfg(feature = "cloud")]
pub mod cloud;
#[cfg(feature = "clustering")]
pub mod clustering;
mod common;
#[cfg(feature = "compute")]
pub mod compute;
mod connection;
#[cfg(feature = "network")]
pub mod network;
pub mod resource;
mod utils;

pub use osauth::{ApiVersion, AuthType, EndpointFilters, Error, ErrorKind, InterfaceType, Session};

/// A result of an OpenStack operation.
pub type Result<T> = ::std::result::Result<T, Error>;

pub use crate::common::{
    iterate_timeout, ClusterRef, DeletionWaiter, DeviceProfileRef, FlavorRef, ImageRef,
    IterateTimeout, KeyPairRef, NetworkRef, PolicyRef, PortRef, ProfileRef, Refresh,
    ResourceIterator, ResourceQuery, SecurityGroupRef, ServerRef,
};
pub use crate::connection::Connection;
pub use crate::utils::{Query, ResultExt, Sort, SortDir};
