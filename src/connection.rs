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

//! Connection: the entry point to the service proxies.

use osauth::{AuthType, Session};

use super::Result;

/// Connection to an OpenStack cloud.
///
/// Holds an authenticated session and hands out service proxies sharing it.
#[derive(Debug, Clone)]
pub struct Connection {
    session: Session,
}

impl Connection {
    /// Create a new connection with the given authentication method.
    pub async fn new<Auth: AuthType + 'static>(auth_type: Auth) -> Result<Connection> {
        Ok(Connection {
            session: Session::new(auth_type).await?,
        })
    }

    /// Create a new connection from a `clouds.yaml` entry.
    pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Connection> {
        Ok(Connection {
            session: Session::from_config(cloud_name).await?,
        })
    }

    /// Create a new connection from environment variables.
    ///
    /// `OS_CLOUD` selects a `clouds.yaml` entry, otherwise `OS_AUTH_URL` and
    /// related variables are used.
    pub async fn from_env() -> Result<Connection> {
        Ok(Connection {
            session: Session::from_env().await?,
        })
    }

    /// Create a connection from an existing session.
    #[inline]
    pub fn from_session(session: Session) -> Connection {
        Connection { session }
    }

    /// Session used by this connection.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Compute service proxy.
    #[cfg(feature = "compute")]
    pub fn compute(&self) -> super::compute::Proxy {
        super::compute::Proxy::new(self.session.clone())
    }

    /// Network service proxy.
    #[cfg(feature = "network")]
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
}

impl From<Session> for Connection {
    fn from(value: Session) -> Connection {
        Connection::from_session(value)
    }
}
