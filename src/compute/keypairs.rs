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

//! Key pair management via Compute API.

use async_trait::async_trait;

use super::super::common::Refresh;
use super::super::resource;
use super::super::{Result, Session};
use super::{api, protocol};

/// Structure representing a key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    session: Session,
    inner: protocol::KeyPair,
}

/// A request to create a key pair.
#[derive(Clone, Debug)]
pub struct NewKeyPair {
    session: Session,
    inner: protocol::KeyPairCreate,
}

impl KeyPair {
    /// Load a KeyPair object.
    pub(crate) async fn load<Id: AsRef<str>>(session: Session, id: Id) -> Result<KeyPair> {
        let inner = resource::get::<protocol::KeyPair>(&session, id.as_ref()).await?;
        Ok(KeyPair { session, inner })
    }

    pub(crate) fn new(session: Session, inner: protocol::KeyPair) -> KeyPair {
        KeyPair { session, inner }
    }

    /// Raw key pair representation.
    pub(crate) fn inner(&self) -> &protocol::KeyPair {
        &self.inner
    }

    /// Delete the key pair.
    pub async fn delete(self) -> Result<()> {
        let _ = resource::delete::<protocol::KeyPair>(&self.session, &self.inner.name, false).await?;
        Ok(())
    }

    transparent_property! {
        #[doc = "Key pair fingerprint."]
        fingerprint: ref String
    }

    transparent_property! {
        #[doc = "Key pair type, if available."]
        key_type: Option<protocol::KeyPairType>
    }

    transparent_property! {
        #[doc = "Key pair name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "Private key, only available right after generating the pair."]
        private_key: ref Option<String>
    }

    transparent_property! {
        #[doc = "Public key."]
        public_key: ref String
    }
}

#[async_trait]
impl Refresh for KeyPair {
    /// Refresh the key pair.
    async fn refresh(&mut self) -> Result<()> {
        let private_key = self.inner.private_key.take();
        self.inner = resource::get::<protocol::KeyPair>(&self.session, &self.inner.name).await?;
        if self.inner.private_key.is_none() {
            self.inner.private_key = private_key;
        }
        Ok(())
    }
}

impl NewKeyPair {
    /// Start creating a key pair.
    pub(crate) fn new(session: Session, name: String) -> NewKeyPair {
        NewKeyPair {
            session,
            inner: protocol::KeyPairCreate::new(name),
        }
    }

    /// Request creation of the key pair.
    ///
    /// Without a public key, the server generates the pair and the result
    /// holds the private key.
    pub async fn create(self) -> Result<KeyPair> {
        let inner = api::create_keypair(&self.session, self.inner).await?;
        Ok(KeyPair {
            session: self.session,
            inner,
        })
    }

    creation_inner_field! {
        #[doc = "Set the type of the key pair."]
        set_key_type, with_key_type -> key_type: optional protocol::KeyPairType
    }

    creation_inner_field! {
        #[doc = "Set the public key to import."]
        set_public_key, with_public_key -> public_key: optional String
    }
}
