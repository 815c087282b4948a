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

//! Types and traits shared by all API parts.

use async_trait::async_trait;

use super::super::Result;

/// Trait representing something that can be refreshed.
#[async_trait]
pub trait Refresh {
    /// Refresh the resource representation.
    async fn refresh(&mut self) -> Result<()>;
}

macro_rules! opaque_resource_type {
    ($(#[$attr:meta])* $name:ident) => (
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) value: String,
        }

        impl From<String> for $name {
            fn from(value: String) -> $name {
                $name { value }
            }
        }

        impl<'s> From<&'s str> for $name {
            fn from(value: &'s str) -> $name {
                $name { value: String::from(value) }
            }
        }

        impl<'s> From<&'s String> for $name {
            fn from(value: &'s String) -> $name {
                $name { value: value.clone() }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.value
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.value
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.value, f)
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(&self.value)
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<$name, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: String = ::serde::de::Deserialize::deserialize(deserializer)?;
                Ok($name { value })
            }
        }
    )
}

opaque_resource_type!(#[doc = "An ID or a name of a `Cluster`"] ClusterRef);

opaque_resource_type!(#[doc = "An ID or a name of a `DeviceProfile`"] DeviceProfileRef);

opaque_resource_type!(#[doc = "An ID or a name of a `Flavor`"] FlavorRef);

opaque_resource_type!(#[doc = "An ID or a name of an `Image`"] ImageRef);

opaque_resource_type!(#[doc = "A name of a `KeyPair`"] KeyPairRef);

opaque_resource_type!(#[doc = "An ID or a name of a `Network`"] NetworkRef);

opaque_resource_type!(#[doc = "An ID or a name of a `Policy`"] PolicyRef);

opaque_resource_type!(#[doc = "An ID of a `Port`"] PortRef);

opaque_resource_type!(#[doc = "An ID or a name of a `Profile`"] ProfileRef);

opaque_resource_type!(#[doc = "An ID or a name of a `SecurityGroup`"] SecurityGroupRef);

opaque_resource_type!(#[doc = "An ID or a name of a `Server`"] ServerRef);

#[cfg(test)]
mod test {
    opaque_resource_type!(TestId);

    #[test]
    fn test_opaque_type_basics() {
        let id = TestId::from("foo");
        assert_eq!(id.as_ref(), "foo");
        assert_eq!(&id.to_string(), "foo");
        assert_eq!(id, TestId::from("foo"));
        assert!(id != TestId::from("bar"));
        let s: String = id.into();
        assert_eq!(&s, "foo");
    }

    #[test]
    fn test_opaque_type_serde() {
        let id: TestId = serde_json::from_str("\"foo\"").unwrap();
        assert_eq!(id.as_ref(), "foo");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"foo\"");
    }
}
