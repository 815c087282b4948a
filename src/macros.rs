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

//! Macros used to declare resources.

/// An enumeration backed by a string or an integer on the wire.
///
/// The `= Default` form deserializes unknown values into the given variant
/// instead of failing.
macro_rules! protocol_enum {
    {$(#[$attr:meta])* enum $name:ident: $carrier:ty {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: $carrier {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: $carrier = ::serde::de::Deserialize::deserialize(deserializer)?;
                match value {
                    $($val => Ok($name::$item)),+,
                    other => {
                        use ::serde::de::Error;
                        let err = format!("Unexpected {}: {}", stringify!($name), other);
                        Err(D::Error::custom(err))
                    }
                }
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                ::serde::ser::Serialize::serialize(&<$carrier>::from(*self), serializer)
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: String {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: String = ::serde::de::Deserialize::deserialize(deserializer)?;
                match value.as_str() {
                    $($val => Ok($name::$item)),+,
                    other => {
                        use ::serde::de::Error;
                        let err = format!("Unexpected {}: {}", stringify!($name), other);
                        Err(D::Error::custom(err))
                    }
                }
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(
                    match *self {
                        $($name::$item => $val),+,
                    }
                )
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident = $default:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        protocol_enum! {
            $(#[$attr])*
            __private $name: String {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::$default
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: String = ::serde::de::Deserialize::deserialize(deserializer)?;
                Ok(match value.as_str() {
                    $($val => $name::$item),+,
                    _ => Default::default()
                })
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(
                    match *self {
                        $($name::$item => $val),+,
                    }
                )
            }
        }
    );

    {$(#[$attr:meta])* __private $name:ident: $carrier:ty {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$iattr])* $item),+,
        }

        impl From<$name> for $carrier {
            fn from(value: $name) -> $carrier {
                match value {
                    $($name::$item => $val.into()),+,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&<$carrier>::from(*self), f)
            }
        }
    );
}

/// Read-only accessor to a field of the inner protocol structure.
macro_rules! transparent_property {
    ($(#[$attr:meta])* $name:ident: ref $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> &$type {
            &self.inner.$name
        }
    );

    ($(#[$attr:meta])* $name:ident: $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> $type {
            self.inner.$name
        }
    );
}

/// Setters for a field that can be updated and saved later.
macro_rules! update_field {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: optional $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = Some(value.into());
            self.dirty.insert(stringify!($name));
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        #[allow(unused_results)]
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = value.into();
            self.dirty.insert(stringify!($name));
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );
}

/// Copy dirty mandatory fields into an update structure with optional fields.
macro_rules! save_fields {
    ($self:ident -> $update:ident: $($field:ident)+) => (
        $(if $self.dirty.contains(stringify!($field)) {
            $update.$field = Some($self.inner.$field.clone());
        })+
    );
}

/// Copy dirty optional fields into an update structure.
macro_rules! save_option_fields {
    ($self:ident -> $update:ident: $($field:ident)+) => (
        $(if $self.dirty.contains(stringify!($field)) {
            $update.$field = $self.inner.$field.clone();
        })+
    );
}

/// Setters adding a filter to a query.
macro_rules! query_filter {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident) => (
        $(#[$attr])*
        pub fn $set_func<T: Into<String>>(&mut self, value: T) {
            self.query.push_str(stringify!($name), value);
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<T: Into<String>>(mut self, value: T) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        pub fn $set_func(&mut self, value: $type) {
            self.query.push(stringify!($name), value);
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func(mut self, value: $type) -> Self {
            self.$set_func(value);
            self
        }
    );
}

/// Setters for a field of a creation request.
macro_rules! creation_inner_field {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: optional $type:ty) => (
        $(#[$attr])*
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = Some(value.into());
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = value.into();
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    protocol_enum! {
        enum ImageStatus {
            Queued = "queued",
            Active = "active"
        }
    }

    protocol_enum! {
        enum PowerState: u8 {
            NoState = 0,
            Running = 1
        }
    }

    protocol_enum! {
        enum Lenient = Unknown {
            Known = "known",
            Unknown = "unknown"
        }
    }

    #[test]
    fn test_string_enum() {
        assert_eq!("active", ImageStatus::Active.to_string());
        assert_eq!(
            ImageStatus::Queued,
            serde_json::from_str("\"queued\"").unwrap()
        );
        assert_eq!(
            "\"active\"",
            serde_json::to_string(&ImageStatus::Active).unwrap()
        );
        assert!(serde_json::from_str::<ImageStatus>("\"banana\"").is_err());
    }

    #[test]
    fn test_carrier_enum() {
        assert_eq!(1, u8::from(PowerState::Running));
        assert_eq!(PowerState::NoState, serde_json::from_str("0").unwrap());
        assert_eq!("1", serde_json::to_string(&PowerState::Running).unwrap());
        assert!(serde_json::from_str::<PowerState>("42").is_err());
    }

    #[test]
    fn test_enum_with_default() {
        assert_eq!(Lenient::Known, serde_json::from_str("\"known\"").unwrap());
        assert_eq!(Lenient::Unknown, serde_json::from_str("\"banana\"").unwrap());
        assert_eq!(Lenient::Unknown, Lenient::default());
    }

    #[derive(Debug, Default)]
    struct Inner {
        name: String,
        description: Option<String>,
    }

    #[derive(Debug, Default)]
    struct Update {
        name: Option<String>,
        description: Option<String>,
    }

    #[derive(Debug, Default)]
    struct Thing {
        inner: Inner,
        dirty: HashSet<&'static str>,
    }

    impl Thing {
        transparent_property! {
            #[doc = "Name."]
            name: ref String
        }

        update_field! {
            #[doc = "Update the name."]
            set_name, with_name -> name: String
        }

        update_field! {
            #[doc = "Update the description."]
            set_description, with_description -> description: optional String
        }

        fn update(&self) -> Update {
            let mut update = Update::default();
            save_fields! {
                self -> update: name
            };
            save_option_fields! {
                self -> update: description
            };
            update
        }
    }

    #[test]
    fn test_dirty_tracking() {
        let thing = Thing::default().with_name("new");
        assert_eq!(thing.name(), "new");
        let update = thing.update();
        assert_eq!(update.name.as_deref(), Some("new"));
        assert!(update.description.is_none());

        let thing = thing.with_description("desc");
        let update = thing.update();
        assert_eq!(update.description.as_deref(), Some("desc"));
    }
}
