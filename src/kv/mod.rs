//! Reading secrets from the kv secret engines, version 1 and 2.
//!
//! Which version a path belongs to is looked up in vault's mount table on
//! every read, so a remounted engine is picked up right away

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::Error;

mod get;
mod mounts;

pub(crate) use get::get;
pub(crate) use mounts::resolve;
pub use mounts::{select_mount, MountConfig, MountResolution, SecretEngineMount};

/// The version of a kv secret engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvVersion {
    /// The unversioned kv engine
    V1,
    /// The versioned kv engine
    V2,
}

impl KvVersion {
    /// Parses the `version` option of a mount. Unknown markers are treated as
    /// version 1
    pub fn from_marker(marker: &str) -> KvVersion {
        match marker {
            "2" => KvVersion::V2,
            "1" | "" => KvVersion::V1,
            other => {
                log::warn!("unknown kv version '{}', reading it as version 1", other);
                KvVersion::V1
            }
        }
    }

    /// The version as vault writes it in the mount options
    pub fn as_str(&self) -> &'static str {
        match self {
            KvVersion::V1 => "1",
            KvVersion::V2 => "2",
        }
    }
}

impl fmt::Display for KvVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret read from a kv engine.
///
/// A secret is either a flat map of strings or, as soon as one of its values
/// is not a string, a single json document
#[derive(Clone)]
pub enum Secret {
    /// Every value of the secret was a string
    Kv(HashMap<String, String>),
    /// The raw json of the secret
    Json(Box<RawValue>),
}

impl Secret {
    /// The key-value pairs, if this is a flat secret
    pub fn as_kv(&self) -> Option<&HashMap<String, String>> {
        match self {
            Secret::Kv(kv) => Some(kv),
            Secret::Json(_) => None,
        }
    }

    /// The raw json document, if this is a json secret
    pub fn as_json(&self) -> Option<&RawValue> {
        match self {
            Secret::Kv(_) => None,
            Secret::Json(raw) => Some(&**raw),
        }
    }

    /// Shortcut to a single value of a flat secret
    pub fn get(&self, key: &str) -> Option<&str> {
        self.as_kv()?.get(key).map(String::as_str)
    }

    /// Deserializes the secret into the given type, works for both shapes
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let context = "secret";
        match self {
            Secret::Kv(kv) => serde_json::to_value(kv)
                .and_then(serde_json::from_value)
                .map_err(|e| Error::decode(context, e)),
            Secret::Json(raw) => {
                serde_json::from_str(raw.get()).map_err(|e| Error::decode(context, e))
            }
        }
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Secret::Kv(a), Secret::Kv(b)) => a == b,
            (Secret::Json(a), Secret::Json(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

// Only the keys are printed, the values are secret
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Secret::Kv(kv) => {
                let mut keys: Vec<&String> = kv.keys().collect();
                keys.sort();
                f.debug_tuple("Kv").field(&keys).finish()
            }
            Secret::Json(raw) => f
                .debug_tuple("Json")
                .field(&format_args!("<{} bytes>", raw.get().len()))
                .finish(),
        }
    }
}
