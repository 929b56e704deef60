use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::kv::KvVersion;
use crate::session::Session;
use crate::Error;

const MOUNTS_PATH: &str = "sys/internal/ui/mounts";

/// The config of a secret engine mount
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MountConfig {
    /// The default lease TTL of the engine in seconds
    #[serde(default)]
    pub default_lease_ttl: u64,
    /// The maximum lease TTL of the engine in seconds
    #[serde(default)]
    pub max_lease_ttl: u64,
    /// Whether caching is disabled for the engine
    #[serde(default)]
    pub force_no_cache: bool,
    /// The plugin backing the engine
    #[serde(default)]
    pub plugin_name: String,
}

/// A secret engine as listed by vault's mount table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretEngineMount {
    /// The path the engine is mounted at, including the trailing slash
    #[serde(skip)]
    pub name: String,
    /// The type of the engine, e.g. `kv`
    #[serde(default, rename = "type")]
    pub engine_type: String,
    /// The accessor of the mount
    #[serde(default)]
    pub accessor: String,
    /// The description of the mount
    #[serde(default)]
    pub description: String,
    /// Whether the mount is local to the cluster
    #[serde(default)]
    pub local: bool,
    /// Whether seal wrapping is enabled
    #[serde(default)]
    pub seal_wrap: bool,
    /// The lease config of the mount
    #[serde(default)]
    pub config: MountConfig,
    /// The engine options, the kv engine stores its version here
    #[serde(default)]
    pub options: Option<HashMap<String, Value>>,
}

impl SecretEngineMount {
    /// The kv version of this mount. Mounts without a string `version` option
    /// are version 1
    pub fn kv_version(&self) -> KvVersion {
        match self.options.as_ref().and_then(|o| o.get("version")) {
            Some(Value::String(marker)) => KvVersion::from_marker(marker),
            _ => KvVersion::V1,
        }
    }
}

/// The `data` of the mount table response, only the secret engines are used
#[derive(Deserialize)]
struct MountList {
    #[serde(default)]
    secret: HashMap<String, SecretEngineMount>,
}

/// The mount a secret path belongs to
#[derive(Debug, Clone)]
pub struct MountResolution {
    /// The name of the mount, e.g. `kv_v2/path/`
    pub mount: String,
    /// The kv version of the mount
    pub version: KvVersion,
    /// The full description of the mount
    pub engine: SecretEngineMount,
}

impl MountResolution {
    /// The api path to read the given secret from. Version 2 engines keep the
    /// values one level down, under `data/`
    pub fn secret_path(&self, path: &str) -> String {
        match self.version {
            KvVersion::V2 => {
                let remainder = path.strip_prefix(self.mount.as_str()).unwrap_or(path);
                format!("{}data/{}", self.mount, remainder)
            }
            KvVersion::V1 => path.to_string(),
        }
    }
}

/// Selects the mount the path belongs to. When several mounts are a prefix of
/// the path the longest one wins
pub fn select_mount<'a>(
    mounts: &'a HashMap<String, SecretEngineMount>,
    path: &str,
) -> Option<(&'a String, &'a SecretEngineMount)> {
    mounts
        .iter()
        .filter(|(name, _)| path.starts_with(name.as_str()))
        .max_by_key(|(name, _)| name.len())
}

/// Loads the mount table from vault and determines the mount and kv version
/// of the given secret path. Nothing is cached, every call asks vault again
pub(crate) async fn resolve(session: &Session, path: &str) -> Result<MountResolution, Error> {
    let response = session
        .request::<()>(Method::GET, MOUNTS_PATH, None)
        .await?;
    let mounts: MountList = response.decode_data(MOUNTS_PATH)?;

    let (name, engine) = select_mount(&mounts.secret, path)
        .ok_or_else(|| Error::KvVersionNotFound(path.to_string()))?;

    let version = engine.kv_version();
    log::debug!("secret '{}' is in mount '{}', kv version {}", path, name, version);

    Ok(MountResolution {
        mount: name.clone(),
        version,
        engine: SecretEngineMount {
            name: name.clone(),
            ..engine.clone()
        },
    })
}
