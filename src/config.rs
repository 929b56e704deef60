use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// The address used when none is configured
pub const DEFAULT_ADDRESS: &str = "http://localhost:8200";
/// The mount point of the approle backend used when none is configured
pub const DEFAULT_APPROLE_MOUNT: &str = "approle";
/// The client timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The credentials used to login with the approle backend
#[derive(Clone, Serialize)]
pub struct AppRoleCredentials {
    /// The role-id for the role to use
    pub role_id: String,
    /// The secret-id for the role
    pub secret_id: String,
    /// The path the approle backend is mounted at
    #[serde(skip)]
    pub mount_point: String,
}

impl AppRoleCredentials {
    /// Creates new credentials for the approle backend mounted at the
    /// default `approle` path
    pub fn new(role_id: impl Into<String>, secret_id: impl Into<String>) -> AppRoleCredentials {
        AppRoleCredentials {
            role_id: role_id.into(),
            secret_id: secret_id.into(),
            mount_point: DEFAULT_APPROLE_MOUNT.to_string(),
        }
    }

    /// Both the role-id and the secret-id are needed for a login
    pub fn is_complete(&self) -> bool {
        !self.role_id.is_empty() && !self.secret_id.is_empty()
    }

    pub(crate) fn mount(&self) -> &str {
        if self.mount_point.is_empty() {
            DEFAULT_APPROLE_MOUNT
        } else {
            self.mount_point.trim_matches('/')
        }
    }
}

impl Default for AppRoleCredentials {
    fn default() -> Self {
        AppRoleCredentials::new("", "")
    }
}

impl fmt::Debug for AppRoleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AppRoleCredentials")
            .field("role_id", &self.role_id)
            .field("secret_id", &"<redacted>")
            .field("mount_point", &self.mount_point)
            .finish()
    }
}

/// The Configuration for a single vault client.
///
/// A static `token` takes precedence over the approle credentials
#[derive(Clone)]
pub struct Config {
    /// The base url of the vault server
    pub address: String,
    /// A PEM file with an additional CA certificate to trust
    pub ca_cert: Option<PathBuf>,
    /// A static token to use instead of an approle login
    pub token: Option<String>,
    /// The approle credentials used when no static token is set
    pub approle: AppRoleCredentials,
    /// The timeout for every single request made to vault
    pub timeout: Duration,
    /// Disables the verification of the servers TLS certificate
    pub insecure_skip_verify: bool,
    /// The vault enterprise namespace to send requests to
    pub namespace: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: DEFAULT_ADDRESS.to_string(),
            ca_cert: None,
            token: None,
            approle: AppRoleCredentials::default(),
            timeout: DEFAULT_TIMEOUT,
            insecure_skip_verify: false,
            namespace: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("ca_cert", &self.ca_cert)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("approle", &self.approle)
            .field("timeout", &self.timeout)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from the environment, falling back to the
    /// default for everything that is not set.
    ///
    /// Environment-Variables:
    /// * `VAULT_ADDR`: The vault address (default `http://localhost:8200`)
    /// * `VAULT_CACERT`: Path to a PEM encoded CA certificate
    /// * `VAULT_TOKEN`: A static token, used instead of approle
    /// * `VAULT_ROLEID`: The approle role-id
    /// * `VAULT_SECRETID`: The approle secret-id
    /// * `VAULT_MOUNTPOINT`: The approle mount point (default `approle`)
    /// * `VAULT_CLIENT_TIMEOUT`: The client timeout in seconds (default 30)
    /// * `VAULT_SKIP_VERIFY`: Skip TLS verification (default false)
    /// * `VAULT_NAMESPACE`: The vault namespace
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads the values through the given
    /// lookup function instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(address) = get("VAULT_ADDR") {
            config.address = address;
        }
        config.ca_cert = get("VAULT_CACERT").map(PathBuf::from);
        config.token = get("VAULT_TOKEN");

        if let Some(role_id) = get("VAULT_ROLEID") {
            config.approle.role_id = role_id;
        }
        if let Some(secret_id) = get("VAULT_SECRETID") {
            config.approle.secret_id = secret_id;
        }
        if let Some(mount) = get("VAULT_MOUNTPOINT") {
            config.approle.mount_point = mount;
        }

        if let Some(raw) = get("VAULT_CLIENT_TIMEOUT") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => log::warn!(
                    "VAULT_CLIENT_TIMEOUT '{}' is not a number of seconds, using {}s",
                    raw,
                    DEFAULT_TIMEOUT.as_secs()
                ),
            }
        }

        if let Some(raw) = get("VAULT_SKIP_VERIFY") {
            match parse_bool(&raw) {
                Some(skip) => config.insecure_skip_verify = skip,
                None => log::warn!("VAULT_SKIP_VERIFY '{}' is not a boolean, ignoring it", raw),
            }
        }

        config.namespace = get("VAULT_NAMESPACE");

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
