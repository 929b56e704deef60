use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Deserialize;

mod auth;
mod renew;

pub(crate) use auth::{lookup_self, renew_self, StaticTokenAuth};
pub(crate) use renew::RenewalHandle;
pub use renew::RENEW_SAFETY_MARGIN;

/// Information about the token the client currently uses, as returned by
/// vault's `auth/token/lookup-self` endpoint
#[derive(Clone, Default, Deserialize, PartialEq)]
pub struct TokenInfo {
    /// The accessor of the token
    #[serde(default)]
    pub accessor: String,
    /// The token itself
    #[serde(default)]
    pub id: String,
    /// The policies attached to the token
    #[serde(default)]
    pub policies: BTreeSet<String>,
    /// Unix timestamp of the creation of the token
    #[serde(default)]
    pub creation_time: i64,
    /// The TTL the token was created with, in seconds
    #[serde(default)]
    pub creation_ttl: u64,
    /// The TTL after which the token expires no matter how often it was
    /// renewed, 0 if there is none
    #[serde(default)]
    pub explicit_max_ttl: u64,
    /// The seconds left until the token expires
    #[serde(default)]
    pub ttl: u64,
    /// Whether the token can be renewed
    #[serde(default)]
    pub renewable: bool,
    /// How often the token can still be used, 0 for unlimited
    #[serde(default)]
    pub num_uses: u64,
    /// Whether the token has no parent
    #[serde(default)]
    pub orphan: bool,
    /// The display name of the token
    #[serde(default)]
    pub display_name: String,
    /// The id of the identity entity of the token
    #[serde(default)]
    pub entity_id: String,
    /// The auth path that created the token
    #[serde(default)]
    pub path: String,
    /// The type of the token, `service` or `batch`
    #[serde(default, rename = "type")]
    pub token_type: String,
    /// When the token was issued
    #[serde(default)]
    pub issue_time: Option<String>,
    /// When the token expires
    #[serde(default)]
    pub expire_time: Option<String>,
    /// The metadata attached to the token
    #[serde(default)]
    pub meta: Option<HashMap<String, String>>,
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("accessor", &self.accessor)
            .field("id", &"<redacted>")
            .field("policies", &self.policies)
            .field("creation_time", &self.creation_time)
            .field("explicit_max_ttl", &self.explicit_max_ttl)
            .field("ttl", &self.ttl)
            .field("renewable", &self.renewable)
            .field("num_uses", &self.num_uses)
            .field("orphan", &self.orphan)
            .field("display_name", &self.display_name)
            .field("entity_id", &self.entity_id)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// The state of the authentication of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No login has been attempted yet
    Unauthenticated,
    /// The static token is being verified or the approle login is running
    Authenticating,
    /// The client holds a valid token
    Authenticated,
    /// The last renewal of the token failed, it may expire
    RenewalFailed,
    /// The initial authentication failed
    Failed,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticating => "authenticating",
            AuthState::Authenticated => "authenticated",
            AuthState::RenewalFailed => "renewal failed",
            AuthState::Failed => "failed",
        };
        f.write_str(name)
    }
}
