use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::auth::Auth as AuthTrait;
use crate::session::Session;
use crate::token::TokenInfo;
use crate::Error;

const LOOKUP_SELF_PATH: &str = "auth/token/lookup-self";
const RENEW_SELF_PATH: &str = "auth/token/renew-self";

/// The `auth` block vault returns for a renewed token
#[derive(Debug, Deserialize)]
pub(crate) struct RenewAuth {
    /// Whether or not the auth-session is still renewable
    #[serde(default)]
    pub renewable: bool,
    /// The new duration for which this session is valid
    pub lease_duration: u64,
}

/// Loads the information about the token the session currently uses
///
/// [Vault-Documentation](https://www.vaultproject.io/api-docs/auth/token#lookup-a-token-self)
pub(crate) async fn lookup_self(session: &Session) -> Result<TokenInfo, Error> {
    let response = session
        .request::<()>(Method::GET, LOOKUP_SELF_PATH, None)
        .await?;

    response.decode_data(LOOKUP_SELF_PATH)
}

/// Renews the token the session currently uses
///
/// [Vault-Documentation](https://www.vaultproject.io/api-docs/auth/token#renew-a-token-self)
pub(crate) async fn renew_self(session: &Session) -> Result<RenewAuth, Error> {
    // Vault only includes the `auth` block in the response if a body was sent,
    // even an empty one
    let body = serde_json::Map::new();

    let response = session
        .request(Method::POST, RENEW_SELF_PATH, Some(&body))
        .await?;

    response.decode_auth(RENEW_SELF_PATH)
}

/// The Auth method for a static token. The token is already known, it only
/// has to be verified and its information loaded
pub(crate) struct StaticTokenAuth;

#[async_trait]
impl AuthTrait for StaticTokenAuth {
    fn method(&self) -> &'static str {
        "token"
    }

    async fn auth(&self, session: &Session) -> Result<TokenInfo, Error> {
        lookup_self(session)
            .await
            .map_err(|e| Error::TokenLookupFailed(Box::new(e)))
    }
}
