use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::auth::Auth as AuthTrait;
use crate::session::Session;
use crate::token::{self, TokenInfo};
use crate::{AppRoleCredentials, Error};

#[derive(Deserialize)]
struct LoginMetadata {
    #[serde(default)]
    role_name: String,
}

/// The `auth` block of an approle login response
#[derive(Deserialize)]
struct LoginAuth {
    /// The actual Token that will also be needed/used for further
    /// requests to vault to authenticate with this session
    client_token: String,
    #[serde(default)]
    accessor: String,
    /// The policies associated with this session/token
    #[serde(default)]
    policies: BTreeSet<String>,
    #[serde(default)]
    metadata: Option<LoginMetadata>,
    /// The duration for which this session is valid
    #[serde(default)]
    lease_duration: u64,
    /// Whether or not the auth-session is renewable
    #[serde(default)]
    renewable: bool,
    #[serde(default)]
    entity_id: String,
}

impl From<LoginAuth> for TokenInfo {
    fn from(auth: LoginAuth) -> TokenInfo {
        TokenInfo {
            id: auth.client_token,
            accessor: auth.accessor,
            policies: auth.policies,
            ttl: auth.lease_duration,
            creation_ttl: auth.lease_duration,
            renewable: auth.renewable,
            entity_id: auth.entity_id,
            display_name: auth
                .metadata
                .map(|m| format!("approle-{}", m.role_name))
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Logs in with the given approle credentials and returns the new token as
/// described by the login response itself
///
/// [Vault-Documentation](https://www.vaultproject.io/api-docs/auth/approle#login-with-approle)
pub(crate) async fn login(
    session: &Session,
    credentials: &AppRoleCredentials,
) -> Result<TokenInfo, Error> {
    if !credentials.is_complete() {
        return Err(Error::NoCredentials);
    }

    let path = format!("auth/{}/login", credentials.mount());
    let response = session
        .request(Method::POST, &path, Some(credentials))
        .await?;

    let auth: LoginAuth = response.decode_auth(&path)?;
    Ok(auth.into())
}

/// The Auth method for the approle backend, used by the client to obtain
/// its token
pub(crate) struct AppRoleAuth {
    credentials: AppRoleCredentials,
}

impl AppRoleAuth {
    pub fn new(credentials: AppRoleCredentials) -> AppRoleAuth {
        AppRoleAuth { credentials }
    }
}

#[async_trait]
impl AuthTrait for AppRoleAuth {
    fn method(&self) -> &'static str {
        "approle"
    }

    async fn auth(&self, session: &Session) -> Result<TokenInfo, Error> {
        let login_token = login(session, &self.credentials)
            .await
            .map_err(|e| match e {
                Error::NoCredentials => e,
                e => Error::AuthenticationFailed(Box::new(e)),
            })?;
        log::debug!(
            "approle login successful, renewable: {}, lease {}s",
            login_token.renewable,
            login_token.ttl
        );

        // The login response only carries part of the token information, the
        // lookup fills in the rest
        session.token.set_token(login_token);

        token::lookup_self(session)
            .await
            .map_err(|e| Error::TokenLookupFailed(Box::new(e)))
    }
}
