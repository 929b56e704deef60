use async_trait::async_trait;

use crate::approle::AppRoleAuth;
use crate::internals::STATUS_READY;
use crate::session::Session;
use crate::token::{AuthState, StaticTokenAuth, TokenInfo};
use crate::{Config, Error};

/// An auth method the client can use to obtain its token
#[async_trait]
pub(crate) trait Auth: Send + Sync {
    /// The name of the method, only used for logging
    fn method(&self) -> &'static str;

    /// Authenticates against vault and returns the complete information of
    /// the token to use from now on
    async fn auth(&self, session: &Session) -> Result<TokenInfo, Error>;
}

/// Picks the auth method for the given config. A static token wins over
/// approle credentials
fn select(config: &Config) -> Result<Box<dyn Auth>, Error> {
    if config.token.as_deref().map_or(false, |t| !t.is_empty()) {
        return Ok(Box::new(StaticTokenAuth));
    }
    if config.approle.is_complete() {
        return Ok(Box::new(AppRoleAuth::new(config.approle.clone())));
    }

    Err(Error::NoCredentials)
}

/// Brings the session from unauthenticated to authenticated, recording the
/// outcome in the status of the session
pub(crate) async fn bootstrap(session: &Session, config: &Config) -> Result<(), Error> {
    let result = match select(config) {
        Ok(method) => {
            session.token.set_status(
                AuthState::Authenticating,
                format!("Authenticating using {}", method.method()),
            );

            method.auth(session).await.map(|token| (method.method(), token))
        }
        Err(e) => Err(e),
    };

    match result {
        Ok((method, token)) => {
            log::info!(
                "authenticated with vault using {}, ttl {}s, renewable: {}",
                method,
                token.ttl,
                token.renewable
            );
            session.token.set_authenticated(token, STATUS_READY);
            Ok(())
        }
        Err(e) => {
            session
                .token
                .set_status(AuthState::Failed, format!("Authentication Error: {}", e));
            Err(e)
        }
    }
}
