use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::auth;
use crate::kv::{self, MountResolution, Secret};
use crate::session::Session;
use crate::token::{AuthState, RenewalHandle, TokenInfo};
use crate::transport::{ReqwestTransport, Transport};
use crate::{Config, ConnectError, Error};

/// The Client struct represents a single Vault-Connection/Session that can be used for any
/// further requests to vault.
///
/// If the token of the client is renewable, a background task keeps renewing
/// it until the client is dropped or [`Client::stop_renewal`] is called
pub struct Client {
    session: Arc<Session>,
    renewal: Option<RenewalHandle>,
}

impl Client {
    /// Connects to vault using the given config. This authenticates with the
    /// static token or the approle credentials of the config and, if the token
    /// is renewable, starts renewing it in the background.
    ///
    /// Must be called from within a tokio runtime
    pub async fn connect(config: Config) -> Result<Client, ConnectError> {
        let transport =
            ReqwestTransport::new(&config).map_err(|e| ConnectError::new(e, None))?;

        Client::connect_with_transport(config, Arc::new(transport)).await
    }

    /// Same as [`Client::connect`] but sends all requests through the given
    /// transport
    pub async fn connect_with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Client, ConnectError> {
        let session = Session::new(&config, transport).map_err(|e| ConnectError::new(e, None))?;
        let mut client = Client {
            session: Arc::new(session),
            renewal: None,
        };

        if let Err(e) = auth::bootstrap(&client.session, &config).await {
            log::warn!("authentication with vault failed: {}", e);
            return Err(ConnectError::new(e, Some(client)));
        }

        if client.session.token.token_info().renewable {
            client.renewal = Some(RenewalHandle::spawn(client.session.clone()));
        }

        Ok(client)
    }

    /// Returns a copy of the information about the current token
    pub fn token_info(&self) -> TokenInfo {
        self.session.token.token_info()
    }

    /// A simple method to get the current client token.
    /// It is not recommended to use this function, but rather stick to other
    /// more integrated parts, like the vault_request function
    pub fn token_id(&self) -> String {
        self.session.token.token_id()
    }

    /// Returns the status of the last authentication or renewal
    pub fn status(&self) -> String {
        self.session.token.status()
    }

    /// Returns the state of the authentication
    pub fn auth_state(&self) -> AuthState {
        self.session.token.auth_state()
    }

    /// Whether the last authentication or renewal was successful
    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_authenticated()
    }

    /// Whether the token is still being renewed in the background
    pub fn is_renewing(&self) -> bool {
        self.renewal.as_ref().map_or(false, RenewalHandle::is_running)
    }

    /// Stops the background renewal of the token. The token stays usable
    /// until it expires
    pub fn stop_renewal(&self) {
        if let Some(renewal) = &self.renewal {
            renewal.stop();
        }
    }

    /// Reads the secret at the given path, e.g. `kv_v2/path/my-secret`.
    ///
    /// The mount and kv version of the path are looked up first, so the same
    /// call works for version 1 and version 2 engines
    pub async fn get_secret(&self, path: &str) -> Result<Secret, Error> {
        kv::get(&self.session, path).await
    }

    /// Looks up which mount the given secret path belongs to and which kv
    /// version it uses
    pub async fn resolve_mount(&self, path: &str) -> Result<MountResolution, Error> {
        kv::resolve(&self.session, path).await
    }

    /// This function is a general way to directly make requests to vault using
    /// the current session. This can be used to make custom requests or to make requests
    /// to mounts that are not directly covered by this crate.
    ///
    /// Returns the raw `data` of the response, empty if there was none
    pub async fn vault_request<P: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&P>,
    ) -> Result<Vec<u8>, Error> {
        let response = self.session.request(method, path, body).await?;

        Ok(response.data_bytes())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client")
            .field("address", &self.session.vault_url().as_str())
            .field("auth_state", &self.auth_state())
            .field("status", &self.status())
            .field("renewing", &self.is_renewing())
            .finish()
    }
}
