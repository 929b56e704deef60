use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::internals::TokenContainer;
use crate::response::Envelope;
use crate::transport::{HttpRequest, Transport, NAMESPACE_HEADER, TOKEN_HEADER};
use crate::{Config, Error};

/// Everything needed to make authenticated requests to vault. Shared between
/// the client and its background renewal
pub(crate) struct Session {
    vault_url: Url,
    transport: Arc<dyn Transport>,
    namespace: Option<String>,
    pub(crate) token: TokenContainer,
}

impl Session {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Session, Error> {
        let mut vault_url = Url::parse(&config.address).map_err(|e| {
            Error::Configuration(format!("Invalid vault address '{}': {}", config.address, e))
        })?;
        if vault_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Invalid vault address '{}': not a base url",
                config.address
            )));
        }
        // Without the trailing slash the last path segment would be replaced
        // when joining
        if !vault_url.path().ends_with('/') {
            let path = format!("{}/", vault_url.path());
            vault_url.set_path(&path);
        }

        Ok(Session {
            vault_url,
            transport,
            namespace: config.namespace.clone().filter(|n| !n.is_empty()),
            token: TokenContainer::new(config.token.clone()),
        })
    }

    pub fn vault_url(&self) -> &Url {
        &self.vault_url
    }

    /// Builds the full url for the given api path, relative to `/v1/`.
    ///
    /// Every segment of the path is percent-encoded, so `?` and `#` stay part
    /// of the path instead of starting a query or fragment
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let mut full = self.vault_url.clone();

        full.path_segments_mut()
            .map_err(|_| Error::InvalidPath {
                path: path.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push("v1")
            .extend(path.trim_start_matches('/').split('/'));

        Ok(full)
    }

    /// Makes a request with the current token. The token is read right before
    /// the request is sent, so a renewal that finished in the meantime is
    /// always picked up
    pub async fn request<P>(
        &self,
        method: Method,
        path: &str,
        body: Option<&P>,
    ) -> Result<Envelope, Error>
    where
        P: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let context = format!("{} {}", method, url);

        let body = match body {
            Some(b) => Some(
                serde_json::to_vec(b)
                    .map_err(|e| Error::decode(format!("request body of {}", context), e))?,
            ),
            None => None,
        };

        let mut headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("X-Vault-Request", "true".to_string()),
        ];
        let token = self.token.token_id();
        if !token.is_empty() {
            headers.push((TOKEN_HEADER, token));
        }
        if let Some(namespace) = &self.namespace {
            headers.push((NAMESPACE_HEADER, namespace.clone()));
        }

        log::debug!("vault request {}", context);
        let response = self
            .transport
            .execute(HttpRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        match response.status {
            StatusCode::OK => Envelope::from_slice(&response.body, &context),
            status => Err(Error::Server {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }),
        }
    }
}
