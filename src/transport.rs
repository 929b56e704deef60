use std::fmt;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::{Config, Error};

/// The header vault reads the client token from
pub const TOKEN_HEADER: &str = "X-Vault-Token";
/// The header used to select a vault enterprise namespace
pub const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// A single request to vault, with all headers already attached
#[derive(Clone)]
pub struct HttpRequest {
    /// The HTTP-Method to use
    pub method: Method,
    /// The full url of the request
    pub url: Url,
    /// The headers to send
    pub headers: Vec<(&'static str, String)>,
    /// The json encoded body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the value of the given header, if it was set
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case(TOKEN_HEADER) {
                    (*key, "<redacted>")
                } else {
                    (*key, value.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// The raw response for a request, the status and the complete body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The status code vault responded with
    pub status: StatusCode,
    /// The raw body
    pub body: Vec<u8>,
}

/// Transport executes a single HTTP request against vault.
///
/// Connection pooling, TLS and timeouts are the concern of the implementation,
/// everything vault specific is handled by the caller
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the status and body of the response
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

/// The default transport, backed by a pooled reqwest client
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying reqwest client from the timeout and TLS settings
    /// of the given config
    pub fn new(config: &Config) -> Result<ReqwestTransport, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify);

        if config.insecure_skip_verify {
            log::warn!("TLS certificate verification for vault is disabled");
        }

        if let Some(path) = &config.ca_cert {
            match std::fs::read(path) {
                Ok(pem) => match reqwest::Certificate::from_pem(&pem) {
                    Ok(cert) => builder = builder.add_root_certificate(cert),
                    Err(e) => log::warn!("Ignoring CA certificate {}: {}", path.display(), e),
                },
                Err(e) => log::warn!("Could not read CA certificate {}: {}", path.display(), e),
            }
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("Building the http client: {}", e)))?;

        Ok(ReqwestTransport { http_client })
    }

    /// Uses an already configured reqwest client
    pub fn with_client(http_client: reqwest::Client) -> ReqwestTransport {
        ReqwestTransport { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let context = format!("{} {}", request.method, request.url);

        let mut req = self.http_client.request(request.method, request.url);
        for (key, value) in request.headers {
            req = req.header(key, value);
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|e| Error::Transport {
            context: context.clone(),
            source: Box::new(e),
        })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| Error::Transport {
            context,
            source: Box::new(e),
        })?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
