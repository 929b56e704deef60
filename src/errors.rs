use std::fmt;

use reqwest::StatusCode;

use crate::Client;

/// Boxed error type returned by [`Transport`](crate::transport::Transport)
/// implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration is returned when the client could not be set up from the
    /// given config, like an unparsable vault address
    #[error("Configuration Error: {0}")]
    Configuration(String),
    /// NoCredentials is returned when neither a static token nor a complete pair
    /// of approle credentials was configured. Nothing has been sent to vault
    #[error("No credentials provided")]
    NoCredentials,
    /// AuthenticationFailed is returned when the approle login was rejected or
    /// could not be completed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[source] Box<Error>),
    /// TokenLookupFailed is returned when the information about the current
    /// token could not be loaded from vault
    #[error("Token lookup failed: {0}")]
    TokenLookupFailed(#[source] Box<Error>),
    /// RenewalFailed describes a failed renewal attempt. The background renewal
    /// never returns it to callers, it only ends up in the status of the client
    #[error("Error renewing token: {0}")]
    RenewalFailed(#[source] Box<Error>),
    /// Transport is returned when the request itself could not be made, e.g.
    /// the connection was refused or the request timed out
    #[error("Transport Error calling {context}: {source}")]
    Transport {
        /// The call that failed, method and url
        context: String,
        /// The underlying error reported by the transport
        #[source]
        source: BoxError,
    },
    /// Decode is returned when the response from vault was not in the expected
    /// shape
    #[error("Decode Error for {context}: {source}")]
    Decode {
        /// What was being decoded
        context: String,
        /// The underlying json error
        #[source]
        source: serde_json::Error,
    },
    /// Server is returned for every response with an unexpected status code.
    /// The body is passed through exactly as vault sent it
    #[error("Vault http call {url} returned {status}. Body: {body}")]
    Server {
        /// The url that was requested
        url: String,
        /// The status code of the response
        status: StatusCode,
        /// The raw response body
        body: String,
    },
    /// KvVersionNotFound is returned when no secret engine mount is a prefix of
    /// the requested secret path
    #[error("Could not get kv version for path '{0}'")]
    KvVersionNotFound(String),
    /// InvalidPath is returned when the given path could not be joined onto the
    /// vault address
    #[error("Invalid path '{path}': {source}")]
    InvalidPath {
        /// The path as given by the caller
        path: String,
        /// The url error
        #[source]
        source: url::ParseError,
    },
}

impl Error {
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Error {
        Error::Decode {
            context: context.into(),
            source,
        }
    }

    /// Returns the HTTP status of the vault response that caused this error,
    /// if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Server { status, .. } => Some(*status),
            Error::AuthenticationFailed(inner)
            | Error::TokenLookupFailed(inner)
            | Error::RenewalFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Whether this error was caused by the configuration of the client
    /// rather than by vault
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::NoCredentials)
    }
}

/// ConnectError is returned when a [`Client`] could not be connected.
///
/// If the failure happened after the client itself was set up (during
/// authentication), the unauthenticated client is handed back as well so its
/// status can still be inspected
pub struct ConnectError {
    error: Error,
    client: Option<Client>,
}

impl ConnectError {
    pub(crate) fn new(error: Error, client: Option<Client>) -> ConnectError {
        ConnectError { error, client }
    }

    /// The error that stopped the connect
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// The partially set up client, if it got that far
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Splits this into the error and the partially set up client
    pub fn into_parts(self) -> (Error, Option<Client>) {
        (self.error, self.client)
    }
}

impl fmt::Debug for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConnectError")
            .field("error", &self.error)
            .field("client", &self.client)
            .finish()
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ConnectError> for Error {
    fn from(cause: ConnectError) -> Error {
        cause.error
    }
}
