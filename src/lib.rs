#![warn(missing_docs)]
//! A lightweight async library to read kv secrets from vault.
//!
//! The [`Client`] authenticates with either a static token or approle
//! credentials and keeps its token alive by renewing it in the background.
//! Secrets are read with [`Client::get_secret`], which works for both versions
//! of the kv engine by looking up the mount of the path first.
//!
//! ```no_run
//! # async fn run() -> Result<(), vaultlib::Error> {
//! let config = vaultlib::Config::from_env();
//! let client = vaultlib::Client::connect(config).await?;
//!
//! let secret = client.get_secret("kv_v2/path/my-secret").await?;
//! if let Some(password) = secret.get("password") {
//!     println!("got a password of {} chars", password.len());
//! }
//! println!("token status: {}", client.status());
//! # Ok(())
//! # }
//! ```

/// The approle module handles logins with the approle backend in vault
mod approle;
mod auth;
mod client;
mod config;
mod errors;
mod internals;
/// The kv module is used for all interactions with the kv backends in vault
pub mod kv;
/// The response module contains the generic response envelope of vault
pub mod response;
mod session;
/// The token module holds the token information and its renewal
pub mod token;
/// The transport module is the seam between the client and the HTTP library
pub mod transport;

pub use client::Client;
pub use config::{AppRoleCredentials, Config};
pub use errors::{BoxError, ConnectError, Error};
pub use kv::{KvVersion, Secret};
pub use token::{AuthState, TokenInfo};
