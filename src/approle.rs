//! Login with vault's approle auth backend.
//!
//! The credentials are posted to `auth/<mount>/login`, the returned client
//! token is then verified with a `lookup-self` so the client ends up with the
//! same token information no matter how it authenticated

mod auth;

pub(crate) use auth::AppRoleAuth;
