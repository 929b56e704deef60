use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::internals::{STATUS_RENEWAL_STOPPED, STATUS_RENEWED};
use crate::session::Session;
use crate::token::{lookup_self, renew_self, AuthState, TokenInfo};
use crate::Error;

/// How long before the token expires the renewal is started
pub const RENEW_SAFETY_MARGIN: Duration = Duration::from_secs(2);

// Keeps a renewable token that reports a TTL of 0 from spinning the loop
const MIN_RENEW_DELAY: Duration = Duration::from_secs(1);

/// The time to wait before renewing a token with the given TTL in seconds
pub(crate) fn renewal_delay(ttl: u64) -> Duration {
    Duration::from_secs(ttl)
        .saturating_sub(RENEW_SAFETY_MARGIN)
        .max(MIN_RENEW_DELAY)
}

/// Handle to the background renewal of a session. Dropping it stops the
/// renewal
pub(crate) struct RenewalHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RenewalHandle {
    /// Starts the renewal loop for the given session on the current tokio
    /// runtime
    pub fn spawn(session: Arc<Session>) -> RenewalHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(renew_background(session, cancel.clone()));

        RenewalHandle { cancel, task }
    }

    /// Signals the loop to stop, it exits before its next sleep or renewal
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RenewalHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Renews the token and loads the updated token information
async fn renew(session: &Session) -> Result<TokenInfo, Error> {
    let renewed = renew_self(session)
        .await
        .map_err(|e| Error::RenewalFailed(Box::new(e)))?;
    log::debug!(
        "vault token renewed for {}s, renewable: {}",
        renewed.lease_duration,
        renewed.renewable
    );

    lookup_self(session)
        .await
        .map_err(|e| Error::RenewalFailed(Box::new(Error::TokenLookupFailed(Box::new(e)))))
}

/// Keeps renewing the token of the session until the cancel token fires.
///
/// A failed renewal is only recorded in the status of the session and retried
/// on the same schedule, it never ends the loop
async fn renew_background(session: Arc<Session>, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let delay = renewal_delay(session.token.ttl());
        log::debug!("next vault token renewal in {}s", delay.as_secs());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        if cancel.is_cancelled() {
            break;
        }

        match renew(&session).await {
            Ok(token) => {
                log::info!("vault token renewal is successful, ttl {}s", token.ttl);
                session.token.set_authenticated(token, STATUS_RENEWED);
            }
            Err(e) => {
                log::warn!("an error occurred during token renewal: {}", e);
                session.token.set_status(AuthState::RenewalFailed, e.to_string());
            }
        }
    }

    session.token.set_status_message(STATUS_RENEWAL_STOPPED);
    log::info!("vault token renewal stopped");
}
