use crate::error::{DeviceAuthError, TraktError};
use crate::trakt::auth::DeviceCode;
use crate::trakt::client::TraktClient;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// One token poll of the device flow.
#[async_trait]
pub trait TokenPoller: Send {
    async fn poll_token(&mut self, device_code: &str) -> Result<(), TraktError>;
}

#[async_trait]
impl TokenPoller for TraktClient {
    async fn poll_token(&mut self, device_code: &str) -> Result<(), TraktError> {
        self.get_access_token(device_code).await
    }
}

/// Poll every `code.interval` seconds until the user approves the code.
///
/// `on_tick` gets the seconds left, once at start and then every second. Gives up
/// with [`DeviceAuthError::Expired`] after `code.expires_in` seconds, and also as
/// soon as `cancel` resolves.
pub async fn poll_for_token<P, C, F>(
    poller: &mut P,
    code: &DeviceCode,
    cancel: C,
    mut on_tick: F,
) -> Result<(), DeviceAuthError>
where
    P: TokenPoller + ?Sized,
    C: Future<Output = ()>,
    F: FnMut(u64),
{
    tokio::pin!(cancel);

    let start = Instant::now();
    let second = Duration::from_secs(1);
    let retry_period = Duration::from_secs(code.interval.max(1));
    let mut countdown = interval_at(start + second, second);
    let mut retry = interval_at(start + retry_period, retry_period);

    let mut remaining = code.expires_in;
    on_tick(remaining);

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel => {
                debug!(remaining, "Authorization cancelled");
                return Err(DeviceAuthError::Expired);
            }
            _ = countdown.tick() => {
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    return Err(DeviceAuthError::Expired);
                }
                on_tick(remaining);
            }
            _ = retry.tick() => {
                match poller.poll_token(&code.device_code).await {
                    Ok(()) => return Ok(()),
                    Err(TraktError::PendingAuthorization) => {
                        debug!(remaining, "Authorization pending");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
}
