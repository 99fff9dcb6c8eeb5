//! Timeout helper that does not depend on a particular runtime's timer.

use futures::future::{select, Either};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use web3_probe_error::Web3Error;

/// Races `future` against `delay`, which must resolve after `duration`.
pub async fn with_timeout<T>(
    duration: Duration,
    operation: impl Into<String>,
    delay: impl Future<Output = ()>,
    future: impl Future<Output = T>,
) -> Result<T, Web3Error> {
    let future = pin!(future);
    let delay = pin!(delay);

    match select(future, delay).await {
        Either::Left((value, _)) => Ok(value),
        Either::Right(((), _)) => Err(Web3Error::Timeout {
            operation: operation.into(),
            millis: duration.as_millis() as u64,
        }),
    }
}
