//! Runtime-agnostic timeouts built on `futures-timer`.
//!
//! Works the same on native and WASM; no tokio runtime required.

use futures_util::future::{select, Either};
use std::future::Future;
use std::time::Duration;

/// The deadline passed before the future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline of {}ms elapsed", self.0.as_millis())
    }
}

impl std::error::Error for Elapsed {}

/// Race `fut` against a timer. The future is dropped if the timer wins.
pub async fn timeout<F: Future>(duration: Duration, fut: F) -> Result<F::Output, Elapsed> {
    let fut = std::pin::pin!(fut);
    let delay = futures_timer::Delay::new(duration);
    match select(fut, delay).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(_) => Err(Elapsed(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_returns_output_when_fast() {
        let out = timeout(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_timeout_elapses_when_slow() {
        let out = timeout(
            Duration::from_millis(10),
            futures_timer::Delay::new(Duration::from_secs(5)),
        )
        .await;
        assert_eq!(out, Err(Elapsed(Duration::from_millis(10))));
    }
}
