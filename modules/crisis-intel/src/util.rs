use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Run `fut` under a deadline. Elapsing is reported as an ordinary error.
pub(crate) async fn bounded<T>(
    limit: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("{what} timed out after {}ms", limit.as_millis())),
    }
}
