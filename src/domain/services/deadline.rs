use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::AppError;

/// Runs one store or provider round trip under a deadline.
pub async fn with_deadline<T, F>(limit: Duration, what: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} did not complete within {}ms", what, limit.as_millis());
            Err(AppError::Timeout(what.to_string()))
        }
    }
}
