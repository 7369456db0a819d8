use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_millis(20),
        }
    }
}

/// Sleeps `interval` then calls `check` up to `attempts` times, returning
/// the first `Some` result. Used by cache-aside contenders waiting out a
/// rebuild lease before degrading to a direct source query.
pub async fn poll_until<F, Fut, T>(config: PollConfig, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for _ in 0..config.attempts {
        tokio::time::sleep(config.interval).await;
        if let Some(v) = check().await {
            return Some(v);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_as_soon_as_check_succeeds() {
        let attempt = AtomicU32::new(0);
        let config = PollConfig {
            attempts: 5,
            interval: Duration::from_millis(1),
        };
        let result = poll_until(config, || {
            let n = attempt.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if n == 3 { Some(n) } else { None } }
        })
        .await;
        assert_eq!(result, Some(3));
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let config = PollConfig {
            attempts: 3,
            interval: Duration::from_millis(1),
        };
        let result: Option<()> = poll_until(config, || async { None }).await;
        assert_eq!(result, None);
    }
}
