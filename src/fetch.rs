//! Simulated upstream fetch with a linear retry loop.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by upstream calls and the retry loop around them.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A single upstream call failed.
    #[error("couldn't fetch from {0}")]
    Unavailable(String),

    /// Every attempt in the retry budget failed.
    #[error("gave up after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// How many calls were made before giving up.
        attempts: u32,
        /// Display form of the final attempt's error.
        last_error: String,
    },
}

/// A successful upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub url: String,
    pub data: Data,
}

/// Payload of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data {
    pub message: String,
    /// RFC 3339 wall-clock timestamp of when the response was produced.
    pub timestamp: String,
    pub value: u32,
}

/// Something that answers fetch requests.
///
/// The demo uses [`SimulatedUpstream`]; tests substitute deterministic
/// implementations.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn call(&self, url: &str) -> Result<Response, FetchError>;
}

/// Fake upstream that sleeps a fixed latency and then fails randomly.
pub struct SimulatedUpstream {
    latency: Duration,
    success_rate: f64,
}

impl SimulatedUpstream {
    /// `success_rate` is the probability in `[0, 1]` that a call succeeds.
    pub fn new(latency: Duration, success_rate: f64) -> Self {
        Self {
            latency,
            success_rate,
        }
    }
}

#[async_trait]
impl Upstream for SimulatedUpstream {
    async fn call(&self, url: &str) -> Result<Response, FetchError> {
        tokio::time::sleep(self.latency).await;

        let mut rng = rand::thread_rng();
        if rng.gen::<f64>() < self.success_rate {
            Ok(Response {
                success: true,
                url: url.to_string(),
                data: Data {
                    message: "Got the data!".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    value: rng.gen_range(0..1000),
                },
            })
        } else {
            Err(FetchError::Unavailable(url.to_string()))
        }
    }
}

/// How many calls to make and how long to pause between failures.
///
/// The delay is fixed, not a backoff curve.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Call `upstream` until it succeeds or the retry budget runs out.
///
/// Returns the first successful response, or `RetriesExhausted` carrying
/// the last attempt's error once all attempts fail.
pub async fn fetch_with_retry(
    upstream: &dyn Upstream,
    url: &str,
    policy: RetryPolicy,
) -> Result<Response, FetchError> {
    let mut last_error = String::from("no attempts were made");

    for attempt in 1..=policy.attempts {
        info!(attempt, total = policy.attempts, url = %url, "calling upstream");

        match upstream.call(url).await {
            Ok(response) => {
                info!(attempt, "upstream call succeeded");
                return Ok(response);
            }
            Err(e) => {
                warn!(attempt, error = %e, "upstream call failed");
                last_error = e.to_string();
            }
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(FetchError::RetriesExhausted {
        attempts: policy.attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of calls, then succeeds.
    struct ScriptedUpstream {
        failures: u32,
        calls: AtomicU32,
    }

    impl ScriptedUpstream {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Upstream for ScriptedUpstream {
        async fn call(&self, url: &str) -> Result<Response, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(FetchError::Unavailable(url.to_string()));
            }
            Ok(Response {
                success: true,
                url: url.to_string(),
                data: Data {
                    message: "Got the data!".to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    value: 42,
                },
            })
        }
    }

    const URL: &str = "https://api.example.com/data";

    fn instant_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_first_attempt() {
        let upstream = ScriptedUpstream::new(0);

        let response = fetch_with_retry(&upstream, URL, instant_policy(3))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.url, URL);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let upstream = ScriptedUpstream::new(2);

        let response = fetch_with_retry(&upstream, URL, instant_policy(3))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausts_retry_budget() {
        let upstream = ScriptedUpstream::new(10);

        let err = fetch_with_retry(&upstream, URL, instant_policy(3))
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains(URL));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_fails_without_calling() {
        let upstream = ScriptedUpstream::new(0);

        let err = fetch_with_retry(&upstream, URL, instant_policy(0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::RetriesExhausted { attempts: 0, .. }
        ));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_simulated_upstream_always_succeeds_at_rate_one() {
        let upstream = SimulatedUpstream::new(Duration::ZERO, 1.0);

        let response = upstream.call(URL).await.unwrap();
        assert!(response.success);
        assert!(response.data.value < 1000);
    }

    #[tokio::test]
    async fn test_simulated_upstream_always_fails_at_rate_zero() {
        let upstream = SimulatedUpstream::new(Duration::ZERO, 0.0);

        let err = upstream.call(URL).await.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }
}
