//! Activation polling for uploaded files.
//!
//! After upload the remote service processes a video asynchronously; it can
//! only be referenced in a generation request once its state is `ACTIVE`.
//! [`wait_until_active`] queries the file status at a fixed interval until
//! the file is active, the service reports failure, or the timeout elapses.
//! There is no backoff and no jitter.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, info};

use playcoach_models::FileState;

use crate::error::{GeminiError, GeminiResult};
use crate::types::{ActiveFile, RemoteFile};

/// Anything that can report the current state of a remote file.
#[async_trait]
pub trait FileStatusSource: Send + Sync {
    async fn file_status(&self, name: &str) -> GeminiResult<RemoteFile>;
}

/// Fixed-interval polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    /// Delay between two status queries
    pub interval: Duration,
    /// Ceiling on total wall-clock wait
    pub timeout: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }
}

impl ActivationPolicy {
    /// Upper bound on the number of status queries issued.
    pub fn max_queries(&self) -> u32 {
        if self.interval.is_zero() {
            return u32::MAX;
        }
        (self.timeout.as_millis() / self.interval.as_millis()) as u32 + 1
    }
}

/// Poller state. `Active`, `Failed` and `TimedOut` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Pending,
    Active,
    Failed,
    TimedOut,
}

impl ActivationState {
    /// Next state after observing `remote` at `elapsed` into the wait.
    fn next(remote: FileState, elapsed: Duration, policy: &ActivationPolicy) -> Self {
        match remote {
            FileState::Active => ActivationState::Active,
            FileState::Failed => ActivationState::Failed,
            FileState::Pending if elapsed >= policy.timeout => ActivationState::TimedOut,
            FileState::Pending => ActivationState::Pending,
        }
    }
}

/// Poll `source` until the file `name` becomes ACTIVE.
///
/// Returns the active file's URI on success, [`GeminiError::ActivationFailed`]
/// if the service reports a failed state, and
/// [`GeminiError::ActivationTimedOut`] once `policy.timeout` has elapsed
/// without activation. A status query still in flight when the timeout
/// elapses is abandoned. Errors from a status query abort polling.
pub async fn wait_until_active<S>(
    source: &S,
    name: &str,
    policy: &ActivationPolicy,
) -> GeminiResult<ActiveFile>
where
    S: FileStatusSource + ?Sized,
{
    let started = Instant::now();
    let mut queries: u32 = 0;

    loop {
        let remaining = policy.timeout.saturating_sub(started.elapsed());
        let file = match tokio::time::timeout(remaining, source.file_status(name)).await {
            Ok(result) => result?,
            Err(_) => {
                error!(
                    file = %name,
                    queries,
                    timeout_secs = policy.timeout.as_secs(),
                    "Status query outlived the activation timeout"
                );
                return Err(GeminiError::ActivationTimedOut {
                    name: name.to_string(),
                    waited: started.elapsed(),
                });
            }
        };
        queries += 1;

        let elapsed = started.elapsed();
        match ActivationState::next(file.state, elapsed, policy) {
            ActivationState::Active => {
                if file.uri.is_empty() {
                    return Err(GeminiError::unexpected_response(format!(
                        "file {} is ACTIVE but has no uri",
                        name
                    )));
                }
                info!(
                    file = %name,
                    queries,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "File is now ACTIVE"
                );
                return Ok(ActiveFile {
                    name: file.name,
                    uri: file.uri,
                    mime_type: file.mime_type.unwrap_or_else(|| "video/mp4".to_string()),
                });
            }
            ActivationState::Failed => {
                error!(file = %name, queries, "Remote processing failed");
                return Err(GeminiError::ActivationFailed(name.to_string()));
            }
            ActivationState::TimedOut => {
                error!(
                    file = %name,
                    queries,
                    timeout_secs = policy.timeout.as_secs(),
                    "File did not become ACTIVE in time"
                );
                return Err(GeminiError::ActivationTimedOut {
                    name: name.to_string(),
                    waited: elapsed,
                });
            }
            ActivationState::Pending => {}
        }

        tokio::time::sleep(policy.interval).await;
        debug!(
            file = %name,
            elapsed_secs = started.elapsed().as_secs(),
            "Waiting for file activation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports PENDING for the first `pending_for` queries, then `then`.
    struct ScriptedSource {
        pending_for: u32,
        then: FileState,
        queries: AtomicU32,
    }

    impl ScriptedSource {
        fn new(pending_for: u32, then: FileState) -> Self {
            Self {
                pending_for,
                then,
                queries: AtomicU32::new(0),
            }
        }

        fn queries(&self) -> u32 {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FileStatusSource for ScriptedSource {
        async fn file_status(&self, name: &str) -> GeminiResult<RemoteFile> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst);
            let state = if n < self.pending_for {
                FileState::Pending
            } else {
                self.then
            };
            Ok(RemoteFile {
                name: name.to_string(),
                display_name: None,
                uri: format!("https://example.test/{}", name),
                mime_type: Some("video/mp4".to_string()),
                state,
            })
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl FileStatusSource for BrokenSource {
        async fn file_status(&self, _name: &str) -> GeminiResult<RemoteFile> {
            Err(GeminiError::remote_request_failed(503, "unavailable"))
        }
    }

    /// Answers PENDING for the first `answered` queries, then never answers.
    struct HangingSource {
        answered: u32,
        queries: AtomicU32,
    }

    #[async_trait]
    impl FileStatusSource for HangingSource {
        async fn file_status(&self, name: &str) -> GeminiResult<RemoteFile> {
            if self.queries.fetch_add(1, Ordering::SeqCst) >= self.answered {
                std::future::pending::<()>().await;
            }
            Ok(RemoteFile {
                name: name.to_string(),
                display_name: None,
                uri: String::new(),
                mime_type: None,
                state: FileState::Pending,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_after_three_pending() {
        let source = ScriptedSource::new(3, FileState::Active);
        let policy = ActivationPolicy::default();

        let started = Instant::now();
        let file = wait_until_active(&source, "files/abc", &policy).await.unwrap();

        assert_eq!(source.queries(), 4);
        assert_eq!(file.uri, "https://example.test/files/abc");
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_immediately() {
        let source = ScriptedSource::new(0, FileState::Active);
        let file = wait_until_active(&source, "files/x", &ActivationPolicy::default())
            .await
            .unwrap();

        assert_eq!(source.queries(), 1);
        assert_eq!(file.name, "files/x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_pending_times_out() {
        let source = ScriptedSource::new(u32::MAX, FileState::Active);
        let policy = ActivationPolicy::default();

        let err = wait_until_active(&source, "files/slow", &policy)
            .await
            .unwrap_err();

        match err {
            GeminiError::ActivationTimedOut { name, waited } => {
                assert_eq!(name, "files/slow");
                assert!(waited >= policy.timeout);
                assert!(waited < policy.timeout + policy.interval);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(source.queries() <= policy.max_queries());
        assert_eq!(source.queries(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_is_fatal() {
        let source = ScriptedSource::new(2, FileState::Failed);

        let err = wait_until_active(&source, "files/bad", &ActivationPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::ActivationFailed(ref n) if n == "files/bad"));
        assert_eq!(source.queries(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_error_aborts() {
        let err = wait_until_active(&BrokenSource, "files/a", &ActivationPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_status_query_is_cut_at_timeout() {
        let source = HangingSource {
            answered: 2,
            queries: AtomicU32::new(0),
        };
        let policy = ActivationPolicy::default();

        let started = Instant::now();
        let err = wait_until_active(&source, "files/stuck", &policy)
            .await
            .unwrap_err();

        match err {
            GeminiError::ActivationTimedOut { name, waited } => {
                assert_eq!(name, "files/stuck");
                assert_eq!(waited, policy.timeout);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(started.elapsed(), policy.timeout);
        assert_eq!(source.queries.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_max_queries() {
        assert_eq!(ActivationPolicy::default().max_queries(), 25);
        let policy = ActivationPolicy {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(25),
        };
        assert_eq!(policy.max_queries(), 3);
    }
}
