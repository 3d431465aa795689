//! Bounded status polling for asynchronous generation jobs.
//!
//! A job is queried at a fixed interval until it reports a terminal status
//! or the attempt ceiling is reached.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::providers::{ProviderError, ProviderOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Processing,
    Succeeded(String),
    Failed(String),
    TimedOut,
}

/// Something that can report the status of a submitted job.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn status(&self, job_id: &str) -> ProviderOutcome<PollStatus>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    /// Upper bound on time spent waiting between queries.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Polls `job_id` until it succeeds, fails, or the attempt budget runs
    /// out. Query errors are retried; only the one on the final attempt is
    /// returned.
    pub async fn poll(&self, source: &dyn JobStatusSource, job_id: &str) -> ProviderOutcome<String> {
        match self.wait_for_terminal(source, job_id).await? {
            PollStatus::Succeeded(url) => Ok(url),
            PollStatus::Failed(reason) => Err(ProviderError::JobFailed(reason)),
            _ => Err(ProviderError::Timeout { attempts: self.max_attempts() }),
        }
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    async fn wait_for_terminal(&self, source: &dyn JobStatusSource, job_id: &str) -> ProviderOutcome<PollStatus> {
        let max_attempts = self.max_attempts();

        for attempt in 1..=max_attempts {
            let is_last = attempt == max_attempts;

            match source.status(job_id).await {
                Ok(PollStatus::Succeeded(url)) => {
                    info!(job_id, attempt, "✅ Job succeeded");
                    return Ok(PollStatus::Succeeded(url));
                }
                Ok(PollStatus::Failed(reason)) => {
                    warn!(job_id, attempt, %reason, "❌ Job reported failure");
                    return Ok(PollStatus::Failed(reason));
                }
                Ok(PollStatus::TimedOut) => break,
                Ok(status) => {
                    info!(job_id, attempt, ?status, "⏳ Job still running");
                }
                Err(e) => {
                    warn!(job_id, attempt, error = %e, "Polling attempt failed");
                    if is_last {
                        return Err(e);
                    }
                }
            }

            if !is_last {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        warn!(job_id, attempts = max_attempts, "⌛ Job timed out");
        Ok(PollStatus::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Replays scripted statuses; repeats the last one when the script runs out.
    struct Scripted {
        script: Mutex<VecDeque<ProviderOutcome<PollStatus>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl Scripted {
        fn new(script: Vec<ProviderOutcome<PollStatus>>) -> Self {
            Self { script: Mutex::new(script.into()), calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl JobStatusSource for Scripted {
        async fn status(&self, _job_id: &str) -> ProviderOutcome<PollStatus> {
            self.calls.lock().push(Instant::now());
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap_or(Ok(PollStatus::Pending))
            } else {
                match script.front() {
                    Some(Ok(status)) => Ok(status.clone()),
                    Some(Err(e)) => Err(ProviderError::Transport(e.to_string())),
                    None => Ok(PollStatus::Pending),
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminal_job_times_out_after_thirty_queries() {
        let source = Scripted::new(vec![Ok(PollStatus::Processing)]);
        let start = Instant::now();

        let err = Poller::default().poll(&source, "job-1").await.unwrap_err();

        assert!(matches!(err, ProviderError::Timeout { attempts: 30 }));
        assert_eq!(source.calls(), 30);
        assert_eq!(start.elapsed(), Duration::from_secs(290));
        let calls = source.calls.lock();
        for pair in calls.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(10));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_stops_polling() {
        let source = Scripted::new(vec![
            Ok(PollStatus::Pending),
            Ok(PollStatus::Processing),
            Ok(PollStatus::Succeeded("https://img/out.png".into())),
            Ok(PollStatus::Processing),
        ]);

        let url = Poller::default().poll(&source, "job-2").await.unwrap();

        assert_eq!(url, "https://img/out.png");
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reported_failure_is_terminal() {
        let source = Scripted::new(vec![
            Ok(PollStatus::Processing),
            Ok(PollStatus::Failed("NSFW content".into())),
            Ok(PollStatus::Processing),
        ]);

        let err = Poller::default().poll(&source, "job-3").await.unwrap_err();

        assert!(matches!(err, ProviderError::JobFailed(ref r) if r == "NSFW content"));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn query_errors_are_soft_until_the_last_attempt() {
        let source = Scripted::new(vec![
            Err(ProviderError::Transport("connection reset".into())),
            Ok(PollStatus::Succeeded("https://img/late.png".into())),
        ]);
        let url = Poller::default().poll(&source, "job-4").await.unwrap();
        assert_eq!(url, "https://img/late.png");
        assert_eq!(source.calls(), 2);

        let source = Scripted::new(vec![Err(ProviderError::Transport("down".into()))]);
        let poller = Poller::new(PollConfig { max_attempts: 3, interval: Duration::from_secs(1) });
        let err = poller.poll(&source, "job-5").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(ref m) if m.contains("down")));
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn default_ceiling_is_under_five_minutes() {
        let config = PollConfig::default();
        assert_eq!(config.ceiling(), Duration::from_secs(290));
        assert!(config.ceiling() <= Duration::from_secs(300));
    }
}
