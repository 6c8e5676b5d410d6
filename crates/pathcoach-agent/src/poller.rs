use crate::Result;
use pathcoach_core::config::PollingConfig;
use pathcoach_core::task::{TaskRecord, TaskStatus, Verdict};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Anything that can report the current state of a music task.
pub trait StatusSource {
    fn fetch(&self, task_id: &str) -> impl Future<Output = Result<TaskRecord>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_duration: Duration,
}

impl From<&PollingConfig> for PollPolicy {
    fn from(cfg: &PollingConfig) -> Self {
        PollPolicy {
            interval: Duration::from_secs(cfg.interval_secs.max(1)),
            max_duration: cfg.max_duration(),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::from(&PollingConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollOutcome {
    Success { audio_url: String },
    Failed { reason: String },
    /// The window closed while the task was still running.
    TimedOut { last_status: Option<TaskStatus> },
}

/// Poll `task_id` until it reaches a terminal status or `policy.max_duration`
/// elapses. The first check runs immediately, later ones every
/// `policy.interval`. Checks never overlap: a slow response pushes the next
/// tick back instead of firing a second request.
///
/// `on_update` sees every record, including the terminal one. Dropping the
/// returned future cancels polling.
pub async fn poll_task<S, F>(
    source: &S,
    task_id: &str,
    policy: PollPolicy,
    mut on_update: F,
) -> PollOutcome
where
    S: StatusSource + ?Sized,
    F: FnMut(&TaskRecord),
{
    let started = Instant::now();
    let mut ticker = tokio::time::interval(policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_status = None;
    let mut polls: u32 = 0;

    loop {
        ticker.tick().await;
        if polls > 0 && started.elapsed() >= policy.max_duration {
            tracing::warn!(task_id, polls, "poll window exhausted");
            return PollOutcome::TimedOut { last_status };
        }
        polls += 1;

        let record = match source.fetch(task_id).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(task_id, polls, error = %e, "status check failed");
                return PollOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        tracing::debug!(task_id, polls, status = %record.status, "task status");
        last_status = Some(record.status);
        on_update(&record);

        match record.verdict() {
            Verdict::InProgress => {}
            Verdict::Succeeded { audio_url } => {
                tracing::info!(task_id, polls, "task finished");
                return PollOutcome::Success { audio_url };
            }
            Verdict::Failed { reason } => return PollOutcome::Failed { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, Service};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed list of responses, then reports PENDING forever.
    struct Scripted {
        script: Mutex<VecDeque<Result<TaskRecord>>>,
        calls: AtomicUsize,
        latency: Duration,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
    }

    impl Scripted {
        fn new(script: Vec<Result<TaskRecord>>) -> Self {
            Scripted {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                latency: Duration::ZERO,
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusSource for Scripted {
        async fn fetch(&self, _task_id: &str) -> Result<TaskRecord> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let next = { self.script.lock().unwrap().pop_front() };
            self.in_flight.store(false, Ordering::SeqCst);
            next.unwrap_or_else(|| Ok(status(TaskStatus::Pending)))
        }
    }

    fn status(s: TaskStatus) -> TaskRecord {
        TaskRecord {
            status: s,
            audio_url: None,
            error_message: None,
        }
    }

    fn policy(interval: u64, max: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(interval),
            max_duration: Duration::from_secs(max),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn walks_intermediate_statuses_to_success_and_stops() {
        let source = Scripted::new(vec![
            Ok(status(TaskStatus::Pending)),
            Ok(status(TaskStatus::TextSuccess)),
            Ok(status(TaskStatus::FirstSuccess)),
            Ok(TaskRecord {
                status: TaskStatus::Success,
                audio_url: Some("https://x/y.mp3".into()),
                error_message: None,
            }),
        ]);
        let mut seen = Vec::new();
        let started = Instant::now();

        let outcome = poll_task(&source, "abc123", policy(5, 600), |r| seen.push(r.status)).await;

        assert_eq!(
            outcome,
            PollOutcome::Success {
                audio_url: "https://x/y.mp3".into()
            }
        );
        assert_eq!(source.calls(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
        assert_eq!(
            seen,
            vec![
                TaskStatus::Pending,
                TaskStatus::TextSuccess,
                TaskStatus::FirstSuccess,
                TaskStatus::Success
            ]
        );

        // Nothing keeps polling once the outcome is returned.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_is_immediate() {
        let source = Scripted::new(vec![Ok(TaskRecord {
            status: TaskStatus::Success,
            audio_url: Some("https://x/a.mp3".into()),
            error_message: None,
        })]);
        let started = Instant::now();
        let outcome = poll_task(&source, "t", policy(5, 600), |_| {}).await;
        assert!(matches!(outcome, PollOutcome::Success { .. }));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_status_ends_polling() {
        let source = Scripted::new(vec![
            Ok(status(TaskStatus::Pending)),
            Ok(status(TaskStatus::CreateTaskFailed)),
        ]);
        let outcome = poll_task(&source, "t", policy(5, 600), |_| {}).await;
        assert_eq!(
            outcome,
            PollOutcome::Failed {
                reason: "audio generation failed: CREATE_TASK_FAILED".into()
            }
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_fails_once() {
        let source = Scripted::new(vec![Err(AgentError::RateLimited(Service::Music))]);
        let outcome = poll_task(&source, "t", policy(5, 600), |_| {}).await;
        assert!(matches!(outcome, PollOutcome::Failed { reason } if reason.contains("rate limiting")));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_window_times_out_with_last_status() {
        let source = Scripted::new(vec![Ok(status(TaskStatus::TextSuccess))]);
        let outcome = poll_task(&source, "t", policy(5, 20), |_| {}).await;
        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                last_status: Some(TaskStatus::Pending)
            }
        );
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_responses_never_overlap() {
        let mut source = Scripted::new(vec![
            Ok(status(TaskStatus::Pending)),
            Ok(status(TaskStatus::Pending)),
            Ok(TaskRecord {
                status: TaskStatus::Success,
                audio_url: Some("https://x/y.mp3".into()),
                error_message: None,
            }),
        ]);
        source.latency = Duration::from_secs(12);
        let outcome = poll_task(&source, "t", policy(5, 600), |_| {}).await;
        assert!(matches!(outcome, PollOutcome::Success { .. }));
        assert!(!source.overlapped.load(Ordering::SeqCst));
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = PollingConfig {
            interval_secs: 0,
            max_duration_secs: 10,
        };
        assert_eq!(PollPolicy::from(&cfg).interval, Duration::from_secs(1));
    }
}
