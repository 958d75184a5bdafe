use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tether_client::{ClientError, JobProvider, OpenAiClient, StatusSource};
use tether_core::domain::job::{JobId, JobSnapshot, JobState};
use tether_core::domain::schedule::PollSchedule;
use tether_core::domain::status::ProviderStatus;
use tether_core::dto::research::ResearchRequest;
use tether_runner::{AdaptivePoller, JobError, RecordedProgress, RunnerConfig, Submitter};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One scripted provider answer
#[derive(Clone)]
enum Step {
    Status(&'static str),
    Failed(&'static str),
    Http(u16),
}

/// Provider that replays a script and repeats its last step forever
struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Step>,
    submit_status: Option<u16>,
    queries: AtomicU32,
    submits: AtomicU32,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            last: Mutex::new(steps.last().cloned().unwrap_or(Step::Status("queued"))),
            script: Mutex::new(steps.into()),
            submit_status: None,
            queries: AtomicU32::new(0),
            submits: AtomicU32::new(0),
        })
    }

    fn rejecting(status: u16) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(Step::Status("queued")),
            submit_status: Some(status),
            queries: AtomicU32::new(0),
            submits: AtomicU32::new(0),
        })
    }

    fn queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn get_status(&self, id: &JobId) -> tether_client::Result<JobSnapshot> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let step = match self.script.lock().unwrap().pop_front() {
            Some(step) => {
                *self.last.lock().unwrap() = step.clone();
                step
            }
            None => self.last.lock().unwrap().clone(),
        };

        match step {
            Step::Status(status) => Ok(JobSnapshot::new(
                id.clone(),
                ProviderStatus::OpenAi(status.to_string()),
            )
            .with_payload(serde_json::json!({ "status": status }))),
            Step::Failed(detail) => Ok(JobSnapshot::new(
                id.clone(),
                ProviderStatus::OpenAi("failed".to_string()),
            )
            .with_error(detail)),
            Step::Http(code) => Err(ClientError::api_error(code, "scripted")),
        }
    }
}

#[async_trait]
impl JobProvider for ScriptedProvider {
    type Request = String;

    async fn submit(&self, _request: &String) -> tether_client::Result<JobSnapshot> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        match self.submit_status {
            Some(code) => Err(ClientError::api_error(code, "rejected")),
            None => Ok(JobSnapshot::new(
                "job_1",
                ProviderStatus::OpenAi("queued".to_string()),
            )),
        }
    }
}

fn config(timeout: Duration) -> RunnerConfig {
    RunnerConfig::research().with_timeout(timeout)
}

#[tokio::test(start_paused = true)]
async fn test_success_on_third_query() {
    let provider = ScriptedProvider::new(vec![
        Step::Status("queued"),
        Step::Status("in_progress"),
        Step::Status("completed"),
    ]);
    let progress = RecordedProgress::new();
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research())
        .with_progress(Arc::new(progress.clone()));

    let start = Instant::now();
    let snapshot = poller.wait(&JobId::new("job_1")).await.unwrap();

    assert_eq!(snapshot.state(), JobState::Succeeded);
    assert_eq!(provider.queries(), 3);
    // 10s, then 30s once elapsed reached 10s
    assert!(start.elapsed() >= Duration::from_secs(40));

    let attempts = progress.attempts();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].next_interval, Some(Duration::from_secs(10)));
    assert_eq!(attempts[1].next_interval, Some(Duration::from_secs(30)));
    assert_eq!(attempts[2].next_interval, None);
    assert_eq!(attempts[2].state, JobState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_check_only_queries_once() {
    let provider = ScriptedProvider::new(vec![Step::Status("in_progress")]);
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research());

    let snapshot = poller.check(&JobId::new("job_1")).await.unwrap();

    assert_eq!(snapshot.state(), JobState::Pending);
    assert_eq!(provider.queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_checks_agree() {
    let provider = ScriptedProvider::new(vec![Step::Status("in_progress")]);
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research());
    let id = JobId::new("job_1");

    let first = poller.check(&id).await.unwrap();
    let second = poller.check(&id).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_never_before_budget() {
    let timeout = Duration::from_secs(90);
    let provider = ScriptedProvider::new(vec![Step::Status("in_progress")]);
    let poller = AdaptivePoller::new(provider.clone(), &config(timeout));

    let start = Instant::now();
    let err = poller.wait(&JobId::new("job_1")).await.unwrap_err();

    assert!(start.elapsed() >= timeout);
    match err {
        JobError::Timeout {
            elapsed,
            last_status,
            ..
        } => {
            assert!(elapsed >= timeout);
            assert_eq!(last_status, "in_progress");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    // 0s, 10s, 40s, then clamped to the 90s deadline
    assert_eq!(provider.queries(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_keeps_polling() {
    let provider = ScriptedProvider::new(vec![
        Step::Status("warming_up"),
        Step::Status("completed"),
    ]);
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research());

    let snapshot = poller.wait(&JobId::new("job_1")).await.unwrap();

    assert_eq!(snapshot.state(), JobState::Succeeded);
    assert_eq!(provider.queries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_do_not_reset_clock() {
    let timeout = Duration::from_secs(60);
    let provider = ScriptedProvider::new(vec![
        Step::Status("queued"),
        Step::Http(503),
        Step::Http(429),
        Step::Status("in_progress"),
    ]);
    let progress = RecordedProgress::new();
    let poller = AdaptivePoller::new(provider.clone(), &config(timeout))
        .with_progress(Arc::new(progress.clone()));

    let start = Instant::now();
    let err = poller.wait(&JobId::new("job_1")).await.unwrap_err();

    assert!(matches!(err, JobError::Timeout { .. }));
    assert!(start.elapsed() >= timeout);
    assert!(start.elapsed() < timeout + Duration::from_secs(1));

    let attempts = progress.attempts();
    assert!(attempts[1].transient);
    assert!(attempts[2].transient);
    assert!(attempts.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
}

#[tokio::test(start_paused = true)]
async fn test_failure_detail_is_surfaced() {
    let provider = ScriptedProvider::new(vec![
        Step::Status("in_progress"),
        Step::Failed("server_error: model overloaded"),
    ]);
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research());

    let err = poller.wait(&JobId::new("job_1")).await.unwrap_err();

    match &err {
        JobError::JobFailed { detail, .. } => {
            assert_eq!(detail, "server_error: model overloaded");
        }
        other => panic!("expected job failure, got {other:?}"),
    }
    assert_eq!(err.exit_code(), JobError::EXIT_JOB_FAILED);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_is_status_error() {
    let provider = ScriptedProvider::new(vec![Step::Http(404)]);
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research());

    let err = poller.wait(&JobId::new("missing")).await.unwrap_err();

    assert!(matches!(err, JobError::Status { .. }));
    assert!(!err.is_resumable());
    assert_eq!(provider.queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_wait() {
    let provider = ScriptedProvider::new(vec![Step::Status("in_progress")]);
    let cancel = CancellationToken::new();
    let poller = AdaptivePoller::new(provider.clone(), &RunnerConfig::research())
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(15)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = poller.wait(&JobId::new("job_1")).await.unwrap_err();

    assert!(matches!(err, JobError::Interrupted { .. }));
    assert_eq!(err.exit_code(), JobError::EXIT_INTERRUPTED);
    // Cancelled during the 30s wait, not at its end
    assert!(start.elapsed() < Duration::from_secs(40));
    assert_eq!(provider.queries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_schedule() {
    let provider = ScriptedProvider::new(vec![
        Step::Status("queued"),
        Step::Status("queued"),
        Step::Status("completed"),
    ]);
    let config = RunnerConfig::research().with_schedule(PollSchedule::fixed(Duration::from_secs(2)));
    let poller = AdaptivePoller::new(provider.clone(), &config);

    let start = Instant::now();
    poller.wait(&JobId::new("job_1")).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test]
async fn test_submit_rejection_never_polls() {
    let provider = ScriptedProvider::rejecting(401);
    let submitter = Submitter::new(provider.clone(), &RunnerConfig::research());

    let err = submitter.submit(&"query".to_string()).await.unwrap_err();

    match &err {
        JobError::Submission { attempts, .. } => assert_eq!(*attempts, 1),
        other => panic!("expected submission error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), JobError::EXIT_SUBMISSION);
    assert_eq!(provider.submits.load(Ordering::SeqCst), 1);
    assert_eq!(provider.queries(), 0);
}

#[tokio::test]
async fn test_submit_then_wait_through_trait_object() {
    let provider = ScriptedProvider::new(vec![Step::Status("completed")]);
    let shared: Arc<dyn JobProvider<Request = String>> = provider.clone();

    let submitted = Submitter::new(shared.clone(), &RunnerConfig::research())
        .submit(&"query".to_string())
        .await
        .unwrap();
    let finished = AdaptivePoller::new(shared, &RunnerConfig::research())
        .wait(&submitted.id)
        .await
        .unwrap();

    assert_eq!(submitted.id.as_str(), "job_1");
    assert_eq!(finished.state(), JobState::Succeeded);
}

#[tokio::test]
async fn test_unreachable_provider_is_retried() {
    // Nothing listens on port 1
    let client = Arc::new(OpenAiClient::new("sk-test", "http://127.0.0.1:1"));
    let submitter = Submitter::new(client, &RunnerConfig::research().with_submit_attempts(2));

    let err = submitter
        .submit(&ResearchRequest {
            query: "q".to_string(),
            model: "o1".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        JobError::Submission {
            provider,
            attempts,
            source,
        } => {
            assert_eq!(provider, "openai");
            assert_eq!(attempts, 2);
            assert!(source.is_network());
        }
        other => panic!("expected submission error, got {other:?}"),
    }
}

/// Provider whose submission never answers
struct StalledProvider {
    submits: AtomicU32,
}

#[async_trait]
impl StatusSource for StalledProvider {
    fn provider_name(&self) -> &str {
        "stalled"
    }

    async fn get_status(&self, id: &JobId) -> tether_client::Result<JobSnapshot> {
        Ok(JobSnapshot::new(
            id.clone(),
            ProviderStatus::OpenAi("queued".to_string()),
        ))
    }
}

#[async_trait]
impl JobProvider for StalledProvider {
    type Request = String;

    async fn submit(&self, _request: &String) -> tether_client::Result<JobSnapshot> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_submission_in_flight() {
    let provider = Arc::new(StalledProvider {
        submits: AtomicU32::new(0),
    });
    let cancel = CancellationToken::new();
    let submitter = Submitter::new(provider.clone(), &RunnerConfig::research())
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = submitter.submit(&"query".to_string()).await.unwrap_err();

    assert!(matches!(err, JobError::Cancelled { ref during } if during == "submission to stalled"));
    assert_eq!(err.exit_code(), JobError::EXIT_INTERRUPTED);
    assert_eq!(provider.submits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_submit_sends_nothing() {
    let provider = ScriptedProvider::new(vec![Step::Status("completed")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = Submitter::new(provider.clone(), &RunnerConfig::research())
        .with_cancellation(cancel)
        .submit(&"query".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Cancelled { .. }));
    assert_eq!(provider.submits.load(Ordering::SeqCst), 0);
}
