//! Background jobs for blocking API calls.
//!
//! Every call runs on a blocking worker under a deadline. The outcome comes
//! back to the UI loop as a [`UiMessage`] on a bounded channel and is applied
//! there in the order it was enqueued.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use courier_core::{
    ApiClient, ApiError, FormKind, FormSubmission, KernelError, Mutation, Query, Row,
    StalePolicy, Summary, ViewName,
};

use super::constants::{LOAD_TIMEOUT, MUTATE_TIMEOUT, SUBMIT_TIMEOUT};

/// Recipient of a job's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A registered view.
    View(ViewName),
    /// An overlay, by session-unique id.
    Overlay(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Load,
    Mutate,
    Submit,
}

impl JobKind {
    pub fn timeout(self) -> Duration {
        match self {
            Self::Load => LOAD_TIMEOUT,
            Self::Mutate => MUTATE_TIMEOUT,
            Self::Submit => SUBMIT_TIMEOUT,
        }
    }
}

/// Identity of a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub target: Target,
    pub kind: JobKind,
    /// Human-readable name, e.g. `load messages`.
    pub label: String,
    /// Monotonically increasing across the session.
    pub request: u64,
    /// Resource whose records the job changes.
    pub affects: Option<ViewName>,
}

/// Blocking work a job performs.
#[derive(Debug, Clone)]
pub enum Work {
    List { resource: ViewName, query: Query },
    Summary,
    Mutate { resource: ViewName, id: String, mutation: Mutation },
    Submit(FormSubmission),
}

impl Work {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::List { .. } | Self::Summary => JobKind::Load,
            Self::Mutate { .. } => JobKind::Mutate,
            Self::Submit(_) => JobKind::Submit,
        }
    }

    /// Resource a finished job leaves stale.
    pub fn affects(&self) -> Option<ViewName> {
        match self {
            Self::List { .. } | Self::Summary => None,
            Self::Mutate { resource, .. } => Some(*resource),
            Self::Submit(submission) => Some(submission.kind.resource()),
        }
    }

    fn run(self, client: &dyn ApiClient, grant: &str) -> Result<Payload, ApiError> {
        match self {
            Self::List { resource, query } => client.list(grant, resource, &query).map(Payload::Rows),
            Self::Summary => client.summary(grant).map(Payload::Summary),
            Self::Mutate { resource, id, mutation } => {
                client.mutate(grant, resource, &id, &mutation)?;
                Ok(Payload::Done(format!("{} {id}", mutation.done_label())))
            }
            Self::Submit(submission) => {
                client.submit(grant, &submission)?;
                Ok(Payload::Done(match (submission.kind, &submission.id) {
                    (FormKind::Message, _) => "Message sent".to_string(),
                    (kind, Some(id)) => format!("Updated {kind} {id}"),
                    (kind, None) => format!("Created {kind}"),
                }))
            }
        }
    }
}

/// Successful result of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Rows(Vec<Row>),
    Summary(Summary),
    /// A mutation or submission finished; carries a confirmation message.
    Done(String),
}

/// A finished job.
#[derive(Debug, Clone)]
pub struct Completion {
    pub job: Job,
    pub result: Result<Payload, KernelError>,
}

/// Messages drained by the UI loop.
#[derive(Debug, Clone)]
pub enum UiMessage {
    Completed(Completion),
    /// Once-a-second status refresh from the ticker.
    StatusTick,
}

/// Issues jobs and decides whether their results are still wanted.
pub struct Scheduler {
    client: Arc<dyn ApiClient>,
    tx: mpsc::Sender<UiMessage>,
    policy: StalePolicy,
    next_request: u64,
    /// Newest load request issued per target.
    latest_load: HashMap<Target, u64>,
    in_flight: usize,
}

impl Scheduler {
    pub fn new(client: Arc<dyn ApiClient>, tx: mpsc::Sender<UiMessage>, policy: StalePolicy) -> Self {
        Self {
            client,
            tx,
            policy,
            next_request: 0,
            latest_load: HashMap::new(),
            in_flight: 0,
        }
    }

    /// Allocate a job id and record it as the newest load for its target.
    pub fn begin(&mut self, target: Target, kind: JobKind, label: impl Into<String>) -> Job {
        self.next_request += 1;
        let request = self.next_request;
        if kind == JobKind::Load {
            self.latest_load.insert(target, request);
        }
        Job {
            target,
            kind,
            label: label.into(),
            request,
            affects: None,
        }
    }

    /// Run `work` on a blocking worker for `grant`.
    pub fn spawn(&mut self, target: Target, label: impl Into<String>, grant: &str, work: Work) -> Job {
        let mut job = self.begin(target, work.kind(), label);
        job.affects = work.affects();
        self.in_flight += 1;
        tracing::debug!(label = %job.label, request = job.request, "Spawning job");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let grant = grant.to_string();
        let spawned = job.clone();

        tokio::spawn(async move {
            let deadline = spawned.kind.timeout();
            let worker = tokio::task::spawn_blocking(move || work.run(client.as_ref(), &grant));

            let result = match tokio::time::timeout(deadline, worker).await {
                Ok(Ok(outcome)) => outcome.map_err(KernelError::from),
                Ok(Err(join_error)) => Err(KernelError::Worker {
                    message: join_error.to_string(),
                }),
                Err(_) => Err(KernelError::Timeout {
                    operation: spawned.label.clone(),
                    after: deadline,
                }),
            };

            let completion = Completion { job: spawned, result };
            if tx.send(UiMessage::Completed(completion)).await.is_err() {
                tracing::debug!("UI channel closed before job completed");
            }
        });

        job
    }

    /// Record a completion and report whether its result should be applied.
    ///
    /// Under [`StalePolicy::Discard`] a load older than the newest load issued
    /// for the same target is dropped.
    pub fn accept(&mut self, job: &Job) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if job.kind != JobKind::Load || self.policy == StalePolicy::Apply {
            return true;
        }
        let current = self
            .latest_load
            .get(&job.target)
            .is_none_or(|&latest| job.request >= latest);
        if !current {
            tracing::debug!(label = %job.label, request = job.request, "Discarding stale load");
        }
        current
    }

    /// Forget load bookkeeping for an overlay that left the stack.
    pub fn forget(&mut self, target: Target) {
        self.latest_load.remove(&target);
    }

    /// Number of spawned jobs whose results have not been received.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::DemoClient;

    fn scheduler(policy: StalePolicy) -> (Scheduler, mpsc::Receiver<UiMessage>) {
        let (tx, rx) = mpsc::channel(16);
        (Scheduler::new(Arc::new(DemoClient::new()), tx, policy), rx)
    }

    #[test]
    fn test_request_ids_increase() {
        let (mut scheduler, _rx) = scheduler(StalePolicy::Discard);
        let a = scheduler.begin(Target::View(ViewName::Messages), JobKind::Load, "load");
        let b = scheduler.begin(Target::View(ViewName::Events), JobKind::Mutate, "mutate");
        assert!(b.request > a.request);
    }

    #[test]
    fn test_discard_drops_older_load() {
        let (mut scheduler, _rx) = scheduler(StalePolicy::Discard);
        let target = Target::View(ViewName::Messages);
        let older = scheduler.begin(target, JobKind::Load, "load messages");
        let newer = scheduler.begin(target, JobKind::Load, "load messages");
        assert!(scheduler.accept(&newer));
        assert!(!scheduler.accept(&older));
    }

    #[test]
    fn test_apply_keeps_everything() {
        let (mut scheduler, _rx) = scheduler(StalePolicy::Apply);
        let target = Target::View(ViewName::Messages);
        let older = scheduler.begin(target, JobKind::Load, "load messages");
        let _newer = scheduler.begin(target, JobKind::Load, "load messages");
        assert!(scheduler.accept(&older));
    }

    #[test]
    fn test_mutations_are_never_stale() {
        let (mut scheduler, _rx) = scheduler(StalePolicy::Discard);
        let target = Target::View(ViewName::Contacts);
        let mutate = scheduler.begin(target, JobKind::Mutate, "delete");
        scheduler.begin(target, JobKind::Load, "load contacts");
        assert!(scheduler.accept(&mutate));
    }

    #[tokio::test]
    async fn test_spawned_job_reports_back() {
        let (mut scheduler, mut rx) = scheduler(StalePolicy::Discard);
        let job = scheduler.spawn(
            Target::View(ViewName::Contacts),
            "load contacts",
            "grant-demo-1",
            Work::List {
                resource: ViewName::Contacts,
                query: Query::default(),
            },
        );
        assert_eq!(scheduler.in_flight(), 1);

        let Some(UiMessage::Completed(completion)) = rx.recv().await else {
            panic!("expected a completion");
        };
        assert_eq!(completion.job, job);
        assert!(matches!(completion.result, Ok(Payload::Rows(rows)) if !rows.is_empty()));
    }

    #[tokio::test]
    async fn test_api_errors_become_kernel_errors() {
        let (tx, mut rx) = mpsc::channel(4);
        let client = Arc::new(DemoClient::new());
        client.set_failure(Some(ApiError::other("offline")));
        let mut scheduler = Scheduler::new(client, tx, StalePolicy::Discard);
        scheduler.spawn(Target::View(ViewName::Dashboard), "load dashboard", "g", Work::Summary);

        let Some(UiMessage::Completed(completion)) = rx.recv().await else {
            panic!("expected a completion");
        };
        assert_eq!(
            completion.result.unwrap_err(),
            KernelError::Api(ApiError::other("offline"))
        );
    }
}
