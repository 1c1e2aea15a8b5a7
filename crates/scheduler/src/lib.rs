use careerscout_core::{ErrorCategory, ScrapeError, ScrapeJob, ScrapeWorker, SessionReport};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc, oneshot};
use uuid::Uuid;

type Outcome = Result<SessionReport, ScrapeError>;

/// A queued job and where its outcome goes.
pub struct Submission {
    job: ScrapeJob,
    reply: oneshot::Sender<Outcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("too many searches queued, try again later")]
    QueueFull,
    #[error("worker pool is not running")]
    Closed,
}

/// Handle for one submitted search. Resolves once the session has finished
/// and released its browser and storage connection.
#[derive(Debug)]
pub struct Completion {
    pub job_id: Uuid,
    receiver: oneshot::Receiver<Outcome>,
}

impl Completion {
    pub async fn wait(self) -> Outcome {
        self.receiver.await.unwrap_or_else(|_| {
            Err(ScrapeError::new(
                ErrorCategory::Unknown,
                "Worker pool stopped before the search finished",
            ))
        })
    }
}

/// Bounded pool running scrape sessions off the caller's runtime.
pub struct Scheduler {
    worker: Arc<dyn ScrapeWorker>,
    sender: mpsc::Sender<Submission>,
    concurrency_limit: Arc<Semaphore>,
}

impl Clone for Scheduler {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
            sender: self.sender.clone(),
            concurrency_limit: Arc::clone(&self.concurrency_limit),
        }
    }
}

impl Scheduler {
    pub fn new<W: ScrapeWorker + 'static>(
        worker: W,
        capacity: usize,
        max_concurrent: usize,
    ) -> (Self, mpsc::Receiver<Submission>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let scheduler = Self {
            worker: Arc::new(worker),
            sender: tx,
            concurrency_limit: Arc::new(Semaphore::new(max_concurrent.max(1))),
        };
        (scheduler, rx)
    }

    /// Queues a search without waiting for room.
    pub fn submit(&self, query: impl Into<String>) -> Result<Completion, SubmitError> {
        let job = ScrapeJob::new(query);
        let job_id = job.id;
        let (reply, receiver) = oneshot::channel();

        self.sender.try_send(Submission { job, reply }).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })?;
        tracing::debug!(%job_id, "search queued");

        Ok(Completion { job_id, receiver })
    }

    /// Drains the queue until every other handle is dropped and all sessions
    /// are done.
    pub async fn run(self, mut receiver: mpsc::Receiver<Submission>) {
        let Self { worker, sender, concurrency_limit } = self;
        drop(sender);
        let mut futures = FuturesUnordered::new();

        loop {
            tokio::select! {
                Some(Submission { job, reply }) = receiver.recv() => {
                    let worker = Arc::clone(&worker);
                    let limit = Arc::clone(&concurrency_limit);

                    futures.push(async move {
                        let result = match limit.acquire_owned().await {
                            Ok(_permit) => worker.execute(&job).await,
                            Err(_) => Err(ScrapeError::resource_acquisition("Worker pool is shutting down")),
                        };
                        (job, reply, result)
                    });
                }
                Some((job, reply, result)) = futures.next() => {
                    match &result {
                        Ok(report) => tracing::info!(
                            job_id = %job.id,
                            records = report.records_sunk,
                            pages = report.pages,
                            "search succeeded"
                        ),
                        Err(err) => tracing::warn!(job_id = %job.id, error = %err, "search failed"),
                    }
                    if reply.send(result).is_err() {
                        tracing::debug!(job_id = %job.id, "nobody waiting for search result");
                    }
                }
                else => break,
            }
        }
    }
}
