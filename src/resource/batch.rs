//! Bounded fan-out for child downloads.
//!
//! Children of a resource (pages of a chapter, chapters of a manga) run as
//! separate Tokio tasks. A semaphore permit is acquired before each task is
//! spawned and released when it finishes, so at most `permits` children are in
//! flight. Every child outcome lands in the returned [`DownloadReport`].

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use super::DownloadReport;
use crate::extractor::ExtractError;

/// A child download: the target it writes (for reporting) and the work itself.
pub(crate) struct ChildJob<F> {
    pub target: String,
    pub work: F,
}

impl<F> ChildJob<F> {
    pub(crate) fn new(target: impl Into<String>, work: F) -> Self {
        Self {
            target: target.into(),
            work,
        }
    }
}

/// Runs `jobs` with at most `semaphore`'s permits in flight and waits for all of them.
///
/// A job's own report is merged into the result; its error (or a panic) is
/// recorded as a child failure. Nothing is retried.
pub(crate) async fn run_bounded<F>(semaphore: &Arc<Semaphore>, jobs: Vec<ChildJob<F>>) -> DownloadReport
where
    F: Future<Output = Result<DownloadReport, ExtractError>> + Send + 'static,
{
    let mut report = DownloadReport::new();
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let permit = match Arc::clone(semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                report.record_failure(
                    job.target.clone(),
                    ExtractError::TaskFailed {
                        target: job.target,
                        message: "semaphore closed unexpectedly".to_string(),
                    },
                );
                continue;
            }
        };

        let work = job.work;
        handles.push((
            job.target,
            tokio::spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;
                work.await
            }),
        ));
    }

    debug!(task_count = handles.len(), "waiting for child downloads");

    for (target, handle) in handles {
        match handle.await {
            Ok(Ok(child)) => report.merge(child),
            Ok(Err(error)) => report.record_failure(target, error),
            Err(join_error) => report.record_failure(
                target.clone(),
                ExtractError::TaskFailed {
                    target,
                    message: join_error.to_string(),
                },
            ),
        }
    }

    report
}
