/// Bounded worker pool for blocking work and external processes
use catalog_core::{CatalogError, Result};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Gates pooled operations behind a fixed number of permits
///
/// Every operation also races the build's cancellation token and an optional
/// timeout, so a hung extractor or transcoder cannot hang the build.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    workers: usize,
    cancel: CancellationToken,
}

impl WorkerPool {
    pub fn new(workers: usize, cancel: CancellationToken) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            cancel,
        }
    }

    /// Token observed by every pooled operation
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run an async operation (e.g. a transcoder process) on a pool permit
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        path: &Path,
        limit: Option<Duration>,
        work: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.guard(operation, path, limit, |permit| async move {
            let _permit = permit;
            work.await
        })
        .await
    }

    /// Run a blocking job on tokio's blocking threads, on a pool permit
    ///
    /// The permit moves into the job and is released only when the job returns,
    /// even if the caller stopped waiting for it.
    pub async fn run_blocking<T, F>(
        &self,
        operation: &'static str,
        path: &Path,
        limit: Option<Duration>,
        job: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.guard(operation, path, limit, |permit| async move {
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job()
            })
            .await
            .map_err(|e| CatalogError::Worker(e.to_string()))?
        })
        .await
    }

    /// Wait until no pooled job is running, giving up after `grace`
    ///
    /// Returns `false` if jobs were still running when `grace` elapsed.
    pub async fn drain(&self, grace: Duration) -> bool {
        let Ok(count) = u32::try_from(self.workers) else {
            return false;
        };
        matches!(
            tokio::time::timeout(grace, self.permits.acquire_many(count)).await,
            Ok(Ok(_))
        )
    }

    /// Acquire a permit, then race `work` against cancellation and an optional timeout
    ///
    /// The timeout covers the work itself, not the wait for a permit.
    async fn guard<T, F, Fut>(
        &self,
        operation: &'static str,
        path: &Path,
        limit: Option<Duration>,
        work: F,
    ) -> Result<T>
    where
        F: FnOnce(OwnedSemaphorePermit) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let bounded = async {
            let permit = Arc::clone(&self.permits)
                .acquire_owned()
                .await
                .map_err(|_| CatalogError::Cancelled)?;
            let work = work(permit);

            match limit {
                Some(after) => tokio::time::timeout(after, work).await.map_err(|_| {
                    tracing::warn!(
                        operation,
                        path = %path.display(),
                        "Pooled operation timed out after {:?}",
                        after
                    );
                    CatalogError::Timeout {
                        operation,
                        path: path.to_path_buf(),
                        after,
                    }
                })?,
                None => work.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CatalogError::Cancelled),
            result = bounded => result,
        }
    }
}
