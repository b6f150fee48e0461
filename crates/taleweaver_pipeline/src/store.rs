//! In-memory story state store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use taleweaver_core::{LogEntry, PagePatch, PipelineJob, Story, StoryLogEntry};
use taleweaver_error::{PipelineError, PipelineErrorKind, TaleweaverResult};
use taleweaver_interface::StoryStateStore;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Retention bounds for [`InMemoryStoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Jobs kept at once; unfinished jobs may push past it
    pub max_jobs: usize,
    /// Age after which finished jobs are dropped
    pub job_ttl: Duration,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_jobs: 200,
            job_ttl: Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// Story jobs held in a `HashMap` behind an `RwLock`.
///
/// Every read returns a cloned snapshot, and write sections never await,
/// so pollers are not held up by a running build. All data is lost when the
/// store is dropped.
///
/// Eviction runs on [`StoryStateStore::create`]: finished jobs older than
/// the TTL go first, then the oldest finished jobs until the store is under
/// `max_jobs`. Unfinished jobs are never evicted.
///
/// # Example
///
/// ```
/// use taleweaver_core::{Page, Story};
/// use taleweaver_interface::StoryStateStore;
/// use taleweaver_pipeline::InMemoryStoryStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryStoryStore::default();
/// let story = Story {
///     title: "t".into(),
///     logline: "l".into(),
///     characters: vec![],
///     pages: vec![Page::new(1, "One", None, vec![])],
///     metadata: None,
/// };
/// let id = store.create(story).await.unwrap();
/// assert_eq!(store.get(&id).await.unwrap().pages.len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoryStore {
    jobs: Arc<RwLock<HashMap<String, PipelineJob>>>,
    limits: StoreLimits,
}

impl InMemoryStoryStore {
    /// Create an empty store with the given bounds.
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            limits,
        }
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Configured bounds.
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    fn sweep(&self, jobs: &mut HashMap<String, PipelineJob>) {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.limits.job_ttl).unwrap_or(chrono::Duration::MAX);
        let before = jobs.len();
        jobs.retain(|_, job| !(job.is_finished() && now - job.created_at > ttl));

        if jobs.len() >= self.limits.max_jobs {
            let mut finished: Vec<_> = jobs
                .values()
                .filter(|job| job.is_finished())
                .map(|job| (job.created_at, job.story_id.clone()))
                .collect();
            finished.sort();
            let excess = jobs.len() + 1 - self.limits.max_jobs;
            for (_, id) in finished.into_iter().take(excess) {
                jobs.remove(&id);
            }
        }

        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!(evicted, remaining = jobs.len(), "Evicted finished jobs");
        }
        if jobs.len() >= self.limits.max_jobs {
            warn!(
                jobs = jobs.len(),
                max_jobs = self.limits.max_jobs,
                "Store is full of unfinished jobs"
            );
        }
    }
}

fn story_not_found(story_id: &str) -> PipelineError {
    PipelineError::new(PipelineErrorKind::StoryNotFound(story_id.to_string()))
}

fn page_not_found(story_id: &str, page: u32) -> PipelineError {
    PipelineError::new(PipelineErrorKind::PageNotFound {
        story_id: story_id.to_string(),
        page,
    })
}

#[async_trait]
impl StoryStateStore for InMemoryStoryStore {
    #[instrument(skip(self, story), fields(title = %story.title, pages = story.pages.len()))]
    async fn create(&self, story: Story) -> TaleweaverResult<String> {
        let story_id = Uuid::new_v4().to_string();
        let job = PipelineJob::new(story_id.clone(), story);

        let mut jobs = self.jobs.write().await;
        self.sweep(&mut jobs);
        jobs.insert(story_id.clone(), job);
        info!(story_id = %story_id, jobs = jobs.len(), "Created story job");
        Ok(story_id)
    }

    async fn get(&self, story_id: &str) -> Option<PipelineJob> {
        self.jobs.read().await.get(story_id).cloned()
    }

    #[instrument(skip(self, patch), fields(status = ?patch.status))]
    async fn update_page(
        &self,
        story_id: &str,
        page_number: u32,
        patch: PagePatch,
    ) -> TaleweaverResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(story_id).ok_or_else(|| story_not_found(story_id))?;
        let page = job
            .page_mut(page_number)
            .ok_or_else(|| page_not_found(story_id, page_number))?;
        page.apply(patch)?;
        job.recompute_progress();
        debug!(progress = job.progress, "Updated page");
        Ok(())
    }

    async fn append_log(
        &self,
        story_id: &str,
        page_number: u32,
        message: String,
    ) -> TaleweaverResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(story_id).ok_or_else(|| story_not_found(story_id))?;
        let page = job
            .page_mut(page_number)
            .ok_or_else(|| page_not_found(story_id, page_number))?;
        page.logs.push(LogEntry::now(message));
        Ok(())
    }

    async fn logs(&self, story_id: &str) -> TaleweaverResult<Vec<StoryLogEntry>> {
        let jobs = self.jobs.read().await;
        let job = jobs.get(story_id).ok_or_else(|| story_not_found(story_id))?;
        Ok(job.flattened_logs())
    }
}
