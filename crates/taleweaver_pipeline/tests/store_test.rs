//! In-memory story store tests.

mod test_utils;

use std::time::Duration;
use taleweaver_core::{AssetRef, PagePatch, PageStatus};
use taleweaver_error::{PipelineErrorKind, TaleweaverErrorKind};
use taleweaver_interface::StoryStateStore;
use taleweaver_pipeline::{InMemoryStoryStore, StoreLimits};
use test_utils::two_page_story;

fn pipeline_kind(err: &taleweaver_error::TaleweaverError) -> PipelineErrorKind {
    match err.kind() {
        TaleweaverErrorKind::Pipeline(e) => e.kind.clone(),
        other => panic!("unexpected error: {other}"),
    }
}

async fn finish(store: &InMemoryStoryStore, story_id: &str) {
    for page in [1, 2] {
        store
            .update_page(story_id, page, PagePatch::default().with_status(PageStatus::Completed))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_create_starts_every_page_pending() {
    let store = InMemoryStoryStore::default();
    let id = store.create(two_page_story()).await.unwrap();

    let job = store.get(&id).await.unwrap();
    assert_eq!(job.story_id, id);
    assert_eq!(job.progress, 0.0);
    assert!(job.pages.iter().all(|p| p.status == PageStatus::Pending));
    assert!(store.get("missing").await.is_none());
}

#[tokio::test]
async fn test_update_page_recomputes_progress() {
    let store = InMemoryStoryStore::default();
    let id = store.create(two_page_story()).await.unwrap();

    let audio = AssetRef {
        path: "/audio/x/page-1.mp3".to_string(),
        url: "http://localhost:5000/audio/x/page-1.mp3".to_string(),
    };
    store
        .update_page(
            &id,
            1,
            PagePatch::default()
                .with_status(PageStatus::Completed)
                .with_audio(audio.clone()),
        )
        .await
        .unwrap();

    let job = store.get(&id).await.unwrap();
    assert_eq!(job.progress, 0.5);
    assert_eq!(job.page(1).unwrap().assets.audio, Some(audio));
    assert!(job.finished_at.is_none());

    store
        .update_page(&id, 2, PagePatch::default().with_status(PageStatus::Failed))
        .await
        .unwrap();
    let job = store.get(&id).await.unwrap();
    assert_eq!(job.progress, 1.0);
    assert!(job.finished_at.is_some());
}

#[tokio::test]
async fn test_terminal_pages_reject_new_status() {
    let store = InMemoryStoryStore::default();
    let id = store.create(two_page_story()).await.unwrap();
    store
        .update_page(&id, 1, PagePatch::default().with_status(PageStatus::Completed))
        .await
        .unwrap();

    let err = store
        .update_page(&id, 1, PagePatch::default().with_status(PageStatus::Processing))
        .await
        .unwrap_err();
    assert!(matches!(
        pipeline_kind(&err),
        PipelineErrorKind::InvalidTransition { page: 1, .. }
    ));
    assert_eq!(
        store.get(&id).await.unwrap().page(1).unwrap().status,
        PageStatus::Completed
    );
}

#[tokio::test]
async fn test_unknown_story_and_page_are_reported() {
    let store = InMemoryStoryStore::default();
    let id = store.create(two_page_story()).await.unwrap();

    let err = store
        .append_log("nope", 1, "hello".to_string())
        .await
        .unwrap_err();
    assert_eq!(
        pipeline_kind(&err),
        PipelineErrorKind::StoryNotFound("nope".to_string())
    );

    let err = store
        .update_page(&id, 9, PagePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(
        pipeline_kind(&err),
        PipelineErrorKind::PageNotFound { page: 9, .. }
    ));

    assert!(store.logs("nope").await.is_err());
}

#[tokio::test]
async fn test_logs_are_flattened_oldest_first() {
    let store = InMemoryStoryStore::default();
    let id = store.create(two_page_story()).await.unwrap();
    store.append_log(&id, 2, "two".to_string()).await.unwrap();
    store.append_log(&id, 1, "one".to_string()).await.unwrap();

    let logs = store.logs(&id).await.unwrap();
    let flat: Vec<(u32, &str)> = logs
        .iter()
        .map(|l| (l.page_number, l.message.as_str()))
        .collect();
    assert_eq!(flat, vec![(2, "two"), (1, "one")]);
}

#[tokio::test]
async fn test_oldest_finished_job_is_evicted_at_capacity() {
    let store = InMemoryStoryStore::new(StoreLimits {
        max_jobs: 2,
        job_ttl: Duration::from_secs(3600),
    });
    let first = store.create(two_page_story()).await.unwrap();
    let second = store.create(two_page_story()).await.unwrap();
    finish(&store, &first).await;

    let third = store.create(two_page_story()).await.unwrap();
    assert!(store.get(&first).await.is_none());
    assert!(store.get(&second).await.is_some());
    assert!(store.get(&third).await.is_some());
}

#[tokio::test]
async fn test_unfinished_jobs_are_never_evicted() {
    let store = InMemoryStoryStore::new(StoreLimits {
        max_jobs: 1,
        job_ttl: Duration::ZERO,
    });
    let first = store.create(two_page_story()).await.unwrap();
    let second = store.create(two_page_story()).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(store.get(&first).await.is_some());
    assert!(store.get(&second).await.is_some());
}

#[tokio::test]
async fn test_expired_finished_jobs_are_swept() {
    let store = InMemoryStoryStore::new(StoreLimits {
        max_jobs: 100,
        job_ttl: Duration::from_millis(5),
    });
    let old = store.create(two_page_story()).await.unwrap();
    finish(&store, &old).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fresh = store.create(two_page_story()).await.unwrap();
    assert!(store.get(&old).await.is_none());
    assert!(store.get(&fresh).await.is_some());
}
