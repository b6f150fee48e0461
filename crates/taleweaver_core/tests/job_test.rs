use taleweaver_core::{
    AssetRef, Beat, ErrorStage, Page, PageError, PagePatch, PageStatus, PipelineJob, Story,
    StoryOptions,
};

fn story(pages: u32) -> Story {
    Story {
        title: "Test".to_string(),
        logline: "A test".to_string(),
        characters: vec![],
        pages: (1..=pages)
            .map(|n| Page::new(n, format!("Scene {}", n), None, vec![Beat::narration("Hi")]))
            .collect(),
        metadata: None,
    }
}

#[test]
fn new_job_has_one_pending_state_per_page() {
    let job = PipelineJob::new("abc", story(3));
    assert_eq!(job.pages.len(), 3);
    assert!(job.pages.iter().all(|p| p.status == PageStatus::Pending));
    assert_eq!(
        job.pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(job.progress, 0.0);
    assert!(job.finished_at.is_none());
}

#[test]
fn progress_counts_terminal_pages() {
    let mut job = PipelineJob::new("abc", story(2));
    job.page_mut(1)
        .unwrap()
        .apply(PagePatch::default().with_status(PageStatus::Completed))
        .unwrap();
    job.recompute_progress();
    assert_eq!(job.progress, 0.5);

    job.page_mut(2)
        .unwrap()
        .apply(PagePatch::default().with_status(PageStatus::Failed))
        .unwrap();
    job.recompute_progress();
    assert_eq!(job.progress, 1.0);
    assert!(job.is_finished());
    assert!(job.finished_at.is_some());
}

#[test]
fn terminal_states_are_final() {
    assert!(PageStatus::Pending.can_transition_to(PageStatus::Processing));
    assert!(PageStatus::Processing.can_transition_to(PageStatus::Failed));
    assert!(!PageStatus::Processing.can_transition_to(PageStatus::Pending));
    assert!(!PageStatus::Completed.can_transition_to(PageStatus::Failed));
    assert!(!PageStatus::Failed.can_transition_to(PageStatus::Processing));
}

#[test]
fn patch_records_assets_and_errors() {
    let mut job = PipelineJob::new("abc", story(1));
    let page = job.page_mut(1).unwrap();
    page.apply(
        PagePatch::default()
            .with_audio(AssetRef {
                path: "/audio/abc/page-1.mp3".to_string(),
                url: "http://localhost/audio/abc/page-1.mp3".to_string(),
            })
            .with_errors(vec![PageError::new(ErrorStage::Sfx, "boom").at_beat(2)]),
    )
    .unwrap();

    assert!(page.assets.audio.is_some());
    assert!(page.assets.image.is_none());
    assert_eq!(page.errors[0].beat_index, Some(2));

    let json = serde_json::to_value(&*page).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["errors"][0]["stage"], "sfx");
    assert_eq!(json["errors"][0]["beatIndex"], 2);
    assert!(json["assets"]["image"].is_null());
}

#[test]
fn options_validation_lists_missing_fields() {
    let options = StoryOptions::builder()
        .theme("")
        .genre("")
        .target_age_group("5-7")
        .build()
        .unwrap();
    let err = options.validate().unwrap_err();
    assert_eq!(err.message, "Missing required fields: theme, genre");
    assert_eq!(*options.story_length(), 6);
}

#[test]
fn options_builder_requires_theme() {
    assert!(StoryOptions::builder().genre("g").build().is_err());
}
