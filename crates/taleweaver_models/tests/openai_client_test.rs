//! Story generation client against a local mock upstream.

mod test_utils;

use serde_json::json;
use std::sync::Arc;
use taleweaver_core::{Beat, Character, Gender, StoryOptions};
use taleweaver_error::{ProviderErrorKind, TaleweaverErrorKind};
use taleweaver_interface::StoryGenerator;
use taleweaver_models::{OpenAiStoryClient, prompt};
use taleweaver_voice::VoiceCatalog;
use test_utils::{MockUpstream, Scripted, provider_config};

fn options() -> StoryOptions {
    StoryOptions::builder()
        .theme("friendship")
        .genre("adventure")
        .target_age_group("5-7")
        .story_length(2u32)
        .main_character(Some(Character::new("Alex", Gender::Male)))
        .supporting_characters(vec![Character::new("Sam", Gender::Female)])
        .build()
        .unwrap()
}

fn story_content() -> String {
    json!({
        "title": "The Lost Kite",
        "genre": "adventure",
        "target_audience": "5-7",
        "pages": [
            {
                "page": 1,
                "scene_title": "A Windy Morning",
                "image_prompt": "Two kids chasing a red kite over a hill",
                "timeline": [
                    {"type": "narration", "text": "The wind picked up over the hill."},
                    {"type": "character", "name": "Alex", "emotion": "joy", "voice_id": "TX3LPaxmHKxFdv7VOQHJ", "text": "Look how high it goes!"}
                ]
            },
            {
                "page": 2,
                "scene_title": "Home Again",
                "timeline": [
                    {"type": "character", "name": "Sam", "text": "We found it together."}
                ]
            }
        ]
    })
    .to_string()
}

fn completion(content: &str) -> Scripted {
    Scripted::json(200, json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
}

fn client(base_url: &str, retries: usize) -> OpenAiStoryClient {
    let catalog = Arc::new(VoiceCatalog::builtin().unwrap());
    OpenAiStoryClient::new(&provider_config(base_url, retries), catalog)
        .unwrap()
        .with_api_key(Some("test-key".to_string()))
}

#[tokio::test]
async fn test_generate_story_parses_completion() {
    let upstream = MockUpstream::new(vec![completion(&story_content())]);
    let base_url = upstream.start().await;

    let parsed = client(&base_url, 0).generate_story(&options()).await.unwrap();

    assert_eq!(parsed.story.title, "The Lost Kite");
    assert_eq!(parsed.story.pages.len(), 2);
    assert!(matches!(
        parsed.story.pages[0].timeline[1],
        Beat::Character { ref name, .. } if name == "Alex"
    ));

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1/chat/completions");
    assert_eq!(requests[0].header("authorization").as_deref(), Some("Bearer test-key"));

    let body = requests[0].json();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    let user: serde_json::Value =
        serde_json::from_str(body["messages"][1]["content"].as_str().unwrap()).unwrap();
    assert_eq!(user["theme"], "friendship");
    assert_eq!(user["targetAgeGroup"], "5-7");
    assert_eq!(user["storyLength"], 2);
}

#[tokio::test]
async fn test_empty_completion_is_malformed() {
    let upstream = MockUpstream::new(vec![completion("   ")]);
    let base_url = upstream.start().await;

    let err = client(&base_url, 0).generate_story(&options()).await.unwrap_err();

    match err.kind() {
        TaleweaverErrorKind::Provider(e) => {
            assert!(matches!(e.kind, ProviderErrorKind::MalformedResponse(_)));
            assert!(err.message().contains("empty response"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_json_content_fails_loudly() {
    let upstream = MockUpstream::new(vec![completion("Once upon a time...")]);
    let base_url = upstream.start().await;

    let err = client(&base_url, 0).generate_story(&options()).await.unwrap_err();
    assert!(err.message().contains("non-JSON"));
}

#[tokio::test]
async fn test_missing_key_fails_without_calling_upstream() {
    let upstream = MockUpstream::new(vec![completion(&story_content())]);
    let base_url = upstream.start().await;

    let err = client(&base_url, 0)
        .with_api_key(None)
        .generate_story(&options())
        .await
        .unwrap_err();

    assert_eq!(err.message(), "OPENAI_API_KEY is not configured.");
    assert_eq!(upstream.request_count(), 0);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let upstream = MockUpstream::new(vec![Scripted::json(401, json!({"error": "bad key"}))]);
    let base_url = upstream.start().await;

    let err = client(&base_url, 2).generate_story(&options()).await.unwrap_err();

    match err.kind() {
        TaleweaverErrorKind::Provider(e) => match &e.kind {
            ProviderErrorKind::Http { status_code, body, .. } => {
                assert_eq!(*status_code, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected kind: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(upstream.request_count(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let upstream = MockUpstream::new(vec![
        Scripted::text(503, "busy"),
        completion(&story_content()),
    ]);
    let base_url = upstream.start().await;

    let parsed = client(&base_url, 2).generate_story(&options()).await.unwrap();

    assert_eq!(parsed.story.pages.len(), 2);
    assert_eq!(upstream.request_count(), 2);
}

#[test]
fn test_system_prompt_carries_voices_and_presets() {
    let catalog = VoiceCatalog::builtin().unwrap();
    let options = options().with_narration_voice_id("iCrDUkL56s3C8sCRl7wb");

    let text = prompt::system_prompt(&options, &catalog);

    assert!(text.contains("Write exactly 2 pages"));
    assert!(text.contains("\"iCrDUkL56s3C8sCRl7wb\""));
    assert!(text.contains("Alex (male)"));
    assert!(text.contains("- Sam (female)"));
    assert!(text.contains("TX3LPaxmHKxFdv7VOQHJ"));
    assert!(text.contains("| villainous | 0.45 | 0.7 | 0.85 | 0.95 |"));
    assert!(text.contains("| narrative | 0.9 | 0.9 | 0.15 | 1 |"));
}
