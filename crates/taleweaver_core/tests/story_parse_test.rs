use taleweaver_core::{Beat, Gender, TimelineWarningKind, parse_generated_story};
use taleweaver_error::{ProviderErrorKind, TaleweaverErrorKind};

const PAGES_PAYLOAD: &str = r#"{
  "title": "The Awakening",
  "genre": "Fantasy Adventure",
  "target_audience": "General",
  "pages": [
    {
      "page": 1,
      "scene_title": "The Ruins",
      "image_prompt": "Moonlit ruins",
      "timeline": [
        {"type": "narration", "text": "The night was silent."},
        {"type": "character", "name": "Taeil", "text": "Who's there?"},
        {"type": "sfx", "description": "Stone cracking", "placeholder": "CRACK!"}
      ]
    },
    {
      "timeline": [
        {"type": "character", "name": "Guardian", "text": "I remember."}
      ]
    }
  ]
}"#;

#[test]
fn parses_pages_shape() {
    let parsed = parse_generated_story(PAGES_PAYLOAD).unwrap();
    let story = parsed.story;

    assert_eq!(story.title, "The Awakening");
    assert_eq!(story.logline, "Fantasy Adventure - General");
    assert_eq!(story.pages.len(), 2);
    assert_eq!(story.pages[0].page_number, 1);
    assert_eq!(story.pages[0].image_prompt.as_deref(), Some("Moonlit ruins"));
    assert_eq!(story.pages[0].summary, "The night was silent.");
    assert_eq!(story.pages[1].page_number, 2);
    assert_eq!(story.pages[1].title, "Scene 2");
    assert!(story.characters.is_empty());

    let metadata = story.metadata.unwrap();
    assert_eq!(metadata.theme.as_deref(), Some("The night was silent."));
    assert!(parsed.warnings.is_empty());
}

#[test]
fn parses_legacy_scenes_shape() {
    let payload = r#"{
        "title": "Old Format",
        "characters": ["Alex|male|brave", {"name": "Sam", "gender": "female"}],
        "scenes": [{
            "scene_number": 1,
            "title": "Beach",
            "image_prompt": "A sunny beach",
            "narration": {"text": "Waves rolled in.", "voice_id": "EkK5I93UQWFDigLMpZcX"},
            "characters": [{"name": "Alex", "text": "Look!", "voice_id": "TX3LPaxmHKxFdv7VOQHJ"}],
            "sfx": ["Seagulls calling"]
        }]
    }"#;

    let story = parse_generated_story(payload).unwrap().story;
    assert_eq!(story.logline, "Untitled Story");
    assert_eq!(story.characters.len(), 2);
    assert_eq!(story.characters[0].gender, Gender::Male);
    assert_eq!(story.characters[1].gender, Gender::Female);

    let page = &story.pages[0];
    assert_eq!(page.title, "Beach");
    assert_eq!(page.timeline.len(), 3);
    assert!(matches!(&page.timeline[0], Beat::Narration { voice_id: Some(id), .. } if id == "EkK5I93UQWFDigLMpZcX"));
    assert!(matches!(&page.timeline[1], Beat::Character { name, .. } if name == "Alex"));
    assert_eq!(page.timeline[2], Beat::sfx("Seagulls calling"));
}

#[test]
fn defaults_title_when_missing() {
    let story = parse_generated_story(r#"{"pages": [{"timeline": []}]}"#)
        .unwrap()
        .story;
    assert_eq!(story.title, "Untitled Adventure");
    assert_eq!(story.pages[0].summary, "Scene 1");
}

#[test]
fn rejects_non_json() {
    let err = parse_generated_story("Once upon a time").unwrap_err();
    assert!(err.message().contains("non-JSON"));
}

#[test]
fn rejects_payload_without_pages_or_scenes() {
    let err = parse_generated_story(r#"{"title": "x"}"#).unwrap_err();
    assert!(err.message().contains("missing pages or scenes"));
}

#[test]
fn rejects_empty_and_duplicate_pages() {
    assert!(parse_generated_story(r#"{"pages": []}"#).is_err());
    let err = parse_generated_story(r#"{"pages": [{"page": 1}, {"page": 1}]}"#).unwrap_err();
    assert!(err.message().contains("repeats page number 1"));
}

#[test]
fn rejects_page_zero() {
    let err = parse_generated_story(
        r#"{"pages": [{"page": 0, "timeline": []}, {"page": 1, "timeline": []}]}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err.kind(),
        TaleweaverErrorKind::Provider(e) if matches!(e.kind, ProviderErrorKind::MalformedResponse(_))
    ));
    assert!(err.message().contains("start at 1"));

    let legacy = parse_generated_story(
        r#"{"scenes": [{"scene_number": "0", "title": "Dawn", "narration": {"text": "Up."}}]}"#,
    );
    assert!(legacy.is_err());
}

#[test]
fn warnings_are_keyed_by_page() {
    let parsed = parse_generated_story(
        r#"{"pages": [{"page": 3, "timeline": [{"type": "sfx", "description": "boom"}]}]}"#,
    )
    .unwrap();
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].0, 3);
    assert_eq!(parsed.warnings[0].1.kind, TimelineWarningKind::OrphanSfx);
}

#[test]
fn pages_are_sorted_by_number() {
    let story = parse_generated_story(r#"{"pages": [{"page": 2}, {"page": 1}]}"#)
        .unwrap()
        .story;
    let numbers: Vec<u32> = story.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2]);
}
