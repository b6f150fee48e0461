//! Parsing of generator output into a [`Story`].

use crate::{
    Beat, Character, Page, Story, StoryMetadata, TimelineWarning, normalize_timeline,
};
use serde_json::Value;
use std::collections::HashSet;
use taleweaver_error::{ProviderError, ProviderErrorKind, TaleweaverResult};

/// A parsed story plus normalizer warnings keyed by page number.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStory {
    /// The story
    pub story: Story,
    /// `(page_number, warning)` pairs in page order
    pub warnings: Vec<(u32, TimelineWarning)>,
}

fn malformed(message: impl Into<String>) -> ProviderError {
    ProviderError::new(ProviderErrorKind::MalformedResponse(message.into()))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn page_number(value: &Value, key: &str, index: usize) -> u32 {
    value
        .get(key)
        .and_then(|n| {
            n.as_u64()
                .or_else(|| n.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(index as u32 + 1)
}

/// Parse the JSON document returned by the story generator.
///
/// Accepts the current `pages[]` shape and the legacy `scenes[]` shape.
/// Fails with a malformed-response error when the content is not JSON,
/// carries neither array, has no pages, numbers a page 0, or repeats a
/// page number.
///
/// # Examples
///
/// ```
/// use taleweaver_core::parse_generated_story;
///
/// let parsed = parse_generated_story(r#"{
///     "title": "The Lantern",
///     "genre": "Fantasy",
///     "target_audience": "Kids",
///     "pages": [{"page": 1, "scene_title": "Dusk", "timeline": [
///         {"type": "narration", "text": "Night fell."}
///     ]}]
/// }"#).unwrap();
/// assert_eq!(parsed.story.logline, "Fantasy - Kids");
/// assert_eq!(parsed.story.pages[0].title, "Dusk");
///
/// assert!(parse_generated_story("not json").is_err());
/// ```
pub fn parse_generated_story(content: &str) -> TaleweaverResult<ParsedStory> {
    let parsed: Value = serde_json::from_str(content)
        .map_err(|_| malformed("Story generator returned non-JSON content."))?;

    let mut warnings = Vec::new();
    let pages = if let Some(raw_pages) = parsed.get("pages").and_then(Value::as_array) {
        parse_pages(raw_pages, &mut warnings)
    } else if let Some(raw_scenes) = parsed.get("scenes").and_then(Value::as_array) {
        parse_scenes(raw_scenes, &mut warnings)
    } else {
        return Err(malformed("Story payload missing pages or scenes array.").into());
    };

    if pages.is_empty() {
        return Err(malformed("Story payload contained no pages.").into());
    }
    let mut seen = HashSet::new();
    for page in &pages {
        if page.page_number == 0 {
            return Err(malformed("Story payload page numbers start at 1.").into());
        }
        if !seen.insert(page.page_number) {
            return Err(malformed(format!(
                "Story payload repeats page number {}.",
                page.page_number
            ))
            .into());
        }
    }

    let genre = str_field(&parsed, "genre").map(String::from);
    let target_audience = str_field(&parsed, "target_audience").map(String::from);
    let logline = match &genre {
        Some(genre) => format!(
            "{} - {}",
            genre,
            target_audience.as_deref().unwrap_or("General")
        ),
        None => "Untitled Story".to_string(),
    };
    let theme = str_field(&parsed, "theme")
        .map(String::from)
        .or_else(|| pages.first().map(|p| p.summary.clone()));
    let characters = parsed
        .get("characters")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(read_character).collect())
        .unwrap_or_default();

    let mut pages = pages;
    pages.sort_by_key(|p| p.page_number);

    Ok(ParsedStory {
        story: Story {
            title: str_field(&parsed, "title")
                .unwrap_or("Untitled Adventure")
                .to_string(),
            logline,
            characters,
            pages,
            metadata: Some(StoryMetadata {
                genre,
                target_audience,
                theme,
            }),
        },
        warnings,
    })
}

fn read_character(value: &Value) -> Option<Character> {
    match value {
        Value::String(descriptor) => Character::from_descriptor(descriptor).ok(),
        Value::Object(_) => serde_json::from_value::<Character>(value.clone())
            .ok()
            .filter(|c| !c.name.trim().is_empty()),
        _ => None,
    }
}

fn parse_pages(raw_pages: &[Value], warnings: &mut Vec<(u32, TimelineWarning)>) -> Vec<Page> {
    raw_pages
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let number = page_number(raw, "page", index);
            let entries = raw
                .get("timeline")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let normalized = normalize_timeline(&entries);
            warnings.extend(normalized.warnings.into_iter().map(|w| (number, w)));
            let title = str_field(raw, "scene_title")
                .or_else(|| str_field(raw, "title"))
                .map(String::from)
                .unwrap_or_else(|| format!("Scene {}", number));
            let image_prompt = str_field(raw, "image_prompt")
                .or_else(|| str_field(raw, "imagePrompt"))
                .map(String::from);
            Page::new(number, title, image_prompt, normalized.beats)
        })
        .collect()
}

fn parse_scenes(raw_scenes: &[Value], warnings: &mut Vec<(u32, TimelineWarning)>) -> Vec<Page> {
    raw_scenes
        .iter()
        .enumerate()
        .map(|(index, scene)| {
            let number = page_number(scene, "scene_number", index);
            let mut entries = Vec::new();
            if let Some(narration) = scene.get("narration").filter(|n| n.is_object()) {
                let mut entry = narration.clone();
                entry["type"] = Value::from("narration");
                entries.push(entry);
            }
            if let Some(characters) = scene.get("characters").and_then(Value::as_array) {
                for character in characters.iter().filter(|c| c.is_object()) {
                    let mut entry = character.clone();
                    entry["type"] = Value::from("character");
                    entries.push(entry);
                }
            }
            if let Some(effects) = scene.get("sfx").and_then(Value::as_array) {
                for effect in effects.iter().filter_map(Value::as_str) {
                    entries.push(serde_json::json!({"type": "sfx", "description": effect}));
                }
            }

            let normalized = normalize_timeline(&entries);
            warnings.extend(normalized.warnings.into_iter().map(|w| (number, w)));
            let title = str_field(scene, "title")
                .map(String::from)
                .unwrap_or_else(|| format!("Scene {}", number));
            let image_prompt = str_field(scene, "image_prompt").map(String::from);
            let beats: Vec<Beat> = normalized.beats;
            Page::new(number, title, image_prompt, beats)
        })
        .collect()
}
