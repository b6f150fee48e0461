//! Story pages.

use crate::{Beat, VoiceSettings, dialogue_text, timeline_to_markdown};
use serde::{Deserialize, Serialize};

/// One page of a generated story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number, unique within the story
    pub page_number: u32,
    /// Scene title
    pub title: String,
    /// Illustration prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// First narration line, or the title
    #[serde(default)]
    pub summary: String,
    /// Ordered audio timeline
    #[serde(default)]
    pub timeline: Vec<Beat>,
}

impl Page {
    /// Create a page, deriving the summary from the timeline.
    pub fn new(
        page_number: u32,
        title: impl Into<String>,
        image_prompt: Option<String>,
        timeline: Vec<Beat>,
    ) -> Self {
        let title = title.into();
        let summary = timeline
            .iter()
            .find_map(|beat| match beat {
                Beat::Narration { text, .. } if !text.trim().is_empty() => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| title.clone());
        Self {
            page_number,
            title,
            image_prompt: image_prompt.filter(|p| !p.trim().is_empty()),
            summary,
            timeline,
        }
    }

    /// Markdown rendering of the timeline.
    pub fn markdown(&self) -> String {
        timeline_to_markdown(&self.timeline)
    }

    /// Spoken text of the page as prose.
    pub fn dialogue_text(&self) -> String {
        dialogue_text(&self.timeline)
    }

    /// All narration lines joined with spaces.
    pub fn narration_text(&self) -> String {
        self.timeline
            .iter()
            .filter_map(|beat| match beat {
                Beat::Narration { text, .. } if !text.trim().is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Settings carried by the first narration beat, if any.
    pub fn narration_settings(&self) -> Option<VoiceSettings> {
        self.timeline.iter().find_map(|beat| match beat {
            Beat::Narration { voice_settings, .. } => Some(*voice_settings),
            _ => None,
        })?
    }
}
