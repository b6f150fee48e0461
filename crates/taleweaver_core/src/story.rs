//! Generated stories.

use crate::{Beat, Character, Gender, Page};
use serde::{Deserialize, Serialize};

/// Descriptive metadata returned by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    /// Genre label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Intended audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    /// Theme, defaulting to the first page summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// A complete generated story. Immutable once the build starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story title
    pub title: String,
    /// One line pitch
    pub logline: String,
    /// Cast list
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Pages in page-number order
    pub pages: Vec<Page>,
    /// Generator metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StoryMetadata>,
}

/// Title, logline and cast, as reported by status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    /// Story title
    pub title: String,
    /// One line pitch
    pub logline: String,
    /// Cast list
    pub characters: Vec<Character>,
}

impl Story {
    /// Look up a page by its number.
    pub fn page(&self, page_number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Spoken text of every page, one paragraph per page.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(Page::dialogue_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Title, logline and cast.
    pub fn summary(&self) -> StorySummary {
        StorySummary {
            title: self.title.clone(),
            logline: self.logline.clone(),
            characters: self.characters.clone(),
        }
    }

    /// Merge a requested cast into the story.
    ///
    /// Requested characters come first (they carry gender and traits), then
    /// any timeline speaker not already named, in order of first appearance.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_core::{Beat, Character, Gender, Page, Story};
    ///
    /// let story = Story {
    ///     title: "t".into(),
    ///     logline: "l".into(),
    ///     characters: vec![],
    ///     pages: vec![Page::new(1, "One", None, vec![
    ///         Beat::character("alex", "Hi"),
    ///         Beat::character("Owl", "Hoo"),
    ///     ])],
    ///     metadata: None,
    /// }
    /// .with_cast(vec![Character::new("Alex", Gender::Male)]);
    ///
    /// let names: Vec<_> = story.characters.iter().map(|c| c.name.as_str()).collect();
    /// assert_eq!(names, vec!["Alex", "Owl"]);
    /// ```
    pub fn with_cast(mut self, cast: Vec<Character>) -> Self {
        let mut characters: Vec<Character> = Vec::new();
        for character in cast.into_iter().chain(std::mem::take(&mut self.characters)) {
            if !characters
                .iter()
                .any(|c| c.cache_key() == character.cache_key())
            {
                characters.push(character);
            }
        }

        for page in &self.pages {
            for beat in &page.timeline {
                if let Beat::Character { name, traits, .. } = beat {
                    let key = name.trim().to_lowercase();
                    if key.is_empty() || characters.iter().any(|c| c.cache_key() == key) {
                        continue;
                    }
                    let mut speaker = Character::new(name.trim(), Gender::NonBinary);
                    speaker.traits = traits.clone();
                    characters.push(speaker);
                }
            }
        }

        self.characters = characters;
        self
    }
}
