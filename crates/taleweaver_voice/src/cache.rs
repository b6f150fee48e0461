//! Per-build character voice memo.

use crate::{EmotionPreset, VoiceResolver};
use std::collections::HashMap;
use taleweaver_core::{Beat, Character, Story, VoiceProfile};

/// Character voices for one story build, keyed by lower-cased name.
///
/// Filled once from the story before any page work starts and read-only
/// afterwards, so every page sees the same voice for the same character.
#[derive(Debug, Clone, Default)]
pub struct VoiceCache {
    profiles: HashMap<String, VoiceProfile>,
    fallback: Option<VoiceProfile>,
}

impl VoiceCache {
    /// Resolve a voice for every character in the story.
    ///
    /// The first voice id the generator suggested for a speaker wins;
    /// otherwise the role × gender table decides. Speakers that appear only
    /// in timelines are resolved as non-binary characters with their beat
    /// traits.
    #[tracing::instrument(skip_all, fields(title = %story.title, characters = story.characters.len()))]
    pub fn for_story(story: &Story, resolver: &VoiceResolver) -> Self {
        let mut suggested: HashMap<String, &str> = HashMap::new();
        let mut speakers: Vec<Character> = story.characters.clone();
        for beat in story.pages.iter().flat_map(|p| p.timeline.iter()) {
            if let Beat::Character {
                name,
                voice_id,
                traits,
                ..
            } = beat
            {
                let key = name.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                if let Some(id) = voice_id.as_deref().filter(|v| !v.trim().is_empty()) {
                    suggested.entry(key.clone()).or_insert(id);
                }
                if !speakers.iter().any(|c| c.cache_key() == key) {
                    let mut speaker = Character::new(name.trim(), Default::default());
                    speaker.traits = traits.clone();
                    speakers.push(speaker);
                }
            }
        }

        let mut profiles = HashMap::new();
        for character in &speakers {
            let key = character.cache_key();
            if key.is_empty() || profiles.contains_key(&key) {
                continue;
            }
            let profile = resolver.character_profile(character, suggested.get(&key).copied());
            tracing::debug!(character = %character.name, voice_id = %profile.voice_id, "Cached character voice");
            profiles.insert(key, profile);
        }

        Self {
            profiles,
            fallback: Some(VoiceProfile::new(
                resolver.default_id(crate::VoiceCategory::Character),
                VoiceResolver::character_settings(),
            )),
        }
    }

    /// Cached profile for a character name.
    pub fn get(&self, name: &str) -> Option<&VoiceProfile> {
        self.profiles.get(&name.trim().to_lowercase())
    }

    /// Number of cached characters.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Voice and settings to speak `beat` with. `None` for sound effects.
    ///
    /// Narration always uses the narrator's voice; its own settings win over
    /// the narrator's. Dialogue uses the cached character voice with the
    /// beat's settings, then its emotion preset, then the cached settings.
    pub fn profile_for_beat(&self, beat: &Beat, narrator: &VoiceProfile) -> Option<VoiceProfile> {
        match beat {
            Beat::Narration { voice_settings, .. } => Some(VoiceProfile::new(
                narrator.voice_id.clone(),
                voice_settings.unwrap_or(narrator.voice_settings),
            )),
            Beat::Character {
                name,
                emotion,
                voice_settings,
                ..
            } => {
                let cached = self
                    .get(name)
                    .or(self.fallback.as_ref())
                    .cloned()
                    .unwrap_or_else(|| {
                        VoiceProfile::new(narrator.voice_id.clone(), VoiceResolver::character_settings())
                    });
                let settings = voice_settings
                    .or_else(|| {
                        emotion
                            .as_deref()
                            .and_then(EmotionPreset::from_label)
                            .map(|p| p.settings())
                    })
                    .unwrap_or(cached.voice_settings);
                Some(VoiceProfile::new(cached.voice_id, settings))
            }
            Beat::Sfx { .. } => None,
        }
    }
}
