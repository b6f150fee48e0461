//! Timeline beats.

use crate::VoiceSettings;
use serde::{Deserialize, Serialize};

/// One ordered unit of a page's audio timeline.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Beat;
///
/// let beat: Beat = serde_json::from_value(serde_json::json!({
///     "type": "character",
///     "name": "Alex",
///     "text": "Look!",
///     "voice_id": "TX3LPaxmHKxFdv7VOQHJ"
/// })).unwrap();
/// assert_eq!(beat.spoken_text(), Some("Look!"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Beat {
    /// Narrator line
    #[serde(rename_all = "camelCase")]
    Narration {
        /// Spoken text
        text: String,
        /// Voice id or alias suggested by the generator
        #[serde(default, alias = "voice_id", skip_serializing_if = "Option::is_none")]
        voice_id: Option<String>,
        /// Settings suggested by the generator
        #[serde(default, alias = "voice_settings", skip_serializing_if = "Option::is_none")]
        voice_settings: Option<VoiceSettings>,
    },
    /// Line of dialogue
    #[serde(rename_all = "camelCase")]
    Character {
        /// Speaker name
        name: String,
        /// Spoken text
        text: String,
        /// Emotion preset name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emotion: Option<String>,
        /// Speaker traits carried on the beat
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        traits: Vec<String>,
        /// Voice id or alias suggested by the generator
        #[serde(default, alias = "voice_id", skip_serializing_if = "Option::is_none")]
        voice_id: Option<String>,
        /// Settings suggested by the generator
        #[serde(default, alias = "voice_settings", skip_serializing_if = "Option::is_none")]
        voice_settings: Option<VoiceSettings>,
    },
    /// Sound effect
    #[serde(rename_all = "camelCase")]
    Sfx {
        /// Prompt for the sound generator
        description: String,
        /// Onomatopoeia shown in the text, e.g. `CRACK!`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
}

impl Beat {
    /// Create a narration beat without voice hints.
    pub fn narration(text: impl Into<String>) -> Self {
        Beat::Narration {
            text: text.into(),
            voice_id: None,
            voice_settings: None,
        }
    }

    /// Create a dialogue beat without voice hints.
    pub fn character(name: impl Into<String>, text: impl Into<String>) -> Self {
        Beat::Character {
            name: name.into(),
            text: text.into(),
            emotion: None,
            traits: Vec::new(),
            voice_id: None,
            voice_settings: None,
        }
    }

    /// Create a sound effect beat.
    pub fn sfx(description: impl Into<String>) -> Self {
        Beat::Sfx {
            description: description.into(),
            placeholder: None,
        }
    }

    /// Text that will be synthesized as speech, if this beat is spoken.
    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            Beat::Narration { text, .. } | Beat::Character { text, .. } => Some(text),
            Beat::Sfx { .. } => None,
        }
    }

    /// Whether this beat is narration or dialogue.
    pub fn is_spoken(&self) -> bool {
        self.spoken_text().is_some()
    }

    /// Wire name of the beat type.
    pub fn kind(&self) -> &'static str {
        match self {
            Beat::Narration { .. } => "narration",
            Beat::Character { .. } => "character",
            Beat::Sfx { .. } => "sfx",
        }
    }
}
