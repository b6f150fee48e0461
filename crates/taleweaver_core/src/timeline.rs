//! Timeline normalization and text rendering.
//!
//! Generated timelines arrive as loosely shaped JSON. [`normalize_timeline`]
//! turns every entry into a [`Beat`], accepting the spelling variants the
//! generator is known to produce, and reports anything suspicious as a
//! [`TimelineWarning`] instead of discarding it.

use crate::{Beat, VoiceSettings, parse_traits};
use serde::Deserialize;
use serde_json::Value;

/// What the normalizer noticed about an entry.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TimelineWarningKind {
    /// Sound effect with no spoken beat before it
    #[display("sound effect has no preceding narration or dialogue")]
    OrphanSfx,
    /// Unrecognised `type`, read as narration
    #[display("unknown entry type '{}' treated as narration", _0)]
    UnknownType(String),
    /// Spoken entry with no text
    #[display("spoken entry has no text")]
    MissingText,
    /// Entry was neither an object nor a string
    #[display("entry could not be read")]
    Unreadable,
}

/// A warning attached to a timeline position.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("entry {}: {}", index, kind)]
pub struct TimelineWarning {
    /// Index of the entry in the raw timeline
    pub index: usize,
    /// What was noticed
    pub kind: TimelineWarningKind,
}

/// Normalized beats plus the warnings raised while reading them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTimeline {
    /// Beats in timeline order
    pub beats: Vec<Beat>,
    /// Warnings in timeline order
    pub warnings: Vec<TimelineWarning>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    name: Option<String>,
    emotion: Option<String>,
    traits: Option<Value>,
    #[serde(rename = "voiceId", alias = "voice_id")]
    voice_id: Option<String>,
    voice: Option<String>,
    #[serde(rename = "voiceSettings", alias = "voice_settings")]
    voice_settings: Option<Value>,
    description: Option<String>,
    placeholder: Option<String>,
}

fn read_traits(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| match t {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(raw)) => parse_traits(raw),
        _ => Vec::new(),
    }
}

fn normalize_entry(index: usize, entry: &Value, warnings: &mut Vec<TimelineWarning>) -> Option<Beat> {
    let raw: RawEntry = match entry {
        Value::String(text) => RawEntry {
            text: Some(text.clone()),
            ..RawEntry::default()
        },
        Value::Object(_) => match serde_json::from_value(entry.clone()) {
            Ok(raw) => raw,
            Err(_) => {
                warnings.push(TimelineWarning {
                    index,
                    kind: TimelineWarningKind::Unreadable,
                });
                return None;
            }
        },
        _ => {
            warnings.push(TimelineWarning {
                index,
                kind: TimelineWarningKind::Unreadable,
            });
            return None;
        }
    };

    let kind = raw
        .kind
        .as_deref()
        .map(|k| k.trim().to_lowercase())
        .unwrap_or_else(|| "narration".to_string());
    let voice_id = raw.voice_id.or(raw.voice).filter(|v| !v.trim().is_empty());
    let voice_settings = raw
        .voice_settings
        .and_then(|v| serde_json::from_value::<VoiceSettings>(v).ok());

    let beat = match kind.as_str() {
        "sfx" | "sound_effect" | "sound-effect" => Beat::Sfx {
            description: raw
                .description
                .filter(|d| !d.trim().is_empty())
                .or(raw.text.filter(|t| !t.trim().is_empty()))
                .unwrap_or_else(|| "Ambient sound".to_string()),
            placeholder: raw.placeholder.filter(|p| !p.trim().is_empty()),
        },
        "character" | "dialogue" => {
            let text = raw.text.unwrap_or_default();
            if text.trim().is_empty() {
                warnings.push(TimelineWarning {
                    index,
                    kind: TimelineWarningKind::MissingText,
                });
            }
            Beat::Character {
                name: raw.name.unwrap_or_default(),
                text,
                emotion: raw.emotion,
                traits: read_traits(raw.traits.as_ref()),
                voice_id,
                voice_settings,
            }
        }
        other => {
            if !matches!(other, "narration" | "narrator") {
                warnings.push(TimelineWarning {
                    index,
                    kind: TimelineWarningKind::UnknownType(other.to_string()),
                });
            }
            let text = raw.text.unwrap_or_default();
            if text.trim().is_empty() {
                warnings.push(TimelineWarning {
                    index,
                    kind: TimelineWarningKind::MissingText,
                });
            }
            Beat::Narration {
                text,
                voice_id,
                voice_settings,
            }
        }
    };

    Some(beat)
}

/// Normalize raw generator output into beats.
///
/// `narrator` is read as `narration` and `sound_effect` as `sfx`; an entry
/// without a type is narration. Sound effects that come before any spoken
/// beat are kept and flagged.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{Beat, TimelineWarningKind, normalize_timeline};
/// use serde_json::json;
///
/// let normalized = normalize_timeline(&[
///     json!({"type": "sound_effect", "placeholder": "BOOM!"}),
///     json!({"type": "narrator", "text": "The door burst open."}),
/// ]);
/// assert_eq!(normalized.beats.len(), 2);
/// assert!(matches!(&normalized.beats[0], Beat::Sfx { description, .. } if description == "Ambient sound"));
/// assert_eq!(normalized.warnings[0].kind, TimelineWarningKind::OrphanSfx);
/// ```
pub fn normalize_timeline(entries: &[Value]) -> NormalizedTimeline {
    let mut normalized = NormalizedTimeline::default();
    let mut spoken_seen = false;

    for (index, entry) in entries.iter().enumerate() {
        let Some(beat) = normalize_entry(index, entry, &mut normalized.warnings) else {
            continue;
        };
        match &beat {
            Beat::Sfx { .. } if !spoken_seen => normalized.warnings.push(TimelineWarning {
                index,
                kind: TimelineWarningKind::OrphanSfx,
            }),
            Beat::Sfx { .. } => {}
            _ => spoken_seen = true,
        }
        normalized.beats.push(beat);
    }

    normalized
}

fn beat_markdown(beat: &Beat) -> Option<String> {
    match beat {
        Beat::Narration { text, .. } => Some(text.clone()).filter(|t| !t.is_empty()),
        Beat::Character { name, text, .. } => {
            if text.is_empty() {
                return None;
            }
            let label = if name.trim().is_empty() {
                "Character"
            } else {
                name.as_str()
            };
            Some(format!("**{}:** {}", label, text))
        }
        Beat::Sfx {
            description,
            placeholder: Some(placeholder),
        } => {
            let description = if description.is_empty() {
                "sound effect"
            } else {
                description.as_str()
            };
            Some(format!("**{}** ({})", placeholder, description))
        }
        Beat::Sfx { description, .. } => Some(format!("*Sound effect:* {}", description)),
    }
}

/// Render a timeline as markdown, one paragraph per beat.
///
/// Spoken text is reproduced verbatim.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{Beat, timeline_to_markdown};
///
/// let md = timeline_to_markdown(&[
///     Beat::narration("It was late."),
///     Beat::character("Sam", "Who's there?"),
///     Beat::sfx("A door creaks"),
/// ]);
/// assert_eq!(md, "It was late.\n\n**Sam:** Who's there?\n\n*Sound effect:* A door creaks");
/// ```
pub fn timeline_to_markdown(beats: &[Beat]) -> String {
    beats
        .iter()
        .filter_map(beat_markdown)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the spoken beats as a single line of prose.
///
/// Dialogue becomes `"{name} says {text}"`; sound effects are skipped.
pub fn dialogue_text(beats: &[Beat]) -> String {
    beats
        .iter()
        .filter_map(|beat| match beat {
            Beat::Narration { text, .. } if !text.is_empty() => Some(text.clone()),
            Beat::Character { name, text, .. } if !text.is_empty() => {
                let name = if name.trim().is_empty() {
                    "Character"
                } else {
                    name.as_str()
                };
                Some(format!("{} says {}", name, text))
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
