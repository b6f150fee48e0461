//! Narrator selection for a story build.

use taleweaver_core::{VoiceProfile, VoiceSettings};
use taleweaver_error::{ProviderError, ProviderErrorKind, TaleweaverResult};
use taleweaver_interface::{SpeechSynthesizer, VoiceSample};
use taleweaver_voice::{VoiceCategory, VoiceResolver};
use tracing::{debug, info, instrument};

/// Settings for a narrator cloned from the user's own recording.
pub const USER_VOICE_SETTINGS: VoiceSettings = VoiceSettings::new(0.55, 0.85, 0.2, 1.0);

/// Name cloned user voices are registered under.
pub const USER_VOICE_NAME: &str = "User Narrator";

/// How the client asked for the narrator to be chosen.
///
/// Resolution order:
/// 1. an alias with no explicit id, when it names a known voice
/// 2. an explicit id or alias
/// 3. a clone of the user's sample, when requested and provided
/// 4. the voice matched to the narration tone
///
/// The first two are skipped when the user voice is requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarratorChoice {
    /// Explicit voice id or alias
    pub voice_id: Option<String>,
    /// Voice alias, e.g. "Hope - Soothing Narrator"
    pub voice_alias: Option<String>,
    /// Recording to clone
    pub sample: Option<VoiceSample>,
    /// Narrate with the cloned sample
    pub use_user_voice: bool,
    /// Narration tone label
    pub tone: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl NarratorChoice {
    /// Narrator from the id, alias or tone, without cloning.
    pub fn preview(&self, resolver: &VoiceResolver) -> VoiceProfile {
        if !self.use_user_voice {
            if let (Some(alias), None) = (non_blank(&self.voice_alias), non_blank(&self.voice_id)) {
                if let Some(id) = resolver.lookup_alias(alias, VoiceCategory::Narrator) {
                    return resolver.explicit_narrator(&id);
                }
                debug!(alias, "Narrator alias not found");
            }
            if let Some(id) = non_blank(&self.voice_id) {
                return resolver.explicit_narrator(id);
            }
        }
        resolver.narrator_for_tone(self.tone.as_deref())
    }

    /// Narrator id to suggest to the story generator.
    ///
    /// A pending clone cannot be known yet, so it suggests the tone voice.
    pub fn suggested_id(&self, resolver: &VoiceResolver) -> String {
        self.preview(resolver).voice_id
    }

    /// Resolve the narrator, cloning the user's sample if asked to.
    ///
    /// # Errors
    ///
    /// Returns the provider error when cloning fails, or a malformed
    /// response error when the provider returns no voice id.
    #[instrument(skip(self, resolver, speech), fields(use_user_voice = self.use_user_voice))]
    pub async fn resolve(
        &self,
        resolver: &VoiceResolver,
        speech: &dyn SpeechSynthesizer,
    ) -> TaleweaverResult<VoiceProfile> {
        if self.use_user_voice {
            if let Some(sample) = &self.sample {
                let voice_id = speech.clone_voice(sample).await?;
                if voice_id.trim().is_empty() {
                    return Err(ProviderError::new(ProviderErrorKind::MalformedResponse(
                        "Voice cloning returned no voice id".to_string(),
                    ))
                    .into());
                }
                info!(voice_id = %voice_id, "Cloned user narrator voice");
                return Ok(VoiceProfile::new(voice_id, USER_VOICE_SETTINGS));
            }
            debug!("User voice requested without a sample");
        }
        let profile = self.preview(resolver);
        debug!(voice_id = %profile.voice_id, "Resolved narrator");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_wins_when_no_id() {
        let resolver = VoiceResolver::builtin().unwrap();
        let choice = NarratorChoice {
            voice_alias: Some("Hope - Soothing Narrator".to_string()),
            ..Default::default()
        };
        assert_eq!(choice.suggested_id(&resolver), "iCrDUkL56s3C8sCRl7wb");
    }

    #[test]
    fn test_user_voice_ignores_explicit_id() {
        let resolver = VoiceResolver::builtin().unwrap();
        let choice = NarratorChoice {
            voice_id: Some("AbCdEfGhIjKlMn".to_string()),
            use_user_voice: true,
            ..Default::default()
        };
        assert_eq!(
            choice.suggested_id(&resolver),
            resolver.narrator_for_tone(None).voice_id
        );
    }
}
