use strum::IntoEnumIterator;
use taleweaver_core::{Beat, Character, Gender, Page, Story, VoiceProfile, VoiceSettings};
use taleweaver_voice::{EmotionPreset, VoiceCache, VoiceResolver, sfx_duration_hint};

fn story() -> Story {
    let mut line = Beat::character("Sam", "Wait for me!");
    if let Beat::Character { voice_id, .. } = &mut line {
        *voice_id = Some("sidekick_01".to_string());
    }
    Story {
        title: "The Lighthouse".into(),
        logline: "Adventure - Kids".into(),
        characters: vec![
            Character::new("Alex", Gender::Male),
            Character::new("Sam", Gender::Female),
        ],
        pages: vec![
            Page::new(
                1,
                "Shore",
                None,
                vec![Beat::narration("The sea was loud."), Beat::character("Alex", "Look!"), line],
            ),
            Page::new(
                2,
                "Tower",
                None,
                vec![
                    Beat::character("alex", "Up we go."),
                    Beat::character("Gull", "Squawk!"),
                    Beat::sfx("Waves crash"),
                ],
            ),
        ],
        metadata: None,
    }
}

fn narrator() -> VoiceProfile {
    VoiceProfile::new("narratorVoiceId01", VoiceSettings::narration_fallback())
}

#[test]
fn same_character_gets_same_voice_on_every_page() {
    let story = story();
    let cache = VoiceCache::for_story(&story, &VoiceResolver::builtin().unwrap());
    let first = cache.profile_for_beat(&story.pages[0].timeline[1], &narrator()).unwrap();
    let second = cache.profile_for_beat(&story.pages[1].timeline[0], &narrator()).unwrap();
    assert_eq!(first.voice_id, second.voice_id);
}

#[test]
fn cache_includes_timeline_only_speakers() {
    let cache = VoiceCache::for_story(&story(), &VoiceResolver::builtin().unwrap());
    assert_eq!(cache.len(), 3);
    assert!(cache.get("GULL").is_some());
}

#[test]
fn generator_suggested_voice_is_used() {
    let cache = VoiceCache::for_story(&story(), &VoiceResolver::builtin().unwrap());
    assert_eq!(cache.get("sam").unwrap().voice_id, "Crm8VULvkVs5ZBDa1Ixm");
}

#[test]
fn narration_always_uses_narrator_voice() {
    let cache = VoiceCache::default();
    let mut beat = Beat::narration("Once.");
    if let Beat::Narration { voice_id, voice_settings, .. } = &mut beat {
        *voice_id = Some("someOtherVoice01".into());
        *voice_settings = Some(VoiceSettings::new(0.1, 0.2, 0.3, 1.0));
    }
    let profile = cache.profile_for_beat(&beat, &narrator()).unwrap();
    assert_eq!(profile.voice_id, "narratorVoiceId01");
    assert_eq!(profile.voice_settings.stability, 0.1);
}

#[test]
fn emotion_preset_applies_to_dialogue() {
    let cache = VoiceCache::for_story(&story(), &VoiceResolver::builtin().unwrap());
    let mut beat = Beat::character("Alex", "No!");
    if let Beat::Character { emotion, .. } = &mut beat {
        *emotion = Some("scared".into());
    }
    let profile = cache.profile_for_beat(&beat, &narrator()).unwrap();
    assert_eq!(profile.voice_settings, EmotionPreset::Fear.settings());
}

#[test]
fn sfx_has_no_voice() {
    assert!(VoiceCache::default().profile_for_beat(&Beat::sfx("Boom"), &narrator()).is_none());
}

#[test]
fn presets_stay_in_provider_range() {
    for preset in EmotionPreset::iter() {
        let s = preset.settings();
        for v in [s.stability, s.similarity_boost, s.style] {
            assert!((0.0..=1.0).contains(&v), "{preset} out of range");
        }
        assert!((0.7..=1.2).contains(&s.speed));
    }
}

#[test]
fn sfx_hints_by_keyword() {
    assert_eq!(sfx_duration_hint("Footsteps on gravel"), Some(3.0));
    assert_eq!(sfx_duration_hint("Children giggle"), Some(2.5));
    assert_eq!(sfx_duration_hint("A strange noise"), None);
}
