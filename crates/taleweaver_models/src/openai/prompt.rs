//! System prompt for story generation.
//!
//! The voice table and emotion table are rendered from the voice catalog
//! and [`EmotionPreset`], so the generator suggests ids the resolver knows.

use std::fmt::Write;
use strum::IntoEnumIterator;
use taleweaver_core::{Character, StoryOptions};
use taleweaver_voice::{EmotionPreset, GenderVoices, VoiceCatalog};

const DEFAULT_STORY_LENGTH: u32 = 4;

fn structure_guide(length: u32) -> &'static str {
    match length {
        0..=2 => {
            "Two-page story: (1) setup and conflict, introducing the characters and the single \
             challenge; (2) resolution, showing the outcome and what the characters learned."
        }
        3..=4 => {
            "Short story: (1) setup; (2) rising action through character interaction; \
             (3) climax, the decisive moment; (4) resolution and growth. Every page moves \
             the story forward significantly."
        }
        5..=6 => {
            "Medium story: (1) setup; (2) rising action; (3) more rising action through \
             character interaction; (4) climax; (5) falling action and consequences; \
             (6) resolution, with a brief epilogue if there is room."
        }
        _ => {
            "Long story: (1) setup; (2) inciting incident; (3) rising action; (4) further \
             complications; (5) midpoint twist or revelation; (6) crisis; (7) climax; \
             (8) falling action; (9+) resolution and epilogue. Allow for character arcs \
             and more than one plot thread."
        }
    }
}

fn describe_character(character: &Character) -> String {
    let traits = if character.traits.is_empty() {
        "no listed traits".to_string()
    } else {
        character.traits.join(", ")
    };
    let mut line = format!("{} ({}) - {}", character.name, character.gender, traits);
    if let Some(role) = character.role.as_deref() {
        let _ = write!(line, "; role: {}", role);
    }
    if let Some(description) = character.description.as_deref() {
        let _ = write!(line, "; {}", description);
    }
    line
}

fn voice_line(catalog: &VoiceCatalog, role: &str, id: &Option<String>) -> Option<String> {
    let id = id.as_deref()?;
    let label = catalog
        .voice(id)
        .map(|v| {
            if v.description.is_empty() {
                format!(" ({})", v.name)
            } else {
                format!(" ({} - {})", v.name, v.description)
            }
        })
        .unwrap_or_default();
    Some(format!("  * {}: \"{}\"{}", role, id, label))
}

fn gender_table(catalog: &VoiceCatalog, heading: &str, voices: &GenderVoices) -> String {
    let lines: Vec<String> = [
        ("Young hero", voices.young_hero()),
        ("Hero", voices.hero()),
        ("Villain", voices.villain()),
        ("Mentor", voices.mentor()),
        ("Sidekick", voices.sidekick()),
        ("Mystical", voices.mystical()),
        ("Neutral", voices.neutral()),
    ]
    .into_iter()
    .filter_map(|(role, id)| voice_line(catalog, role, id))
    .collect();

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}:\n{}\n", heading, lines.join("\n"))
    }
}

fn emotion_table() -> String {
    let mut table = String::from(
        "| emotion | stability | similarity_boost | style | speed |\n|---|---|---|---|---|\n",
    );
    for preset in EmotionPreset::iter() {
        let s = preset.settings();
        let _ = writeln!(
            table,
            "| {} | {} | {} | {} | {} |",
            preset, s.stability, s.similarity_boost, s.style, s.speed
        );
    }
    table
}

/// Render the system prompt for `options`.
pub fn system_prompt(options: &StoryOptions, catalog: &VoiceCatalog) -> String {
    let length = match *options.story_length() {
        0 => DEFAULT_STORY_LENGTH,
        n => n,
    };
    let narrator_id = options
        .narration_voice_id()
        .as_deref()
        .unwrap_or(catalog.default_narrator().as_str());

    let main_character = options
        .main_character()
        .as_ref()
        .map(describe_character)
        .unwrap_or_else(|| "Alex (male) - brave, curious".to_string());
    let supporting = if options.supporting_characters().is_empty() {
        "- Sam (female) - loyal, inventive".to_string()
    } else {
        options
            .supporting_characters()
            .iter()
            .map(|c| format!("- {}", describe_character(c)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let characters = catalog.characters();
    let voice_table = [
        gender_table(catalog, "Male characters", characters.male()),
        gender_table(catalog, "Female characters", characters.female()),
        gender_table(catalog, "Non-binary or mystical characters", characters.non_binary()),
    ]
    .concat();

    format!(
        r#"## ROLE
You write cinematic, dialogue-driven stories for illustrated, narrated storybooks.
The story should play like a radio drama: character interaction carries the plot,
and narration appears only for scene transitions, atmosphere, or feelings that
dialogue cannot convey. Respond with one strictly valid JSON object and nothing else.

## CHARACTERS
Main character: {main_character}
Supporting characters:
{supporting}
Pick character voices that match each character's gender.

## STRUCTURE
Write exactly {length} pages, no more and no fewer.
{structure}

## PAGES
Every page has a scene_title, an image_prompt describing the look and mood of the
scene for the illustrator, and a timeline of 5 to 8 entries: 3 or 4 lines of
dialogue, 1 or 2 short narration beats, and at most 2 sound effects. Dialogue
should make up 70-80% of the timeline.

## TIMELINE ENTRIES
narration:
- type: "narration"
- voice_id: "{narrator_id}" on every narration entry of the story
- voice_settings: the "narrative" preset unless the mood calls for another
- text: one or two atmospheric sentences

character:
- type: "character"
- name: the speaking character
- emotion: one of the presets below
- voice_id: chosen by gender and role from this table
{voice_table}- voice_settings: the values of the chosen emotion preset
- text: only the spoken words, no stage directions

sfx:
- type: "sfx"
- description: a specific description of the sound, used to generate it
- placeholder: an onomatopoeia such as "CRACK!" or "WHOOSH!"
A sound effect must always come right after a narration entry that sets it up.
Never open a page or follow dialogue with a sound effect.
Short sounds (clicks, knocks, taps) last 1-2s; impacts (crashes, slams, splashes)
2-3s; movement (footsteps, rustling, creaking doors) about 3s; vocal sounds
(laughs, gasps, whispers) 2-3s; weather, engines and ambience about 4s.

## EMOTION PRESETS
{emotions}
Narration normally uses "narrative". Characters use the preset matching the
emotional context of their line.

## CONSISTENCY
- Decide a voice_id for every character before writing and use the same one on every page.
- Use narrator voice_id "{narrator_id}" throughout.
- Match voice gender to character gender.

## EXAMPLE
{{
  "title": "The Awakening",
  "genre": "Fantasy Adventure",
  "target_audience": "General",
  "pages": [
    {{
      "page": 1,
      "scene_title": "The Awakening",
      "timeline": [
        {{"type": "narration", "voice_id": "{narrator_id}", "voice_settings": {{"stability": 0.9, "similarity_boost": 0.9, "style": 0.15, "speed": 1.0}}, "text": "The night was silent, except for the wind whispering through the ruins."}},
        {{"type": "character", "name": "Taeil", "emotion": "curious", "voice_id": "ZF6FPAbjXT4488VcRRnw", "voice_settings": {{"stability": 0.6, "similarity_boost": 0.7, "style": 0.7, "speed": 1.05}}, "text": "Strange... this place feels alive."}},
        {{"type": "narration", "voice_id": "{narrator_id}", "voice_settings": {{"stability": 0.9, "similarity_boost": 0.9, "style": 0.15, "speed": 1.0}}, "text": "Then the ground split open beneath her feet!"}},
        {{"type": "sfx", "description": "Stone cracking as a giant awakens beneath the ruins", "placeholder": "CRACK!"}}
      ],
      "image_prompt": "A girl facing a massive stone guardian rising from the ruins in a storm of dust and glowing light."
    }}
  ]
}}
"#,
        structure = structure_guide(length),
        emotions = emotion_table(),
    )
}

/// The user message: the options as camelCase JSON.
pub fn user_payload(options: &StoryOptions) -> serde_json::Result<String> {
    serde_json::to_string(options)
}
