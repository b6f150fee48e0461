//! Sound effect duration hints.

/// Suggested clip length for a sound effect description, in seconds.
///
/// Short impacts get short clips and ambience gets longer ones. Returns
/// `None` when nothing matches so the provider chooses.
///
/// # Examples
///
/// ```
/// use taleweaver_voice::sfx_duration_hint;
///
/// assert_eq!(sfx_duration_hint("A door slams"), Some(1.5));
/// assert_eq!(sfx_duration_hint("Rain on the roof"), Some(4.0));
/// assert_eq!(sfx_duration_hint("Something"), None);
/// ```
pub fn sfx_duration_hint(description: &str) -> Option<f64> {
    const HINTS: &[(&[&str], f64)] = &[
        (&["slam", "knock", "click", "pop", "snap", "bang", "thud", "crack"], 1.5),
        (&["crash", "explosion", "roar", "splash", "whoosh", "zap"], 2.5),
        (&["footstep", "gallop", "running", "flapping", "rustl", "creak"], 3.0),
        (&["laugh", "giggle", "gasp", "sigh", "cheer", "scream"], 2.5),
        (&["rain", "wind", "thunder", "wave", "river", "bird", "forest"], 4.0),
        (&["ambient", "ambience", "background", "crowd", "hum", "music"], 4.0),
    ];

    let lowered = description.to_lowercase();
    HINTS
        .iter()
        .find(|(words, _)| words.iter().any(|w| lowered.contains(w)))
        .map(|(_, seconds)| *seconds)
}
