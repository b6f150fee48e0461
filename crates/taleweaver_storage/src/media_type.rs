//! Asset media types.

/// Kind of stored asset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum MediaType {
    /// Page illustrations
    #[display("image")]
    Image,
    /// Narration and page audio
    #[display("audio")]
    Audio,
}

impl MediaType {
    /// Top-level public directory for this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            MediaType::Image => "images",
            MediaType::Audio => "audio",
        }
    }

    /// Default file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Image => "png",
            MediaType::Audio => "mp3",
        }
    }

    /// Media type served from `directory`.
    pub fn from_directory(directory: &str) -> Option<Self> {
        match directory {
            "images" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }
}

/// MIME type for a file name, by extension.
///
/// # Examples
///
/// ```
/// use taleweaver_storage::content_type_for;
///
/// assert_eq!(content_type_for("page-1.mp3"), "audio/mpeg");
/// assert_eq!(content_type_for("page-1.PNG"), "image/png");
/// assert_eq!(content_type_for("notes"), "application/octet-stream");
/// ```
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
