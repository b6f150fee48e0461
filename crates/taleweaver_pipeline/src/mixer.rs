//! MP3 concatenation mixer.

use async_trait::async_trait;
use taleweaver_error::{PipelineError, PipelineErrorKind, TaleweaverResult};
use taleweaver_interface::{AudioClip, AudioMixer, AudioSegment};
use tracing::{debug, instrument};

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_TAG_LEN: usize = 128;

/// Joins MP3 segments frame-to-frame.
///
/// MP3 frames are self-contained, so a page track is the segments laid end
/// to end. Metadata tags are kept only where players expect them: the
/// leading ID3v2 tag of the first segment. Inner ID3v2 headers and trailing
/// ID3v1 tags are stripped so decoders do not stop early.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatMixer;

impl ConcatMixer {
    /// Create a mixer.
    pub fn new() -> Self {
        Self
    }
}

/// Length of a leading ID3v2 tag, header and footer included.
fn id3v2_len(bytes: &[u8]) -> usize {
    if bytes.len() < ID3V2_HEADER_LEN || &bytes[..3] != b"ID3" {
        return 0;
    }
    // Tag size is a 28-bit syncsafe integer.
    let size = bytes[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b as usize & 0x7f));
    let footer = if bytes[5] & 0x10 != 0 {
        ID3V2_HEADER_LEN
    } else {
        0
    };
    (ID3V2_HEADER_LEN + size + footer).min(bytes.len())
}

/// Length of a trailing ID3v1 tag.
fn id3v1_len(bytes: &[u8]) -> usize {
    if bytes.len() >= ID3V1_TAG_LEN && &bytes[bytes.len() - ID3V1_TAG_LEN..][..3] == b"TAG" {
        ID3V1_TAG_LEN
    } else {
        0
    }
}

/// Audio frames of a segment, optionally keeping its leading tag.
fn frames(bytes: &[u8], keep_header: bool) -> &[u8] {
    let start = if keep_header { 0 } else { id3v2_len(bytes) };
    let end = bytes.len() - id3v1_len(bytes);
    if start >= end { &[] } else { &bytes[start..end] }
}

#[async_trait]
impl AudioMixer for ConcatMixer {
    #[instrument(skip(self, segments), fields(segments = segments.len()))]
    async fn mix(&self, segments: &[AudioSegment]) -> TaleweaverResult<AudioClip> {
        let audible: Vec<&AudioSegment> = segments
            .iter()
            .filter(|segment| !segment.clip.bytes.is_empty())
            .collect();
        if audible.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::Mixing(
                "no audio segments to mix".to_string(),
            ))
            .into());
        }

        let total: usize = audible.iter().map(|s| s.clip.bytes.len()).sum();
        let mut mixed = Vec::with_capacity(total);
        for (position, segment) in audible.iter().enumerate() {
            mixed.extend_from_slice(frames(&segment.clip.bytes, position == 0));
        }

        if mixed.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::Mixing(
                "segments contained no audio frames".to_string(),
            ))
            .into());
        }

        debug!(bytes = mixed.len(), "Mixed page audio");
        Ok(AudioClip::mp3(mixed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(payload_len: usize) -> Vec<u8> {
        let mut bytes = b"ID3\x04\x00\x00".to_vec();
        let size = payload_len as u32;
        bytes.extend([
            ((size >> 21) & 0x7f) as u8,
            ((size >> 14) & 0x7f) as u8,
            ((size >> 7) & 0x7f) as u8,
            (size & 0x7f) as u8,
        ]);
        bytes.extend(std::iter::repeat_n(0u8, payload_len));
        bytes
    }

    #[test]
    fn test_id3v2_len_reads_syncsafe_size() {
        let bytes = [tag(200), vec![0xff, 0xfb]].concat();
        assert_eq!(id3v2_len(&bytes), 210);
        assert_eq!(id3v2_len(&[0xff, 0xfb, 0x90]), 0);
    }

    #[test]
    fn test_frames_strips_trailing_id3v1() {
        let mut bytes = vec![0xff, 0xfb, 0x01];
        let mut v1 = b"TAG".to_vec();
        v1.resize(ID3V1_TAG_LEN, b' ');
        bytes.extend(v1);
        assert_eq!(frames(&bytes, true), &[0xff, 0xfb, 0x01]);
    }
}
