use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AssetConfig, AudioConfig};

/// The three independent audio roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Ambient,
    Voiceover,
    Music,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Ambient => write!(f, "ambient"),
            ChannelKind::Voiceover => write!(f, "voiceover"),
            ChannelKind::Music => write!(f, "music"),
        }
    }
}

/// Builds versioned asset addresses from a channel kind and era.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    config: AssetConfig,
}

impl AssetResolver {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Candidate addresses for the ambient or voiceover track of `era`, most
    /// preferred encoding first.
    pub fn era_track(&self, kind: ChannelKind, era: usize) -> Vec<String> {
        let folder = match kind {
            ChannelKind::Ambient => "ambient",
            ChannelKind::Voiceover => "voiceovers",
            ChannelKind::Music => "music",
        };
        self.audio_candidates(folder, &format!("era-{era}"))
    }

    /// Candidate addresses for a music segment's looping track.
    pub fn music_track(&self, track: &str) -> Vec<String> {
        self.audio_candidates("music", track)
    }

    /// Candidates for whatever plays on `kind` while `era` is active.
    pub fn resolve(&self, audio: &AudioConfig, kind: ChannelKind, era: usize) -> Vec<String> {
        match kind {
            ChannelKind::Music => audio
                .segment(audio.segment_for_era(era))
                .map(|segment| self.music_track(&segment.track))
                .unwrap_or_default(),
            _ => self.era_track(kind, era),
        }
    }

    /// Address of an intro/end screen video such as `headphones.mp4`.
    pub fn video(&self, file_name: &str) -> String {
        format!(
            "{}/video/{file_name}?v={}",
            self.config.base_path.trim_end_matches('/'),
            self.config.video_version
        )
    }

    fn audio_candidates(&self, folder: &str, stem: &str) -> Vec<String> {
        let base = self.config.base_path.trim_end_matches('/');
        self.config
            .encodings
            .iter()
            .map(|ext| {
                format!(
                    "{base}/audio/{folder}/{stem}.{ext}?v={}",
                    self.config.audio_version
                )
            })
            .collect()
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(AssetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn era_tracks_are_versioned() {
        let resolver = AssetResolver::default();
        assert_eq!(
            resolver.era_track(ChannelKind::Ambient, 3),
            vec!["/timelineofthefuture/audio/ambient/era-3.mp3?v=20251121-v12"]
        );
        assert_eq!(
            resolver.era_track(ChannelKind::Voiceover, 16),
            vec!["/timelineofthefuture/audio/voiceovers/era-16.mp3?v=20251121-v12"]
        );
    }

    #[test]
    fn candidates_follow_encoding_preference() {
        let resolver = AssetResolver::new(AssetConfig {
            base_path: "/assets/".to_string(),
            encodings: vec!["ogg".to_string(), "mp3".to_string()],
            ..AssetConfig::default()
        });
        let candidates = resolver.music_track("background-2");
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].starts_with("/assets/audio/music/background-2.ogg"));
        assert!(candidates[1].starts_with("/assets/audio/music/background-2.mp3"));
    }

    #[test]
    fn music_resolves_through_segments() {
        let resolver = AssetResolver::default();
        let audio = AudioConfig::default();
        let track = &resolver.resolve(&audio, ChannelKind::Music, 7)[0];
        assert!(track.contains("/music/background-1.mp3"));
    }

    #[test]
    fn videos_use_their_own_version() {
        let resolver = AssetResolver::default();
        assert_eq!(
            resolver.video("logo.mp4"),
            "/timelineofthefuture/video/logo.mp4?v=20251121-v3"
        );
    }
}
