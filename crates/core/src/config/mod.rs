use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{era::ERA_COUNT, era::LAST_ERA, Result, TimelineError};

/// Number of background-music bands the era range is split into.
pub const MUSIC_SEGMENT_COUNT: usize = 4;

/// Longest lead-in an ambient track may skip.
pub const MAX_START_OFFSET_SECS: f32 = 3_600.0;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub assets: AssetConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.assets.validate()
    }
}

/// Timing and mix levels for the three audio layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub ambient_fade_out_ms: u64,
    /// Gap between the start of the outgoing fade and the new ambient track.
    pub ambient_pause_ms: u64,
    pub ambient_fade_in_ms: u64,
    /// Lead-in between the ambient fade-in starting and the narration.
    pub voiceover_delay_ms: u64,
    pub voiceover_volume: f32,
    pub music_cleanup_ms: u64,
    pub music_fade_in_ms: u64,
    /// One row per era, indexed by era.
    pub ambient: Vec<AmbientMix>,
    /// Contiguous bands in increasing era order.
    pub music_segments: Vec<MusicSegmentConfig>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ambient_fade_out_ms: 250,
            ambient_pause_ms: 500,
            ambient_fade_in_ms: 250,
            voiceover_delay_ms: 2_000,
            voiceover_volume: 0.92,
            music_cleanup_ms: 100,
            music_fade_in_ms: 500,
            ambient: default_ambient_table(),
            music_segments: default_music_segments(),
        }
    }
}

impl AudioConfig {
    pub fn ambient_fade_out(&self) -> Duration {
        Duration::from_millis(self.ambient_fade_out_ms)
    }

    pub fn ambient_pause(&self) -> Duration {
        Duration::from_millis(self.ambient_pause_ms)
    }

    pub fn ambient_fade_in(&self) -> Duration {
        Duration::from_millis(self.ambient_fade_in_ms)
    }

    pub fn voiceover_delay(&self) -> Duration {
        Duration::from_millis(self.voiceover_delay_ms)
    }

    pub fn music_cleanup(&self) -> Duration {
        Duration::from_millis(self.music_cleanup_ms)
    }

    pub fn music_fade_in(&self) -> Duration {
        Duration::from_millis(self.music_fade_in_ms)
    }

    /// Ambient row for `era`, falling back to the standard mix for eras the
    /// table does not cover.
    pub fn ambient_mix(&self, era: usize) -> AmbientMix {
        self.ambient.get(era).copied().unwrap_or_default()
    }

    /// Position of the music band containing `era`.
    pub fn segment_for_era(&self, era: usize) -> usize {
        self.music_segments
            .iter()
            .position(|segment| segment.contains(era))
            .unwrap_or(self.music_segments.len().saturating_sub(1))
    }

    pub fn segment(&self, index: usize) -> Option<&MusicSegmentConfig> {
        self.music_segments.get(index)
    }

    fn validate(&self) -> Result<()> {
        check_volume("voiceover_volume", self.voiceover_volume)?;
        if self.ambient_fade_out_ms > self.ambient_pause_ms {
            return Err(TimelineError::InvalidConfig(format!(
                "ambient_fade_out_ms ({}) must not exceed ambient_pause_ms ({})",
                self.ambient_fade_out_ms, self.ambient_pause_ms
            )));
        }

        if self.ambient.len() != ERA_COUNT {
            return Err(TimelineError::InvalidConfig(format!(
                "ambient table has {} rows, expected one per era ({ERA_COUNT})",
                self.ambient.len()
            )));
        }
        for (era, mix) in self.ambient.iter().enumerate() {
            check_volume(&format!("ambient[{era}].volume"), mix.volume)?;
            if !(0.0..=MAX_START_OFFSET_SECS).contains(&mix.start_offset_secs) {
                return Err(TimelineError::InvalidConfig(format!(
                    "ambient[{era}].start_offset_secs must be within [0, {MAX_START_OFFSET_SECS}]"
                )));
            }
        }

        if self.music_segments.len() != MUSIC_SEGMENT_COUNT {
            return Err(TimelineError::InvalidConfig(format!(
                "expected {MUSIC_SEGMENT_COUNT} music segments, found {}",
                self.music_segments.len()
            )));
        }
        let mut next_era = 0;
        for segment in &self.music_segments {
            if segment.first_era != next_era || segment.last_era < segment.first_era {
                return Err(TimelineError::InvalidConfig(format!(
                    "music segment `{}` must start at era {next_era}",
                    segment.track
                )));
            }
            check_volume(&format!("music `{}` volume", segment.track), segment.volume)?;
            next_era = segment.last_era + 1;
        }
        if next_era != LAST_ERA + 1 {
            return Err(TimelineError::InvalidConfig(
                "music segments must cover every era".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ambient target level and start position for one era.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientMix {
    pub volume: f32,
    #[serde(default)]
    pub start_offset_secs: f32,
}

impl Default for AmbientMix {
    fn default() -> Self {
        Self {
            volume: STANDARD_AMBIENT_VOLUME,
            start_offset_secs: 0.0,
        }
    }
}

/// One background-music band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSegmentConfig {
    pub track: String,
    pub first_era: usize,
    pub last_era: usize,
    pub volume: f32,
}

impl MusicSegmentConfig {
    pub fn contains(&self, era: usize) -> bool {
        (self.first_era..=self.last_era).contains(&era)
    }
}

/// Where assets live and how their addresses are versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub base_path: String,
    /// Cache-busting token appended to audio addresses.
    pub audio_version: String,
    pub video_version: String,
    /// File extensions to try, most preferred first.
    pub encodings: Vec<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_path: "/timelineofthefuture".to_string(),
            audio_version: "20251121-v12".to_string(),
            video_version: "20251121-v3".to_string(),
            encodings: vec!["mp3".to_string()],
        }
    }
}

impl AssetConfig {
    fn validate(&self) -> Result<()> {
        if self.encodings.is_empty() {
            return Err(TimelineError::InvalidConfig(
                "at least one asset encoding is required".to_string(),
            ));
        }
        Ok(())
    }
}

const STANDARD_AMBIENT_VOLUME: f32 = 0.15;

fn default_ambient_table() -> Vec<AmbientMix> {
    (0..ERA_COUNT)
        .map(|era| match era {
            // Cambrian and migration soundscapes: mixed hot, skip the lead-in.
            3 => AmbientMix {
                volume: 0.3,
                start_offset_secs: 10.0,
            },
            4 => AmbientMix {
                volume: 0.3,
                start_offset_secs: 8.0,
            },
            5 => AmbientMix {
                volume: 0.05,
                start_offset_secs: 0.0,
            },
            _ => AmbientMix::default(),
        })
        .collect()
}

fn default_music_segments() -> Vec<MusicSegmentConfig> {
    [
        ("background", 0, 4, 0.05),
        ("background-1", 5, 9, 0.04),
        ("background-2", 10, 13, 0.05),
        ("background-3", 14, 16, 0.05),
    ]
    .into_iter()
    .map(|(track, first_era, last_era, volume)| MusicSegmentConfig {
        track: track.to_string(),
        first_era,
        last_era,
        volume,
    })
    .collect()
}

fn check_volume(what: &str, volume: f32) -> Result<()> {
    if volume.is_finite() && (0.0..=1.0).contains(&volume) {
        Ok(())
    } else {
        Err(TimelineError::InvalidConfig(format!(
            "{what} must be within [0, 1], got {volume}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn segment_boundaries() {
        let audio = AudioConfig::default();
        let segments: Vec<usize> = (0..ERA_COUNT).map(|era| audio.segment_for_era(era)).collect();
        assert_eq!(
            segments,
            vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3]
        );
        assert_ne!(audio.segment_for_era(4), audio.segment_for_era(5));
        assert_ne!(audio.segment_for_era(9), audio.segment_for_era(10));
        assert_ne!(audio.segment_for_era(13), audio.segment_for_era(14));
    }

    #[test]
    fn ambient_table_special_cases() {
        let audio = AudioConfig::default();
        assert_eq!(audio.ambient_mix(3).volume, 0.3);
        assert_eq!(audio.ambient_mix(4).start_offset_secs, 8.0);
        assert_eq!(audio.ambient_mix(5).volume, 0.05);
        assert_eq!(audio.ambient_mix(11), AmbientMix::default());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "audio": { "voiceover_delay_ms": 1500 }, "assets": { "encodings": ["ogg", "mp3"] } }"#,
        )
        .unwrap();
        assert_eq!(config.audio.voiceover_delay(), Duration::from_millis(1500));
        assert_eq!(config.audio.ambient_pause_ms, 500);
        assert_eq!(config.assets.encodings, vec!["ogg", "mp3"]);
    }

    #[test]
    fn rejects_gapped_music_segments() {
        let mut config = AppConfig::default();
        config.audio.music_segments[2].first_era = 11;
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("background-2"));
    }

    #[test]
    fn rejects_loud_volumes() {
        let err = AppConfig::from_json_str(r#"{ "audio": { "voiceover_volume": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_out_of_range_start_offsets() {
        let mut config = AppConfig::default();
        config.audio.ambient[3].start_offset_secs = 1.0e20;
        assert!(matches!(
            config.validate().unwrap_err(),
            TimelineError::InvalidConfig(_)
        ));

        config.audio.ambient[3].start_offset_secs = f32::NAN;
        assert!(config.validate().is_err());

        config.audio.ambient[3].start_offset_secs = MAX_START_OFFSET_SECS;
        config.validate().unwrap();
    }

    #[test]
    fn rejects_fade_out_longer_than_pause() {
        let err = AppConfig::from_json_str(
            r#"{ "audio": { "ambient_fade_out_ms": 2000, "ambient_pause_ms": 500 } }"#,
        )
        .unwrap_err();
        assert!(format!("{err}").contains("ambient_fade_out_ms"));

        AppConfig::from_json_str(r#"{ "audio": { "ambient_fade_out_ms": 500 } }"#).unwrap();
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "assets": {{ "audio_version": "v99" }} }}"#).unwrap();
        let config = AppConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.assets.audio_version, "v99");
        assert_eq!(config.assets.base_path, "/timelineofthefuture");
    }
}
