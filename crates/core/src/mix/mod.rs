use std::time::Duration;

use crate::config::AudioConfig;

/// Linear volume ramp evaluated from elapsed time rather than tick count, so
/// jitter in the tick source never changes how long a fade takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub started: Duration,
    pub duration: Duration,
}

impl Fade {
    pub fn new(from: f32, to: f32, started: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn level_at(&self, now: Duration) -> f32 {
        if self.is_finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_sub(self.started).as_secs_f32();
        let progress = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * progress
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.duration.is_zero() || now >= self.started + self.duration
    }
}

/// The levels every channel should settle at for one era.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixPlan {
    pub era: usize,
    pub ambient_volume: f32,
    pub ambient_offset: Duration,
    pub voiceover_volume: f32,
    pub segment: usize,
    pub music_volume: f32,
}

impl MixPlan {
    pub fn for_era(config: &AudioConfig, era: usize) -> Self {
        let ambient = config.ambient_mix(era);
        let segment = config.segment_for_era(era);
        let music_volume = config.segment(segment).map(|s| s.volume).unwrap_or(0.0);
        Self {
            era,
            ambient_volume: ambient.volume,
            ambient_offset: start_offset(era, ambient.start_offset_secs),
            voiceover_volume: config.voiceover_volume,
            segment,
            music_volume,
        }
    }
}

fn start_offset(era: usize, secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or_else(|err| {
        tracing::warn!(era, secs, %err, "unusable ambient start offset, playing from the top");
        Duration::ZERO
    })
}
