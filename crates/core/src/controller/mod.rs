//! Audio layer sequencing.
//!
//! [`AudioLayerController`] owns the ambient, voiceover and music channels and
//! reacts to [`SessionSnapshot`] diffs. Timed steps go through a [`Scheduler`]
//! and carry the generation of the sequence that queued them; a step whose
//! generation is no longer current is dropped before it touches any channel.
//! Volumes are driven by [`Fade`]s evaluated on every [`tick`].
//!
//! [`tick`]: AudioLayerController::tick

use std::time::Duration;

use crate::{
    assets::{AssetResolver, ChannelKind},
    audio::{AudioBackend, ResourceId},
    config::AudioConfig,
    mix::{Fade, MixPlan},
    session::{Screen, SessionSnapshot},
    timeline::Scheduler,
    Result, TimelineError,
};

/// Deferred sequencing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    StartAmbient { generation: u64, era: usize },
    StartVoiceover { generation: u64, era: usize },
    StartMusic { generation: u64, era: usize },
}

impl Step {
    fn is_narration(&self) -> bool {
        !matches!(self, Step::StartMusic { .. })
    }
}

#[derive(Debug, Clone)]
struct Channel {
    id: ResourceId,
    /// Era for ambient/voiceover, segment for music.
    key: usize,
    /// Unmuted level. The backend sees zero while muted.
    level: f32,
    fade: Option<Fade>,
    playing: bool,
}

impl Channel {
    fn new(id: ResourceId, key: usize) -> Self {
        Self {
            id,
            key,
            level: 0.0,
            fade: None,
            playing: false,
        }
    }
}

/// Public view of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStatus {
    pub kind: ChannelKind,
    pub resource: ResourceId,
    /// Era for ambient and voiceover, music segment for music.
    pub key: usize,
    pub level: f32,
    pub volume: f32,
    pub playing: bool,
    pub fading: bool,
}

/// Maps session state to the set of playing resources.
#[derive(Debug)]
pub struct AudioLayerController<B: AudioBackend> {
    backend: B,
    config: AudioConfig,
    resolver: AssetResolver,
    scheduler: Scheduler<Step>,
    ambient: Option<Channel>,
    retiring_ambient: Option<Channel>,
    voiceover: Option<Channel>,
    music: Option<Channel>,
    pending_segment: Option<usize>,
    narration_generation: u64,
    music_generation: u64,
    observed: Option<SessionSnapshot>,
    muted: bool,
}

impl<B: AudioBackend> AudioLayerController<B> {
    pub fn new(backend: B, config: AudioConfig, resolver: AssetResolver) -> Self {
        Self {
            backend,
            config,
            resolver,
            scheduler: Scheduler::new(),
            ambient: None,
            retiring_ambient: None,
            voiceover: None,
            music: None,
            pending_segment: None,
            narration_generation: 0,
            music_generation: 0,
            observed: None,
            muted: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Timed sequencing steps not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Number of channels with a fade in progress.
    pub fn active_fades(&self) -> usize {
        self.channels().filter(|(_, c)| c.fade.is_some()).count()
    }

    pub fn status(&self, kind: ChannelKind) -> Option<ChannelStatus> {
        let channel = match kind {
            ChannelKind::Ambient => self.ambient.as_ref(),
            ChannelKind::Voiceover => self.voiceover.as_ref(),
            ChannelKind::Music => self.music.as_ref(),
        }?;
        Some(ChannelStatus {
            kind,
            resource: channel.id,
            key: channel.key,
            level: channel.level,
            volume: self.output(channel.level),
            playing: channel.playing,
            fading: channel.fade.is_some(),
        })
    }

    /// Applies the consequences of a session change.
    pub fn observe(&mut self, snapshot: SessionSnapshot, now: Duration) {
        self.tick(now);
        let previous = self.observed.replace(snapshot);

        if snapshot.muted != self.muted {
            self.apply_mute(snapshot.muted);
        }

        let active = is_active(&snapshot);
        let was_active = previous.as_ref().is_some_and(is_active);

        if !active {
            let screen_changed = previous.is_some_and(|p| p.screen != snapshot.screen);
            if was_active || screen_changed {
                self.hard_stop();
            }
            return;
        }

        let era_changed = previous.map_or(true, |p| p.active_era != snapshot.active_era);
        if !was_active || era_changed {
            tracing::debug!(era = snapshot.active_era, "resequencing");
            self.sequence_narration(snapshot.active_era, now);
            self.sequence_music(snapshot.active_era, now);
        }
    }

    /// Fires due steps in order and moves every fade to `now`.
    pub fn tick(&mut self, now: Duration) {
        while let Some(due) = self.scheduler.pop_due(now) {
            self.advance_fades(due.due);
            self.run(due.event, due.due);
        }
        self.advance_fades(now);
    }

    /// Retries whatever an autoplay block left silent.
    pub fn user_gesture(&mut self, now: Duration) {
        self.backend.user_gesture();
        self.tick(now);

        let Some(snapshot) = self.observed.filter(is_active) else {
            return;
        };

        if self.music.as_ref().is_some_and(|music| !music.playing) {
            let plan = MixPlan::for_era(&self.config, snapshot.active_era);
            self.resume_music(plan.music_volume, now);
        }

        let narration_pending = self.scheduler.iter().any(|step| step.event.is_narration());
        if self.ambient.is_none() && self.voiceover.is_none() && !narration_pending {
            tracing::debug!(era = snapshot.active_era, "retrying narration after gesture");
            self.sequence_narration(snapshot.active_era, now);
        }
    }

    /// Pauses and rewinds every channel at once, cancelling all pending work.
    pub fn hard_stop(&mut self) {
        self.narration_generation += 1;
        self.music_generation += 1;
        self.scheduler.clear();
        self.pending_segment = None;

        for channel in [
            self.ambient.take(),
            self.retiring_ambient.take(),
            self.voiceover.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.discard(channel);
        }

        if let Some(music) = self.music.as_mut() {
            self.backend.pause(music.id);
            self.backend.seek(music.id, Duration::ZERO);
            music.playing = false;
            music.fade = None;
        }
        tracing::info!("all channels stopped");
    }

    fn sequence_narration(&mut self, era: usize, now: Duration) {
        self.narration_generation += 1;
        let generation = self.narration_generation;
        let cancelled = self.scheduler.cancel_where(Step::is_narration);
        if cancelled > 0 {
            tracing::debug!(cancelled, "superseded pending narration steps");
        }

        if let Some(voiceover) = self.voiceover.take() {
            self.discard(voiceover);
        }
        if let Some(retiring) = self.retiring_ambient.take() {
            self.discard(retiring);
        }
        if let Some(mut ambient) = self.ambient.take() {
            ambient.fade = Some(Fade::new(
                ambient.level,
                0.0,
                now,
                self.config.ambient_fade_out(),
            ));
            self.retiring_ambient = Some(ambient);
        }

        // The new ambient waits for the outgoing one to reach silence.
        let start_at = now + self.config.ambient_pause().max(self.config.ambient_fade_out());
        self.scheduler.schedule(
            start_at,
            Step::StartAmbient { generation, era },
        );
    }

    fn sequence_music(&mut self, era: usize, now: Duration) {
        let plan = MixPlan::for_era(&self.config, era);
        let segment = plan.segment;

        if self.pending_segment == Some(segment) {
            return;
        }
        if self.music.as_ref().is_some_and(|music| music.key == segment) {
            if self.music.as_ref().is_some_and(|music| !music.playing) {
                self.resume_music(plan.music_volume, now);
            }
            return;
        }

        self.music_generation += 1;
        let generation = self.music_generation;
        self.scheduler
            .cancel_where(|step| matches!(step, Step::StartMusic { .. }));
        self.pending_segment = None;

        match self.music.take() {
            Some(old) => {
                tracing::info!(from = old.key, to = segment, "swapping music segment");
                self.discard(old);
                self.pending_segment = Some(segment);
                self.scheduler.schedule(
                    now + self.config.music_cleanup(),
                    Step::StartMusic { generation, era },
                );
            }
            None => self.start_music(&plan, now),
        }
    }

    fn run(&mut self, step: Step, at: Duration) {
        match step {
            Step::StartAmbient { generation, era } if generation == self.narration_generation => {
                self.start_ambient(era, at)
            }
            Step::StartVoiceover { generation, era } if generation == self.narration_generation => {
                self.start_voiceover(era)
            }
            Step::StartMusic { generation, era } if generation == self.music_generation => {
                self.pending_segment = None;
                let plan = MixPlan::for_era(&self.config, era);
                self.start_music(&plan, at)
            }
            stale => tracing::debug!(?stale, "dropping stale step"),
        }
    }

    fn start_ambient(&mut self, era: usize, at: Duration) {
        let generation = self.narration_generation;
        for channel in [self.retiring_ambient.take(), self.ambient.take()]
            .into_iter()
            .flatten()
        {
            self.discard(channel);
        }

        let plan = MixPlan::for_era(&self.config, era);
        match self.open(ChannelKind::Ambient, era, true) {
            Ok(id) => {
                if !plan.ambient_offset.is_zero() {
                    self.backend.seek(id, plan.ambient_offset);
                }
                self.backend.set_volume(id, 0.0);
                match self.backend.play(id) {
                    Ok(()) => {
                        tracing::info!(era, "ambient started");
                        let mut channel = Channel::new(id, era);
                        channel.playing = true;
                        channel.fade = Some(Fade::new(
                            0.0,
                            plan.ambient_volume,
                            at,
                            self.config.ambient_fade_in(),
                        ));
                        self.ambient = Some(channel);
                    }
                    Err(err) => {
                        self.backend.release(id);
                        if err.is_autoplay_blocked() {
                            tracing::warn!(era, %err, "ambient blocked, waiting for a gesture");
                            return;
                        }
                        tracing::warn!(era, %err, "ambient failed to start");
                    }
                }
            }
            Err(err) => tracing::warn!(era, %err, "ambient unavailable"),
        }

        self.scheduler.schedule(
            at + self.config.voiceover_delay(),
            Step::StartVoiceover { generation, era },
        );
    }

    fn start_voiceover(&mut self, era: usize) {
        if let Some(stale) = self.voiceover.take() {
            self.discard(stale);
        }

        let id = match self.open(ChannelKind::Voiceover, era, false) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(era, %err, "voiceover unavailable");
                return;
            }
        };

        let level = MixPlan::for_era(&self.config, era).voiceover_volume;
        self.backend.set_volume(id, self.output(level));
        match self.backend.play(id) {
            Ok(()) => {
                tracing::info!(era, "voiceover started");
                let mut channel = Channel::new(id, era);
                channel.level = level;
                channel.playing = true;
                self.voiceover = Some(channel);
            }
            Err(err) => {
                tracing::warn!(era, %err, "voiceover failed to start");
                self.backend.release(id);
            }
        }
    }

    fn start_music(&mut self, plan: &MixPlan, at: Duration) {
        let segment = plan.segment;
        if let Some(stale) = self.music.take() {
            self.discard(stale);
        }

        let Some(track) = self.config.segment(segment).map(|s| s.track.clone()) else {
            tracing::warn!(segment, "no music configured for segment");
            return;
        };
        let candidates = self.resolver.music_track(&track);
        let id = match self.open_any(&candidates, true, &format!("music `{track}`")) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(%err, "music unavailable");
                return;
            }
        };
        self.backend.set_volume(id, 0.0);
        self.music = Some(Channel::new(id, segment));
        self.resume_music(plan.music_volume, at);
    }

    /// Plays the current music resource and fades it up to `target`.
    /// An autoplay block leaves it paused so the next trigger can resume it.
    fn resume_music(&mut self, target: f32, at: Duration) {
        let Some(id) = self.music.as_ref().map(|music| music.id) else {
            return;
        };
        match self.backend.play(id) {
            Ok(()) => {
                let fade_in = self.config.music_fade_in();
                if let Some(music) = self.music.as_mut() {
                    tracing::info!(segment = music.key, "music playing");
                    music.playing = true;
                    music.level = 0.0;
                    music.fade = Some(Fade::new(0.0, target, at, fade_in));
                }
                self.backend.set_volume(id, 0.0);
            }
            Err(err) if err.is_autoplay_blocked() => {
                tracing::warn!(%err, "music blocked, waiting for a gesture");
            }
            Err(err) => {
                tracing::warn!(%err, "music failed to start");
                if let Some(music) = self.music.take() {
                    self.discard(music);
                }
            }
        }
    }

    fn apply_mute(&mut self, muted: bool) {
        self.muted = muted;
        let levels: Vec<(ResourceId, f32)> = self
            .channels()
            .map(|(_, channel)| (channel.id, self.output(channel.level)))
            .collect();
        for (id, volume) in levels {
            self.backend.set_volume(id, volume);
        }
        tracing::debug!(muted, "mute applied");
    }

    fn advance_fades(&mut self, at: Duration) {
        let muted = self.muted;
        let backend = &mut self.backend;
        for channel in [
            self.ambient.as_mut(),
            self.retiring_ambient.as_mut(),
            self.voiceover.as_mut(),
            self.music.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            let Some(fade) = channel.fade else {
                continue;
            };
            channel.level = fade.level_at(at);
            backend.set_volume(channel.id, if muted { 0.0 } else { channel.level });
            if fade.is_finished(at) {
                channel.fade = None;
            }
        }

        if self
            .retiring_ambient
            .as_ref()
            .is_some_and(|retiring| retiring.fade.is_none())
        {
            if let Some(retiring) = self.retiring_ambient.take() {
                tracing::debug!(era = retiring.key, "ambient faded out");
                self.discard(retiring);
            }
        }
    }

    fn open(&mut self, kind: ChannelKind, era: usize, looped: bool) -> Result<ResourceId> {
        let candidates = self.resolver.era_track(kind, era);
        self.open_any(&candidates, looped, &format!("{kind} era {era}"))
    }

    fn open_any(&mut self, candidates: &[String], looped: bool, what: &str) -> Result<ResourceId> {
        for address in candidates {
            match self.backend.load(address, looped) {
                Ok(id) => return Ok(id),
                Err(err) => tracing::debug!(address, %err, "candidate rejected"),
            }
        }
        Err(TimelineError::NoPlayableCandidate {
            what: what.to_string(),
        })
    }

    fn discard(&mut self, channel: Channel) {
        self.backend.pause(channel.id);
        self.backend.seek(channel.id, Duration::ZERO);
        self.backend.release(channel.id);
    }

    fn output(&self, level: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            level
        }
    }

    fn channels(&self) -> impl Iterator<Item = (ChannelKind, &Channel)> {
        [
            (ChannelKind::Ambient, self.ambient.as_ref()),
            (ChannelKind::Ambient, self.retiring_ambient.as_ref()),
            (ChannelKind::Voiceover, self.voiceover.as_ref()),
            (ChannelKind::Music, self.music.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, channel)| channel.map(|channel| (kind, channel)))
    }
}

fn is_active(snapshot: &SessionSnapshot) -> bool {
    snapshot.screen == Screen::Timeline && snapshot.audio_enabled
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::audio::RecordingBackend;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn controller() -> AudioLayerController<RecordingBackend> {
        AudioLayerController::new(
            RecordingBackend::new(),
            AudioConfig::default(),
            AssetResolver::default(),
        )
    }

    fn timeline(era: usize) -> SessionSnapshot {
        SessionSnapshot {
            screen: Screen::Timeline,
            active_era: era,
            audio_enabled: true,
            muted: false,
        }
    }

    /// Ticks every 50ms from `from` to `to`, checking the channel invariants
    /// at each step.
    fn run(ctl: &mut AudioLayerController<RecordingBackend>, from: u64, to: u64) {
        let mut at = from;
        while at < to {
            at = (at + 50).min(to);
            ctl.tick(ms(at));
            assert_invariants(ctl);
        }
    }

    fn assert_invariants(ctl: &AudioLayerController<RecordingBackend>) {
        let backend = ctl.backend();
        assert!(backend.playing_matching("/ambient/").count() <= 1);
        assert!(backend.playing_matching("/voiceovers/").count() <= 1);
        assert!(backend.playing_matching("/music/").count() <= 1);
    }

    #[test]
    fn enabling_audio_starts_ambient_then_voiceover() {
        let mut ctl = controller();
        let mut snapshot = timeline(0);
        snapshot.audio_enabled = false;
        ctl.observe(snapshot, ms(0));
        assert_eq!(ctl.backend().loaded_count(), 0);

        snapshot.audio_enabled = true;
        ctl.observe(snapshot, ms(0));

        run(&mut ctl, 0, 600);
        let ambient: Vec<_> = ctl.backend().playing_matching("/ambient/").collect();
        assert_eq!(ambient.len(), 1);
        assert!(ambient[0].address.contains("era-0.mp3"));
        assert!(ambient[0].looped);
        assert_eq!(ctl.backend().playing_matching("/voiceovers/").count(), 0);

        run(&mut ctl, 600, 2_600);
        let voiceovers: Vec<_> = ctl.backend().playing_matching("/voiceovers/").collect();
        assert_eq!(voiceovers.len(), 1);
        assert!(voiceovers[0].address.contains("era-0.mp3"));
        assert_relative_eq!(voiceovers[0].volume, 0.92);
        assert_eq!(ctl.pending_timers(), 0);
    }

    #[test]
    fn ambient_fades_to_era_target_with_offset() {
        let mut ctl = controller();
        ctl.observe(timeline(3), ms(0));
        run(&mut ctl, 0, 550);
        let early = ctl.status(ChannelKind::Ambient).unwrap();
        assert!(early.volume > 0.0 && early.volume < 0.3);
        assert!(early.fading);

        run(&mut ctl, 550, 1_000);
        let settled = ctl.status(ChannelKind::Ambient).unwrap();
        assert_relative_eq!(settled.volume, 0.3);
        assert!(!settled.fading);
        let resource = ctl.backend().resource(settled.resource).unwrap();
        assert_eq!(resource.position, Duration::from_secs(10));
    }

    #[test]
    fn rapid_era_changes_settle_on_the_last_era() {
        let mut ctl = controller();
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 3_000);

        ctl.observe(timeline(1), ms(3_000));
        run(&mut ctl, 3_000, 3_200);
        ctl.observe(timeline(2), ms(3_200));
        run(&mut ctl, 3_200, 8_000);

        let backend = ctl.backend();
        assert!(backend
            .recent_loads()
            .all(|address| !address.contains("era-1.mp3")));
        let ambient: Vec<_> = backend.playing_matching("/ambient/").collect();
        let voice: Vec<_> = backend.playing_matching("/voiceovers/").collect();
        assert_eq!(ambient.len(), 1);
        assert_eq!(voice.len(), 1);
        assert!(ambient[0].address.contains("era-2.mp3"));
        assert!(voice[0].address.contains("era-2.mp3"));
    }

    #[test]
    fn superseded_voiceover_never_starts() {
        let mut ctl = controller();
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 2_000);
        // era 0's voiceover is due at 2500ms; move on just before it fires
        ctl.observe(timeline(1), ms(2_000));
        run(&mut ctl, 2_000, 2_600);
        assert!(ctl
            .backend()
            .recent_loads()
            .all(|address| !address.contains("voiceovers/era-0")));
    }

    #[test]
    fn voiceover_stops_immediately_on_era_change() {
        let mut ctl = controller();
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 3_000);
        let voice = ctl.status(ChannelKind::Voiceover).unwrap().resource;

        ctl.observe(timeline(1), ms(3_000));
        assert!(ctl.backend().is_released(voice));
        assert!(ctl.status(ChannelKind::Voiceover).is_none());
    }

    #[test]
    fn outgoing_ambient_fades_before_release() {
        let mut ctl = controller();
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 3_000);
        let old = ctl.status(ChannelKind::Ambient).unwrap().resource;

        ctl.observe(timeline(1), ms(3_000));
        ctl.tick(ms(3_100));
        let fading = ctl.backend().resource(old).unwrap();
        assert!(fading.playing);
        assert!(fading.volume > 0.0 && fading.volume < 0.15);

        run(&mut ctl, 3_100, 3_300);
        assert!(ctl.backend().is_released(old));
    }

    #[test]
    fn long_fade_out_delays_the_next_ambient() {
        let config = AudioConfig {
            ambient_fade_out_ms: 2_000,
            ..AudioConfig::default()
        };
        let mut ctl =
            AudioLayerController::new(RecordingBackend::new(), config, AssetResolver::default());
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 3_000);
        let old = ctl.status(ChannelKind::Ambient).unwrap().resource;

        ctl.observe(timeline(1), ms(3_000));
        run(&mut ctl, 3_000, 3_500);
        ctl.tick(ms(4_990));
        let tail = ctl.backend().resource(old).unwrap();
        assert!(tail.playing);
        assert!(tail.volume > 0.0 && tail.volume < 0.01);
        assert!(ctl.status(ChannelKind::Ambient).is_none());

        ctl.tick(ms(5_000));
        assert!(ctl.backend().is_released(old));
        assert_eq!(ctl.status(ChannelKind::Ambient).unwrap().key, 1);
        assert_invariants(&ctl);
    }

    #[test]
    fn oversized_start_offset_plays_from_the_top() {
        let mut config = AudioConfig::default();
        config.ambient[3].start_offset_secs = 1.0e20;
        let mut ctl =
            AudioLayerController::new(RecordingBackend::new(), config, AssetResolver::default());
        ctl.observe(timeline(3), ms(0));
        run(&mut ctl, 0, 600);

        let ambient = ctl.status(ChannelKind::Ambient).unwrap();
        let resource = ctl.backend().resource(ambient.resource).unwrap();
        assert!(resource.playing);
        assert_eq!(resource.position, Duration::ZERO);
    }

    #[test]
    fn music_swaps_only_at_segment_boundaries() {
        let mut ctl = controller();
        ctl.observe(timeline(3), ms(0));
        run(&mut ctl, 0, 1_000);
        let first = ctl.status(ChannelKind::Music).unwrap();
        assert_eq!(first.key, 0);
        assert_relative_eq!(first.volume, 0.05);

        ctl.observe(timeline(4), ms(1_000));
        run(&mut ctl, 1_000, 2_000);
        assert_eq!(ctl.status(ChannelKind::Music).unwrap().resource, first.resource);

        ctl.observe(timeline(5), ms(2_000));
        assert!(ctl.backend().is_released(first.resource));
        assert!(ctl.status(ChannelKind::Music).is_none());
        run(&mut ctl, 2_000, 3_000);

        let second = ctl.status(ChannelKind::Music).unwrap();
        assert_eq!(second.key, 1);
        assert_relative_eq!(second.volume, 0.04);
        let tracks: Vec<_> = ctl.backend().playing_matching("/music/").collect();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].address.contains("background-1.mp3"));
        assert!(tracks[0].looped);
    }

    #[test]
    fn mute_restores_era_and_segment_levels() {
        let mut ctl = controller();
        ctl.observe(timeline(5), ms(0));
        run(&mut ctl, 0, 3_000);

        let mut snapshot = timeline(5);
        snapshot.muted = true;
        ctl.observe(snapshot, ms(3_000));
        assert_eq!(ctl.backend().playing().filter(|r| r.volume > 0.0).count(), 0);
        assert_eq!(ctl.backend().playing().count(), 3);

        snapshot.muted = false;
        ctl.observe(snapshot, ms(3_500));
        assert_relative_eq!(ctl.status(ChannelKind::Ambient).unwrap().volume, 0.05);
        assert_relative_eq!(ctl.status(ChannelKind::Music).unwrap().volume, 0.04);
        assert_relative_eq!(ctl.status(ChannelKind::Voiceover).unwrap().volume, 0.92);
    }

    #[test]
    fn muted_sequence_starts_silently() {
        let mut ctl = controller();
        let mut snapshot = timeline(0);
        snapshot.muted = true;
        ctl.observe(snapshot, ms(0));
        run(&mut ctl, 0, 3_000);
        assert_eq!(ctl.backend().playing().count(), 3);
        assert!(ctl.backend().playing().all(|r| r.volume == 0.0));
    }

    #[test]
    fn hard_stop_leaves_nothing_scheduled() {
        let mut ctl = controller();
        ctl.observe(timeline(7), ms(0));
        run(&mut ctl, 0, 600);
        assert!(ctl.pending_timers() > 0);

        let mut snapshot = timeline(0);
        snapshot.screen = Screen::Intro;
        snapshot.audio_enabled = false;
        ctl.observe(snapshot, ms(600));

        assert_eq!(ctl.pending_timers(), 0);
        assert_eq!(ctl.active_fades(), 0);
        assert_eq!(ctl.backend().playing().count(), 0);
        run(&mut ctl, 600, 5_000);
        assert_eq!(ctl.backend().playing().count(), 0);
    }

    #[test]
    fn paused_music_resumes_without_reload() {
        let mut ctl = controller();
        ctl.observe(timeline(2), ms(0));
        run(&mut ctl, 0, 1_000);
        let music = ctl.status(ChannelKind::Music).unwrap().resource;

        let mut intro = timeline(0);
        intro.screen = Screen::Intro;
        intro.audio_enabled = false;
        ctl.observe(intro, ms(1_000));
        assert!(!ctl.backend().resource(music).unwrap().playing);

        ctl.observe(timeline(0), ms(2_000));
        assert_eq!(ctl.status(ChannelKind::Music).unwrap().resource, music);
        assert!(ctl.backend().resource(music).unwrap().playing);
    }

    #[test]
    fn autoplay_block_is_retried_on_gesture() {
        let mut ctl = AudioLayerController::new(
            RecordingBackend::new().with_autoplay_blocked(),
            AudioConfig::default(),
            AssetResolver::default(),
        );
        ctl.observe(timeline(0), ms(0));
        run(&mut ctl, 0, 3_000);
        assert_eq!(ctl.backend().playing().count(), 0);
        assert!(ctl.status(ChannelKind::Ambient).is_none());
        assert!(!ctl.status(ChannelKind::Music).unwrap().playing);
        assert_eq!(ctl.pending_timers(), 0);

        ctl.user_gesture(ms(3_000));
        run(&mut ctl, 3_000, 6_000);
        assert_eq!(ctl.backend().playing().count(), 3);
    }

    #[test]
    fn falls_back_to_next_encoding() {
        let resolver = AssetResolver::new(crate::config::AssetConfig {
            encodings: vec!["ogg".to_string(), "mp3".to_string()],
            ..Default::default()
        });
        let mut backend = RecordingBackend::new();
        backend.fail_loading(".ogg");
        let mut ctl = AudioLayerController::new(backend, AudioConfig::default(), resolver);

        ctl.observe(timeline(1), ms(0));
        run(&mut ctl, 0, 3_000);
        assert_eq!(ctl.backend().playing().count(), 3);
        assert!(ctl.backend().playing().all(|r| r.address.contains(".mp3?")));
    }

    #[test]
    fn missing_ambient_still_narrates() {
        let mut backend = RecordingBackend::new();
        backend.fail_loading("ambient/era-6");
        let mut ctl =
            AudioLayerController::new(backend, AudioConfig::default(), AssetResolver::default());

        ctl.observe(timeline(6), ms(0));
        run(&mut ctl, 0, 3_000);
        assert!(ctl.status(ChannelKind::Ambient).is_none());
        assert!(ctl.status(ChannelKind::Voiceover).unwrap().playing);
    }
}
