use std::time::Duration;

use crate::{
    assets::AssetResolver,
    audio::AudioBackend,
    config::AppConfig,
    controller::AudioLayerController,
    era::{era, Era},
    session::{PlaybackSession, Screen},
    timeline::PlaybackClock,
    Result,
};

/// One visitor's run through the narrative: session state, its audio, and the
/// clock both share.
///
/// Every control mutates the [`PlaybackSession`] first and then hands the new
/// snapshot to the [`AudioLayerController`]. Controls that are illegal on the
/// current screen return an error and leave both untouched.
#[derive(Debug)]
pub struct Experience<B: AudioBackend> {
    session: PlaybackSession,
    audio: AudioLayerController<B>,
    clock: PlaybackClock,
}

impl<B: AudioBackend> Experience<B> {
    pub fn new(backend: B, config: AppConfig) -> Self {
        let resolver = AssetResolver::new(config.assets);
        let mut audio = AudioLayerController::new(backend, config.audio, resolver);
        let session = PlaybackSession::new();
        audio.observe(session.snapshot(), Duration::ZERO);
        Self {
            session,
            audio,
            clock: PlaybackClock::new(),
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn audio(&self) -> &AudioLayerController<B> {
        &self.audio
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// The era on screen, if the timeline is showing.
    pub fn current_era(&self) -> Option<&'static Era> {
        match self.session.screen() {
            Screen::Timeline => era(self.session.active_era()),
            _ => None,
        }
    }

    /// Moves the clock forward and lets pending fades and steps run.
    pub fn advance_clock(&mut self, delta: Duration) {
        let now = self.clock.advance(delta);
        self.audio.tick(now);
    }

    pub fn start(&mut self) -> Result<()> {
        self.apply(PlaybackSession::start)
    }

    pub fn next(&mut self) -> Result<()> {
        self.apply(PlaybackSession::advance)
    }

    pub fn previous(&mut self) -> Result<()> {
        self.apply(PlaybackSession::retreat)
    }

    pub fn jump_to(&mut self, era: usize) -> Result<()> {
        self.apply(|session| session.jump_to(era))
    }

    pub fn restart(&mut self) -> Result<()> {
        self.apply(PlaybackSession::restart)
    }

    pub fn toggle_mute(&mut self) {
        self.session.toggle_mute();
        self.sync();
    }

    pub fn enable_audio(&mut self) {
        self.session.enable_audio();
        self.sync();
    }

    /// Any click or key press on the page.
    pub fn user_gesture(&mut self) {
        self.audio.user_gesture(self.clock.now());
    }

    fn apply(&mut self, control: impl FnOnce(&mut PlaybackSession) -> Result<()>) -> Result<()> {
        control(&mut self.session).inspect_err(|err| {
            tracing::warn!(%err, "control rejected");
        })?;
        self.sync();
        Ok(())
    }

    fn sync(&mut self) {
        let snapshot = self.session.snapshot();
        tracing::debug!(?snapshot, "session changed");
        self.audio.observe(snapshot, self.clock.now());
    }
}
