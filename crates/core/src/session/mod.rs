//! Top-level playback state: which screen is showing, the active era, and the
//! user's sound preferences.

use std::fmt;

use serde::Serialize;

use crate::{era::LAST_ERA, era::ERA_COUNT, Result, TimelineError};

/// Top-level view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Screen {
    #[default]
    Intro,
    Timeline,
    End,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Intro => write!(f, "Intro"),
            Screen::Timeline => write!(f, "Timeline"),
            Screen::End => write!(f, "End"),
        }
    }
}

/// Copy of the session state handed to the audio controller after every
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionSnapshot {
    pub screen: Screen,
    pub active_era: usize,
    pub audio_enabled: bool,
    pub muted: bool,
}

/// Mutable session, one per visitor.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    screen: Screen,
    active_era: usize,
    audio_enabled: bool,
    muted: bool,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn active_era(&self) -> usize {
        self.active_era
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            screen: self.screen,
            active_era: self.active_era,
            audio_enabled: self.audio_enabled,
            muted: self.muted,
        }
    }

    /// Intro → Timeline at era 0 with sound enabled.
    pub fn start(&mut self) -> Result<()> {
        self.require(Screen::Intro, "start")?;
        self.screen = Screen::Timeline;
        self.active_era = 0;
        self.audio_enabled = true;
        Ok(())
    }

    /// Moves to the next era, or to the End screen from the last one.
    pub fn advance(&mut self) -> Result<()> {
        self.require(Screen::Timeline, "advance")?;
        if self.active_era < LAST_ERA {
            self.active_era += 1;
        } else {
            self.screen = Screen::End;
        }
        Ok(())
    }

    /// Moves to the previous era, wrapping from the first to the last.
    pub fn retreat(&mut self) -> Result<()> {
        self.require(Screen::Timeline, "retreat")?;
        self.active_era = (self.active_era + ERA_COUNT - 1) % ERA_COUNT;
        Ok(())
    }

    /// Selects an era directly.
    pub fn jump_to(&mut self, era: usize) -> Result<()> {
        self.require(Screen::Timeline, "jump")?;
        if era >= ERA_COUNT {
            return Err(TimelineError::EraOutOfRange(era));
        }
        self.active_era = era;
        Ok(())
    }

    /// Back to the intro with sound disabled.
    pub fn restart(&mut self) -> Result<()> {
        if self.screen == Screen::Intro {
            return Err(TimelineError::InvalidTransition {
                action: "restart",
                screen: self.screen,
            });
        }
        self.screen = Screen::Intro;
        self.active_era = 0;
        self.audio_enabled = false;
        Ok(())
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Opts in to sound without moving.
    pub fn enable_audio(&mut self) {
        self.audio_enabled = true;
    }

    fn require(&self, screen: Screen, action: &'static str) -> Result<()> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(TimelineError::InvalidTransition {
                action,
                screen: self.screen,
            })
        }
    }
}
