//! Core library for The History of the Future.
//!
//! The narrative is a fixed catalog of seventeen eras walked through by a
//! [`PlaybackSession`]. Each session change is observed by the
//! [`AudioLayerController`], which keeps three layers in step with the
//! active era: a looping ambient soundscape, the era's voiceover, and a
//! background-music track shared by a band of eras. Playback goes through the
//! [`AudioBackend`] trait so the sequencing logic can run headless against
//! [`RecordingBackend`] on a virtual clock.

pub mod assets;
pub mod audio;
pub mod config;
pub mod controller;
pub mod era;
pub mod error;
pub mod experience;
pub mod mix;
pub mod session;
pub mod timeline;

pub use assets::{AssetResolver, ChannelKind};
pub use audio::{AudioBackend, RecordingBackend, ResourceId, ResourceState};
pub use config::{AmbientMix, AppConfig, AssetConfig, AudioConfig, MusicSegmentConfig};
pub use controller::{AudioLayerController, ChannelStatus};
pub use era::{era, eras, Era, ThemeColor, ERA_COUNT, LAST_ERA};
pub use error::{Result, TimelineError};
pub use experience::Experience;
pub use mix::{Fade, MixPlan};
pub use session::{PlaybackSession, Screen, SessionSnapshot};
pub use timeline::{PlaybackClock, ScheduledEvent, Scheduler};
