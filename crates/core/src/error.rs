use crate::session::Screen;

/// Result alias that carries the custom [`TimelineError`] type.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// Free-form message for failures that do not fit a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that fail to parse.
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration that parsed but violates a constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The platform refused to start playback before a user gesture.
    #[error("autoplay blocked for `{address}`")]
    AutoplayBlocked { address: String },
    /// An asset address did not resolve or decode.
    #[error("failed to load `{address}`: {reason}")]
    ResourceLoad { address: String, reason: String },
    /// Every candidate encoding for a resource failed to load.
    #[error("no playable candidate for {what}")]
    NoPlayableCandidate { what: String },
    /// A session control was used on a screen where it has no meaning.
    #[error("`{action}` is not allowed on the {screen:?} screen")]
    InvalidTransition { action: &'static str, screen: Screen },
    /// Era index outside the catalog.
    #[error("era {0} is outside the catalog")]
    EraOutOfRange(usize),
}

impl TimelineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Returns `true` for failures caused by the platform autoplay policy.
    pub fn is_autoplay_blocked(&self) -> bool {
        matches!(self, Self::AutoplayBlocked { .. })
    }
}

impl From<&str> for TimelineError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for TimelineError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
