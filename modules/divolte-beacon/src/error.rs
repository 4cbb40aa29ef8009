use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeaconError>;

#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("DVT not initialized correctly; script element missing id='divolte'")]
    LoaderMissing,

    #[error("DVT not initialized correctly; element with id='divolte' is a <{tag}>, not a <script>")]
    LoaderNotScript { tag: String },

    #[error("DVT not initialized correctly; script element has id {found:?}, expected 'divolte'")]
    LoaderIdMismatch { found: Option<String> },

    #[error("Invalid script source {src:?}: {reason}")]
    InvalidSource { src: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl BeaconError {
    pub(crate) fn invalid_source(src: &str, reason: impl Into<String>) -> Self {
        BeaconError::InvalidSource {
            src: src.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for BeaconError {
    fn from(err: reqwest::Error) -> Self {
        BeaconError::Transport(err.to_string())
    }
}
