use thiserror::Error;

/// Everything that can go wrong while obtaining a token from upstream.
///
/// Callers only ever see the rendered message; the variants exist for
/// logging and metrics labels. `Clone` is required because one failure is
/// handed to every caller waiting on the same fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("token request failed: {0}")]
    Transport(String),

    #[error("token endpoint returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::MissingConfig(_) => "config",
            FetchError::Transport(_) => "transport",
            FetchError::UpstreamStatus { .. } => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Transport(format!("timed out: {}", err))
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
