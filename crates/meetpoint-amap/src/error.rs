use meetpoint_core::ProviderError;
use thiserror::Error;

/// AMap `infocode`s that signal a rate limit rather than a bad request.
pub(crate) const RATE_LIMIT_INFOCODES: &[&str] = &["10004", "10014", "10019", "10020", "10021"];

/// Errors returned by the AMap client.
#[derive(Debug, Error)]
pub enum AmapError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope carried `"status": "0"`.
    #[error("AMap API error {infocode}: {info}")]
    Api { info: String, infocode: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field was present but could not be interpreted.
    #[error("unexpected AMap response for {context}: {detail}")]
    Malformed { context: String, detail: String },

    #[error("no route found")]
    NoRoute,

    #[error("no geocoding match for {0}")]
    NotFound(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl AmapError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api { infocode, .. } if RATE_LIMIT_INFOCODES.contains(&infocode.as_str()))
    }
}

impl From<AmapError> for ProviderError {
    fn from(err: AmapError) -> Self {
        match err {
            AmapError::Http(_) => Self::Unavailable(err.to_string()),
            AmapError::Api { .. } if err.is_rate_limited() => Self::Unavailable(err.to_string()),
            AmapError::Api { .. } | AmapError::Config(_) => Self::Rejected(err.to_string()),
            AmapError::Deserialize { .. } | AmapError::Malformed { .. } => {
                Self::Malformed(err.to_string())
            }
            AmapError::NoRoute => Self::NoRoute,
            AmapError::NotFound(query) => Self::NotFound(query),
        }
    }
}
