/// Result alias that carries the custom [`SurfaceError`] type.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Free-form failure, mostly raised by subscribers and collaborators that
    /// have no better category to report.
    #[error("{0}")]
    Message(String),
    /// A color specification string could not be parsed.
    #[error("invalid color spec `{spec}`: {reason}")]
    ColorParse { spec: String, reason: String },
    /// The collaborator cannot display the requested color/flag combination.
    #[error("unsupported color `{spec}`: {reason}")]
    UnsupportedColor { spec: String, reason: String },
    /// A control or surface was constructed with inconsistent options.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A virtual fader received an address that is not one of its positions.
    #[error("{address} is not a position of `{control}`")]
    UnknownPosition { control: String, address: String },
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around layout (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl SurfaceError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn parse(spec: &str, reason: impl Into<String>) -> Self {
        Self::ColorParse {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(spec: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedColor {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for SurfaceError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SurfaceError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
