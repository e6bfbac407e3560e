pub type SketchResult<T> = Result<T, SketchError>;

#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    #[error("unknown parameter '{key}' for sketch '{sketch}'")]
    UnknownParam { sketch: String, key: String },

    #[error("invalid value for '{key}': {reason}")]
    InvalidParam { key: String, reason: String },

    #[error("unknown sketch '{0}'")]
    UnknownSketch(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("display error: {0}")]
    Display(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SketchError {
    pub fn unknown_param(sketch: &str, key: &str) -> Self {
        Self::UnknownParam {
            sketch: sketch.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
