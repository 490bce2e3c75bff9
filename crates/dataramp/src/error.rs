use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the training, path resolution and persistence helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or partial inputs, e.g. validation features without labels.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// No `.dataramprc` sidecar was found, or it lacks the requested key.
    #[error("project configuration not found: {0}")]
    ConfigurationNotFound(String),

    #[error("codec `{requested}` not supported, supported codecs are: {supported:?}")]
    UnsupportedCodec {
        requested: String,
        supported: Vec<&'static str>,
    },

    #[error("expecting a model to save, got none")]
    MissingModel,

    /// A metric cannot be computed for the given labels (e.g. a fold without
    /// positive samples, or a ROC curve over a single class).
    #[error("undefined metric: {0}")]
    UndefinedMetric(String),

    /// The caller-supplied estimator reported a failure.
    #[error("estimator `{name}` failed: {message}")]
    Estimator { name: String, message: String },

    #[error("failed to save model to {}: {reason}", .path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn estimator(name: &str, err: anyhow::Error) -> Self {
        Error::Estimator {
            name: name.to_string(),
            message: format!("{:#}", err),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) => Error::Io(io),
            other => Error::Serialization(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
