//! Best-effort model saving into the project's models folder.
//!
//! Argument errors (no model, unknown codec, empty name) are returned as
//! `Err`. Everything that goes wrong once writing starts is logged and
//! reported through [`SaveOutcome::Failed`] instead.
use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::PathKey;
use crate::error::{Error, Result};
use crate::io::codec::Codec;
use crate::paths::PathResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    PermissionDenied(String),
    Unexpected(String),
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveFailure::PermissionDenied(msg) => write!(f, "permission denied: {}", msg),
            SaveFailure::Unexpected(msg) => f.write_str(msg),
        }
    }
}

/// What happened to a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written into the project's models folder.
    Saved(PathBuf),
    /// No usable project config; written into the working directory.
    FallbackSaved(PathBuf),
    /// Nothing usable was written. `path` is the attempted destination, if
    /// one was determined.
    Failed {
        path: Option<PathBuf>,
        reason: SaveFailure,
    },
}

impl SaveOutcome {
    pub fn written_path(&self) -> Option<&Path> {
        match self {
            SaveOutcome::Saved(path) | SaveOutcome::FallbackSaved(path) => Some(path),
            SaveOutcome::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.written_path().is_some()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SaveOutcome::FallbackSaved(_))
    }

    /// Turn a failed save into an error for callers that need a hard failure.
    pub fn into_result(self) -> Result<PathBuf> {
        match self {
            SaveOutcome::Saved(path) | SaveOutcome::FallbackSaved(path) => Ok(path),
            SaveOutcome::Failed { path, reason } => Err(Error::Persistence {
                path: path.unwrap_or_default(),
                reason: reason.to_string(),
            }),
        }
    }
}

/// Saves models under the `models_path` of the project found from
/// `working_dir`, or into `working_dir` itself when there is none.
#[derive(Debug, Clone)]
pub struct ModelSaver {
    working_dir: PathBuf,
    resolver: PathResolver,
}

impl Default for ModelSaver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSaver {
    /// Saver rooted at the current working directory.
    pub fn new() -> Self {
        Self::in_dir(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn in_dir(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            resolver: PathResolver::new(&working_dir),
            working_dir,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Save `model` as `{models_path}/{name}.{codec}`.
    pub fn save<M>(&self, model: Option<&M>, name: &str, codec: Codec) -> Result<SaveOutcome>
    where
        M: Serialize + ?Sized,
    {
        let model = model.ok_or(Error::MissingModel)?;
        if name.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "model name must not be empty".to_string(),
            ));
        }
        let file_name = codec.file_name(name);

        let outcome = match self.resolver.resolve_key(PathKey::Models) {
            Ok(models_dir) if models_dir.is_dir() => {
                self.write(model, codec, models_dir.join(&file_name), false)
            }
            Ok(models_dir) => {
                log::warn!(
                    "Models folder {} does not exist.",
                    models_dir.display()
                );
                self.write_fallback(model, codec, &file_name)
            }
            Err(Error::ConfigurationNotFound(reason)) => {
                log::debug!("{}", reason);
                self.write_fallback(model, codec, &file_name)
            }
            Err(err) => {
                log::error!("Failed to save model due to {}", err);
                SaveOutcome::Failed {
                    path: None,
                    reason: SaveFailure::Unexpected(err.to_string()),
                }
            }
        };
        Ok(outcome)
    }

    /// Like [`ModelSaver::save`], with the codec given by name.
    pub fn save_named<M>(&self, model: Option<&M>, name: &str, codec: &str) -> Result<SaveOutcome>
    where
        M: Serialize + ?Sized,
    {
        if model.is_none() {
            return Err(Error::MissingModel);
        }
        self.save(model, name, codec.parse()?)
    }

    fn write_fallback<M>(&self, model: &M, codec: Codec, file_name: &str) -> SaveOutcome
    where
        M: Serialize + ?Sized,
    {
        let path = self.working_dir.join(file_name);
        log::warn!(
            "No project models folder found. Saving model to {}. It is recommended \
             that you start your project with dataramp's create_project.",
            path.display()
        );
        self.write(model, codec, path, true)
    }

    fn write<M>(&self, model: &M, codec: Codec, path: PathBuf, fallback: bool) -> SaveOutcome
    where
        M: Serialize + ?Sized,
    {
        match codec.dump(model, &path) {
            Ok(()) => {
                log::info!("Model saved successfully to {}", path.display());
                if fallback {
                    SaveOutcome::FallbackSaved(path)
                } else {
                    SaveOutcome::Saved(path)
                }
            }
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::PermissionDenied => {
                log::error!(
                    "Permission error while saving model to {}. Check file permissions. {}",
                    path.display(),
                    err
                );
                SaveOutcome::Failed {
                    path: Some(path),
                    reason: SaveFailure::PermissionDenied(err.to_string()),
                }
            }
            Err(err) => {
                log::error!("Failed to save model to {} due to {}", path.display(), err);
                SaveOutcome::Failed {
                    path: Some(path),
                    reason: SaveFailure::Unexpected(err.to_string()),
                }
            }
        }
    }
}

/// Save `model` from the current working directory; see [`ModelSaver`].
pub fn model_save<M>(model: Option<&M>, name: &str, codec: &str) -> Result<SaveOutcome>
where
    M: Serialize + ?Sized,
{
    ModelSaver::new().save_named(model, name, codec)
}

/// Load an artifact, picking the codec from its extension.
pub fn load_model<M: DeserializeOwned>(path: &Path) -> Result<M> {
    Codec::from_path(path)?.load(path)
}
