//! Resolution of logical project paths through the `.dataramprc` sidecar.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{PathKey, ProjectConfig, SIDECAR_FILE_NAME};
use crate::error::{Error, Result};

/// Looks up project paths from the sidecar nearest to `start_dir`.
///
/// The sidecar is searched in `start_dir` and then in each of its ancestors.
#[derive(Debug, Clone)]
pub struct PathResolver {
    start_dir: PathBuf,
}

impl PathResolver {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }

    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(env::current_dir()?))
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    /// Location of the nearest sidecar, if any.
    pub fn find_sidecar(&self) -> Option<PathBuf> {
        self.start_dir
            .ancestors()
            .map(|dir| dir.join(SIDECAR_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Resolve a logical key such as `"modelpath"` to an absolute path.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        self.resolve_key(key.parse()?)
    }

    pub fn resolve_key(&self, key: PathKey) -> Result<PathBuf> {
        let sidecar = self.require_sidecar()?;
        let contents = fs::read_to_string(&sidecar)?;
        let document: Map<String, Value> = serde_json::from_str(&contents)?;

        match document.get(key.config_field()).and_then(Value::as_str) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Err(Error::ConfigurationNotFound(format!(
                "key `{}` is not set in {}",
                key.config_field(),
                sidecar.display()
            ))),
        }
    }

    /// Load the full typed project config.
    pub fn load_config(&self) -> Result<ProjectConfig> {
        ProjectConfig::load(&self.require_sidecar()?)
    }

    fn require_sidecar(&self) -> Result<PathBuf> {
        self.find_sidecar().ok_or_else(|| {
            Error::ConfigurationNotFound(format!(
                "no {} found in {} or any parent directory",
                SIDECAR_FILE_NAME,
                self.start_dir.display()
            ))
        })
    }
}
