use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the JSON sidecar written at the root of every scaffolded project.
pub const SIDECAR_FILE_NAME: &str = ".dataramprc";

const DEFAULT_DESCRIPTION: &str = "Holds the project config settings";

/// Persisted project layout, written once by [`crate::project::create_project`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default = "default_description")]
    pub description: String,
    pub base_path: PathBuf,
    pub data_path: PathBuf,
    pub processed_data_path: PathBuf,
    pub raw_data_path: PathBuf,
    pub output_path: PathBuf,
    pub models_path: PathBuf,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl ProjectConfig {
    /// Standard layout rooted at `base_path`.
    pub fn for_base(base_path: &Path) -> Self {
        let data_path = base_path.join("datasets");
        let output_path = base_path.join("outputs");
        Self {
            description: default_description(),
            base_path: base_path.to_path_buf(),
            processed_data_path: data_path.join("processed"),
            raw_data_path: data_path.join("raw"),
            data_path,
            models_path: output_path.join("models"),
            output_path,
        }
    }

    pub fn path(&self, key: PathKey) -> &Path {
        match key {
            PathKey::Base => &self.base_path,
            PathKey::Data => &self.data_path,
            PathKey::ProcessedData => &self.processed_data_path,
            PathKey::RawData => &self.raw_data_path,
            PathKey::Output => &self.output_path,
            PathKey::Models => &self.models_path,
        }
    }

    pub fn sidecar_path(&self) -> PathBuf {
        self.base_path.join(SIDECAR_FILE_NAME)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the config as pretty JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Logical names under which project paths are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKey {
    Base,
    Data,
    ProcessedData,
    RawData,
    Output,
    Models,
}

impl PathKey {
    pub const ALL: [PathKey; 6] = [
        PathKey::Base,
        PathKey::Data,
        PathKey::ProcessedData,
        PathKey::RawData,
        PathKey::Output,
        PathKey::Models,
    ];

    /// Short name accepted on the command line (`modelpath`, `datapath`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            PathKey::Base => "basepath",
            PathKey::Data => "datapath",
            PathKey::ProcessedData => "processeddatapath",
            PathKey::RawData => "rawdatapath",
            PathKey::Output => "outputpath",
            PathKey::Models => "modelpath",
        }
    }

    /// Field name inside the sidecar JSON document.
    pub fn config_field(&self) -> &'static str {
        match self {
            PathKey::Base => "base_path",
            PathKey::Data => "data_path",
            PathKey::ProcessedData => "processed_data_path",
            PathKey::RawData => "raw_data_path",
            PathKey::Output => "output_path",
            PathKey::Models => "models_path",
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PathKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        PathKey::ALL
            .into_iter()
            .find(|k| k.name() == key || k.config_field() == key)
            .ok_or_else(|| {
                Error::ConfigurationNotFound(format!(
                    "unknown path key `{}`, expected one of: {}",
                    s,
                    PathKey::ALL.map(|k| k.name()).join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_base_path() {
        let cfg = ProjectConfig::for_base(Path::new("/work/churn"));
        assert_eq!(cfg.models_path, PathBuf::from("/work/churn/outputs/models"));
        assert_eq!(
            cfg.processed_data_path,
            PathBuf::from("/work/churn/datasets/processed")
        );
        assert_eq!(cfg.sidecar_path(), PathBuf::from("/work/churn/.dataramprc"));
    }

    #[test]
    fn path_key_accepts_short_and_field_names() {
        assert_eq!("modelpath".parse::<PathKey>().unwrap(), PathKey::Models);
        assert_eq!("models_path".parse::<PathKey>().unwrap(), PathKey::Models);
        assert_eq!("RawDataPath".parse::<PathKey>().unwrap(), PathKey::RawData);
    }

    #[test]
    fn unknown_path_key_is_configuration_error() {
        let err = "weights".parse::<PathKey>().unwrap_err();
        assert!(matches!(err, Error::ConfigurationNotFound(_)));
    }

    #[test]
    fn sidecar_json_uses_fixed_keys() {
        let cfg = ProjectConfig::for_base(Path::new("/p"));
        let json = serde_json::to_value(&cfg).unwrap();
        for key in PathKey::ALL {
            assert!(json.get(key.config_field()).is_some(), "missing {}", key);
        }
        assert_eq!(json["description"], DEFAULT_DESCRIPTION);
    }
}
