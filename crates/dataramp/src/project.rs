//! Standard data-science project scaffolding.
//!
//! `create_project` lays out the directory tree below and writes the
//! `.dataramprc` sidecar that [`crate::paths::PathResolver`] reads later on.
//!
//! ```text
//! <name>/
//!   .dataramprc
//!   README.txt
//!   datasets/{processed,raw}
//!   outputs/models
//!   src/scripts/{ingest,preparation,modeling,test}
//!   src/notebooks
//! ```
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};

const README_TEXT: &str = "Creates a standard data science project directory structure.";

const SCRIPT_DIRS: [&str; 4] = ["ingest", "preparation", "modeling", "test"];

/// Every directory of the standard layout, parents first.
pub fn project_directories(config: &ProjectConfig) -> Vec<PathBuf> {
    let src_path = config.base_path.join("src");
    let scripts_path = src_path.join("scripts");

    let mut dirs = vec![
        config.base_path.clone(),
        config.data_path.clone(),
        config.processed_data_path.clone(),
        config.raw_data_path.clone(),
        config.output_path.clone(),
        config.models_path.clone(),
        src_path.clone(),
        scripts_path.clone(),
    ];
    dirs.extend(SCRIPT_DIRS.iter().map(|d| scripts_path.join(d)));
    dirs.push(src_path.join("notebooks"));
    dirs
}

/// Create the project `project_name` inside `parent_dir`.
///
/// `parent_dir` is created if missing and canonicalised, so the sidecar
/// always records absolute paths. Existing directories are reused; the
/// sidecar and README are rewritten.
pub fn create_project(parent_dir: &Path, project_name: &str) -> Result<ProjectConfig> {
    validate_project_name(project_name)?;

    fs::create_dir_all(parent_dir)?;
    let parent_dir = fs::canonicalize(parent_dir)?;
    let config = ProjectConfig::for_base(&parent_dir.join(project_name.trim()));

    for dir in project_directories(&config) {
        fs::create_dir_all(&dir)?;
    }

    config.write(&config.sidecar_path())?;
    fs::write(config.base_path.join("README.txt"), README_TEXT)?;

    log::info!("Project created successfully in {}", config.base_path.display());
    Ok(config)
}

fn validate_project_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArguments(
            "project name must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidArguments(format!(
            "project name `{}` must be a single directory name",
            name
        ))),
    }
}
