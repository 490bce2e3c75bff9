//! dataramp: helpers for everyday data-science projects.
//!
//! This crate scaffolds a standard project layout with a JSON sidecar
//! (`.dataramprc`), resolves logical project paths from that sidecar, trains
//! and evaluates caller-supplied classifiers (single split or stratified
//! cross-validation, with an optional ROC plot), and persists model artifacts
//! with a best-effort save policy.
//!
//! The estimator itself is opaque: anything implementing
//! [`models::Classifier`] can be evaluated, and anything implementing
//! `serde::Serialize` can be saved.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod paths;
pub mod project;
pub mod report;
pub mod trainer;

pub use config::{PathKey, ProjectConfig, SIDECAR_FILE_NAME};
pub use error::{Error, Result};
pub use io::{load_model, model_save, Codec, ModelSaver, SaveFailure, SaveOutcome};
pub use models::{Capability, Classifier, ProbabilityScorer};
pub use paths::PathResolver;
pub use project::create_project;
pub use trainer::{train_classifier, MetricsResult, SplitMetrics, TrainOptions};
