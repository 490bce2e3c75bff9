pub mod classifier_trait;

pub use classifier_trait::{Capability, Classifier, ProbabilityScorer};
