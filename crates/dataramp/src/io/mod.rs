//! Model artifact persistence.
pub mod codec;
pub mod saver;

pub use codec::Codec;
pub use saver::{load_model, model_save, ModelSaver, SaveFailure, SaveOutcome};
