pub mod plots;

pub use plots::{plot_roc_curve, select_backend, PlotEmitter, RenderMode};
