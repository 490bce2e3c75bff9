use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ndarray::{Array1, Array2};
use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};
use serde::{Deserialize, Serialize};

use crate::data_handling::binary_positive_label;
use crate::error::{Error, Result};
use crate::metrics::{auc, roc_curve, RocCurve};
use crate::models::{Capability, Classifier};

/// How plots are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// A viewer (browser) may be opened when showing is requested.
    Interactive,
    /// Never open a viewer.
    Headless,
}

impl RenderMode {
    /// Interactive on macOS, headless everywhere else.
    pub fn for_host() -> Self {
        if cfg!(target_os = "macos") {
            RenderMode::Interactive
        } else {
            RenderMode::Headless
        }
    }
}

static RENDER_MODE: OnceLock<RenderMode> = OnceLock::new();

/// Select the process-wide render mode. The first call decides, later calls
/// return the stored mode.
pub fn select_backend() -> RenderMode {
    *RENDER_MODE.get_or_init(|| {
        let mode = RenderMode::for_host();
        if mode == RenderMode::Headless {
            log::info!("Switched plotting backend to headless rendering.");
        }
        mode
    })
}

/// Draws the ROC curve of estimators that can score probabilities.
///
/// The plot stays in memory unless an HTML output is set or showing is
/// requested in interactive mode.
#[derive(Debug, Clone)]
pub struct PlotEmitter {
    mode: RenderMode,
    output: Option<PathBuf>,
    show: bool,
}

impl PlotEmitter {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            output: None,
            show: false,
        }
    }

    /// Emitter using the process-wide mode from [`select_backend`].
    pub fn from_backend() -> Self {
        Self::new(select_backend())
    }

    /// HTML file the plot is written to.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Open the plot in a viewer; ignored in headless mode.
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn shows(&self) -> bool {
        self.show && self.mode == RenderMode::Interactive
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Plot the ROC curve on the validation set and return its AUC.
    ///
    /// Estimators without probability scoring are skipped: `Ok(None)`.
    pub fn maybe_plot(
        &self,
        estimator: &dyn Classifier,
        x_val: &Array2<f64>,
        y_val: &Array1<i32>,
    ) -> Result<Option<f64>> {
        let scorer = match estimator.capability() {
            Capability::Scorable(scorer) => scorer,
            Capability::NonScorable => {
                log::debug!(
                    "{} does not score probabilities, skipping ROC plot",
                    estimator.name()
                );
                return Ok(None);
            }
        };

        let y_proba = scorer
            .predict_proba(x_val)
            .map_err(|e| Error::estimator(estimator.name(), e))?;
        if y_proba.len() != y_val.len() {
            return Err(Error::Estimator {
                name: estimator.name().to_string(),
                message: format!(
                    "predict_proba returned {} scores for {} samples",
                    y_proba.len(),
                    y_val.len()
                ),
            });
        }

        let pos_label = binary_positive_label(y_val)?;
        let curve = roc_curve(y_val, &y_proba, pos_label)?;
        let roc_auc = auc(&curve.fpr, &curve.tpr);

        self.render(&plot_roc_curve(&curve, roc_auc))?;
        Ok(Some(roc_auc))
    }

    fn render(&self, plot: &Plot) -> Result<()> {
        if let Some(path) = &self.output {
            fs::write(path, plot.to_html())?;
            log::info!("ROC curve written to {}", path.display());
        }
        if self.shows() {
            plot.show();
        } else if self.show {
            log::debug!("Headless rendering, not opening a viewer for the ROC curve");
        }
        Ok(())
    }
}

/// ROC curve with the chance diagonal for reference.
pub fn plot_roc_curve(curve: &RocCurve, roc_auc: f64) -> Plot {
    let label = format!("ROC curve (AUC = {:.2})", roc_auc);
    let roc = Scatter::new(curve.fpr.clone(), curve.tpr.clone())
        .mode(Mode::Lines)
        .name(&label)
        .line(Line::new().color("darkorange").width(2.0));

    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .show_legend(false)
        .line(Line::new().color("navy").dash(DashType::Dash));

    let mut plot = Plot::new();
    plot.add_trace(roc);
    plot.add_trace(chance);
    plot.set_layout(
        Layout::new()
            .title("Receiver Operating Characteristic Curve")
            .x_axis(Axis::new().title("False Positive Rate").range(vec![0.0, 1.0]))
            .y_axis(Axis::new().title("True Positive Rate").range(vec![0.0, 1.05])),
    );
    plot
}
