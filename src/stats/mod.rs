// mod.rs - Degree-distribution fitting and edge-support statistics

pub mod fitters;
pub mod support;

pub use fitters::{default_fitters, DegreeFitter, NegativeBinomialFitter, WaringFitter};
pub use support::{AlignmentSupportTester, SequenceTriangle, SupportTester, TriangleVerdict};

use serde::Serialize;
use std::collections::BTreeMap;

pub const WARING: &str = "Waring";
pub const NEGATIVE_BINOMIAL: &str = "Negative Binomial";

/// Fit-quality statistics for a single candidate model
///
/// Fields a model does not define stay `None` and render as "N/A".
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelFit {
    pub rho: Option<f64>,
    pub rho_ci: Option<(f64, f64)>,
    pub bic: Option<f64>,
    pub p_value: Option<f64>,
    pub fitted: Option<Vec<f64>>,
}

/// Degree histogram plus per-model fits and the designated best model
#[derive(Debug, Clone, Serialize)]
pub struct DegreeFit {
    /// Observed count of nodes with degree k+1 at index k
    pub degrees: Vec<usize>,
    pub models: BTreeMap<String, ModelFit>,
    pub best: String,
}

impl DegreeFit {
    /// Fit every registered model to a degree histogram and pick the best by BIC
    pub fn from_histogram(degrees: Vec<usize>) -> Self {
        let mut models = BTreeMap::new();
        for fitter in default_fitters() {
            models.insert(fitter.name().to_string(), fitter.fit(&degrees));
        }

        let best = models
            .iter()
            .filter_map(|(name, fit)| fit.bic.map(|bic| (name.clone(), bic)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name)
            .unwrap_or_else(|| WARING.to_string());

        DegreeFit { degrees, models, best }
    }

    pub fn best_fit(&self) -> &ModelFit {
        &self.models[&self.best]
    }

    pub fn model(&self, name: &str) -> Option<&ModelFit> {
        self.models.get(name)
    }

    /// rho of the best model, zero when the model does not estimate one
    pub fn best_rho(&self) -> f64 {
        self.best_fit().rho.unwrap_or(0.0)
    }

    /// Confidence interval of the best model, zero-filled when absent
    pub fn best_rho_ci(&self) -> (f64, f64) {
        self.best_fit().rho_ci.unwrap_or((0.0, 0.0))
    }
}

/// Per-pass (and aggregated) edge-support counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportStats {
    pub triangles: usize,
    pub unsupported_edges: usize,
    pub removed_edges: usize,
}

impl SupportStats {
    pub fn accumulate(&mut self, other: &SupportStats) {
        self.triangles += other.triangles;
        self.unsupported_edges += other.unsupported_edges;
        self.removed_edges += other.removed_edges;
    }
}
