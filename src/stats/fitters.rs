// fitters.rs - Candidate degree-distribution models

use super::{ModelFit, NEGATIVE_BINOMIAL, WARING};

/// Trait for pluggable degree-distribution models
pub trait DegreeFitter {
    /// Model name as reported in fits and tables
    fn name(&self) -> &'static str;

    /// Fit the model to an observed degree histogram (index k = degree k+1)
    fn fit(&self, degrees: &[usize]) -> ModelFit;
}

/// All models fitted by default, Waring first
pub fn default_fitters() -> Vec<Box<dyn DegreeFitter>> {
    vec![Box::new(WaringFitter), Box::new(NegativeBinomialFitter)]
}

fn histogram_moments(degrees: &[usize]) -> Option<(f64, f64, f64)> {
    let n: usize = degrees.iter().sum();
    if n == 0 {
        return None;
    }
    let n_f = n as f64;
    let mean = degrees
        .iter()
        .enumerate()
        .map(|(k, &count)| (k + 1) as f64 * count as f64)
        .sum::<f64>()
        / n_f;
    let variance = degrees
        .iter()
        .enumerate()
        .map(|(k, &count)| {
            let d = (k + 1) as f64 - mean;
            d * d * count as f64
        })
        .sum::<f64>()
        / n_f;
    Some((n_f, mean, variance))
}

fn log_likelihood(degrees: &[usize], pmf: &[f64]) -> f64 {
    degrees
        .iter()
        .zip(pmf)
        .filter(|(&count, &p)| count > 0 && p > 0.0)
        .map(|(&count, &p)| count as f64 * p.ln())
        .sum()
}

/// Waring (Yule-Simon) model, fitted by the method of moments
///
/// The mean of the distribution is rho / (rho - 1) for rho > 1, giving
/// rho_hat = mean / (mean - 1); the probability vector follows from the
/// recurrence P(1) = rho / (rho + 1), P(k+1) = P(k) * k / (k + rho + 1).
pub struct WaringFitter;

impl DegreeFitter for WaringFitter {
    fn name(&self) -> &'static str {
        WARING
    }

    fn fit(&self, degrees: &[usize]) -> ModelFit {
        let Some((n, mean, variance)) = histogram_moments(degrees) else {
            return ModelFit::default();
        };
        if mean <= 1.0 {
            // Degenerate histogram (all nodes of degree 1): rho unbounded
            return ModelFit::default();
        }

        let rho = mean / (mean - 1.0);

        // Delta-method standard error of rho_hat = m / (m - 1)
        let se_mean = (variance / n).sqrt();
        let se_rho = se_mean / ((mean - 1.0) * (mean - 1.0));
        let rho_ci = (rho - 1.96 * se_rho, rho + 1.96 * se_rho);

        let mut fitted = Vec::with_capacity(degrees.len());
        let mut p = rho / (rho + 1.0);
        for k in 1..=degrees.len() {
            fitted.push(p);
            p *= k as f64 / (k as f64 + rho + 1.0);
        }

        let bic = -2.0 * log_likelihood(degrees, &fitted) + n.ln();

        ModelFit {
            rho: Some(rho),
            rho_ci: Some(rho_ci),
            bic: Some(bic),
            p_value: None,
            fitted: Some(fitted),
        }
    }
}

/// Negative-Binomial model on shifted degrees, fitted by the method of moments
///
/// Requires over-dispersion (variance > mean of the shifted counts); no rho or
/// confidence interval is defined for this model.
pub struct NegativeBinomialFitter;

impl DegreeFitter for NegativeBinomialFitter {
    fn name(&self) -> &'static str {
        NEGATIVE_BINOMIAL
    }

    fn fit(&self, degrees: &[usize]) -> ModelFit {
        let Some((n, mean, variance)) = histogram_moments(degrees) else {
            return ModelFit::default();
        };

        // Shift support to j = degree - 1 >= 0
        let mu = mean - 1.0;
        if mu <= 0.0 || variance <= mu {
            return ModelFit::default();
        }

        let r = mu * mu / (variance - mu);
        let p = mu / variance;

        let mut fitted = Vec::with_capacity(degrees.len());
        let mut prob = p.powf(r);
        for j in 0..degrees.len() {
            fitted.push(prob);
            prob *= (j as f64 + r) / (j as f64 + 1.0) * (1.0 - p);
        }

        let bic = -2.0 * log_likelihood(degrees, &fitted) + 2.0 * n.ln();

        ModelFit {
            rho: None,
            rho_ci: None,
            bic: Some(bic),
            p_value: None,
            fitted: Some(fitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waring_moment_estimate() {
        // 10 nodes of degree 1, 5 of degree 2, 5 of degree 3: mean = 1.75
        let fit = WaringFitter.fit(&[10, 5, 5]);
        let rho = fit.rho.unwrap();
        assert!((rho - 1.75 / 0.75).abs() < 1e-9);
        let (lo, hi) = fit.rho_ci.unwrap();
        assert!(lo < rho && rho < hi);
        assert!(fit.bic.is_some());
        assert!(fit.p_value.is_none());
    }

    #[test]
    fn test_waring_fitted_vector_decreases() {
        let fit = WaringFitter.fit(&[50, 20, 10, 5, 2, 1]);
        let fitted = fit.fitted.unwrap();
        assert_eq!(fitted.len(), 6);
        for pair in fitted.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        let total: f64 = fitted.iter().sum();
        assert!(total > 0.0 && total <= 1.0 + 1e-9);
    }

    #[test]
    fn test_waring_degenerate_histogram() {
        // All degree-1 nodes: no finite moment estimate
        let fit = WaringFitter.fit(&[25]);
        assert!(fit.rho.is_none());
        assert!(fit.fitted.is_none());

        let fit = WaringFitter.fit(&[]);
        assert!(fit.rho.is_none());
    }

    #[test]
    fn test_negative_binomial_requires_overdispersion() {
        // Heavy tail: over-dispersed, fit defined
        let fit = NegativeBinomialFitter.fit(&[40, 10, 5, 3, 2, 2, 1]);
        assert!(fit.bic.is_some());
        assert!(fit.rho.is_none());
        let fitted = fit.fitted.unwrap();
        let total: f64 = fitted.iter().sum();
        assert!(total > 0.0 && total <= 1.0 + 1e-9);

        // Everyone degree 2: zero variance on the shifted counts
        let fit = NegativeBinomialFitter.fit(&[0, 10]);
        assert!(fit.bic.is_none());
    }
}
