//! ARIMA(p, d, q) with a bounded AIC order search.
//!
//! Fitting model:
//! - Difference `d` times and remove the mean (the mean of the differenced
//!   series becomes the drift when `d > 0`).
//! - AR terms from the Yule-Walker equations (Levinson-Durbin).
//! - MA terms from the autocorrelation of the AR residuals.
//! - Conditional sum-of-squares recursion for one-step residuals.
//! - AIC = n·ln(RSS/n) + 2k with k = p + q + 1.
//!
//! The differencing order is chosen first: the series is differenced while
//! that lowers its variance, up to `max_d`. AIC is only comparable between
//! fits on the same differenced series, so the AIC search then runs over
//! `p` and `q` alone. The lowest AIC wins and ties keep the first candidate,
//! so the selection is deterministic.

use tracing::debug;

use crate::error::{ForecastError, ForecastResult};
use crate::models::{AccuracyMetrics, ErrorSummary, ForecastModel, ModelOutput, bounded_output, interval_z};
use crate::stats::{autocorrelation, difference, mean, variance};

/// MA coefficients are kept strictly inside the invertible region.
const MA_COEFFICIENT_LIMIT: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct ArimaModel {
    max_p: usize,
    max_d: usize,
    max_q: usize,
    interval_level: f64,
}

impl ArimaModel {
    pub fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_p,
            max_d,
            max_q,
            interval_level: 0.95,
        }
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }

    /// Smallest `d` after which another difference no longer lowers variance.
    fn select_differencing(&self, series: &[f64]) -> usize {
        let mut d = 0;
        let mut current = series.to_vec();
        while d < self.max_d && series.len() >= ArimaFit::min_points(0, d + 1, 0) {
            let next = difference(&current);
            if variance(&next) >= variance(&current) {
                break;
            }
            current = next;
            d += 1;
        }
        d
    }

    /// Fix `d`, then fit every `(p, q)` in the search box and keep the lowest AIC.
    fn select(&self, series: &[f64]) -> Option<ArimaFit> {
        let d = self.select_differencing(series);
        let mut best: Option<ArimaFit> = None;
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                let Some(fit) = ArimaFit::fit(series, p, d, q) else {
                    continue;
                };
                if best.as_ref().is_none_or(|b| fit.aic < b.aic) {
                    best = Some(fit);
                }
            }
        }
        best
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::new(2, 1, 1)
    }
}

impl ForecastModel for ArimaModel {
    fn fit_and_predict(&self, series: &[f64], periods: usize) -> ForecastResult<ModelOutput> {
        let fit = self.select(series).ok_or_else(|| {
            ForecastError::insufficient(ArimaFit::min_points(0, 0, 0), series.len())
        })?;

        debug!(
            p = fit.p,
            d = fit.d,
            q = fit.q,
            aic = fit.aic,
            "selected ARIMA order"
        );

        let raw = fit.forecast(series, periods);
        let z = interval_z(self.interval_level)?;
        let std_errors = fit.standard_errors(periods);

        let summary = ErrorSummary::from_residuals(&fit.residuals, series);
        let mut metrics = AccuracyMetrics::new();
        summary.write_into(&mut metrics);
        metrics.insert("aic", fit.aic);
        metrics.insert("p", fit.p as f64);
        metrics.insert("d", fit.d as f64);
        metrics.insert("q", fit.q as f64);

        Ok(bounded_output(raw, &std_errors, z, metrics))
    }
}

/// One fitted candidate.
#[derive(Debug, Clone)]
struct ArimaFit {
    p: usize,
    d: usize,
    q: usize,
    /// Mean of the differenced series.
    mu: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Demeaned differenced series.
    w: Vec<f64>,
    /// CSS errors aligned with `w` (zero before the recursion starts).
    errors: Vec<f64>,
    /// One-step residuals used for RSS/AIC (recursion warm-up excluded).
    residuals: Vec<f64>,
    sigma: f64,
    aic: f64,
}

impl ArimaFit {
    fn min_points(p: usize, d: usize, q: usize) -> usize {
        p + d + q + 3
    }

    fn fit(series: &[f64], p: usize, d: usize, q: usize) -> Option<Self> {
        if series.len() < Self::min_points(p, d, q) {
            return None;
        }

        let mut z = series.to_vec();
        for _ in 0..d {
            z = difference(&z);
        }

        let mu = mean(&z);
        let w: Vec<f64> = z.iter().map(|v| v - mu).collect();

        let ar = if p > 0 { yule_walker(&w, p) } else { Vec::new() };

        let ma = if q > 0 {
            let ar_residuals = ar_residuals(&w, &ar);
            (1..=q)
                .map(|k| {
                    autocorrelation(&ar_residuals, k).clamp(-MA_COEFFICIENT_LIMIT, MA_COEFFICIENT_LIMIT)
                })
                .collect()
        } else {
            Vec::new()
        };

        let start = p.max(q);
        let mut errors = vec![0.0; w.len()];
        for i in start..w.len() {
            let pred = arma_step(&w, &errors, &ar, &ma, i);
            errors[i] = w[i] - pred;
        }

        let residuals: Vec<f64> = errors[start..].to_vec();
        let n = residuals.len();
        if n == 0 {
            return None;
        }
        let rss: f64 = residuals.iter().map(|e| e * e).sum();
        let k = (p + q + 1) as f64;
        let aic = n as f64 * (rss / n as f64).max(1e-12).ln() + 2.0 * k;
        let sigma = (rss / n as f64).sqrt();

        if !aic.is_finite() {
            return None;
        }

        Some(Self {
            p,
            d,
            q,
            mu,
            ar,
            ma,
            w,
            errors,
            residuals,
            sigma,
            aic,
        })
    }

    /// Recursive forecast, integrated back to the original scale.
    fn forecast(&self, series: &[f64], periods: usize) -> Vec<f64> {
        let mut w = self.w.clone();
        let mut errors = self.errors.clone();
        let mut ahead = Vec::with_capacity(periods);

        for _ in 0..periods {
            let i = w.len();
            w.push(0.0);
            // Future shocks have expectation zero.
            errors.push(0.0);
            let next = arma_step(&w, &errors, &self.ar, &self.ma, i);
            w[i] = next;
            ahead.push(next + self.mu);
        }

        integrate(series, self.d, ahead)
    }

    /// Forecast standard error per horizon from the psi weights of the full
    /// (differenced) model.
    fn standard_errors(&self, periods: usize) -> Vec<f64> {
        let phi = integrated_ar_polynomial(&self.ar, self.d);

        let mut psi = vec![0.0; periods];
        if periods > 0 {
            psi[0] = 1.0;
        }
        for j in 1..periods {
            let mut v = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for (i, coef) in phi.iter().enumerate() {
                let lag = i + 1;
                if lag <= j {
                    v += coef * psi[j - lag];
                }
            }
            psi[j] = v;
        }

        let mut cumulative = 0.0;
        psi.iter()
            .map(|w| {
                cumulative += w * w;
                self.sigma * cumulative.sqrt()
            })
            .collect()
    }
}

/// One-step ARMA prediction for index `i` from strictly earlier values.
fn arma_step(w: &[f64], errors: &[f64], ar: &[f64], ma: &[f64], i: usize) -> f64 {
    let mut pred = 0.0;
    for (j, coef) in ar.iter().enumerate() {
        if i > j {
            pred += coef * w[i - j - 1];
        }
    }
    for (j, coef) in ma.iter().enumerate() {
        if i > j {
            pred += coef * errors[i - j - 1];
        }
    }
    pred
}

fn ar_residuals(w: &[f64], ar: &[f64]) -> Vec<f64> {
    let p = ar.len();
    (p..w.len())
        .map(|i| w[i] - arma_step(w, &[], ar, &[], i))
        .collect()
}

/// Solve the Yule-Walker equations with the Levinson-Durbin recursion.
fn yule_walker(w: &[f64], p: usize) -> Vec<f64> {
    let mut acf = vec![1.0; p + 1];
    for (k, slot) in acf.iter_mut().enumerate().skip(1) {
        *slot = autocorrelation(w, k);
    }

    let mut phi = vec![vec![0.0; p + 1]; p + 1];
    let mut sigma = vec![0.0; p + 1];
    sigma[0] = acf[0];

    for k in 1..=p {
        if sigma[k - 1].abs() <= f64::EPSILON {
            break;
        }
        let mut num = acf[k];
        for j in 1..k {
            num -= phi[k - 1][j] * acf[k - j];
        }
        phi[k][k] = num / sigma[k - 1];

        for j in 1..k {
            phi[k][j] = phi[k - 1][j] - phi[k][k] * phi[k - 1][k - j];
        }

        sigma[k] = sigma[k - 1] * (1.0 - phi[k][k].powi(2));
    }

    (1..=p).map(|j| phi[p][j]).collect()
}

/// Coefficients `c` of `(1 - Σ ar_i B^i)(1 - B)^d = 1 - Σ c_i B^i`.
fn integrated_ar_polynomial(ar: &[f64], d: usize) -> Vec<f64> {
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|c| -c)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    poly.iter().skip(1).map(|c| -c).collect()
}

/// Undo `d` rounds of differencing for values that continue `series`.
fn integrate(series: &[f64], d: usize, ahead: Vec<f64>) -> Vec<f64> {
    // levels[k] is the series differenced k times.
    let mut levels = vec![series.to_vec()];
    for k in 0..d {
        let next = difference(&levels[k]);
        levels.push(next);
    }

    let mut out = ahead;
    for k in (0..d).rev() {
        let mut last = levels[k].last().copied().unwrap_or(0.0);
        for v in out.iter_mut() {
            last += *v;
            *v = last;
        }
    }
    out
}
