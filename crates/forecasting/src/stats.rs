//! Small deterministic numeric helpers shared by the models and analyzers.

pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population variance (n).
pub(crate) fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1), deterministic.
pub(crate) fn stddev_sample(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs
        .iter()
        .map(|x| {
            let d = x - m;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

/// Least-squares line through `(i, xs[i])`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation between index and value; 0 when either side is constant.
    pub r: f64,
}

impl LineFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub(crate) fn fit_line(xs: &[f64]) -> LineFit {
    let n = xs.len();
    if n == 0 {
        return LineFit { slope: 0.0, intercept: 0.0, r: 0.0 };
    }
    if n == 1 {
        return LineFit { slope: 0.0, intercept: xs[0], r: 0.0 };
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(xs);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, y) in xs.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let r = if syy <= f64::EPSILON { 0.0 } else { sxy / (sxx * syy).sqrt() };

    LineFit {
        slope,
        intercept: y_mean - slope * x_mean,
        r,
    }
}

/// Autocorrelation at `lag`, normalized by the lag-0 autocovariance.
pub(crate) fn autocorrelation(xs: &[f64], lag: usize) -> f64 {
    let n = xs.len();
    if lag >= n {
        return 0.0;
    }
    let m = mean(xs);
    let denom: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let num: f64 = (0..n - lag).map(|i| (xs[i] - m) * (xs[i + lag] - m)).sum();
    num / denom
}

pub(crate) fn difference(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

pub(crate) fn clamp_non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 { x } else { 0.0 }
}
