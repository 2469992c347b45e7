//! Descriptive statistics over damage values.
//!
//! Every function ignores ordering of its input and returns `None` where the
//! statistic is undefined (empty input, or fewer than two values for a sample
//! standard deviation), so missing results propagate instead of turning into
//! misleading zeros.

/// Expresses `part` as a percentage of `total`. Returns 0.0 for an empty total.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Quantile `q` (0.0-1.0) using linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Five-number summary consumed by box plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumber {
    /// Labels of the summary values, in output order.
    pub const LABELS: [&'static str; 5] = ["min", "q1", "median", "q3", "max"];

    pub fn of(values: &[f64]) -> Option<Self> {
        Some(FiveNumber {
            min: min(values)?,
            q1: quantile(values, 0.25)?,
            median: median(values)?,
            q3: quantile(values, 0.75)?,
            max: max(values)?,
        })
    }

    pub fn values(&self) -> [f64; 5] {
        [self.min, self.q1, self.median, self.q3, self.max]
    }
}

/// Min-max normalizes `values` into `[lo, hi]`.
///
/// Missing entries stay missing. When every present value is identical the
/// scaling is undefined, and every entry comes back missing; callers decide
/// how to report that.
pub fn min_max_scale(values: &[Option<f64>], lo: f64, hi: f64) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (Some(min_val), Some(max_val)) = (min(&present), max(&present)) else {
        return vec![None; values.len()];
    };
    let span = max_val - min_val;
    if span == 0.0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .map(|v| v.map(|v| lo + (v - min_val) / span * (hi - lo)))
        .collect()
}

/// Min-max normalizes `values` into `[0, 1]`.
pub fn normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    min_max_scale(values, 0.0, 1.0)
}
