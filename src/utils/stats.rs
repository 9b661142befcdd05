use log::warn;
use num::Float;

use crate::error::{
    IllumethError,
    Result,
};

/// Scale factor making the median absolute deviation consistent with the
/// standard deviation of a normal distribution.
pub const MAD_SCALE: f64 = 1.4826;

/// Median of a slice. Returns NaN (with a warning) for empty input.
pub fn median<F: Float>(values: &[F]) -> F {
    if values.is_empty() {
        warn!("Cannot calculate median: empty array");
        return F::nan();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    }
    else {
        (sorted[mid - 1] + sorted[mid]) / F::from(2.0).unwrap()
    }
}

/// Median absolute deviation scaled by [`MAD_SCALE`], a robust estimate of
/// the normal standard deviation.
pub fn mad<F: Float>(values: &[F]) -> F {
    let center = median(values);
    let deviations = values
        .iter()
        .map(|v| (*v - center).abs())
        .collect::<Vec<_>>();
    median(&deviations) * F::from(MAD_SCALE).unwrap()
}

/// Empirical cumulative distribution function: a step function built from
/// sorted sample values. Evaluated at `x` it returns the fraction of samples
/// less than or equal to `x`.
#[derive(Debug, Clone)]
pub struct Ecdf {
    sorted: Vec<f64>,
}

impl Ecdf {
    /// Samples must be non-empty and finite; missing intensities are a
    /// caller contract violation, not a value to interpolate over.
    pub fn try_new(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(IllumethError::Validation(
                "cannot build an ECDF from an empty sample".to_string(),
            ));
        }
        if let Some(bad) = samples.iter().find(|v| !v.is_finite()) {
            return Err(IllumethError::Validation(format!(
                "non-finite value {} in ECDF sample",
                bad
            )));
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(Self { sorted })
    }

    /// Fraction of samples <= x.
    pub fn eval(
        &self,
        x: f64,
    ) -> f64 {
        let below = self.sorted.partition_point(|v| *v <= x);
        below as f64 / self.sorted.len() as f64
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}
