//! Detection p-values: per-probe probability that the observed signal is
//! indistinguishable from background noise.
//!
//! Two interchangeable methods, selected by [`DetectionMethod`]:
//!
//! - [`pval_parametric`]: Gaussian background model estimated from the
//!   negative control probes (minfi-style).
//! - [`pval_empirical`]: empirical CDF background model built from the
//!   out-of-band intensities (sesame/poobah-style).
//!
//! Both partition the manifest into the three disjoint
//! [`ProbeClass`](crate::data_structs::ProbeClass) groups (Type-I-Red,
//! Type-I-Green, Type-II) and score each class against its own background
//! parameters. Smaller p-values mean the signal is more likely real.

use std::fmt::Display;
use std::str::FromStr;

use itertools::Itertools;
use polars::prelude::*;

mod empirical;
mod parametric;
#[cfg(test)]
mod tests;

pub use empirical::{
    pval_empirical,
    pval_empirical_single,
};
pub use parametric::pval_parametric;

use crate::data_structs::schema::ContainerCol;
use crate::data_structs::{
    Manifest,
    SampleData,
};
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::float_column;

/// Explicit detection method selector.
///
/// Parsing accepts the method names the algorithms are known by in the wider
/// ecosystem (`minfi`, `sesame`) and fails on anything else rather than
/// silently falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMethod {
    Parametric,
    #[default]
    Empirical,
}

impl Display for DetectionMethod {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DetectionMethod::Parametric => write!(f, "minfi"),
            DetectionMethod::Empirical => write!(f, "sesame"),
        }
    }
}

impl FromStr for DetectionMethod {
    type Err = IllumethError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minfi" | "parametric" => Ok(DetectionMethod::Parametric),
            "sesame" | "empirical" => Ok(DetectionMethod::Empirical),
            other => {
                Err(IllumethError::Validation(format!(
                    "unrecognized detection method: {}",
                    other
                )))
            },
        }
    }
}

/// Runs probe detection over a cohort of samples with the selected method.
///
/// Every sample container must still carry its raw `meth` and `unmeth`
/// columns; containers built with corrected-only output fail with
/// [`MissingUncorrectedData`](IllumethError::MissingUncorrectedData) telling
/// the caller to re-run upstream preprocessing with raw-value retention
/// enabled.
///
/// Returns a table keyed by probe identifier with one p-value column per
/// sample, sorted by probe identifier.
pub fn detect_probes<S: SampleData + Sync>(
    samples: &[S],
    manifest: &Manifest,
    method: DetectionMethod,
) -> Result<DataFrame> {
    match method {
        DetectionMethod::Parametric => pval_parametric(samples, manifest),
        DetectionMethod::Empirical => pval_empirical(samples, manifest),
    }
}

pub(crate) fn validate_samples<S: SampleData>(
    samples: &[S],
    manifest: &Manifest,
) -> Result<()> {
    if samples.is_empty() {
        return Err(IllumethError::Validation(
            "no samples provided for detection".to_string(),
        ));
    }
    if !samples.iter().map(SampleData::sample_id).all_unique() {
        return Err(IllumethError::Validation(
            "duplicate sample identifiers in detection input".to_string(),
        ));
    }
    for sample in samples {
        if sample.probe_key() != manifest.probe_key() {
            return Err(IllumethError::SchemaMismatch(format!(
                "sample {} probe key ({}) does not match manifest probe key ({})",
                sample.sample_id(),
                sample.probe_key(),
                manifest.probe_key()
            )));
        }
        if sample.meth_table().is_none() || sample.unmeth_table().is_none() {
            return Err(IllumethError::MissingUncorrectedData(format!(
                "sample {} lacks raw 'meth'/'unmeth' columns; re-run upstream \
                 preprocessing with raw value retention enabled",
                sample.sample_id()
            )));
        }
    }
    Ok(())
}

/// Raw meth/unmeth tables of one sample, failing when the container was
/// built without them. Callers go through [`validate_samples`] first, so
/// this is a backstop for direct method invocation.
pub(crate) fn sample_meth_unmeth<S: SampleData>(
    sample: &S
) -> Result<(DataFrame, DataFrame)> {
    let missing = || {
        IllumethError::MissingUncorrectedData(format!(
            "sample {} lacks raw 'meth'/'unmeth' columns",
            sample.sample_id()
        ))
    };
    let meth = sample.meth_table().ok_or_else(missing)?;
    let unmeth = sample.unmeth_table().ok_or_else(missing)?;
    Ok((meth, unmeth))
}

/// Inner-joins one class's probe list against a sample's meth and unmeth
/// tables, returning the aligned probe ids and finite intensity vectors.
pub(crate) fn aligned_class_values(
    class_frame: &DataFrame,
    meth: &DataFrame,
    unmeth: &DataFrame,
    probe_key: &str,
) -> Result<(Series, Vec<f64>, Vec<f64>)> {
    let joined = class_frame
        .clone()
        .lazy()
        .inner_join(meth.clone().lazy(), col(probe_key), col(probe_key))
        .inner_join(unmeth.clone().lazy(), col(probe_key), col(probe_key))
        .collect()?;

    let ids = joined
        .column(probe_key)?
        .as_materialized_series()
        .clone();
    let meth_values = float_column(&joined, ContainerCol::Meth.as_str())?;
    let unmeth_values = float_column(&joined, ContainerCol::Unmeth.as_str())?;
    Ok((ids, meth_values, unmeth_values))
}

/// Builds a `[probe_key, <column>]` p-value frame for one class.
pub(crate) fn pvalue_frame(
    ids: Series,
    pvalues: Vec<f64>,
    column: &str,
) -> Result<DataFrame> {
    let values = Series::new(PlSmallStr::from(column), pvalues);
    DataFrame::new(vec![ids.into(), values.into()]).map_err(IllumethError::from)
}

/// Stacks per-class frames and sorts by probe identifier.
pub(crate) fn finish_sample_frame(
    frames: Vec<DataFrame>,
    probe_key: &str,
) -> Result<DataFrame> {
    let mut iter = frames.into_iter();
    let mut stacked = iter.next().ok_or_else(|| {
        IllumethError::Validation("no probe classes produced output".to_string())
    })?;
    for frame in iter {
        stacked.vstack_mut(&frame)?;
    }
    stacked.rechunk_mut();
    stacked
        .lazy()
        .sort([probe_key], Default::default())
        .collect()
        .map_err(IllumethError::from)
}

/// Inner-joins per-sample p-value frames into one cohort table keyed by
/// probe identifier.
pub(crate) fn join_sample_frames(
    frames: Vec<DataFrame>,
    probe_key: &str,
) -> Result<DataFrame> {
    let mut iter = frames.into_iter();
    let mut joined = iter.next().ok_or_else(|| {
        IllumethError::Validation("no samples produced output".to_string())
    })?;
    for frame in iter {
        joined = joined
            .lazy()
            .inner_join(frame.lazy(), col(probe_key), col(probe_key))
            .collect()?;
    }
    joined
        .lazy()
        .sort([probe_key], Default::default())
        .collect()
        .map_err(IllumethError::from)
}
