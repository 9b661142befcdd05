use itertools::izip;
use log::debug;
use polars::prelude::*;
use rayon::iter::{
    IntoParallelRefIterator,
    ParallelIterator,
};

use super::{
    aligned_class_values,
    finish_sample_frame,
    join_sample_frames,
    pvalue_frame,
    sample_meth_unmeth,
};
use crate::data_structs::enums::{
    Channel,
    ProbeClass,
};
use crate::data_structs::schema::{
    ContainerCol,
    ControlCol,
    DETECTION_PVALUE_COL,
};
use crate::data_structs::{
    Manifest,
    SampleData,
};
use crate::dataset::MethylationDataset;
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::{
    float_column,
    Ecdf,
    THREAD_POOL,
};

/// Out-of-band p-values (sesame/poobah-style).
///
/// Per sample, background distributions are the empirical CDFs of the
/// out-of-band Green and Red intensities. A probe's p-value is one minus the
/// larger of its two background quantiles; Type-II probes are scored
/// asymmetrically (meth against Green, unmeth against Red) because that is
/// where each allele's signal is read.
///
/// Returns a table keyed by probe identifier with one column per sample,
/// sorted by probe identifier. Samples are processed independently on the
/// crate thread pool.
pub fn pval_empirical<S: SampleData + Sync>(
    samples: &[S],
    manifest: &Manifest,
) -> Result<DataFrame> {
    super::validate_samples(samples, manifest)?;
    let probe_key = manifest.probe_key();
    let classes = manifest.class_frames()?;

    let per_sample = THREAD_POOL.install(|| {
        samples
            .par_iter()
            .map(|sample| sample_empirical(sample, &classes, probe_key))
            .collect::<Result<Vec<_>>>()
    })?;

    join_sample_frames(per_sample, probe_key)
}

fn sample_empirical<S: SampleData>(
    sample: &S,
    classes: &[(ProbeClass, DataFrame)],
    probe_key: &str,
) -> Result<DataFrame> {
    let func_green = oob_ecdf(sample, Channel::Green)?;
    let func_red = oob_ecdf(sample, Channel::Red)?;
    debug!(
        "sample {}: out-of-band background Grn n={}, Red n={}",
        sample.sample_id(),
        func_green.len(),
        func_red.len()
    );

    let (meth, unmeth) = sample_meth_unmeth(sample)?;

    let mut frames = Vec::with_capacity(classes.len());
    for (class, class_frame) in classes {
        let (ids, meth_values, unmeth_values) =
            aligned_class_values(class_frame, &meth, &unmeth, probe_key)?;
        let pvalues = class_pvalues(*class, &meth_values, &unmeth_values, &func_green, &func_red);
        frames.push(pvalue_frame(ids, pvalues, sample.sample_id())?);
    }

    finish_sample_frame(frames, probe_key)
}

/// Single-sample variant operating directly on a meth/unmeth dataset pair,
/// before any sample container exists.
///
/// `value_column` selects which intensity column of the combined tables to
/// score (`mean_value` for raw signal). The manifest's probe-key name must
/// match both datasets' — differing names mean the inputs were built with
/// incompatible probe-naming conventions and must not be silently aligned.
/// Alignment is by reindexing each class's probe list against the dataset
/// tables; probes left without a finite intensity are a contract violation.
///
/// Output is keyed by probe identifier with a single `poobah_pval` column,
/// suitable for downstream filtering.
pub fn pval_empirical_single(
    meth: &MethylationDataset,
    unmeth: &MethylationDataset,
    manifest: &Manifest,
    oob_green: &DataFrame,
    oob_red: &DataFrame,
    value_column: &str,
) -> Result<DataFrame> {
    let probe_key = manifest.probe_key();
    if probe_key != meth.probe_key() || probe_key != unmeth.probe_key() {
        return Err(IllumethError::SchemaMismatch(format!(
            "manifest probe key ({}) does not match meth/unmeth probe keys ({}, {})",
            probe_key,
            meth.probe_key(),
            unmeth.probe_key()
        )));
    }

    let func_green = Ecdf::try_new(&float_column(oob_green, ControlCol::MeanValue.as_str())?)?;
    let func_red = Ecdf::try_new(&float_column(oob_red, ControlCol::MeanValue.as_str())?)?;

    let meth_values = meth.data().clone().lazy().select([
        col(probe_key),
        col(value_column).alias(ContainerCol::Meth.as_str()),
    ]);
    let unmeth_values = unmeth.data().clone().lazy().select([
        col(probe_key),
        col(value_column).alias(ContainerCol::Unmeth.as_str()),
    ]);

    let mut frames = Vec::with_capacity(ProbeClass::ALL.len());
    for class in ProbeClass::ALL {
        let reindexed = manifest
            .class_frame(class)?
            .lazy()
            .left_join(meth_values.clone(), col(probe_key), col(probe_key))
            .left_join(unmeth_values.clone(), col(probe_key), col(probe_key))
            .collect()?;

        let ids = reindexed
            .column(probe_key)?
            .as_materialized_series()
            .clone();
        let m = float_column(&reindexed, ContainerCol::Meth.as_str())?;
        let u = float_column(&reindexed, ContainerCol::Unmeth.as_str())?;
        let pvalues = class_pvalues(class, &m, &u, &func_green, &func_red);
        frames.push(pvalue_frame(ids, pvalues, DETECTION_PVALUE_COL)?);
    }

    finish_sample_frame(frames, probe_key)
}

/// p = 1 - max of the two background quantiles, with the class-specific
/// channel assignment.
fn class_pvalues(
    class: ProbeClass,
    meth: &[f64],
    unmeth: &[f64],
    func_green: &Ecdf,
    func_red: &Ecdf,
) -> Vec<f64> {
    let (meth_func, unmeth_func) = match class {
        ProbeClass::TypeIRed => (func_red, func_red),
        ProbeClass::TypeIGreen => (func_green, func_green),
        ProbeClass::TypeII => (func_green, func_red),
    };
    izip!(meth, unmeth)
        .map(|(m, u)| 1.0 - meth_func.eval(*m).max(unmeth_func.eval(*u)))
        .collect()
}

fn oob_ecdf<S: SampleData>(
    sample: &S,
    channel: Channel,
) -> Result<Ecdf> {
    let oob = sample.oob_table(channel).ok_or_else(|| {
        IllumethError::Validation(format!(
            "sample {} has no {} out-of-band table",
            sample.sample_id(),
            channel
        ))
    })?;
    Ecdf::try_new(&float_column(oob, ControlCol::MeanValue.as_str())?)
}
