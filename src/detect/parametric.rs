use itertools::izip;
use log::debug;
use polars::prelude::*;
use rayon::iter::{
    IntoParallelRefIterator,
    ParallelIterator,
};
use statrs::distribution::{
    ContinuousCDF,
    Normal,
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
    ControlCol,
    NEGATIVE_CONTROL,
};
use crate::data_structs::{
    Manifest,
    SampleData,
};
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::{
    float_column,
    mad,
    median,
    THREAD_POOL,
};

/// Negative-control p-values (minfi-style).
///
/// Per sample, the Red and Green background distributions are estimated from
/// the NEGATIVE control probes (location: median, scale: scaled MAD) and
/// each probe's meth+unmeth total is scored against the normal CDF of its
/// class: Type-I probes against twice their channel's parameters, Type-II
/// against the sum of both channels' parameters.
///
/// Returns a table keyed by probe identifier with one column per sample,
/// sorted by probe identifier. Samples are processed independently on the
/// crate thread pool.
pub fn pval_parametric<S: SampleData + Sync>(
    samples: &[S],
    manifest: &Manifest,
) -> Result<DataFrame> {
    super::validate_samples(samples, manifest)?;
    let probe_key = manifest.probe_key();
    let classes = manifest.class_frames()?;

    let per_sample = THREAD_POOL.install(|| {
        samples
            .par_iter()
            .map(|sample| sample_parametric(sample, &classes, probe_key))
            .collect::<Result<Vec<_>>>()
    })?;

    join_sample_frames(per_sample, probe_key)
}

fn sample_parametric<S: SampleData>(
    sample: &S,
    classes: &[(ProbeClass, DataFrame)],
    probe_key: &str,
) -> Result<DataFrame> {
    let (mu_red, sd_red) = negative_control_params(sample, Channel::Red)?;
    let (mu_green, sd_green) = negative_control_params(sample, Channel::Green)?;
    debug!(
        "sample {}: negative controls Red ({:.2}, {:.2}), Grn ({:.2}, {:.2})",
        sample.sample_id(),
        mu_red,
        sd_red,
        mu_green,
        sd_green
    );

    let (meth, unmeth) = sample_meth_unmeth(sample)?;

    let mut frames = Vec::with_capacity(classes.len());
    for (class, class_frame) in classes {
        let (mean, sd) = match class {
            ProbeClass::TypeIRed => (2.0 * mu_red, 2.0 * sd_red),
            ProbeClass::TypeIGreen => (2.0 * mu_green, 2.0 * sd_green),
            ProbeClass::TypeII => (mu_red + mu_green, sd_red + sd_green),
        };
        let background = Normal::new(mean, sd).map_err(|e| {
            IllumethError::Validation(format!(
                "cannot model {} background for sample {}: {}",
                class,
                sample.sample_id(),
                e
            ))
        })?;

        let (ids, meth_values, unmeth_values) =
            aligned_class_values(class_frame, &meth, &unmeth, probe_key)?;
        let pvalues = izip!(meth_values, unmeth_values)
            .map(|(m, u)| 1.0 - background.cdf(m + u))
            .collect::<Vec<_>>();
        frames.push(pvalue_frame(ids, pvalues, sample.sample_id())?);
    }

    finish_sample_frame(frames, probe_key)
}

/// Location and scale of one channel's NEGATIVE control intensities. The
/// scale is undefined below two probes.
fn negative_control_params<S: SampleData>(
    sample: &S,
    channel: Channel,
) -> Result<(f64, f64)> {
    let controls = sample.control_table(channel).ok_or_else(|| {
        IllumethError::Validation(format!(
            "sample {} has no {} control table",
            sample.sample_id(),
            channel
        ))
    })?;
    let negatives = controls
        .clone()
        .lazy()
        .filter(
            ControlCol::ControlType
                .col()
                .eq(lit(NEGATIVE_CONTROL)),
        )
        .collect()?;
    let values = float_column(&negatives, ControlCol::MeanValue.as_str())?;
    if values.len() < 2 {
        return Err(IllumethError::InsufficientControls {
            channel,
            found: values.len(),
        });
    }
    Ok((median(&values), mad(&values)))
}
