//! Per-sample assembly and correction of one semantic probe group.
//!
//! [`MethylationDataset`] joins raw channel readings against the manifest for
//! a family of probe subsets (all methylated probes, all unmethylated probes,
//! or the SNP equivalents) and then applies the two correction steps in
//! order: background correction, then dye-bias (NOOB) correction. The
//! combined table is rebuilt from the subset tables after every step, never
//! patched incrementally.

use itertools::Itertools;
use log::{
    debug,
    warn,
};
use polars::prelude::*;

mod diagnostics;

pub use diagnostics::{
    AssemblyDiagnostics,
    DroppedProbes,
};

use crate::data_structs::enums::{
    Channel,
    CorrectionStage,
};
use crate::data_structs::schema::IntensityCol;
use crate::data_structs::typedef::IntensityType;
use crate::data_structs::{
    Manifest,
    ProbeSubset,
    RawIntensities,
    METHYLATED_PROBE_SUBSETS,
    METHYLATED_SNP_SUBSETS,
    UNMETHYLATED_PROBE_SUBSETS,
    UNMETHYLATED_SNP_SUBSETS,
};
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::{
    dedup_keep_first,
    ensure_columns,
    string_column,
};

/// Intensity tables for one probe group of one sample, corrected in place.
///
/// Lifecycle: assembled at construction, then
/// [`apply_background_correction`](Self::apply_background_correction) and
/// [`apply_dye_bias_correction`](Self::apply_dye_bias_correction), in that
/// order. Each transition is one-way and checked; out-of-order calls fail
/// instead of silently using the wrong intensity column.
#[derive(Debug, Clone)]
pub struct MethylationDataset {
    subsets:     Vec<(ProbeSubset, DataFrame)>,
    combined:    DataFrame,
    probe_key:   PlSmallStr,
    stage:       CorrectionStage,
    diagnostics: AssemblyDiagnostics,
}

impl MethylationDataset {
    /// Assembles one intensity table per probe subset by joining the
    /// subset's channel readings against the manifest rows of that subset.
    ///
    /// Manifest rows with no bead address in the subset's address column are
    /// counted, reported and dropped before the join; see
    /// [`AssemblyDiagnostics`].
    pub fn try_new(
        raw: &RawIntensities,
        manifest: &Manifest,
        probe_subsets: &[ProbeSubset],
    ) -> Result<Self> {
        let mut diagnostics = AssemblyDiagnostics::default();
        let mut subsets = Vec::with_capacity(probe_subsets.len());
        for subset in probe_subsets {
            let frame = assemble_subset(raw, manifest, subset, &mut diagnostics)?;
            subsets.push((*subset, frame));
        }
        let combined = build_combined(&subsets)?;

        Ok(Self {
            subsets,
            combined,
            probe_key: PlSmallStr::from(manifest.probe_key()),
            stage: CorrectionStage::Assembled,
            diagnostics,
        })
    }

    /// All methylated CpG probes of one sample.
    pub fn methylated(
        raw: &RawIntensities,
        manifest: &Manifest,
    ) -> Result<Self> {
        Self::try_new(raw, manifest, &METHYLATED_PROBE_SUBSETS)
    }

    /// All unmethylated CpG probes of one sample.
    pub fn unmethylated(
        raw: &RawIntensities,
        manifest: &Manifest,
    ) -> Result<Self> {
        Self::try_new(raw, manifest, &UNMETHYLATED_PROBE_SUBSETS)
    }

    /// Methylated SNP probes; expects a manifest restricted to SNP rows.
    pub fn snp_methylated(
        raw: &RawIntensities,
        snp_manifest: &Manifest,
    ) -> Result<Self> {
        Self::try_new(raw, snp_manifest, &METHYLATED_SNP_SUBSETS)
    }

    /// Unmethylated SNP probes; expects a manifest restricted to SNP rows.
    pub fn snp_unmethylated(
        raw: &RawIntensities,
        snp_manifest: &Manifest,
    ) -> Result<Self> {
        Self::try_new(raw, snp_manifest, &UNMETHYLATED_SNP_SUBSETS)
    }

    /// The combined table: row-wise concatenation of all subset tables.
    pub fn data(&self) -> &DataFrame {
        &self.combined
    }

    pub fn subset_frame(
        &self,
        subset: &ProbeSubset,
    ) -> Option<&DataFrame> {
        self.subsets
            .iter()
            .find(|(s, _)| s == subset)
            .map(|(_, frame)| frame)
    }

    pub fn subsets(&self) -> &[(ProbeSubset, DataFrame)] {
        &self.subsets
    }

    pub fn probe_key(&self) -> &str {
        self.probe_key.as_str()
    }

    pub fn stage(&self) -> CorrectionStage {
        self.stage
    }

    pub fn diagnostics(&self) -> &AssemblyDiagnostics {
        &self.diagnostics
    }

    pub fn is_background_corrected(&self) -> bool {
        self.stage >= CorrectionStage::BackgroundCorrected
    }

    pub fn is_preprocessed(&self) -> bool {
        self.stage == CorrectionStage::Preprocessed
    }

    /// Joins externally computed background-corrected intensities onto every
    /// subset table by bead address.
    ///
    /// The corrected tables are full-array and keyed by `illumina_id` with a
    /// `bg_corrected` column. Exact duplicate rows (a known property of
    /// layouts that assign several bead addresses to one nominal probe) are
    /// collapsed keep-first before use, and again after restricting to the
    /// subset's addresses. The stage advances only after every subset joined
    /// successfully.
    pub fn apply_background_correction(
        &mut self,
        green_corrected: &DataFrame,
        red_corrected: &DataFrame,
    ) -> Result<()> {
        self.expect_stage(CorrectionStage::Assembled)?;
        for (name, frame) in [("green", green_corrected), ("red", red_corrected)] {
            ensure_columns(
                frame,
                &[
                    IntensityCol::Address.as_str(),
                    IntensityCol::BgCorrected.as_str(),
                ],
                &format!("{} corrected-intensity", name),
            )?;
        }

        let green = dedup_keep_first(green_corrected)?;
        let red = dedup_keep_first(red_corrected)?;

        // Compute every join before committing any, so a failing subset
        // cannot leave the dataset half-corrected.
        let mut updated = Vec::with_capacity(self.subsets.len());
        for (subset, frame) in &self.subsets {
            let corrected = match subset.data_channel {
                Channel::Red => &red,
                Channel::Green => &green,
            };
            updated.push(bg_correct_subset(frame, subset, corrected)?);
        }
        for ((_, frame), new) in self.subsets.iter_mut().zip(updated) {
            *frame = new;
        }

        self.combined = build_combined(&self.subsets)?;
        self.stage = CorrectionStage::BackgroundCorrected;
        Ok(())
    }

    /// Rescales the Red-channel background-corrected signal by the
    /// sample-level dye-bias factor; Green and Type II signal passes through
    /// unchanged, since it is not assumed to carry the same dye bias.
    pub fn apply_dye_bias_correction(
        &mut self,
        red_factor: IntensityType,
    ) -> Result<()> {
        self.expect_stage(CorrectionStage::BackgroundCorrected)?;

        let mut updated = Vec::with_capacity(self.subsets.len());
        for (subset, frame) in &self.subsets {
            let noob = if subset.is_red() {
                IntensityCol::BgCorrected.col() * lit(red_factor)
            }
            else {
                IntensityCol::BgCorrected.col()
            };
            updated.push(
                frame
                    .clone()
                    .lazy()
                    .with_columns([noob.alias(IntensityCol::Noob.as_str())])
                    .collect()?,
            );
        }
        for ((_, frame), new) in self.subsets.iter_mut().zip(updated) {
            *frame = new;
        }

        self.combined = build_combined(&self.subsets)?;
        self.stage = CorrectionStage::Preprocessed;
        Ok(())
    }

    fn expect_stage(
        &self,
        expected: CorrectionStage,
    ) -> Result<()> {
        if self.stage == expected {
            Ok(())
        }
        else {
            Err(IllumethError::InvalidStage {
                expected,
                found: self.stage,
            })
        }
    }
}

/// Joins one subset's channel readings against its manifest rows.
fn assemble_subset(
    raw: &RawIntensities,
    manifest: &Manifest,
    subset: &ProbeSubset,
    diagnostics: &mut AssemblyDiagnostics,
) -> Result<DataFrame> {
    let means = raw
        .channel_means(subset.data_channel)?
        .clone()
        .lazy()
        .with_columns([lit(subset.data_channel.to_string())
            .alias(IntensityCol::Channel.as_str())]);

    let mut details = manifest.subset_frame(subset)?;
    let address_column = subset.column_name();

    let n_missing = details
        .column(address_column)?
        .as_materialized_series()
        .null_count();
    if n_missing > 0 {
        let missing = details
            .clone()
            .lazy()
            .filter(col(address_column).is_null())
            .collect()?;
        let probe_ids = string_column(&missing, manifest.probe_key())?;
        warn!(
            "{} probes in subset {} have no bead address in manifest column {}; \
             dropping them before the join, downstream tables will be incomplete: {}",
            n_missing,
            subset,
            address_column,
            probe_ids.iter().join(", ")
        );
        diagnostics.record(DroppedProbes {
            subset: subset.to_string(),
            address_column: address_column.to_string(),
            dropped: n_missing,
            probe_ids,
        });
        details = details
            .lazy()
            .filter(col(address_column).is_not_null())
            .collect()?;
    }

    let joined = details
        .lazy()
        .inner_join(means, col(address_column), IntensityCol::Address.col())
        .collect()?;
    debug!("assembled subset {}: {} rows", subset, joined.height());
    Ok(joined)
}

/// Restricts the corrected table to this subset's bead addresses,
/// deduplicates, and inner-joins the `bg_corrected` column onto the subset
/// table.
fn bg_correct_subset(
    frame: &DataFrame,
    subset: &ProbeSubset,
    corrected: &DataFrame,
) -> Result<DataFrame> {
    let address_column = subset.column_name();
    let addresses = frame
        .column(address_column)?
        .as_materialized_series()
        .clone();

    let restricted = corrected
        .clone()
        .lazy()
        .filter(IntensityCol::Address.col().is_in(lit(addresses)))
        .collect()?;
    let restricted = dedup_keep_first(&restricted)?;
    debug!(
        "subset {}: {} corrected rows after restriction and dedup",
        subset,
        restricted.height()
    );

    frame
        .clone()
        .lazy()
        .inner_join(
            restricted
                .lazy()
                .select([IntensityCol::Address.col(), IntensityCol::BgCorrected.col()]),
            col(address_column),
            IntensityCol::Address.col(),
        )
        .collect()
        .map_err(IllumethError::from)
}

/// Row-wise concatenation of all subset tables, in subset order.
fn build_combined(subsets: &[(ProbeSubset, DataFrame)]) -> Result<DataFrame> {
    let mut iter = subsets.iter();
    let (_, first) = iter.next().ok_or_else(|| {
        IllumethError::Validation(
            "cannot assemble a dataset with no probe subsets".to_string(),
        )
    })?;
    let mut combined = first.clone();
    for (_, frame) in iter {
        combined.vstack_mut(frame)?;
    }
    combined.rechunk_mut();
    Ok(combined)
}
