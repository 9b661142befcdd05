use itertools::Itertools;
use log::warn;
use polars::prelude::*;

use super::enums::ProbeClass;
use super::probe_subset::ProbeSubset;
use super::schema::ManifestCol;
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::ensure_columns;

/// Read-only array design table mapping each probe to its design type, color
/// channel and bead addresses.
///
/// The probe-key column *name* is part of the contract: it is validated once
/// at construction and every downstream join and detection step compares
/// against it instead of assuming a spelling. Address columns are cast to
/// `u32` so they join cleanly against channel readings.
#[derive(Debug, Clone)]
pub struct Manifest {
    data:      DataFrame,
    probe_key: PlSmallStr,
}

impl Manifest {
    pub fn try_new(
        data: DataFrame,
        probe_key: &str,
    ) -> Result<Self> {
        let mut required = vec![probe_key];
        required.extend(ManifestCol::colnames());
        ensure_columns(&data, &required, "manifest")?;

        let data = data
            .lazy()
            .with_columns([
                ManifestCol::AddressA.col().cast(DataType::UInt32),
                ManifestCol::AddressB.col().cast(DataType::UInt32),
            ])
            .collect()?;

        let ids = data.column(probe_key)?.as_materialized_series();
        let n_unique = ids.n_unique()?;
        if n_unique < data.height() {
            // Duplicate bead assignment happens in some array layouts; the
            // combined tables carry the duplicates through by design.
            warn!(
                "manifest contains {} duplicate probe identifiers",
                data.height() - n_unique
            );
        }

        Ok(Self {
            data,
            probe_key: PlSmallStr::from(probe_key),
        })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn probe_key(&self) -> &str {
        self.probe_key.as_str()
    }

    pub fn len(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Manifest rows belonging to one probe subset, selected down to the
    /// probe key, design metadata and both address columns (so every subset
    /// frame shares one schema and the combined table can be concatenated).
    pub fn subset_frame(
        &self,
        subset: &ProbeSubset,
    ) -> Result<DataFrame> {
        let mut predicate = ManifestCol::DesignType
            .col()
            .eq(lit(subset.design_type.to_string()));
        if let Some(channel) = subset.probe_channel() {
            predicate = predicate.and(
                ManifestCol::ColorChannel
                    .col()
                    .eq(lit(channel.to_string())),
            );
        }

        self.data
            .clone()
            .lazy()
            .filter(predicate)
            .select([
                col(self.probe_key.as_str()),
                ManifestCol::DesignType.col(),
                ManifestCol::ColorChannel.col(),
                ManifestCol::AddressA.col(),
                ManifestCol::AddressB.col(),
            ])
            .collect()
            .map_err(IllumethError::from)
    }

    /// Probe identifiers of one detection class. The three classes cover the
    /// manifest disjointly.
    pub fn class_frame(
        &self,
        class: ProbeClass,
    ) -> Result<DataFrame> {
        let design = ManifestCol::DesignType.col();
        let color = ManifestCol::ColorChannel.col();
        let predicate = match class {
            ProbeClass::TypeIGreen => design.eq(lit("I")).and(color.eq(lit("Grn"))),
            ProbeClass::TypeIRed => design.eq(lit("I")).and(color.eq(lit("Red"))),
            ProbeClass::TypeII => design.eq(lit("II")),
        };

        self.data
            .clone()
            .lazy()
            .filter(predicate)
            .select([col(self.probe_key.as_str())])
            .collect()
            .map_err(IllumethError::from)
    }

    /// Probe identifiers of all three classes, in detection order (IR, IG,
    /// II), each paired with its class.
    pub fn class_frames(&self) -> Result<Vec<(ProbeClass, DataFrame)>> {
        ProbeClass::ALL
            .iter()
            .map(|class| self.class_frame(*class).map(|frame| (*class, frame)))
            .try_collect()
    }
}
