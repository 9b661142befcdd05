//! Core data structures for Infinium methylation array processing.
//!
//! Everything here is declarative or read-only: the probe-set partitions,
//! the array design table and the per-sample input containers. The mutable
//! processing state lives in [`crate::dataset`].
//!
//! Key components:
//!
//! - [`enums`]: closed vocabularies used throughout the crate — color
//!   [`Channel`], Infinium [`DesignType`], manifest [`AddressCol`],
//!   [`MethState`], the detection [`ProbeClass`] partition and the
//!   [`CorrectionStage`] lifecycle.
//! - [`ProbeSubset`]: declarative probe-set partitions, with the standard
//!   methylated/unmethylated CpG and SNP families as constants.
//! - [`Manifest`]: the array design table with a validated probe-key
//!   contract.
//! - [`RawIntensities`], [`SampleData`], [`SampleContainer`]: per-sample
//!   inputs for assembly and detection.
//! - [`schema`]: the column vocabulary of every table contract.

pub mod enums;
mod manifest;
mod probe_subset;
mod sample;
pub mod schema;
pub mod typedef;


pub use enums::{
    AddressCol,
    Channel,
    CorrectionStage,
    DesignType,
    MethState,
    ProbeClass,
};
pub use manifest::Manifest;
pub use probe_subset::{
    ProbeSubset,
    METHYLATED_PROBE_SUBSETS,
    METHYLATED_SNP_SUBSETS,
    UNMETHYLATED_PROBE_SUBSETS,
    UNMETHYLATED_SNP_SUBSETS,
};
pub use sample::{
    RawIntensities,
    SampleContainer,
    SampleData,
};
pub use schema::{
    ContainerCol,
    ControlCol,
    IntensityCol,
    ManifestCol,
    DETECTION_PVALUE_COL,
    NEGATIVE_CONTROL,
};
