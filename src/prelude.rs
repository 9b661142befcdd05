//! Commonly used types and functions, re-exported for convenience.

pub use crate::data_structs::{
    AddressCol,
    Channel,
    ContainerCol,
    ControlCol,
    CorrectionStage,
    DesignType,
    IntensityCol,
    Manifest,
    ManifestCol,
    MethState,
    ProbeClass,
    ProbeSubset,
    RawIntensities,
    SampleContainer,
    SampleData,
    DETECTION_PVALUE_COL,
    METHYLATED_PROBE_SUBSETS,
    METHYLATED_SNP_SUBSETS,
    NEGATIVE_CONTROL,
    UNMETHYLATED_PROBE_SUBSETS,
    UNMETHYLATED_SNP_SUBSETS,
};
pub use crate::dataset::{
    AssemblyDiagnostics,
    DroppedProbes,
    MethylationDataset,
};
pub use crate::detect::{
    detect_probes,
    pval_empirical,
    pval_empirical_single,
    pval_parametric,
    DetectionMethod,
};
pub use crate::error::{
    IllumethError,
    Result,
};
