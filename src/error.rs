use polars::prelude::PolarsError;

use crate::data_structs::enums::{
    Channel,
    CorrectionStage,
};

/// Error type for all fallible operations in this crate.
///
/// The fatal contract violations described in the processing model each get
/// their own variant so callers (and tests) can match on the failure kind
/// instead of parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum IllumethError {
    /// Manifest, readings or container tables disagree on key naming or
    /// required columns.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No intensity table exists for the channel a probe subset names.
    #[error("no intensity table for channel {0}")]
    MissingChannelAssignment(Channel),

    /// The parametric detection method needs at least two negative control
    /// probes per channel to estimate a scale.
    #[error("insufficient negative controls for channel {channel}: found {found}, need at least 2")]
    InsufficientControls { channel: Channel, found: usize },

    /// A sample container was built without raw meth/unmeth values retained.
    #[error("missing uncorrected data: {0}")]
    MissingUncorrectedData(String),

    /// A correction was applied out of order.
    #[error("invalid correction stage: expected {expected}, found {found}")]
    InvalidStage {
        expected: CorrectionStage,
        found:    CorrectionStage,
    },

    /// Inputs violated a caller contract (non-finite intensities, empty
    /// sample lists, unrecognized enum names).
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, IllumethError>;
