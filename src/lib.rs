//! # illumeth
//!
//! `illumeth` is a Rust library for processing Infinium methylation
//! microarray measurements: per-probe light intensities from two color
//! channels are joined against the array design ("manifest"), corrected for
//! optical background and dye bias, and scored for reliability with a
//! statistical detection test.
//!
//! All tables are Polars `DataFrame`s and every join and correction step is
//! a whole-table transform, so the correctness properties of the pipeline
//! (dedup-before-join, drop-before-join) hold over entire tables rather than
//! per row.
//!
//! ## Key Features
//!
//! * **Probe-subset assembly**: [`MethylationDataset`] builds the
//!   methylated/unmethylated intensity table of one sample by joining raw
//!   channel readings against the manifest per probe subset, with structured
//!   diagnostics for manifest rows that cannot be mapped.
//! * **Signal correction**: in-place background and dye-bias (NOOB)
//!   correction with a one-way, checked stage lifecycle
//!   ([`CorrectionStage`]).
//! * **Detection p-values**: a parametric, negative-control-based method and
//!   an empirical, out-of-band-based method behind one explicit
//!   [`DetectionMethod`] selector, plus a single-sample variant for early
//!   pipeline filtering.
//! * **Parallel cohorts**: multi-sample detection fans out over samples on a
//!   Rayon thread pool without changing any output.
//!
//! The number of threads can be configured with the `ILLUMETH_NUM_THREADS`
//! environment variable.
//!
//! ## Structure
//!
//! * [`data_structs`]: probe subsets, the manifest contract, per-sample
//!   input containers and the shared column vocabulary.
//! * [`dataset`]: assembly and correction of per-sample intensity tables.
//! * [`detect`]: the two detection p-value methods and their dispatch.
//! * [`utils`]: statistical primitives (median, MAD, ECDF) and table
//!   helpers.
//!
//! ## Usage
//!
//! ```no_run
//! use illumeth::prelude::*;
//! use polars::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Array design (normally loaded by an external manifest reader).
//!     let manifest = Manifest::try_new(
//!         df!(
//!             "IlmnID" => ["cg00000029", "cg00000108", "cg00000165"],
//!             "Infinium_Design_Type" => ["II", "I", "I"],
//!             "Color_Channel" => [None, Some("Grn"), Some("Red")],
//!             "AddressA_ID" => [1001u32, 1002, 1003],
//!             "AddressB_ID" => [None, Some(2002u32), Some(2003)],
//!         )?,
//!         "IlmnID",
//!     )?;
//!
//!     // Per-channel readings of one sample (normally parsed from IDATs).
//!     let readings = RawIntensities::try_new(
//!         df!(
//!             "illumina_id" => [1001u32, 1002, 2002],
//!             "mean_value" => [520.0, 310.0, 410.0],
//!         )?,
//!         df!(
//!             "illumina_id" => [1001u32, 1003, 2003],
//!             "mean_value" => [180.0, 120.0, 160.0],
//!         )?,
//!     )?;
//!
//!     let mut methylated = MethylationDataset::methylated(&readings, &manifest)?;
//!     println!("assembled {} probe rows", methylated.data().height());
//!
//!     // Corrected tables come from an external background-correction step.
//!     let green_corrected = df!(
//!         "illumina_id" => [1001u32, 1002, 2002],
//!         "bg_corrected" => [500.0, 290.0, 390.0],
//!     )?;
//!     let red_corrected = df!(
//!         "illumina_id" => [1001u32, 1003, 2003],
//!         "bg_corrected" => [160.0, 100.0, 140.0],
//!     )?;
//!     methylated.apply_background_correction(&green_corrected, &red_corrected)?;
//!     methylated.apply_dye_bias_correction(1.12)?;
//!
//!     assert!(methylated.is_preprocessed());
//!     Ok(())
//! }
//! ```

#[ctor::ctor]
fn init() {
    if let Ok(n) = std::env::var("ILLUMETH_NUM_THREADS") {
        std::env::set_var("POLARS_MAX_THREADS", n)
    }
}

pub mod data_structs;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod prelude;
pub mod utils;

pub use error::{
    IllumethError,
    Result,
};

#[allow(unused_imports)]
use prelude::*;
