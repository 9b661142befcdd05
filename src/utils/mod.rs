//! Utility functions shared across the crate: the statistical primitives the
//! detection engine builds on, whole-table helpers for the Polars contracts
//! (deduplication, column validation, typed extraction) and the crate thread
//! pool.

use itertools::Itertools;
use once_cell::sync::Lazy;
use polars::prelude::*;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

mod stats;
pub use stats::*;
// Disambiguate `median` against the one leaked by `polars::prelude::*`; an
// explicit import takes precedence over the glob imports.
pub use stats::median;

use crate::error::{
    IllumethError,
    Result,
};

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var("ILLUMETH_NUM_THREADS")
        .ok()
        .and_then(|str| str.parse::<usize>().ok());
    ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .expect("Failed to create thread pool")
});

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

/// Collapses exact duplicate rows, keeping the first occurrence. Applying it
/// to an already-deduplicated table is a no-op.
pub fn dedup_keep_first(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
}

/// Fails with `SchemaMismatch` naming every missing column.
pub fn ensure_columns(
    df: &DataFrame,
    required: &[&str],
    what: &str,
) -> Result<()> {
    let missing = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .collect_vec();
    if missing.is_empty() {
        Ok(())
    }
    else {
        Err(IllumethError::SchemaMismatch(format!(
            "{} table is missing required columns: {}",
            what,
            missing.iter().join(", ")
        )))
    }
}

/// Extracts a Float64 column as a plain vector, failing with a validation
/// error on any missing or non-finite value. Statistical code downstream
/// assumes finite inputs.
pub fn float_column(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<f64>> {
    let series = df.column(name)?.as_materialized_series();
    let ca = series.f64().map_err(|_| {
        IllumethError::Validation(format!(
            "column {} is not Float64 (found {})",
            name,
            series.dtype()
        ))
    })?;

    let mut values = Vec::with_capacity(ca.len());
    for (row, value) in ca.into_iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => values.push(v),
            Some(v) => {
                return Err(IllumethError::Validation(format!(
                    "non-finite intensity {} in column {} at row {}",
                    v, name, row
                )))
            },
            None => {
                return Err(IllumethError::Validation(format!(
                    "missing intensity in column {} at row {}",
                    name, row
                )))
            },
        }
    }
    Ok(values)
}

/// Extracts a String column as owned values, skipping nulls.
pub fn string_column(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<String>> {
    let series = df.column(name)?.as_materialized_series();
    let ca = series.str().map_err(|_| {
        IllumethError::Validation(format!(
            "column {} is not String (found {})",
            name,
            series.dtype()
        ))
    })?;
    Ok(ca.into_iter().flatten().map(str::to_string).collect_vec())
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;
    use crate::error::IllumethError;

    #[test]
    fn dedup_is_idempotent() {
        let df = df!(
            "illumina_id" => [1u32, 1, 2, 3],
            "bg_corrected" => [10.0, 10.0, 20.0, 30.0],
        )
        .unwrap();

        let once = dedup_keep_first(&df).unwrap();
        let twice = dedup_keep_first(&once).unwrap();
        assert_eq!(once.height(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn float_column_rejects_nulls_and_nan() {
        let with_null = df!("mean_value" => [Some(1.0), None]).unwrap();
        assert!(matches!(
            float_column(&with_null, "mean_value"),
            Err(IllumethError::Validation(_))
        ));

        let with_nan = df!("mean_value" => [1.0, f64::NAN]).unwrap();
        assert!(matches!(
            float_column(&with_nan, "mean_value"),
            Err(IllumethError::Validation(_))
        ));
    }

    #[test]
    fn ensure_columns_names_missing() {
        let df = df!("a" => [1i32]).unwrap();
        let err = ensure_columns(&df, &["a", "b"], "test").unwrap_err();
        assert!(err.to_string().contains("b"));
    }
}
