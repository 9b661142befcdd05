//! Type aliases for the scalar types flowing through intensity tables.

/// Physical bead position on the array, the raw join key for readings.
pub type AddressType = u32;

/// Mean fluorescence intensity.
pub type IntensityType = f64;

/// Detection p-value.
pub type PValueType = f64;
