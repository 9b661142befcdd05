use polars::prelude::*;

/// Columns of a per-subset intensity table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IntensityCol {
    /// Bead address, the raw join key for channel readings.
    Address,
    /// Raw mean intensity for the bead.
    MeanValue,
    /// Label of the channel the value was read from.
    Channel,
    /// Background-corrected intensity, added by the first correction step.
    BgCorrected,
    /// Dye-bias (NOOB) corrected intensity, added by the second step.
    Noob,
}

impl IntensityCol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IntensityCol::Address => "illumina_id",
            IntensityCol::MeanValue => "mean_value",
            IntensityCol::Channel => "Channel",
            IntensityCol::BgCorrected => "bg_corrected",
            IntensityCol::Noob => "noob",
        }
    }

    pub const fn dtype(&self) -> DataType {
        match self {
            IntensityCol::Address => DataType::UInt32,
            IntensityCol::MeanValue => DataType::Float64,
            IntensityCol::Channel => DataType::String,
            IntensityCol::BgCorrected => DataType::Float64,
            IntensityCol::Noob => DataType::Float64,
        }
    }

    #[inline(always)]
    pub fn col(&self) -> Expr {
        col(self.as_str())
    }
}

/// Columns the manifest must provide besides the probe key.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ManifestCol {
    DesignType,
    ColorChannel,
    AddressA,
    AddressB,
}

impl ManifestCol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ManifestCol::DesignType => "Infinium_Design_Type",
            ManifestCol::ColorChannel => "Color_Channel",
            ManifestCol::AddressA => "AddressA_ID",
            ManifestCol::AddressB => "AddressB_ID",
        }
    }

    pub const fn colnames() -> [&'static str; 4] {
        [
            ManifestCol::DesignType.as_str(),
            ManifestCol::ColorChannel.as_str(),
            ManifestCol::AddressA.as_str(),
            ManifestCol::AddressB.as_str(),
        ]
    }

    #[inline(always)]
    pub fn col(&self) -> Expr {
        col(self.as_str())
    }
}

/// Columns of a per-sample container frame.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ContainerCol {
    /// Raw methylated intensity.
    Meth,
    /// Raw unmethylated intensity.
    Unmeth,
}

impl ContainerCol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContainerCol::Meth => "meth",
            ContainerCol::Unmeth => "unmeth",
        }
    }

    #[inline(always)]
    pub fn col(&self) -> Expr {
        col(self.as_str())
    }
}

/// Columns of a per-channel control probe table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ControlCol {
    ExtendedType,
    ControlType,
    MeanValue,
}

impl ControlCol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ControlCol::ExtendedType => "Extended_Type",
            ControlCol::ControlType => "Control_Type",
            ControlCol::MeanValue => "mean_value",
        }
    }

    #[inline(always)]
    pub fn col(&self) -> Expr {
        col(self.as_str())
    }
}

/// `Control_Type` label of the negative control probes used by the
/// parametric detection method.
pub const NEGATIVE_CONTROL: &str = "NEGATIVE";

/// Name of the detection p-value column in single-sample output.
pub const DETECTION_PVALUE_COL: &str = "poobah_pval";
