use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::IllumethError;

/// Color channel of the array scanner.
///
/// Display and parsing use the manifest vocabulary (`Red` / `Grn`).
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum Channel {
    Red,
    Green,
}

impl Display for Channel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Channel::Red => write!(f, "Red"),
            Channel::Green => write!(f, "Grn"),
        }
    }
}

impl FromStr for Channel {
    type Err = IllumethError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Red" | "RED" | "red" => Ok(Channel::Red),
            "Grn" | "Green" | "GREEN" | "green" => Ok(Channel::Green),
            other => {
                Err(IllumethError::Validation(format!(
                    "unrecognized channel name: {}",
                    other
                )))
            },
        }
    }
}

impl Serialize for Channel {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Infinium probe chemistry variant.
///
/// Type I probes read one channel over two bead addresses; Type II probes
/// read both channels over a single address.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum DesignType {
    I,
    II,
}

impl Display for DesignType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DesignType::I => write!(f, "I"),
            DesignType::II => write!(f, "II"),
        }
    }
}

impl FromStr for DesignType {
    type Err = IllumethError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(DesignType::I),
            "II" => Ok(DesignType::II),
            other => {
                Err(IllumethError::Validation(format!(
                    "unrecognized design type: {}",
                    other
                )))
            },
        }
    }
}

impl Serialize for DesignType {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DesignType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Which manifest address column a probe subset joins on.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressCol {
    A,
    B,
}

impl AddressCol {
    /// Manifest header name for this address column.
    pub const fn header_name(&self) -> &'static str {
        match self {
            AddressCol::A => "AddressA_ID",
            AddressCol::B => "AddressB_ID",
        }
    }
}

impl Display for AddressCol {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            AddressCol::A => write!(f, "AddressA"),
            AddressCol::B => write!(f, "AddressB"),
        }
    }
}

/// Methylation state a probe subset measures.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MethState {
    Methylated,
    Unmethylated,
}

impl Display for MethState {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            MethState::Methylated => write!(f, "Methylated"),
            MethState::Unmethylated => write!(f, "Unmethylated"),
        }
    }
}

/// Disjoint partition of the manifest probe set used by both detection
/// methods. Every probe belongs to exactly one class.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProbeClass {
    TypeIGreen,
    TypeIRed,
    TypeII,
}

impl ProbeClass {
    pub const ALL: [ProbeClass; 3] = [
        ProbeClass::TypeIRed,
        ProbeClass::TypeIGreen,
        ProbeClass::TypeII,
    ];
}

impl Display for ProbeClass {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ProbeClass::TypeIGreen => write!(f, "IG"),
            ProbeClass::TypeIRed => write!(f, "IR"),
            ProbeClass::TypeII => write!(f, "II"),
        }
    }
}

/// Lifecycle of a [`MethylationDataset`](crate::dataset::MethylationDataset).
///
/// Transitions are one-way: Assembled -> BackgroundCorrected -> Preprocessed.
/// No transition skips a step.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CorrectionStage {
    Assembled,
    BackgroundCorrected,
    Preprocessed,
}

impl Display for CorrectionStage {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            CorrectionStage::Assembled => write!(f, "assembled"),
            CorrectionStage::BackgroundCorrected => write!(f, "background_corrected"),
            CorrectionStage::Preprocessed => write!(f, "preprocessed"),
        }
    }
}
