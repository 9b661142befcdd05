use std::fmt::Display;

use serde::Serialize;

use super::enums::{
    AddressCol,
    Channel,
    DesignType,
    MethState,
};

/// Declarative partition of the probe set: which channel is read, which
/// manifest address column is the join key, and which design type and
/// methylation state the rows represent.
///
/// Pure data; defined once per array type. The standard CpG families are
/// [`METHYLATED_PROBE_SUBSETS`] and [`UNMETHYLATED_PROBE_SUBSETS`]; the SNP
/// families share the same geometry applied to a SNP-probe manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProbeSubset {
    pub meth_state:    MethState,
    pub data_channel:  Channel,
    pub probe_address: AddressCol,
    pub design_type:   DesignType,
}

impl ProbeSubset {
    pub const fn new(
        meth_state: MethState,
        data_channel: Channel,
        probe_address: AddressCol,
        design_type: DesignType,
    ) -> Self {
        Self {
            meth_state,
            data_channel,
            probe_address,
            design_type,
        }
    }

    /// Manifest color channel of the probes in this subset. Type II probes
    /// carry no channel assignment in the manifest.
    pub fn probe_channel(&self) -> Option<Channel> {
        match self.design_type {
            DesignType::I => Some(self.data_channel),
            DesignType::II => None,
        }
    }

    /// Manifest header of the address column this subset joins on.
    pub const fn column_name(&self) -> &'static str {
        self.probe_address.header_name()
    }

    pub fn is_red(&self) -> bool {
        self.data_channel == Channel::Red
    }

    pub fn is_green(&self) -> bool {
        self.data_channel == Channel::Green
    }
}

impl Display for ProbeSubset {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.design_type, self.data_channel, self.probe_address
        )
    }
}

/// The three subsets holding methylated CpG signal: Type II reads methylated
/// signal in Green at address A; Type I reads it at address B in the probe's
/// own channel.
pub const METHYLATED_PROBE_SUBSETS: [ProbeSubset; 3] = [
    ProbeSubset::new(
        MethState::Methylated,
        Channel::Green,
        AddressCol::A,
        DesignType::II,
    ),
    ProbeSubset::new(
        MethState::Methylated,
        Channel::Green,
        AddressCol::B,
        DesignType::I,
    ),
    ProbeSubset::new(
        MethState::Methylated,
        Channel::Red,
        AddressCol::B,
        DesignType::I,
    ),
];

/// The three subsets holding unmethylated CpG signal: Type II reads
/// unmethylated signal in Red at address A; Type I reads it at address A in
/// the probe's own channel.
pub const UNMETHYLATED_PROBE_SUBSETS: [ProbeSubset; 3] = [
    ProbeSubset::new(
        MethState::Unmethylated,
        Channel::Red,
        AddressCol::A,
        DesignType::II,
    ),
    ProbeSubset::new(
        MethState::Unmethylated,
        Channel::Green,
        AddressCol::A,
        DesignType::I,
    ),
    ProbeSubset::new(
        MethState::Unmethylated,
        Channel::Red,
        AddressCol::A,
        DesignType::I,
    ),
];

/// SNP probes use the same subset geometry as CpG probes; the family exists
/// separately because SNP rows live in their own manifest section.
pub const METHYLATED_SNP_SUBSETS: [ProbeSubset; 3] = METHYLATED_PROBE_SUBSETS;

pub const UNMETHYLATED_SNP_SUBSETS: [ProbeSubset; 3] = UNMETHYLATED_PROBE_SUBSETS;
