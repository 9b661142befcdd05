use hashbrown::HashMap;
use polars::prelude::*;

use super::enums::Channel;
use super::schema::{
    ContainerCol,
    IntensityCol,
};
use crate::error::{
    IllumethError,
    Result,
};
use crate::utils::ensure_columns;

/// Per-sample, per-channel mapping from bead address to mean intensity.
///
/// Each channel frame carries an `illumina_id` (u32) and `mean_value` (f64)
/// column; both are cast on insertion so joins against the manifest never
/// fail on dtype.
#[derive(Debug, Clone, Default)]
pub struct RawIntensities {
    channels: HashMap<Channel, DataFrame>,
}

impl RawIntensities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the common case of both channels present.
    pub fn try_new(
        green: DataFrame,
        red: DataFrame,
    ) -> Result<Self> {
        let mut readings = Self::new();
        readings.insert_channel(Channel::Green, green)?;
        readings.insert_channel(Channel::Red, red)?;
        Ok(readings)
    }

    pub fn insert_channel(
        &mut self,
        channel: Channel,
        frame: DataFrame,
    ) -> Result<()> {
        ensure_columns(
            &frame,
            &[
                IntensityCol::Address.as_str(),
                IntensityCol::MeanValue.as_str(),
            ],
            "channel readings",
        )?;
        let frame = frame
            .lazy()
            .with_columns([
                IntensityCol::Address.col().cast(DataType::UInt32),
                IntensityCol::MeanValue.col().cast(DataType::Float64),
            ])
            .collect()?;
        self.channels.insert(channel, frame);
        Ok(())
    }

    /// Mean-intensity table for one channel.
    pub fn channel_means(
        &self,
        channel: Channel,
    ) -> Result<&DataFrame> {
        self.channels
            .get(&channel)
            .ok_or(IllumethError::MissingChannelAssignment(channel))
    }
}

/// Read-only accessor over one sample's processed data, exposing exactly the
/// tables the detection engine consumes: the raw meth/unmeth intensities and
/// the per-channel control and out-of-band tables.
///
/// Meth/unmeth return `None` when the container was built without raw values
/// retained; the dispatch wrapper turns that into a
/// [`MissingUncorrectedData`](crate::error::IllumethError::MissingUncorrectedData)
/// error.
pub trait SampleData {
    fn sample_id(&self) -> &str;

    /// Name of the probe-key column of the meth/unmeth tables.
    fn probe_key(&self) -> &str;

    /// `[probe_key, "meth"]` table of raw methylated intensities.
    fn meth_table(&self) -> Option<DataFrame>;

    /// `[probe_key, "unmeth"]` table of raw unmethylated intensities.
    fn unmeth_table(&self) -> Option<DataFrame>;

    /// Per-channel QC control probes (`Extended_Type`, `Control_Type`,
    /// `mean_value`).
    fn control_table(
        &self,
        channel: Channel,
    ) -> Option<&DataFrame>;

    /// Per-channel out-of-band intensities (`mean_value`).
    fn oob_table(
        &self,
        channel: Channel,
    ) -> Option<&DataFrame>;
}

/// Concrete per-sample container: a probe-keyed frame of per-probe values
/// plus the control and out-of-band tables the detection engine needs.
#[derive(Debug, Clone)]
pub struct SampleContainer {
    sample_id: String,
    probe_key: PlSmallStr,
    data:      DataFrame,
    controls:  HashMap<Channel, DataFrame>,
    oob:       HashMap<Channel, DataFrame>,
}

impl SampleContainer {
    /// `data` is the per-probe frame; it must carry the probe-key column.
    /// Whether it carries raw `meth`/`unmeth` columns depends on upstream
    /// settings and is checked at detection time, not here.
    pub fn try_new(
        sample_id: impl Into<String>,
        probe_key: &str,
        data: DataFrame,
    ) -> Result<Self> {
        ensure_columns(&data, &[probe_key], "sample container")?;
        Ok(Self {
            sample_id: sample_id.into(),
            probe_key: PlSmallStr::from(probe_key),
            data,
            controls: HashMap::new(),
            oob: HashMap::new(),
        })
    }

    pub fn with_controls(
        mut self,
        channel: Channel,
        frame: DataFrame,
    ) -> Self {
        self.controls.insert(channel, frame);
        self
    }

    pub fn with_oob(
        mut self,
        channel: Channel,
        frame: DataFrame,
    ) -> Self {
        self.oob.insert(channel, frame);
        self
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    fn keyed_column(
        &self,
        column: &str,
    ) -> Option<DataFrame> {
        self.data.column(column).ok()?;
        self.data
            .select([self.probe_key.as_str(), column])
            .ok()
    }
}

impl SampleData for SampleContainer {
    fn sample_id(&self) -> &str {
        &self.sample_id
    }

    fn probe_key(&self) -> &str {
        self.probe_key.as_str()
    }

    fn meth_table(&self) -> Option<DataFrame> {
        self.keyed_column(ContainerCol::Meth.as_str())
    }

    fn unmeth_table(&self) -> Option<DataFrame> {
        self.keyed_column(ContainerCol::Unmeth.as_str())
    }

    fn control_table(
        &self,
        channel: Channel,
    ) -> Option<&DataFrame> {
        self.controls.get(&channel)
    }

    fn oob_table(
        &self,
        channel: Channel,
    ) -> Option<&DataFrame> {
        self.oob.get(&channel)
    }
}
