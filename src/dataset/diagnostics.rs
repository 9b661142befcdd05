use serde::Serialize;

/// One best-effort recovery event: manifest rows whose address column had no
/// bead address were dropped before the join for one probe subset.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedProbes {
    /// Label of the affected probe subset.
    pub subset:         String,
    /// Manifest address column that was missing values.
    pub address_column: String,
    /// Number of rows dropped.
    pub dropped:        usize,
    /// Identifiers of the dropped probes.
    pub probe_ids:      Vec<String>,
}

/// Structured record of everything the assembly step recovered from.
///
/// Dropping unmapped manifest rows lets processing continue on an imperfect
/// manifest but leaves downstream tables structurally incomplete; this log
/// makes that visible to callers and checkable in tests instead of being
/// buried in text output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyDiagnostics {
    events: Vec<DroppedProbes>,
}

impl AssemblyDiagnostics {
    pub(crate) fn record(
        &mut self,
        event: DroppedProbes,
    ) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[DroppedProbes] {
        &self.events
    }

    /// True when assembly completed without dropping any manifest rows.
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_dropped(&self) -> usize {
        self.events.iter().map(|e| e.dropped).sum()
    }
}
