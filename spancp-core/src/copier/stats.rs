/// Files and bytes copied within one scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
}

impl CopyStats {
    pub fn record(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

/// Statistics tracked during the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Since the process started
    pub global: CopyStats,
    /// Since the current destination was selected
    pub local: CopyStats,
}

impl SessionStats {
    /// Count one successfully copied file in both scopes
    pub fn record(&mut self, bytes: u64) {
        self.global.record(bytes);
        self.local.record(bytes);
    }

    /// Called when the destination changes; global totals are kept
    pub fn reset_local(&mut self) {
        self.local = CopyStats::default();
    }
}
