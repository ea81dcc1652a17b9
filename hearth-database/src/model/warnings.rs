#[derive(Clone, Debug)]
pub struct WarningEntry {
    pub warned_at: u64,
    pub moderator_id: u64,
    pub reason: String,
}

/// Result of recording a warning: the member's running total.
#[derive(Clone, Copy, Debug)]
pub struct WarningRecord {
    pub total_warnings: usize,
}
