/// Guards against out-of-order snapshot application. Every fetch takes a
/// ticket before it starts; a snapshot may be applied only if no
/// later-issued fetch has landed first. The store itself does not cancel
/// in-flight reads, so two refreshes can race and resolve in either order.
#[derive(Debug, Default)]
pub struct SnapshotGate {
    issued: u64,
    applied: u64,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call before starting a fetch; pass the ticket back to `try_apply`.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// True if the snapshot behind `ticket` is still the freshest and may be
    /// applied; false means a newer fetch already landed and this result
    /// must be discarded.
    pub fn try_apply(&mut self, ticket: u64) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }
}
