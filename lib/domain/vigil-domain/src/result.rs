/// Append-only record of pass/fail outcomes for one probe, in tick order.
/// Owned exclusively by the scheduler driving that probe.
#[derive(Debug, Default)]
pub struct ResultSet {
    outcomes: Vec<bool>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, passed: bool) {
        self.outcomes.push(passed);
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|passed| !**passed).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether the accumulated failures breach the given tolerance.
    pub fn exceeds(&self, allowed_failures: usize) -> bool {
        self.failure_count() > allowed_failures
    }
}
