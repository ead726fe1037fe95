/// Known-transient failure conditions, recognized from captured output.
/// A matched failure is retried on the next tick instead of being counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientFailure {
    /// The platform CLI session expired between command chains.
    ExpiredSession,
}

impl TransientFailure {
    pub fn matches(&self, stdout: &str, stderr: &str) -> bool {
        match self {
            Self::ExpiredSession => {
                const MESSAGE: &str =
                    "Authentication has expired.  Please log back in to re-authenticate.";
                stdout.contains(MESSAGE) || stderr.contains(MESSAGE)
            }
        }
    }
}

/// The set of transient conditions a scheduler absorbs without recording.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    conditions: Vec<TransientFailure>,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(conditions: Vec<TransientFailure>) -> Self {
        Self { conditions }
    }

    pub fn expired_session() -> Self {
        Self::new(vec![TransientFailure::ExpiredSession])
    }

    pub fn is_transient(&self, stdout: &str, stderr: &str) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.matches(stdout, stderr))
    }
}
