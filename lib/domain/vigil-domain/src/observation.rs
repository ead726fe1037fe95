/// Outcome of one probe invocation, with whatever output was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
}

impl Observation {
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            passed: true,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn failure(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            passed: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}
