use std::sync::{Arc, Mutex};

/// Shared append-only text buffer that command output drains into.
/// Accumulates across runs until a caller takes the contents, so one logged
/// phase must clear it before the next begins.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    buffer: Arc<Mutex<String>>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, text: &str) {
        self.buffer
            .lock()
            .expect("output sink lock poisoned")
            .push_str(text);
    }

    pub fn snapshot(&self) -> String {
        self.buffer
            .lock()
            .expect("output sink lock poisoned")
            .clone()
    }

    /// Read and clear in one step.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock().expect("output sink lock poisoned"))
    }

    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .expect("output sink lock poisoned")
            .is_empty()
    }
}
