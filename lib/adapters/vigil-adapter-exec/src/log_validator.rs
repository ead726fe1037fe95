use vigil_ports::LogValidator;

/// Accepts captured platform logs when the newest application log line ends
/// with a positive epoch timestamp, which is what the bundled sample app
/// prints on every request. Router and platform lines are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppLogValidator;

impl AppLogValidator {
    pub fn new() -> Self {
        Self
    }
}

impl LogValidator for AppLogValidator {
    fn accepts(&self, text: &str) -> bool {
        for line in text.lines().rev() {
            if !line.contains("[APP") {
                continue;
            }
            return line
                .split_whitespace()
                .next_back()
                .and_then(|token| token.parse::<i64>().ok())
                .is_some_and(|epoch| epoch > 0);
        }
        false
    }
}
