use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use vigil_domain::{ResultSet, RetryPolicy};
use vigil_ports::Probe;

/// Drives one probe on a fixed interval, feeding every outcome into its own
/// result set. Transient failures matched by the retry policy are absorbed
/// without being recorded; the pass/fail comparison against the tolerance
/// happens once, when the scheduler is stopped.
pub struct PeriodicScheduler {
    probe: Arc<dyn Probe>,
    interval: Duration,
    results: ResultSet,
    allowed_failures: usize,
    retry: RetryPolicy,
}

/// Final accounting for one probe after the observation window.
#[derive(Debug, Clone)]
pub struct SchedulerVerdict {
    pub probe: &'static str,
    pub recorded: usize,
    pub failures: usize,
    pub allowed_failures: usize,
}

impl SchedulerVerdict {
    pub fn failed(&self) -> bool {
        self.failures > self.allowed_failures
    }
}

impl PeriodicScheduler {
    pub fn new(
        probe: Arc<dyn Probe>,
        interval: Duration,
        allowed_failures: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            probe,
            interval,
            results: ResultSet::new(),
            allowed_failures,
            retry,
        }
    }

    /// Ticks until the token fires. A tick's observation always runs to
    /// completion and is recorded before the stop signal is looked at again,
    /// so no in-flight outcome is lost.
    pub async fn run(mut self, stop: CancellationToken) -> SchedulerVerdict {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        let verdict = SchedulerVerdict {
            probe: self.probe.name(),
            recorded: self.results.len(),
            failures: self.results.failure_count(),
            allowed_failures: self.allowed_failures,
        };
        debug!(
            probe = verdict.probe,
            recorded = verdict.recorded,
            failures = verdict.failures,
            "scheduler stopped"
        );
        verdict
    }

    async fn tick(&mut self) {
        let observation = self.probe.observe().await;
        if observation.passed {
            self.results.record(true);
            return;
        }

        if self
            .retry
            .is_transient(&observation.stdout, &observation.stderr)
        {
            debug!(
                probe = self.probe.name(),
                "transient failure absorbed, retrying on next tick"
            );
            return;
        }

        self.results.record(false);
        error!(
            probe = self.probe.name(),
            interval_secs = self.interval.as_secs_f64(),
            stdout = %observation.stdout,
            stderr = %observation.stderr,
            "probe failed"
        );
    }
}
