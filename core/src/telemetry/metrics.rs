use std::sync::Mutex;

/// Accepted/rejected trace counters for a filtering run.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    accepted: usize,
    rejected: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                accepted: 0,
                rejected: 0,
            }),
        }
    }

    pub fn record_accepted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.accepted += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.accepted, metrics.rejected)
        } else {
            (0, 0)
        }
    }

    pub fn reset(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.accepted = 0;
            metrics.rejected = 0;
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        let metrics = MetricsRecorder::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_rejected();
        assert_eq!(metrics.snapshot(), (2, 1));
        metrics.reset();
        assert_eq!(metrics.snapshot(), (0, 0));
    }
}
