use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters describing how lookups were satisfied
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    pub lookups: AtomicUsize,
    pub value_hits: AtomicUsize,
    pub factory_hits: AtomicUsize,
    pub interface_matches: AtomicUsize,
    pub parent_lookups: AtomicUsize,
    pub misses: AtomicUsize,
    pub factory_invocations: AtomicUsize,
    pub memoized: AtomicUsize,
    pub loops_detected: AtomicUsize,
}

/// Plain copy of [`ResolutionMetrics`] at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lookups: usize,
    pub value_hits: usize,
    pub factory_hits: usize,
    pub interface_matches: usize,
    pub parent_lookups: usize,
    pub misses: usize,
    pub factory_invocations: usize,
    pub memoized: usize,
    pub loops_detected: usize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.lookups.store(0, Ordering::SeqCst);
        self.value_hits.store(0, Ordering::SeqCst);
        self.factory_hits.store(0, Ordering::SeqCst);
        self.interface_matches.store(0, Ordering::SeqCst);
        self.parent_lookups.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        self.factory_invocations.store(0, Ordering::SeqCst);
        self.memoized.store(0, Ordering::SeqCst);
        self.loops_detected.store(0, Ordering::SeqCst);
    }

    pub fn record(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups: self.lookups.load(Ordering::SeqCst),
            value_hits: self.value_hits.load(Ordering::SeqCst),
            factory_hits: self.factory_hits.load(Ordering::SeqCst),
            interface_matches: self.interface_matches.load(Ordering::SeqCst),
            parent_lookups: self.parent_lookups.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            factory_invocations: self.factory_invocations.load(Ordering::SeqCst),
            memoized: self.memoized.load(Ordering::SeqCst),
            loops_detected: self.loops_detected.load(Ordering::SeqCst),
        }
    }
}

impl MetricsSnapshot {
    /// Fraction of lookups answered without calling a factory or the parent
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            (self.value_hits + self.interface_matches) as f64 / self.lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let metrics = ResolutionMetrics::new();
        ResolutionMetrics::record(&metrics.lookups);
        ResolutionMetrics::record(&metrics.lookups);
        ResolutionMetrics::record(&metrics.value_hits);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lookups, 2);
        assert_eq!(snapshot.value_hits, 1);
        assert_eq!(snapshot.hit_rate(), 0.5);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
        assert_eq!(metrics.snapshot().hit_rate(), 0.0);
    }
}
