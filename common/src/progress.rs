use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

/// Shared handle for observing a slicing run from another thread. The
/// slicing thread stores fractional percentages, the observing thread
/// polls them.
#[derive(Clone)]
pub struct Progress(Arc<ProgressInner>);

struct ProgressInner {
    // Percent scaled by 100 so it fits in an atomic.
    centi_percent: AtomicU32,
}

impl Progress {
    pub fn new() -> Self {
        Self(Arc::new(ProgressInner {
            centi_percent: AtomicU32::new(0),
        }))
    }

    /// Returns the last reported completion percentage, in `0.0..=100.0`.
    pub fn percent(&self) -> f32 {
        self.0.centi_percent.load(Ordering::Relaxed) as f32 / 100.0
    }

    pub fn finished(&self) -> bool {
        self.0.centi_percent.load(Ordering::Relaxed) >= 100_00
    }

    /// Records a completion percentage. Values are clamped so a stale
    /// writer can never report more than 100%.
    pub fn report(&self, percent: f32) {
        let value = (percent.clamp(0.0, 100.0) * 100.0) as u32;
        self.0.centi_percent.fetch_max(value, Ordering::Relaxed);
    }

    pub fn set_finished(&self) {
        self.0.centi_percent.store(100_00, Ordering::Relaxed);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_are_monotonic() {
        let progress = Progress::new();
        progress.report(42.5);
        progress.report(10.0);
        assert_eq!(progress.percent(), 42.5);

        progress.report(100.0);
        assert!(progress.finished());
    }
}
