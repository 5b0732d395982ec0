use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic clock the session reads timestamps from.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Wall clock in nanoseconds since creation, plus a ring of recent frame
/// durations for pacing diagnostics.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frame_times: Vec<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame_times: Vec::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }

    pub fn frame_stats(&self) -> FrameStats {
        let times: Vec<f64> = self
            .frame_times
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return FrameStats::default();
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        FrameStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// test can keep one handle and advance the copy owned by the session.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_timer_clones_share_time() {
        let timer = ManualTimer::new();
        let handle = timer.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(timer.now(), 250_000_000);
        assert_eq!(timer.elapsed(50_000_000), Duration::from_millis(200));
    }

    #[test]
    fn test_elapsed_saturates_for_future_timestamps() {
        let timer = ManualTimer::new();
        assert_eq!(timer.elapsed(10), Duration::ZERO);
    }

    #[test]
    fn test_frame_stats() {
        let mut timer = HighPrecisionTimer::new();
        assert_eq!(timer.frame_stats(), FrameStats::default());
        timer.max_samples = 2;
        timer.record_frame(Duration::from_millis(100));
        timer.record_frame(Duration::from_millis(10));
        timer.record_frame(Duration::from_millis(20));
        assert_eq!(timer.frame_times.len(), 2);
        let stats = timer.frame_stats();
        assert_eq!(stats.min_frame_time_ns, 10_000_000.0);
        assert_eq!(stats.max_frame_time_ns, 20_000_000.0);
        assert!((stats.effective_fps - 1e9 / 15_000_000.0).abs() < 1e-9);
    }
}
