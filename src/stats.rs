use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::timer_query::Nanoseconds;

/// Number of GPU timings kept for the report.
pub const TIMING_WINDOW: usize = 60;

/// Per-frame numbers plus a rolling window of GPU render times.
#[derive(Debug, Clone)]
pub struct FrameStatistics {
    /// Milliseconds between the starts of the last two frames.
    pub dt: f32,
    pub fps: f32,
    /// CPU milliseconds spent inside the last frame.
    pub frame_time: f32,
    /// Most recent GPU render time in milliseconds, if any arrived yet.
    pub render_time: Option<f64>,
    pub frame_count: u64,
    last_time: Option<Instant>,
    samples: VecDeque<f64>,
}

impl Default for FrameStatistics {
    fn default() -> Self {
        Self {
            dt: 0.0,
            fps: 0.0,
            frame_time: 0.0,
            render_time: None,
            frame_count: 0,
            last_time: None,
            samples: VecDeque::with_capacity(TIMING_WINDOW + 1),
        }
    }
}

impl FrameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates `dt` and `fps` from the previous frame's start. The first
    /// frame reports zero for both.
    pub fn begin_frame(&mut self, now: Instant) {
        match self.last_time {
            Some(last) => {
                self.dt = now.saturating_duration_since(last).as_secs_f32() * 1000.0;
                self.fps = if self.dt > 0.0 { 1000.0 / self.dt } else { 0.0 };
            }
            None => {
                self.dt = 0.0;
                self.fps = 0.0;
            }
        }
    }

    pub fn end_frame(&mut self, started: Instant, cpu_time: Duration) {
        self.last_time = Some(started);
        self.frame_time = cpu_time.as_secs_f32() * 1000.0;
        self.frame_count += 1;
    }

    /// Adds a GPU timing, evicting the oldest once the window is full.
    pub fn record_gpu_time(&mut self, elapsed: Nanoseconds) {
        let ms = elapsed as f64 / 1_000_000.0;
        self.render_time = Some(ms);
        self.samples.push_back(ms);
        while self.samples.len() > TIMING_WINDOW {
            self.samples.pop_front();
        }
    }

    /// GPU timings in milliseconds, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Summary of the current window, recomputed on every call.
    pub fn report(&self) -> Option<TimingReport> {
        TimingReport::from_samples(self.samples.iter().copied())
    }
}

/// Summary of GPU render times, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingReport {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl TimingReport {
    /// `None` for an empty sample set.
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len() as f64;
        let average = sorted.iter().sum::<f64>() / count;
        let variance = sorted.iter().map(|s| (s - average).powi(2)).sum::<f64>() / count;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            average,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median,
            std_dev: variance.sqrt(),
        })
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average Time: {:.3} ms", self.average)?;
        writeln!(f, "Minimum Time: {:.3} ms", self.min)?;
        writeln!(f, "Maximum Time: {:.3} ms", self.max)?;
        writeln!(f, "Median Time: {:.3} ms", self.median)?;
        write!(f, "Standard Deviation Time: {:.3} ms", self.std_dev)
    }
}
