//! Streaming statistics

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Number of load latencies kept for the rolling average
pub const LATENCY_WINDOW: usize = 20;

/// Rolling window of recent load latencies
#[derive(Clone, Debug)]
pub struct LoadLatency {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl Default for LoadLatency {
    fn default() -> Self {
        Self::new(LATENCY_WINDOW)
    }
}

impl LoadLatency {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, latency: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency.as_secs_f32() * 1000.0);
    }

    /// Average of the window in milliseconds, zero when empty
    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Aggregate chunk manager statistics, refreshed every update
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StreamingStats {
    /// Records in the registry, any state
    pub total_chunks: usize,
    /// Records in `Loaded` or `Active`
    pub loaded_chunks: usize,
    /// Records in `Active`
    pub active_chunks: usize,
    /// Records in `Loading`
    pub loading_chunks: usize,
    pub queued_loads: usize,
    pub queued_unloads: usize,
    /// Summed content estimate of all records
    pub memory_usage_mb: f32,
    pub memory_budget_mb: f32,
    /// Usage / budget
    pub memory_pressure: f32,
    /// Rolling average of the last loads
    pub avg_load_time_ms: f32,
}
