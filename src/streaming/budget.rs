//! Advisory memory budget for streaming
//!
//! Tracks the summed content estimate of registered chunks against the
//! configured budget. The budget is a monitoring signal only: distance is
//! the sole reason a chunk is unloaded.

const BYTES_PER_MB: f32 = 1024.0 * 1024.0;

/// Memory budget tracker
#[derive(Clone, Debug)]
pub struct MemoryBudget {
    /// Configured budget (bytes)
    budget_bytes: usize,
    /// Current estimate (bytes)
    used_bytes: usize,
    /// Set while over budget so the overshoot is logged once
    warned: bool,
}

impl MemoryBudget {
    /// Create a budget of `budget_mb` megabytes
    pub fn new(budget_mb: f32) -> Self {
        Self {
            budget_bytes: (budget_mb.max(0.0) * BYTES_PER_MB) as usize,
            used_bytes: 0,
            warned: false,
        }
    }

    /// Replace the current estimate.
    ///
    /// Logs a warning the first time usage crosses the budget; the warning
    /// re-arms once usage drops back under.
    pub fn set_usage(&mut self, bytes: usize) {
        self.used_bytes = bytes;

        if self.is_over_budget() {
            if !self.warned {
                log::warn!(
                    "chunk memory estimate {:.1} MB exceeds advisory budget {:.1} MB",
                    self.used_mb(),
                    self.budget_mb()
                );
                self.warned = true;
            }
        } else {
            self.warned = false;
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    pub fn used_mb(&self) -> f32 {
        self.used_bytes as f32 / BYTES_PER_MB
    }

    pub fn budget_mb(&self) -> f32 {
        self.budget_bytes as f32 / BYTES_PER_MB
    }

    /// Bytes left before the budget is reached
    pub fn available(&self) -> usize {
        self.budget_bytes.saturating_sub(self.used_bytes)
    }

    /// Usage ratio (0.0 to 1.0+); zero when no budget is configured
    pub fn pressure(&self) -> f32 {
        if self.budget_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f32 / self.budget_bytes as f32
    }

    pub fn is_over_budget(&self) -> bool {
        self.budget_bytes > 0 && self.used_bytes > self.budget_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    #[test]
    fn test_budget_creation() {
        let budget = MemoryBudget::new(64.0);
        assert_eq!(budget.budget_bytes(), 64 * MB);
        assert_eq!(budget.used_bytes(), 0);
        assert_eq!(budget.available(), 64 * MB);
        assert_eq!(budget.pressure(), 0.0);
    }

    #[test]
    fn test_pressure() {
        let mut budget = MemoryBudget::new(100.0);
        budget.set_usage(50 * MB);
        assert!((budget.pressure() - 0.5).abs() < 1e-6);
        assert!((budget.used_mb() - 50.0).abs() < 1e-4);
        assert!(!budget.is_over_budget());

        budget.set_usage(150 * MB);
        assert!(budget.pressure() > 1.0);
        assert!(budget.is_over_budget());
        assert_eq!(budget.available(), 0);
    }

    #[test]
    fn test_warning_rearms() {
        let mut budget = MemoryBudget::new(1.0);
        budget.set_usage(2 * MB);
        assert!(budget.warned);
        budget.set_usage(3 * MB);
        assert!(budget.warned);
        budget.set_usage(0);
        assert!(!budget.warned);
    }

    #[test]
    fn test_zero_budget() {
        let mut budget = MemoryBudget::new(0.0);
        budget.set_usage(10 * MB);
        assert_eq!(budget.pressure(), 0.0);
        assert!(!budget.is_over_budget());
    }
}
