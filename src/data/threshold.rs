//! BPM alert threshold.

/// Decides whether a reading should raise an alert.
///
/// The threshold is read once at startup and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    threshold: u32,
}

impl ThresholdPolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// True when `bpm` is strictly above the threshold.
    pub fn is_over_threshold(&self, bpm: u32) -> bool {
        bpm > self.threshold
    }
}
