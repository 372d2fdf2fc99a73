// Sliding-window running average for one housekeeping scalar
use std::collections::VecDeque;

/// Display text of a window holding no samples.
pub const UNDEFINED: &str = "undefined";

/// Time-bounded running mean.
///
/// Samples accumulate while the newest one lies within `span` of the oldest.
/// Once a sample would exceed that, the oldest slot is recycled for it, so the
/// buffer behaves as a ring whose capacity is however many samples fit in the
/// window the first time it filled. A later sample that fits within `span` of
/// the (new) oldest sample grows the buffer again.
#[derive(Debug, Clone)]
pub struct SlidingWindowAverage {
    span: f64,
    samples: VecDeque<(f64, f64)>,
}

impl SlidingWindowAverage {
    pub fn new(span: f64) -> Self {
        Self {
            span,
            samples: VecDeque::new(),
        }
    }

    pub fn add(&mut self, timestamp: f64, value: f64) {
        let fits = match self.samples.front() {
            None => true,
            Some(&(oldest, _)) => timestamp - oldest <= self.span,
        };

        if !fits {
            // Overwrite the oldest slot and rotate it to the back.
            self.samples.pop_front();
        }
        self.samples.push_back((timestamp, value));
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: f64 = self.samples.iter().map(|&(_, v)| v).sum();
        Some(total / self.samples.len() as f64)
    }

    /// Mean with two decimals, or [`UNDEFINED`].
    pub fn display(&self) -> String {
        match self.mean() {
            Some(mean) => format!("{:.2}", mean),
            None => UNDEFINED.to_string(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    pub fn span(&self) -> f64 {
        self.span
    }
}
