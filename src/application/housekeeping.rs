// Housekeeping statistics - window averages per (channel, scalar)
use crate::domain::window::SlidingWindowAverage;
use std::collections::BTreeMap;

pub struct HousekeepingStats {
    span_seconds: f64,
    names: Vec<String>,
    channels: BTreeMap<String, BTreeMap<String, SlidingWindowAverage>>,
}

impl HousekeepingStats {
    /// `names` seeds each channel's windows so they are listed before the
    /// first bias packet arrives.
    pub fn new(span_seconds: f64, names: Vec<String>) -> Self {
        Self {
            span_seconds,
            names,
            channels: BTreeMap::new(),
        }
    }

    /// Create the channel's windows on first activation. Existing windows are
    /// kept as they are.
    pub fn activate(&mut self, pol: &str) {
        if self.channels.contains_key(pol) {
            return;
        }
        let windows = self
            .names
            .iter()
            .map(|name| (name.clone(), SlidingWindowAverage::new(self.span_seconds)))
            .collect();
        self.channels.insert(pol.to_string(), windows);
    }

    pub fn record(&mut self, pol: &str, name: &str, seconds: f64, value: f64) {
        let span = self.span_seconds;
        let windows = self.channels.entry(pol.to_string()).or_default();
        match windows.get_mut(name) {
            Some(window) => window.add(seconds, value),
            None => {
                tracing::debug!(pol, name, "tracking housekeeping scalar missing from topology");
                let mut window = SlidingWindowAverage::new(span);
                window.add(seconds, value);
                windows.insert(name.to_string(), window);
            }
        }
    }

    pub fn reset(&mut self, pol: &str) {
        if let Some(windows) = self.channels.get_mut(pol) {
            windows.values_mut().for_each(SlidingWindowAverage::reset);
        }
    }

    #[cfg(test)]
    pub fn window(&self, pol: &str, name: &str) -> Option<&SlidingWindowAverage> {
        self.channels.get(pol)?.get(name)
    }

    /// Display text of every window, by channel then scalar name.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.channels
            .iter()
            .map(|(pol, windows)| {
                let displays = windows
                    .iter()
                    .map(|(name, window)| (name.clone(), window.display()))
                    .collect();
                (pol.clone(), displays)
            })
            .collect()
    }
}
