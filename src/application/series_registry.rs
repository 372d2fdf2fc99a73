// Series registry - membership of plotted lines across the plot sinks
use crate::application::plot_sink::PlotSinks;
use crate::domain::series::{Color, Plot, SeriesKey};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub plot: Plot,
    pub key: SeriesKey,
    pub color: Color,
}

pub struct SeriesRegistry {
    sinks: PlotSinks,
    members: BTreeMap<(Plot, SeriesKey), Color>,
}

impl SeriesRegistry {
    pub fn new(sinks: PlotSinks) -> Self {
        Self {
            sinks,
            members: BTreeMap::new(),
        }
    }

    /// Add `key` to each of `plots`. Plots already holding the key are left
    /// alone. Returns whether any sink was touched.
    pub fn add_series(&mut self, key: &SeriesKey, plots: &[Plot], color: Color) -> bool {
        let mut changed = false;
        for &plot in plots {
            let member = (plot, key.clone());
            if self.members.contains_key(&member) {
                tracing::debug!(plot = ?plot, series = %key, "series already present");
                continue;
            }
            self.sinks.get(plot).add_plot(&key.to_string(), color);
            self.members.insert(member, color);
            changed = true;
        }
        changed
    }

    /// Remove `key` from each of `plots` that holds it.
    pub fn remove_series(&mut self, key: &SeriesKey, plots: &[Plot]) -> bool {
        let mut changed = false;
        for &plot in plots {
            if self.members.remove(&(plot, key.clone())).is_some() {
                self.sinks.get(plot).del_plot(&key.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Forward one sample, only if the series currently exists.
    pub fn add_data(&self, plot: Plot, key: &SeriesKey, mjd: f64, value: f64) -> bool {
        if !self.members.contains_key(&(plot, key.clone())) {
            tracing::debug!(plot = ?plot, series = %key, "dropping sample for absent series");
            return false;
        }
        self.sinks.get(plot).add_data(&key.to_string(), mjd, value);
        true
    }

    #[cfg(test)]
    pub fn contains(&self, plot: Plot, key: &SeriesKey) -> bool {
        self.members.contains_key(&(plot, key.clone()))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn snapshot(&self) -> Vec<SeriesEntry> {
        self.members
            .iter()
            .map(|((plot, key), color)| SeriesEntry {
                plot: *plot,
                key: key.clone(),
                color: *color,
            })
            .collect()
    }
}
