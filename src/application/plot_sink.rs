// Plot sink abstraction and the set of sinks the monitor draws on
use crate::domain::series::{Color, Plot};
use std::collections::HashMap;
use std::sync::Arc;

/// A rendering target holding named, colored series.
pub trait PlotSink: Send + Sync {
    fn add_plot(&self, key: &str, color: Color);

    fn del_plot(&self, key: &str);

    fn add_data(&self, key: &str, mjd: f64, value: f64);
}

/// One sink per [`Plot`].
#[derive(Clone)]
pub struct PlotSinks {
    sinks: HashMap<Plot, Arc<dyn PlotSink>>,
}

impl PlotSinks {
    pub fn from_fn<F>(mut make: F) -> Self
    where
        F: FnMut(Plot) -> Arc<dyn PlotSink>,
    {
        let sinks = Plot::ALL.into_iter().map(|plot| (plot, make(plot))).collect();
        Self { sinks }
    }

    pub fn get(&self, plot: Plot) -> &dyn PlotSink {
        // from_fn fills every variant of Plot::ALL
        self.sinks[&plot].as_ref()
    }
}
