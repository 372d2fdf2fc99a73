// Plot sink that reports series activity through tracing
use crate::application::plot_sink::PlotSink;
use crate::domain::series::{Color, Plot};

/// Stand-in for a rendered plot: logs every call under the plot's name.
#[derive(Debug, Clone, Copy)]
pub struct TracingPlotSink {
    plot: Plot,
}

impl TracingPlotSink {
    pub fn new(plot: Plot) -> Self {
        Self { plot }
    }
}

impl PlotSink for TracingPlotSink {
    fn add_plot(&self, key: &str, color: Color) {
        tracing::info!(
            plot = ?self.plot,
            title = self.plot.title(),
            series = key,
            color = %color,
            "series added"
        );
    }

    fn del_plot(&self, key: &str) {
        tracing::info!(
            plot = ?self.plot,
            title = self.plot.title(),
            series = key,
            "series removed"
        );
    }

    fn add_data(&self, key: &str, mjd: f64, value: f64) {
        tracing::trace!(plot = ?self.plot, series = key, mjd, value, "sample");
    }
}
