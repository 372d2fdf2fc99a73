// Telemetry router - fans one inbound packet out to series and window averages
use crate::application::housekeeping::HousekeepingStats;
use crate::application::lna_selection::LnaSelection;
use crate::application::series_registry::SeriesRegistry;
use crate::application::subscription_manager::SubscriptionManager;
use crate::domain::packet::{PacketError, Payload, TelemetryPacket};
use crate::domain::series::{Plot, SeriesKey};
use serde_json::Value;
use std::collections::BTreeMap;

/// Engine state a packet is routed against.
pub struct RouteContext<'a> {
    pub subscriptions: &'a SubscriptionManager,
    pub lna: &'a LnaSelection,
    pub registry: &'a SeriesRegistry,
    pub stats: &'a mut HousekeepingStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteSummary {
    /// Samples forwarded to plot sinks
    pub plotted: usize,
    /// Samples fed into window averages
    pub averaged: usize,
}

pub struct TelemetryRouter {
    housekeeping_suffix: String,
}

impl TelemetryRouter {
    pub fn new(housekeeping_suffix: impl Into<String>) -> Self {
        Self {
            housekeeping_suffix: housekeeping_suffix.into(),
        }
    }

    /// Parse and route the named fields of one bus message.
    pub fn on_message(&self, fields: Value, ctx: RouteContext<'_>) -> RouteSummary {
        match TelemetryPacket::from_value(fields) {
            Ok(packet) => self.on_packet(&packet, ctx),
            Err(PacketError::IncompletePowerDemod { pol, .. })
                if !ctx.subscriptions.is_active(&pol) =>
            {
                RouteSummary::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping packet");
                RouteSummary::default()
            }
        }
    }

    pub fn on_packet(&self, packet: &TelemetryPacket, ctx: RouteContext<'_>) -> RouteSummary {
        if !ctx.subscriptions.is_active(&packet.pol) {
            // Late delivery for a channel that was just switched off
            tracing::trace!(pol = %packet.pol, "dropping packet for inactive channel");
            return RouteSummary::default();
        }

        let summary = match &packet.payload {
            Payload::PowerDemod(readings) => {
                let key = SeriesKey::channel(packet.pol.as_str());
                let plotted = readings
                    .iter()
                    .filter(|&(plot, value)| ctx.registry.add_data(plot, &key, packet.mjd, value))
                    .count();
                RouteSummary { plotted, averaged: 0 }
            }
            Payload::Bias { readings, rejected } => {
                if !rejected.is_empty() {
                    tracing::warn!(
                        pol = %packet.pol,
                        fields = ?rejected,
                        "skipping non-numeric bias fields"
                    );
                }
                self.route_bias(packet, readings, ctx)
            }
            Payload::Empty => {
                tracing::debug!(pol = %packet.pol, "packet carries no known payload");
                RouteSummary::default()
            }
        };

        tracing::trace!(
            pol = %packet.pol,
            plotted = summary.plotted,
            averaged = summary.averaged,
            "packet routed"
        );
        summary
    }

    fn route_bias(
        &self,
        packet: &TelemetryPacket,
        readings: &BTreeMap<String, f64>,
        ctx: RouteContext<'_>,
    ) -> RouteSummary {
        let mut summary = RouteSummary::default();

        for stage in ctx.lna.active() {
            let key = SeriesKey::bias(packet.pol.as_str(), stage);
            for plot in Plot::BIAS {
                let field = plot.bias_field(stage, &self.housekeeping_suffix);
                if let Some(&value) = readings.get(&field) {
                    if ctx.registry.add_data(plot, &key, packet.mjd, value) {
                        summary.plotted += 1;
                    }
                }
            }
        }

        // Averages follow every housekeeping scalar, plotted or not
        let seconds = packet.seconds();
        for (name, &value) in readings {
            if name.ends_with(&self.housekeeping_suffix) {
                ctx.stats.record(&packet.pol, name, seconds, value);
                summary.averaged += 1;
            }
        }

        summary
    }
}
