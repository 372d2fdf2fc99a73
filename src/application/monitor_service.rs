// Monitor service - serializes selection changes and packet routing
//
// A single task owns the engine state. Bus callbacks, toggles and snapshot
// requests all reach it through one queue, so a toggle can never interleave
// with a packet fan-out.
use crate::application::bus::{PacketHandler, PubSubBus};
use crate::application::error::MonitorError;
use crate::application::housekeeping::HousekeepingStats;
use crate::application::lna_selection::LnaSelection;
use crate::application::plot_sink::PlotSinks;
use crate::application::series_registry::{SeriesEntry, SeriesRegistry};
use crate::application::subscription_manager::{PendingRelease, SubscriptionManager};
use crate::application::telemetry_router::{RouteContext, RouteSummary, TelemetryRouter};
use crate::domain::lna::LnaStage;
use crate::domain::palette::ColorPicker;
use crate::domain::selection::{CheckState, Toggle, ToggleOutcome};
use crate::domain::series::{Plot, SeriesKey};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Everything the engine needs to know about the deployment.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub topic_template: String,
    pub span_seconds: f64,
    pub housekeeping_suffix: String,
    /// Channels that may be activated
    pub channels: Vec<String>,
    /// Housekeeping scalars listed for every channel
    pub housekeeping_names: Vec<String>,
}

/// Read-only view of the engine state.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub active_polarimeters: Vec<String>,
    pub active_lna: Vec<LnaStage>,
    pub series: Vec<SeriesEntry>,
    pub housekeeping: BTreeMap<String, BTreeMap<String, String>>,
}

type Reply<T> = oneshot::Sender<Result<T, MonitorError>>;

enum Command {
    Packet(Value),
    TogglePolarimeter {
        name: String,
        toggle: Toggle,
        reply: Reply<ToggleOutcome>,
    },
    ToggleLna {
        stage: LnaStage,
        toggle: Toggle,
        reply: Reply<ToggleOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<MonitorSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Engine state. Only ever touched from the service task.
struct MonitorCore {
    channels: BTreeSet<String>,
    subscriptions: SubscriptionManager,
    lna: LnaSelection,
    registry: SeriesRegistry,
    stats: HousekeepingStats,
    router: TelemetryRouter,
    colors: ColorPicker,
}

impl MonitorCore {
    fn activate_polarimeter(&mut self, name: &str) -> Result<ToggleOutcome, MonitorError> {
        if !self.channels.contains(name) {
            return Err(MonitorError::UnknownPolarimeter(name.to_string()));
        }
        if !self.subscriptions.activate(name) {
            return Ok(ToggleOutcome::Unchanged);
        }

        // All power/demod lines of a channel share one color
        let color = self.colors.next_color();
        self.registry.add_series(&SeriesKey::channel(name), &Plot::POWER_DEMOD, color);
        for stage in self.lna.active() {
            let color = self.colors.next_color();
            self.registry.add_series(&SeriesKey::bias(name, stage), &Plot::BIAS, color);
        }
        self.stats.activate(name);

        tracing::info!(pol = name, "polarimeter activated");
        Ok(ToggleOutcome::Applied)
    }

    /// Remove the channel's series and reset its windows. Returns the pending
    /// unsubscribe, or `None` if the channel was not active.
    fn deactivate_polarimeter(
        &mut self,
        name: &str,
    ) -> Result<Option<PendingRelease>, MonitorError> {
        if !self.channels.contains(name) {
            return Err(MonitorError::UnknownPolarimeter(name.to_string()));
        }
        let Some(release) = self.subscriptions.deactivate(name) else {
            return Ok(None);
        };
        self.teardown(name);
        tracing::info!(pol = name, "polarimeter deactivated");
        Ok(Some(release))
    }

    fn teardown(&mut self, name: &str) {
        self.registry.remove_series(&SeriesKey::channel(name), &Plot::POWER_DEMOD);
        for stage in LnaStage::ALL {
            self.registry.remove_series(&SeriesKey::bias(name, stage), &Plot::BIAS);
        }
        self.stats.reset(name);
    }

    fn toggle_lna(&mut self, stage: LnaStage, toggle: Toggle) -> ToggleOutcome {
        self.lna
            .toggle(
                stage,
                toggle,
                self.subscriptions.active_channels(),
                &mut self.registry,
                &mut self.colors,
            )
            .into()
    }

    fn handle_message(&mut self, fields: Value) -> RouteSummary {
        let ctx = RouteContext {
            subscriptions: &self.subscriptions,
            lna: &self.lna,
            registry: &self.registry,
            stats: &mut self.stats,
        };
        self.router.on_message(fields, ctx)
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            active_polarimeters: self.subscriptions.active_channels().map(str::to_string).collect(),
            active_lna: self.lna.active().collect(),
            series: self.registry.snapshot(),
            housekeeping: self.stats.snapshot(),
        }
    }

    async fn shutdown(&mut self) {
        let active: Vec<String> =
            self.subscriptions.active_channels().map(str::to_string).collect();
        for name in &active {
            self.teardown(name);
        }
        for (channel, result) in self.subscriptions.shutdown().await {
            if let Err(e) = result {
                tracing::warn!(channel = %channel, error = %e, "release failed during shutdown");
            }
        }
    }
}

pub struct MonitorService;

impl MonitorService {
    /// Start the engine task and return a handle to it.
    pub fn spawn(
        bus: Arc<dyn PubSubBus>,
        sinks: PlotSinks,
        settings: MonitorSettings,
        colors: ColorPicker,
    ) -> MonitorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = MonitorHandle { tx };

        let core = MonitorCore {
            channels: settings.channels.into_iter().collect(),
            subscriptions: SubscriptionManager::new(
                bus,
                settings.topic_template,
                handle.packet_handler(),
            ),
            lna: LnaSelection::new(),
            registry: SeriesRegistry::new(sinks),
            stats: HousekeepingStats::new(settings.span_seconds, settings.housekeeping_names),
            router: TelemetryRouter::new(settings.housekeeping_suffix),
            colors,
        };
        tokio::spawn(run(core, rx));

        handle
    }
}

async fn run(mut core: MonitorCore, mut rx: mpsc::UnboundedReceiver<Command>) {
    tracing::info!(channels = core.channels.len(), "monitor started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Packet(fields) => {
                core.handle_message(fields);
            }
            Command::TogglePolarimeter { name, toggle, reply } => match toggle {
                Toggle::On => {
                    let _ = reply.send(core.activate_polarimeter(&name));
                }
                Toggle::Off => match core.deactivate_polarimeter(&name) {
                    Ok(Some(release)) => {
                        // Answer once the bus confirms, without holding up the queue
                        tokio::spawn(async move {
                            let result = release
                                .await
                                .map(|_| ToggleOutcome::Applied)
                                .map_err(MonitorError::from);
                            let _ = reply.send(result);
                        });
                    }
                    Ok(None) => {
                        let _ = reply.send(Ok(ToggleOutcome::Unchanged));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                },
            },
            Command::ToggleLna { stage, toggle, reply } => {
                let _ = reply.send(Ok(core.toggle_lna(stage, toggle)));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(core.snapshot());
            }
            Command::Shutdown { reply } => {
                core.shutdown().await;
                let _ = reply.send(());
                break;
            }
        }
    }

    tracing::info!("monitor stopped");
}

/// Cloneable entry point into the running engine.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl MonitorHandle {
    /// Apply a channel checkbox change. A partially checked box is rejected
    /// without reaching the engine.
    pub async fn set_polarimeter(
        &self,
        name: &str,
        state: CheckState,
    ) -> Result<ToggleOutcome, MonitorError> {
        let toggle = Toggle::try_from(state)?;
        let (reply, rx) = oneshot::channel();
        self.send(Command::TogglePolarimeter {
            name: name.to_string(),
            toggle,
            reply,
        })?;
        rx.await.map_err(|_| MonitorError::Stopped)?
    }

    pub async fn set_lna(
        &self,
        stage: LnaStage,
        enabled: bool,
    ) -> Result<ToggleOutcome, MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ToggleLna {
            stage,
            toggle: Toggle::from(enabled),
            reply,
        })?;
        rx.await.map_err(|_| MonitorError::Stopped)?
    }

    pub async fn snapshot(&self) -> Result<MonitorSnapshot, MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| MonitorError::Stopped)
    }

    /// Bus callback that queues messages for routing.
    pub fn packet_handler(&self) -> PacketHandler {
        let tx = self.tx.clone();
        Arc::new(move |fields: Value| {
            if tx.send(Command::Packet(fields)).is_err() {
                tracing::trace!("monitor stopped, discarding packet");
            }
        })
    }

    /// Release all subscriptions and stop the engine task.
    pub async fn shutdown(&self) -> Result<(), MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply })?;
        rx.await.map_err(|_| MonitorError::Stopped)
    }

    fn send(&self, command: Command) -> Result<(), MonitorError> {
        self.tx.send(command).map_err(|_| MonitorError::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bus::{BusError, Subscription};
    use crate::application::testing::{CallLog, SinkCall, SlowUnsubscribeBus, recording_sinks};
    use crate::domain::selection::SelectionError;
    use crate::infrastructure::local_bus::LocalBus;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;
    use std::time::Duration;

    const HK_NAMES: [&str; 2] = ["VD2_HK", "ID2_HK"];

    fn settings() -> MonitorSettings {
        MonitorSettings {
            topic_template: "strip.pol.${pol}".to_string(),
            span_seconds: 10.0,
            housekeeping_suffix: "_HK".to_string(),
            channels: vec!["pol1".to_string(), "pol2".to_string(), "pol3".to_string()],
            housekeeping_names: HK_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn start() -> (MonitorHandle, LocalBus, Arc<CallLog>) {
        let bus = LocalBus::new();
        let (sinks, log) = recording_sinks();
        let colors = ColorPicker::seeded(42);
        let handle = MonitorService::spawn(Arc::new(bus.clone()), sinks, settings(), colors);
        (handle, bus, log)
    }

    async fn wait_for_subscribers(bus: &LocalBus, topic: &str, expected: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while bus.subscriber_count(topic) != expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription did not settle");
    }

    async fn activate(handle: &MonitorHandle, bus: &LocalBus, pol: &str) {
        let outcome = handle.set_polarimeter(pol, CheckState::Checked).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Applied);
        wait_for_subscribers(bus, &format!("strip.pol.{pol}"), 1).await;
    }

    fn bias_series(snapshot: &MonitorSnapshot) -> BTreeSet<(Plot, String)> {
        snapshot
            .series
            .iter()
            .filter(|e| Plot::BIAS.contains(&e.plot))
            .map(|e| (e.plot, e.key.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_scenario_power_packet_reaches_all_power_sinks() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;

        bus.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 60000.5,
            "PWRQ1": 1.5, "PWRQ2": 2.0, "PWRU1": 0.5, "PWRU2": 0.7,
            "DEMQ1": 0.1, "DEMQ2": 0.2, "DEMU1": 0.3, "DEMU2": 0.4
        }));
        handle.snapshot().await.unwrap();

        let expected = [1.5, 2.0, 0.5, 0.7, 0.1, 0.2, 0.3, 0.4];
        for (plot, value) in Plot::POWER_DEMOD.into_iter().zip(expected) {
            assert_eq!(log.data(plot), vec![("pol1".to_string(), 60000.5, value)], "{plot:?}");
        }
    }

    #[tokio::test]
    async fn test_scenario_selected_bias_stage_is_plotted() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;
        handle.set_lna(LnaStage::Hk2, true).await.unwrap();

        bus.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 7.0, "bias": { "VD2_HK": 3.3, "ID2_HK": 0.01 }
        }));
        handle.snapshot().await.unwrap();

        assert_eq!(log.data(Plot::DrainVoltage), vec![("pol1_hk2".to_string(), 7.0, 3.3)]);
        assert_eq!(log.data(Plot::DrainCurrent), vec![("pol1_hk2".to_string(), 7.0, 0.01)]);
        assert!(log.data(Plot::GateVoltage).is_empty());
        assert!(log.data(Plot::GateCurrent).is_empty());
    }

    #[tokio::test]
    async fn test_scenario_unselected_stage_only_averages() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;

        bus.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 7.0, "bias": { "VD2_HK": 3.3, "ID2_HK": 0.01 }
        }));
        let snapshot = handle.snapshot().await.unwrap();

        assert_eq!(log.count(|c| matches!(c, SinkCall::AddData { .. })), 0);
        assert_eq!(snapshot.housekeeping["pol1"]["VD2_HK"], "3.30");
        assert_eq!(snapshot.housekeeping["pol1"]["ID2_HK"], "0.01");
    }

    #[tokio::test]
    async fn test_scenario_deactivation_clears_everything() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;
        handle.set_lna(LnaStage::Hk2, true).await.unwrap();
        bus.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 7.0, "bias": { "VD2_HK": 3.3 }
        }));
        log.clear();

        let outcome = handle.set_polarimeter("pol1", CheckState::Unchecked).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Applied);

        let removed: BTreeSet<(Plot, String)> = log
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::DelPlot { plot, key } => Some((plot, key)),
                _ => None,
            })
            .collect();
        assert_eq!(removed.len(), 12);
        for plot in Plot::BIAS {
            assert!(removed.contains(&(plot, "pol1_hk2".to_string())));
        }
        for plot in Plot::POWER_DEMOD {
            assert!(removed.contains(&(plot, "pol1".to_string())));
        }

        assert_eq!(bus.subscriber_count("strip.pol.pol1"), 0);
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.active_polarimeters.is_empty());
        assert!(snapshot.series.is_empty());
        assert!(snapshot.housekeeping["pol1"].values().all(|v| v == "undefined"));
    }

    #[tokio::test]
    async fn test_packets_after_deactivation_are_dropped() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;
        handle.set_lna(LnaStage::Hk0, true).await.unwrap();

        // Put the toggle on the queue, then deliver packets behind it
        let late = handle.packet_handler();
        let mut toggle = Box::pin(handle.set_polarimeter("pol1", CheckState::Unchecked));
        assert!(futures::poll!(&mut toggle).is_pending());
        late(json!({ "pol": "pol1", "mjd": 2.0, "bias": { "VD0_HK": 1.0 } }));
        late(json!({
            "pol": "pol1", "mjd": 2.0,
            "PWRQ1": 1.0, "PWRQ2": 1.0, "PWRU1": 1.0, "PWRU2": 1.0,
            "DEMQ1": 1.0, "DEMQ2": 1.0, "DEMU1": 1.0, "DEMU2": 1.0
        }));
        toggle.await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        assert_eq!(log.count(|c| matches!(c, SinkCall::AddData { .. })), 0);
        assert!(snapshot.housekeeping["pol1"].values().all(|v| v == "undefined"));
    }

    #[tokio::test]
    async fn test_lna_toggle_keeps_windows_but_not_series() {
        let (handle, bus, _log) = start();
        activate(&handle, &bus, "pol1").await;
        let before = handle.snapshot().await.unwrap();

        handle.set_lna(LnaStage::Hk2, true).await.unwrap();
        bus.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 1.0, "bias": { "VD2_HK": 2.5 }
        }));
        let during = handle.snapshot().await.unwrap();
        assert_eq!(bias_series(&during).len(), 4);

        handle.set_lna(LnaStage::Hk2, false).await.unwrap();
        let after = handle.snapshot().await.unwrap();

        assert_eq!(after.series, before.series);
        assert_eq!(after.housekeeping["pol1"]["VD2_HK"], "2.50");
    }

    #[tokio::test]
    async fn test_repeated_toggles_are_no_ops() {
        let (handle, bus, log) = start();
        activate(&handle, &bus, "pol1").await;

        let again = handle.set_polarimeter("pol1", CheckState::Checked).await.unwrap();
        assert_eq!(again, ToggleOutcome::Unchanged);
        tokio::task::yield_now().await;
        assert_eq!(bus.subscriber_count("strip.pol.pol1"), 1);
        assert_eq!(log.count(|c| matches!(c, SinkCall::AddPlot { .. })), 8);

        assert_eq!(handle.set_lna(LnaStage::Hk1, true).await.unwrap(), ToggleOutcome::Applied);
        assert_eq!(handle.set_lna(LnaStage::Hk1, true).await.unwrap(), ToggleOutcome::Unchanged);

        let off = handle.set_polarimeter("pol2", CheckState::Unchecked).await.unwrap();
        assert_eq!(off, ToggleOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_invalid_selections_are_rejected() {
        let (handle, _bus, log) = start();

        let err = handle.set_polarimeter("pol1", CheckState::PartiallyChecked).await.unwrap_err();
        assert!(matches!(err, MonitorError::Selection(SelectionError::PartiallyChecked)));

        let err = handle.set_polarimeter("nope", CheckState::Checked).await.unwrap_err();
        assert!(matches!(err, MonitorError::UnknownPolarimeter(name) if name == "nope"));

        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_new_channel_picks_up_active_stages() {
        let (handle, bus, _log) = start();
        handle.set_lna(LnaStage::Hk4a, true).await.unwrap();
        handle.set_lna(LnaStage::Hk5, true).await.unwrap();
        activate(&handle, &bus, "pol2").await;

        let snapshot = handle.snapshot().await.unwrap();
        let bias = bias_series(&snapshot);
        assert_eq!(bias.len(), 8);
        assert!(bias.contains(&(Plot::GateVoltage, "pol2_hk4a".to_string())));
        assert_eq!(snapshot.active_lna, vec![LnaStage::Hk5, LnaStage::Hk4a]);
    }

    #[tokio::test]
    async fn test_series_membership_follows_both_selections() {
        let (handle, bus, _log) = start();
        let pols = ["pol1", "pol2", "pol3"];
        let stages = [LnaStage::Hk0, LnaStage::Hk3, LnaStage::Hk5a];
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..60 {
            if rng.gen_bool(0.5) {
                let pol = pols[rng.gen_range(0..pols.len())];
                let state = if rng.gen_bool(0.5) {
                    CheckState::Checked
                } else {
                    CheckState::Unchecked
                };
                handle.set_polarimeter(pol, state).await.unwrap();
            } else {
                let stage = stages[rng.gen_range(0..stages.len())];
                handle.set_lna(stage, rng.gen_bool(0.5)).await.unwrap();
            }

            let snapshot = handle.snapshot().await.unwrap();
            let mut expected = BTreeSet::new();
            for pol in &snapshot.active_polarimeters {
                for plot in Plot::POWER_DEMOD {
                    expected.insert((plot, pol.clone()));
                }
                for stage in &snapshot.active_lna {
                    for plot in Plot::BIAS {
                        expected.insert((plot, format!("{pol}_{stage}")));
                    }
                }
            }
            let actual: BTreeSet<(Plot, String)> =
                snapshot.series.iter().map(|e| (e.plot, e.key.to_string())).collect();
            assert_eq!(actual, expected);
        }

        let active = handle.snapshot().await.unwrap().active_polarimeters;
        for pol in pols {
            let expected = usize::from(active.iter().any(|a| a == pol));
            wait_for_subscribers(&bus, &format!("strip.pol.{pol}"), expected).await;
        }
    }

    #[tokio::test]
    async fn test_quick_recheck_leaves_one_subscription() {
        let bus = SlowUnsubscribeBus::new(Duration::from_millis(200));
        let (sinks, log) = recording_sinks();
        let handle =
            MonitorService::spawn(Arc::new(bus.clone()), sinks, settings(), ColorPicker::seeded(7));
        activate(&handle, &bus.inner, "pol1").await;

        let off = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.set_polarimeter("pol1", CheckState::Unchecked).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let on = handle.set_polarimeter("pol1", CheckState::Checked).await.unwrap();
        assert_eq!(on, ToggleOutcome::Applied);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(bus.inner.subscriber_count("strip.pol.pol1"), 1);

        off.await.unwrap().unwrap();
        wait_for_subscribers(&bus.inner, "strip.pol.pol1", 1).await;
        log.clear();

        bus.inner.publish("strip.pol.pol1", json!({
            "pol": "pol1", "mjd": 3.0,
            "PWRQ1": 1.0, "PWRQ2": 1.0, "PWRU1": 1.0, "PWRU2": 1.0,
            "DEMQ1": 1.0, "DEMQ2": 1.0, "DEMU1": 1.0, "DEMU2": 1.0
        }));
        handle.snapshot().await.unwrap();

        assert_eq!(bus.inner.subscriber_count("strip.pol.pol1"), 1);
        assert_eq!(log.data(Plot::PwrQ1).len(), 1);
    }

    struct FailingUnsubscribe;

    struct DoomedSubscription(String);

    #[async_trait]
    impl Subscription for DoomedSubscription {
        fn topic(&self) -> &str {
            &self.0
        }

        async fn unsubscribe(self: Box<Self>) -> Result<(), BusError> {
            Err(BusError::Transport("connection lost".to_string()))
        }
    }

    #[async_trait]
    impl PubSubBus for FailingUnsubscribe {
        async fn subscribe(
            &self,
            topic: &str,
            _handler: PacketHandler,
        ) -> Result<Box<dyn Subscription>, BusError> {
            Ok(Box::new(DoomedSubscription(topic.to_string())))
        }
    }

    #[tokio::test]
    async fn test_failed_unsubscribe_still_clears_bookkeeping() {
        let (sinks, _log) = recording_sinks();
        let bus = Arc::new(FailingUnsubscribe);
        let handle = MonitorService::spawn(bus, sinks, settings(), ColorPicker::seeded(1));

        handle.set_polarimeter("pol1", CheckState::Checked).await.unwrap();
        let err = handle.set_polarimeter("pol1", CheckState::Unchecked).await.unwrap_err();
        assert!(matches!(err, MonitorError::Transport(BusError::Transport(_))));

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.active_polarimeters.is_empty());
        assert!(snapshot.series.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_releases_subscriptions() {
        let (handle, bus, _log) = start();
        activate(&handle, &bus, "pol1").await;
        activate(&handle, &bus, "pol3").await;

        handle.shutdown().await.unwrap();

        assert_eq!(bus.subscriber_count("strip.pol.pol1"), 0);
        assert_eq!(bus.subscriber_count("strip.pol.pol3"), 0);
        assert!(matches!(handle.snapshot().await, Err(MonitorError::Stopped)));
    }
}
