// Test doubles shared by the application tests
use crate::application::bus::{BusError, PacketHandler, PubSubBus, Subscription};
use crate::application::plot_sink::{PlotSink, PlotSinks};
use crate::domain::series::{Color, Plot};
use crate::infrastructure::local_bus::LocalBus;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    AddPlot { plot: Plot, key: String, color: Color },
    DelPlot { plot: Plot, key: String },
    AddData { plot: Plot, key: String, mjd: f64, value: f64 },
}

impl SinkCall {
    pub fn plot(&self) -> Plot {
        match self {
            SinkCall::AddPlot { plot, .. }
            | SinkCall::DelPlot { plot, .. }
            | SinkCall::AddData { plot, .. } => *plot,
        }
    }
}

/// Ordered log of every call made on any recording sink.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<SinkCall>>,
}

impl CallLog {
    fn push(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, pred: impl Fn(&SinkCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// `(key, mjd, value)` of every sample sent to `plot`.
    pub fn data(&self, plot: Plot) -> Vec<(String, f64, f64)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SinkCall::AddData { plot: p, key, mjd, value } if *p == plot => {
                    Some((key.clone(), *mjd, *value))
                }
                _ => None,
            })
            .collect()
    }
}

struct RecordingSink {
    plot: Plot,
    log: Arc<CallLog>,
}

impl PlotSink for RecordingSink {
    fn add_plot(&self, key: &str, color: Color) {
        self.log.push(SinkCall::AddPlot {
            plot: self.plot,
            key: key.to_string(),
            color,
        });
    }

    fn del_plot(&self, key: &str) {
        self.log.push(SinkCall::DelPlot {
            plot: self.plot,
            key: key.to_string(),
        });
    }

    fn add_data(&self, key: &str, mjd: f64, value: f64) {
        self.log.push(SinkCall::AddData {
            plot: self.plot,
            key: key.to_string(),
            mjd,
            value,
        });
    }
}

/// One recording sink per plot, all writing to the same log.
pub fn recording_sinks() -> (PlotSinks, Arc<CallLog>) {
    let log = Arc::new(CallLog::default());
    let sinks = PlotSinks::from_fn(|plot| {
        Arc::new(RecordingSink {
            plot,
            log: log.clone(),
        }) as Arc<dyn PlotSink>
    });
    (sinks, log)
}

/// Loopback bus whose unsubscribes take `delay` to complete.
#[derive(Clone)]
pub struct SlowUnsubscribeBus {
    pub inner: LocalBus,
    pub delay: Duration,
}

impl SlowUnsubscribeBus {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: LocalBus::new(),
            delay,
        }
    }
}

#[async_trait]
impl PubSubBus for SlowUnsubscribeBus {
    async fn subscribe(
        &self,
        topic: &str,
        handler: PacketHandler,
    ) -> Result<Box<dyn Subscription>, BusError> {
        let inner = self.inner.subscribe(topic, handler).await?;
        Ok(Box::new(SlowSubscription {
            inner,
            delay: self.delay,
        }))
    }
}

struct SlowSubscription {
    inner: Box<dyn Subscription>,
    delay: Duration,
}

#[async_trait]
impl Subscription for SlowSubscription {
    fn topic(&self) -> &str {
        self.inner.topic()
    }

    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError> {
        tokio::time::sleep(self.delay).await;
        self.inner.unsubscribe().await
    }
}
