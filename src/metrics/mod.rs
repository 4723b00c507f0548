use std::io;
use std::path::PathBuf;

use chrono::Duration;
use spdlog::{error, info, trace};
use tokio::sync::mpsc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use crate::metrics::metric_aggregator::MetricAggregator;
use crate::metrics::metric_publisher::MetricPublisher;
use crate::metrics::metric_types::MetricEvent;

pub mod metric_sender;
pub mod metric_types;
mod metric_aggregator;
mod metric_publisher;

pub use metric_sender::MetricSender;

const DEFAULT_SLOT_SECS: i64 = 60;

pub struct MetricWriter {
    aggregator: MetricAggregator,
    publisher: MetricPublisher,
}

impl MetricWriter {
    pub fn new(base_path: &PathBuf, time_slot_secs: Option<i64>) -> spdlog::Result<Self> {
        let slot_secs = time_slot_secs.unwrap_or(DEFAULT_SLOT_SECS);
        let aggregator = MetricAggregator::new(Duration::seconds(slot_secs));
        let publisher = MetricPublisher::new(base_path)?;

        Ok(Self {
            aggregator,
            publisher,
        })
    }

    pub fn add_event(&mut self, event: MetricEvent) -> io::Result<()> {
        self.aggregator.add(event);
        self.publish_retired()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.aggregator.flush();
        self.publish_retired()
    }

    fn publish_retired(&mut self) -> io::Result<()> {
        if let Some(history) = self.aggregator.take_events() {
            self.publisher.store_events(&history)?;
        }
        Ok(())
    }
}

/// Owns the channel and the background task draining it. Handlers never
/// block on metric writes; a full queue only costs events.
pub struct MetricHandler {
    _receiver_task: JoinHandle<()>,
    sender: Sender<MetricEvent>,
}

impl MetricHandler {
    pub fn new(mut metrics: MetricWriter) -> Self {
        let (tx, mut rx) = mpsc::channel::<MetricEvent>(64);

        let receiver_task = tokio::spawn(async move {
            info!("Starting metrics receiver");
            loop {
                match tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv()).await {
                    Ok(Some(event)) => {
                        if let Err(e) = metrics.add_event(event) {
                            error!("Error writing access metric: {}", e);
                        }
                    }
                    Ok(None) => break,
                    Err(_timeout) => {
                        if let Err(e) = metrics.flush() {
                            error!("Error flushing access metric: {}", e);
                        }
                        trace!("Timeout - flushing metrics");
                    }
                }
            }
        });

        Self {
            _receiver_task: receiver_task,
            sender: tx,
        }
    }

    pub fn new_sender(&self) -> MetricSender {
        MetricSender::new(self.sender.clone())
    }

    pub fn no_op() -> MetricSender {
        MetricSender::no_op()
    }
}
