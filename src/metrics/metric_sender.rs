use spdlog::error;
use tokio::sync::mpsc::Sender;

use crate::metrics::metric_types::{EventApi, ListDetail, MetricEvent, PageDetail, PostDetail};

/// Handler-side handle. Cheap to clone into requests; the no-op variant
/// backs deployments without a metrics section in the config.
#[derive(Clone)]
pub struct MetricSender {
    sender_ch: Option<Sender<MetricEvent>>,
}

impl MetricSender {
    pub fn new(sender_ch: Sender<MetricEvent>) -> Self {
        Self {
            sender_ch: Some(sender_ch),
        }
    }

    pub fn no_op() -> Self {
        Self { sender_ch: None }
    }

    pub async fn index(&self, origin: String) {
        self.send(MetricEvent { api: EventApi::Index, origin }).await;
    }

    pub async fn list(&self, filtered: bool, origin: String) {
        self.send(MetricEvent { api: EventApi::List(ListDetail { filtered }), origin }).await;
    }

    pub async fn view(&self, post_name: String, origin: String) {
        self.send(MetricEvent { api: EventApi::View(PostDetail { post_name }), origin }).await;
    }

    pub async fn page(&self, page_name: String, origin: String) {
        self.send(MetricEvent { api: EventApi::Page(PageDetail { page_name }), origin }).await;
    }

    pub async fn schedule(&self, origin: String) {
        self.send(MetricEvent { api: EventApi::Schedule, origin }).await;
    }

    pub async fn rss(&self, origin: String) {
        self.send(MetricEvent { api: EventApi::Rss, origin }).await;
    }

    async fn send(&self, event: MetricEvent) {
        if let Some(ref sender) = self.sender_ch {
            if let Err(e) = sender.send(event).await {
                error!("Error queueing access metric: {}", e);
            }
        }
    }
}
