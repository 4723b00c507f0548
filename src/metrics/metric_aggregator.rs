use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use spdlog::debug;

use crate::metrics::metric_types::{EventApi, MetricEvent};

pub struct Event {
    pub metric_event: MetricEvent,
    pub date_time: DateTime<Utc>,
    pub total: u64,
}

/// Access counters for one route/target pair inside one time slot. The
/// origin set gives the unique-visitor count next to the raw total.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct EventSlot {
    pub key: String,
    pub value: String,
    pub unique_total: u64,
    pub total: u64,
    pub origins: HashSet<String>,
    pub stats_date_start: DateTime<Utc>,
    pub stats_date_end: DateTime<Utc>,
}

impl EventSlot {
    pub fn from_event(event: Event, slot_size: &Duration) -> Self {
        let (stats_date_start, stats_date_end) = get_slot(&event.date_time, slot_size);
        let mut origins = HashSet::new();
        origins.insert(event.metric_event.origin.clone());

        let (key, value) = Self::get_key_val(&event);

        EventSlot {
            key,
            value,
            unique_total: event.total,
            total: event.total,
            origins,
            stats_date_start,
            stats_date_end,
        }
    }

    pub fn key_from(event: &Event) -> String {
        let (key, value) = Self::get_key_val(event);
        format!("{}={}", key, value)
    }

    fn get_key_val(event: &Event) -> (String, String) {
        let (key, value) = match &event.metric_event.api {
            EventApi::Index => ("index", ""),
            EventApi::List(detail) => ("list", if detail.filtered { "filtered" } else { "" }),
            EventApi::View(detail) => ("view", detail.post_name.as_str()),
            EventApi::Page(detail) => ("page", detail.page_name.as_str()),
            EventApi::Schedule => ("schedule", ""),
            EventApi::Rss => ("rss", ""),
        };

        (key.to_string(), value.to_string())
    }
}

/// Return start + end date/time of the slot containing the timestamp.
fn get_slot(date_time: &DateTime<Utc>, slot_size: &Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    let slot_size_secs = slot_size.num_seconds();
    let timestamp_seconds = date_time.timestamp();
    let start_timestamp = timestamp_seconds - (timestamp_seconds % slot_size_secs);
    let start = DateTime::<Utc>::from_timestamp(start_timestamp, 0).unwrap_or(*date_time);
    let end = start + *slot_size;

    (start, end)
}

pub struct MetricAggregator {
    slot_size: Duration,
    slots: HashMap<String, EventSlot>,
    history: Vec<EventSlot>,
}

impl MetricAggregator {
    pub fn new(slot_size: Duration) -> Self {
        Self {
            slot_size,
            slots: Default::default(),
            history: vec![],
        }
    }

    pub fn add(&mut self, metric_event: MetricEvent) {
        self.add_event(Event {
            metric_event,
            date_time: Utc::now(),
            total: 1,
        })
    }

    pub fn add_event(&mut self, event: Event) {
        let key = EventSlot::key_from(&event);

        if let Some(slot) = self.slots.get_mut(&key) {
            if event.date_time < slot.stats_date_end {
                // Same slot: one more hit, maybe one more unique origin
                let inserted = slot.origins.insert(event.metric_event.origin.clone());
                if inserted {
                    slot.unique_total += event.total;
                }
                slot.total += event.total;
                return;
            }

            // The slot is over; retire everything before starting fresh
            let values: Vec<EventSlot> = self.slots.drain().map(|(_, v)| v).collect();
            self.history.extend(values);
        }

        let slot = EventSlot::from_event(event, &self.slot_size);
        self.slots.insert(key, slot);
    }

    pub fn flush(&mut self) {
        let date_time = Utc::now();
        let expired = self.slots.values().any(|slot| date_time >= slot.stats_date_end);

        debug!("Flush called for {}. Expired={}", date_time, expired);
        if expired {
            let values: Vec<EventSlot> = self.slots.drain().map(|(_, v)| v).collect();
            self.history.extend(values);
        }
    }

    pub fn take_events(&mut self) -> Option<Vec<EventSlot>> {
        if self.history.is_empty() {
            return None;
        }

        Some(std::mem::take(&mut self.history))
    }
}
