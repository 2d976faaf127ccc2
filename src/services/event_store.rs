use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries::{self, DEFAULT_CUSTOMER_ID};
use crate::models::availability::soonest_slots;
use crate::models::{AvailableSlot, CustomerEvent, StoreResult};

/// Backend holding the customer and their events.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn fetch_customer_name(&self) -> anyhow::Result<String>;
    async fn fetch_events(&self) -> anyhow::Result<Vec<CustomerEvent>>;
    async fn fetch_available_slots(&self) -> anyhow::Result<Vec<AvailableSlot>>;
    async fn update_event_date(
        &self,
        event_id: &str,
        new_date: &str,
        new_time: &str,
    ) -> anyhow::Result<StoreResult>;
    async fn set_reminder(&self, event_id: &str, reminder_time: &str) -> anyhow::Result<StoreResult>;
    async fn cancel_reminder(&self, event_id: &str) -> anyhow::Result<StoreResult>;
}

pub struct SqliteEventStore {
    db: Arc<Mutex<Connection>>,
    latency: Duration,
}

impl SqliteEventStore {
    pub fn new(db: Arc<Mutex<Connection>>, latency: Duration) -> Self {
        Self { db, latency }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn conn(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("event store connection poisoned"))
    }

    fn with_event_update(
        &self,
        event_id: &str,
        update: impl FnOnce(&Connection) -> anyhow::Result<bool>,
    ) -> anyhow::Result<StoreResult> {
        let db = self.conn()?;
        if !update(&db)? {
            return Ok(StoreResult::failed());
        }
        Ok(match queries::get_event(&db, event_id)? {
            Some(event) => StoreResult::updated(event),
            None => StoreResult::failed(),
        })
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn fetch_customer_name(&self) -> anyhow::Result<String> {
        tracing::info!("fetching customer details");
        self.simulate_latency().await;
        let db = self.conn()?;
        queries::get_customer_name(&db, DEFAULT_CUSTOMER_ID)?
            .ok_or_else(|| anyhow::anyhow!("customer record missing"))
    }

    async fn fetch_events(&self) -> anyhow::Result<Vec<CustomerEvent>> {
        tracing::info!("fetching customer events");
        self.simulate_latency().await;
        let db = self.conn()?;
        queries::list_events(&db, DEFAULT_CUSTOMER_ID)
    }

    async fn fetch_available_slots(&self) -> anyhow::Result<Vec<AvailableSlot>> {
        tracing::info!("fetching available dates");
        self.simulate_latency().await;
        let taken: Vec<NaiveDate> = {
            let db = self.conn()?;
            queries::list_events(&db, DEFAULT_CUSTOMER_ID)?
                .into_iter()
                .map(|e| e.date)
                .collect()
        };
        Ok(soonest_slots(Utc::now().date_naive(), &taken))
    }

    async fn update_event_date(
        &self,
        event_id: &str,
        new_date: &str,
        new_time: &str,
    ) -> anyhow::Result<StoreResult> {
        tracing::info!(event_id, new_date, new_time, "updating event date");
        self.simulate_latency().await;

        let Ok(date) = NaiveDate::parse_from_str(new_date.trim(), "%Y-%m-%d") else {
            tracing::warn!(event_id, new_date, "rejecting unparseable date");
            return Ok(StoreResult::failed());
        };

        self.with_event_update(event_id, |db| {
            queries::update_event_schedule(db, event_id, &date, new_time)
        })
    }

    async fn set_reminder(&self, event_id: &str, reminder_time: &str) -> anyhow::Result<StoreResult> {
        tracing::info!(event_id, reminder_time, "setting reminder");
        self.simulate_latency().await;
        let label = format!("Reminder set for {}", reminder_time.replace('_', " "));
        self.with_event_update(event_id, |db| {
            queries::update_event_reminder(db, event_id, Some(&label))
        })
    }

    async fn cancel_reminder(&self, event_id: &str) -> anyhow::Result<StoreResult> {
        tracing::info!(event_id, "cancelling reminder");
        self.simulate_latency().await;
        self.with_event_update(event_id, |db| queries::update_event_reminder(db, event_id, None))
    }
}

/// Inserts the demo customer and their upcoming events unless a customer exists.
pub fn seed_demo_data(conn: &Connection, today: NaiveDate) -> anyhow::Result<bool> {
    if queries::get_customer_name(conn, DEFAULT_CUSTOMER_ID)?.is_some() {
        return Ok(false);
    }

    queries::insert_customer(conn, DEFAULT_CUSTOMER_ID, "Alex")?;

    let events = [
        CustomerEvent {
            id: "evt_12345".to_string(),
            title: "Fiber WiFi Installation".to_string(),
            date: today + chrono::Duration::days(7),
            time: Some("9 AM - 12 PM".to_string()),
            description: "A technician will arrive to set up your new high-speed fiber internet connection.".to_string(),
            reminder_set: None,
        },
        CustomerEvent {
            id: "evt_67890".to_string(),
            title: "Next Bill Due".to_string(),
            date: today + chrono::Duration::days(14),
            time: None,
            description: "Your monthly bill for telecom services.".to_string(),
            reminder_set: None,
        },
    ];

    for (position, event) in events.iter().enumerate() {
        queries::insert_event(conn, DEFAULT_CUSTOMER_ID, event, position as i64)?;
    }

    tracing::info!(count = events.len(), "seeded demo customer events");
    Ok(true)
}
