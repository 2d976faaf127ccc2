use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::CustomerEvent;

pub const DEFAULT_CUSTOMER_ID: &str = "default";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Customers ──

pub fn get_customer_name(conn: &Connection, customer_id: &str) -> anyhow::Result<Option<String>> {
    let name = conn
        .query_row(
            "SELECT name FROM customers WHERE id = ?1",
            params![customer_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

pub fn insert_customer(conn: &Connection, customer_id: &str, name: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name) VALUES (?1, ?2)",
        params![customer_id, name],
    )?;
    Ok(())
}

// ── Events ──

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<CustomerEvent> {
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(CustomerEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        date,
        time: row.get(3)?,
        description: row.get(4)?,
        reminder_set: row.get(5)?,
    })
}

pub fn insert_event(
    conn: &Connection,
    customer_id: &str,
    event: &CustomerEvent,
    position: i64,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customer_events (id, customer_id, title, date, time_slot, description, reminder_set, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id,
            customer_id,
            event.title,
            event.date.format(DATE_FORMAT).to_string(),
            event.time,
            event.description,
            event.reminder_set,
            position,
        ],
    )?;
    Ok(())
}

pub fn list_events(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<CustomerEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, date, time_slot, description, reminder_set
         FROM customer_events WHERE customer_id = ?1 ORDER BY position, id",
    )?;
    let events = stmt
        .query_map(params![customer_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

pub fn get_event(conn: &Connection, event_id: &str) -> anyhow::Result<Option<CustomerEvent>> {
    let event = conn
        .query_row(
            "SELECT id, title, date, time_slot, description, reminder_set
             FROM customer_events WHERE id = ?1",
            params![event_id],
            event_from_row,
        )
        .optional()?;
    Ok(event)
}

pub fn update_event_schedule(
    conn: &Connection,
    event_id: &str,
    date: &NaiveDate,
    time: &str,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE customer_events SET date = ?1, time_slot = ?2 WHERE id = ?3",
        params![date.format(DATE_FORMAT).to_string(), time, event_id],
    )?;
    Ok(count > 0)
}

/// Writes or clears (`None`) the reminder label.
pub fn update_event_reminder(
    conn: &Connection,
    event_id: &str,
    reminder: Option<&str>,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE customer_events SET reminder_set = ?1 WHERE id = ?2",
        params![reminder, event_id],
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        insert_customer(&conn, DEFAULT_CUSTOMER_ID, "Alex").unwrap();
        conn
    }

    fn make_event(id: &str, date: &str) -> CustomerEvent {
        CustomerEvent {
            id: id.to_string(),
            title: "Fiber WiFi Installation".to_string(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            time: Some("9 AM - 12 PM".to_string()),
            description: "Technician visit".to_string(),
            reminder_set: None,
        }
    }

    #[test]
    fn test_customer_name() {
        let conn = setup_db();
        assert_eq!(
            get_customer_name(&conn, DEFAULT_CUSTOMER_ID).unwrap(),
            Some("Alex".to_string())
        );
        assert_eq!(get_customer_name(&conn, "nobody").unwrap(), None);
    }

    #[test]
    fn test_list_events_keeps_insert_order() {
        let conn = setup_db();
        insert_event(&conn, DEFAULT_CUSTOMER_ID, &make_event("evt_b", "2024-01-08"), 0).unwrap();
        insert_event(&conn, DEFAULT_CUSTOMER_ID, &make_event("evt_a", "2024-01-15"), 1).unwrap();

        let events = list_events(&conn, DEFAULT_CUSTOMER_ID).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt_b", "evt_a"]);
    }

    #[test]
    fn test_update_schedule() {
        let conn = setup_db();
        insert_event(&conn, DEFAULT_CUSTOMER_ID, &make_event("evt_1", "2024-01-01"), 0).unwrap();

        let new_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(update_event_schedule(&conn, "evt_1", &new_date, "9:00 AM - 11:00 AM").unwrap());
        assert!(!update_event_schedule(&conn, "missing", &new_date, "9:00 AM - 11:00 AM").unwrap());

        let event = get_event(&conn, "evt_1").unwrap().unwrap();
        assert_eq!(event.date, new_date);
        assert_eq!(event.time.as_deref(), Some("9:00 AM - 11:00 AM"));
        assert_eq!(event.title, "Fiber WiFi Installation");
    }

    #[test]
    fn test_reminder_set_and_clear() {
        let conn = setup_db();
        insert_event(&conn, DEFAULT_CUSTOMER_ID, &make_event("evt_1", "2024-01-01"), 0).unwrap();

        update_event_reminder(&conn, "evt_1", Some("Reminder set for 1 day before")).unwrap();
        let event = get_event(&conn, "evt_1").unwrap().unwrap();
        assert_eq!(event.reminder_set.as_deref(), Some("Reminder set for 1 day before"));

        update_event_reminder(&conn, "evt_1", None).unwrap();
        let event = get_event(&conn, "evt_1").unwrap().unwrap();
        assert_eq!(event.reminder_set, None);
    }
}
