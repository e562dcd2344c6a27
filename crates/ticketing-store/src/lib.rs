//! SQLite-backed store for events and tickets.
//!
//! Every mutating operation runs in one IMMEDIATE transaction, so the
//! `tickets_sold` counter and the ticket rows always agree.

pub mod schema;

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use ticketing_core::domain::{Event, EventDetails, EventDraft, EventPayload, Ticket};
use ticketing_core::{Error, Result};

trait StorageExt<T> {
    fn storage(self) -> Result<T>;
}

impl<T> StorageExt<T> for rusqlite::Result<T> {
    fn storage(self) -> Result<T> {
        self.map_err(|e| Error::Storage(e.to_string()))
    }
}

const EVENT_COLUMNS: &str = "id, name, start_date, end_date, total_tickets, tickets_sold";
const TICKET_COLUMNS: &str = "id, event_id, redeemed, sold_at";

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        total_tickets: row.get(4)?,
        tickets_sold: row.get(5)?,
    })
}

fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        event_id: row.get(1)?,
        redeemed: row.get(2)?,
        sold_at: row.get(3)?,
    })
}

fn load_event(conn: &Connection, id: i64) -> Result<Event> {
    conn.query_row(
        &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
        params![id],
        row_to_event,
    )
    .optional()
    .storage()?
    .ok_or_else(|| Error::event_not_found(id))
}

fn load_ticket(conn: &Connection, id: i64) -> Result<Ticket> {
    conn.query_row(
        &format!("SELECT {} FROM tickets WHERE id = ?1", TICKET_COLUMNS),
        params![id],
        row_to_ticket,
    )
    .optional()
    .storage()?
    .ok_or_else(|| Error::ticket_not_found(id))
}

fn count_redeemed(conn: &Connection, event_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tickets WHERE event_id = ?1 AND redeemed = 1",
        params![event_id],
        |row| row.get(0),
    )
    .storage()
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file, creating parent directories and
    /// applying pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!("create {}: {}", parent.display(), e))
                })?;
            }
        }
        let conn = Connection::open(path).storage()?;
        tracing::debug!(path = %path.display(), "database opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().storage()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true).storage()?;
        schema::migrate(&mut conn).storage()?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<i64> {
        schema::current_version(&self.conn).storage()
    }

    pub fn create_event(&mut self, draft: &EventDraft) -> Result<Event> {
        self.conn
            .execute(
                "INSERT INTO events (name, start_date, end_date, total_tickets, tickets_sold)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![
                    draft.name,
                    draft.start_date,
                    draft.end_date,
                    draft.total_tickets
                ],
            )
            .storage()?;
        let id = self.conn.last_insert_rowid();
        Ok(Event {
            id,
            name: draft.name.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            total_tickets: draft.total_tickets,
            tickets_sold: 0,
        })
    }

    pub fn get_event(&self, id: i64) -> Result<Event> {
        load_event(&self.conn, id)
    }

    pub fn get_ticket(&self, id: i64) -> Result<Ticket> {
        load_ticket(&self.conn, id)
    }

    pub fn event_details(&self, id: i64) -> Result<EventDetails> {
        let event = load_event(&self.conn, id)?;
        let tickets_redeemed = count_redeemed(&self.conn, id)?;
        Ok(EventDetails {
            event,
            tickets_redeemed,
        })
    }

    /// All events in creation order, each with its redeemed count.
    pub fn list_events(&self) -> Result<Vec<EventDetails>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {},
                    (SELECT COUNT(*) FROM tickets t WHERE t.event_id = events.id AND t.redeemed = 1)
                 FROM events ORDER BY id",
                EVENT_COLUMNS
            ))
            .storage()?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EventDetails {
                    event: row_to_event(row)?,
                    tickets_redeemed: row.get(6)?,
                })
            })
            .storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }

    /// Replace an event's fields. Validation needs the current sold count, so it
    /// runs inside the transaction.
    pub fn update_event(&mut self, id: i64, payload: &EventPayload, today: NaiveDate) -> Result<Event> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .storage()?;
        let event = load_event(&tx, id)?;
        let draft = payload.validate_update(today, event.tickets_sold)?;
        tx.execute(
            "UPDATE events SET name = ?1, start_date = ?2, end_date = ?3, total_tickets = ?4
             WHERE id = ?5",
            params![
                draft.name,
                draft.start_date,
                draft.end_date,
                draft.total_tickets,
                id
            ],
        )
        .storage()?;
        tx.commit().storage()?;
        Ok(Event {
            id,
            name: draft.name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            total_tickets: draft.total_tickets,
            tickets_sold: event.tickets_sold,
        })
    }

    /// Delete an event and its tickets.
    pub fn delete_event(&mut self, id: i64, now: NaiveDateTime) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .storage()?;
        let event = load_event(&tx, id)?;
        event.ensure_deletable(now)?;
        tx.execute("DELETE FROM events WHERE id = ?1", params![id])
            .storage()?;
        tx.commit().storage()
    }

    /// Sell one ticket: bump the counter and insert the ticket atomically.
    pub fn sell_ticket(&mut self, event_id: i64, now: NaiveDateTime) -> Result<(Event, Ticket)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .storage()?;
        let mut event = load_event(&tx, event_id)?;
        event.ensure_tickets_available()?;
        tx.execute(
            "UPDATE events SET tickets_sold = tickets_sold + 1 WHERE id = ?1",
            params![event_id],
        )
        .storage()?;
        tx.execute(
            "INSERT INTO tickets (event_id, redeemed, sold_at) VALUES (?1, 0, ?2)",
            params![event_id, now],
        )
        .storage()?;
        let ticket = Ticket {
            id: tx.last_insert_rowid(),
            event_id,
            redeemed: false,
            sold_at: now,
        };
        tx.commit().storage()?;
        event.tickets_sold += 1;
        Ok((event, ticket))
    }

    pub fn redeem_ticket(&mut self, ticket_id: i64, today: NaiveDate) -> Result<Ticket> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .storage()?;
        let mut ticket = load_ticket(&tx, ticket_id)?;
        ticket.ensure_not_redeemed()?;
        let event = load_event(&tx, ticket.event_id)?;
        event.ensure_redeemable_on(today)?;
        tx.execute(
            "UPDATE tickets SET redeemed = 1 WHERE id = ?1",
            params![ticket_id],
        )
        .storage()?;
        tx.commit().storage()?;
        ticket.redeemed = true;
        Ok(ticket)
    }
}
