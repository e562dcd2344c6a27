//! Schema migrations, tracked in SQLite's `user_version` pragma.

use rusqlite::{Connection, TransactionBehavior};

/// Ordered migrations; entry `i` upgrades the schema from version `i` to `i + 1`.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL,
        start_date DATETIME NOT NULL,
        end_date DATETIME NOT NULL,
        total_tickets INTEGER NOT NULL,
        tickets_sold INTEGER NOT NULL DEFAULT 0,
        CHECK (tickets_sold >= 0 AND tickets_sold <= total_tickets)
    );

    CREATE TABLE IF NOT EXISTS tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        redeemed BOOLEAN NOT NULL DEFAULT 0,
        sold_at DATETIME NOT NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tickets_event_redeemed ON tickets(event_id, redeemed);
    "#,
];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn current_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Apply pending migrations. Returns how many were applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", (idx + 1) as i64)?;
        tx.commit()?;
        applied += 1;
        tracing::debug!(version = idx + 1, "schema migration applied");
    }
    if applied > 0 {
        tracing::info!(
            from = current,
            to = latest_version(),
            "database schema upgraded"
        );
    }
    Ok(applied)
}
