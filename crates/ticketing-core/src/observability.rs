//! Observability: tracing init and the JSONL audit log.
//!
//! Uses `config::ObservabilityConfig` for TICKETING_QUIET, TICKETING_LOG_LEVEL,
//! TICKETING_LOG_JSON and TICKETING_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::launch::RunMode;

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Pick the filter directive: TICKETING_QUIET beats TICKETING_LOG_LEVEL, which
/// beats the run-mode default.
fn filter_directive(cfg: &ObservabilityConfig, mode: RunMode) -> String {
    if cfg.quiet {
        return "ticketing=warn".to_string();
    }
    cfg.log_level
        .clone()
        .unwrap_or_else(|| mode.default_log_filter().to_string())
}

/// Initialize tracing. Call once at process startup; RUST_LOG wins when set.
pub fn init_tracing(mode: RunMode) {
    let cfg = ObservabilityConfig::from_env();
    let level = filter_directive(cfg, mode);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = ObservabilityConfig::from_env().audit_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

/// Point the audit log at `path`, overriding TICKETING_AUDIT_LOG. `None`
/// goes back to the configured location.
pub fn set_audit_path(path: Option<String>) {
    if let Ok(mut guard) = AUDIT_PATH.lock() {
        *guard = path;
    }
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn audit_record(event: &str, mut fields: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = fields.as_object_mut() {
        obj.insert(
            "ts".into(),
            json!(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        obj.insert("event".into(), json!(event));
    }
    fields
}

fn audit(event: &str, fields: serde_json::Value) {
    if let Some(path) = get_audit_path() {
        append_jsonl(&path, &audit_record(event, fields));
    }
}

/// Audit: event_created
pub fn audit_event_created(event_id: i64, name: &str, total_tickets: i64) {
    audit(
        "event_created",
        json!({ "event_id": event_id, "name": name, "total_tickets": total_tickets }),
    );
}

/// Audit: event_updated
pub fn audit_event_updated(event_id: i64, total_tickets: i64) {
    audit(
        "event_updated",
        json!({ "event_id": event_id, "total_tickets": total_tickets }),
    );
}

/// Audit: event_deleted
pub fn audit_event_deleted(event_id: i64) {
    audit("event_deleted", json!({ "event_id": event_id }));
}

/// Audit: ticket_sold
pub fn audit_ticket_sold(event_id: i64, ticket_id: i64, tickets_sold: i64) {
    audit(
        "ticket_sold",
        json!({ "event_id": event_id, "ticket_id": ticket_id, "tickets_sold": tickets_sold }),
    );
}

/// Audit: ticket_redeemed
pub fn audit_ticket_redeemed(event_id: i64, ticket_id: i64) {
    audit(
        "ticket_redeemed",
        json!({ "event_id": event_id, "ticket_id": ticket_id }),
    );
}
