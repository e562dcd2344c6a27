use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use ticketing_core::domain::{EventDetails, EventPayload};
use ticketing_core::observability;

use crate::error::ApiResult;
use crate::state::AppState;

/// Id path segment; a non-integer id answers 404 like an unknown one.
type IdPath = Result<Path<i64>, PathRejection>;

pub const WELCOME: &str = "Welcome to the management tickets service";

pub async fn index() -> &'static str {
    WELCOME
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(payload) = body?;
    let event = state
        .with_store(move |store, clock| {
            let draft = payload.validate_new(clock.today())?;
            let event = store.create_event(&draft)?;
            observability::audit_event_created(event.id, &event.name, event.total_tickets);
            Ok(event)
        })
        .await?;
    tracing::info!(event_id = event.id, name = %event.name, "event created");
    Ok(Json(json!({
        "message": "Event created successfully.",
        "event_id": event.id,
    })))
}

pub async fn list_events(State(state): State<AppState>) -> ApiResult<Response> {
    let events = state.with_store(|store, _| store.list_events()).await?;
    if events.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No events found." })),
        )
            .into_response());
    }
    Ok(Json(json!({ "events": events })).into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    event_id: IdPath,
) -> ApiResult<Json<EventDetails>> {
    let Path(event_id) = event_id?;
    let details = state
        .with_store(move |store, _| store.event_details(event_id))
        .await?;
    Ok(Json(details))
}

pub async fn update_event(
    State(state): State<AppState>,
    event_id: IdPath,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(event_id) = event_id?;
    // Unknown ids are reported before body problems.
    state
        .with_store(move |store, _| store.get_event(event_id))
        .await?;
    let Json(payload) = body?;
    state
        .with_store(move |store, clock| {
            let event = store.update_event(event_id, &payload, clock.today())?;
            observability::audit_event_updated(event.id, event.total_tickets);
            Ok(event)
        })
        .await?;
    tracing::info!(event_id, "event updated");
    Ok(Json(json!({ "message": "Event updated successfully." })))
}

pub async fn delete_event(
    State(state): State<AppState>,
    event_id: IdPath,
) -> ApiResult<Json<Value>> {
    let Path(event_id) = event_id?;
    state
        .with_store(move |store, clock| {
            store.delete_event(event_id, clock.now())?;
            observability::audit_event_deleted(event_id);
            Ok(())
        })
        .await?;
    tracing::info!(event_id, "event deleted");
    Ok(Json(json!({ "message": "The event was deleted successfully." })))
}

pub async fn sell_ticket(
    State(state): State<AppState>,
    event_id: IdPath,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Path(event_id) = event_id?;
    let (event, ticket) = state
        .with_store(move |store, clock| {
            let (event, ticket) = store.sell_ticket(event_id, clock.now())?;
            observability::audit_ticket_sold(event_id, ticket.id, event.tickets_sold);
            Ok((event, ticket))
        })
        .await?;
    tracing::info!(
        event_id,
        ticket_id = ticket.id,
        remaining = event.tickets_available(),
        "ticket sold"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Ticket sold in a successfully way.",
            "ticket_id": ticket.id,
        })),
    ))
}

pub async fn redeem_ticket(
    State(state): State<AppState>,
    ticket_id: IdPath,
) -> ApiResult<Json<Value>> {
    let Path(ticket_id) = ticket_id?;
    let ticket = state
        .with_store(move |store, clock| {
            let ticket = store.redeem_ticket(ticket_id, clock.today())?;
            observability::audit_ticket_redeemed(ticket.event_id, ticket_id);
            Ok(ticket)
        })
        .await?;
    tracing::info!(ticket_id, event_id = ticket.event_id, "ticket redeemed");
    Ok(Json(json!({ "message": "Ticket redeemed successfully." })))
}
