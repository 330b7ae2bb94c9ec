//! HTTP Handlers
//!
//! One function per route. Admin routes take an `AdminSession`.

use crate::error::ApiError;
use crate::server::AppState;
use crate::session::AdminSession;
use crate::types::{EventsQuery, HealthResponse, UpsertItemRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use cgsg_core::application::SetMaintenanceRequest;
use cgsg_core::domain::{AdminComponent, ContentItem, MaintenanceRecord, MaintenanceStatus, PageKey};
use cgsg_core::error::AppError;
use futures::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SSE event name for maintenance changes
pub const CHANGE_EVENT: &str = "change";

/// GET /healthz
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: cgsg_core::VERSION.to_string(),
    })
}

/// GET /api/maintenance/{key}
pub async fn get_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MaintenanceStatus>, ApiError> {
    let key = PageKey::parse(&key)?;
    let status = state.maintenance.status(&key).await?;
    Ok(Json(status))
}

/// GET /api/maintenance/events?page_path={key}
pub async fn change_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let key = PageKey::from_path(&query.page_path);
    let subscription = state.feed.subscribe(&key).await?;
    debug!(page_key = %key, "Change stream opened");

    let stream = futures::stream::unfold(
        (subscription, state.shutdown_signal()),
        |(mut subscription, mut shutdown)| async move {
            loop {
                let event = tokio::select! {
                    event = subscription.recv() => event,
                    _ = shutdown.wait_for(|stopping| *stopping) => None,
                }?;

                match Event::default().event(CHANGE_EVENT).json_data(&event) {
                    Ok(sse) => {
                        return Some((Ok::<_, Infallible>(sse), (subscription, shutdown)))
                    }
                    Err(e) => warn!(page_key = %event.page_path, error = %e, "Failed to encode change event"),
                }
            }
        },
    );

    Ok(Sse::new(stream).keep_alive(default_keep_alive()))
}

fn default_keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}

/// GET /api/admin/maintenance
pub async fn list_maintenance(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<MaintenanceRecord>>, ApiError> {
    Ok(Json(state.maintenance.list().await?))
}

/// PUT /api/admin/maintenance/{key}
pub async fn set_maintenance(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Json<SetMaintenanceRequest>, JsonRejection>,
) -> Result<Json<MaintenanceRecord>, ApiError> {
    let Json(req) = body.map_err(invalid_body)?;
    let key = PageKey::parse(&key)?;

    let record = state.maintenance.set(key, req).await?;
    info!(
        user_id = %admin.user_id,
        page_key = %record.page_path,
        is_maintenance = record.is_maintenance,
        "Admin updated maintenance"
    );
    Ok(Json(record))
}

/// DELETE /api/admin/maintenance/{key}
pub async fn clear_maintenance(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let key = PageKey::parse(&key)?;

    if !state.maintenance.clear(&key).await? {
        return Err(AppError::NotFound(format!("No maintenance record for '{}'", key)).into());
    }
    info!(user_id = %admin.user_id, page_key = %key, "Admin cleared maintenance");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/{component}
pub async fn list_items(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(component): Path<String>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let component: AdminComponent = component.parse()?;
    Ok(Json(state.content.list(component).await?))
}

/// GET /api/admin/{component}/{id}
pub async fn get_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((component, id)): Path<(String, String)>,
) -> Result<Json<ContentItem>, ApiError> {
    let component: AdminComponent = component.parse()?;

    let item = state
        .content
        .get(component, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} item '{}' not found", component, id)))?;
    Ok(Json(item))
}

/// PUT /api/admin/{component}/{id}
pub async fn put_item(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path((component, id)): Path<(String, String)>,
    body: Result<Json<UpsertItemRequest>, JsonRejection>,
) -> Result<Json<ContentItem>, ApiError> {
    let component: AdminComponent = component.parse()?;
    let Json(req) = body.map_err(invalid_body)?;

    let item = state.content.upsert(component, &id, req.data).await?;
    info!(user_id = %admin.user_id, component = %component, id = %id, "Admin saved item");
    Ok(Json(item))
}

/// DELETE /api/admin/{component}/{id}
pub async fn delete_item(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path((component, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let component: AdminComponent = component.parse()?;

    if !state.content.delete(component, &id).await? {
        return Err(AppError::NotFound(format!("{} item '{}' not found", component, id)).into());
    }
    info!(user_id = %admin.user_id, component = %component, id = %id, "Admin deleted item");
    Ok(StatusCode::NO_CONTENT)
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    AppError::Validation(rejection.body_text()).into()
}
