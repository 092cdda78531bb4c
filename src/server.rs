use std::sync::Arc;

use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::handlers::{activities, consultants, dashboard, doctors};
use crate::state::AppState;
use crate::storage::Storage;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "refnet",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create the HTTP server with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Doctor endpoints
        .route("/doctors", get(doctors::list).post(doctors::create))
        .route("/doctors/stats", get(doctors::stats))
        .route("/doctors/bulk-delete", post(doctors::bulk_delete))
        .route("/doctors/bulk-export", post(doctors::bulk_export))
        .route(
            "/doctors/:id",
            get(doctors::get_by_id)
                .put(doctors::update)
                .delete(doctors::remove),
        )
        // Consultant endpoints, including the mapping subsystem
        .route(
            "/consultants",
            get(consultants::list).post(consultants::create),
        )
        .route("/consultants/stats", get(consultants::stats))
        .route("/consultants/bulk-delete", post(consultants::bulk_delete))
        .route("/consultants/bulk-export", post(consultants::bulk_export))
        .route(
            "/consultants/:id",
            get(consultants::get_by_id)
                .put(consultants::update)
                .delete(consultants::remove),
        )
        .route("/consultants/:id/map-doctor", post(consultants::map_doctor))
        .route(
            "/consultants/:id/update-mapping/:doctor_id",
            put(consultants::update_mapping),
        )
        .route(
            "/consultants/:id/unmap-doctor/:doctor_id",
            delete(consultants::unmap_doctor),
        )
        // Field-activity endpoints
        .route(
            "/activities",
            get(activities::list).post(activities::create),
        )
        .route("/activities/stats", get(activities::stats))
        .route("/activities/bulk-delete", post(activities::bulk_delete))
        .route(
            "/activities/:id",
            get(activities::get_by_id)
                .put(activities::update)
                .delete(activities::remove),
        )
        // Dashboard endpoints
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/recent-doctors", get(dashboard::recent_doctors))
        .route(
            "/dashboard/recent-consultants",
            get(dashboard::recent_consultants),
        )
        .route("/dashboard/activity-feed", get(dashboard::activity_feed))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    storage: Arc<dyn Storage>,
    config: &Config,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    for account in config.accounts() {
        storage.upsert_account(&account).await?;
    }

    let state = AppState::new(storage, config);
    let app = create_server(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("API server listening on 0.0.0.0:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
