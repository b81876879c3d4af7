use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, ErrorCode, Factor, FactorValues, FleetConfig, QueryResponse, SCHEMA_VERSION_V1,
};
use flock_core::{insights, weekly, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::FleetApi;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const BIND_ADDR_ENV: &str = "FLOCK_BIND_ADDR";

include!("error.rs");
include!("state.rs");
include!("routes/houses.rs");
include!("routes/fleet.rs");
include!("routes/advisory.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, config: FleetConfig) -> Result<(), ServerError> {
    let state = AppState::new(FleetApi::from_config(config));
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(%addr, "fleet api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/houses", get(list_houses))
        .route("/api/v1/houses/{house_id}", get(get_house))
        .route("/api/v1/houses/{house_id}/telemetry", get(get_house_telemetry))
        .route("/api/v1/houses/{house_id}/weekly", get(get_house_weekly))
        .route(
            "/api/v1/houses/{house_id}/daily_kpis",
            get(get_house_daily_kpis),
        )
        .route("/api/v1/houses/{house_id}/anomalies", get(get_house_anomalies))
        .route("/api/v1/houses/{house_id}/overview", get(get_house_overview))
        .route("/api/v1/fleet/summary", get(get_fleet_summary))
        .route("/api/v1/fleet/report", get(get_fleet_report))
        .route("/api/v1/fleet/reinitialize", post(reinitialize_fleet))
        .route("/api/v1/advisory/support", get(get_week_support))
        .route("/api/v1/advisory/{week}/current", get(get_current_values))
        .route(
            "/api/v1/advisory/{week}/dose_response/{factor}",
            get(get_dose_response),
        )
        .route(
            "/api/v1/advisory/{week}/pairwise/{factor1}/{factor2}",
            get(get_pairwise_surface),
        )
        .route(
            "/api/v1/advisory/{week}/recommendations",
            get(get_recommendations),
        )
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Answers preflight requests directly; everything else gets the headers on the way out.
async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    apply_cors_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests;
