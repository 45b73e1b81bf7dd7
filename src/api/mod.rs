// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{ErrorResponse, GasTankInfo, NonceResponse, TokenInfo},
    state::AppState,
    tank::Quote,
};

pub mod health;
pub mod sponsorship;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/sponsorship/info", get(sponsorship::info))
        .route(
            "/sponsorship/nonce/{chain_id}/{gas_tank_address}",
            get(sponsorship::nonce),
        )
        .route(
            "/sponsorship/receipt/{chain_id}/{hash}",
            get(sponsorship::receipt),
        )
        .route(
            "/sponsorship/sign/{chain_id}/{gas_tank_address}",
            post(sponsorship::sign),
        )
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route() -> ApiError {
    ApiError::bad_request("Unknown route")
}

async fn method_not_allowed() -> ApiError {
    ApiError::bad_request("Method not allowed")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        sponsorship::info,
        sponsorship::nonce,
        sponsorship::receipt,
        sponsorship::sign,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            GasTankInfo,
            TokenInfo,
            NonceResponse,
            ErrorResponse,
            Quote,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Sponsorship", description = "Gas tank sponsorship signing and queries"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
