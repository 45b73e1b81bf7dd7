// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::Value;

use crate::{
    error::ApiError,
    models::{ErrorResponse, GasTankInfo, NonceResponse, SponsorshipInfo},
    state::AppState,
    tank::Quote,
};

#[utoipa::path(
    get,
    path = "/v1/sponsorship/info",
    tag = "Sponsorship",
    responses(
        (status = 200, description = "Registered gas tanks keyed by chain id", body = BTreeMap<String, Vec<GasTankInfo>>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn info(State(state): State<AppState>) -> Result<Json<SponsorshipInfo>, ApiError> {
    Ok(Json(state.sponsorship.info().await?))
}

#[utoipa::path(
    get,
    path = "/v1/sponsorship/nonce/{chain_id}/{gas_tank_address}",
    params(
        ("chain_id" = String, Path, description = "Chain id, positive integer"),
        ("gas_tank_address" = String, Path, description = "Gas tank address")
    ),
    tag = "Sponsorship",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn nonce(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<NonceResponse>, ApiError> {
    let Path((chain_id, gas_tank_address)) = path?;
    Ok(Json(
        state.sponsorship.nonce(&chain_id, &gas_tank_address).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/v1/sponsorship/receipt/{chain_id}/{hash}",
    params(
        ("chain_id" = String, Path, description = "Chain id, positive integer"),
        ("hash" = String, Path, description = "Transaction hash")
    ),
    tag = "Sponsorship",
    responses(
        (status = 200, description = "Raw transaction receipt", body = Object),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn receipt(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path((chain_id, hash)) = path?;
    Ok(Json(state.sponsorship.receipt(&chain_id, &hash).await?))
}

#[utoipa::path(
    post,
    path = "/v1/sponsorship/sign/{chain_id}/{gas_tank_address}",
    params(
        ("chain_id" = String, Path, description = "Chain id, positive integer"),
        ("gas_tank_address" = String, Path, description = "Gas tank address")
    ),
    request_body(content = Quote, description = "Unsigned sponsorship quote"),
    tag = "Sponsorship",
    responses(
        (status = 200, description = "Quote co-signed by the gas tank", body = Quote),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn sign(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Json<Quote>, JsonRejection>,
) -> Result<Json<Quote>, ApiError> {
    let Path((chain_id, gas_tank_address)) = path?;
    let Json(quote) = body?;
    Ok(Json(
        state
            .sponsorship
            .sign(&chain_id, &gas_tank_address, quote)
            .await?,
    ))
}
