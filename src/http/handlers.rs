//! Route handlers. Thin: parse, call the bank service, render.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::http::types::{
    BalanceQuery, BalanceResponse, CreateAccountRequest, CreateAccountResponse, FundRequest,
    FundResponse, HealthResponse, TransferRequest, TransferResponse,
};

pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    let Json(request) = payload?;
    let created = state.bank.create_account(&request.name).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_balance(
    State(state): State<AppState>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Query(query) = query?;
    let balance = state.bank.get_balance(&query.name, &query.token).await?;
    Ok(Json(balance.into()))
}

pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let Json(request) = payload?;
    let receipt = state
        .bank
        .transfer(
            &request.from_name,
            &request.to_name,
            &request.token,
            request.amount,
        )
        .await?;
    Ok(Json(TransferResponse::new(receipt, request.token)))
}

pub async fn get_initial_fund(
    State(state): State<AppState>,
    payload: Result<Json<FundRequest>, JsonRejection>,
) -> Result<Json<FundResponse>, ApiError> {
    let Json(request) = payload?;
    let tx_hash = state.bank.fund(&request.name).await?;
    Ok(Json(FundResponse {
        success: true,
        tx_hash: tx_hash.to_string(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.bank.health().await.into())
}
