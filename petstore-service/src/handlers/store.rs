//! `/store` endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::extract::{parse_id, JsonBody};
use crate::{
    error::{Error, Result},
    models::{Inventory, Order},
    state::AppState,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/store/inventory", get(inventory))
        .route("/store/order", post(place_order))
        .route("/store/order/{order_id}", get(get_order).delete(delete_order))
}

#[instrument(skip(state))]
async fn inventory(State(state): State<AppState>) -> Result<Json<Inventory>> {
    Ok(Json(state.pets().inventory().await?))
}

/// Accepted for any `petId`, existing or not
#[instrument(skip(state))]
async fn place_order(
    State(state): State<AppState>,
    JsonBody(mut order): JsonBody<Order>,
) -> Result<Json<Order>> {
    order.id = state.orders().insert(&order).await?;
    tracing::info!(order_id = order.id, pet_id = order.pet_id, "Order placed");
    Ok(Json(order))
}

#[instrument(skip(state))]
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    state
        .orders()
        .find_by_id(parse_id(&order_id)?)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

#[instrument(skip(state))]
async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<StatusCode> {
    state.orders().delete(parse_id(&order_id)?).await?;
    Ok(StatusCode::OK)
}
