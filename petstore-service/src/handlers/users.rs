//! `/user` endpoints
//!
//! Users are addressed by username. Passwords travel and are stored as plain
//! text, so request bodies are never recorded in spans.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    extract::{JsonBody, QueryParams},
    query::LoginQuery,
};
use crate::{
    error::{Error, Result},
    models::User,
    state::AppState,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/createWithList", post(create_users_with_list))
        .route("/user/login", get(login))
        .route("/user/logout", get(logout))
        .route(
            "/user/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn fetch_user(state: &AppState, username: &str) -> Result<Json<User>> {
    state
        .users()
        .find_by_username(username)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

#[instrument(skip_all)]
async fn create_user(
    State(state): State<AppState>,
    JsonBody(mut user): JsonBody<User>,
) -> Result<Json<User>> {
    user.id = state.users().insert(&user).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User created");
    Ok(Json(user))
}

/// All-or-nothing: one failed insert leaves none of the batch behind
#[instrument(skip_all)]
async fn create_users_with_list(
    State(state): State<AppState>,
    JsonBody(mut users): JsonBody<Vec<User>>,
) -> Result<Json<Vec<User>>> {
    let ids = state.users().insert_batch(&users).await?;
    for (user, id) in users.iter_mut().zip(ids) {
        user.id = id;
    }
    tracing::info!(count = users.len(), "User batch created");
    Ok(Json(users))
}

#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LoginQuery>,
) -> Result<String> {
    match state
        .users()
        .find_by_credentials(&query.username, &query.password)
        .await?
    {
        Some(_) => Ok(format!("logged in user {}", query.username)),
        None => {
            tracing::info!(username = %query.username, "Login rejected");
            Err(Error::InvalidCredentials)
        }
    }
}

/// No session state exists, so there is nothing to end
async fn logout() -> StatusCode {
    StatusCode::OK
}

#[instrument(skip(state))]
async fn get_user(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<User>> {
    fetch_user(&state, &username).await
}

/// Overwrite the user named in the path, then re-read by that same name
///
/// A body carrying a different `username` renames the user, so the re-read
/// answers 404 even though the update succeeded.
#[instrument(skip(state, user))]
async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    JsonBody(user): JsonBody<User>,
) -> Result<Json<User>> {
    let affected = state.users().update_by_username(&username, &user).await?;
    tracing::debug!(affected, "User updated");
    fetch_user(&state, &username).await
}

#[instrument(skip(state))]
async fn delete_user(State(state): State<AppState>, Path(username): Path<String>) -> Result<StatusCode> {
    state.users().delete_by_username(&username).await?;
    Ok(StatusCode::OK)
}
