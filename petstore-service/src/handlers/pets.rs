//! `/pet` endpoints

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    extract::{parse_id, JsonBody, QueryParams},
    query::{PetFormQuery, StatusQuery, TagsQuery},
};
use crate::{
    error::{Error, Result},
    models::{Pet, UploadedFile},
    state::AppState,
};

const FILE_FIELD: &str = "file";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/pet", post(add_pet).put(update_pet))
        .route("/pet/findByStatus", get(find_by_status))
        .route("/pet/findByTags", get(find_by_tags))
        .route(
            "/pet/{pet_id}",
            get(get_pet).post(update_pet_with_form).delete(delete_pet),
        )
        .route("/pet/{pet_id}/uploadImage", post(upload_image))
}

/// Stored pet by id, or 404
async fn fetch_pet(state: &AppState, id: i64) -> Result<Json<Pet>> {
    state
        .pets()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

/// Create a pet; the response echoes the request with the new id
#[instrument(skip(state))]
async fn add_pet(State(state): State<AppState>, JsonBody(mut pet): JsonBody<Pet>) -> Result<Json<Pet>> {
    pet.id = state.pets().insert(&pet.name, &pet.status).await?;
    tracing::info!(pet_id = pet.id, "Pet created");
    Ok(Json(pet))
}

#[instrument(skip(state))]
async fn update_pet(State(state): State<AppState>, JsonBody(pet): JsonBody<Pet>) -> Result<Json<Pet>> {
    let affected = state.pets().update(pet.id, &pet.name, &pet.status).await?;
    tracing::debug!(affected, "Pet updated");
    Ok(Json(pet))
}

#[instrument(skip(state))]
async fn get_pet(State(state): State<AppState>, Path(pet_id): Path<String>) -> Result<Json<Pet>> {
    fetch_pet(&state, parse_id(&pet_id)?).await
}

/// Always 200 once the id parses, whether or not the pet existed
#[instrument(skip(state))]
async fn delete_pet(State(state): State<AppState>, Path(pet_id): Path<String>) -> Result<StatusCode> {
    let affected = state.pets().delete(parse_id(&pet_id)?).await?;
    tracing::debug!(affected, "Pet deleted");
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
async fn find_by_status(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StatusQuery>,
) -> Result<Json<Vec<Pet>>> {
    let pets = state.pets().find_by_statuses(&query.statuses()).await?;
    Ok(Json(pets))
}

#[instrument(skip(state))]
async fn find_by_tags(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TagsQuery>,
) -> Result<Json<Vec<Pet>>> {
    let Some(tags) = query.tags() else {
        return Ok(Json(Vec::new()));
    };
    let pets = state.pets().find_by_tags(&tags).await?;
    Ok(Json(pets))
}

/// Apply the non-blank form values, then answer with the re-read pet
///
/// The two updates and the read are separate statements. A pet deleted in
/// between yields 404 even though the updates went through.
#[instrument(skip(state))]
async fn update_pet_with_form(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    QueryParams(form): QueryParams<PetFormQuery>,
) -> Result<Json<Pet>> {
    let id = parse_id(&pet_id)?;
    let pets = state.pets();

    if !form.name.is_empty() {
        pets.update_name(id, &form.name).await?;
    }
    if !form.status.is_empty() {
        pets.update_status(id, &form.status).await?;
    }

    fetch_pet(&state, id).await
}

/// Report the declared name of the `file` part; the content is discarded
#[instrument(skip(multipart))]
async fn upload_image(
    Path(pet_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedFile>> {
    let file_required = || Error::Validation("file required".to_string());
    let mut multipart = multipart.map_err(|_| file_required())?;

    while let Some(field) = multipart.next_field().await.map_err(|_| file_required())? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if let Some(filename) = field.file_name().and_then(base_name) {
            tracing::info!(%filename, "Image upload received");
            return Ok(Json(UploadedFile { filename }));
        }
    }

    Err(file_required())
}

/// Last component of a declared file name; an empty name counts as no file
fn base_name(declared: &str) -> Option<String> {
    std::path::Path::new(declared)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
