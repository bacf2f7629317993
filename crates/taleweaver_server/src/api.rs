//! HTTP routes.

use crate::{ApiError, AppState};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use taleweaver_core::{NewPersona, NewStory, PersonaId, StoryId, UserId, VersionDirection};
use taleweaver_error::{
    JsonError, JsonErrorKind, StorageError, StorageErrorKind, TaleweaverError,
};

type ApiResult<T> = Result<T, ApiError>;

/// Body carrying only an optional credential.
#[derive(Debug, Default, Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateStoryBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(flatten)]
    story: NewStory,
}

#[derive(Debug, Deserialize)]
struct TurnBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    action: String,
}

#[derive(Debug, Deserialize)]
struct VersionBody {
    #[serde(default)]
    token: Option<String>,
    direction: VersionDirection,
}

#[derive(Debug, Deserialize)]
struct EditBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct CreatePersonaBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(flatten)]
    persona: NewPersona,
}

#[derive(Debug, Deserialize)]
struct DefaultPersonaBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    persona_id: Option<PersonaId>,
}

/// Authenticate first, then surface any body rejection.
fn caller_and_body<T>(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<T>, JsonRejection>,
    token: impl Fn(&T) -> Option<&str>,
) -> ApiResult<(UserId, T)> {
    match body {
        Ok(Json(body)) => {
            let user = state.auth().authenticate(headers, token(&body))?;
            Ok((user, body))
        }
        Err(rejection) => {
            state.auth().authenticate(headers, None)?;
            Err(TaleweaverError::from(body_error(rejection)).into())
        }
    }
}

fn body_error(rejection: JsonRejection) -> JsonError {
    let kind = match rejection {
        JsonRejection::JsonDataError(e) => JsonErrorKind::Data(e.body_text()),
        JsonRejection::JsonSyntaxError(e) => JsonErrorKind::Syntax(e.body_text()),
        JsonRejection::MissingJsonContentType(_) => JsonErrorKind::MissingContentType,
        other => JsonErrorKind::Body(other.body_text()),
    };
    JsonError::new(kind)
}

fn caller(
    state: &AppState,
    headers: &HeaderMap,
    body: Option<Json<TokenBody>>,
) -> ApiResult<UserId> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    Ok(state.auth().authenticate(headers, body.token.as_deref())?)
}

/// Creates the Taleweaver API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stories", post(create_story))
        .route("/stories/:id", get(get_story))
        .route("/stories/:id/turns", post(take_turn))
        .route("/stories/:id/turns/:index/regenerate", post(regenerate_turn))
        .route("/stories/:id/turns/:index/choices", post(regenerate_choices))
        .route("/stories/:id/turns/:index/version", post(switch_version))
        .route("/stories/:id/turns/:index/edit", post(edit_turn))
        .route("/personas", get(list_personas).post(create_persona))
        .route("/personas/default", put(set_default_persona))
        .route("/personas/:id", delete(delete_persona))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[tracing::instrument(skip_all)]
async fn create_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateStoryBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    let story = state.stories().create_story(&user, body.story).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

async fn get_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<StoryId>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth().authenticate(&headers, None)?;
    let story = state.stories().get_story(&user, &id).await?;
    Ok(Json(story))
}

#[tracing::instrument(skip_all, fields(story_id = %id))]
async fn take_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<StoryId>,
    body: Result<Json<TurnBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    let outcome = state.stories().take_turn(&user, &id, body.action).await?;
    Ok(Json(outcome))
}

#[tracing::instrument(skip_all, fields(story_id = %id, index = index))]
async fn regenerate_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, index)): Path<(StoryId, usize)>,
    body: Option<Json<TokenBody>>,
) -> ApiResult<impl IntoResponse> {
    let user = caller(&state, &headers, body)?;
    let outcome = state.stories().regenerate_turn(&user, &id, index).await?;
    Ok(Json(outcome))
}

#[tracing::instrument(skip_all, fields(story_id = %id, index = index))]
async fn regenerate_choices(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, index)): Path<(StoryId, usize)>,
    body: Option<Json<TokenBody>>,
) -> ApiResult<impl IntoResponse> {
    let user = caller(&state, &headers, body)?;
    let outcome = state
        .stories()
        .regenerate_choices(&user, &id, index)
        .await?;
    Ok(Json(outcome))
}

#[tracing::instrument(skip_all, fields(story_id = %id, index = index))]
async fn switch_version(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, index)): Path<(StoryId, usize)>,
    body: Result<Json<VersionBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    let story = state
        .stories()
        .switch_version(&user, &id, index, body.direction)
        .await?;
    Ok(Json(story))
}

#[tracing::instrument(skip_all, fields(story_id = %id, index = index))]
async fn edit_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, index)): Path<(StoryId, usize)>,
    body: Result<Json<EditBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    let outcome = state
        .stories()
        .edit_and_regenerate(&user, &id, index, body.content)
        .await?;
    Ok(Json(outcome))
}

async fn list_personas(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth().authenticate(&headers, None)?;
    let personas = state.stories().list_personas(&user).await?;
    Ok(Json(personas))
}

async fn create_persona(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreatePersonaBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    let view = state.stories().create_persona(&user, body.persona).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn set_default_persona(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<DefaultPersonaBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let (user, body) = caller_and_body(&state, &headers, body, |b| b.token.as_deref())?;
    state
        .stories()
        .set_default_persona(&user, body.persona_id.clone())
        .await?;
    Ok(Json(json!({ "default_persona_id": body.persona_id })))
}

#[tracing::instrument(skip_all, fields(persona_id = %id))]
async fn delete_persona(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    headers: HeaderMap,
    body: Option<Json<TokenBody>>,
) -> ApiResult<impl IntoResponse> {
    let user = caller(&state, &headers, body)?;
    if !state.stories().delete_persona(&user, &id).await? {
        return Err(TaleweaverError::from(StorageError::new(StorageErrorKind::NotFound(
            format!("persona {id}"),
        )))
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
