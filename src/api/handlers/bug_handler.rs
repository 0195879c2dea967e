//! Bug handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    BugFilter, BugPatch, BugPriority, BugResponse, BugStats, BugStatus, NewBug, Principal,
};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Bug creation request. Unrecognized status or priority values are
/// rejected at deserialization.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBugRequest {
    /// Short summary of the defect
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Crash on save")]
    pub title: String,
    /// Full description
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "The editor crashes when saving an unnamed file")]
    pub description: String,
    /// Lifecycle status (defaults to open)
    #[serde(default)]
    pub status: BugStatus,
    /// Priority (defaults to medium)
    #[serde(default)]
    pub priority: BugPriority,
    /// Optional assignee; must reference an existing user
    pub assigned_to: Option<Uuid>,
}

/// Partial bug update. Ownership (`createdBy`) is not part of this
/// payload; if a client sends it anyway the field is silently ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBugRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Listing filter; present fields combine with AND
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListBugsQuery {
    /// Exact-match status filter
    pub status: Option<BugStatus>,
    /// Exact-match priority filter
    pub priority: Option<BugPriority>,
    /// Exact-match assignee filter
    pub assigned_to: Option<Uuid>,
}

impl From<ListBugsQuery> for BugFilter {
    fn from(query: ListBugsQuery) -> Self {
        BugFilter {
            status: query.status,
            priority: query.priority,
            assigned_to: query.assigned_to,
        }
    }
}

/// Create bug routes (all require authentication)
pub fn bug_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bugs).post(create_bug))
        .route("/stats", get(bug_stats))
        .route("/:id", get(get_bug).put(update_bug).delete(delete_bug))
}

/// Create a new bug
#[utoipa::path(
    post,
    path = "/api/bugs",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    request_body = CreateBugRequest,
    responses(
        (status = 201, description = "Bug created", body = BugResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_bug(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBugRequest>,
) -> AppResult<(StatusCode, Json<BugResponse>)> {
    let input = NewBug {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        assigned_to: payload.assigned_to,
    };

    let bug = state.bug_service.create_bug(input, &principal).await?;
    Ok((StatusCode::CREATED, Json(BugResponse::from(bug))))
}

/// List bugs, newest first, optionally filtered
#[utoipa::path(
    get,
    path = "/api/bugs",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(ListBugsQuery),
    responses(
        (status = 200, description = "Bugs ordered by creation time descending", body = Vec<BugResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_bugs(
    Extension(_principal): Extension<Principal>,
    State(state): State<AppState>,
    Query(query): Query<ListBugsQuery>,
) -> AppResult<Json<Vec<BugResponse>>> {
    let bugs = state.bug_service.list_bugs(&query.into()).await?;
    Ok(Json(bugs.into_iter().map(BugResponse::from).collect()))
}

/// Dashboard bug counts
#[utoipa::path(
    get,
    path = "/api/bugs/stats",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregate counts for the dashboard", body = BugStats),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn bug_stats(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
) -> AppResult<Json<BugStats>> {
    let stats = state.bug_service.stats(&principal).await?;
    Ok(Json(stats))
}

/// Get a single bug
#[utoipa::path(
    get,
    path = "/api/bugs/{id}",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Bug found", body = BugResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn get_bug(
    Extension(_principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BugResponse>> {
    let bug = state.bug_service.get_bug(id).await?;
    Ok(Json(BugResponse::from(bug)))
}

/// Update a bug (owner or admin)
#[utoipa::path(
    put,
    path = "/api/bugs/{id}",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bug ID")),
    request_body = UpdateBugRequest,
    responses(
        (status = 200, description = "Bug updated", body = BugResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn update_bug(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBugRequest>,
) -> AppResult<Json<BugResponse>> {
    let patch = BugPatch {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        assigned_to: payload.assigned_to,
    };

    let bug = state.bug_service.update_bug(id, patch, &principal).await?;
    Ok(Json(BugResponse::from(bug)))
}

/// Delete a bug (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/bugs/{id}",
    tag = "Bugs",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Bug deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "Bug not found")
    )
)]
pub async fn delete_bug(
    Extension(principal): Extension<Principal>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.bug_service.delete_bug(id, &principal).await?;
    Ok(Json(MessageResponse::new("Bug deleted successfully")))
}
