//! API route definitions
//!
//! Every logical outcome is answered with 200; failures carry an `error`
//! field (and the `_id` they concern, where there is one).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use issuetrack_core::{DeleteIssue, Error, Issue, IssueFilter, IssueUpdate, NewIssue, Store};

use crate::extract::IssueBody;

/// Shared application state
#[derive(Debug, Default)]
pub struct AppState {
    store: RwLock<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Read access to the store
    ///
    /// A poisoned lock is recovered; each store operation validates before
    /// it mutates, so a panic cannot leave an issue half-written.
    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the store
    pub fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create API routes
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/issues/{project}",
            get(list_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .with_state(state)
}

/// Successful mutation acknowledgement
#[derive(Debug, Serialize)]
struct Outcome {
    result: &'static str,
    #[serde(rename = "_id")]
    id: String,
}

impl Outcome {
    fn updated(id: String) -> Json<Self> {
        Json(Self {
            result: "successfully updated",
            id,
        })
    }

    fn deleted(id: String) -> Json<Self> {
        Json(Self {
            result: "successfully deleted",
            id,
        })
    }
}

/// Failure body: `{"error": ..., "_id": ...}`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

/// A store error on its way to the client
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_request_error() {
            tracing::debug!("Request rejected: {}", self.0);
            StatusCode::OK
        } else {
            tracing::error!("Request failed: {:?}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorBody {
            error: self.0.to_string(),
            id: self.0.issue_id().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List a project's issues, filtered by the query string
async fn list_issues(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Issue>> {
    let filter: IssueFilter = query.into_iter().collect();
    let issues = state.read().list(&project, &filter);
    tracing::debug!(%project, filters = filter.len(), matched = issues.len(), "Listed issues");
    Json(issues)
}

/// Create a new issue
async fn create_issue(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    IssueBody(fields): IssueBody<NewIssue>,
) -> Result<Json<Issue>, ApiError> {
    let mut store = state.write();
    let issue = store.create(&project, fields)?;
    tracing::debug!(%project, id = %issue.id, total = store.len(), "Created issue");
    Ok(Json(issue))
}

/// Update an existing issue
async fn update_issue(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    IssueBody(changes): IssueBody<IssueUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.write().update(&project, changes)?;
    tracing::debug!(%project, %id, "Updated issue");
    Ok(Outcome::updated(id))
}

/// Delete an issue
async fn delete_issue(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    IssueBody(request): IssueBody<DeleteIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.write();
    let id = store.delete(&project, request)?;
    tracing::debug!(
        %project,
        %id,
        remaining = store.len(),
        projects = store.project_count(),
        "Deleted issue"
    );
    Ok(Outcome::deleted(id))
}
