/// Project enrollment endpoints
///
/// Enrollment changes are committed locally first, then reported to the
/// Projects service. A failed report fails the enroll request (the local row
/// stays) and is only logged on unenroll.

use crate::{
    api::{collaborators::AppState, error::ApiError},
    projects_service::MemberNotice,
    roster::{Collaborator, Enrollment},
};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

/// Create enrollment and project listing routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/collaborators/{id}/projects/{project_id}",
            post(enroll).delete(unenroll),
        )
        .route("/projects/{project_id}/collaborators", get(list_project_collaborators))
        .route(
            "/projects/{project_id}/collaborators/details",
            get(list_project_collaborator_details),
        )
}

/// Enroll a collaborator in a project
///
/// POST /collaborators/{id}/projects/{project_id}
/// Returns: { "colaborador_id": 1, "project_id": 42 }
async fn enroll(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    let Path((collaborator_id, project_id)) = path?;

    let enrollment = state.storage.enroll(collaborator_id, project_id).await?;
    tracing::info!("📥 Enrolled collaborator {} in project {}", collaborator_id, project_id);

    if let Some(client) = &state.projects {
        let collaborator = state
            .storage
            .get_collaborator(collaborator_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("collaborator not found: {}", collaborator_id)))?;

        let notice = MemberNotice::for_collaborator(&collaborator);
        if let Err(e) = client.add_member(project_id, &notice).await {
            tracing::warn!(
                "❌ Projects service rejected enrollment {} -> {} (kept locally): {}",
                collaborator_id,
                project_id,
                e
            );
            return Err(e.into());
        }
    }

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Remove a collaborator from a project
///
/// DELETE /collaborators/{id}/projects/{project_id}
async fn unenroll(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((collaborator_id, project_id)) = path?;

    if !state.storage.unenroll(collaborator_id, project_id).await? {
        return Err(ApiError::NotFound(format!(
            "enrollment not found: collaborator {} in project {}",
            collaborator_id, project_id
        )));
    }
    tracing::info!("Unenrolled collaborator {} from project {}", collaborator_id, project_id);

    if let Some(client) = &state.projects {
        if let Err(e) = client.remove_member(project_id, collaborator_id).await {
            tracing::warn!(
                "⚠️ Projects service not updated for unenrollment {} -> {}: {}",
                collaborator_id,
                project_id,
                e
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/{project_id}/collaborators
/// Returns: [1, 5, 9]
async fn list_project_collaborators(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<i64>>, ApiError> {
    let Path(project_id) = path?;
    Ok(Json(state.storage.list_enrolled_ids(project_id).await?))
}

/// Full records for a project's collaborators
///
/// GET /projects/{project_id}/collaborators/details
/// Ids deleted between the two reads are skipped.
async fn list_project_collaborator_details(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Collaborator>>, ApiError> {
    let Path(project_id) = path?;
    let ids = state.storage.list_enrolled_ids(project_id).await?;
    Ok(Json(state.storage.get_collaborators(&ids).await?))
}
