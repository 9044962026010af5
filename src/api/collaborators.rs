/// Collaborator REST API endpoints
///
/// CRUD over the roster. Request bodies arrive as loosely-typed payloads and
/// are validated into storage inputs here, so every rejection carries a
/// `{ "detail": ... }` body.

use crate::{
    api::error::ApiError,
    projects_service::ProjectsClient,
    roster::{Collaborator, CollaboratorPatch, Level, NewCollaborator, RosterStorage, SkillEntry},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::HashSet;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Roster storage handle
    pub storage: RosterStorage,
    /// Projects service client; `None` disables membership notifications
    pub projects: Option<ProjectsClient>,
}

/// Skill as sent by clients
#[derive(Debug, Deserialize)]
pub struct SkillPayload {
    pub nome: String,
    pub nivel: String,
}

/// Request body for collaborator creation
#[derive(Debug, Deserialize)]
pub struct CreateCollaboratorRequest {
    pub email: String,
    pub nome: String,
    pub cargo: String,
    pub level: String,
    #[serde(default)]
    pub skills: Vec<SkillPayload>,
}

/// Request body for partial updates
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCollaboratorRequest {
    pub email: Option<String>,
    pub nome: Option<String>,
    pub cargo: Option<String>,
    pub level: Option<String>,
    pub skills: Option<Vec<SkillPayload>>,
}

/// Create collaborator routes
pub fn create_collaborator_routes() -> Router<AppState> {
    Router::new()
        .route("/collaborators", get(list_collaborators).post(create_collaborator))
        .route("/collaborators/by-email/{email}", get(get_collaborator_by_email))
        .route(
            "/collaborators/{id}",
            get(get_collaborator)
                .patch(update_collaborator)
                .delete(delete_collaborator),
        )
}

/// List all collaborators
///
/// GET /collaborators
async fn list_collaborators(State(state): State<AppState>) -> Result<Json<Vec<Collaborator>>, ApiError> {
    Ok(Json(state.storage.list_collaborators().await?))
}

/// Create a collaborator with its skills
///
/// POST /collaborators
/// Body: { "email": "...", "nome": "...", "cargo": "...", "level": "...", "skills": [{ "nome": "...", "nivel": "..." }] }
async fn create_collaborator(
    State(state): State<AppState>,
    payload: Result<Json<CreateCollaboratorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Collaborator>), ApiError> {
    let Json(payload) = payload?;
    let new = validate_new(payload)?;

    let created = state.storage.create_collaborator(&new).await?;
    tracing::info!("🔥 Created collaborator {} ({})", created.id, created.email);

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /collaborators/{id}
async fn get_collaborator(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Collaborator>, ApiError> {
    let Path(id) = path?;
    state
        .storage
        .get_collaborator(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// GET /collaborators/by-email/{email}
async fn get_collaborator_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Collaborator>, ApiError> {
    state
        .storage
        .get_collaborator_by_email(&email)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("collaborator not found: {}", email)))
}

/// Partially update a collaborator
///
/// PATCH /collaborators/{id}
/// Body: any subset of the creation fields; `skills` replaces the whole set
async fn update_collaborator(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCollaboratorRequest>, JsonRejection>,
) -> Result<Json<Collaborator>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let patch = validate_patch(payload)?;

    let updated = state
        .storage
        .update_collaborator(id, &patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("🔥 Updated collaborator {}", id);

    Ok(Json(updated))
}

/// DELETE /collaborators/{id}
async fn delete_collaborator(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    if state.storage.delete_collaborator(id).await? {
        tracing::info!("Deleted collaborator {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("collaborator not found: {}", id))
}

fn validate_new(payload: CreateCollaboratorRequest) -> Result<NewCollaborator, ApiError> {
    Ok(NewCollaborator {
        email: validate_email(&payload.email)?,
        nome: required("nome", &payload.nome)?,
        cargo: required("cargo", &payload.cargo)?,
        level: parse_level("level", &payload.level)?,
        skills: validate_skills(payload.skills)?,
    })
}

fn validate_patch(payload: UpdateCollaboratorRequest) -> Result<CollaboratorPatch, ApiError> {
    Ok(CollaboratorPatch {
        email: payload.email.as_deref().map(validate_email).transpose()?,
        nome: payload.nome.as_deref().map(|v| required("nome", v)).transpose()?,
        cargo: payload.cargo.as_deref().map(|v| required("cargo", v)).transpose()?,
        level: payload.level.as_deref().map(|v| parse_level("level", v)).transpose()?,
        skills: payload.skills.map(validate_skills).transpose()?,
    })
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn parse_level(field: &str, value: &str) -> Result<Level, ApiError> {
    value
        .parse::<Level>()
        .map_err(|e| ApiError::Validation(format!("{}: {}", field, e)))
}

/// Syntactic check only: one '@', non-empty local part, dotted domain, no whitespace
fn validate_email(value: &str) -> Result<String, ApiError> {
    let email = value.trim();
    let invalid = || ApiError::Validation(format!("invalid email address: '{}'", value));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(invalid());
    }

    Ok(email.to_string())
}

fn validate_skills(skills: Vec<SkillPayload>) -> Result<Vec<SkillEntry>, ApiError> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|skill| -> Result<SkillEntry, ApiError> {
            let nome = required("skill nome", &skill.nome)?;
            let nivel = parse_level("skill nivel", &skill.nivel)?;
            if !seen.insert(nome.clone()) {
                return Err(ApiError::Validation(format!("skill listed more than once: {}", nome)));
            }
            Ok(SkillEntry { nome, nivel })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(level: &str, skills: Vec<(&str, &str)>) -> CreateCollaboratorRequest {
        CreateCollaboratorRequest {
            email: "a@x.com".to_string(),
            nome: "Ana".to_string(),
            cargo: "Dev".to_string(),
            level: level.to_string(),
            skills: skills
                .into_iter()
                .map(|(nome, nivel)| SkillPayload {
                    nome: nome.to_string(),
                    nivel: nivel.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        let new = validate_new(request("beginner", vec![("Go", "intermediate")])).unwrap();
        assert_eq!(new.level, Level::Beginner);
        assert_eq!(new.skills, vec![SkillEntry::new("Go", Level::Intermediate)]);
    }

    #[test]
    fn rejects_levels_outside_enum() {
        assert!(matches!(
            validate_new(request("expert", vec![])),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_new(request("beginner", vec![("Go", "iniciante")])),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_duplicate_skill_names() {
        let err = validate_new(request(
            "beginner",
            vec![("Go", "beginner"), ("Go", "advanced")],
        ))
        .unwrap_err();
        assert!(err.to_string().contains("Go"));
    }

    #[test]
    fn email_shapes() {
        assert_eq!(validate_email(" a@x.com ").unwrap(), "a@x.com");
        for bad in ["", "ax.com", "@x.com", "a@x", "a@.com", "a@x.com.", "a b@x.com", "a@b@x.com", "a@x..com"] {
            assert!(validate_email(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn patch_keeps_absent_fields_absent() {
        let patch = validate_patch(UpdateCollaboratorRequest {
            cargo: Some("Lead".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            patch,
            CollaboratorPatch {
                cargo: Some("Lead".to_string()),
                ..Default::default()
            }
        );

        assert!(validate_patch(UpdateCollaboratorRequest {
            nome: Some("   ".to_string()),
            ..Default::default()
        })
        .is_err());
    }
}
