/// HTTP API Layer
///
/// This module exposes the roster storage over REST. It handles:
/// - Collaborator CRUD with payload validation
/// - Project enrollment with Projects service notification
/// - Error shaping into `{ "detail": ... }` bodies

// Collaborator management endpoints (GET/POST/PATCH/DELETE)
pub mod collaborators;

// Enrollment and per-project listing endpoints
pub mod projects;

// Handler error type and HTTP status mapping
pub mod error;

// Re-export router builders
pub use collaborators::{create_collaborator_routes, AppState};
pub use error::ApiError;
pub use projects::create_project_routes;
