/// Roster: collaborator, skill and project-enrollment service
///
/// This library provides the storage layer over SQLite and the REST API that
/// exposes it, plus the client used to notify the external Projects service.

// Core configuration and setup
pub mod config;

// Storage layer - schema, record types and queries
pub mod roster;

// Outbound client for the external Projects service
pub mod projects_service;

// HTTP API layer - REST endpoints for collaborators and enrollments
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use roster::{Collaborator, Enrollment, Level, RosterStorage, SkillEntry};
pub use server::{create_app, start_server};
