/// Roster storage layer
///
/// Owns the relational schema and every read/write against it:
/// - Record types (Collaborator, SkillEntry, Enrollment)
/// - SQLite pool creation and schema setup with sqlx
/// - Collaborator CRUD and project enrollment queries

// Record type definitions
pub mod types;

// Pool creation and schema initialization
pub mod database;

// Typed storage errors
pub mod error;

// Query and command functions over the schema
pub mod storage;

// Re-export commonly used types
pub use database::open_pool;
pub use error::StorageError;
pub use storage::RosterStorage;
pub use types::{Collaborator, CollaboratorPatch, Enrollment, Level, NewCollaborator, SkillEntry};
