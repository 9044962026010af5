/// Configuration management for the roster service
///
/// Handles server binding, database location, and the outbound Projects service.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// External Projects service configuration
    pub projects: ProjectsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path (default: "data/roster.db"), or ":memory:"
    pub path: String,
}

/// Projects service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Base URL of the Projects service. `None` disables membership notifications.
    pub base_url: Option<String>,
    /// Timeout for a single outbound request, in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("ROSTER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("ROSTER_PORT")
                    .unwrap_or_else(|_| "8002".to_string())
                    .parse()
                    .unwrap_or(8002),
            },
            database: DatabaseConfig {
                path: std::env::var("ROSTER_DATABASE_PATH")
                    .unwrap_or_else(|_| "data/roster.db".to_string()),
            },
            projects: ProjectsConfig {
                base_url: projects_base_url(std::env::var("ROSTER_PROJECTS_API_URL").ok()),
                timeout_secs: std::env::var("ROSTER_PROJECTS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
        }
    }
}

impl Config {
    /// Configuration for tests and embedding: in-memory database, ephemeral port,
    /// notifications sent to `projects_url` when given.
    pub fn ephemeral(projects_url: Option<String>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                path: ":memory:".to_string(),
            },
            projects: ProjectsConfig {
                base_url: projects_url,
                timeout_secs: 2,
            },
        }
    }
}

/// Unset means the public default; an empty value disables notifications.
fn projects_base_url(raw: Option<String>) -> Option<String> {
    match raw {
        None => Some("https://bdprojetos.azurewebsites.net".to_string()),
        Some(url) if url.trim().is_empty() => None,
        Some(url) => Some(url.trim_end_matches('/').to_string()),
    }
}
