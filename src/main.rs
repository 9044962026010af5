/// Roster service entry point
///
/// Loads configuration from the environment and starts the HTTP server with:
/// - Collaborator management at /collaborators/*
/// - Project enrollment at /collaborators/{id}/projects/* and /projects/*
/// - Health check at /healthz

use roster::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
