/// Client for the external Projects service
///
/// The roster notifies the Projects service when enrollments change. Calls are
/// single-attempt with a bounded timeout; committed local state is never
/// rolled back because of a failure here.

use crate::config::ProjectsConfig;
use crate::roster::{Collaborator, Level};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Skill reported for collaborators that have none
pub const PLACEHOLDER_SKILL: &str = "geral";

/// Outbound notification failures
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("projects service answered with status {0}")]
    Status(u16),
    #[error("projects service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Body of `POST /projects/{id}/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberNotice {
    pub collaborator_email: String,
    pub contributed_skill_name: String,
    pub contributed_skill_level: Level,
}

impl MemberNotice {
    /// Build the notice from the collaborator's first skill, or the placeholder
    pub fn for_collaborator(collaborator: &Collaborator) -> Self {
        let (name, level) = collaborator
            .skills
            .first()
            .map(|skill| (skill.nome.clone(), skill.nivel))
            .unwrap_or_else(|| (PLACEHOLDER_SKILL.to_string(), Level::Beginner));

        Self {
            collaborator_email: collaborator.email.clone(),
            contributed_skill_name: name,
            contributed_skill_level: level,
        }
    }
}

/// HTTP client bound to one Projects service base URL
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProjectsClient {
    /// Build a client from configuration; `Ok(None)` when notifications are disabled
    pub fn from_config(config: &ProjectsConfig) -> Result<Option<Self>, UpstreamError> {
        match &config.base_url {
            Some(base_url) => Ok(Some(Self::new(
                base_url,
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(None),
        }
    }

    /// Every request made through this client is bounded by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST /projects/{project_id}/members; only 200 and 201 count as success
    pub async fn add_member(&self, project_id: i64, notice: &MemberNotice) -> Result<(), UpstreamError> {
        let url = format!("{}/projects/{}/members", self.base_url, project_id);
        tracing::debug!("🌍 Notifying projects service: POST {}", url);

        let response = self.http.post(&url).json(notice).send().await?;

        match response.status().as_u16() {
            200 | 201 => Ok(()),
            status => Err(UpstreamError::Status(status)),
        }
    }

    /// DELETE /projects/{project_id}/members/{collaborator_id}
    pub async fn remove_member(&self, project_id: i64, collaborator_id: i64) -> Result<(), UpstreamError> {
        let url = format!(
            "{}/projects/{}/members/{}",
            self.base_url, project_id, collaborator_id
        );
        tracing::debug!("🌍 Notifying projects service: DELETE {}", url);

        let response = self.http.delete(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::SkillEntry;

    fn collaborator(skills: Vec<SkillEntry>) -> Collaborator {
        Collaborator {
            id: 1,
            email: "a@x.com".to_string(),
            nome: "Ana".to_string(),
            cargo: "Dev".to_string(),
            level: Level::Advanced,
            skills,
        }
    }

    #[test]
    fn notice_uses_first_skill() {
        let notice = MemberNotice::for_collaborator(&collaborator(vec![
            SkillEntry::new("Go", Level::Intermediate),
            SkillEntry::new("SQL", Level::Advanced),
        ]));

        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            serde_json::json!({
                "collaborator_email": "a@x.com",
                "contributed_skill_name": "Go",
                "contributed_skill_level": "intermediate"
            })
        );
    }

    #[test]
    fn notice_falls_back_to_placeholder() {
        let notice = MemberNotice::for_collaborator(&collaborator(vec![]));
        assert_eq!(notice.contributed_skill_name, PLACEHOLDER_SKILL);
        assert_eq!(notice.contributed_skill_level, Level::Beginner);
    }

    #[test]
    fn disabled_when_no_base_url() {
        let config = ProjectsConfig {
            base_url: None,
            timeout_secs: 10,
        };
        assert!(ProjectsClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn configured_client_keeps_base_url() {
        let config = ProjectsConfig {
            base_url: Some("http://localhost:9000/".to_string()),
            timeout_secs: 1,
        };
        let client = ProjectsClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[tokio::test]
    async fn requests_are_bounded_by_timeout() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = ProjectsClient::new(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();
        let notice = MemberNotice::for_collaborator(&collaborator(vec![]));

        let started = std::time::Instant::now();
        let err = client.add_member(1, &notice).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(ref e) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
