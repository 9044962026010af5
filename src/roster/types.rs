/// Roster type definitions
///
/// Explicit record types for collaborators, their skills and project enrollments.
/// Field names follow the public JSON contract (`nome`, `cargo`, `nivel`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proficiency level shared by collaborators and their individual skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected level string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid level '{}': expected one of beginner, intermediate, advanced",
            self.0
        )
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for Level {
    type Err = UnknownLevel;

    /// Exact, case-sensitive match against the three allowed values
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// A named skill with the collaborator's proficiency in it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillEntry {
    pub nome: String,
    pub nivel: Level,
}

impl SkillEntry {
    pub fn new(nome: impl Into<String>, nivel: Level) -> Self {
        Self {
            nome: nome.into(),
            nivel,
        }
    }
}

/// A stored collaborator with its nested skill list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: i64,
    pub email: String,
    pub nome: String,
    pub cargo: String,
    pub level: Level,
    pub skills: Vec<SkillEntry>,
}

/// Validated input for creating a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollaborator {
    pub email: String,
    pub nome: String,
    pub cargo: String,
    pub level: Level,
    pub skills: Vec<SkillEntry>,
}

/// Partial update: only `Some` fields change.
///
/// `skills: Some(..)` replaces the whole skill set, including with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorPatch {
    pub email: Option<String>,
    pub nome: Option<String>,
    pub cargo: Option<String>,
    pub level: Option<Level>,
    pub skills: Option<Vec<SkillEntry>>,
}

/// Association between a collaborator and an external project id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub colaborador_id: i64,
    pub project_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_only_lowercase_names() {
        assert_eq!("beginner".parse::<Level>(), Ok(Level::Beginner));
        assert_eq!("advanced".parse::<Level>(), Ok(Level::Advanced));
        assert!("Advanced".parse::<Level>().is_err());
        assert!("iniciante".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn collaborator_serializes_with_contract_field_names() {
        let collaborator = Collaborator {
            id: 7,
            email: "a@x.com".to_string(),
            nome: "Ana".to_string(),
            cargo: "Dev".to_string(),
            level: Level::Beginner,
            skills: vec![SkillEntry::new("Go", Level::Intermediate)],
        };

        let value = serde_json::to_value(&collaborator).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "email": "a@x.com",
                "nome": "Ana",
                "cargo": "Dev",
                "level": "beginner",
                "skills": [{ "nome": "Go", "nivel": "intermediate" }]
            })
        );
    }
}
