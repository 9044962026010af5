/// SQLite persistence layer for the collaborator roster
///
/// Maps the normalized schema (collaborators, skills and the two join tables)
/// into nested `Collaborator` records. Every multi-write operation runs in a
/// single transaction; dropping an uncommitted transaction rolls it back.

use crate::roster::{
    error::{classify, classify_link, StorageError},
    types::{Collaborator, CollaboratorPatch, Enrollment, Level, NewCollaborator, SkillEntry},
};
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    QueryBuilder, Row, Sqlite, SqliteConnection,
};
use std::collections::HashMap;

type StorageResult<T> = Result<T, StorageError>;

const COLLABORATOR_COLUMNS: &str = "SELECT id, email, nome, cargo, level FROM collaborators";

const SKILL_COLUMNS: &str = r#"
    SELECT cs.collaborator_id, s.nome, cs.nivel
    FROM collaborator_skills cs
    JOIN skills s ON cs.skill_id = s.id
"#;

/// Roster storage handle
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct RosterStorage {
    pool: SqlitePool,
}

impl RosterStorage {
    /// Create new storage instance over an initialized pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All collaborators ordered by id, each with its skills
    pub async fn list_collaborators(&self) -> StorageResult<Vec<Collaborator>> {
        let rows = sqlx::query(&format!("{COLLABORATOR_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        let skill_rows = sqlx::query(&format!(
            "{SKILL_COLUMNS} ORDER BY cs.collaborator_id, cs.rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        assemble(rows, skill_rows)
    }

    /// Retrieve a collaborator by id
    pub async fn get_collaborator(&self, id: i64) -> StorageResult<Option<Collaborator>> {
        Ok(self.get_collaborators(&[id]).await?.into_iter().next())
    }

    /// Retrieve a collaborator by email, ignoring ASCII case
    pub async fn get_collaborator_by_email(&self, email: &str) -> StorageResult<Option<Collaborator>> {
        let row = sqlx::query("SELECT id FROM collaborators WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.get_collaborator(row.try_get("id")?).await,
            None => Ok(None),
        }
    }

    /// Collaborators for the given ids, ordered by id. Unknown ids are skipped.
    pub async fn get_collaborators(&self, ids: &[i64]) -> StorageResult<Vec<Collaborator>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(COLLABORATOR_COLUMNS);
        query.push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");
        let rows = query.build().fetch_all(&self.pool).await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(SKILL_COLUMNS);
        query.push(" WHERE cs.collaborator_id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY cs.collaborator_id, cs.rowid");
        let skill_rows = query.build().fetch_all(&self.pool).await?;

        assemble(rows, skill_rows)
    }

    /// Insert a collaborator and its skills atomically
    ///
    /// Skills are upserted by name; the join row carries the per-collaborator level.
    pub async fn create_collaborator(&self, new: &NewCollaborator) -> StorageResult<Collaborator> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO collaborators (email, nome, cargo, level)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&new.email)
        .bind(&new.nome)
        .bind(&new.cargo)
        .bind(new.level.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| classify(e, || StorageError::EmailTaken(new.email.clone())))?;

        let id = result.last_insert_rowid();
        insert_skills(&mut tx, id, &new.skills).await?;

        tx.commit().await?;

        tracing::debug!("Inserted collaborator {} with {} skills", id, new.skills.len());

        self.get_collaborator(id)
            .await?
            .ok_or(StorageError::CollaboratorNotFound(id))
    }

    /// Partially update a collaborator
    ///
    /// Returns `None` when the id is absent. Supplied skills replace the whole
    /// set (delete all joins, then reinsert). The UPDATE is the first statement
    /// so the transaction takes the write lock before reading anything.
    pub async fn update_collaborator(
        &self,
        id: i64,
        patch: &CollaboratorPatch,
    ) -> StorageResult<Option<Collaborator>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE collaborators SET
                email = COALESCE(?, email),
                nome = COALESCE(?, nome),
                cargo = COALESCE(?, cargo),
                level = COALESCE(?, level)
            WHERE id = ?
            "#,
        )
        .bind(patch.email.as_deref())
        .bind(patch.nome.as_deref())
        .bind(patch.cargo.as_deref())
        .bind(patch.level.map(|level| level.as_str()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            classify(e, || {
                StorageError::EmailTaken(patch.email.clone().unwrap_or_default())
            })
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(skills) = &patch.skills {
            sqlx::query("DELETE FROM collaborator_skills WHERE collaborator_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_skills(&mut tx, id, skills).await?;
        }

        tx.commit().await?;

        tracing::debug!("Committed update for collaborator {}", id);

        self.get_collaborator(id).await
    }

    /// Delete a collaborator; skill and project joins cascade
    pub async fn delete_collaborator(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM collaborators WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Enroll a collaborator in a project
    ///
    /// Strict: the collaborator must exist and the pair must be new. A single
    /// INSERT decides both, through the foreign key and the composite key.
    pub async fn enroll(&self, collaborator_id: i64, project_id: i64) -> StorageResult<Enrollment> {
        sqlx::query("INSERT INTO collaborator_projects (collaborator_id, project_id) VALUES (?, ?)")
            .bind(collaborator_id)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                classify_link(
                    e,
                    || StorageError::CollaboratorNotFound(collaborator_id),
                    || StorageError::AlreadyEnrolled {
                        collaborator_id,
                        project_id,
                    },
                )
            })?;

        Ok(Enrollment {
            colaborador_id: collaborator_id,
            project_id,
        })
    }

    /// Remove an enrollment; returns whether a row was actually removed
    pub async fn unenroll(&self, collaborator_id: i64, project_id: i64) -> StorageResult<bool> {
        let result = sqlx::query(
            "DELETE FROM collaborator_projects WHERE collaborator_id = ? AND project_id = ?",
        )
        .bind(collaborator_id)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ids of collaborators enrolled in a project, ascending
    pub async fn list_enrolled_ids(&self, project_id: i64) -> StorageResult<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT collaborator_id FROM collaborator_projects WHERE project_id = ? ORDER BY collaborator_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("collaborator_id").map_err(StorageError::from))
            .collect()
    }
}

/// Upsert each skill by name and link it with the given level
async fn insert_skills(
    conn: &mut SqliteConnection,
    collaborator_id: i64,
    skills: &[SkillEntry],
) -> StorageResult<()> {
    for skill in skills {
        sqlx::query("INSERT INTO skills (nome) VALUES (?) ON CONFLICT(nome) DO NOTHING")
            .bind(&skill.nome)
            .execute(&mut *conn)
            .await?;

        let skill_id: i64 = sqlx::query("SELECT id FROM skills WHERE nome = ?")
            .bind(&skill.nome)
            .fetch_one(&mut *conn)
            .await?
            .try_get("id")?;

        sqlx::query(
            r#"
            INSERT INTO collaborator_skills (collaborator_id, skill_id, nivel)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(collaborator_id)
        .bind(skill_id)
        .bind(skill.nivel.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| classify(e, || StorageError::DuplicateSkill(skill.nome.clone())))?;
    }

    Ok(())
}

/// Group flattened skill rows under their collaborator rows, keeping row order
fn assemble(rows: Vec<SqliteRow>, skill_rows: Vec<SqliteRow>) -> StorageResult<Vec<Collaborator>> {
    let mut skills: HashMap<i64, Vec<SkillEntry>> = HashMap::new();
    for row in &skill_rows {
        let collaborator_id: i64 = row.try_get("collaborator_id")?;
        skills.entry(collaborator_id).or_default().push(SkillEntry {
            nome: row.try_get("nome")?,
            nivel: decode_level(row, "nivel")?,
        });
    }

    rows.iter()
        .map(|row| -> StorageResult<Collaborator> {
            let id: i64 = row.try_get("id")?;
            Ok(Collaborator {
                id,
                email: row.try_get("email")?,
                nome: row.try_get("nome")?,
                cargo: row.try_get("cargo")?,
                level: decode_level(row, "level")?,
                skills: skills.remove(&id).unwrap_or_default(),
            })
        })
        .collect()
}

fn decode_level(row: &SqliteRow, column: &str) -> StorageResult<Level> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Level>()
        .map_err(|e| StorageError::from(sqlx::Error::Decode(Box::new(e))))
}
