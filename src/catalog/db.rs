use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::models::{
    Department, DocumentRecord, DocumentRow, NewDocument, NewReport, Report, ResourceType,
    Subject, User,
};
use crate::error::StashError;

/// All reads and writes over the catalog tables. Reference data is read from
/// the store on every request; nothing is cached in process memory.
#[derive(Debug, Clone)]
pub struct CatalogDb {
    pool: SqlitePool,
}

impl CatalogDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, StashError> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY branch")
            .fetch_all(&self.pool)
            .await
            .map_err(StashError::from)
    }

    pub async fn insert_department(
        &self,
        branch: &str,
        abbreviation: &str,
    ) -> Result<Department, StashError> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments(id, branch, abbreviation) VALUES(?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(branch)
        .bind(abbreviation)
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn list_subjects(
        &self,
        year: Option<i64>,
        branch: Option<&str>,
        sem: Option<i64>,
    ) -> Result<Vec<Subject>, StashError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM subjects WHERE 1 = 1");

        if let Some(year) = year {
            query.push(" AND year = ").push_bind(year);
        }
        if let Some(branch) = branch {
            query.push(" AND branch = ").push_bind(branch);
        }
        if let Some(sem) = sem {
            query.push(" AND sem = ").push_bind(sem);
        }

        query
            .build_query_as::<Subject>()
            .fetch_all(&self.pool)
            .await
            .map_err(StashError::from)
    }

    /// Insert a subject, holding the sem/year invariant: a year's semesters
    /// are exactly `2*year - 1` and `2*year`.
    pub async fn insert_subject(
        &self,
        year: i64,
        branch: &str,
        sem: i64,
        subject: &str,
        subjectcode: &str,
    ) -> Result<Subject, StashError> {
        if !(1..=4).contains(&year) {
            return Err(StashError::Validation(format!("invalid year: {year}")));
        }

        if sem != 2 * year - 1 && sem != 2 * year {
            return Err(StashError::Validation(format!(
                "semester {sem} does not belong to year {year}"
            )));
        }

        sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects(id, year, branch, sem, subject, subjectcode)
             VALUES(?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(year)
        .bind(branch)
        .bind(sem)
        .bind(subject)
        .bind(subjectcode)
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn insert_document(&self, new: NewDocument) -> Result<DocumentRow, StashError> {
        sqlx::query_as::<_, DocumentRow>(
            "INSERT INTO documents(id, url, year, branch, semester, subject, subjectcode,
                 type, author, author_email, title, description, created_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.url)
        .bind(&new.year)
        .bind(&new.branch)
        .bind(&new.semester)
        .bind(&new.subject)
        .bind(&new.subjectcode)
        .bind(new.r#type)
        .bind(&new.author)
        .bind(&new.author_email)
        .bind(&new.title)
        .bind(&new.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn get_document(&self, id: Uuid) -> Result<Option<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StashError::from)
    }

    /// Authorization-scoped lookup. A mismatched author email is
    /// indistinguishable from a missing row by design.
    pub async fn get_by_author(
        &self,
        id: Uuid,
        author_email: &str,
    ) -> Result<Option<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE id = ? AND author_email = ?",
        )
        .bind(id)
        .bind(author_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn list_all_documents(&self) -> Result<Vec<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents")
            .fetch_all(&self.pool)
            .await
            .map_err(StashError::from)
    }

    pub async fn list_documents(
        &self,
        year: &str,
        branch: &str,
        subject: &str,
        r#type: ResourceType,
    ) -> Result<Vec<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents
             WHERE year = ? AND branch = ? AND subject = ? AND type = ?",
        )
        .bind(year)
        .bind(branch)
        .bind(subject)
        .bind(r#type)
        .fetch_all(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn list_by_author(
        &self,
        author: &str,
        author_email: &str,
        r#type: ResourceType,
    ) -> Result<Vec<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents
             WHERE author = ? AND author_email = ? AND type = ?",
        )
        .bind(author)
        .bind(author_email)
        .bind(r#type)
        .fetch_all(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn saved_documents(
        &self,
        user: &str,
        r#type: ResourceType,
    ) -> Result<Vec<DocumentRow>, StashError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT d.* FROM documents d
             INNER JOIN bookmarks b ON b.document_id = d.id
             WHERE b.email = ? AND d.type = ?",
        )
        .bind(user)
        .bind(r#type)
        .fetch_all(&self.pool)
        .await
        .map_err(StashError::from)
    }

    /// Case-insensitive substring match across title, subject and subject
    /// code. Unordered, no relevance ranking.
    pub async fn search(&self, query: &str) -> Result<Vec<DocumentRow>, StashError> {
        let pattern = format!("%{query}%");

        sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents
             WHERE title LIKE ? OR subject LIKE ? OR subjectcode LIKE ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(StashError::from)
    }

    /// Apply only the given (column, value) pairs. Callers pass columns from
    /// the fixed editable set, never raw client input.
    pub async fn update_fields(
        &self,
        id: Uuid,
        author_email: &str,
        changes: &BTreeMap<&'static str, String>,
    ) -> Result<u64, StashError> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE documents SET ");

        let mut fields = query.separated(", ");
        for (column, value) in changes {
            fields.push(format!("{column} = "));
            fields.push_bind_unseparated(value.clone());
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(" AND author_email = ").push_bind(author_email);

        let result = query.build().execute(&self.pool).await?;
        debug!(rows = result.rows_affected(), "Updated document {id}");
        Ok(result.rows_affected())
    }

    pub async fn delete_document(&self, id: Uuid, author_email: &str) -> Result<bool, StashError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ? AND author_email = ?")
            .bind(id)
            .bind(author_email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StashError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StashError::from)
    }

    pub async fn insert_user(&self, email: &str, name: &str) -> Result<User, StashError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users(id, email, name, created_at) VALUES(?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn insert_report(&self, new: NewReport) -> Result<Report, StashError> {
        sqlx::query_as::<_, Report>(
            "INSERT INTO reports(id, title, author, author_email, type, year, semester,
                 branch, subject, subjectcode, description, url,
                 reporter_email, reporter_name, reason, timestamp)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.author_email)
        .bind(new.r#type)
        .bind(&new.year)
        .bind(&new.semester)
        .bind(&new.branch)
        .bind(&new.subject)
        .bind(&new.subjectcode)
        .bind(&new.description)
        .bind(&new.url)
        .bind(&new.reporter_email)
        .bind(&new.reporter_name)
        .bind(&new.reason)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn user_count(&self) -> Result<i64, StashError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(StashError::from)
    }

    pub async fn subject_count(&self) -> Result<i64, StashError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects")
            .fetch_one(&self.pool)
            .await
            .map_err(StashError::from)
    }

    /// Attach the engagement email sets to a batch of rows.
    pub async fn with_engagement(
        &self,
        rows: Vec<DocumentRow>,
    ) -> Result<Vec<DocumentRecord>, StashError> {
        let mut records = Vec::with_capacity(rows.len());

        for document in rows {
            let upvote = self.vote_emails(document.id, 1).await?;
            let downvote = self.vote_emails(document.id, -1).await?;
            let saved_users =
                sqlx::query_scalar::<_, String>("SELECT email FROM bookmarks WHERE document_id = ?")
                    .bind(document.id)
                    .fetch_all(&self.pool)
                    .await?;

            records.push(DocumentRecord {
                document,
                upvote,
                downvote,
                saved_users,
            });
        }

        Ok(records)
    }

    async fn vote_emails(&self, id: Uuid, vote: i64) -> Result<Vec<String>, StashError> {
        sqlx::query_scalar::<_, String>(
            "SELECT email FROM votes WHERE document_id = ? AND vote = ?",
        )
        .bind(id)
        .bind(vote)
        .fetch_all(&self.pool)
        .await
        .map_err(StashError::from)
    }
}
