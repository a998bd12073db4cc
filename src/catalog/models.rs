use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Document category. The odd `Notes(or)PPT` spelling is the wire value the
/// clients have always sent, so it stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ResourceType {
    #[serde(rename = "Notes(or)PPT")]
    #[sqlx(rename = "Notes(or)PPT")]
    NotesOrPpt,
    Books,
    Assignments,
    PreviousYearPapers,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::NotesOrPpt => "Notes(or)PPT",
            ResourceType::Books => "Books",
            ResourceType::Assignments => "Assignments",
            ResourceType::PreviousYearPapers => "PreviousYearPapers",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = crate::error::StashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Notes(or)PPT" => Ok(ResourceType::NotesOrPpt),
            "Books" => Ok(ResourceType::Books),
            "Assignments" => Ok(ResourceType::Assignments),
            "PreviousYearPapers" => Ok(ResourceType::PreviousYearPapers),
            other => Err(crate::error::StashError::Validation(format!(
                "Unknown resource type: {other}"
            ))),
        }
    }
}

/// Reference data row for an academic department.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: Uuid,
    pub branch: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: Uuid,
    pub year: i64,
    pub branch: String,
    pub sem: i64,
    pub subject: String,
    pub subjectcode: String,
}

/// Database model of an uploaded resource. Engagement state lives in the
/// `votes` and `bookmarks` tables, keyed by this row's id.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    pub id: Uuid,
    pub url: String,
    pub year: String,
    pub branch: String,
    pub semester: String,
    pub subject: String,
    pub subjectcode: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub r#type: ResourceType,
    pub author: String,
    pub author_email: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A document as clients see it: the row plus the engagement email sets in
/// the array shape the original API exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(flatten)]
    pub document: DocumentRow,
    pub upvote: Vec<String>,
    pub downvote: Vec<String>,
    pub saved_users: Vec<String>,
}

/// Validated input for a document insert. The title is already in its final
/// form (previous-year papers carry the derived prefix).
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub url: String,
    pub year: String,
    pub branch: String,
    pub semester: String,
    pub subject: String,
    pub subjectcode: String,
    pub r#type: ResourceType,
    pub author: String,
    pub author_email: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable snapshot of a document at report time, plus the reporter.
/// Independent lifecycle from the document itself.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub author_email: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub r#type: ResourceType,
    pub year: String,
    pub semester: String,
    pub branch: String,
    pub subject: String,
    pub subjectcode: String,
    pub description: String,
    pub url: String,
    pub reporter_email: String,
    pub reporter_name: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub author: String,
    pub author_email: String,
    pub r#type: ResourceType,
    pub year: String,
    pub semester: String,
    pub branch: String,
    pub subject: String,
    pub subjectcode: String,
    pub description: String,
    pub url: String,
    pub reporter_email: String,
    pub reporter_name: String,
    pub reason: String,
}
