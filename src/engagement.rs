use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    catalog::{CatalogDb, DocumentRow, NewDocument, ResourceType},
    error::StashError,
    storage::{self, BlobStore},
    upload::{UploadRequest, UploadSource},
};

pub mod db;

pub use db::{EngagementDb, VoteDirection, VoteSummary};

/// The fields an author may change on their own upload. Anything absent is
/// left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFields {
    pub url: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
    pub subjectcode: Option<String>,
    pub r#type: Option<ResourceType>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub enum EditOutcome {
    NoChanges,
    Updated(BTreeMap<&'static str, FieldChange>),
}

/// Field-level diff of the requested edit against the stored row.
pub fn diff(current: &DocumentRow, fields: &EditFields) -> BTreeMap<&'static str, FieldChange> {
    let mut changes = BTreeMap::new();

    let mut check = |column: &'static str, from: &str, to: Option<&str>| {
        if let Some(to) = to {
            if to != from {
                changes.insert(
                    column,
                    FieldChange {
                        from: from.to_string(),
                        to: to.to_string(),
                    },
                );
            }
        }
    };

    check("url", &current.url, fields.url.as_deref());
    check("year", &current.year, fields.year.as_deref());
    check("branch", &current.branch, fields.branch.as_deref());
    check("semester", &current.semester, fields.semester.as_deref());
    check("subject", &current.subject, fields.subject.as_deref());
    check(
        "subjectcode",
        &current.subjectcode,
        fields.subjectcode.as_deref(),
    );
    check(
        "type",
        current.r#type.as_str(),
        fields.r#type.map(|t| t.as_str()),
    );
    check("author", &current.author, fields.author.as_deref());
    check("title", &current.title, fields.title.as_deref());
    check(
        "description",
        &current.description,
        fields.description.as_deref(),
    );

    changes
}

/// Two-phase upload: the object is written first, then the catalog row. A
/// failed insert removes the just-written object so nothing is orphaned.
pub async fn store(
    catalog: &CatalogDb,
    blobs: &BlobStore,
    public_url: &str,
    request: UploadRequest,
) -> Result<DocumentRow, StashError> {
    let title = request.formatted_title();

    let (url, stored_key) = match &request.source {
        UploadSource::Url(url) => (url.clone(), None),
        UploadSource::File(file) => {
            let exam = request
                .exam
                .as_ref()
                .map(|(year, kind)| (year.as_str(), kind.as_str()));
            let key = storage::object_key(
                &request.year,
                &request.branch,
                &request.subject,
                request.r#type.as_str(),
                exam,
                &file.name,
                Utc::now().timestamp_millis(),
            );
            blobs.put(&key, &file.bytes).await?;
            (format!("{public_url}/{key}"), Some(key))
        }
    };

    let new = NewDocument {
        url,
        year: request.year,
        branch: request.branch,
        semester: request.semester,
        subject: request.subject,
        subjectcode: request.subjectcode,
        r#type: request.r#type,
        author: request.author,
        author_email: request.author_email,
        title,
        description: request.description,
    };

    match catalog.insert_document(new).await {
        Ok(row) => {
            info!("Uploaded: {}", row.title);
            Ok(row)
        }
        Err(err) => {
            if let Some(key) = stored_key {
                if let Err(cleanup) = blobs.delete(&key).await {
                    warn!("Could not clean up object {key} after failed insert: {cleanup}");
                }
            }
            Err(err)
        }
    }
}

/// Author-gated edit. The lookup itself is scoped by author email, so a
/// mismatched author is indistinguishable from a missing row.
pub async fn edit(
    catalog: &CatalogDb,
    id: Uuid,
    author_email: &str,
    fields: &EditFields,
) -> Result<EditOutcome, StashError> {
    let Some(current) = catalog.get_by_author(id, author_email).await? else {
        return Err(StashError::NotFound("Resource not found.".to_string()));
    };

    let changes = diff(&current, fields);
    if changes.is_empty() {
        return Ok(EditOutcome::NoChanges);
    }

    let values = changes
        .iter()
        .map(|(column, change)| (*column, change.to.clone()))
        .collect::<BTreeMap<_, _>>();

    catalog.update_fields(id, author_email, &values).await?;

    info!("Resource updated: {}", current.title);
    Ok(EditOutcome::Updated(changes))
}

/// Author-gated delete. Objects we stored ourselves are removed first,
/// best-effort: a failed blob delete is logged and the row is removed
/// anyway.
pub async fn delete(
    catalog: &CatalogDb,
    blobs: &BlobStore,
    public_url: &str,
    id: Uuid,
    author_email: &str,
) -> Result<(), StashError> {
    let Some(existing) = catalog.get_by_author(id, author_email).await? else {
        return Err(StashError::NotFound(
            "Resource not found or you don't have permission to delete it".to_string(),
        ));
    };

    // Only URLs directly under the public base are ours; a sibling path that
    // merely shares the string prefix is not.
    if let Some(key) = existing
        .url
        .strip_prefix(public_url)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
    {
        if let Err(err) = blobs.delete(key).await {
            warn!("Could not delete stored object {key}: {err}");
        }
    }

    catalog.delete_document(id, author_email).await?;
    info!("Resource deleted: {}", existing.title);
    Ok(())
}
