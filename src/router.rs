use crate::{
    auth::Auth,
    catalog::{Department, DocumentRecord, NewReport, ResourceType, Subject},
    engagement::{self, EditFields, EditOutcome, VoteDirection},
    error::StashError,
    identity::{self, VerifiedIdentity},
    state::Portal,
    upload::{FileAttachment, UploadDraft},
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::Method,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use self::admin::admin_router;

mod admin;

pub fn router(state: Portal, auth: Option<Auth>, max_upload_bytes: usize) -> Router {
    let router = public_router(state.clone(), max_upload_bytes);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    if let Some(auth) = auth {
        router.merge(admin_router(state, auth))
    } else {
        router
    }
    .layer(TraceLayer::new_for_http())
    .layer(cors)
}

fn public_router(state: Portal, max_upload_bytes: usize) -> Router {
    Router::new()
        .nest_service("/files", ServeDir::new(state.blobs.root()))
        .route("/branches", get(branches))
        .route("/subjects", get(subjects))
        .route("/upload", post(upload_document))
        .route("/search", get(search))
        .route("/report", post(report))
        .route("/save-user", post(save_user))
        .route("/user-count", get(user_count))
        .route("/subject-count", get(subject_count))
        .route("/api/files", get(files))
        .route("/api/uploadedfiles", get(uploaded_files))
        .route("/api/savedFiles", get(saved_files))
        .route("/api/upvote", post(upvote))
        .route("/api/downvote", post(downvote))
        .route("/api/bookmark", post(bookmark))
        .route("/api/edit-resource", put(edit_resource))
        .route("/api/delete-resource", delete(delete_resource))
        .layer(DefaultBodyLimit::max(max_upload_bytes + 1024 * 1024))
        .with_state(state)
}

pub(crate) fn require(value: Option<String>, name: &str) -> Result<String, StashError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StashError::Validation(format!(
            "Missing required field: {name}"
        ))),
    }
}

fn parse_id(value: Option<String>) -> Result<Uuid, StashError> {
    let raw = require(value, "id")?;
    Uuid::parse_str(&raw)
        .map_err(|_| StashError::Validation(format!("Invalid document id: {raw}")))
}

#[debug_handler]
async fn branches(state: State<Portal>) -> Result<Json<Vec<Department>>, StashError> {
    Ok(Json(state.catalog.list_departments().await?))
}

#[derive(Debug, Deserialize)]
struct SubjectsQuery {
    year: Option<i64>,
    branch: Option<String>,
    sem: Option<i64>,
}

async fn subjects(
    state: State<Portal>,
    query: Query<SubjectsQuery>,
) -> Result<Json<Vec<Subject>>, StashError> {
    let subjects = state
        .catalog
        .list_subjects(query.year, query.branch.as_deref(), query.sem)
        .await?;
    Ok(Json(subjects))
}

#[debug_handler]
async fn upload_document(
    state: State<Portal>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StashError> {
    let mut draft = UploadDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await?;
            draft.file = Some(FileAttachment {
                name: file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "title" => draft.title = Some(value),
            "description" => draft.description = Some(value),
            "year" => draft.year = Some(value),
            "branch" => draft.branch = Some(value),
            "semester" => draft.semester = Some(value),
            "subject" => draft.subject = Some(value),
            "subjectcode" => draft.subjectcode = Some(value),
            "type" => draft.r#type = Some(value.parse()?),
            "examYear" => draft.exam_year = Some(value),
            "examType" => draft.exam_type = Some(value),
            "author" => draft.author = Some(value),
            "authorEmail" => draft.author_email = Some(value),
            "fileUrl" => draft.file_url = Some(value),
            _ => {}
        }
    }

    let request = draft.finish()?;

    let row = engagement::store(
        &state.catalog,
        &state.blobs,
        &state.settings.public_url,
        request,
    )
    .await?;

    Ok(Json(json!({
        "message": "File uploaded successfully",
        "url": row.url,
        "title": row.title,
    })))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

async fn search(
    state: State<Portal>,
    query: Query<SearchQuery>,
) -> Result<Json<Vec<DocumentRecord>>, StashError> {
    let Some(needle) = query.0.query.filter(|q| !q.trim().is_empty()) else {
        return Err(StashError::Validation(
            "Search query is required".to_string(),
        ));
    };

    let rows = state.catalog.search(&needle).await?;
    Ok(Json(state.catalog.with_engagement(rows).await?))
}

#[derive(Debug, Deserialize)]
struct FilesQuery {
    year: Option<String>,
    branch: Option<String>,
    subject: Option<String>,
    r#type: Option<ResourceType>,
}

async fn files(
    state: State<Portal>,
    query: Query<FilesQuery>,
) -> Result<Json<Vec<DocumentRecord>>, StashError> {
    let FilesQuery {
        year,
        branch,
        subject,
        r#type,
    } = query.0;

    let rows = if year.as_deref() == Some("all") {
        state.catalog.list_all_documents().await?
    } else {
        let (Some(year), Some(branch), Some(subject), Some(r#type)) =
            (year, branch, subject, r#type)
        else {
            return Err(StashError::Validation(
                "Missing query parameters".to_string(),
            ));
        };
        state
            .catalog
            .list_documents(&year, &branch, &subject, r#type)
            .await?
    };

    Ok(Json(state.catalog.with_engagement(rows).await?))
}

#[derive(Debug, Deserialize)]
struct UploadedFilesQuery {
    name: Option<String>,
    email: Option<String>,
    option: Option<ResourceType>,
}

async fn uploaded_files(
    state: State<Portal>,
    query: Query<UploadedFilesQuery>,
) -> Result<Json<Vec<DocumentRecord>>, StashError> {
    let (Some(name), Some(email), Some(option)) = (query.0.name, query.0.email, query.0.option)
    else {
        return Err(StashError::Validation(
            "Missing query parameters".to_string(),
        ));
    };

    let rows = state.catalog.list_by_author(&name, &email, option).await?;
    Ok(Json(state.catalog.with_engagement(rows).await?))
}

#[derive(Debug, Deserialize)]
struct SavedFilesQuery {
    user: Option<String>,
    r#type: Option<ResourceType>,
}

async fn saved_files(
    state: State<Portal>,
    query: Query<SavedFilesQuery>,
) -> Result<Json<Vec<DocumentRecord>>, StashError> {
    let (Some(user), Some(r#type)) = (query.0.user, query.0.r#type) else {
        return Err(StashError::Validation(
            "Missing query parameters".to_string(),
        ));
    };

    let rows = state.catalog.saved_documents(&user, r#type).await?;
    Ok(Json(state.catalog.with_engagement(rows).await?))
}

#[derive(Debug, Deserialize)]
struct VoteBody {
    id: Option<String>,
    email: Option<String>,
}

async fn cast_vote(
    state: &Portal,
    body: VoteBody,
    direction: VoteDirection,
) -> Result<impl IntoResponse, StashError> {
    let id = parse_id(body.id)?;
    let email = require(body.email, "email")?;

    let summary = state.engagement.vote(id, &email, direction).await?;

    Ok(Json(json!({
        "success": true,
        "upvoteCount": summary.upvotes,
        "downvoteCount": summary.downvotes,
        "alreadyVoted": summary.already_voted,
    })))
}

async fn upvote(
    state: State<Portal>,
    body: Json<VoteBody>,
) -> Result<impl IntoResponse, StashError> {
    cast_vote(&state, body.0, VoteDirection::Up).await
}

async fn downvote(
    state: State<Portal>,
    body: Json<VoteBody>,
) -> Result<impl IntoResponse, StashError> {
    cast_vote(&state, body.0, VoteDirection::Down).await
}

async fn bookmark(
    state: State<Portal>,
    body: Json<VoteBody>,
) -> Result<impl IntoResponse, StashError> {
    let id = parse_id(body.0.id)?;
    let email = require(body.0.email, "email")?;

    let bookmarked = state.engagement.toggle_bookmark(id, &email).await?;

    Ok(Json(json!({
        "success": true,
        "isBookmarked": bookmarked,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditBody {
    id: Option<String>,
    author_email: Option<String>,
    #[serde(flatten)]
    fields: EditFields,
}

async fn edit_resource(
    state: State<Portal>,
    body: Json<EditBody>,
) -> Result<impl IntoResponse, StashError> {
    let id = parse_id(body.0.id)?;
    let author_email = require(body.0.author_email, "authorEmail")?;

    let outcome = engagement::edit(&state.catalog, id, &author_email, &body.0.fields).await?;

    Ok(match outcome {
        EditOutcome::NoChanges => Json(json!({ "message": "No changes detected." })),
        EditOutcome::Updated(changes) => Json(json!({
            "message": "Resource updated successfully.",
            "changes": changes,
        })),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBody {
    id: Option<String>,
    author_email: Option<String>,
}

async fn delete_resource(
    state: State<Portal>,
    body: Json<DeleteBody>,
) -> Result<impl IntoResponse, StashError> {
    let id = parse_id(body.0.id)?;
    let author_email = require(body.0.author_email, "authorEmail")?;

    engagement::delete(
        &state.catalog,
        &state.blobs,
        &state.settings.public_url,
        id,
        &author_email,
    )
    .await?;

    Ok(Json(json!({ "message": "Resource deleted successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportBody {
    title: Option<String>,
    author: Option<String>,
    author_email: Option<String>,
    r#type: Option<String>,
    year: Option<String>,
    semester: Option<String>,
    branch: Option<String>,
    subject: Option<String>,
    subjectcode: Option<String>,
    description: Option<String>,
    url: Option<String>,
    reporter_email: Option<String>,
    reporter_name: Option<String>,
    report_reason: Option<String>,
}

async fn report(
    state: State<Portal>,
    body: Json<ReportBody>,
) -> Result<impl IntoResponse, StashError> {
    let body = body.0;

    let new = NewReport {
        title: require(body.title, "title")?,
        author: require(body.author, "author")?,
        author_email: require(body.author_email, "authorEmail")?,
        r#type: require(body.r#type, "type")?.parse()?,
        year: require(body.year, "year")?,
        semester: require(body.semester, "semester")?,
        branch: require(body.branch, "branch")?,
        subject: require(body.subject, "subject")?,
        subjectcode: require(body.subjectcode, "subjectcode")?,
        description: require(body.description, "description")?,
        url: require(body.url, "url")?,
        reporter_email: require(body.reporter_email, "reporterEmail")?,
        reporter_name: require(body.reporter_name, "reporterName")?,
        reason: require(body.report_reason, "reportReason")?,
    };

    state.catalog.insert_report(new).await?;
    Ok(Json(json!({ "message": "Report submitted successfully" })))
}

#[derive(Debug, Deserialize)]
struct SaveUserBody {
    email: Option<String>,
    name: Option<String>,
}

async fn save_user(
    state: State<Portal>,
    body: Json<SaveUserBody>,
) -> Result<impl IntoResponse, StashError> {
    let identity = VerifiedIdentity {
        email: require(body.0.email, "email")?,
        name: require(body.0.name, "name")?,
        avatar: None,
    };

    identity::resolve(&state.catalog, &identity).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User saved or already exists",
    })))
}

async fn user_count(state: State<Portal>) -> Result<impl IntoResponse, StashError> {
    let count = state.catalog.user_count().await?;
    Ok(Json(json!({ "userCount": count })))
}

async fn subject_count(state: State<Portal>) -> Result<impl IntoResponse, StashError> {
    let count = state.catalog.subject_count().await?;
    Ok(Json(json!({ "subjectCount": count })))
}
