use crate::{
    auth::{Auth, AuthError},
    catalog::{Department, Subject},
    error::StashError,
    state::Portal,
};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::{headers::Cookie, TypedHeader};
use serde::Deserialize;
use std::sync::Arc;

use super::require;

pub(super) fn admin_router(state: Portal, auth: Auth) -> Router {
    let auth = Arc::new(auth);

    let router_admin = Router::new()
        .route("/branches", post(create_branch))
        .route("/subjects", post(create_subject))
        .layer(middleware::from_fn_with_state(auth.clone(), session_check))
        .with_state(state);

    let router_auth = Router::new().route("/login", post(login)).with_state(auth);

    Router::new().nest("/admin", router_admin.merge(router_auth))
}

async fn login(
    auth: axum::extract::State<Arc<Auth>>,
    password: axum::extract::Json<String>,
) -> Result<Response, StashError> {
    if !auth.verify_password(&password) {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    }

    let session = auth.create_session().await?;
    let cookie = auth.create_session_cookie(session.id);

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]).into_response())
}

#[derive(Debug, Deserialize)]
struct NewBranch {
    branch: Option<String>,
    abbreviation: Option<String>,
}

async fn create_branch(
    state: axum::extract::State<Portal>,
    body: Json<NewBranch>,
) -> Result<Json<Department>, StashError> {
    let branch = require(body.0.branch, "branch")?;
    let abbreviation = require(body.0.abbreviation, "abbreviation")?;

    let department = state
        .catalog
        .insert_department(&branch, &abbreviation)
        .await?;
    Ok(Json(department))
}

#[derive(Debug, Deserialize)]
struct NewSubject {
    year: Option<i64>,
    branch: Option<String>,
    sem: Option<i64>,
    subject: Option<String>,
    subjectcode: Option<String>,
}

async fn create_subject(
    state: axum::extract::State<Portal>,
    body: Json<NewSubject>,
) -> Result<Json<Subject>, StashError> {
    let body = body.0;

    let (Some(year), Some(sem)) = (body.year, body.sem) else {
        return Err(StashError::Validation(
            "Missing required field: year or sem".to_string(),
        ));
    };
    let branch = require(body.branch, "branch")?;
    let subject = require(body.subject, "subject")?;
    let subjectcode = require(body.subjectcode, "subjectcode")?;

    let subject = state
        .catalog
        .insert_subject(year, &branch, sem, &subject, &subjectcode)
        .await?;
    Ok(Json(subject))
}

async fn session_check(
    auth: axum::extract::State<Arc<Auth>>,
    cookie: TypedHeader<Cookie>,
    req: Request,
    next: Next,
) -> Response {
    let Some(cookie) = cookie.0.get("SID") else {
        return AuthError::NoSession.into_response();
    };

    let Ok(session_id) = uuid::Uuid::parse_str(cookie) else {
        return AuthError::NoSession.into_response();
    };

    match auth.session_check(session_id).await {
        Ok(true) => next.run(req).await,
        Ok(false) => AuthError::NoSession.into_response(),
        Err(err) => err.into_response(),
    }
}
