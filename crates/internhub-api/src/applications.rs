use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::warn;

use internhub_db::StoreError;
use internhub_types::api::{ApplyRequest, CompanyQuery, MessageBody, StatusUpdateRequest, StudentQuery};
use internhub_types::models::ApplicationStatus;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::{AppState, blocking};

/// POST /apply: one application per student per internship.
pub async fn apply(
    State(state): State<AppState>,
    AppJson(req): AppJson<ApplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = blocking(&state, move |db| {
        db.apply(req.internship_id, req.student_id).map_err(|e| match e {
            StoreError::Conflict(_) => {
                AppError::Conflict("You have already applied for this internship.".into())
            }
            StoreError::NotFound(_) => AppError::NotFound("Internship or student not found.".into()),
            other => other.into(),
        })
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Application successful.", "applicationId": id })),
    ))
}

/// PUT /applications/{id}/status: only the review states are accepted.
pub async fn set_status(
    State(state): State<AppState>,
    AppPath(application_id): AppPath<i64>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = ApplicationStatus::parse_review(&req.status).ok_or_else(|| {
        warn!(application_id, status = %req.status, "rejected status value");
        AppError::Validation("Invalid status value.".into())
    })?;

    blocking(&state, move |db| {
        db.set_status(application_id, status).map_err(application_not_found)
    })
    .await?;

    Ok(Json(MessageBody::new("Application status updated.")))
}

/// DELETE /withdraw/{internship_id}?studentId=: the student takes it back.
pub async fn withdraw(
    State(state): State<AppState>,
    AppPath(internship_id): AppPath<i64>,
    AppQuery(query): AppQuery<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    blocking(&state, move |db| {
        db.withdraw(internship_id, query.student_id).map_err(application_not_found)
    })
    .await?;

    Ok(Json(MessageBody::new("Application withdrawn successfully.")))
}

/// GET /internship/{id}/applications: roster for the reviewing company.
pub async fn internship_applications(
    State(state): State<AppState>,
    AppPath(internship_id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let roster = blocking(&state, move |db| {
        db.applicants_for_internship(internship_id).map_err(|e| match e {
            StoreError::NotFound(_) => AppError::NotFound("Internship not found.".into()),
            other => other.into(),
        })
    })
    .await?;

    Ok(Json(roster))
}

pub async fn company_applications(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CompanyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = blocking(&state, move |db| Ok(db.applications_for_company(query.company_id)?)).await?;
    Ok(Json(rows))
}

pub async fn student_applications(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = blocking(&state, move |db| Ok(db.applications_for_student(query.student_id)?)).await?;
    Ok(Json(rows))
}

fn application_not_found(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::NotFound("Application not found.".into()),
        other => other.into(),
    }
}
