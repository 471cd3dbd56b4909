use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use internhub_db::StoreError;
use internhub_types::api::{CompanyQuery, CreateInternshipRequest, InternshipFields, InternshipFilter, MessageBody};

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::{AppState, blocking};

const NOT_FOUND: &str = "Internship not found.";

/// GET /internships: public listing, narrowed by any filters present.
pub async fn list_internships(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<InternshipFilter>,
) -> Result<impl IntoResponse, AppError> {
    let listed = blocking(&state, move |db| Ok(db.search_internships(&filter)?)).await?;
    Ok(Json(listed))
}

pub async fn create_internship(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateInternshipRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = blocking(&state, move |db| Ok(db.post_internship(req.company_id, &req.fields)?)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Internship posted.", "internshipId": id })),
    ))
}

pub async fn update_internship(
    State(state): State<AppState>,
    AppPath(internship_id): AppPath<i64>,
    AppJson(fields): AppJson<InternshipFields>,
) -> Result<impl IntoResponse, AppError> {
    blocking(&state, move |db| {
        db.update_internship(internship_id, &fields).map_err(internship_not_found)
    })
    .await?;

    Ok(Json(MessageBody::new("Internship updated successfully.")))
}

/// DELETE /internships/{id}: applications go first, then the posting.
pub async fn delete_internship(
    State(state): State<AppState>,
    AppPath(internship_id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    blocking(&state, move |db| {
        db.delete_internship(internship_id).map_err(internship_not_found)
    })
    .await?;

    Ok(Json(MessageBody::new("Internship deleted successfully.")))
}

pub async fn internship_details(
    State(state): State<AppState>,
    AppPath(internship_id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let internship = blocking(&state, move |db| {
        db.get_internship(internship_id)?
            .ok_or_else(|| AppError::NotFound("Internship details not found.".into()))
    })
    .await?;

    Ok(Json(internship))
}

/// GET /company-internships: a company's own postings with applicant counts.
pub async fn company_internships(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CompanyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let listed = blocking(&state, move |db| Ok(db.list_for_company(query.company_id)?)).await?;
    Ok(Json(listed))
}

fn internship_not_found(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::NotFound(NOT_FOUND.into()),
        other => other.into(),
    }
}
