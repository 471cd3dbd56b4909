use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use internhub_db::StoreError;
use internhub_types::api::{
    AccountQuery, CompanySignupRequest, LoginRequest, LoginResponse, MessageBody, SessionUser,
    StudentSignupRequest, UpdateAccountRequest, UpdatePasswordRequest,
};
use internhub_types::models::{CompanyProfile, Profile, StudentProfile};

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::state::{AppState, blocking};

const EMAIL_TAKEN: &str = "This email address is already registered.";

pub async fn signup_student(
    State(state): State<AppState>,
    AppJson(req): AppJson<StudentSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_filled(&[&req.first_name, &req.last_name, &req.email, &req.password])?;

    blocking(&state, move |db| {
        let hash = hash_password(&req.password)?;
        db.create_student(&req.first_name, &req.last_name, &req.email, &hash)
            .map_err(email_conflict)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new("Student registered successfully!")),
    ))
}

pub async fn signup_company(
    State(state): State<AppState>,
    AppJson(req): AppJson<CompanySignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_filled(&[&req.company_name, &req.email, &req.password])?;

    blocking(&state, move |db| {
        let hash = hash_password(&req.password)?;
        db.create_company(&req.company_name, &req.email, &hash)
            .map_err(email_conflict)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new("Company registered successfully!")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = req.role;
    let user = blocking(&state, move |db| {
        let row = db
            .credentials_by_email(role, &req.email)?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&row.password, &req.password) {
            return Err(AppError::InvalidCredentials);
        }
        Ok(row)
    })
    .await
    .inspect_err(|_| warn!(%role, "login rejected"))?;

    info!(user_id = user.id, %role, "login");

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user: SessionUser {
            id: user.id,
            email: user.email,
            role,
        },
        redirect_url: role.dashboard().into(),
    }))
}

pub async fn account_details(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AccountQuery>,
) -> Result<impl IntoResponse, AppError> {
    let profile = blocking(&state, move |db| {
        db.get_profile(query.role, query.user_id)?
            .ok_or_else(|| AppError::NotFound("Account not found.".into()))
    })
    .await?;

    Ok(Json(profile))
}

pub async fn update_account(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user_id, profile) = match req {
        UpdateAccountRequest::Student {
            user_id,
            first_name,
            last_name,
            email,
        } => (
            user_id,
            Profile::Student(StudentProfile {
                first_name,
                last_name,
                email,
            }),
        ),
        UpdateAccountRequest::Company {
            user_id,
            company_name,
            email,
        } => (user_id, Profile::Company(CompanyProfile { company_name, email })),
    };
    match &profile {
        Profile::Student(p) => require_filled(&[&p.first_name, &p.last_name, &p.email])?,
        Profile::Company(p) => require_filled(&[&p.company_name, &p.email])?,
    }

    blocking(&state, move |db| {
        db.update_profile(user_id, &profile).map_err(|e| match e {
            StoreError::NotFound(_) => AppError::NotFound("Account not found.".into()),
            other => email_conflict(other),
        })
    })
    .await?;

    Ok(Json(MessageBody::new("Account updated successfully.")))
}

pub async fn update_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_filled(&[&req.new_password])?;

    blocking(&state, move |db| {
        let row = db
            .credentials_by_id(req.role, req.user_id)?
            .ok_or_else(|| AppError::NotFound("Account not found.".into()))?;

        if !verify_password(&row.password, &req.current_password) {
            warn!(user_id = req.user_id, role = %req.role, "wrong current password");
            return Err(AppError::Forbidden("Incorrect current password.".into()));
        }

        let hash = hash_password(&req.new_password)?;
        db.update_password(req.role, req.user_id, &hash)?;
        Ok(())
    })
    .await?;

    Ok(Json(MessageBody::new("Password updated successfully.")))
}

/// Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// A stored value that does not parse as a PHC string never matches.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn require_filled<S: AsRef<str>>(values: &[S]) -> Result<(), AppError> {
    if values.iter().any(|v| v.as_ref().trim().is_empty()) {
        return Err(AppError::Validation("Invalid data provided.".into()));
    }
    Ok(())
}

fn email_conflict(err: StoreError) -> AppError {
    match err {
        StoreError::Conflict(_) => AppError::Conflict(EMAIL_TAKEN.into()),
        other => other.into(),
    }
}
