pub mod accounts;
pub mod applications;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod internships;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Every JSON endpoint plus the static/404 fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Accounts
        .route("/signup-student", post(accounts::signup_student))
        .route("/signup-company", post(accounts::signup_company))
        .route("/login", post(accounts::login))
        .route("/account-details", get(accounts::account_details))
        .route("/update-account", put(accounts::update_account))
        .route("/update-password", put(accounts::update_password))
        // Internships
        .route(
            "/internships",
            get(internships::list_internships).post(internships::create_internship),
        )
        .route(
            "/internships/{id}",
            put(internships::update_internship).delete(internships::delete_internship),
        )
        .route("/internship-details/{id}", get(internships::internship_details))
        .route("/company-internships", get(internships::company_internships))
        // Applications
        .route("/apply", post(applications::apply))
        .route("/withdraw/{internship_id}", delete(applications::withdraw))
        .route("/applications", get(applications::company_applications))
        .route("/applications/{id}/status", put(applications::set_status))
        .route(
            "/internship/{id}/applications",
            get(applications::internship_applications),
        )
        .route("/student-applications", get(applications::student_applications))
        .method_not_allowed_fallback(gateway::not_found)
        .fallback(gateway::fallback)
        .with_state(state)
}
