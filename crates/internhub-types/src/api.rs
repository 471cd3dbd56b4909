use chrono::NaiveDate;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Role;

/// Body of every acknowledgement and every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Id field in a request body. Accepts `7` or `"7"`, since the UI reads ids
/// back out of `data-*` attributes as strings.
fn flexible_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&text), &"an integer id")),
    }
}

// -- Accounts --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySignupRequest {
    pub company_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// What the UI keeps in local storage after logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user: SessionUser,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    pub user_id: i64,
    pub role: Role,
}

/// Overwrite of a user's identity fields; the `role` tag picks the shape.
#[derive(Debug, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum UpdateAccountRequest {
    Student {
        #[serde(deserialize_with = "flexible_id")]
        user_id: i64,
        first_name: String,
        last_name: String,
        email: String,
    },
    Company {
        #[serde(deserialize_with = "flexible_id")]
        user_id: i64,
        company_name: String,
        email: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(deserialize_with = "flexible_id")]
    pub user_id: i64,
    pub role: Role,
    pub current_password: String,
    pub new_password: String,
}

// -- Internships --

/// Mutable attributes of a posting, shared by create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipFields {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub skills_required: String,
    pub salary: String,
    pub duration: String,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInternshipRequest {
    #[serde(rename = "companyId", deserialize_with = "flexible_id")]
    pub company_id: i64,
    #[serde(flatten)]
    pub fields: InternshipFields,
}

/// Optional search criteria for the public listing. Absent and empty values
/// are both treated as "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InternshipFilter {
    pub title: Option<String>,
    pub company: Option<String>,
    pub skills: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub salary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyQuery {
    pub company_id: i64,
}

// -- Applications --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(deserialize_with = "flexible_id")]
    pub internship_id: i64,
    #[serde(deserialize_with = "flexible_id")]
    pub student_id: i64,
}

/// Status is kept as a raw string so unknown values surface as a 400 from
/// the handler rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub student_id: i64,
}
