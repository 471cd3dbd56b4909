//! Database row types that never leave the server. Everything the API
//! returns is built from internhub-types models instead.

/// Login material for either account kind; `password` is an Argon2 PHC string.
#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub id: i64,
    pub email: String,
    pub password: String,
}
