//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{documents, user_profiles};

/// Database row for a user profile.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserProfileRow {
    pub id: String,
    pub email: Option<String>,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_email_verified: i32,
    /// JSON object.
    pub preferences: String,
    pub last_sign_in_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for a document.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub owner_id: Option<String>,
    /// JSON value.
    pub payload: String,
    pub created_at: String,
    pub updated_at: String,
}
