//! Builders for identities, profiles and documents used across tests.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::domain::{AuthIdentity, Document, Metadata, Role, UserId, UserProfile};

/// A complete, verified platform identity.
pub fn identity(email: &str) -> AuthIdentity {
    let now = Utc::now();
    let mut metadata = Metadata::new();
    metadata.insert("username".into(), json!("ada"));
    metadata.insert("fullName".into(), json!("Ada Lovelace"));
    metadata.insert("avatarUrl".into(), json!("https://cdn.example.com/ada.png"));
    metadata.insert("role".into(), json!("user"));
    AuthIdentity {
        id: UserId::generate().to_string(),
        email: Some(email.to_string()),
        phone: None,
        email_confirmed_at: Some(now - Duration::days(1)),
        metadata,
        created_at: now - Duration::days(30),
        updated_at: now,
        last_sign_in_at: Some(now),
    }
}

/// A platform identity with only an id and an email.
pub fn bare_identity(email: &str) -> AuthIdentity {
    AuthIdentity {
        metadata: Metadata::new(),
        email_confirmed_at: None,
        last_sign_in_at: None,
        ..identity(email)
    }
}

/// Replace one metadata entry.
pub fn with_metadata(mut identity: AuthIdentity, key: &str, value: Value) -> AuthIdentity {
    identity.metadata.insert(key.to_string(), value);
    identity
}

/// A complete relational profile.
pub fn profile(username: &str) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: UserId::generate(),
        email: Some(format!("{username}@example.com")),
        username: username.to_string(),
        full_name: Some("Test User".into()),
        avatar_url: Some("https://cdn.example.com/avatar.png".into()),
        role: Role::User,
        is_email_verified: true,
        preferences: Metadata::new(),
        last_sign_in_at: Some(now),
        created_at: now,
        updated_at: now,
    }
}

/// A document in `collection` with a small payload.
pub fn document(collection: &str) -> Document {
    Document::new(collection, None, json!({ "title": "Night Train", "chapters": 3 }))
}
