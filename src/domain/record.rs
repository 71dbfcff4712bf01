//! Records written through the dual-write path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::id::UserId;
use super::identity::UserProfile;

/// Generic domain document (story, scenario, generation job, ...).
///
/// Both backends persist the payload as-is under the named collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with a fresh id, stamped now.
    #[must_use]
    pub fn new(collection: impl Into<String>, owner_id: Option<UserId>, payload: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            collection: collection.into(),
            owner_id,
            payload,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One logical record written to both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Record {
    User(UserProfile),
    Document(Document),
}

impl Record {
    /// Identifier of the record, as used in results and logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(profile) => *profile.id.as_uuid(),
            Self::Document(doc) => doc.id,
        }
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        match self {
            Self::User(profile) => RecordKey::User(profile.id),
            Self::Document(doc) => RecordKey::Document {
                collection: doc.collection.clone(),
                id: doc.id,
            },
        }
    }

    /// Short label for the record kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Document(_) => "document",
        }
    }
}

/// Address of a single record for reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    User(UserId),
    Document { collection: String, id: Uuid },
}
