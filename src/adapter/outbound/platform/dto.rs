//! Wire shapes for the platform REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{AuthIdentity, Document, Metadata, UserId};

/// Body of an admin user upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub user_metadata: Metadata,
}

impl From<&AuthIdentity> for AdminUserBody {
    fn from(identity: &AuthIdentity) -> Self {
        Self {
            email: identity.email.clone(),
            user_metadata: identity.metadata.clone(),
        }
    }
}

/// One row of a platform collection.
///
/// The collection itself is the table name and is not repeated in the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: Uuid,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            owner_id: doc.owner_id,
            payload: doc.payload.clone(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl DocumentRow {
    #[must_use]
    pub fn into_document(self, collection: impl Into<String>) -> Document {
        Document {
            id: self.id,
            collection: collection.into(),
            owner_id: self.owner_id,
            payload: self.payload,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
