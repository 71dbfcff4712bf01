//! SQLite storage backend (Store A).
//!
//! Persists user profiles and documents with Diesel. Queries run on the
//! blocking pool so the coordinator's deadline can still fire while SQLite
//! waits on a lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::debug;
use uuid::Uuid;

use super::database::connection::DbPool;
use super::database::model::{DocumentRow, UserProfileRow};
use super::database::schema::{documents, user_profiles};
use crate::domain::{Backend, Document, Record, RecordKey, UserId, UserProfile};
use crate::error::{Error, Result};
use crate::port::outbound::storage::{StorageBackend, WriteAck};

/// SQLite-backed relational store.
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| Error::Database(format!("blocking task failed: {e}")))?
    }

    fn profile_to_row(profile: &UserProfile) -> Result<UserProfileRow> {
        Ok(UserProfileRow {
            id: profile.id.to_string(),
            email: profile.email.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            role: profile.role.as_str().to_string(),
            is_email_verified: i32::from(profile.is_email_verified),
            preferences: serde_json::to_string(&profile.preferences)?,
            last_sign_in_at: profile.last_sign_in_at.map(|t| t.to_rfc3339()),
            created_at: profile.created_at.to_rfc3339(),
            updated_at: profile.updated_at.to_rfc3339(),
        })
    }

    fn profile_from_row(row: UserProfileRow) -> Result<UserProfile> {
        Ok(UserProfile {
            id: UserId::parse(&row.id)?,
            email: row.email,
            username: row.username,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            role: row.role.parse()?,
            is_email_verified: row.is_email_verified != 0,
            preferences: serde_json::from_str(&row.preferences)?,
            last_sign_in_at: row.last_sign_in_at.as_deref().map(parse_time).transpose()?,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }

    fn document_to_row(doc: &Document) -> Result<DocumentRow> {
        Ok(DocumentRow {
            collection: doc.collection.clone(),
            id: doc.id.to_string(),
            owner_id: doc.owner_id.map(|id| id.to_string()),
            payload: serde_json::to_string(&doc.payload)?,
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        })
    }

    fn document_from_row(row: DocumentRow) -> Result<Document> {
        Ok(Document {
            id: Uuid::parse_str(&row.id).map_err(|e| Error::Parse(e.to_string()))?,
            collection: row.collection,
            owner_id: row.owner_id.as_deref().map(UserId::parse).transpose()?,
            payload: serde_json::from_str(&row.payload)?,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }

    /// Number of stored profiles.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_profiles(&self) -> Result<i64> {
        self.with_conn(|conn| {
            user_profiles::table
                .count()
                .get_result::<i64>(conn)
                .map_err(|e| Error::Database(e.to_string()))
        })
        .await
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::Parse(e.to_string()))?
        .with_timezone(&Utc))
}

#[async_trait]
impl StorageBackend for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Relational
    }

    async fn write(&self, record: &Record) -> Result<WriteAck> {
        let affected = match record {
            Record::User(profile) => {
                let row = Self::profile_to_row(profile)?;
                self.with_conn(move |conn| {
                    diesel::replace_into(user_profiles::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(|e| Error::Database(e.to_string()))
                })
                .await?
            }
            Record::Document(doc) => {
                let row = Self::document_to_row(doc)?;
                self.with_conn(move |conn| {
                    diesel::replace_into(documents::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(|e| Error::Database(e.to_string()))
                })
                .await?
            }
        };
        debug!(record_id = %record.id(), kind = record.kind(), affected, "Relational write");
        Ok(WriteAck::new(affected))
    }

    async fn read(&self, key: &RecordKey) -> Result<Option<Record>> {
        match key.clone() {
            RecordKey::User(id) => {
                let row: Option<UserProfileRow> = self
                    .with_conn(move |conn| {
                        user_profiles::table
                            .find(id.to_string())
                            .select(UserProfileRow::as_select())
                            .first(conn)
                            .optional()
                            .map_err(|e| Error::Database(e.to_string()))
                    })
                    .await?;
                row.map(Self::profile_from_row)
                    .transpose()
                    .map(|p| p.map(Record::User))
            }
            RecordKey::Document { collection, id } => {
                let row: Option<DocumentRow> = self
                    .with_conn(move |conn| {
                        documents::table
                            .find((collection, id.to_string()))
                            .select(DocumentRow::as_select())
                            .first(conn)
                            .optional()
                            .map_err(|e| Error::Database(e.to_string()))
                    })
                    .await?;
                row.map(Self::document_from_row)
                    .transpose()
                    .map(|d| d.map(Record::Document))
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))
        })
        .await
        .is_ok()
    }
}
