//! Identity contract between the two backends.
//!
//! - [`schema`] - boundary validation of both record shapes
//! - [`transform`] - platform identity ⇄ relational profile
//! - [`score`] - sync-contract and data-quality scoring

pub mod schema;
pub mod score;
pub mod transform;

pub use schema::{is_valid_email, validate_identity, validate_profile};
pub use score::{
    score_identity, score_profile, validate_sync_contract, ContractSubject, ContractViolation,
    QualityReport, SyncDirection, SyncReport,
};
pub use transform::{transform_a_to_b, transform_b_to_a};
