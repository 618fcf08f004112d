// ABOUTME: Storage abstraction for the lead record store
// ABOUTME: Defines the LeadStorage trait and storage error taxonomy

use async_trait::async_trait;
use thiserror::Error;

use crate::pagination::PaginationParams;
use crate::types::{Lead, LeadCreateInput, LeadFilter, LeadStats, LeadUpdateInput};

pub mod sqlite;

pub use sqlite::SqliteLeadStorage;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Lead not found")]
    NotFound,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Generate a unique lead ID
pub fn generate_lead_id() -> String {
    use uuid::Uuid;
    Uuid::new_v4().to_string()
}

/// Record store consumed by the API handlers and the import/merge engine.
///
/// The duplicate lookups are exact-match predicates: `find_by_email` and
/// `find_by_contact_number` compare stored values verbatim, while
/// `find_by_name_and_company` compares both fields case-insensitively.
#[async_trait]
pub trait LeadStorage: Send + Sync {
    // Initialization
    async fn initialize(&self) -> StorageResult<()>;

    // Core CRUD operations
    async fn create_lead(&self, input: LeadCreateInput) -> StorageResult<Lead>;
    async fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>>;
    async fn update_lead(&self, id: &str, input: LeadUpdateInput) -> StorageResult<Lead>;
    async fn save_lead(&self, lead: &Lead) -> StorageResult<Lead>;
    async fn delete_lead(&self, id: &str) -> StorageResult<()>;

    // Duplicate lookups
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Lead>>;
    async fn find_by_contact_number(&self, number: &str) -> StorageResult<Option<Lead>>;
    async fn find_by_name_and_company(
        &self,
        name: &str,
        company: &str,
    ) -> StorageResult<Option<Lead>>;

    // List queries
    async fn list_leads(
        &self,
        filter: &LeadFilter,
        pagination: &PaginationParams,
    ) -> StorageResult<(Vec<Lead>, i64)>;
    async fn list_all_leads(&self) -> StorageResult<Vec<Lead>>;
    async fn list_duplicates(&self) -> StorageResult<Vec<Lead>>;

    // Dashboard
    async fn lead_stats(&self) -> StorageResult<LeadStats>;
}
