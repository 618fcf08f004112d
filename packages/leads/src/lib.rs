// ABOUTME: Lead domain library for LeadHub
// ABOUTME: Provides lead types, pagination, and the SQLite-backed record store

pub mod db;
pub mod pagination;
pub mod storage;
pub mod types;

// Re-export main types
pub use db::DbState;
pub use pagination::{Pagination, PaginationParams};
pub use storage::{LeadStorage, SqliteLeadStorage, StorageError, StorageResult};
pub use types::{Lead, LeadCreateInput, LeadFilter, LeadStats, LeadStatus, LeadUpdateInput};
