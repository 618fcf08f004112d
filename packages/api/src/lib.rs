// ABOUTME: HTTP API layer for LeadHub providing REST endpoints and routing
// ABOUTME: Integration layer over the leads and importer packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use leadhub_leads::DbState;

pub mod auth;
pub mod files_handlers;
pub mod leads_handlers;
pub mod response;

/// Creates the leads API router
pub fn create_leads_router() -> Router<DbState> {
    Router::new()
        .route("/", get(leads_handlers::list_leads))
        .route("/", post(leads_handlers::create_lead))
        .route("/stats/dashboard", get(leads_handlers::get_stats))
        .route("/{id}", get(leads_handlers::get_lead))
        .route("/{id}", put(leads_handlers::update_lead))
        .route("/{id}", delete(leads_handlers::delete_lead))
}

/// Creates the files API router for spreadsheet operations
pub fn create_files_router() -> Router<DbState> {
    Router::new()
        .route("/import", post(files_handlers::import_leads))
        .route("/merge", post(files_handlers::merge_leads))
        .route("/export", get(files_handlers::export_leads))
        .route("/duplicates", get(files_handlers::get_duplicates))
}
