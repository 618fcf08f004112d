// ABOUTME: HTTP request handlers for lead CRUD operations
// ABOUTME: Handles listing with filters, dashboard stats, and single-lead access

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use leadhub_leads::{
    DbState, Lead, LeadCreateInput, LeadFilter, LeadStatus, LeadStorage, LeadUpdateInput,
    Pagination, PaginationParams,
};

use crate::auth::RequestUser;
use crate::response::{bad_request, storage_error_response, ApiResponse};

/// Query parameters for the lead list endpoint.
/// Page and limit are inlined rather than flattened; serde_urlencoded
/// cannot deserialize numeric fields through a flatten.
#[derive(Debug, Deserialize)]
pub struct ListLeadsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub service_type: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub duplicates: Option<String>,
    pub assigned_to: Option<String>,
    pub sort: Option<String>,
}

/// Response body for the lead list endpoint
#[derive(Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
    pub pagination: Pagination,
}

/// Parse a date query value: RFC 3339 or a bare YYYY-MM-DD
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl ListLeadsQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }

    fn to_filter(&self) -> LeadFilter {
        LeadFilter {
            search: self.search.clone(),
            status: self.status.as_deref().and_then(LeadStatus::parse),
            source: self.source.clone(),
            service_type: self.service_type.clone(),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            created_from: self.date_from.as_deref().and_then(parse_date),
            created_to: self.date_to.as_deref().and_then(parse_date),
            duplicates_only: self.duplicates.as_deref() == Some("true"),
            assigned_to: self.assigned_to.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// List leads with pagination, search, and filters
pub async fn list_leads(
    State(db): State<DbState>,
    Query(query): Query<ListLeadsQuery>,
) -> impl IntoResponse {
    let filter = query.to_filter();
    let params = query.pagination();

    match db.lead_storage.list_leads(&filter, &params).await {
        Ok((leads, total)) => {
            let pagination = Pagination::new(total, &params);
            (
                StatusCode::OK,
                ResponseJson(ApiResponse::success(LeadListResponse { leads, pagination })),
            )
                .into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// Get a single lead by ID
pub async fn get_lead(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    match db.lead_storage.get_lead(&id).await {
        Ok(Some(lead)) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(lead))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            ResponseJson(ApiResponse::<()>::error("Lead not found".to_string())),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// Create a new lead
pub async fn create_lead(
    State(db): State<DbState>,
    user: RequestUser,
    Json(mut input): Json<LeadCreateInput>,
) -> impl IntoResponse {
    info!("Creating lead: {}", input.name);

    if input.name.trim().is_empty() {
        return bad_request("Please add a name");
    }

    input.created_by = Some(user.id);

    match db.lead_storage.create_lead(input).await {
        Ok(lead) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(lead))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// Update an existing lead
pub async fn update_lead(
    State(db): State<DbState>,
    Path(id): Path<String>,
    Json(input): Json<LeadUpdateInput>,
) -> impl IntoResponse {
    info!("Updating lead: {}", id);

    match db.lead_storage.update_lead(&id, input).await {
        Ok(lead) => (StatusCode::OK, ResponseJson(ApiResponse::success(lead))).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// Delete a lead
pub async fn delete_lead(State(db): State<DbState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Deleting lead: {}", id);

    match db.lead_storage.delete_lead(&id).await {
        Ok(()) => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(serde_json::json!({}))),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// Get dashboard stats
pub async fn get_stats(State(db): State<DbState>) -> impl IntoResponse {
    match db.lead_storage.lead_stats().await {
        Ok(stats) => (StatusCode::OK, ResponseJson(ApiResponse::success(stats))).into_response(),
        Err(e) => storage_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_bare_dates_and_rfc3339() {
        assert!(parse_date("2026-01-15").is_some());
        assert!(parse_date("2026-01-15T10:30:00Z").is_some());
        assert!(parse_date("January 15").is_none());
    }
}
