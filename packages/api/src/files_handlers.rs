// ABOUTME: HTTP request handlers for spreadsheet operations
// ABOUTME: Handles upload import/merge, XLSX export, and the duplicates list

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json as ResponseJson},
};
use tracing::info;

use leadhub_importer::{import_rows, leads_to_xlsx, merge_rows, normalize_rows, parse_sheet};
use leadhub_leads::{DbState, LeadStorage};

use crate::auth::RequestUser;
use crate::response::{bad_request, storage_error_response, ApiResponse};

/// One uploaded file from a multipart request
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of a multipart body
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid upload: {}", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Invalid upload: {}", e))?
            .to_vec();
        return Ok(Upload { filename, bytes });
    }

    Err("Please upload a file".to_string())
}

/// Import leads from an uploaded spreadsheet (no duplicate detection)
pub async fn import_leads(
    State(db): State<DbState>,
    user: RequestUser,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(message) => return bad_request(message),
    };

    info!("Importing leads from {}", upload.filename);

    let rows = match parse_sheet(&upload.filename, &upload.bytes) {
        Ok(rows) => rows,
        Err(e) => return bad_request(e.to_string()),
    };

    let normalized = normalize_rows(&rows);
    let report = import_rows(db.lead_storage.as_ref(), &normalized, &user.id).await;

    (StatusCode::OK, ResponseJson(ApiResponse::success(report))).into_response()
}

/// Merge leads from an uploaded spreadsheet with duplicate detection
pub async fn merge_leads(
    State(db): State<DbState>,
    user: RequestUser,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(message) => return bad_request(message),
    };

    info!("Merging leads from {}", upload.filename);

    let rows = match parse_sheet(&upload.filename, &upload.bytes) {
        Ok(rows) => rows,
        Err(e) => return bad_request(e.to_string()),
    };

    let normalized = normalize_rows(&rows);
    let report = merge_rows(db.lead_storage.as_ref(), &normalized, &user.id).await;

    (StatusCode::OK, ResponseJson(ApiResponse::success(report))).into_response()
}

/// Export all leads as an XLSX attachment
pub async fn export_leads(State(db): State<DbState>) -> impl IntoResponse {
    let leads = match db.lead_storage.list_all_leads().await {
        Ok(leads) => leads,
        Err(e) => return storage_error_response(e),
    };

    info!("Exporting {} leads", leads.len());

    let buffer = match leads_to_xlsx(&leads) {
        Ok(buffer) => buffer,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                ResponseJson(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    };

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=leads_export_{}.xlsx", timestamp),
            ),
        ],
        buffer,
    )
        .into_response()
}

/// List leads flagged as duplicates
pub async fn get_duplicates(State(db): State<DbState>) -> impl IntoResponse {
    match db.lead_storage.list_duplicates().await {
        Ok(leads) => (StatusCode::OK, ResponseJson(ApiResponse::success(leads))).into_response(),
        Err(e) => storage_error_response(e),
    }
}
