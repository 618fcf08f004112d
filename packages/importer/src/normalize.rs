// ABOUTME: Column normalizer for uploaded spreadsheets
// ABOUTME: Maps arbitrary header spellings onto the canonical lead field names

use std::collections::HashMap;

use crate::sheet::Row;

/// A row after normalization: canonical field names where a header was
/// recognized, original header names where it was not.
pub type NormalizedRow = HashMap<String, String>;

/// Canonical field name -> accepted header spellings (lower-cased, trimmed).
///
/// Evaluated top to bottom, first match wins. "notes" appears under both
/// response_text and notes; declaration order sends it to response_text,
/// matching the behavior the import has always had.
const COLUMN_MAP: &[(&str, &[&str])] = &[
    ("name", &["name", "full name", "contact name", "lead name"]),
    (
        "company_name",
        &["company", "company name", "company_name", "organization"],
    ),
    (
        "company_url",
        &["website", "company url", "url", "company_url", "site"],
    ),
    ("email", &["email", "email address", "e-mail", "mail"]),
    (
        "contact_number",
        &[
            "phone",
            "contact",
            "mobile",
            "contact_number",
            "phone number",
            "contact number",
        ],
    ),
    (
        "response_text",
        &["response", "message", "notes", "response_text", "description"],
    ),
    ("status", &["status", "lead status", "stage"]),
    ("source", &["source", "lead source", "channel"]),
    (
        "service_type",
        &["service", "service type", "service_type", "product"],
    ),
    ("budget", &["budget", "amount", "value"]),
    ("notes", &["notes", "comments", "remarks"]),
];

/// Find the canonical field claiming a header, if any.
fn canonical_field(header: &str) -> Option<&'static str> {
    let key = header.trim().to_lowercase();
    COLUMN_MAP
        .iter()
        .find(|(_, aliases)| aliases.contains(&key.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Normalize a single row of (header, value) pairs.
///
/// Recognized headers are coalesced under their canonical key; unrecognized
/// headers pass through verbatim so no uploaded column is silently dropped.
pub fn normalize_row(row: &Row) -> NormalizedRow {
    let mut normalized = NormalizedRow::new();

    for (header, value) in row {
        match canonical_field(header) {
            Some(canonical) => {
                normalized.insert(canonical.to_string(), value.clone());
            }
            None => {
                normalized.insert(header.clone(), value.clone());
            }
        }
    }

    normalized
}

/// Normalize every row of an uploaded sheet. Pure and deterministic.
pub fn normalize_rows(rows: &[Row]) -> Vec<NormalizedRow> {
    rows.iter().map(normalize_row).collect()
}
