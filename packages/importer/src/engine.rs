// ABOUTME: Duplicate-aware merge engine for uploaded lead rows
// ABOUTME: Decides create vs update per row and accumulates batch reports

use serde::Serialize;
use tracing::{debug, warn};

use leadhub_leads::{Lead, LeadCreateInput, LeadStatus, LeadStorage, StorageResult};

use crate::normalize::NormalizedRow;

/// Import mode keeps at most this many row error details for reporting.
/// Merge mode intentionally has no equivalent; its row failures only feed
/// the skipped counter.
pub const MAX_ERROR_DETAILS: usize = 10;

/// A row that failed to persist, kept for the import report
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: NormalizedRow,
    pub error: String,
}

/// Result of an import run (no duplicate detection)
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub new_leads: i64,
    pub errors: i64,
    pub error_details: Vec<RowError>,
}

/// Result of a merge run
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    pub new_leads: i64,
    pub duplicates: i64,
    pub updated: i64,
    pub skipped: i64,
    pub total_processed: i64,
}

/// Outcome of processing a single normalized row. Every row resolves to
/// exactly one of these; a row failure never aborts the batch.
#[derive(Debug)]
enum RowOutcome {
    Created,
    Updated,
    Skipped,
    Errored(String),
}

/// Build the lead candidate for a normalized row.
///
/// Missing optional fields default to empty, status to New, source to
/// "Import". Budget is parsed as a float when the cell holds one.
fn build_candidate(row: &NormalizedRow) -> LeadCreateInput {
    let field = |key: &str| row.get(key).cloned().unwrap_or_default();

    let status = row
        .get("status")
        .and_then(|s| LeadStatus::parse(s))
        .unwrap_or_default();

    let source = match row.get("source") {
        Some(s) if !s.trim().is_empty() => s.clone(),
        _ => "Import".to_string(),
    };

    let budget = row
        .get("budget")
        .and_then(|v| v.trim().parse::<f64>().ok());

    LeadCreateInput {
        name: field("name"),
        company_name: field("company_name"),
        company_url: field("company_url"),
        email: field("email"),
        contact_number: field("contact_number"),
        response_text: field("response_text"),
        status,
        source,
        service_type: field("service_type"),
        budget,
        notes: field("notes"),
        ..Default::default()
    }
}

/// Run the ordered duplicate rules against the store, returning the first
/// hit: stored email, then stored contact number, then the case-insensitive
/// name + company pair. A present-but-unmatched identifier does not stop
/// the weaker rules from running.
pub async fn find_duplicate(
    store: &dyn LeadStorage,
    candidate: &LeadCreateInput,
) -> StorageResult<Option<Lead>> {
    let email = candidate.email.trim().to_lowercase();
    if !email.is_empty() {
        if let Some(lead) = store.find_by_email(&email).await? {
            return Ok(Some(lead));
        }
    }

    let number = candidate.contact_number.trim();
    if !number.is_empty() {
        if let Some(lead) = store.find_by_contact_number(number).await? {
            return Ok(Some(lead));
        }
    }

    let name = candidate.name.trim();
    let company = candidate.company_name.trim();
    if !name.is_empty() && !company.is_empty() {
        if let Some(lead) = store.find_by_name_and_company(name, company).await? {
            return Ok(Some(lead));
        }
    }

    Ok(None)
}

/// Overwrite an existing lead's fields with incoming values, but only where
/// the incoming value is non-empty (budget: present and non-zero). Name,
/// email, contact number, and status are never touched by a merge.
fn apply_selective_update(existing: &mut Lead, incoming: &LeadCreateInput) {
    if !incoming.company_name.is_empty() {
        existing.company_name = incoming.company_name.clone();
    }
    if !incoming.company_url.is_empty() {
        existing.company_url = incoming.company_url.clone();
    }
    if !incoming.response_text.is_empty() {
        existing.response_text = incoming.response_text.clone();
    }
    if !incoming.source.is_empty() {
        existing.source = incoming.source.clone();
    }
    if !incoming.service_type.is_empty() {
        existing.service_type = incoming.service_type.clone();
    }
    if let Some(budget) = incoming.budget {
        if budget != 0.0 {
            existing.budget = Some(budget);
        }
    }
    if !incoming.notes.is_empty() {
        existing.notes = incoming.notes.clone();
    }
}

async fn import_row(
    store: &dyn LeadStorage,
    row: &NormalizedRow,
    created_by: &str,
) -> RowOutcome {
    let mut candidate = build_candidate(row);

    if candidate.name.trim().is_empty() {
        return RowOutcome::Skipped;
    }

    candidate.created_by = Some(created_by.to_string());

    match store.create_lead(candidate).await {
        Ok(_) => RowOutcome::Created,
        Err(e) => RowOutcome::Errored(e.to_string()),
    }
}

async fn merge_row(store: &dyn LeadStorage, row: &NormalizedRow, created_by: &str) -> RowOutcome {
    let mut candidate = build_candidate(row);
    candidate.email = candidate.email.trim().to_lowercase();
    candidate.contact_number = candidate.contact_number.trim().to_string();

    if candidate.name.trim().is_empty() {
        return RowOutcome::Skipped;
    }

    let existing = match find_duplicate(store, &candidate).await {
        Ok(existing) => existing,
        Err(e) => return RowOutcome::Errored(e.to_string()),
    };

    match existing {
        Some(mut lead) => {
            apply_selective_update(&mut lead, &candidate);
            lead.duplicate_count += 1;
            match store.save_lead(&lead).await {
                Ok(_) => RowOutcome::Updated,
                Err(e) => RowOutcome::Errored(e.to_string()),
            }
        }
        None => {
            candidate.created_by = Some(created_by.to_string());
            match store.create_lead(candidate).await {
                Ok(_) => RowOutcome::Created,
                Err(e) => RowOutcome::Errored(e.to_string()),
            }
        }
    }
}

/// Import mode: create a lead per usable row, no duplicate detection.
/// Rows are handled strictly one at a time, in file order.
pub async fn import_rows(
    store: &dyn LeadStorage,
    rows: &[NormalizedRow],
    created_by: &str,
) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        match import_row(store, row, created_by).await {
            RowOutcome::Created => report.new_leads += 1,
            // Nameless rows are discarded without touching any counter
            RowOutcome::Skipped => {}
            RowOutcome::Errored(message) => {
                warn!("Import row failed: {}", message);
                report.errors += 1;
                if report.error_details.len() < MAX_ERROR_DETAILS {
                    report.error_details.push(RowError {
                        row: row.clone(),
                        error: message,
                    });
                }
            }
            // Import never updates
            RowOutcome::Updated => {}
        }
    }

    debug!(
        "Import finished: {} created, {} errors",
        report.new_leads, report.errors
    );
    report
}

/// Merge mode: duplicate detection plus selective field update per row.
pub async fn merge_rows(
    store: &dyn LeadStorage,
    rows: &[NormalizedRow],
    created_by: &str,
) -> MergeReport {
    let mut report = MergeReport {
        total_processed: rows.len() as i64,
        ..Default::default()
    };

    for row in rows {
        match merge_row(store, row, created_by).await {
            RowOutcome::Created => report.new_leads += 1,
            RowOutcome::Updated => {
                report.duplicates += 1;
                report.updated += 1;
            }
            RowOutcome::Skipped => report.skipped += 1,
            RowOutcome::Errored(message) => {
                warn!("Merge row failed: {}", message);
                report.skipped += 1;
            }
        }
    }

    debug!(
        "Merge finished: {} new, {} duplicates, {} skipped of {}",
        report.new_leads, report.duplicates, report.skipped, report.total_processed
    );
    report
}
