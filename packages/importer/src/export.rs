// ABOUTME: XLSX export of stored leads
// ABOUTME: Writes a single "Leads" worksheet into an in-memory buffer

use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};

use leadhub_leads::Lead;

const HEADERS: &[&str] = &[
    "Name",
    "Company",
    "Company URL",
    "Email",
    "Contact Number",
    "Status",
    "Source",
    "Service Type",
    "Budget",
    "Response",
    "Notes",
    "Last Contact",
    "Created Date",
    "Assigned To",
    "Duplicate Count",
];

/// Serialize leads into an XLSX workbook buffer.
pub fn leads_to_xlsx(leads: &[Lead]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name("Leads")?;

    let header_format = Format::new().set_bold();
    for (c, header) in HEADERS.iter().enumerate() {
        ws.write_string_with_format(0, c as u16, *header, &header_format)?;
    }

    for (i, lead) in leads.iter().enumerate() {
        let r = (i + 1) as u32;
        ws.write_string(r, 0, &lead.name)?;
        ws.write_string(r, 1, &lead.company_name)?;
        ws.write_string(r, 2, &lead.company_url)?;
        ws.write_string(r, 3, &lead.email)?;
        ws.write_string(r, 4, &lead.contact_number)?;
        ws.write_string(r, 5, lead.status.as_str())?;
        ws.write_string(r, 6, &lead.source)?;
        ws.write_string(r, 7, &lead.service_type)?;
        if let Some(budget) = lead.budget {
            ws.write_number(r, 8, budget)?;
        }
        ws.write_string(r, 9, &lead.response_text)?;
        ws.write_string(r, 10, &lead.notes)?;
        let last_contact = lead
            .last_contact_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        ws.write_string(r, 11, &last_contact)?;
        ws.write_string(r, 12, &lead.created_at.format("%Y-%m-%d").to_string())?;
        ws.write_string(r, 13, lead.assigned_to.as_deref().unwrap_or(""))?;
        ws.write_number(r, 14, lead.duplicate_count as f64)?;
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}
