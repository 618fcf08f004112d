// ABOUTME: Lead type definitions
// ABOUTME: Structures for leads tracked through the sales pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Warm,
    Hot,
    Cold,
    Won,
    Lost,
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::New
    }
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Warm => "Warm",
            LeadStatus::Hot => "Hot",
            LeadStatus::Cold => "Cold",
            LeadStatus::Won => "Won",
            LeadStatus::Lost => "Lost",
        }
    }

    /// Parse a status string, tolerating case variations from spreadsheets.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(LeadStatus::New),
            "warm" => Some(LeadStatus::Warm),
            "hot" => Some(LeadStatus::Hot),
            "cold" => Some(LeadStatus::Cold),
            "won" => Some(LeadStatus::Won),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub company_url: String,
    pub email: String,
    pub contact_number: String,
    pub response_text: String,
    pub status: LeadStatus,
    pub source: String,
    pub service_type: String,
    pub budget: Option<f64>,
    pub notes: String,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub duplicate_count: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a lead. `name` is the only required field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadCreateInput {
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub response_text: String,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub service_type: String,
    pub budget: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
}

/// Partial update for a lead; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadUpdateInput {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub response_text: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub service_type: Option<String>,
    pub budget: Option<f64>,
    pub notes: Option<String>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
}

/// Filter for querying leads
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub service_type: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub duplicates_only: bool,
    pub assigned_to: Option<String>,
    pub sort: Option<String>,
}

/// Dashboard counts per pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct LeadStats {
    pub total: i64,
    pub new: i64,
    pub warm: i64,
    pub hot: i64,
    pub cold: i64,
    pub won: i64,
    pub lost: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(LeadStatus::parse("hot"), Some(LeadStatus::Hot));
        assert_eq!(LeadStatus::parse(" WON "), Some(LeadStatus::Won));
        assert_eq!(LeadStatus::parse("qualified"), None);
    }

    #[test]
    fn status_default_is_new() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }
}
