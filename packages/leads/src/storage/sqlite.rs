// ABOUTME: SQLite implementation of the lead record store
// ABOUTME: Handles schema initialization, CRUD, duplicate lookups, and filtered lists

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::{generate_lead_id, LeadStorage, StorageError, StorageResult};
use crate::pagination::PaginationParams;
use crate::types::{Lead, LeadCreateInput, LeadFilter, LeadStats, LeadStatus, LeadUpdateInput};

/// SQLite implementation of LeadStorage
pub struct SqliteLeadStorage {
    pool: SqlitePool,
}

/// Bind parameter for dynamically built WHERE clauses
enum Param {
    Text(String),
    Real(f64),
}

impl SqliteLeadStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a Lead
    fn row_to_lead(&self, row: &SqliteRow) -> StorageResult<Lead> {
        let status_str: String = row.try_get("status")?;
        let status = LeadStatus::parse(&status_str).unwrap_or(LeadStatus::New);

        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
            .with_timezone(&Utc);

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|_| StorageError::Database("Invalid updated_at timestamp".to_string()))?
            .with_timezone(&Utc);

        let last_contact_str: Option<String> = row.try_get("last_contact_date")?;
        let last_contact_date = last_contact_str
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc));

        Ok(Lead {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            company_name: row.try_get("company_name")?,
            company_url: row.try_get("company_url")?,
            email: row.try_get("email")?,
            contact_number: row.try_get("contact_number")?,
            response_text: row.try_get("response_text")?,
            status,
            source: row.try_get("source")?,
            service_type: row.try_get("service_type")?,
            budget: row.try_get("budget")?,
            notes: row.try_get("notes")?,
            last_contact_date,
            assigned_to: row.try_get("assigned_to")?,
            duplicate_count: row.try_get("duplicate_count")?,
            created_by: row.try_get("created_by")?,
            created_at,
            updated_at,
        })
    }

    async fn fetch_optional_lead(
        &self,
        query_str: &str,
        binds: &[&str],
    ) -> StorageResult<Option<Lead>> {
        let mut query = sqlx::query(query_str);
        for bind in binds {
            query = query.bind(*bind);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => Ok(Some(self.row_to_lead(&row)?)),
            None => Ok(None),
        }
    }

    /// Build WHERE conditions and bind params for a lead filter
    fn filter_conditions(filter: &LeadFilter) -> (Vec<String>, Vec<Param>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Param> = Vec::new();

        if let Some(search) = &filter.search {
            conditions.push(
                "(name LIKE ? OR email LIKE ? OR contact_number LIKE ? OR company_name LIKE ?)"
                    .to_string(),
            );
            let pattern = format!("%{}%", search);
            for _ in 0..4 {
                params.push(Param::Text(pattern.clone()));
            }
        }

        if let Some(status) = &filter.status {
            conditions.push("status = ?".to_string());
            params.push(Param::Text(status.as_str().to_string()));
        }

        if let Some(source) = &filter.source {
            conditions.push("source LIKE ?".to_string());
            params.push(Param::Text(format!("%{}%", source)));
        }

        if let Some(service_type) = &filter.service_type {
            conditions.push("service_type LIKE ?".to_string());
            params.push(Param::Text(format!("%{}%", service_type)));
        }

        if let Some(budget_min) = filter.budget_min {
            conditions.push("budget >= ?".to_string());
            params.push(Param::Real(budget_min));
        }

        if let Some(budget_max) = filter.budget_max {
            conditions.push("budget <= ?".to_string());
            params.push(Param::Real(budget_max));
        }

        if let Some(created_from) = &filter.created_from {
            conditions.push("created_at >= ?".to_string());
            params.push(Param::Text(created_from.to_rfc3339()));
        }

        if let Some(created_to) = &filter.created_to {
            conditions.push("created_at <= ?".to_string());
            params.push(Param::Text(created_to.to_rfc3339()));
        }

        if filter.duplicates_only {
            conditions.push("duplicate_count > 0".to_string());
        }

        if let Some(assigned_to) = &filter.assigned_to {
            conditions.push("assigned_to = ?".to_string());
            params.push(Param::Text(assigned_to.clone()));
        }

        (conditions, params)
    }

    /// Resolve a sort key against the whitelisted columns.
    /// A leading '-' requests descending order; unknown keys fall back to
    /// newest-first.
    fn order_clause(sort: Option<&str>) -> String {
        const SORTABLE: &[&str] = &[
            "created_at",
            "updated_at",
            "name",
            "company_name",
            "status",
            "budget",
            "duplicate_count",
        ];

        let sort = sort.unwrap_or("-created_at");
        let (column, direction) = match sort.strip_prefix('-') {
            Some(column) => (column, "DESC"),
            None => (sort, "ASC"),
        };

        if SORTABLE.contains(&column) {
            format!("ORDER BY {} {}", column, direction)
        } else {
            "ORDER BY created_at DESC".to_string()
        }
    }
}

#[async_trait]
impl LeadStorage for SqliteLeadStorage {
    async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing lead storage schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                company_name TEXT NOT NULL DEFAULT '',
                company_url TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                contact_number TEXT NOT NULL DEFAULT '',
                response_text TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'New',
                source TEXT NOT NULL DEFAULT '',
                service_type TEXT NOT NULL DEFAULT '',
                budget REAL,
                notes TEXT NOT NULL DEFAULT '',
                last_contact_date TEXT,
                assigned_to TEXT,
                duplicate_count INTEGER NOT NULL DEFAULT 0,
                created_by TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        // Same lookup indexes the original schema carried
        for index in [
            "CREATE INDEX IF NOT EXISTS idx_leads_email ON leads(email)",
            "CREATE INDEX IF NOT EXISTS idx_leads_contact_number ON leads(contact_number)",
            "CREATE INDEX IF NOT EXISTS idx_leads_name_company ON leads(name, company_name)",
            "CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status)",
            "CREATE INDEX IF NOT EXISTS idx_leads_assigned_to ON leads(assigned_to)",
            "CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        info!("Lead storage initialized successfully");
        Ok(())
    }

    async fn create_lead(&self, input: LeadCreateInput) -> StorageResult<Lead> {
        let id = generate_lead_id();
        let now = Utc::now();

        // Email is stored trimmed and lower-cased so duplicate lookups can
        // compare verbatim.
        let email = input.email.trim().to_lowercase();

        sqlx::query(
            r#"
            INSERT INTO leads (
                id, name, company_name, company_url, email, contact_number,
                response_text, status, source, service_type, budget, notes,
                last_contact_date, assigned_to, duplicate_count, created_by,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(input.company_name.trim())
        .bind(input.company_url.trim())
        .bind(&email)
        .bind(input.contact_number.trim())
        .bind(&input.response_text)
        .bind(input.status.as_str())
        .bind(input.source.trim())
        .bind(input.service_type.trim())
        .bind(input.budget)
        .bind(&input.notes)
        .bind(input.last_contact_date.map(|d| d.to_rfc3339()))
        .bind(&input.assigned_to)
        .bind(&input.created_by)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        debug!("Created lead with ID {}", id);
        self.get_lead(&id).await?.ok_or(StorageError::NotFound)
    }

    async fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>> {
        self.fetch_optional_lead("SELECT * FROM leads WHERE id = ?", &[id])
            .await
    }

    async fn update_lead(&self, id: &str, input: LeadUpdateInput) -> StorageResult<Lead> {
        let mut set_clauses: Vec<&str> = Vec::new();

        if input.name.is_some() {
            set_clauses.push("name = ?");
        }
        if input.company_name.is_some() {
            set_clauses.push("company_name = ?");
        }
        if input.company_url.is_some() {
            set_clauses.push("company_url = ?");
        }
        if input.email.is_some() {
            set_clauses.push("email = ?");
        }
        if input.contact_number.is_some() {
            set_clauses.push("contact_number = ?");
        }
        if input.response_text.is_some() {
            set_clauses.push("response_text = ?");
        }
        if input.status.is_some() {
            set_clauses.push("status = ?");
        }
        if input.source.is_some() {
            set_clauses.push("source = ?");
        }
        if input.service_type.is_some() {
            set_clauses.push("service_type = ?");
        }
        if input.budget.is_some() {
            set_clauses.push("budget = ?");
        }
        if input.notes.is_some() {
            set_clauses.push("notes = ?");
        }
        if input.last_contact_date.is_some() {
            set_clauses.push("last_contact_date = ?");
        }
        if input.assigned_to.is_some() {
            set_clauses.push("assigned_to = ?");
        }

        if set_clauses.is_empty() {
            return self.get_lead(id).await?.ok_or(StorageError::NotFound);
        }

        let query_str = format!(
            "UPDATE leads SET {}, updated_at = ? WHERE id = ?",
            set_clauses.join(", ")
        );

        let mut query = sqlx::query(&query_str);

        if let Some(ref name) = input.name {
            query = query.bind(name.trim().to_string());
        }
        if let Some(ref company_name) = input.company_name {
            query = query.bind(company_name.trim().to_string());
        }
        if let Some(ref company_url) = input.company_url {
            query = query.bind(company_url.trim().to_string());
        }
        if let Some(ref email) = input.email {
            query = query.bind(email.trim().to_lowercase());
        }
        if let Some(ref contact_number) = input.contact_number {
            query = query.bind(contact_number.trim().to_string());
        }
        if let Some(ref response_text) = input.response_text {
            query = query.bind(response_text);
        }
        if let Some(ref status) = input.status {
            query = query.bind(status.as_str());
        }
        if let Some(ref source) = input.source {
            query = query.bind(source.trim().to_string());
        }
        if let Some(ref service_type) = input.service_type {
            query = query.bind(service_type.trim().to_string());
        }
        if let Some(budget) = input.budget {
            query = query.bind(budget);
        }
        if let Some(ref notes) = input.notes {
            query = query.bind(notes);
        }
        if let Some(ref last_contact_date) = input.last_contact_date {
            query = query.bind(last_contact_date.to_rfc3339());
        }
        if let Some(ref assigned_to) = input.assigned_to {
            query = query.bind(assigned_to);
        }

        query = query.bind(Utc::now().to_rfc3339()).bind(id);

        let result = query.execute(&self.pool).await.map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Updated lead with ID {}", id);
        self.get_lead(id).await?.ok_or(StorageError::NotFound)
    }

    async fn save_lead(&self, lead: &Lead) -> StorageResult<Lead> {
        let result = sqlx::query(
            r#"
            UPDATE leads SET
                name = ?, company_name = ?, company_url = ?, email = ?,
                contact_number = ?, response_text = ?, status = ?, source = ?,
                service_type = ?, budget = ?, notes = ?, last_contact_date = ?,
                assigned_to = ?, duplicate_count = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.company_name)
        .bind(&lead.company_url)
        .bind(&lead.email)
        .bind(&lead.contact_number)
        .bind(&lead.response_text)
        .bind(lead.status.as_str())
        .bind(&lead.source)
        .bind(&lead.service_type)
        .bind(lead.budget)
        .bind(&lead.notes)
        .bind(lead.last_contact_date.map(|d| d.to_rfc3339()))
        .bind(&lead.assigned_to)
        .bind(lead.duplicate_count)
        .bind(Utc::now().to_rfc3339())
        .bind(&lead.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Saved lead with ID {}", lead.id);
        self.get_lead(&lead.id)
            .await?
            .ok_or(StorageError::NotFound)
    }

    async fn delete_lead(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Deleted lead with ID {}", id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Lead>> {
        self.fetch_optional_lead("SELECT * FROM leads WHERE email = ? LIMIT 1", &[email])
            .await
    }

    async fn find_by_contact_number(&self, number: &str) -> StorageResult<Option<Lead>> {
        self.fetch_optional_lead(
            "SELECT * FROM leads WHERE contact_number = ? LIMIT 1",
            &[number],
        )
        .await
    }

    async fn find_by_name_and_company(
        &self,
        name: &str,
        company: &str,
    ) -> StorageResult<Option<Lead>> {
        self.fetch_optional_lead(
            r#"
            SELECT * FROM leads
            WHERE LOWER(name) = LOWER(?) AND LOWER(company_name) = LOWER(?)
            LIMIT 1
            "#,
            &[name, company],
        )
        .await
    }

    async fn list_leads(
        &self,
        filter: &LeadFilter,
        pagination: &PaginationParams,
    ) -> StorageResult<(Vec<Lead>, i64)> {
        let (conditions, params) = Self::filter_conditions(filter);

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_str = format!("SELECT COUNT(*) as count FROM leads {}", where_clause);
        let mut count_query = sqlx::query(&count_str);
        for param in &params {
            count_query = match param {
                Param::Text(s) => count_query.bind(s),
                Param::Real(f) => count_query.bind(*f),
            };
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .try_get("count")?;

        let (limit, offset) = pagination.validate();
        let query_str = format!(
            "SELECT * FROM leads {} {} LIMIT {} OFFSET {}",
            where_clause,
            Self::order_clause(filter.sort.as_deref()),
            limit,
            offset
        );

        let mut query = sqlx::query(&query_str);
        for param in &params {
            query = match param {
                Param::Text(s) => query.bind(s),
                Param::Real(f) => query.bind(*f),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut leads = Vec::new();
        for row in rows {
            leads.push(self.row_to_lead(&row)?);
        }

        Ok((leads, total))
    }

    async fn list_all_leads(&self) -> StorageResult<Vec<Lead>> {
        let rows = sqlx::query("SELECT * FROM leads ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut leads = Vec::new();
        for row in rows {
            leads.push(self.row_to_lead(&row)?);
        }

        Ok(leads)
    }

    async fn list_duplicates(&self) -> StorageResult<Vec<Lead>> {
        let rows = sqlx::query(
            "SELECT * FROM leads WHERE duplicate_count > 0 ORDER BY duplicate_count DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let mut leads = Vec::new();
        for row in rows {
            leads.push(self.row_to_lead(&row)?);
        }

        Ok(leads)
    }

    async fn lead_stats(&self) -> StorageResult<LeadStats> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM leads GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut stats = LeadStats {
            total: 0,
            new: 0,
            warm: 0,
            hot: 0,
            cold: 0,
            won: 0,
            lost: 0,
        };

        for row in rows {
            let status_str: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            stats.total += count;
            match LeadStatus::parse(&status_str) {
                Some(LeadStatus::New) | None => stats.new += count,
                Some(LeadStatus::Warm) => stats.warm += count,
                Some(LeadStatus::Hot) => stats.hot += count,
                Some(LeadStatus::Cold) => stats.cold += count,
                Some(LeadStatus::Won) => stats.won += count,
                Some(LeadStatus::Lost) => stats.lost += count,
            }
        }

        Ok(stats)
    }
}
