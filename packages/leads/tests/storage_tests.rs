// ABOUTME: Integration tests for the SQLite lead store
// ABOUTME: Covers CRUD, duplicate lookups, filtered lists, and stats

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use leadhub_leads::{
    LeadCreateInput, LeadFilter, LeadStatus, LeadStorage, LeadUpdateInput, PaginationParams,
    SqliteLeadStorage, StorageError,
};

/// Helper to create an in-memory database for testing
async fn create_test_storage() -> SqliteLeadStorage {
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let storage = SqliteLeadStorage::new(pool);
    storage.initialize().await.unwrap();
    storage
}

fn input(name: &str) -> LeadCreateInput {
    LeadCreateInput {
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_and_get_lead() {
    let storage = create_test_storage().await;

    let lead = storage
        .create_lead(LeadCreateInput {
            name: "  Jane Roe  ".to_string(),
            email: " Jane@Roe.IO ".to_string(),
            budget: Some(4500.0),
            created_by: Some("user-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(lead.name, "Jane Roe");
    assert_eq!(lead.email, "jane@roe.io");
    assert_eq!(lead.status, LeadStatus::New);
    assert_eq!(lead.duplicate_count, 0);
    assert_eq!(lead.budget, Some(4500.0));

    let fetched = storage.get_lead(&lead.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, lead.id);
    assert_eq!(fetched.created_by.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn update_lead_applies_partial_changes() {
    let storage = create_test_storage().await;
    let lead = storage.create_lead(input("Jane")).await.unwrap();

    let updated = storage
        .update_lead(
            &lead.id,
            LeadUpdateInput {
                status: Some(LeadStatus::Hot),
                budget: Some(9000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, LeadStatus::Hot);
    assert_eq!(updated.budget, Some(9000.0));
    assert_eq!(updated.name, "Jane");
}

#[tokio::test]
async fn update_missing_lead_is_not_found() {
    let storage = create_test_storage().await;

    let err = storage
        .update_lead(
            "no-such-id",
            LeadUpdateInput {
                name: Some("X".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn delete_lead_removes_the_record() {
    let storage = create_test_storage().await;
    let lead = storage.create_lead(input("Jane")).await.unwrap();

    storage.delete_lead(&lead.id).await.unwrap();
    assert!(storage.get_lead(&lead.id).await.unwrap().is_none());

    let err = storage.delete_lead(&lead.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn save_lead_persists_duplicate_count() {
    let storage = create_test_storage().await;
    let mut lead = storage.create_lead(input("Jane")).await.unwrap();

    lead.duplicate_count += 1;
    lead.notes = "seen again".to_string();
    let saved = storage.save_lead(&lead).await.unwrap();

    assert_eq!(saved.duplicate_count, 1);
    assert_eq!(saved.notes, "seen again");
}

#[tokio::test]
async fn duplicate_lookups_match_exactly() {
    let storage = create_test_storage().await;
    storage
        .create_lead(LeadCreateInput {
            name: "Jane Roe".to_string(),
            company_name: "Roe Ltd".to_string(),
            email: "jane@roe.io".to_string(),
            contact_number: "555-0101".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(storage
        .find_by_email("jane@roe.io")
        .await
        .unwrap()
        .is_some());
    assert!(storage.find_by_email("other@roe.io").await.unwrap().is_none());

    assert!(storage
        .find_by_contact_number("555-0101")
        .await
        .unwrap()
        .is_some());

    // Name + company is case-insensitive but exact, not substring
    assert!(storage
        .find_by_name_and_company("JANE ROE", "roe ltd")
        .await
        .unwrap()
        .is_some());
    assert!(storage
        .find_by_name_and_company("Jane", "Roe Ltd")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn list_leads_filters_by_status_and_search() {
    let storage = create_test_storage().await;
    storage
        .create_lead(LeadCreateInput {
            name: "Jane Roe".to_string(),
            email: "jane@roe.io".to_string(),
            status: LeadStatus::Hot,
            ..Default::default()
        })
        .await
        .unwrap();
    storage
        .create_lead(LeadCreateInput {
            name: "Bob Smith".to_string(),
            company_name: "Roe Ltd".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let filter = LeadFilter {
        status: Some(LeadStatus::Hot),
        ..Default::default()
    };
    let (leads, total) = storage
        .list_leads(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].name, "Jane Roe");

    // Search spans name, email, contact number, and company
    let filter = LeadFilter {
        search: Some("roe".to_string()),
        ..Default::default()
    };
    let (_, total) = storage
        .list_leads(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn list_leads_filters_by_budget_range() {
    let storage = create_test_storage().await;
    for (name, budget) in [("Low", 1000.0), ("Mid", 5000.0), ("High", 20000.0)] {
        storage
            .create_lead(LeadCreateInput {
                name: name.to_string(),
                budget: Some(budget),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let filter = LeadFilter {
        budget_min: Some(2000.0),
        budget_max: Some(10000.0),
        ..Default::default()
    };
    let (leads, total) = storage
        .list_leads(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(leads[0].name, "Mid");
}

#[tokio::test]
async fn list_leads_paginates_and_counts_total() {
    let storage = create_test_storage().await;
    for i in 0..25 {
        storage
            .create_lead(input(&format!("Lead {:02}", i)))
            .await
            .unwrap();
    }

    let params = PaginationParams { page: 3, limit: 10 };
    let (leads, total) = storage
        .list_leads(&LeadFilter::default(), &params)
        .await
        .unwrap();

    assert_eq!(total, 25);
    assert_eq!(leads.len(), 5);
}

#[tokio::test]
async fn list_leads_sorts_by_whitelisted_columns_only() {
    let storage = create_test_storage().await;
    storage.create_lead(input("Bravo")).await.unwrap();
    storage.create_lead(input("Alpha")).await.unwrap();

    let filter = LeadFilter {
        sort: Some("name".to_string()),
        ..Default::default()
    };
    let (leads, _) = storage
        .list_leads(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(leads[0].name, "Alpha");

    // Unknown sort keys fall back to newest-first rather than erroring
    let filter = LeadFilter {
        sort: Some("id; DROP TABLE leads".to_string()),
        ..Default::default()
    };
    let (leads, _) = storage
        .list_leads(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(leads.len(), 2);
}

#[tokio::test]
async fn list_duplicates_orders_by_duplicate_count() {
    let storage = create_test_storage().await;
    let mut a = storage.create_lead(input("A")).await.unwrap();
    let mut b = storage.create_lead(input("B")).await.unwrap();
    storage.create_lead(input("C")).await.unwrap();

    a.duplicate_count = 2;
    b.duplicate_count = 5;
    storage.save_lead(&a).await.unwrap();
    storage.save_lead(&b).await.unwrap();

    let duplicates = storage.list_duplicates().await.unwrap();
    assert_eq!(duplicates.len(), 2);
    assert_eq!(duplicates[0].name, "B");
    assert_eq!(duplicates[1].name, "A");
}

#[tokio::test]
async fn lead_stats_counts_per_status() {
    let storage = create_test_storage().await;
    for status in [
        LeadStatus::New,
        LeadStatus::Hot,
        LeadStatus::Hot,
        LeadStatus::Won,
    ] {
        storage
            .create_lead(LeadCreateInput {
                name: "Lead".to_string(),
                status,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let stats = storage.lead_stats().await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.new, 1);
    assert_eq!(stats.hot, 2);
    assert_eq!(stats.won, 1);
    assert_eq!(stats.lost, 0);
}
