//! Provider console against a real SQLite store
//!
//! Publication toggles, package edits and deletion, content drafts, the
//! member roster, and how each change shows up in the member catalog.

mod helpers;

use coachflow_common::config::NoSubscriptionPolicy;
use coachflow_common::console::{ContentDraft, ProviderConsole};
use coachflow_common::db::models::{BillingInterval, ContentType, PackageChanges, SubscriptionStatus};
use coachflow_common::db::providers::insert_provider;
use coachflow_common::entitlement::{build_catalog_view, MemberSession, SqliteStore};
use coachflow_common::storage::ObjectStorage;
use coachflow_common::{Error, Tier};
use helpers::{raw_subscription, test_db};
use std::time::Duration;
use uuid::Uuid;

const DEADLINE: Duration = Duration::from_secs(5);

fn changes(name: &str, tier: Tier, price_cents: i64) -> PackageChanges {
    PackageChanges {
        name: name.to_string(),
        tier,
        price_cents,
        billing_interval: BillingInterval::Month,
    }
}

fn draft(title: &str, required_tier: Option<Tier>) -> ContentDraft {
    ContentDraft {
        package_id: None,
        required_tier,
        title: title.to_string(),
        description: None,
        content_type: ContentType::Document,
        storage_ref: format!("coach/{}.pdf", title),
        sort_order: 0,
    }
}

#[tokio::test]
async fn test_only_owner_may_open() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();

    assert!(ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.is_ok());

    let err = ProviderConsole::open(&pool, Uuid::new_v4(), coach.id, DEADLINE)
        .await
        .err()
        .expect("Stranger should be refused");
    assert!(matches!(err, Error::Forbidden(_)));

    let err = ProviderConsole::open(&pool, owner, Uuid::new_v4(), DEADLINE)
        .await
        .err()
        .expect("Unknown provider should be refused");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_package_draft_edit_publish_delete() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();

    let package = console.create_package(changes("  Starter ", Tier::Basic, 1900)).await.unwrap();
    assert!(!package.is_published);
    assert_eq!(package.name, "Starter");

    let edited = console
        .update_package(package.id, changes("Starter+", Tier::Premium, 2900))
        .await
        .unwrap();
    assert_eq!(edited.tier, Tier::Premium);

    let published = console.set_package_published(package.id, true).await.unwrap();
    assert!(published.is_published);

    let listed = console.packages().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Starter+");
    assert_eq!(listed[0].price_cents, 2900);
    assert!(listed[0].is_published);

    console.delete_package(package.id).await.unwrap();
    assert!(console.packages().await.unwrap().is_empty());
    assert!(matches!(console.delete_package(package.id).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_package_validation() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();

    assert!(matches!(
        console.create_package(changes(" ", Tier::Basic, 100)).await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        console.create_package(changes("Free", Tier::Basic, -1)).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_referenced_package_cannot_be_deleted() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();

    let package = console.create_package(changes("Pro", Tier::Premium, 4900)).await.unwrap();
    let store = SqliteStore::new(pool.clone());
    let mut session = MemberSession::open(&store, Uuid::new_v4(), coach.id, DEADLINE).await.unwrap();
    session.register(Tier::Premium, Some(package.id)).await.unwrap();

    let err = console.delete_package(package.id).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_cannot_touch_another_providers_rows() {
    let (_dir, pool) = test_db().await;
    let (anna_owner, ben_owner) = (Uuid::new_v4(), Uuid::new_v4());
    let anna = insert_provider(&pool, anna_owner, "anna", "Anna", None).await.unwrap();
    let ben = insert_provider(&pool, ben_owner, "ben", "Ben", None).await.unwrap();

    let anna_console = ProviderConsole::open(&pool, anna_owner, anna.id, DEADLINE).await.unwrap();
    let ben_console = ProviderConsole::open(&pool, ben_owner, ben.id, DEADLINE).await.unwrap();

    let package = anna_console.create_package(changes("A", Tier::Basic, 100)).await.unwrap();
    let item = anna_console.create_content(draft("plan", None)).await.unwrap();

    assert!(matches!(
        ben_console.set_package_published(package.id, true).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(ben_console.delete_content(item.id).await, Err(Error::NotFound(_))));

    let mut foreign = draft("x", None);
    foreign.package_id = Some(package.id);
    assert!(matches!(ben_console.create_content(foreign).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_content_publication_drives_member_catalog() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();

    let item = console.create_content(draft("week-1", Some(Tier::Basic))).await.unwrap();
    assert!(!item.is_published);

    let store = SqliteStore::new(pool.clone());
    let storage = ObjectStorage::new("https://files.example.com", "k", Duration::from_secs(60));
    let member = Uuid::new_v4();
    let mut session = MemberSession::open(&store, member, coach.id, DEADLINE).await.unwrap();
    session.register(Tier::Basic, None).await.unwrap();

    let view = build_catalog_view(&session, &store, &storage, NoSubscriptionPolicy::ShowLocked)
        .await
        .unwrap();
    assert!(view.entries.is_empty(), "drafts are not in the catalog");

    console.set_content_published(item.id, true).await.unwrap();
    let view = build_catalog_view(&session, &store, &storage, NoSubscriptionPolicy::ShowLocked)
        .await
        .unwrap();
    assert_eq!(view.unlocked_count, 1);

    console.set_content_published(item.id, false).await.unwrap();
    console.delete_content(item.id).await.unwrap();
    assert!(console.content().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_content_requires_title_and_reference() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();

    assert!(matches!(console.create_content(draft("  ", None)).await, Err(Error::InvalidInput(_))));

    let mut no_ref = draft("intro", None);
    no_ref.storage_ref = String::new();
    assert!(matches!(console.create_content(no_ref).await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_member_roster_newest_first_all_statuses() {
    let (_dir, pool) = test_db().await;
    let owner = Uuid::new_v4();
    let coach = insert_provider(&pool, owner, "anna", "Anna", None).await.unwrap();
    let other = helpers::provider(&pool, "ben").await;

    let oldest = raw_subscription(&pool, Uuid::new_v4(), coach.id, "basic", "cancelled", 0).await;
    let middle = raw_subscription(&pool, Uuid::new_v4(), coach.id, "premium", "active", 10).await;
    let newest = raw_subscription(&pool, Uuid::new_v4(), coach.id, "elite", "pending", 20).await;
    raw_subscription(&pool, Uuid::new_v4(), other.id, "elite", "active", 30).await;

    let console = ProviderConsole::open(&pool, owner, coach.id, DEADLINE).await.unwrap();
    let roster = console.members().await.unwrap();

    let ids: Vec<Uuid> = roster.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);
    assert_eq!(roster[0].status, SubscriptionStatus::Pending);
}
