mod common;

use common::{database, seed_users, User};
use mox_orm::prelude::*;
use mox_orm::QueryBuilder;

async fn seeded() -> Database {
    let db = database();
    let mut people: Vec<(String, u32)> = (0..15).map(|i| (format!("adult{:02}", i), 20 + i)).collect();
    people.extend((0..3).map(|i| (format!("minor{}", i), 10 + i)));

    let refs: Vec<(&str, u32)> = people.iter().map(|(name, age)| (name.as_str(), *age)).collect();
    seed_users(&db, &refs).await;
    db
}

#[tokio::test]
async fn test_where_then_limit_accumulates() {
    let db = seeded().await;

    let users = db
        .where_("age", "gt".parse().unwrap(), 18)
        .limit(10)
        .get::<User>()
        .await
        .unwrap();

    assert_eq!(users.len(), 10);
    assert!(users.iter().all(|user| user.age > 18));
}

#[tokio::test]
async fn test_facade_calls_start_independent_builders() {
    let db = seeded().await;

    let limited = db.limit(2);
    let filtered = db.where_("age", QueryOperator::LessThan, 18);

    assert_eq!(limited.limit_value(), Some(2));
    assert!(limited.to_filter().is_empty());
    assert_eq!(filtered.limit_value(), None);

    assert_eq!(limited.get::<User>().await.unwrap().len(), 2);
    assert_eq!(filtered.get::<User>().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_sort_skip_and_limit() {
    let db = seeded().await;

    let users = db
        .sort_by("age", SortDirection::Desc)
        .skip(1)
        .limit(3)
        .get::<User>()
        .await
        .unwrap();

    let ages: Vec<u32> = users.iter().map(|user| user.age).collect();
    assert_eq!(ages, vec![33, 32, 31]);
}

#[tokio::test]
async fn test_non_positive_limit_returns_everything() {
    let db = seeded().await;
    assert_eq!(db.limit(0).get::<User>().await.unwrap().len(), 18);
}

#[tokio::test]
async fn test_first_and_count() {
    let db = seeded().await;

    let youngest = db
        .sort_by("age", SortDirection::Asc)
        .first::<User>()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(youngest.name, "minor0");

    let adults = db
        .where_("age", QueryOperator::GreaterThanOrEqual, 18)
        .limit(1)
        .count::<User>()
        .await
        .unwrap();
    assert_eq!(adults, 15);

    let nobody = db
        .where_("age", QueryOperator::GreaterThan, 200)
        .first::<User>()
        .await
        .unwrap();
    assert!(nobody.is_none());
}

#[tokio::test]
async fn test_get_runs_after_find_on_each_result() {
    let db = seeded().await;
    let users = db.query().where_in("name", vec!["adult00", "minor1"]).get::<User>().await.unwrap();

    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.loaded));
}

#[tokio::test]
async fn test_get_propagates_after_find_failure() {
    let db = seeded().await;
    seed_users(&db, &[("cursed", 40)]).await;

    let err = db.query().get::<User>().await.unwrap_err();
    assert!(matches!(err, ModelError::Hook(HookError::Failed { .. })));

    let raw = db.query().where_eq("name", "cursed").get_raw::<User>().await.unwrap();
    assert_eq!(raw.len(), 1);
}

#[tokio::test]
async fn test_later_filter_on_same_field_wins_at_execution() {
    let db = seeded().await;

    let users = db
        .where_("age", QueryOperator::GreaterThan, 30)
        .where_lt("age", 12)
        .get::<User>()
        .await
        .unwrap();

    let names: Vec<&str> = users.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, vec!["minor0", "minor1"]);
}

#[tokio::test]
async fn test_paginate_and_regex() {
    let db = seeded().await;

    let page: QueryBuilder = db.query().where_regex("name", "^adult").order_by_asc("age").paginate(4, 2);
    let users = page.get::<User>().await.unwrap();
    let ages: Vec<u32> = users.iter().map(|user| user.age).collect();
    assert_eq!(ages, vec![24, 25, 26, 27]);
}

#[tokio::test]
async fn test_malformed_filter_is_a_query_error() {
    let db = seeded().await;
    let mut bad = Document::new();
    bad.insert("$where".to_string(), serde_json::json!("true"));

    let err = db.query().filter(bad).get::<User>().await.unwrap_err();
    assert!(matches!(err, ModelError::Query(_)));
}
