//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Setup test database:
//!   docker-compose -f docker-compose.test.yml up -d test-db
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `quill_test`)
//!   `TEST_DB_PASSWORD` (default: `quill_test`)
//!   `TEST_DB_NAME` (default: `quill_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use quill_db::entities::{comment, follow, group, post, user};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use quill_db::test_utils::{TestDatabase, TestDbConfig, TestRedisConfig};
use sea_orm::Set;
use std::sync::Arc;

fn user_model(id: &str, username: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        username_lower: Set(username.to_lowercase()),
        display_name: Set(None),
        bio: Set(None),
        token: Set(Some(format!("token-{id}"))),
        created_at: Set(Utc::now().into()),
    }
}

fn post_model(id: &str, author_id: &str, group_id: Option<&str>) -> post::ActiveModel {
    post::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author_id.to_string()),
        group_id: Set(group_id.map(ToString::to_string)),
        text: Set("Hello".to_string()),
        image: Set(None),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_group_deletion_nulls_post_group() {
    let db = TestDatabase::create_unique().await.expect("create db");
    let conn = db.shared_connection().await;

    let users = UserRepository::new(Arc::clone(&conn));
    let groups = GroupRepository::new(Arc::clone(&conn));
    let posts = PostRepository::new(Arc::clone(&conn));

    users.create(user_model("u1", "leo")).await.unwrap();
    groups
        .create(group::ActiveModel {
            id: Set("g1".to_string()),
            title: Set("Cats".to_string()),
            slug: Set("cats".to_string()),
            description: Set("All about cats".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    posts
        .create(post_model("p1", "u1", Some("g1")))
        .await
        .unwrap();

    use sea_orm::{ConnectionTrait, Statement};
    conn.execute(Statement::from_string(
        sea_orm::DatabaseBackend::Postgres,
        "DELETE FROM \"group\" WHERE id = 'g1'".to_string(),
    ))
    .await
    .unwrap();

    // The post survives with its group reference nulled
    let survivor = posts.get_by_id("p1").await.unwrap();
    assert_eq!(survivor.group_id, None);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_author_deletion_cascades() {
    let db = TestDatabase::create_unique().await.expect("create db");
    let conn = db.shared_connection().await;

    let users = UserRepository::new(Arc::clone(&conn));
    let posts = PostRepository::new(Arc::clone(&conn));
    let comments = CommentRepository::new(Arc::clone(&conn));
    let follows = FollowRepository::new(Arc::clone(&conn));

    users.create(user_model("u1", "leo")).await.unwrap();
    users.create(user_model("u2", "ada")).await.unwrap();
    posts.create(post_model("p1", "u1", None)).await.unwrap();
    comments
        .create(comment::ActiveModel {
            id: Set("c1".to_string()),
            post_id: Set("p1".to_string()),
            author_id: Set("u2".to_string()),
            text: Set("Nice post".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    follows
        .create(follow::ActiveModel {
            id: Set("f1".to_string()),
            follower_id: Set("u2".to_string()),
            author_id: Set("u1".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    use sea_orm::{ConnectionTrait, Statement};
    conn.execute(Statement::from_string(
        sea_orm::DatabaseBackend::Postgres,
        "DELETE FROM \"user\" WHERE id = 'u1'".to_string(),
    ))
    .await
    .unwrap();

    // Posts, their comments, and follow edges are all gone
    assert!(posts.find_by_id("p1").await.unwrap().is_none());
    assert!(comments.find_by_post("p1").await.unwrap().is_empty());
    assert!(!follows.is_following("u2", "u1").await.unwrap());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_self_follow_rejected_by_store() {
    let db = TestDatabase::create_unique().await.expect("create db");
    let conn = db.shared_connection().await;

    let users = UserRepository::new(Arc::clone(&conn));
    let follows = FollowRepository::new(Arc::clone(&conn));

    users.create(user_model("u1", "leo")).await.unwrap();

    let result = follows
        .create(follow::ActiveModel {
            id: Set("f1".to_string()),
            follower_id: Set("u1".to_string()),
            author_id: Set("u1".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await;

    assert!(result.is_err(), "check constraint should reject self-follow");

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_follow_rejected_by_store() {
    let db = TestDatabase::create_unique().await.expect("create db");
    let conn = db.shared_connection().await;

    let users = UserRepository::new(Arc::clone(&conn));
    let follows = FollowRepository::new(Arc::clone(&conn));

    users.create(user_model("u1", "leo")).await.unwrap();
    users.create(user_model("u2", "ada")).await.unwrap();

    let edge = |id: &str| follow::ActiveModel {
        id: Set(id.to_string()),
        follower_id: Set("u1".to_string()),
        author_id: Set("u2".to_string()),
        created_at: Set(Utc::now().into()),
    };

    follows.create(edge("f1")).await.unwrap();
    let duplicate = follows.create(edge("f2")).await;

    assert!(duplicate.is_err(), "unique index should reject duplicate");

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    // Test that default config is valid
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_redis_config_from_env() {
    let config = TestRedisConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
