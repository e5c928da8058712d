//! Full-stack HTTP tests: the real router on an ephemeral port, driven with
//! reqwest through the Local-environment x-user-id bypass.
//!
//! Ignored by default; they need DATABASE_URL pointing at a running
//! Postgres. Run with `cargo test -- --ignored`.

use blog_api::{
    AppState,
    config::AppConfig,
    create_router,
    models::{Post, PostWithVotes},
    repository::{PostgresRepository, RepositoryState},
};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub pool: sqlx::PgPool,
}

async fn spawn_app() -> TestApp {
    dotenv::dotenv().ok();

    let db_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set to run api tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("Failed to connect to Postgres in tests");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let repo = Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState;
    // Default config keeps Env::Local, which enables the x-user-id bypass.
    let config = AppConfig::default();

    let state = AppState { repo, config };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, pool }
}

async fn seed_user(pool: &sqlx::PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(id)
        .bind(format!("{}@test.com", id))
        .execute(pool)
        .await
        .unwrap();
    id
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres"]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres"]
async fn test_posts_require_authentication() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // No x-user-id header and no bearer token.
    let response = client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres"]
async fn test_post_lifecycle_with_votes_and_ownership() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user1 = seed_user(&app.pool).await;
    let user2 = seed_user(&app.pool).await;

    // Create as user1.
    let response = client
        .post(format!("{}/posts", app.address))
        .header("x-user-id", user1.to_string())
        .json(&serde_json::json!({ "title": "Hello", "content": "World", "published": true }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), 201);
    let post: Post = response.json().await.unwrap();
    assert_eq!(post.owner_id, user1);
    assert_eq!(post.title, "Hello");

    // Freshly created post reads back with zero votes.
    let response = client
        .get(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user2.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let read: PostWithVotes = response.json().await.unwrap();
    assert_eq!(read.votes, 0);

    // user2 votes; the count is live on the next read.
    let response = client
        .post(format!("{}/votes", app.address))
        .header("x-user-id", user2.to_string())
        .json(&serde_json::json!({ "post_id": post.id, "dir": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let read: PostWithVotes = client
        .get(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user1.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read.votes, 1);

    // Voting twice conflicts.
    let response = client
        .post(format!("{}/votes", app.address))
        .header("x-user-id", user2.to_string())
        .json(&serde_json::json!({ "post_id": post.id, "dir": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // user2 is not the owner: update is forbidden and changes nothing.
    let response = client
        .put(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user2.to_string())
        .json(&serde_json::json!({ "title": "Hijacked", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let read: PostWithVotes = client
        .get(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user1.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read.post.title, "Hello");

    // Non-owner delete is forbidden too.
    let response = client
        .delete(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user2.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Owner replaces all fields.
    let response = client
        .put(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user1.to_string())
        .json(&serde_json::json!({ "title": "Hello v2", "content": "World v2", "published": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: Post = response.json().await.unwrap();
    assert_eq!(updated.title, "Hello v2");
    assert!(!updated.published);

    // Owner deletes; the post is gone afterwards.
    let response = client
        .delete(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user1.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/posts/{}", app.address, post.id))
        .header("x-user-id", user1.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains(&post.id.to_string()),
        "404 detail should name the missing id"
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres"]
async fn test_list_search_and_pagination() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;

    let marker = Uuid::new_v4().simple().to_string();
    for i in 0..3 {
        let response = client
            .post(format!("{}/posts", app.address))
            .header("x-user-id", user.to_string())
            .json(&serde_json::json!({
                "title": format!("{marker} {i}"),
                "content": "c"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    // Search narrows to this test's posts.
    let list: Vec<PostWithVotes> = client
        .get(format!(
            "{}/posts?search={}&limit=100",
            app.address, marker
        ))
        .header("x-user-id", user.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|p| p.post.title.contains(&marker)));

    // limit bounds the page, skip moves the window.
    let page: Vec<PostWithVotes> = client
        .get(format!("{}/posts?search={}&limit=2", app.address, marker))
        .header("x-user-id", user.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.len(), 2);

    let rest: Vec<PostWithVotes> = client
        .get(format!(
            "{}/posts?search={}&limit=100&skip=2",
            app.address, marker
        ))
        .header("x-user-id", user.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
}
