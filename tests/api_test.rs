// Integration tests for API endpoints
// Every test runs against its own in-memory SQLite database.
// Run with: cargo test --test api_test

use actix_web::{http::StatusCode, test, web, App};
use pawlser::{
    api,
    auth::{create_token_pair, hash_password},
    config::{AuthConfig, Config, JwtConfig, MysqlConfig, ServerConfig, StorageConfig},
    db::{self, DbPool},
    entities::{comment, like, media::{self, MediaType}, post, profile, user},
    models::{
        CommentResponse, LikeResponse, MediaResponse, PostResponse, ProfileResponse,
        TokenPairResponse, TokenRefreshResponse, UserResponse,
    },
    repositories::{create_account, MediaRepository, NewPost, NewUser, PostRepository},
    services::{LocalStorage, StorageBackend},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

struct TestContext {
    pool: DbPool,
    config: Config,
    storage_root: PathBuf,
}

struct Account {
    id: i64,
    profile_id: i64,
    access: String,
    refresh: String,
}

impl Account {
    fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.access))
    }
}

async fn context() -> TestContext {
    let storage_root =
        std::env::temp_dir().join(format!("pawlser-test-{}", uuid::Uuid::new_v4().simple()));

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_expiration_minutes: 5,
            refresh_expiration_hours: 24,
        },
        mysql: MysqlConfig {
            host: String::new(),
            port: 0,
            user: String::new(),
            password: String::new(),
            database: String::new(),
        },
        storage: StorageConfig {
            root: storage_root.clone(),
            base_url: "/files".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        },
        auth: AuthConfig {
            bcrypt_cost: 4,
        },
    };

    let pool = db::create_memory_pool()
        .await
        .expect("Failed to create in-memory database");

    TestContext {
        pool,
        config,
        storage_root,
    }
}

/// Helper function to create a test app
fn create_test_app(
    ctx: &TestContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        ctx.storage_root.clone(),
        ctx.config.storage.base_url.clone(),
    ));

    App::new()
        .app_data(web::Data::new(ctx.config.clone()))
        .app_data(web::Data::new(ctx.pool.clone()))
        .app_data(web::Data::from(storage))
        .app_data(api::multipart_config(&ctx.config))
        .configure(api::configure)
}

/// Creates an account straight through the repositories and mints its tokens.
async fn seed_account(ctx: &TestContext, username: &str) -> Account {
    let (user, profile) = create_account(
        &ctx.pool,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: hash_password("password123", 4).unwrap(),
        },
    )
    .await
    .expect("Failed to seed account");

    let (access, refresh) = create_token_pair(user.id, &user.username, &ctx.config.jwt).unwrap();

    Account {
        id: user.id,
        profile_id: profile.id,
        access,
        refresh,
    }
}

/// Builds a `multipart/form-data` body from text fields and
/// `(field, file name, content type, bytes)` files.
fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> (String, Vec<u8>) {
    let boundary = "pawlser-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, file_name, content_type, data) in files {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

async fn seed_post(ctx: &TestContext, author: &Account, content: &str) -> post::Model {
    PostRepository::new(&ctx.pool)
        .create(
            author.id,
            NewPost {
                content: content.to_string(),
                post_type: post::PostType::Status,
                location: String::new(),
                feeling: String::new(),
            },
        )
        .await
        .expect("Failed to seed post")
}

#[actix_web::test]
async fn test_register_creates_user_and_profile() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register/")
        .set_json(&json!({
            "username": "alice",
            "password": "password123",
            "email": "alice@example.com"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::CREATED,
        "Register should return 201 CREATED"
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": "User created successfully"}));

    let req = test::TestRequest::get().uri("/users/").to_request();
    let users: Vec<UserResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");
    let profile = users[0].profile.as_ref().expect("Profile should be created");
    assert_eq!(profile.bio, "");
    assert_eq!(profile.followers_count, 0);

    // The issued credentials work
    let req = test::TestRequest::post()
        .uri("/token/")
        .set_json(&json!({"username": "alice", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tokens: TokenPairResponse = test::read_body_json(resp).await;
    assert!(!tokens.access.is_empty());
    assert!(!tokens.refresh.is_empty());
}

#[actix_web::test]
async fn test_register_requires_username_and_password() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register/")
        .set_json(&json!({"username": "alice"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Username and password are required");
    assert_eq!(user::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_register_duplicate_username() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;

    let register = json!({"username": "alice", "password": "password123"});

    let req = test::TestRequest::post()
        .uri("/register/")
        .set_json(&register)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/register/")
        .set_json(&register)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        StatusCode::BAD_REQUEST,
        "Duplicate register should return 400"
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());
    assert_eq!(user::Entity::find().count(&ctx.pool).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_obtain_token_invalid_credentials() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    seed_account(&ctx, "alice").await;

    for credentials in [
        json!({"username": "alice", "password": "wrong"}),
        json!({"username": "nobody", "password": "password123"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/token/")
            .set_json(&credentials)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_requests_without_token_are_rejected() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;

    let req = test::TestRequest::get().uri("/posts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/posts/")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Refresh tokens are not accepted as access tokens
    let alice = seed_account(&ctx, "alice").await;
    let req = test::TestRequest::get()
        .uri("/posts/")
        .insert_header(("Authorization", format!("Bearer {}", alice.refresh)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_like_twice_is_rejected() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let post = seed_post(&ctx, &alice, "hello").await;

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let like: LikeResponse = test::read_body_json(resp).await;
    assert_eq!(like.post, post.id);
    assert_eq!(like.liked_by.id, alice.id);

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Already liked");

    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_concurrent_likes_store_one_row() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let post = seed_post(&ctx, &alice, "hello").await;

    let first = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    let second = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();

    let (a, b) = futures::join!(
        test::call_service(&app, first),
        test::call_service(&app, second)
    );
    let mut statuses = vec![a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 400]);

    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_like_unknown_post() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": 999}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["fields"]["post"].is_array());
}

#[actix_web::test]
async fn test_follow_toggles_and_ignores_self() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;

    let follow_alice = format!("/profiles/{}/follow/", alice.profile_id);
    let alice_profile = format!("/profiles/{}/", alice.profile_id);
    let bob_profile = format!("/profiles/{}/", bob.profile_id);

    let req = test::TestRequest::post()
        .uri(&follow_alice)
        .insert_header(bob.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&alice_profile)
        .insert_header(bob.bearer())
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.followers, vec![bob.profile_id]);
    assert_eq!(profile.followers_count, 1);

    let req = test::TestRequest::get()
        .uri(&bob_profile)
        .insert_header(bob.bearer())
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.following_count, 1);

    // Second toggle restores the original state
    let req = test::TestRequest::post()
        .uri(&follow_alice)
        .insert_header(bob.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&alice_profile)
        .insert_header(bob.bearer())
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert!(profile.followers.is_empty());
    assert_eq!(profile.followers_count, 0);

    // Following yourself is a no-op
    let req = test::TestRequest::post()
        .uri(&follow_alice)
        .insert_header(alice.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&alice_profile)
        .insert_header(alice.bearer())
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.followers_count, 0);
    assert_eq!(profile.following_count, 0);
}

#[actix_web::test]
async fn test_create_post_ignores_unknown_ids() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;

    let media = MediaRepository::new(&ctx.pool);
    let a = media
        .create("/files/posts_files/a.png".to_string(), MediaType::Image, alice.id)
        .await
        .unwrap();
    let b = media
        .create("/files/posts_files/b.mp4".to_string(), MediaType::Video, alice.id)
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(alice.bearer())
        .set_json(&json!({
            "content": "At the park",
            "post_type": "photo",
            "location": "Central Park",
            "media_ids": [a.id, b.id, 999],
            "tagged_people_ids": [bob.id, 12345]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let post: PostResponse = test::read_body_json(resp).await;
    let mut media_ids: Vec<i64> = post.media.iter().map(|m| m.id).collect();
    media_ids.sort();
    assert_eq!(media_ids, vec![a.id, b.id]);
    assert_eq!(post.tagged_people.len(), 1);
    assert_eq!(post.tagged_people[0].id, bob.id);
    assert_eq!(post.created_by.id, alice.id);
    assert_eq!(post.post_type, post::PostType::Photo);
    assert_eq!(post.location, "Central Park");
    assert_eq!(post.likes_count, 0);
}

#[actix_web::test]
async fn test_create_post_rejects_long_feeling() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(alice.bearer())
        .set_json(&json!({"content": "hi", "feeling": "a".repeat(51)}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(post::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_counts_follow_likes_and_comments() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let post = seed_post(&ctx, &alice, "hello").await;
    let post_uri = format!("/posts/{}/", post.id);

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(bob.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/comments/")
        .insert_header(bob.bearer())
        .set_json(&json!({"post": post.id, "content": "Nice!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: serde_json::Value = test::read_body_json(resp).await;
    let comment_id = comment["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&post_uri)
        .insert_header(alice.bearer())
        .to_request();
    let body: PostResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.likes_count, 1);
    assert_eq!(body.comments_count, 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{}/", comment_id))
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&post_uri)
        .insert_header(alice.bearer())
        .to_request();
    let body: PostResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.likes_count, 1);
    assert_eq!(body.comments_count, 0);
}

#[actix_web::test]
async fn test_blank_comment_is_rejected() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let post = seed_post(&ctx, &alice, "hello").await;

    let req = test::TestRequest::post()
        .uri("/comments/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id, "content": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["fields"]["content"].is_array());
}

#[actix_web::test]
async fn test_only_author_can_modify_post() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let post = seed_post(&ctx, &alice, "hello").await;
    let post_uri = format!("/posts/{}/", post.id);

    let req = test::TestRequest::patch()
        .uri(&post_uri)
        .insert_header(bob.bearer())
        .set_json(&json!({"content": "hijacked"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&post_uri)
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // PATCH keeps the fields that were not sent
    let req = test::TestRequest::patch()
        .uri(&post_uri)
        .insert_header(alice.bearer())
        .set_json(&json!({"feeling": "happy"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: PostResponse = test::read_body_json(resp).await;
    assert_eq!(body.content, "hello");
    assert_eq!(body.feeling, "happy");

    let req = test::TestRequest::delete()
        .uri(&post_uri)
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(post::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_deleting_user_cascades() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let post = seed_post(&ctx, &alice, "hello").await;
    MediaRepository::new(&ctx.pool)
        .create("/files/posts_files/a.png".to_string(), MediaType::Image, alice.id)
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(bob.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/comments/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id, "content": "first"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    // Alice follows bob so the follow edge has to go too
    let req = test::TestRequest::post()
        .uri(&format!("/profiles/{}/follow/", bob.profile_id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Nobody deletes someone else's account
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}/", alice.id))
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}/", alice.id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(post::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(comment::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(media::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(profile::Entity::find().count(&ctx.pool).await.unwrap(), 1);
    assert_eq!(user::Entity::find().count(&ctx.pool).await.unwrap(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/profiles/{}/", bob.profile_id))
        .insert_header(bob.bearer())
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.followers_count, 0);
}

#[actix_web::test]
async fn test_logout_blacklists_refresh_token() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    // Refresh works before logout
    let req = test::TestRequest::post()
        .uri("/token/refresh/")
        .set_json(&json!({"refresh": alice.refresh}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: TokenRefreshResponse = test::read_body_json(resp).await;
    assert!(!body.access.is_empty());

    let req = test::TestRequest::post()
        .uri("/logout/")
        .insert_header(alice.bearer())
        .set_json(&json!({"refresh_token": alice.refresh}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::RESET_CONTENT
    );

    // A second logout with the same token fails
    let req = test::TestRequest::post()
        .uri("/logout/")
        .insert_header(alice.bearer())
        .set_json(&json!({"refresh_token": alice.refresh}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/token/refresh/")
        .set_json(&json!({"refresh": alice.refresh}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_logout_without_refresh_token() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    let req = test::TestRequest::post()
        .uri("/logout/")
        .insert_header(alice.bearer())
        .set_json(&json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // An access token is not a refresh token
    let req = test::TestRequest::post()
        .uri("/logout/")
        .insert_header(alice.bearer())
        .set_json(&json!({"refresh_token": alice.access}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_upload_media_batch() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    let (content_type, body) = multipart_body(
        &[],
        &[
            ("files", "cat.png", "image/png", &b"\x89PNG fake image"[..]),
            ("files", "cat.mp4", "video/mp4", &b"fake video bytes"[..]),
        ],
    );
    let req = test::TestRequest::post()
        .uri("/media/")
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let media: Vec<MediaResponse> = test::read_body_json(resp).await;
    assert_eq!(media.len(), 2);
    assert_eq!(media[0].media_type, MediaType::Image);
    assert_eq!(media[1].media_type, MediaType::Video);
    assert!(media.iter().all(|m| m.uploaded_by == alice.id));
    assert!(media.iter().all(|m| m.file.starts_with("/files/posts_files/")));

    let stored = std::fs::read_dir(ctx.storage_root.join("posts_files"))
        .unwrap()
        .count();
    assert_eq!(stored, 2);
}

#[actix_web::test]
async fn test_upload_media_rejects_bad_batches() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    // No files at all
    let (content_type, body) = multipart_body(&[("media_type", "image")], &[]);
    let req = test::TestRequest::post()
        .uri("/media/")
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // One good file and one unsupported file: nothing is stored
    let (content_type, body) = multipart_body(
        &[],
        &[
            ("files", "cat.png", "image/png", &b"\x89PNG fake image"[..]),
            ("files", "notes.txt", "text/plain", &b"just text"[..]),
        ],
    );
    let req = test::TestRequest::post()
        .uri("/media/")
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["fields"]["files"].is_array());

    assert_eq!(
        media::Entity::find().count(&ctx.pool).await.unwrap(),
        0
    );
    assert!(!ctx.storage_root.join("posts_files").exists());
}

#[actix_web::test]
async fn test_update_profile_with_avatar() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let profile_uri = format!("/profiles/{}/", alice.profile_id);

    let req = test::TestRequest::put()
        .uri(&profile_uri)
        .insert_header(alice.bearer())
        .set_json(&json!({"bio": "Dog person"}))
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.bio, "Dog person");

    let (content_type, body) =
        multipart_body(&[], &[("avatar", "me.jpg", "image/jpeg", &b"fake jpeg"[..])]);
    let req = test::TestRequest::patch()
        .uri(&profile_uri)
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: ProfileResponse = test::read_body_json(resp).await;
    assert_eq!(profile.bio, "Dog person", "PATCH keeps the bio");
    let avatar = profile.avatar.expect("Avatar should be set");
    assert!(avatar.starts_with("/files/avatars/"));
    assert!(avatar.ends_with(".jpg"));

    let (content_type, body) =
        multipart_body(&[], &[("avatar", "me.txt", "text/plain", &b"not an image"[..])]);
    let req = test::TestRequest::patch()
        .uri(&profile_uri)
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::put()
        .uri(&profile_uri)
        .insert_header(bob.bearer())
        .set_json(&json!({"bio": "mine now"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn test_deleted_user_token_is_rejected() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let post = seed_post(&ctx, &bob, "still here").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}/", alice.id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    // The access token has not expired, but its account is gone
    let writes = [
        ("/posts/", json!({"content": "ghost post"})),
        ("/likes/", json!({"post": post.id})),
        ("/comments/", json!({"post": post.id, "content": "ghost comment"})),
    ];
    for (uri, payload) in writes {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(alice.bearer())
            .set_json(&payload)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED,
            "POST {} with a deleted user's token",
            uri
        );
    }

    let req = test::TestRequest::get()
        .uri("/profiles/")
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    assert_eq!(post::Entity::find().count(&ctx.pool).await.unwrap(), 1);
    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(comment::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_only_owner_can_delete_like_or_comment() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;
    let post = seed_post(&ctx, &bob, "like me").await;

    let req = test::TestRequest::post()
        .uri("/likes/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id}))
        .to_request();
    let like: LikeResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/comments/")
        .insert_header(alice.bearer())
        .set_json(&json!({"post": post.id, "content": "nice"}))
        .to_request();
    let comment: CommentResponse = test::call_and_read_body_json(&app, req).await;
    let like_uri = format!("/likes/{}/", like.id);
    let comment_uri = format!("/comments/{}/", comment.id);

    // Bob owns the post but not alice's like or comment
    let req = test::TestRequest::delete()
        .uri(&like_uri)
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::patch()
        .uri(&comment_uri)
        .insert_header(bob.bearer())
        .set_json(&json!({"content": "edited by bob"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 1);
    let stored = comment::Entity::find_by_id(comment.id)
        .one(&ctx.pool)
        .await
        .unwrap()
        .expect("Comment should survive");
    assert_eq!(stored.content, "nice");

    let req = test::TestRequest::delete()
        .uri(&like_uri)
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    assert_eq!(like::Entity::find().count(&ctx.pool).await.unwrap(), 0);
    assert_eq!(comment::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

fn stored_files(ctx: &TestContext, prefix: &str) -> usize {
    std::fs::read_dir(ctx.storage_root.join(prefix))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

fn media_upload(account: &Account) -> test::TestRequest {
    let (content_type, body) =
        multipart_body(&[], &[("files", "cat.png", "image/png", &b"\x89PNG fake image"[..])]);
    test::TestRequest::post()
        .uri("/media/")
        .insert_header(account.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

fn avatar_upload(account: &Account) -> test::TestRequest {
    let (content_type, body) =
        multipart_body(&[], &[("avatar", "me.jpg", "image/jpeg", &b"fake jpeg"[..])]);
    test::TestRequest::patch()
        .uri(&format!("/profiles/{}/", account.profile_id))
        .insert_header(account.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn test_deleting_media_removes_stored_file() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;

    let media: Vec<MediaResponse> =
        test::call_and_read_body_json(&app, media_upload(&alice).to_request()).await;
    assert_eq!(stored_files(&ctx, "posts_files"), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/media/{}/", media[0].id))
        .insert_header(bob.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(stored_files(&ctx, "posts_files"), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/media/{}/", media[0].id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(stored_files(&ctx, "posts_files"), 0);
    assert_eq!(media::Entity::find().count(&ctx.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_replacing_avatar_removes_previous_file() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;

    let first: ProfileResponse =
        test::call_and_read_body_json(&app, avatar_upload(&alice).to_request()).await;
    let second: ProfileResponse =
        test::call_and_read_body_json(&app, avatar_upload(&alice).to_request()).await;
    let (first, second) = (first.avatar, second.avatar);
    assert!(first.is_some());
    assert_ne!(first, second);
    assert_eq!(stored_files(&ctx, "avatars"), 1);

    // A bio-only update keeps the current avatar
    let (content_type, body) = multipart_body(&[("bio", "Cat person")], &[]);
    let req = test::TestRequest::patch()
        .uri(&format!("/profiles/{}/", alice.profile_id))
        .insert_header(alice.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let profile: ProfileResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile.avatar, second);
    assert_eq!(stored_files(&ctx, "avatars"), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/profiles/{}/", alice.profile_id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(stored_files(&ctx, "avatars"), 0);
}

#[actix_web::test]
async fn test_deleting_user_removes_stored_files() {
    let ctx = context().await;
    let app = test::init_service(create_test_app(&ctx)).await;
    let alice = seed_account(&ctx, "alice").await;
    let bob = seed_account(&ctx, "bob").await;

    for req in [
        media_upload(&alice),
        media_upload(&alice),
        avatar_upload(&alice),
        media_upload(&bob),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert!(resp.status().is_success(), "upload failed: {}", resp.status());
    }
    assert_eq!(stored_files(&ctx, "posts_files"), 3);
    assert_eq!(stored_files(&ctx, "avatars"), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{}/", alice.id))
        .insert_header(alice.bearer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    // Only bob's upload is left
    assert_eq!(stored_files(&ctx, "posts_files"), 1);
    assert_eq!(stored_files(&ctx, "avatars"), 0);
    assert_eq!(media::Entity::find().count(&ctx.pool).await.unwrap(), 1);
}
