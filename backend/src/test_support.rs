//! Shared fixtures for unit and HTTP tests.

use crate::config::Config;
use crate::context::AppContext;
use crate::database::models::{Account, NewAccount};
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;

pub const DEMO_EMAIL: &str = "demo@safetycampaign.org";
pub const DEMO_PASSWORD: &str = "password";
pub const TEST_COST: u32 = 4;

/// Single-connection in-memory pool; the database lives as long as the connection.
async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

pub async fn migrated_pool() -> SqlitePool {
    let pool = memory_pool().await;
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// Schema of older deployments: no `username` and no `last_login` column.
pub async fn legacy_pool() -> SqlitePool {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT '',
            department TEXT,
            phone TEXT,
            location TEXT,
            timezone TEXT,
            language TEXT,
            notify_email INTEGER NOT NULL DEFAULT 1,
            notify_push INTEGER NOT NULL DEFAULT 0,
            notify_sms INTEGER NOT NULL DEFAULT 0,
            avatar TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE sessions (
            id TEXT PRIMARY KEY NOT NULL,
            account_id INTEGER NOT NULL,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool
}

/// Migrated pool holding the demo account (Demo User, Campaign Manager).
pub async fn demo_pool() -> SqlitePool {
    let pool = migrated_pool().await;
    let password_hash = bcrypt::hash(DEMO_PASSWORD, TEST_COST).unwrap();
    sqlx::query(
        "INSERT INTO users (email, username, password_hash, first_name, last_name, role)
         VALUES (?, 'demo', ?, 'Demo', 'User', 'Campaign Manager')",
    )
    .bind(DEMO_EMAIL)
    .bind(password_hash)
    .execute(&pool)
    .await
    .unwrap();
    pool
}

/// Inserts an account using only columns every schema has.
pub async fn seed_account(pool: &SqlitePool, email: &str, password: &str, role: &str) -> i64 {
    let password_hash = bcrypt::hash(password, TEST_COST).unwrap();
    sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, ?)")
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub fn new_account(email: &str, password_hash: &str) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        username: None,
        password_hash: password_hash.to_string(),
        first_name: "Test".to_string(),
        last_name: "Account".to_string(),
        role: "Viewer".to_string(),
    }
}

pub fn account_fixture(first_name: &str, last_name: &str) -> Account {
    Account {
        id: 1,
        email: "john@example.org".to_string(),
        username: None,
        password_hash: None,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        role: "Administrator".to_string(),
        avatar: None,
        last_login: None,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        remember_token_secret: "test-remember-secret".to_string(),
        bcrypt_cost: TEST_COST,
        session_ttl_seconds: 3600,
        session_sweep_interval_seconds: 300,
        secure_cookies: false,
        landing_path: "/dashboard".to_string(),
        server_port: 0,
        bootstrap_account: None,
    }
}

pub async fn test_context(pool: &SqlitePool) -> AppContext {
    AppContext::initialize(test_config(), pool).await.unwrap()
}

pub async fn test_app(pool: &SqlitePool) -> Router {
    test_app_with_landing(pool, "/dashboard").await
}

pub async fn test_app_with_landing(pool: &SqlitePool, landing_path: &str) -> Router {
    let mut config = test_config();
    config.landing_path = landing_path.to_string();
    let ctx = AppContext::initialize(config, pool).await.unwrap();
    crate::build_router(pool.clone(), Arc::new(ctx))
}

/// Form-encoded `POST /login`, optionally carrying a `Cookie` header.
pub fn login_request(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
