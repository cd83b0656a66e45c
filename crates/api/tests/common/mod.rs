#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use carryshare_api::auth::jwt::{generate_access_token, JwtConfig};
use carryshare_api::config::{LogFormat, ServerConfig};
use carryshare_api::notifications::NotificationRouter;
use carryshare_api::router::build_app_router;
use carryshare_api::state::AppState;
use carryshare_core::types::DbId;
use carryshare_db::models::notification::Notification;
use carryshare_db::models::package::CreatePackage;
use carryshare_db::models::ride::CreateRide;
use carryshare_db::repositories::{NotificationRepo, PackageRepo, RideRepo};
use carryshare_events::EventBus;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults and a known webhook secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
        },
        payment_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        log_format: LogFormat::Pretty,
    }
}

/// The full application plus a running notification router.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: ServerConfig,
    pub state: AppState,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, test_config())
    }

    pub fn with_config(pool: PgPool, config: ServerConfig) -> Self {
        let event_bus = Arc::new(EventBus::default());
        tokio::spawn(NotificationRouter::new(pool.clone()).run(event_bus.subscribe()));

        let state = AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
            event_bus,
        };
        let router = build_app_router(state.clone(), &config);

        Self {
            router,
            pool,
            config,
            state,
        }
    }

    pub fn token(&self, user_id: DbId) -> String {
        generate_access_token(user_id, "member", &self.config.jwt).unwrap()
    }

    /// Send a request, optionally as `user` and with a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<DbId>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", self.token(user_id)));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: DbId) -> Response<Body> {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post_json(&self, uri: &str, user: DbId, body: serde_json::Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, user: DbId, body: serde_json::Value) -> Response<Body> {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: DbId) -> Response<Body> {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Post a raw body to the processor webhook with the given signature.
    pub async fn post_webhook(&self, body: &[u8], signature: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/payments/webhook")
            .header(CONTENT_TYPE, "application/json");
        if let Some(sig) = signature {
            builder = builder.header("x-signature", sig);
        }
        let request = builder.body(Body::from(body.to_vec())).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Propose a match through the API and return its id.
    pub async fn propose(&self, user: DbId, package_id: DbId, ride_id: DbId, price: f64) -> DbId {
        let response = self
            .post_json(
                "/api/v1/matches",
                user,
                serde_json::json!({ "packageId": package_id, "rideId": ride_id, "price": price }),
            )
            .await;
        assert_eq!(response.status(), 201, "proposal should be created");
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }

    /// Move a match to `status` through the API, asserting success.
    pub async fn transition(&self, user: DbId, match_id: DbId, status: &str) {
        let response = self
            .put_json(
                "/api/v1/matches",
                user,
                serde_json::json!({ "id": match_id, "status": status }),
            )
            .await;
        assert_eq!(response.status(), 200, "transition to {status} should succeed");
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn seed_package(pool: &PgPool, owner_id: DbId) -> DbId {
    let input = CreatePackage {
        owner_id,
        pickup_address: "1 Rue de Rivoli, Paris".to_string(),
        delivery_address: "10 Place Bellecour, Lyon".to_string(),
        weight_kg: Some(2.5),
        size_label: Some("M".to_string()),
    };
    PackageRepo::create(pool, &input).await.unwrap().id
}

pub async fn seed_ride(pool: &PgPool, owner_id: DbId) -> DbId {
    let input = CreateRide {
        owner_id,
        origin: "Paris".to_string(),
        destination: "Lyon".to_string(),
        departure_at: chrono::Utc::now() + chrono::Duration::days(2),
        capacity_kg: Some(20.0),
    };
    RideRepo::create(pool, &input).await.unwrap().id
}

/// Poll until `user_id` has at least `expected` notifications, or give up
/// after two seconds and return what is there.
pub async fn wait_for_notifications(
    pool: &PgPool,
    user_id: DbId,
    expected: usize,
) -> Vec<Notification> {
    let mut found = Vec::new();
    for _ in 0..40 {
        found = NotificationRepo::list_for_user(pool, user_id, false, 100, 0)
            .await
            .unwrap();
        if found.len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    found
}

/// Poll until some session in the test database is blocked on a row lock.
///
/// Panics after two seconds so a statement that should have waited but did
/// not fails loudly instead of racing.
pub async fn wait_for_lock_waiter(pool: &PgPool) {
    for _ in 0..40 {
        let waiting: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pg_stat_activity \
             WHERE datname = current_database() AND wait_event_type = 'Lock'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        if waiting > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("no session started waiting on a lock");
}
