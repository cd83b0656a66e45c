mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok_with_database(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = app
        .request(axum::http::Method::GET, "/health", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_is_degraded_when_database_is_gone(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    pool.close().await;

    let response = app
        .request(axum::http::Method::GET, "/health", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "unreachable");
}
