use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    App,
};
use oxapay_tools::OxaPayConfig;
use usdt_payment_engine::SqliteDatabase;

use super::{
    helpers::{prepare_db, webhook_config},
    mocks::MockProcessor,
};
use crate::{
    config::ServerConfig,
    integrations::oxapay::OxaPayProcessor,
    middleware::cors_policy,
    routes::health,
    server::{configure_oxapay_routes, create_server_instance},
};

const FRONT_END: &str = "https://app.example";

#[actix_web::test]
async fn health_endpoint() {
    let app = test::init_service(App::new().service(health)).await;
    let req = TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let body = test::read_body(res).await;
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn server_instance_starts_and_stops() {
    let db = prepare_db().await;
    let processor = OxaPayProcessor::new(OxaPayConfig::default()).unwrap();
    let mut config = ServerConfig::new("127.0.0.1", 0);
    config.cors_allowed_origins = vec![FRONT_END.to_string()];
    let server = create_server_instance(config, db, processor).unwrap();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    handle.stop(false).await;
}

fn preflight(path: &str, origin: &str) -> TestRequest {
    TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri(path)
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
}

#[actix_web::test]
async fn preflight_from_allowed_origin() {
    let app = test::init_service(
        App::new()
            .wrap(cors_policy(&[FRONT_END.to_string()]))
            .service(health)
            .configure(|cfg| configure_oxapay_routes::<SqliteDatabase, MockProcessor>(cfg, &webhook_config(true))),
    )
    .await;
    for path in ["/api/oxapay/create-invoice", "/api/oxapay/withdraw"] {
        let res = test::call_service(&app, preflight(path, FRONT_END).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let allowed = res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok());
        assert_eq!(allowed, Some(FRONT_END), "{path}");
        let methods = res.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).and_then(|v| v.to_str().ok());
        assert!(methods.is_some_and(|m| m.contains("POST")), "{path}");
    }
}

#[actix_web::test]
async fn preflight_from_other_origin_is_refused() {
    let app = test::init_service(App::new().wrap(cors_policy(&[FRONT_END.to_string()])).service(health)).await;
    let res = test::call_service(&app, preflight("/api/oxapay/withdraw", "https://evil.example").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[actix_web::test]
async fn any_origin_by_default() {
    let app = test::init_service(App::new().wrap(cors_policy(&[])).service(health)).await;
    let res = test::call_service(&app, preflight("/health", "http://localhost:3000").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let req = TestRequest::get().uri("/health").insert_header((header::ORIGIN, "http://localhost:3000")).to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
}
