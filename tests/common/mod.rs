#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use actix_web::web::Bytes;
use serde_json::{json, Value};

use taskvault::config::AuthConfig;
use taskvault::store::MemoryStore;
use taskvault::Services;

pub const TEST_SECRET: &str = "integration_tests_secret_0123456789abcdef";

pub fn services() -> Services {
    let store = Arc::new(MemoryStore::new());
    let config = AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl: chrono::Duration::hours(4),
        bcrypt_cost: 4,
    };
    Services::new(&config, store.clone(), store).expect("Failed to build services")
}

/// Builds the full application over a fresh in-memory store.
macro_rules! test_app {
    () => {{
        let services = common::services();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(services.auth_middleware())
                .wrap(actix_web::middleware::Logger::default())
                .configure(|cfg| services.configure(cfg))
                .configure(taskvault::routes::config),
        )
        .await
    }};
}

/// Calls the app and returns status and body, including for requests the
/// auth middleware rejects before any handler runs.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Bytes)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, to_bytes(resp.into_body()).await.unwrap_or_default())
        }
    }
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await.0
}

/// Logs in and returns the full `Authorization` header value on success.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> Result<String, StatusCode>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    if status != StatusCode::OK {
        return Err(status);
    }
    let body: Value = serde_json::from_slice(&body).expect("login response is JSON");
    Ok(body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string())
}

pub async fn register_and_login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(register(app, username, password).await, StatusCode::OK);
    login(app, username, password)
        .await
        .expect("Failed to log in freshly registered user")
}

pub fn get(uri: &str, bearer: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request()
}

pub fn post_json(uri: &str, bearer: &str, body: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(body)
        .to_request()
}

pub fn put_json(uri: &str, bearer: &str, body: Value) -> actix_http::Request {
    test::TestRequest::put()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(body)
        .to_request()
}

pub fn delete(uri: &str, bearer: &str) -> actix_http::Request {
    test::TestRequest::delete()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request()
}

pub fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).expect("response body is JSON")
}
