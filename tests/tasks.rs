#[macro_use]
mod common;

use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{delete, get, json_body, post_json, put_json, register_and_login, send};
use taskvault::routes;

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let services = common::services();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            let services = services.clone();
            App::new()
                .wrap(services.auth_middleware())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .configure(|cfg| services.configure(cfg))
                .configure(routes::config)
        })
        .workers(1)
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/tasks", port))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");

    let status = resp.status();
    let body: Value = resp.json().await.expect("401 body is JSON");
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.abort();
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let app = test_app!();
    let alice = register_and_login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        post_json(
            "/tasks",
            &alice,
            json!({ "title": "Write report", "description": "quarterly numbers" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_body(&body);
    assert_eq!(created["title"], "Write report");
    assert_eq!(created["description"], "quarterly numbers");
    assert_eq!(created["completed"], false);
    let uri = format!("/tasks/{}", created["id"]);

    let (status, body) = send(&app, get(&uri, &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), created);

    let req = put_json(&uri, &alice, json!({ "completed": true }));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_body(&body);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Write report");
    assert_eq!(updated["description"], "quarterly numbers");

    let req = put_json(&uri, &alice, json!({ "title": "Final report" }));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let renamed = json_body(&body);
    assert_eq!(renamed["title"], "Final report");
    assert_eq!(renamed["completed"], true);

    let (status, body) = send(&app, get("/tasks", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([renamed]));

    let (status, _) = send(&app, delete(&uri, &alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&uri, &alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&uri, &alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_tasks_are_isolated_between_users() {
    let app = test_app!();
    let alice = register_and_login(&app, "alice", "pw1").await;
    let bob = register_and_login(&app, "bob", "pw2").await;

    let req = post_json("/tasks", &alice, json!({ "title": "buy milk" }));
    let (_, body) = send(&app, req).await;
    let task = json_body(&body);
    let uri = format!("/tasks/{}", task["id"]);

    let (status, body) = send(&app, get(&uri, &bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({ "error": "Task not found" }));

    let missing = format!("/tasks/{}", 9_999);
    let (_, missing_body) = send(&app, get(&missing, &bob)).await;
    assert_eq!(body, missing_body);

    let req = put_json(&uri, &bob, json!({ "title": "hijacked", "completed": true }));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&uri, &bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/tasks", &bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([]));

    let (status, _) = send(&app, delete("/tasks", &bob)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get(&uri, &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), task);
}

#[actix_rt::test]
async fn test_list_filters_by_completion() {
    let app = test_app!();
    let alice = register_and_login(&app, "alice", "pw1").await;

    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        let req = post_json("/tasks", &alice, json!({ "title": title }));
        let (_, body) = send(&app, req).await;
        ids.push(json_body(&body)["id"].clone());
    }
    let (status, _) = send(
        &app,
        put_json(&format!("/tasks/{}", ids[1]), &alice, json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/tasks?completed=true", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let done = json_body(&body);
    assert_eq!(done.as_array().map(Vec::len), Some(1));
    assert_eq!(done[0]["id"], ids[1]);

    let (_, body) = send(&app, get("/tasks?completed=false", &alice)).await;
    assert_eq!(json_body(&body).as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, get("/tasks", &alice)).await;
    assert_eq!(json_body(&body).as_array().map(Vec::len), Some(3));

    let (status, _) = send(&app, get("/tasks?completed=invalid", &alice)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_delete_all_only_touches_own_tasks() {
    let app = test_app!();
    let alice = register_and_login(&app, "alice", "pw1").await;
    let bob = register_and_login(&app, "bob", "pw2").await;

    for title in ["a1", "a2"] {
        let req = post_json("/tasks", &alice, json!({ "title": title }));
        send(&app, req).await;
    }
    let req = post_json("/tasks", &bob, json!({ "title": "b1" }));
    let (_, body) = send(&app, req).await;
    let bobs = json_body(&body);

    let (status, _) = send(&app, delete("/tasks", &alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/tasks", &alice)).await;
    assert_eq!(json_body(&body), json!([]));

    let (_, body) = send(&app, get("/tasks", &bob)).await;
    assert_eq!(json_body(&body), json!([bobs]));
}

#[actix_rt::test]
async fn test_invalid_task_input_is_rejected() {
    let app = test_app!();
    let alice = register_and_login(&app, "alice", "pw1").await;

    let req = post_json("/tasks", &alice, json!({ "title": "" }));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let req = post_json("/tasks", &alice, json!({ "title": "x".repeat(201) }));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let req = post_json("/tasks", &alice, json!({ "description": "no title" }));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/tasks", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([]));
}
