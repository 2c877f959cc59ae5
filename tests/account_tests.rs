//! Registration, login and chatbot persistence against a stubbed Supabase.

use std::collections::HashMap;

use actix_web::{http::StatusCode, test, web::Data, App};
use chatbot_gateway::config::Config;
use chatbot_gateway::web::routes;
use chatbot_gateway::AppState;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(server: Option<&MockServer>) -> Data<AppState> {
    let mut vars = HashMap::new();
    if let Some(server) = server {
        vars.insert("SUPABASE_URL".to_string(), server.uri());
        vars.insert("SUPABASE_API_KEY".to_string(), "service-key".to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let client = config.http_client().unwrap();
    Data::new(AppState::new(&config, client))
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer good-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "u1", "email": "ana@example.com" })),
        )
        .mount(server)
        .await;
}

fn bot_row(id: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "user_id": owner,
        "name": "Helper",
        "description": "Answers politely",
        "config": { "instructions": "Be kind", "color": "#00ffff", "temperature": 0.7 }
    })
}

#[actix_web::test]
async fn register_passes_supabase_response_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({ "email": "ana@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "ana@example.com",
            "confirmation_sent_at": "2026-10-16T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "email": "Ana@Example.com", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "u1");
}

#[actix_web::test]
async fn bad_login_keeps_supabase_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": "ana@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid login credentials");
}

#[actix_web::test]
async fn login_without_supabase_is_server_misconfigured() {
    let app = test::init_service(App::new().app_data(state(None)).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": "ana@example.com", "password": "pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn save_data_requires_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/chatbots"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/save-data")
        .set_json(json!({ "name": "Helper" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn save_data_stores_bot_for_token_owner() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/chatbots"))
        .and(body_partial_json(json!({ "user_id": "u1", "name": "Helper" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([bot_row("b1", "u1")])))
        .expect(1)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/save-data")
        .insert_header(("Authorization", "Bearer good-token"))
        .set_json(json!({
            "name": "Helper",
            "description": "Answers politely",
            "instructions": "Be kind"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "b1");
    assert_eq!(body["user_id"], "u1");
}

#[actix_web::test]
async fn chatbots_of_other_users_are_hidden() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/chatbots"))
        .and(query_param("id", "eq.b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bot_row("b1", "u1")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/chatbots"))
        .and(query_param("id", "eq.b9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bot_row("b9", "u2")])))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let own = test::TestRequest::get()
        .uri("/chatbots/b1")
        .insert_header(("Authorization", "Bearer good-token"))
        .to_request();
    assert_eq!(test::call_service(&app, own).await.status(), StatusCode::OK);

    let foreign = test::TestRequest::get()
        .uri("/chatbots/b9")
        .insert_header(("Authorization", "Bearer good-token"))
        .to_request();
    assert_eq!(
        test::call_service(&app, foreign).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn list_returns_only_callers_bots() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/chatbots"))
        .and(query_param("user_id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bot_row("b1", "u1")])))
        .expect(1)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/chatbots")
        .insert_header(("Authorization", "Bearer good-token"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "b1");
}

#[actix_web::test]
async fn data_store_failure_does_not_leak_backend_detail() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/chatbots"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "permission denied for table chatbots (role service_role, schema public)"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(Some(&server)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/save-data")
        .insert_header(("Authorization", "Bearer good-token"))
        .set_json(json!({ "name": "Helper", "description": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_gateway");
    let message = body["message"].as_str().unwrap();
    assert!(!message.contains("permission denied"));
    assert!(!message.contains("service_role"));
}
