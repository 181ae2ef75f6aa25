mod test_utils;

use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

#[actix_rt::test]
async fn staff_login_returns_200_with_user_summary_and_token() {
    let app = TestApp::spawn().await;
    app.insert_user("chris-admin", "AdminPass123!", true).await;

    let response = app.client
        .post(app.url("/api/admin/login"))
        .json(&serde_json::json!({
            "username": "chris-admin",
            "password": "AdminPass123!"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "chris-admin");
    assert_eq!(body["user"]["is_staff"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "Bearer");
}

#[actix_rt::test]
async fn wrong_password_returns_401() {
    let app = TestApp::spawn().await;
    app.insert_user("chris-admin", "AdminPass123!", true).await;

    let response = app.client
        .post(app.url("/api/admin/login"))
        .json(&serde_json::json!({
            "username": "chris-admin",
            "password": "nope"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn unknown_username_returns_401() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/admin/login"))
        .json(&serde_json::json!({
            "username": "ghost",
            "password": "whatever"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn valid_non_staff_credentials_return_403_not_401() {
    let app = TestApp::spawn().await;
    app.insert_user("visitor", "VisitorPass123!", false).await;

    let response = app.client
        .post(app.url("/api/admin/login"))
        .json(&serde_json::json!({
            "username": "visitor",
            "password": "VisitorPass123!"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn malformed_login_body_returns_400() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/admin/login"))
        .json(&serde_json::json!({"username": "only-a-username"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn expired_or_garbage_token_is_rejected_at_the_boundary() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.url("/api/contact"))
        .bearer_auth("garbage.token.value")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
