mod test_utils;

use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

fn contact_body(nom: &str, type_projet: &str) -> Value {
    serde_json::json!({
        "nom": nom,
        "email": format!("{}@example.com", nom),
        "type_projet": type_projet,
        "budget": "1000-2000€",
        "message": "Bonjour, j'aimerais discuter d'un projet."
    })
}

async fn submit_contact(app: &TestApp, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/contact"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[actix_rt::test]
async fn anonymous_submission_succeeds_but_reading_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = submit_contact(&app, &contact_body("jean", "site_vitrine")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["traite"], false);
    let id = created["id"].as_i64().unwrap();

    // The row is invisible to the anonymous public...
    let response = app.client.get(app.url("/api/contact")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.client
        .get(app.url(&format!("/api/contact/{}", id)))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // ...but visible to any authenticated account.
    let token = app.user_token().await;
    let list: Value = app.client
        .get(app.url("/api/contact"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["nom"], "jean");
}

#[actix_rt::test]
async fn invalid_submission_is_rejected_with_field_errors() {
    let app = TestApp::spawn().await;

    let mut body = contact_body("jean", "site_vitrine");
    body["email"] = serde_json::json!("not-an-email");

    let response = submit_contact(&app, &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: Value = response.json().await.unwrap();
    let details = error["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "email"));

    // Unknown enum values never reach the database.
    let mut body = contact_body("jean", "site_vitrine");
    body["type_projet"] = serde_json::json!("boutique");
    let response = submit_contact(&app, &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn mutations_are_staff_only_while_reads_need_authentication() {
    let app = TestApp::spawn().await;

    let created: Value = submit_contact(&app, &contact_body("marc", "app_web"))
        .await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let user = app.user_token().await;
    let staff = app.staff_token().await;

    // Authenticated non-staff can read but not mutate.
    let response = app.client
        .get(app.url(&format!("/api/contact/{}", id)))
        .bearer_auth(&user)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client
        .patch(app.url(&format!("/api/contact/{}", id)))
        .bearer_auth(&user)
        .json(&serde_json::json!({"traite": true}))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff marks the message as processed.
    let response = app.client
        .patch(app.url(&format!("/api/contact/{}", id)))
        .bearer_auth(&staff)
        .json(&serde_json::json!({"traite": true}))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["traite"], true);
    // date_envoi is write-once.
    assert_eq!(updated["date_envoi"], created["date_envoi"]);
}

#[actix_rt::test]
async fn list_is_ordered_newest_first_and_filters_exactly() {
    let app = TestApp::spawn().await;
    let token = app.user_token().await;

    submit_contact(&app, &contact_body("premier", "site_vitrine")).await;
    submit_contact(&app, &contact_body("deuxieme", "app_web")).await;

    let list: Value = app.client
        .get(app.url("/api/contact"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    let noms: Vec<&str> = list["results"]
        .as_array().unwrap()
        .iter()
        .map(|c| c["nom"].as_str().unwrap())
        .collect();
    assert_eq!(noms, vec!["deuxieme", "premier"]);

    let list: Value = app.client
        .get(app.url("/api/contact?type_projet=app_web"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["nom"], "deuxieme");

    let list: Value = app.client
        .get(app.url("/api/contact?traite=false"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 2);

    let list: Value = app.client
        .get(app.url("/api/contact?search=premier"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
}

#[actix_rt::test]
async fn malformed_traite_filter_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.user_token().await;

    let response = app.client
        .get(app.url("/api/contact?traite=peut-etre"))
        .bearer_auth(&token)
        .send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn staff_delete_removes_the_message() {
    let app = TestApp::spawn().await;
    let staff = app.staff_token().await;

    let created: Value = submit_contact(&app, &contact_body("bref", "autre"))
        .await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let response = app.client
        .delete(app.url(&format!("/api/contact/{}", id)))
        .bearer_auth(&staff)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.client
        .get(app.url(&format!("/api/contact/{}", id)))
        .bearer_auth(&staff)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
