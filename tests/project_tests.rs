mod test_utils;

use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

async fn create_project(app: &TestApp, token: &str, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/projects"))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .unwrap()
}

#[actix_rt::test]
async fn anonymous_create_is_401_and_non_staff_is_403() {
    let app = TestApp::spawn().await;
    let body = project_body("Projet", "projet");

    let response = app.client
        .post(app.url("/api/projects"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = app.user_token().await;
    let response = create_project(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Neither attempt created a row.
    let list: Value = app.client
        .get(app.url("/api/projects"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 0);
}

#[actix_rt::test]
async fn staff_create_succeeds_and_count_increases_by_one() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let response = create_project(&app, &token, &project_body("Mon Projet", "mon-projet")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["slug"], "mon-projet");
    assert_eq!(created["est_publie"], true);
    // Media keys serialize as URLs.
    assert_eq!(created["image_principale"], "/media/projects/main/test.png");

    let list: Value = app.client
        .get(app.url("/api/projects"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
}

#[actix_rt::test]
async fn unpublished_projects_are_invisible_to_the_public() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let mut body = project_body("Secret", "secret");
    body["est_publie"] = serde_json::json!(false);
    let response = create_project(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let list: Value = app.client
        .get(app.url("/api/projects"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 0);

    // Not-found, not forbidden: existence must not leak.
    let response = app.client
        .get(app.url("/api/projects/secret"))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Staff still see it through the admin listing.
    let admin_list: Value = app.client
        .get(app.url("/api/admin/projects"))
        .bearer_auth(&token)
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(admin_list["count"], 1);
}

#[actix_rt::test]
async fn default_ordering_is_ordre_affichage_then_newest_first() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let mut first = project_body("Premier", "premier");
    first["ordre_affichage"] = serde_json::json!(2);
    create_project(&app, &token, &first).await;

    let mut second = project_body("Deuxieme", "deuxieme");
    second["ordre_affichage"] = serde_json::json!(1);
    create_project(&app, &token, &second).await;

    let mut third = project_body("Troisieme", "troisieme");
    third["ordre_affichage"] = serde_json::json!(1);
    create_project(&app, &token, &third).await;

    let list: Value = app.client
        .get(app.url("/api/projects"))
        .send().await.unwrap()
        .json().await.unwrap();

    let slugs: Vec<&str> = list["results"]
        .as_array().unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();

    // Both ordre=1 rows precede the ordre=2 row; among equals the newer
    // creation date wins.
    assert_eq!(slugs, vec!["troisieme", "deuxieme", "premier"]);
}

#[actix_rt::test]
async fn explicit_ordering_is_whitelisted() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    create_project(&app, &token, &project_body("Beta", "beta")).await;
    create_project(&app, &token, &project_body("Alpha", "alpha")).await;

    let list: Value = app.client
        .get(app.url("/api/projects?ordering=-titre"))
        .send().await.unwrap()
        .json().await.unwrap();
    let slugs: Vec<&str> = list["results"]
        .as_array().unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["beta", "alpha"]);

    let response = app.client
        .get(app.url("/api/projects?ordering=email"))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn relations_round_trip_as_nested_objects() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let categorie_id = app.seed_category("Web", "web").await;
    let rust_id = app.seed_technology("Rust").await;
    let actix_id = app.seed_technology("Actix").await;
    let image_id = app.seed_gallery_image("projects/gallery/shot.png", Some("Accueil")).await;

    let mut body = project_body("Complet", "complet");
    body["categorie_id"] = serde_json::json!(categorie_id);
    body["technologies_ids"] = serde_json::json!([rust_id, actix_id]);
    body["galerie_images_ids"] = serde_json::json!([image_id]);

    let response = create_project(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let project: Value = app.client
        .get(app.url("/api/projects/complet"))
        .send().await.unwrap()
        .json().await.unwrap();

    let technologies = project["technologies"].as_array().unwrap();
    assert_eq!(technologies.len(), 2);
    let mut ids: Vec<i64> = technologies.iter().map(|t| t["id"].as_i64().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec![rust_id as i64, actix_id as i64]);
    assert!(technologies.iter().any(|t| t["name"] == "Rust"));

    assert_eq!(project["categorie"]["slug"], "web");

    let gallery = project["galerie_images"].as_array().unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0]["image"], "/media/projects/gallery/shot.png");
    assert_eq!(gallery[0]["description"], "Accueil");
}

#[actix_rt::test]
async fn dangling_categorie_id_fails_validation_and_creates_no_row() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let mut body = project_body("Fantome", "fantome");
    body["categorie_id"] = serde_json::json!(9999);

    let response = create_project(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: Value = response.json().await.unwrap();
    let details = error["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "categorie_id"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn dangling_technology_id_names_the_offending_field() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let mut body = project_body("Fantome", "fantome");
    body["technologies_ids"] = serde_json::json!([12345]);

    let response = create_project(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: Value = response.json().await.unwrap();
    let details = error["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "technologies_ids"));
}

#[actix_rt::test]
async fn duplicate_slug_is_a_field_level_error() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    create_project(&app, &token, &project_body("Un", "partage")).await;
    let response = create_project(&app, &token, &project_body("Deux", "partage")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await.unwrap();
    let details = error["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "slug"));
}

#[actix_rt::test]
async fn malformed_filter_value_is_rejected_not_ignored() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.url("/api/projects?categorie=abc"))
        .send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn filters_narrow_by_category_technology_and_search() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let web_id = app.seed_category("Web", "web").await;
    let rust_id = app.seed_technology("Rust").await;

    let mut site = project_body("Site vitrine boulangerie", "site-boulangerie");
    site["categorie_id"] = serde_json::json!(web_id);
    site["technologies_ids"] = serde_json::json!([rust_id]);
    create_project(&app, &token, &site).await;

    create_project(&app, &token, &project_body("Script d'automatisation", "script-automatisation")).await;

    let list: Value = app.client
        .get(app.url(&format!("/api/projects?categorie={}", web_id)))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["slug"], "site-boulangerie");

    let list: Value = app.client
        .get(app.url(&format!("/api/projects?technologies={}", rust_id)))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);

    let list: Value = app.client
        .get(app.url("/api/projects?search=boulangerie"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["slug"], "site-boulangerie");
}

#[actix_rt::test]
async fn patch_updates_refresh_date_and_respect_tristate_category() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let categorie_id = app.seed_category("Web", "web").await;
    let mut body = project_body("Patchable", "patchable");
    body["categorie_id"] = serde_json::json!(categorie_id);
    create_project(&app, &token, &body).await;

    // Omitting categorie_id leaves it untouched.
    let response = app.client
        .patch(app.url("/api/projects/patchable"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"titre": "Patché"}))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["titre"], "Patché");
    assert_eq!(updated["categorie"]["slug"], "web");
    assert!(updated["date_mise_a_jour"].as_str().unwrap() >= updated["date_creation"].as_str().unwrap());

    // Explicit null detaches the category.
    let response = app.client
        .patch(app.url("/api/projects/patchable"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"categorie_id": null}))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert!(updated["categorie"].is_null());
}

#[actix_rt::test]
async fn unpublishing_hides_a_project_from_the_public() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    create_project(&app, &token, &project_body("Visible", "visible")).await;

    let response = app.client
        .patch(app.url("/api/projects/visible"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"est_publie": false}))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client
        .get(app.url("/api/projects/visible"))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn deleting_a_category_detaches_projects_instead_of_cascading() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    let categorie_id = app.seed_category("Ephemere", "ephemere").await;
    let mut body = project_body("Orphelin", "orphelin");
    body["categorie_id"] = serde_json::json!(categorie_id);
    create_project(&app, &token, &body).await;

    let response = app.client
        .delete(app.url(&format!("/api/admin/categories/{}", categorie_id)))
        .bearer_auth(&token)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let project: Value = app.client
        .get(app.url("/api/projects/orphelin"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert!(project["categorie"].is_null());
}

#[actix_rt::test]
async fn delete_project_requires_staff_and_removes_the_row() {
    let app = TestApp::spawn().await;
    let staff = app.staff_token().await;
    let user = app.user_token().await;

    create_project(&app, &staff, &project_body("Jetable", "jetable")).await;

    let response = app.client
        .delete(app.url("/api/projects/jetable"))
        .bearer_auth(&user)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.client
        .delete(app.url("/api/projects/jetable"))
        .bearer_auth(&staff)
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.client
        .get(app.url("/api/projects/jetable"))
        .send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn pagination_wraps_results_and_links_pages() {
    let app = TestApp::spawn().await;
    let token = app.staff_token().await;

    for i in 0..3 {
        create_project(&app, &token, &project_body(&format!("Projet {}", i), &format!("projet-{}", i))).await;
    }

    let list: Value = app.client
        .get(app.url("/api/projects?page=1&page_size=2"))
        .send().await.unwrap()
        .json().await.unwrap();

    assert_eq!(list["count"], 3);
    assert_eq!(list["results"].as_array().unwrap().len(), 2);
    assert!(list["next"].as_str().unwrap().contains("page=2"));
    assert!(list["previous"].is_null());

    let list: Value = app.client
        .get(app.url("/api/projects?page=2&page_size=2"))
        .send().await.unwrap()
        .json().await.unwrap();
    assert_eq!(list["results"].as_array().unwrap().len(), 1);
    assert!(list["next"].is_null());
    assert!(list["previous"].as_str().unwrap().contains("page=1"));
}
