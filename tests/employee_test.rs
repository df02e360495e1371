mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

fn employee_body(number: &str) -> serde_json::Value {
    json!({
        "employee_number": number,
        "name": "Noor Siddiqui",
        "role": "master tailor",
        "capacity": 6,
        "skills": [
            { "skill_name": "embroidery", "proficiency": 5 },
            { "skill_name": "fitting", "proficiency": 4 }
        ],
        "specializations": ["stitching", "quality_check"]
    })
}

#[tokio::test]
async fn employee_creation_stores_skills_and_specializations() {
    let app = TestApp::new().await;
    let (status, body) = app.post("/api/v1/employees", employee_body("T-100")).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["is_active"], true);
    assert_eq!(data["skills"].as_array().unwrap().len(), 2);
    let mut specializations: Vec<&str> = data["specializations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    specializations.sort_unstable();
    assert_eq!(specializations, ["quality_check", "stitching"]);
}

#[tokio::test]
async fn duplicate_employee_numbers_conflict() {
    let app = TestApp::new().await;
    app.post("/api/v1/employees", employee_body("T-200")).await;

    let (status, body) = app.post("/api/v1/employees", employee_body("T-200")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn skill_proficiency_must_be_one_to_five() {
    let app = TestApp::new().await;
    let mut body = employee_body("T-300");
    body["skills"][0]["proficiency"] = json!(9);

    let (status, _) = app.post("/api/v1/employees", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn skills_are_replaced_wholesale() {
    let app = TestApp::new().await;
    let (_, created) = app.post("/api/v1/employees", employee_body("T-400")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/api/v1/employees/{id}/skills"),
            json!({ "skills": [ { "skill_name": "beading", "proficiency": 3 } ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, fetched) = app.get(&format!("/api/v1/employees/{id}")).await;
    let skills = fetched["data"]["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0]["skill_name"], "beading");
}

#[tokio::test]
async fn deactivation_hides_employees_from_default_listing() {
    let app = TestApp::new().await;
    let (_, created) = app.post("/api/v1/employees", employee_body("T-500")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/v1/employees/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, visible) = app.get("/api/v1/employees").await;
    assert_eq!(visible["data"]["items"].as_array().unwrap().len(), 0);

    let (_, all) = app.get("/api/v1/employees?include_inactive=true").await;
    let items = all["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["is_active"], false);
}

#[tokio::test]
async fn capacity_update_must_be_positive() {
    let app = TestApp::new().await;
    let (_, created) = app.post("/api/v1/employees", employee_body("T-600")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(&format!("/api/v1/employees/{id}"), json!({ "capacity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/v1/employees/{id}"),
            json!({ "capacity": 8, "role": "senior tailor" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capacity"], 8);
    assert_eq!(body["data"]["role"], "senior tailor");
}
