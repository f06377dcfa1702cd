use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use lineage::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "correct-horse-battery";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.images_path = std::env::temp_dir().to_string_lossy().into_owned();
    config.server.secure_cookies = false;
    config.security.bootstrap_admin_password = Some(ADMIN_PASSWORD.to_string());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = lineage::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lineage::api::router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Logs in as the seeded admin and returns the `name=value` cookie pair.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    assert!(cookie.starts_with("lineage_session="));
    cookie
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_outcomes() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errorMessage"], "Username and password are required");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "nobody", "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(response).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(unknown_user["errorMessage"], "Invalid username or password");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
async fn test_status_and_logout() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["isAdmin"], false);

    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/status", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["username"], "admin");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            Some(&cookie),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/status", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["isAuthenticated"], false);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/counties",
            None,
            &json!({ "name": "Lapeer" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_request("/api/home-content/admin", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/auth/me",
            Some("lineage_session=not-a-real-session"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reads stay public.
    let response = app
        .clone()
        .oneshot(get_request("/api/counties", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_content_flow() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/home-content/public", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let home = body["data"].clone();
    assert_eq!(home["siteTitle"], "Thumb of Michigan Genealogy");
    assert_eq!(home["sidebarLinks"].as_array().unwrap().len(), 3);

    let cookie = login(&app).await;

    let update = json!({
        "id": home["id"],
        "siteTitle": "Thumb Area Family History",
        "tagline": "Records from the tip of the Thumb",
        "aboutContent": "Collected by volunteers.",
        "heroImagePath": "",
        "sidebarLinks": [{ "title": "Ancestry", "url": "https://www.ancestry.com/" }]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/home-content/admin",
            Some(&cookie),
            &update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["siteTitle"], "Thumb Area Family History");
    assert_eq!(body["data"]["heroImagePath"], "/images/hero-image-thumb.png");
    assert_eq!(body["data"]["updatedBy"], "admin");

    let response = app
        .clone()
        .oneshot(get_request("/api/home-content/public", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["siteTitle"], "Thumb Area Family History");
    assert_eq!(
        body["data"]["sidebarLinks"],
        json!([{ "title": "Ancestry", "url": "https://www.ancestry.com/" }])
    );

    let mut missing = update.clone();
    missing["id"] = json!(9999);
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/home-content/admin",
            Some(&cookie),
            &missing,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Home content with ID: 9999 not found.");
}

#[tokio::test]
async fn test_county_management() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/counties",
            Some(&cookie),
            &json!({ "name": "Huron", "displayOrder": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "A county with this name already exists");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/counties/reorder",
            Some(&cookie),
            &json!([3, 1, 2]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/counties", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sanilac", "Huron", "Tuscola"]);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resources",
            Some(&cookie),
            &json!({
                "countyId": 1,
                "type": "link",
                "title": "Huron County Courthouse"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/counties/1")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/counties/2")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/counties/2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resources_tags_and_search() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tags",
            Some(&cookie),
            &json!({ "name": "Census", "color": "#336699" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tag_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resources",
            Some(&cookie),
            &json!({
                "countyId": 3,
                "type": "document",
                "title": "Sanilac 1880 Census Index",
                "description": "Transcribed household listings",
                "tagIds": [tag_id, 9999]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let resource_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["countyName"], "Sanilac");
    assert_eq!(body["data"]["type"], "document");
    assert_eq!(body["data"]["tags"][0]["name"], "Census");
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resources",
            Some(&cookie),
            &json!({ "countyId": 3, "type": "video", "title": "Lighthouse tour" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/resources/search?query=CENSUS", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalCount"], 1);
    assert_eq!(body["data"]["resources"][0]["id"], resource_id);

    let response = app
        .clone()
        .oneshot(get_request("/api/resources/search?query=_", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalCount"], 0);

    let response = app
        .clone()
        .oneshot(get_request("/api/resources/county/3?type=video", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Lighthouse tour");

    let response = app
        .clone()
        .oneshot(get_request("/api/resources/search?pageSize=0", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resources",
            Some(&cookie),
            &json!({ "countyId": 77, "type": "link", "title": "Orphan" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get_request("/api/tags", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["resourceCount"], 1);
}

#[tokio::test]
async fn test_settings() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings/contact.email",
            Some(&cookie),
            &json!({ "value": "research@example.org", "description": "Public contact" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["updatedBy"], "admin");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings/bad%20key",
            Some(&cookie),
            &json!({ "value": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get_request("/api/settings", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let settings = body["data"].as_array().unwrap();
    assert!(
        settings
            .iter()
            .any(|s| s["key"] == "contact.email" && s["value"] == "research@example.org")
    );
}
