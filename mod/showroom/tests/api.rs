//! End-to-end tests through the assembled router: registration, email
//! verification from the mailed link, login, and tenant isolation.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use account::AccountModule;
use account::mailing::RecordingMailer;
use account::service::AccountConfig;
use dealerdesk_core::Module;
use dealerdesk_sql::SqliteStore;
use showroom::ShowroomModule;

fn build_app() -> (Router, Arc<RecordingMailer>) {
    let sql: Arc<dyn dealerdesk_sql::SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mailer = Arc::new(RecordingMailer::new());

    let account_module =
        AccountModule::new(Arc::clone(&sql), mailer.clone(), AccountConfig::default()).unwrap();
    let showroom_module =
        ShowroomModule::new(Arc::clone(&sql), Arc::clone(account_module.service())).unwrap();

    let app = Router::new()
        .merge(account_module.routes())
        .merge(showroom_module.routes())
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(account_module.service()),
            account::api::middleware::auth_middleware,
        ));

    (app, mailer)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Mail goes out on a detached thread; poll briefly for it.
async fn wait_for_mail(mailer: &RecordingMailer, to: &str, subject_hint: &str) -> String {
    for _ in 0..200 {
        if let Some(mail) = mailer
            .sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to && m.subject.contains(subject_hint))
        {
            return mail.body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no mail to {} matching '{}'", to, subject_hint);
}

/// Pull the `/account/email/verify/{uid}/{token}` path out of the mail body.
fn verify_path(mail_body: &str) -> String {
    let start = mail_body
        .find("/account/email/verify/")
        .expect("verification link in mail");
    let rest = &mail_body[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    rest[..end].to_string()
}

/// Register, confirm the emailed link, and log in. Returns an access token.
async fn onboard(app: &Router, mailer: &RecordingMailer, email: &str) -> String {
    let (status, _) = request(
        app,
        "POST",
        "/account/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "first_name": "Alice",
            "last_name": "Carter",
            "password": "correct horse",
            "password_confirm": "correct horse",
            "accept_terms": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mail = wait_for_mail(mailer, email, "Confirm your email").await;
    let (status, body) = request(app, "GET", &verify_path(&mail), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verified");

    login(app, email).await
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/account/login",
        None,
        Some(serde_json::json!({"email": email, "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let (app, _mailer) = build_app();

    let (status, _) = request(&app, "GET", "/showrooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/account/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unverified_users_cannot_reach_showrooms() {
    let (app, _mailer) = build_app();

    let (status, _) = request(
        &app,
        "POST",
        "/account/register",
        None,
        Some(serde_json::json!({
            "email": "new@example.com",
            "first_name": "Alice",
            "last_name": "Carter",
            "password": "correct horse",
            "password_confirm": "correct horse",
            "accept_terms": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Login works before verification; the showroom subtree does not.
    let token = login(&app, "new@example.com").await;
    let (status, body) = request(&app, "GET", "/showrooms", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    // The profile stays reachable.
    let (status, _) = request(&app, "GET", "/account/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn showroom_crud_is_tenant_isolated() {
    let (app, mailer) = build_app();
    let alice = onboard(&app, &mailer, "alice@example.com").await;
    let bob = onboard(&app, &mailer, "bob@example.com").await;

    let (status, created) = request(
        &app,
        "POST",
        "/showrooms",
        Some(&alice),
        Some(serde_json::json!({
            "title": "Alfa Motors",
            "phone_number": "+1 555 0100",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let slug = created["slug"].as_str().unwrap().to_string();

    // Owner sees it, with statistics attached.
    let (status, body) =
        request(&app, "GET", &format!("/showrooms/{}", slug), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["showroom"]["title"], "Alfa Motors");
    assert_eq!(body["statistics"]["count"], 1);
    assert_eq!(body["is_new"], true);

    // Another tenant gets NotFound on every verb.
    let (status, _) =
        request(&app, "GET", &format!("/showrooms/{}", slug), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(
        &app,
        "PUT",
        &format!("/showrooms/{}", slug),
        Some(&bob),
        Some(serde_json::json!({"title": "Mine Now"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/showrooms/{}", slug),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob's own list is empty.
    let (status, body) = request(&app, "GET", "/showrooms", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn section_routes_dispatch_by_model_name() {
    let (app, mailer) = build_app();
    let token = onboard(&app, &mailer, "owner@example.com").await;

    let (_, created) = request(
        &app,
        "POST",
        "/showrooms",
        Some(&token),
        Some(serde_json::json!({
            "title": "Alfa Motors",
            "phone_number": "+1 555 0100",
        })),
    )
    .await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let (status, category) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/categories", slug),
        Some(&token),
        Some(serde_json::json!({"name": "Sedans"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _product) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/products", slug),
        Some(&token),
        Some(serde_json::json!({
            "title": "Model 3",
            "price": 30000,
            "quantity": 3,
            "category_slug": category["slug"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/showrooms/{}/products", slug),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["statistics"]["count"], 1);
    assert_eq!(body["statistics"]["metrics"]["sales_count"], 0.0);

    // Unknown section names are missing resources.
    let (status, _) = request(
        &app,
        "GET",
        &format!("/showrooms/{}/widgets", slug),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sell_flow_over_http() {
    let (app, mailer) = build_app();
    let token = onboard(&app, &mailer, "owner@example.com").await;

    let (_, created) = request(
        &app,
        "POST",
        "/showrooms",
        Some(&token),
        Some(serde_json::json!({
            "title": "Alfa Motors",
            "phone_number": "+1 555 0100",
        })),
    )
    .await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let (_, category) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/categories", slug),
        Some(&token),
        Some(serde_json::json!({"name": "Sedans"})),
    )
    .await;
    let (_, product) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/products", slug),
        Some(&token),
        Some(serde_json::json!({
            "title": "Model 3",
            "price": 30000,
            "quantity": 3,
            "category_slug": category["slug"],
        })),
    )
    .await;
    let product_slug = product["slug"].as_str().unwrap();

    let (status, sold) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/products/{}/sell", slug, product_slug),
        Some(&token),
        Some(serde_json::json!({"quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sold["item"]["quantity"], 2);
    assert_eq!(sold["item"]["sale_price"], 30000);

    // Statistics reflect the sale.
    let (status, stats) = request(
        &app,
        "GET",
        &format!("/showrooms/{}/statistics", slug),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["metrics"]["sales_count"], 1.0);
    assert_eq!(stats["metrics"]["sales_products_quantity_sum"], 2.0);

    // Overselling the remaining stock fails.
    let (status, body) = request(
        &app,
        "POST",
        &format!("/showrooms/{}/products/{}/sell", slug, product_slug),
        Some(&token),
        Some(serde_json::json!({"quantity": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}
