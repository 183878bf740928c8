//! Integration tests for the site language server
//!
//! These tests drive the full router against a temporary two-page site,
//! the way a browser would: landing, switching, and coming back.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use site_lang::{config::Config, server::create_router};

// ==================== Test Helpers ====================

const ENGLISH_PAGE: &str = r#"<html lang="en"><body>
<h1>Welcome</h1>
<div class="dropdown-menu">
  <a class="dropdown-item" href="index.html">English</a>
  <a class="dropdown-item" href="index-fr.html">Français</a>
</div>
</body></html>"#;

const FRENCH_PAGE: &str = r#"<html lang="fr"><body>
<h1>Bienvenue</h1>
<div class="dropdown-menu">
  <a class="dropdown-item" href="index.html">English</a>
  <a class="dropdown-item" href="index-fr.html">Français</a>
</div>
</body></html>"#;

/// Create a site directory holding both language pages and a stylesheet
fn create_site() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("index.html"), ENGLISH_PAGE).expect("write index.html");
    std::fs::write(dir.path().join("index-fr.html"), FRENCH_PAGE).expect("write index-fr.html");
    std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").expect("write style.css");
    dir
}

fn router_for(dir: &TempDir) -> Router {
    create_router(Arc::new(Config::for_site(dir.path())))
}

async fn get(app: Router, uri: &str, headers: &[(header::HeaderName, &str)]) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(name.clone(), *value);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .expect("router is infallible")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn set_cookie(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
}

// ==================== Landing Tests ====================

#[tokio::test]
async fn test_root_serves_english_without_preference() {
    let site = create_site();
    let response = get(router_for(&site), "/", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_LANGUAGE).unwrap(),
        "en"
    );
    assert!(body_text(response).await.contains("Welcome"));
}

#[tokio::test]
async fn test_root_redirects_french_browser() {
    let site = create_site();
    let response = get(
        router_for(&site),
        "/",
        &[(header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9,en;q=0.8")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/index-fr.html"));
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_default_page_redirects_stored_french() {
    let site = create_site();
    let response = get(
        router_for(&site),
        "/index.html",
        &[(header::COOKIE, "preferred-language=fr")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/index-fr.html"));
}

#[tokio::test]
async fn test_stored_english_beats_french_browser() {
    let site = create_site();
    let response = get(
        router_for(&site),
        "/",
        &[
            (header::COOKIE, "preferred-language=en"),
            (header::ACCEPT_LANGUAGE, "fr-FR"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_stored_value_falls_through() {
    let site = create_site();
    let app = router_for(&site);

    let response = get(app.clone(), "/", &[(header::COOKIE, "preferred-language=de")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        app,
        "/",
        &[
            (header::COOKIE, "preferred-language=de"),
            (header::ACCEPT_LANGUAGE, "fr"),
        ],
    )
    .await;
    assert_eq!(location(&response), Some("/index-fr.html"));
}

#[tokio::test]
async fn test_landing_varies_on_cookie_and_locale() {
    let site = create_site();
    let app = router_for(&site);

    let served = get(app.clone(), "/", &[]).await;
    let redirected = get(app, "/index.html", &[(header::ACCEPT_LANGUAGE, "fr")]).await;

    for response in [&served, &redirected] {
        assert_eq!(
            response.headers().get(header::VARY).unwrap(),
            "Cookie, Accept-Language"
        );
    }
    assert_eq!(redirected.status(), StatusCode::SEE_OTHER);
}

// ==================== Page Tests ====================

#[tokio::test]
async fn test_french_page_never_redirects() {
    let site = create_site();
    let response = get(
        router_for(&site),
        "/index-fr.html",
        &[
            (header::COOKIE, "preferred-language=en"),
            (header::ACCEPT_LANGUAGE, "en-US"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_LANGUAGE).unwrap(),
        "fr"
    );
    assert!(body_text(response).await.contains("Bienvenue"));
}

#[tokio::test]
async fn test_switch_links_are_rewritten() {
    let site = create_site();
    let body = body_text(get(router_for(&site), "/index-fr.html", &[]).await).await;

    assert!(body.contains(r#"href="/lang/en">English"#));
    assert!(body.contains(r#"href="/lang/fr">Français"#));
    assert!(!body.contains(r#"href="index-fr.html""#));
}

#[tokio::test]
async fn test_unquoted_switch_link_lets_french_visitor_pick_english() {
    let site = create_site();
    std::fs::write(
        site.path().join("index-fr.html"),
        r#"<a class=dropdown-item title="EN > FR" href=index.html>English</a>"#,
    )
    .expect("write index-fr.html");
    let app = router_for(&site);

    let body = body_text(get(app.clone(), "/index-fr.html", &[]).await).await;
    assert!(body.contains("href=/lang/en>English"));

    let response = get(app, "/lang/en", &[(header::ACCEPT_LANGUAGE, "fr-FR")]).await;
    assert_eq!(location(&response), Some("/index.html"));
    assert!(set_cookie(&response).unwrap().starts_with("preferred-language=en"));
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let site = TempDir::new().expect("Failed to create temp dir");
    let response = get(router_for(&site), "/index-fr.html", &[]).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_are_served() {
    let site = create_site();
    let response = get(router_for(&site), "/style.css", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("margin"));
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let site = create_site();
    let response = get(router_for(&site), "/nope.html", &[]).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let site = create_site();
    let response = get(router_for(&site), "/health", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

// ==================== Switch Tests ====================

#[tokio::test]
async fn test_switch_to_french_sets_cookie_and_redirects() {
    let site = create_site();
    let response = get(router_for(&site), "/lang/fr", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/index-fr.html"));

    let cookie = set_cookie(&response).expect("preference cookie should be set");
    assert!(cookie.starts_with("preferred-language=fr"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age="));
}

#[tokio::test]
async fn test_switch_to_unsupported_code_uses_default() {
    let site = create_site();
    let response = get(
        router_for(&site),
        "/lang/de",
        &[(header::COOKIE, "preferred-language=fr")],
    )
    .await;

    assert_eq!(location(&response), Some("/index.html"));
    let cookie = set_cookie(&response).expect("preference cookie should be set");
    assert!(cookie.starts_with("preferred-language=en"));
}

#[tokio::test]
async fn test_switch_back_to_english_stops_redirects() {
    let site = create_site();
    let app = router_for(&site);

    // French browser lands on French first.
    let response = get(app.clone(), "/", &[(header::ACCEPT_LANGUAGE, "fr")]).await;
    assert_eq!(location(&response), Some("/index-fr.html"));

    // Picks English explicitly.
    let response = get(app.clone(), "/lang/en", &[(header::ACCEPT_LANGUAGE, "fr")]).await;
    assert_eq!(location(&response), Some("/index.html"));
    let cookie = set_cookie(&response)
        .and_then(|c| c.split(';').next())
        .expect("preference cookie should be set")
        .to_string();

    // Coming back with the cookie stays on English.
    let response = get(
        app,
        "/index.html",
        &[(header::ACCEPT_LANGUAGE, "fr"), (header::COOKIE, cookie.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_custom_cookie_name() {
    let site = create_site();
    let mut config = Config::for_site(site.path());
    config.preference_cookie = "lang".to_string();
    let app = create_router(Arc::new(config));

    let response = get(app.clone(), "/", &[(header::COOKIE, "lang=fr")]).await;
    assert_eq!(location(&response), Some("/index-fr.html"));

    let response = get(app, "/lang/fr", &[]).await;
    assert!(set_cookie(&response).unwrap().starts_with("lang=fr"));
}
