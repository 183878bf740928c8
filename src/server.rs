//! HTTP front for the two-page site.
//!
//! Each request gets its own resolver: the request path is the current path,
//! a cookie is the stored preference, `Accept-Language` is the browser locale,
//! and a `303 See Other` is the page navigation.

use crate::config::Config;
use crate::i18n::{Language, LanguageRegistry};
use crate::markup::rewrite_switch_links;
use crate::navigation::{NavigationController, PageView, RecordingNavigator};
use crate::resolver::{LanguageResolver, LocaleSource, PreferenceStore};
use crate::storage::StorageError;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, warn};

const LANDING_VARY: &str = "Cookie, Accept-Language";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Build the router serving the site in `config.site_dir`.
pub fn create_router(config: Arc<Config>) -> Router {
    let static_files = ServeDir::new(&config.site_dir);
    let state = AppState { config };

    let mut router = Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health))
        .route("/lang/:code", get(switch_language));

    for language in LanguageRegistry::get().list_enabled() {
        let route = format!("/{}", language.page);
        router = if language.is_default {
            router.route(&route, get(landing_page))
        } else {
            router.route(&route, get(language_page))
        };
    }

    router
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Site root and default page: send visitors who prefer another language
/// there, serve the default page to everyone else.
async fn landing_page(
    State(state): State<AppState>,
    uri: Uri,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let store = CookiePreference::from_jar(&jar, &state.config.preference_cookie);
    let navigator = RecordingNavigator::new();
    let controller = NavigationController::new(
        LanguageResolver::new(
            uri.path().to_string(),
            &store,
            AcceptLanguage::from_headers(&headers),
        ),
        &navigator,
    );

    let response = match controller.auto_redirect_on_load().and(navigator.last()) {
        Some(target) => Redirect::to(&page_url(&target)).into_response(),
        None => render_page(&state.config, Language::default_language()).await,
    };

    // The outcome depends on the preference cookie and the browser locale.
    ([(header::VARY, LANDING_VARY)], response).into_response()
}

/// An alternate-language page. The path alone decides its language.
async fn language_page(State(state): State<AppState>, uri: Uri) -> Response {
    let language = PageView::from_path(uri.path()).language();
    render_page(&state.config, language).await
}

/// Remember the chosen language, then go to its page.
///
/// Unsupported codes select the default language.
async fn switch_language(
    State(state): State<AppState>,
    Path(code): Path<String>,
    jar: CookieJar,
) -> impl IntoResponse {
    let language = Language::from_code_or_default(&code);
    if language.code() != code {
        debug!("Unsupported language '{}' requested, using {}", code, language);
    }

    let store = CookiePreference::from_jar(&jar, &state.config.preference_cookie);
    let navigator = RecordingNavigator::new();
    let controller = NavigationController::new(
        LanguageResolver::new(format!("/lang/{}", code), &store, None::<String>),
        &navigator,
    );

    let target = controller.persist_and_redirect(language);
    let jar = store.apply(jar, &state.config.preference_cookie);

    (jar, Redirect::to(&page_url(target)))
}

/// Read a language page and point its switch links at the switch endpoint.
async fn render_page(config: &Config, language: Language) -> Response {
    let path = config.site_dir.join(language.page());

    let html = match tokio::fs::read_to_string(&path).await {
        Ok(html) => html,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Page {} not found", path.display());
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = rewrite_switch_links(&html, &config.switch_class, |link| {
        switch_url(link.target_language())
    });

    (
        [(header::CONTENT_LANGUAGE, language.code())],
        Html(html),
    )
        .into_response()
}

fn page_url(page: &str) -> String {
    format!("/{}", page)
}

/// Endpoint that switches to `language`.
pub fn switch_url(language: Language) -> String {
    format!("/lang/{}", language.code())
}

/// The preference cookie of one request.
///
/// Reads come from the request's cookie; a write is held until
/// [`apply`](Self::apply) turns it into a `Set-Cookie`.
#[derive(Debug, Default)]
pub struct CookiePreference {
    current: Option<String>,
    written: Mutex<Option<String>>,
}

impl CookiePreference {
    pub fn from_jar(jar: &CookieJar, name: &str) -> Self {
        Self {
            current: jar.get(name).map(|cookie| cookie.value().to_string()),
            written: Mutex::new(None),
        }
    }

    /// Add the written preference, if any, to the response cookies.
    ///
    /// The cookie never expires on its own.
    pub fn apply(&self, jar: CookieJar, name: &str) -> CookieJar {
        let written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        match written {
            Some(code) => jar.add(
                Cookie::build((name.to_string(), code))
                    .path("/")
                    .same_site(SameSite::Lax)
                    .permanent()
                    .build(),
            ),
            None => jar,
        }
    }
}

impl PreferenceStore for CookiePreference {
    fn load(&self) -> Option<String> {
        let written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        written.or_else(|| self.current.clone())
    }

    fn save(&self, code: &str) -> Result<(), StorageError> {
        *self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(code.to_string());
        Ok(())
    }
}

/// Browser locale taken from `Accept-Language`.
///
/// Like `navigator.language`, this is the first listed tag; quality values
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptLanguage(Option<String>);

impl AcceptLanguage {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let value = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Self(value.and_then(first_language_tag))
    }
}

impl LocaleSource for AcceptLanguage {
    fn locale(&self) -> Option<String> {
        self.0.clone()
    }
}

fn first_language_tag(header: &str) -> Option<String> {
    header
        .split(',')
        .map(|entry| entry.split(';').next().unwrap_or(entry).trim())
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}
