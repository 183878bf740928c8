//! Resolve binary - shows which language a visitor would get, without a server
//!
//! Usage:
//!   cargo run --bin resolve                 # Human-readable report
//!   cargo run --bin resolve -- --json       # JSON report
//!
//! Optional environment variables:
//! - REQUEST_PATH (defaults to /)
//! - STORED_LANGUAGE (the visitor's stored preference, if any)
//! - BROWSER_LOCALE (defaults to LANG, e.g. fr_FR.UTF-8)
//! - PAGE_FILE (HTML page whose switch links should be listed)
//! - SWITCH_CLASS (defaults to dropdown-item)

use anyhow::{Context, Result};
use serde::Serialize;
use site_lang::i18n::Language;
use site_lang::markup::find_switch_affordances;
use site_lang::navigation::{NavigationController, RecordingNavigator};
use site_lang::resolver::{LanguageResolver, Resolution};
use site_lang::storage::MemoryStore;
use std::fs;
use tracing::info;

/// Visitor described by the environment
struct VisitorConfig {
    request_path: String,
    stored_language: Option<String>,
    browser_locale: Option<String>,
    page_file: Option<String>,
    switch_class: String,
}

impl VisitorConfig {
    fn from_env() -> Self {
        Self {
            request_path: std::env::var("REQUEST_PATH").unwrap_or_else(|_| "/".to_string()),
            stored_language: std::env::var("STORED_LANGUAGE").ok(),
            browser_locale: std::env::var("BROWSER_LOCALE")
                .or_else(|_| std::env::var("LANG"))
                .ok(),
            page_file: std::env::var("PAGE_FILE").ok(),
            switch_class: std::env::var("SWITCH_CLASS")
                .unwrap_or_else(|_| "dropdown-item".to_string()),
        }
    }
}

#[derive(Serialize)]
struct SwitchLinkReport {
    href: String,
    language: Language,
}

#[derive(Serialize)]
struct Report {
    path: String,
    resolution: Resolution,
    page: &'static str,
    load_redirect: Option<String>,
    switch_links: Vec<SwitchLinkReport>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_lang=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = std::env::args().any(|arg| arg == "--json");
    let visitor = VisitorConfig::from_env();

    let page_html = match &visitor.page_file {
        Some(path) => {
            Some(fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?)
        }
        None => None,
    };

    let store = MemoryStore::from_option(visitor.stored_language.clone());
    let navigator = RecordingNavigator::new();
    let controller = NavigationController::new(
        LanguageResolver::new(
            visitor.request_path.clone(),
            &store,
            visitor.browser_locale.clone(),
        ),
        &navigator,
    );

    let resolution = controller.resolver().resolve();
    let elements = page_html
        .as_deref()
        .map(|html| find_switch_affordances(html, &visitor.switch_class))
        .unwrap_or_default();
    let load = controller.init(&elements);
    info!("Resolved {} via {:?}", resolution.language, resolution.source);

    let report = Report {
        path: visitor.request_path,
        resolution,
        page: resolution.language.page(),
        load_redirect: load.redirected.and(navigator.last()),
        switch_links: load
            .bindings
            .into_iter()
            .map(|binding| SwitchLinkReport {
                href: binding.element.href,
                language: binding.language,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Path:          {}", report.path);
    println!(
        "Language:      {} ({})",
        report.resolution.language,
        report.resolution.language.name()
    );
    println!("Decided by:    {:?}", report.resolution.source);
    println!("Page:          {}", report.page);
    match &report.load_redirect {
        Some(target) => println!("Load redirect: {}", target),
        None => println!("Load redirect: none"),
    }
    for link in &report.switch_links {
        println!("Switch link:   {} -> {}", link.href, link.language);
    }

    Ok(())
}
