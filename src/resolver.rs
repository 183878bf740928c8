//! Preference resolution: which language should this visitor see?
//!
//! Four sources are consulted in priority order, first match wins:
//!
//! 1. The current path, when it points at an alternate-language page
//! 2. The stored preference, when it names a supported language
//! 3. The two-letter prefix of the browser locale, when supported
//! 4. The default language
//!
//! The sources are injected through [`PathSource`], [`PreferenceStore`] and
//! [`LocaleSource`], so the resolver never touches a browser, a request or
//! any global state directly.

use crate::i18n::{Language, LanguageRegistry};
use crate::storage::StorageError;
use serde::Serialize;
use tracing::debug;

/// Read access to the path of the page being evaluated.
pub trait PathSource {
    fn current_path(&self) -> String;
}

/// Persistent storage for the single preferred-language value.
pub trait PreferenceStore {
    /// The raw stored value, if any. Unsupported values are returned as-is;
    /// filtering is the resolver's job.
    fn load(&self) -> Option<String>;

    /// Overwrite the stored value.
    fn save(&self, code: &str) -> Result<(), StorageError>;
}

/// The locale the visitor's browser reports (e.g., "fr-FR").
pub trait LocaleSource {
    fn locale(&self) -> Option<String>;
}

impl PathSource for str {
    fn current_path(&self) -> String {
        self.to_string()
    }
}

impl PathSource for String {
    fn current_path(&self) -> String {
        self.clone()
    }
}

impl LocaleSource for str {
    fn locale(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl LocaleSource for Option<String> {
    fn locale(&self) -> Option<String> {
        self.clone()
    }
}

impl<T: PathSource + ?Sized> PathSource for &T {
    fn current_path(&self) -> String {
        (**self).current_path()
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, code: &str) -> Result<(), StorageError> {
        (**self).save(code)
    }
}

impl<T: LocaleSource + ?Sized> LocaleSource for &T {
    fn locale(&self) -> Option<String> {
        (**self).locale()
    }
}

/// Which source decided the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Path,
    StoredPreference,
    BrowserLocale,
    Default,
}

/// A resolved language together with the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub language: Language,
    pub source: Source,
}

/// Resolves the effective language from injected sources.
#[derive(Debug, Clone)]
pub struct LanguageResolver<P, S, L> {
    path: P,
    store: S,
    locale: L,
}

impl<P, S, L> LanguageResolver<P, S, L>
where
    P: PathSource,
    S: PreferenceStore,
    L: LocaleSource,
{
    pub fn new(path: P, store: S, locale: L) -> Self {
        Self {
            path,
            store,
            locale,
        }
    }

    /// The effective language for the current page.
    pub fn resolve_language(&self) -> Language {
        self.resolve().language
    }

    /// Like [`resolve_language`](Self::resolve_language), but also reports which source won.
    pub fn resolve(&self) -> Resolution {
        let path = self.path.current_path();

        if let Some(language) = language_from_path(&path) {
            debug!("Language {} taken from path {}", language, path);
            return Resolution {
                language,
                source: Source::Path,
            };
        }

        if let Some(language) = self.stored_language() {
            debug!("Language {} taken from stored preference", language);
            return Resolution {
                language,
                source: Source::StoredPreference,
            };
        }

        if let Some(language) = self.browser_language() {
            debug!("Language {} taken from browser locale", language);
            return Resolution {
                language,
                source: Source::BrowserLocale,
            };
        }

        let language = Language::default_language();
        debug!("No usable preference, falling back to {}", language);
        Resolution {
            language,
            source: Source::Default,
        }
    }

    /// The stored preference, if it names a supported language.
    pub fn stored_language(&self) -> Option<Language> {
        let stored = self.store.load()?;
        match Language::from_code(&stored) {
            Ok(language) => Some(language),
            Err(e) => {
                debug!("Ignoring stored preference: {}", e);
                None
            }
        }
    }

    /// The browser locale's two-letter prefix, if it names a supported language.
    pub fn browser_language(&self) -> Option<Language> {
        let locale = self.locale.locale()?;
        locale_prefix(&locale).and_then(|prefix| Language::from_code(&prefix).ok())
    }

    /// Current path as reported by the injected path source.
    pub fn current_path(&self) -> String {
        self.path.current_path()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// The language of an alternate-language page the path points at.
///
/// Only alternate pages override other sources. The site root and the
/// default page are landing pages where the visitor's preference applies.
pub fn language_from_path(path: &str) -> Option<Language> {
    LanguageRegistry::get()
        .alternates()
        .find(|config| path.contains(config.page))
        .and_then(|config| Language::from_code(config.code).ok())
}

/// Whether the path is the site root or the default-language page.
pub fn is_landing_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let default_page = LanguageRegistry::get().default_language().page;
    path.strip_prefix('/') == Some(default_page)
}

/// First two characters of a locale string, ASCII-lowercased.
///
/// Returns `None` when the locale is shorter than two characters.
fn locale_prefix(locale: &str) -> Option<String> {
    let prefix: String = locale.chars().take(2).collect();
    if prefix.chars().count() < 2 {
        return None;
    }
    Some(prefix.to_ascii_lowercase())
}
