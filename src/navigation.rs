//! Navigation: redirect to a language page, remember explicit choices, and
//! wire language-switch links.
//!
//! The controller never touches a browser or an HTTP response directly. Page
//! navigation goes through a [`Navigator`], and switch links are returned as
//! an explicit list of [`SwitchBinding`]s whose handlers callers invoke.

use crate::i18n::{Language, LanguageRegistry};
use crate::resolver::{
    is_landing_path, language_from_path, LanguageResolver, LocaleSource, PathSource,
    PreferenceStore,
};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Performs a full page navigation to a page filename (e.g., "index-fr.html").
///
/// Navigation is irreversible once issued.
pub trait Navigator {
    fn navigate(&self, target: &str);
}

impl<T: Navigator + ?Sized> Navigator for &T {
    fn navigate(&self, target: &str) {
        (**self).navigate(target)
    }
}

/// Navigator that records targets instead of leaving the page.
///
/// The HTTP front turns the recorded target into a redirect response.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every target navigated to, oldest first.
    pub fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.targets().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(target.to_string());
    }
}

/// Which variant of the site a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    DefaultLanguage,
    AlternateLanguage(Language),
}

impl PageView {
    /// The view a path shows. Anything that is not an alternate page is the default view.
    pub fn from_path(path: &str) -> PageView {
        match language_from_path(path) {
            Some(language) => PageView::AlternateLanguage(language),
            None => PageView::DefaultLanguage,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            PageView::DefaultLanguage => Language::default_language(),
            PageView::AlternateLanguage(language) => *language,
        }
    }
}

/// A language-switch element on the page: a link carrying the switch class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAffordance {
    pub href: String,
}

impl SwitchAffordance {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// Target language encoded in the link: the first alternate language
    /// whose page filename appears in `href`, otherwise the default.
    pub fn target_language(&self) -> Language {
        LanguageRegistry::get()
            .alternates()
            .find(|config| self.href.contains(config.page))
            .and_then(|config| Language::from_code(config.code).ok())
            .unwrap_or_else(Language::default_language)
    }
}

/// A switch element paired with the language its activation selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBinding {
    pub element: SwitchAffordance,
    pub language: Language,
}

impl SwitchBinding {
    /// Activation handler: persist the binding's language and navigate to it.
    pub fn handle<P, S, L, N>(&self, controller: &NavigationController<P, S, L, N>) -> Activation
    where
        P: PathSource,
        S: PreferenceStore,
        L: LocaleSource,
        N: Navigator,
    {
        let target = controller.persist_and_redirect(self.language);
        Activation {
            default_prevented: true,
            language: self.language,
            target,
        }
    }
}

/// What happened when a switch element was activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The element's own navigation was suppressed in favor of ours.
    pub default_prevented: bool,
    pub language: Language,
    pub target: &'static str,
}

/// Outcome of initializing a freshly loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    /// Language redirected to by the load-time check, if any.
    pub redirected: Option<Language>,
    pub bindings: Vec<SwitchBinding>,
}

/// Redirects and switch handling on top of a [`LanguageResolver`].
#[derive(Debug)]
pub struct NavigationController<P, S, L, N> {
    resolver: LanguageResolver<P, S, L>,
    navigator: N,
}

impl<P, S, L, N> NavigationController<P, S, L, N>
where
    P: PathSource,
    S: PreferenceStore,
    L: LocaleSource,
    N: Navigator,
{
    pub fn new(resolver: LanguageResolver<P, S, L>, navigator: N) -> Self {
        Self {
            resolver,
            navigator,
        }
    }

    pub fn resolver(&self) -> &LanguageResolver<P, S, L> {
        &self.resolver
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Navigate to the page of `language`. Returns the target page.
    pub fn redirect(&self, language: Language) -> &'static str {
        let target = language.page();
        info!("Redirecting to {} ({})", target, language);
        self.navigator.navigate(target);
        target
    }

    /// Store `language` as the preference, then navigate to its page.
    ///
    /// The write completes before navigation starts. A failed write is
    /// logged and navigation still happens.
    pub fn persist_and_redirect(&self, language: Language) -> &'static str {
        match self.resolver.store().save(language.code()) {
            Ok(()) => debug!("Stored preferred language {}", language),
            Err(e) => warn!("Could not store preferred language {}: {}", language, e),
        }
        self.redirect(language)
    }

    /// Load-time check: on a landing page, send visitors who prefer a
    /// non-default language to that language's page.
    ///
    /// Returns the language redirected to, if any. The default language
    /// never triggers a redirect, so this cannot loop.
    pub fn auto_redirect_on_load(&self) -> Option<Language> {
        let path = self.resolver.current_path();
        if !is_landing_path(&path) {
            debug!("No load-time redirect for {}", path);
            return None;
        }

        let language = self.resolver.resolve_language();
        if language.is_default() {
            return None;
        }

        self.redirect(language);
        Some(language)
    }

    /// Pair every switch element with the language it selects.
    ///
    /// No elements means no bindings.
    pub fn bind_switch_affordances(&self, elements: &[SwitchAffordance]) -> Vec<SwitchBinding> {
        let bindings: Vec<SwitchBinding> = elements
            .iter()
            .map(|element| SwitchBinding {
                language: element.target_language(),
                element: element.clone(),
            })
            .collect();
        debug!("Bound {} language switch element(s)", bindings.len());
        bindings
    }

    /// Run the load-time redirect check, then bind the switch elements.
    pub fn init(&self, elements: &[SwitchAffordance]) -> PageLoad {
        let redirected = self.auto_redirect_on_load();
        PageLoad {
            redirected,
            bindings: self.bind_switch_affordances(elements),
        }
    }
}
