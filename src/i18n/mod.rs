//! Languages the site is published in.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages, the default, and their pages
//! - `language`: Validated `Language` type built from the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use site_lang::i18n::{Language, LanguageRegistry};
//!
//! let default = Language::default_language();
//! let french = Language::from_code("fr")?;
//! assert_eq!(french.page(), "index-fr.html");
//! ```

mod language;
mod registry;

pub use language::{Language, LanguageError};
pub use registry::{LanguageConfig, LanguageRegistry};
