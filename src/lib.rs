//! Pick the language variant of a static site a visitor should see.
//!
//! The [`resolver`] combines the page path, the stored preference and the
//! browser locale; [`navigation`] redirects and wires switch links on top of
//! it; [`server`] runs both per HTTP request.

pub mod config;
pub mod i18n;
pub mod markup;
pub mod navigation;
pub mod resolver;
pub mod server;
pub mod storage;
