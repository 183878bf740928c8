//! Finding and rewriting language-switch links in page markup.
//!
//! A switch link is an `<a>` element whose `class` attribute lists the
//! switch class (e.g., `dropdown-item`) and that has an `href`.

use crate::navigation::SwitchAffordance;
use regex::Regex;
use std::sync::OnceLock;

// Regex patterns for scanning anchors (cached for performance)
static ANCHOR_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();

fn anchor_regex() -> &'static Regex {
    ANCHOR_REGEX.get_or_init(|| {
        Regex::new(r#"(?is)<a\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("anchor regex is valid")
    })
}

/// One attribute per match, consumed left to right, so a quoted value is
/// never scanned for attributes of its own.
fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .expect("attribute regex is valid")
    })
}

/// A switch link located in the markup. Offsets are absolute byte offsets of
/// the `href` value (without quotes).
struct SwitchLink {
    href: String,
    href_start: usize,
    href_end: usize,
}

fn switch_links(html: &str, class: &str) -> Vec<SwitchLink> {
    let mut links = Vec::new();

    for tag in anchor_regex().find_iter(html) {
        // Attributes sit between "<a" and the closing ">".
        let attrs_start = tag.start() + 2;
        let attrs = &html[attrs_start..tag.end() - 1];
        let mut has_class = false;
        let mut href = None;

        for caps in attribute_regex().captures_iter(attrs) {
            let Some(value) = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)) else {
                continue;
            };
            match caps[1].to_ascii_lowercase().as_str() {
                "class" => {
                    has_class = value.as_str().split_whitespace().any(|c| c == class);
                }
                "href" if href.is_none() => href = Some(value),
                _ => {}
            }
        }

        if let (true, Some(value)) = (has_class, href) {
            links.push(SwitchLink {
                href: value.as_str().to_string(),
                href_start: attrs_start + value.start(),
                href_end: attrs_start + value.end(),
            });
        }
    }

    links
}

/// Every switch link in `html`, in document order.
pub fn find_switch_affordances(html: &str, class: &str) -> Vec<SwitchAffordance> {
    switch_links(html, class)
        .into_iter()
        .map(|link| SwitchAffordance::new(link.href))
        .collect()
}

/// Replace the `href` of every switch link with `rewrite(old_href)`.
///
/// Markup outside those `href` values is left untouched.
pub fn rewrite_switch_links<F>(html: &str, class: &str, mut rewrite: F) -> String
where
    F: FnMut(&SwitchAffordance) -> String,
{
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;

    for link in switch_links(html, class) {
        out.push_str(&html[cursor..link.href_start]);
        out.push_str(&rewrite(&SwitchAffordance::new(link.href)));
        cursor = link.href_end;
    }
    out.push_str(&html[cursor..]);

    out
}
