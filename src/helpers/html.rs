//! HTML helper functions

use super::url::is_safe_url;

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an anchor tag, or just the escaped text when the URL is unsafe
///
/// `inner` must already be escaped markup.
pub fn link_to(href: &str, inner: &str, new_tab: bool) -> String {
    if !is_safe_url(href) {
        return inner.to_string();
    }

    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            html_escape(href),
            inner
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner)
    }
}

/// Generate an image tag; unsafe sources produce nothing
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    if !is_safe_url(src) {
        return String::new();
    }

    format!(
        r#"<img src="{}" alt="{}">"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}
