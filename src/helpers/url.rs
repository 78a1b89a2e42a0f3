//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encode a single URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// URL of a post detail page
///
/// # Examples
/// ```ignore
/// post_url("como-utilizar-hooks") // -> "/post/como-utilizar-hooks/"
/// ```
pub fn post_url(uid: &str) -> String {
    format!("/post/{}/", encode_segment(uid))
}

/// URL of the listing after `pages` pages have been loaded
///
/// Page 1 is the site root.
pub fn listing_url(pages: u32) -> String {
    if pages <= 1 {
        "/".to_string()
    } else {
        format!("/page/{}/", pages)
    }
}

/// Whether a URL may be placed in an `href`/`src` attribute
///
/// Only http(s), mailto and scheme-less (relative) URLs pass.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    match url.split_once(':') {
        Some((scheme, _)) if !scheme.contains('/') => {
            let scheme = scheme.to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(post_url("hello-world"), "/post/hello-world/");
        assert_eq!(post_url("a b/c"), "/post/a%20b%2Fc/");
        assert_eq!(post_url("café"), "/post/caf%C3%A9/");
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(listing_url(0), "/");
        assert_eq!(listing_url(1), "/");
        assert_eq!(listing_url(3), "/page/3/");
    }

    #[test]
    fn test_is_safe_url() {
        assert!(is_safe_url("https://images.prismic.io/banner.png"));
        assert!(is_safe_url("HTTP://example.com"));
        assert!(is_safe_url("mailto:me@example.com"));
        assert!(is_safe_url("/post/other/"));
        assert!(is_safe_url("images/a:b.png"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url(" JavaScript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,AAAA"));
        assert!(!is_safe_url(""));
    }
}
