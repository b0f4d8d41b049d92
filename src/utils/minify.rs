//! HTML minification.
//!
//! Applied to rendered pages when `[build] minify` is enabled.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Minify an HTML page if enabled in config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify_html<'a>(html: &'a [u8], config: &SiteConfig) -> Cow<'a, [u8]> {
    if config.build.minify {
        Cow::Owned(minify_html_inner(html))
    } else {
        Cow::Borrowed(html)
    }
}

/// Minify HTML content using `minify_html` crate.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_minify(enabled: bool) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.minify = enabled;
        config
    }

    #[test]
    fn test_minify_disabled_borrows() {
        let config = config_with_minify(false);
        let html = b"<p>  hello  </p>";
        let result = minify_html(html, &config);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }

    #[test]
    fn test_minify_enabled_shrinks() {
        let config = config_with_minify(true);
        let html = b"<html>\n  <body>\n    <p>hello</p>\n    <!-- note -->\n  </body>\n</html>";
        let result = minify_html(html, &config);
        assert!(result.len() < html.len());
        let text = String::from_utf8_lossy(&result);
        assert!(text.contains("hello"));
        assert!(!text.contains("note"));
    }
}
