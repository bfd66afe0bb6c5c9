use minify_html::Cfg;

use super::HtmlMinifier;
use crate::error::ToolError;

/// HTML minifier backed by `minify-html`.
pub struct MinifyHtml {
    cfg: Cfg,
}

impl Default for MinifyHtml {
    fn default() -> Self {
        let mut cfg = Cfg::new();
        // Inline styles are safe to squeeze, inline scripts are left alone.
        cfg.minify_css = true;
        cfg.minify_js = false;
        cfg.do_not_minify_doctype = true;
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.ensure_spec_compliant_unquoted_attribute_values = true;

        Self { cfg }
    }
}

impl HtmlMinifier for MinifyHtml {
    fn minify(&self, html: &[u8]) -> Result<Vec<u8>, ToolError> {
        Ok(minify_html::minify(html, &self.cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_drops_whitespace_and_comments() {
        let html = b"<!DOCTYPE html>\n<html>\n  <head>\n    <title> Hi </title>\n  </head>\n  <body>\n    <!-- note -->\n    <p>Hello</p>\n  </body>\n</html>\n";

        let out = MinifyHtml::default().minify(html).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.len() < html.len());
        assert!(out.contains("<p>Hello</p>"));
        assert!(!out.contains("note"));
    }
}
