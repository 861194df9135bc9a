//! HTML assembly: sub-resource inlining and whitespace collapsing.
//!
//! An element opts into inlining with a boolean `inline` attribute:
//!
//! ```html
//! <link rel="stylesheet" href="/compiled_critical.css" inline>
//! <script src="nav.js" inline></script>
//! <img src="logo.svg" class="logo" inline>
//! ```
//!
//! Root-relative references resolve against the inliner root, everything
//! else against the directory of the page being processed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::{Captures, Regex};

use crate::css::minify_css;
use crate::js::minify_js;

/// Result of inlining one page.
#[derive(Debug, Default)]
pub struct Inlined {
    /// Rewritten markup
    pub html: String,

    /// Number of elements replaced by their resource
    pub inlined: usize,

    /// Referenced files that could not be read
    pub missing: Vec<PathBuf>,

    /// Scripts and stylesheets inlined as-is because minification failed
    pub unminified: Vec<PathBuf>,
}

/// Replaces `inline`-marked references with the referenced content.
#[derive(Debug, Clone)]
pub struct Inliner {
    root: PathBuf,
    minify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Script,
    Link,
    Img,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attr {
    name: String,
    value: Option<String>,
}

impl Inliner {
    /// Create an inliner resolving root-relative references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            minify: true,
        }
    }

    /// Whether inlined scripts and stylesheets are minified.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Inline all marked resources in `html`, a page living in `page_dir`.
    pub fn inline(&self, html: &str, page_dir: &Path) -> Inlined {
        static TAG: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?is)<script\b([^>]*)>\s*</script\s*>|<link\b([^>]*)>|<img\b([^>]*)>")
                .expect("Invalid inline tag regex")
        });

        let mut inlined = 0;
        let mut missing = Vec::new();
        let mut unminified = Vec::new();

        let html = TAG
            .replace_all(html, |caps: &Captures| {
                let raw = &caps[0];
                let (kind, attrs) = if let Some(m) = caps.get(1) {
                    (TagKind::Script, m.as_str())
                } else if let Some(m) = caps.get(2) {
                    (TagKind::Link, m.as_str())
                } else if let Some(m) = caps.get(3) {
                    (TagKind::Img, m.as_str())
                } else {
                    return raw.to_string();
                };

                match self.inline_tag(kind, attrs, page_dir, &mut unminified) {
                    Ok(Some(replacement)) => {
                        inlined += 1;
                        replacement
                    }
                    Ok(None) => raw.to_string(),
                    Err(path) => {
                        tracing::debug!("Cannot inline {}: file not readable", path.display());
                        missing.push(path);
                        raw.to_string()
                    }
                }
            })
            .into_owned();

        Inlined {
            html,
            inlined,
            missing,
            unminified,
        }
    }

    /// Returns `Ok(None)` for tags that are not inlining candidates and
    /// `Err(path)` when the referenced file cannot be read.
    fn inline_tag(
        &self,
        kind: TagKind,
        attr_source: &str,
        page_dir: &Path,
        unminified: &mut Vec<PathBuf>,
    ) -> Result<Option<String>, PathBuf> {
        let attrs = parse_attrs(attr_source);
        if !attrs.iter().any(|a| a.name == "inline") {
            return Ok(None);
        }

        let reference_attr = match kind {
            TagKind::Script | TagKind::Img => "src",
            TagKind::Link => "href",
        };
        let Some(reference) = attr_value(&attrs, reference_attr) else {
            return Ok(None);
        };
        if kind == TagKind::Link
            && !attr_value(&attrs, "rel").is_some_and(|r| r.eq_ignore_ascii_case("stylesheet"))
        {
            return Ok(None);
        }
        let Some(path) = self.resolve(reference, page_dir) else {
            return Ok(None);
        };

        let rest: Vec<&Attr> = attrs
            .iter()
            .filter(|a| a.name != "inline" && a.name != reference_attr)
            .collect();

        let replacement = match kind {
            TagKind::Script => {
                let source = fs::read_to_string(&path).map_err(|_| path.clone())?;
                let source = if self.minify {
                    match minify_js(&source) {
                        Ok(minified) => minified,
                        Err(e) => {
                            tracing::debug!("Inlining {} unminified: {}", path.display(), e);
                            unminified.push(path.clone());
                            source
                        }
                    }
                } else {
                    source
                };
                format!("<script{}>{}</script>", render_attrs(&rest), source.trim_end())
            }
            TagKind::Link => {
                let source = fs::read_to_string(&path).map_err(|_| path.clone())?;
                let source = if self.minify {
                    match minify_css(&source) {
                        Ok(minified) => minified,
                        Err(e) => {
                            tracing::debug!("Inlining {} unminified: {}", path.display(), e);
                            unminified.push(path.clone());
                            source
                        }
                    }
                } else {
                    source
                };
                let rest: Vec<&Attr> = rest
                    .into_iter()
                    .filter(|a| a.name != "rel" && a.name != "type")
                    .collect();
                format!("<style{}>{}</style>", render_attrs(&rest), source.trim_end())
            }
            TagKind::Img if has_extension(&path, "svg") => {
                let source = fs::read_to_string(&path).map_err(|_| path.clone())?;
                let rest: Vec<&Attr> = rest.into_iter().filter(|a| a.name != "alt").collect();
                inline_svg(&source, &rest)
            }
            TagKind::Img => {
                let bytes = fs::read(&path).map_err(|_| path.clone())?;
                format!(
                    "<img{} src=\"data:{};base64,{}\">",
                    render_attrs(&rest),
                    mime_type(&path),
                    STANDARD.encode(bytes)
                )
            }
        };

        Ok(Some(replacement))
    }

    /// Map a reference to a local path; remote and data URLs map to `None`.
    fn resolve(&self, reference: &str, page_dir: &Path) -> Option<PathBuf> {
        if reference.starts_with("//")
            || reference.contains("://")
            || reference.starts_with("data:")
        {
            return None;
        }
        let clean = reference.split(['?', '#']).next().unwrap_or(reference);
        if clean.is_empty() {
            return None;
        }
        match clean.strip_prefix('/') {
            Some(rooted) => Some(self.root.join(rooted)),
            None => Some(page_dir.join(clean)),
        }
    }
}

fn parse_attrs(source: &str) -> Vec<Attr> {
    static ATTR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Invalid attribute regex")
    });

    ATTR.captures_iter(source)
        .map(|c| Attr {
            name: c[1].to_lowercase(),
            value: c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str().to_string()),
        })
        .collect()
}

fn attr_value<'a>(attrs: &'a [Attr], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name == name)
        .and_then(|a| a.value.as_deref())
}

fn render_attrs(attrs: &[&Attr]) -> String {
    let mut out = String::new();
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out
}

/// SVG markup without its XML prolog, carrying over the `img` attributes.
fn inline_svg(source: &str, attrs: &[&Attr]) -> String {
    static PROLOG: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)^\s*(?:<\?xml.*?\?>\s*)?(?:<!--.*?-->\s*)*(?:<!DOCTYPE[^>]*>\s*)?")
            .expect("Invalid prolog regex")
    });

    let body = PROLOG.replace(source, "");
    let body = body.trim_end();
    match body.find("<svg") {
        Some(pos) if !attrs.is_empty() => {
            let insert_at = pos + "<svg".len();
            format!("{}{}{}", &body[..insert_at], render_attrs(attrs), &body[insert_at..])
        }
        _ => body.to_string(),
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Collapse insignificant whitespace.
///
/// Whitespace runs in text become a single space and indentation between
/// block elements disappears. Contents of `pre`, `textarea`, `script` and
/// `style` are kept byte for byte, as are comments.
pub fn collapse_whitespace(html: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = true;
    cfg.minify_css = false;
    cfg.minify_js = false;
    cfg.remove_bangs = false;
    cfg.remove_processing_instructions = false;
    let minified = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8_lossy(&minified).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn collapses_whitespace_between_blocks() {
        let html = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Docs</title>\n  </head>\n  <body>\n    <p>Hello   <b>big</b>   world</p>\n    <pre>  keep\n   this </pre>\n  </body>\n</html>\n";

        let out = collapse_whitespace(html);

        assert!(out.contains("<p>Hello <b>big</b> world</p>"));
        assert!(out.contains("<pre>  keep\n   this </pre>"));
        assert!(out.contains("<html><head><title>Docs</title>"));
        assert!(!out.contains(">\n  <"));
    }

    #[test]
    fn comments_do_not_join_words() {
        let out = collapse_whitespace("<p>Hello <!-- note --> world</p>");

        assert!(out.contains("<!-- note -->"));
        let text = out.replace("<!-- note -->", "");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, ["<p>Hello", "world</p>"]);
    }

    #[test]
    fn preserves_script_and_style_bodies() {
        let html = "<div>\n<script>\n  var a = 1;\n\n  var b = 2;\n</script>\n<style>\n a { color: red }\n</style>\n</div>";
        let out = collapse_whitespace(html);
        assert!(out.contains("<script>\n  var a = 1;\n\n  var b = 2;\n</script>"));
        assert!(out.contains("<style>\n a { color: red }\n</style>"));
    }

    #[test]
    fn inlines_stylesheet_and_script() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/critical.css"), "body {\n  margin: 0;\n}\n").unwrap();
        fs::write(root.join("nav.js"), "var open = true;\n").unwrap();

        let html = r#"<head><link rel="stylesheet" href="/css/critical.css" inline><script src="nav.js" inline></script><link rel="stylesheet" href="other.css"></head>"#;
        let out = Inliner::new(root).inline(html, root);

        assert_eq!(out.inlined, 2);
        assert!(out.missing.is_empty());
        assert!(out.html.contains("<style>body{margin:0}</style>"));
        assert!(out.html.contains("<script>"));
        assert!(!out.html.contains("nav.js"));
        assert!(out.html.contains(r#"<link rel="stylesheet" href="other.css">"#));
    }

    #[test]
    fn inlines_svg_with_attributes() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("logo.svg"),
            "<?xml version=\"1.0\"?>\n<svg viewBox=\"0 0 1 1\"></svg>\n",
        )
        .unwrap();

        let out = Inliner::new(temp.path()).inline(
            r#"<img src="logo.svg" class="logo" alt="Logo" inline>"#,
            temp.path(),
        );

        assert_eq!(out.html, r#"<svg class="logo" viewBox="0 0 1 1"></svg>"#);
    }

    #[test]
    fn inlines_raster_as_data_uri() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("dot.png"), [1u8, 2, 3]).unwrap();

        let out = Inliner::new(temp.path())
            .inline(r#"<img src="dot.png" alt="dot" inline />"#, temp.path());

        assert_eq!(out.html, r#"<img alt="dot" src="data:image/png;base64,AQID">"#);
    }

    #[test]
    fn leaves_missing_and_remote_references() {
        let temp = tempdir().unwrap();
        let html = r#"<script src="missing.js" inline></script><script src="https://cdn.example.com/x.js" inline></script>"#;

        let out = Inliner::new(temp.path()).inline(html, temp.path());

        assert_eq!(out.html, html);
        assert_eq!(out.inlined, 0);
        assert_eq!(out.missing, vec![temp.path().join("missing.js")]);
    }

    #[test]
    fn records_resources_that_fail_to_minify() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("broken.js"), "function (").unwrap();

        let out = Inliner::new(temp.path())
            .inline(r#"<script src="broken.js" inline></script>"#, temp.path());

        assert_eq!(out.inlined, 1);
        assert_eq!(out.html, "<script>function (</script>");
        assert_eq!(out.unminified, vec![temp.path().join("broken.js")]);
    }
}
