//! Web font resolution for the critical stylesheet.
//!
//! Families referenced by `font-family` or `font` declarations are resolved
//! against a configured set of variants and turned into a single font
//! service `@import`, so the critical path does not need a separate font
//! stylesheet.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Font service stylesheet endpoint.
pub const DEFAULT_FONT_SERVICE: &str = "https://fonts.googleapis.com/css";

/// A font family and the weight/style variants to request for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFamily {
    /// Family name as written in stylesheets (e.g. "Source Sans Pro")
    pub family: String,

    /// Variants in service notation: "400", "400i", "700"
    pub variants: Vec<String>,
}

impl FontFamily {
    pub fn new(family: &str, variants: &[&str]) -> Self {
        Self {
            family: family.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Families requested by the documentation theme.
    pub fn defaults() -> Vec<FontFamily> {
        vec![
            FontFamily::new("Source Sans Pro", &["300", "400", "400i", "700"]),
            FontFamily::new("Anonymous Pro", &["400", "700"]),
        ]
    }

    fn query_fragment(&self) -> String {
        let name = self.family.split_whitespace().collect::<Vec<_>>().join("+");
        if self.variants.is_empty() {
            name
        } else {
            format!("{}:{}", name, self.variants.join(","))
        }
    }
}

/// Rewrites stylesheets so referenced web fonts load from the font service.
#[derive(Debug, Clone)]
pub struct FontRewriter {
    service: String,
    families: Vec<FontFamily>,
}

impl FontRewriter {
    pub fn new(service: impl Into<String>, families: Vec<FontFamily>) -> Self {
        Self {
            service: service.into(),
            families,
        }
    }

    /// Families from the configured set that the stylesheet actually uses
    /// and does not already declare through a local `@font-face`.
    pub fn referenced<'a>(&'a self, css: &str) -> Vec<&'a FontFamily> {
        static FONT_FACE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?is)@font-face\s*\{[^}]*\}").expect("Invalid font-face regex")
        });
        static FONT_DECL: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)(?:^|[;{\s])font(?:-family)?\s*:\s*([^;}]+)")
                .expect("Invalid font declaration regex")
        });

        let declared: HashSet<String> = FONT_FACE
            .find_iter(css)
            .flat_map(|m| family_names(m.as_str()))
            .collect();

        let without_faces = FONT_FACE.replace_all(css, "");
        let used: HashSet<String> = FONT_DECL
            .captures_iter(&without_faces)
            .filter_map(|c| c.get(1))
            .flat_map(|m| split_family_list(m.as_str()))
            .collect();

        self.families
            .iter()
            .filter(|f| {
                let key = f.family.to_lowercase();
                used.contains(&key) && !declared.contains(&key)
            })
            .collect()
    }

    /// Build the service URL for a set of families, or `None` if empty.
    pub fn service_url(&self, families: &[&FontFamily]) -> Option<String> {
        if families.is_empty() {
            return None;
        }
        let query = families
            .iter()
            .map(|f| f.query_fragment())
            .collect::<Vec<_>>()
            .join("|");
        Some(format!("{}?family={}&display=swap", self.service, query))
    }

    /// Prepend the font service import, keeping any `@charset` rule first.
    pub fn rewrite(&self, css: &str) -> String {
        let referenced = self.referenced(css);
        let Some(url) = self.service_url(&referenced) else {
            return css.to_string();
        };

        tracing::debug!(
            "Resolved {} web font famil{} to {}",
            referenced.len(),
            if referenced.len() == 1 { "y" } else { "ies" },
            url
        );

        let import = format!("@import url(\"{}\");\n", url);
        let trimmed = css.trim_start();
        if trimmed.starts_with("@charset") {
            if let Some(end) = trimmed.find(';') {
                let (charset, rest) = trimmed.split_at(end + 1);
                return format!("{}\n{}{}", charset, import, rest);
            }
        }
        format!("{}{}", import, css)
    }
}

impl Default for FontRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SERVICE, FontFamily::defaults())
    }
}

/// Family names declared inside a `@font-face` block, lowercased.
fn family_names(block: &str) -> Vec<String> {
    static FAMILY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)font-family\s*:\s*([^;}]+)").expect("Invalid family regex")
    });
    FAMILY
        .captures_iter(block)
        .filter_map(|c| c.get(1))
        .flat_map(|m| split_family_list(m.as_str()))
        .collect()
}

/// Split a `font-family` (or `font` shorthand) value into lowercase names.
///
/// For the shorthand, the size/weight tokens before the family list end up
/// glued to the first name; matching against configured families tolerates
/// that by also trying the trailing words of each entry.
fn split_family_list(value: &str) -> Vec<String> {
    let mut names = Vec::new();
    for entry in value.split(',') {
        let entry = entry.trim().trim_end_matches("!important").trim();
        if let Some(quoted) = quoted_name(entry) {
            names.push(quoted.to_lowercase());
            continue;
        }
        let words: Vec<&str> = entry.split_whitespace().collect();
        for start in 0..words.len() {
            names.push(words[start..].join(" ").to_lowercase());
        }
    }
    names
}

fn quoted_name(entry: &str) -> Option<&str> {
    let start = entry.find(['"', '\''])?;
    let quote = entry[start..].chars().next()?;
    let rest = &entry[start + 1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_service_url_for_referenced_families() {
        let rewriter = FontRewriter::default();
        let css = "body { font-family: 'Source Sans Pro', sans-serif; }\n\
                   code { font-family: \"Anonymous Pro\", monospace; }";

        let out = rewriter.rewrite(css);

        assert_eq!(
            out.lines().next().unwrap(),
            "@import url(\"https://fonts.googleapis.com/css?family=Source+Sans+Pro:300,400,400i,700|Anonymous+Pro:400,700&display=swap\");"
        );
        assert!(out.ends_with(css));
    }

    #[test]
    fn only_requests_used_families() {
        let rewriter = FontRewriter::default();
        let out = rewriter.rewrite("pre { font: 400 14px/1.2 Anonymous Pro, monospace; }");
        assert!(out.contains("family=Anonymous+Pro:400,700&"));
        assert!(!out.contains("Source+Sans+Pro"));
    }

    #[test]
    fn leaves_sheet_without_known_fonts_untouched() {
        let rewriter = FontRewriter::default();
        let css = "body { font-family: Georgia, serif; }";
        assert_eq!(rewriter.rewrite(css), css);
    }

    #[test]
    fn skips_families_with_local_font_face() {
        let rewriter = FontRewriter::default();
        let css = "@font-face { font-family: 'Anonymous Pro'; src: url(anon.woff2); }\n\
                   code { font-family: 'Anonymous Pro'; }";
        assert_eq!(rewriter.rewrite(css), css);
    }

    #[test]
    fn keeps_charset_first() {
        let rewriter = FontRewriter::default();
        let out = rewriter.rewrite("@charset \"utf-8\";\nbody{font-family:Source Sans Pro}");
        assert!(out.starts_with("@charset \"utf-8\";\n@import url("));
    }
}
