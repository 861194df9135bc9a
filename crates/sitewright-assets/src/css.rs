//! Stylesheet processing with lightningcss.
//!
//! Vendor prefixes are added while minifying the parsed sheet against a set
//! of browser targets, so prefixing and minification happen in one pass.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::error::AssetError;

/// Browser support query applied when no other is configured.
pub const DEFAULT_BROWSERS: &str = "last 2 versions";

/// Prefixes and minifies stylesheets for a fixed browser target.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleProcessor {
    targets: Targets,
}

impl StyleProcessor {
    /// Create a processor for a browserslist query, e.g. `["last 2 versions"]`.
    pub fn new<S: AsRef<str>>(query: &[S]) -> Result<Self, AssetError> {
        let browsers = Browsers::from_browserslist(query.iter().map(|q| q.as_ref()))
            .map_err(|e| AssetError::Browserslist(e.to_string()))?;

        Ok(Self {
            targets: Targets {
                browsers,
                ..Targets::default()
            },
        })
    }

    /// Add vendor prefixes for the configured targets and print the result.
    pub fn process(&self, css: &str, minify: bool) -> Result<String, AssetError> {
        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| AssetError::CssParse(e.to_string()))?;

        stylesheet
            .minify(MinifyOptions {
                targets: self.targets,
                ..Default::default()
            })
            .map_err(|e| AssetError::CssMinify(e.to_string()))?;

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify,
                targets: self.targets,
                ..Default::default()
            })
            .map_err(|e| AssetError::CssMinify(e.to_string()))?;

        Ok(printed.code)
    }
}

/// Minify CSS without any browser targets.
pub fn minify_css(css: &str) -> Result<String, AssetError> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| AssetError::CssParse(e.to_string()))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| AssetError::CssMinify(e.to_string()))?;

    Ok(minified.code)
}
