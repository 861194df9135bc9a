//! Pipeline configuration (`sitewright.toml`).
//!
//! Every field has a default matching the documentation site layout, so an
//! empty file (or no file at all) builds the standard pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sitewright_assets::{FontFamily, DEFAULT_BROWSERS, DEFAULT_FONT_SERVICE, DEFAULT_JPEG_QUALITY};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub images: ImagesConfig,
    pub html: HtmlConfig,
    pub docs: DocsConfig,
    pub update: UpdateConfig,
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Source and output locations, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The resulting static site
    pub site_dir: PathBuf,

    pub styles_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub fonts_dir: PathBuf,

    /// Pages emitted by the documentation renderer
    pub html_dir: PathBuf,

    /// Structured output of the documentation extractor
    pub xml_dir: PathBuf,

    /// Output folders inside the site directory
    pub css_folder: PathBuf,
    pub js_folder: PathBuf,
    pub image_folder: PathBuf,
    pub asset_folder: PathBuf,
    pub font_folder: PathBuf,

    pub css_pattern: String,
    pub js_pattern: String,
    pub image_pattern: String,
    pub asset_pattern: String,
    pub font_pattern: String,
    pub html_pattern: String,
    pub xml_pattern: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("Docs/compiled_html"),
            styles_dir: PathBuf::from("Docs/html"),
            scripts_dir: PathBuf::from("Docs/html"),
            images_dir: PathBuf::from("Docs/html"),
            assets_dir: PathBuf::from("Docs/html"),
            fonts_dir: PathBuf::from("fonts"),
            html_dir: PathBuf::from("Docs/html"),
            xml_dir: PathBuf::from("Docs/xml"),
            css_folder: PathBuf::from("css"),
            js_folder: PathBuf::from("js"),
            image_folder: PathBuf::new(),
            asset_folder: PathBuf::new(),
            font_folder: PathBuf::from("fonts"),
            css_pattern: "**/*.css".to_string(),
            js_pattern: "**/*.js".to_string(),
            image_pattern:
                "**/*.+(jpg|JPG|jpeg|JPEG|png|PNG|svg|SVG|gif|GIF|webp|WEBP|tif|TIF)".to_string(),
            asset_pattern: "**/*.+(pdf|py)".to_string(),
            font_pattern: "font-awesome/**/*.*".to_string(),
            html_pattern: "**/*.html".to_string(),
            xml_pattern: "**/*.xml".to_string(),
        }
    }
}

/// Stylesheet build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Browserslist query used for vendor prefixing
    pub browsers: Vec<String>,

    /// Primary stylesheet, written to the site CSS folder
    pub main: String,

    /// Critical stylesheet, compiled back into the styles source folder
    pub critical: String,
    pub critical_output: String,

    pub font_service: String,
    pub fonts: Vec<FontFamily>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            browsers: vec![DEFAULT_BROWSERS.to_string()],
            main: "style.css".to_string(),
            critical: "critical.css".to_string(),
            critical_output: "compiled_critical.css".to_string(),
            font_service: DEFAULT_FONT_SERVICE.to_string(),
            fonts: FontFamily::defaults(),
        }
    }
}

/// Script bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub bundles: Vec<BundleConfig>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            bundles: vec![BundleConfig {
                name: "script.js".to_string(),
                sources: vec!["lib/**/*.js".to_string(), "*.js".to_string()],
            }],
        }
    }
}

/// One output bundle: source patterns (relative to the scripts folder) are
/// concatenated in order into `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    pub name: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Minify scripts and stylesheets as they are inlined
    pub minify_inline: bool,
    pub collapse_whitespace: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            minify_inline: true,
            collapse_whitespace: true,
        }
    }
}

/// External documentation generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Produces the intermediate XML
    pub extractor: CommandSpec,
    /// Renders the XML into HTML pages
    pub renderer: CommandSpec,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            extractor: CommandSpec::new("doxygen", &["Doxyfile"]),
            renderer: CommandSpec::new("python", &["make_docs.py"]),
        }
    }
}

/// Dependency lockfile refresh, run by `sitewright update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub commands: Vec<CommandSpec>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            commands: vec![
                CommandSpec::new("bundle", &["install"]),
                CommandSpec::new("bundle", &["update"]),
            ],
        }
    }
}

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            enabled: true,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.images.jpeg_quality, 70);
        assert_eq!(config.styles.browsers, vec!["last 2 versions".to_string()]);
        assert_eq!(config.docs.extractor.to_string(), "doxygen Doxyfile");
    }

    #[test]
    fn overrides_selected_fields() {
        let config = PipelineConfig::from_toml_str(
            r#"
[paths]
site_dir = "public"

[docs.renderer]
program = "python3"
args = ["tools/render.py"]

[[scripts.bundles]]
name = "script.js"
sources = ["lib/**/*.js", "*.js"]

[[scripts.bundles]]
name = "leaflet.js"
sources = ["vendor/leaflet/*.js"]
"#,
        )
        .unwrap();

        assert_eq!(config.paths.site_dir, PathBuf::from("public"));
        assert_eq!(config.paths.css_folder, PathBuf::from("css"));
        assert_eq!(config.docs.renderer.to_string(), "python3 tools/render.py");
        assert!(config.docs.renderer.enabled);
        assert_eq!(config.scripts.bundles.len(), 2);
        assert_eq!(config.scripts.bundles[1].name, "leaflet.js");
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = PipelineConfig::from_toml_str("[paths\nsite_dir = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
