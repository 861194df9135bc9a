//! Path table: where each asset category is read from and written to.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::config::PathsConfig;
use crate::error::ConfigError;

/// Logical asset categories handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Styles,
    Scripts,
    Images,
    Fonts,
    Assets,
    Html,
    Xml,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Styles,
        Category::Scripts,
        Category::Images,
        Category::Fonts,
        Category::Assets,
        Category::Html,
        Category::Xml,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Styles => "styles",
            Category::Scripts => "scripts",
            Category::Images => "images",
            Category::Fonts => "fonts",
            Category::Assets => "assets",
            Category::Html => "html",
            Category::Xml => "xml",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file glob relative to a category's source folder.
///
/// Supports the `glob` crate syntax plus `+(a|b)`, `@(a|b)` and `{a,b}`
/// alternation, which expand into one pattern per alternative, and the
/// `dir/**.ext` shorthand for `dir/**/*.ext`. Matching is case-sensitive
/// and `*` never crosses a `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    source: String,
    /// Literal leading directories; the walk starts here
    base: PathBuf,
    /// Walk depth below `base`; `None` when a `**` is involved
    depth: Option<usize>,
    alternatives: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl FilePattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Pattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(invalid("empty pattern"));
        }
        if segments.contains(&"..") {
            return Err(invalid("`..` is not allowed"));
        }

        let segments: Vec<String> = segments
            .into_iter()
            .map(|segment| match segment.strip_prefix("**") {
                Some(rest) if !rest.is_empty() => format!("**/*{}", rest),
                _ => segment.to_string(),
            })
            .collect();
        let normalized = segments.join("/");

        let mut base = PathBuf::new();
        for segment in &segments[..segments.len() - 1] {
            if segment.contains(['*', '?', '[', '{', '(']) {
                break;
            }
            base.push(segment);
        }

        let expanded = expand_alternatives(&normalized).map_err(invalid)?;
        let base_len = base.components().count();
        let depth = if normalized.contains("**") {
            None
        } else {
            expanded
                .iter()
                .map(|alt| alt.split('/').count().saturating_sub(base_len))
                .max()
        };
        let alternatives = expanded
            .iter()
            .map(|alt| Pattern::new(alt).map_err(|e| invalid(e.msg)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: normalized,
            base,
            depth,
            alternatives,
        })
    }

    fn matches(&self, relative: &Path) -> bool {
        self.alternatives
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }

    /// Matching files below `source_dir`, sorted by path.
    ///
    /// Hidden files and directories are skipped.
    pub fn collect(&self, source_dir: &Path) -> Vec<PathBuf> {
        let root = source_dir.join(&self.base);
        if !root.is_dir() {
            return Vec::new();
        }

        let mut walker = WalkDir::new(&root).follow_links(true);
        if let Some(depth) = self.depth {
            walker = walker.max_depth(depth);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .strip_prefix(source_dir)
                    .is_ok_and(|relative| self.matches(relative))
            })
            .map(|e| e.into_path())
            .collect();

        files.sort();
        files
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Expand the first `+(..|..)`, `@(..|..)` or `{..,..}` group, recursively.
fn expand_alternatives(pattern: &str) -> Result<Vec<String>, &'static str> {
    let group = pattern
        .find("+(")
        .or_else(|| pattern.find("@("))
        .map(|start| (start, start + 2, ')', '|'))
        .or_else(|| pattern.find('{').map(|start| (start, start + 1, '}', ',')));
    let Some((start, inner_start, close, separator)) = group else {
        return Ok(vec![pattern.to_string()]);
    };
    let Some(len) = pattern[inner_start..].find(close) else {
        return Err("unclosed alternation");
    };
    let inner = &pattern[inner_start..inner_start + len];
    if inner.contains(['(', '{']) {
        return Err("nested alternation is not supported");
    }
    let (head, tail) = (&pattern[..start], &pattern[inner_start + len + 1..]);

    let mut expanded = Vec::new();
    for alternative in inner.split(separator) {
        if alternative.is_empty() {
            return Err("empty alternative");
        }
        expanded.extend(expand_alternatives(&format!("{}{}{}", head, alternative, tail))?);
    }
    Ok(expanded)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// Source folder, output folder and pattern for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: FilePattern,
}

impl PathEntry {
    /// Files of this category, sorted by path.
    pub fn collect(&self) -> Vec<PathBuf> {
        self.pattern.collect(&self.source_dir)
    }

    /// Output location preserving the path relative to the source folder.
    pub fn mirrored(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.source_dir).unwrap_or(source);
        self.output_dir.join(relative)
    }

    /// Human readable glob, e.g. `Docs/html/**/*.+(pdf|py)`.
    pub fn glob(&self) -> String {
        format!("{}/{}", self.source_dir.display(), self.pattern)
    }
}

/// Category to location mapping, resolved against a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTable {
    site_dir: PathBuf,
    styles: PathEntry,
    scripts: PathEntry,
    images: PathEntry,
    fonts: PathEntry,
    assets: PathEntry,
    html: PathEntry,
    xml: PathEntry,
}

impl PathTable {
    pub fn from_config(config: &PathsConfig, root: &Path) -> Result<Self, ConfigError> {
        let site_dir = root.join(&config.site_dir);
        let entry = |source: &Path, folder: &Path, pattern: &str| -> Result<PathEntry, ConfigError> {
            Ok(PathEntry {
                source_dir: root.join(source),
                output_dir: site_dir.join(folder),
                pattern: FilePattern::parse(pattern)?,
            })
        };

        let table = Self {
            styles: entry(&config.styles_dir, &config.css_folder, &config.css_pattern)?,
            scripts: entry(&config.scripts_dir, &config.js_folder, &config.js_pattern)?,
            images: entry(&config.images_dir, &config.image_folder, &config.image_pattern)?,
            fonts: entry(&config.fonts_dir, &config.font_folder, &config.font_pattern)?,
            assets: entry(&config.assets_dir, &config.asset_folder, &config.asset_pattern)?,
            html: entry(&config.html_dir, Path::new(""), &config.html_pattern)?,
            xml: entry(&config.xml_dir, Path::new(""), &config.xml_pattern)?,
            site_dir,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    pub fn entry(&self, category: Category) -> &PathEntry {
        match category {
            Category::Styles => &self.styles,
            Category::Scripts => &self.scripts,
            Category::Images => &self.images,
            Category::Fonts => &self.fonts,
            Category::Assets => &self.assets,
            Category::Html => &self.html,
            Category::Xml => &self.xml,
        }
    }

    /// Every output folder must be the site folder or nested inside it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in Category::ALL {
            let output = &self.entry(category).output_dir;
            let inside = output.strip_prefix(&self.site_dir).is_ok_and(|rest| {
                rest.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            });
            if !inside {
                return Err(ConfigError::OutsideSite {
                    category: category.to_string(),
                    output: output.clone(),
                    site: self.site_dir.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn parses_and_displays_patterns() {
        for pattern in [
            "**/*.css",
            "*.js",
            "lib/**/*.js",
            "**/*.+(pdf|py)",
            "**/*.{png,gif}",
            "font-awesome/**/*.*",
            "**/*",
        ] {
            assert_eq!(FilePattern::parse(pattern).unwrap().to_string(), pattern);
        }
        assert_eq!(
            FilePattern::parse("font-awesome/**.*").unwrap().to_string(),
            "font-awesome/**/*.*"
        );
    }

    #[test]
    fn rejects_unsupported_patterns() {
        assert!(FilePattern::parse("").is_err());
        assert!(FilePattern::parse("../**/*.js").is_err());
        assert!(FilePattern::parse("**/*.+(jpg|png").is_err());
        assert!(FilePattern::parse("**/*.{a,{b,c}}").is_err());
        assert!(FilePattern::parse("**/*.[js").is_err());
    }

    #[test]
    fn expands_alternation() {
        assert_eq!(
            expand_alternatives("**/*.+(jpg|png)").unwrap(),
            vec!["**/*.jpg", "**/*.png"]
        );
        assert_eq!(
            expand_alternatives("{lib,vendor}/*.@(js|mjs)").unwrap(),
            vec!["lib/*.js", "lib/*.mjs", "vendor/*.js", "vendor/*.mjs"]
        );
    }

    #[test]
    fn matches_relative_paths() {
        let top = FilePattern::parse("*.js").unwrap();
        assert!(top.matches(Path::new("app.js")));
        assert!(!top.matches(Path::new("lib/app.js")));

        let lib = FilePattern::parse("lib/**/*.js").unwrap();
        assert!(lib.matches(Path::new("lib/a/b.js")));
        assert!(lib.matches(Path::new("lib/b.js")));
        assert!(!lib.matches(Path::new("app.js")));

        let images = FilePattern::parse("**/*.+(jpg|JPG)").unwrap();
        assert!(images.matches(Path::new("b.jpg")));
        assert!(images.matches(Path::new("a/b.JPG")));
        assert!(!images.matches(Path::new("a/b.Jpg")));
    }

    #[test]
    fn collects_sorted_and_skips_hidden() {
        let temp = tempdir().unwrap();
        let src = temp.path();
        touch(&src.join("b.js"));
        touch(&src.join("a.js"));
        touch(&src.join("lib/z.js"));
        touch(&src.join(".cache/x.js"));
        touch(&src.join("readme.md"));

        let all = FilePattern::parse("**/*.js").unwrap().collect(src);
        assert_eq!(all, vec![src.join("a.js"), src.join("b.js"), src.join("lib/z.js")]);

        let top = FilePattern::parse("*.js").unwrap().collect(src);
        assert_eq!(top, vec![src.join("a.js"), src.join("b.js")]);

        let nested = FilePattern::parse("*/*.js").unwrap().collect(src);
        assert_eq!(nested, vec![src.join("lib/z.js")]);

        let single = FilePattern::parse("lib/z.js").unwrap().collect(src);
        assert_eq!(single, vec![src.join("lib/z.js")]);

        assert!(FilePattern::parse("missing/**/*.js").unwrap().collect(src).is_empty());
    }

    #[test]
    fn default_table_nests_outputs_under_site() {
        let root = Path::new("/project");
        let table = PathTable::from_config(&PathsConfig::default(), root).unwrap();

        assert_eq!(table.site_dir(), Path::new("/project/Docs/compiled_html"));
        assert_eq!(
            table.entry(Category::Styles).output_dir,
            Path::new("/project/Docs/compiled_html/css")
        );
        assert_eq!(
            table.entry(Category::Images).glob(),
            "/project/Docs/html/**/*.+(jpg|JPG|jpeg|JPEG|png|PNG|svg|SVG|gif|GIF|webp|WEBP|tif|TIF)"
        );
        assert_eq!(
            table.entry(Category::Assets).glob(),
            "/project/Docs/html/**/*.+(pdf|py)"
        );
        for category in Category::ALL {
            assert!(table.entry(category).output_dir.starts_with(table.site_dir()));
        }
    }

    #[test]
    fn rejects_outputs_escaping_site() {
        let config = PathsConfig {
            js_folder: PathBuf::from("../js"),
            ..PathsConfig::default()
        };
        let err = PathTable::from_config(&config, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::OutsideSite { .. }));
    }

    #[test]
    fn mirrors_relative_paths() {
        let table = PathTable::from_config(&PathsConfig::default(), Path::new("/p")).unwrap();
        let images = table.entry(Category::Images);
        assert_eq!(
            images.mirrored(Path::new("/p/Docs/html/img/a.png")),
            Path::new("/p/Docs/compiled_html/img/a.png")
        );
    }
}
