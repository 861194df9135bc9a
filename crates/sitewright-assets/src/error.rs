//! Error type shared by all asset transforms.

/// Errors that can occur while transforming an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Invalid browserslist query: {0}")]
    Browserslist(String),

    #[error("CSS parse error: {0}")]
    CssParse(String),

    #[error("CSS minify error: {0}")]
    CssMinify(String),

    #[error("JavaScript parse error: {0}")]
    JsParse(String),

    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
