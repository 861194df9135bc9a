//! Content transforms for the sitewright asset pipeline.
//!
//! Each module works on in-memory content so the pipeline crate can decide
//! where files come from and where results go.

pub mod css;
pub mod error;
pub mod fonts;
pub mod html;
pub mod imaging;
pub mod js;

pub use css::{minify_css, StyleProcessor, DEFAULT_BROWSERS};
pub use error::AssetError;
pub use fonts::{FontFamily, FontRewriter, DEFAULT_FONT_SERVICE};
pub use html::{collapse_whitespace, Inlined, Inliner};
pub use imaging::{is_jpeg, optimize_image, ImageAction, OptimizedImage, DEFAULT_JPEG_QUALITY};
pub use js::{concat_scripts, minify_js};
