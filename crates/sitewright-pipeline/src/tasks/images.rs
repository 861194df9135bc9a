//! Image optimization into the site image folder.

use std::path::Path;

use rayon::prelude::*;
use sitewright_assets::{optimize_image, ImageAction};

use crate::graph::TaskId;
use crate::paths::Category;
use crate::tasks::{copy_file, read_file, write_file, StepError, TaskContext, TaskReport};

enum Outcome {
    Written(ImageAction),
    /// Optimization failed; the original was copied instead
    Fallback(String),
    Failed(String),
}

/// Optimize every matched image, mirroring the source layout.
pub fn build_images(ctx: &TaskContext) -> TaskReport {
    let mut report = TaskReport::new(TaskId::Images);
    let entry = ctx.paths.entry(Category::Images);
    let quality = ctx.config.images.jpeg_quality;
    let files = entry.collect();

    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|source| {
            let output = entry.mirrored(source);
            match optimize_one(source, &output, quality) {
                Ok(action) => Outcome::Written(action),
                Err(OptimizeFailure::Transform(e)) => match copy_file(source, &output) {
                    Ok(()) => Outcome::Fallback(format!(
                        "{}: {}; copied unchanged",
                        source.display(),
                        e
                    )),
                    Err(copy_err) => Outcome::Failed(copy_err.to_string()),
                },
                Err(OptimizeFailure::Io(e)) => Outcome::Failed(e.to_string()),
            }
        })
        .collect();

    let mut recompressed = 0;
    for outcome in outcomes {
        match outcome {
            Outcome::Written(action) => {
                if action == ImageAction::Recompressed {
                    recompressed += 1;
                }
                report.files_written += 1;
            }
            Outcome::Fallback(message) => {
                report.files_written += 1;
                report.warn(message);
            }
            Outcome::Failed(message) => report.warn(message),
        }
    }

    tracing::info!(
        "Wrote {} image(s), {} recompressed",
        report.files_written,
        recompressed
    );
    report
}

enum OptimizeFailure {
    Transform(sitewright_assets::AssetError),
    Io(StepError),
}

fn optimize_one(source: &Path, output: &Path, quality: u8) -> Result<ImageAction, OptimizeFailure> {
    let bytes = read_file(source).map_err(OptimizeFailure::Io)?;
    let optimized = optimize_image(source, bytes, quality).map_err(OptimizeFailure::Transform)?;
    write_file(output, &optimized.bytes).map_err(OptimizeFailure::Io)?;
    Ok(optimized.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{context, write};
    use std::fs;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ImageEncoder, RgbImage};
    use tempfile::tempdir;

    fn jpeg(quality: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(48, 48, |x, y| {
            image::Rgb([(x * 5) as u8, (y * 5) as u8, ((x * y) % 256) as u8])
        });
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality)
            .write_image(img.as_raw(), 48, 48, image::ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn every_image_lands_at_its_mirrored_path() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let html = root.join("Docs/html");
        fs::create_dir_all(html.join("figures")).unwrap();
        fs::write(html.join("figures/photo.jpg"), jpeg(100)).unwrap();
        write(&html.join("icons/logo.svg"), "<svg/>");
        write(&html.join("diagram.PNG"), "png bytes");
        write(&html.join("notes.txt"), "not an image");

        let report = build_images(&context(root));

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.files_written, 3);
        let site = root.join("Docs/compiled_html");
        assert!(site.join("figures/photo.jpg").exists());
        assert!(site.join("icons/logo.svg").exists());
        assert!(site.join("diagram.PNG").exists());
        assert!(!site.join("notes.txt").exists());
        assert_eq!(
            fs::read_to_string(site.join("icons/logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn corrupt_jpeg_is_copied_with_a_warning() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(&root.join("Docs/html/broken.jpg"), "not really a jpeg");

        let report = build_images(&context(root));

        assert_eq!(report.files_written, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("copied unchanged"));
        assert_eq!(
            fs::read_to_string(root.join("Docs/compiled_html/broken.jpg")).unwrap(),
            "not really a jpeg"
        );
    }
}
