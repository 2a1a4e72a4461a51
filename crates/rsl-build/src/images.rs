//! Rendered-image post-processing
//!
//! The renderer writes its raw output (usually TIFF) next to the scene file.
//! This stage moves it into the configured images folder in the configured
//! format, optionally archiving the previous render, and removes the raw
//! intermediate. The build has already succeeded by the time this runs;
//! callers treat failures here as warnings.

use chrono::Local;
use rsl_config::ImageSettings;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to decode {path}: {error}")]
    Decode {
        path: PathBuf,
        error: image::ImageError,
    },

    #[error("Failed to write {path}: {error}")]
    Encode {
        path: PathBuf,
        error: image::ImageError,
    },

    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Local-time stamp used in history file names ("2026-08-07 14-03-59")
fn local_stamp() -> String {
    Local::now().format("%Y-%m-%d %H-%M-%S").to_string()
}

/// Convert the raw render into its final location and format.
///
/// With `timestamp` set, every output carries a local-time stamp and history
/// accumulates naturally. With `keep_history` set and no stamp, an existing
/// output is renamed to a stamped name before being replaced. The raw
/// intermediate is deleted once the conversion lands.
pub fn convert_rendered_image(
    raw: &Path,
    images_dir: &Path,
    settings: &ImageSettings,
) -> Result<PathBuf, ImageError> {
    let stem = raw
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());

    let file_name = if settings.timestamp {
        format!("{} {}.{}", stem, local_stamp(), settings.format)
    } else {
        format!("{}.{}", stem, settings.format)
    };
    let dest = images_dir.join(file_name);

    std::fs::create_dir_all(images_dir).map_err(|e| ImageError::Io {
        path: images_dir.to_path_buf(),
        error: e,
    })?;

    if settings.keep_history && !settings.timestamp && dest.exists() {
        let archived = images_dir.join(format!("{} {}.{}", stem, local_stamp(), settings.format));
        std::fs::rename(&dest, &archived).map_err(|e| ImageError::Io {
            path: dest.clone(),
            error: e,
        })?;
        log::info!("archived previous render to {}", archived.display());
    }

    let decoded = image::open(raw).map_err(|e| ImageError::Decode {
        path: raw.to_path_buf(),
        error: e,
    })?;
    decoded.save(&dest).map_err(|e| ImageError::Encode {
        path: dest.clone(),
        error: e,
    })?;

    if let Err(e) = std::fs::remove_file(raw) {
        log::warn!("could not remove raw render {}: {}", raw.display(), e);
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_raw(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_convert_writes_final_and_removes_raw() {
        let dir = TempDir::new().unwrap();
        let raw = write_raw(dir.path(), "out.tif");
        let images = dir.path().join("images");

        let settings = ImageSettings {
            format: "png".to_string(),
            keep_history: false,
            timestamp: false,
        };
        let dest = convert_rendered_image(&raw, &images, &settings).unwrap();

        assert_eq!(dest, images.join("out.png"));
        assert!(dest.exists());
        assert!(!raw.exists());
    }

    #[test]
    fn test_keep_history_archives_previous_render() {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("images");
        let settings = ImageSettings {
            format: "png".to_string(),
            keep_history: true,
            timestamp: false,
        };

        let raw = write_raw(dir.path(), "out.tif");
        convert_rendered_image(&raw, &images, &settings).unwrap();
        let raw = write_raw(dir.path(), "out.tif");
        convert_rendered_image(&raw, &images, &settings).unwrap();

        let outputs = std::fs::read_dir(&images).unwrap().count();
        assert_eq!(outputs, 2);
    }

    #[test]
    fn test_missing_raw_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let settings = ImageSettings {
            format: "png".to_string(),
            keep_history: false,
            timestamp: false,
        };
        let result =
            convert_rendered_image(&dir.path().join("absent.tif"), dir.path(), &settings);
        assert!(result.is_err());
    }
}
