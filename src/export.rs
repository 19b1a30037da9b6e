//! PNG export of rendered surfaces (display, overlay, preview, thumbnails).

use crate::config::ExportConfig;
use cairo::ImageSurface;
use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing images to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),

    #[error("invalid filename template '{0}'")]
    InvalidTemplate(String),
}

/// Where and how exported files are named.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    /// Directory to write images to.
    pub directory: PathBuf,
    /// Filename template (supports chrono format specifiers).
    pub filename_template: String,
}

impl ExportTarget {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            directory: expand_tilde(&config.directory),
            filename_template: config.filename_template.clone(),
        }
    }

    /// Writes `surface` under a fresh timestamped name and returns its path.
    pub fn export(&self, surface: &ImageSurface) -> Result<PathBuf, ExportError> {
        let directory = ensure_directory_exists(&self.directory)?;
        let path = directory.join(generate_filename(&self.filename_template, "png")?);
        save_surface_png(surface, &path)?;
        Ok(path)
    }
}

impl Default for ExportTarget {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Whether `template` is a non-empty chrono format string.
pub fn is_valid_template(template: &str) -> bool {
    !template.trim().is_empty()
        && !StrftimeItems::new(template).any(|item| matches!(item, Item::Error))
}

/// Generate a filename based on the template and current time.
///
/// # Arguments
/// * `template` - Template string with chrono format specifiers
/// * `extension` - File extension (e.g., "png")
pub fn generate_filename(template: &str, extension: &str) -> Result<String, ExportError> {
    if !is_valid_template(template) {
        return Err(ExportError::InvalidTemplate(template.to_string()));
    }
    let mut filename = String::new();
    write!(filename, "{}.{}", Local::now().format(template), extension)
        .map_err(|_| ExportError::InvalidTemplate(template.to_string()))?;
    Ok(filename)
}

/// Ensure a directory exists, creating it if necessary.
///
/// Returns the canonicalized path when it can be resolved.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, ExportError> {
    if !directory.exists() {
        log::info!("Creating export directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Encodes `surface` as PNG at `path`, creating parent directories.
pub fn save_surface_png(surface: &ImageSurface, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_directory_exists(parent)?;
    }

    surface.flush();
    let mut writer = BufWriter::new(File::create(path)?);
    surface.write_to_png(&mut writer)?;

    log::info!(
        "Saved {}x{} PNG to {}",
        surface.width(),
        surface.height(),
        path.display()
    );
    Ok(())
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::Format;
    use tempfile::TempDir;

    #[test]
    fn test_generate_filename() {
        let filename = generate_filename("crop_%Y%m%d", "png").unwrap();
        assert!(filename.starts_with("crop_"));
        assert!(filename.ends_with(".png"));
        assert_eq!(filename.len(), "crop_YYYYMMDD.png".len());
    }

    #[test]
    fn unknown_specifier_is_rejected_not_formatted() {
        assert!(!is_valid_template("crop_%Q"));
        assert!(!is_valid_template("   "));
        assert!(is_valid_template("crop_%Y-%m-%d_%H%M%S"));
        assert!(matches!(
            generate_filename("crop_%Q", "png"),
            Err(ExportError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn saves_png_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("preview.png");
        let surface = ImageSurface::create(Format::ARgb32, 8, 4).unwrap();

        save_surface_png(&surface, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn export_target_uses_template() {
        let dir = TempDir::new().unwrap();
        let target = ExportTarget {
            directory: dir.path().join("exports"),
            filename_template: "fixed".to_string(),
        };
        let surface = ImageSurface::create(Format::ARgb32, 2, 2).unwrap();

        let path = target.export(&surface).unwrap();

        assert_eq!(path.file_name().unwrap(), "fixed.png");
        assert!(path.exists());
    }
}
