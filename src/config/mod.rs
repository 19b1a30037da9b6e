//! Configuration file support for dicomcrop.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/dicomcrop/config.toml`. Settings include selection behavior,
//! overlay appearance, preview size, initial display state, and export naming.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use types::{
    ExportConfig, OverlayConfig, PreviewConfig, SelectionConfig, ThumbnailConfig, ViewportConfig,
};

use crate::draw::{BLACK, OverlayStyle, YELLOW};
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [selection]
/// default_mode = "polygon"
/// min_size = 10.0
///
/// [overlay]
/// mask_color = "black"
/// mask_opacity = 0.5
/// outline_color = [255, 200, 0]
///
/// [preview]
/// max_width = 400.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Region-selection behavior
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Overlay mask and outline appearance
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Preview size and polygon handling
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Initial window/level, inversion and background
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Thumbnail board settings
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    /// PNG export settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `selection.min_size`: 1.0 - 500.0
    /// - `selection.vertex_radius`: 0.0 - 20.0
    /// - `overlay.mask_opacity`: 0.0 - 1.0
    /// - `overlay.outline_width`: 0.5 - 20.0
    /// - `preview.max_width`: 16.0 - 4096.0
    /// - `viewport.window_width`: at least 1.0
    /// - `thumbnails.size`: 16.0 - 1024.0
    /// - `export.filename_template`: non-empty, valid chrono format
    pub fn validate_and_clamp(&mut self) {
        self.selection.min_size =
            clamp_field("selection.min_size", self.selection.min_size, 1.0, 500.0);
        self.selection.vertex_radius = clamp_field(
            "selection.vertex_radius",
            self.selection.vertex_radius,
            0.0,
            20.0,
        );
        self.overlay.mask_opacity =
            clamp_field("overlay.mask_opacity", self.overlay.mask_opacity, 0.0, 1.0);
        self.overlay.outline_width = clamp_field(
            "overlay.outline_width",
            self.overlay.outline_width,
            0.5,
            20.0,
        );
        self.preview.max_width =
            clamp_field("preview.max_width", self.preview.max_width, 16.0, 4096.0);
        self.thumbnails.size = clamp_field("thumbnails.size", self.thumbnails.size, 16.0, 1024.0);

        if let Some(width) = self.viewport.window_width
            && (width.is_nan() || width < 1.0)
        {
            log::warn!("Invalid viewport.window_width {:.1}, raising to 1.0", width);
            self.viewport.window_width = Some(1.0);
        }
        if self.viewport.window_center.is_some() != self.viewport.window_width.is_some() {
            log::warn!(
                "viewport.window_center and window_width must be set together, ignoring both"
            );
            self.viewport.window_center = None;
            self.viewport.window_width = None;
        }

        if !crate::export::is_valid_template(&self.export.filename_template) {
            log::warn!(
                "Invalid export.filename_template '{}', falling back to the default",
                self.export.filename_template
            );
            self.export.filename_template = ExportConfig::default().filename_template;
        }
    }

    /// Overlay style assembled from the `[overlay]` and `[selection]` sections.
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            mask: self
                .overlay
                .mask_color
                .to_color_or(BLACK)
                .with_alpha(self.overlay.mask_opacity),
            outline: self.overlay.outline_color.to_color_or(YELLOW),
            outline_width: self.overlay.outline_width,
            vertex_radius: self.selection.vertex_radius,
        }
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/dicomcrop/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("dicomcrop");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path, or returns defaults if it doesn't exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Serializes the config to TOML and writes it to `config_path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to `config_path`,
    /// or to the user's config directory when no path is given.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A config file already exists at the target path
    /// - The config directory cannot be created
    /// - The file cannot be written
    pub fn create_default_file(config_path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(&config_path, default_config)?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }
}

fn clamp_field(name: &str, value: f64, min: f64, max: f64) -> f64 {
    if (min..=max).contains(&value) {
        return value;
    }
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    log::warn!(
        "Invalid {} {:.2}, clamping to {:.1}-{:.1} range",
        name,
        value,
        min,
        max
    );
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SelectionMode;
    use tempfile::TempDir;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.selection.default_mode, SelectionMode::Rectangle);
        assert_eq!(config.selection.min_size, 10.0);
        assert_eq!(config.preview.max_width, 400.0);
        assert!(!config.preview.polygon_clip);
        assert_eq!(config.overlay_style(), OverlayStyle::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config: Config = toml::from_str(
            r#"
            [selection]
            min_size = 0.0
            [overlay]
            mask_opacity = 3.0
            [preview]
            max_width = 100000.0
            [viewport]
            window_center = 40.0
            window_width = -5.0
            [export]
            filename_template = "  "
            "#,
        )
        .unwrap();
        config.validate_and_clamp();

        assert_eq!(config.selection.min_size, 1.0);
        assert_eq!(config.overlay.mask_opacity, 1.0);
        assert_eq!(config.preview.max_width, 4096.0);
        assert_eq!(config.viewport.window_width, Some(1.0));
        assert_eq!(config.export.filename_template, "crop_%Y-%m-%d_%H%M%S");
    }

    #[test]
    fn unknown_template_specifier_falls_back() {
        let mut config: Config =
            toml::from_str("[export]\nfilename_template = \"crop_%Q\"\n").unwrap();
        config.validate_and_clamp();
        assert_eq!(config.export.filename_template, "crop_%Y-%m-%d_%H%M%S");
    }

    #[test]
    fn half_specified_window_is_dropped() {
        let mut config: Config = toml::from_str("[viewport]\nwindow_center = 40.0\n").unwrap();
        config.validate_and_clamp();
        assert_eq!(config.viewport.window_center, None);
        assert_eq!(config.viewport.window_width, None);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.selection.default_mode = SelectionMode::Polygon;
        config.overlay.outline_color = ColorSpec::Rgb([0, 255, 0]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.selection.default_mode, SelectionMode::Polygon);
        assert_eq!(loaded.overlay.outline_color, ColorSpec::Rgb([0, 255, 0]));
    }

    #[test]
    fn missing_file_loads_defaults_and_bad_toml_errors() {
        let dir = TempDir::new().unwrap();
        let missing = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing.thumbnails.size, 128.0);

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[selection\nmin_size = ").unwrap();
        assert!(Config::load_from(&bad).is_err());
    }

    #[test]
    fn default_file_parses_and_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let written = Config::create_default_file(Some(&path)).unwrap();
        assert_eq!(written, path);
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.selection.min_size, 10.0);

        assert!(Config::create_default_file(Some(&path)).is_err());
    }

    #[test]
    fn schema_names_every_section() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in ["selection", "overlay", "preview", "viewport", "thumbnails", "export"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
