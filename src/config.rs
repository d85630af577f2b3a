use crate::projection::ProjectionKind;
use crate::scale::ScaleKind;
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub detail: DetailConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// GeoJSON FeatureCollection or shapefile with country boundaries
    pub countries: PathBuf,
    pub stores_csv: PathBuf,
    #[serde(default = "default_code_property")]
    pub code_property: String,
    #[serde(default = "default_name_property")]
    pub name_property: String,
    #[serde(default = "default_country_column")]
    pub country_column: String,
    #[serde(default = "default_latitude_column")]
    pub latitude_column: String,
    #[serde(default = "default_longitude_column")]
    pub longitude_column: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self { top: 50.0, right: 50.0, bottom: 50.0, left: 50.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub panel: String,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub projection: ProjectionKind,
    pub scale: ScaleKind,
    pub bubble_min: f64,
    pub bubble_max: f64,
    pub country_fill: String,
    pub bubble_fill: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            panel: "vis1".to_string(),
            width: 1000.0,
            height: 600.0,
            margin: Margin::default(),
            projection: ProjectionKind::WinkelTripel,
            scale: ScaleKind::Log,
            bubble_min: 1.0,
            bubble_max: 20.0,
            country_fill: "lightgrey".to_string(),
            bubble_fill: "#00704A".to_string(),
        }
    }
}

impl MapConfig {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DetailConfig {
    /// Names of the two alternating detail panels, slot A first
    pub panels: [String; 2],
    pub width: f64,
    pub height: f64,
    pub projection: ProjectionKind,
    pub point_radius: f64,
    pub point_fill: String,
    pub country_fill: String,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            panels: ["vis2".to_string(), "vis3".to_string()],
            width: 500.0,
            height: 400.0,
            projection: ProjectionKind::Mercator,
            point_radius: 2.0,
            point_fill: "red".to_string(),
            country_fill: "lightgrey".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_code_property() -> String {
    "ISO_A2".to_string()
}

fn default_name_property() -> String {
    "ADMIN".to_string()
}

fn default_country_column() -> String {
    "countryCode".to_string()
}

fn default_latitude_column() -> String {
    "latitude".to_string()
}

fn default_longitude_column() -> String {
    "longitude".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.map.inner_width() > 0.0 && self.map.inner_height() > 0.0,
            "Map margins leave no drawing area ({}x{})",
            self.map.width,
            self.map.height
        );
        ensure!(
            self.detail.width > 0.0 && self.detail.height > 0.0,
            "Detail panels must have a positive size"
        );
        ensure!(
            self.map.bubble_min.is_finite() && self.map.bubble_max.is_finite(),
            "Bubble range must be finite"
        );
        let [a, b] = &self.detail.panels;
        ensure!(a != b, "Detail panels must have distinct names, got '{}' twice", a);
        ensure!(
            *a != self.map.panel && *b != self.map.panel,
            "Detail panels must not reuse the world map panel '{}'",
            self.map.panel
        );
        Ok(())
    }
}
