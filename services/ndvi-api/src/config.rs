//! Service configuration: defaults, then an optional YAML file, then
//! environment overrides.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ndvi_common::{BoundingBox, TENGGELI_REGION};
use raster_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Region of interest in geographic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl RegionBounds {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }

    /// Parse `west,south,east,north`.
    pub fn parse(s: &str) -> Result<Self> {
        let bbox = BoundingBox::from_query_string(s)
            .with_context(|| format!("Invalid region bounds: {}", s))?;
        Ok(bbox.into())
    }
}

impl Default for RegionBounds {
    fn default() -> Self {
        TENGGELI_REGION.into()
    }
}

impl From<BoundingBox> for RegionBounds {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            west: bbox.min_x,
            south: bbox.min_y,
            east: bbox.max_x,
            north: bbox.max_y,
        }
    }
}

/// Configuration for the NDVI API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Raster store settings, at the top level of the YAML file.
    #[serde(flatten)]
    pub store: StoreConfig,

    /// Default bounds for grid sampling and the landing page.
    pub region: RegionBounds,

    /// Largest `end_year - start_year` accepted by range queries.
    pub max_year_span: i32,

    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
}

/// Origins of the local frontend dev servers.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            region: RegionBounds::default(),
            max_year_span: 50,
            cors_origins: DEFAULT_CORS_ORIGINS.map(String::from).to_vec(),
        }
    }
}

impl ServiceConfig {
    /// Build the configuration, reading `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse: {:?}", path))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.store.apply_env();

        if let Ok(val) = std::env::var("NDVI_MAX_YEAR_SPAN") {
            if let Ok(span) = val.parse() {
                self.max_year_span = span;
            }
        }

        if let Ok(val) = std::env::var("NDVI_CORS_ORIGINS") {
            self.cors_origins = parse_origins(&val);
        }

        if let Ok(val) = std::env::var("NDVI_REGION") {
            self.region = RegionBounds::parse(&val)?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Err(msg) = self.store.validate() {
            bail!("Invalid store configuration: {}", msg);
        }
        if self.max_year_span < 0 {
            bail!("max_year_span must not be negative");
        }
        let r = &self.region;
        if !(r.west < r.east && r.south < r.north) {
            bail!("region must have west < east and south < north");
        }
        Ok(())
    }
}

fn parse_origins(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
