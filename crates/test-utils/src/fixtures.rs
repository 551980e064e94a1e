//! Common test fixtures for ndvi-service tests.
//!
//! Pre-defined regions, points and a ready-made data directory matching
//! the scenarios the service is expected to answer.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::geotiff::{write_composite, NdviRasterSpec};

/// Nodata marker written into fixture rasters.
pub const NODATA: &str = "-9999";

/// File prefix used by the processing pipeline.
pub const FILE_PREFIX: &str = "tenggeli_ndvi";

/// Region bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod region {
    /// The Tenggeli Desert study area.
    pub const TENGGELI: (f64, f64, f64, f64) = (103.0, 37.5, 105.2, 39.0);

    /// Pixel size of centred fixture grids, in degrees.
    pub const CENTERED_PIXEL_SIZE: f64 = 0.01;
}

/// Points of interest as (latitude, longitude).
pub mod points {
    /// Sampled point in the scenario fixture.
    pub const SCENARIO: (f64, f64) = (38.5, 104.5);

    /// A second point inside the study area.
    pub const DUNES: (f64, f64) = (38.0, 104.0);

    /// Well outside every fixture raster.
    pub const NULL_ISLAND: (f64, f64) = (0.0, 0.0);
}

/// NDVI value stored at [`points::SCENARIO`] in the scenario fixture.
pub const SCENARIO_NDVI: f32 = 0.15;

/// A temporary data directory populated with fixture composites.
///
/// The directory is removed when the fixture is dropped.
pub struct DataDirFixture {
    dir: TempDir,
}

impl DataDirFixture {
    /// An empty data directory.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp data dir"),
        }
    }

    /// Only `tenggeli_ndvi_2020_06.tif`, holding 0.15 at the scenario
    /// point and nodata everywhere else.
    pub fn scenario() -> Self {
        let fixture = Self::empty();
        fixture.add_month(2020, 6, &scenario_raster(SCENARIO_NDVI));
        fixture
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Adds a flat-layout composite for the given month.
    pub fn add_month(&self, year: i32, month: u32, spec: &NdviRasterSpec) -> PathBuf {
        write_composite(self.dir.path(), FILE_PREFIX, year, month, spec)
    }

    /// Adds a nested-layout composite, `YYYY_MM/processed.tif`.
    pub fn add_nested_month(&self, year: i32, month: u32, spec: &NdviRasterSpec) -> PathBuf {
        crate::geotiff::write_geotiff(
            self.dir.path(),
            &format!("{year:04}_{month:02}/processed.tif"),
            spec,
        )
    }

    /// Writes arbitrary bytes under the data directory.
    pub fn add_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).expect("failed to write raw fixture");
        path
    }
}

/// Centred region raster with `value` at [`points::SCENARIO`] only.
pub fn scenario_raster(value: f32) -> NdviRasterSpec {
    let (lat, lon) = points::SCENARIO;
    NdviRasterSpec::tenggeli_centered().with_value_at(lon, lat, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_fixture_layout() {
        let fixture = DataDirFixture::scenario();
        assert!(fixture.path().join("tenggeli_ndvi_2020_06.tif").exists());
    }

    #[test]
    fn test_nested_layout() {
        let fixture = DataDirFixture::empty();
        let path = fixture.add_nested_month(2021, 3, &NdviRasterSpec::tenggeli(2, 2));
        assert!(path.ends_with("2021_03/processed.tif"));
        assert!(path.exists());
    }

    #[test]
    fn test_points_inside_region() {
        let (min_lon, min_lat, max_lon, max_lat) = region::TENGGELI;
        for (lat, lon) in [points::SCENARIO, points::DUNES] {
            assert!(lon > min_lon && lon < max_lon);
            assert!(lat > min_lat && lat < max_lat);
        }
    }
}
