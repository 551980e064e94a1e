//! Minimal GeoTIFF writer for building composite fixtures on disk.
//!
//! Produces single-band, strip-organised files carrying the same tags the
//! processing pipeline emits: `ModelPixelScale`, `ModelTiepoint`, an
//! optional `GeoKeyDirectory` and an optional `GDAL_NODATA` string.

use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::TiffResult;

use crate::fixtures::region;
use crate::generators::create_ndvi_gradient_grid;

/// Pixel payload of a fixture raster.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterValues {
    F32(Vec<f32>),
    U8(Vec<u8>),
    I16(Vec<i16>),
}

impl RasterValues {
    pub fn len(&self) -> usize {
        match self {
            RasterValues::F32(v) => v.len(),
            RasterValues::U8(v) => v.len(),
            RasterValues::I16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Coordinate reference declared in the GeoKey directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureCrs {
    /// No GeoKey directory at all.
    Unspecified,
    Geographic(u16),
    Projected(u16),
}

/// Description of a north-up fixture raster.
#[derive(Debug, Clone)]
pub struct NdviRasterSpec {
    pub width: u32,
    pub height: u32,
    /// Map x of the top-left corner.
    pub origin_x: f64,
    /// Map y of the top-left corner.
    pub origin_y: f64,
    /// Positive pixel sizes; rows run southwards.
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub values: RasterValues,
    pub nodata: Option<String>,
    pub crs: FixtureCrs,
    /// Write the tiepoint at the centre of pixel (0, 0) and tag the raster
    /// as PixelIsPoint.
    pub pixel_is_point: bool,
}

impl NdviRasterSpec {
    /// A float raster filled with `fill`.
    pub fn new(width: u32, height: u32, origin: (f64, f64), pixel_size: f64, fill: f32) -> Self {
        Self {
            width,
            height,
            origin_x: origin.0,
            origin_y: origin.1,
            pixel_width: pixel_size,
            pixel_height: pixel_size,
            values: RasterValues::F32(vec![fill; (width * height) as usize]),
            nodata: Some(crate::fixtures::NODATA.to_string()),
            crs: FixtureCrs::Geographic(4326),
            pixel_is_point: false,
        }
    }

    /// Gradient raster spanning the whole Tenggeli region.
    pub fn tenggeli(width: u32, height: u32) -> Self {
        let (min_lon, min_lat, max_lon, max_lat) = region::TENGGELI;
        Self {
            width,
            height,
            origin_x: min_lon,
            origin_y: max_lat,
            pixel_width: (max_lon - min_lon) / width as f64,
            pixel_height: (max_lat - min_lat) / height as f64,
            values: RasterValues::F32(create_ndvi_gradient_grid(width as usize, height as usize)),
            nodata: Some(crate::fixtures::NODATA.to_string()),
            crs: FixtureCrs::Geographic(4326),
            pixel_is_point: false,
        }
    }

    /// Region raster at 0.01 degrees whose pixel centres fall on whole
    /// hundredths, so fixture points never sit on a pixel edge.
    /// Every pixel starts as nodata.
    pub fn tenggeli_centered() -> Self {
        let (min_lon, min_lat, max_lon, max_lat) = region::TENGGELI;
        let step = region::CENTERED_PIXEL_SIZE;
        let width = ((max_lon - min_lon) / step).round() as u32 + 1;
        let height = ((max_lat - min_lat) / step).round() as u32 + 1;
        let nodata = crate::fixtures::NODATA.parse::<f32>().unwrap_or(-9999.0);
        Self::new(
            width,
            height,
            (min_lon - step / 2.0, max_lat + step / 2.0),
            step,
            nodata,
        )
    }

    pub fn with_values(mut self, values: RasterValues) -> Self {
        self.values = values;
        self
    }

    pub fn with_nodata(mut self, nodata: Option<&str>) -> Self {
        self.nodata = nodata.map(str::to_string);
        self
    }

    pub fn with_crs(mut self, crs: FixtureCrs) -> Self {
        self.crs = crs;
        self
    }

    pub fn with_pixel_is_point(mut self) -> Self {
        self.pixel_is_point = true;
        self
    }

    /// Model coordinates anchored at raster position (0, 0).
    fn tiepoint(&self) -> [f64; 6] {
        if self.pixel_is_point {
            let x = self.origin_x + self.pixel_width / 2.0;
            let y = self.origin_y - self.pixel_height / 2.0;
            [0.0, 0.0, 0.0, x, y, 0.0]
        } else {
            [0.0, 0.0, 0.0, self.origin_x, self.origin_y, 0.0]
        }
    }

    /// Column and row of the pixel containing a map coordinate.
    pub fn pixel_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.origin_x) / self.pixel_width).floor();
        let row = ((self.origin_y - y) / self.pixel_height).floor();
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Sets the float sample of the pixel containing (`x`, `y`).
    ///
    /// Panics when the point is outside the raster or the raster is not
    /// float-valued.
    pub fn with_value_at(mut self, x: f64, y: f64, value: f32) -> Self {
        let (col, row) = self
            .pixel_of(x, y)
            .unwrap_or_else(|| panic!("({x}, {y}) is outside the fixture raster"));
        let idx = row * self.width as usize + col;
        match &mut self.values {
            RasterValues::F32(v) => v[idx] = value,
            other => panic!("with_value_at needs a float raster, got {other:?}"),
        }
        self
    }

    fn geo_keys(&self) -> Option<Vec<u16>> {
        let (model_type, code_key, code) = match self.crs {
            FixtureCrs::Unspecified => return None,
            FixtureCrs::Geographic(code) => (2, 2048, code),
            FixtureCrs::Projected(code) => (1, 3072, code),
        };
        // GTRasterTypeGeoKey: 1 PixelIsArea, 2 PixelIsPoint
        let raster_type = if self.pixel_is_point { 2 } else { 1 };
        Some(vec![
            1, 1, 0, 3, // header: version, revision, minor, key count
            1024, 0, 1, model_type, // GTModelTypeGeoKey
            1025, 0, 1, raster_type,
            code_key, 0, 1, code,
        ])
    }
}

/// Encodes the fixture as an in-memory GeoTIFF.
pub fn geotiff_bytes(spec: &NdviRasterSpec) -> Vec<u8> {
    assert_eq!(
        spec.values.len(),
        (spec.width * spec.height) as usize,
        "fixture values do not match {}x{}",
        spec.width,
        spec.height
    );

    let mut buf = Vec::new();
    {
        let mut encoder =
            TiffEncoder::new(Cursor::new(&mut buf)).expect("failed to create TIFF encoder");
        let result = match &spec.values {
            RasterValues::F32(v) => write_image::<colortype::Gray32Float, _>(&mut encoder, spec, v),
            RasterValues::U8(v) => write_image::<colortype::Gray8, _>(&mut encoder, spec, v),
            RasterValues::I16(v) => write_image::<colortype::GrayI16, _>(&mut encoder, spec, v),
        };
        result.expect("failed to encode fixture GeoTIFF");
    }
    buf
}

/// Writes the fixture to `dir/name`, creating parent directories.
pub fn write_geotiff(dir: &Path, name: &str, spec: &NdviRasterSpec) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(&path, geotiff_bytes(spec)).expect("failed to write fixture GeoTIFF");
    path
}

/// Writes a flat-layout monthly composite, `<prefix>_YYYY_MM.tif`.
pub fn write_composite(
    dir: &Path,
    prefix: &str,
    year: i32,
    month: u32,
    spec: &NdviRasterSpec,
) -> PathBuf {
    write_geotiff(dir, &format!("{prefix}_{year:04}_{month:02}.tif"), spec)
}

fn write_image<C, W>(
    encoder: &mut TiffEncoder<W>,
    spec: &NdviRasterSpec,
    data: &[C::Inner],
) -> TiffResult<()>
where
    C: ColorType,
    W: Write + Seek,
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(spec.width, spec.height)?;
    let dir = image.encoder();
    dir.write_tag(
        Tag::ModelPixelScaleTag,
        &[spec.pixel_width, spec.pixel_height, 0.0][..],
    )?;
    dir.write_tag(Tag::ModelTiepointTag, &spec.tiepoint()[..])?;
    if let Some(keys) = spec.geo_keys() {
        dir.write_tag(Tag::GeoKeyDirectoryTag, &keys[..])?;
    }
    if let Some(nodata) = &spec.nodata {
        dir.write_tag(Tag::GdalNodata, nodata.as_str())?;
    }
    image.write_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiff_magic() {
        let bytes = geotiff_bytes(&NdviRasterSpec::tenggeli(4, 3));
        assert!(bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*"));
    }

    #[test]
    fn test_centered_grid_puts_points_mid_pixel() {
        let spec = NdviRasterSpec::tenggeli_centered();
        assert_eq!(spec.width, 221);
        assert_eq!(spec.height, 151);
        let (col, row) = spec.pixel_of(104.5, 38.5).unwrap();
        assert_eq!((col, row), (150, 50));
    }

    #[test]
    fn test_pixel_is_point_tiepoint_at_centre() {
        let spec = NdviRasterSpec::new(2, 2, (104.0, 39.0), 0.5, 0.1).with_pixel_is_point();
        assert_eq!(spec.tiepoint()[3..5], [104.25, 38.75]);
        assert_eq!(spec.geo_keys().unwrap()[11], 2);
        // The corner origin is unchanged for pixel lookups.
        assert_eq!(spec.pixel_of(104.1, 38.9), Some((0, 0)));
    }

    #[test]
    fn test_pixel_of_outside() {
        let spec = NdviRasterSpec::tenggeli(4, 3);
        assert!(spec.pixel_of(0.0, 0.0).is_none());
    }

    #[test]
    fn test_write_composite_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_composite(dir.path(), "tenggeli_ndvi", 2020, 6, &NdviRasterSpec::tenggeli(2, 2));
        assert!(path.ends_with("tenggeli_ndvi_2020_06.tif"));
        assert!(path.exists());
    }
}
