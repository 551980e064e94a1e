//! Single-band GeoTIFF composites decoded with the `tiff` crate.
//!
//! Reads tags 33550 (ModelPixelScale), 33922 (ModelTiepoint),
//! 34264 (ModelTransformation), 34735 (GeoKeyDirectory) and
//! 42113 (GDAL_NODATA) to produce a `GeoTransform`, a `CrsCode` and an
//! optional nodata value.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use ndvi_common::{CrsCode, GeoPoint, NdviError, NdviResult};
use num_traits::ToPrimitive;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::config::SampleEncoding;
use crate::transform::GeoTransform;

const GEOKEY_MODEL_TYPE: u16 = 1024;
const GEOKEY_RASTER_TYPE: u16 = 1025;
const GEOKEY_PROJECTED_CS_TYPE: u16 = 3072;
const MODEL_TYPE_PROJECTED: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// Raw samples of the first band, in row-major order.
#[derive(Debug, Clone)]
pub enum BandSamples {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl BandSamples {
    pub fn len(&self) -> usize {
        match self {
            BandSamples::U8(v) => v.len(),
            BandSamples::I8(v) => v.len(),
            BandSamples::U16(v) => v.len(),
            BandSamples::I16(v) => v.len(),
            BandSamples::U32(v) => v.len(),
            BandSamples::I32(v) => v.len(),
            BandSamples::F32(v) => v.len(),
            BandSamples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `i` widened to f64.
    pub fn raw(&self, i: usize) -> f64 {
        match self {
            BandSamples::U8(v) => widen(v[i]),
            BandSamples::I8(v) => widen(v[i]),
            BandSamples::U16(v) => widen(v[i]),
            BandSamples::I16(v) => widen(v[i]),
            BandSamples::U32(v) => widen(v[i]),
            BandSamples::I32(v) => widen(v[i]),
            BandSamples::F32(v) => widen(v[i]),
            BandSamples::F64(v) => v[i],
        }
    }

    /// Pixel type name, e.g. "float32".
    pub fn dtype(&self) -> &'static str {
        match self {
            BandSamples::U8(_) => "uint8",
            BandSamples::I8(_) => "int8",
            BandSamples::U16(_) => "uint16",
            BandSamples::I16(_) => "int16",
            BandSamples::U32(_) => "uint32",
            BandSamples::I32(_) => "int32",
            BandSamples::F32(_) => "float32",
            BandSamples::F64(_) => "float64",
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, BandSamples::F32(_) | BandSamples::F64(_))
    }
}

fn widen<T: ToPrimitive>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Keep only the first sample of each pixel.
fn first_band<T>(data: Vec<T>, samples_per_pixel: usize) -> Vec<T> {
    if samples_per_pixel <= 1 {
        data
    } else {
        data.into_iter().step_by(samples_per_pixel).collect()
    }
}

/// How a single sample reads as NDVI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelClass {
    Valid(f64),
    /// The nodata sentinel or NaN.
    NoData,
    /// A data value outside [-1, 1] after rescaling.
    OutOfRange,
}

/// One decoded monthly NDVI composite.
#[derive(Debug, Clone)]
pub struct RasterComposite {
    path: PathBuf,
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: CrsCode,
    nodata: Option<f64>,
    samples: BandSamples,
    encoding: SampleEncoding,
}

impl RasterComposite {
    /// Read a composite from disk.
    pub fn open(path: impl AsRef<Path>, encoding: SampleEncoding) -> NdviResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::decode(BufReader::new(file), path, encoding)
    }

    /// Decode a composite from any `Read + Seek` source. `path` is only used
    /// for error messages and identification.
    pub fn decode<R: Read + Seek>(
        reader: R,
        path: &Path,
        encoding: SampleEncoding,
    ) -> NdviResult<Self> {
        let mut decoder = Decoder::new(reader).map_err(|e| NdviError::raster_read(path, e))?;

        let (w, h) = decoder
            .dimensions()
            .map_err(|e| NdviError::raster_read(path, e))?;
        let width = w as usize;
        let height = h as usize;
        let pixels = width * height;
        if pixels == 0 {
            return Err(NdviError::unsupported(path, "raster has no pixels"));
        }

        // Georeferencing tags must be read before the image data.
        let keys = GeoKeys::read(&mut decoder);
        let mut transform = read_geotransform(&mut decoder)
            .ok_or_else(|| NdviError::unsupported(path, "missing georeferencing tags"))?;
        if keys.raster_type == Some(RASTER_PIXEL_IS_POINT) {
            // Tiepoints name pixel centres; move the origin to the corner.
            let (x, y) = transform.pixel_to_map(-0.5, -0.5);
            transform.origin_x = x;
            transform.origin_y = y;
        }
        let crs = keys.crs().map_err(|msg| NdviError::unsupported(path, msg))?;
        let nodata = read_nodata(&mut decoder);

        let result = decoder
            .read_image()
            .map_err(|e| NdviError::raster_read(path, e))?;

        let len = decoding_len(&result);
        if len == 0 || len % pixels != 0 {
            return Err(NdviError::raster_read(
                path,
                format!("expected a multiple of {} samples, got {}", pixels, len),
            ));
        }
        let spp = len / pixels;

        let samples = match result {
            DecodingResult::U8(buf) => BandSamples::U8(first_band(buf, spp)),
            DecodingResult::I8(buf) => BandSamples::I8(first_band(buf, spp)),
            DecodingResult::U16(buf) => BandSamples::U16(first_band(buf, spp)),
            DecodingResult::I16(buf) => BandSamples::I16(first_band(buf, spp)),
            DecodingResult::U32(buf) => BandSamples::U32(first_band(buf, spp)),
            DecodingResult::I32(buf) => BandSamples::I32(first_band(buf, spp)),
            DecodingResult::F32(buf) => BandSamples::F32(first_band(buf, spp)),
            DecodingResult::F64(buf) => BandSamples::F64(first_band(buf, spp)),
            _ => return Err(NdviError::unsupported(path, "unsupported pixel format")),
        };

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            transform,
            crs,
            nodata,
            samples,
            encoding,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn samples(&self) -> &BandSamples {
        &self.samples
    }

    /// Whether sample `i` is the nodata sentinel (compared at the band's
    /// own precision) or NaN.
    fn is_nodata(&self, i: usize) -> bool {
        match (&self.samples, self.nodata) {
            (BandSamples::F32(v), nd) => {
                v[i].is_nan() || nd.is_some_and(|nd| !nd.is_nan() && v[i] == nd as f32)
            }
            (BandSamples::F64(v), nd) => {
                v[i].is_nan() || nd.is_some_and(|nd| !nd.is_nan() && v[i] == nd)
            }
            // Byte composites without a declared sentinel reserve 0.
            (BandSamples::U8(v), None) => v[i] == 0,
            (samples, Some(nd)) => samples.raw(i) == nd,
            (_, None) => false,
        }
    }

    /// Classify the sample at flat index `i`.
    pub fn classify(&self, i: usize) -> PixelClass {
        if i >= self.samples.len() || self.is_nodata(i) {
            return PixelClass::NoData;
        }
        let raw = self.samples.raw(i);
        let ndvi = match &self.samples {
            s if s.is_float() => raw,
            BandSamples::U8(_) => raw / 255.0 * 2.0 - 1.0,
            _ => raw * self.encoding.integer_scale + self.encoding.integer_offset,
        };
        if ndvi.is_nan() {
            PixelClass::NoData
        } else if !(-1.0..=1.0).contains(&ndvi) {
            PixelClass::OutOfRange
        } else {
            PixelClass::Valid(ndvi)
        }
    }

    /// NDVI at flat index `i`, or `None` for nodata and out-of-range samples.
    pub fn ndvi_at_index(&self, i: usize) -> Option<f64> {
        match self.classify(i) {
            PixelClass::Valid(ndvi) => Some(ndvi),
            PixelClass::NoData | PixelClass::OutOfRange => None,
        }
    }

    /// NDVI at pixel (col, row). Indices outside the raster yield `None`.
    pub fn ndvi_at(&self, col: i64, row: i64) -> Option<f64> {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        self.ndvi_at_index(row as usize * self.width + col as usize)
    }

    /// NDVI at a WGS84 point.
    pub fn sample(&self, point: GeoPoint) -> Option<f64> {
        let (x, y) = self.crs.project(point.longitude, point.latitude);
        let (col, row) = self.transform.pixel_index(x, y)?;
        self.ndvi_at(col, row)
    }
}

fn decoding_len(result: &DecodingResult) -> usize {
    match result {
        DecodingResult::U8(v) => v.len(),
        DecodingResult::I8(v) => v.len(),
        DecodingResult::U16(v) => v.len(),
        DecodingResult::I16(v) => v.len(),
        DecodingResult::U32(v) => v.len(),
        DecodingResult::I32(v) => v.len(),
        DecodingResult::F32(v) => v.len(),
        DecodingResult::F64(v) => v.len(),
        _ => 0,
    }
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, or from
/// ModelTransformation.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();

    if let (Some(scale), Some(tiepoint)) = (&scale, &tiepoint) {
        if let Some(gt) = GeoTransform::from_scale_tiepoint(scale, tiepoint) {
            return Some(gt);
        }
    }

    let matrix = decoder.get_tag_f64_vec(Tag::ModelTransformationTag).ok()?;
    GeoTransform::from_model_transformation(&matrix)
}

/// Inline values of the GeoKeyDirectory entries this module understands.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct GeoKeys {
    model_type: Option<u16>,
    raster_type: Option<u16>,
    projected: Option<u16>,
}

impl GeoKeys {
    fn read<R: Read + Seek>(decoder: &mut Decoder<R>) -> Self {
        match decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) {
            Ok(keys) => Self::parse(&keys),
            Err(_) => Self::default(),
        }
    }

    fn parse(keys: &[u16]) -> Self {
        let mut parsed = Self::default();
        if keys.len() < 4 {
            return parsed;
        }

        let num_keys = keys[3] as usize;
        for i in 0..num_keys {
            let base = 4 + i * 4;
            if base + 4 > keys.len() {
                break;
            }
            let key_id = keys[base];
            let location = keys[base + 1];
            let value = keys[base + 3];
            // Location 0 means the value is stored inline.
            if location != 0 {
                continue;
            }
            match key_id {
                GEOKEY_MODEL_TYPE => parsed.model_type = Some(value),
                GEOKEY_RASTER_TYPE => parsed.raster_type = Some(value),
                GEOKEY_PROJECTED_CS_TYPE => parsed.projected = Some(value),
                _ => {}
            }
        }
        parsed
    }

    /// Geographic systems (and files without a directory) are indexed
    /// directly with lon/lat.
    fn crs(&self) -> Result<CrsCode, String> {
        match self.projected {
            Some(code) if code != USER_DEFINED => CrsCode::from_epsg(code as u32)
                .ok_or_else(|| format!("unsupported projected CRS EPSG:{}", code)),
            Some(_) => Err("user-defined projected CRS".to_string()),
            None if self.model_type == Some(MODEL_TYPE_PROJECTED) => {
                Err("projected model without a CRS code".to_string())
            }
            None => Ok(CrsCode::Epsg4326),
        }
    }
}

/// Nodata from the GDAL_NODATA ASCII tag.
fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let s = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    let s = s.trim_end_matches('\0').trim();
    match s.to_ascii_lowercase().as_str() {
        "nan" | "-nan" => Some(f64::NAN),
        _ => s.parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite(samples: BandSamples, nodata: Option<f64>) -> RasterComposite {
        RasterComposite {
            path: PathBuf::from("test.tif"),
            width: 2,
            height: 2,
            transform: GeoTransform::new(104.0, 39.0, 0.5, -0.5),
            crs: CrsCode::Epsg4326,
            nodata,
            samples,
            encoding: SampleEncoding::default(),
        }
    }

    #[test]
    fn test_float_nodata_and_nan() {
        let r = composite(
            BandSamples::F32(vec![0.15, -9999.0, f32::NAN, 0.2]),
            Some(-9999.0),
        );
        assert!((r.ndvi_at(0, 0).unwrap() - 0.15).abs() < 1e-6);
        assert_eq!(r.ndvi_at(1, 0), None);
        assert_eq!(r.ndvi_at(0, 1), None);
        assert!((r.ndvi_at(1, 1).unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_float_is_no_data() {
        let r = composite(BandSamples::F64(vec![1.5, -1.0, 1.0, -1.01]), None);
        assert_eq!(r.ndvi_at(0, 0), None);
        assert_eq!(r.ndvi_at(1, 0), Some(-1.0));
        assert_eq!(r.ndvi_at(0, 1), Some(1.0));
        assert_eq!(r.ndvi_at(1, 1), None);
    }

    #[test]
    fn test_classify_separates_nodata_from_out_of_range() {
        let r = composite(BandSamples::F32(vec![0.3, -9999.0, f32::NAN, 2.5]), Some(-9999.0));
        assert!(matches!(r.classify(0), PixelClass::Valid(v) if (v - 0.3).abs() < 1e-6));
        assert_eq!(r.classify(1), PixelClass::NoData);
        assert_eq!(r.classify(2), PixelClass::NoData);
        assert_eq!(r.classify(3), PixelClass::OutOfRange);
        assert_eq!(r.classify(4), PixelClass::NoData);
    }

    #[test]
    fn test_byte_normalization_and_implicit_zero_nodata() {
        let r = composite(BandSamples::U8(vec![0, 255, 128, 1]), None);
        assert_eq!(r.ndvi_at(0, 0), None);
        assert_eq!(r.ndvi_at(1, 0), Some(1.0));
        let mid = r.ndvi_at(0, 1).unwrap();
        assert!((mid - (128.0 / 255.0 * 2.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_byte_with_explicit_nodata_keeps_zero() {
        let r = composite(BandSamples::U8(vec![0, 255, 128, 1]), Some(255.0));
        assert_eq!(r.ndvi_at(0, 0), Some(-1.0));
        assert_eq!(r.ndvi_at(1, 0), None);
    }

    #[test]
    fn test_scaled_integer() {
        let r = composite(BandSamples::I16(vec![1500, -3000, -32768, 20000]), Some(-32768.0));
        assert!((r.ndvi_at(0, 0).unwrap() - 0.15).abs() < 1e-12);
        assert!((r.ndvi_at(1, 0).unwrap() + 0.3).abs() < 1e-12);
        assert_eq!(r.ndvi_at(0, 1), None);
        // 2.0 after scaling is outside the NDVI range.
        assert_eq!(r.ndvi_at(1, 1), None);
    }

    #[test]
    fn test_sample_by_point() {
        let r = composite(BandSamples::F32(vec![0.1, 0.2, 0.3, 0.4]), None);
        // Pixel (1, 1) covers lon 104.5..105.0, lat 38.0..38.5.
        let v = r.sample(GeoPoint::new(38.25, 104.75)).unwrap();
        assert!((v - 0.4).abs() < 1e-6);
        assert_eq!(r.sample(GeoPoint::new(0.0, 0.0)), None);
        assert_eq!(r.sample(GeoPoint::new(38.25, 105.01)), None);
    }

    #[test]
    fn test_geokeys_parse_raster_type() {
        let keys = GeoKeys::parse(&[1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 2, 2048, 0, 1, 4326]);
        assert_eq!(keys.model_type, Some(2));
        assert_eq!(keys.raster_type, Some(RASTER_PIXEL_IS_POINT));
        assert_eq!(keys.projected, None);
        assert_eq!(keys.crs(), Ok(CrsCode::Epsg4326));
    }

    #[test]
    fn test_geokeys_skip_non_inline_values() {
        let keys = GeoKeys::parse(&[1, 1, 0, 2, 1025, 34736, 1, 0, 3072, 0, 1, 3857]);
        assert_eq!(keys.raster_type, None);
        assert_eq!(keys.crs(), Ok(CrsCode::Epsg3857));
    }

    #[test]
    fn test_geokeys_truncated_directory() {
        assert_eq!(GeoKeys::parse(&[1, 1]), GeoKeys::default());
        let keys = GeoKeys::parse(&[1, 1, 0, 5, 1024, 0, 1, 1]);
        assert_eq!(keys.model_type, Some(MODEL_TYPE_PROJECTED));
        assert!(keys.crs().is_err());
    }

    #[test]
    fn test_first_band_deinterleaves() {
        assert_eq!(first_band(vec![1, 9, 2, 9, 3, 9], 2), vec![1, 2, 3]);
        assert_eq!(first_band(vec![1, 2, 3], 1), vec![1, 2, 3]);
    }
}
