//! Common types shared by the NDVI raster store and the HTTP service.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod period;
pub mod point;

pub use bbox::{BoundingBox, TENGGELI_REGION};
pub use crs::CrsCode;
pub use error::{NdviError, NdviResult};
pub use period::YearMonth;
pub use point::GeoPoint;
