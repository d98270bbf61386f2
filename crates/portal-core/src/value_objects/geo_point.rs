//! Geographic point in WGS 84 (SRID 4326)
//!
//! Accepted text forms:
//! - WKT: `POINT(x y)`, case-insensitive, optionally prefixed with `SRID=4326;`
//! - GeoJSON: `{"type": "Point", "coordinates": [x, y]}`
//!
//! `x` is the longitude and `y` the latitude.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spatial reference id of WGS 84 longitude/latitude
pub const SRID_WGS84: i32 = 4326;

/// Errors raised while building or parsing a point
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoPointError {
    #[error("longitude {0} is outside -180..180")]
    LongitudeOutOfRange(f64),

    #[error("latitude {0} is outside -90..90")]
    LatitudeOutOfRange(f64),

    #[error("unsupported SRID {0}")]
    UnsupportedSrid(String),

    #[error("malformed geometry: {0}")]
    Malformed(String),
}

/// A longitude/latitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Create a point, validating coordinate ranges
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoPointError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::LongitudeOutOfRange(longitude));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// GeoJSON coordinate order: `[x, y]`
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Render as WKT, e.g. `POINT(1 1)`
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// Parse a WKT point with an optional `SRID=...;` prefix
    pub fn parse_wkt(input: &str) -> Result<Self, GeoPointError> {
        let mut body = input.trim();

        if let Some((prefix, rest)) = body.split_once(';') {
            let srid = prefix
                .trim()
                .get(..5)
                .filter(|tag| tag.eq_ignore_ascii_case("SRID="))
                .map(|_| prefix.trim()[5..].trim())
                .ok_or_else(|| GeoPointError::Malformed(input.to_string()))?;
            if srid.parse::<i32>().ok() != Some(SRID_WGS84) {
                return Err(GeoPointError::UnsupportedSrid(srid.to_string()));
            }
            body = rest.trim();
        }

        let malformed = || GeoPointError::Malformed(input.to_string());

        let inner = body
            .get(..5)
            .filter(|tag| tag.eq_ignore_ascii_case("POINT"))
            .map(|_| body[5..].trim())
            .ok_or_else(malformed)?;
        let inner = inner
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut parts = inner.split_whitespace();
        let x = parts.next().and_then(|v| v.parse::<f64>().ok());
        let y = parts.next().and_then(|v| v.parse::<f64>().ok());
        match (x, y, parts.next()) {
            (Some(x), Some(y), None) => Self::new(x, y),
            _ => Err(malformed()),
        }
    }

    /// Parse a GeoJSON `Point` geometry object
    pub fn from_geojson(input: &str) -> Result<Self, GeoPointError> {
        #[derive(Deserialize)]
        struct PointGeometry {
            #[serde(rename = "type")]
            kind: String,
            coordinates: Vec<f64>,
        }

        let geometry: PointGeometry = serde_json::from_str(input)
            .map_err(|e| GeoPointError::Malformed(e.to_string()))?;

        if geometry.kind != "Point" {
            return Err(GeoPointError::Malformed(format!(
                "expected Point geometry, got {}",
                geometry.kind
            )));
        }

        match geometry.coordinates.as_slice() {
            [x, y] | [x, y, _] => Self::new(*x, *y),
            _ => Err(GeoPointError::Malformed(
                "Point coordinates must have two or three members".to_string(),
            )),
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

impl FromStr for GeoPoint {
    type Err = GeoPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') {
            Self::from_geojson(trimmed)
        } else {
            Self::parse_wkt(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_wkt() {
        let point: GeoPoint = "POINT(1 1)".parse().unwrap();
        assert_eq!(point.longitude(), 1.0);
        assert_eq!(point.latitude(), 1.0);
        assert_eq!(point.to_wkt(), "POINT(1 1)");
    }

    #[test]
    fn test_parse_wkt_variants() {
        let point: GeoPoint = "  point ( -73.9857 40.7484 ) ".parse().unwrap();
        assert_eq!(point.coordinates(), [-73.9857, 40.7484]);

        let point: GeoPoint = "SRID=4326;POINT(77.5946 12.9716)".parse().unwrap();
        assert_eq!(point.longitude(), 77.5946);
    }

    #[test]
    fn test_rejects_other_srid() {
        let err = "SRID=3857;POINT(1 1)".parse::<GeoPoint>().unwrap_err();
        assert_eq!(err, GeoPointError::UnsupportedSrid("3857".to_string()));
    }

    #[test]
    fn test_rejects_malformed_wkt() {
        assert!("POINT(1)".parse::<GeoPoint>().is_err());
        assert!("POINT(1 2 3)".parse::<GeoPoint>().is_err());
        assert!("LINESTRING(0 0, 1 1)".parse::<GeoPoint>().is_err());
        assert!("not a point".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            "POINT(181 0)".parse::<GeoPoint>(),
            Err(GeoPointError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            "POINT(0 -91)".parse::<GeoPoint>(),
            Err(GeoPointError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_geojson() {
        let point: GeoPoint = r#"{"type": "Point", "coordinates": [2.35, 48.85]}"#
            .parse()
            .unwrap();
        assert_eq!(point.coordinates(), [2.35, 48.85]);

        let err = r#"{"type": "Polygon", "coordinates": []}"#
            .parse::<GeoPoint>()
            .unwrap_err();
        assert!(matches!(err, GeoPointError::Malformed(_)));
    }
}
