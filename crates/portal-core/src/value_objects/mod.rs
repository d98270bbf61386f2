//! Value objects - immutable types that represent domain concepts

mod geo_point;
mod ids;

pub use geo_point::{GeoPoint, GeoPointError, SRID_WGS84};
pub use ids::{IdParseError, LogEntryId, ProfileId, UserId};
