use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::measure::{Degrees, Kilometers};

/// Lowest valid latitude, in millionths of a degree.
pub const MIN_LATITUDE: i32 = -90_000_000;

/// Highest valid latitude, in millionths of a degree.
pub const MAX_LATITUDE: i32 = 90_000_000;

/// Lowest valid longitude, in millionths of a degree.
pub const MIN_LONGITUDE: i32 = -180_000_000;

/// Highest valid longitude, in millionths of a degree.
pub const MAX_LONGITUDE: i32 = 180_000_000;

/// Kilometers spanned by one degree of latitude in the local flat-earth
/// approximation.
pub const KM_PER_DEGREE_LATITUDE: f64 = 110.901;

/// Kilometers spanned by one degree of longitude in the local flat-earth
/// approximation.
pub const KM_PER_DEGREE_LONGITUDE: f64 = 93.681;

const MICRODEGREES_PER_DEGREE: f64 = 1_000_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("geographic point invariant: invalid value {1} for {0:?}")]
    GeoPointInvariant(GeoPointDimension, f64),
    #[error("geographic segment invariant: empty name")]
    EmptyName,
}

type Result<T> = std::result::Result<T, TypeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoPointDimension {
    Latitude,
    Longitude,
}

/// A point on the earth's surface, in millionths of a degree.
///
/// Enforces valid latitude and longitude values as type invariants. Equality
/// and hashing only ever look at the two integer coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GeoPoint {
    lat: i32,
    lon: i32,
}

impl GeoPoint {
    pub fn new(lat: i32, lon: i32) -> Result<GeoPoint> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err(TypeError::GeoPointInvariant(
                GeoPointDimension::Latitude,
                lat as f64 / MICRODEGREES_PER_DEGREE,
            ));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
            return Err(TypeError::GeoPointInvariant(
                GeoPointDimension::Longitude,
                lon as f64 / MICRODEGREES_PER_DEGREE,
            ));
        }
        Ok(Self { lat, lon })
    }

    /// Create a point from decimal degrees, rounding to the nearest millionth.
    pub fn from_degrees(lat: Degrees<f64>, lon: Degrees<f64>) -> Result<GeoPoint> {
        let lat_micro = to_microdegrees(lat, GeoPointDimension::Latitude, 90.0)?;
        let lon_micro = to_microdegrees(lon, GeoPointDimension::Longitude, 180.0)?;
        Self::new(lat_micro, lon_micro)
    }

    /// Get point latitude, in millionths of a degree
    pub fn lat(&self) -> i32 {
        self.lat
    }

    /// Get point longitude, in millionths of a degree
    pub fn lon(&self) -> i32 {
        self.lon
    }

    pub fn lat_degrees(&self) -> Degrees<f64> {
        Degrees(self.lat as f64 / MICRODEGREES_PER_DEGREE)
    }

    pub fn lon_degrees(&self) -> Degrees<f64> {
        Degrees(self.lon as f64 / MICRODEGREES_PER_DEGREE)
    }

    /// Position on the locally scaled plane, as (north, east) kilometers.
    fn scaled(&self) -> (f64, f64) {
        (
            self.lat_degrees().0 * KM_PER_DEGREE_LATITUDE,
            self.lon_degrees().0 * KM_PER_DEGREE_LONGITUDE,
        )
    }

    /// Distance to another point.
    ///
    /// Uses a flat-earth approximation with fixed kilometers-per-degree scale
    /// factors, so it is only meaningful between nearby points.
    pub fn distance_to(&self, other: &GeoPoint) -> Kilometers<f64> {
        let (north1, east1) = self.scaled();
        let (north2, east2) = other.scaled();
        Kilometers((north2 - north1).hypot(east2 - east1))
    }

    /// Compass heading from this point to another.
    ///
    /// Measured clockwise from north and normalized to `[0, 360)` degrees,
    /// using the same flat-earth approximation as [`GeoPoint::distance_to`].
    /// The heading to a coincident point is 0.
    pub fn heading_to(&self, other: &GeoPoint) -> Degrees<f64> {
        let (north1, east1) = self.scaled();
        let (north2, east2) = other.scaled();
        let heading = (east2 - east1).atan2(north2 - north1).to_degrees();
        normalize_heading(heading)
    }
}

fn to_microdegrees(value: Degrees<f64>, dim: GeoPointDimension, bound: f64) -> Result<i32> {
    if !value.0.is_finite() || value.0 < -bound || value.0 > bound {
        return Err(TypeError::GeoPointInvariant(dim, value.0));
    }
    Ok((value.0 * MICRODEGREES_PER_DEGREE).round() as i32)
}

/// Fold a heading in degrees into `[0, 360)`.
pub(crate) fn normalize_heading(degrees: f64) -> Degrees<f64> {
    let folded = if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    };
    // Adding 360 to a tiny negative value can round up to exactly 360.
    if folded >= 360.0 {
        Degrees(0.0)
    } else {
        Degrees(folded)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ns = if self.lat < 0 { 'S' } else { 'N' };
        let ew = if self.lon < 0 { 'W' } else { 'E' };
        write!(
            f,
            "({:.6} {}, {:.6} {})",
            self.lat_degrees().0.abs(),
            ns,
            self.lon_degrees().0.abs(),
            ew
        )
    }
}

/// A named, directed straight line between two points.
///
/// Length and heading are computed once from the endpoints at construction.
/// Two segments are equal only if their names match and their endpoints match
/// in the same order.
#[derive(Clone, Debug)]
pub struct GeoSegment {
    name: String,
    point1: GeoPoint,
    point2: GeoPoint,
    length: Kilometers<f64>,
    heading: Degrees<f64>,
}

impl GeoSegment {
    pub fn new<S: Into<String>>(name: S, point1: GeoPoint, point2: GeoPoint) -> Result<GeoSegment> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::EmptyName);
        }
        Ok(Self::from_parts(name, point1, point2))
    }

    fn from_parts(name: String, point1: GeoPoint, point2: GeoPoint) -> GeoSegment {
        Self {
            length: point1.distance_to(&point2),
            heading: point1.heading_to(&point2),
            name,
            point1,
            point2,
        }
    }

    /// The same segment traversed in the opposite direction.
    ///
    /// The heading is recomputed from the swapped endpoints; because the two
    /// axes are scaled differently it is generally not `360 - heading`.
    pub fn reverse(&self) -> GeoSegment {
        Self::from_parts(self.name.clone(), self.point2, self.point1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn p1(&self) -> GeoPoint {
        self.point1
    }

    pub fn p2(&self) -> GeoPoint {
        self.point2
    }

    pub fn length(&self) -> Kilometers<f64> {
        self.length
    }

    /// Heading from `p1` towards `p2`. Meaningless for zero-length segments.
    pub fn heading(&self) -> Degrees<f64> {
        self.heading
    }

    pub fn is_zero_length(&self) -> bool {
        self.point1 == self.point2
    }
}

impl PartialEq for GeoSegment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.point1 == other.point1 && self.point2 == other.point2
    }
}

impl Eq for GeoSegment {}

impl Hash for GeoSegment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.point1.hash(state);
        self.point2.hash(state);
    }
}

impl Display for GeoSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {} to {} ({:.1}, heading {:.1})",
            self.name, self.point1, self.point2, self.length, self.heading
        )
    }
}

/// Instantiate a `GeoPoint` from millionths of a degree with a tuple-like
/// syntax.
#[macro_export]
macro_rules! geo_point {
    ( $lat:expr, $lon:expr ) => {
        $crate::GeoPoint::new($lat, $lon)?
    };
}

/// Instantiate a `GeoSegment` from a name and two `(lat, lon)` pairs in
/// millionths of a degree.
#[macro_export]
macro_rules! geo_segment {
    ( $name:expr, ( $lat1:expr, $lon1:expr ), ( $lat2:expr, $lon2:expr ) $(,)? ) => {
        $crate::GeoSegment::new(
            $name,
            $crate::geo_point!($lat1, $lon1),
            $crate::geo_point!($lat2, $lon2),
        )?
    };
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod qc {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use super::*;

    #[derive(Clone, Debug)]
    struct ArbPoint(GeoPoint);

    impl Arbitrary for ArbPoint {
        fn arbitrary(g: &mut Gen) -> Self {
            // Stay within a few degrees, where the approximation is meant to
            // hold and the lattice of points is still dense.
            let lat = 32_000_000 + (u32::arbitrary(g) % 2_000_001) as i32 - 1_000_000;
            let lon = 35_000_000 + (u32::arbitrary(g) % 2_000_001) as i32 - 1_000_000;
            ArbPoint(GeoPoint { lat, lon })
        }
    }

    #[quickcheck]
    fn qc_distance_symmetric(a: ArbPoint, b: ArbPoint) -> bool {
        a.0.distance_to(&b.0) == b.0.distance_to(&a.0)
    }

    #[quickcheck]
    fn qc_heading_in_range(a: ArbPoint, b: ArbPoint) -> bool {
        let h = a.0.heading_to(&b.0).0;
        (0.0..360.0).contains(&h)
    }

    #[quickcheck]
    fn qc_double_reverse_is_identity(a: ArbPoint, b: ArbPoint) -> bool {
        let Ok(seg) = GeoSegment::new("Street", a.0, b.0) else {
            return false;
        };
        let rev = seg.reverse();
        rev.reverse() == seg && (rev == seg) == seg.is_zero_length()
    }
}
