//! Named geographic features
//!
//! A [`GeoFeature`] is a contiguous run of [`GeoSegment`]s sharing one name,
//! such as the stretch of a single road travelled along a route. Features are
//! grown one segment at a time with [`GeoFeature::add_segment`], which leaves
//! the original feature untouched.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use approx::relative_eq;
use thiserror::Error;

use crate::measure::{Degrees, Kilometers};
use crate::types::{GeoPoint, GeoSegment};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("segment named {found:?} cannot extend feature {expected:?}")]
    NameMismatch { expected: String, found: String },
    #[error("segment starting at {start} does not continue from feature end {end}")]
    Disconnected { end: GeoPoint, start: GeoPoint },
}

type Result<T> = std::result::Result<T, FeatureError>;

#[derive(Clone, Debug)]
pub struct GeoFeature {
    name: String,

    /// Never empty. Every segment carries `name` and starts where the previous
    /// one ends.
    segments: Vec<GeoSegment>,

    start: GeoPoint,
    end: GeoPoint,
    start_heading: Degrees<f64>,
    end_heading: Degrees<f64>,
    length: Kilometers<f64>,
}

impl GeoFeature {
    /// Start a feature consisting of a single segment.
    pub fn new(segment: GeoSegment) -> Self {
        Self {
            name: segment.name().to_owned(),
            start: segment.p1(),
            end: segment.p2(),
            start_heading: segment.heading(),
            end_heading: segment.heading(),
            length: segment.length(),
            segments: vec![segment],
        }
    }

    /// Returns a new feature extended by `segment`.
    ///
    /// The segment must have the same name as this feature and must start at
    /// this feature's end. Unlike [`crate::Route::add_segment`], a segment
    /// given in the wrong orientation is rejected rather than reversed.
    pub fn add_segment(&self, segment: GeoSegment) -> Result<GeoFeature> {
        if segment.name() != self.name {
            return Err(FeatureError::NameMismatch {
                expected: self.name.clone(),
                found: segment.name().to_owned(),
            });
        }
        if segment.p1() != self.end {
            return Err(FeatureError::Disconnected {
                end: self.end,
                start: segment.p1(),
            });
        }

        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        let end = segment.p2();
        let end_heading = segment.heading();
        let length = self.length + segment.length();
        segments.push(segment);

        Ok(Self {
            name: self.name.clone(),
            segments,
            start: self.start,
            end,
            start_heading: self.start_heading,
            end_heading,
            length,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the first segment starts.
    pub fn start(&self) -> GeoPoint {
        self.start
    }

    /// Where the last segment ends.
    pub fn end(&self) -> GeoPoint {
        self.end
    }

    /// Heading of the first segment.
    pub fn start_heading(&self) -> Degrees<f64> {
        self.start_heading
    }

    /// Heading of the last segment.
    pub fn end_heading(&self) -> Degrees<f64> {
        self.end_heading
    }

    /// Total length of the feature's segments.
    pub fn length(&self) -> Kilometers<f64> {
        self.length
    }

    /// Iterate over copies of the feature's segments, in order.
    pub fn geo_segments(&self) -> impl ExactSizeIterator<Item = GeoSegment> + '_ {
        self.segments.iter().cloned()
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }
}

/// Tolerance for comparing the derived lengths and headings of features.
const DERIVED_MAX_RELATIVE: f64 = 1e-9;

/// Features are equal when they share a name and extent: the same endpoints,
/// headings and length. How the extent is split into segments is ignored.
impl PartialEq for GeoFeature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.start == other.start
            && self.end == other.end
            && relative_eq!(
                self.start_heading,
                other.start_heading,
                max_relative = DERIVED_MAX_RELATIVE
            )
            && relative_eq!(
                self.end_heading,
                other.end_heading,
                max_relative = DERIVED_MAX_RELATIVE
            )
            && relative_eq!(self.length, other.length, max_relative = DERIVED_MAX_RELATIVE)
    }
}

impl Eq for GeoFeature {}

// Only the exactly compared fields take part.
impl Hash for GeoFeature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl Display for GeoFeature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {} to {} ({:.1})",
            self.name, self.start, self.end, self.length
        )
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use approx::assert_relative_eq;

    use super::*;
    use crate::{geo_point, geo_segment};

    #[test]
    fn test_single_segment_feature() -> Result<()> {
        let seg = geo_segment!("Hagalil", (32_787_081, 35_020_735), (32_789_768, 35_018_578));
        let feature = GeoFeature::new(seg.clone());

        assert_eq!(feature.name(), "Hagalil");
        assert_eq!(feature.start(), seg.p1());
        assert_eq!(feature.end(), seg.p2());
        assert_eq!(feature.start_heading(), seg.heading());
        assert_eq!(feature.end_heading(), seg.heading());
        assert_eq!(feature.length(), seg.length());
        assert_eq!(feature.geo_segments().collect::<Vec<_>>(), vec![seg]);
        Ok(())
    }

    #[test]
    fn test_add_segment() -> Result<()> {
        let first = geo_segment!("Hagalil", (32_787_081, 35_020_735), (32_789_768, 35_018_578));
        let second = geo_segment!("Hagalil", (32_789_768, 35_018_578), (32_795_631, 35_010_296));
        let feature = GeoFeature::new(first.clone());
        let extended = feature.add_segment(second.clone())?;

        assert_eq!(extended.start(), first.p1());
        assert_eq!(extended.end(), second.p2());
        assert_eq!(extended.start_heading(), first.heading());
        assert_eq!(extended.end_heading(), second.heading());
        assert_relative_eq!(extended.length(), first.length() + second.length());
        assert_eq!(
            extended.geo_segments().collect::<Vec<_>>(),
            vec![first.clone(), second]
        );

        // The original feature is unaffected.
        assert_eq!(feature.num_segments(), 1);
        assert_eq!(feature.end(), first.p2());
        assert_ne!(feature, extended);
        Ok(())
    }

    #[test]
    fn test_add_segment_name_mismatch() -> Result<()> {
        let feature = GeoFeature::new(geo_segment!("Hanita", (0, 0), (1_000, 0)));
        let result = feature.add_segment(geo_segment!("Hagalil", (1_000, 0), (2_000, 0)));
        assert_eq!(
            result,
            Err(FeatureError::NameMismatch {
                expected: "Hanita".to_owned(),
                found: "Hagalil".to_owned(),
            })
        );
        Ok(())
    }

    #[test]
    fn test_add_segment_disconnected() -> Result<()> {
        let feature = GeoFeature::new(geo_segment!("Hanita", (0, 0), (1_000, 0)));

        let result = feature.add_segment(geo_segment!("Hanita", (1_500, 0), (2_000, 0)));
        assert_eq!(
            result,
            Err(FeatureError::Disconnected {
                end: geo_point!(1_000, 0),
                start: geo_point!(1_500, 0),
            })
        );

        // No reversal fallback for features.
        let backwards = geo_segment!("Hanita", (2_000, 0), (1_000, 0));
        assert!(feature.add_segment(backwards).is_err());
        Ok(())
    }

    #[test]
    fn test_geo_segments_is_restartable() -> Result<()> {
        let feature = GeoFeature::new(geo_segment!("Ruppin Road", (0, 0), (1_000, 0)))
            .add_segment(geo_segment!("Ruppin Road", (1_000, 0), (1_000, 1_000)))?;
        let first_pass = feature.geo_segments().collect::<Vec<_>>();
        let second_pass = feature.geo_segments().collect::<Vec<_>>();
        assert_eq!(first_pass.len(), 2);
        assert_eq!(first_pass, second_pass);
        Ok(())
    }

    #[test]
    fn test_feature_equality() -> Result<()> {
        let a = GeoFeature::new(geo_segment!("Ruppin Road", (0, 0), (1_000, 0)))
            .add_segment(geo_segment!("Ruppin Road", (1_000, 0), (1_000, 1_000)))?;
        let b = GeoFeature::new(geo_segment!("Ruppin Road", (0, 0), (1_000, 0)))
            .add_segment(geo_segment!("Ruppin Road", (1_000, 0), (1_000, 1_000)))?;
        let c = GeoFeature::new(geo_segment!("Ruppin Road", (0, 0), (1_000, 1_000)));

        assert_eq!(a, b);
        // Same endpoints, but a shorter path with different headings.
        assert_ne!(a, c);
        Ok(())
    }

    #[test]
    fn test_equality_ignores_segment_split() -> Result<()> {
        let split = GeoFeature::new(geo_segment!("Hanita", (0, 0), (1_000, 0)))
            .add_segment(geo_segment!("Hanita", (1_000, 0), (2_000, 0)))?;
        let whole = GeoFeature::new(geo_segment!("Hanita", (0, 0), (2_000, 0)));
        assert_eq!(split.num_segments(), 2);
        assert_eq!(split, whole);

        let renamed = GeoFeature::new(geo_segment!("Hagalil", (0, 0), (2_000, 0)));
        assert_ne!(split, renamed);
        Ok(())
    }
}
