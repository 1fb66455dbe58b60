//! Routes assembled from named segments
//!
//! A [`Route`] is an end-to-end chain of [`GeoSegment`]s whose names may
//! change along the way. Besides the raw segments, a route keeps a coalesced
//! view of its [`GeoFeature`]s, where each run of consecutive same-named
//! segments becomes a single feature. Directions are generated from that
//! feature view.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use thiserror::Error;
use tracing::debug;

use crate::feature::{FeatureError, GeoFeature};
use crate::measure::{Degrees, Kilometers};
use crate::types::{GeoPoint, GeoSegment};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("segment {name:?} ({p1} to {p2}) does not touch route end {end}")]
    Disconnected {
        name: String,
        p1: GeoPoint,
        p2: GeoPoint,
        end: GeoPoint,
    },
    #[error("Attempt to build a route from no segments")]
    Empty,
    #[error("Feature error")]
    Feature(#[from] FeatureError),
}

type Result<T> = std::result::Result<T, RouteError>;

#[derive(Clone, Debug)]
pub struct Route {
    /// The segments in order of traversal. Never empty.
    segments: Vec<GeoSegment>,

    /// Maximal runs of same-named segments, in order. No two adjacent
    /// features share a name.
    features: Vec<GeoFeature>,

    start: GeoPoint,
    end: GeoPoint,
    start_heading: Degrees<f64>,
    end_heading: Degrees<f64>,
    length: Kilometers<f64>,
}

impl Route {
    /// Start a route consisting of a single segment.
    pub fn new(segment: GeoSegment) -> Self {
        Self {
            start: segment.p1(),
            end: segment.p2(),
            start_heading: segment.heading(),
            end_heading: segment.heading(),
            length: segment.length(),
            features: vec![GeoFeature::new(segment.clone())],
            segments: vec![segment],
        }
    }

    /// Build a route by appending each segment in turn.
    ///
    /// Segments are subject to the same orientation handling as
    /// [`Route::add_segment`].
    pub fn from_segments<I>(segments: I) -> Result<Route>
    where
        I: IntoIterator<Item = GeoSegment>,
    {
        let mut iter = segments.into_iter();
        let first = iter.next().ok_or(RouteError::Empty)?;
        iter.try_fold(Route::new(first), |route, segment| {
            route.add_segment(segment)
        })
    }

    /// Returns a new route extended by `segment`.
    ///
    /// The segment must start at this route's end. If instead it *ends* there,
    /// it is reversed before being appended, so catalog segments may be given
    /// in either orientation. A segment touching the end with neither endpoint
    /// is rejected.
    ///
    /// When the segment has the same name as the last feature it extends that
    /// feature; otherwise it begins a new one.
    pub fn add_segment(&self, segment: GeoSegment) -> Result<Route> {
        let segment = if segment.p1() == self.end {
            segment
        } else if segment.p2() == self.end {
            debug!(
                "Reversing segment {:?} to continue from {}",
                segment.name(),
                self.end
            );
            segment.reverse()
        } else {
            return Err(RouteError::Disconnected {
                name: segment.name().to_owned(),
                p1: segment.p1(),
                p2: segment.p2(),
                end: self.end,
            });
        };

        let mut features = Vec::with_capacity(self.features.len() + 1);
        features.extend(self.features.iter().cloned());
        match features.last_mut() {
            Some(last) if last.name() == segment.name() => {
                *last = last.add_segment(segment.clone())?;
            }
            _ => {
                debug!("Starting new feature {:?}", segment.name());
                features.push(GeoFeature::new(segment.clone()));
            }
        }

        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        let end = segment.p2();
        let end_heading = segment.heading();
        let length = self.length + segment.length();
        segments.push(segment);

        Ok(Self {
            segments,
            features,
            start: self.start,
            end,
            start_heading: self.start_heading,
            end_heading,
            length,
        })
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

    /// Total length of the route's segments.
    pub fn length(&self) -> Kilometers<f64> {
        self.length
    }

    /// Iterate over copies of the route's features, in order.
    pub fn geo_features(&self) -> impl ExactSizeIterator<Item = GeoFeature> + '_ {
        self.features.iter().cloned()
    }

    /// Iterate over copies of the route's segments, in order.
    ///
    /// Segments appended in reverse orientation appear here as reversed.
    pub fn geo_segments(&self) -> impl ExactSizeIterator<Item = GeoSegment> + '_ {
        self.segments.iter().cloned()
    }

    /// The number of segments in the route.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }
}

/// Routes are equal when their feature sequences are equal, element by
/// element. Features compare by name and extent, so routes that split the same
/// streets into segments differently are still equal.
impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.features.hash(state);
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Route from {} to {} ({:.1})",
            self.start, self.end, self.length
        )?;
        for feature in &self.features {
            write!(f, "\n  {feature}")?;
        }
        Ok(())
    }
}
