//! A library and CLI tool for turn-by-turn directions along routes of named
//! street segments.
//!
//! Routes are assembled from immutable [`GeoSegment`]s, each a named straight
//! line between two [`GeoPoint`]s. Consecutive segments sharing a name are
//! coalesced into [`GeoFeature`]s, and a [`RouteFormatter`] renders one line
//! of directions per feature, announcing each change of heading as a
//! [`Turn`].
//!
//! Distances and headings use a flat-earth approximation with fixed
//! kilometers-per-degree scale factors, so they are only meaningful for routes
//! spanning a small region.
//!
//! See the [`plan_directions`] function, which is used by the CLI, for the
//! main entry point into the library.
//!
//! # Feature flags
//!
//! - `cli` enables the additional dependencies needed by the CLI

pub mod catalog;
mod feature;
mod format;
pub mod internal;
mod measure;
mod route;
mod types;

use thiserror::Error;
use tracing::debug;

pub use feature::{FeatureError, GeoFeature};
pub use format::{
    DEFAULT_WALKING_SPEED, DirectionsOptions, DrivingRouteFormatter, FormatError, RouteFormatter,
    TravelMode, Turn, WalkingRouteFormatter,
};
pub use measure::{Degrees, Hours, Kilometers, KilometersPerHour, Minutes};
pub use route::{Route, RouteError};
pub use types::{
    GeoPoint, GeoPointDimension, GeoSegment, KM_PER_DEGREE_LATITUDE, KM_PER_DEGREE_LONGITUDE,
    MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE, TypeError,
};

#[derive(Error, Debug)]
pub enum TurnByTurnError {
    #[error("Core type error")]
    Type(#[from] TypeError),
    #[error("Feature error")]
    Feature(#[from] FeatureError),
    #[error("Route error")]
    Route(#[from] RouteError),
    #[error("Format error")]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, TurnByTurnError>;

/// Both renderings of a route's directions.
#[derive(Clone, Debug)]
pub struct Directions {
    /// The assembled route, with any reversed segments flipped into place.
    pub route: Route,

    /// Directions with driving distances.
    pub driving: String,

    /// Directions with walking times.
    pub walking: String,
}

impl Directions {
    /// Directions for a single travel mode.
    pub fn for_mode(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Driving => &self.driving,
            TravelMode::Walking => &self.walking,
        }
    }
}

/// Assemble a route and render its directions.
///
/// The segments are appended in order, each one either starting where the
/// previous one ended or, if given backwards, ending there. Both the driving
/// and the walking directions are rendered from the resulting route.
pub fn plan_directions<I>(segments: I, options: DirectionsOptions) -> Result<Directions>
where
    I: IntoIterator<Item = GeoSegment>,
{
    let route = Route::from_segments(segments)?;
    debug!(
        "Planning directions over {} segments in {} features",
        route.len(),
        route.num_features()
    );

    let heading = options.initial_heading();
    let driving = TravelMode::Driving
        .formatter(&options)
        .compute_directions(&route, heading);
    let walking = TravelMode::Walking
        .formatter(&options)
        .compute_directions(&route, heading);

    Ok(Directions {
        route,
        driving,
        walking,
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_plan_directions_from_catalog() -> Result<()> {
        let segments = catalog::segments()?;
        let directions = plan_directions(
            segments.into_iter().skip(1).take(2),
            DirectionsOptions::default(),
        )?;
        assert_eq!(directions.route.num_features(), 1);
        assert_eq!(
            directions.for_mode(TravelMode::Driving),
            "Turn slight right onto Trumpeldor Avenue and go 0.7 kilometers.\n"
        );
        assert_eq!(
            directions.for_mode(TravelMode::Walking),
            "Turn slight right onto Trumpeldor Avenue and walk for 15 minutes.\n"
        );
        Ok(())
    }

    #[test]
    fn test_plan_directions_empty() {
        let result = plan_directions(Vec::new(), DirectionsOptions::default());
        assert!(matches!(
            result,
            Err(TurnByTurnError::Route(RouteError::Empty))
        ));
    }
}
