//! Rendering routes as turn-by-turn directions
//!
//! Directions are produced one line per [`GeoFeature`] of a [`Route`]. Each
//! line starts with a [`Turn`] describing the change from the traveller's
//! current heading to the feature's starting heading, followed by an extent
//! phrase which depends on the [`RouteFormatter`] in use.

use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::feature::GeoFeature;
use crate::measure::{Degrees, Hours, KilometersPerHour, Minutes};
use crate::route::Route;
use crate::types::normalize_heading;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("walking speed must be positive and finite, got {0}")]
    InvalidWalkingSpeed(KilometersPerHour<f64>),
}

type Result<T> = std::result::Result<T, FormatError>;

fn check_walking_speed(speed: KilometersPerHour<f64>) -> Result<KilometersPerHour<f64>> {
    if speed.0.is_finite() && speed.0 > 0.0 {
        Ok(speed)
    } else {
        Err(FormatError::InvalidWalkingSpeed(speed))
    }
}

/// A change in heading, as announced to the traveller.
///
/// Displays as the phrase used in directions, e.g. `Turn slight right`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumString)]
pub enum Turn {
    #[strum(serialize = "Continue")]
    Continue,
    #[strum(serialize = "Turn slight right")]
    SlightRight,
    #[strum(serialize = "Turn right")]
    Right,
    #[strum(serialize = "Turn sharp right")]
    SharpRight,
    #[strum(serialize = "U-turn")]
    UTurn,
    #[strum(serialize = "Turn sharp left")]
    SharpLeft,
    #[strum(serialize = "Turn left")]
    Left,
    #[strum(serialize = "Turn slight left")]
    SlightLeft,
}

impl Turn {
    /// Classify the turn from heading `old` onto heading `new`.
    ///
    /// The clockwise change `a = new - old`, folded into `[0, 360)`, is binned
    /// as follows:
    ///
    /// | a                | turn             |
    /// |------------------|------------------|
    /// | < 10 or > 350    | Continue         |
    /// | [10, 60)         | Turn slight right|
    /// | [60, 120)        | Turn right       |
    /// | [120, 179)       | Turn sharp right |
    /// | [179, 181]       | U-turn           |
    /// | (181, 240]       | Turn sharp left  |
    /// | (240, 300]       | Turn left        |
    /// | (300, 350]       | Turn slight left |
    pub fn between(old: Degrees<f64>, new: Degrees<f64>) -> Turn {
        let delta = new.0 - old.0;
        let a = if delta < 0.0 { delta + 360.0 } else { delta };

        if !(10.0..=350.0).contains(&a) {
            Turn::Continue
        } else if a < 60.0 {
            Turn::SlightRight
        } else if a < 120.0 {
            Turn::Right
        } else if a < 179.0 {
            Turn::SharpRight
        } else if a <= 181.0 {
            Turn::UTurn
        } else if a <= 240.0 {
            Turn::SharpLeft
        } else if a <= 300.0 {
            Turn::Left
        } else {
            Turn::SlightLeft
        }
    }
}

/// Renders a route as directions, one line per feature.
pub trait RouteFormatter {
    /// Compute the directions line for a single feature.
    ///
    /// `heading` is the traveller's heading before entering the feature. The
    /// returned line has no terminator.
    fn compute_line(&self, feature: &GeoFeature, heading: Degrees<f64>) -> String;

    /// Compute directions for an entire route.
    ///
    /// Walks the route's features in order, starting at `heading` and then
    /// continuing from each feature's end heading. Every line, including the
    /// last, is terminated with a newline.
    #[instrument(level = "trace", skip_all)]
    fn compute_directions(&self, route: &Route, heading: Degrees<f64>) -> String {
        let mut directions = String::new();
        let mut heading = heading;
        for feature in route.geo_features() {
            directions.push_str(&self.compute_line(&feature, heading));
            directions.push('\n');
            heading = feature.end_heading();
        }
        debug!(
            "Computed {} lines of directions over {:.1}",
            route.num_features(),
            route.length()
        );
        directions
    }
}

/// Directions giving the distance to drive along each feature.
#[derive(Clone, Copy, Default, Debug)]
pub struct DrivingRouteFormatter;

impl RouteFormatter for DrivingRouteFormatter {
    fn compute_line(&self, feature: &GeoFeature, heading: Degrees<f64>) -> String {
        format!(
            "{} onto {} and go {:.1} kilometers.",
            Turn::between(heading, feature.start_heading()),
            feature.name(),
            feature.length().0
        )
    }
}

/// Directions giving the time to walk along each feature.
#[derive(Clone, Copy, Debug)]
pub struct WalkingRouteFormatter {
    speed: KilometersPerHour<f64>,
}

/// 20 minutes per kilometer.
pub const DEFAULT_WALKING_SPEED: KilometersPerHour<f64> = KilometersPerHour(3.0);

impl WalkingRouteFormatter {
    /// Estimate walking times at the given speed, which must be positive.
    pub fn with_speed(mut self, speed: KilometersPerHour<f64>) -> Result<Self> {
        self.speed = check_walking_speed(speed)?;
        Ok(self)
    }

    pub fn speed(&self) -> KilometersPerHour<f64> {
        self.speed
    }
}

impl Default for WalkingRouteFormatter {
    fn default() -> Self {
        Self {
            speed: DEFAULT_WALKING_SPEED,
        }
    }
}

impl RouteFormatter for WalkingRouteFormatter {
    fn compute_line(&self, feature: &GeoFeature, heading: Degrees<f64>) -> String {
        let time: Hours<f64> = feature.length() / self.speed;
        let minutes = Minutes::from(time).0.round();
        format!(
            "{} onto {} and walk for {} minutes.",
            Turn::between(heading, feature.start_heading()),
            feature.name(),
            minutes as u64
        )
    }
}

/// The two flavors of directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumString)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "cli", clap(rename_all = "snake_case"))]
pub enum TravelMode {
    Driving,
    Walking,
}

impl TravelMode {
    /// Get a formatter for this mode, configured from `options`.
    pub fn formatter(self, options: &DirectionsOptions) -> Box<dyn RouteFormatter> {
        match self {
            TravelMode::Driving => Box::new(DrivingRouteFormatter),
            TravelMode::Walking => Box::new(WalkingRouteFormatter {
                speed: options.walking_speed,
            }),
        }
    }
}

/// Options for rendering directions.
#[derive(Clone, Copy, Debug)]
pub struct DirectionsOptions {
    initial_heading: Degrees<f64>,
    walking_speed: KilometersPerHour<f64>,
}

impl DirectionsOptions {
    /// Set the heading the traveller faces before the route begins
    ///
    /// Folded into `[0, 360)`. Defaults to 0 (north) if unset.
    pub fn with_initial_heading(mut self, heading: Degrees<f64>) -> Self {
        self.initial_heading = normalize_heading(heading.0.rem_euclid(360.0));
        self
    }

    /// Set the speed used to estimate walking times
    ///
    /// Defaults to 3 km/h if unset. Fails unless the speed is positive.
    pub fn with_walking_speed(mut self, speed: KilometersPerHour<f64>) -> Result<Self> {
        self.walking_speed = check_walking_speed(speed)?;
        Ok(self)
    }

    pub fn initial_heading(&self) -> Degrees<f64> {
        self.initial_heading
    }

    pub fn walking_speed(&self) -> KilometersPerHour<f64> {
        self.walking_speed
    }
}

impl Default for DirectionsOptions {
    fn default() -> Self {
        Self {
            initial_heading: Degrees(0.0),
            walking_speed: DEFAULT_WALKING_SPEED,
        }
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod qc {
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::types::{GeoPoint, GeoSegment};

    #[quickcheck]
    fn qc_one_terminated_line_per_feature(steps: Vec<(bool, u16, u16)>) -> TestResult {
        if steps.is_empty() {
            return TestResult::discard();
        }
        let mut at = (32_780_000, 35_010_000);
        let mut segments = Vec::new();
        for (switch, dlat, dlon) in steps {
            let next = (at.0 + dlat as i32 + 1, at.1 + dlon as i32);
            let name = if switch { "Hagalil" } else { "Hanita" };
            let (Ok(p1), Ok(p2)) = (GeoPoint::new(at.0, at.1), GeoPoint::new(next.0, next.1))
            else {
                return TestResult::failed();
            };
            let Ok(seg) = GeoSegment::new(name, p1, p2) else {
                return TestResult::failed();
            };
            segments.push(seg);
            at = next;
        }
        let Ok(route) = Route::from_segments(segments) else {
            return TestResult::failed();
        };

        let formatters: [Box<dyn RouteFormatter>; 2] = [
            Box::new(DrivingRouteFormatter),
            Box::new(WalkingRouteFormatter::default()),
        ];
        TestResult::from_bool(formatters.iter().all(|f| {
            let directions = f.compute_directions(&route, Degrees(0.0));
            directions.ends_with('\n') && directions.lines().count() == route.num_features()
        }))
    }

    #[quickcheck]
    fn qc_turn_is_total(old: u16, new: u16) -> bool {
        // Every heading pair falls into exactly one band; in particular the
        // same heading always continues.
        let old = Degrees(f64::from(old % 360));
        let new = Degrees(f64::from(new % 360));
        let turn = Turn::between(old, new);
        old != new || turn == Turn::Continue
    }
}
