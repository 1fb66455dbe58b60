//! Simple zero-overhead unit of measure types
//!
//! A poor man's version of F#'s units of measure, in order to keep distances,
//! headings and travel times apart by construction.  These are hand-rolled
//! rather than taken from `uom` because the latter obscures the actual storage
//! unit and numeric type.

use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

use approx::{AbsDiffEq, RelativeEq, relative_eq};
use num_traits::{Float, Num};

macro_rules! unit_of_measure {
    ($u:ident, $suffix:literal) => {
        #[derive(Clone, Copy, Default, PartialEq, PartialOrd, Debug)]
        pub struct $u<N: Num>(pub N);

        impl<N> Add for $u<N>
        where
            N: Num,
        {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl<N> Sub for $u<N>
        where
            N: Num,
        {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl<N> Div<N> for $u<N>
        where
            N: Num,
        {
            type Output = Self;

            fn div(self, rhs: N) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl<N> AddAssign for $u<N>
        where
            N: Num + AddAssign,
        {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl<N> Sum for $u<N>
        where
            N: Num,
        {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(N::zero()), |acc, x| acc + x)
            }
        }

        // Forwards the formatter so that precision flags apply to the value.
        impl<N> Display for $u<N>
        where
            N: Num + Display,
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)?;
                f.write_str($suffix)
            }
        }

        // Relative equality traits for appox support

        impl<N> AbsDiffEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N>,
        {
            type Epsilon = N;

            fn default_epsilon() -> Self::Epsilon {
                N::epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                self.0.abs_diff_eq(&other.0, epsilon)
            }
        }

        impl<N> RelativeEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N> + RelativeEq<N>,
        {
            fn default_max_relative() -> Self::Epsilon {
                N::epsilon()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                relative_eq!(
                    self.0,
                    other.0,
                    epsilon = epsilon,
                    max_relative = max_relative
                )
            }
        }
    };
}

macro_rules! unit_ratio_impl {
    ($ratio:ident, $num:ident, $denom:ident) => {
        impl<N> Div<$denom<N>> for $num<N>
        where
            N: Num,
        {
            type Output = $ratio<N>;

            fn div(self, rhs: $denom<N>) -> Self::Output {
                $ratio(self.0 / rhs.0)
            }
        }

        impl<N> Mul<$denom<N>> for $ratio<N>
        where
            N: Num,
        {
            type Output = $num<N>;

            fn mul(self, rhs: $denom<N>) -> Self::Output {
                $num(self.0 * rhs.0)
            }
        }
    };
}

macro_rules! unit_ratio {
    ($ratio:ident, $num:ident, $denom:ident) => {
        unit_ratio_impl!($ratio, $num, $denom);
        unit_ratio_impl!($denom, $num, $ratio);
    };
}

// Distance units:
unit_of_measure![Kilometers, " km"];

// Angular units:
unit_of_measure![Degrees, "°"];

// Time units:
unit_of_measure![Hours, " h"];
unit_of_measure![Minutes, " min"];

// Velocity / speed units:
unit_of_measure![KilometersPerHour, " km/h"];

unit_ratio![KilometersPerHour, Kilometers, Hours];

impl<N> From<Hours<N>> for Minutes<N>
where
    N: Num + From<u8>,
{
    fn from(value: Hours<N>) -> Minutes<N> {
        Minutes(N::from(60u8) * value.0)
    }
}

impl<N> From<Minutes<N>> for Hours<N>
where
    N: Num + From<u8>,
{
    fn from(value: Minutes<N>) -> Hours<N> {
        Hours(value.0 / N::from(60u8))
    }
}
