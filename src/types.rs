//! Common types and traits for carton geometry.
//!
//! Lengths are inches and weights are pounds throughout the search. The
//! [`units`] module converts to metric for display only.

use std::ops::Mul;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents a 3D extent (length, width, height).
///
/// Used for product and carton dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vec3 {
    /// Length (X axis)
    pub x: f64,
    /// Width (Y axis)
    pub y: f64,
    /// Height (Z axis)
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector.
    ///
    /// # Parameters
    /// * `x` - X component (length)
    /// * `y` - Y component (width)
    /// * `z` - Z component (height)
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Converts to tuple format for display.
    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Calculates the volume (product of all components).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl From<(f64, f64, f64)> for Vec3 {
    #[inline]
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }
}

/// Trait for objects with 3D dimensions.
pub trait Dimensional {
    /// Returns the dimensions of the object in inches.
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume in cubic inches.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

/// Trait for objects with weight.
pub trait Weighted {
    /// Returns the weight in pounds.
    fn weight(&self) -> f64;
}

/// Imperial to metric conversion for display.
pub mod units {
    use super::Vec3;

    /// Centimeters per inch.
    pub const INCH_TO_CM: f64 = 2.54;

    /// Kilograms per pound.
    pub const LB_TO_KG: f64 = 0.453592;

    /// Converts all three axes from inches to centimeters.
    #[inline]
    pub fn dims_to_cm(dims: Vec3) -> Vec3 {
        dims * INCH_TO_CM
    }

    /// Converts pounds to kilograms.
    #[inline]
    pub fn pounds_to_kg(pounds: f64) -> f64 {
        pounds * LB_TO_KG
    }
}
